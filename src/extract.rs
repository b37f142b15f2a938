use std::fs::{self, File};
use std::path::Path;

use flate2::read::GzDecoder;
use log::info;
use tar::Archive;

use crate::errors::PipelineError;

/// Unpack a `.tar.gz` archive into `dest_dir`, keeping the archive's
/// internal directory layout.  The gunzip and untar stages are chained
/// readers, so the decompressed content is never buffered whole.
pub fn unpack_tar_gz(archive_path: &Path, dest_dir: &Path) -> Result<(), PipelineError> {
    info!(
        "extracting {} into {} ...",
        archive_path.display(),
        dest_dir.display()
    );
    fs::create_dir_all(dest_dir)?;
    let file = File::open(archive_path)?;
    let mut archive = Archive::new(GzDecoder::new(file));
    archive.unpack(dest_dir).map_err(|e| {
        PipelineError::Extraction(format!(
            "failed to unpack {}: {}",
            archive_path.display(),
            e
        ))
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{write::GzEncoder, Compression};
    use std::io::Write;

    fn make_archive(path: &Path, files: &[(&str, &str)]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let enc = GzEncoder::new(File::create(path).unwrap(), Compression::default());
        let mut builder = tar::Builder::new(enc);
        for (name, content) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, name, content.as_bytes())
                .unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn unpack_roundtrip() -> Result<(), Box<dyn std::error::Error>> {
        let dir = std::env::temp_dir().join("crimp_extract_roundtrip");
        let _ = fs::remove_dir_all(&dir);
        let archive = dir.join("export.tar.gz");
        make_archive(
            &archive,
            &[
                ("a.csv", "id,name\n1,Alice\n"),
                ("nested/b.csv", "id,name\n2,Bob\n"),
            ],
        );

        let out = dir.join("unpacked");
        unpack_tar_gz(&archive, &out)?;
        assert_eq!(fs::read_to_string(out.join("a.csv"))?, "id,name\n1,Alice\n");
        assert_eq!(
            fs::read_to_string(out.join("nested/b.csv"))?,
            "id,name\n2,Bob\n"
        );
        Ok(())
    }

    #[test]
    fn unpack_corrupt_input() {
        let dir = std::env::temp_dir().join("crimp_extract_corrupt");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let archive = dir.join("garbage.tar.gz");
        let mut f = File::create(&archive).unwrap();
        f.write_all(b"this is not a gzip stream").unwrap();
        drop(f);

        let res = unpack_tar_gz(&archive, &dir.join("unpacked"));
        assert!(matches!(res, Err(PipelineError::Extraction(_))));
    }
}
