use std::{
    fs::{self, File},
    io::{Read, Write},
    path::Path,
};

use log::info;
use reqwest::{blocking::Client, header::USER_AGENT, StatusCode};

use crate::errors::PipelineError;

/// Download `url` into `file_path`, creating the parent directories as
/// needed.  The body is streamed to disk chunk by chunk, never held fully
/// in memory, and the file is synced before returning.
pub fn download_file(url: &str, file_path: &Path) -> Result<(), PipelineError> {
    info!("downloading {} ...", url);
    let client = Client::new();
    let response = client
        .get(url)
        .header(USER_AGENT, "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36")
        .send()?;
    if response.status() != StatusCode::OK {
        return Err(PipelineError::Network(format!(
            "download of {} failed with status {}",
            url,
            response.status()
        )));
    }

    if let Some(dir) = file_path.parent() {
        fs::create_dir_all(dir)?;
    }
    let mut out = File::create(file_path)?;
    let mut body = response;
    let mut buf = [0u8; 64 * 1024];
    loop {
        // a drop mid-transfer surfaces here, on the read side
        let n = body
            .read(&mut buf)
            .map_err(|e| PipelineError::Network(e.to_string()))?;
        if n == 0 {
            break;
        }
        out.write_all(&buf[..n])?;
    }
    out.sync_all()?;
    info!("  saved to {}", file_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[ignore]
    #[test]
    fn download_file_test() -> Result<(), Box<dyn std::error::Error>> {
        let path = std::env::temp_dir().join("crimp_download_test/robots.txt");
        download_file("https://www.rust-lang.org/robots.txt", &path)?;
        assert!(fs::metadata(&path)?.len() > 0);
        Ok(())
    }

    #[ignore]
    #[test]
    fn download_bad_status() {
        let path = std::env::temp_dir().join("crimp_download_test/missing.bin");
        let res = download_file("https://www.rust-lang.org/no-such-file-404", &path);
        assert!(matches!(res, Err(PipelineError::Network(_))));
    }
}
