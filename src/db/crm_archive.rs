use std::fs;
use std::path::{Path, PathBuf};

use duckdb::Connection;
use log::{info, warn};

use crate::db::loader::{self, LoadStats};
use crate::db::schema::{self, CUSTOMERS, ORGANIZATIONS};
use crate::download;
use crate::errors::PipelineError;
use crate::extract;

/// One-shot loader for the CRM sample-data export: a tar.gz archive holding
/// `organizations.csv` and `customers.csv`, landing in one DuckDB file.
///
/// The downloaded archive and the extracted tree are kept under `base_dir`
/// and never cleaned up here.
#[derive(Clone)]
pub struct CrmArchive {
    pub url: String,
    pub base_dir: String,
    pub duckdb_path: String,
    pub batch_size: usize,
}

impl CrmArchive {
    /// Local path of the downloaded archive.
    pub fn archive_path(&self) -> PathBuf {
        Path::new(&self.base_dir).join("Raw/crm_export.tar.gz")
    }

    /// Directory the archive gets unpacked into.
    pub fn extract_dir(&self) -> PathBuf {
        Path::new(&self.base_dir).join("Raw/crm_export")
    }

    /// Path of one extracted CSV file.
    pub fn csv_path(&self, source_file: &str) -> PathBuf {
        self.extract_dir().join(source_file)
    }

    pub fn download_file(&self) -> Result<(), PipelineError> {
        download::download_file(&self.url, &self.archive_path())
    }

    pub fn extract(&self) -> Result<(), PipelineError> {
        extract::unpack_tar_gz(&self.archive_path(), &self.extract_dir())
    }

    /// Create the tables if needed and load both CSV files, one batch at a
    /// time.  Opens one connection and releases it on every exit path; a
    /// failed run leaves the batches committed so far in place.
    pub fn update_duckdb(&self) -> Result<Vec<LoadStats>, PipelineError> {
        if let Some(dir) = Path::new(&self.duckdb_path).parent() {
            fs::create_dir_all(dir)?;
        }
        let mut conn = Connection::open(&self.duckdb_path)?;
        let outcome = self.load_all(&mut conn);
        if let Err((_, e)) = conn.close() {
            warn!("failed to close duckdb connection: {}", e);
            outcome?;
            return Err(e.into());
        }
        outcome
    }

    fn load_all(&self, conn: &mut Connection) -> Result<Vec<LoadStats>, PipelineError> {
        schema::ensure_tables(conn)?;
        let mut stats = Vec::new();
        // sequential on purpose: one in-flight load bounds peak memory and
        // keeps a single writer on the connection
        for table in [&ORGANIZATIONS, &CUSTOMERS] {
            stats.push(loader::load_csv(
                conn,
                &self.csv_path(table.source_file),
                table.name,
                self.batch_size,
            )?);
        }
        Ok(stats)
    }

    /// Run the whole pipeline: download, extract, load both tables.
    pub fn run(&self) -> Result<(), PipelineError> {
        self.download_file()?;
        self.extract()?;
        self.update_duckdb()?;
        info!("done");
        Ok(())
    }
}
