use std::io::Read;
use std::path::Path;

use csv::{Reader, ReaderBuilder, StringRecord};
use duckdb::{params_from_iter, Connection};
use log::info;

use crate::errors::PipelineError;

/// Counts reported by one completed load.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    pub rows: usize,
    pub batches: usize,
}

/// Turn a CSV header into a column identifier,
/// e.g. "Number of employees" -> "number_of_employees".
fn column_name(header: &str) -> String {
    header.trim().to_lowercase().replace(' ', "_")
}

fn insert_sql(table: &str, headers: &StringRecord) -> String {
    let columns: Vec<String> = headers
        .iter()
        .map(|h| format!("\"{}\"", column_name(h)))
        .collect();
    let placeholders = vec!["?"; columns.len()];
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// One batch goes in as one transaction: all rows commit together or the
/// whole batch is rolled back.
fn insert_batch(
    conn: &mut Connection,
    sql: &str,
    batch: &[StringRecord],
) -> Result<(), PipelineError> {
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(sql)?;
        for record in batch {
            stmt.execute(params_from_iter(record.iter()))?;
        }
    }
    tx.commit()?;
    Ok(())
}

/// The read/flush loop.  Records accumulate up to `batch_size`, then
/// `insert` runs on exactly that slice and the accumulator is cleared
/// before the reader is polled again; a final partial batch is flushed at
/// end of input.  The reader never advances while `insert` is running.
fn load_from_reader<R, F>(
    rdr: &mut Reader<R>,
    batch_size: usize,
    mut insert: F,
) -> Result<LoadStats, PipelineError>
where
    R: Read,
    F: FnMut(&[StringRecord]) -> Result<(), PipelineError>,
{
    assert!(batch_size > 0, "batch_size must be at least 1");
    let mut stats = LoadStats::default();
    let mut batch: Vec<StringRecord> = Vec::with_capacity(batch_size);
    for record in rdr.records() {
        batch.push(record?);
        if batch.len() == batch_size {
            insert(&batch)?;
            stats.rows += batch.len();
            stats.batches += 1;
            batch.clear();
        }
    }
    if !batch.is_empty() {
        insert(&batch)?;
        stats.rows += batch.len();
        stats.batches += 1;
    }
    Ok(stats)
}

/// Stream the CSV file at `path` into `table`, `batch_size` rows at a time.
///
/// The header row names the columns; every following record is bound 1:1
/// to one inserted row, with all values passed through as text.  Records
/// accumulate in memory up to `batch_size` and the reader is only polled
/// again after the accumulated batch has committed, so at most one batch
/// is ever buffered and no insert is outstanding while reading.
///
/// A record whose field count differs from the header aborts the load with
/// `Parse`; an insert failure aborts it with `Storage`.  Batches committed
/// before the failure stay committed.
///
/// Panics if `batch_size` is 0.
pub fn load_csv(
    conn: &mut Connection,
    path: &Path,
    table: &str,
    batch_size: usize,
) -> Result<LoadStats, PipelineError> {
    info!("loading {} into table {} ...", path.display(), table);
    let mut rdr = ReaderBuilder::new().from_path(path)?;
    let sql = insert_sql(table, rdr.headers()?);
    let stats = load_from_reader(&mut rdr, batch_size, |batch| {
        insert_batch(conn, &sql, batch)
    })?;
    info!(
        "  inserted {} rows into {} in {} batches",
        stats.rows, table, stats.batches
    );

    Ok(stats)
}
