use duckdb::{params, Connection};
use log::info;

use crate::errors::PipelineError;

/// One target table: its name, the CSV file inside the extracted archive
/// that feeds it, and the DDL that creates it.
pub struct TableSchema {
    pub name: &'static str,
    pub source_file: &'static str,
    pub ddl: &'static str,
}

/// The `id` column is synthetic, fed by a sequence; the remaining columns
/// are the CSV header names in snake_case.  Integer-looking fields stay
/// VARCHAR unless the source guarantees a numeric literal.
pub static ORGANIZATIONS: TableSchema = TableSchema {
    name: "organizations",
    source_file: "organizations.csv",
    ddl: r#"
CREATE SEQUENCE IF NOT EXISTS organizations_id_seq;
CREATE TABLE IF NOT EXISTS organizations (
    id INTEGER PRIMARY KEY DEFAULT nextval('organizations_id_seq'),
    "index" BIGINT,
    organization_id VARCHAR,
    name VARCHAR,
    website VARCHAR,
    country VARCHAR,
    description VARCHAR,
    founded INTEGER,
    industry VARCHAR,
    number_of_employees VARCHAR
);
"#,
};

pub static CUSTOMERS: TableSchema = TableSchema {
    name: "customers",
    source_file: "customers.csv",
    ddl: r#"
CREATE SEQUENCE IF NOT EXISTS customers_id_seq;
CREATE TABLE IF NOT EXISTS customers (
    id INTEGER PRIMARY KEY DEFAULT nextval('customers_id_seq'),
    "index" BIGINT,
    customer_id VARCHAR,
    first_name VARCHAR,
    last_name VARCHAR,
    company VARCHAR,
    city VARCHAR,
    country VARCHAR,
    phone_1 VARCHAR,
    phone_2 VARCHAR,
    email VARCHAR,
    subscription_date VARCHAR,
    website VARCHAR
);
"#,
};

pub fn table_exists(conn: &Connection, table: &str) -> Result<bool, PipelineError> {
    let n: i64 = conn.query_row(
        "SELECT count(*) FROM information_schema.tables \
         WHERE table_schema = 'main' AND table_name = ?",
        params![table],
        |row| row.get(0),
    )?;
    Ok(n > 0)
}

/// Create the two target tables if they don't exist yet.  Safe to call
/// repeatedly against the same database; existing tables and their rows
/// are left untouched.
pub fn ensure_tables(conn: &Connection) -> Result<(), PipelineError> {
    for table in [&ORGANIZATIONS, &CUSTOMERS] {
        if table_exists(conn, table.name)? {
            info!("table {} already exists", table.name);
            continue;
        }
        conn.execute_batch(table.ddl)?;
        info!("created table {}", table.name);
    }
    Ok(())
}
