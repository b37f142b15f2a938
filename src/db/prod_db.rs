use super::crm_archive::CrmArchive;

pub struct ProdDb {}

impl ProdDb {
    pub fn crm() -> CrmArchive {
        CrmArchive {
            url: "https://downloads.datablist.com/exports/crm_export.tar.gz".to_string(),
            base_dir: "/tmp/crimp/CrmExport".to_string(),
            duckdb_path: "/tmp/crimp/DuckDB/crm.duckdb".to_string(),
            batch_size: 100,
        }
    }
}
