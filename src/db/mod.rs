pub mod crm_archive;
pub mod loader;
pub mod prod_db;
pub mod schema;
