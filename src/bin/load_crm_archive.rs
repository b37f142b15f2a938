use std::error::Error;

use crimp::db::prod_db::ProdDb;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let archive = ProdDb::crm();
    archive.run()?;
    Ok(())
}
