pub mod db;
pub mod download;
pub mod errors;
pub mod extract;
