pub mod csv_import;
pub mod persistence;
pub mod repositories;
