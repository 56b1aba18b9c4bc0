//! Builds `RecordSet`s from the outside world: CSV exports and in-memory models.

pub mod csv_loader;
pub mod error;
pub mod models;

pub use csv_loader::{load_csv, read_csv, CsvOptions};
pub use error::IngestError;
pub use models::from_models;
