// Storage module: the output dataset.

pub mod csv_store;

pub use csv_store::{CsvStore, SaveSummary};
