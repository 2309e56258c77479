//! Persistence and interchange formats.

pub mod csv_export;
pub mod csv_import;
pub mod file;

pub use csv_export::export_csv;
pub use csv_import::{import_csv, parse_csv, ImportOutcome};
pub use file::{load_snapshot, save_snapshot, Snapshot};
