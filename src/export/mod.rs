pub mod handlers;
pub mod writer;

pub use handlers::{export_csv, ExportQuery};
