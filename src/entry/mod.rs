pub mod handlers;
pub mod models;
pub mod service;

// Re-export handlers for use in main.rs
pub use handlers::{create_entry, delete_entry, get_entry, list_entries, replace_entry};
