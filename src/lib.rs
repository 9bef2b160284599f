pub mod analytics;
pub mod config;
pub mod entry;
pub mod errors;
pub mod export;
pub mod openapi;
pub mod query;
pub mod store;
