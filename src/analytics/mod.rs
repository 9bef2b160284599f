pub mod handlers;
pub mod models;
pub mod service;
pub mod stats;

pub use handlers::get_analytics;
