pub mod config;
pub mod databricks;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod pagination;
pub mod scraper;
pub mod service;
pub mod spark;
pub mod spark_service;
pub mod state;
pub mod transport;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
