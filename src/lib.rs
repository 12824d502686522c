pub mod board;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod feed;
pub mod format;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod scheduler;
pub mod seed;
pub mod validation;

pub use error::{Error, Result};
