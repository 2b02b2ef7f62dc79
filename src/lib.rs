pub mod app;
pub mod cli;
pub mod config;
pub mod contract;
pub mod error;
pub mod handler;
pub mod manifest;
pub mod skill;
pub mod test_utils;

pub use error::{HarnessError, Result};

/// Package version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
