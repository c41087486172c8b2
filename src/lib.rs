pub mod config;
pub mod database;
pub mod db;
pub mod error;
pub mod logging;
pub mod migrations;
pub mod progress;

pub use error::{MigrationError, Result};
