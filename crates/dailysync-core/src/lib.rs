//! `dailysync-core`: configuration and payload types shared by the
//! DailySync trigger binaries.

pub mod config;
pub mod error;
pub mod summary;

pub use config::TriggerConfig;
pub use error::{ConfigError, Result};
