pub mod config;
pub mod error;
pub mod logging;

pub use config::{AppConfig, DeleteRecovery, ReconcileConfig};
pub use error::{AppError, Result};
