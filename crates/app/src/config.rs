//! Application configuration

use clap::Args;

use crate::config::{logging::LoggingConfig, orders::OrderConfig};

pub mod logging;
pub mod orders;

pub use logging::LogFormat;

/// Settings shared by every command, read from flags or the environment.
#[derive(Debug, Args)]
pub struct AppConfig {
    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Values stamped onto placed orders.
    #[command(flatten)]
    pub orders: OrderConfig,
}
