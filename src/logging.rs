//! Logging setup
//!
//! The library only talks to the `log` facade. The binary installs
//! `env_logger` once at startup and flushes it on the way out.

use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "strawberry=debug").
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    /// Level used when neither `env_filter` nor `RUST_LOG` is set
    pub default_level: log::LevelFilter,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: log::LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    /// `--debug` on the command line
    pub fn debug() -> Self {
        Self {
            default_level: log::LevelFilter::Debug,
            ..Self::default()
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once; later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = config.env_filter {
            builder.parse_filters(&filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(config.default_level);
        }

        builder.write_style(config.write_style);
        builder.format_target(false);

        // another logger may already be installed (tests, embedding apps)
        if builder.try_init().is_ok() {
            log::debug!("logging initialized");
        }
    });
}

/// Flush buffered log output before the process exits
pub fn shutdown_logging() {
    log::logger().flush();
}
