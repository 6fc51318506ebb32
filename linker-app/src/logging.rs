//! Logging setup for the application.

use crate::config::GlobalLogLevel;
use crate::settings::Settings;
use env_logger::Builder;
use log::LevelFilter;

impl From<GlobalLogLevel> for LevelFilter {
    fn from(level: GlobalLogLevel) -> Self {
        match level {
            GlobalLogLevel::Trace => Self::Trace,
            GlobalLogLevel::Debug => Self::Debug,
            GlobalLogLevel::Info => Self::Info,
            GlobalLogLevel::Warn => Self::Warn,
            GlobalLogLevel::Error => Self::Error,
        }
    }
}

/// Initializes `env_logger` from the configured global level.
///
/// Directives in `RUST_LOG` are applied on top, so `RUST_LOG=linker_core=trace` still works
/// while everything else stays at the configured level. Logs go to stderr; stdout is reserved
/// for resolved output.
pub fn init_logger(settings: &Settings) {
    let mut builder = Builder::new();
    builder.filter_level(settings.log_level.into());

    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }

    if builder.try_init().is_err() {
        log::warn!("Logger already initialized, keeping the existing one");
        return;
    }

    log::debug!(
        "Logger initialized with global log level: {:?}",
        settings.log_level
    );
}
