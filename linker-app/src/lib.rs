//! Shader Linker application: command line, layered settings, logging and output around
//! the `linker-core` resolver.

pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod settings;

pub use app::{report_error, run};
pub use config::AppConfig;
pub use error::AppError;
