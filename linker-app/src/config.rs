use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// What a resolve call produces.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolveMode {
    /// One source with every import spliced inline.
    #[default]
    Flatten,
    /// A main unit plus one named unit per imported module, as JSON.
    Units,
}

/// Log level applied to everything not configured through `RUST_LOG`.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlobalLogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
}

/// Command line of the shader linker.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct AppConfig {
    /// Root shader files to resolve.
    #[arg(value_name = "FILE", required = true)]
    pub roots: Vec<PathBuf>,

    /// Output mode. Overrides the configuration file.
    #[arg(short, long, value_enum)]
    pub mode: Option<ResolveMode>,

    /// Directory searched for imported modules. Repeat for several roots, searched in order.
    #[arg(short = 'r', long = "asset-root", value_name = "DIR")]
    pub asset_roots: Vec<PathBuf>,

    /// Output file (one root) or directory (several roots). Defaults to stdout.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Wrap imported modules in begin/end comment markers.
    #[arg(long, default_value_t = false, overrides_with = "no_import_markers")]
    pub import_markers: bool,

    /// Turn import markers off even when the configuration file or environment enables them.
    #[arg(long, default_value_t = false, overrides_with = "import_markers")]
    pub no_import_markers: bool,

    /// How long fetched modules stay cached between roots (e.g., "30s", "500ms").
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    pub cache_ttl: Option<Duration>,

    /// TOML configuration file. Defaults to `shader-linker.toml` when present.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Global log level.
    #[arg(long, value_enum)]
    pub log_level: Option<GlobalLogLevel>,
}
