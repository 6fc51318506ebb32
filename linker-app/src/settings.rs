//! Layered settings: built-in defaults, then the TOML file, then `SHADER_LINKER_*`
//! environment variables, then explicit command line flags.

use crate::config::{AppConfig, GlobalLogLevel, ResolveMode};
use crate::error::AppError;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use linker_core::ResolveOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "shader-linker.toml";
/// Prefix of environment variables overriding file settings.
pub const ENV_PREFIX: &str = "SHADER_LINKER_";

/// Effective settings of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Output mode for every root.
    pub mode: ResolveMode,
    /// Directories searched for imported modules, in order. Empty means "next to each root".
    pub asset_roots: Vec<PathBuf>,
    /// Wrap imported modules in begin/end comment lines.
    pub import_markers: bool,
    /// Human readable duration, e.g. "60s".
    pub cache_ttl: String,
    /// Level for everything `RUST_LOG` does not mention.
    pub log_level: GlobalLogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: ResolveMode::Flatten,
            asset_roots: Vec::new(),
            import_markers: false,
            cache_ttl: "60s".to_string(),
            log_level: GlobalLogLevel::Warn,
        }
    }
}

impl Settings {
    /// Loads every layer and applies the flags given in `config` on top.
    pub fn load(config: &AppConfig) -> Result<Self, AppError> {
        let file = match &config.config {
            Some(path) if !path.is_file() => {
                return Err(AppError::Config(format!(
                    "configuration file {path:?} not found"
                )));
            }
            Some(path) => path.clone(),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        let mut settings: Self = Self::figment(&file)
            .extract()
            .map_err(|e| AppError::Config(e.to_string()))?;
        settings.apply_cli(config);
        settings.cache_ttl()?;
        Ok(settings)
    }

    /// Defaults, the TOML file (skipped when missing) and the environment, in that order.
    pub fn figment(file: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    fn apply_cli(&mut self, config: &AppConfig) {
        if let Some(mode) = config.mode {
            self.mode = mode;
        }
        if !config.asset_roots.is_empty() {
            self.asset_roots.clone_from(&config.asset_roots);
        }
        if config.import_markers {
            self.import_markers = true;
        } else if config.no_import_markers {
            self.import_markers = false;
        }
        if let Some(ttl) = config.cache_ttl {
            self.cache_ttl = humantime::format_duration(ttl).to_string();
        }
        if let Some(level) = config.log_level {
            self.log_level = level;
        }
    }

    /// Parsed `cache_ttl`.
    pub fn cache_ttl(&self) -> Result<Duration, AppError> {
        humantime::parse_duration(&self.cache_ttl)
            .map_err(|e| AppError::Config(format!("invalid cache_ttl '{}': {e}", self.cache_ttl)))
    }

    /// Resolver options derived from these settings.
    pub const fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            import_markers: self.import_markers,
        }
    }
}
