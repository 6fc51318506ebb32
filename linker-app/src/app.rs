//! Command line flow: settings, fetcher, parallel resolve, output.

use crate::config::{AppConfig, ResolveMode};
use crate::error::AppError;
use crate::logging;
use crate::output::{self, Resolved};
use crate::settings::Settings;
use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use linker_core::{ModuleFetcher, ResolveError, Resolver};
use linker_fetch::{CachedFetcher, DirFetcher};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Parses the command line and runs the linker.
pub fn run() -> Result<()> {
    let config = AppConfig::parse();
    run_with(&config)
}

/// Runs the linker for an already parsed command line.
pub fn run_with(config: &AppConfig) -> Result<()> {
    let settings = Settings::load(config)?;
    logging::init_logger(&settings);
    log::debug!("Effective settings: {:?}", settings);

    let destinations =
        output::plan_destinations(&config.roots, config.output.as_deref(), settings.mode)?;

    let search_roots = asset_roots(&settings, &config.roots);
    log::info!("Asset roots: {:?}", search_roots);
    let fetcher = CachedFetcher::with_ttl(DirFetcher::new(search_roots), settings.cache_ttl()?);
    let resolver = Resolver::new(settings.resolve_options());

    // Every root gets its own resolve session; only the fetcher cache is shared.
    let resolved = config
        .roots
        .par_iter()
        .map(|root| resolve_root(&resolver, &fetcher, root, settings.mode))
        .collect::<Result<Vec<_>, AppError>>()?;

    for ((root, resolved), destination) in config.roots.iter().zip(&resolved).zip(&destinations) {
        output::write_output(&resolved.render()?, destination.as_deref())?;
        log::info!("Resolved {:?}", root);
    }
    Ok(())
}

/// Configured asset roots, or the directories holding the root files.
fn asset_roots(settings: &Settings, roots: &[PathBuf]) -> Vec<PathBuf> {
    if !settings.asset_roots.is_empty() {
        return settings.asset_roots.clone();
    }
    let mut dirs = Vec::new();
    for root in roots {
        let dir = root
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }
    dirs
}

/// Reads one root file and resolves it in the configured mode.
pub fn resolve_root<F: ModuleFetcher + ?Sized>(
    resolver: &Resolver,
    fetcher: &F,
    root: &Path,
    mode: ResolveMode,
) -> Result<Resolved, AppError> {
    let text = fs::read_to_string(root)
        .with_context(|| format!("Failed to read root shader {root:?}"))?;
    let failed = |source| AppError::Resolve {
        root: root.to_path_buf(),
        source,
    };

    match mode {
        ResolveMode::Flatten => resolver
            .resolve_flatten(&text, fetcher)
            .map(Resolved::Flat)
            .map_err(failed),
        ResolveMode::Units => resolver
            .resolve_units(&text, fetcher)
            .map(Resolved::Units)
            .map_err(failed),
    }
}

/// Prints a one-line diagnostic plus its causes to stderr.
pub fn report_error(err: &anyhow::Error) {
    eprintln!("{} {}", "error:".red().bold(), err);
    for cause in err.chain().skip(1) {
        eprintln!("  {} {}", "caused by:".yellow(), cause);
    }

    if let Some(AppError::Resolve { source, .. }) = err.downcast_ref::<AppError>() {
        match source {
            ResolveError::CircularDependency { path } => {
                eprintln!("  {} {}", "import cycle:".cyan(), path.join(" -> "));
            }
            other => eprintln!("  {} {}", "module:".cyan(), other.module()),
        }
    }
}
