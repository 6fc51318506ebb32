use crate::config::ResolveMode;
use crate::error::AppError;
use anyhow::{Context, Result};
use linker_core::{Flattened, Units};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Result of resolving one root file.
#[derive(Debug)]
pub enum Resolved {
    /// Flatten mode result.
    Flat(Flattened),
    /// Units mode result.
    Units(Units),
}

impl Resolved {
    /// Flattened source as-is, units as pretty JSON.
    pub fn render(&self) -> Result<String> {
        match self {
            Self::Flat(flattened) => Ok(flattened.source.clone()),
            Self::Units(units) => {
                let mut json =
                    serde_json::to_string_pretty(units).context("Failed to serialize units")?;
                json.push('\n');
                Ok(json)
            }
        }
    }
}

/// File name used for `root` when writing into an output directory.
pub fn output_file_name(root: &Path, mode: ResolveMode) -> PathBuf {
    let name = root
        .file_name()
        .map_or_else(|| "shader".into(), |n| n.to_string_lossy().into_owned());
    match mode {
        ResolveMode::Flatten => PathBuf::from(name),
        ResolveMode::Units => PathBuf::from(format!("{name}.json")),
    }
}

/// Decides where each root's output goes. `None` means stdout.
///
/// A single root writes to `output` directly unless it is an existing directory. Several
/// roots need `output` to be a directory and must not share a file name.
pub fn plan_destinations(
    roots: &[PathBuf],
    output: Option<&Path>,
    mode: ResolveMode,
) -> Result<Vec<Option<PathBuf>>, AppError> {
    let Some(output) = output else {
        if roots.len() > 1 {
            return Err(AppError::Output(
                "resolving several roots requires --output <DIR>".to_string(),
            ));
        }
        return Ok(vec![None; roots.len()]);
    };

    if roots.len() == 1 && !output.is_dir() {
        return Ok(vec![Some(output.to_path_buf())]);
    }

    let mut seen = HashSet::new();
    roots
        .iter()
        .map(|root| {
            let path = output.join(output_file_name(root, mode));
            if seen.insert(path.clone()) {
                Ok(Some(path))
            } else {
                Err(AppError::Output(format!(
                    "two roots would both be written to {path:?}"
                )))
            }
        })
        .collect()
}

/// Writes `text` to `path`, or stdout when `path` is `None`.
pub fn write_output(text: &str, path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        lock.write_all(text.as_bytes())
            .context("Failed to write to stdout")?;
        return lock.flush().context("Failed to flush stdout");
    };

    log::info!("Writing output to {:?}", path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {parent:?}"))?;
    }
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {path:?}"))?;
    let mut writer = io::BufWriter::new(file);
    writer
        .write_all(text.as_bytes())
        .with_context(|| format!("Failed to write output file: {path:?}"))?;
    writer
        .flush()
        .context("Failed to flush writer for output file")?;
    Ok(())
}
