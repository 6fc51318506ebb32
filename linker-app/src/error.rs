use linker_core::ResolveError;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of one command line run.
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid settings from the file, the environment or the flags.
    #[error("Configuration Error: {0}")]
    Config(String),

    /// Filesystem failure outside module fetching.
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    /// A root shader failed to resolve.
    #[error("Failed to resolve {}", root.display())]
    Resolve {
        /// Root file being resolved.
        root: PathBuf,
        /// Why it failed.
        #[source]
        source: ResolveError,
    },

    /// The requested output layout cannot be produced.
    #[error("Output Error: {0}")]
    Output(String),

    /// Any other error, with its context chain.
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
