use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Failure to supply a module's text.
#[derive(Error, Debug)]
pub enum FetchError {
    /// No source holds a module with this name.
    #[error("No module named '{0}'")]
    NotFound(String),
    /// The module exists but could not be read.
    #[error("I/O error reading module '{name}': {source}")]
    Io {
        /// Module being read.
        name: String,
        /// Underlying failure.
        source: std::io::Error,
    },
    /// The name cannot be mapped to a module location.
    #[error("Invalid module name '{name}': {reason}")]
    InvalidName {
        /// Rejected name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// Supplies the raw text of a named module.
///
/// The resolver calls this synchronously and never assumes the implementation caches;
/// its own per-call registry prevents repeated fetches of one name within a single resolve.
/// Implementations are shared between concurrent resolve calls, hence `Send + Sync`.
pub trait ModuleFetcher: Send + Sync {
    /// Returns the raw text of `name`.
    ///
    /// # Errors
    ///
    /// A [`FetchError`] when the module is unknown or unreadable.
    fn fetch(&self, name: &str) -> Result<String, FetchError>;
}

impl ModuleFetcher for HashMap<String, String> {
    fn fetch(&self, name: &str) -> Result<String, FetchError> {
        self.get(name)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(name.to_owned()))
    }
}

impl<T: ModuleFetcher + ?Sized> ModuleFetcher for &T {
    fn fetch(&self, name: &str) -> Result<String, FetchError> {
        (**self).fetch(name)
    }
}

impl<T: ModuleFetcher + ?Sized> ModuleFetcher for Box<T> {
    fn fetch(&self, name: &str) -> Result<String, FetchError> {
        (**self).fetch(name)
    }
}

impl<T: ModuleFetcher + ?Sized> ModuleFetcher for Arc<T> {
    fn fetch(&self, name: &str) -> Result<String, FetchError> {
        (**self).fetch(name)
    }
}
