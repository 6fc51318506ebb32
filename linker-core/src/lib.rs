//! Core library for resolving `#import` directives in shader sources.
//! Builds a dependency graph of named shader modules and links it into either one
//! flattened compilation source or a set of deduplicated per-module units.

use thiserror::Error;

/// Cycle detection over the in-progress module chain.
pub mod cycle;
/// The module fetch boundary.
pub mod fetcher;
/// Module nodes and the dependency graph arena.
pub mod graph;
/// Per-session module name cache.
pub mod registry;
/// Graph traversal and the two output modes.
pub mod resolver;
/// Line classification of raw module text.
pub mod scanner;
/// Graph construction for one resolve call.
pub mod session;

pub use crate::fetcher::{FetchError, ModuleFetcher};
pub use crate::graph::{DependencyGraph, Edge, Node, NodeId};
pub use crate::resolver::{
    resolve_flatten, resolve_units, Flattened, ResolveOptions, Resolver, Units,
};
pub use crate::scanner::{ScanOptions, ScannedModule, ROOT_MODULE};
pub use crate::session::ResolveStats;

/// Errors that abort a resolve call. None of them leave partial output behind.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The fetcher could not supply a referenced module.
    #[error("Module '{name}' not found (imported by '{imported_by}')")]
    ModuleNotFound {
        /// Module that could not be fetched.
        name: String,
        /// Module holding the import.
        imported_by: String,
        /// Fetcher failure.
        #[source]
        source: FetchError,
    },
    /// An `#import` line does not hold a well-formed quoted path.
    #[error("Malformed #import directive in '{module}' at line {line}: {text}")]
    MalformedDirective {
        /// Module containing the directive.
        module: String,
        /// 1-based line number.
        line: usize,
        /// The offending line, trimmed.
        text: String,
    },
    /// A module imports itself directly.
    #[error("Module '{module}' imports itself")]
    SelfImport {
        /// The module importing itself.
        module: String,
    },
    /// An indirect import cycle. `path` starts and ends with the repeated module.
    #[error("Circular dependency: {}", path.join(" -> "))]
    CircularDependency {
        /// Modules along the cycle.
        path: Vec<String>,
    },
}

impl ResolveError {
    /// Name of the module the failure is attributed to.
    #[must_use]
    pub fn module(&self) -> &str {
        match self {
            Self::ModuleNotFound { name, .. } => name,
            Self::MalformedDirective { module, .. } | Self::SelfImport { module } => module,
            Self::CircularDependency { path } => path.first().map_or(ROOT_MODULE, String::as_str),
        }
    }
}
