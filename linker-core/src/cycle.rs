use crate::ResolveError;
use std::collections::HashSet;

/// Tracks modules whose imports are still being expanded.
///
/// A module enters when its scan is registered and leaves once every import below it has been
/// linked. Reaching a module that is still in progress means the import graph has a cycle.
#[derive(Debug, Default)]
pub struct CycleGuard {
    chain: Vec<String>,
    in_progress: HashSet<String>,
}

impl CycleGuard {
    /// Creates a guard with nothing in progress.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `module` as in progress below the current innermost module.
    pub fn enter(&mut self, module: &str) {
        self.chain.push(module.to_owned());
        self.in_progress.insert(module.to_owned());
    }

    /// Leaves the innermost module. Returns its name.
    pub fn leave(&mut self) -> Option<String> {
        let module = self.chain.pop()?;
        self.in_progress.remove(&module);
        Some(module)
    }

    #[must_use]
    pub fn is_in_progress(&self, module: &str) -> bool {
        self.in_progress.contains(module)
    }

    /// Number of modules currently in progress.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.chain.len()
    }

    /// Fails if importing `module` from the innermost in-progress module closes a cycle.
    ///
    /// # Errors
    ///
    /// `CircularDependency` whose path runs from `module` through every module on the chain
    /// and back to `module`.
    pub fn check(&self, module: &str) -> Result<(), ResolveError> {
        if !self.is_in_progress(module) {
            return Ok(());
        }
        let start = self
            .chain
            .iter()
            .position(|m| m == module)
            .unwrap_or_default();
        let mut path = self.chain[start..].to_vec();
        path.push(module.to_owned());
        Err(ResolveError::CircularDependency { path })
    }
}
