use linker_core::{FetchError, ModuleFetcher};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Fixed table of module texts, with a counter of the fetches served.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    modules: HashMap<String, String>,
    fetches: AtomicUsize,
}

impl MemoryFetcher {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a module, builder style.
    #[must_use]
    pub fn with_module(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(name, text);
        self
    }

    /// Adds or replaces a module. Returns the previous text.
    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) -> Option<String> {
        self.modules.insert(name.into(), text.into())
    }

    /// Number of `fetch` calls made so far, failed ones included.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }
}

impl ModuleFetcher for MemoryFetcher {
    fn fetch(&self, name: &str) -> Result<String, FetchError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        self.modules
            .get(name)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(name.to_owned()))
    }
}
