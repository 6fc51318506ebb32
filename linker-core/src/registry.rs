use crate::graph::NodeId;
use std::collections::HashMap;

/// Maps module names to the nodes already created for them in the current session,
/// so a name is fetched and scanned at most once per resolve call.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    by_name: HashMap<String, NodeId>,
}

impl ModuleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Node already created for `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    /// Registers `name`. Returns the previous handle if the name was already known.
    pub fn register(&mut self, name: &str, id: NodeId) -> Option<NodeId> {
        self.by_name.insert(name.to_owned(), id)
    }

    /// Number of distinct modules registered so far, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
