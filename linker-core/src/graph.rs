use crate::scanner::ScannedModule;

/// Handle of a node inside a [`DependencyGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Directed edge from a dependent to one of its dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// Byte offset into the dependent's body where the dependency's text is spliced.
    pub offset: usize,
    /// The imported module.
    pub target: NodeId,
}

/// One module's parsed content.
///
/// `body` never contains another module's text; dependencies are edges into the node table
/// and text is only copied when a resolver walks the graph.
#[derive(Debug, Clone)]
pub struct Node {
    /// Module name as written in the import.
    pub name: String,
    /// Text left after scanning, with splice points recorded in the edges.
    pub body: String,
    /// The module's own `#extension` lines.
    pub extensions: Vec<String>,
    /// Edges in the order the imports appear in the source.
    pub dependencies: Vec<Edge>,
    /// Modules importing this one. Bookkeeping for diagnostics only.
    pub dependents: Vec<NodeId>,
}

/// Arena of nodes plus the edges between them, scoped to one resolve call.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    nodes: Vec<Node>,
}

impl DependencyGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves a scanned module into the arena. Its imports are not linked here.
    pub fn add_node(&mut self, scanned: ScannedModule) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: scanned.name,
            body: scanned.body,
            extensions: scanned.extensions,
            dependencies: Vec::new(),
            dependents: Vec::new(),
        });
        id
    }

    /// Records that `from` imports `to` at `offset` of `from`'s body.
    ///
    /// # Panics
    ///
    /// If either handle does not belong to this graph.
    pub fn add_edge(&mut self, from: NodeId, offset: usize, to: NodeId) {
        self.nodes[from.0].dependencies.push(Edge { offset, target: to });
        let dependents = &mut self.nodes[to.0].dependents;
        if !dependents.contains(&from) {
            dependents.push(from);
        }
    }

    /// # Panics
    ///
    /// If `id` does not belong to this graph.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// The first node added is the root of the session.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        (!self.nodes.is_empty()).then_some(NodeId(0))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.dependencies.len()).sum()
    }

    /// Every node with its handle, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Names of the modules importing `id`, in the order the edges were added.
    pub fn importers(&self, id: NodeId) -> impl Iterator<Item = &str> {
        self.node(id)
            .dependents
            .iter()
            .map(|d| self.nodes[d.0].name.as_str())
    }
}
