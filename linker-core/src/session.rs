//! Builds the dependency graph for one resolve call.
//!
//! The depth-first walk runs on an explicit frame stack instead of recursion, so long import
//! chains cannot exhaust the thread's stack. The registry, cycle guard and graph all live in
//! the [`Session`] and are dropped together when the call returns, success or not.

use crate::cycle::CycleGuard;
use crate::fetcher::ModuleFetcher;
use crate::graph::{DependencyGraph, NodeId};
use crate::registry::ModuleRegistry;
use crate::scanner::{self, PendingImport, ScanOptions, ScannedModule, ROOT_MODULE};
use crate::ResolveError;

/// Counters collected while building a graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ResolveStats {
    /// Distinct modules in the graph, root included.
    pub modules: usize,
    /// Calls made to the fetcher.
    pub fetches: usize,
    /// Import edges, repeated imports included.
    pub edges: usize,
    /// Deepest chain of nested imports, root included.
    pub max_depth: usize,
}

struct Frame {
    node: NodeId,
    imports: Vec<PendingImport>,
    next: usize,
}

/// State of one resolve call.
pub struct Session<'f, F: ModuleFetcher + ?Sized> {
    fetcher: &'f F,
    options: ScanOptions,
    graph: DependencyGraph,
    registry: ModuleRegistry,
    guard: CycleGuard,
    stats: ResolveStats,
}

impl<'f, F: ModuleFetcher + ?Sized> Session<'f, F> {
    /// Starts an empty session reading modules from `fetcher`.
    pub fn new(fetcher: &'f F, options: ScanOptions) -> Self {
        Self {
            fetcher,
            options,
            graph: DependencyGraph::new(),
            registry: ModuleRegistry::new(),
            guard: CycleGuard::new(),
            stats: ResolveStats::default(),
        }
    }

    /// Scans `root_text` as the root module and links every module reachable from it.
    ///
    /// # Errors
    ///
    /// Any fetch, scan or cycle failure. The partially built graph is discarded.
    pub fn build(
        mut self,
        root_text: &str,
    ) -> Result<(DependencyGraph, ResolveStats), ResolveError> {
        let root = scanner::scan(root_text, ROOT_MODULE, self.options)?;
        let (root_id, imports) = self.register(root);
        let mut stack = vec![Frame {
            node: root_id,
            imports,
            next: 0,
        }];
        self.stats.max_depth = 1;

        while let Some(frame) = stack.last_mut() {
            let importer = frame.node;
            let next = frame.imports.get(frame.next).cloned();
            frame.next += 1;

            let Some(import) = next else {
                stack.pop();
                self.guard.leave();
                continue;
            };

            let (target, pending) = self.resolve_name(&import.name, importer)?;
            self.graph.add_edge(importer, import.offset, target);
            if let Some(imports) = pending {
                stack.push(Frame {
                    node: target,
                    imports,
                    next: 0,
                });
                self.stats.max_depth = self.stats.max_depth.max(self.guard.depth());
            }
        }

        self.stats.modules = self.registry.len();
        self.stats.edges = self.graph.edge_count();
        log::debug!(
            "Built import graph: {} modules, {} edges, {} fetches, depth {}",
            self.stats.modules,
            self.stats.edges,
            self.stats.fetches,
            self.stats.max_depth
        );
        Ok((self.graph, self.stats))
    }

    /// Returns the node for `name`, fetching and scanning it on first use.
    /// A freshly scanned module comes back with its still-pending imports.
    fn resolve_name(
        &mut self,
        name: &str,
        importer: NodeId,
    ) -> Result<(NodeId, Option<Vec<PendingImport>>), ResolveError> {
        self.guard.check(name)?;
        if let Some(id) = self.registry.get(name) {
            log::trace!("'{}' already loaded, linking existing node", name);
            return Ok((id, None));
        }

        let text = self
            .fetcher
            .fetch(name)
            .map_err(|source| ResolveError::ModuleNotFound {
                name: name.to_owned(),
                imported_by: self.graph.node(importer).name.clone(),
                source,
            })?;
        self.stats.fetches += 1;
        log::debug!(
            "Fetched '{}' ({} bytes), imported by '{}'",
            name,
            text.len(),
            self.graph.node(importer).name
        );

        let scanned = scanner::scan(&text, name, self.options)?;
        let (id, imports) = self.register(scanned);
        Ok((id, Some(imports)))
    }

    /// Adds the module to the graph and the registry, and marks it in progress. This happens
    /// before any of its own imports are looked at, so an import leading back to it is seen
    /// as a cycle.
    fn register(&mut self, mut scanned: ScannedModule) -> (NodeId, Vec<PendingImport>) {
        let imports = std::mem::take(&mut scanned.imports);
        let name = scanned.name.clone();
        let id = self.graph.add_node(scanned);
        self.registry.register(&name, id);
        self.guard.enter(&name);
        (id, imports)
    }
}

/// Builds the import graph of `root_text` in a fresh session.
///
/// # Errors
///
/// See [`Session::build`].
pub fn build_graph<F: ModuleFetcher + ?Sized>(
    root_text: &str,
    fetcher: &F,
    options: ScanOptions,
) -> Result<(DependencyGraph, ResolveStats), ResolveError> {
    Session::new(fetcher, options).build(root_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::FetchError;
    use mockall::mock;
    use std::collections::HashMap;

    mock! {
        pub Fetcher {}
        impl ModuleFetcher for Fetcher {
            fn fetch(&self, name: &str) -> Result<String, FetchError>;
        }
    }

    fn modules(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(name, text)| ((*name).to_string(), (*text).to_string()))
            .collect()
    }

    fn names(graph: &DependencyGraph) -> Vec<&str> {
        graph.iter().map(|(_, n)| n.name.as_str()).collect()
    }

    #[test]
    fn test_diamond_fetches_shared_module_once() {
        let mut fetcher = MockFetcher::new();
        fetcher.expect_fetch().times(3).returning(|name| match name {
            "a" => Ok("#import \"common\"\nfloat a;\n".to_string()),
            "b" => Ok("#import \"common\"\nfloat b;\n".to_string()),
            "common" => Ok("float c;\n".to_string()),
            other => Err(FetchError::NotFound(other.to_string())),
        });

        let (graph, stats) = build_graph(
            "#import \"a\"\n#import \"b\"\nvoid main(){}\n",
            &fetcher,
            ScanOptions::default(),
        )
        .unwrap();

        assert_eq!(names(&graph), vec!["[main]", "a", "common", "b"]);
        assert_eq!(stats.fetches, 3);
        assert_eq!(stats.modules, 4);
        assert_eq!(stats.edges, 4);
        assert_eq!(stats.max_depth, 3);
        assert_eq!(graph.importers(NodeId(2)).collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_edges_keep_source_order_and_offsets() {
        let fetcher = modules(&[("x", "X\n"), ("y", "Y\n")]);
        let (graph, _) = build_graph(
            "head\n#import \"y\"\nmid\n#import \"x\"\n",
            &fetcher,
            ScanOptions::default(),
        )
        .unwrap();

        let root = graph.node(NodeId(0));
        let linked: Vec<_> = root
            .dependencies
            .iter()
            .map(|e| (graph.node(e.target).name.as_str(), e.offset))
            .collect();
        assert_eq!(linked, vec![("y", 5), ("x", 9)]);
    }

    #[test]
    fn test_self_import_fetches_nothing_else() {
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch()
            .times(1)
            .returning(|_| Ok("#import \"other\"\n#import \"a\"\n".to_string()));

        let err = build_graph("#import \"a\"\n", &fetcher, ScanOptions::default()).unwrap_err();
        assert!(matches!(err, ResolveError::SelfImport { module } if module == "a"));
    }

    #[test]
    fn test_root_self_import_never_fetches() {
        let mut fetcher = MockFetcher::new();
        fetcher.expect_fetch().never();

        let err =
            build_graph("#import \"[main]\"\n", &fetcher, ScanOptions::default()).unwrap_err();
        assert!(matches!(err, ResolveError::SelfImport { module } if module == ROOT_MODULE));
    }

    #[test]
    fn test_indirect_cycle_reports_path() {
        let fetcher = modules(&[("A", "#import \"B\"\n"), ("B", "#import \"A\"\n")]);
        let err = build_graph("#import \"A\"\n", &fetcher, ScanOptions::default()).unwrap_err();

        match err {
            ResolveError::CircularDependency { path } => assert_eq!(path, vec!["A", "B", "A"]),
            other => panic!("Expected CircularDependency, got {other:?}"),
        }
    }

    #[test]
    fn test_cycle_through_root() {
        let fetcher = modules(&[("A", "#import \"[main]\"\n")]);
        let err = build_graph("#import \"A\"\n", &fetcher, ScanOptions::default()).unwrap_err();

        match err {
            ResolveError::CircularDependency { path } => {
                assert_eq!(path, vec!["[main]", "A", "[main]"]);
            }
            other => panic!("Expected CircularDependency, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_module_names_importer() {
        let fetcher = modules(&[("a", "#import \"missing\"\n")]);
        let err = build_graph("#import \"a\"\n", &fetcher, ScanOptions::default()).unwrap_err();

        match err {
            ResolveError::ModuleNotFound {
                name, imported_by, ..
            } => {
                assert_eq!(name, "missing");
                assert_eq!(imported_by, "a");
            }
            other => panic!("Expected ModuleNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_deep_chain_does_not_recurse() {
        const DEPTH: usize = 20_000;
        let mut fetcher = HashMap::new();
        for i in 0..DEPTH {
            fetcher.insert(format!("m{i}"), format!("#import \"m{}\"\nfloat v{i};\n", i + 1));
        }
        fetcher.insert(format!("m{DEPTH}"), "float last;\n".to_string());

        let (graph, stats) =
            build_graph("#import \"m0\"\n", &fetcher, ScanOptions::default()).unwrap();
        assert_eq!(graph.len(), DEPTH + 2);
        assert_eq!(stats.max_depth, DEPTH + 2);
    }
}
