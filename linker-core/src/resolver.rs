//! Links a dependency graph into compilation sources.
//!
//! Both output modes share one depth-first traversal. The traversal owns the "already
//! injected" set: a module contributes its body at its first visit only, and every later
//! import of it gets the sink's placeholder instead. What happens to a module's text is up to
//! the [`Sink`]: [`FlattenSink`] splices dependencies inline, [`UnitSink`] stores each module
//! as its own named unit.

use crate::fetcher::ModuleFetcher;
use crate::graph::{DependencyGraph, Node, NodeId};
use crate::scanner::ScanOptions;
use crate::session::{build_graph, ResolveStats};
use crate::ResolveError;
use std::collections::{BTreeMap, HashSet};

/// Resolver settings shared by both modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Wrap each imported module's text in begin/end comment lines naming it.
    pub import_markers: bool,
}

impl From<ResolveOptions> for ScanOptions {
    fn from(options: ResolveOptions) -> Self {
        Self {
            import_markers: options.import_markers,
        }
    }
}

/// Output of flatten mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flattened {
    /// Hoisted extension block followed by the fully spliced root body.
    pub source: String,
    /// Distinct extension lines in first-seen order.
    pub extensions: Vec<String>,
    /// Counters of the graph build.
    pub stats: ResolveStats,
}

/// Output of multi-unit mode.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Units {
    /// Root extension lines followed by the root's own body.
    pub main: String,
    /// Every imported module's own body, exactly once, keyed by module name.
    pub units: BTreeMap<String, String>,
    /// Counters of the graph build.
    pub stats: ResolveStats,
}

/// Receives the modules of a traversal.
pub trait Sink {
    type Output;

    /// First visit of `node`, before any of its dependencies.
    fn enter(&mut self, node: &Node, is_root: bool);

    /// Text to put in place of a module that was already emitted.
    fn revisit(&mut self, node: &Node) -> String;

    /// All dependencies of `node` are done. `dependencies` holds their contributed text in
    /// edge order. Returns what `node` contributes to its importer.
    fn leave(&mut self, node: &Node, dependencies: Vec<String>, is_root: bool) -> String;

    /// Produces the final output from the root's contribution.
    fn finish(self, root: String, stats: ResolveStats) -> Self::Output;
}

struct Visit<'g> {
    id: NodeId,
    node: &'g Node,
    next: usize,
    parts: Vec<String>,
}

/// Walks `graph` from its root, feeding `sink`. Iterative, post-order on `leave`.
pub fn traverse<S: Sink>(graph: &DependencyGraph, sink: &mut S) -> String {
    let Some(root) = graph.root() else {
        return String::new();
    };
    let mut injected = HashSet::new();
    injected.insert(root);
    sink.enter(graph.node(root), true);
    let mut stack = vec![Visit {
        id: root,
        node: graph.node(root),
        next: 0,
        parts: Vec::new(),
    }];

    while let Some(visit) = stack.last_mut() {
        if let Some(edge) = visit.node.dependencies.get(visit.next).copied() {
            visit.next += 1;
            let dependency = graph.node(edge.target);
            if injected.insert(edge.target) {
                sink.enter(dependency, false);
                stack.push(Visit {
                    id: edge.target,
                    node: dependency,
                    next: 0,
                    parts: Vec::new(),
                });
            } else {
                let placeholder = sink.revisit(dependency);
                visit.parts.push(placeholder);
            }
            continue;
        }

        let Some(done) = stack.pop() else { break };
        let is_root = done.id == root;
        let text = sink.leave(done.node, done.parts, is_root);
        match stack.last_mut() {
            Some(parent) => parent.parts.push(text),
            None => return text,
        }
    }
    String::new()
}

fn push_unique(extensions: &mut Vec<String>, lines: &[String]) {
    for line in lines {
        if !extensions.contains(line) {
            extensions.push(line.clone());
        }
    }
}

/// Splices every dependency into a copy of the importing body.
#[derive(Debug, Default)]
pub struct FlattenSink {
    extensions: Vec<String>,
}

impl Sink for FlattenSink {
    type Output = Flattened;

    fn enter(&mut self, node: &Node, _is_root: bool) {
        push_unique(&mut self.extensions, &node.extensions);
    }

    fn revisit(&mut self, node: &Node) -> String {
        format!("// {} already injected above\n", node.name)
    }

    fn leave(&mut self, node: &Node, dependencies: Vec<String>, _is_root: bool) -> String {
        let mut body = node.body.clone();
        // Highest offset first, so the offsets still to come stay valid.
        for (edge, mut text) in node.dependencies.iter().zip(dependencies).rev() {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            log::trace!(
                "Splicing {} bytes into '{}' at {}",
                text.len(),
                node.name,
                edge.offset
            );
            body.insert_str(edge.offset, &text);
        }
        body
    }

    fn finish(self, root: String, stats: ResolveStats) -> Flattened {
        let mut source = self.extensions.concat();
        source.push_str(&root);
        Flattened {
            source,
            extensions: self.extensions,
            stats,
        }
    }
}

/// Records each module once under its name, without splicing.
#[derive(Debug, Default)]
pub struct UnitSink {
    root_extensions: Vec<String>,
    units: BTreeMap<String, String>,
}

impl Sink for UnitSink {
    type Output = Units;

    fn enter(&mut self, node: &Node, is_root: bool) {
        if is_root {
            push_unique(&mut self.root_extensions, &node.extensions);
        }
    }

    fn revisit(&mut self, _node: &Node) -> String {
        String::new()
    }

    fn leave(&mut self, node: &Node, _dependencies: Vec<String>, is_root: bool) -> String {
        if is_root {
            return node.body.clone();
        }
        let mut unit = node.extensions.concat();
        unit.push_str(&node.body);
        self.units.insert(node.name.clone(), unit);
        String::new()
    }

    fn finish(self, root: String, stats: ResolveStats) -> Units {
        let mut main = self.root_extensions.concat();
        main.push_str(&root);
        Units {
            main,
            units: self.units,
            stats,
        }
    }
}

/// Entry point for both resolve modes.
///
/// Each call builds its own session (registry, cycle guard and graph), so one `Resolver`
/// can serve concurrent calls for different roots without locking.
#[derive(Debug, Clone, Copy, Default)]
pub struct Resolver {
    options: ResolveOptions,
}

impl Resolver {
    /// Creates a resolver applying `options` to every call.
    pub const fn new(options: ResolveOptions) -> Self {
        Self { options }
    }

    /// Flattens `root_text` and everything it imports into one source.
    ///
    /// # Errors
    ///
    /// Any [`ResolveError`]; no partial output is produced.
    pub fn resolve_flatten<F: ModuleFetcher + ?Sized>(
        &self,
        root_text: &str,
        fetcher: &F,
    ) -> Result<Flattened, ResolveError> {
        self.run(root_text, fetcher, FlattenSink::default())
    }

    /// Produces the root unit plus one named unit per imported module.
    ///
    /// # Errors
    ///
    /// Any [`ResolveError`]; no partial output is produced.
    pub fn resolve_units<F: ModuleFetcher + ?Sized>(
        &self,
        root_text: &str,
        fetcher: &F,
    ) -> Result<Units, ResolveError> {
        self.run(root_text, fetcher, UnitSink::default())
    }

    fn run<F: ModuleFetcher + ?Sized, S: Sink>(
        &self,
        root_text: &str,
        fetcher: &F,
        mut sink: S,
    ) -> Result<S::Output, ResolveError> {
        let (graph, stats) = build_graph(root_text, fetcher, self.options.into())?;
        let root = traverse(&graph, &mut sink);
        log::info!(
            "Resolved {} modules ({} fetched)",
            stats.modules,
            stats.fetches
        );
        Ok(sink.finish(root, stats))
    }
}

/// Flattens with default options and returns only the source text.
///
/// # Errors
///
/// See [`Resolver::resolve_flatten`].
pub fn resolve_flatten<F: ModuleFetcher + ?Sized>(
    root_text: &str,
    fetcher: &F,
) -> Result<String, ResolveError> {
    Resolver::default()
        .resolve_flatten(root_text, fetcher)
        .map(|flattened| flattened.source)
}

/// Splits into units with default options.
///
/// # Errors
///
/// See [`Resolver::resolve_units`].
pub fn resolve_units<F: ModuleFetcher + ?Sized>(
    root_text: &str,
    fetcher: &F,
) -> Result<Units, ResolveError> {
    Resolver::default().resolve_units(root_text, fetcher)
}
