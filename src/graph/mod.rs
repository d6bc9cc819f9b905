pub mod cycles;
pub mod edge;
pub mod node;
pub mod resolver;
pub mod stats;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use oxc_resolver::Resolver;
use petgraph::Directed;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use tracing::{debug, trace};

use crate::extract::specifier::join_normalized;
use crate::extract::{
    ExtensionKind, ExtensionTable, FileModules, ModuleGraphEdge, ResolutionRequest,
};

use edge::Dependency;
use node::GraphNode;
use resolver::{ResolutionOutcome, resolve_specifier};

/// Lexically normalized form of a path, used as the lookup key for file nodes.
fn path_key(path: &Path) -> PathBuf {
    join_normalized(path, "")
}

/// The project-wide dependency graph: a directed petgraph StableGraph with O(1)
/// lookup indexes per node family.
pub struct ProjectGraph {
    pub graph: StableGraph<GraphNode, Dependency, Directed>,
    /// Parsed files by normalized path.
    pub file_index: HashMap<PathBuf, NodeIndex>,
    package_index: HashMap<String, NodeIndex>,
    asset_index: HashMap<PathBuf, NodeIndex>,
    unresolved_index: HashMap<PathBuf, NodeIndex>,
}

impl ProjectGraph {
    pub fn new() -> Self {
        Self {
            graph: StableGraph::new(),
            file_index: HashMap::new(),
            package_index: HashMap::new(),
            asset_index: HashMap::new(),
            unresolved_index: HashMap::new(),
        }
    }

    /// Build the graph from every file's extraction output.
    ///
    /// Each edge target goes through `resolver` first. A resolved path that was
    /// parsed becomes a file edge, any other file on disk an asset. Bare targets the
    /// resolver cannot map to a parsed file are packages. Relative targets missing
    /// on disk still match a parsed file through the edge's [`ResolutionRequest`]
    /// candidates, otherwise they are unresolved.
    pub fn build(files: &[FileModules], table: &ExtensionTable, resolver: &Resolver) -> Self {
        let mut graph = Self::new();
        for modules in files {
            graph.add_file(&modules.file);
        }
        for modules in files {
            let from = graph.add_file(&modules.file);
            for edge in &modules.edges {
                let target = graph.resolve(edge, table, resolver);
                graph.add_dependency(from, target, edge);
            }
        }
        debug!(
            files = graph.file_count(),
            nodes = graph.graph.node_count(),
            edges = graph.graph.edge_count(),
            "built project graph"
        );
        graph
    }

    /// Add a parsed file node. If the file has already been added, returns the existing index.
    pub fn add_file(&mut self, path: &Path) -> NodeIndex {
        let key = path_key(path);
        if let Some(&existing) = self.file_index.get(&key) {
            return existing;
        }
        let idx = self.graph.add_node(GraphNode::File { path: key.clone() });
        self.file_index.insert(key, idx);
        idx
    }

    pub fn add_package(&mut self, name: &str) -> NodeIndex {
        if let Some(&existing) = self.package_index.get(name) {
            return existing;
        }
        let idx = self.graph.add_node(GraphNode::Package {
            name: name.to_owned(),
        });
        self.package_index.insert(name.to_owned(), idx);
        idx
    }

    pub fn add_asset(&mut self, path: PathBuf, table: &ExtensionTable) -> NodeIndex {
        if let Some(&existing) = self.asset_index.get(&path) {
            return existing;
        }
        let kind = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(|e| table.get(e))
            .and_then(|k| match k {
                ExtensionKind::Asset(kind) => Some(kind),
                ExtensionKind::Module(_) => None,
            });
        let idx = self.graph.add_node(GraphNode::Asset {
            path: path.clone(),
            kind,
        });
        self.asset_index.insert(path, idx);
        idx
    }

    /// Add an unresolved target keyed by the path it would have had.
    pub fn add_unresolved(&mut self, key: PathBuf, specifier: &str) -> NodeIndex {
        if let Some(&existing) = self.unresolved_index.get(&key) {
            return existing;
        }
        let idx = self.graph.add_node(GraphNode::Unresolved {
            specifier: specifier.to_owned(),
        });
        self.unresolved_index.insert(key, idx);
        idx
    }

    pub fn add_dependency(&mut self, from: NodeIndex, to: NodeIndex, edge: &ModuleGraphEdge) {
        self.graph.add_edge(
            from,
            to,
            Dependency {
                kind: edge.edge_kind,
                specifier: edge.resolved_specifier.normalized_path.clone(),
                type_only: edge.type_only,
            },
        );
    }

    fn resolve(
        &mut self,
        edge: &ModuleGraphEdge,
        table: &ExtensionTable,
        resolver: &Resolver,
    ) -> NodeIndex {
        let specifier = &edge.resolved_specifier.normalized_path;
        let outcome = resolve_specifier(resolver, &edge.from_file, specifier);

        if let ResolutionOutcome::Resolved(path) = &outcome {
            let key = path_key(path);
            if let Some(&idx) = self.file_index.get(&key) {
                return idx;
            }
            if !edge.resolved_specifier.is_bare() {
                return self.add_asset(key, table);
            }
        }

        match edge.resolution_request(table) {
            ResolutionRequest::Package { name, .. } => self.add_package(&name),
            ResolutionRequest::File { candidates } => {
                if let Some(&idx) = candidates.iter().find_map(|c| self.file_index.get(c)) {
                    return idx;
                }
                trace!(
                    from = %edge.from_file.display(),
                    specifier = %specifier,
                    outcome = ?outcome,
                    "unresolved"
                );
                let key = candidates.into_iter().next().unwrap_or_default();
                self.add_unresolved(key, specifier)
            }
        }
    }

    /// Number of parsed file nodes.
    pub fn file_count(&self) -> usize {
        self.file_index.len()
    }

    pub fn package_count(&self) -> usize {
        self.package_index.len()
    }

    pub fn asset_count(&self) -> usize {
        self.asset_index.len()
    }

    pub fn unresolved_count(&self) -> usize {
        self.unresolved_index.len()
    }
}

impl Default for ProjectGraph {
    fn default() -> Self {
        Self::new()
    }
}
