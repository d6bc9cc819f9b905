use std::collections::HashMap;
use std::path::PathBuf;

use petgraph::Directed;
use petgraph::algo::kosaraju_scc;
use petgraph::graph::Graph;
use petgraph::stable_graph::NodeIndex;
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use serde::Serialize;

use super::ProjectGraph;
use super::node::GraphNode;

/// A set of files forming a circular dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cycle {
    /// Files forming the cycle, ordered by path.
    /// The first file is repeated at the end to close the visual cycle.
    pub files: Vec<PathBuf>,
}

/// Detect circular dependencies between parsed files.
///
/// Runs Kosaraju's SCC algorithm on a file-only subgraph whose edges are eager
/// runtime dependencies: type-only edges are erased at emit time and `import()` is
/// deferred, so neither can cause an initialization-order cycle. SCCs with more than
/// one node, or a file importing itself, are reported.
///
/// Returns cycles sorted by their first file.
pub fn find_cycles(graph: &ProjectGraph) -> Vec<Cycle> {
    let mut file_graph: Graph<NodeIndex, (), Directed> = Graph::new();
    let mut orig_to_new: HashMap<NodeIndex, petgraph::graph::NodeIndex> = HashMap::new();

    for &orig_idx in graph.file_index.values() {
        let new_idx = file_graph.add_node(orig_idx);
        orig_to_new.insert(orig_idx, new_idx);
    }

    for edge_ref in graph.graph.edge_references() {
        if !edge_ref.weight().is_eager_runtime() {
            continue;
        }
        // Edges to packages, assets and unresolved targets have no mapping.
        if let (Some(&src), Some(&dst)) = (
            orig_to_new.get(&edge_ref.source()),
            orig_to_new.get(&edge_ref.target()),
        ) {
            file_graph.update_edge(src, dst, ());
        }
    }

    let mut cycles: Vec<Cycle> = kosaraju_scc(&file_graph)
        .into_iter()
        .filter(|scc| scc.len() > 1 || file_graph.contains_edge(scc[0], scc[0]))
        .filter_map(|scc| {
            let mut files: Vec<PathBuf> = scc
                .iter()
                .filter_map(|&new_idx| match &graph.graph[file_graph[new_idx]] {
                    GraphNode::File { path } => Some(path.clone()),
                    _ => None,
                })
                .collect();
            files.sort();
            let first = files.first()?.clone();
            files.push(first);
            Some(Cycle { files })
        })
        .collect();

    cycles.sort_by(|a, b| a.files[0].cmp(&b.files[0]));
    cycles
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use crate::ast::{ExportDecl, Expr, ImportDecl, ModuleItem, Stmt};
    use crate::extract::{ExtensionTable, Extractor, FileModules};
    use crate::graph::resolver::build_resolver;

    fn import(source: &str) -> ModuleItem {
        ModuleItem::Import(ImportDecl {
            source: source.into(),
            default: Some("x".into()),
            ..ImportDecl::default()
        })
    }

    fn file(path: &str, items: Vec<ModuleItem>) -> FileModules {
        Extractor::default().extract(Path::new(path), &items).unwrap()
    }

    fn cycles_of(files: Vec<FileModules>) -> Vec<Cycle> {
        let table = ExtensionTable::default();
        let resolver = build_resolver(Path::new("proj"), &table);
        find_cycles(&ProjectGraph::build(&files, &table, &resolver))
    }

    #[test]
    fn test_two_file_mutual_cycle_detected() {
        let cycles = cycles_of(vec![
            file("proj/a.ts", vec![import("./b")]),
            file("proj/b.ts", vec![import("./a")]),
        ]);
        assert_eq!(cycles.len(), 1);
        assert_eq!(
            cycles[0].files,
            vec![
                PathBuf::from("proj/a.ts"),
                PathBuf::from("proj/b.ts"),
                PathBuf::from("proj/a.ts"),
            ]
        );
    }

    #[test]
    fn test_three_file_cycle_through_reexport() {
        let cycles = cycles_of(vec![
            file("proj/a.ts", vec![import("./b")]),
            file(
                "proj/b.ts",
                vec![ModuleItem::Export(ExportDecl::All {
                    source: "./c".into(),
                    alias: None,
                    type_only: false,
                })],
            ),
            file("proj/c.ts", vec![import("./a")]),
        ]);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].files.len(), 4);
    }

    #[test]
    fn test_no_cycle_in_acyclic_graph() {
        let cycles = cycles_of(vec![
            file("proj/a.ts", vec![import("./b")]),
            file("proj/b.ts", vec![import("./c")]),
            file("proj/c.ts", vec![import("react")]),
        ]);
        assert!(cycles.is_empty());
    }

    #[test]
    fn test_type_only_and_dynamic_edges_excluded() {
        let type_import = ModuleItem::Import(ImportDecl {
            source: "./a".into(),
            type_only: true,
            default: Some("A".into()),
            ..ImportDecl::default()
        });
        let cycles = cycles_of(vec![
            file("proj/a.ts", vec![import("./b")]),
            file("proj/b.ts", vec![type_import]),
        ]);
        assert!(cycles.is_empty(), "type-only edges must not form cycles");

        let lazy = ModuleItem::Stmt(Stmt::Expr(Expr::import("./a").awaited()));
        let cycles = cycles_of(vec![
            file("proj/a.ts", vec![import("./b")]),
            file("proj/b.ts", vec![lazy]),
        ]);
        assert!(cycles.is_empty(), "import() must not form cycles");
    }

    #[test]
    fn test_self_import_is_a_cycle() {
        let cycles = cycles_of(vec![file("proj/a.ts", vec![import("./a")])]);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].files.len(), 2);
    }
}
