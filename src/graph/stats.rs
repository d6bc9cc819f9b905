use std::collections::BTreeMap;

use serde::Serialize;

use crate::extract::{EdgeKind, FileModules};

use super::ProjectGraph;
use super::cycles::find_cycles;
use super::node::GraphNode;

/// Aggregated project statistics.
#[derive(Debug, Serialize)]
pub struct ProjectStats {
    pub file_count: usize,
    pub import_records: usize,
    pub export_records: usize,
    /// Names on the export surfaces of all files; `export *` adds none.
    pub exported_names: usize,
    pub edge_count: usize,
    /// Edge counts keyed by [`EdgeKind::as_str`]; every kind is present.
    pub edges_by_kind: BTreeMap<&'static str, usize>,
    pub type_only_edges: usize,
    pub asset_edges: usize,
    pub resolved_files: usize,
    pub packages: usize,
    pub assets: usize,
    pub unresolved: usize,
    pub cycles: usize,
    /// Files referencing CommonJS globals.
    pub commonjs_files: usize,
    /// Files skipped due to read or parse errors.
    pub skipped: usize,
}

/// Compute statistics from the per-file extraction output and the built graph.
pub fn project_stats(files: &[FileModules], graph: &ProjectGraph, skipped: usize) -> ProjectStats {
    let mut edges_by_kind: BTreeMap<&'static str, usize> =
        EdgeKind::all().iter().map(|k| (k.as_str(), 0)).collect();

    let mut stats = ProjectStats {
        file_count: files.len(),
        import_records: 0,
        export_records: 0,
        exported_names: 0,
        edge_count: 0,
        edges_by_kind: BTreeMap::new(),
        type_only_edges: 0,
        asset_edges: 0,
        resolved_files: 0,
        packages: graph.package_count(),
        assets: graph.asset_count(),
        unresolved: graph.unresolved_count(),
        cycles: find_cycles(graph).len(),
        commonjs_files: files.iter().filter(|m| !m.commonjs.is_empty()).count(),
        skipped,
    };

    for modules in files {
        stats.import_records += modules.imports().count();
        for export in modules.exports() {
            stats.export_records += 1;
            stats.exported_names += export.exported_names().len();
        }
        for edge in &modules.edges {
            stats.edge_count += 1;
            *edges_by_kind.entry(edge.edge_kind.as_str()).or_insert(0) += 1;
            stats.type_only_edges += usize::from(edge.type_only);
            stats.asset_edges += usize::from(edge.is_asset);
        }
    }

    stats.resolved_files = graph
        .graph
        .edge_indices()
        .filter_map(|e| graph.graph.edge_endpoints(e))
        .filter(|&(_, to)| matches!(graph.graph[to], GraphNode::File { .. }))
        .count();
    stats.edges_by_kind = edges_by_kind;
    stats
}
