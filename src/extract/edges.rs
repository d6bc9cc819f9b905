use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::trace;

use crate::{Error, Result};

use super::assets::classify_asset;
use super::extensions::ExtensionTable;
use super::records::{ExportForm, ModuleRecord};
use super::specifier::{ResolvedSpecifier, join_normalized};

/// How the source file depends on the edge target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    StaticImport,
    DynamicImport,
    ReexportAll,
    ReexportNamed,
    ReexportNamespace,
    SideEffect,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::StaticImport => "static_import",
            EdgeKind::DynamicImport => "dynamic_import",
            EdgeKind::ReexportAll => "reexport_all",
            EdgeKind::ReexportNamed => "reexport_named",
            EdgeKind::ReexportNamespace => "reexport_namespace",
            EdgeKind::SideEffect => "side_effect",
        }
    }

    pub fn all() -> &'static [EdgeKind] {
        &[
            EdgeKind::StaticImport,
            EdgeKind::DynamicImport,
            EdgeKind::ReexportAll,
            EdgeKind::ReexportNamed,
            EdgeKind::ReexportNamespace,
            EdgeKind::SideEffect,
        ]
    }
}

/// A directed dependency from one file to a normalized specifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleGraphEdge {
    pub from_file: PathBuf,
    pub resolved_specifier: ResolvedSpecifier,
    pub edge_kind: EdgeKind,
    /// Set when every occurrence of this edge is type-only; the edge can be dropped
    /// at emit time but still belongs to the type graph.
    pub type_only: bool,
    /// Route the target to an asset pipeline rather than a code-module one.
    pub is_asset: bool,
}

/// The file-system lookup a resolver must perform to satisfy an edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "request", rename_all = "snake_case")]
pub enum ResolutionRequest {
    /// Try these paths in order; the first existing file wins.
    File { candidates: Vec<PathBuf> },
    /// Resolve through the package manager's layout.
    Package { name: String, subpath: Option<String> },
}

impl ModuleGraphEdge {
    /// Build the lookup request for this edge's target.
    ///
    /// Relative targets with an explicit extension try exactly one path.
    /// Extensionless targets try `<path>.<ext>` for each module extension of
    /// `table`, then `<path>/index.<ext>`. Directory targets try index files only.
    pub fn resolution_request(&self, table: &ExtensionTable) -> ResolutionRequest {
        let spec = &self.resolved_specifier;
        if spec.is_bare() {
            let (name, subpath) = split_package(&spec.normalized_path);
            return ResolutionRequest::Package { name, subpath };
        }

        let base_dir = self.from_file.parent().unwrap_or(Path::new(""));
        let target = join_normalized(base_dir, &spec.normalized_path);

        let candidates = if spec.has_explicit_extension {
            vec![target]
        } else {
            let index = target.join("index");
            let files = if spec.is_directory() {
                Vec::new()
            } else {
                table.module_extensions().map(|ext| with_suffix(&target, ext)).collect()
            };
            files
                .into_iter()
                .chain(table.module_extensions().map(|ext| with_suffix(&index, ext)))
                .collect()
        };

        ResolutionRequest::File { candidates }
    }
}

fn with_suffix(path: &Path, ext: &str) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

/// Split a bare specifier into package name and subpath (`@scope/pkg/sub` →
/// `@scope/pkg` + `sub`).
fn split_package(specifier: &str) -> (String, Option<String>) {
    let name_segments = if specifier.starts_with('@') { 2 } else { 1 };
    let mut parts = specifier.splitn(name_segments + 1, '/');
    let name: Vec<&str> = parts.by_ref().take(name_segments).collect();
    let subpath = parts.next().filter(|s| !s.is_empty()).map(str::to_owned);
    (name.join("/"), subpath)
}

/// The edge a record contributes, if any.
///
/// Declarations and local export lists contribute none. A re-export form that needs
/// a specifier but lacks one, or a declaration that carries one, is a broken upstream
/// contract and fails the whole file.
fn record_edge<'a>(
    record: &'a ModuleRecord,
    file: &Path,
) -> Result<Option<(&'a ResolvedSpecifier, EdgeKind, bool)>> {
    match record {
        ModuleRecord::Import(import) => {
            let kind = if import.dynamic {
                EdgeKind::DynamicImport
            } else if import.side_effect_only {
                EdgeKind::SideEffect
            } else {
                EdgeKind::StaticImport
            };
            Ok(Some((&import.specifier, kind, import.type_only)))
        }
        ModuleRecord::Export(export) => {
            let kind = match export.form {
                ExportForm::ReexportAll => Some(EdgeKind::ReexportAll),
                ExportForm::ReexportAllAsNamespace(_) => Some(EdgeKind::ReexportNamespace),
                ExportForm::ReexportNamed(_) | ExportForm::ReexportEmpty => {
                    Some(EdgeKind::ReexportNamed)
                }
                ExportForm::Declaration(_) => None,
            };

            match (kind, &export.specifier) {
                (Some(kind), Some(spec)) => Ok(Some((spec, kind, export.type_only))),
                (None, None) => Ok(None),
                (Some(_), None) if matches!(export.form, ExportForm::ReexportNamed(_)) => Ok(None),
                (Some(_), None) => Err(Error::MissingSpecifier {
                    file: file.to_path_buf(),
                    form: export.form.name(),
                }),
                (None, Some(spec)) => Err(Error::UnexpectedSpecifier {
                    file: file.to_path_buf(),
                    specifier: spec.normalized_path.clone(),
                }),
            }
        }
    }
}

struct PendingEdge<'a> {
    specifier: &'a ResolvedSpecifier,
    kind: EdgeKind,
    type_only: bool,
}

/// Build the ordered, deduplicated edge list of one file.
///
/// The first occurrence of each `(normalized path, edge kind)` pair fixes its
/// position; later occurrences only clear the type-only flag when they are
/// runtime-significant.
pub fn build_edges(
    file: &Path,
    records: &[ModuleRecord],
    table: &ExtensionTable,
) -> Result<Vec<ModuleGraphEdge>> {
    let mut pending: Vec<PendingEdge> = Vec::new();
    let mut seen: HashMap<(&str, EdgeKind), usize> = HashMap::new();

    for record in records {
        let Some((specifier, kind, type_only)) = record_edge(record, file)? else {
            continue;
        };

        match seen.entry((specifier.normalized_path.as_str(), kind)) {
            Entry::Occupied(slot) => {
                trace!(
                    target_path = %specifier.normalized_path,
                    kind = kind.as_str(),
                    "merging duplicate edge"
                );
                let edge = &mut pending[*slot.get()];
                edge.type_only &= type_only;
            }
            Entry::Vacant(slot) => {
                slot.insert(pending.len());
                pending.push(PendingEdge {
                    specifier,
                    kind,
                    type_only,
                });
            }
        }
    }

    Ok(pending
        .into_iter()
        .map(|edge| ModuleGraphEdge {
            from_file: file.to_path_buf(),
            resolved_specifier: edge.specifier.clone(),
            edge_kind: edge.kind,
            type_only: edge.type_only,
            is_asset: classify_asset(edge.specifier, table).is_asset,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::records::{ExportRecord, ImportBindingSet, ImportRecord};
    use crate::extract::specifier::normalize_specifier;

    const FILE: &str = "src/index.ts";

    fn import(raw: &str, dynamic: bool, side_effect_only: bool, type_only: bool) -> ModuleRecord {
        let specifier = normalize_specifier(raw, Path::new(FILE), &ExtensionTable::default());
        ModuleRecord::Import(ImportRecord {
            raw_specifier: raw.into(),
            specifier,
            bindings: if side_effect_only || dynamic {
                ImportBindingSet::None
            } else {
                ImportBindingSet::Default("x".into())
            },
            dynamic,
            side_effect_only,
            type_only,
        })
    }

    fn export(raw: Option<&str>, form: ExportForm) -> ModuleRecord {
        ModuleRecord::Export(ExportRecord {
            specifier: raw
                .map(|r| normalize_specifier(r, Path::new(FILE), &ExtensionTable::default())),
            form,
            type_only: false,
        })
    }

    fn build(records: &[ModuleRecord]) -> Vec<ModuleGraphEdge> {
        build_edges(Path::new(FILE), records, &ExtensionTable::default()).unwrap()
    }

    #[test]
    fn test_duplicate_side_effect_imports_collapse() {
        let edges = build(&[
            import("./file", false, true, false),
            import("./file", false, true, false),
        ]);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].edge_kind, EdgeKind::SideEffect);
    }

    #[test]
    fn test_distinct_paths_stay_distinct() {
        let edges = build(&[
            import("./file", false, true, false),
            import("./file.mjs", false, true, false),
        ]);
        assert_eq!(edges.len(), 2);
    }

    #[test]
    fn test_equivalent_surface_forms_share_an_edge() {
        let edges = build(&[
            import("./file", false, false, false),
            import("./file/../file", false, false, false),
        ]);
        assert_eq!(edges.len(), 1);
    }

    #[test]
    fn test_static_and_dynamic_edges_are_separate() {
        let edges = build(&[
            import("./nested/file", false, false, false),
            import("./nested/file", true, false, false),
        ]);
        let kinds: Vec<EdgeKind> = edges.iter().map(|e| e.edge_kind).collect();
        assert_eq!(kinds, vec![EdgeKind::StaticImport, EdgeKind::DynamicImport]);
    }

    #[test]
    fn test_type_only_merge_prefers_runtime() {
        let edges = build(&[
            import("./types", false, false, true),
            import("./types", false, false, false),
        ]);
        assert_eq!(edges.len(), 1);
        assert!(!edges[0].type_only);

        let edges = build(&[
            import("./types", false, false, true),
            import("./types", false, false, true),
        ]);
        assert!(edges[0].type_only);
    }

    #[test]
    fn test_first_occurrence_keeps_position() {
        let edges = build(&[
            import("./a", false, false, false),
            import("./b", false, false, false),
            import("./a", false, false, false),
        ]);
        let paths: Vec<&str> = edges
            .iter()
            .map(|e| e.resolved_specifier.normalized_path.as_str())
            .collect();
        assert_eq!(paths, vec!["./a", "./b"]);
    }

    #[test]
    fn test_export_edge_kinds() {
        let edges = build(&[
            export(Some("./all"), ExportForm::ReexportAll),
            export(Some("./ns"), ExportForm::ReexportAllAsNamespace("ns".into())),
            export(Some("./named"), ExportForm::ReexportNamed(vec![])),
            export(Some("./empty"), ExportForm::ReexportEmpty),
            export(None, ExportForm::ReexportNamed(vec![])),
            export(None, ExportForm::Declaration(vec!["f".into()])),
        ]);
        let kinds: Vec<EdgeKind> = edges.iter().map(|e| e.edge_kind).collect();
        assert_eq!(
            kinds,
            vec![
                EdgeKind::ReexportAll,
                EdgeKind::ReexportNamespace,
                EdgeKind::ReexportNamed,
                EdgeKind::ReexportNamed,
            ]
        );
    }

    #[test]
    fn test_reexport_all_without_specifier_is_contract_breach() {
        let result = build_edges(
            Path::new(FILE),
            &[export(None, ExportForm::ReexportAll)],
            &ExtensionTable::default(),
        );
        assert!(matches!(result, Err(Error::MissingSpecifier { form: "reexport_all", .. })));
    }

    #[test]
    fn test_declaration_with_specifier_is_contract_breach() {
        let result = build_edges(
            Path::new(FILE),
            &[export(Some("./x"), ExportForm::Declaration(vec![]))],
            &ExtensionTable::default(),
        );
        assert!(matches!(result, Err(Error::UnexpectedSpecifier { .. })));
    }

    #[test]
    fn test_asset_flag_on_edge() {
        let edges = build(&[import("../icons/add.svg", false, false, false)]);
        assert!(edges[0].is_asset);
        assert_eq!(edges[0].edge_kind, EdgeKind::StaticImport);
    }

    #[test]
    fn test_resolution_request_candidates() {
        let table = ExtensionTable::default();
        let edges = build(&[
            import("./file", false, false, false),
            import("./file.mjs", false, false, false),
            import(".", false, false, false),
            import("@scope/pkg/sub/path", false, false, false),
            import("react", false, false, false),
        ]);

        match edges[0].resolution_request(&table) {
            ResolutionRequest::File { candidates } => {
                assert_eq!(candidates[0], PathBuf::from("src/file.ts"));
                assert!(candidates.contains(&PathBuf::from("src/file/index.ts")));
                assert!(!candidates.iter().any(|c| c.to_string_lossy().ends_with(".css")));
            }
            other => panic!("expected file request, got {:?}", other),
        }
        assert_eq!(
            edges[1].resolution_request(&table),
            ResolutionRequest::File {
                candidates: vec![PathBuf::from("src/file.mjs")]
            }
        );
        match edges[2].resolution_request(&table) {
            ResolutionRequest::File { candidates } => {
                assert_eq!(candidates[0], PathBuf::from("src/index.ts"));
            }
            other => panic!("expected file request, got {:?}", other),
        }
        assert_eq!(
            edges[3].resolution_request(&table),
            ResolutionRequest::Package {
                name: "@scope/pkg".into(),
                subpath: Some("sub/path".into())
            }
        );
        assert_eq!(
            edges[4].resolution_request(&table),
            ResolutionRequest::Package {
                name: "react".into(),
                subpath: None
            }
        );
    }
}
