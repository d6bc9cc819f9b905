//! Import/export extraction.
//!
//! Per file: classify module items into raw declarations, normalize their specifiers,
//! resolve export bindings, then collapse the records into an ordered, deduplicated
//! edge list. Every stage is a pure function of its input, so an [`Extractor`] can be
//! shared across rayon workers.

pub mod assets;
pub mod classify;
pub mod edges;
pub mod exports;
pub mod extensions;
pub mod records;
pub mod specifier;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::ast::{CommonJsUsage, ModuleItem};

pub use assets::{AssetClass, classify_asset};
pub use classify::{
    ClassifiedDeclaration, RawDeclaration, StatementKind, classify_module, commonjs_usages,
};
pub use edges::{EdgeKind, ModuleGraphEdge, ResolutionRequest, build_edges};
pub use exports::resolve_export;
pub use extensions::{AssetKind, ExtensionKind, ExtensionTable, ModuleKind};
pub use records::{
    BindingOrigin, ExportBinding, ExportForm, ExportRecord, ImportBinding, ImportBindingSet,
    ImportRecord, ImportedName, LocalBinding, ModuleRecord,
};
pub use specifier::{ResolvedSpecifier, SpecifierKind, normalize_specifier};

/// Everything extracted from one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileModules {
    pub file: PathBuf,
    /// Imports and exports in source order. Dynamic imports appear where the
    /// enclosing statement does.
    pub records: Vec<ModuleRecord>,
    pub edges: Vec<ModuleGraphEdge>,
    /// CommonJS globals used by the file. They have no meaning in an ES module.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub commonjs: Vec<CommonJsUsage>,
}

impl FileModules {
    pub fn imports(&self) -> impl Iterator<Item = &ImportRecord> {
        self.records.iter().filter_map(|r| match r {
            ModuleRecord::Import(import) => Some(import),
            ModuleRecord::Export(_) => None,
        })
    }

    pub fn exports(&self) -> impl Iterator<Item = &ExportRecord> {
        self.records.iter().filter_map(|r| match r {
            ModuleRecord::Export(export) => Some(export),
            ModuleRecord::Import(_) => None,
        })
    }

    /// Number of distinct normalized targets, regardless of edge kind.
    pub fn distinct_targets(&self) -> usize {
        self.edges
            .iter()
            .map(|e| e.resolved_specifier.normalized_path.as_str())
            .collect::<HashSet<_>>()
            .len()
    }
}

/// Runs the extraction pipeline with a fixed extension table.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    table: ExtensionTable,
}

impl Extractor {
    pub fn new(table: ExtensionTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &ExtensionTable {
        &self.table
    }

    /// Extract records and edges for `file` from its parsed module items.
    ///
    /// Fails only when the items break the record contract (see [`crate::Error`]).
    pub fn extract(&self, file: &Path, items: &[ModuleItem]) -> crate::Result<FileModules> {
        let classified = classify_module(items);

        let imports: Vec<ImportRecord> = classified
            .iter()
            .filter_map(|c| match &c.declaration {
                RawDeclaration::Import(raw) => Some(ImportRecord {
                    raw_specifier: raw.source.clone(),
                    specifier: normalize_specifier(&raw.source, file, &self.table),
                    bindings: raw.bindings.clone(),
                    dynamic: raw.dynamic,
                    side_effect_only: !raw.dynamic && raw.bindings.is_empty(),
                    type_only: raw.type_only,
                }),
                RawDeclaration::Export(_) => None,
            })
            .collect();

        // Exports may name bindings of imports declared after them, so they are
        // resolved against the full import list before interleaving.
        let mut records = Vec::with_capacity(classified.len());
        let mut pending_imports = imports.iter();
        for c in &classified {
            match &c.declaration {
                RawDeclaration::Import(_) => {
                    if let Some(import) = pending_imports.next() {
                        records.push(ModuleRecord::Import(import.clone()));
                    }
                }
                RawDeclaration::Export(raw) => {
                    let specifier = raw
                        .source
                        .as_deref()
                        .map(|s| normalize_specifier(s, file, &self.table));
                    records.push(ModuleRecord::Export(resolve_export(raw, specifier, &imports)));
                }
            }
        }

        let edges = build_edges(file, &records, &self.table)?;
        let commonjs = commonjs_usages(items);
        debug!(
            file = %file.display(),
            records = records.len(),
            edges = edges.len(),
            commonjs = commonjs.len(),
            "extracted module graph"
        );

        Ok(FileModules {
            file: file.to_path_buf(),
            records,
            edges,
            commonjs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ExportDecl, Expr, ImportDecl, NamedExport, NamedImport, Stmt};

    fn import(source: &str) -> ModuleItem {
        ModuleItem::Import(ImportDecl {
            source: source.into(),
            ..ImportDecl::default()
        })
    }

    fn dynamic(source: &str) -> ModuleItem {
        ModuleItem::Stmt(Stmt::Expr(Expr::import(source).awaited()))
    }

    /// The items of a file exercising every import and export form.
    fn fixture() -> Vec<ModuleItem> {
        vec![
            import("module"),
            import("./file"),
            import("./file.mjs"),
            ModuleItem::Import(ImportDecl {
                source: "module".into(),
                named: vec![NamedImport::new("foo")],
                ..ImportDecl::default()
            }),
            ModuleItem::Import(ImportDecl {
                source: "../file".into(),
                named: vec![NamedImport::new("bar")],
                ..ImportDecl::default()
            }),
            ModuleItem::Import(ImportDecl {
                source: "./file".into(),
                namespace: Some("ns1".into()),
                ..ImportDecl::default()
            }),
            dynamic("module"),
            dynamic("./nested/file"),
            dynamic("../parent/file"),
            ModuleItem::Export(ExportDecl::All {
                source: "./file".into(),
                alias: None,
                type_only: false,
            }),
            ModuleItem::Export(ExportDecl::All {
                source: "./nested/types".into(),
                alias: None,
                type_only: true,
            }),
            ModuleItem::Export(ExportDecl::Named {
                source: Some("../parent/file.mjs".into()),
                specifiers: vec![],
                type_only: false,
            }),
            ModuleItem::Export(ExportDecl::Named {
                source: Some("./file".into()),
                specifiers: vec![NamedExport::new("foo"), NamedExport::new("bar")],
                type_only: false,
            }),
            ModuleItem::Export(ExportDecl::All {
                source: "./file/../weird/path".into(),
                alias: Some("ns".into()),
                type_only: false,
            }),
        ]
    }

    fn extract(items: &[ModuleItem]) -> FileModules {
        Extractor::default()
            .extract(Path::new("src/index.ts"), items)
            .unwrap()
    }

    #[test]
    fn test_extractor_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Extractor>();
        assert_send_sync::<FileModules>();
    }

    #[test]
    fn test_fixture_edges() {
        let modules = extract(&fixture());
        assert_eq!(modules.records.len(), 14);
        assert_eq!(modules.edges.len(), 14);
        assert_eq!(modules.distinct_targets(), 9);

        let find = |path: &str, kind: EdgeKind| {
            modules
                .edges
                .iter()
                .find(|e| e.resolved_specifier.normalized_path == path && e.edge_kind == kind)
                .unwrap_or_else(|| panic!("missing {kind:?} edge to {path}"))
        };

        assert!(find("./nested/types", EdgeKind::ReexportAll).type_only);
        assert!(!find("./file", EdgeKind::ReexportAll).type_only);
        find("./weird/path", EdgeKind::ReexportNamespace);
        find("../parent/file.mjs", EdgeKind::ReexportNamed);
        find("./nested/file", EdgeKind::DynamicImport);
        find("../parent/file", EdgeKind::DynamicImport);
        find("module", EdgeKind::SideEffect);
        find("module", EdgeKind::StaticImport);

        let file_kinds: Vec<EdgeKind> = modules
            .edges
            .iter()
            .filter(|e| e.resolved_specifier.normalized_path == "./file")
            .map(|e| e.edge_kind)
            .collect();
        assert_eq!(
            file_kinds,
            vec![
                EdgeKind::SideEffect,
                EdgeKind::StaticImport,
                EdgeKind::ReexportAll,
                EdgeKind::ReexportNamed,
            ]
        );
    }

    #[test]
    fn test_fixture_records_keep_source_order() {
        let modules = extract(&fixture());
        let empty = modules
            .exports()
            .find(|e| e.form == ExportForm::ReexportEmpty)
            .expect("export {} from is kept");
        assert_eq!(empty.specifier.as_ref().unwrap().normalized_path, "../parent/file.mjs");

        let imports: Vec<&ImportRecord> = modules.imports().collect();
        assert_eq!(imports.len(), 9);
        assert!(imports[..3].iter().all(|i| i.side_effect_only));
        assert!(imports[6..].iter().all(|i| i.dynamic && !i.side_effect_only));
        assert!(matches!(modules.records[9], ModuleRecord::Export(_)));
    }

    #[test]
    fn test_local_export_resolves_import_declared_later() {
        let items = vec![
            ModuleItem::Export(ExportDecl::Named {
                source: None,
                specifiers: vec![NamedExport::new("helper")],
                type_only: false,
            }),
            ModuleItem::Import(ImportDecl {
                source: "./util".into(),
                named: vec![NamedImport::new("helper")],
                ..ImportDecl::default()
            }),
        ];
        let modules = extract(&items);
        let export = modules.exports().next().unwrap();
        match &export.form {
            ExportForm::ReexportNamed(bindings) => {
                let origin = bindings[0].origin.as_ref().unwrap();
                assert_eq!(origin.specifier.normalized_path, "./util");
            }
            other => panic!("expected named export, got {:?}", other),
        }
        assert_eq!(modules.edges.len(), 1, "local export list adds no edge");
    }

    #[test]
    fn test_empty_file_has_no_edges() {
        let modules = extract(&[]);
        assert!(modules.records.is_empty());
        assert!(modules.edges.is_empty());
        assert!(modules.commonjs.is_empty());
        assert_eq!(modules.distinct_targets(), 0);
    }

    #[test]
    fn test_commonjs_usage_is_reported_not_fatal() {
        let items = vec![
            import("./a"),
            ModuleItem::Stmt(Stmt::Expr(Expr::Other(vec![
                Expr::CommonJs(CommonJsUsage::Dirname),
                Expr::import("./b"),
            ]))),
        ];
        let modules = extract(&items);
        assert_eq!(modules.commonjs, vec![CommonJsUsage::Dirname]);
        assert_eq!(modules.edges.len(), 2);

        let json = serde_json::to_value(&modules).unwrap();
        assert_eq!(json["commonjs"][0], "dirname");
        assert!(serde_json::to_value(extract(&[])).unwrap().get("commonjs").is_none());
    }
}
