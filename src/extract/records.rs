use serde::Serialize;

use super::specifier::ResolvedSpecifier;

// ---------------------------------------------------------------------------
// Imports
// ---------------------------------------------------------------------------

/// A single `{ imported, local }` pair from an `import { ... }` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportBinding {
    pub imported: String,
    pub local: String,
    pub type_only: bool,
}

/// The bindings an import introduces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "form", content = "bindings", rename_all = "snake_case")]
pub enum ImportBindingSet {
    /// `import './x'`
    None,
    /// `import a from './x'`
    Default(String),
    /// `import { a, b as c } from './x'`
    Named(Vec<ImportBinding>),
    /// `import * as ns from './x'`
    Namespace(String),
    /// `import a, { b } from './x'`
    DefaultAndNamed(String, Vec<ImportBinding>),
    /// `import a, * as ns from './x'`
    DefaultAndNamespace(String, String),
}

/// What a local binding refers to in the source module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum ImportedName {
    Default,
    Namespace,
    Named(String),
}

/// A local name introduced by an import, with the export it is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalBinding {
    pub local: String,
    pub imported: ImportedName,
    pub type_only: bool,
}

impl ImportBindingSet {
    pub fn is_empty(&self) -> bool {
        matches!(self, ImportBindingSet::None)
    }

    /// Every local binding in declaration order.
    pub fn local_bindings(&self) -> Vec<LocalBinding> {
        fn named(list: &[ImportBinding]) -> impl Iterator<Item = LocalBinding> + '_ {
            list.iter().map(|b| LocalBinding {
                local: b.local.clone(),
                imported: ImportedName::Named(b.imported.clone()),
                type_only: b.type_only,
            })
        }
        fn single(local: &str, imported: ImportedName) -> LocalBinding {
            LocalBinding {
                local: local.to_owned(),
                imported,
                type_only: false,
            }
        }

        match self {
            ImportBindingSet::None => Vec::new(),
            ImportBindingSet::Default(d) => vec![single(d, ImportedName::Default)],
            ImportBindingSet::Named(list) => named(list).collect(),
            ImportBindingSet::Namespace(ns) => vec![single(ns, ImportedName::Namespace)],
            ImportBindingSet::DefaultAndNamed(d, list) => {
                std::iter::once(single(d, ImportedName::Default))
                    .chain(named(list))
                    .collect()
            }
            ImportBindingSet::DefaultAndNamespace(d, ns) => vec![
                single(d, ImportedName::Default),
                single(ns, ImportedName::Namespace),
            ],
        }
    }
}

/// A static or dynamic import with its normalized target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportRecord {
    /// The specifier exactly as written in source.
    pub raw_specifier: String,
    pub specifier: ResolvedSpecifier,
    pub bindings: ImportBindingSet,
    /// `import('x')`
    pub dynamic: bool,
    /// A static import with no bindings.
    pub side_effect_only: bool,
    /// `import type ...`, or a named list where every binding is `type`.
    pub type_only: bool,
}

impl ImportRecord {
    /// Local bindings visible to the rest of the file.
    ///
    /// Always empty for dynamic imports: their result is a promise value at the call
    /// site, not a module binding.
    pub fn local_bindings(&self) -> Vec<LocalBinding> {
        if self.dynamic {
            return Vec::new();
        }
        self.bindings.local_bindings()
    }
}

// ---------------------------------------------------------------------------
// Exports
// ---------------------------------------------------------------------------

/// Where a locally re-exported name was imported from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingOrigin {
    pub specifier: ResolvedSpecifier,
    pub imported: ImportedName,
}

/// A single `{ exported, local }` pair from an `export { ... }` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportBinding {
    pub exported: String,
    pub local: String,
    pub type_only: bool,
    /// Set for local exports whose name is an import binding of the same file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<BindingOrigin>,
}

/// The shape of an export statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "form", content = "bindings", rename_all = "snake_case")]
pub enum ExportForm {
    /// `export * from './x'`
    ReexportAll,
    /// `export * as ns from './x'`
    ReexportAllAsNamespace(String),
    /// `export { a, b as c } from './x'` or `export { a }`
    ReexportNamed(Vec<ExportBinding>),
    /// `export {} from './x'`
    ReexportEmpty,
    /// `export function f() {}`, `export default ...`
    Declaration(Vec<String>),
}

impl ExportForm {
    pub fn name(&self) -> &'static str {
        match self {
            ExportForm::ReexportAll => "reexport_all",
            ExportForm::ReexportAllAsNamespace(_) => "reexport_all_as_namespace",
            ExportForm::ReexportNamed(_) => "reexport_named",
            ExportForm::ReexportEmpty => "reexport_empty",
            ExportForm::Declaration(_) => "declaration",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRecord {
    /// `None` for declarations and local `export { ... }` lists.
    pub specifier: Option<ResolvedSpecifier>,
    pub form: ExportForm,
    pub type_only: bool,
}

impl ExportRecord {
    /// Names this record adds to the module's export surface.
    ///
    /// `export * from` contributes names that are only known once the target module
    /// is resolved, so it yields nothing here.
    pub fn exported_names(&self) -> Vec<&str> {
        match &self.form {
            ExportForm::ReexportAll | ExportForm::ReexportEmpty => Vec::new(),
            ExportForm::ReexportAllAsNamespace(alias) => vec![alias.as_str()],
            ExportForm::ReexportNamed(bindings) => {
                bindings.iter().map(|b| b.exported.as_str()).collect()
            }
            ExportForm::Declaration(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

/// One import or export record, kept in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum ModuleRecord {
    Import(ImportRecord),
    Export(ExportRecord),
}
