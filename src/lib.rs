//! # modgraph
//!
//! Module-graph extraction for TypeScript and JavaScript sources.
//!
//! The engine ([`extract`]) consumes an already-parsed list of module items ([`ast`]),
//! classifies every import and export, normalizes module specifiers and emits an
//! ordered, deduplicated list of dependency edges per file. Everything else in the
//! crate is host plumbing around that engine: a tree-sitter adapter ([`parser`]),
//! project discovery ([`walker`], [`config`]) and a project-wide graph ([`graph`]).

pub mod ast;
pub mod config;
pub mod extract;
pub mod graph;
pub mod parser;
pub mod walker;

use std::path::PathBuf;

pub use extract::{
    AssetClass, AssetKind, EdgeKind, ExportBinding, ExportForm, ExportRecord, ExtensionKind,
    ExtensionTable, Extractor, FileModules, ImportBinding, ImportBindingSet, ImportRecord,
    ModuleGraphEdge, ModuleKind, ModuleRecord, ResolutionRequest, ResolvedSpecifier,
    SpecifierKind,
};

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Upstream contract breaches detected while building a file's records and edges.
///
/// The engine trusts the parser's grammar and never reports syntax problems; these
/// variants only fire when a host hands over a record shape that cannot exist in a
/// valid module.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{form} export in {} has no module specifier", file.display())]
    MissingSpecifier { file: PathBuf, form: &'static str },

    #[error("declaration export in {} carries module specifier '{specifier}'", file.display())]
    UnexpectedSpecifier { file: PathBuf, specifier: String },
}
