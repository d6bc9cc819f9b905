use serde::Serialize;

use crate::extract::EdgeKind;

/// A file -> target dependency in the project graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    pub kind: EdgeKind,
    /// Normalized specifier as written relative to the importing file.
    pub specifier: String,
    pub type_only: bool,
}

impl Dependency {
    /// True if the dependency must be satisfied before the importer's top-level code
    /// runs: value-carrying and not deferred behind `import()`.
    pub fn is_eager_runtime(&self) -> bool {
        !self.type_only && self.kind != EdgeKind::DynamicImport
    }
}
