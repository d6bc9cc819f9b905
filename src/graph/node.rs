use std::path::PathBuf;

use serde::Serialize;

use crate::extract::AssetKind;

/// A node in the project graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum GraphNode {
    /// A parsed source file.
    File { path: PathBuf },
    /// A bare-specifier target (npm package, builtin, URL). Internals are not indexed.
    Package { name: String },
    /// A file on disk that is a dependency target but is not parsed: stylesheets,
    /// images, JSON and the like. `kind` is `None` for non-asset files such as JSON.
    Asset {
        path: PathBuf,
        kind: Option<AssetKind>,
    },
    /// A relative specifier for which no candidate file exists.
    Unresolved { specifier: String },
}
