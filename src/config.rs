use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::extract::{ExtensionKind, ExtensionTable};

pub const CONFIG_FILE: &str = "modgraph.toml";

/// Configuration loaded from `modgraph.toml` at the project root.
///
/// ```toml
/// exclude = ["dist", "**/*.generated.ts"]
///
/// [extensions]
/// glb = "media"
/// vue = "javascript"
/// ```
#[derive(Debug, Deserialize, Default)]
pub struct ModgraphConfig {
    /// Additional path patterns to exclude from discovery (beyond .gitignore and node_modules).
    pub exclude: Option<Vec<String>>,
    /// Extension overrides layered on top of the built-in table.
    pub extensions: Option<BTreeMap<String, ExtensionKind>>,
}

impl ModgraphConfig {
    /// Load configuration from `modgraph.toml` in the given root directory.
    ///
    /// Returns a default (empty) configuration if the file does not exist or cannot be parsed.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILE);

        if !config_path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str::<Self>(&contents) {
                Ok(config) => config,
                Err(err) => {
                    warn!("failed to parse {CONFIG_FILE}: {err}. Using defaults.");
                    Self::default()
                }
            },
            Err(err) => {
                warn!("failed to read {CONFIG_FILE}: {err}. Using defaults.");
                Self::default()
            }
        }
    }

    /// The built-in extension table with this configuration's overrides applied.
    pub fn extension_table(&self) -> ExtensionTable {
        let mut table = ExtensionTable::default();
        for (ext, kind) in self.extensions.iter().flatten() {
            table.insert(ext, *kind);
        }
        table
    }
}
