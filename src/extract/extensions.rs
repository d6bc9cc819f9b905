use serde::{Deserialize, Serialize};

/// The code-module family an extension belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    TypeScript,
    JavaScript,
    Json,
}

/// The asset family an extension belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Style,
    Font,
    Media,
    Data,
}

/// What a recognized extension token means.
///
/// Deserializes from a bare kind name (`"typescript"`, `"image"`, ...), which is how
/// extensions are written in `modgraph.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtensionKind {
    Module(ModuleKind),
    Asset(AssetKind),
}

impl ExtensionKind {
    pub fn is_module(&self) -> bool {
        matches!(self, ExtensionKind::Module(_))
    }
}

const DEFAULT_EXTENSIONS: &[(&str, ExtensionKind)] = &[
    ("ts", ExtensionKind::Module(ModuleKind::TypeScript)),
    ("tsx", ExtensionKind::Module(ModuleKind::TypeScript)),
    ("mts", ExtensionKind::Module(ModuleKind::TypeScript)),
    ("cts", ExtensionKind::Module(ModuleKind::TypeScript)),
    ("js", ExtensionKind::Module(ModuleKind::JavaScript)),
    ("jsx", ExtensionKind::Module(ModuleKind::JavaScript)),
    ("mjs", ExtensionKind::Module(ModuleKind::JavaScript)),
    ("cjs", ExtensionKind::Module(ModuleKind::JavaScript)),
    ("json", ExtensionKind::Module(ModuleKind::Json)),
    ("css", ExtensionKind::Asset(AssetKind::Style)),
    ("scss", ExtensionKind::Asset(AssetKind::Style)),
    ("sass", ExtensionKind::Asset(AssetKind::Style)),
    ("less", ExtensionKind::Asset(AssetKind::Style)),
    ("svg", ExtensionKind::Asset(AssetKind::Image)),
    ("png", ExtensionKind::Asset(AssetKind::Image)),
    ("jpg", ExtensionKind::Asset(AssetKind::Image)),
    ("jpeg", ExtensionKind::Asset(AssetKind::Image)),
    ("gif", ExtensionKind::Asset(AssetKind::Image)),
    ("webp", ExtensionKind::Asset(AssetKind::Image)),
    ("avif", ExtensionKind::Asset(AssetKind::Image)),
    ("ico", ExtensionKind::Asset(AssetKind::Image)),
    ("woff", ExtensionKind::Asset(AssetKind::Font)),
    ("woff2", ExtensionKind::Asset(AssetKind::Font)),
    ("ttf", ExtensionKind::Asset(AssetKind::Font)),
    ("otf", ExtensionKind::Asset(AssetKind::Font)),
    ("mp3", ExtensionKind::Asset(AssetKind::Media)),
    ("mp4", ExtensionKind::Asset(AssetKind::Media)),
    ("webm", ExtensionKind::Asset(AssetKind::Media)),
    ("wav", ExtensionKind::Asset(AssetKind::Media)),
    ("wasm", ExtensionKind::Asset(AssetKind::Data)),
    ("txt", ExtensionKind::Asset(AssetKind::Data)),
    ("csv", ExtensionKind::Asset(AssetKind::Data)),
];

/// The recognized-extension table supplied by the host.
///
/// Extensions are stored lowercase and without the leading dot. Lookup order is
/// insertion order, which also fixes the probing order of resolution requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionTable {
    entries: Vec<(String, ExtensionKind)>,
}

impl ExtensionTable {
    /// An empty table: nothing is recognized as an extension.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add or replace an extension. A leading `.` is ignored.
    pub fn insert(&mut self, ext: &str, kind: ExtensionKind) {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        match self.entries.iter_mut().find(|(e, _)| *e == ext) {
            Some(entry) => entry.1 = kind,
            None => self.entries.push((ext, kind)),
        }
    }

    /// Look up an extension token (case-insensitive, without the dot).
    pub fn get(&self, ext: &str) -> Option<ExtensionKind> {
        self.entries
            .iter()
            .find(|(e, _)| e.eq_ignore_ascii_case(ext))
            .map(|(_, kind)| *kind)
    }

    pub fn is_recognized(&self, ext: &str) -> bool {
        self.get(ext).is_some()
    }

    /// Module extensions in probing order.
    pub fn module_extensions(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, kind)| kind.is_module())
            .map(|(e, _)| e.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ExtensionTable {
    fn default() -> Self {
        let mut table = Self::empty();
        for (ext, kind) in DEFAULT_EXTENSIONS {
            table.insert(ext, *kind);
        }
        table
    }
}
