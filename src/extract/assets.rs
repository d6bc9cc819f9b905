use serde::Serialize;

use super::extensions::{AssetKind, ExtensionKind, ExtensionTable};
use super::specifier::ResolvedSpecifier;

/// Whether a specifier points at a non-code asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AssetClass {
    pub is_asset: bool,
    pub kind: Option<AssetKind>,
}

/// Classify a specifier as asset or code module by its extension.
///
/// Bare specifiers are never assets: `pkg/theme.css` may well be remapped by the
/// package's exports, so that call belongs to downstream resolution.
pub fn classify_asset(specifier: &ResolvedSpecifier, table: &ExtensionTable) -> AssetClass {
    let kind = if specifier.is_bare() {
        None
    } else {
        match specifier.extension().and_then(|ext| table.get(ext)) {
            Some(ExtensionKind::Asset(kind)) => Some(kind),
            Some(ExtensionKind::Module(_)) | None => None,
        }
    };

    AssetClass {
        is_asset: kind.is_some(),
        kind,
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::extract::specifier::normalize_specifier;

    fn classify(raw: &str) -> AssetClass {
        let table = ExtensionTable::default();
        let spec = normalize_specifier(raw, Path::new("src/components/button.tsx"), &table);
        classify_asset(&spec, &table)
    }

    #[test]
    fn test_relative_svg_is_asset() {
        let class = classify("../icons/add.svg");
        assert!(class.is_asset);
        assert_eq!(class.kind, Some(AssetKind::Image));
    }

    #[test]
    fn test_extensionless_and_module_specifiers_are_not_assets() {
        assert!(!classify("./file").is_asset);
        assert!(!classify("./file.mjs").is_asset);
        assert!(!classify(".").is_asset);
    }

    #[test]
    fn test_bare_specifier_never_asset() {
        assert!(!classify("normalize.css").is_asset);
        assert!(!classify("@fontsource/inter/400.css").is_asset);
    }

    #[test]
    fn test_configured_extension_becomes_asset() {
        let mut table = ExtensionTable::default();
        table.insert("glb", ExtensionKind::Asset(AssetKind::Media));
        let spec = normalize_specifier("./models/ship.glb", Path::new("src/main.ts"), &table);
        assert_eq!(classify_asset(&spec, &table).kind, Some(AssetKind::Media));
        assert!(!classify("./models/ship.glb").is_asset, "unknown with default table");
    }
}
