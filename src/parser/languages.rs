use tree_sitter::Language;

/// The tree-sitter grammar used for a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grammar {
    TypeScript,
    Tsx,
    JavaScript,
}

impl Grammar {
    /// Pick the grammar for a file extension, or `None` if the extension is not
    /// parseable source.
    ///
    /// `.ts`/`.mts`/`.cts` and `.tsx` MUST use different grammars: the TypeScript
    /// grammar cannot parse JSX and the TSX grammar breaks `<T>expr` assertions. The
    /// JavaScript grammar accepts JSX, so it covers `.jsx` as well. Matching ignores
    /// ASCII case, like [`crate::ExtensionTable`] lookups.
    pub fn for_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "ts" | "mts" | "cts" => Some(Grammar::TypeScript),
            "tsx" => Some(Grammar::Tsx),
            "js" | "jsx" | "mjs" | "cjs" => Some(Grammar::JavaScript),
            _ => None,
        }
    }

    pub fn language(self) -> Language {
        match self {
            Grammar::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Grammar::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Grammar::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        }
    }
}

/// Return the tree-sitter [`Language`] for the given file extension.
pub fn language_for_extension(ext: &str) -> Option<Language> {
    Grammar::for_extension(ext).map(Grammar::language)
}
