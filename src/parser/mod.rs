pub mod languages;
pub mod lower;

use std::cell::RefCell;
use std::path::Path;

use anyhow::{Result, anyhow};
use tracing::warn;
use tree_sitter::{Parser, Tree};

use crate::ast::ModuleItem;

use languages::Grammar;

// One parser per grammar per rayon worker thread; no lock contention.
thread_local! {
    static PARSER_TS: RefCell<Option<Parser>> = const { RefCell::new(None) };
    static PARSER_TSX: RefCell<Option<Parser>> = const { RefCell::new(None) };
    static PARSER_JS: RefCell<Option<Parser>> = const { RefCell::new(None) };
}

/// True if `path` has an extension the adapter can parse.
pub fn is_parseable(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(Grammar::for_extension)
        .is_some()
}

fn parse_tree(grammar: Grammar, source: &[u8]) -> Result<Option<Tree>> {
    let slot = match grammar {
        Grammar::TypeScript => &PARSER_TS,
        Grammar::Tsx => &PARSER_TSX,
        Grammar::JavaScript => &PARSER_JS,
    };
    slot.with(|cell| -> Result<Option<Tree>> {
        let mut cell = cell.borrow_mut();
        if cell.is_none() {
            let mut parser = Parser::new();
            parser
                .set_language(&grammar.language())
                .map_err(|e| anyhow!("failed to set tree-sitter language {:?}: {}", grammar, e))?;
            *cell = Some(parser);
        }
        Ok(cell.as_mut().and_then(|parser| parser.parse(source, None)))
    })
}

/// Parse a source file into the module items consumed by [`crate::extract`].
///
/// Uses thread-local parsers, so it is safe to call from rayon workers. Files with
/// syntax errors still lower whatever tree-sitter recovered; a warning is logged.
///
/// # Errors
/// Returns an error if the extension is not parseable or tree-sitter produces no tree.
pub fn parse_module(path: &Path, source: &[u8]) -> Result<Vec<ModuleItem>> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let grammar = Grammar::for_extension(ext)
        .ok_or_else(|| anyhow!("unsupported file extension: {:?}", ext))?;

    let tree = parse_tree(grammar, source)?
        .ok_or_else(|| anyhow!("tree-sitter returned None for {:?}", path))?;

    let root = tree.root_node();
    if root.has_error() {
        warn!(file = %path.display(), "syntax errors; extracting from the recovered tree");
    }

    Ok(lower::lower_program(root, source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{CommonJsUsage, ExportDecl, Stmt};
    use crate::extract::{EdgeKind, Extractor};

    #[test]
    fn test_parse_module_by_extension() {
        let src = b"import a from './a';\nexport const b = 1;\n";
        for name in ["x.ts", "x.mts", "x.cts", "x.tsx", "x.js", "x.mjs", "x.cjs", "x.jsx"] {
            let items = parse_module(Path::new(name), src).unwrap();
            assert_eq!(items.len(), 2, "{name}");
            assert!(matches!(items[0], ModuleItem::Import(_)), "{name}");
            assert!(
                matches!(items[1], ModuleItem::Export(ExportDecl::Declaration { .. })),
                "{name}"
            );
        }
    }

    #[test]
    fn test_unsupported_extension_is_error() {
        assert!(parse_module(Path::new("style.css"), b"a{}").is_err());
        assert!(!is_parseable(Path::new("data.json")));
        assert!(is_parseable(Path::new("src/App.tsx")));
    }

    #[test]
    fn test_tsx_and_angle_assertions_use_separate_grammars() {
        let tsx = b"export const App = () => <div>{import('./lazy')}</div>;";
        let items = parse_module(Path::new("App.tsx"), tsx).unwrap();
        assert_eq!(items.len(), 1);

        let ts = b"const n = <number>await import('./n');";
        let items = parse_module(Path::new("n.ts"), ts).unwrap();
        match &items[0] {
            ModuleItem::Stmt(Stmt::Other { exprs, .. }) => assert!(!exprs.is_empty()),
            other => panic!("expected a statement, got {:?}", other),
        }
    }

    #[test]
    fn test_uppercase_extension_is_parseable() {
        assert!(is_parseable(Path::new("src/App.TS")));
        let items = parse_module(Path::new("src/App.TS"), b"import './a';").unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_deeply_nested_expression_on_small_stack() {
        let mut src = String::from("const x = a");
        for _ in 0..5000 {
            src.push_str(" + a");
        }
        src.push_str(" + import('./z') + __dirname;\n");

        // Rayon workers get a 2 MiB stack by default.
        let handle = std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(move || {
                let items = parse_module(Path::new("deep.ts"), src.as_bytes()).unwrap();
                Extractor::default()
                    .extract(Path::new("deep.ts"), &items)
                    .unwrap()
            })
            .unwrap();
        let modules = handle.join().expect("extraction overflowed its stack");

        assert_eq!(modules.edges.len(), 1);
        assert_eq!(modules.edges[0].edge_kind, EdgeKind::DynamicImport);
        assert_eq!(modules.edges[0].resolved_specifier.normalized_path, "./z");
        assert_eq!(modules.commonjs, vec![CommonJsUsage::Dirname]);
    }

    #[test]
    fn test_broken_source_still_lowers() {
        let items = parse_module(Path::new("broken.ts"), b"import './ok';\nconst = ;\n").unwrap();
        assert!(matches!(&items[0], ModuleItem::Import(decl) if decl.source == "./ok"));
    }
}
