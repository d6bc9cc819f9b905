//! Lowering of tree-sitter syntax trees into [`crate::ast`] module items.
//!
//! Only module-level structure is preserved in full. Ordinary statements and
//! exported declaration bodies are flattened to the `import()` calls and CommonJS
//! globals found anywhere inside them, in source order.

use tree_sitter::Node;

use crate::ast::{
    CommonJsUsage, ExportDecl, Expr, ImportDecl, ModuleItem, NamedExport, NamedImport, Stmt,
};

// ---------------------------------------------------------------------------
// Helper utilities
// ---------------------------------------------------------------------------

fn node_text<'a>(node: Node<'a>, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

/// Named children, skipping comments.
fn named_children<'a>(node: Node<'a>) -> Vec<Node<'a>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .collect()
}

/// True if `node` has an anonymous child token spelled `token` (`type`, `default`, `*`).
fn has_token(node: Node, token: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .any(|c| !c.is_named() && c.kind() == token)
}

fn find_child_of_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).find(|c| c.kind() == kind)
}

/// The value of a string literal, or of a template literal without substitutions.
fn string_value(node: Node, source: &[u8]) -> Option<String> {
    match node.kind() {
        "string" => {
            let text = node_text(node, source);
            let inner = text.get(1..text.len().saturating_sub(1)).unwrap_or("");
            Some(inner.to_owned())
        }
        "template_string" if find_child_of_kind(node, "template_substitution").is_none() => {
            let text = node_text(node, source);
            Some(text.trim_matches('`').to_owned())
        }
        _ => None,
    }
}

/// Text of an identifier or a string-literal module export name (`export { "a-b" as c }`).
fn binding_name(node: Node, source: &[u8]) -> String {
    string_value(node, source).unwrap_or_else(|| node_text(node, source).to_owned())
}

// ---------------------------------------------------------------------------
// Program
// ---------------------------------------------------------------------------

/// Lower the root `program` node.
pub fn lower_program(root: Node, source: &[u8]) -> Vec<ModuleItem> {
    named_children(root)
        .into_iter()
        .filter_map(|node| match node.kind() {
            "import_statement" => Some(lower_import(node, source)),
            "export_statement" => Some(lower_export(node, source)),
            "hash_bang_line" => None,
            _ => Some(ModuleItem::Stmt(lower_stmt(node, source))),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Imports
// ---------------------------------------------------------------------------

fn lower_import(node: Node, source: &[u8]) -> ModuleItem {
    let mut decl = ImportDecl {
        type_only: has_token(node, "type"),
        ..ImportDecl::default()
    };

    if let Some(src) = node.child_by_field_name("source") {
        decl.source = string_value(src, source).unwrap_or_default();
    }

    for child in named_children(node) {
        match child.kind() {
            "import_clause" => lower_import_clause(child, source, &mut decl),
            // import fs = require('fs')
            "import_require_clause" => {
                for part in named_children(child) {
                    match part.kind() {
                        "identifier" => decl.default = Some(node_text(part, source).to_owned()),
                        "string" => decl.source = string_value(part, source).unwrap_or_default(),
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    ModuleItem::Import(decl)
}

fn lower_import_clause(clause: Node, source: &[u8], decl: &mut ImportDecl) {
    for child in named_children(clause) {
        match child.kind() {
            "identifier" => decl.default = Some(node_text(child, source).to_owned()),
            "namespace_import" => {
                decl.namespace = find_child_of_kind(child, "identifier")
                    .map(|id| node_text(id, source).to_owned());
            }
            "named_imports" => {
                for spec in named_children(child) {
                    if spec.kind() != "import_specifier" {
                        continue;
                    }
                    // `import { foo as bar }`: name = foo, alias = bar
                    let Some(name) = spec.child_by_field_name("name") else {
                        continue;
                    };
                    let imported = binding_name(name, source);
                    let local = spec
                        .child_by_field_name("alias")
                        .map(|a| node_text(a, source).to_owned())
                        .unwrap_or_else(|| imported.clone());
                    decl.named.push(NamedImport {
                        imported,
                        local,
                        type_only: has_token(spec, "type"),
                    });
                }
            }
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Exports
// ---------------------------------------------------------------------------

fn lower_export(node: Node, source: &[u8]) -> ModuleItem {
    let type_only = has_type_modifier(node, source);
    let from = node
        .child_by_field_name("source")
        .and_then(|s| string_value(s, source));

    // `export * as ns` nests its star inside `namespace_export`
    let namespace = find_child_of_kind(node, "namespace_export");
    let star_in_error = node.child_by_field_name("declaration").is_none()
        && find_child_of_kind(node, "export_clause").is_none()
        && error_children(node).any(|e| node_text(e, source).contains('*'));
    if has_token(node, "*") || namespace.is_some() || star_in_error {
        let alias = namespace
            .and_then(|ns| {
                named_children(ns)
                    .into_iter()
                    .next()
                    .map(|n| binding_name(n, source))
            })
            .or_else(|| star_alias(node_text(node, source)));
        return ModuleItem::Export(ExportDecl::All {
            source: from.unwrap_or_default(),
            alias,
            type_only,
        });
    }

    if let Some(clause) = find_child_of_kind(node, "export_clause") {
        let specifiers = named_children(clause)
            .into_iter()
            .filter(|s| s.kind() == "export_specifier")
            .filter_map(|spec| {
                let local = binding_name(spec.child_by_field_name("name")?, source);
                let exported = spec
                    .child_by_field_name("alias")
                    .map(|a| binding_name(a, source))
                    .unwrap_or_else(|| local.clone());
                Some(NamedExport {
                    local,
                    exported,
                    type_only: has_token(spec, "type"),
                })
            })
            .collect();
        return ModuleItem::Export(ExportDecl::Named {
            source: from,
            specifiers,
            type_only,
        });
    }

    let declaration = node.child_by_field_name("declaration");

    if has_token(node, "default") {
        let body = match (declaration, node.child_by_field_name("value")) {
            (Some(decl), _) => vec![lower_stmt(decl, source)],
            (None, Some(value)) => vec![lower_stmt(value, source)],
            (None, None) => Vec::new(),
        };
        return ModuleItem::Export(ExportDecl::Declaration {
            names: vec!["default".to_owned()],
            type_only: declaration.is_some_and(is_type_declaration),
            body,
        });
    }

    match declaration {
        Some(decl) => ModuleItem::Export(ExportDecl::Declaration {
            names: declared_names(decl, source),
            type_only: is_type_declaration(decl),
            body: vec![lower_stmt(decl, source)],
        }),
        // `export = x`, `export as namespace X`
        None => ModuleItem::Stmt(lower_stmt(node, source)),
    }
}

fn error_children<'a>(node: Node<'a>) -> impl Iterator<Item = Node<'a>> {
    named_children(node)
        .into_iter()
        .filter(|c| c.kind() == "ERROR")
}

/// `export type ...`
///
/// tree-sitter-typescript has no rule for `export type *`: the modifier lands in an
/// ERROR child, so the statement text is checked as well.
fn has_type_modifier(node: Node, source: &[u8]) -> bool {
    has_token(node, "type")
        || node_text(node, source)
            .strip_prefix("export")
            .map(str::trim_start)
            .and_then(|rest| rest.strip_prefix("type"))
            .is_some_and(|rest| {
                rest.starts_with(|c: char| c.is_whitespace() || c == '*' || c == '{')
            })
}

/// The `ns` of `export ... * as ns from` when the grammar did not produce a
/// `namespace_export` node.
fn star_alias(text: &str) -> Option<String> {
    let (_, after_star) = text.split_once('*')?;
    let rest = after_star.trim_start().strip_prefix("as")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let name: String = rest
        .trim_start()
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '$')
        .collect();
    (!name.is_empty()).then_some(name)
}

/// Declarations erased at emit time.
fn is_type_declaration(decl: Node) -> bool {
    matches!(
        decl.kind(),
        "interface_declaration" | "type_alias_declaration" | "ambient_declaration"
    )
}

/// Binding names introduced by an exported declaration.
fn declared_names(decl: Node, source: &[u8]) -> Vec<String> {
    match decl.kind() {
        "lexical_declaration" | "variable_declaration" => named_children(decl)
            .into_iter()
            .filter(|d| d.kind() == "variable_declarator")
            .filter_map(|d| d.child_by_field_name("name"))
            .flat_map(|pattern| pattern_names(pattern, source))
            .collect(),
        "ambient_declaration" => named_children(decl)
            .into_iter()
            .flat_map(|d| declared_names(d, source))
            .collect(),
        _ => decl
            .child_by_field_name("name")
            .map(|n| vec![node_text(n, source).to_owned()])
            .unwrap_or_default(),
    }
}

/// Identifiers bound by a (possibly destructuring) pattern, left to right.
fn pattern_names(pattern: Node, source: &[u8]) -> Vec<String> {
    let mut names = Vec::new();
    let mut stack = vec![pattern];
    while let Some(node) = stack.pop() {
        match node.kind() {
            "identifier" | "shorthand_property_identifier_pattern" => {
                names.push(node_text(node, source).to_owned());
            }
            // `{ a: b }` binds b; `a = 1` binds a
            "pair_pattern" => stack.extend(node.child_by_field_name("value")),
            "assignment_pattern" | "object_assignment_pattern" => {
                stack.extend(node.child_by_field_name("left"));
            }
            _ => stack.extend(named_children(node).into_iter().rev()),
        }
    }
    names
}

// ---------------------------------------------------------------------------
// Statements and expressions
// ---------------------------------------------------------------------------

/// Reduce any statement or expression to the `import()` calls and CommonJS globals
/// it contains.
fn lower_stmt(node: Node, source: &[u8]) -> Stmt {
    Stmt::Other {
        body: Vec::new(),
        exprs: scan_expressions(node, source),
    }
}

/// Preorder walk over `node` with a [`tree_sitter::TreeCursor`].
///
/// Generated and bundled code nests expressions thousands of levels deep, so the
/// walk keeps no per-level stack frames.
fn scan_expressions(node: Node, source: &[u8]) -> Vec<Expr> {
    let mut found = Vec::new();
    let mut cursor = node.walk();
    loop {
        let current = cursor.node();
        match current.kind() {
            "call_expression"
                if current
                    .child_by_field_name("function")
                    .is_some_and(|f| f.kind() == "import") =>
            {
                found.push(dynamic_import(current, source));
            }
            "identifier" => {
                if let Some(usage) = commonjs_usage(current, source) {
                    found.push(Expr::CommonJs(usage));
                }
            }
            _ => {}
        }

        if cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return found;
            }
        }
    }
}

/// `import(specifier)`. A computed specifier is kept as an empty expression.
fn dynamic_import(call: Node, source: &[u8]) -> Expr {
    let specifier = call
        .child_by_field_name("arguments")
        .and_then(|args| named_children(args).into_iter().next())
        .and_then(|arg| string_value(arg, source));
    Expr::Import {
        source: Box::new(specifier.map_or(Expr::Other(Vec::new()), Expr::Str)),
        options: None,
    }
}

fn commonjs_usage(ident: Node, source: &[u8]) -> Option<CommonJsUsage> {
    match node_text(ident, source) {
        "__dirname" => Some(CommonJsUsage::Dirname),
        "__filename" => Some(CommonJsUsage::Filename),
        "require" => {
            let property = ident
                .parent()
                .filter(|p| {
                    p.kind() == "member_expression"
                        && p.child_by_field_name("object") == Some(ident)
                })
                .and_then(|p| p.child_by_field_name("property"));
            Some(match property.map(|p| node_text(p, source)) {
                Some("resolve") => CommonJsUsage::RequireResolve,
                Some("cache") => CommonJsUsage::RequireCache,
                Some("extensions") => CommonJsUsage::RequireExtensions,
                _ => CommonJsUsage::Require,
            })
        }
        _ => None,
    }
}
