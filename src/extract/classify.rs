use serde::Serialize;
use tracing::trace;

use crate::ast::{CommonJsUsage, ExportDecl, Expr, ImportDecl, ModuleItem, NamedExport, Stmt};

use super::records::{ImportBinding, ImportBindingSet};

/// The syntactic origin of a classified declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    ImportDeclaration,
    /// An `import()` call found anywhere in an expression tree.
    DynamicImport,
    ExportAll,
    ExportNamed,
    ExportDeclaration,
}

/// An import before its specifier is normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImport {
    pub source: String,
    pub bindings: ImportBindingSet,
    pub dynamic: bool,
    pub type_only: bool,
}

/// The binding shape of an export before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawExportShape {
    All,
    AllAsNamespace(String),
    Named(Vec<NamedExport>),
    Declaration(Vec<String>),
}

/// An export before its specifier is normalized and its bindings resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawExport {
    pub source: Option<String>,
    pub shape: RawExportShape,
    pub type_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawDeclaration {
    Import(RawImport),
    Export(RawExport),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedDeclaration {
    pub declaration: RawDeclaration,
    pub statement: StatementKind,
}

/// Map module items to import/export declarations in source order.
///
/// Static declarations come straight from the item list. Dynamic imports are found by
/// walking every statement and expression tree, including export declaration bodies.
/// Items that are neither contribute nothing.
pub fn classify_module(items: &[ModuleItem]) -> Vec<ClassifiedDeclaration> {
    let mut out = Vec::new();

    for item in items {
        match item {
            ModuleItem::Import(decl) => out.push(classify_import(decl)),
            ModuleItem::Export(decl) => classify_export(decl, &mut out),
            ModuleItem::Stmt(stmt) => walk_stmts(std::slice::from_ref(stmt), &mut out),
        }
    }

    out
}

fn classify_import(decl: &ImportDecl) -> ClassifiedDeclaration {
    let named: Vec<ImportBinding> = decl
        .named
        .iter()
        .map(|n| ImportBinding {
            imported: n.imported.clone(),
            local: n.local.clone(),
            type_only: decl.type_only || n.type_only,
        })
        .collect();

    let all_named_are_types = !named.is_empty() && named.iter().all(|b| b.type_only);

    let bindings = match (&decl.default, &decl.namespace) {
        (None, None) if named.is_empty() => ImportBindingSet::None,
        (None, None) => ImportBindingSet::Named(named),
        (Some(default), None) if named.is_empty() => ImportBindingSet::Default(default.clone()),
        (Some(default), None) => ImportBindingSet::DefaultAndNamed(default.clone(), named),
        (None, Some(ns)) => ImportBindingSet::Namespace(ns.clone()),
        (Some(default), Some(ns)) => {
            ImportBindingSet::DefaultAndNamespace(default.clone(), ns.clone())
        }
    };

    let type_only = decl.type_only
        || (all_named_are_types && matches!(bindings, ImportBindingSet::Named(_)));

    ClassifiedDeclaration {
        declaration: RawDeclaration::Import(RawImport {
            source: decl.source.clone(),
            bindings,
            dynamic: false,
            type_only,
        }),
        statement: StatementKind::ImportDeclaration,
    }
}

fn classify_export(decl: &ExportDecl, out: &mut Vec<ClassifiedDeclaration>) {
    match decl {
        ExportDecl::All {
            source,
            alias,
            type_only,
        } => {
            let shape = match alias {
                Some(alias) => RawExportShape::AllAsNamespace(alias.clone()),
                None => RawExportShape::All,
            };
            out.push(ClassifiedDeclaration {
                declaration: RawDeclaration::Export(RawExport {
                    source: Some(source.clone()),
                    shape,
                    type_only: *type_only,
                }),
                statement: StatementKind::ExportAll,
            });
        }
        ExportDecl::Named {
            source,
            specifiers,
            type_only,
        } => out.push(ClassifiedDeclaration {
            declaration: RawDeclaration::Export(RawExport {
                source: source.clone(),
                shape: RawExportShape::Named(specifiers.clone()),
                type_only: *type_only,
            }),
            statement: StatementKind::ExportNamed,
        }),
        ExportDecl::Declaration {
            names,
            type_only,
            body,
        } => {
            out.push(ClassifiedDeclaration {
                declaration: RawDeclaration::Export(RawExport {
                    source: None,
                    shape: RawExportShape::Declaration(names.clone()),
                    type_only: *type_only,
                }),
                statement: StatementKind::ExportDeclaration,
            });
            walk_stmts(body, out);
        }
    }
}

// ---------------------------------------------------------------------------
// Expression traversal
// ---------------------------------------------------------------------------

enum Visit<'a> {
    Stmt(&'a Stmt),
    Expr(&'a Expr),
}

/// Call `visit` on every expression reachable from `stmts`, in source order.
///
/// Uses an explicit work stack: host-built trees may be arbitrarily deep.
fn for_each_expr<'a>(stmts: &'a [Stmt], mut visit: impl FnMut(&'a Expr)) {
    let mut stack: Vec<Visit<'a>> = stmts.iter().rev().map(Visit::Stmt).collect();

    while let Some(next) = stack.pop() {
        match next {
            Visit::Stmt(stmt) => match stmt {
                Stmt::Expr(expr) => stack.push(Visit::Expr(expr)),
                Stmt::Block(body) => stack.extend(body.iter().rev().map(Visit::Stmt)),
                Stmt::Try {
                    block,
                    handler,
                    finalizer,
                } => stack.extend(
                    block
                        .iter()
                        .chain(handler)
                        .chain(finalizer)
                        .rev()
                        .map(Visit::Stmt),
                ),
                Stmt::Other { body, exprs } => {
                    stack.extend(body.iter().rev().map(Visit::Stmt));
                    stack.extend(exprs.iter().rev().map(Visit::Expr));
                }
            },
            Visit::Expr(expr) => {
                visit(expr);
                match expr {
                    Expr::Import { source, options } => {
                        if let Some(options) = options {
                            stack.push(Visit::Expr(options));
                        }
                        if !matches!(source.as_ref(), Expr::Str(_)) {
                            stack.push(Visit::Expr(source));
                        }
                    }
                    Expr::Str(_) | Expr::CommonJs(_) => {}
                    Expr::Await(inner) => stack.push(Visit::Expr(inner)),
                    Expr::Body(stmts) => stack.extend(stmts.iter().rev().map(Visit::Stmt)),
                    Expr::Other(children) => stack.extend(children.iter().rev().map(Visit::Expr)),
                }
            }
        }
    }
}

fn walk_stmts(stmts: &[Stmt], out: &mut Vec<ClassifiedDeclaration>) {
    for_each_expr(stmts, |expr| {
        let Expr::Import { source, .. } = expr else {
            return;
        };
        match source.as_ref() {
            Expr::Str(specifier) => out.push(ClassifiedDeclaration {
                declaration: RawDeclaration::Import(RawImport {
                    source: specifier.clone(),
                    bindings: ImportBindingSet::None,
                    dynamic: true,
                    type_only: false,
                }),
                statement: StatementKind::DynamicImport,
            }),
            // import(`./locale/${lang}`) has no static target
            _ => trace!("skipping import() with a computed specifier"),
        }
    });
}

/// Distinct CommonJS globals referenced by the module, in order of first use.
///
/// Only statements and exported declaration bodies are searched; `import x =
/// require('y')` is an import, not a usage.
pub fn commonjs_usages(items: &[ModuleItem]) -> Vec<CommonJsUsage> {
    let mut usages = Vec::new();
    let mut record = |expr: &Expr| {
        if let Expr::CommonJs(usage) = expr
            && !usages.contains(usage)
        {
            usages.push(*usage);
        }
    };
    for item in items {
        match item {
            ModuleItem::Stmt(stmt) => for_each_expr(std::slice::from_ref(stmt), &mut record),
            ModuleItem::Export(ExportDecl::Declaration { body, .. }) => {
                for_each_expr(body, &mut record)
            }
            ModuleItem::Import(_) | ModuleItem::Export(_) => {}
        }
    }
    usages
}
