//! Parsed module items consumed by the extraction engine.
//!
//! This is the input contract between a parser and [`crate::extract`]: an ordered list
//! of module-level items, where ordinary statements keep just enough of their
//! expression trees to locate `import()` calls. The [`crate::parser`] module lowers
//! tree-sitter trees into these types; other hosts can build them directly.

use serde::Serialize;

/// A module-level item in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleItem {
    /// `import ... from '...'` or `import '...'`.
    Import(ImportDecl),
    /// Any `export` statement.
    Export(ExportDecl),
    /// Every other statement. Searched for dynamic imports only.
    Stmt(Stmt),
}

/// A static import declaration.
///
/// `default` and `namespace`/`named` may be combined (`import a, { b } from 'x'`).
/// All three empty is a side-effect import, as is `import {} from 'x'`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportDecl {
    /// The specifier text without quotes.
    pub source: String,
    /// `import type ...`
    pub type_only: bool,
    pub default: Option<String>,
    pub namespace: Option<String>,
    pub named: Vec<NamedImport>,
}

/// One entry of an `import { ... }` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedImport {
    /// The name exported by the source module.
    pub imported: String,
    /// The binding introduced in this file.
    pub local: String,
    /// `import { type A }`
    pub type_only: bool,
}

impl NamedImport {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            imported: name.clone(),
            local: name,
            type_only: false,
        }
    }

    pub fn aliased(imported: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            imported: imported.into(),
            local: local.into(),
            type_only: false,
        }
    }
}

/// An export statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportDecl {
    /// `export * from 'x'`, `export * as ns from 'x'`, `export type * from 'x'`.
    All {
        source: String,
        alias: Option<String>,
        type_only: bool,
    },
    /// `export { a, b as c }`, `export { a } from 'x'`, `export {} from 'x'`.
    Named {
        source: Option<String>,
        specifiers: Vec<NamedExport>,
        type_only: bool,
    },
    /// `export function f() {}`, `export const a = 1, b = 2`, `export default ...`.
    ///
    /// `names` holds the declared bindings (`default` for default exports) and `body`
    /// the declaration itself, which may contain dynamic imports.
    Declaration {
        names: Vec<String>,
        type_only: bool,
        body: Vec<Stmt>,
    },
}

/// One entry of an `export { ... }` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedExport {
    /// The local (or source-module) name.
    pub local: String,
    /// The name visible to importers.
    pub exported: String,
    /// `export { type A }`
    pub type_only: bool,
}

impl NamedExport {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            local: name.clone(),
            exported: name,
            type_only: false,
        }
    }

    pub fn aliased(local: impl Into<String>, exported: impl Into<String>) -> Self {
        Self {
            local: local.into(),
            exported: exported.into(),
            type_only: false,
        }
    }
}

/// A statement, reduced to the structure needed to walk nested expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Expr(Expr),
    Block(Vec<Stmt>),
    Try {
        block: Vec<Stmt>,
        handler: Vec<Stmt>,
        finalizer: Vec<Stmt>,
    },
    /// Declarations, loops, conditionals and anything else: nested statements and
    /// expressions in source order.
    Other { body: Vec<Stmt>, exprs: Vec<Expr> },
}

/// An expression, reduced to the nodes relevant to `import()` detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// `import(source)` or `import(source, options)`.
    Import {
        source: Box<Expr>,
        options: Option<Box<Expr>>,
    },
    /// A string literal, or a template literal without substitutions.
    Str(String),
    Await(Box<Expr>),
    /// A function or class body in expression position.
    Body(Vec<Stmt>),
    /// A reference to a CommonJS-only global.
    CommonJs(CommonJsUsage),
    /// Any other expression; only its children are kept.
    Other(Vec<Expr>),
}

/// CommonJS globals that have no meaning in an ES module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommonJsUsage {
    Dirname,
    Filename,
    /// `require(...)` or a bare `require` reference.
    Require,
    RequireResolve,
    RequireCache,
    RequireExtensions,
}

impl CommonJsUsage {
    /// The usage as written in source.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommonJsUsage::Dirname => "__dirname",
            CommonJsUsage::Filename => "__filename",
            CommonJsUsage::Require => "require()",
            CommonJsUsage::RequireResolve => "require.resolve()",
            CommonJsUsage::RequireCache => "require.cache",
            CommonJsUsage::RequireExtensions => "require.extensions",
        }
    }
}

impl Expr {
    /// `import('source')`
    pub fn import(source: impl Into<String>) -> Self {
        Expr::Import {
            source: Box::new(Expr::Str(source.into())),
            options: None,
        }
    }

    /// `await expr`
    pub fn awaited(self) -> Self {
        Expr::Await(Box::new(self))
    }
}
