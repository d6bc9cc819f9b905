use std::path::{Path, PathBuf};

use oxc_resolver::{ResolveError, ResolveOptions, Resolver, TsconfigOptions, TsconfigReferences};

use crate::extract::ExtensionTable;

/// The outcome of resolving one edge target on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// Resolved to a file path.
    Resolved(PathBuf),
    /// A Node.js builtin such as `fs` or `node:path`.
    Builtin(String),
    /// Nothing on disk matched. Carries the resolver's reason.
    Unresolved(String),
}

/// Build an `oxc_resolver::Resolver` for a TypeScript/JavaScript project.
///
/// - Module extensions of `table` are tried in table order.
/// - `.js`, `.mjs` and `.cjs` specifiers also find their TypeScript sources, so
///   `import './foo.js'` in a `.ts` file reaches `foo.ts`.
/// - `tsconfig.json` at `project_root`, when present, contributes `paths` aliases and
///   project references.
/// - Symlinks are not followed: resolved paths must match the walked file paths.
pub fn build_resolver(project_root: &Path, table: &ExtensionTable) -> Resolver {
    let tsconfig_path = project_root.join("tsconfig.json");
    let tsconfig = tsconfig_path.is_file().then(|| TsconfigOptions {
        config_file: tsconfig_path,
        references: TsconfigReferences::Auto,
    });

    Resolver::new(ResolveOptions {
        extensions: table.module_extensions().map(|e| format!(".{e}")).collect(),
        extension_alias: vec![
            (".js".into(), vec![".ts".into(), ".tsx".into(), ".js".into()]),
            (".mjs".into(), vec![".mts".into(), ".mjs".into()]),
            (".cjs".into(), vec![".cts".into(), ".cjs".into()]),
        ],
        tsconfig,
        condition_names: vec!["node".into(), "import".into()],
        builtin_modules: true,
        symlinks: false,
        ..ResolveOptions::default()
    })
}

/// Resolve `specifier` as written in `from_file`.
///
/// Only absolute importer paths are resolved; the resolver has no working directory
/// of its own.
pub fn resolve_specifier(
    resolver: &Resolver,
    from_file: &Path,
    specifier: &str,
) -> ResolutionOutcome {
    let Some(dir) = from_file.parent().filter(|d| d.is_absolute()) else {
        return ResolutionOutcome::Unresolved(format!(
            "{} has no absolute parent directory",
            from_file.display()
        ));
    };

    match resolver.resolve(dir, specifier) {
        Ok(resolution) => ResolutionOutcome::Resolved(resolution.into_path_buf()),
        Err(ResolveError::Builtin { resolved, .. }) => ResolutionOutcome::Builtin(resolved),
        Err(e) => ResolutionOutcome::Unresolved(e.to_string()),
    }
}
