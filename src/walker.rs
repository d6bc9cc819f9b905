use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::ModgraphConfig;
use crate::parser::is_parseable;

/// Walk a project directory and collect parseable source files, sorted by path.
///
/// Respects `.gitignore` rules, always excludes `node_modules`, and applies any
/// additional exclusions from `config.exclude`. A path that is itself a parseable
/// file is returned as a single-element list.
pub fn walk_project(root: &Path, config: &ModgraphConfig) -> anyhow::Result<Vec<PathBuf>> {
    if root.is_file() {
        anyhow::ensure!(
            is_parseable(root),
            "{} is not a TypeScript or JavaScript source file",
            root.display()
        );
        return Ok(vec![root.to_path_buf()]);
    }
    anyhow::ensure!(root.is_dir(), "{} does not exist", root.display());

    let mut files = Vec::new();
    collect_files(root, config, &mut files);
    files.sort();

    debug!(root = %root.display(), files = files.len(), "discovered source files");
    Ok(files)
}

fn collect_files(root: &Path, config: &ModgraphConfig, out: &mut Vec<PathBuf>) {
    let walker = ignore::WalkBuilder::new(root)
        .standard_filters(true)
        // Read .gitignore files even when the directory is not inside a git repository.
        .require_git(false)
        .build();

    for result in walker {
        let entry = match result {
            Ok(e) => e,
            Err(err) => {
                warn!("{err}");
                continue;
            }
        };

        let path = entry.path();

        if entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
            continue;
        }

        // Hard exclusion, even without a .gitignore entry.
        if path_contains_node_modules(path) {
            continue;
        }

        if is_excluded_by_config(path, config) {
            debug!(file = %path.display(), "excluded by config");
            continue;
        }

        if !is_parseable(path) {
            continue;
        }

        out.push(path.to_path_buf());
    }
}

/// Returns true if any component of `path` is named `node_modules`.
fn path_contains_node_modules(path: &Path) -> bool {
    path.components()
        .any(|c| c.as_os_str().to_str() == Some("node_modules"))
}

/// Returns true if `path`, or any single component of it, matches an exclusion pattern.
fn is_excluded_by_config(path: &Path, config: &ModgraphConfig) -> bool {
    let Some(patterns) = &config.exclude else {
        return false;
    };

    let path_str = path.to_string_lossy();

    patterns
        .iter()
        .filter_map(|p| glob::Pattern::new(p).ok())
        .any(|pattern| {
            pattern.matches(&path_str)
                || path
                    .components()
                    .filter_map(|c| c.as_os_str().to_str())
                    .any(|s| pattern.matches(s))
        })
}
