mod cli;
mod output;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use modgraph::config::ModgraphConfig;
use modgraph::graph::ProjectGraph;
use modgraph::graph::cycles::find_cycles;
use modgraph::graph::resolver::build_resolver;
use modgraph::graph::stats::project_stats;
use modgraph::parser::parse_module;
use modgraph::walker::walk_project;
use modgraph::{Extractor, FileModules};

use cli::{Cli, Commands};
use output::EdgeView;

/// Everything extracted from one project walk.
struct Analysis {
    root: PathBuf,
    extractor: Extractor,
    files: Vec<FileModules>,
    /// Files that could not be read or parsed.
    skipped: usize,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "modgraph=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// The directory holding `modgraph.toml` for `path`.
fn config_root(path: &Path) -> PathBuf {
    if path.is_file() {
        path.parent().map(Path::to_path_buf).unwrap_or_default()
    } else {
        path.to_path_buf()
    }
}

fn extract_file(extractor: &Extractor, path: &Path) -> Result<Option<FileModules>> {
    let source = match std::fs::read(path) {
        Ok(s) => s,
        Err(err) => {
            warn!(file = %path.display(), "skipping unreadable file: {err}");
            return Ok(None);
        }
    };
    let items = match parse_module(path, &source) {
        Ok(items) => items,
        Err(err) => {
            warn!(file = %path.display(), "skipping unparseable file: {err:#}");
            return Ok(None);
        }
    };
    let modules = extractor
        .extract(path, &items)
        .with_context(|| format!("failed to extract {}", path.display()))?;
    if !modules.commonjs.is_empty() && !is_commonjs_file(path) {
        let found: Vec<&str> = modules.commonjs.iter().map(|u| u.as_str()).collect();
        warn!(file = %path.display(), "CommonJS in an ES module: {}", found.join(", "));
    }
    Ok(Some(modules))
}

fn is_commonjs_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("cjs") || e.eq_ignore_ascii_case("cts"))
}

fn analyze(path: &Path) -> Result<Analysis> {
    // The resolver works on absolute paths only.
    let path = std::path::absolute(path)
        .with_context(|| format!("failed to resolve {}", path.display()))?;
    let root = config_root(&path);
    let config = ModgraphConfig::load(&root);
    let paths = walk_project(&path, &config)?;

    let extractor = Extractor::new(config.extension_table());
    let results: Vec<Option<FileModules>> = paths
        .par_iter()
        .map(|p| extract_file(&extractor, p))
        .collect::<Result<_>>()?;

    let skipped = results.iter().filter(|r| r.is_none()).count();
    let files: Vec<FileModules> = results.into_iter().flatten().collect();
    debug!(files = files.len(), skipped, "analysis complete");

    Ok(Analysis {
        root,
        extractor,
        files,
        skipped,
    })
}

impl Analysis {
    fn graph(&self) -> ProjectGraph {
        let table = self.extractor.table();
        ProjectGraph::build(&self.files, table, &build_resolver(&self.root, table))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Edges {
            path,
            emit_ext,
            runtime_only,
            format,
        } => {
            let analysis = analyze(&path)?;
            let view = EdgeView {
                emit_ext: emit_ext.as_deref(),
                runtime_only,
            };
            output::format_edges(&analysis.files, &view, &format, &analysis.root);
        }

        Commands::Inspect { file } => {
            anyhow::ensure!(file.is_file(), "{} is not a file", file.display());
            let table = ModgraphConfig::load(&config_root(&file)).extension_table();
            let modules = extract_file(&Extractor::new(table), &file)?
                .with_context(|| format!("could not read or parse {}", file.display()))?;
            output::print_inspect(&modules)?;
        }

        Commands::Circular { path, format } => {
            let analysis = analyze(&path)?;
            let cycles = find_cycles(&analysis.graph());
            output::format_cycles(&cycles, &format, &analysis.root);
        }

        Commands::Stats { path, format } => {
            let analysis = analyze(&path)?;
            let stats = project_stats(&analysis.files, &analysis.graph(), analysis.skipped);
            output::format_stats(&stats, &format);
        }
    }

    Ok(())
}
