use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Module-graph extraction for TypeScript/JavaScript projects.
///
/// modgraph parses every source file, classifies its imports and exports, normalizes
/// module specifiers and reports the resulting dependency edges.
#[derive(Parser, Debug)]
#[command(
    name = "modgraph",
    version,
    about,
    long_about = None,
    propagate_version = true,
)]
pub struct Cli {
    /// Log per-file progress to stderr (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for command results.
#[derive(Clone, Debug, ValueEnum, Default)]
pub enum OutputFormat {
    /// Compact one-line-per-result format (default).
    #[default]
    Compact,
    /// Human-readable columnar table with optional ANSI color when stdout is a terminal.
    Table,
    /// Structured JSON suitable for programmatic consumption.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the deduplicated dependency edges of every file under a path.
    Edges {
        /// Project root directory or a single source file.
        path: PathBuf,

        /// Show relative specifiers as they would be emitted with this extension
        /// (e.g. `mjs`: `./file` becomes `./file.mjs`).
        #[arg(long, value_name = "EXT")]
        emit_ext: Option<String>,

        /// Omit type-only edges.
        #[arg(long)]
        runtime_only: bool,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Compact)]
        format: OutputFormat,
    },

    /// Print the import/export records and edges of one file as JSON.
    Inspect {
        /// Source file to inspect.
        file: PathBuf,
    },

    /// Detect circular dependencies between files.
    ///
    /// Uses Kosaraju's SCC algorithm over eager runtime edges: type-only imports and
    /// `import()` calls are ignored.
    Circular {
        /// Project root directory.
        path: PathBuf,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Compact)]
        format: OutputFormat,
    },

    /// Project statistics: files, records, edges by kind and resolution summary.
    Stats {
        /// Project root directory.
        path: PathBuf,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Compact)]
        format: OutputFormat,
    },
}
