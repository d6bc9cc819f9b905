use std::io::IsTerminal;
use std::path::Path;

use anyhow::Result;
use modgraph::FileModules;
use modgraph::graph::cycles::Cycle;
use modgraph::graph::stats::ProjectStats;

use crate::cli::OutputFormat;

fn relative<'a>(path: &'a Path, project_root: &Path) -> std::borrow::Cow<'a, str> {
    path.strip_prefix(project_root)
        .unwrap_or(path)
        .to_string_lossy()
}

fn bold(s: &str, use_color: bool) -> String {
    if use_color {
        format!("\x1b[1m{s}\x1b[0m")
    } else {
        s.to_string()
    }
}

/// Options for [`format_edges`].
pub struct EdgeView<'a> {
    pub emit_ext: Option<&'a str>,
    pub runtime_only: bool,
}

/// Format and print every file's edges to stdout.
pub fn format_edges(
    files: &[FileModules],
    view: &EdgeView,
    format: &OutputFormat,
    project_root: &Path,
) {
    let rows: Vec<(String, String, &'static str, bool, bool)> = files
        .iter()
        .flat_map(|m| {
            m.edges
                .iter()
                .filter(|e| !(view.runtime_only && e.type_only))
                .map(|e| {
                    let target = match view.emit_ext {
                        Some(ext) => e.resolved_specifier.with_emit_extension(ext),
                        None => e.resolved_specifier.normalized_path.clone(),
                    };
                    (
                        relative(&m.file, project_root).into_owned(),
                        target,
                        e.edge_kind.as_str(),
                        e.type_only,
                        e.is_asset,
                    )
                })
        })
        .collect();

    match format {
        OutputFormat::Compact => {
            for (file, target, kind, type_only, is_asset) in &rows {
                let mut flags = String::new();
                if *type_only {
                    flags.push_str(" type");
                }
                if *is_asset {
                    flags.push_str(" asset");
                }
                println!("{file} -> {target} {kind}{flags}");
            }
            println!("{} edges in {} files", rows.len(), files.len());
        }

        OutputFormat::Table => {
            let use_color = std::io::stdout().is_terminal();
            let file_w = rows.iter().map(|r| r.0.len()).max().unwrap_or(4).max(4);
            let target_w = rows.iter().map(|r| r.1.len()).max().unwrap_or(6).max(6);

            let header = format!(
                "{:<file_w$}  {:<target_w$}  {:<18}  {}",
                "FILE", "TARGET", "KIND", "FLAGS",
            );
            println!("{}", bold(&header, use_color));
            println!("{}", "-".repeat(file_w + target_w + 30));
            for (file, target, kind, type_only, is_asset) in &rows {
                let flags = match (type_only, is_asset) {
                    (true, true) => "type,asset",
                    (true, false) => "type",
                    (false, true) => "asset",
                    (false, false) => "",
                };
                println!("{file:<file_w$}  {target:<target_w$}  {kind:<18}  {flags}");
            }
        }

        OutputFormat::Json => {
            let json: Vec<serde_json::Value> = rows
                .iter()
                .map(|(file, target, kind, type_only, is_asset)| {
                    serde_json::json!({
                        "file": file,
                        "target": target,
                        "kind": kind,
                        "type_only": type_only,
                        "is_asset": is_asset,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
        }
    }
}

/// Print one file's full extraction output as pretty JSON.
pub fn print_inspect(modules: &FileModules) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(modules)?);
    Ok(())
}

/// Format and print detected cycles to stdout.
pub fn format_cycles(cycles: &[Cycle], format: &OutputFormat, project_root: &Path) {
    match format {
        OutputFormat::Compact => {
            for cycle in cycles {
                let parts: Vec<_> = cycle.files.iter().map(|p| relative(p, project_root)).collect();
                println!("cycle {}", parts.join(" -> "));
            }
            println!("{} cycles found", cycles.len());
        }

        OutputFormat::Table => {
            let use_color = std::io::stdout().is_terminal();
            for (i, cycle) in cycles.iter().enumerate() {
                println!("{}", bold(&format!("=== Cycle {} ===", i + 1), use_color));
                // The last entry repeats the first.
                let unique_files = &cycle.files[..cycle.files.len().saturating_sub(1)];
                for path in unique_files {
                    println!("  {}", relative(path, project_root));
                }
                println!();
            }
            println!("{} cycles found", cycles.len());
        }

        OutputFormat::Json => {
            let json: Vec<serde_json::Value> = cycles
                .iter()
                .map(|cycle| {
                    let files: Vec<_> = cycle
                        .files
                        .iter()
                        .map(|p| relative(p, project_root))
                        .collect();
                    serde_json::json!({ "files": files })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
        }
    }
}

/// Format and print project stats to stdout.
pub fn format_stats(stats: &ProjectStats, format: &OutputFormat) {
    match format {
        OutputFormat::Compact => {
            println!("files {}", stats.file_count);
            println!(
                "imports {} exports {} exported_names {}",
                stats.import_records, stats.export_records, stats.exported_names,
            );
            let kinds: Vec<String> = stats
                .edges_by_kind
                .iter()
                .map(|(kind, n)| format!("{kind} {n}"))
                .collect();
            println!("edges {} ({})", stats.edge_count, kinds.join(", "));
            println!("type_only {} asset {}", stats.type_only_edges, stats.asset_edges);
            println!(
                "resolved {} packages {} assets {} unresolved {}",
                stats.resolved_files, stats.packages, stats.assets, stats.unresolved,
            );
            println!("cycles {} commonjs {}", stats.cycles, stats.commonjs_files);
            if stats.skipped > 0 {
                eprintln!("{} files skipped (read or parse errors)", stats.skipped);
            }
        }

        OutputFormat::Table => {
            let use_color = std::io::stdout().is_terminal();

            println!("{}", bold("=== Project Overview ===", use_color));
            println!("Files:    {}", stats.file_count);
            println!("Imports:  {}", stats.import_records);
            println!("Exports:  {}", stats.export_records);
            println!("Exported: {}", stats.exported_names);
            println!("CommonJS: {}", stats.commonjs_files);
            println!();
            println!("{}", bold("--- Edges ---", use_color));
            for (kind, n) in &stats.edges_by_kind {
                println!("  {:<20}{}", kind, n);
            }
            println!("  {:<20}{}", "total", stats.edge_count);
            println!("  {:<20}{}", "type-only", stats.type_only_edges);
            println!("  {:<20}{}", "asset", stats.asset_edges);
            println!();
            println!("{}", bold("--- Resolution ---", use_color));
            println!("  Local files:  {}", stats.resolved_files);
            println!("  Packages:     {}", stats.packages);
            println!("  Assets:       {}", stats.assets);
            println!("  Unresolved:   {}", stats.unresolved);
            println!("  Cycles:       {}", stats.cycles);
            if stats.skipped > 0 {
                eprintln!("{} files skipped (read or parse errors)", stats.skipped);
            }
        }

        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(stats).unwrap_or_default());
        }
    }
}
