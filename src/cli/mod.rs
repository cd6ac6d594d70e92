//! # CLI Module
//!
//! Command-line interface for the duplicate image sweeper.
//!
//! ## Usage
//! ```bash
//! # Find similar images under a folder
//! lookalike scan ~/Pictures
//!
//! # Stricter matching, coarser grid
//! lookalike scan ~/Pictures --threshold 2 --grid standard
//!
//! # JSON output for scripting
//! lookalike scan ~/Pictures --output json
//!
//! # Move every removable copy to the trash
//! lookalike sweep ~/Pictures --yes
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use lookalike::core::cache::{FingerprintCache, InMemoryCache, SqliteCache};
use lookalike::core::discard::{discard_all, SystemTrash};
use lookalike::core::fingerprint::GridSize;
use lookalike::core::pipeline::{Pipeline, PipelineResult};
use lookalike::core::record::{ImageRecord, Role};
use lookalike::error::Result;
use lookalike::events::{Event, EventChannel, HashEvent, PipelineEvent, ScanEvent};
use std::path::PathBuf;
use std::thread;

/// Lookalike - find visually similar images, keep the best copy
#[derive(Parser, Debug)]
#[command(name = "lookalike")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan directories and report similarity groups
    Scan {
        /// Directories to scan
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        options: ScanOptions,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },
    /// Scan, then move removable copies to the trash
    Sweep {
        /// Directories to scan
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        options: ScanOptions,

        /// Actually move files; without this flag the sweep only reports
        /// what it would discard
        #[arg(long)]
        yes: bool,
    },
}

#[derive(clap::Args, Debug)]
struct ScanOptions {
    /// Maximum bit difference for two images to count as similar
    #[arg(short, long, default_value = "10")]
    threshold: u32,

    /// Fingerprint grid resolution
    #[arg(short, long, default_value = "fine")]
    grid: Grid,

    /// Include hidden files
    #[arg(long)]
    include_hidden: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Cache database path
    #[arg(long)]
    cache: Option<PathBuf>,

    /// Skip the persistent cache entirely
    #[arg(long)]
    no_cache: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Grid {
    /// 8x8 grid, 64-bit fingerprints
    Standard,
    /// 16x16 grid, 256-bit fingerprints (default)
    Fine,
}

impl From<Grid> for GridSize {
    fn from(grid: Grid) -> Self {
        match grid {
            Grid::Standard => GridSize::Standard,
            Grid::Fine => GridSize::Fine,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Removable paths only, one per line
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            paths,
            options,
            output,
        } => {
            let result = run_pipeline(&paths, &options, matches!(output, OutputFormat::Pretty))?;
            match output {
                OutputFormat::Pretty => print_pretty(&result, options.verbose),
                OutputFormat::Json => print_json(&result),
                OutputFormat::Minimal => print_minimal(&result),
            }
            Ok(())
        }
        Commands::Sweep { paths, options, yes } => {
            let result = run_pipeline(&paths, &options, true)?;
            run_sweep(&result, yes)
        }
    }
}

fn open_cache(options: &ScanOptions) -> Result<Box<dyn FingerprintCache>> {
    if options.no_cache {
        return Ok(Box::new(InMemoryCache::new()));
    }
    let path = options
        .cache
        .clone()
        .unwrap_or_else(SqliteCache::default_path);
    Ok(Box::new(SqliteCache::open(&path)?))
}

fn run_pipeline(
    paths: &[PathBuf],
    options: &ScanOptions,
    show_progress: bool,
) -> Result<PipelineResult> {
    let term = Term::stderr();

    if show_progress {
        term.write_line(&format!(
            "{} {}",
            style("Lookalike").bold().cyan(),
            style(env!("CARGO_PKG_VERSION")).dim()
        ))
        .ok();
    }

    let pipeline = Pipeline::builder()
        .roots(paths.to_vec())
        .grid(options.grid.into())
        .threshold(options.threshold)
        .include_hidden(options.include_hidden)
        .cache(open_cache(options)?)
        .build();

    let (sender, receiver) = EventChannel::new();

    let progress = if show_progress {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();
    let verbose = options.verbose;

    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_message(format!("{}", phase));
                    }
                }
                Event::Scan(ScanEvent::Completed { total_files }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_length(total_files as u64);
                    }
                }
                Event::Hash(HashEvent::Progress(p)) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_position(p.completed as u64);
                        if verbose {
                            pb.set_message(format!(
                                "{} (cache: {})",
                                p.current_path
                                    .file_name()
                                    .unwrap_or_default()
                                    .to_string_lossy(),
                                p.cache_hits
                            ));
                        }
                    }
                }
                Event::Pipeline(PipelineEvent::Completed { .. })
                | Event::Pipeline(PipelineEvent::Cancelled) => {
                    if let Some(ref pb) = progress_clone {
                        pb.finish_and_clear();
                    }
                }
                _ => {}
            }
        }
    });

    let result = pipeline.run_with_events(&sender);

    drop(sender);
    event_thread.join().ok();

    result
}

/// Group the flat annotated list back into display groups.
///
/// The list is already ordered clusters-first with the keeper leading, so
/// this is a single chunking pass on group_id.
fn display_groups(result: &PipelineResult) -> Vec<Vec<&ImageRecord>> {
    let mut groups: Vec<Vec<&ImageRecord>> = Vec::new();
    let mut current_id = None;

    for record in &result.duplicates {
        if record.group_id != current_id {
            current_id = record.group_id;
            groups.push(Vec::new());
        }
        if let Some(group) = groups.last_mut() {
            group.push(record);
        }
    }

    groups
}

fn print_pretty(result: &PipelineResult, verbose: bool) {
    let term = Term::stdout();

    term.write_line("").ok();
    term.write_line(&format!("{} Scan Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} images scanned in {:.1}s",
        style(result.total_images).cyan(),
        result.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line(&format!(
        "  {} similarity groups",
        style(result.group_count).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} removable copies, {} reclaimable",
        style(result.removable_count()).cyan(),
        style(format_bytes(result.reclaimable_bytes())).yellow()
    ))
    .ok();

    if result.cache_hits > 0 {
        term.write_line(&format!("  {} cache hits", style(result.cache_hits).dim()))
            .ok();
    }

    for error in &result.scan_errors {
        term.write_line(&format!("  {} {}", style("!").red().bold(), error))
            .ok();
    }
    if verbose {
        for (path, reason) in &result.hash_failures {
            term.write_line(&format!(
                "  {} skipped {}: {}",
                style("!").yellow(),
                path.display(),
                reason
            ))
            .ok();
        }
    }

    term.write_line("").ok();

    if result.duplicates.is_empty() {
        term.write_line(&format!("  {} No similar images found", style("✓").green()))
            .ok();
        return;
    }

    for group in display_groups(result) {
        let id = group
            .first()
            .and_then(|r| r.group_id)
            .unwrap_or_default();
        term.write_line(&format!(
            "  {} ({} images)",
            style(format!("Group {}:", id)).bold(),
            group.len(),
        ))
        .ok();

        for record in group {
            let marker = match record.role {
                Role::Keeper => style("★").green().to_string(),
                _ => style("○").dim().to_string(),
            };
            term.write_line(&format!(
                "    {} {} ({}x{}, {})",
                marker,
                record.path().display(),
                record.width(),
                record.height(),
                format_bytes(record.byte_size())
            ))
            .ok();
        }
        term.write_line("").ok();
    }

    term.write_line(&format!(
        "{}",
        style("No files were touched. The starred image in each group is the recommended keeper.")
            .dim()
    ))
    .ok();
}

fn print_json(result: &PipelineResult) {
    let groups: Vec<_> = display_groups(result)
        .iter()
        .map(|group| {
            serde_json::json!({
                "id": group.first().and_then(|r| r.group_id),
                "members": group.iter().map(|r| {
                    serde_json::json!({
                        "path": r.path(),
                        "bytes": r.byte_size(),
                        "width": r.width(),
                        "height": r.height(),
                        "role": r.role.to_string(),
                        "fingerprint": r.fingerprint().to_hex(),
                    })
                }).collect::<Vec<_>>(),
            })
        })
        .collect();

    let output = serde_json::json!({
        "total_images": result.total_images,
        "groups_found": result.group_count,
        "removable_count": result.removable_count(),
        "reclaimable_bytes": result.reclaimable_bytes(),
        "duration_ms": result.duration_ms,
        "cache_hits": result.cache_hits,
        "scan_errors": result.scan_errors.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
        "groups": groups,
    });

    println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
}

fn print_minimal(result: &PipelineResult) {
    for record in &result.duplicates {
        if record.role == Role::Removable {
            println!("{}", record.path().display());
        }
    }
}

fn run_sweep(result: &PipelineResult, yes: bool) -> Result<()> {
    let term = Term::stdout();

    let removable: Vec<PathBuf> = result
        .duplicates
        .iter()
        .filter(|r| r.role == Role::Removable && r.selected)
        .map(|r| r.path().to_path_buf())
        .collect();

    if removable.is_empty() {
        term.write_line("Nothing to sweep.").ok();
        return Ok(());
    }

    if !yes {
        term.write_line(&format!(
            "Would move {} files ({}) to the trash:",
            removable.len(),
            format_bytes(result.reclaimable_bytes())
        ))
        .ok();
        for path in &removable {
            term.write_line(&format!("  {}", path.display())).ok();
        }
        term.write_line(&format!(
            "\nRe-run with {} to proceed.",
            style("--yes").bold()
        ))
        .ok();
        return Ok(());
    }

    let report = discard_all(&SystemTrash, &removable);

    term.write_line(&format!(
        "{} Moved {} files to the trash",
        style("✓").green().bold(),
        report.discarded.len()
    ))
    .ok();

    for failure in &report.failures {
        term.write_line(&format!("  {} {}", style("!").red().bold(), failure))
            .ok();
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_bytes_picks_sensible_units() {
        assert_eq!(format_bytes(512), "512 bytes");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn cli_parses_scan_with_flags() {
        let cli = Cli::try_parse_from([
            "lookalike",
            "scan",
            "/photos",
            "--threshold",
            "4",
            "--grid",
            "standard",
            "--output",
            "json",
        ])
        .unwrap();

        match cli.command {
            Commands::Scan { paths, options, .. } => {
                assert_eq!(paths, vec![PathBuf::from("/photos")]);
                assert_eq!(options.threshold, 4);
            }
            _ => panic!("expected scan command"),
        }
    }

    #[test]
    fn cli_sweep_defaults_to_dry_run() {
        let cli = Cli::try_parse_from(["lookalike", "sweep", "/photos"]).unwrap();
        match cli.command {
            Commands::Sweep { yes, .. } => assert!(!yes),
            _ => panic!("expected sweep command"),
        }
    }

    #[test]
    fn cli_requires_at_least_one_path() {
        assert!(Cli::try_parse_from(["lookalike", "scan"]).is_err());
    }
}
