//! heredocify CLI - rewrite multi-line Ruby string arrays as heredocs
//!
//! ```text
//! heredocify spec/                 # report what would change (exit 2 if anything)
//! heredocify --fix spec/           # rewrite files in place
//! heredocify --format diff lib/    # emit a patch
//! ```

mod config;
mod output;
mod process;

use anyhow::Result;
use clap::Parser;
use colored::*;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use config::Config;
use heredocify_rules::{RewriteOptions, RuleRegistry};
use output::{EditInfo, OutputFormat, Reporter};
use process::{process_file, write_file};

#[derive(Parser)]
#[command(name = "heredocify")]
#[command(version)]
#[command(about = "Rewrite multi-line Ruby string arrays as heredocs")]
struct Cli {
    /// Files or directories to process
    #[arg(required_unless_present = "list_rules")]
    paths: Vec<PathBuf>,

    /// Report changes without writing them (default mode)
    #[arg(long, conflicts_with = "fix")]
    check: bool,

    /// Rewrite files in place
    #[arg(long, conflicts_with = "check")]
    fix: bool,

    /// Show verbose output and debug logs
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Output format: text, json, diff. Overrides config file.
    #[arg(long, value_name = "FORMAT")]
    format: Option<String>,

    /// Shorthand for --format json
    #[arg(long, conflicts_with = "format")]
    json: bool,

    /// Preferred heredoc terminator
    #[arg(long, value_name = "NAME")]
    marker: Option<String>,

    /// Emit `<<~END` instead of `<<-END.strip_indent`
    #[arg(long)]
    squiggly: bool,

    /// Path to config file (default: auto-detect .heredocify.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Ignore config files
    #[arg(long, conflicts_with = "config")]
    no_config: bool,

    /// List available rules and exit
    #[arg(long)]
    list_rules: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red(), e);
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.list_rules {
        println!("{}", "Available rules:".bold());
        for (name, description) in RuleRegistry::new().list_rules() {
            println!("  {} - {}", name.green(), description);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let config = load_config(&cli)?;
    let output_format = resolve_format(&cli, &config)?;
    let options = config.rewrite_options(cli.marker.as_deref(), cli.squiggly);

    if options.markers.is_empty() {
        eprintln!("{}: No heredoc markers configured", "Error".red());
        return Ok(ExitCode::from(1));
    }

    let fix_mode = cli.fix && !cli.check;
    let check_mode = !fix_mode;
    tracing::debug!(
        mode = if fix_mode { "fix" } else { "check" },
        markers = ?options.markers,
        heredoc = ?options.heredoc,
        "starting run"
    );

    let (file_paths, missing_paths) = collect_files(&cli.paths, &config);
    for path in &missing_paths {
        if output_format != OutputFormat::Json {
            eprintln!("{}: Path does not exist: {}", "Warning".yellow(), path.display());
        }
    }

    let mut results: Vec<(&PathBuf, FileOutcome)> = file_paths
        .par_iter()
        .map(|path| (path, process_to_outcome(path, &options)))
        .collect();
    results.sort_by(|a, b| a.0.cmp(b.0));

    let mut reporter = Reporter::new(output_format, cli.verbose);
    for (path, outcome) in results {
        report_outcome(path, outcome, fix_mode, &mut reporter);
    }

    let summary = reporter.summary();
    let exit_code = if summary.errors > 0 || !missing_paths.is_empty() {
        ExitCode::from(1)
    } else if check_mode && summary.files_with_changes > 0 {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    };

    reporter.finish(check_mode)?;
    Ok(exit_code)
}

fn load_config(cli: &Cli) -> Result<Config> {
    if cli.no_config {
        return Ok(Config::default());
    }
    if let Some(path) = &cli.config {
        tracing::info!(path = %path.display(), "using config");
        return Config::load_path(path);
    }
    Ok(match Config::load()? {
        Some((config, path)) => {
            tracing::info!(path = %path.display(), "using config");
            config
        }
        None => Config::default(),
    })
}

/// `--json` beats `--format`, which beats `[output] format`
fn resolve_format(cli: &Cli, config: &Config) -> Result<OutputFormat> {
    if cli.json {
        return Ok(OutputFormat::Json);
    }
    match cli.format.as_deref().or(config.output.format.as_deref()) {
        Some(name) => OutputFormat::from_str(name).ok_or_else(|| {
            anyhow::anyhow!("Invalid output format '{}'. Valid options: text, json, diff", name)
        }),
        None => Ok(OutputFormat::Text),
    }
}

/// Expand directories into their `.rb` files; explicit files are taken as given
fn collect_files(paths: &[PathBuf], config: &Config) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut files = Vec::new();
    let mut missing = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            let entries = walkdir::WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .filter(|e| e.path().extension().is_some_and(|ext| ext == "rb"));
            for entry in entries {
                if config.should_exclude(entry.path()) {
                    tracing::debug!(path = %entry.path().display(), "excluded by config");
                } else {
                    files.push(entry.into_path());
                }
            }
        } else {
            missing.push(path.clone());
        }
    }

    (files, missing)
}

/// Result of processing one file on a worker thread
enum FileOutcome {
    NoChanges,
    HasChanges {
        rewrites: Vec<EditInfo>,
        old_source: String,
        new_source: String,
    },
    ParseError,
    Error(String),
}

fn process_to_outcome(path: &Path, options: &RewriteOptions) -> FileOutcome {
    match process_file(path, options) {
        Ok(Some(result)) => match result.new_source {
            Some(new_source) => FileOutcome::HasChanges {
                rewrites: result.rewrites,
                old_source: result.old_source,
                new_source,
            },
            None => FileOutcome::NoChanges,
        },
        Ok(None) => FileOutcome::ParseError,
        Err(e) => FileOutcome::Error(format!("{:#}", e)),
    }
}

fn report_outcome(path: &Path, outcome: FileOutcome, fix_mode: bool, reporter: &mut Reporter) {
    match outcome {
        FileOutcome::NoChanges => reporter.report_skipped(path),
        FileOutcome::HasChanges {
            rewrites,
            old_source,
            new_source,
        } => {
            if !fix_mode {
                reporter.report_check(path, rewrites, &old_source, &new_source);
            } else if let Err(e) = write_file(path, &new_source) {
                reporter.report_error(path, &format!("{:#}", e));
            } else {
                reporter.report_fix(path, rewrites);
            }
        }
        FileOutcome::ParseError => reporter.report_error(path, "Parse error, skipping"),
        FileOutcome::Error(msg) => reporter.report_error(path, &msg),
    }
}
