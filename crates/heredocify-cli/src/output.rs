//! Output formatting for heredocify
//!
//! Text output is colored for terminals; JSON is emitted once at the end;
//! diff output is a patch that `git apply` accepts.

use anyhow::Result;
use colored::*;
use serde::Serialize;
use std::path::Path;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Diff,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<OutputFormat> {
        match s.to_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            "diff" => Some(OutputFormat::Diff),
            _ => None,
        }
    }
}

/// One rewritten array
#[derive(Debug, Clone, Serialize)]
pub struct EditInfo {
    pub rule: String,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rewrites: Vec<EditInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileResult {
    pub fn success(path: &Path, rewrites: Vec<EditInfo>) -> Self {
        Self {
            path: path.display().to_string(),
            rewrites,
            error: None,
        }
    }

    pub fn error(path: &Path, error: String) -> Self {
        Self {
            path: path.display().to_string(),
            rewrites: Vec::new(),
            error: Some(error),
        }
    }
}

/// Summary statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub files_processed: usize,
    pub files_with_changes: usize,
    pub arrays_rewritten: usize,
    pub errors: usize,
}

#[derive(Debug, Serialize)]
pub struct JsonOutput {
    pub version: String,
    pub summary: Summary,
    pub files: Vec<FileResult>,
}

/// Accumulates per-file results and prints them in the selected format
pub struct Reporter {
    format: OutputFormat,
    verbose: bool,
    results: Vec<FileResult>,
    summary: Summary,
}

impl Reporter {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self {
            format,
            verbose,
            results: Vec::new(),
            summary: Summary::default(),
        }
    }

    /// Report what would change without touching the file
    pub fn report_check(&mut self, path: &Path, rewrites: Vec<EditInfo>, old_source: &str, new_source: &str) {
        if rewrites.is_empty() {
            self.report_skipped(path);
            return;
        }
        self.record_changes(rewrites.len());

        match self.format {
            OutputFormat::Text => {
                println!("{}", path.display().to_string().bold());
                print_changed_lines(old_source, new_source);
                println!();
                for rewrite in &rewrites {
                    println!(
                        "  {} {}:{} {}",
                        "->".green(),
                        rewrite.line,
                        rewrite.column,
                        rewrite.message
                    );
                }
                println!();
            }
            OutputFormat::Diff => {
                print!("{}", unified_diff(path, old_source, new_source));
            }
            OutputFormat::Json => {}
        }

        self.results.push(FileResult::success(path, rewrites));
    }

    /// Report a file after its rewrite was written back
    pub fn report_fix(&mut self, path: &Path, rewrites: Vec<EditInfo>) {
        if rewrites.is_empty() {
            self.report_skipped(path);
            return;
        }
        self.record_changes(rewrites.len());

        if self.format == OutputFormat::Text {
            println!("{}", path.display().to_string().bold());
            println!("  {} Rewrote {} array(s)", "OK".green(), rewrites.len());
            println!();
        }

        self.results.push(FileResult::success(path, rewrites));
    }

    /// Report a file with nothing to rewrite
    pub fn report_skipped(&mut self, path: &Path) {
        self.summary.files_processed += 1;
        if self.verbose && self.format == OutputFormat::Text {
            println!("{}: No changes needed", path.display());
        }
        self.results.push(FileResult::success(path, vec![]));
    }

    pub fn report_error(&mut self, path: &Path, error: &str) {
        self.summary.files_processed += 1;
        self.summary.errors += 1;

        if self.format != OutputFormat::Json {
            eprintln!("{}: {} - {}", "Warning".yellow(), path.display(), error);
        }

        self.results.push(FileResult::error(path, error.to_string()));
    }

    fn record_changes(&mut self, count: usize) {
        self.summary.files_processed += 1;
        self.summary.files_with_changes += 1;
        self.summary.arrays_rewritten += count;
    }

    /// Print the closing summary, or the whole document for JSON
    pub fn finish(self, check_mode: bool) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                println!("{}", "Summary".bold().underline());
                println!("  Files processed: {}", self.summary.files_processed);
                println!("  Files with changes: {}", self.summary.files_with_changes);
                println!("  Arrays rewritten: {}", self.summary.arrays_rewritten);
                if self.summary.errors > 0 {
                    println!("  Errors: {}", self.summary.errors);
                }

                if check_mode && self.summary.arrays_rewritten > 0 {
                    println!();
                    println!("{}", "Run with --fix to apply changes".yellow());
                }
            }
            OutputFormat::Json => {
                let output = JsonOutput {
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    summary: self.summary,
                    files: self.results,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            // A patch stream carries no summary
            OutputFormat::Diff => {}
        }
        Ok(())
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }
}

/// Print removed and added lines only
fn print_changed_lines(old: &str, new: &str) {
    for line in diff::lines(old, new) {
        match line {
            diff::Result::Left(l) => println!("  {}", format!("- {}", l).red()),
            diff::Result::Right(r) => println!("  {}", format!("+ {}", r).green()),
            diff::Result::Both(_, _) => {}
        }
    }
}

/// Unified diff of one file with three lines of context
fn unified_diff(path: &Path, old: &str, new: &str) -> String {
    use similar::{ChangeTag, TextDiff};

    let diff = TextDiff::from_lines(old, new);
    let path_str = path.display().to_string();
    let mut out = format!("--- a/{}\n+++ b/{}\n", path_str, path_str);

    for hunk in diff.unified_diff().context_radius(3).iter_hunks() {
        out.push_str(&format!("{}\n", hunk.header()));
        for change in hunk.iter_changes() {
            let sign = match change.tag() {
                ChangeTag::Delete => "-",
                ChangeTag::Insert => "+",
                ChangeTag::Equal => " ",
            };
            out.push_str(sign);
            out.push_str(&change.to_string());
            if change.missing_newline() {
                out.push('\n');
            }
        }
    }

    out
}
