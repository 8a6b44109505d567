use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::core::config::Action;

/// One change made, or that would be made in dry-run mode, to a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// The rule that produced the notice.
    pub action: Action,
    /// 1-based line number in the original file, or `None` for whole-file
    /// changes such as the trailing newline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub message: String,
}

impl Notice {
    pub fn line(action: Action, line: usize, message: impl Into<String>) -> Self {
        Self {
            action,
            line: Some(line),
            message: message.into(),
        }
    }

    pub fn file(action: Action, message: impl Into<String>) -> Self {
        Self {
            action,
            line: None,
            message: message.into(),
        }
    }
}

/// Everything that happened to a single file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileReport {
    pub path: PathBuf,
    /// The transformed content differs from what is on disk.
    pub changed: bool,
    /// The new content was renamed into place.
    pub written: bool,
    pub notices: Vec<Notice>,
}

impl FileReport {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            ..Self::default()
        }
    }
}

/// A file that could not be processed, with the error chain rendered as text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Aggregate result of one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub dry_run: bool,
    pub files_visited: usize,
    pub files_changed: usize,
    pub files_written: usize,
    pub missing: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
    pub files: Vec<FileReport>,
}

impl RunSummary {
    pub fn record(&mut self, report: FileReport) {
        self.files_visited += 1;
        if report.changed {
            self.files_changed += 1;
        }
        if report.written {
            self.files_written += 1;
        }
        self.files.push(report);
    }

    /// Serializes the summary for the primary output stream.
    pub fn render(&self, format: ReportFormat) -> Result<String> {
        let content = match format {
            ReportFormat::Json => {
                serde_json::to_string_pretty(self).context("Failed to serialize to JSON")?
            }
            ReportFormat::Yaml => serde_yaml::to_string(self).context("Failed to serialize to YAML")?,
            ReportFormat::Toml => {
                toml::to_string_pretty(self).context("Failed to serialize to TOML")?
            }
        };
        Ok(content)
    }
}

/// Output format for `--report`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Json,
    Yaml,
    Toml,
}

/// Receives progress from the tree walker. Implementations decide where the
/// diagnostics go; the walker never prints on its own.
pub trait StatusReporter {
    /// Called once per processed file, after all rules ran.
    fn file_processed(&mut self, report: &FileReport);

    /// A root given on the command line does not exist.
    fn path_missing(&mut self, path: &Path);

    /// An entry that is neither a regular file nor a directory.
    fn path_skipped(&mut self, path: &Path, reason: &str);

    /// Processing of a file was abandoned.
    fn file_failed(&mut self, path: &Path, error: &anyhow::Error);
}

/// Writes human readable diagnostics to a stream, stderr in the binary.
///
/// Missing paths, skipped entries and failures are always written; per-file
/// notices only in verbose mode.
pub struct ConsoleReporter<W: Write> {
    out: W,
    verbose: bool,
    dry_run: bool,
}

impl ConsoleReporter<std::io::Stderr> {
    pub fn stderr(verbose: bool, dry_run: bool) -> Self {
        Self::new(std::io::stderr(), verbose, dry_run)
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, verbose: bool, dry_run: bool) -> Self {
        Self {
            out,
            verbose,
            dry_run,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    // write errors on the diagnostic stream are ignored
    fn emit(&mut self, line: std::fmt::Arguments<'_>) {
        let _ = writeln!(self.out, "{line}");
    }
}

impl<W: Write> StatusReporter for ConsoleReporter<W> {
    fn file_processed(&mut self, report: &FileReport) {
        if !self.verbose {
            return;
        }

        self.emit(format_args!("{}:", report.path.display()));
        for notice in &report.notices {
            self.emit(format_args!("  {}", notice.message));
        }
        if self.dry_run && report.changed {
            self.emit(format_args!("  (dry run, file not written)"));
        }
    }

    fn path_missing(&mut self, path: &Path) {
        self.emit(format_args!("{}: unknown file or directory", path.display()));
    }

    fn path_skipped(&mut self, path: &Path, reason: &str) {
        self.emit(format_args!("{}: skipped, {reason}", path.display()));
    }

    fn file_failed(&mut self, path: &Path, error: &anyhow::Error) {
        self.emit(format_args!("{}: {error:#}", path.display()));
    }
}
