use anyhow::{Result, anyhow};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::builders::filter::NameFilter;
use crate::builders::reporter::{FileFailure, RunSummary, StatusReporter};
use crate::core::config::TraversalConfig;
use crate::core::engine::FixEngine;

/// Enumerates the files below the configured roots and hands every eligible
/// one to the [`FixEngine`].
///
/// Directories are only entered in recursive mode; otherwise they are skipped
/// silently, whether given as a root or found inside one. A missing root or a
/// failing file is reported and the walk moves on.
///
/// Every file is processed at most once per run, keyed by its canonical
/// path: overlapping roots and symlinks to an already visited file are
/// skipped.
pub struct TreeWalker<'a> {
    config: &'a TraversalConfig,
    filter: NameFilter,
    engine: FixEngine,
    seen: HashSet<PathBuf>,
}

impl<'a> TreeWalker<'a> {
    pub fn new(config: &'a TraversalConfig) -> Result<Self> {
        Ok(Self::with_engine(
            config,
            NameFilter::new(&config.patterns)?,
            FixEngine::new(config)?,
        ))
    }

    pub fn with_engine(config: &'a TraversalConfig, filter: NameFilter, engine: FixEngine) -> Self {
        Self {
            config,
            filter,
            engine,
            seen: HashSet::new(),
        }
    }

    /// Visits every root in order and returns what happened.
    pub fn run(&mut self, reporter: &mut dyn StatusReporter) -> RunSummary {
        let mut summary = RunSummary {
            dry_run: self.config.dry_run,
            ..RunSummary::default()
        };

        let config = self.config;
        for root in &config.roots {
            self.visit_root(root, &mut summary, reporter);
        }

        summary
    }

    fn visit_root(&mut self, root: &Path, summary: &mut RunSummary, reporter: &mut dyn StatusReporter) {
        if !root.exists() {
            reporter.path_missing(root);
            summary.missing.push(root.to_path_buf());
            return;
        }

        let metadata = match fs::metadata(root) {
            Ok(metadata) => metadata,
            Err(err) => {
                let err = anyhow!(err).context(format!("Failed to stat {}", root.display()));
                self.record_failure(root, err, summary, reporter);
                return;
            }
        };

        if metadata.is_dir() {
            if self.config.recursive {
                self.walk_dir(root, summary, reporter);
            } else {
                debug!(path = %root.display(), "not recursive, skipping directory");
            }
        } else if metadata.is_file() {
            self.visit_file(root, summary, reporter);
        } else {
            reporter.path_skipped(root, "not a regular file");
            summary.skipped.push(root.to_path_buf());
        }
    }

    fn walk_dir(&mut self, dir: &Path, summary: &mut RunSummary, reporter: &mut dyn StatusReporter) {
        let walker = WalkDir::new(dir)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().unwrap_or(dir).to_path_buf();
                    warn!(path = %path.display(), "cannot read directory entry");
                    self.record_failure(&path, anyhow!(err), summary, reporter);
                    continue;
                }
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                continue;
            }
            if file_type.is_file() {
                self.visit_file(entry.path(), summary, reporter);
            } else {
                reporter.path_skipped(entry.path(), "not a regular file");
                summary.skipped.push(entry.path().to_path_buf());
            }
        }
    }

    fn visit_file(&mut self, path: &Path, summary: &mut RunSummary, reporter: &mut dyn StatusReporter) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        if !self.filter.matches(&name) {
            debug!(path = %path.display(), "name filter excludes file");
            return;
        }

        let canonical = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        if !self.seen.insert(canonical) {
            debug!(path = %path.display(), "already processed in this run");
            return;
        }

        match self.engine.process_file(path) {
            Ok(report) => {
                reporter.file_processed(&report);
                summary.record(report);
            }
            Err(err) => self.record_failure(path, err, summary, reporter),
        }
    }

    fn record_failure(
        &self,
        path: &Path,
        err: anyhow::Error,
        summary: &mut RunSummary,
        reporter: &mut dyn StatusReporter,
    ) {
        reporter.file_failed(path, &err);
        summary.failures.push(FileFailure {
            path: path.to_path_buf(),
            error: format!("{err:#}"),
        });
    }
}
