use crate::builders::reporter::FileReport;
use crate::builders::rules::{Rule, build_rules, split_lines};
use crate::builders::storage::{AtomicFileStorage, DryRunStorage, StorageProvider};
use crate::core::config::TraversalConfig;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Applies the enabled rules to one file at a time.
pub struct FixEngine {
    rules: Vec<Box<dyn Rule>>,
    storage: Box<dyn StorageProvider>,
}

impl FixEngine {
    pub fn new(config: &TraversalConfig) -> Result<Self> {
        // Choose storage strategy based on config
        let storage: Box<dyn StorageProvider> = if config.dry_run {
            Box::new(DryRunStorage)
        } else {
            Box::new(AtomicFileStorage::new())
        };

        Ok(Self::with_storage(build_rules(config)?, storage))
    }

    pub fn with_storage(rules: Vec<Box<dyn Rule>>, storage: Box<dyn StorageProvider>) -> Self {
        Self { rules, storage }
    }

    /// Runs the rules over `content` without touching any file.
    ///
    /// # Arguments
    /// * `content`: Raw file content. No encoding is assumed.
    /// * `report`: Receives the notices of every rule.
    ///
    /// # Returns
    /// The transformed content.
    pub fn transform(&self, content: &[u8], report: &mut FileReport) -> Vec<u8> {
        let mut lines = split_lines(content);
        for rule in &self.rules {
            lines = rule.apply(lines, &mut report.notices);
        }
        lines.concat()
    }

    /// Reads `path`, transforms it and hands the result to storage. Files
    /// whose content does not change are not written.
    pub fn process_file(&mut self, path: &Path) -> Result<FileReport> {
        let content = fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let mut report = FileReport::new(path);
        let fixed = self.transform(&content, &mut report);
        report.changed = fixed != content;

        if report.changed {
            report.written = self
                .storage
                .commit(path, &fixed)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        } else {
            debug!(path = %path.display(), "unchanged");
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{Action, ActionSet};
    use tempfile::tempdir;

    fn engine(actions: &[Action], dry_run: bool) -> FixEngine {
        let config = TraversalConfig {
            actions: ActionSet::new(actions.iter().copied()),
            dry_run,
            ..TraversalConfig::default()
        };
        FixEngine::new(&config).unwrap()
    }

    #[test]
    fn test_applies_all_rules_in_order() {
        let engine = engine(&[Action::All], false);
        let mut report = FileReport::default();
        let out = engine.transform(
            b"#include <a.h>\n#include \"a.h\"\nconnect(x, SIGNAL(f( const int & )), y, SLOT(g()));",
            &mut report,
        );
        assert_eq!(
            out,
            b"#include <a.h>\nconnect(x, SIGNAL(f(int&)), y, SLOT(g()));\n".to_vec()
        );
        let actions: Vec<Action> = report.notices.iter().map(|n| n.action).collect();
        assert_eq!(
            actions,
            vec![
                Action::EnsureTrailingNewline,
                Action::NormalizeSignatures,
                Action::DedupeIncludes
            ]
        );
    }

    #[test]
    fn test_disabled_rules_leave_lines_untouched() {
        let engine = engine(&[Action::DedupeIncludes], false);
        let mut report = FileReport::default();
        let input = b"SIGNAL(f( int ))";
        assert_eq!(engine.transform(input, &mut report), input.to_vec());
        assert!(report.notices.is_empty());
    }

    #[test]
    fn test_process_file_writes_changes() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.h");
        fs::write(&file, "int a;").unwrap();

        let report = engine(&[Action::EnsureTrailingNewline], false)
            .process_file(&file)
            .unwrap();
        assert!(report.changed);
        assert!(report.written);
        assert_eq!(fs::read_to_string(&file).unwrap(), "int a;\n");
    }

    #[test]
    fn test_process_file_in_dry_run_mode_is_read_only() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.h");
        fs::write(&file, "int a;").unwrap();

        let report = engine(&[Action::All], true).process_file(&file).unwrap();
        assert!(report.changed);
        assert!(!report.written);
        assert_eq!(fs::read_to_string(&file).unwrap(), "int a;");
    }

    #[test]
    fn test_unreadable_path_is_an_error() {
        let dir = tempdir().unwrap();
        let err = engine(&[Action::All], false)
            .process_file(&dir.path().join("missing.cpp"))
            .unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read"));
    }

    #[test]
    fn test_non_utf8_file_is_fixed_not_refused() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("legacy.cpp");
        fs::write(
            &file,
            b"// Gr\xfc\xdfe\nconnect(a, SIGNAL(f( const int & )), b, SLOT(g()));",
        )
        .unwrap();

        let report = engine(&[Action::All], false).process_file(&file).unwrap();
        assert!(report.written);
        assert_eq!(
            fs::read(&file).unwrap(),
            b"// Gr\xfc\xdfe\nconnect(a, SIGNAL(f(int&)), b, SLOT(g()));\n".to_vec()
        );
    }
}
