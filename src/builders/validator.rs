use anyhow::Result;
use regex::Regex;
use std::sync::LazyLock;

use crate::builders::filter::NameFilter;
use crate::core::config::{Action, TraversalConfig};

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex is valid"));

/// The `ConfigValidator` trait defines the interface for checking a merged
/// run configuration before any file is touched.
pub trait ConfigValidator {
    /// Returns every issue found; an empty list means the configuration is
    /// usable.
    fn validate_config(&self, config: &TraversalConfig) -> Result<Vec<String>>;
}

/// Performs the standard checks: something to do, somewhere to do it, and
/// well-formed patterns. Macro names are only checked when signature
/// normalization is enabled.
pub struct StandardValidator;

impl StandardValidator {
    pub fn new() -> Self {
        Self
    }

    fn check_patterns(&self, patterns: &[String]) -> Vec<String> {
        patterns
            .iter()
            .filter_map(|pattern| {
                NameFilter::new(std::slice::from_ref(pattern))
                    .err()
                    .map(|e| format!("{e:#}"))
            })
            .collect()
    }

    fn check_macros(&self, macros: &[String]) -> Vec<String> {
        let mut issues: Vec<String> = macros
            .iter()
            .filter(|m| !IDENTIFIER_RE.is_match(m))
            .map(|m| format!("Signature macro '{m}' is not an identifier"))
            .collect();
        if macros.is_empty() {
            issues.push("At least one signature macro is required".to_string());
        }
        issues
    }
}

impl Default for StandardValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidator for StandardValidator {
    fn validate_config(&self, config: &TraversalConfig) -> Result<Vec<String>> {
        let mut issues = Vec::new();

        if config.actions.is_empty() {
            issues.push("no actions defined".to_string());
        }
        if config.roots.is_empty() {
            issues.push("no files or directories given".to_string());
        }

        issues.extend(self.check_patterns(&config.patterns));
        if config.actions.contains(Action::NormalizeSignatures) {
            issues.extend(self.check_macros(&config.signature_macros));
        }

        Ok(issues)
    }
}
