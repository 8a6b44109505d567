use regex::bytes::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::builders::reporter::Notice;
use crate::builders::rules::{LineSequence, Rule};
use crate::core::config::Action;

static INCLUDE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?-u)^\s*#\s*include\s*(?:"([^"]+)"|<([^>]+)>)"#).expect("include regex is valid")
});

/// Drops `#include` lines whose target was already included earlier in the
/// same file. Quote and angle-bracket forms of the same name count as the
/// same target.
///
/// This is plain text matching: includes repeated in mutually exclusive
/// `#if`/`#else` branches are removed too.
pub struct DuplicateIncludeRule;

impl DuplicateIncludeRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DuplicateIncludeRule {
    fn default() -> Self {
        Self::new()
    }
}

/// Extracts the included name from an include directive.
///
/// # Arguments
/// * `line`: One physical line, terminator included.
///
/// # Returns
/// The name between the quotes or angle brackets, or `None` when the line is
/// not an include directive.
pub fn include_target(line: &[u8]) -> Option<&[u8]> {
    let caps = INCLUDE_RE.captures(line)?;
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_bytes())
}

impl Rule for DuplicateIncludeRule {
    fn action(&self) -> Action {
        Action::DedupeIncludes
    }

    fn apply(&self, lines: LineSequence, notices: &mut Vec<Notice>) -> LineSequence {
        let mut seen: HashSet<Vec<u8>> = HashSet::new();
        let mut kept = Vec::with_capacity(lines.len());

        for (idx, line) in lines.into_iter().enumerate() {
            if let Some(target) = include_target(&line)
                && !seen.insert(target.to_vec())
            {
                notices.push(Notice::line(
                    self.action(),
                    idx + 1,
                    format!(
                        "Removing duplicate include \"{}\" on line {}",
                        String::from_utf8_lossy(target),
                        idx + 1
                    ),
                ));
                continue;
            }
            kept.push(line);
        }

        kept
    }
}
