use anyhow::Result;
use tracing::debug;

use crate::builders::includes::DuplicateIncludeRule;
use crate::builders::reporter::Notice;
use crate::builders::signatures::SignatureNormalizer;
use crate::core::config::{Action, TraversalConfig};

/// The lines of a file, in order. Each line keeps its own terminator, so the
/// last line may or may not end in `\n`.
///
/// Lines are raw bytes: source trees routinely hold Latin-1 comments, and
/// every rule only inspects ASCII structure.
pub type LineSequence = Vec<Vec<u8>>;

/// Splits file content into lines while keeping every terminator.
///
/// # Arguments
/// * `content`: The full byte content of a file.
///
/// # Returns
/// A `LineSequence` whose concatenation is exactly `content`. Empty content
/// yields an empty sequence.
pub fn split_lines(content: &[u8]) -> LineSequence {
    content
        .split_inclusive(|b| *b == b'\n')
        .map(<[u8]>::to_vec)
        .collect()
}

/// A single normalization concern.
///
/// Rules are pure with respect to the filesystem: they map one line sequence
/// to another and describe every change they make as a [`Notice`].
pub trait Rule {
    /// The action that enables this rule.
    fn action(&self) -> Action;

    /// Transforms a file's lines.
    ///
    /// # Arguments
    /// * `lines`: The current line sequence, consumed by the rule.
    /// * `notices`: Receives one `Notice` per change made.
    ///
    /// # Returns
    /// The transformed `LineSequence`. Lines the rule does not touch are
    /// passed through byte for byte.
    fn apply(&self, lines: LineSequence, notices: &mut Vec<Notice>) -> LineSequence;
}

/// Builds the rules enabled by the configuration, in the fixed application
/// order: trailing newline, signature normalization, duplicate includes.
///
/// # Arguments
/// * `config`: The run configuration; only its `actions` and
///   `signature_macros` are read.
///
/// # Returns
/// `Result<Vec<Box<dyn Rule>>>`, or an error if the signature matcher cannot
/// be compiled from the configured macro names.
pub fn build_rules(config: &TraversalConfig) -> Result<Vec<Box<dyn Rule>>> {
    let mut rules: Vec<Box<dyn Rule>> = Vec::new();

    for action in config.actions.iter() {
        match action {
            Action::EnsureTrailingNewline => rules.push(Box::new(TrailingNewlineRule)),
            Action::NormalizeSignatures => {
                rules.push(Box::new(SignatureNormalizer::new(&config.signature_macros)?))
            }
            Action::DedupeIncludes => rules.push(Box::new(DuplicateIncludeRule::new())),
            // expanded away by ActionSet
            Action::All => {}
        }
        debug!(%action, "rule enabled");
    }

    Ok(rules)
}

/// Adds a line terminator to a non-empty last line that lacks one.
///
/// The terminator copies the style of the first line, so a CRLF file gets
/// `\r\n` and everything else gets `\n`.
pub struct TrailingNewlineRule;

impl Rule for TrailingNewlineRule {
    fn action(&self) -> Action {
        Action::EnsureTrailingNewline
    }

    fn apply(&self, mut lines: LineSequence, notices: &mut Vec<Notice>) -> LineSequence {
        let terminator: &[u8] = match lines.first() {
            Some(first) if first.ends_with(b"\r\n") => b"\r\n",
            _ => b"\n",
        };

        if let Some(last) = lines.last_mut()
            && !last.is_empty()
            && !last.ends_with(b"\n")
        {
            last.extend_from_slice(terminator);
            notices.push(Notice::file(self.action(), "Adding EOL to end of file"));
        }

        lines
    }
}
