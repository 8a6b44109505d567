use anyhow::{Context, Result};
use regex::bytes::Regex;

use crate::builders::reporter::Notice;
use crate::builders::rules::{LineSequence, Rule};
use crate::core::config::Action;

/// Normalizes the parameter lists of `NAME(inner(args))` macro calls, where
/// `NAME` is one of the configured macro identifiers (`SIGNAL` and `SLOT` by
/// default).
///
/// The matcher only understands exactly two levels of parentheses on a single
/// physical line. Known false negatives:
/// - calls spanning several lines,
/// - parameters that contain parentheses themselves (function pointer types),
/// - template arguments holding a nested call.
///
/// Inside the inner argument list every parameter loses a leading `const`
/// and all whitespace; a reference marker `&` is kept as a single trailing
/// `&`. `SIGNAL(changed(const QString & text, int))` becomes
/// `SIGNAL(changed(QStringtext&,int))`.
///
/// Matching works on bytes with ASCII classes, so lines carrying Latin-1 or
/// other non UTF-8 text are handled like any other line.
pub struct SignatureNormalizer {
    regex: Regex,
}

impl SignatureNormalizer {
    /// Compiles the matcher for the given macro identifiers.
    ///
    /// # Arguments
    /// * `macros`: Identifiers that introduce a signature, e.g. `SIGNAL`.
    ///
    /// # Returns
    /// `Result<Self>`, an error if the resulting pattern does not compile.
    pub fn new<S: AsRef<str>>(macros: &[S]) -> Result<Self> {
        let names: Vec<String> = macros.iter().map(|m| regex::escape(m.as_ref())).collect();
        let pattern = format!(
            r"(?-u)\b({})(\s*\(([^(]*)\(([^)]*)\)\s*\))",
            names.join("|")
        );
        let regex = Regex::new(&pattern).context("Invalid signature macro pattern")?;
        Ok(Self { regex })
    }

    /// Normalizes every match on one line.
    ///
    /// # Arguments
    /// * `line`: One physical line, terminator included.
    ///
    /// # Returns
    /// The new line and the names of the macros whose text actually changed.
    pub fn normalize_line(&self, line: &[u8]) -> (Vec<u8>, Vec<String>) {
        let mut out = line.to_vec();
        let mut changed = Vec::new();

        for caps in self.regex.captures_iter(line) {
            let name = String::from_utf8_lossy(&caps[1]).into_owned();
            let body = &caps[2];
            let Some(normalized) = normalize_body(&caps[3], &caps[4]) else {
                continue;
            };

            // First occurrence only: an identical, already normalized
            // match earlier in the line must not be replaced twice.
            if normalized != body
                && let Some(replaced) = replace_first(&out, body, &normalized)
            {
                out = replaced;
                changed.push(name);
            }
        }

        (out, changed)
    }
}

impl Rule for SignatureNormalizer {
    fn action(&self) -> Action {
        Action::NormalizeSignatures
    }

    fn apply(&self, lines: LineSequence, notices: &mut Vec<Notice>) -> LineSequence {
        lines
            .into_iter()
            .enumerate()
            .map(|(idx, line)| {
                let (normalized, changed) = self.normalize_line(&line);
                for name in changed {
                    notices.push(Notice::line(
                        self.action(),
                        idx + 1,
                        format!("Normalizing {name} statement on line {}", idx + 1),
                    ));
                }
                normalized
            })
            .collect()
    }
}

fn replace_first(haystack: &[u8], needle: &[u8], replacement: &[u8]) -> Option<Vec<u8>> {
    let start = haystack
        .windows(needle.len())
        .position(|window| window == needle)?;

    let mut out = Vec::with_capacity(haystack.len() + replacement.len());
    out.extend_from_slice(&haystack[..start]);
    out.extend_from_slice(replacement);
    out.extend_from_slice(&haystack[start + needle.len()..]);
    Some(out)
}

/// Rebuilds `(inner(params))`, or `None` when the inner name does not look
/// like a call target.
fn normalize_body(inner: &[u8], params: &[u8]) -> Option<Vec<u8>> {
    let inner = inner.trim_ascii();
    if inner.is_empty() || inner.iter().any(|b| b.is_ascii_whitespace() || *b == b')') {
        return None;
    }

    let params: Vec<Vec<u8>> = params.split(|b| *b == b',').map(normalize_param).collect();

    let mut out = Vec::with_capacity(inner.len() + params.len() * 8);
    out.push(b'(');
    out.extend_from_slice(inner);
    out.push(b'(');
    out.extend_from_slice(&params.join(&b","[..]));
    out.extend_from_slice(b"))");
    Some(out)
}

fn normalize_param(param: &[u8]) -> Vec<u8> {
    let param = strip_const(param.trim_ascii());
    let is_reference = param.contains(&b'&');

    let mut out: Vec<u8> = param
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace() && *b != b'&')
        .collect();
    if is_reference {
        out.push(b'&');
    }
    out
}

fn strip_const(param: &[u8]) -> &[u8] {
    match param.strip_prefix(b"const") {
        Some(rest) if !rest.first().is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_') => {
            rest
        }
        _ => param,
    }
}
