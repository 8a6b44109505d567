use anyhow::{Context, Result};
use regex::Regex;

/// Glob-style file-name filter.
///
/// Each pattern is converted to an anchored regular expression: `*` matches
/// any run of characters, `?` a single character, `[abc]` and `[!abc]` a
/// character class. A file is eligible when any pattern matches its file name;
/// an empty filter matches everything.
#[derive(Debug, Clone, Default)]
pub struct NameFilter {
    patterns: Vec<Regex>,
}

impl NameFilter {
    /// Compiles a filter from shell globs.
    ///
    /// # Arguments
    /// * `globs`: Patterns such as `*.cpp` or `[!t]*.h`.
    ///
    /// # Returns
    /// `Result<Self>`, an error naming the first glob that cannot be compiled.
    pub fn new<S: AsRef<str>>(globs: &[S]) -> Result<Self> {
        let patterns = globs
            .iter()
            .map(|glob| {
                let glob = glob.as_ref();
                Regex::new(&glob_to_regex(glob))
                    .with_context(|| format!("Invalid name pattern '{glob}'"))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Whether `file_name`, a bare name without directories, is eligible.
    pub fn matches(&self, file_name: &str) -> bool {
        self.patterns.is_empty() || self.patterns.iter().any(|re| re.is_match(file_name))
    }
}

/// Translates a glob into an anchored regex source string.
///
/// Character classes follow shell rules: a `!` right after the `[` negates
/// the class, and a `]` right after that (or right after the `[`) is a
/// member, not the end. A `[` without a closing `]` is a literal, so `[!]`
/// matches the three characters `[!]`.
///
/// # Arguments
/// * `glob`: One shell glob, matched against a bare file name.
///
/// # Returns
/// Regex source anchored with `^` and `$`.
pub fn glob_to_regex(glob: &str) -> String {
    let chars: Vec<char> = glob.chars().collect();
    let mut out = String::from("^");
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    push_class(&mut out, &chars[i + 1..end]);
                    i = end;
                }
                None => out.push_str(r"\["),
            },
            c => out.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }

    out.push('$');
    out
}

/// Index of the `]` closing the class opened at `start`, if any.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start + 1;
    if chars.get(j) == Some(&'!') {
        j += 1;
    }
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    chars[j.min(chars.len())..]
        .iter()
        .position(|&c| c == ']')
        .map(|offset| j + offset)
}

fn push_class(out: &mut String, class: &[char]) {
    out.push('[');
    let body = match class.first() {
        Some('!') => {
            out.push('^');
            &class[1..]
        }
        _ => class,
    };
    for (idx, &c) in body.iter().enumerate() {
        // a leading `^` is a member here, not a negation
        if matches!(c, '\\' | '[' | ']' | '&' | '~') || (idx == 0 && c == '^') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push(']');
}
