//! Block normalization for textual comparison.
//!
//! The source file and the canonicalizer dump render the same key with
//! different cosmetics. Before they are diffed, both sides go through:
//!
//! 1. trailing whitespace removal and blank-line removal
//! 2. comment removal
//! 3. line-wrap merging (`field=` followed by its value on the next line)
//! 4. no-value field alignment between the two sides
//!
//! Steps 1-3 are [`normalize`]; step 4 is [`resolve_no_value_fields`], which
//! needs both sides at once.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::parser::{is_terminator, key_start};

/// Start of a field assignment: optional backslash, a field name, `=`.
static FIELD_START_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\\?[A-Za-z_][A-Za-z0-9_.\-]*=").expect("Invalid field start regex")
});

/// A no-value field: `\name=` with nothing after the operator.
static BARE_FIELD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\\([A-Za-z_][A-Za-z0-9_.\-]*)=$").expect("Invalid bare field regex")
});

/// A field with inline data: `\name=data`.
static INLINE_FIELD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\\([A-Za-z_][A-Za-z0-9_.\-]*)=(.+)$").expect("Invalid inline field regex")
});

/// Settings for [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeRules {
    /// Line prefixes marking comments and headers that never carry a value.
    pub comment_prefixes: Vec<String>,
}

impl Default for NormalizeRules {
    fn default() -> Self {
        Self {
            comment_prefixes: vec!["#".to_string()],
        }
    }
}

impl NormalizeRules {
    fn is_comment(&self, line: &str) -> bool {
        let trimmed = line.trim_start();
        self.comment_prefixes
            .iter()
            .any(|p| !p.is_empty() && trimmed.starts_with(p.as_str()))
    }
}

/// Returns true when `line` must stay on its own line when it follows a
/// `field=` line.
fn starts_logical_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    FIELD_START_REGEX.is_match(trimmed) || key_start(line).is_some() || is_terminator(line)
}

/// Normalize one side for comparison.
///
/// `normalize(&normalize(x, r), r) == normalize(x, r)` for any input.
pub fn normalize<S: AsRef<str>>(lines: &[S], rules: &NormalizeRules) -> Vec<String> {
    let cleaned: Vec<&str> = lines
        .iter()
        .map(|l| l.as_ref().trim_end())
        .filter(|l| !l.is_empty())
        .filter(|l| !rules.is_comment(l))
        .collect();

    let mut out: Vec<String> = Vec::with_capacity(cleaned.len());
    let mut iter = cleaned.into_iter().peekable();

    while let Some(line) = iter.next() {
        let mut current = line.to_string();
        while current.ends_with('=') {
            match iter.peek() {
                Some(next) if !starts_logical_line(next) => {
                    current.push_str(next.trim_start());
                    iter.next();
                }
                _ => break,
            }
        }
        out.push(current);
    }

    out
}

/// Names of the fields rendered as bare `\name=` lines.
fn bare_fields(lines: &[String]) -> BTreeSet<String> {
    lines
        .iter()
        .filter_map(|l| BARE_FIELD_REGEX.captures(l))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Split every `\name=data` line whose `name` is in `fields` into `\name=`
/// followed by `data`.
fn split_inline_fields(fields: &BTreeSet<String>, lines: Vec<String>) -> Vec<String> {
    if fields.is_empty() {
        return lines;
    }

    let mut out = Vec::with_capacity(lines.len());
    for line in lines {
        let split = INLINE_FIELD_REGEX.captures(&line).and_then(|caps| {
            let name = caps.get(1)?.as_str();
            let data = caps.get(2)?.as_str();
            fields
                .contains(name)
                .then(|| (format!("\\{name}="), data.to_string()))
        });

        match split {
            Some((head, data)) => {
                out.push(head);
                out.push(data);
            }
            None => out.push(line),
        }
    }
    out
}

/// Align no-value field placement between two normalized sides.
///
/// A field written `\name=` on one side and `\name=data` on the other is a
/// placement difference when the first side carries `data` on the following
/// line. The inline side is rewritten to the split form. Each side's bare
/// fields drive the rewrite of the other side, so the result does not depend
/// on which side holds the split form.
pub fn resolve_no_value_fields(a: Vec<String>, b: Vec<String>) -> (Vec<String>, Vec<String>) {
    let bare_a = bare_fields(&a);
    let bare_b = bare_fields(&b);

    let b = split_inline_fields(&bare_a, b);
    let a = split_inline_fields(&bare_b, a);
    (a, b)
}

/// Normalize a source block and a canonical dump against each other.
pub fn normalize_pair<S: AsRef<str>, T: AsRef<str>>(
    source: &[S],
    canonical: &[T],
    rules: &NormalizeRules,
) -> (Vec<String>, Vec<String>) {
    resolve_no_value_fields(normalize(source, rules), normalize(canonical, rules))
}
