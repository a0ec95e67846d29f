//! Key derivation for compiled sources
//!
//! A compiled source holds exactly one key, named after the file:
//! `site_ROUTING_MAIN_TBL.cpl` -> `ROUTING.MAIN.TBL`.
//!
//! The key is the first run of uppercase tokens (joined by the word
//! separator) that ends with the marker token. Word separators inside the
//! run are then replaced by the field separator.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// File-naming convention of compiled sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingRules {
    /// Extension of compiled sources, without the dot.
    pub extension: String,
    /// Literal token every derivable name ends with.
    pub marker: String,
    /// Separator between words in the file name.
    pub word_separator: char,
    /// Separator between words in the derived key.
    pub field_separator: char,
}

impl Default for NamingRules {
    fn default() -> Self {
        Self {
            extension: "cpl".to_string(),
            marker: "TBL".to_string(),
            word_separator: '_',
            field_separator: '.',
        }
    }
}

/// Compiled form of [`NamingRules`].
#[derive(Debug, Clone)]
pub struct CompiledKeyPattern {
    rules: NamingRules,
    regex: Regex,
}

impl CompiledKeyPattern {
    pub fn new(rules: &NamingRules) -> Result<Self> {
        if rules.marker.is_empty() {
            return Err(Error::InvalidPattern {
                pattern: String::new(),
                message: "marker must not be empty".to_string(),
            });
        }

        let sep = regex::escape(&rules.word_separator.to_string());
        let marker = regex::escape(&rules.marker);
        let pattern = format!(r"(?:^|[^A-Z0-9])((?:[A-Z0-9]+{sep})*{marker})(?:$|[^A-Z0-9])");

        let regex = Regex::new(&pattern).map_err(|e| Error::InvalidPattern {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;

        Ok(Self {
            rules: rules.clone(),
            regex,
        })
    }

    /// Derive the key for `file_name`, or `None` when the name does not follow
    /// the convention.
    pub fn derive(&self, file_name: &str) -> Option<String> {
        let stem = strip_extension(file_name, &self.rules.extension);
        let caps = self.regex.captures(stem)?;
        let run = caps.get(1)?.as_str();

        Some(
            run.chars()
                .map(|c| {
                    if c == self.rules.word_separator {
                        self.rules.field_separator
                    } else {
                        c
                    }
                })
                .collect(),
        )
    }
}

/// One-shot convenience around [`CompiledKeyPattern`].
pub fn derive_compiled_key(file_name: &str, rules: &NamingRules) -> Result<Option<String>> {
    Ok(CompiledKeyPattern::new(rules)?.derive(file_name))
}

fn strip_extension<'a>(file_name: &'a str, extension: &str) -> &'a str {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && ext.eq_ignore_ascii_case(extension) => stem,
        _ => file_name,
    }
}
