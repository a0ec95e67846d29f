//! Key block extraction.
//!
//! Parses key blocks out of a [`ConfigSource`]:
//! ```text
//! [KEY_NAME]
//! \field=value
//! \
//! ```
//!
//! Parsing is a line-at-a-time state machine ([`BlockParser`]) so that it can
//! be driven without touching the filesystem.

use std::sync::LazyLock;

use regex::Regex;

use crate::naming::{CompiledKeyPattern, NamingRules};
use crate::source::{ConfigSource, Dialect};
use crate::Result;

/// Line that closes a key block.
pub const TERMINATOR: &str = "\\";

/// A key and the raw lines of its block, header and terminator included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBlock {
    /// The key name, without brackets.
    pub key: String,
    /// Raw block lines in source order.
    pub lines: Vec<String>,
    /// True when the header is directly followed by the terminator.
    pub is_empty: bool,
}

/// Regex for key-start lines. Names exclude whitespace and brackets.
static KEY_START_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[([^\[\]\s]+)\]\s*$").expect("Invalid key start regex"));

/// Returns the key name when `line` opens a key block.
pub fn key_start(line: &str) -> Option<&str> {
    KEY_START_REGEX
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Returns true when `line` is a bare continuation marker.
pub fn is_terminator(line: &str) -> bool {
    line.trim_end() == TERMINATOR
}

/// Dialect-specific settings needed to extract blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractRules {
    pub naming: NamingRules,
    /// Line prefixes marking comments. Comments never count as block content.
    pub comment_prefixes: Vec<String>,
}

impl Default for ExtractRules {
    fn default() -> Self {
        Self {
            naming: NamingRules::default(),
            comment_prefixes: vec!["#".to_string()],
        }
    }
}

impl ExtractRules {
    fn is_content(&self, line: &str) -> bool {
        let trimmed = line.trim();
        !trimmed.is_empty()
            && !is_terminator(trimmed)
            && !self
                .comment_prefixes
                .iter()
                .any(|p| !p.is_empty() && trimmed.starts_with(p.as_str()))
    }
}

/// A block being accumulated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenBlock {
    key: String,
    lines: Vec<String>,
    has_content: bool,
}

/// Parser position relative to key blocks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ParserState {
    #[default]
    OutsideKey,
    InKeyBlock(OpenBlock),
}

/// Incremental key-block parser.
///
/// Feed lines one at a time with [`BlockParser::feed`]; each completed block is
/// returned as soon as it closes. Call [`BlockParser::finish`] at end of input to
/// flush a block left open.
#[derive(Debug)]
pub struct BlockParser<'r> {
    state: ParserState,
    rules: &'r ExtractRules,
}

impl<'r> BlockParser<'r> {
    pub fn new(rules: &'r ExtractRules) -> Self {
        Self {
            state: ParserState::OutsideKey,
            rules,
        }
    }

    pub fn state(&self) -> &ParserState {
        &self.state
    }

    /// Consume one line. Returns a block if this line completed one.
    pub fn feed(&mut self, line: &str) -> Option<KeyBlock> {
        if let Some(key) = key_start(line) {
            let opened = OpenBlock {
                key: key.to_string(),
                lines: vec![line.to_string()],
                has_content: false,
            };
            // A new header implicitly closes an unterminated block
            return match std::mem::replace(&mut self.state, ParserState::InKeyBlock(opened)) {
                ParserState::InKeyBlock(previous) => Some(close(previous, false)),
                ParserState::OutsideKey => None,
            };
        }

        let has_content = self.rules.is_content(line);
        let ParserState::InKeyBlock(open) = &mut self.state else {
            tracing::trace!("Ignoring line outside key block: {:?}", line);
            return None;
        };

        open.lines.push(line.to_string());
        if !is_terminator(line) {
            open.has_content |= has_content;
            return None;
        }

        match std::mem::take(&mut self.state) {
            ParserState::InKeyBlock(open) => Some(close(open, true)),
            ParserState::OutsideKey => None,
        }
    }

    /// Flush the block left open at end of input, if any.
    pub fn finish(self) -> Option<KeyBlock> {
        match self.state {
            ParserState::InKeyBlock(open) => Some(close(open, false)),
            ParserState::OutsideKey => None,
        }
    }
}

/// Every closed block ends with the terminator, written or not.
fn close(mut open: OpenBlock, terminated: bool) -> KeyBlock {
    if !terminated {
        open.lines.push(TERMINATOR.to_string());
    }
    KeyBlock {
        key: open.key,
        lines: open.lines,
        is_empty: terminated && !open.has_content,
    }
}

/// Parse every key block of a key-block dialect text.
pub fn parse_key_blocks<S: AsRef<str>>(lines: &[S], rules: &ExtractRules) -> Vec<KeyBlock> {
    let mut parser = BlockParser::new(rules);
    let mut blocks: Vec<KeyBlock> = lines
        .iter()
        .filter_map(|line| parser.feed(line.as_ref()))
        .collect();
    blocks.extend(parser.finish());
    blocks
}

/// Extract the key blocks of a source, according to its dialect.
///
/// A compiled source whose name does not follow the naming convention yields
/// no blocks; this is reported as a warning, never as an error.
pub fn extract_blocks(source: &ConfigSource, rules: &ExtractRules) -> Result<Vec<KeyBlock>> {
    let blocks = match source.dialect() {
        Dialect::KeyBlock => parse_key_blocks(source.lines(), rules),
        Dialect::Compiled => {
            let pattern = CompiledKeyPattern::new(&rules.naming)?;
            match pattern.derive(&source.file_name()) {
                Some(key) => vec![compiled_block(key, source.lines(), rules)],
                None => {
                    tracing::warn!(
                        "No key derivable from {:?}: name does not match the compiled naming pattern",
                        source.origin()
                    );
                    Vec::new()
                }
            }
        }
    };

    tracing::debug!(
        "Extracted {} key block(s) from {:?} ({})",
        blocks.len(),
        source.origin(),
        source.dialect()
    );
    Ok(blocks)
}

/// Wrap compiled content into a block for `key`.
///
/// Content that already opens with the `[key]` header is taken as-is.
fn compiled_block(key: String, content: &[String], rules: &ExtractRules) -> KeyBlock {
    let first = content.iter().find(|l| !l.trim().is_empty());
    if first.and_then(|l| key_start(l)) == Some(key.as_str()) {
        let mut blocks = parse_key_blocks(content, rules);
        if let Some(pos) = blocks.iter().position(|b| b.key == key) {
            return blocks.swap_remove(pos);
        }
    }

    let has_content = content.iter().any(|l| rules.is_content(l));
    let mut lines = Vec::with_capacity(content.len() + 2);
    lines.push(format!("[{key}]"));
    lines.extend(content.iter().filter(|l| !is_terminator(l)).cloned());
    lines.push(TERMINATOR.to_string());

    KeyBlock {
        key,
        lines,
        is_empty: !has_content,
    }
}
