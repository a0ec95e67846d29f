//! Key block extraction and normalization for keycheck.
//!
//! A configuration source is a list of key blocks:
//!
//! ```text
//! [ROUTING]
//! \host=alpha
//! \port=8080
//! \
//! ```
//!
//! A block opens on a `[NAME]` line without leading whitespace and closes on a
//! line holding a single backslash. Compiled sources carry no headers: their
//! only key is derived from the file name (see [`naming`]).
//!
//! The [`normalize`] module rewrites blocks coming from two different origins
//! (the source file and the canonicalizer dump) into a form where purely
//! cosmetic differences disappear.

pub mod error;
pub mod naming;
pub mod normalize;
pub mod parser;
pub mod source;

pub use error::{Error, Result};
pub use naming::{NamingRules, derive_compiled_key};
pub use normalize::{NormalizeRules, normalize, normalize_pair, resolve_no_value_fields};
pub use parser::{BlockParser, ExtractRules, KeyBlock, ParserState, extract_blocks};
pub use source::{ConfigSource, Dialect};
