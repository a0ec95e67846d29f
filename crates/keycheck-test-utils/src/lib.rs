//! Shared test utilities for the keycheck workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`fakes`]: in-memory collaborators with scripted answers
//! - [`tree`]: [`SourceTree`] builder for source directories and tool scripts

pub mod fakes;
pub mod tree;

pub use fakes::{FailingDiffTool, FakeCanonicalizer};
pub use tree::SourceTree;
