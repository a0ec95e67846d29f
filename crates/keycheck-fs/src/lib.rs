//! Filesystem access for keycheck
//!
//! Reads configuration sources, writes reports atomically and walks input
//! trees looking for files to check.

pub mod discovery;
pub mod error;
pub mod io;

pub use discovery::{discover_files, list_files};
pub use error::{Error, Result};
