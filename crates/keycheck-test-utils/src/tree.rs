//! [`SourceTree`] builder for keycheck test scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary source directory plus a separate directory for tool scripts,
/// dumps and configuration, so the tools never show up in a directory run.
///
/// # Example
///
/// ```rust,no_run
/// use keycheck_test_utils::SourceTree;
///
/// let tree = SourceTree::new();
/// tree.file("site/a.cfg", "[ALPHA]\n\\x=1\n\\\n");
/// let script = tree.install_canonicalizer_script(&[("ALPHA", "[ALPHA]\n\\x=1\n\\\n")]);
/// ```
pub struct SourceTree {
    root: TempDir,
    tools: TempDir,
}

impl Default for SourceTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceTree {
    pub fn new() -> Self {
        Self {
            root: TempDir::new().unwrap(),
            tools: TempDir::new().unwrap(),
        }
    }

    /// Root of the source tree.
    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Directory holding scripts and configuration.
    pub fn tools_dir(&self) -> &Path {
        self.tools.path()
    }

    /// Absolute path of `relative` inside the source tree.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write a source file, creating parent directories.
    pub fn file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Write a `keycheck.toml` into the tools directory and return its path.
    pub fn config(&self, content: &str) -> PathBuf {
        let path = self.tools_dir().join("keycheck.toml");
        fs::write(&path, content).unwrap();
        path
    }

    /// Install a shell canonicalizer answering from `dumps`.
    ///
    /// The script prints `<tools>/dumps/<key>.dump`, or an `Error:` line for
    /// unknown keys.
    #[cfg(unix)]
    pub fn install_canonicalizer_script(&self, dumps: &[(&str, &str)]) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let dump_dir = self.tools_dir().join("dumps");
        fs::create_dir_all(&dump_dir).unwrap();
        for (key, text) in dumps {
            fs::write(dump_dir.join(format!("{key}.dump")), text).unwrap();
        }

        let script = self.tools_dir().join("keydump.sh");
        let body = format!(
            "#!/bin/sh\nf=\"{}/$1.dump\"\nif [ -f \"$f\" ]; then\n  cat \"$f\"\nelse\n  echo \"Error: unknown key $1\"\nfi\n",
            dump_dir.display()
        );
        fs::write(&script, body).unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        script
    }
}
