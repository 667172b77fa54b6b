//! Temporary Go source trees.
//!
//! A [`GoTree`] owns a temporary directory that is deleted when the tree
//! drops. Files are added by path relative to the root; parent directories
//! are created as needed. Fake `GOROOT`s, module caches and modules are all
//! just subdirectories.
//!
//! # Examples
//!
//! ```
//! use genaccessor_test_helpers::gotree::GoTree;
//!
//! let tree = GoTree::new()
//!     .file("goroot/src/time/time.go", "package time\n\ntype Time struct{}\n")
//!     .file("app/go.mod", "module example.com/app\n");
//! assert!(tree.path().join("app/go.mod").is_file());
//! ```

#![expect(
    clippy::expect_used,
    reason = "fixture construction failures should abort the test"
)]

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;

/// A temporary directory of Go sources.
#[derive(Debug)]
pub struct GoTree {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Default for GoTree {
    fn default() -> Self {
        Self::new()
    }
}

impl GoTree {
    /// Creates an empty tree.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created or its path is
    /// not UTF-8.
    #[must_use]
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temporary Go tree");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .expect("temporary directory path is UTF-8");
        Self { _dir: dir, root }
    }

    /// Adds `contents` at `relative`, returning the tree for chaining.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    #[must_use]
    pub fn file(self, relative: &str, contents: &str) -> Self {
        self.write(relative, contents);
        self
    }

    /// Writes `contents` at `relative`, replacing any existing file.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create fixture directories");
        }
        fs::write(&path, contents).expect("write fixture file");
    }

    /// Creates the empty directory `relative`.
    ///
    /// # Panics
    ///
    /// Panics if the directory cannot be created.
    #[must_use]
    pub fn dir(self, relative: &str) -> Self {
        fs::create_dir_all(self.root.join(relative)).expect("create fixture directory");
        self
    }

    /// Reads the file at `relative`, or `None` when it does not exist.
    #[must_use]
    pub fn read(&self, relative: &str) -> Option<String> {
        fs::read_to_string(self.root.join(relative)).ok()
    }

    /// Root of the tree.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.root
    }
}
