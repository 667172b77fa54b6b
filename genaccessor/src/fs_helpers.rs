//! Filesystem helpers shared across `genaccessor` modules.

use std::io;

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;

/// Opens a directory if it exists, returning `None` when the path is missing.
pub fn open_optional_dir(path: &Utf8Path) -> io::Result<Option<Dir>> {
    match Dir::open_ambient_dir(path, ambient_authority()) {
        Ok(dir) => Ok(Some(dir)),
        Err(err) if is_missing(&err) => Ok(None),
        Err(err) => Err(err),
    }
}

/// Reads a UTF-8 file if it exists.
pub fn read_optional_file(path: &Utf8Path) -> io::Result<Option<String>> {
    let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
        return Ok(None);
    };
    let parent = if parent.as_str().is_empty() {
        Utf8Path::new(".")
    } else {
        parent
    };
    let Some(dir) = open_optional_dir(parent)? else {
        return Ok(None);
    };
    match dir.read_to_string(name) {
        Ok(text) => Ok(Some(text)),
        Err(err) if is_missing(&err) => Ok(None),
        Err(err) => Err(err),
    }
}

/// Returns `true` when `path` names a readable directory.
pub fn is_dir(path: &Utf8Path) -> bool {
    Dir::open_ambient_dir(path, ambient_authority()).is_ok()
}

fn is_missing(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

#[cfg(test)]
mod tests {
    //! Unit tests for the filesystem helpers.

    use super::*;
    use rstest::rstest;
    use test_helpers::gotree::GoTree;

    #[rstest]
    fn reads_present_files_and_skips_missing_ones() {
        let tree = GoTree::new().file("go.mod", "module m\n");
        let present = read_optional_file(&tree.path().join("go.mod")).expect("read");
        assert_eq!(present.as_deref(), Some("module m\n"));
        let missing = read_optional_file(&tree.path().join("nope/go.mod")).expect("read");
        assert!(missing.is_none());
    }

    #[rstest]
    fn detects_directories() {
        let tree = GoTree::new().file("pkg/a.go", "package pkg\n");
        assert!(is_dir(&tree.path().join("pkg")));
        assert!(!is_dir(&tree.path().join("pkg/a.go")));
        assert!(!is_dir(&tree.path().join("absent")));
    }
}
