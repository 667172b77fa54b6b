//! Reading a directory of Go files into package units.

use std::collections::BTreeMap;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use thiserror::Error;
use tracing::debug;

use crate::syntax::{ParseError, SourceFile, TypeSpec, parse_file};

/// Name and size of a candidate `.go` file, as seen by a file filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileInfo<'a> {
    /// File name without directory.
    pub name: &'a str,
    /// Size in bytes.
    pub size: u64,
}

/// Predicate selecting which `.go` files to parse.
pub type FileFilter<'f> = dyn Fn(&FileInfo<'_>) -> bool + 'f;

/// Failure to load a package directory.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    /// The directory or a file could not be read.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path being read.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// A file is not valid Go.
    #[error("{path}:{source}")]
    Parse {
        /// File that failed to parse.
        path: Utf8PathBuf,
        /// Syntax error.
        #[source]
        source: ParseError,
    },
    /// An imported directory declares more than one package.
    #[error("found packages {} in {dir}", names.join(", "))]
    MultiplePackages {
        /// Directory searched.
        dir: Utf8PathBuf,
        /// Package names found.
        names: Vec<String>,
    },
}

/// A parsed file of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFile {
    /// File name without directory.
    pub name: String,
    /// Full path.
    pub path: Utf8PathBuf,
    /// Syntax tree.
    pub ast: SourceFile,
}

/// Files of one directory sharing a package clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Package name from the package clauses.
    pub name: String,
    /// Directory holding the files.
    pub dir: Utf8PathBuf,
    /// Files sorted by name.
    pub files: Vec<ParsedFile>,
}

impl ParsedFile {
    /// Returns `true` for `_test.go` files.
    #[must_use]
    pub fn is_test(&self) -> bool {
        self.name.ends_with("_test.go")
    }
}

impl Package {
    /// Every type declaration with its file, in file then source order.
    pub fn type_specs(&self) -> impl Iterator<Item = (&ParsedFile, &TypeSpec)> {
        self.files
            .iter()
            .flat_map(|file| file.ast.types.iter().map(move |spec| (file, spec)))
    }
}

fn io_error(path: &Utf8Path) -> impl FnOnce(io::Error) -> LoadError + '_ {
    move |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Parses every selected `.go` file in `dir` and groups the files by
/// package name.
///
/// Packages are returned in name order. Without a filter every `.go` file is
/// parsed.
///
/// # Errors
///
/// Returns a [`LoadError`] when the directory or a file cannot be read or a
/// file fails to parse.
pub fn load_dir(dir: &Utf8Path, filter: Option<&FileFilter<'_>>) -> Result<Vec<Package>, LoadError> {
    let files = read_go_files(dir, filter)?;
    let mut grouped: BTreeMap<String, Vec<ParsedFile>> = BTreeMap::new();
    for file in files {
        grouped.entry(file.ast.package.clone()).or_default().push(file);
    }
    Ok(grouped
        .into_iter()
        .map(|(name, files)| Package {
            name,
            dir: dir.to_path_buf(),
            files,
        })
        .collect())
}

/// Loads the package an import path resolved to.
///
/// Test files, files starting with `_` or `.`, and files constrained by
/// `//go:build ignore` are left out. Returns `Ok(None)` when no Go files
/// remain.
///
/// # Errors
///
/// As [`load_dir`], plus [`LoadError::MultiplePackages`] when the remaining
/// files disagree on the package name.
pub fn load_import_dir(dir: &Utf8Path) -> Result<Option<Package>, LoadError> {
    let filter = |info: &FileInfo<'_>| {
        !info.name.ends_with("_test.go")
            && !info.name.starts_with('_')
            && !info.name.starts_with('.')
    };
    let files: Vec<ParsedFile> = read_go_files(dir, Some(&filter))?
        .into_iter()
        .filter(|file| !file.ast.build_ignored)
        .collect();
    let mut names: Vec<String> = files.iter().map(|f| f.ast.package.clone()).collect();
    names.sort();
    names.dedup();
    if names.len() > 1 {
        return Err(LoadError::MultiplePackages {
            dir: dir.to_path_buf(),
            names,
        });
    }
    Ok(names.pop().map(|name| Package {
        name,
        dir: dir.to_path_buf(),
        files,
    }))
}

fn read_go_files(
    dir_path: &Utf8Path,
    filter: Option<&FileFilter<'_>>,
) -> Result<Vec<ParsedFile>, LoadError> {
    let dir = Dir::open_ambient_dir(dir_path, ambient_authority()).map_err(io_error(dir_path))?;
    let mut names = Vec::new();
    for entry in dir.entries().map_err(io_error(dir_path))? {
        let entry = entry.map_err(io_error(dir_path))?;
        let name = entry.file_name().map_err(io_error(dir_path))?;
        if !name.ends_with(".go") || !entry.file_type().map_err(io_error(dir_path))?.is_file() {
            continue;
        }
        let size = entry.metadata().map_err(io_error(dir_path))?.len();
        if filter.is_none_or(|keep| keep(&FileInfo { name: &name, size })) {
            names.push(name);
        }
    }
    names.sort();

    let mut files = Vec::with_capacity(names.len());
    for name in names {
        let path = dir_path.join(&name);
        let source = dir.read_to_string(&name).map_err(io_error(&path))?;
        let ast = parse_file(&source).map_err(|source| LoadError::Parse {
            path: path.clone(),
            source,
        })?;
        debug!(file = %path, package = %ast.package, "parsed Go file");
        files.push(ParsedFile { name, path, ast });
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    //! Unit tests for directory loading.

    use super::*;
    use rstest::rstest;
    use test_helpers::gotree::GoTree;

    #[rstest]
    fn groups_files_by_package_in_name_order() {
        let tree = GoTree::new()
            .file("b.go", "package demo\n")
            .file("a.go", "package demo\n")
            .file("a_test.go", "package demo_test\n")
            .file("notes.txt", "package nope\n");
        let packages = load_dir(tree.path(), None).expect("load");
        let summary: Vec<(&str, Vec<&str>)> = packages
            .iter()
            .map(|p| {
                (
                    p.name.as_str(),
                    p.files.iter().map(|f| f.name.as_str()).collect(),
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                ("demo", vec!["a.go", "b.go"]),
                ("demo_test", vec!["a_test.go"]),
            ]
        );
    }

    #[rstest]
    fn filter_sees_name_and_size() {
        let tree = GoTree::new()
            .file("keep.go", "package demo\n")
            .file("skip.go", "package demo\n");
        let filter = |info: &FileInfo<'_>| info.name == "keep.go" && info.size == 13;
        let packages = load_dir(tree.path(), Some(&filter)).expect("load");
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].files.len(), 1);
        assert_eq!(packages[0].files[0].name, "keep.go");
    }

    #[rstest]
    fn parse_errors_carry_the_file_path() {
        let tree = GoTree::new().file("broken.go", "package demo\ntype T struct {\n");
        let err = load_dir(tree.path(), None).expect_err("parse failure");
        match err {
            LoadError::Parse { path, .. } => assert!(path.ends_with("broken.go")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[rstest]
    fn missing_directory_is_an_io_error() {
        let tree = GoTree::new();
        let missing = tree.path().join("absent");
        assert!(matches!(
            load_dir(&missing, None),
            Err(LoadError::Io { .. })
        ));
    }

    #[rstest]
    fn import_dirs_skip_tests_and_ignored_files() {
        let tree = GoTree::new()
            .file("lib.go", "package lib\n")
            .file("lib_test.go", "package lib_test\n")
            .file("gen.go", "//go:build ignore\n\npackage main\n");
        let package = load_import_dir(tree.path())
            .expect("load")
            .expect("package present");
        assert_eq!(package.name, "lib");
        assert_eq!(package.files.len(), 1);
    }

    #[rstest]
    fn import_dirs_reject_mixed_packages() {
        let tree = GoTree::new()
            .file("a.go", "package a\n")
            .file("b.go", "package b\n");
        assert!(matches!(
            load_import_dir(tree.path()),
            Err(LoadError::MultiplePackages { .. })
        ));
    }

    #[rstest]
    fn import_dirs_without_go_files_are_empty() {
        let tree = GoTree::new().file("README.md", "# lib\n");
        assert!(load_import_dir(tree.path()).expect("load").is_none());
    }
}
