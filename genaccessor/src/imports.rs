//! Collection and rendering of the import block of an output unit.

use std::collections::BTreeMap;

use thiserror::Error;

/// A package referenced by generated code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImportRef {
    /// Import path, e.g. `example.com/lib/v2`.
    pub path: String,
    /// Identifier the generated code uses for the package.
    pub name: String,
}

impl ImportRef {
    /// Creates a reference to `path` used as `name`.
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
        }
    }

    /// Last `/`-separated segment of the path.
    #[must_use]
    pub fn path_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Explicit alias needed in the import spec, if any.
    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        (self.name != self.path_name()).then_some(self.name.as_str())
    }

    /// Standard-library heuristic: fewer than three path segments and no
    /// dot.
    #[must_use]
    pub fn is_standard(&self) -> bool {
        self.path.split('/').count() < 3 && !self.path.contains('.')
    }
}

/// Two references cannot share one import block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ImportError {
    /// One path is referenced under two identifiers.
    #[error("import \"{path}\" is referenced both as `{first}` and as `{second}`")]
    PathAliased {
        /// Import path.
        path: String,
        /// Identifier recorded first.
        first: String,
        /// Conflicting identifier.
        second: String,
    },
    /// Two paths would bind the same identifier.
    #[error("identifier `{name}` refers to both \"{first}\" and \"{second}\"")]
    NameCollision {
        /// Shared identifier.
        name: String,
        /// Path recorded first.
        first: String,
        /// Conflicting path.
        second: String,
    },
}

/// Deduplicated set of [`ImportRef`]s for one package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSet {
    by_path: BTreeMap<String, String>,
}

impl ImportSet {
    /// An empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            by_path: BTreeMap::new(),
        }
    }

    /// Adds `import`, ignoring exact duplicates.
    ///
    /// # Errors
    ///
    /// Returns an [`ImportError`] when the reference conflicts with one
    /// already in the set.
    pub fn insert(&mut self, import: ImportRef) -> Result<(), ImportError> {
        if let Some(existing) = self.by_path.get(&import.path) {
            if *existing == import.name {
                return Ok(());
            }
            return Err(ImportError::PathAliased {
                path: import.path,
                first: existing.clone(),
                second: import.name,
            });
        }
        if let Some((path, _)) = self.by_path.iter().find(|(_, name)| **name == import.name) {
            return Err(ImportError::NameCollision {
                name: import.name,
                first: path.clone(),
                second: import.path,
            });
        }
        self.by_path.insert(import.path, import.name);
        Ok(())
    }

    /// Adds every reference in `imports`.
    ///
    /// # Errors
    ///
    /// Stops at the first conflict.
    pub fn extend(&mut self, imports: impl IntoIterator<Item = ImportRef>) -> Result<(), ImportError> {
        imports.into_iter().try_for_each(|import| self.insert(import))
    }

    /// Number of distinct paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    /// Returns `true` when no package is referenced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    /// References sorted by path.
    pub fn iter(&self) -> impl Iterator<Item = ImportRef> + '_ {
        self.by_path
            .iter()
            .map(|(path, name)| ImportRef::new(path.as_str(), name.as_str()))
    }

    /// Renders the import declaration.
    ///
    /// Standard-library paths come first, then the rest, each group sorted
    /// by path and separated by a blank line. The empty set renders as an
    /// empty string.
    ///
    /// # Examples
    ///
    /// ```
    /// use genaccessor::imports::{ImportRef, ImportSet};
    ///
    /// let mut set = ImportSet::new();
    /// set.insert(ImportRef::new("time", "time")).expect("no conflict");
    /// set.insert(ImportRef::new("example.com/lib/v2", "lib")).expect("no conflict");
    /// assert_eq!(
    ///     set.render(),
    ///     "import (\n\t\"time\"\n\n\tlib \"example.com/lib/v2\"\n)\n"
    /// );
    /// ```
    #[must_use]
    pub fn render(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        let (standard, other): (Vec<_>, Vec<_>) = self.iter().partition(ImportRef::is_standard);
        let mut out = String::from("import (\n");
        for (index, group) in [standard, other]
            .iter()
            .filter(|group| !group.is_empty())
            .enumerate()
        {
            if index > 0 {
                out.push('\n');
            }
            for import in group {
                out.push('\t');
                if let Some(alias) = import.alias() {
                    out.push_str(alias);
                    out.push(' ');
                }
                out.push('"');
                out.push_str(&import.path);
                out.push_str("\"\n");
            }
        }
        out.push_str(")\n");
        out
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for import aggregation.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("time", "time", None)]
    #[case("example.com/lib/v2", "lib", Some("lib"))]
    #[case("gopkg.in/yaml.v3", "yaml", Some("yaml"))]
    #[case("github.com/x/y", "y", None)]
    fn aliases_only_when_names_differ(
        #[case] path: &str,
        #[case] name: &str,
        #[case] alias: Option<&str>,
    ) {
        assert_eq!(ImportRef::new(path, name).alias(), alias);
    }

    #[rstest]
    #[case("fmt", true)]
    #[case("net/http", true)]
    #[case("net/http/httptest", false)]
    #[case("example.com/x", false)]
    fn classifies_standard_paths(#[case] path: &str, #[case] standard: bool) {
        assert_eq!(ImportRef::new(path, "x").is_standard(), standard);
    }

    #[rstest]
    fn deduplicates_by_path() {
        let mut set = ImportSet::new();
        set.insert(ImportRef::new("time", "time")).expect("insert");
        set.insert(ImportRef::new("time", "time")).expect("duplicate is fine");
        assert_eq!(set.len(), 1);
    }

    #[rstest]
    fn rejects_same_path_under_two_names() {
        let mut set = ImportSet::new();
        set.insert(ImportRef::new("time", "time")).expect("insert");
        let err = set
            .insert(ImportRef::new("time", "tm"))
            .expect_err("conflict");
        assert!(matches!(err, ImportError::PathAliased { .. }));
    }

    #[rstest]
    fn rejects_two_paths_under_one_name() {
        let mut set = ImportSet::new();
        set.insert(ImportRef::new("math/rand", "rand")).expect("insert");
        let err = set
            .insert(ImportRef::new("crypto/rand", "rand"))
            .expect_err("conflict");
        assert_eq!(
            err,
            ImportError::NameCollision {
                name: "rand".to_owned(),
                first: "math/rand".to_owned(),
                second: "crypto/rand".to_owned(),
            }
        );
    }

    #[rstest]
    fn renders_empty_set_as_nothing() {
        assert_eq!(ImportSet::new().render(), "");
    }

    #[rstest]
    fn renders_single_group_without_blank_line() {
        let mut set = ImportSet::new();
        set.extend([
            ImportRef::new("time", "time"),
            ImportRef::new("bytes", "bytes"),
        ])
        .expect("extend");
        assert_eq!(set.render(), "import (\n\t\"bytes\"\n\t\"time\"\n)\n");
    }
}
