//! Minimal `go.mod` reader: module path, requirements and replacements.

use thiserror::Error;

/// A `go.mod` file that cannot be understood.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum GoModError {
    /// No `module` directive.
    #[error("go.mod has no module directive")]
    MissingModule,
    /// A directive has the wrong shape.
    #[error("go.mod:{line}: {message}")]
    Malformed {
        /// One-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },
}

/// A `require` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Require {
    /// Module path.
    pub path: String,
    /// Required version.
    pub version: String,
}

/// A `replace` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replace {
    /// Module path being replaced.
    pub old_path: String,
    /// Version being replaced; `None` replaces every version.
    pub old_version: Option<String>,
    /// Replacement module path or local directory.
    pub new_path: String,
    /// Replacement version; `None` for local directories.
    pub new_version: Option<String>,
}

impl Replace {
    /// Returns `true` when the replacement is a filesystem path.
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.new_version.is_none()
            && (self.new_path.starts_with("./")
                || self.new_path.starts_with("../")
                || self.new_path.starts_with('/'))
    }
}

/// Parsed `go.mod`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoMod {
    /// Module path.
    pub module: String,
    /// Requirements in file order.
    pub requires: Vec<Require>,
    /// Replacements in file order.
    pub replaces: Vec<Replace>,
}

impl GoMod {
    /// The requirement whose module path is the longest prefix of
    /// `import_path`.
    #[must_use]
    pub fn owning_require(&self, import_path: &str) -> Option<&Require> {
        self.requires
            .iter()
            .filter(|req| path_within(import_path, &req.path))
            .max_by_key(|req| req.path.len())
    }

    /// The replacement applying to `module` at `version`. Version-specific
    /// replacements win over wildcard ones.
    #[must_use]
    pub fn replacement(&self, module: &str, version: &str) -> Option<&Replace> {
        let matching = || self.replaces.iter().filter(move |r| r.old_path == module);
        matching()
            .find(|r| r.old_version.as_deref() == Some(version))
            .or_else(|| matching().find(|r| r.old_version.is_none()))
    }
}

/// Returns `true` when `path` equals `prefix` or lies below it.
#[must_use]
pub fn path_within(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Parses the text of a `go.mod` file.
///
/// # Errors
///
/// Returns a [`GoModError`] when the module directive is missing or a
/// `module`, `require` or `replace` line is malformed.
///
/// # Examples
///
/// ```
/// use genaccessor::gomod::parse_go_mod;
///
/// let gomod = parse_go_mod("module example.com/app\n\nrequire example.com/lib/v2 v2.1.0\n")
///     .expect("valid go.mod");
/// assert_eq!(gomod.module, "example.com/app");
/// assert_eq!(gomod.requires[0].version, "v2.1.0");
/// ```
pub fn parse_go_mod(source: &str) -> Result<GoMod, GoModError> {
    let mut module = None;
    let mut requires = Vec::new();
    let mut replaces = Vec::new();
    let mut block: Option<String> = None;

    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let words = split_words(strip_comment(raw));
        let Some(first) = words.first() else {
            continue;
        };

        let (verb, args) = if let Some(verb) = &block {
            if first == ")" {
                block = None;
                continue;
            }
            (verb.clone(), words.as_slice())
        } else if words.get(1).map(String::as_str) == Some("(") && words.len() == 2 {
            block = Some(first.clone());
            continue;
        } else {
            (first.clone(), words.get(1..).unwrap_or_default())
        };

        let malformed = |message: &str| GoModError::Malformed {
            line,
            message: message.to_owned(),
        };
        match verb.as_str() {
            "module" => match args {
                [path] => module = Some(path.clone()),
                _ => return Err(malformed("usage: module module/path")),
            },
            "require" => match args {
                [path, version] => requires.push(Require {
                    path: path.clone(),
                    version: version.clone(),
                }),
                _ => return Err(malformed("usage: require module/path v1.2.3")),
            },
            "replace" => replaces.push(parse_replace(args).ok_or_else(|| {
                malformed("usage: replace module/path [v1.2.3] => other/module [v1.4.5]")
            })?),
            _ => {}
        }
    }

    Ok(GoMod {
        module: module.ok_or(GoModError::MissingModule)?,
        requires,
        replaces,
    })
}

fn parse_replace(args: &[String]) -> Option<Replace> {
    let arrow = args.iter().position(|w| w == "=>")?;
    let (old, new) = (args.get(..arrow)?, args.get(arrow + 1..)?);
    let (old_path, old_version) = match old {
        [path] => (path.clone(), None),
        [path, version] => (path.clone(), Some(version.clone())),
        _ => return None,
    };
    let (new_path, new_version) = match new {
        [path] => (path.clone(), None),
        [path, version] => (path.clone(), Some(version.clone())),
        _ => return None,
    };
    Some(Replace {
        old_path,
        old_version,
        new_path,
        new_version,
    })
}

fn strip_comment(line: &str) -> &str {
    let mut in_quotes = false;
    let mut prev_slash = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' | '`' => in_quotes = !in_quotes,
            '/' if !in_quotes && prev_slash => {
                return line.get(..index.saturating_sub(1)).unwrap_or(line);
            }
            _ => {}
        }
        prev_slash = ch == '/';
    }
    line
}

fn split_words(line: &str) -> Vec<String> {
    line.split_whitespace()
        .map(|word| {
            word.strip_prefix('"')
                .and_then(|w| w.strip_suffix('"'))
                .or_else(|| word.strip_prefix('`').and_then(|w| w.strip_suffix('`')))
                .unwrap_or(word)
                .to_owned()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    //! Unit tests for go.mod parsing.

    use super::*;
    use rstest::rstest;

    const SAMPLE: &str = r#"// sample module
module example.com/app

go 1.22

require (
	example.com/lib/v2 v2.1.0 // indirect
	"github.com/Foo/bar" v1.0.0
)

require golang.org/x/text v0.14.0

replace example.com/lib/v2 => ../lib
replace (
	github.com/Foo/bar v1.0.0 => github.com/fork/bar v1.0.1
)
"#;

    #[rstest]
    fn parses_blocks_and_single_lines() {
        let gomod = parse_go_mod(SAMPLE).expect("parse");
        assert_eq!(gomod.module, "example.com/app");
        let required: Vec<_> = gomod.requires.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(
            required,
            vec!["example.com/lib/v2", "github.com/Foo/bar", "golang.org/x/text"]
        );
        assert_eq!(gomod.replaces.len(), 2);
        assert!(gomod.replaces[0].is_local());
        assert!(!gomod.replaces[1].is_local());
    }

    #[rstest]
    #[case("example.com/lib/v2/sub", Some("example.com/lib/v2"))]
    #[case("example.com/lib/v2", Some("example.com/lib/v2"))]
    #[case("example.com/lib/v22", None)]
    fn finds_owning_requirement(#[case] import_path: &str, #[case] expected: Option<&str>) {
        let gomod = parse_go_mod(SAMPLE).expect("parse");
        assert_eq!(
            gomod.owning_require(import_path).map(|r| r.path.as_str()),
            expected
        );
    }

    #[rstest]
    fn version_specific_replacements_win() {
        let gomod = parse_go_mod(
            "module m\nreplace a v1.0.0 => b v1.0.0\nreplace a => ./local\n",
        )
        .expect("parse");
        let replacement = gomod.replacement("a", "v1.0.0").expect("replacement");
        assert_eq!(replacement.new_path, "b");
        let wildcard = gomod.replacement("a", "v2.0.0").expect("replacement");
        assert_eq!(wildcard.new_path, "./local");
    }

    #[rstest]
    #[case("go 1.22\n", GoModError::MissingModule)]
    #[case("module\n", GoModError::Malformed { line: 1, message: "usage: module module/path".to_owned() })]
    #[case("module m\nrequire x\n", GoModError::Malformed { line: 2, message: "usage: require module/path v1.2.3".to_owned() })]
    fn rejects_malformed_files(#[case] source: &str, #[case] expected: GoModError) {
        assert_eq!(parse_go_mod(source), Err(expected));
    }
}
