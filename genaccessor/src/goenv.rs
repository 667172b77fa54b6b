//! Discovery of the Go toolchain layout and import path location.
//!
//! The semantic resolver needs to read the packages a file imports. This
//! module finds them the way the `go` command does for module-aware builds:
//! the main module first, then its `vendor` directory, then the standard
//! library under `GOROOT`, then the module cache, and finally `GOPATH`.

use std::env;
use std::io;
use std::process::Command;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::fs_helpers::{is_dir, read_optional_file};
use crate::gomod::{GoMod, GoModError, parse_go_mod, path_within};

/// Explicit toolchain locations; unset values are discovered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoEnvOptions {
    /// Standard library root.
    pub goroot: Option<Utf8PathBuf>,
    /// Module download cache.
    pub gomodcache: Option<Utf8PathBuf>,
    /// `GOPATH` entries.
    pub gopath: Option<Vec<Utf8PathBuf>>,
    /// `go` binary used for `go env`; `go` on `PATH` when unset.
    pub go_bin: Option<Utf8PathBuf>,
    /// Skip environment variables and `go env`; only explicit values count.
    pub explicit_only: bool,
}

/// Failure to read the module layout.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GoEnvError {
    /// `go.mod` could not be read.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// File being read.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// `go.mod` is malformed.
    #[error("{path}: {source}")]
    GoMod {
        /// File being parsed.
        path: Utf8PathBuf,
        /// Parse failure.
        #[source]
        source: GoModError,
    },
}

/// The module containing the target directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainModule {
    /// Directory holding `go.mod`.
    pub root: Utf8PathBuf,
    /// Parsed `go.mod`.
    pub gomod: GoMod,
}

/// Resolved toolchain layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoEnv {
    /// Standard library root, if known.
    pub goroot: Option<Utf8PathBuf>,
    /// Module cache, if known.
    pub gomodcache: Option<Utf8PathBuf>,
    /// `GOPATH` entries.
    pub gopath: Vec<Utf8PathBuf>,
    /// Main module, when the target lies inside one.
    pub module: Option<MainModule>,
}

impl GoEnv {
    /// Discovers the layout for packages in `target`.
    ///
    /// # Errors
    ///
    /// Returns a [`GoEnvError`] when a `go.mod` exists but cannot be read or
    /// parsed. A missing toolchain is not an error; [`GoEnv::goroot`] stays
    /// unset instead.
    pub fn discover(target: &Utf8Path, options: &GoEnvOptions) -> Result<Self, GoEnvError> {
        let mut goroot = options.goroot.clone();
        let mut gomodcache = options.gomodcache.clone();
        let mut gopath = options.gopath.clone();

        if !options.explicit_only {
            goroot = goroot.or_else(|| env_path("GOROOT"));
            gomodcache = gomodcache.or_else(|| env_path("GOMODCACHE"));
            gopath = gopath.or_else(|| env_list("GOPATH"));
            if goroot.is_none() || gomodcache.is_none() || gopath.is_none() {
                let queried = query_go_env(options.go_bin.as_deref());
                goroot = goroot.or(queried.goroot);
                gomodcache = gomodcache.or(queried.gomodcache);
                gopath = gopath.or(Some(queried.gopath).filter(|p| !p.is_empty()));
            }
        }
        let gopath = gopath.unwrap_or_default();
        let gomodcache = gomodcache.or_else(|| gopath.first().map(|p| p.join("pkg").join("mod")));
        let module = find_main_module(target)?;
        debug!(
            goroot = ?goroot,
            gomodcache = ?gomodcache,
            module = ?module.as_ref().map(|m| m.gomod.module.as_str()),
            "discovered Go environment"
        );
        Ok(Self {
            goroot,
            gomodcache,
            gopath,
            module,
        })
    }

    /// Directory holding the package for `import_path`, if one exists.
    #[must_use]
    pub fn locate(&self, import_path: &str) -> Option<Utf8PathBuf> {
        self.candidates(import_path).into_iter().find(|dir| is_dir(dir))
    }

    fn candidates(&self, import_path: &str) -> Vec<Utf8PathBuf> {
        let mut out = Vec::new();
        if let Some(module) = &self.module {
            if let Some(rest) = relative_to(import_path, &module.gomod.module) {
                out.push(module.root.join(rest));
            }
            out.push(module.root.join("vendor").join(import_path));
        }
        if let Some(goroot) = &self.goroot {
            let src = goroot.join("src");
            out.push(src.join(import_path));
            out.push(src.join("vendor").join(import_path));
        }
        if let Some(module) = &self.module {
            out.extend(self.module_cache_dir(module, import_path));
        }
        out.extend(self.gopath.iter().map(|p| p.join("src").join(import_path)));
        out
    }

    fn module_cache_dir(&self, module: &MainModule, import_path: &str) -> Option<Utf8PathBuf> {
        let require = module.gomod.owning_require(import_path)?;
        let rest = relative_to(import_path, &require.path)?;
        if let Some(replace) = module.gomod.replacement(&require.path, &require.version) {
            if replace.is_local() {
                return Some(module.root.join(&replace.new_path).join(rest));
            }
            let version = replace.new_version.as_deref().unwrap_or(&require.version);
            return self.gomodcache.as_ref().map(|cache| {
                cache
                    .join(format!("{}@{version}", escape_path(&replace.new_path)))
                    .join(rest)
            });
        }
        self.gomodcache.as_ref().map(|cache| {
            cache
                .join(format!("{}@{}", escape_path(&require.path), require.version))
                .join(rest)
        })
    }
}

/// Path of `import_path` below module `module`, `""` for the module root.
fn relative_to<'p>(import_path: &'p str, module: &str) -> Option<&'p str> {
    if !path_within(import_path, module) {
        return None;
    }
    import_path
        .get(module.len()..)
        .map(|rest| rest.trim_start_matches('/'))
}

/// Module cache escaping: every upper-case letter becomes `!` followed by
/// its lower-case form.
///
/// # Examples
///
/// ```
/// use genaccessor::goenv::escape_path;
///
/// assert_eq!(escape_path("github.com/BurntSushi/toml"), "github.com/!burnt!sushi/toml");
/// ```
#[must_use]
pub fn escape_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for ch in path.chars() {
        if ch.is_ascii_uppercase() {
            out.push('!');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

fn env_path(name: &str) -> Option<Utf8PathBuf> {
    env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .map(Utf8PathBuf::from)
}

fn env_list(name: &str) -> Option<Vec<Utf8PathBuf>> {
    let value = env::var_os(name)?;
    let paths: Vec<Utf8PathBuf> = env::split_paths(&value)
        .filter_map(|p| Utf8PathBuf::from_path_buf(p).ok())
        .filter(|p| !p.as_str().is_empty())
        .collect();
    (!paths.is_empty()).then_some(paths)
}

#[derive(Default)]
struct QueriedEnv {
    goroot: Option<Utf8PathBuf>,
    gomodcache: Option<Utf8PathBuf>,
    gopath: Vec<Utf8PathBuf>,
}

fn query_go_env(go_bin: Option<&Utf8Path>) -> QueriedEnv {
    let program = go_bin.map_or("go", Utf8Path::as_str);
    let output = match Command::new(program)
        .args(["env", "GOROOT", "GOMODCACHE", "GOPATH"])
        .output()
    {
        Ok(output) if output.status.success() => output,
        Ok(output) => {
            debug!(status = ?output.status.code(), "`go env` failed");
            return QueriedEnv::default();
        }
        Err(err) => {
            debug!(error = %err, program, "`go` is not available");
            return QueriedEnv::default();
        }
    };
    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut lines = stdout.lines().map(str::trim);
    let mut next_path = || {
        lines
            .next()
            .filter(|line| !line.is_empty())
            .map(Utf8PathBuf::from)
    };
    let goroot = next_path();
    let gomodcache = next_path();
    let gopath = next_path()
        .map(|joined| {
            env::split_paths(joined.as_str())
                .filter_map(|p| Utf8PathBuf::from_path_buf(p).ok())
                .collect()
        })
        .unwrap_or_default();
    QueriedEnv {
        goroot,
        gomodcache,
        gopath,
    }
}

fn find_main_module(target: &Utf8Path) -> Result<Option<MainModule>, GoEnvError> {
    let start = absolute(target);
    for dir in start.ancestors() {
        let path = dir.join("go.mod");
        let text = read_optional_file(&path).map_err(|source| GoEnvError::Io {
            path: path.clone(),
            source,
        })?;
        if let Some(text) = text {
            let gomod = parse_go_mod(&text).map_err(|source| GoEnvError::GoMod {
                path: path.clone(),
                source,
            })?;
            return Ok(Some(MainModule {
                root: dir.to_path_buf(),
                gomod,
            }));
        }
    }
    Ok(None)
}

fn absolute(path: &Utf8Path) -> Utf8PathBuf {
    path.canonicalize_utf8()
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    //! Unit tests for Go environment discovery.

    use super::*;
    use rstest::rstest;
    use test_helpers::env as test_env;
    use test_helpers::gotree::GoTree;

    fn explicit(tree: &GoTree) -> GoEnvOptions {
        GoEnvOptions {
            goroot: Some(tree.path().join("goroot")),
            gomodcache: Some(tree.path().join("modcache")),
            gopath: Some(vec![tree.path().join("gopath")]),
            go_bin: None,
            explicit_only: true,
        }
    }

    #[rstest]
    fn finds_main_module_from_nested_directory() {
        let tree = GoTree::new()
            .file("app/go.mod", "module example.com/app\n")
            .file("app/internal/models/user.go", "package models\n");
        let env = GoEnv::discover(&tree.path().join("app/internal/models"), &explicit(&tree))
            .expect("discover");
        let module = env.module.expect("main module");
        assert_eq!(module.gomod.module, "example.com/app");
        assert!(module.root.ends_with("app"));
    }

    #[rstest]
    fn locates_packages_in_search_order() {
        let tree = GoTree::new()
            .file(
                "app/go.mod",
                "module example.com/app\n\nrequire (\n\tgithub.com/Acme/lib v1.2.0\n\texample.com/local v0.0.0\n)\n\nreplace example.com/local => ../local\n",
            )
            .file("app/util/util.go", "package util\n")
            .file("app/vendor/example.com/vend/v.go", "package vend\n")
            .file("goroot/src/time/time.go", "package time\n")
            .file("modcache/github.com/!acme/lib@v1.2.0/sub/sub.go", "package sub\n")
            .file("local/x/x.go", "package x\n")
            .file("gopath/src/legacy/pkg/p.go", "package pkg\n");
        let env = GoEnv::discover(&tree.path().join("app"), &explicit(&tree)).expect("discover");

        let located = |path: &str, suffix: &str| {
            env.locate(path)
                .is_some_and(|dir| dir.ends_with(suffix))
        };
        assert!(located("example.com/app/util", "app/util"));
        assert!(located("example.com/vend", "app/vendor/example.com/vend"));
        assert!(located("example.com/local/x", "local/x"));
        assert!(located("time", "goroot/src/time"));
        assert!(located(
            "github.com/Acme/lib/sub",
            "modcache/github.com/!acme/lib@v1.2.0/sub"
        ));
        assert!(located("legacy/pkg", "gopath/src/legacy/pkg"));
        assert!(env.locate("example.com/missing").is_none());
    }

    #[rstest]
    fn explicit_only_leaves_unset_values_empty() {
        let tree = GoTree::new();
        let env = GoEnv::discover(tree.path(), &GoEnvOptions {
            explicit_only: true,
            ..GoEnvOptions::default()
        })
        .expect("discover");
        assert!(env.goroot.is_none());
        assert!(env.gomodcache.is_none());
        assert!(env.gopath.is_empty());
    }

    #[rstest]
    fn environment_fills_unset_locations() {
        let tree = GoTree::new().dir("goroot").dir("gopath");
        let _scope = test_env::without_go_toolchain();
        let _goroot = test_env::set_var("GOROOT", tree.path().join("goroot").as_str());
        let _gopath = test_env::set_var("GOPATH", tree.path().join("gopath").as_str());
        let options = GoEnvOptions {
            go_bin: Some(tree.path().join("bin/no-such-go")),
            ..GoEnvOptions::default()
        };
        let env = GoEnv::discover(tree.path(), &options).expect("discover");
        assert_eq!(env.goroot, Some(tree.path().join("goroot")));
        assert_eq!(env.gopath, vec![tree.path().join("gopath")]);
        assert_eq!(env.gomodcache, Some(tree.path().join("gopath/pkg/mod")));
    }

    #[rstest]
    fn explicit_values_win_over_environment() {
        let tree = GoTree::new();
        let _scope = test_env::without_go_toolchain();
        let _goroot = test_env::set_var("GOROOT", "/from/env");
        let env = GoEnv::discover(tree.path(), &GoEnvOptions {
            goroot: Some(tree.path().join("goroot")),
            go_bin: Some(tree.path().join("bin/no-such-go")),
            ..GoEnvOptions::default()
        })
        .expect("discover");
        assert_eq!(env.goroot, Some(tree.path().join("goroot")));
    }

    #[rstest]
    fn malformed_go_mod_is_reported() {
        let tree = GoTree::new().file("go.mod", "go 1.22\n");
        let err = GoEnv::discover(tree.path(), &explicit(&tree)).expect_err("bad go.mod");
        assert!(matches!(err, GoEnvError::GoMod { .. }));
    }
}
