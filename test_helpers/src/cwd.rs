//! Running test code from another working directory.
//!
//! `go-genaccessor` resolves its default target against `.`, which every test
//! thread shares. [`in_dir`] runs a closure from a given directory while
//! holding a process-wide lock and returns to the previous directory
//! afterwards, whether or not the closure succeeded.
//!
//! # Examples
//!
//! ```
//! use camino::Utf8PathBuf;
//! use genaccessor_test_helpers::cwd;
//!
//! let tmp = Utf8PathBuf::from_path_buf(std::env::temp_dir()).expect("UTF-8 temp dir");
//! let seen = cwd::in_dir(&tmp, || Ok(std::env::current_dir()?)).expect("run in dir");
//! assert_eq!(seen.canonicalize()?, tmp.canonicalize()?);
//! # Ok::<(), std::io::Error>(())
//! ```

use std::env;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use parking_lot::{Mutex, MutexGuard};
use std::sync::LazyLock;

static WORKING_DIR: LazyLock<Mutex<()>> = LazyLock::new(Mutex::default);

/// Holds the working-directory lock and the directory to return to.
#[must_use = "the previous working directory comes back when the guard drops"]
pub struct DirGuard {
    previous: Utf8PathBuf,
    _held: MutexGuard<'static, ()>,
}

impl DirGuard {
    /// Directory restored on drop.
    #[must_use]
    pub fn previous(&self) -> &Utf8Path {
        &self.previous
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        if let Err(err) = env::set_current_dir(&self.previous) {
            panic!("cannot return to {}: {err}", self.previous);
        }
    }
}

/// Makes `dir` the working directory until the guard drops.
///
/// # Errors
///
/// Fails when the current directory cannot be read or is not UTF-8, or
/// when `dir` cannot be entered. Nothing changes on failure.
pub fn set_dir(dir: impl AsRef<Utf8Path>) -> Result<DirGuard> {
    let held = WORKING_DIR.lock();
    let previous = env::current_dir()
        .context("read working directory")
        .and_then(|path| Utf8PathBuf::try_from(path).context("working directory is not UTF-8"))?;
    let dir = dir.as_ref();
    env::set_current_dir(dir).with_context(|| format!("enter {dir}"))?;
    Ok(DirGuard {
        previous,
        _held: held,
    })
}

/// Runs `f` with `dir` as the working directory.
///
/// # Errors
///
/// Returns the error of [`set_dir`] or of `f`.
pub fn in_dir<T>(dir: impl AsRef<Utf8Path>, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let _guard = set_dir(dir)?;
    f()
}
