//! Serialised environment mutation for tests.
//!
//! Toolchain discovery reads `GOROOT`, `GOPATH` and friends from the process
//! environment, which every test thread shares. All changes made here go
//! through one re-entrant lock, and each change is undone when its guard
//! drops: the old value comes back, or the variable is removed again if it
//! did not exist.
//!
//! # Examples
//!
//! ```
//! use genaccessor_test_helpers::env;
//!
//! let scope = env::EnvScope::apply([("GENACCESSOR_DOC_KEY", Some("value"))]);
//! assert_eq!(std::env::var("GENACCESSOR_DOC_KEY").as_deref(), Ok("value"));
//! drop(scope);
//! assert!(std::env::var("GENACCESSOR_DOC_KEY").is_err());
//! ```

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use std::env;
use std::ffi::OsString;
use std::sync::LazyLock;

static LOCK: LazyLock<ReentrantMutex<()>> = LazyLock::new(ReentrantMutex::default);

/// Variables through which the Go toolchain is discovered.
pub const GO_TOOLCHAIN_VARS: [&str; 4] = ["GOROOT", "GOPATH", "GOMODCACHE", "GOFLAGS"];

/// Undoes one change to one variable when dropped.
#[derive(Debug)]
#[must_use = "the change is undone as soon as the guard drops"]
pub struct EnvVarGuard {
    key: String,
    previous: Option<OsString>,
}

impl EnvVarGuard {
    fn change(key: &str, value: Option<&str>) -> Self {
        let _held = LOCK.lock();
        let previous = env::var_os(key);
        match value {
            // SAFETY: every environment write in the test process goes
            // through `LOCK`, which is held here.
            Some(value) => unsafe { env::set_var(key, value) },
            // SAFETY: as above.
            None => unsafe { env::remove_var(key) },
        }
        Self {
            key: key.to_owned(),
            previous,
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        let _held = LOCK.lock();
        match self.previous.take() {
            // SAFETY: `LOCK` is held.
            Some(previous) => unsafe { env::set_var(&self.key, previous) },
            // SAFETY: `LOCK` is held.
            None => unsafe { env::remove_var(&self.key) },
        }
    }
}

/// Sets `key` to `value` until the guard drops.
pub fn set_var(key: impl AsRef<str>, value: impl AsRef<str>) -> EnvVarGuard {
    EnvVarGuard::change(key.as_ref(), Some(value.as_ref()))
}

/// Removes `key` until the guard drops.
pub fn remove_var(key: impl AsRef<str>) -> EnvVarGuard {
    EnvVarGuard::change(key.as_ref(), None)
}

/// A batch of changes applied and held under the environment lock.
///
/// Other threads cannot touch the environment while the scope lives.
/// Changes are undone newest first when it drops.
#[must_use = "the changes are undone as soon as the scope drops"]
pub struct EnvScope {
    guards: Vec<EnvVarGuard>,
    _held: ReentrantMutexGuard<'static, ()>,
}

impl EnvScope {
    /// Applies `changes` in order: `Some` sets a variable, `None` removes it.
    pub fn apply<'a>(changes: impl IntoIterator<Item = (&'a str, Option<&'a str>)>) -> Self {
        let held = LOCK.lock();
        let guards = changes
            .into_iter()
            .map(|(key, value)| EnvVarGuard::change(key, value))
            .collect();
        Self {
            guards,
            _held: held,
        }
    }
}

impl Drop for EnvScope {
    fn drop(&mut self) {
        while let Some(guard) = self.guards.pop() {
            drop(guard);
        }
    }
}

/// Removes every [`GO_TOOLCHAIN_VARS`] entry for the scope's lifetime, so
/// discovery sees only explicit options and `go env`.
///
/// # Examples
///
/// ```
/// use genaccessor_test_helpers::env;
///
/// let _scope = env::without_go_toolchain();
/// assert!(std::env::var("GOROOT").is_err());
/// ```
pub fn without_go_toolchain() -> EnvScope {
    EnvScope::apply(GO_TOOLCHAIN_VARS.map(|key| (key, None)))
}
