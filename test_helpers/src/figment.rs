//! `figment::Jail` wrapper for configuration tests.

use anyhow::{Result, anyhow};

/// Runs `f` inside a [`figment::Jail`] and returns its output.
///
/// The jail gives the closure a scratch working directory and an isolated
/// environment, both torn down when it returns.
///
/// # Errors
///
/// Returns the jail's failure or the closure's error as an
/// [`anyhow::Error`].
///
/// # Examples
///
/// ```
/// use genaccessor_test_helpers::figment::with_jail;
///
/// let value = with_jail(|jail| {
///     jail.set_env("GENACCESSOR_DOC", "1");
///     Ok(std::env::var("GENACCESSOR_DOC").ok())
/// })
/// .expect("jail");
/// assert_eq!(value.as_deref(), Some("1"));
/// ```
pub fn with_jail<F, T>(f: F) -> Result<T>
where
    F: FnOnce(&mut figment::Jail) -> figment::error::Result<T>,
{
    let mut output = None;
    figment::Jail::try_with(|jail| {
        output = Some(f(jail)?);
        Ok(())
    })
    .map_err(|err| anyhow!(err.to_string()))?;
    output.ok_or_else(|| anyhow!("jail closure did not return a value"))
}

/// Converts any displayable error into a [`figment::Error`] so it can be
/// returned from a jail closure with `?`.
#[expect(
    clippy::needless_pass_by_value,
    reason = "used with map_err, which passes the error by value"
)]
pub fn figment_error<E: ToString>(err: E) -> figment::Error {
    figment::Error::from(err.to_string())
}
