use std::error::Error;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use anyhow::anyhow;
use num_traits::Zero;

pub(super) fn get_env_mandatory_value<T, E>(key: &str) -> anyhow::Result<T>
where
    T: FromStr<Err = E>,
    E: Error + Send + Sync + 'static
{
    std::env::var(key)?
        .parse()
        .map_err(|e: E| anyhow!(e))
}

pub fn get_env_value_or_default<T, E>(key: &str, default: T) -> T
where
    T: FromStr<Err = E> + Display,
    E: Error + Send + Sync + 'static
{
    std::env::var(key)
        .map_err(|e| {
            log::warn!("no value was found for an optional environment variable {key}, using the default value {default}");
            anyhow!(e)
        })
        .and_then(|v| v.parse()
            .map_err(|e: E| {
                log::warn!("invalid value of the {key} environment variable, using the default value {default}");
                anyhow!(e)
            }))
        .unwrap_or(default)
}

/// Like [get_env_value_or_default] but zero is rejected as well.
pub(super) fn get_env_positive_or_default<T, E>(key: &str, default: T) -> T
where
    T: FromStr<Err = E> + Display + Zero + Copy,
    E: Error + Send + Sync + 'static
{
    let value = get_env_value_or_default(key, default);
    if value.is_zero() {
        log::warn!("{key} must not be zero, using the default value {default}");
        default
    } else {
        value
    }
}

/// A positive number of minutes as a [Duration]. Values too large to be counted in seconds
/// fall back to the default as well.
pub(super) fn get_env_minutes_or_default(key: &str, default: u64) -> Duration {
    let minutes = get_env_positive_or_default(key, default);
    let seconds = minutes.checked_mul(60).unwrap_or_else(|| {
        log::warn!("{key} is too large, using the default value {default}");
        default * 60
    });
    Duration::from_secs(seconds)
}

/// `Ok(None)` for an absent or empty variable, an error for an unparsable one.
pub(super) fn get_env_optional_value<T, E>(key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr<Err = E>,
    E: Error + Send + Sync + 'static
{
    match std::env::var(key) {
        Ok(value) if value.is_empty() => Ok(None),
        Ok(value) => value.parse()
            .map(Some)
            .map_err(|e: E| anyhow!("invalid value of the {key} environment variable: {e}")),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(anyhow!("invalid value of the {key} environment variable: {e}")),
    }
}
