//! Process-level options for [`run_with_options`](super::run_with_options).

use std::time::Duration;

use super::RuntimeError;

/// Environment variable holding the shutdown grace period in milliseconds (`0` disables it).
pub const SHUTDOWN_GRACE_ENV: &str = "APP_SHUTDOWN_GRACE_MS";

/// Environment variable enabling or disabling OS signal handling.
pub const HANDLE_SIGNALS_ENV: &str = "APP_HANDLE_SIGNALS";

const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeOptions {
    /// Cancel the run when the process receives Ctrl-C (or SIGTERM on Unix).
    pub handle_signals: bool,
    /// How long modules get to exit once shutdown was requested. `None` waits indefinitely.
    pub shutdown_grace: Option<Duration>,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            handle_signals: true,
            shutdown_grace: Some(DEFAULT_SHUTDOWN_GRACE),
        }
    }
}

impl RuntimeOptions {
    /// Defaults, overridden by [`SHUTDOWN_GRACE_ENV`] and [`HANDLE_SIGNALS_ENV`] when set.
    pub fn from_env() -> Result<Self, RuntimeError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, RuntimeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = Self::default();

        if let Some(value) = lookup(SHUTDOWN_GRACE_ENV) {
            let millis: u64 = value
                .trim()
                .parse()
                .map_err(|_| RuntimeError::InvalidOption {
                    name: SHUTDOWN_GRACE_ENV,
                    value: value.clone(),
                })?;
            options.shutdown_grace = (millis > 0).then(|| Duration::from_millis(millis));
        }

        if let Some(value) = lookup(HANDLE_SIGNALS_ENV) {
            options.handle_signals =
                parse_flag(&value).ok_or_else(|| RuntimeError::InvalidOption {
                    name: HANDLE_SIGNALS_ENV,
                    value: value.clone(),
                })?;
        }

        Ok(options)
    }

    pub fn with_signals(mut self, handle_signals: bool) -> Self {
        self.handle_signals = handle_signals;
        self
    }

    pub fn with_shutdown_grace(mut self, grace: Option<Duration>) -> Self {
        self.shutdown_grace = grace;
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
