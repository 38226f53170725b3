//! Verification settings.
//!
//! Loaded once at start (YAML file, key/value overrides, environment) and
//! shared read-only behind an `Arc` by every scenario.

use crate::result::{ViewError, ViewResult};
use crate::wait::{
    WaitOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS, MIN_POLL_INTERVAL_MS,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix of environment variables read by [`VerifyConfig::from_env`]
pub const ENV_PREFIX: &str = "BLOCKVIEW_";

/// Timeout, polling and the three appearance-check switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// Polling window for every wait, in milliseconds
    #[serde(alias = "timeout")]
    pub timeout_ms: u64,
    /// Pause between polling rounds, in milliseconds
    #[serde(alias = "pollingInterval")]
    pub polling_interval_ms: u64,
    /// Mandatory elements must appear
    #[serde(alias = "isMandatory")]
    pub check_mandatory: bool,
    /// Hidden elements must be hidden or absent
    #[serde(alias = "isHidden")]
    pub check_hidden: bool,
    /// Primary elements must appear
    #[serde(alias = "isAppeared")]
    pub check_primary: bool,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            polling_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            check_mandatory: true,
            check_hidden: true,
            check_primary: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    Timeout,
    PollingInterval,
    CheckMandatory,
    CheckHidden,
    CheckPrimary,
}

impl Key {
    fn parse(raw: &str) -> Option<Self> {
        let folded: String = raw
            .chars()
            .filter(|c| *c != '_' && *c != '-' && *c != '.')
            .collect::<String>()
            .to_lowercase();
        match folded.as_str() {
            "timeoutms" | "timeout" => Some(Self::Timeout),
            "pollingintervalms" | "pollinginterval" => Some(Self::PollingInterval),
            "checkmandatory" | "ismandatory" => Some(Self::CheckMandatory),
            "checkhidden" | "ishidden" => Some(Self::CheckHidden),
            "checkprimary" | "isappeared" => Some(Self::CheckPrimary),
            _ => None,
        }
    }
}

impl VerifyConfig {
    /// Defaults: 4000 ms timeout, 200 ms polling, mandatory and hidden checks on
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the polling window
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the polling interval; zero is raised to [`MIN_POLL_INTERVAL_MS`]
    #[must_use]
    pub const fn with_polling_interval_ms(mut self, polling_interval_ms: u64) -> Self {
        self.polling_interval_ms = if polling_interval_ms < MIN_POLL_INTERVAL_MS {
            MIN_POLL_INTERVAL_MS
        } else {
            polling_interval_ms
        };
        self
    }

    /// Enable or disable the mandatory check
    #[must_use]
    pub const fn with_check_mandatory(mut self, enabled: bool) -> Self {
        self.check_mandatory = enabled;
        self
    }

    /// Enable or disable the hidden check
    #[must_use]
    pub const fn with_check_hidden(mut self, enabled: bool) -> Self {
        self.check_hidden = enabled;
        self
    }

    /// Enable or disable the primary check
    #[must_use]
    pub const fn with_check_primary(mut self, enabled: bool) -> Self {
        self.check_primary = enabled;
        self
    }

    /// Wait options for the configured window
    #[must_use]
    pub const fn wait_options(&self) -> WaitOptions {
        WaitOptions::from_millis(self.timeout_ms, self.polling_interval_ms)
    }

    /// Same settings with a different timeout
    #[must_use]
    pub const fn wait_options_with_timeout(&self, timeout_ms: u64) -> WaitOptions {
        WaitOptions::from_millis(timeout_ms, self.polling_interval_ms)
    }

    /// Reject values no wait can run with
    pub fn validate(&self) -> ViewResult<()> {
        if self.polling_interval_ms == 0 {
            return Err(ViewError::config("polling interval must be greater than 0 ms"));
        }
        Ok(())
    }

    /// Parse YAML. Missing keys keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> ViewResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> ViewResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!(path = %path.as_ref().display(), ?config, "loaded verification config");
        Ok(config)
    }

    /// Apply `key = value` properties on top of the current values.
    ///
    /// Keys are matched ignoring case and separators, so `timeout`,
    /// `timeout_ms` and `TIMEOUT_MS` are the same key. Unknown keys are skipped.
    pub fn apply_overrides<I, K, V>(&mut self, properties: I) -> ViewResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in properties {
            let (key, value) = (key.as_ref(), value.as_ref().trim());
            let Some(parsed) = Key::parse(key) else {
                tracing::trace!(key, "ignoring unknown config key");
                continue;
            };
            match parsed {
                Key::Timeout => self.timeout_ms = parse_millis(key, value)?,
                Key::PollingInterval => self.polling_interval_ms = parse_millis(key, value)?,
                Key::CheckMandatory => self.check_mandatory = parse_flag(key, value)?,
                Key::CheckHidden => self.check_hidden = parse_flag(key, value)?,
                Key::CheckPrimary => self.check_primary = parse_flag(key, value)?,
            }
        }
        self.validate()
    }

    /// Defaults overridden by `BLOCKVIEW_*` environment variables
    pub fn from_env() -> ViewResult<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Defaults overridden by the `BLOCKVIEW_*` entries of `vars`
    pub fn from_vars<I>(vars: I) -> ViewResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut config = Self::default();
        config.apply_overrides(vars.into_iter().filter_map(|(key, value)| {
            key.strip_prefix(ENV_PREFIX)
                .map(|stripped| (stripped.to_string(), value))
        }))?;
        Ok(config)
    }
}

fn parse_millis(key: &str, value: &str) -> ViewResult<u64> {
    value
        .parse()
        .map_err(|_| ViewError::config(format!("{key}: expected milliseconds, got '{value}'")))
}

fn parse_flag(key: &str, value: &str) -> ViewResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ViewError::config(format!(
            "{key}: expected true or false, got '{value}'"
        ))),
    }
}
