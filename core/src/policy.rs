//! Reconnect policy: exponential backoff with a ceiling

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::LiveReloadError;

/// Reconnect configuration.
///
/// The delay before reconnect attempt `n` (zero based) is
/// `min(max_delay, base_delay * multiplier^n)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconnectPolicy {
    /// Delay before the first reconnect, in milliseconds
    #[serde(default = "default_base_delay_ms")]
    base_delay_ms: u64,

    /// Upper bound for any reconnect delay, in milliseconds
    #[serde(default = "default_max_delay_ms")]
    max_delay_ms: u64,

    /// Growth factor applied per consecutive failure
    #[serde(default = "default_multiplier")]
    multiplier: f64,

    /// Consecutive reconnects allowed before giving up (None = retry forever)
    #[serde(default)]
    max_attempts: Option<u32>,
}

fn default_base_delay_ms() -> u64 {
    100
}

fn default_max_delay_ms() -> u64 {
    3_000
}

fn default_multiplier() -> f64 {
    2.0
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            multiplier: default_multiplier(),
            max_attempts: None,
        }
    }
}

fn ceil_millis(duration: Duration) -> u64 {
    let mut millis = duration.as_millis();
    if duration.subsec_nanos() % 1_000_000 != 0 {
        millis += 1;
    }
    u64::try_from(millis).unwrap_or(u64::MAX)
}

impl ReconnectPolicy {
    /// Create a policy with unbounded attempts.
    ///
    /// Delays are kept in whole milliseconds; sub-millisecond parts round up.
    pub fn new(base_delay: Duration, max_delay: Duration, multiplier: f64) -> Self {
        Self {
            base_delay_ms: ceil_millis(base_delay),
            max_delay_ms: ceil_millis(max_delay),
            multiplier,
            max_attempts: None,
        }
    }

    /// A policy that never reconnects: the first drop is final.
    pub fn never() -> Self {
        Self::default().with_max_attempts(0)
    }

    /// Limit the number of consecutive reconnect attempts
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    /// Delay before reconnect attempt `attempt` (zero based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let ceiling = self.max_delay_ms as f64;
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let raw = self.base_delay_ms as f64 * self.multiplier.powi(exponent);

        let millis = if raw.is_finite() { raw.min(ceiling) } else { ceiling };
        Duration::from_millis(millis as u64)
    }

    /// Whether `attempts` consecutive reconnects already use up the budget.
    pub fn is_exhausted(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }

    /// Reject policies whose delays would shrink or never grow past zero.
    pub fn validate(&self) -> Result<(), LiveReloadError> {
        if self.base_delay_ms == 0 {
            return Err(LiveReloadError::ConfigError(
                "reconnect base delay must be greater than zero".to_string(),
            ));
        }
        if self.base_delay_ms > self.max_delay_ms {
            return Err(LiveReloadError::ConfigError(format!(
                "reconnect base delay ({}ms) exceeds max delay ({}ms)",
                self.base_delay_ms, self.max_delay_ms
            )));
        }
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(LiveReloadError::ConfigError(format!(
                "reconnect multiplier must be a finite value >= 1.0, got {}",
                self.multiplier
            )));
        }
        Ok(())
    }
}
