//! Backoff policies and provider tuning knobs.
//!
//! The service applies capacity and network changes asynchronously, so the
//! handlers poll with a constant delay against a fixed time budget. Elapsed
//! time is accounted as attempts x delay, recorded in the callback context;
//! the process never sleeps through a stabilization window itself.

use serde::{Deserialize, Serialize};

/// Constant-delay backoff: re-probe every `delay_secs` until `timeout_secs`
/// of accumulated waiting, then fail with `Timeout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantBackoff {
    pub timeout_secs: u64,
    pub delay_secs: u64,
}

impl ConstantBackoff {
    /// Budget for operations expected to take a long time, such as capacity
    /// changes: 120 minutes at a 5 second probe interval.
    pub const STABILIZATION: Self = Self::new(7200, 5);

    /// Budget for pre-operation stability checks: 5 minutes at a 5 second
    /// probe interval.
    pub const PRE_OPERATION: Self = Self::new(300, 5);

    pub const fn new(timeout_secs: u64, delay_secs: u64) -> Self {
        Self {
            timeout_secs,
            delay_secs,
        }
    }

    /// Whether the accumulated wait (`attempts` probes at `delay_secs`
    /// apart) has exhausted the budget.
    pub fn expired(&self, attempts: u32) -> bool {
        u64::from(attempts) * self.delay_secs >= self.timeout_secs
    }
}

/// Tuning for a provider instance. Defaults match the service team's
/// published budgets; deserializable so a host can override them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Backoff for post-mutation stabilization waits.
    pub stabilization: ConstantBackoff,
    /// Backoff for the stability check before an update is attempted.
    pub preoperation: ConstantBackoff,
    /// How many times a post-create read may race NotFound before failing.
    pub not_found_retries: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            stabilization: ConstantBackoff::STABILIZATION,
            preoperation: ConstantBackoff::PRE_OPERATION,
            not_found_retries: crate::context::CallbackContext::DEFAULT_NOT_FOUND_RETRIES,
        }
    }
}
