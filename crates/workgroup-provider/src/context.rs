//! Callback context threaded through cooperative re-invocations.
//!
//! The scheduler persists this context between invocations, so everything
//! the polling loop needs to resume - the current stage and the backoff
//! bookkeeping - lives here rather than in process memory.

use serde::{Deserialize, Serialize};

/// Where a multi-step lifecycle operation currently stands.
///
/// `None` in [`CallbackContext::stage`] means the operation has not issued
/// its first mutating call yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    // Create
    AwaitWorkgroupAvailable,
    AwaitNamespaceAvailable,
    // Update
    StabilizeBeforeUpdate,
    ReconcileTags,
    StabilizeAfterTags,
    ApplyWorkgroupUpdate,
    StabilizeAfterUpdate,
    // Delete
    AwaitWorkgroupDeleted,
}

/// Per-invocation mutable state, created fresh at the start of a lifecycle
/// operation and discarded once it reaches a terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallbackContext {
    /// Current stage marker; drives dispatch on re-invocation.
    pub stage: Option<Stage>,
    /// Stabilization probes performed in the current stage. Together with
    /// the policy's constant delay this accounts elapsed wait time.
    pub stabilization_attempts: u32,
    /// Remaining retries for a read racing NotFound right after create.
    pub retries_on_not_found: u32,
}

impl CallbackContext {
    pub const DEFAULT_NOT_FOUND_RETRIES: u32 = 5;

    pub fn new(retries_on_not_found: u32) -> Self {
        Self {
            stage: None,
            stabilization_attempts: 0,
            retries_on_not_found,
        }
    }

    /// Move to the next stage, resetting the stabilization counter so the
    /// new stage gets its full backoff budget.
    pub fn advance(&mut self, stage: Stage) {
        self.stage = Some(stage);
        self.stabilization_attempts = 0;
    }

    /// Consume one NotFound retry. Returns false once the budget is spent,
    /// at which point the NotFound should classify and fail.
    pub fn consume_not_found_retry(&mut self) -> bool {
        if self.retries_on_not_found == 0 {
            return false;
        }
        self.retries_on_not_found -= 1;
        true
    }
}

impl Default for CallbackContext {
    fn default() -> Self {
        Self::new(Self::DEFAULT_NOT_FOUND_RETRIES)
    }
}
