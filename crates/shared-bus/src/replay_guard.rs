//! # Time-Bounded Replay Guard
//!
//! Delivery between nodes is at-least-once, so the same response message can
//! arrive more than once. The guard remembers message ids for a bounded
//! window and rejects repeats inside it.
//!
//! - Message ids are remembered for `validity_window_secs` after first sight
//! - Expired ids are garbage-collected every `gc_interval_secs`
//! - Time is passed in by the caller, so the guard is deterministic in tests

use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// Errors from replay checks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReplayError {
    /// The message id was already seen inside the window.
    #[error("Message {message_id} already processed (replay)")]
    ReplayDetected { message_id: Uuid },
}

/// Time-bounded cache of processed message ids.
pub struct ReplayGuard {
    /// message id -> unix second when first seen.
    seen: HashMap<Uuid, u64>,
    validity_window_secs: u64,
    last_gc: u64,
    gc_interval_secs: u64,
}

impl ReplayGuard {
    /// Default validity window.
    pub const DEFAULT_VALIDITY_WINDOW: u64 = 120;

    /// Default garbage collection interval.
    pub const DEFAULT_GC_INTERVAL: u64 = 10;

    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Self::DEFAULT_VALIDITY_WINDOW, Self::DEFAULT_GC_INTERVAL)
    }

    #[must_use]
    pub fn with_config(validity_window_secs: u64, gc_interval_secs: u64) -> Self {
        Self {
            seen: HashMap::new(),
            validity_window_secs,
            last_gc: 0,
            gc_interval_secs,
        }
    }

    /// Record `message_id` at time `now`, rejecting it if already seen.
    ///
    /// # Errors
    ///
    /// - `ReplayError::ReplayDetected` - id seen within the validity window
    pub fn check_and_record(&mut self, message_id: Uuid, now: u64) -> Result<(), ReplayError> {
        if now.saturating_sub(self.last_gc) > self.gc_interval_secs {
            self.garbage_collect(now);
            self.last_gc = now;
        }

        if self.seen.contains_key(&message_id) {
            return Err(ReplayError::ReplayDetected { message_id });
        }

        self.seen.insert(message_id, now);
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, message_id: &Uuid) -> bool {
        self.seen.contains_key(message_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    fn garbage_collect(&mut self, now: u64) {
        let expiry_threshold = now.saturating_sub(self.validity_window_secs);
        self.seen.retain(|_, &mut ts| ts > expiry_threshold);
    }
}

impl Default for ReplayGuard {
    fn default() -> Self {
        Self::new()
    }
}
