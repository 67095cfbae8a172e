//! Confirmation window of a ballot box.
//!
//! ```text
//!   start_time                finish_time        finish_time + grace
//!       │◄──────── voting ─────────►│◄──── grace ────►│
//!       ▲ inclusive                                   ▲ inclusive
//! ```
//!
//! A mixed (sealed) ballot box accepts no confirmation regardless of time.

use serde::{Deserialize, Serialize};
use shared_types::GqGroup;
use std::fmt;

/// Ballot box of one verification card set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotBox {
    pub ballot_box_id: String,
    /// Election encryption group
    pub group: GqGroup,
    /// Unix seconds
    pub start_time: u64,
    /// Unix seconds
    pub finish_time: u64,
    pub grace_period_secs: u64,
    /// Sealed for mixing
    pub mixed: bool,
}

impl BallotBox {
    /// Last second a confirmation is still accepted.
    pub fn last_confirmation_time(&self) -> u64 {
        self.finish_time.saturating_add(self.grace_period_secs)
    }

    /// Check `now` against the confirmation window.
    pub fn check_window(&self, now: u64) -> Result<(), WindowViolation> {
        if self.mixed {
            return Err(WindowViolation::BallotBoxMixed);
        }
        if now < self.start_time {
            return Err(WindowViolation::NotStarted {
                now,
                start_time: self.start_time,
            });
        }
        let last = self.last_confirmation_time();
        if now > last {
            return Err(WindowViolation::Closed {
                now,
                last_confirmation_time: last,
            });
        }
        Ok(())
    }
}

/// Why a confirmation fell outside the window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowViolation {
    NotStarted { now: u64, start_time: u64 },
    Closed { now: u64, last_confirmation_time: u64 },
    BallotBoxMixed,
}

impl fmt::Display for WindowViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowViolation::NotStarted { now, start_time } => {
                write!(f, "ballot box opens at {}, now {}", start_time, now)
            }
            WindowViolation::Closed {
                now,
                last_confirmation_time,
            } => write!(
                f,
                "ballot box closed at {} (grace included), now {}",
                last_confirmation_time, now
            ),
            WindowViolation::BallotBoxMixed => write!(f, "ballot box already mixed"),
        }
    }
}
