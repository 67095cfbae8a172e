//! Confirmation session state machine
//!
//! One session per `(context_ids, attempt_id)`. The session is driven from
//! outside: the service feeds it each complete round of node responses and
//! the session decides.
//!
//! ```text
//! [INITIAL] ──begin──→ [CONFIRMING] ──await_hash_shares──→ [AWAITING_HASH_SHARES]
//!     │                                                            │
//!     │ window / attempts                          evaluate_hash_agreement
//!     ↓                                                            ↓
//! [REJECTED] ←──────── rejected ──────────────── [AGREEMENT_EVALUATED {accepted}]
//!     ↑                                                            │ accepted
//!     │                                                    await_value_shares
//!     │                                                            ↓
//!     └──────── partial / mismatch ───────────────── [AWAITING_VALUE_SHARES]
//!                                                                  │ all verified
//!                                                               confirm
//!                                                                  ↓
//!                                                            [CONFIRMED]
//! ```

use super::shares::{ConfirmationKey, HashShare, ShortCode, ValueShare};
use super::window::{BallotBox, WindowViolation};
use crate::error::{ConfirmationError, ConfirmationResult};
use serde::{Deserialize, Serialize};
use shared_crypto::AgreementHasher;
use shared_types::{
    ensure_node_count, into_node_array, order_by_node, CommitmentHash, ContextIds, GqGroup,
    GroupElement, TypeError, NODE_COUNT,
};
use std::collections::HashSet;
use std::fmt;

/// Attempts a voter gets per verification card.
pub const MAX_CONFIRMATION_ATTEMPTS: u8 = 5;

/// Identity of one confirmation session.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub context_ids: ContextIds,
    pub attempt_id: u8,
}

/// Why a confirmation was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectionReason {
    /// Outside the ballot box window or ballot box mixed
    Window(WindowViolation),
    /// Attempt counter already at the cap
    AttemptsExhausted,
    /// Agreement hash not in the published allow list
    AgreementRejected,
    /// Not every node verified the confirmation key
    PartialVerification,
    /// A value share disagrees with the session's context or group
    ContextMismatch,
}

impl RejectionReason {
    /// Stable label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            RejectionReason::Window(_) => "window_violation",
            RejectionReason::AttemptsExhausted => "attempts_exhausted",
            RejectionReason::AgreementRejected => "agreement_rejected",
            RejectionReason::PartialVerification => "partial_verification",
            RejectionReason::ContextMismatch => "context_mismatch",
        }
    }

    /// Whether this rejection used up one of the voter's attempts.
    pub fn consumes_attempt(&self) -> bool {
        matches!(
            self,
            RejectionReason::AgreementRejected
                | RejectionReason::PartialVerification
                | RejectionReason::ContextMismatch
        )
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::Window(violation) => write!(f, "window violation: {}", violation),
            other => f.write_str(other.label()),
        }
    }
}

/// Terminal result of a confirmation attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfirmationOutcome {
    Confirmed {
        short_code: ShortCode,
    },
    Rejected {
        reason: RejectionReason,
        remaining_attempts: u8,
    },
}

impl ConfirmationOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, ConfirmationOutcome::Confirmed { .. })
    }
}

/// Session state
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Initial,
    Confirming,
    AwaitingHashShares,
    AgreementEvaluated { accepted: bool },
    AwaitingValueShares,
    Confirmed { short_code: ShortCode },
    Rejected {
        reason: RejectionReason,
        remaining_attempts: u8,
    },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Initial => "INITIAL",
            SessionState::Confirming => "CONFIRMING",
            SessionState::AwaitingHashShares => "AWAITING_HASH_SHARES",
            SessionState::AgreementEvaluated { .. } => "AGREEMENT_EVALUATED",
            SessionState::AwaitingValueShares => "AWAITING_VALUE_SHARES",
            SessionState::Confirmed { .. } => "CONFIRMED",
            SessionState::Rejected { .. } => "REJECTED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Confirmed { .. } | SessionState::Rejected { .. }
        )
    }
}

/// Result of the hash-share round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgreementEvaluation {
    pub commitment_hash: CommitmentHash,
    pub accepted: bool,
}

/// Result of the value-share round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValueShareEvaluation {
    /// All N shares verified; actual shares in node order
    Verified([GroupElement; NODE_COUNT]),
    Failed(RejectionReason),
}

/// One complete round of node responses.
#[derive(Clone, Debug)]
pub enum RoundInput {
    HashShares(Vec<HashShare>),
    ValueShares(Vec<ValueShare>),
}

/// What [`ConfirmationSession::advance`] decided.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoundOutcome {
    Agreement(AgreementEvaluation),
    Values(ValueShareEvaluation),
}

/// Per-ballot, per-attempt confirmation state machine.
#[derive(Debug)]
pub struct ConfirmationSession {
    key: SessionKey,
    group: GqGroup,
    confirmation_key: ConfirmationKey,
    max_attempts: u8,
    state: SessionState,
    verified_shares: Option<[GroupElement; NODE_COUNT]>,
}

impl ConfirmationSession {
    /// Create a session in `INITIAL`.
    ///
    /// # Errors
    ///
    /// - `AttemptOutOfRange` if `attempt_id >= max_attempts`
    /// - `ContextMismatch` if the confirmation key is bound to another
    ///   context or group
    pub fn new(
        key: SessionKey,
        group: GqGroup,
        confirmation_key: ConfirmationKey,
        max_attempts: u8,
    ) -> ConfirmationResult<Self> {
        if key.attempt_id >= max_attempts {
            return Err(ConfirmationError::AttemptOutOfRange {
                attempt_id: key.attempt_id,
                max_attempts,
            });
        }
        confirmation_key.ensure_bound_to(&key.context_ids, &group)?;

        Ok(Self {
            key,
            group,
            confirmation_key,
            max_attempts,
            state: SessionState::Initial,
            verified_shares: None,
        })
    }

    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    pub fn context_ids(&self) -> &ContextIds {
        &self.key.context_ids
    }

    pub fn confirmation_key(&self) -> &ConfirmationKey {
        &self.confirmation_key
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Terminal outcome, once reached.
    pub fn outcome(&self) -> Option<ConfirmationOutcome> {
        match &self.state {
            SessionState::Confirmed { short_code } => Some(ConfirmationOutcome::Confirmed {
                short_code: short_code.clone(),
            }),
            SessionState::Rejected {
                reason,
                remaining_attempts,
            } => Some(ConfirmationOutcome::Rejected {
                reason: *reason,
                remaining_attempts: *remaining_attempts,
            }),
            _ => None,
        }
    }

    /// Verified actual shares, once the value round succeeded.
    pub fn verified_shares(&self) -> Option<&[GroupElement; NODE_COUNT]> {
        self.verified_shares.as_ref()
    }

    /// INITIAL → CONFIRMING, or straight to REJECTED when the card has no
    /// attempts left or the ballot box does not accept confirmations now.
    pub fn begin(
        &mut self,
        ballot_box: &BallotBox,
        now: u64,
        attempts_used: u8,
    ) -> ConfirmationResult<&SessionState> {
        self.expect_state(matches!(self.state, SessionState::Initial), "begin")?;
        if ballot_box.group != self.group {
            return Err(TypeError::ContextMismatch {
                reason: format!(
                    "ballot box {} group differs from the session group",
                    ballot_box.ballot_box_id
                ),
            }
            .into());
        }

        if attempts_used >= self.max_attempts {
            self.state = SessionState::Rejected {
                reason: RejectionReason::AttemptsExhausted,
                remaining_attempts: 0,
            };
        } else if let Err(violation) = ballot_box.check_window(now) {
            self.state = SessionState::Rejected {
                reason: RejectionReason::Window(violation),
                remaining_attempts: self.remaining_after(attempts_used),
            };
        } else {
            self.state = SessionState::Confirming;
        }
        Ok(&self.state)
    }

    /// CONFIRMING → AWAITING_HASH_SHARES, once the request is broadcast.
    pub fn await_hash_shares(&mut self) -> ConfirmationResult<()> {
        self.expect_state(
            matches!(self.state, SessionState::Confirming),
            "await hash shares",
        )?;
        self.state = SessionState::AwaitingHashShares;
        Ok(())
    }

    /// Decide agreement on a complete hash-share round.
    ///
    /// Shares are sorted by node before hashing; the order they arrived in
    /// does not matter.
    pub fn evaluate_hash_agreement(
        &mut self,
        shares: Vec<HashShare>,
        allow_list: &HashSet<CommitmentHash>,
    ) -> ConfirmationResult<AgreementEvaluation> {
        self.expect_state(
            matches!(self.state, SessionState::AwaitingHashShares),
            "evaluate hash agreement",
        )?;
        ensure_node_count(shares.len())?;
        for share in &shares {
            self.key
                .context_ids
                .ensure_matches(&share.context_ids, "hash share")?;
            if share.confirmation_attempt_id != self.key.attempt_id {
                return Err(TypeError::ContextMismatch {
                    reason: format!(
                        "hash share from node {} is for attempt {}, expected {}",
                        share.node_id, share.confirmation_attempt_id, self.key.attempt_id
                    ),
                }
                .into());
            }
        }

        let ordered = order_by_node(shares)?;
        let hashes = ordered.map(|share| share.hash_value);
        let commitment_hash = AgreementHasher::agree_lvcc_hashes(&self.key.context_ids, &hashes);
        let accepted = allow_list.contains(&commitment_hash);

        self.state = SessionState::AgreementEvaluated { accepted };
        Ok(AgreementEvaluation {
            commitment_hash,
            accepted,
        })
    }

    /// AGREEMENT_EVALUATED{accepted} → AWAITING_VALUE_SHARES.
    pub fn await_value_shares(&mut self) -> ConfirmationResult<()> {
        self.expect_state(
            matches!(self.state, SessionState::AgreementEvaluated { accepted: true }),
            "await value shares",
        )?;
        self.state = SessionState::AwaitingValueShares;
        Ok(())
    }

    /// Check a complete value-share round.
    ///
    /// A wrong round size, a duplicate node or a share whose verification
    /// flag disagrees with its value is a structural error. Context
    /// or group disagreement and unverified shares are rejections.
    pub fn evaluate_value_shares(
        &mut self,
        shares: Vec<ValueShare>,
    ) -> ConfirmationResult<ValueShareEvaluation> {
        self.expect_state(
            matches!(self.state, SessionState::AwaitingValueShares)
                && self.verified_shares.is_none(),
            "evaluate value shares",
        )?;
        ensure_node_count(shares.len())?;
        let ordered = order_by_node(shares)?;
        for share in ordered.iter() {
            share.ensure_well_formed()?;
        }

        if ordered
            .iter()
            .any(|share| share.ensure_consistent(&self.key.context_ids, &self.group).is_err())
        {
            return Ok(ValueShareEvaluation::Failed(RejectionReason::ContextMismatch));
        }

        let mut actual = Vec::with_capacity(NODE_COUNT);
        for share in ordered {
            match (share.is_verified, share.actual_share) {
                (true, Some(element)) => actual.push(element),
                _ => {
                    return Ok(ValueShareEvaluation::Failed(
                        RejectionReason::PartialVerification,
                    ))
                }
            }
        }

        let actual = into_node_array(actual)?;
        self.verified_shares = Some(actual.clone());
        Ok(ValueShareEvaluation::Verified(actual))
    }

    /// Feed one complete round to the session.
    pub fn advance(
        &mut self,
        input: RoundInput,
        allow_list: &HashSet<CommitmentHash>,
    ) -> ConfirmationResult<RoundOutcome> {
        match input {
            RoundInput::HashShares(shares) => self
                .evaluate_hash_agreement(shares, allow_list)
                .map(RoundOutcome::Agreement),
            RoundInput::ValueShares(shares) => self
                .evaluate_value_shares(shares)
                .map(RoundOutcome::Values),
        }
    }

    /// AWAITING_VALUE_SHARES (verified) → CONFIRMED.
    pub fn confirm(&mut self, short_code: ShortCode) -> ConfirmationResult<ConfirmationOutcome> {
        self.expect_state(
            matches!(self.state, SessionState::AwaitingValueShares)
                && self.verified_shares.is_some(),
            "confirm",
        )?;
        self.state = SessionState::Confirmed { short_code };
        self.outcome().ok_or_else(|| self.transition_error("confirm"))
    }

    /// Any non-terminal state → REJECTED. `attempts_used` is the counter
    /// value after any increment for this rejection.
    pub fn reject(
        &mut self,
        reason: RejectionReason,
        attempts_used: u8,
    ) -> ConfirmationResult<ConfirmationOutcome> {
        self.expect_state(!self.state.is_terminal(), "reject")?;
        self.state = SessionState::Rejected {
            reason,
            remaining_attempts: self.remaining_after(attempts_used),
        };
        self.outcome().ok_or_else(|| self.transition_error("reject"))
    }

    fn remaining_after(&self, attempts_used: u8) -> u8 {
        self.max_attempts.saturating_sub(attempts_used)
    }

    fn expect_state(&self, allowed: bool, action: &'static str) -> ConfirmationResult<()> {
        if allowed {
            Ok(())
        } else {
            Err(self.transition_error(action))
        }
    }

    fn transition_error(&self, action: &'static str) -> ConfirmationError {
        ConfirmationError::InvalidTransition {
            from: self.state.name().to_string(),
            action,
        }
    }
}
