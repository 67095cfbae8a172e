//! Error types for the vote confirmation subsystem
//!
//! Protocol outcomes a voter can retry from (window, attempts, agreement,
//! partial verification) are not errors here; they are
//! [`RejectionReason`](crate::domain::RejectionReason) values carried by a
//! rejected outcome.

use shared_types::TypeError;
use thiserror::Error;

/// Vote confirmation errors
#[derive(Debug, Error)]
pub enum ConfirmationError {
    /// Size, context or group violation in an input
    #[error(transparent)]
    Structural(#[from] TypeError),

    /// Attempt id outside `[0, max)`
    #[error("Confirmation attempt {attempt_id} out of range (max {max_attempts})")]
    AttemptOutOfRange { attempt_id: u8, max_attempts: u8 },

    /// No vote was ever cast with this card
    #[error("Vote not sent for verification card {verification_card_id}")]
    VoteNotSent { verification_card_id: String },

    /// The card is already confirmed
    #[error("Verification card {verification_card_id} already confirmed")]
    AlreadyConfirmed { verification_card_id: String },

    /// Another execution for this card holds the in-flight claim
    #[error("Confirmation of {verification_card_id} already in progress (attempt {attempt_id} refused)")]
    ConfirmationInProgress {
        verification_card_id: String,
        attempt_id: u8,
    },

    /// A payload failed signature verification
    #[error("Invalid signature on {payload} from {signer}")]
    InvalidSignature { signer: String, payload: &'static str },

    /// Action not allowed in the current session state
    #[error("Invalid session transition: cannot {action} from {from}")]
    InvalidTransition { from: String, action: &'static str },

    /// Broadcast or collection of node responses failed
    #[error("Transport error: {reason}")]
    Transport { reason: String },

    /// Persistence collaborator failed
    #[error("Storage error: {reason}")]
    Storage { reason: String },

    /// Short return code extraction failed
    #[error("Return code extraction failed: {reason}")]
    Extraction { reason: String },
}

impl ConfirmationError {
    /// Failures that say nothing about the voter's input. The attempt is
    /// not consumed and the idempotency claim is released.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            ConfirmationError::Transport { .. }
                | ConfirmationError::Storage { .. }
                | ConfirmationError::Extraction { .. }
        )
    }
}

/// Result type for vote confirmation operations
pub type ConfirmationResult<T> = Result<T, ConfirmationError>;
