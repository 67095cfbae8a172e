//! Error types for reconciliation

use shared_types::TypeError;
use thiserror::Error;

/// Reconciliation errors
#[derive(Debug, Error)]
pub enum ReconciliationError {
    /// Node range, identifier, share count or allow-list entry violation
    #[error(transparent)]
    Structural(#[from] TypeError),

    /// No allow list was supplied
    #[error("No long vote cast return code allow lists supplied")]
    EmptyAllowLists,

    /// Two resolved votes for one card
    #[error("Verification card {verification_card_id} resolved more than once")]
    DuplicateResolution { verification_card_id: String },

    /// The local confirmation store failed
    #[error("Storage error: {reason}")]
    Storage { reason: String },
}

/// Result type for reconciliation operations
pub type ReconciliationResult<T> = Result<T, ReconciliationError>;
