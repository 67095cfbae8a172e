//! Error types for the dispute resolver

use shared_types::TypeError;
use thiserror::Error;

/// Dispute resolver errors
#[derive(Debug, Error)]
pub enum DisputeResolverError {
    /// Size, context or group violation in the extractions
    #[error(transparent)]
    Structural(#[from] TypeError),

    /// Two confirmed entries for one card with different shares
    #[error("Conflicting resolutions for verification card {verification_card_id}")]
    DuplicateResolution { verification_card_id: String },

    /// An extraction could not be obtained or decoded
    #[error("Extraction failed for node {node_id}: {reason}")]
    ExtractionFailed { node_id: u8, reason: String },

    /// The nodes do not agree on the election event itself
    #[error("Election event {election_event_id} differs between nodes")]
    InconsistentElectionEvent { election_event_id: String },

    /// Canonical encoding of a payload failed
    #[error("Encoding error: {0}")]
    Encoding(String),
}

/// Result type for dispute resolver operations
pub type DisputeResult<T> = Result<T, DisputeResolverError>;
