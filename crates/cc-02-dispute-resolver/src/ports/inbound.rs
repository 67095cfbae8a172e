//! Driving Ports (API - Inbound)

use crate::error::DisputeResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::ResolvedConfirmedVote;

/// Result of resolving one election event after the election.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeResolution {
    pub election_event_id: String,
    /// All four nodes hold byte-identical encrypted votes
    pub votes_consistent: bool,
    /// Provably confirmed votes, sorted by verification card id
    pub confirmed_votes: Vec<ResolvedConfirmedVote>,
}

/// Dispute resolver API
#[async_trait]
pub trait DisputeResolverApi: Send + Sync {
    /// Fetch the four node extractions and resolve them.
    ///
    /// An election event that differs between nodes is an error; no vote
    /// is resolved against an inconsistent context.
    async fn resolve(&self) -> DisputeResult<DisputeResolution>;
}
