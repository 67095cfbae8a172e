//! Driven Ports (SPI - Outbound Dependencies)
//!
//! Everything the confirmation protocol needs from the outside world:
//! published allow lists, ballot boxes, per-card state, idempotent
//! execution, the broadcast to the four nodes and return-code extraction.

use crate::domain::{
    BallotBox, ConfirmationKey, ConfirmationOutcome, HashShare, ShortCode, ValueShare,
};
use crate::error::ConfirmationResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::{CommitmentHash, ContextIds, GroupElement, NODE_COUNT};
use std::collections::HashSet;

/// Published long vote cast return code allow lists.
///
/// Read-only while voting is open.
#[async_trait]
pub trait AllowListStore: Send + Sync {
    async fn get_long_vote_cast_allow_list(
        &self,
        verification_card_set_id: &str,
    ) -> ConfirmationResult<HashSet<CommitmentHash>>;
}

/// Ballot box lookup.
#[async_trait]
pub trait BallotBoxRepository: Send + Sync {
    async fn get_ballot_box(
        &self,
        election_event_id: &str,
        verification_card_set_id: &str,
    ) -> ConfirmationResult<BallotBox>;
}

/// Lifecycle of a verification card on this node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardStatus {
    NotSent,
    Sent,
    Confirmed,
}

/// Persisted confirmation state of one card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardConfirmationState {
    pub status: CardStatus,
    pub attempts: u8,
    pub short_code: Option<ShortCode>,
}

/// Per-card confirmation state.
///
/// `increment_attempts` and `mark_confirmed` are atomic read-modify-write
/// operations per card.
#[async_trait]
pub trait ConfirmationStateStore: Send + Sync {
    async fn load(&self, context_ids: &ContextIds) -> ConfirmationResult<CardConfirmationState>;

    /// Consume one attempt; returns the counter after the increment.
    async fn increment_attempts(&self, context_ids: &ContextIds) -> ConfirmationResult<u8>;

    async fn mark_confirmed(
        &self,
        context_ids: &ContextIds,
        short_code: ShortCode,
    ) -> ConfirmationResult<()>;
}

/// Execution key for at-most-once confirmation.
///
/// Completed outcomes are replayed per (card, attempt); the in-flight claim
/// is held per card, so only one attempt of a card runs at a time.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutionKey {
    pub verification_card_id: String,
    pub attempt_id: u8,
}

/// Result of claiming an execution key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Claim {
    /// Caller owns the execution
    Fresh,
    /// Some attempt for the same card is still running
    InFlight,
    /// Finished earlier with this outcome
    Completed(ConfirmationOutcome),
}

/// Idempotent-execution bookkeeping.
#[async_trait]
pub trait IdempotencyStore: Send + Sync {
    async fn claim(&self, key: &ExecutionKey) -> ConfirmationResult<Claim>;

    async fn complete(
        &self,
        key: &ExecutionKey,
        outcome: ConfirmationOutcome,
    ) -> ConfirmationResult<()>;

    /// Give up a claim without an outcome, so the card can run again.
    async fn release(&self, key: &ExecutionKey) -> ConfirmationResult<()>;
}

/// Round one request broadcast to every node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashShareRequest {
    pub context_ids: ContextIds,
    pub confirmation_key: ConfirmationKey,
    pub confirmation_attempt_id: u8,
}

/// Round two request broadcast to every node after hash agreement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueShareRequest {
    pub context_ids: ContextIds,
    pub confirmation_key: ConfirmationKey,
    pub confirmation_attempt_id: u8,
    pub commitment_hash: CommitmentHash,
}

/// Broadcast to the N control components and collect their answers.
///
/// Implementations return only once N responses arrived; timeouts and
/// delivery failures surface as `ConfirmationError::Transport`.
#[async_trait]
pub trait ControlComponentBus: Send + Sync {
    async fn request_hash_shares(
        &self,
        request: HashShareRequest,
    ) -> ConfirmationResult<Vec<HashShare>>;

    async fn request_value_shares(
        &self,
        request: ValueShareRequest,
    ) -> ConfirmationResult<Vec<ValueShare>>;
}

/// Combines N verified value shares into the short vote cast return code.
pub trait ReturnCodeExtractor: Send + Sync {
    fn extract_short_code(
        &self,
        context_ids: &ContextIds,
        shares: &[GroupElement; NODE_COUNT],
    ) -> ConfirmationResult<ShortCode>;
}

/// Time source abstraction for testability
pub trait TimeSource: Send + Sync {
    /// Get current unix timestamp in seconds
    fn now(&self) -> u64;
}

/// Default time source using system time
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}
