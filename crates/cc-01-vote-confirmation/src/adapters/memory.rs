//! In-memory port implementations.
//!
//! Used by tests and single-process deployments. Every read-modify-write
//! happens under one lock, which gives the per-card atomicity the ports
//! require.

use crate::domain::{BallotBox, ConfirmationOutcome, ShortCode};
use crate::error::{ConfirmationError, ConfirmationResult};
use crate::ports::outbound::{
    AllowListStore, BallotBoxRepository, CardConfirmationState, CardStatus, Claim,
    ConfirmationStateStore, ExecutionKey, IdempotencyStore,
};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use shared_types::{CommitmentHash, ContextIds};
use std::collections::{HashMap, HashSet};

/// Allow lists keyed by verification card set id.
#[derive(Default)]
pub struct InMemoryAllowListStore {
    lists: RwLock<HashMap<String, HashSet<CommitmentHash>>>,
}

impl InMemoryAllowListStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish the allow list of a verification card set.
    pub fn publish(
        &self,
        verification_card_set_id: impl Into<String>,
        entries: impl IntoIterator<Item = CommitmentHash>,
    ) {
        self.lists
            .write()
            .insert(verification_card_set_id.into(), entries.into_iter().collect());
    }
}

#[async_trait]
impl AllowListStore for InMemoryAllowListStore {
    async fn get_long_vote_cast_allow_list(
        &self,
        verification_card_set_id: &str,
    ) -> ConfirmationResult<HashSet<CommitmentHash>> {
        self.lists
            .read()
            .get(verification_card_set_id)
            .cloned()
            .ok_or_else(|| ConfirmationError::Storage {
                reason: format!(
                    "no allow list published for verification card set {}",
                    verification_card_set_id
                ),
            })
    }
}

/// Ballot boxes keyed by (election event id, verification card set id).
#[derive(Default)]
pub struct InMemoryBallotBoxRepository {
    ballot_boxes: RwLock<HashMap<(String, String), BallotBox>>,
}

impl InMemoryBallotBoxRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &self,
        election_event_id: impl Into<String>,
        verification_card_set_id: impl Into<String>,
        ballot_box: BallotBox,
    ) {
        self.ballot_boxes.write().insert(
            (election_event_id.into(), verification_card_set_id.into()),
            ballot_box,
        );
    }

    /// Seal a ballot box for mixing.
    pub fn mark_mixed(&self, election_event_id: &str, verification_card_set_id: &str) -> bool {
        let key = (
            election_event_id.to_string(),
            verification_card_set_id.to_string(),
        );
        match self.ballot_boxes.write().get_mut(&key) {
            Some(ballot_box) => {
                ballot_box.mixed = true;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl BallotBoxRepository for InMemoryBallotBoxRepository {
    async fn get_ballot_box(
        &self,
        election_event_id: &str,
        verification_card_set_id: &str,
    ) -> ConfirmationResult<BallotBox> {
        let key = (
            election_event_id.to_string(),
            verification_card_set_id.to_string(),
        );
        self.ballot_boxes
            .read()
            .get(&key)
            .cloned()
            .ok_or_else(|| ConfirmationError::Storage {
                reason: format!(
                    "no ballot box for {}/{}",
                    election_event_id, verification_card_set_id
                ),
            })
    }
}

/// Per-card confirmation state. Unknown cards read as `NotSent`.
#[derive(Default)]
pub struct InMemoryConfirmationStateStore {
    cards: Mutex<HashMap<ContextIds, CardConfirmationState>>,
}

impl InMemoryConfirmationStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a vote was cast with this card.
    pub fn mark_sent(&self, context_ids: &ContextIds) {
        self.cards
            .lock()
            .entry(context_ids.clone())
            .or_insert(CardConfirmationState {
                status: CardStatus::Sent,
                attempts: 0,
                short_code: None,
            });
    }

    /// Current state, for inspection.
    pub fn snapshot(&self, context_ids: &ContextIds) -> Option<CardConfirmationState> {
        self.cards.lock().get(context_ids).cloned()
    }
}

#[async_trait]
impl ConfirmationStateStore for InMemoryConfirmationStateStore {
    async fn load(&self, context_ids: &ContextIds) -> ConfirmationResult<CardConfirmationState> {
        Ok(self
            .cards
            .lock()
            .get(context_ids)
            .cloned()
            .unwrap_or(CardConfirmationState {
                status: CardStatus::NotSent,
                attempts: 0,
                short_code: None,
            }))
    }

    async fn increment_attempts(&self, context_ids: &ContextIds) -> ConfirmationResult<u8> {
        let mut cards = self.cards.lock();
        let card = cards
            .get_mut(context_ids)
            .ok_or_else(|| ConfirmationError::Storage {
                reason: format!("no card state for {}", context_ids),
            })?;
        card.attempts = card.attempts.saturating_add(1);
        Ok(card.attempts)
    }

    async fn mark_confirmed(
        &self,
        context_ids: &ContextIds,
        short_code: ShortCode,
    ) -> ConfirmationResult<()> {
        let mut cards = self.cards.lock();
        let card = cards
            .get_mut(context_ids)
            .ok_or_else(|| ConfirmationError::Storage {
                reason: format!("no card state for {}", context_ids),
            })?;
        card.status = CardStatus::Confirmed;
        card.short_code = Some(short_code);
        Ok(())
    }
}

#[derive(Default)]
struct Executions {
    /// Finished executions, replayed by (card, attempt).
    completed: HashMap<ExecutionKey, ConfirmationOutcome>,
    /// Cards with a running execution, whatever its attempt id.
    in_flight: HashSet<String>,
}

/// Completed outcomes per execution key and one in-flight claim per card.
#[derive(Default)]
pub struct InMemoryIdempotencyStore {
    executions: Mutex<Executions>,
}

impl InMemoryIdempotencyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any attempt for this card is currently running.
    pub fn is_in_flight(&self, verification_card_id: &str) -> bool {
        self.executions
            .lock()
            .in_flight
            .contains(verification_card_id)
    }
}

#[async_trait]
impl IdempotencyStore for InMemoryIdempotencyStore {
    async fn claim(&self, key: &ExecutionKey) -> ConfirmationResult<Claim> {
        let mut executions = self.executions.lock();
        if let Some(outcome) = executions.completed.get(key) {
            return Ok(Claim::Completed(outcome.clone()));
        }
        if executions.in_flight.insert(key.verification_card_id.clone()) {
            Ok(Claim::Fresh)
        } else {
            Ok(Claim::InFlight)
        }
    }

    async fn complete(
        &self,
        key: &ExecutionKey,
        outcome: ConfirmationOutcome,
    ) -> ConfirmationResult<()> {
        let mut executions = self.executions.lock();
        executions.in_flight.remove(&key.verification_card_id);
        executions.completed.insert(key.clone(), outcome);
        Ok(())
    }

    async fn release(&self, key: &ExecutionKey) -> ConfirmationResult<()> {
        self.executions
            .lock()
            .in_flight
            .remove(&key.verification_card_id);
        Ok(())
    }
}
