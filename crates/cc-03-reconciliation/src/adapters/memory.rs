//! In-memory local confirmation store.

use crate::error::{ReconciliationError, ReconciliationResult};
use crate::ports::outbound::{LocalCardStatus, LocalConfirmationStore};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

type CardKey = (String, String);

/// Card statuses keyed by `(election_event_id, verification_card_id)`.
/// Unknown cards are `NotSent`.
#[derive(Default)]
pub struct InMemoryLocalConfirmationStore {
    cards: RwLock<HashMap<CardKey, LocalCardStatus>>,
}

impl InMemoryLocalConfirmationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(
        &self,
        election_event_id: &str,
        verification_card_id: &str,
        status: LocalCardStatus,
    ) {
        self.cards.write().insert(
            (election_event_id.to_string(), verification_card_id.to_string()),
            status,
        );
    }

    pub fn status(&self, election_event_id: &str, verification_card_id: &str) -> LocalCardStatus {
        self.cards
            .read()
            .get(&(election_event_id.to_string(), verification_card_id.to_string()))
            .copied()
            .unwrap_or(LocalCardStatus::NotSent)
    }
}

#[async_trait]
impl LocalConfirmationStore for InMemoryLocalConfirmationStore {
    async fn card_status(
        &self,
        election_event_id: &str,
        verification_card_id: &str,
    ) -> ReconciliationResult<LocalCardStatus> {
        Ok(self.status(election_event_id, verification_card_id))
    }

    async fn mark_confirmed(
        &self,
        election_event_id: &str,
        verification_card_id: &str,
    ) -> ReconciliationResult<()> {
        let mut cards = self.cards.write();
        let key = (election_event_id.to_string(), verification_card_id.to_string());
        match cards.get(&key).copied() {
            Some(LocalCardStatus::Sent) | Some(LocalCardStatus::Confirmed) => {
                cards.insert(key, LocalCardStatus::Confirmed);
                Ok(())
            }
            _ => Err(ReconciliationError::Storage {
                reason: format!("card {} was never sent", verification_card_id),
            }),
        }
    }
}
