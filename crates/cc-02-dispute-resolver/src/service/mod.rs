//! Dispute Resolver Service
//!
//! Runs the three consistency checks over one extraction per node:
//!
//! 1. Order the extractions by node; exactly one per node
//! 2. Election event must be identical everywhere, else resolution stops
//! 3. Encrypted votes compared byte for byte
//! 4. Confirmed votes re-derived from the hash shares and allow lists

use crate::domain::{ExtractedElectionEvent, ExtractedVerificationCard, ExtractionConsistencyChecker};
use crate::error::{DisputeResolverError, DisputeResult};
use crate::ports::inbound::{DisputeResolution, DisputeResolverApi};
use crate::ports::outbound::ExtractionSource;
use async_trait::async_trait;
use shared_types::order_by_node;
use std::sync::Arc;
use tracing::{info, warn};


/// Dispute resolver service
pub struct DisputeResolverService {
    source: Arc<dyn ExtractionSource>,
    checker: ExtractionConsistencyChecker,
}

impl DisputeResolverService {
    pub fn new(source: Arc<dyn ExtractionSource>) -> Self {
        Self {
            source,
            checker: ExtractionConsistencyChecker::new(),
        }
    }
}

#[async_trait]
impl DisputeResolverApi for DisputeResolverService {
    async fn resolve(&self) -> DisputeResult<DisputeResolution> {
        let extractions = order_by_node(self.source.fetch_all().await?)?;

        let events: Vec<ExtractedElectionEvent> = extractions
            .iter()
            .map(|extraction| extraction.election_event.clone())
            .collect();
        let context = &extractions[0].election_event;
        let election_event_id = context.election_event_id.clone();

        if !self.checker.check_election_event_consistency(&events)? {
            return Err(DisputeResolverError::InconsistentElectionEvent { election_event_id });
        }

        let card_lists: Vec<Vec<ExtractedVerificationCard>> = extractions
            .iter()
            .map(|extraction| extraction.verification_cards.clone())
            .collect();

        let votes_consistent = self.checker.check_vote_consistency(&card_lists)?;
        if !votes_consistent {
            warn!(
                "[cc-02] Encrypted votes of election event {} differ between nodes",
                election_event_id
            );
        }

        let confirmed_votes = self
            .checker
            .check_vote_confirmation_consistency(context, &card_lists)?;

        info!(
            "[cc-02] Resolved election event {}: votes consistent = {}, {} confirmed votes",
            election_event_id,
            votes_consistent,
            confirmed_votes.len()
        );

        Ok(DisputeResolution {
            election_event_id,
            votes_consistent,
            confirmed_votes,
        })
    }
}
