//! # Dispute Resolution Feeding Reconciliation
//!
//! Online confirmation (cc-01), node exports read back from JSON files and
//! resolved (cc-02), then each node repairing its own state (cc-03).
//!
//! ## Flows Tested:
//!
//! 1. **Lost confirmation**: node 4 answered but never recorded the
//!    confirmation; resolution proves it and reconciliation repairs it
//! 2. **Vote never seen**: a node with no record of a confirmed vote
//!    reports an unrepairable divergence
//! 3. **Tampered export**: a node whose election event differs stops
//!    resolution entirely

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use cc_01_vote_confirmation::VoteConfirmationApi;
    use cc_02_dispute_resolver::adapters::{InMemoryExtractionSource, JsonFileExtractionSource};
    use cc_02_dispute_resolver::{
        DisputeResolution, DisputeResolverApi, DisputeResolverError, DisputeResolverService,
        NodeExtraction,
    };
    use cc_03_reconciliation::{
        ReconciliationApi, ReconciliationEngine, UpdateConfirmedVotingCardsInput,
    };
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::Arc;

    fn export(dir: &Path, extractions: &[NodeExtraction]) -> anyhow::Result<()> {
        for extraction in extractions {
            let path = dir.join(format!("node-{}.json", extraction.node_id.get()));
            std::fs::write(path, serde_json::to_vec_pretty(extraction)?)?;
        }
        Ok(())
    }

    fn reconciliation_input(
        node: u8,
        network: &SimulatedNetwork,
        allowed: &[&str],
        resolution: &DisputeResolution,
    ) -> UpdateConfirmedVotingCardsInput {
        let allow_lists: HashMap<String, Vec<String>> = HashMap::from([(
            VERIFICATION_CARD_SET_ID.to_string(),
            allowed
                .iter()
                .map(|vc| network.expected_commitment(vc).as_str().to_string())
                .collect(),
        )]);
        UpdateConfirmedVotingCardsInput::new(
            node,
            resolution.election_event_id.as_str(),
            allow_lists,
            resolution.confirmed_votes.clone(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_lost_confirmation_is_repaired() -> anyhow::Result<()> {
        let allowed = [CARD_A, CARD_B];
        let harness = ConfirmationHarness::start(&allowed);

        // Node 4 answers round two but loses its confirmation record.
        harness.network.node(4).set_drop_confirmations(true);
        let response = harness
            .service
            .confirm_vote(harness.request(confirmation_key(CARD_A), 0))
            .await?;
        assert!(response.outcome.is_confirmed());
        assert!(!harness.network.node(4).record(CARD_A).confirmed);

        // Card B was cast but never confirmed.
        let dir = tempfile::tempdir()?;
        export(dir.path(), &harness.network.extractions(&allowed, &allowed))?;

        let resolver = DisputeResolverService::new(Arc::new(JsonFileExtractionSource::new(dir.path())));
        let resolution = resolver.resolve().await?;
        assert!(resolution.votes_consistent);
        let resolved: Vec<&str> = resolution
            .confirmed_votes
            .iter()
            .map(|vote| vote.verification_card_id.as_str())
            .collect();
        assert_eq!(resolved, vec![CARD_A]);

        for node in harness.network.nodes() {
            let store = Arc::new(node.local_store());
            let engine = ReconciliationEngine::new(store.clone());
            let input = reconciliation_input(node.node_id().get(), &harness.network, &allowed, &resolution);

            let report = engine.reconcile_with_report(&input).await?;
            assert!(report.is_consistent(), "node {}", node.node_id());
            if node.node_id().get() == 4 {
                assert_eq!(report.repaired, vec![CARD_A.to_string()]);
            } else {
                assert_eq!(report.already_confirmed, vec![CARD_A.to_string()]);
            }
            assert_eq!(
                store.status(ELECTION_EVENT_ID, CARD_A),
                cc_03_reconciliation::LocalCardStatus::Confirmed
            );
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_node_without_cast_vote_cannot_reconcile() -> anyhow::Result<()> {
        let allowed = [CARD_A];
        let harness = ConfirmationHarness::start(&allowed);
        harness
            .service
            .confirm_vote(harness.request(confirmation_key(CARD_A), 0))
            .await?;

        let extractions = harness.network.extractions(&allowed, &allowed);
        let resolution = DisputeResolverService::new(Arc::new(InMemoryExtractionSource::new(extractions)))
            .resolve()
            .await?;
        assert_eq!(resolution.confirmed_votes.len(), 1);

        // Node 2 lost every record of the card.
        let node = harness.network.node(2);
        node.forget(CARD_A);
        let engine = ReconciliationEngine::new(Arc::new(node.local_store()));
        let input = reconciliation_input(2, &harness.network, &allowed, &resolution);

        assert!(!engine.reconcile(&input).await?);
        let report = engine.reconcile_with_report(&input).await?;
        assert_eq!(report.not_sent, vec![CARD_A.to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn test_tampered_election_event_stops_resolution() -> anyhow::Result<()> {
        let allowed = [CARD_A];
        let network = SimulatedNetwork::new();
        network.cast(CARD_A);

        let mut extractions = network.extractions(&allowed, &allowed);
        extractions[2]
            .election_event
            .verification_card_sets[0]
            .long_vote_cast_return_codes_allow_list
            .clear();

        let dir = tempfile::tempdir()?;
        export(dir.path(), &extractions)?;
        let err = DisputeResolverService::new(Arc::new(JsonFileExtractionSource::new(dir.path())))
            .resolve()
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DisputeResolverError::InconsistentElectionEvent { .. }
        ));
        Ok(())
    }
}
