//! # Vote Confirmation over the Fan-In Bus
//!
//! cc-01 talking to four simulated control components through
//! `FanInBus` + `ChannelBroadcaster`, with at-least-once delivery.
//!
//! ## Flows Tested:
//!
//! 1. **Happy path**: both rounds complete, every node records the confirmation
//! 2. **Mistyped code**: agreement rejected, attempt consumed, retry succeeds
//! 3. **Silent node**: round times out, attempt not consumed, same attempt retried

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use cc_01_vote_confirmation::ports::outbound::CardStatus;
    use cc_01_vote_confirmation::{
        ConfirmationError, ConfirmationOutcome, RejectionReason, VoteConfirmationApi,
        MAX_CONFIRMATION_ATTEMPTS,
    };

    #[tokio::test]
    async fn test_confirmation_completes_over_fan_in_bus() {
        let harness = ConfirmationHarness::start(&[CARD_A]);

        let response = harness
            .service
            .confirm_vote(harness.request(confirmation_key(CARD_A), 0))
            .await
            .unwrap();

        assert!(!response.replayed);
        assert!(response.outcome.is_confirmed());
        for node in harness.network.nodes() {
            assert!(node.record(CARD_A).confirmed, "node {}", node.node_id());
        }
        let state = harness.card_states.snapshot(&context_ids(CARD_A)).unwrap();
        assert_eq!(state.status, CardStatus::Confirmed);
        // Redelivered responses never leave a round behind.
        assert_eq!(harness.bus.open_rounds(), 0);
    }

    #[tokio::test]
    async fn test_mistyped_code_consumes_attempt_then_confirms() {
        let harness = ConfirmationHarness::start(&[CARD_A]);

        let rejected = harness
            .service
            .confirm_vote(harness.request(wrong_confirmation_key(CARD_A), 0))
            .await
            .unwrap();
        assert_eq!(
            rejected.outcome,
            ConfirmationOutcome::Rejected {
                reason: RejectionReason::AgreementRejected,
                remaining_attempts: MAX_CONFIRMATION_ATTEMPTS - 1,
            }
        );
        // No node reveals a value share for a rejected agreement.
        assert!(!harness.network.node(1).record(CARD_A).confirmed);

        let confirmed = harness
            .service
            .confirm_vote(harness.request(confirmation_key(CARD_A), 1))
            .await
            .unwrap();
        let ConfirmationOutcome::Confirmed { short_code } = confirmed.outcome else {
            panic!("expected confirmation on the second attempt");
        };
        let state = harness.card_states.snapshot(&context_ids(CARD_A)).unwrap();
        assert_eq!(state.attempts, 1);
        assert_eq!(state.short_code, Some(short_code));
    }

    #[tokio::test]
    async fn test_silent_node_times_out_without_consuming_attempt() {
        let harness = ConfirmationHarness::start(&[CARD_A]);
        harness.network.node(3).set_silent(true);

        let err = harness
            .service
            .confirm_vote(harness.request(confirmation_key(CARD_A), 0))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfirmationError::Transport { .. }));
        assert_eq!(
            harness
                .card_states
                .snapshot(&context_ids(CARD_A))
                .unwrap()
                .attempts,
            0
        );

        // The claim was released, so the same attempt id runs again.
        harness.network.node(3).set_silent(false);
        let response = harness
            .service
            .confirm_vote(harness.request(confirmation_key(CARD_A), 0))
            .await
            .unwrap();
        assert!(response.outcome.is_confirmed());
        assert!(!response.replayed);
    }

    #[tokio::test]
    async fn test_independent_cards_confirm_concurrently() {
        let harness = ConfirmationHarness::start(&[CARD_A, CARD_B, CARD_C]);

        let (a, b, c) = tokio::join!(
            harness
                .service
                .confirm_vote(harness.request(confirmation_key(CARD_A), 0)),
            harness
                .service
                .confirm_vote(harness.request(confirmation_key(CARD_B), 0)),
            harness
                .service
                .confirm_vote(harness.request(confirmation_key(CARD_C), 0)),
        );
        for response in [a, b, c] {
            assert!(response.unwrap().outcome.is_confirmed());
        }
        assert_eq!(harness.bus.open_rounds(), 0);
    }
}
