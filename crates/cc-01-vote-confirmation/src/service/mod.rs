//! Vote Confirmation Service
//!
//! Drives one [`ConfirmationSession`] per request through both rounds:
//!
//! 1. Validate the attempt id and the confirmation key binding
//! 2. Claim the execution key; completed executions are replayed
//! 3. Load card state and the ballot box, check attempts and window
//! 4. Round one: hash shares → agreement against the allow list
//! 5. Round two: value shares → all N verified, same context and group
//! 6. Extract the short code and mark the card confirmed
//!
//! Rejections that are the voter's doing consume an attempt. Transport,
//! storage and signature failures do not; they release the claim so the
//! same attempt can be retried.

use crate::domain::{
    ConfirmationOutcome, ConfirmationSession, HashShare, RejectionReason, SessionKey,
    ValueShare, ValueShareEvaluation, MAX_CONFIRMATION_ATTEMPTS, VOTE_VERIFICATION_ALIAS,
};
use crate::error::{ConfirmationError, ConfirmationResult};
use crate::metrics;
use crate::ports::inbound::{ConfirmationRequest, ConfirmationResponse, VoteConfirmationApi};
use crate::ports::outbound::{
    AllowListStore, BallotBoxRepository, CardStatus, Claim, ConfirmationStateStore,
    ControlComponentBus, ExecutionKey, HashShareRequest, IdempotencyStore, ReturnCodeExtractor,
    SystemTimeSource, TimeSource, ValueShareRequest,
};
use async_trait::async_trait;
use shared_crypto::{SignatureService, ToHashable};
use shared_types::{ContextIds, TypeError, NODE_COUNT};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};


/// Vote confirmation configuration
#[derive(Clone, Debug)]
pub struct ConfirmationConfig {
    /// Attempts per verification card
    pub max_confirmation_attempts: u8,
    /// Nodes taking part in every round; must equal `NODE_COUNT`
    pub node_count: usize,
    /// Verify signatures on the confirmation key and every node response
    pub verify_signatures: bool,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            max_confirmation_attempts: MAX_CONFIRMATION_ATTEMPTS,
            node_count: NODE_COUNT,
            verify_signatures: true,
        }
    }
}

impl ConfirmationConfig {
    pub fn validate(&self) -> ConfirmationResult<()> {
        if self.node_count != NODE_COUNT {
            return Err(TypeError::SizeMismatch {
                expected: NODE_COUNT,
                actual: self.node_count,
            }
            .into());
        }
        if self.max_confirmation_attempts == 0 {
            return Err(ConfirmationError::AttemptOutOfRange {
                attempt_id: 0,
                max_attempts: 0,
            });
        }
        Ok(())
    }
}

/// Dependencies for VoteConfirmationService
pub struct VoteConfirmationDependencies {
    pub allow_lists: Arc<dyn AllowListStore>,
    pub ballot_boxes: Arc<dyn BallotBoxRepository>,
    pub card_states: Arc<dyn ConfirmationStateStore>,
    pub idempotency: Arc<dyn IdempotencyStore>,
    pub bus: Arc<dyn ControlComponentBus>,
    pub extractor: Arc<dyn ReturnCodeExtractor>,
    pub signatures: Arc<dyn SignatureService>,
    pub config: ConfirmationConfig,
}

/// Vote confirmation service
pub struct VoteConfirmationService {
    allow_lists: Arc<dyn AllowListStore>,
    ballot_boxes: Arc<dyn BallotBoxRepository>,
    card_states: Arc<dyn ConfirmationStateStore>,
    idempotency: Arc<dyn IdempotencyStore>,
    bus: Arc<dyn ControlComponentBus>,
    extractor: Arc<dyn ReturnCodeExtractor>,
    signatures: Arc<dyn SignatureService>,
    config: ConfirmationConfig,
    time_source: Box<dyn TimeSource>,
}

impl VoteConfirmationService {
    /// Create a new VoteConfirmationService
    pub fn new(deps: VoteConfirmationDependencies) -> ConfirmationResult<Self> {
        deps.config.validate()?;
        Ok(Self {
            allow_lists: deps.allow_lists,
            ballot_boxes: deps.ballot_boxes,
            card_states: deps.card_states,
            idempotency: deps.idempotency,
            bus: deps.bus,
            extractor: deps.extractor,
            signatures: deps.signatures,
            config: deps.config,
            time_source: Box::new(SystemTimeSource),
        })
    }

    /// Set custom time source (for testing)
    pub fn with_time_source(mut self, time_source: Box<dyn TimeSource>) -> Self {
        self.time_source = time_source;
        self
    }

    pub fn config(&self) -> &ConfirmationConfig {
        &self.config
    }

    fn verify_confirmation_key(&self, request: &ConfirmationRequest) -> ConfirmationResult<()> {
        if !self.config.verify_signatures {
            return Ok(());
        }
        let key = &request.confirmation_key;
        if self.signatures.verify(
            VOTE_VERIFICATION_ALIAS,
            &key.to_hashable(),
            &key.signing_context(),
            &request.signature,
        ) {
            Ok(())
        } else {
            Err(ConfirmationError::InvalidSignature {
                signer: VOTE_VERIFICATION_ALIAS.to_string(),
                payload: "confirmation key",
            })
        }
    }

    fn verify_hash_shares(
        &self,
        context_ids: &ContextIds,
        shares: &[HashShare],
    ) -> ConfirmationResult<()> {
        if !self.config.verify_signatures {
            return Ok(());
        }
        for share in shares {
            let alias = share.node_id.signing_alias();
            let context = HashShare::signing_context(context_ids, share.node_id);
            if !self
                .signatures
                .verify(&alias, &share.signed_payload(), &context, &share.signature)
            {
                return Err(ConfirmationError::InvalidSignature {
                    signer: alias,
                    payload: "hash share",
                });
            }
        }
        Ok(())
    }

    fn verify_value_shares(
        &self,
        context_ids: &ContextIds,
        shares: &[ValueShare],
    ) -> ConfirmationResult<()> {
        if !self.config.verify_signatures {
            return Ok(());
        }
        for share in shares {
            let alias = share.node_id.signing_alias();
            let context = ValueShare::signing_context(context_ids, share.node_id);
            if !self
                .signatures
                .verify(&alias, &share.signed_payload(), &context, &share.signature)
            {
                return Err(ConfirmationError::InvalidSignature {
                    signer: alias,
                    payload: "value share",
                });
            }
        }
        Ok(())
    }

    /// Consume an attempt and move the session to REJECTED.
    async fn reject_consuming_attempt(
        &self,
        session: &mut ConfirmationSession,
        reason: RejectionReason,
    ) -> ConfirmationResult<ConfirmationOutcome> {
        let attempts = self
            .card_states
            .increment_attempts(session.context_ids())
            .await?;
        session.reject(reason, attempts)
    }

    /// Run both rounds for a claimed execution.
    async fn execute(&self, request: &ConfirmationRequest) -> ConfirmationResult<ConfirmationOutcome> {
        let ids = &request.context_ids;
        let attempt_id = request.confirmation_attempt_id;

        let card = self.card_states.load(ids).await?;
        match card.status {
            CardStatus::NotSent => {
                return Err(ConfirmationError::VoteNotSent {
                    verification_card_id: ids.verification_card_id.clone(),
                })
            }
            CardStatus::Confirmed => {
                return Err(ConfirmationError::AlreadyConfirmed {
                    verification_card_id: ids.verification_card_id.clone(),
                })
            }
            CardStatus::Sent => {}
        }

        let ballot_box = self
            .ballot_boxes
            .get_ballot_box(&ids.election_event_id, &ids.verification_card_set_id)
            .await?;

        let mut session = ConfirmationSession::new(
            SessionKey {
                context_ids: ids.clone(),
                attempt_id,
            },
            ballot_box.group.clone(),
            request.confirmation_key.clone(),
            self.config.max_confirmation_attempts,
        )?;

        let now = self.time_source.now();
        if session.begin(&ballot_box, now, card.attempts)?.is_terminal() {
            return session.outcome().ok_or_else(|| ConfirmationError::InvalidTransition {
                from: session.state().name().to_string(),
                action: "read outcome",
            });
        }

        let allow_list = self
            .allow_lists
            .get_long_vote_cast_allow_list(&ids.verification_card_set_id)
            .await?;

        // Round one: hashed long vote cast return code shares
        session.await_hash_shares()?;
        let hash_shares = self
            .bus
            .request_hash_shares(HashShareRequest {
                context_ids: ids.clone(),
                confirmation_key: request.confirmation_key.clone(),
                confirmation_attempt_id: attempt_id,
            })
            .await?;
        self.verify_hash_shares(ids, &hash_shares)?;

        let started = Instant::now();
        let agreement = session.evaluate_hash_agreement(hash_shares, &allow_list)?;
        metrics::observe_agreement_evaluation(started.elapsed().as_secs_f64());

        if !agreement.accepted {
            warn!(
                "[cc-01] Agreement hash {} for {} not in allow list",
                agreement.commitment_hash, ids
            );
            return self
                .reject_consuming_attempt(&mut session, RejectionReason::AgreementRejected)
                .await;
        }
        debug!("[cc-01] Hash agreement reached for {} (attempt {})", ids, attempt_id);

        // Round two: value shares
        session.await_value_shares()?;
        let value_shares = self
            .bus
            .request_value_shares(ValueShareRequest {
                context_ids: ids.clone(),
                confirmation_key: request.confirmation_key.clone(),
                confirmation_attempt_id: attempt_id,
                commitment_hash: agreement.commitment_hash,
            })
            .await?;
        self.verify_value_shares(ids, &value_shares)?;

        match session.evaluate_value_shares(value_shares)? {
            ValueShareEvaluation::Failed(reason) => {
                self.reject_consuming_attempt(&mut session, reason).await
            }
            ValueShareEvaluation::Verified(actual_shares) => {
                let short_code = self.extractor.extract_short_code(ids, &actual_shares)?;
                self.card_states
                    .mark_confirmed(ids, short_code.clone())
                    .await?;
                session.confirm(short_code)
            }
        }
    }

    fn record_outcome(&self, context_ids: &ContextIds, outcome: &ConfirmationOutcome) {
        match outcome {
            ConfirmationOutcome::Confirmed { .. } => {
                info!("[cc-01] ✅ Vote confirmed for {}", context_ids);
                metrics::record_vote_confirmed();
            }
            ConfirmationOutcome::Rejected {
                reason,
                remaining_attempts,
            } => {
                warn!(
                    "[cc-01] Confirmation rejected for {}: {} ({} attempts left)",
                    context_ids, reason, remaining_attempts
                );
                metrics::record_confirmation_rejected(reason.label());
            }
        }
    }
}

#[async_trait]
impl VoteConfirmationApi for VoteConfirmationService {
    async fn confirm_vote(
        &self,
        request: ConfirmationRequest,
    ) -> ConfirmationResult<ConfirmationResponse> {
        let attempt_id = request.confirmation_attempt_id;
        if attempt_id >= self.config.max_confirmation_attempts {
            return Err(ConfirmationError::AttemptOutOfRange {
                attempt_id,
                max_attempts: self.config.max_confirmation_attempts,
            });
        }
        request
            .context_ids
            .ensure_matches(&request.confirmation_key.context_ids, "confirmation key")?;
        self.verify_confirmation_key(&request)?;

        let key = ExecutionKey {
            verification_card_id: request.context_ids.verification_card_id.clone(),
            attempt_id,
        };
        match self.idempotency.claim(&key).await? {
            Claim::Completed(outcome) => {
                info!(
                    "[cc-01] Replaying completed confirmation for {} (attempt {})",
                    request.context_ids, attempt_id
                );
                metrics::record_confirmation_replayed();
                return Ok(ConfirmationResponse {
                    outcome,
                    replayed: true,
                });
            }
            Claim::InFlight => {
                return Err(ConfirmationError::ConfirmationInProgress {
                    verification_card_id: key.verification_card_id,
                    attempt_id,
                })
            }
            Claim::Fresh => {}
        }

        match self.execute(&request).await {
            Ok(outcome) => {
                self.idempotency.complete(&key, outcome.clone()).await?;
                self.record_outcome(&request.context_ids, &outcome);
                Ok(ConfirmationResponse {
                    outcome,
                    replayed: false,
                })
            }
            Err(e) => {
                if let Err(release_error) = self.idempotency.release(&key).await {
                    error!(
                        "[cc-01] Failed to release claim for {} (attempt {}): {}",
                        request.context_ids, attempt_id, release_error
                    );
                }
                if e.is_infrastructure() {
                    error!("[cc-01] Confirmation of {} failed: {}", request.context_ids, e);
                } else {
                    warn!("[cc-01] Confirmation of {} refused: {}", request.context_ids, e);
                }
                Err(e)
            }
        }
    }
}
