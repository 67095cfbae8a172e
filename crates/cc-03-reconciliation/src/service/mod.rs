//! Reconciliation Engine
//!
//! For every resolved vote, in order and without short-circuiting:
//!
//! | Agreement hash allowed | Local status | Action | Consistent |
//! |------------------------|--------------|--------|------------|
//! | no | any | none | no (`unverifiable`) |
//! | yes | Confirmed | none | yes |
//! | yes | Sent | mark confirmed | yes (`repaired`) |
//! | yes | NotSent | none | no (`not_sent`) |

use crate::domain::{ReconciliationReport, UpdateConfirmedVotingCardsInput};
use crate::error::ReconciliationResult;
use crate::ports::inbound::ReconciliationApi;
use crate::ports::outbound::{LocalCardStatus, LocalConfirmationStore};
use async_trait::async_trait;
use cc_telemetry::log_event;
use shared_crypto::AgreementHasher;
use std::sync::Arc;
use tracing::{debug, warn};


/// Reconciliation engine for one node
pub struct ReconciliationEngine {
    store: Arc<dyn LocalConfirmationStore>,
}

impl ReconciliationEngine {
    pub fn new(store: Arc<dyn LocalConfirmationStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ReconciliationApi for ReconciliationEngine {
    async fn reconcile(
        &self,
        input: &UpdateConfirmedVotingCardsInput,
    ) -> ReconciliationResult<bool> {
        Ok(self.reconcile_with_report(input).await?.is_consistent())
    }

    async fn reconcile_with_report(
        &self,
        input: &UpdateConfirmedVotingCardsInput,
    ) -> ReconciliationResult<ReconciliationReport> {
        let node = input.local_node_id();
        let ee = input.election_event_id();
        let mut report = ReconciliationReport::for_node(node);

        for vote in input.resolved() {
            let vc = vote.verification_card_id.clone();
            let commitment =
                AgreementHasher::agree_lvcc_hashes(&vote.context_ids(ee), &vote.hash_shares);
            if !input.is_allowed(&vote.verification_card_set_id, &commitment) {
                warn!(
                    "[cc-03] Node {}: resolved vote {} has no allowed agreement hash",
                    node, vc
                );
                report.unverifiable.push(vc);
                continue;
            }

            match self.store.card_status(ee, &vc).await? {
                LocalCardStatus::Confirmed => {
                    debug!("[cc-03] Node {}: card {} already confirmed", node, vc);
                    report.already_confirmed.push(vc);
                }
                LocalCardStatus::Sent => {
                    self.store.mark_confirmed(ee, &vc).await?;
                    debug!("[cc-03] Node {}: card {} repaired", node, vc);
                    report.repaired.push(vc);
                }
                LocalCardStatus::NotSent => {
                    warn!(
                        "[cc-03] Node {}: card {} confirmed by agreement but never sent here",
                        node, vc
                    );
                    report.not_sent.push(vc);
                }
            }
        }

        log_event!(
            info,
            "cc-03",
            "Reconciliation finished",
            node_id = node.get(),
            election_event_id = ee,
            already_confirmed = report.already_confirmed.len(),
            repaired = report.repaired.len(),
            not_sent = report.not_sent.len(),
            unverifiable = report.unverifiable.len()
        );
        Ok(report)
    }
}
