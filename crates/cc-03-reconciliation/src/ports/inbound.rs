//! Driving Ports (API - Inbound)

use crate::domain::{ReconciliationReport, UpdateConfirmedVotingCardsInput};
use crate::error::ReconciliationResult;
use async_trait::async_trait;

/// Reconciliation API
#[async_trait]
pub trait ReconciliationApi: Send + Sync {
    /// Bring local confirmation state in line with the resolved votes.
    ///
    /// Returns true iff every resolved vote is confirmed locally afterwards.
    /// Repairs are applied even when the result is false.
    async fn reconcile(&self, input: &UpdateConfirmedVotingCardsInput)
        -> ReconciliationResult<bool>;

    /// `reconcile` with the per-card breakdown.
    async fn reconcile_with_report(
        &self,
        input: &UpdateConfirmedVotingCardsInput,
    ) -> ReconciliationResult<ReconciliationReport>;
}
