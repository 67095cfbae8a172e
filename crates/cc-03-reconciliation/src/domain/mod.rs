//! Domain layer for reconciliation

pub mod input;
pub mod report;

pub use input::UpdateConfirmedVotingCardsInput;
pub use report::ReconciliationReport;
