//! Ports (hexagonal architecture)

pub mod inbound;
pub mod outbound;

pub use inbound::ReconciliationApi;
pub use outbound::{LocalCardStatus, LocalConfirmationStore};
