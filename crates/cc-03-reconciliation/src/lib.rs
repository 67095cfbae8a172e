//! # cc-03-reconciliation
//!
//! Brings one node's local confirmation state in line with the votes the
//! dispute resolver proved confirmed.
//!
//! A node that missed the end of a confirmation (crash, lost message) has
//! the card as sent but not confirmed. Reconciliation repairs that. A card
//! the node never saw cast cannot be repaired and makes the result false.
//! Each resolved vote is re-checked against the allow list before any
//! local state is touched.
//!
//! ```rust,ignore
//! let input = UpdateConfirmedVotingCardsInput::new(node_id, ee, allow_lists, resolved)?;
//! let consistent = engine.reconcile(&input).await?;
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use domain::{ReconciliationReport, UpdateConfirmedVotingCardsInput};
pub use error::{ReconciliationError, ReconciliationResult};
pub use ports::inbound::ReconciliationApi;
pub use ports::outbound::{LocalCardStatus, LocalConfirmationStore};
pub use service::ReconciliationEngine;
