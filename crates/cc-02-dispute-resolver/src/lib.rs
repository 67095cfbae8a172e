//! # cc-02-dispute-resolver
//!
//! Post-election consistency of the four node extractions.
//!
//! ## Overview
//!
//! After the election every control component exports its view of the
//! election event and of every ballot. The resolver compares the four
//! exports and decides, without trusting any single node, which votes were
//! confirmed.
//!
//! | Check | Failure |
//! |-------|---------|
//! | Election event identical on all nodes | `InconsistentElectionEvent` |
//! | Encrypted votes byte-identical | `votes_consistent = false` |
//! | Confirmed votes re-derived from hash shares | dropped unless allow-listed |
//!
//! The resolved votes feed the reconciliation step on each node.

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use domain::{
    ExtractedElectionEvent, ExtractedVerificationCard, ExtractedVerificationCardSet,
    ExtractionConsistencyChecker, NodeExtraction,
};
pub use error::{DisputeResolverError, DisputeResult};
pub use ports::inbound::{DisputeResolution, DisputeResolverApi};
pub use ports::outbound::ExtractionSource;
pub use service::DisputeResolverService;
