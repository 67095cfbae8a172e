//! # cc-01-vote-confirmation
//!
//! Online confirmation of a cast vote by the four control components.
//!
//! ## Overview
//!
//! A voter confirms a cast vote by entering a confirmation value. The
//! subsystem then runs two broadcast rounds against all four nodes:
//!
//! - **Hash shares**: each node commits to its hashed long vote cast return
//!   code share. The agreement hash over the four shares (node order) must
//!   be in the allow list published before the election.
//! - **Value shares**: only after agreement, each node verifies the
//!   confirmation key and reveals its share. All four must verify.
//!
//! ```text
//! Voter ──ConfirmationRequest──→ VoteConfirmationService
//!                                    │
//!                                    ├── HashShareRequest ──→ CC1..CC4 ──→ agreement ∈ allow list?
//!                                    │
//!                                    ├── ValueShareRequest ─→ CC1..CC4 ──→ all verified?
//!                                    │
//!                                    └── short code ──→ ConfirmationStateStore (CONFIRMED)
//! ```
//!
//! ## Attempts
//!
//! | Outcome | Attempt consumed |
//! |---------|------------------|
//! | Agreement rejected | yes |
//! | Partial verification / value share mismatch | yes |
//! | Outside window, ballot box mixed | no |
//! | Transport, storage, signature failure | no (claim released) |
//!
//! ## Example
//!
//! ```rust,ignore
//! use cc_01_vote_confirmation::{VoteConfirmationService, VoteConfirmationDependencies};
//! use cc_01_vote_confirmation::ports::inbound::VoteConfirmationApi;
//!
//! let service = VoteConfirmationService::new(deps)?;
//! let response = service.confirm_vote(request).await?;
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

pub use domain::{
    BallotBox, ConfirmationKey, ConfirmationOutcome, ConfirmationSession, HashShare,
    RejectionReason, RoundInput, RoundOutcome, SessionKey, SessionState, ShortCode, ValueShare,
    WindowViolation, MAX_CONFIRMATION_ATTEMPTS,
};
pub use error::{ConfirmationError, ConfirmationResult};
pub use ports::inbound::{ConfirmationRequest, ConfirmationResponse, VoteConfirmationApi};
pub use service::{ConfirmationConfig, VoteConfirmationDependencies, VoteConfirmationService};
