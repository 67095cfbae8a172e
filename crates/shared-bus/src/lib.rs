//! # Shared Bus - Fan-In for Broadcast Rounds
//!
//! A confirmation round is broadcast to all N control components and
//! evaluated only once all N responses are in.
//!
//! ```text
//! ┌──────────────┐  broadcast   ┌────────┐ ┌────────┐ ┌────────┐ ┌────────┐
//! │  Requester   │ ───────────→ │ node 1 │ │ node 2 │ │ node 3 │ │ node 4 │
//! │              │              └───┬────┘ └───┬────┘ └───┬────┘ └───┬────┘
//! │              │ ←── FanInCollector (by correlation id) ─┴──────────┘
//! └──────────────┘
//! ```
//!
//! ## Delivery
//!
//! - **At-least-once:** a redelivered response is dropped by the collector
//!   (same node, same round) or by the [`ReplayGuard`] (same message id).
//! - **Exactly N:** partial rounds are never released; a round that cannot
//!   complete surfaces as `RoundTimeout`.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod collector;
pub mod replay_guard;

pub use collector::{CollectorError, FanInCollector, OfferOutcome, RoundHandle};
pub use replay_guard::{ReplayError, ReplayGuard};

/// Default time to wait for a full round.
pub const DEFAULT_ROUND_TIMEOUT_MS: u64 = 30_000;
