//! # Vote Confirmation Metrics
//!
//! Enable with the `metrics` feature:
//! ```toml
//! cc-01-vote-confirmation = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `confirmation_votes_confirmed_total` - Counter of confirmed votes
//! - `confirmation_rejections_total` - Counter of rejected attempts (by reason)
//! - `confirmation_replays_total` - Counter of requests answered from a completed execution
//! - `confirmation_agreement_evaluation_seconds` - Histogram of hash agreement evaluation time

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_counter_vec, register_histogram, register_int_counter, CounterVec, Histogram,
    IntCounter,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Total votes confirmed
    pub static ref VOTES_CONFIRMED: IntCounter = register_int_counter!(
        "confirmation_votes_confirmed_total",
        "Total number of votes confirmed"
    )
    .expect("Failed to create VOTES_CONFIRMED metric");

    /// Total rejected confirmation attempts, labeled by reason
    pub static ref CONFIRMATIONS_REJECTED: CounterVec = register_counter_vec!(
        "confirmation_rejections_total",
        "Total number of rejected confirmation attempts",
        &["reason"]
    )
    .expect("Failed to create CONFIRMATIONS_REJECTED metric");

    /// Total replayed requests
    pub static ref CONFIRMATIONS_REPLAYED: IntCounter = register_int_counter!(
        "confirmation_replays_total",
        "Total number of requests answered from a completed execution"
    )
    .expect("Failed to create CONFIRMATIONS_REPLAYED metric");

    /// Hash agreement evaluation latency
    pub static ref AGREEMENT_EVALUATION_SECONDS: Histogram = register_histogram!(
        "confirmation_agreement_evaluation_seconds",
        "Time spent evaluating hash share agreement",
        vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05]
    )
    .expect("Failed to create AGREEMENT_EVALUATION_SECONDS metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

#[cfg(feature = "metrics")]
pub fn record_vote_confirmed() {
    VOTES_CONFIRMED.inc();
}

#[cfg(feature = "metrics")]
pub fn record_confirmation_rejected(reason: &str) {
    CONFIRMATIONS_REJECTED.with_label_values(&[reason]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_confirmation_replayed() {
    CONFIRMATIONS_REPLAYED.inc();
}

#[cfg(feature = "metrics")]
pub fn observe_agreement_evaluation(seconds: f64) {
    AGREEMENT_EVALUATION_SECONDS.observe(seconds);
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_vote_confirmed() {}

#[cfg(not(feature = "metrics"))]
pub fn record_confirmation_rejected(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_confirmation_replayed() {}

#[cfg(not(feature = "metrics"))]
pub fn observe_agreement_evaluation(_seconds: f64) {}
