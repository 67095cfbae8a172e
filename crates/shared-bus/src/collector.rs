//! # Fan-In Collector
//!
//! Collects the responses of one broadcast round, keyed by correlation id.
//!
//! ```text
//!             ┌── node 1 ──┐
//! request ────┼── node 2 ──┼──→ offer(correlation_id, response) ──→ [round]
//!  (open)     ├── node 3 ──┤                                           │
//!             └── node 4 ──┘                     exactly N distinct nodes
//!                                                                      ↓
//!                                              collect() → responses sorted by node
//! ```
//!
//! A round completes only once every node has answered. Partial rounds are
//! never handed out; waiting is bounded by a timeout that surfaces as
//! `RoundTimeout`. A second response from a node already present is dropped,
//! which makes redelivered messages harmless. Dropping the round handle
//! before completion, for example when the caller's future is cancelled,
//! closes the round.

use parking_lot::Mutex;
use shared_types::{order_by_node, NodeId, NodeIndexed, NODE_COUNT};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, warn};
use uuid::Uuid;

/// Fan-in errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollectorError {
    #[error("Round {0} is already open")]
    AlreadyOpen(Uuid),

    #[error("No open round for correlation id {0}")]
    UnknownCorrelation(Uuid),

    #[error("Round {correlation_id} timed out with {received} of {expected} responses")]
    RoundTimeout {
        correlation_id: Uuid,
        received: usize,
        expected: usize,
    },

    #[error("Round {0} was abandoned before completion")]
    Abandoned(Uuid),
}

/// Result of offering one response to a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferOutcome {
    /// Stored; the round still waits for more nodes.
    Pending { received: usize },
    /// This node already answered; the response was dropped.
    Duplicate { node_id: NodeId },
    /// This response completed the round.
    Complete,
}

struct PendingRound<T> {
    /// Distinguishes rounds reopened under the same correlation id.
    token: u64,
    responses: Vec<T>,
    completion: Option<oneshot::Sender<Vec<T>>>,
}

type Rounds<T> = Arc<Mutex<HashMap<Uuid, PendingRound<T>>>>;

/// Handle returned by [`FanInCollector::open`]; consumed by `collect`.
///
/// Dropping an uncompleted handle removes its round.
pub struct RoundHandle<T> {
    correlation_id: Uuid,
    token: u64,
    receiver: oneshot::Receiver<Vec<T>>,
    rounds: Rounds<T>,
}

impl<T> RoundHandle<T> {
    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

impl<T> Drop for RoundHandle<T> {
    fn drop(&mut self) {
        let mut rounds = self.rounds.lock();
        let owned = rounds
            .get(&self.correlation_id)
            .is_some_and(|round| round.token == self.token);
        if owned {
            rounds.remove(&self.correlation_id);
            debug!("[bus] Round {} closed by its caller", self.correlation_id);
        }
    }
}

/// Correlation-keyed fan-in of exactly N node responses.
pub struct FanInCollector<T> {
    rounds: Rounds<T>,
    next_token: AtomicU64,
}

impl<T> FanInCollector<T>
where
    T: NodeIndexed + Send + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self {
            rounds: Arc::new(Mutex::new(HashMap::new())),
            next_token: AtomicU64::new(0),
        }
    }

    /// Open a round before broadcasting the request.
    pub fn open(&self, correlation_id: Uuid) -> Result<RoundHandle<T>, CollectorError> {
        let mut rounds = self.rounds.lock();
        if rounds.contains_key(&correlation_id) {
            return Err(CollectorError::AlreadyOpen(correlation_id));
        }
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = oneshot::channel();
        rounds.insert(
            correlation_id,
            PendingRound {
                token,
                responses: Vec::with_capacity(NODE_COUNT),
                completion: Some(sender),
            },
        );
        Ok(RoundHandle {
            correlation_id,
            token,
            receiver,
            rounds: Arc::clone(&self.rounds),
        })
    }

    /// Offer one node's response to an open round.
    pub fn offer(&self, correlation_id: Uuid, response: T) -> Result<OfferOutcome, CollectorError> {
        let mut rounds = self.rounds.lock();
        let round = rounds
            .get_mut(&correlation_id)
            .ok_or(CollectorError::UnknownCorrelation(correlation_id))?;

        let node_id = response.node_id();
        if round.responses.iter().any(|r| r.node_id() == node_id) {
            warn!(
                "[bus] Dropping duplicate response from node {} for round {}",
                node_id, correlation_id
            );
            return Ok(OfferOutcome::Duplicate { node_id });
        }

        round.responses.push(response);
        let received = round.responses.len();
        debug!(
            "[bus] Round {} received {}/{} (node {})",
            correlation_id, received, NODE_COUNT, node_id
        );

        if received < NODE_COUNT {
            return Ok(OfferOutcome::Pending { received });
        }

        if let Some(mut finished) = rounds.remove(&correlation_id) {
            let responses = std::mem::take(&mut finished.responses);
            if let Some(sender) = finished.completion.take() {
                // Receiver may already have timed out; the round is done either way.
                let _ = sender.send(responses);
            }
        }
        Ok(OfferOutcome::Complete)
    }

    /// Wait for the round to complete, returning responses in node order.
    pub async fn collect(
        &self,
        mut handle: RoundHandle<T>,
        timeout: Duration,
    ) -> Result<Vec<T>, CollectorError> {
        let correlation_id = handle.correlation_id;
        match tokio::time::timeout(timeout, &mut handle.receiver).await {
            Ok(Ok(responses)) => {
                // Distinct node ids are guaranteed by `offer`; this only sorts.
                let ordered = order_by_node(responses)
                    .map_err(|_| CollectorError::Abandoned(correlation_id))?;
                Ok(ordered.into())
            }
            Ok(Err(_)) => Err(CollectorError::Abandoned(correlation_id)),
            Err(_) => {
                let received = self
                    .rounds
                    .lock()
                    .remove(&correlation_id)
                    .map(|round| round.responses.len())
                    .unwrap_or(0);
                warn!(
                    "[bus] Round {} timed out with {}/{} responses",
                    correlation_id, received, NODE_COUNT
                );
                Err(CollectorError::RoundTimeout {
                    correlation_id,
                    received,
                    expected: NODE_COUNT,
                })
            }
        }
    }

    /// Drop an open round without completing it.
    pub fn abandon(&self, correlation_id: &Uuid) -> bool {
        self.rounds.lock().remove(correlation_id).is_some()
    }

    /// Number of rounds currently waiting for responses.
    #[must_use]
    pub fn open_rounds(&self) -> usize {
        self.rounds.lock().len()
    }
}

impl<T> Default for FanInCollector<T>
where
    T: NodeIndexed + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
