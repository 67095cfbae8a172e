//! Control-component bus over correlation-keyed fan-in.
//!
//! ```text
//! request_hash_shares ──open(cid)──→ broadcast(cid, request) ──→ 4 nodes
//!                                                                  │
//! deliver_hash_share(message_id, cid, share) ←─────────────────────┘
//!        │ replay guard (message id)
//!        ↓
//!   FanInCollector::offer ──4 distinct nodes──→ collect() → sorted shares
//! ```
//!
//! Delivery is at-least-once: a redelivered message id is dropped by the
//! replay guard, a second answer from the same node by the collector.

use crate::domain::{HashShare, ValueShare};
use crate::error::{ConfirmationError, ConfirmationResult};
use crate::ports::outbound::{
    ControlComponentBus, HashShareRequest, SystemTimeSource, TimeSource, ValueShareRequest,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_bus::{
    CollectorError, FanInCollector, OfferOutcome, ReplayGuard, DEFAULT_ROUND_TIMEOUT_MS,
};
use shared_types::NodeIndexed;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

/// Request sent to every control component.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeRequest {
    HashShares(HashShareRequest),
    ValueShares(ValueShareRequest),
}

/// Outgoing side of the transport.
pub trait NodeBroadcaster: Send + Sync {
    fn broadcast(&self, correlation_id: Uuid, request: NodeRequest) -> Result<(), String>;
}

/// In-process broadcaster writing to a channel drained by the node side.
pub struct ChannelBroadcaster {
    sender: mpsc::UnboundedSender<(Uuid, NodeRequest)>,
}

impl ChannelBroadcaster {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(Uuid, NodeRequest)>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl NodeBroadcaster for ChannelBroadcaster {
    fn broadcast(&self, correlation_id: Uuid, request: NodeRequest) -> Result<(), String> {
        self.sender
            .send((correlation_id, request))
            .map_err(|_| "node channel closed".to_string())
    }
}

fn transport(e: CollectorError) -> ConfirmationError {
    ConfirmationError::Transport {
        reason: e.to_string(),
    }
}

/// [`ControlComponentBus`] collecting exactly N responses per round.
pub struct FanInBus {
    broadcaster: Arc<dyn NodeBroadcaster>,
    hash_rounds: FanInCollector<HashShare>,
    value_rounds: FanInCollector<ValueShare>,
    replay_guard: Mutex<ReplayGuard>,
    round_timeout: Duration,
    time_source: Box<dyn TimeSource>,
}

impl FanInBus {
    pub fn new(broadcaster: Arc<dyn NodeBroadcaster>) -> Self {
        Self {
            broadcaster,
            hash_rounds: FanInCollector::new(),
            value_rounds: FanInCollector::new(),
            replay_guard: Mutex::new(ReplayGuard::new()),
            round_timeout: Duration::from_millis(DEFAULT_ROUND_TIMEOUT_MS),
            time_source: Box::new(SystemTimeSource),
        }
    }

    pub fn with_round_timeout(mut self, round_timeout: Duration) -> Self {
        self.round_timeout = round_timeout;
        self
    }

    /// Set custom time source (for testing)
    pub fn with_time_source(mut self, time_source: Box<dyn TimeSource>) -> Self {
        self.time_source = time_source;
        self
    }

    /// Rounds still waiting for responses.
    pub fn open_rounds(&self) -> usize {
        self.hash_rounds.open_rounds() + self.value_rounds.open_rounds()
    }

    /// Inbound hash share from a node.
    pub fn deliver_hash_share(
        &self,
        message_id: Uuid,
        correlation_id: Uuid,
        share: HashShare,
    ) -> ConfirmationResult<OfferOutcome> {
        if let Some(duplicate) = self.check_replay(message_id, &share) {
            return Ok(duplicate);
        }
        self.hash_rounds
            .offer(correlation_id, share)
            .map_err(transport)
    }

    /// Inbound value share from a node.
    pub fn deliver_value_share(
        &self,
        message_id: Uuid,
        correlation_id: Uuid,
        share: ValueShare,
    ) -> ConfirmationResult<OfferOutcome> {
        if let Some(duplicate) = self.check_replay(message_id, &share) {
            return Ok(duplicate);
        }
        self.value_rounds
            .offer(correlation_id, share)
            .map_err(transport)
    }

    fn check_replay<T: NodeIndexed>(&self, message_id: Uuid, response: &T) -> Option<OfferOutcome> {
        let now = self.time_source.now();
        match self.replay_guard.lock().check_and_record(message_id, now) {
            Ok(()) => None,
            Err(e) => {
                debug!("[cc-01] Dropping redelivered response: {}", e);
                Some(OfferOutcome::Duplicate {
                    node_id: response.node_id(),
                })
            }
        }
    }
}

#[async_trait]
impl ControlComponentBus for FanInBus {
    async fn request_hash_shares(
        &self,
        request: HashShareRequest,
    ) -> ConfirmationResult<Vec<HashShare>> {
        let correlation_id = Uuid::new_v4();
        let handle = self.hash_rounds.open(correlation_id).map_err(transport)?;
        if let Err(reason) = self
            .broadcaster
            .broadcast(correlation_id, NodeRequest::HashShares(request))
        {
            // Dropping the handle closes the round.
            return Err(ConfirmationError::Transport { reason });
        }
        debug!("[cc-01] Hash share round {} broadcast", correlation_id);
        self.hash_rounds
            .collect(handle, self.round_timeout)
            .await
            .map_err(transport)
    }

    async fn request_value_shares(
        &self,
        request: ValueShareRequest,
    ) -> ConfirmationResult<Vec<ValueShare>> {
        let correlation_id = Uuid::new_v4();
        let handle = self.value_rounds.open(correlation_id).map_err(transport)?;
        if let Err(reason) = self
            .broadcaster
            .broadcast(correlation_id, NodeRequest::ValueShares(request))
        {
            // Dropping the handle closes the round.
            return Err(ConfirmationError::Transport { reason });
        }
        debug!("[cc-01] Value share round {} broadcast", correlation_id);
        self.value_rounds
            .collect(handle, self.round_timeout)
            .await
            .map_err(transport)
    }
}
