//! Adapters for the vote confirmation ports

pub mod bus;
pub mod memory;
pub mod return_code;

pub use bus::{ChannelBroadcaster, FanInBus, NodeBroadcaster, NodeRequest};
pub use memory::{
    InMemoryAllowListStore, InMemoryBallotBoxRepository, InMemoryConfirmationStateStore,
    InMemoryIdempotencyStore,
};
pub use return_code::HashingReturnCodeExtractor;
