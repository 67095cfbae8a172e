//! Ports for the vote confirmation subsystem

pub mod inbound;
pub mod outbound;

pub use inbound::{ConfirmationRequest, ConfirmationResponse, VoteConfirmationApi};
pub use outbound::{
    AllowListStore, BallotBoxRepository, CardConfirmationState, CardStatus, Claim,
    ConfirmationStateStore, ControlComponentBus, ExecutionKey, HashShareRequest, IdempotencyStore,
    ReturnCodeExtractor, SystemTimeSource, TimeSource, ValueShareRequest,
};
