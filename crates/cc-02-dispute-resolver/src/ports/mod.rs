//! Ports (hexagonal architecture)

pub mod inbound;
pub mod outbound;

pub use inbound::{DisputeResolution, DisputeResolverApi};
pub use outbound::ExtractionSource;
