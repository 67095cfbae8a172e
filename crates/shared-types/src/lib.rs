//! # Shared Types Crate
//!
//! Value types exchanged between the control-component subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: the ballot context triple, node identities,
//!   group elements and commitment hashes are defined once, here.
//! - **Validated Construction**: every type that carries an invariant
//!   (node range, group membership, hash shape) can only be built through a
//!   checked constructor.
//! - **Exactly N**: collections indexed by node are always exactly
//!   [`NODE_COUNT`] long; [`ensure_node_count`] is the one place that check
//!   lives.

pub mod entities;
pub mod errors;
pub mod group;

pub use entities::*;
pub use errors::*;
pub use group::{GqGroup, GroupElement};
