//! # Agreement Hashing
//!
//! The commitment hash over N per-node values plus the ballot context.
//!
//! The same function is used when a vote is confirmed online, when the
//! dispute resolver re-derives agreement after the election, and when a node
//! reconciles its local state. Agreement is defined here once.
//!
//! ```text
//! agree(label, ids, [v1, v2, v3, v4])
//!   = Base64( RecursiveHash( [label, ee, vcs, vc, v1, v2, v3, v4] ) )
//! ```
//!
//! Values must already be in ascending node order; callers own size and
//! ordering.

use crate::hashing::{recursive_hash, Hashable, ToHashable};
use shared_types::{CommitmentHash, ContextIds, NODE_COUNT};

/// Context label for the hashed long vote cast return code agreement.
pub const VERIFY_LVCC_HASH_LABEL: &str = "VerifyLVCCHash";

/// Pure agreement-hash computation.
pub struct AgreementHasher;

impl AgreementHasher {
    /// Commitment hash over `ordered_values` (ascending node order).
    pub fn agree<V: ToHashable>(
        context_label: &str,
        context_ids: &ContextIds,
        ordered_values: &[V; NODE_COUNT],
    ) -> CommitmentHash {
        let mut items = Vec::with_capacity(4 + NODE_COUNT);
        items.push(Hashable::text(context_label));
        items.push(context_ids.election_event_id.to_hashable());
        items.push(context_ids.verification_card_set_id.to_hashable());
        items.push(context_ids.verification_card_id.to_hashable());
        items.extend(ordered_values.iter().map(ToHashable::to_hashable));

        CommitmentHash::from_digest(&recursive_hash(&Hashable::List(items)))
    }

    /// `agree` with the long vote cast return code label.
    pub fn agree_lvcc_hashes<V: ToHashable>(
        context_ids: &ContextIds,
        ordered_hashes: &[V; NODE_COUNT],
    ) -> CommitmentHash {
        Self::agree(VERIFY_LVCC_HASH_LABEL, context_ids, ordered_hashes)
    }
}
