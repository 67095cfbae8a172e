//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Identity**: `NodeId`, `ContextIds`
//! - **Agreement**: `CommitmentHash`, `ResolvedConfirmedVote`

use crate::errors::{TypeError, TypeResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// Number of control-component nodes taking part in every agreement.
pub const NODE_COUNT: usize = 4;

/// The fixed node set, in ascending order.
pub const NODE_IDS: [u8; NODE_COUNT] = [1, 2, 3, 4];

/// Identifier of a control-component node, always in `1..=NODE_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct NodeId(u8);

impl NodeId {
    pub fn new(id: u8) -> TypeResult<Self> {
        if id == 0 || id as usize > NODE_COUNT {
            return Err(TypeError::UnknownNode {
                node_id: id,
                node_count: NODE_COUNT,
            });
        }
        Ok(Self(id))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// All node ids in ascending order.
    pub fn all() -> [NodeId; NODE_COUNT] {
        NODE_IDS.map(NodeId)
    }

    /// Keystore alias under which this node signs its payloads.
    pub fn signing_alias(self) -> String {
        format!("control_component_{}", self.0)
    }
}

impl TryFrom<u8> for NodeId {
    type Error = TypeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NodeId> for u8 {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fails with `SizeMismatch` unless `actual == NODE_COUNT`.
///
/// Node-indexed inputs are never padded or truncated.
pub fn ensure_node_count(actual: usize) -> TypeResult<()> {
    if actual != NODE_COUNT {
        return Err(TypeError::SizeMismatch {
            expected: NODE_COUNT,
            actual,
        });
    }
    Ok(())
}

/// Convert a node-indexed `Vec` into a fixed-size array.
pub fn into_node_array<T>(items: Vec<T>) -> TypeResult<[T; NODE_COUNT]> {
    let actual = items.len();
    items
        .try_into()
        .map_err(|_| TypeError::SizeMismatch {
            expected: NODE_COUNT,
            actual,
        })
}

/// Anything produced by exactly one node of the fixed node set.
pub trait NodeIndexed {
    fn node_id(&self) -> NodeId;
}

/// Sort `items` ascending by node id and check they cover every node once.
///
/// The resulting order is part of every agreement-hash contract.
pub fn order_by_node<T: NodeIndexed>(mut items: Vec<T>) -> TypeResult<[T; NODE_COUNT]> {
    ensure_node_count(items.len())?;
    items.sort_by_key(|item| item.node_id());
    for pair in items.windows(2) {
        if pair[0].node_id() == pair[1].node_id() {
            return Err(TypeError::DuplicateNode {
                node_id: pair[0].node_id().get(),
            });
        }
    }
    into_node_array(items)
}

fn validate_identifier(field: &'static str, value: &str) -> TypeResult<()> {
    uuid::Uuid::try_parse(value)
        .map(|_| ())
        .map_err(|_| TypeError::InvalidIdentifier {
            field,
            value: value.to_string(),
        })
}

/// The (election event, verification card set, verification card) triple
/// identifying one ballot.
///
/// Ordered by `verification_card_id` first so canonical outputs sort by card.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextIds {
    pub election_event_id: String,
    pub verification_card_set_id: String,
    pub verification_card_id: String,
}

impl ContextIds {
    /// Create a context triple, checking that every identifier is UUID-shaped.
    pub fn new(
        election_event_id: impl Into<String>,
        verification_card_set_id: impl Into<String>,
        verification_card_id: impl Into<String>,
    ) -> TypeResult<Self> {
        let ids = Self {
            election_event_id: election_event_id.into(),
            verification_card_set_id: verification_card_set_id.into(),
            verification_card_id: verification_card_id.into(),
        };
        validate_identifier("election_event_id", &ids.election_event_id)?;
        validate_identifier("verification_card_set_id", &ids.verification_card_set_id)?;
        validate_identifier("verification_card_id", &ids.verification_card_id)?;
        Ok(ids)
    }

    /// Fails with `ContextMismatch` unless `nested` equals `self` exactly.
    pub fn ensure_matches(&self, nested: &ContextIds, what: &str) -> TypeResult<()> {
        if self != nested {
            return Err(TypeError::ContextMismatch {
                reason: format!(
                    "{} context {} does not match enclosing context {}",
                    what, nested, self
                ),
            });
        }
        Ok(())
    }
}

impl Ord for ContextIds {
    fn cmp(&self, other: &Self) -> Ordering {
        self.verification_card_id
            .cmp(&other.verification_card_id)
            .then_with(|| {
                self.verification_card_set_id
                    .cmp(&other.verification_card_set_id)
            })
            .then_with(|| self.election_event_id.cmp(&other.election_event_id))
    }
}

impl PartialOrd for ContextIds {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ContextIds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.election_event_id, self.verification_card_set_id, self.verification_card_id
        )
    }
}

// =============================================================================
// CLUSTER B: AGREEMENT
// =============================================================================

/// Length in bytes of the digest behind a commitment hash.
pub const DIGEST_LENGTH: usize = 32;

/// Length of a Base64-encoded (padded) 32-byte digest.
pub const COMMITMENT_HASH_LENGTH: usize = 44;

/// Base64 encoding of an agreement digest, as published in allow lists.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommitmentHash(String);

impl CommitmentHash {
    /// Parse an allow-list entry: exactly 44 characters of padded standard
    /// Base64 decoding to a 32-byte digest.
    pub fn parse(entry: &str) -> TypeResult<Self> {
        let invalid = || TypeError::InvalidAllowListEntry {
            entry: entry.to_string(),
        };
        if entry.len() != COMMITMENT_HASH_LENGTH {
            return Err(invalid());
        }
        let decoded = STANDARD.decode(entry).map_err(|_| invalid())?;
        if decoded.len() != DIGEST_LENGTH {
            return Err(invalid());
        }
        Ok(Self(entry.to_string()))
    }

    /// Wrap the encoding of a freshly computed digest.
    pub fn from_digest(digest: &[u8; DIGEST_LENGTH]) -> Self {
        Self(STANDARD.encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CommitmentHash {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CommitmentHash> for String {
    fn from(hash: CommitmentHash) -> Self {
        hash.0
    }
}

impl fmt::Display for CommitmentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical outcome of offline resolution for one confirmed ballot.
///
/// `hash_shares` are the N hashed long vote cast return code shares in
/// ascending node order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedConfirmedVote {
    pub verification_card_id: String,
    pub verification_card_set_id: String,
    pub hash_shares: [String; NODE_COUNT],
}

impl ResolvedConfirmedVote {
    pub fn new(
        verification_card_id: impl Into<String>,
        verification_card_set_id: impl Into<String>,
        hash_shares: Vec<String>,
    ) -> TypeResult<Self> {
        Ok(Self {
            verification_card_id: verification_card_id.into(),
            verification_card_set_id: verification_card_set_id.into(),
            hash_shares: into_node_array(hash_shares)?,
        })
    }

    /// Context triple of this vote within `election_event_id`.
    pub fn context_ids(&self, election_event_id: &str) -> ContextIds {
        ContextIds {
            election_event_id: election_event_id.to_string(),
            verification_card_set_id: self.verification_card_set_id.clone(),
            verification_card_id: self.verification_card_id.clone(),
        }
    }
}
