//! Round payloads exchanged with the control components.
//!
//! Round one carries [`HashShare`]s (hashed long vote cast return code
//! shares), round two carries [`ValueShare`]s (the shares themselves, once
//! agreement on the hashes has been reached).

use serde::{Deserialize, Serialize};
use shared_crypto::{Hashable, PayloadSignature, ToHashable};
use shared_types::{ContextIds, GqGroup, GroupElement, NodeId, NodeIndexed, TypeError, TypeResult};
use std::fmt;

/// Context label signed into every hash share.
pub const HASH_SHARE_CONTEXT: &str = "hlVCC";

/// Context label signed into every value share.
pub const VALUE_SHARE_CONTEXT: &str = "lVCC";

/// Context label of the relay's signature over the confirmation key.
pub const CONFIRMATION_KEY_CONTEXT: &str = "confirmationKey";

/// Keystore alias of the relay that forwards voter confirmations.
pub const VOTE_VERIFICATION_ALIAS: &str = "vote_verification";

/// Voter-committed confirmation value.
///
/// Signed by the upstream relay; its context must equal the enclosing
/// request's context and its element must live in the election group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationKey {
    pub context_ids: ContextIds,
    pub element: GroupElement,
}

impl ConfirmationKey {
    pub fn new(context_ids: ContextIds, element: GroupElement) -> Self {
        Self {
            context_ids,
            element,
        }
    }

    /// Check this key belongs to `context_ids` and `group`.
    pub fn ensure_bound_to(&self, context_ids: &ContextIds, group: &GqGroup) -> TypeResult<()> {
        context_ids.ensure_matches(&self.context_ids, "confirmation key")?;
        self.element.ensure_group(group)
    }

    /// Signature context of the relay's signature over this key.
    pub fn signing_context(&self) -> Hashable {
        Hashable::List(vec![
            Hashable::text(CONFIRMATION_KEY_CONTEXT),
            self.context_ids.to_hashable(),
        ])
    }
}

impl ToHashable for ConfirmationKey {
    fn to_hashable(&self) -> Hashable {
        Hashable::List(vec![
            self.context_ids.to_hashable(),
            self.element.to_hashable(),
        ])
    }
}

/// One node's commitment to its hashed long vote cast return code share.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashShare {
    pub node_id: NodeId,
    pub context_ids: ContextIds,
    pub confirmation_attempt_id: u8,
    /// Base64 hash of the node's long vote cast return code share
    pub hash_value: String,
    pub signature: PayloadSignature,
}

impl HashShare {
    /// Payload covered by the node's signature.
    pub fn signed_payload(&self) -> Hashable {
        Hashable::List(vec![
            self.context_ids.to_hashable(),
            Hashable::Integer(u64::from(self.confirmation_attempt_id).into()),
            Hashable::text(&self.hash_value),
        ])
    }

    /// Signature context for a hash share of `node_id`.
    pub fn signing_context(context_ids: &ContextIds, node_id: NodeId) -> Hashable {
        signing_context(HASH_SHARE_CONTEXT, context_ids, node_id)
    }
}

impl NodeIndexed for HashShare {
    fn node_id(&self) -> NodeId {
        self.node_id
    }
}

/// One node's value share, answered after hash agreement.
///
/// `actual_share` is present iff `is_verified` is true. Decoding enforces
/// this; shares built in code are checked with
/// [`ValueShare::ensure_well_formed`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawValueShare")]
pub struct ValueShare {
    pub context_ids: ContextIds,
    pub node_id: NodeId,
    pub group: GqGroup,
    pub confirmation_key: ConfirmationKey,
    pub is_verified: bool,
    pub actual_share: Option<GroupElement>,
    pub signature: PayloadSignature,
}

#[derive(Deserialize)]
struct RawValueShare {
    context_ids: ContextIds,
    node_id: NodeId,
    group: GqGroup,
    confirmation_key: ConfirmationKey,
    is_verified: bool,
    actual_share: Option<GroupElement>,
    signature: PayloadSignature,
}

impl TryFrom<RawValueShare> for ValueShare {
    type Error = TypeError;

    fn try_from(raw: RawValueShare) -> Result<Self, Self::Error> {
        let share = Self {
            context_ids: raw.context_ids,
            node_id: raw.node_id,
            group: raw.group,
            confirmation_key: raw.confirmation_key,
            is_verified: raw.is_verified,
            actual_share: raw.actual_share,
            signature: raw.signature,
        };
        share.ensure_well_formed()?;
        Ok(share)
    }
}

impl ValueShare {
    /// Fails with `MalformedShare` unless the verification flag and the
    /// presence of `actual_share` agree.
    pub fn ensure_well_formed(&self) -> TypeResult<()> {
        let reason = match (self.is_verified, self.actual_share.is_some()) {
            (true, true) | (false, false) => return Ok(()),
            (true, false) => "verified share carries no value",
            (false, true) => "unverified share carries a value",
        };
        Err(TypeError::MalformedShare {
            node_id: self.node_id.get(),
            reason,
        })
    }

    /// Check the share's nested context and elements against the session.
    pub fn ensure_consistent(&self, context_ids: &ContextIds, group: &GqGroup) -> TypeResult<()> {
        context_ids.ensure_matches(&self.context_ids, "value share")?;
        context_ids.ensure_matches(&self.confirmation_key.context_ids, "value share confirmation key")?;
        if &self.group != group {
            return Err(TypeError::ContextMismatch {
                reason: format!("value share from node {} carries a different group", self.node_id),
            });
        }
        self.confirmation_key.element.ensure_group(group)?;
        if let Some(share) = &self.actual_share {
            share.ensure_group(group)?;
        }
        Ok(())
    }

    /// Payload covered by the node's signature.
    pub fn signed_payload(&self) -> Hashable {
        let actual = match &self.actual_share {
            Some(share) => share.to_hashable(),
            None => Hashable::List(Vec::new()),
        };
        Hashable::List(vec![
            self.context_ids.to_hashable(),
            self.group.to_hashable(),
            self.confirmation_key.to_hashable(),
            Hashable::text(if self.is_verified { "verified" } else { "unverified" }),
            actual,
        ])
    }

    /// Signature context for a value share of `node_id`.
    pub fn signing_context(context_ids: &ContextIds, node_id: NodeId) -> Hashable {
        signing_context(VALUE_SHARE_CONTEXT, context_ids, node_id)
    }
}

impl NodeIndexed for ValueShare {
    fn node_id(&self) -> NodeId {
        self.node_id
    }
}

fn signing_context(label: &str, context_ids: &ContextIds, node_id: NodeId) -> Hashable {
    Hashable::List(vec![
        Hashable::text(label),
        context_ids.to_hashable(),
        Hashable::Integer(u64::from(node_id.get()).into()),
    ])
}

/// Short, human-presentable vote cast return code.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortCode(String);

impl ShortCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShortCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
