//! # Group Types
//!
//! The encryption group and its elements, as carried by confirmation keys,
//! value shares and extracted encrypted votes.
//!
//! Group arithmetic is not performed here. Only the two properties the
//! agreement protocol relies on are modelled: group equality and element
//! membership.

use crate::errors::{TypeError, TypeResult};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Quadratic-residue group `G_q` of a safe prime `p = 2q + 1` with generator `g`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GqGroup {
    /// Modulus.
    pub p: U256,
    /// Group order.
    pub q: U256,
    /// Generator.
    pub g: U256,
}

impl GqGroup {
    pub fn new(p: U256, q: U256, g: U256) -> Self {
        Self { p, q, g }
    }

    /// Membership test: `1 <= value < p`.
    pub fn is_member(&self, value: &U256) -> bool {
        !value.is_zero() && *value < self.p
    }

    /// Generator as an element of this group.
    pub fn generator(&self) -> GroupElement {
        GroupElement {
            value: self.g,
            group: self.clone(),
        }
    }
}

/// An element of a [`GqGroup`]. Equality includes the group.
///
/// Deserialization goes through [`GroupElement::new`], so a decoded element
/// is always a member of its group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawGroupElement")]
pub struct GroupElement {
    value: U256,
    group: GqGroup,
}

/// Unchecked wire form of a [`GroupElement`].
#[derive(Deserialize)]
struct RawGroupElement {
    value: U256,
    group: GqGroup,
}

impl TryFrom<RawGroupElement> for GroupElement {
    type Error = TypeError;

    fn try_from(raw: RawGroupElement) -> Result<Self, Self::Error> {
        Self::new(raw.value, &raw.group)
    }
}

impl GroupElement {
    /// Create an element, checking membership.
    pub fn new(value: U256, group: &GqGroup) -> TypeResult<Self> {
        if !group.is_member(&value) {
            return Err(TypeError::NotGroupMember);
        }
        Ok(Self {
            value,
            group: group.clone(),
        })
    }

    pub fn value(&self) -> &U256 {
        &self.value
    }

    pub fn group(&self) -> &GqGroup {
        &self.group
    }

    /// Fails with `ContextMismatch` unless this element belongs to `group`.
    pub fn ensure_group(&self, group: &GqGroup) -> TypeResult<()> {
        if &self.group != group {
            return Err(TypeError::ContextMismatch {
                reason: "group element does not belong to the payload group".to_string(),
            });
        }
        Ok(())
    }
}
