//! # Recursive Hashing
//!
//! Structured SHA3-256 hashing over a tree of typed values.
//!
//! ## Encoding
//!
//! | Node | Digest |
//! |------|--------|
//! | `Bytes(b)` | `H(0x00 ‖ b)` |
//! | `Integer(n)` | `H(0x01 ‖ minimal big-endian bytes of n)` |
//! | `Text(s)` | `H(0x02 ‖ utf8(s))` |
//! | `List(xs)` | `H(0x03 ‖ H(x1) ‖ … ‖ H(xn))` |
//!
//! The type prefix makes the encoding injective across node kinds, so a
//! text `"1"` and an integer `1` never collide.

use primitive_types::U256;
use sha3::{Digest, Sha3_256};
use shared_types::{ContextIds, GqGroup, GroupElement, DIGEST_LENGTH};

/// SHA3-256 output.
pub type Hash = [u8; DIGEST_LENGTH];

const BYTES_PREFIX: u8 = 0x00;
const INTEGER_PREFIX: u8 = 0x01;
const TEXT_PREFIX: u8 = 0x02;
const LIST_PREFIX: u8 = 0x03;

/// A value in hashable form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hashable {
    Bytes(Vec<u8>),
    Integer(U256),
    Text(String),
    List(Vec<Hashable>),
}

impl Hashable {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

/// Conversion into the hashable tree.
pub trait ToHashable {
    fn to_hashable(&self) -> Hashable;
}

impl ToHashable for Hashable {
    fn to_hashable(&self) -> Hashable {
        self.clone()
    }
}

impl ToHashable for str {
    fn to_hashable(&self) -> Hashable {
        Hashable::Text(self.to_string())
    }
}

impl ToHashable for String {
    fn to_hashable(&self) -> Hashable {
        Hashable::Text(self.clone())
    }
}

impl ToHashable for U256 {
    fn to_hashable(&self) -> Hashable {
        Hashable::Integer(*self)
    }
}

impl ToHashable for u64 {
    fn to_hashable(&self) -> Hashable {
        Hashable::Integer(U256::from(*self))
    }
}

impl ToHashable for GqGroup {
    fn to_hashable(&self) -> Hashable {
        Hashable::List(vec![
            Hashable::Integer(self.p),
            Hashable::Integer(self.q),
            Hashable::Integer(self.g),
        ])
    }
}

impl ToHashable for GroupElement {
    fn to_hashable(&self) -> Hashable {
        Hashable::Integer(*self.value())
    }
}

impl ToHashable for ContextIds {
    fn to_hashable(&self) -> Hashable {
        Hashable::List(vec![
            self.election_event_id.to_hashable(),
            self.verification_card_set_id.to_hashable(),
            self.verification_card_id.to_hashable(),
        ])
    }
}

impl<T: ToHashable> ToHashable for [T] {
    fn to_hashable(&self) -> Hashable {
        Hashable::List(self.iter().map(ToHashable::to_hashable).collect())
    }
}

impl<T: ToHashable> ToHashable for Vec<T> {
    fn to_hashable(&self) -> Hashable {
        self.as_slice().to_hashable()
    }
}

impl<T: ToHashable + ?Sized> ToHashable for &T {
    fn to_hashable(&self) -> Hashable {
        (**self).to_hashable()
    }
}

/// Minimal big-endian encoding; zero encodes as a single zero byte.
fn integer_bytes(value: &U256) -> Vec<u8> {
    let mut buf = [0u8; 32];
    value.to_big_endian(&mut buf);
    let first = buf.iter().position(|&b| b != 0).unwrap_or(buf.len() - 1);
    buf[first..].to_vec()
}

/// Recursive SHA3-256 hash of a hashable tree.
pub fn recursive_hash(value: &Hashable) -> Hash {
    let mut hasher = Sha3_256::new();
    match value {
        Hashable::Bytes(bytes) => {
            hasher.update([BYTES_PREFIX]);
            hasher.update(bytes);
        }
        Hashable::Integer(n) => {
            hasher.update([INTEGER_PREFIX]);
            hasher.update(integer_bytes(n));
        }
        Hashable::Text(s) => {
            hasher.update([TEXT_PREFIX]);
            hasher.update(s.as_bytes());
        }
        Hashable::List(items) => {
            hasher.update([LIST_PREFIX]);
            for item in items {
                hasher.update(recursive_hash(item));
            }
        }
    }
    hasher.finalize().into()
}

/// Hash several values as one list.
pub fn recursive_hash_of(values: &[&dyn ToHashable]) -> Hash {
    recursive_hash(&Hashable::List(
        values.iter().map(|v| v.to_hashable()).collect(),
    ))
}
