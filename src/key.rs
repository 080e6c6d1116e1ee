//! Key sum type: the closed set of key kinds the map can hash.

use std::sync::atomic::{AtomicU64, Ordering};

use num_bigint::BigInt;

/// A map key. One variant per supported key kind, plus [`Key::Opaque`] for
/// identity-only keys (callables, per-instance symbols) that carry no value
/// semantics and are rejected by the hash dispatcher.
///
/// Keys compare by structural value-equality: two `Text` keys with the same
/// characters are the same key, two `Seq` keys with equal members are the
/// same key. Only `Opaque` compares by minted identity.
///
/// The std `Hash` derive exists so callers (and the test suites) can mirror a
/// `ChainMap` with a `std::collections::HashMap`; the map itself never hashes
/// a key through it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// Machine integer. Negative values hash to a non-negative index.
    Int(i64),
    /// Arbitrary-precision integer.
    Big(BigInt),
    /// Boolean, hashed as the integer 0 or 1.
    Bool(bool),
    /// Text, hashed with a base-31 polynomial over Unicode scalar values.
    Text(String),
    /// Ordered composite: members hashed recursively.
    Seq(Vec<Key>),
    /// Keyed composite. Field order is preserved for equality; field names do
    /// NOT participate in hashing, only member values do.
    Record(Vec<(String, Key)>),
    /// Identity-only key with no hashing rule. Any operation that must hash
    /// one of these fails with `InvalidKeyType`.
    Opaque(OpaqueToken),
}

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(0);

/// Per-instance identity token backing [`Key::Opaque`]. Each minted token is
/// distinct; equality means "the same minting", never structural sameness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpaqueToken(u64);

impl OpaqueToken {
    /// Mints a fresh token, unequal to every previously minted one.
    pub fn new() -> Self {
        OpaqueToken(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for OpaqueToken {
    fn default() -> Self {
        Self::new()
    }
}

impl From<i64> for Key {
    fn from(v: i64) -> Self {
        Key::Int(v)
    }
}

impl From<i32> for Key {
    fn from(v: i32) -> Self {
        Key::Int(v as i64)
    }
}

impl From<bool> for Key {
    fn from(v: bool) -> Self {
        Key::Bool(v)
    }
}

impl From<&str> for Key {
    fn from(v: &str) -> Self {
        Key::Text(v.to_string())
    }
}

impl From<String> for Key {
    fn from(v: String) -> Self {
        Key::Text(v)
    }
}

impl From<BigInt> for Key {
    fn from(v: BigInt) -> Self {
        Key::Big(v)
    }
}

impl From<Vec<Key>> for Key {
    fn from(v: Vec<Key>) -> Self {
        Key::Seq(v)
    }
}

impl From<OpaqueToken> for Key {
    fn from(v: OpaqueToken) -> Self {
        Key::Opaque(v)
    }
}
