//! Hash dispatcher: one deterministic bucket-index rule per key kind.

use num_bigint::{BigInt, Sign};
use thiserror::Error;

use crate::key::Key;

/// The key kind has no defined hashing rule (identity-only keys, or a
/// composite containing one). Raised before any mutation takes place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid key type: key kind has no hashing rule")]
pub struct InvalidKeyType;

/// Maps `key` to a bucket index in `[0, bucket_count)`.
///
/// Deterministic and unseeded: identical `(key, bucket_count)` pairs always
/// produce the same index. `bucket_count` must be non-zero; the container
/// guarantees this on every call site (a zero-length bucket array is handled
/// before hashing, see `ChainMap`).
///
/// Per-kind rules:
/// - `Int`: `key mod bucket_count`, non-negative even for negative keys.
/// - `Big`: the same residue computed in arbitrary precision.
/// - `Bool`: as the integer 0 or 1.
/// - `Text`: base-31 polynomial over Unicode scalar values, reduced mod
///   `bucket_count`.
/// - `Seq`/`Record`: sum of the members' own bucket indices, accumulated in
///   extended precision, reduced mod `bucket_count`. Record field names are
///   excluded, so composites with different shapes but identically hashing
///   member values collide. That under-discrimination is part of the hashing
///   contract, not an accident; callers wanting structural hashing need a
///   different dispatcher.
/// - `Opaque`: [`InvalidKeyType`].
pub fn bucket_index(key: &Key, bucket_count: usize) -> Result<usize, InvalidKeyType> {
    assert!(bucket_count > 0, "bucket_count must be non-zero");
    match key {
        Key::Int(i) => Ok(i.rem_euclid(bucket_count as i64) as usize),
        Key::Big(b) => Ok(big_residue(b, bucket_count)),
        Key::Bool(b) => Ok((*b as usize) % bucket_count),
        Key::Text(s) => Ok((text_hash(s) % bucket_count as u64) as usize),
        Key::Seq(members) => composite_index(members.iter(), bucket_count),
        Key::Record(fields) => composite_index(fields.iter().map(|(_, v)| v), bucket_count),
        Key::Opaque(_) => Err(InvalidKeyType),
    }
}

/// Checks that `key` has a hashing rule without computing an index. Used by
/// operations that must reject unsupported kinds while the bucket array is
/// still empty (no modulus exists yet).
pub fn validate(key: &Key) -> Result<(), InvalidKeyType> {
    match key {
        Key::Opaque(_) => Err(InvalidKeyType),
        Key::Seq(members) => members.iter().try_for_each(validate),
        Key::Record(fields) => fields.iter().try_for_each(|(_, v)| validate(v)),
        _ => Ok(()),
    }
}

fn big_residue(b: &BigInt, bucket_count: usize) -> usize {
    let n = BigInt::from(bucket_count);
    let mut r = b % &n;
    if r.sign() == Sign::Minus {
        r += &n;
    }
    // r is in [0, bucket_count), so it always fits a usize.
    usize::try_from(r).expect("residue is in [0, bucket_count)")
}

fn text_hash(s: &str) -> u64 {
    let mut h: u64 = 0;
    for c in s.chars() {
        h = h.wrapping_mul(31).wrapping_add(c as u64);
    }
    h
}

fn composite_index<'a>(
    members: impl Iterator<Item = &'a Key>,
    bucket_count: usize,
) -> Result<usize, InvalidKeyType> {
    let mut sum: u128 = 0;
    for member in members {
        sum += bucket_index(member, bucket_count)? as u128;
    }
    Ok((sum % bucket_count as u128) as usize)
}
