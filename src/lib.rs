//! chain-map: a single-threaded separate-chaining hash map over dynamically
//! typed keys, with a load-factor-driven grow/shrink policy.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: build ChainMap in small, independently checkable layers so the
//!   hashing contract, the chain ownership rules, and the resize policy can
//!   each be reasoned about on their own.
//! - Layers:
//!   - `key`: the closed `Key` sum type (machine integers, arbitrary
//!     precision integers, booleans, text, and recursive composites) plus
//!     the identity-only `Opaque` variant that carries no value semantics.
//!   - `hash`: the dispatcher from `(key, bucket_count)` to an index in
//!     `[0, bucket_count)`, one deterministic rule per kind; `Opaque` keys
//!     fail with `InvalidKeyType` before anything is mutated.
//!   - `chain`: owning singly linked chains (`Option<Box<Node>>` links). A
//!     bucket head owns its first node; each node owns its tail. Splicing on
//!     removal reattaches the tail to the predecessor and releases exactly
//!     one node.
//!   - `chain_map`: the public container wiring the layers together and
//!     enforcing the resize policy.
//!
//! Constraints
//! - Single-threaded: a `ChainMap` is a plain owned value; any sharing or
//!   locking is a wrapping layer's concern.
//! - Deterministic hashing, no seeding: identical `(key, bucket_count)`
//!   always produces the same index.
//! - `size` equals the number of chain-reachable nodes at every public
//!   operation boundary.
//! - Keys are unique within a bucket; value-equality decides sameness.
//!
//! Resize policy
//! - Growth fires when an insert pushes the load factor
//!   (`size / bucket_count`) to the capacity factor or above; the array is
//!   rebuilt at `capacity * size` buckets.
//! - Shrink fires when a removal drops the load factor to the inverse
//!   capacity factor or below; the array is rebuilt at `size / capacity`
//!   buckets, floored at one.
//! - Every rebuild rehashes every live entry: a bucket index is only
//!   meaningful for the array length it was computed against. Triggers are
//!   suppressed during the rebuild itself.
//!
//! Composite-key hashing
//! - A composite hashes to the sum of its members' bucket indices, reduced
//!   by the bucket count. Field names of keyed composites are excluded, so
//!   structurally different composites whose member values hash alike will
//!   collide. That weak form is the defined contract and is kept as is.
//!
//! Notes and non-goals
//! - No persistence, no iteration-order guarantee across buckets (within a
//!   bucket: most recently inserted first), no concurrent access.
//! - `has` on an empty map answers `false` without consulting the bucket
//!   array, so it never errors there even for unhashable keys.
//! - The bucket array starts at length zero. A zero-length array counts as
//!   at capacity, so the first insert sizes it through the ordinary growth
//!   trigger before any modulus is computed.

pub mod chain_map;
pub mod hash;
pub mod key;

mod chain;
mod chain_map_proptest;

// Public surface
pub use chain_map::ChainMap;
pub use hash::{bucket_index, InvalidKeyType};
pub use key::{Key, OpaqueToken};
