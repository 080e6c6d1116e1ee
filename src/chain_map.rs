//! ChainMap: the public container and its load-factor resize policy.

use crate::chain::{self, Link};
use crate::hash::{self, InvalidKeyType};
use crate::key::Key;

/// Default capacity factor: grow at load factor 5, shrink at 1/5.
const DEFAULT_CAPACITY_FACTOR: usize = 5;

/// A mutable map from [`Key`]s to values, built on separate chaining over a
/// resizable bucket array.
///
/// Every operation that needs a bucket index asks the hash dispatcher with
/// the current bucket count, then walks that bucket's chain comparing keys by
/// value-equality. The bucket array is replaced wholesale whenever the load
/// factor (`size / bucket_count`) crosses the capacity factor on insert or
/// its inverse on delete; a resize rehashes every live entry because bucket
/// indices are only meaningful for the array length they were computed
/// against.
///
/// The map starts with a zero-length bucket array. A zero-length array
/// counts as at capacity, so the first insert sizes the array through the
/// ordinary growth trigger (to `capacity * 1` buckets) before any hash is
/// computed; read operations on the empty array report absence without ever
/// dividing by the array length.
///
/// Single-threaded by design: a `ChainMap` is a plain owned value with no
/// interior locking. Wrap it externally if it must ever be shared.
#[derive(Debug)]
pub struct ChainMap<V> {
    buckets: Vec<Link<V>>,
    size: usize,
    capacity: usize,
}

impl<V> ChainMap<V> {
    /// Creates an empty map with the default capacity factor of 5.
    pub fn new() -> Self {
        Self::with_capacity_factor(DEFAULT_CAPACITY_FACTOR)
    }

    /// Creates an empty map with the given capacity factor. The factor is
    /// the load-factor threshold used symmetrically by both triggers: grow
    /// when `size / bucket_count >= factor`, shrink when it drops to
    /// `1 / factor` or below.
    ///
    /// # Panics
    ///
    /// Panics if `factor` is zero.
    pub fn with_capacity_factor(factor: usize) -> Self {
        assert!(factor > 0, "capacity factor must be non-zero");
        ChainMap {
            buckets: Vec::new(),
            size: 0,
            capacity: factor,
        }
    }

    /// Returns the value stored under `key`, or `None` if absent. Absence is
    /// not an error; only an unhashable key kind is.
    pub fn get(&self, key: &Key) -> Result<Option<&V>, InvalidKeyType> {
        if self.buckets.is_empty() {
            hash::validate(key)?;
            return Ok(None);
        }
        let idx = hash::bucket_index(key, self.buckets.len())?;
        Ok(chain::find(&self.buckets[idx], key))
    }

    /// Inserts `value` under `key`, overwriting in place if the key is
    /// already present (the size counter is unchanged by an overwrite).
    ///
    /// A brand-new key increments the size, runs the growth check, and is
    /// then prepended as the head of its chain, re-hashed against the new
    /// bucket count if the check fired. Hashing happens before any mutation,
    /// so a rejected key leaves the map untouched.
    pub fn set(&mut self, key: Key, value: V) -> Result<(), InvalidKeyType> {
        if self.buckets.is_empty() {
            // No modulus exists yet, so only the kind check runs here; the
            // growth trigger below sizes the array before the key is hashed.
            // A rejected key must not leave a mutated map.
            hash::validate(&key)?;
        } else {
            let idx = hash::bucket_index(&key, self.buckets.len())?;
            if let Some(slot) = chain::find_mut(&mut self.buckets[idx], &key) {
                *slot = value;
                return Ok(());
            }
        }

        self.size += 1;
        if self.is_at_capacity() {
            self.resize(self.capacity * self.size);
        }
        // The growth check may have replaced the array; the index must be
        // recomputed against the current length.
        let idx = hash::bucket_index(&key, self.buckets.len())?;
        chain::push_head(&mut self.buckets[idx], key, value);
        Ok(())
    }

    /// Returns whether `key` is present. Guaranteed `false` without touching
    /// the bucket array (or the key) whenever the map is empty; on a
    /// non-empty map an unhashable key kind is an error, as everywhere else.
    pub fn has(&self, key: &Key) -> Result<bool, InvalidKeyType> {
        if self.size == 0 {
            return Ok(false);
        }
        let idx = hash::bucket_index(key, self.buckets.len())?;
        Ok(chain::contains(&self.buckets[idx], key))
    }

    /// Removes the entry under `key`; a no-op if the key is absent.
    ///
    /// The size counter is decremented and the shrink check consulted before
    /// the removal walk, so the chain is located at the possibly-just-resized
    /// bucket array. The spliced-out node releases exactly itself; its tail
    /// is reattached to the predecessor.
    pub fn remove(&mut self, key: &Key) -> Result<(), InvalidKeyType> {
        if !self.has(key)? {
            return Ok(());
        }

        self.size -= 1;
        if self.is_near_empty() {
            self.resize(self.size / self.capacity);
        }

        let idx = hash::bucket_index(key, self.buckets.len())?;
        chain::remove(&mut self.buckets[idx], key);
        Ok(())
    }

    /// Number of live entries.
    pub fn length(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Current bucket-array length. Zero on a fresh (or cleared) map.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Discards every entry and the bucket array itself in one step,
    /// returning the map to its freshly constructed state.
    pub fn clear(&mut self) {
        self.buckets = Vec::new();
        self.size = 0;
    }

    /// All keys, in bucket-index order and head-to-tail within a chain (the
    /// most recently inserted of colliding keys first, since inserts
    /// prepend). Order across buckets is not meaningful.
    pub fn keys(&self) -> Vec<&Key> {
        self.iter().map(|(k, _)| k).collect()
    }

    /// All values, in the same order as [`ChainMap::keys`].
    pub fn values(&self) -> Vec<&V> {
        self.iter().map(|(_, v)| v).collect()
    }

    /// All entries, in the same order as [`ChainMap::keys`].
    pub fn entries(&self) -> Vec<(&Key, &V)> {
        self.iter().collect()
    }

    /// Rebuilds the bucket array at `bucket_count` buckets (minimum 1) and
    /// rehashes every live entry into it. Both resize triggers funnel here;
    /// it is public so callers can re-bucket manually.
    ///
    /// The rebuild drains the old chains and re-links each entry directly,
    /// with the grow/shrink triggers suppressed: the thresholds were already
    /// evaluated against the target count, and re-checking per re-insertion
    /// could cascade.
    pub fn resize(&mut self, bucket_count: usize) {
        let bucket_count = bucket_count.max(1);
        let old = std::mem::replace(&mut self.buckets, empty_buckets(bucket_count));

        let mut entries = Vec::with_capacity(self.size);
        for head in old {
            chain::drain_into(head, &mut entries);
        }
        for (key, value) in entries {
            // Every drained key was validated when it was first inserted.
            let idx = hash::bucket_index(&key, bucket_count)
                .expect("stored keys have a hashing rule");
            chain::push_head(&mut self.buckets[idx], key, value);
        }
    }

    fn iter(&self) -> impl Iterator<Item = (&Key, &V)> {
        self.buckets.iter().flat_map(chain::iter)
    }

    /// Growth trigger: load factor at or above the capacity factor.
    /// Integer form of `size / bucket_count >= capacity`. A zero-length
    /// array has an unbounded load factor, so it is always at capacity;
    /// this is what sizes the array on the first insert.
    fn is_at_capacity(&self) -> bool {
        self.size >= self.capacity * self.buckets.len()
    }

    /// Shrink trigger: load factor at or below the inverse capacity factor.
    /// Integer form of `size / bucket_count <= 1 / capacity`.
    fn is_near_empty(&self) -> bool {
        self.size * self.capacity <= self.buckets.len()
    }

    /// Structural ground truth for the test suites: the size counter matches
    /// the reachable nodes, no bucket holds a duplicate key, and every node
    /// sits in the bucket its key hashes to under the current count.
    #[cfg(test)]
    pub(crate) fn assert_structural_invariants(&self) {
        let reachable: usize = self.buckets.iter().map(|h| chain::iter(h).count()).sum();
        assert_eq!(self.size, reachable, "size counter out of sync");

        let n = self.buckets.len();
        for (idx, head) in self.buckets.iter().enumerate() {
            let keys: Vec<&Key> = chain::iter(head).map(|(k, _)| k).collect();
            for (i, &key) in keys.iter().enumerate() {
                assert_eq!(
                    hash::bucket_index(key, n).expect("stored keys have a hashing rule"),
                    idx,
                    "node in the wrong bucket"
                );
                assert!(
                    !keys[..i].contains(&key),
                    "duplicate key within one bucket: {key:?}"
                );
            }
        }
    }
}

impl<V> Default for ChainMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

fn empty_buckets<V>(bucket_count: usize) -> Vec<Link<V>> {
    let mut buckets = Vec::with_capacity(bucket_count);
    buckets.resize_with(bucket_count, || None);
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::OpaqueToken;

    /// Counts nodes by walking every chain; the ground truth `size` must
    /// always agree with.
    fn reachable<V>(map: &ChainMap<V>) -> usize {
        map.buckets.iter().map(|h| chain::iter(h).count()).sum()
    }

    /// Invariant: a fresh map has no buckets and no entries.
    #[test]
    fn fresh_map_is_empty() {
        let map: ChainMap<i32> = ChainMap::new();
        assert_eq!(map.bucket_count(), 0);
        assert_eq!(map.length(), 0);
        assert!(map.is_empty());
    }

    /// Invariant: the first insert sizes the bucket array through the
    /// growth trigger (empty array counts as at capacity) before hashing.
    #[test]
    fn first_insert_sizes_the_array() {
        let mut map = ChainMap::new();
        map.set(Key::Int(0), "a").unwrap();
        assert_eq!(map.bucket_count(), 5); // capacity factor * size == 5 * 1
        assert_eq!(map.get(&Key::Int(0)).unwrap(), Some(&"a"));
    }

    /// Invariant: a rejected key on `set` leaves the map unmutated, even on
    /// the empty-array path where the first-insert resize would run.
    #[test]
    fn rejected_set_mutates_nothing() {
        let mut map: ChainMap<i32> = ChainMap::new();
        let bad = Key::Opaque(OpaqueToken::new());
        assert_eq!(map.set(bad.clone(), 1), Err(InvalidKeyType));
        assert_eq!(map.bucket_count(), 0);
        assert_eq!(map.length(), 0);

        map.set(Key::Int(1), 1).unwrap();
        let before = map.bucket_count();
        assert_eq!(map.set(bad, 2), Err(InvalidKeyType));
        assert_eq!(map.length(), 1);
        assert_eq!(map.bucket_count(), before);
    }

    /// Invariant: the growth trigger fires at `size >= capacity * buckets`
    /// and the new bucket count is `capacity * size`.
    #[test]
    fn growth_resizes_to_capacity_times_size() {
        let mut map = ChainMap::with_capacity_factor(2);
        map.set(Key::Int(0), 0).unwrap(); // empty array at capacity -> 2 buckets
        assert_eq!(map.bucket_count(), 2);
        map.set(Key::Int(1), 1).unwrap(); // size 2 < 2*2
        map.set(Key::Int(2), 2).unwrap(); // size 3 < 4
        assert_eq!(map.bucket_count(), 2);
        map.set(Key::Int(3), 3).unwrap(); // size 4 >= 2*2 -> resize to 8
        assert_eq!(map.bucket_count(), 8);
        map.set(Key::Int(4), 4).unwrap();
        map.set(Key::Int(5), 5).unwrap();
        map.set(Key::Int(6), 6).unwrap();
        map.set(Key::Int(7), 7).unwrap(); // sizes 5..8, all < 2*8
        assert_eq!(map.bucket_count(), 8);
        assert_eq!(map.length(), 8);
        assert_eq!(reachable(&map), 8);
        for i in 0..8 {
            assert_eq!(map.get(&Key::Int(i)).unwrap(), Some(&(i as i32)));
        }
    }

    /// Invariant: overwriting an existing key never trips the growth check.
    #[test]
    fn overwrite_does_not_grow() {
        let mut map = ChainMap::with_capacity_factor(2);
        map.set(Key::Int(0), 0).unwrap();
        map.set(Key::Int(1), 1).unwrap();
        let buckets = map.bucket_count();
        for _ in 0..10 {
            map.set(Key::Int(1), 99).unwrap();
        }
        assert_eq!(map.bucket_count(), buckets);
        assert_eq!(map.length(), 2);
        assert_eq!(map.get(&Key::Int(1)).unwrap(), Some(&99));
    }

    /// Invariant: the shrink trigger fires at `size * capacity <= buckets`
    /// and the bucket count floors at 1.
    #[test]
    fn shrink_floors_at_one_bucket() {
        let mut map = ChainMap::with_capacity_factor(2);
        for i in 0..8 {
            map.set(Key::Int(i), i).unwrap();
        }
        assert_eq!(map.bucket_count(), 8);
        for i in 0..7 {
            map.remove(&Key::Int(i)).unwrap();
        }
        // The walk down to size 1 hits the trigger at size 4 (8 <= 8,
        // shrinking to 2) and again at size 1 (2 <= 2), where
        // size / capacity == 0 must floor at one bucket.
        assert_eq!(map.bucket_count(), 1);
        assert_eq!(map.length(), 1);
        assert_eq!(reachable(&map), 1);
        assert_eq!(map.get(&Key::Int(7)).unwrap(), Some(&7));

        map.remove(&Key::Int(7)).unwrap();
        assert_eq!(map.length(), 0);
        assert_eq!(reachable(&map), 0);
        assert!(map.bucket_count() >= 1);
    }

    /// Invariant: size equals reachable nodes across a grow/shrink cycle.
    #[test]
    fn size_matches_reachable_through_resizes() {
        let mut map = ChainMap::new();
        for i in 0..64 {
            map.set(Key::Int(i), i).unwrap();
            assert_eq!(map.length(), (i + 1) as usize);
            assert_eq!(reachable(&map), map.length());
        }
        for i in 0..64 {
            map.remove(&Key::Int(i)).unwrap();
            assert_eq!(map.length(), (63 - i) as usize);
            assert_eq!(reachable(&map), map.length());
        }
    }

    /// Invariant: every node lives in the bucket its key hashes to under the
    /// current bucket count.
    #[test]
    fn nodes_live_in_their_hash_bucket() {
        let mut map = ChainMap::new();
        for i in -16i64..16 {
            map.set(Key::Int(i), i).unwrap();
        }
        map.set(Key::from("text key"), 0).unwrap();
        map.set(Key::Bool(true), 1).unwrap();
        let n = map.bucket_count();
        for (idx, head) in map.buckets.iter().enumerate() {
            for (key, _) in chain::iter(head) {
                assert_eq!(hash::bucket_index(key, n).unwrap(), idx);
            }
        }
    }

    /// Invariant: colliding keys chain in one bucket, most recent at the
    /// head, and each remains individually reachable.
    #[test]
    fn colliding_keys_share_a_chain() {
        let mut map = ChainMap::with_capacity_factor(100); // no growth
        map.set(Key::Int(0), "first").unwrap();
        let n = map.bucket_count() as i64;
        map.set(Key::Int(n), "second").unwrap();
        map.set(Key::Int(2 * n), "third").unwrap();
        assert_eq!(map.bucket_count() as i64, n, "growth must not have fired");

        let idx = hash::bucket_index(&Key::Int(0), n as usize).unwrap();
        let in_bucket: Vec<&&str> = chain::iter(&map.buckets[idx]).map(|(_, v)| v).collect();
        assert_eq!(in_bucket, vec![&"third", &"second", &"first"]);

        assert_eq!(map.get(&Key::Int(0)).unwrap(), Some(&"first"));
        assert_eq!(map.get(&Key::Int(n)).unwrap(), Some(&"second"));
        assert_eq!(map.get(&Key::Int(2 * n)).unwrap(), Some(&"third"));
    }

    /// Invariant: updating a key that collides with a non-equal chain head
    /// terminates and updates the right node (the traversal cursor must
    /// advance).
    #[test]
    fn update_behind_colliding_head_terminates() {
        let mut map = ChainMap::with_capacity_factor(100);
        map.set(Key::Int(0), "a").unwrap();
        let n = map.bucket_count() as i64;
        map.set(Key::Int(n), "b").unwrap(); // same bucket, new head
        map.set(Key::Int(0), "a2").unwrap(); // update node behind the head
        assert_eq!(map.length(), 2);
        assert_eq!(map.get(&Key::Int(0)).unwrap(), Some(&"a2"));
        assert_eq!(map.get(&Key::Int(n)).unwrap(), Some(&"b"));
    }

    /// Invariant: manual resize preserves the entry set and relocates every
    /// node to its new bucket.
    #[test]
    fn manual_resize_preserves_entries() {
        let mut map = ChainMap::new();
        for i in 0..10 {
            map.set(Key::Int(i), i * 10).unwrap();
        }
        let before: std::collections::HashSet<(Key, i64)> = map
            .entries()
            .iter()
            .map(|(k, v)| ((*k).clone(), **v))
            .collect();

        map.resize(97);
        assert_eq!(map.bucket_count(), 97);
        assert_eq!(map.length(), 10);
        assert_eq!(reachable(&map), 10);

        let after: std::collections::HashSet<(Key, i64)> = map
            .entries()
            .iter()
            .map(|(k, v)| ((*k).clone(), **v))
            .collect();
        assert_eq!(before, after);

        // Degenerate target clamps to one bucket and keeps everything.
        map.resize(0);
        assert_eq!(map.bucket_count(), 1);
        assert_eq!(map.length(), 10);
        assert_eq!(reachable(&map), 10);
    }

    /// Invariant: clear returns the map to the freshly constructed state.
    #[test]
    fn clear_resets_to_fresh_state() {
        let mut map = ChainMap::new();
        for i in 0..10 {
            map.set(Key::Int(i), i).unwrap();
        }
        map.clear();
        assert_eq!(map.length(), 0);
        assert_eq!(map.bucket_count(), 0);
        assert!(!map.has(&Key::Int(0)).unwrap());
        assert_eq!(map.get(&Key::Int(0)).unwrap(), None);

        // The cleared map accepts inserts again.
        map.set(Key::Int(3), 3).unwrap();
        assert_eq!(map.get(&Key::Int(3)).unwrap(), Some(&3));
    }

    /// Invariant: `has` on an empty map never hashes, so even an unhashable
    /// key reports absent rather than erroring.
    #[test]
    fn has_short_circuits_on_empty() {
        let map: ChainMap<i32> = ChainMap::new();
        let bad = Key::Opaque(OpaqueToken::new());
        assert_eq!(map.has(&bad), Ok(false));

        let mut map = map;
        map.set(Key::Int(1), 1).unwrap();
        assert_eq!(map.has(&bad), Err(InvalidKeyType));
    }

    /// Invariant: `get` on the zero-length array still rejects unhashable
    /// kinds but reports plain absence for hashable ones.
    #[test]
    fn get_on_empty_array() {
        let map: ChainMap<i32> = ChainMap::new();
        assert_eq!(map.get(&Key::Int(1)), Ok(None));
        assert_eq!(
            map.get(&Key::Opaque(OpaqueToken::new())),
            Err(InvalidKeyType)
        );
    }

    /// Invariant: removing an absent key is a no-op, including on a fresh
    /// map with no bucket array.
    #[test]
    fn remove_absent_is_noop() {
        let mut map: ChainMap<i32> = ChainMap::new();
        map.remove(&Key::Int(1)).unwrap();
        assert_eq!(map.length(), 0);

        map.set(Key::Int(1), 1).unwrap();
        map.remove(&Key::Int(2)).unwrap();
        assert_eq!(map.length(), 1);
        assert_eq!(map.get(&Key::Int(1)).unwrap(), Some(&1));
    }

    /// Invariant: removing a key that shares a chain leaves its neighbors
    /// reachable (head, interior, and tail removals).
    #[test]
    fn remove_from_shared_chain() {
        for victim in 0..3 {
            let mut map = ChainMap::with_capacity_factor(100);
            map.set(Key::Int(0), 0).unwrap();
            let n = map.bucket_count() as i64;
            map.set(Key::Int(n), 1).unwrap();
            map.set(Key::Int(2 * n), 2).unwrap();

            let doomed = Key::Int(victim as i64 * n);
            map.remove(&doomed).unwrap();
            assert_eq!(map.length(), 2);
            assert!(!map.has(&doomed).unwrap());
            for survivor in (0..3).filter(|i| *i != victim) {
                let key = Key::Int(survivor as i64 * n);
                assert_eq!(map.get(&key).unwrap(), Some(&survivor));
            }
        }
    }
}
