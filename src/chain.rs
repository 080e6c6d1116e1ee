//! Owning singly linked chains: one per bucket, head owns the rest.

use crate::key::Key;

/// Head-or-next link. `None` is an empty chain (or the end of one); a link
/// exclusively owns everything reachable through it.
pub(crate) type Link<V> = Option<Box<Node<V>>>;

#[derive(Debug)]
pub(crate) struct Node<V> {
    pub(crate) key: Key,
    pub(crate) value: V,
    pub(crate) next: Link<V>,
}

/// Walks the chain and returns the value stored under `key`, if any.
pub(crate) fn find<'a, V>(head: &'a Link<V>, key: &Key) -> Option<&'a V> {
    let mut cur = head.as_deref();
    while let Some(node) = cur {
        if node.key == *key {
            return Some(&node.value);
        }
        cur = node.next.as_deref();
    }
    None
}

/// Like [`find`] but yields a mutable slot for update-in-place.
pub(crate) fn find_mut<'a, V>(head: &'a mut Link<V>, key: &Key) -> Option<&'a mut V> {
    let mut cur = head.as_deref_mut();
    while let Some(node) = cur {
        if node.key == *key {
            return Some(&mut node.value);
        }
        cur = node.next.as_deref_mut();
    }
    None
}

pub(crate) fn contains<V>(head: &Link<V>, key: &Key) -> bool {
    find(head, key).is_some()
}

/// Prepends a new node: the old head becomes the new node's tail. O(1).
pub(crate) fn push_head<V>(head: &mut Link<V>, key: Key, value: V) {
    let next = head.take();
    *head = Some(Box::new(Node { key, value, next }));
}

/// Unlinks the node holding `key` and returns its entry. A matching head is
/// replaced by its successor; otherwise a trailing cursor owns the
/// predecessor and splices the match out, reattaching the tail.
pub(crate) fn remove<V>(head: &mut Link<V>, key: &Key) -> Option<(Key, V)> {
    if head.as_ref().is_some_and(|n| n.key == *key) {
        let node = head.take()?;
        *head = node.next;
        return Some((node.key, node.value));
    }
    let mut cur = head.as_deref_mut();
    while let Some(node) = cur {
        if node.next.as_ref().is_some_and(|n| n.key == *key) {
            let mut removed = node.next.take()?;
            node.next = removed.next.take();
            return Some((removed.key, removed.value));
        }
        cur = node.next.as_deref_mut();
    }
    None
}

/// Borrowed head-to-tail iteration over one chain.
pub(crate) fn iter<V>(head: &Link<V>) -> Iter<'_, V> {
    Iter {
        cur: head.as_deref(),
    }
}

pub(crate) struct Iter<'a, V> {
    cur: Option<&'a Node<V>>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a Key, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.cur?;
        self.cur = node.next.as_deref();
        Some((&node.key, &node.value))
    }
}

/// Consumes a chain head-to-tail into owned entries, tearing the links down
/// iteratively so a long chain cannot overflow the stack.
pub(crate) fn drain_into<V>(head: Link<V>, out: &mut Vec<(Key, V)>) {
    let mut cur = head;
    while let Some(mut node) = cur {
        cur = node.next.take();
        out.push((node.key, node.value));
    }
}
