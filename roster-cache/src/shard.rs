use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

use crate::entry::CacheEntry;

/// Node in a shard's recency list.
///
/// Nodes live in a slab `Vec` and link to each other by index; freed slots
/// are recycled through a free list.
struct Node<T> {
    key: String,
    entry: CacheEntry<T>,
    prev: Option<usize>,
    next: Option<usize>,
}

struct ShardInner<T> {
    map: HashMap<String, usize>,
    nodes: Vec<Option<Node<T>>>,
    free: Vec<usize>,
    /// Most recently used.
    head: Option<usize>,
    /// Least recently used.
    tail: Option<usize>,
}

/// One independently locked partition of the cache.
///
/// A single exclusive lock covers both the map and the recency list: reads
/// mutate recency, so there is no shared-lock fast path.
pub(crate) struct Shard<T> {
    capacity: usize,
    inner: Mutex<ShardInner<T>>,
}

impl<T: Clone> Shard<T> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(ShardInner {
                map: HashMap::with_capacity(capacity),
                nodes: Vec::with_capacity(capacity),
                free: Vec::new(),
                head: None,
                tail: None,
            }),
        }
    }

    /// Look up `key`, promoting the entry to most recently used on a hit.
    ///
    /// An expired entry is removed synchronously and reported as a miss.
    pub(crate) fn get(&self, key: &str, now: Instant) -> Option<T> {
        let mut inner = self.inner.lock().unwrap();
        let idx = *inner.map.get(key)?;

        if inner.nodes[idx].as_ref().unwrap().entry.is_expired(now) {
            inner.remove_index(idx);
            return None;
        }

        inner.move_to_front(idx);
        Some(inner.nodes[idx].as_ref().unwrap().entry.value.clone())
    }

    /// Insert or replace `key`.
    ///
    /// An existing entry has its value and expiration replaced and is
    /// promoted; a new entry evicts the least recently used one first if
    /// the shard is at capacity.
    pub(crate) fn insert(&self, key: String, value: T, expires_at: Option<Instant>) {
        let mut inner = self.inner.lock().unwrap();

        if let Some(&idx) = inner.map.get(&key) {
            let node = inner.nodes[idx].as_mut().unwrap();
            node.entry = CacheEntry::new(value, expires_at);
            inner.move_to_front(idx);
            return;
        }

        if inner.map.len() >= self.capacity
            && let Some(lru) = inner.tail
        {
            inner.remove_index(lru);
        }

        let node = Node {
            key: key.clone(),
            entry: CacheEntry::new(value, expires_at),
            prev: None,
            next: None,
        };
        let idx = match inner.free.pop() {
            Some(slot) => {
                inner.nodes[slot] = Some(node);
                slot
            }
            None => {
                inner.nodes.push(Some(node));
                inner.nodes.len() - 1
            }
        };
        inner.map.insert(key, idx);
        inner.push_front(idx);
    }

    /// Remove `key` if present. Returns whether an entry was removed.
    pub(crate) fn remove(&self, key: &str) -> bool {
        let mut inner = self.inner.lock().unwrap();
        match inner.map.get(key) {
            Some(&idx) => {
                inner.remove_index(idx);
                true
            }
            None => false,
        }
    }

    /// Drop every expired entry. Returns the number removed.
    pub(crate) fn remove_expired(&self, now: Instant) -> usize {
        let mut inner = self.inner.lock().unwrap();
        let expired: Vec<usize> = inner
            .map
            .values()
            .copied()
            .filter(|&idx| inner.nodes[idx].as_ref().unwrap().entry.is_expired(now))
            .collect();
        let removed = expired.len();
        for idx in expired {
            inner.remove_index(idx);
        }
        removed
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.lock().unwrap().map.len()
    }

    pub(crate) fn clear(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.map.clear();
        inner.nodes.clear();
        inner.free.clear();
        inner.head = None;
        inner.tail = None;
    }
}

impl<T> ShardInner<T> {
    fn push_front(&mut self, idx: usize) {
        self.nodes[idx].as_mut().unwrap().prev = None;
        self.nodes[idx].as_mut().unwrap().next = self.head;
        if let Some(old_head) = self.head {
            self.nodes[old_head].as_mut().unwrap().prev = Some(idx);
        }
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let node = self.nodes[idx].as_ref().unwrap();
            (node.prev, node.next)
        };
        match prev {
            Some(p) => self.nodes[p].as_mut().unwrap().next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.nodes[n].as_mut().unwrap().prev = prev,
            None => self.tail = prev,
        }
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.unlink(idx);
        self.push_front(idx);
    }

    fn remove_index(&mut self, idx: usize) {
        self.unlink(idx);
        let node = self.nodes[idx].take().unwrap();
        self.map.remove(&node.key);
        self.free.push(idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn eviction_removes_least_recently_used() {
        let shard = Shard::new(2);
        let now = Instant::now();
        shard.insert("a".into(), 1, None);
        shard.insert("b".into(), 2, None);
        // Touch "a" so "b" becomes the eviction candidate.
        assert_eq!(shard.get("a", now), Some(1));
        shard.insert("c".into(), 3, None);

        assert_eq!(shard.len(), 2);
        assert_eq!(shard.get("a", now), Some(1));
        assert_eq!(shard.get("b", now), None);
        assert_eq!(shard.get("c", now), Some(3));
    }

    #[test]
    fn expired_entry_is_a_miss_and_is_removed() {
        let shard = Shard::new(4);
        let now = Instant::now();
        shard.insert("k".into(), 7, Some(now + Duration::from_millis(10)));

        assert_eq!(shard.get("k", now), Some(7));
        let later = now + Duration::from_millis(20);
        assert_eq!(shard.get("k", later), None);
        assert_eq!(shard.len(), 0);
    }

    #[test]
    fn slot_reuse_keeps_list_consistent() {
        let shard = Shard::new(3);
        let now = Instant::now();
        for round in 0..5 {
            for i in 0..3 {
                shard.insert(format!("k{round}-{i}"), i, None);
            }
        }
        assert_eq!(shard.len(), 3);
        for i in 0..3 {
            assert_eq!(shard.get(&format!("k4-{i}"), now), Some(i));
        }
    }
}
