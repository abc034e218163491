use std::hash::Hash;

use indexmap::{Equivalent, IndexMap};
use tracing::trace;

/// A bounded map ordered by insertion, where reads move an entry to the back.
///
/// Eviction always drops the front entry, so an entry that is overwritten
/// without being read keeps its original slot.
#[derive(Debug, Clone)]
pub struct LruMap<K, V> {
    map: IndexMap<K, V>,
    max_size: usize,
}

impl<K: Hash + Eq, V> LruMap<K, V> {
    /// A `max_size` of zero disables eviction.
    pub fn new(max_size: usize) -> Self {
        Self {
            map: IndexMap::new(),
            max_size,
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        self.map.contains_key(key)
    }

    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        let index = self.map.get_index_of(key)?;
        let last = self.map.len() - 1;
        self.map.move_index(index, last);
        self.map.get_index(last).map(|(_, value)| value)
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.map.insert(key, value);
        if self.max_size > 0 && self.map.len() > self.max_size {
            self.map.shift_remove_index(0);
            trace!(max_size = self.max_size, "Evicted oldest cache entry");
        }
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Keys from the next eviction candidate to the most recent.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.map.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(map: &LruMap<String, u32>) -> Vec<&str> {
        map.keys().map(String::as_str).collect()
    }

    #[test]
    fn evicts_front_entry_when_full() {
        let mut map = LruMap::new(2);
        map.insert("a".to_owned(), 1);
        map.insert("b".to_owned(), 2);
        map.insert("c".to_owned(), 3);
        assert_eq!(keys(&map), ["b", "c"]);
        assert!(!map.contains_key("a"));
    }

    #[test]
    fn reads_refresh_an_entry() {
        let mut map = LruMap::new(2);
        map.insert("a".to_owned(), 1);
        map.insert("b".to_owned(), 2);
        assert_eq!(map.get("a"), Some(&1));
        map.insert("c".to_owned(), 3);
        assert_eq!(keys(&map), ["a", "c"]);
    }

    #[test]
    fn overwrites_keep_their_slot() {
        let mut map = LruMap::new(2);
        map.insert("a".to_owned(), 1);
        map.insert("b".to_owned(), 2);
        map.insert("a".to_owned(), 10);
        map.insert("c".to_owned(), 3);
        assert_eq!(keys(&map), ["b", "c"]);
        assert_eq!(map.get("b"), Some(&2));
    }

    #[test]
    fn zero_capacity_is_unbounded() {
        let mut map = LruMap::new(0);
        for i in 0..100u32 {
            map.insert(i.to_string(), i);
        }
        assert_eq!(map.len(), 100);
        assert_eq!(map.get("missing"), None);
    }
}
