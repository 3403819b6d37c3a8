use crate::errors::{DError, DResult};
use crate::options::{sanitize_options, Options};
use crate::skiplist::skipnode::{Arena, Link, Node, NodeId, Pos};
use crate::skiplist::SkipListIter;
use crate::utils::random::{Random, RandomGenerator};
use slog::{debug, info, o, Logger};
#[cfg(test)]
use std::collections::HashSet;
use std::fmt;
use std::mem;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// The unguarded structure. Every access goes through the lock in [`SkipList`].
pub(crate) struct Inner<K, V> {
    arena: Arena<Node<K, V>>,
    // Forward links of the sentinel head, one per level in 0..=max_level.
    head: Vec<Link>,
    // Highest level any node currently occupies.
    level: usize,
    max_level: usize,
    len: usize,
}

impl<K: Ord, V> Inner<K, V> {
    fn new(max_level: usize) -> Self {
        Self {
            arena: Arena::new(),
            head: vec![None; max_level + 1],
            level: 0,
            max_level,
            len: 0,
        }
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node<K, V> {
        &self.arena[id]
    }

    #[inline]
    pub(crate) fn next(&self, x: Pos, level: usize) -> Link {
        match x {
            Pos::Head => self.head[level],
            Pos::Node(id) => self.arena[id].get_next(level),
        }
    }

    #[inline]
    fn set_next(&mut self, x: Pos, level: usize, link: Link) {
        match x {
            Pos::Head => self.head[level] = link,
            Pos::Node(id) => self.arena[id].set_next(level, link),
        }
    }

    /// Returns the first node whose key is `>= key`.
    ///
    /// When `prev` is given, `prev[i]` is set to the rightmost position whose
    /// key is `< key` at every level `i` in `0..=self.level`.
    pub(crate) fn find_greater_or_equal(&self, key: &K, mut prev: Option<&mut [Pos]>) -> Link {
        let mut x = Pos::Head;
        let mut level = self.level;
        loop {
            let next = self.next(x, level);
            match next {
                Some(id) if self.arena[id].key < *key => x = Pos::Node(id),
                _ => {
                    if let Some(p) = prev.as_deref_mut() {
                        p[level] = x;
                    }
                    if level == 0 {
                        return next;
                    }
                    level -= 1;
                }
            }
        }
    }

    /// Returns the last position whose key is `< key`, the head if none.
    pub(crate) fn find_less_than(&self, key: &K) -> Pos {
        let mut x = Pos::Head;
        let mut level = self.level;
        loop {
            match self.next(x, level) {
                Some(id) if self.arena[id].key < *key => x = Pos::Node(id),
                _ => {
                    if level == 0 {
                        return x;
                    }
                    level -= 1;
                }
            }
        }
    }

    /// Returns the last node, the head if the list is empty.
    pub(crate) fn find_last(&self) -> Pos {
        let mut x = Pos::Head;
        let mut level = self.level;
        loop {
            match self.next(x, level) {
                Some(id) => x = Pos::Node(id),
                None => {
                    if level == 0 {
                        return x;
                    }
                    level -= 1;
                }
            }
        }
    }

    pub(crate) fn find_equal(&self, key: &K) -> Option<NodeId> {
        match self.find_greater_or_equal(key, None) {
            Some(id) if self.arena[id].key == *key => Some(id),
            _ => None,
        }
    }

    /// Splices a new node in. The height is drawn only once the key is known
    /// to be absent; a present key hands the entry back untouched.
    fn insert<F>(&mut self, key: K, value: V, random_level: F) -> Result<usize, (K, V)>
    where
        F: FnOnce() -> usize,
    {
        // Levels above the current level keep the head as predecessor.
        let mut prev = vec![Pos::Head; self.max_level + 1];
        if let Some(id) = self.find_greater_or_equal(&key, Some(prev.as_mut_slice())) {
            if self.arena[id].key == key {
                return Err((key, value));
            }
        }

        let height = random_level().min(self.max_level);
        if height > self.level {
            self.level = height;
        }

        let id = self.arena.alloc(Node::new(key, value, height));
        for (i, p) in prev.iter().copied().enumerate().take(height + 1) {
            let next = self.next(p, i);
            self.arena[id].set_next(i, next);
            self.set_next(p, i, Some(id));
        }
        self.len += 1;
        Ok(height)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        let mut prev = vec![Pos::Head; self.max_level + 1];
        let target = match self.find_greater_or_equal(key, Some(prev.as_mut_slice())) {
            Some(id) if self.arena[id].key == *key => id,
            _ => return None,
        };
        debug_assert!(self.arena[target].level() <= self.level);

        for (i, p) in prev.iter().copied().enumerate().take(self.level + 1) {
            // A tower has no gaps, nothing above can point at the target.
            if self.next(p, i) != Some(target) {
                break;
            }
            let next = self.arena[target].get_next(i);
            self.set_next(p, i, next);
        }
        let node = self.arena.free(target)?;

        while self.level > 0 && self.head[self.level].is_none() {
            self.level -= 1;
        }
        self.len -= 1;
        debug_assert_eq!(self.arena.len(), self.len);
        Some(node.value)
    }

    fn update(&mut self, key: &K, value: V) -> Option<V> {
        let id = self.find_equal(key)?;
        Some(mem::replace(&mut self.arena[id].value, value))
    }

    /// Panics if a lane is out of order, a tower has a gap, or the count drifted.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        assert!(self.level <= self.max_level);
        assert_eq!(self.arena.len(), self.len);
        let mut lanes: Vec<HashSet<NodeId>> = Vec::with_capacity(self.max_level + 1);
        let mut bottom = vec![];
        for level in 0..=self.max_level {
            let mut lane = HashSet::new();
            let mut last: Option<&K> = None;
            let mut x = self.head[level];
            while let Some(id) = x {
                let node = &self.arena[id];
                if let Some(prev) = last {
                    assert!(*prev < node.key, "lane {} out of order", level);
                }
                if level == 0 {
                    bottom.push(id);
                }
                lane.insert(id);
                last = Some(&node.key);
                x = node.get_next(level);
            }
            if level > self.level {
                assert!(lane.is_empty(), "lane {} above current level", level);
            }
            lanes.push(lane);
        }
        assert_eq!(bottom.len(), self.len);
        for id in bottom {
            for lane in lanes.iter().take(self.arena[id].level() + 1) {
                assert!(lane.contains(&id), "tower has a gap");
            }
        }
        if self.level > 0 {
            assert!(self.head[self.level].is_some());
        }
    }
}

/// An ordered index of unique keys backed by a skip list.
///
/// One reader-writer lock owned by the instance guards the structure.
/// `insert`, `update` and `delete` hold it exclusively for their whole
/// search-then-mutate sequence. Lookups, cursors, `dump` and formatting
/// share it. `load` goes through `insert` one record at a time.
/// Diagnostics are logged after the lock is released.
pub struct SkipList<K, V, R = Random> {
    inner: RwLock<Inner<K, V>>,
    rnd: R,
    pub(crate) delimiter: char,
    pub(crate) log: Logger,
}

impl<K: Ord + fmt::Debug, V> SkipList<K, V, Random> {
    pub fn new(options: Options) -> Self {
        Self::with_rng(options, Random::default())
    }
}

impl<K, V, R> SkipList<K, V, R> {
    #[inline]
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Inner<K, V>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    fn write(&self) -> RwLockWriteGuard<'_, Inner<K, V>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of records, O(1).
    pub fn len(&self) -> usize {
        self.read().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Highest level currently occupied by any record.
    pub fn level(&self) -> usize {
        self.read().level
    }

    pub fn max_level(&self) -> usize {
        self.read().max_level
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }
}

impl<K, V, R> SkipList<K, V, R>
where
    K: Ord + fmt::Debug,
    R: RandomGenerator,
{
    pub fn with_rng(options: Options, rnd: R) -> Self {
        let opt = sanitize_options(options);
        let log = opt
            .info_log
            .unwrap_or_else(slog_scope::logger)
            .new(o!("max_level" => opt.max_level));
        Self {
            inner: RwLock::new(Inner::new(opt.max_level)),
            rnd,
            delimiter: opt.delimiter,
            log,
        }
    }

    /// Level in `1..=max_level`, each extra level with probability 1/2.
    fn random_level(&self, max_level: usize) -> usize {
        let mut level = 1;
        while level < max_level && self.rnd.one_in(2) {
            level += 1;
        }
        level
    }

    /// Inserts a new record. An existing key is never overwritten,
    /// the call fails with `DuplicateKey` and the index is unchanged.
    pub fn insert(&self, key: K, value: V) -> DResult<()> {
        let ret = {
            let mut inner = self.write();
            let max_level = inner.max_level;
            inner.insert(key, value, || self.random_level(max_level))
        };
        match ret {
            Ok(height) => {
                debug!(self.log, "inserted"; "level" => height);
                Ok(())
            }
            Err((key, _)) => {
                info!(self.log, "key exists"; "key" => ?key);
                Err(DError::DuplicateKey)
            }
        }
    }

    /// Returns a copy of the value stored under `key`.
    pub fn get(&self, key: &K) -> DResult<V>
    where
        V: Clone,
    {
        let found = {
            let inner = self.read();
            inner.find_equal(key).map(|id| inner.node(id).value.clone())
        };
        found.ok_or_else(|| {
            debug!(self.log, "key not found"; "key" => ?key);
            DError::KeyNotFound
        })
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.read().find_equal(key).is_some()
    }

    /// Replaces the value of an existing record in place, returning the old one.
    pub fn update(&self, key: &K, value: V) -> DResult<V> {
        let old = self.write().update(key, value);
        old.ok_or_else(|| {
            info!(self.log, "key not found"; "key" => ?key);
            DError::KeyNotFound
        })
    }

    /// Unlinks the record from every lane and returns its value.
    pub fn delete(&self, key: &K) -> DResult<V> {
        let removed = self.write().remove(key);
        match removed {
            Some(v) => {
                debug!(self.log, "deleted"; "key" => ?key);
                Ok(v)
            }
            None => {
                info!(self.log, "key not found"; "key" => ?key);
                Err(DError::KeyNotFound)
            }
        }
    }

    /// A cursor over the records in key order. It holds the shared lock,
    /// writers block until it is dropped.
    ///
    /// Calling `insert`, `update` or `delete` on the same thread while the
    /// cursor is alive deadlocks. Drop the cursor first.
    pub fn iter(&self) -> SkipListIter<'_, K, V> {
        SkipListIter::new(self.read())
    }

    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        self.read().check_invariants()
    }
}

impl<K: Ord + fmt::Debug, V> Default for SkipList<K, V, Random> {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

/// One line per active level, bottom up: `Level 0: 1:a;3:b;`.
impl<K, V, R> fmt::Display for SkipList<K, V, R>
where
    K: fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.read();
        writeln!(f, "*****Skip List*****")?;
        for level in 0..=inner.level {
            write!(f, "Level {}: ", level)?;
            let mut x = inner.head[level];
            while let Some(id) = x {
                let node = &inner.arena[id];
                write!(f, "{};", node)?;
                x = node.get_next(level);
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SkipList;
    use crate::utils::random::Random;
    use crate::{DError, Options};

    fn new_list(max_level: usize) -> SkipList<i32, String> {
        SkipList::with_rng(Options::with_max_level(max_level), Random::new(301))
    }

    #[test]
    fn test_basic() {
        let sl = new_list(6);
        assert!(sl.is_empty());
        assert_eq!(sl.level(), 0);
        for (k, v) in [(1, "a"), (3, "b"), (7, "c"), (8, "d"), (9, "e"), (19, "f")] {
            sl.insert(k, v.to_string()).unwrap();
        }
        assert!(matches!(
            sl.insert(19, "g".to_string()),
            Err(DError::DuplicateKey)
        ));
        assert_eq!(sl.get(&19).unwrap(), "f");
        assert_eq!(sl.len(), 6);
        assert!(sl.level() >= 1 && sl.level() <= 6);
        sl.check_invariants();
    }

    #[test]
    fn test_delete() {
        let sl = new_list(6);
        sl.insert(5, "x".to_string()).unwrap();
        assert_eq!(sl.delete(&5).unwrap(), "x");
        assert_eq!(sl.len(), 0);
        assert_eq!(sl.level(), 0);
        assert!(sl.delete(&5).unwrap_err().is_not_found());
        sl.check_invariants();
    }

    #[test]
    fn test_search_missing() {
        let sl = new_list(6);
        for k in [1, 3, 7] {
            sl.insert(k, k.to_string()).unwrap();
        }
        assert!(sl.get(&100).unwrap_err().is_not_found());
        assert!(!sl.contains_key(&100));
        assert!(!sl.contains_key(&2));
        assert!(sl.contains_key(&7));
    }

    #[test]
    fn test_update() {
        let sl = new_list(4);
        sl.insert(1, "a".to_string()).unwrap();
        assert_eq!(sl.update(&1, "b".to_string()).unwrap(), "a");
        assert_eq!(sl.get(&1).unwrap(), "b");
        assert!(sl.update(&2, "c".to_string()).unwrap_err().is_not_found());
        assert_eq!(sl.len(), 1);
    }

    #[test]
    fn test_single_level() {
        let sl = new_list(1);
        for k in (0..100).rev() {
            sl.insert(k, String::new()).unwrap();
        }
        assert_eq!(sl.max_level(), 1);
        assert_eq!(sl.level(), 1);
        sl.check_invariants();
    }

    #[test]
    fn test_display() {
        let sl = new_list(1);
        sl.insert(3, "b".to_string()).unwrap();
        sl.insert(1, "a".to_string()).unwrap();
        assert_eq!(
            sl.to_string(),
            "*****Skip List*****\nLevel 0: 1:a;3:b;\nLevel 1: 1:a;3:b;\n"
        );
    }
}
