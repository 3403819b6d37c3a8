use crate::skiplist::skiplist::Inner;
use crate::skiplist::skipnode::{Link, NodeId, Pos};
use std::sync::RwLockReadGuard;

/// Cursor over the records of a [`SkipList`](crate::SkipList) in key order.
///
/// The cursor starts out invalid, position it with one of the `seek` calls.
/// It keeps the index read-locked for its whole lifetime, so the owning
/// thread must drop it before writing to the same index or it deadlocks.
pub struct SkipListIter<'a, K, V> {
    list: RwLockReadGuard<'a, Inner<K, V>>,
    node: Link,
}

impl<'a, K: Ord, V> SkipListIter<'a, K, V> {
    pub(crate) fn new(list: RwLockReadGuard<'a, Inner<K, V>>) -> Self {
        Self { list, node: None }
    }

    pub fn valid(&self) -> bool {
        self.node.is_some()
    }

    pub fn seek_to_first(&mut self) {
        self.node = self.list.next(Pos::Head, 0);
    }

    pub fn seek_to_last(&mut self) {
        self.node = link_of(self.list.find_last());
    }

    /// Positions at the first record whose key is `>= target`.
    pub fn seek(&mut self, target: &K) {
        self.node = self.list.find_greater_or_equal(target, None);
    }

    pub fn next(&mut self) {
        let id = self.current();
        self.node = self.list.node(id).get_next(0);
    }

    pub fn prev(&mut self) {
        let id = self.current();
        let key = &self.list.node(id).key;
        self.node = link_of(self.list.find_less_than(key));
    }

    pub fn key(&self) -> &K {
        &self.list.node(self.current()).key
    }

    pub fn value(&self) -> &V {
        &self.list.node(self.current()).value
    }

    fn current(&self) -> NodeId {
        self.node.expect("iterator is not positioned at a record")
    }
}

fn link_of(pos: Pos) -> Link {
    match pos {
        Pos::Head => None,
        Pos::Node(id) => Some(id),
    }
}

#[cfg(test)]
mod tests {
    use crate::skiplist::SkipList;
    use crate::utils::random::{Random, RandomGenerator};
    use crate::Options;

    #[test]
    fn test_basic() {
        let sl = SkipList::with_rng(Options::default(), Random::new(0xdead_beef));
        for i in 0..100u8 {
            sl.insert(i, i as u32 * 10).unwrap();
        }

        let mut iter = sl.iter();
        assert!(!iter.valid());
        iter.seek_to_first();
        assert!(iter.valid());
        assert_eq!(*iter.key(), 0);
        iter.seek_to_last();
        assert_eq!(*iter.key(), 99);
        assert_eq!(*iter.value(), 990);

        iter.seek(&88);
        assert_eq!(*iter.key(), 88);

        iter.next();
        assert_eq!(*iter.key(), 89);

        iter.seek(&99);
        assert_eq!(*iter.key(), 99);
        iter.prev();
        assert_eq!(*iter.key(), 98);

        iter.seek_to_first();
        iter.prev();
        assert!(!iter.valid());
        iter.seek_to_last();
        iter.next();
        assert!(!iter.valid());
    }

    #[test]
    fn test_seek_between_keys() {
        let sl: SkipList<u32, ()> = SkipList::default();
        for i in (0..50).map(|i| i * 2) {
            sl.insert(i, ()).unwrap();
        }
        let mut iter = sl.iter();
        iter.seek(&31);
        assert_eq!(*iter.key(), 32);
        iter.seek(&1000);
        assert!(!iter.valid());
    }

    #[test]
    fn test_empty() {
        let sl: SkipList<u32, u32> = SkipList::default();
        let mut iter = sl.iter();
        iter.seek_to_first();
        assert!(!iter.valid());
        iter.seek_to_last();
        assert!(!iter.valid());
    }

    #[test]
    fn test_random() {
        let rnd = Random::new(3);

        for _ in 0..20 {
            let sl = SkipList::with_rng(Options::default(), Random::new(rnd.next()));
            let mut s = vec![];
            for _ in 0..1000 {
                let k = rnd.uniform(5000);
                if sl.insert(k, ()).is_ok() {
                    s.push(k);
                }
            }
            s.sort_unstable();

            let mut iter = sl.iter();
            iter.seek_to_first();
            for k in &s {
                assert!(iter.valid());
                assert_eq!(iter.key(), k);
                iter.next();
            }
            assert!(!iter.valid());
        }
    }
}
