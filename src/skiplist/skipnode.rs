use std::fmt::{self, Formatter};
use std::ops::{Index, IndexMut};

/// Stable handle of a node inside the [`Arena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A forward link. `None` is the end of the lane.
pub type Link = Option<NodeId>;

/// A position a search can stop at: the sentinel head or a real node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pos {
    Head,
    Node(NodeId),
}

pub struct Node<K, V> {
    pub key: K,
    pub value: V,
    // forward[i] is the next node at level i.
    forward: Vec<Link>,
}

impl<K, V> Node<K, V> {
    /// A node of `level` participates in lanes `0..=level`.
    pub fn new(key: K, value: V, level: usize) -> Self {
        Self {
            key,
            value,
            forward: vec![None; level + 1],
        }
    }

    #[inline]
    pub fn level(&self) -> usize {
        self.forward.len() - 1
    }

    #[inline]
    pub fn set_next(&mut self, n: usize, node: Link) {
        self.forward[n] = node;
    }

    #[inline]
    pub fn get_next(&self, n: usize) -> Link {
        self.forward[n]
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for Node<K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.key, self.value)
    }
}

/// Slot storage for nodes. Handles stay valid until the node is freed,
/// freed slots are reused by later allocations.
pub struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<usize>,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub fn alloc(&mut self, value: T) -> NodeId {
        match self.free.pop() {
            Some(i) => {
                self.slots[i] = Some(value);
                NodeId(i)
            }
            None => {
                self.slots.push(Some(value));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    pub fn free(&mut self, id: NodeId) -> Option<T> {
        let v = self.slots.get_mut(id.0)?.take();
        if v.is_some() {
            self.free.push(id.0);
        }
        v
    }

    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.slots.get(id.0)?.as_ref()
    }

    /// Number of live slots.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}

impl<T> Index<NodeId> for Arena<T> {
    type Output = T;

    fn index(&self, id: NodeId) -> &T {
        self.get(id).expect("link to a freed node")
    }
}

impl<T> IndexMut<NodeId> for Arena<T> {
    fn index_mut(&mut self, id: NodeId) -> &mut T {
        self.slots[id.0].as_mut().expect("link to a freed node")
    }
}

#[cfg(test)]
mod tests {
    use super::{Arena, Node};

    #[test]
    fn test_new_node() {
        let node = Node::new(19, "f", 3);
        assert_eq!(node.level(), 3);
        assert_eq!(format!("{}", node), "19:f");
        for i in 0..=3 {
            assert!(node.get_next(i).is_none());
        }
    }

    #[test]
    fn test_next() {
        let mut arena = Arena::new();
        let a = arena.alloc(Node::new(1, "a", 3));
        let b = arena.alloc(Node::new(2, "b", 4));
        let c = arena.alloc(Node::new(3, "c", 1));
        arena[a].set_next(2, Some(b));
        assert!(arena[a].get_next(1).is_none());
        let ret = arena[a].get_next(2).unwrap();
        assert_eq!(arena[ret].key, 2);

        arena[b].set_next(3, Some(c));
        let v = arena[b].get_next(3).unwrap();
        assert_eq!(arena[v].value, "c");
    }

    #[test]
    fn test_slot_reuse() {
        let mut arena = Arena::new();
        let a = arena.alloc(1);
        let b = arena.alloc(2);
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.free(a), Some(1));
        assert_eq!(arena.free(a), None);
        assert!(arena.get(a).is_none());
        assert_eq!(arena.len(), 1);
        let c = arena.alloc(3);
        assert_eq!(c, a);
        assert_eq!(arena[b], 2);
        assert_eq!(arena[c], 3);
    }
}
