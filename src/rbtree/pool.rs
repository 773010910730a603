//! Slab storage for tree nodes.
//!
//! A tree owns exactly one pool.  Slots are either occupied by a node or
//! chained into a free list; removed slots are recycled before the backing
//! vector grows.  Ids handed out by [`NodePool::alloc`] stay valid until
//! the same id is passed to [`NodePool::release`], which is what makes the
//! parent/child/prev/next links and the linked payload back-references
//! cheap to maintain: they are plain indices, not owning pointers.

use super::node::{Node, NodeId};
use std::ops::{Index, IndexMut};

#[derive(Clone, Debug)]
enum Slot<T, X> {
    Free(Option<NodeId>),
    Used(Node<T, X>),
}

/// Arena of tree nodes with a free list of recycled slots.
#[derive(Clone, Debug)]
pub(crate) struct NodePool<T, X> {
    slots: Vec<Slot<T, X>>,
    free: Option<NodeId>,
}

impl<T, X> NodePool<T, X> {
    pub(crate) fn new() -> Self {
        NodePool {
            slots: Vec::new(),
            free: None,
        }
    }

    /// Stores `node` in a recycled slot if one is available, otherwise in a
    /// fresh slot at the end.
    pub(crate) fn alloc(&mut self, node: Node<T, X>) -> NodeId {
        if let Some(id) = self.free {
            let next = match &self.slots[id.index()] {
                Slot::Free(next) => *next,
                Slot::Used(_) => unreachable!("free list entry is occupied"),
            };
            self.free = next;
            self.slots[id.index()] = Slot::Used(node);
            id
        } else {
            let id = NodeId::from_index(self.slots.len());
            self.slots.push(Slot::Used(node));
            id
        }
    }

    /// Removes the node at `id` and returns it; the slot joins the free
    /// list.  The id must not be used again until `alloc` re-issues it.
    pub(crate) fn release(&mut self, id: NodeId) -> Node<T, X> {
        let slot = std::mem::replace(&mut self.slots[id.index()], Slot::Free(self.free));
        self.free = Some(id);
        match slot {
            Slot::Used(node) => node,
            Slot::Free(_) => unreachable!("released a free slot"),
        }
    }

    /// Non-panicking lookup; `None` for out-of-bounds or freed slots.
    pub(crate) fn get(&self, id: NodeId) -> Option<&Node<T, X>> {
        match self.slots.get(id.index()) {
            Some(Slot::Used(node)) => Some(node),
            _ => None,
        }
    }

    /// Disjoint mutable access to two distinct nodes.
    pub(crate) fn pair_mut(&mut self, a: NodeId, b: NodeId) -> (&mut Node<T, X>, &mut Node<T, X>) {
        assert_ne!(a, b, "pair_mut requires distinct nodes");
        let (ai, bi) = (a.index(), b.index());
        if ai < bi {
            let (lo, hi) = self.slots.split_at_mut(bi);
            (used_mut(&mut lo[ai]), used_mut(&mut hi[0]))
        } else {
            let (lo, hi) = self.slots.split_at_mut(ai);
            let (na, nb) = (used_mut(&mut hi[0]), used_mut(&mut lo[bi]));
            (na, nb)
        }
    }

    /// Iterates over every live node in slot order (not sorted order).
    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node<T, X>> {
        self.slots.iter_mut().filter_map(|slot| match slot {
            Slot::Used(node) => Some(node),
            Slot::Free(_) => None,
        })
    }

    /// Drops every node and resets the free list.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free = None;
    }
}

fn used_mut<T, X>(slot: &mut Slot<T, X>) -> &mut Node<T, X> {
    match slot {
        Slot::Used(node) => node,
        Slot::Free(_) => panic!("stale node reference"),
    }
}

impl<T, X> Index<NodeId> for NodePool<T, X> {
    type Output = Node<T, X>;

    fn index(&self, id: NodeId) -> &Node<T, X> {
        match &self.slots[id.index()] {
            Slot::Used(node) => node,
            Slot::Free(_) => panic!("stale node reference"),
        }
    }
}

impl<T, X> IndexMut<NodeId> for NodePool<T, X> {
    fn index_mut(&mut self, id: NodeId) -> &mut Node<T, X> {
        used_mut(&mut self.slots[id.index()])
    }
}
