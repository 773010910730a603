//! Multiset over the linked red-black tree.

use super::{
    Bag, bag_add_times, bag_build, bag_consistent, bag_count, bag_for_each, bag_remove_times,
};
use crate::compare::{Comparator, Natural};
use crate::error::TreeError;
use crate::linked::{Linked, NodeRef, chain_consistent, merge_in, resolve, seat_all, sever_all, swap_in};
use crate::rbtree::Iter;
use crate::rbtree::node::{ChainAug, ChainCounted};
use crate::rbtree::tree::Tree;
use std::fmt;

/// A multiset over the linked tree: multiplicities as in
/// [`RBTreeBag`](crate::bag::RBTreeBag), plus the in-order chain and
/// payload back-references of [`LinkedRBTree`](crate::LinkedRBTree), so
/// neighbor, parent, and child queries from a payload handle run in
/// &Theta;(1).
///
/// Payloads must be unbound when offered (`add_times` of a bound payload
/// is an [`TreeError::InvalidArgument`]); a duplicate key only bumps the
/// stored node's count and the offered payload is dropped.
///
/// Note that [`swap`](LinkedRBTreeBag::swap) does **not** swap counts:
/// multiplicities belong to the nodes, and the payloads exchange only
/// their identity data.
#[derive(Clone)]
pub struct LinkedRBTreeBag<T: Linked, C = Natural> {
    pub(crate) t: Tree<T, ChainCounted, C>,
    pub(crate) total: usize,
}

impl<T: Ord + Linked> LinkedRBTreeBag<T, Natural> {
    /// Initializes an empty bag ordered by `T`'s own [`Ord`] instance.
    pub fn new() -> Self {
        LinkedRBTreeBag::with_comparator(Natural)
    }
}

impl<T: Linked, C: Comparator<T>> LinkedRBTreeBag<T, C> {
    /// Initializes an empty bag ordered by `cmp`.
    pub fn with_comparator(cmp: C) -> Self {
        LinkedRBTreeBag {
            t: Tree::new(cmp),
            total: 0,
        }
    }

    /// Initializes a bag holding exactly the multiset of `items`.  Fails
    /// with [`TreeError::InvalidArgument`] if any payload is already
    /// bound to a tree.
    ///
    /// When several equal payloads merge into one node, the first one
    /// keeps the node and the rest are dropped.
    pub fn from_items<I: IntoIterator<Item = T>>(cmp: C, items: I) -> Result<Self, TreeError> {
        let mut bag = LinkedRBTreeBag::with_comparator(cmp);
        let items: Vec<T> = items.into_iter().collect();
        if items.iter().any(|x| x.node().is_some()) {
            return Err(TreeError::InvalidArgument(
                "payload is already bound to a tree".to_string(),
            ));
        }
        let pairs = items.into_iter().map(|x| (x, 1)).collect();
        bag_build(&mut bag.t, &mut bag.total, pairs).expect("multiplicities of 1 are valid");
        seat_all(&mut bag.t);
        debug_assert!(bag.t.check());
        debug_assert!(bag_consistent(&bag.t, bag.total));
        debug_assert!(chain_consistent(&bag.t));
        Ok(bag)
    }

    /// Adds every `(item, multiplicity)` pair; an empty bag bulk-builds
    /// in linear time.  Fails without mutating on a zero multiplicity or
    /// a bound payload.
    pub fn add_all_counts<I: IntoIterator<Item = (T, usize)>>(
        &mut self,
        counts: I,
    ) -> Result<bool, TreeError> {
        let counts: Vec<(T, usize)> = counts.into_iter().collect();
        if counts.iter().any(|(_, n)| *n == 0) {
            return Err(TreeError::InvalidArgument(
                "multiplicity must be at least 1".to_string(),
            ));
        }
        if counts.iter().any(|(x, _)| x.node().is_some()) {
            return Err(TreeError::InvalidArgument(
                "payload is already bound to a tree".to_string(),
            ));
        }
        let changed = if self.t.is_empty() {
            let changed = bag_build(&mut self.t, &mut self.total, counts)?;
            seat_all(&mut self.t);
            changed
        } else {
            let mut changed = false;
            for (item, n) in counts {
                let inserted = bag_add_times(&mut self.t, &mut self.total, item, n)?;
                if let Some(id) = inserted {
                    self.t.pool[id].item.set_node(Some(NodeRef(id)));
                }
                changed = true;
            }
            changed
        };
        debug_assert!(self.t.check());
        debug_assert!(bag_consistent(&self.t, self.total));
        debug_assert!(chain_consistent(&self.t));
        Ok(changed)
    }

    /// Removes every `(probe, multiplicity)` pair.  Fails without
    /// mutating when any multiplicity is zero.
    pub fn remove_all_counts<'a, I>(&mut self, counts: I) -> Result<bool, TreeError>
    where
        I: IntoIterator<Item = (&'a T, usize)>,
        T: 'a,
    {
        let counts: Vec<(&T, usize)> = counts.into_iter().collect();
        if counts.iter().any(|(_, n)| *n == 0) {
            return Err(TreeError::InvalidArgument(
                "multiplicity must be at least 1".to_string(),
            ));
        }
        let mut changed = false;
        for (probe, n) in counts {
            changed |= bag_remove_times(&mut self.t, &mut self.total, probe, n)?;
        }
        debug_assert!(self.t.check());
        debug_assert!(bag_consistent(&self.t, self.total));
        debug_assert!(chain_consistent(&self.t));
        Ok(changed)
    }

    /// Successor of `probe` among the distinct elements; &Theta;(1)
    /// through the chain for a bound payload, comparator descent
    /// otherwise.
    pub fn next(&self, probe: &T) -> Option<&T> {
        match resolve(&self.t, probe) {
            Some(id) => self.t.pool[id].aug.next().map(|n| &self.t.pool[n].item),
            None => self.t.higher(probe).map(|id| &self.t.pool[id].item),
        }
    }

    /// Predecessor of `probe` among the distinct elements; mirror of
    /// [`next`](LinkedRBTreeBag::next).
    pub fn prev(&self, probe: &T) -> Option<&T> {
        match resolve(&self.t, probe) {
            Some(id) => self.t.pool[id].aug.prev().map(|p| &self.t.pool[p].item),
            None => self.t.lower(probe).map(|id| &self.t.pool[id].item),
        }
    }

    /// Payload at the parent of `probe`'s node, in &Theta;(1).
    pub fn parent(&self, probe: &T) -> Option<&T> {
        let id = resolve(&self.t, probe)?;
        self.t.pool[id].parent.map(|p| &self.t.pool[p].item)
    }

    /// Payload at the left child of `probe`'s node, in &Theta;(1).
    pub fn left(&self, probe: &T) -> Option<&T> {
        let id = resolve(&self.t, probe)?;
        self.t.pool[id].left.map(|l| &self.t.pool[l].item)
    }

    /// Payload at the right child of `probe`'s node, in &Theta;(1).
    pub fn right(&self, probe: &T) -> Option<&T> {
        let id = resolve(&self.t, probe)?;
        self.t.pool[id].right.map(|r| &self.t.pool[r].item)
    }

    /// Exchanges the payload data of two bound elements; see
    /// [`LinkedRBTree::swap`](crate::LinkedRBTree::swap).  Counts stay
    /// with their nodes.
    pub fn swap<F>(&mut self, a: &T, b: &T, swap_fn: F) -> Result<(), TreeError>
    where
        F: FnOnce(&mut T, &mut T),
    {
        swap_in(&mut self.t, a, b, swap_fn)
    }

    /// Merges `item` into the stored equal element (keeping its count) or
    /// inserts it with a count of 1; see
    /// [`LinkedRBTree::merge`](crate::LinkedRBTree::merge).
    pub fn merge<F>(&mut self, item: T, merge_fn: F) -> Result<bool, TreeError>
    where
        F: FnOnce(&mut T, T),
    {
        let (merged, inserted) = merge_in(&mut self.t, item, merge_fn)?;
        if inserted.is_some() {
            self.total += 1;
        }
        debug_assert!(bag_consistent(&self.t, self.total));
        Ok(merged)
    }
}

impl<T: Linked, C> LinkedRBTreeBag<T, C> {
    /// Smallest distinct element, or `None` when empty.  &Theta;(1).
    pub fn min(&self) -> Option<&T> {
        self.t.min.map(|id| &self.t.pool[id].item)
    }

    /// Largest distinct element, or `None` when empty.  &Theta;(1).
    pub fn max(&self) -> Option<&T> {
        self.t.max.map(|id| &self.t.pool[id].item)
    }

    /// Returns an eager iterator over the distinct elements in ascending
    /// order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.t.items_in_order())
    }

    /// Returns the distinct elements with their multiplicities, ascending.
    pub fn counts(&self) -> impl Iterator<Item = (&T, usize)> {
        let mut out = Vec::with_capacity(self.t.len);
        let mut cur = self.t.min;
        while let Some(id) = cur {
            out.push((&self.t.pool[id].item, self.t.pool[id].aug.count));
            cur = self.t.successor(id);
        }
        out.into_iter()
    }

    /// Removes all elements, severing every back-reference before the
    /// nodes are released.
    pub fn clear(&mut self) {
        sever_all(&mut self.t);
        self.t.clear();
        self.total = 0;
    }
}

impl<T: Linked, C: Comparator<T>> Bag<T> for LinkedRBTreeBag<T, C> {
    fn add_times(&mut self, item: T, n: usize) -> Result<bool, TreeError> {
        if item.node().is_some() {
            return Err(TreeError::InvalidArgument(
                "payload is already bound to a tree".to_string(),
            ));
        }
        let inserted = bag_add_times(&mut self.t, &mut self.total, item, n)?;
        if let Some(id) = inserted {
            self.t.pool[id].item.set_node(Some(NodeRef(id)));
        }
        debug_assert!(self.t.check());
        debug_assert!(bag_consistent(&self.t, self.total));
        debug_assert!(chain_consistent(&self.t));
        Ok(true)
    }

    fn remove_times(&mut self, probe: &T, n: usize) -> Result<bool, TreeError> {
        let changed = bag_remove_times(&mut self.t, &mut self.total, probe, n)?;
        debug_assert!(self.t.check());
        debug_assert!(bag_consistent(&self.t, self.total));
        debug_assert!(chain_consistent(&self.t));
        Ok(changed)
    }

    fn count(&self, probe: &T) -> usize {
        bag_count(&self.t, probe)
    }

    fn len(&self) -> usize {
        self.t.len
    }

    fn bag_size(&self) -> usize {
        self.total
    }

    fn for_each_count<F: FnMut(&T, usize)>(&self, f: F) {
        bag_for_each(&self.t, f)
    }

    /// Adds a single occurrence of `item`.
    ///
    /// # Panics
    ///
    /// Panics if `item` is already bound to a tree; use
    /// [`add_times`](Bag::add_times) to handle that case as an error.
    fn add(&mut self, item: T) -> bool {
        self.add_times(item, 1)
            .expect("payload must not be bound to a tree")
    }

    /// Adds every element of `other` with its multiplicity.  The incoming
    /// payloads are clones; their back-references are severed before
    /// insertion, and an empty bag bulk-builds instead of inserting one by
    /// one.
    fn add_all<B: Bag<T>>(&mut self, other: &B) -> bool
    where
        T: Clone,
    {
        let mut pairs = Vec::with_capacity(other.len());
        other.for_each_count(|item, n| {
            let mut item = item.clone();
            item.set_node(None);
            pairs.push((item, n));
        });
        if pairs.is_empty() {
            return false;
        }
        if self.t.is_empty() {
            let changed = bag_build(&mut self.t, &mut self.total, pairs)
                .expect("counts in a bag are positive");
            seat_all(&mut self.t);
            debug_assert!(self.t.check());
            debug_assert!(bag_consistent(&self.t, self.total));
            debug_assert!(chain_consistent(&self.t));
            changed
        } else {
            for (item, n) in pairs {
                self.add_times(item, n)
                    .expect("counts in a bag are positive and the clones are unbound");
            }
            true
        }
    }
}

impl<T: Ord + Linked> Default for LinkedRBTreeBag<T, Natural> {
    fn default() -> Self {
        LinkedRBTreeBag::new()
    }
}

impl<T: Linked + fmt::Debug, C> fmt::Debug for LinkedRBTreeBag<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.counts()).finish()
    }
}
