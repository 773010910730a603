//! Multiset over the order-statistic red-black tree.

use super::{
    Bag, bag_add_times, bag_build, bag_consistent, bag_count, bag_for_each, bag_remove_times,
};
use crate::compare::{Comparator, Natural};
use crate::error::TreeError;
use crate::rbtree::Iter;
use crate::rbtree::node::Counted;
use crate::rbtree::tree::Tree;
use std::fmt;

/// A multiset backed by a red-black tree with one node per distinct key.
///
/// Duplicates raise a node's multiplicity instead of adding nodes, and
/// every node also carries the sum of multiplicities across its subtree,
/// so [`bag_size`](Bag::bag_size) is the root's sum and stays &Theta;(1).
/// `add_times`, `remove_times`, `count`, and `contains` take
/// &Theta;(log <em>n</em>) time in the number of distinct elements.
///
/// ```
/// use rbtree_rs::{Bag, RBTreeBag};
///
/// let mut bag = RBTreeBag::new();
/// bag.add_times('a', 3).unwrap();
/// bag.add('b');
/// bag.add_times('a', 2).unwrap();
/// assert_eq!(bag.count(&'a'), 5);
/// assert_eq!(bag.len(), 2);
/// assert_eq!(bag.bag_size(), 6);
/// ```
#[derive(Clone)]
pub struct RBTreeBag<T, C = Natural> {
    pub(crate) t: Tree<T, Counted, C>,
    pub(crate) total: usize,
}

impl<T: Ord> RBTreeBag<T, Natural> {
    /// Initializes an empty bag ordered by `T`'s own [`Ord`] instance.
    pub fn new() -> Self {
        RBTreeBag::with_comparator(Natural)
    }
}

impl<T, C: Comparator<T>> RBTreeBag<T, C> {
    /// Initializes an empty bag ordered by `cmp`.
    pub fn with_comparator(cmp: C) -> Self {
        RBTreeBag {
            t: Tree::new(cmp),
            total: 0,
        }
    }

    /// Initializes a bag holding exactly the multiset of `items`: equal
    /// elements merge into one node with a higher multiplicity.  Built
    /// balanced in &Theta;(<em>n</em> log <em>n</em>).
    pub fn from_items<I: IntoIterator<Item = T>>(cmp: C, items: I) -> Self {
        let mut bag = RBTreeBag::with_comparator(cmp);
        let pairs = items.into_iter().map(|x| (x, 1)).collect();
        bag_build(&mut bag.t, &mut bag.total, pairs).expect("multiplicities of 1 are valid");
        debug_assert!(bag.t.check());
        debug_assert!(bag_consistent(&bag.t, bag.total));
        bag
    }

    /// Adds every `(item, multiplicity)` pair; an empty bag bulk-builds in
    /// linear time after sorting.  Fails without mutating when any
    /// multiplicity is zero.
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
        let changed = if self.t.is_empty() {
            bag_build(&mut self.t, &mut self.total, counts)?
        } else {
            let mut changed = false;
            for (item, n) in counts {
                bag_add_times(&mut self.t, &mut self.total, item, n)?;
                changed = true;
            }
            changed
        };
        debug_assert!(self.t.check());
        debug_assert!(bag_consistent(&self.t, self.total));
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
        Ok(changed)
    }
}

impl<T, C> RBTreeBag<T, C> {
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

    /// Removes all elements and releases the nodes.
    pub fn clear(&mut self) {
        self.t.clear();
        self.total = 0;
    }
}

impl<T, C: Comparator<T>> Bag<T> for RBTreeBag<T, C> {
    fn add_times(&mut self, item: T, n: usize) -> Result<bool, TreeError> {
        bag_add_times(&mut self.t, &mut self.total, item, n)?;
        debug_assert!(self.t.check());
        debug_assert!(bag_consistent(&self.t, self.total));
        Ok(true)
    }

    fn remove_times(&mut self, probe: &T, n: usize) -> Result<bool, TreeError> {
        let changed = bag_remove_times(&mut self.t, &mut self.total, probe, n)?;
        debug_assert!(self.t.check());
        debug_assert!(bag_consistent(&self.t, self.total));
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

    /// Adds every element of `other` with its multiplicity.  An empty bag
    /// collects the pairs and bulk-builds instead of inserting one by one.
    fn add_all<B: Bag<T>>(&mut self, other: &B) -> bool
    where
        T: Clone,
    {
        if self.t.is_empty() {
            let mut pairs = Vec::with_capacity(other.len());
            other.for_each_count(|item, n| pairs.push((item.clone(), n)));
            let changed = bag_build(&mut self.t, &mut self.total, pairs)
                .expect("counts in a bag are positive");
            debug_assert!(self.t.check());
            debug_assert!(bag_consistent(&self.t, self.total));
            changed
        } else {
            let mut changed = false;
            other.for_each_count(|item, n| {
                changed |= self
                    .add_times(item.clone(), n)
                    .expect("counts in a bag are positive");
            });
            changed
        }
    }
}

impl<T: Ord> Default for RBTreeBag<T, Natural> {
    fn default() -> Self {
        RBTreeBag::new()
    }
}

impl<T: Ord> FromIterator<T> for RBTreeBag<T, Natural> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        RBTreeBag::from_items(Natural, iter)
    }
}

impl<T: fmt::Debug, C> fmt::Debug for RBTreeBag<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.counts()).finish()
    }
}
