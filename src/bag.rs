//! Multisets ("bags") over the red-black tree.
//!
//! A bag stores each distinct key once and attaches a multiplicity to it.
//! The [`Bag`] trait is the behavioral contract; [`RBTreeBag`] and
//! [`LinkedRBTreeBag`] implement it over the counted tree, where every
//! node carries its `count` and the sum of counts across its subtree, so
//! the total bag size is read off the root in constant time.

mod linkedtreebag;
mod treebag;

#[cfg(test)]
mod tests;

pub use linkedtreebag::LinkedRBTreeBag;
pub use treebag::RBTreeBag;

use crate::compare::Comparator;
use crate::error::TreeError;
use crate::rbtree::node::{CountAug, NodeId};
use crate::rbtree::tree::Tree;
use std::cmp::Ordering;

/// A multiset of payloads: a set-like collection where every element has
/// an integer multiplicity of at least 1.
///
/// `len` counts distinct elements; [`bag_size`](Bag::bag_size) counts
/// total multiplicity.  The single-element operations are required; the
/// bulk operations against another bag are provided on top of them, per
/// the contract: `add_all` adds every element with its count, `remove_all`
/// removes every element with its count, and `retain_all` trims each
/// element of `self` down to the other bag's count (removing it entirely
/// when absent there).
pub trait Bag<T> {
    /// Adds `n` occurrences of `item`.
    ///
    /// Fails with [`TreeError::InvalidArgument`] when `n` is zero;
    /// otherwise the bag always changes and `Ok(true)` is returned.
    fn add_times(&mut self, item: T, n: usize) -> Result<bool, TreeError>;

    /// Removes up to `n` occurrences of the element comparing equal to
    /// `probe`; the element disappears when `n` reaches its multiplicity.
    ///
    /// Fails with [`TreeError::InvalidArgument`] when `n` is zero.
    /// `Ok(false)` when no such element is present.
    fn remove_times(&mut self, probe: &T, n: usize) -> Result<bool, TreeError>;

    /// Multiplicity of the element comparing equal to `probe`; 0 when
    /// absent.
    fn count(&self, probe: &T) -> usize;

    /// Number of distinct elements.
    fn len(&self) -> usize;

    /// Total multiplicity across all elements.
    fn bag_size(&self) -> usize;

    /// Calls `f` once per distinct element in ascending order, with its
    /// multiplicity.
    fn for_each_count<F: FnMut(&T, usize)>(&self, f: F);

    /// Adds a single occurrence of `item`.
    fn add(&mut self, item: T) -> bool {
        self.add_times(item, 1)
            .expect("a multiplicity of 1 is always valid")
    }

    /// Removes **all** occurrences of the element comparing equal to
    /// `probe` (the Set-form removal); returns whether the bag changed.
    fn remove(&mut self, probe: &T) -> bool {
        self.remove_times(probe, usize::MAX)
            .expect("a positive multiplicity is always valid")
    }

    /// Is at least one occurrence of `probe` present?
    fn contains(&self, probe: &T) -> bool {
        self.count(probe) > 0
    }

    /// Are there no elements at all?
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Adds every element of `other` with its multiplicity; returns
    /// whether this bag changed.
    fn add_all<B: Bag<T>>(&mut self, other: &B) -> bool
    where
        T: Clone,
        Self: Sized,
    {
        let mut changed = false;
        other.for_each_count(|item, n| {
            changed |= self
                .add_times(item.clone(), n)
                .expect("counts in a bag are positive");
        });
        changed
    }

    /// Removes every element of `other` with its multiplicity; returns
    /// whether this bag changed.
    fn remove_all<B: Bag<T>>(&mut self, other: &B) -> bool
    where
        Self: Sized,
    {
        let mut changed = false;
        other.for_each_count(|item, n| {
            changed |= self
                .remove_times(item, n)
                .expect("counts in a bag are positive");
        });
        changed
    }

    /// For each element of this bag with multiplicity `a` and multiplicity
    /// `b` in `other`: removes all of it when `b == 0`, removes `a - b`
    /// occurrences when `a > b`, and leaves it unchanged otherwise.
    /// Returns whether this bag changed.
    fn retain_all<B: Bag<T>>(&mut self, other: &B) -> bool
    where
        T: Clone,
        Self: Sized,
    {
        let mut excess: Vec<(T, usize)> = Vec::new();
        self.for_each_count(|item, have| {
            let keep = other.count(item);
            if have > keep {
                excess.push((item.clone(), have - keep));
            }
        });
        let changed = !excess.is_empty();
        for (item, surplus) in excess {
            self.remove_times(&item, surplus)
                .expect("the surplus is positive");
        }
        changed
    }
}

// ----------------------------------------------------------------------
// Shared engine of the two tree-backed bags, generic over the counted
// augmentation.
// ----------------------------------------------------------------------

/// Adds `n` occurrences, bumping an existing node's count or inserting a
/// fresh node.  Returns the freshly inserted node id, if any, so the
/// linked bag can seat the payload's back-reference.
pub(crate) fn bag_add_times<T, X, C>(
    t: &mut Tree<T, X, C>,
    total: &mut usize,
    item: T,
    n: usize,
) -> Result<Option<NodeId>, TreeError>
where
    X: CountAug,
    C: Comparator<T>,
{
    if n == 0 {
        return Err(TreeError::InvalidArgument(
            "multiplicity must be at least 1".to_string(),
        ));
    }
    match t.find(&item) {
        Some(id) => {
            let count = t.pool[id].aug.count();
            t.pool[id].aug.set_count(count + n);
            t.refresh_to_root(Some(id));
            *total += n;
            Ok(None)
        }
        None => {
            let id = t.insert(item).expect("absence was just checked");
            if n > 1 {
                t.pool[id].aug.set_count(n);
                t.refresh_to_root(Some(id));
            }
            *total += n;
            Ok(Some(id))
        }
    }
}

/// Removes up to `n` occurrences.  A count falling to zero removes the
/// node through the full delete-and-rebalance path.
pub(crate) fn bag_remove_times<T, X, C>(
    t: &mut Tree<T, X, C>,
    total: &mut usize,
    probe: &T,
    n: usize,
) -> Result<bool, TreeError>
where
    X: CountAug,
    C: Comparator<T>,
{
    if n == 0 {
        return Err(TreeError::InvalidArgument(
            "multiplicity must be at least 1".to_string(),
        ));
    }
    let Some(id) = t.find(probe) else {
        return Ok(false);
    };
    let count = t.pool[id].aug.count();
    if n >= count {
        t.remove_node(id);
        *total -= count;
    } else {
        t.pool[id].aug.set_count(count - n);
        t.refresh_to_root(Some(id));
        *total -= n;
    }
    Ok(true)
}

pub(crate) fn bag_count<T, X, C>(t: &Tree<T, X, C>, probe: &T) -> usize
where
    X: CountAug,
    C: Comparator<T>,
{
    t.find(probe).map_or(0, |id| t.pool[id].aug.count())
}

pub(crate) fn bag_for_each<T, X, C, F>(t: &Tree<T, X, C>, mut f: F)
where
    X: CountAug,
    F: FnMut(&T, usize),
{
    let mut cur = t.min;
    while let Some(id) = cur {
        f(&t.pool[id].item, t.pool[id].aug.count());
        cur = t.successor(id);
    }
}

/// Bulk-builds an empty counted tree from `(item, multiplicity)` pairs:
/// validates the multiplicities, sorts, merges equal keys by summing their
/// counts, and builds balanced in linear time.
pub(crate) fn bag_build<T, X, C>(
    t: &mut Tree<T, X, C>,
    total: &mut usize,
    mut items: Vec<(T, usize)>,
) -> Result<bool, TreeError>
where
    X: CountAug,
    C: Comparator<T>,
{
    debug_assert!(t.is_empty(), "bag bulk build requires an empty tree");
    if items.iter().any(|(_, n)| *n == 0) {
        return Err(TreeError::InvalidArgument(
            "multiplicity must be at least 1".to_string(),
        ));
    }
    if items.is_empty() {
        return Ok(false);
    }
    items.sort_by(|a, b| t.cmp.cmp(&a.0, &b.0));
    let mut merged: Vec<(T, usize)> = Vec::with_capacity(items.len());
    for (item, n) in items {
        let same_key = matches!(
            merged.last(),
            Some((last, _)) if t.cmp.cmp(last, &item) == Ordering::Equal
        );
        if same_key {
            merged.last_mut().expect("nonempty").1 += n;
        } else {
            merged.push((item, n));
        }
    }
    let sum: usize = merged.iter().map(|(_, n)| n).sum();
    let nodes = merged
        .into_iter()
        .map(|(item, n)| {
            let mut aug = X::default();
            aug.set_count(n);
            (item, aug)
        })
        .collect();
    t.build_sorted(nodes);
    *total += sum;
    Ok(true)
}

/// Debug validator: counts are positive, every node's `bag` equals its
/// count plus its children's bags, and the root's bag equals the cached
/// total.
pub(crate) fn bag_consistent<T, X, C>(t: &Tree<T, X, C>, total: usize) -> bool
where
    X: CountAug,
{
    fn node_ok<T, X: CountAug, C>(t: &Tree<T, X, C>, x: Option<NodeId>) -> bool {
        let Some(id) = x else { return true };
        let node = &t.pool[id];
        let left = node.left.map_or(0, |l| t.pool[l].aug.bag());
        let right = node.right.map_or(0, |r| t.pool[r].aug.bag());
        node.aug.count() >= 1
            && node.aug.bag() == node.aug.count() + left + right
            && node_ok(t, node.left)
            && node_ok(t, node.right)
    }
    t.root.map_or(0, |r| t.pool[r].aug.bag()) == total && node_ok(t, t.root)
}
