//! An order-statistic red-black tree.

pub(crate) mod node;
pub(crate) mod pool;
pub(crate) mod tree;

#[cfg(test)]
mod tests;

use crate::compare::{Comparator, Natural};
use crate::error::TreeError;
use std::cmp::Ordering;
use std::fmt;
use tree::{CursorCore, Tree};

/// A single step decision returned by a [`RBTree::search`] oracle.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SearchStep {
    /// Continue the descent into the left subtree.
    GoLeft,
    /// Continue the descent into the right subtree.
    GoRight,
    /// Terminate and return the current payload.
    Current,
    /// Terminate and return the left child's payload (absent if none).
    Left,
    /// Terminate and return the right child's payload (absent if none).
    Right,
    /// Abandon the search.
    Stop,
}

/// An ordered set of payloads, implemented with a red-black tree whose
/// nodes carry their subtree size.
///
/// It supports the usual `add`, `remove`, `contains`, `len`, and
/// `is_empty` methods, ordered methods for the `min`, `max`, strict
/// neighbors (`next`/`prev`), and rank/select (`rank`, `get`), bulk
/// operations with algorithm selection (`add_all`, `remove_all`,
/// `retain_all`), a queue facade over the minimum (`offer`, `poll`,
/// `peek`, `element`, `remove_first`), bidirectional cursors, and a
/// user-directed [`search`](RBTree::search).
///
/// Ordering and equality of payloads are defined entirely by the
/// [`Comparator`] supplied at construction; two payloads comparing equal
/// are one element as far as the tree is concerned, which is how "map"
/// behavior is obtained (compare on a key field, carry satellite data).
/// There is at most one element per distinct key; see
/// [`RBTreeBag`](crate::bag::RBTreeBag) for multiplicities.
///
/// `add`, `remove`, `take`, `contains`, `binary_search`, `get`, `rank`,
/// `next`, and `prev` take &Theta;(log <em>n</em>) time.  `len`,
/// `is_empty`, `min`, `max`, `root`, and `peek` take &Theta;(1) time.
/// Construction from <em>n</em> items takes &Theta;(<em>n</em> log
/// <em>n</em>) time in general and &Theta;(<em>n</em>) when the input is
/// already sorted.
#[derive(Clone)]
pub struct RBTree<T, C = Natural> {
    t: Tree<T, (), C>,
}

impl<T: Ord> RBTree<T, Natural> {
    /// Initializes an empty tree ordered by `T`'s own [`Ord`] instance.
    pub fn new() -> Self {
        RBTree::with_comparator(Natural)
    }
}

impl<T, C: Comparator<T>> RBTree<T, C> {
    /// Initializes an empty tree ordered by `cmp`.
    pub fn with_comparator(cmp: C) -> Self {
        RBTree { t: Tree::new(cmp) }
    }

    /// Initializes a tree holding the distinct elements of `items`.
    ///
    /// The input need not be sorted; it is sorted and deduplicated under
    /// `cmp`, then built balanced in linear time.
    pub fn from_items<I: IntoIterator<Item = T>>(cmp: C, items: I) -> Self {
        let mut t = RBTree::with_comparator(cmp);
        t.add_all(items);
        t
    }

    /// Does this tree contain an element comparing equal to `probe`?
    pub fn contains(&self, probe: &T) -> bool {
        self.t.find(probe).is_some()
    }

    /// Does this tree contain every element of `probes`?
    pub fn contains_all(&self, probes: &[T]) -> bool {
        probes.iter().all(|x| self.contains(x))
    }

    /// Returns the stored element comparing equal to `probe`.
    ///
    /// Useful when payloads carry satellite data beyond the comparison
    /// key: the returned reference is to the tree's element, not to the
    /// probe.
    pub fn binary_search(&self, probe: &T) -> Option<&T> {
        self.t.find(probe).map(|id| &self.t.pool[id].item)
    }

    /// Adds `item` unless an element comparing equal is already present.
    ///
    /// Returns whether the tree changed; a rejected duplicate is dropped.
    pub fn add(&mut self, item: T) -> bool {
        let added = self.t.insert(item).is_ok();
        debug_assert!(self.t.check());
        added
    }

    /// Removes the element comparing equal to `probe`, if any, and
    /// returns whether the tree changed.
    pub fn remove(&mut self, probe: &T) -> bool {
        self.take(probe).is_some()
    }

    /// Removes and returns the element comparing equal to `probe`.
    pub fn take(&mut self, probe: &T) -> Option<T> {
        let id = self.t.find(probe)?;
        let item = self.t.remove_node(id);
        debug_assert!(self.t.check());
        Some(item)
    }

    /// Adds every element of `items`; returns whether the tree changed.
    ///
    /// On an empty tree this sorts and deduplicates the input and uses the
    /// linear-time bulk build instead of n individual insertions.
    pub fn add_all<I: IntoIterator<Item = T>>(&mut self, items: I) -> bool {
        if self.is_empty() {
            let mut items: Vec<T> = items.into_iter().collect();
            items.sort_by(|a, b| self.t.cmp.cmp(a, b));
            items.dedup_by(|a, b| self.t.cmp.cmp(a, b) == Ordering::Equal);
            let changed = !items.is_empty();
            self.t
                .build_sorted(items.into_iter().map(|x| (x, ())).collect());
            debug_assert!(self.t.check());
            changed
        } else {
            let mut changed = false;
            for x in items {
                changed |= self.add(x);
            }
            changed
        }
    }

    /// Removes every element of `probes`; returns whether the tree
    /// changed.
    pub fn remove_all(&mut self, probes: &[T]) -> bool {
        let mut changed = false;
        for x in probes {
            changed |= self.remove(x);
        }
        changed
    }

    /// Removes every element **not** present in `keep`; returns whether
    /// the tree changed.
    ///
    /// Picks the cheaper of two strategies: deleting the dropped elements
    /// one by one, or rebuilding a balanced tree from the kept run (which
    /// is already sorted) in linear time.
    pub fn retain_all(&mut self, keep: &[T]) -> bool {
        let mut probes: Vec<&T> = keep.iter().collect();
        probes.sort_by(|a, b| self.t.cmp.cmp(a, b));
        let changed = self
            .t
            .retain_with(|cmp, x| probes.binary_search_by(|p| cmp.cmp(p, x)).is_ok());
        debug_assert!(self.t.check());
        changed
    }

    /// Smallest element strictly greater than `probe`, or `None` at the
    /// top end.  `probe` itself need not be stored.
    pub fn next(&self, probe: &T) -> Option<&T> {
        self.t.higher(probe).map(|id| &self.t.pool[id].item)
    }

    /// Greatest element strictly less than `probe`, or `None` at the
    /// bottom end.  `probe` itself need not be stored.
    pub fn prev(&self, probe: &T) -> Option<&T> {
        self.t.lower(probe).map(|id| &self.t.pool[id].item)
    }

    /// Number of stored elements strictly less than `probe`.
    ///
    /// For a stored element this is its in-order rank, the inverse of
    /// [`get`](RBTree::get).
    pub fn rank(&self, probe: &T) -> usize {
        self.t.rank_of(probe)
    }

    /// Descends under the direction of `oracle` and returns the payload it
    /// selects.
    ///
    /// At every visited node the oracle receives the comparator and the
    /// payloads of the current node and its children (`None` for a missing
    /// child), and answers with a [`SearchStep`]: `GoLeft`/`GoRight`
    /// continue the descent (an absent subtree ends the search empty);
    /// `Current`, `Left`, and `Right` terminate with the corresponding
    /// payload; `Stop` abandons the search.  Runs in the depth of the
    /// chosen path.
    pub fn search<F>(&self, oracle: F) -> Option<&T>
    where
        F: FnMut(&C, &T, Option<&T>, Option<&T>) -> SearchStep,
    {
        self.t.search_by(oracle)
    }

    // ------------------------------------------------------------------
    // Queue facade over the minimum
    // ------------------------------------------------------------------

    /// Queue insert; identical to [`add`](RBTree::add).
    pub fn offer(&mut self, item: T) -> bool {
        self.add(item)
    }

    /// Removes and returns the minimum, or `None` if the tree is empty.
    pub fn poll(&mut self) -> Option<T> {
        let id = self.t.min?;
        let item = self.t.remove_node(id);
        debug_assert!(self.t.check());
        Some(item)
    }

    /// Returns (but does not remove) the minimum, or `None` when empty.
    pub fn peek(&self) -> Option<&T> {
        self.min()
    }

    /// Like [`peek`](RBTree::peek), but an empty tree is an error.
    pub fn element(&self) -> Result<&T, TreeError> {
        self.min()
            .ok_or_else(|| TreeError::NoSuchElement("element() on an empty tree".to_string()))
    }

    /// Like [`poll`](RBTree::poll), but an empty tree is an error.
    pub fn remove_first(&mut self) -> Result<T, TreeError> {
        self.poll()
            .ok_or_else(|| TreeError::NoSuchElement("remove_first() on an empty tree".to_string()))
    }

    /// A cursor positioned before the smallest element.
    pub fn cursor(&mut self) -> Cursor<'_, T, C> {
        Cursor {
            core: CursorCore::new(&mut self.t, true),
        }
    }

    /// A cursor positioned after the largest element.
    pub fn cursor_back(&mut self) -> Cursor<'_, T, C> {
        Cursor {
            core: CursorCore::new(&mut self.t, false),
        }
    }
}

impl<T, C> RBTree<T, C> {
    /// Returns the number of elements in this tree.
    pub fn len(&self) -> usize {
        self.t.len
    }

    /// Returns true if this tree is empty, returns false otherwise.
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Smallest element, or `None` when empty.  &Theta;(1).
    pub fn min(&self) -> Option<&T> {
        self.t.min.map(|id| &self.t.pool[id].item)
    }

    /// Largest element, or `None` when empty.  &Theta;(1).
    pub fn max(&self) -> Option<&T> {
        self.t.max.map(|id| &self.t.pool[id].item)
    }

    /// Payload at the root, or `None` when empty.  &Theta;(1).
    pub fn root(&self) -> Option<&T> {
        self.t.root.map(|id| &self.t.pool[id].item)
    }

    /// Element at in-order rank `rank` (0-based), by subtree-size descent.
    ///
    /// Fails with [`TreeError::OutOfRange`] when `rank` is not in
    /// `[0, len)`.
    pub fn get(&self, rank: usize) -> Result<&T, TreeError> {
        if rank >= self.len() {
            return Err(TreeError::OutOfRange(format!(
                "rank {} not in [0, {})",
                rank,
                self.len()
            )));
        }
        let id = self.t.select(rank).expect("rank checked against len");
        Ok(&self.t.pool[id].item)
    }

    /// Returns an iterator over the elements in ascending order.
    ///
    /// The iterator is eager: it collects the whole in-order sequence up
    /// front, so creation is &Theta;(<em>n</em>) and iteration itself is
    /// free of tree traversal.  Mutating the tree requires the iterator to
    /// be dropped first.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.t.items_in_order())
    }

    /// Height of the tree, for diagnostics; a 1-node tree has height 0
    /// and an empty tree -1.
    pub fn height(&self) -> isize {
        self.t.height()
    }

    /// Removes all elements and releases the nodes.
    pub fn clear(&mut self) {
        self.t.clear();
    }
}

impl<T: Ord> Default for RBTree<T, Natural> {
    fn default() -> Self {
        RBTree::new()
    }
}

impl<T: Ord> FromIterator<T> for RBTree<T, Natural> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        RBTree::from_items(Natural, iter)
    }
}

impl<T: fmt::Debug, C> fmt::Debug for RBTree<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, T, C> IntoIterator for &'a RBTree<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T, C: Comparator<T>> IntoIterator for RBTree<T, C> {
    type Item = T;
    type IntoIter = IntoIter<T, C>;

    /// Drains the tree in ascending order.
    fn into_iter(self) -> IntoIter<T, C> {
        IntoIter { t: self.t }
    }
}

/// Eager iterator over the elements of a tree in ascending order.
///
/// See [`RBTree::iter`] for the eagerness trade-off.
pub struct Iter<'a, T> {
    inner: std::vec::IntoIter<&'a T>,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(items: Vec<&'a T>) -> Self {
        Iter {
            inner: items.into_iter(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        self.inner.next_back()
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}

/// Owning iterator that drains a tree in ascending order by repeatedly
/// removing the minimum.
pub struct IntoIter<T, C> {
    t: Tree<T, (), C>,
}

impl<T, C: Comparator<T>> Iterator for IntoIter<T, C> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let id = self.t.min?;
        Some(self.t.remove_node(id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.t.len, Some(self.t.len))
    }
}

impl<T, C: Comparator<T>> ExactSizeIterator for IntoIter<T, C> {}

/// Bidirectional cursor over an [`RBTree`], in the spirit of a list
/// iterator.
///
/// The cursor sits in a gap between elements; [`next`](Cursor::next) and
/// [`prev`](Cursor::prev) yield the element on either side of the gap and
/// move over it, and [`remove`](Cursor::remove) removes the last yielded
/// element, repositioning the cursor at that element's successor.  There
/// is no `set` or `add`.
pub struct Cursor<'a, T, C = Natural> {
    core: CursorCore<'a, T, (), C>,
}

impl<'a, T, C: Comparator<T>> Cursor<'a, T, C> {
    /// Yields the next element in ascending order, or `None` at the back.
    pub fn next(&mut self) -> Option<&T> {
        self.core.next()
    }

    /// Yields the previous element in descending order, or `None` at the
    /// front.
    pub fn prev(&mut self) -> Option<&T> {
        self.core.prev()
    }

    /// Removes and returns the last element yielded by
    /// [`next`](Cursor::next) or [`prev`](Cursor::prev); `None` if nothing
    /// was yielded since the last removal.
    pub fn remove(&mut self) -> Option<T> {
        self.core.remove()
    }
}
