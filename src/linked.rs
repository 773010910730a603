//! A red-black tree threaded with a doubly linked in-order chain.
//!
//! Payloads of a [`LinkedRBTree`] carry a back-reference to their owning
//! node (the [`Linked`] contract), which turns neighbor, parent, and child
//! queries into constant-time pointer chasing instead of a descent from
//! the root.  The price is that a payload belongs to at most one tree at a
//! time, and that the tree must keep the back-references and the chain
//! current through every insert, delete, bulk build, and clear.


use crate::compare::{Comparator, Natural};
use crate::error::TreeError;
use crate::rbtree::node::{Augment, Chain, ChainAug, NodeId};
use crate::rbtree::tree::{CursorCore, Tree};
use crate::rbtree::{Iter, SearchStep};
use std::cmp::Ordering;
use std::fmt;

pub use crate::rbtree::node::NodeRef;

/// Contract of payloads stored in the linked tree variants.
///
/// The payload exposes exactly one slot for a [`NodeRef`]; the tree is the
/// only writer.  A payload whose slot is occupied is bound to a tree and
/// is rejected by any other insertion until the binding is severed
/// (removal, [`LinkedRBTree::take`], [`LinkedRBTree::clear`]).
pub trait Linked {
    /// Current back-reference, `None` when the payload is unbound.
    fn node(&self) -> Option<NodeRef>;
    /// Replaces the back-reference.  Written only by the owning tree.
    fn set_node(&mut self, node: Option<NodeRef>);
}

/// An ordered set like [`RBTree`](crate::RBTree), extended with an
/// in-order chain and payload back-references.
///
/// All the base-tree operations are available (rank/select, iteration,
/// the queue facade, bulk operations, [`search`](LinkedRBTree::search)).
/// On top of those, a payload handle answers
/// [`next`](LinkedRBTree::next), [`prev`](LinkedRBTree::prev),
/// [`parent`](LinkedRBTree::parent), [`left`](LinkedRBTree::left), and
/// [`right`](LinkedRBTree::right) in &Theta;(1), and the tree offers
/// [`swap`](LinkedRBTree::swap) and [`merge`](LinkedRBTree::merge).
///
/// ```
/// use rbtree_rs::{CmpFn, Linked, LinkedRBTree, NodeRef};
///
/// struct Station {
///     milepost: u32,
///     name: &'static str,
///     node: Option<NodeRef>,
/// }
///
/// impl Station {
///     fn new(milepost: u32, name: &'static str) -> Self {
///         Station { milepost, name, node: None }
///     }
/// }
///
/// impl Linked for Station {
///     fn node(&self) -> Option<NodeRef> {
///         self.node
///     }
///     fn set_node(&mut self, node: Option<NodeRef>) {
///         self.node = node;
///     }
/// }
///
/// let mut line = LinkedRBTree::with_comparator(CmpFn(|a: &Station, b: &Station| {
///     a.milepost.cmp(&b.milepost)
/// }));
/// for (mp, name) in [(30, "Midtown"), (10, "Harbor"), (20, "Univers")] {
///     line.add(Station::new(mp, name)).unwrap();
/// }
/// let harbor = line.min().unwrap();
/// assert_eq!(line.next(harbor).map(|s| s.name), Some("Univers"));
/// ```
#[derive(Clone)]
pub struct LinkedRBTree<T: Linked, C = Natural> {
    t: Tree<T, Chain, C>,
}

impl<T: Ord + Linked> LinkedRBTree<T, Natural> {
    /// Initializes an empty tree ordered by `T`'s own [`Ord`] instance.
    pub fn new() -> Self {
        LinkedRBTree::with_comparator(Natural)
    }
}

impl<T: Linked, C: Comparator<T>> LinkedRBTree<T, C> {
    /// Initializes an empty tree ordered by `cmp`.
    pub fn with_comparator(cmp: C) -> Self {
        LinkedRBTree { t: Tree::new(cmp) }
    }

    /// Initializes a tree holding the distinct elements of `items`.
    ///
    /// Fails with [`TreeError::InvalidArgument`] if any payload is already
    /// bound to a tree.
    pub fn from_items<I: IntoIterator<Item = T>>(cmp: C, items: I) -> Result<Self, TreeError> {
        let mut t = LinkedRBTree::with_comparator(cmp);
        t.add_all(items)?;
        Ok(t)
    }

    /// Adds `item` unless an element comparing equal is already present.
    ///
    /// Returns whether the tree changed; a rejected duplicate is dropped.
    /// Fails with [`TreeError::InvalidArgument`] if `item` is already
    /// bound to a tree.
    pub fn add(&mut self, item: T) -> Result<bool, TreeError> {
        if item.node().is_some() {
            return Err(TreeError::InvalidArgument(
                "payload is already bound to a tree".to_string(),
            ));
        }
        match self.t.insert(item) {
            Ok(id) => {
                self.t.pool[id].item.set_node(Some(NodeRef(id)));
                debug_assert!(self.t.check());
                debug_assert!(chain_consistent(&self.t));
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }

    /// Removes the element comparing equal to `probe`, if any, and
    /// returns whether the tree changed.
    pub fn remove(&mut self, probe: &T) -> bool {
        self.take(probe).is_some()
    }

    /// Removes and returns the element comparing equal to `probe`, with
    /// its back-reference severed.
    pub fn take(&mut self, probe: &T) -> Option<T> {
        let id = self.t.find(probe)?;
        let mut item = self.t.remove_node(id);
        item.set_node(None);
        debug_assert!(self.t.check());
        debug_assert!(chain_consistent(&self.t));
        Some(item)
    }

    /// Adds every element of `items`; returns whether the tree changed.
    ///
    /// On an empty tree the input is sorted, deduplicated, bulk-built in
    /// linear time, and the chain is threaded across the sorted run.
    /// Fails without mutating if any payload is already bound.
    pub fn add_all<I: IntoIterator<Item = T>>(&mut self, items: I) -> Result<bool, TreeError> {
        if self.is_empty() {
            let mut items: Vec<T> = items.into_iter().collect();
            if items.iter().any(|x| x.node().is_some()) {
                return Err(TreeError::InvalidArgument(
                    "payload is already bound to a tree".to_string(),
                ));
            }
            items.sort_by(|a, b| self.t.cmp.cmp(a, b));
            items.dedup_by(|a, b| self.t.cmp.cmp(a, b) == Ordering::Equal);
            let changed = !items.is_empty();
            self.t
                .build_sorted(items.into_iter().map(|x| (x, Chain::default())).collect());
            self.seat_refs();
            debug_assert!(self.t.check());
            debug_assert!(chain_consistent(&self.t));
            Ok(changed)
        } else {
            let mut changed = false;
            for x in items {
                changed |= self.add(x)?;
            }
            Ok(changed)
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
    /// the tree changed.  See [`RBTree::retain_all`](crate::RBTree::retain_all)
    /// for the strategy choice; back-references are re-seated afterwards.
    pub fn retain_all(&mut self, keep: &[T]) -> bool {
        let mut probes: Vec<&T> = keep.iter().collect();
        probes.sort_by(|a, b| self.t.cmp.cmp(a, b));
        let changed = self
            .t
            .retain_with(|cmp, x| probes.binary_search_by(|p| cmp.cmp(p, x)).is_ok());
        if changed {
            self.seat_refs();
        }
        debug_assert!(self.t.check());
        debug_assert!(chain_consistent(&self.t));
        changed
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
    pub fn binary_search(&self, probe: &T) -> Option<&T> {
        self.t.find(probe).map(|id| &self.t.pool[id].item)
    }

    /// Successor of `probe` in sorted order.
    ///
    /// &Theta;(1) through the chain when `probe` is an element of this
    /// tree; an unbound probe falls back to a comparator descent.
    pub fn next(&self, probe: &T) -> Option<&T> {
        match resolve(&self.t, probe) {
            Some(id) => self.t.pool[id].aug.next().map(|n| &self.t.pool[n].item),
            None => self.t.higher(probe).map(|id| &self.t.pool[id].item),
        }
    }

    /// Predecessor of `probe` in sorted order; mirror of
    /// [`next`](LinkedRBTree::next).
    pub fn prev(&self, probe: &T) -> Option<&T> {
        match resolve(&self.t, probe) {
            Some(id) => self.t.pool[id].aug.prev().map(|p| &self.t.pool[p].item),
            None => self.t.lower(probe).map(|id| &self.t.pool[id].item),
        }
    }

    /// Payload at the parent of `probe`'s node, in &Theta;(1).  `None`
    /// when `probe` is unbound or at the root.
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

    /// Number of stored elements strictly less than `probe`.
    pub fn rank(&self, probe: &T) -> usize {
        self.t.rank_of(probe)
    }

    /// Exchanges the payload data of the two bound elements `a` and `b`
    /// through the caller-supplied `swap_fn`, then re-seats both
    /// back-references.  &Theta;(1) plus the cost of `swap_fn`.
    ///
    /// The caller is responsible for swapping only data that takes no part
    /// in the comparison.  Afterwards both positions are validated against
    /// their chain neighbors; on violation the result is
    /// [`TreeError::InvariantViolation`] and the tree state is
    /// unspecified.  Do not use `swap` unless ordering is provably
    /// preserved.
    pub fn swap<F>(&mut self, a: &T, b: &T, swap_fn: F) -> Result<(), TreeError>
    where
        F: FnOnce(&mut T, &mut T),
    {
        swap_in(&mut self.t, a, b, swap_fn)
    }

    /// Merges `item` into the stored element comparing equal to it, or
    /// inserts it when absent.
    ///
    /// When an equal element exists, `merge_fn(existing, item)` updates it
    /// in place and `Ok(true)` is returned; the merged payload must keep
    /// comparing equal to its old self.  Otherwise `item` is inserted and
    /// `Ok(false)` is returned.  A bound `item` is an
    /// [`TreeError::InvalidArgument`].
    pub fn merge<F>(&mut self, item: T, merge_fn: F) -> Result<bool, TreeError>
    where
        F: FnOnce(&mut T, T),
    {
        let (merged, _) = merge_in(&mut self.t, item, merge_fn)?;
        Ok(merged)
    }

    /// Descends under the direction of `oracle`; see
    /// [`RBTree::search`](crate::RBTree::search).
    ///
    /// This is the slow path on a linked tree: when a payload handle is at
    /// hand, [`next`](LinkedRBTree::next)/[`prev`](LinkedRBTree::prev)/
    /// [`parent`](LinkedRBTree::parent)/[`left`](LinkedRBTree::left)/
    /// [`right`](LinkedRBTree::right) answer the same questions in
    /// constant time.
    pub fn search<F>(&self, oracle: F) -> Option<&T>
    where
        F: FnMut(&C, &T, Option<&T>, Option<&T>) -> SearchStep,
    {
        self.t.search_by(oracle)
    }

    // ------------------------------------------------------------------
    // Queue facade over the minimum
    // ------------------------------------------------------------------

    /// Queue insert; identical to [`add`](LinkedRBTree::add).
    pub fn offer(&mut self, item: T) -> Result<bool, TreeError> {
        self.add(item)
    }

    /// Removes and returns the minimum with its back-reference severed,
    /// or `None` if the tree is empty.
    pub fn poll(&mut self) -> Option<T> {
        let id = self.t.min?;
        let mut item = self.t.remove_node(id);
        item.set_node(None);
        debug_assert!(self.t.check());
        Some(item)
    }

    /// Returns (but does not remove) the minimum, or `None` when empty.
    pub fn peek(&self) -> Option<&T> {
        self.min()
    }

    /// Like [`peek`](LinkedRBTree::peek), but an empty tree is an error.
    pub fn element(&self) -> Result<&T, TreeError> {
        self.min()
            .ok_or_else(|| TreeError::NoSuchElement("element() on an empty tree".to_string()))
    }

    /// Like [`poll`](LinkedRBTree::poll), but an empty tree is an error.
    pub fn remove_first(&mut self) -> Result<T, TreeError> {
        self.poll()
            .ok_or_else(|| TreeError::NoSuchElement("remove_first() on an empty tree".to_string()))
    }

    /// A cursor positioned before the smallest element.
    pub fn cursor(&mut self) -> LinkedCursor<'_, T, C> {
        LinkedCursor {
            core: CursorCore::new(&mut self.t, true),
        }
    }

    /// A cursor positioned after the largest element.
    pub fn cursor_back(&mut self) -> LinkedCursor<'_, T, C> {
        LinkedCursor {
            core: CursorCore::new(&mut self.t, false),
        }
    }

    /// Walks the tree re-pointing every payload at its node.  Needed after
    /// a bulk build or retain rebuild, where node ids change.
    fn seat_refs(&mut self) {
        seat_all(&mut self.t);
    }
}

impl<T: Linked, C> LinkedRBTree<T, C> {
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

    /// Element at in-order rank `rank` (0-based).  Fails with
    /// [`TreeError::OutOfRange`] when `rank` is not in `[0, len)`.
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

    /// Returns an eager iterator over the elements in ascending order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.t.items_in_order())
    }

    /// Removes all elements, severing every back-reference before the
    /// nodes are released.
    pub fn clear(&mut self) {
        sever_all(&mut self.t);
        self.t.clear();
    }
}

impl<T: Ord + Linked> Default for LinkedRBTree<T, Natural> {
    fn default() -> Self {
        LinkedRBTree::new()
    }
}

impl<T: Linked + fmt::Debug, C> fmt::Debug for LinkedRBTree<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, T: Linked, C> IntoIterator for &'a LinkedRBTree<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

/// Bidirectional cursor over a [`LinkedRBTree`]; see
/// [`Cursor`](crate::rbtree::Cursor).  Removal severs the payload's
/// back-reference before handing it back.
pub struct LinkedCursor<'a, T: Linked, C = Natural> {
    core: CursorCore<'a, T, Chain, C>,
}

impl<'a, T: Linked, C: Comparator<T>> LinkedCursor<'a, T, C> {
    /// Yields the next element in ascending order, or `None` at the back.
    pub fn next(&mut self) -> Option<&T> {
        self.core.next()
    }

    /// Yields the previous element in descending order, or `None` at the
    /// front.
    pub fn prev(&mut self) -> Option<&T> {
        self.core.prev()
    }

    /// Removes and returns the last yielded element with its
    /// back-reference severed.
    pub fn remove(&mut self) -> Option<T> {
        let mut item = self.core.remove()?;
        item.set_node(None);
        Some(item)
    }
}

/// Looks up the node a bound payload points at, guarding against stale or
/// foreign references: the slot must be live in *this* pool and its
/// payload must compare equal to the probe.
pub(crate) fn resolve<T, X, C>(t: &Tree<T, X, C>, probe: &T) -> Option<NodeId>
where
    T: Linked,
    X: Augment,
    C: Comparator<T>,
{
    let NodeRef(id) = probe.node()?;
    let node = t.pool.get(id)?;
    if t.cmp.cmp(probe, &node.item) != Ordering::Equal {
        return None;
    }
    Some(id)
}

/// Re-points every payload at its current node, in one in-order walk.
pub(crate) fn seat_all<T: Linked, X: Augment, C>(t: &mut Tree<T, X, C>) {
    let mut cur = t.min;
    while let Some(id) = cur {
        cur = t.successor(id);
        t.pool[id].item.set_node(Some(NodeRef(id)));
    }
}

/// Severs every payload's back-reference, ahead of releasing the nodes.
pub(crate) fn sever_all<T: Linked, X: Augment, C>(t: &mut Tree<T, X, C>) {
    for node in t.pool.nodes_mut() {
        node.item.set_node(None);
    }
}

/// Shared engine of [`LinkedRBTree::swap`] and
/// [`LinkedRBTreeBag::swap`](crate::bag::LinkedRBTreeBag::swap).
pub(crate) fn swap_in<T, X, C, F>(
    t: &mut Tree<T, X, C>,
    a: &T,
    b: &T,
    swap_fn: F,
) -> Result<(), TreeError>
where
    T: Linked,
    X: ChainAug,
    C: Comparator<T>,
    F: FnOnce(&mut T, &mut T),
{
    let na = resolve(t, a).ok_or_else(|| {
        TreeError::InvalidArgument("swap of a payload not bound to this tree".to_string())
    })?;
    let nb = resolve(t, b).ok_or_else(|| {
        TreeError::InvalidArgument("swap of a payload not bound to this tree".to_string())
    })?;
    if na == nb {
        return Ok(());
    }
    {
        let (x, y) = t.pool.pair_mut(na, nb);
        swap_fn(&mut x.item, &mut y.item);
        x.item.set_node(Some(NodeRef(na)));
        y.item.set_node(Some(NodeRef(nb)));
    }
    for id in [na, nb] {
        if !chain_ordered(t, id) {
            return Err(TreeError::InvariantViolation(
                "swap left an element out of order with its neighbors".to_string(),
            ));
        }
    }
    Ok(())
}

/// Is the element at `id` ordered strictly between its chain neighbors?
fn chain_ordered<T, X: ChainAug, C: Comparator<T>>(t: &Tree<T, X, C>, id: NodeId) -> bool {
    if let Some(p) = t.pool[id].aug.prev()
        && t.cmp.cmp(&t.pool[p].item, &t.pool[id].item) != Ordering::Less
    {
        return false;
    }
    if let Some(n) = t.pool[id].aug.next()
        && t.cmp.cmp(&t.pool[id].item, &t.pool[n].item) != Ordering::Less
    {
        return false;
    }
    true
}

/// Shared engine of [`LinkedRBTree::merge`] and
/// [`LinkedRBTreeBag::merge`](crate::bag::LinkedRBTreeBag::merge).
/// Returns whether the merge hit an existing element, and the id of the
/// freshly inserted node otherwise.
pub(crate) fn merge_in<T, X, C, F>(
    t: &mut Tree<T, X, C>,
    item: T,
    merge_fn: F,
) -> Result<(bool, Option<NodeId>), TreeError>
where
    T: Linked,
    X: Augment,
    C: Comparator<T>,
    F: FnOnce(&mut T, T),
{
    if item.node().is_some() {
        return Err(TreeError::InvalidArgument(
            "payload is already bound to a tree".to_string(),
        ));
    }
    match t.find(&item) {
        Some(id) => {
            merge_fn(&mut t.pool[id].item, item);
            // the merged payload must keep comparing the same way
            t.pool[id].item.set_node(Some(NodeRef(id)));
            debug_assert!(t.check());
            Ok((true, None))
        }
        None => {
            let id = t.insert(item).expect("absence was just checked");
            t.pool[id].item.set_node(Some(NodeRef(id)));
            debug_assert!(t.check());
            Ok((false, Some(id)))
        }
    }
}

/// Debug validator: the chain must visit exactly the in-order sequence,
/// with `prev` mirroring `next` and absent ends.
pub(crate) fn chain_consistent<T, X: ChainAug, C>(t: &Tree<T, X, C>) -> bool {
    let mut chain = t.min;
    let mut walk = t.min;
    let mut prev: Option<NodeId> = None;
    loop {
        if chain != walk {
            return false;
        }
        let Some(id) = chain else { break };
        if t.pool[id].aug.prev() != prev {
            return false;
        }
        prev = Some(id);
        chain = t.pool[id].aug.next();
        walk = t.successor(id);
    }
    true
}
