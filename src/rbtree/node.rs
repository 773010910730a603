//! Tree nodes, node references, and per-node augmentation.
//!
//! Nodes are stored in a [`NodePool`](super::pool::NodePool) and refer to
//! each other through stable 32-bit ids, so the parent/child/prev/next
//! graph never needs owning back-edges.  Everything beyond the basic
//! red-black fields (payload, color, structural links, subtree size) lives
//! in an augmentation type resolved statically through [`Augment`]: the
//! plain tree uses `()`, the linked variants add an in-order chain, and the
//! bag variants add a multiplicity count with a subtree sum.

use super::pool::NodePool;
use std::num::NonZeroU32;

/// Color of a red-black tree node.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Color {
    Red,
    Black,
}

/// Identifier of an occupied slot in a [`NodePool`].
///
/// Ids are stable for the lifetime of the node: rotations and the
/// structural swap used by deletion move links, never node storage, so an
/// id is invalidated only when its node is removed from the tree.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct NodeId(NonZeroU32);

impl NodeId {
    pub(crate) fn from_index(index: usize) -> NodeId {
        let raw = u32::try_from(index + 1).expect("node pool capacity exceeded");
        NodeId(NonZeroU32::new(raw).expect("index + 1 is nonzero"))
    }

    pub(crate) fn index(self) -> usize {
        self.0.get() as usize - 1
    }
}

/// Opaque reference to a node of a linked tree, carried by the payload.
///
/// Payloads of the linked tree variants store one of these as their
/// back-reference (see [`Linked`](crate::linked::Linked)).  The value is
/// meaningful only to the tree that issued it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeRef(pub(crate) NodeId);

/// A tree node: payload, color, structural links, subtree size, and the
/// variant-specific augmentation.
#[derive(Clone, Debug)]
pub(crate) struct Node<T, X> {
    pub(crate) item: T,
    pub(crate) color: Color,
    pub(crate) parent: Option<NodeId>,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
    pub(crate) size: usize,
    pub(crate) aug: X,
}

impl<T, X: Augment> Node<T, X> {
    pub(crate) fn new(item: T) -> Self {
        Node {
            item,
            color: Color::Red,
            parent: None,
            left: None,
            right: None,
            size: 1,
            aug: X::default(),
        }
    }
}

/// Augmentation hooks, resolved statically per tree variant.
///
/// The core calls these at the points where augmented state can go stale:
/// `refresh` whenever a node's child set changed (rotation, transplant,
/// ancestor-path repair), `attached` right after a new leaf is linked in
/// (before rebalancing, so the parent still determines the in-order
/// position), `detached` right before a node is unlinked, and `built` once
/// after a bulk build with every node id in sorted order.
pub(crate) trait Augment: Default + Sized {
    /// Recompute this node's subtree aggregates from its children.
    /// Subtree `size` is maintained by the core and is already correct
    /// when this hook runs.
    fn refresh<T>(pool: &mut NodePool<T, Self>, id: NodeId) {
        let _ = (pool, id);
    }

    /// Runs after `id` has been attached as a leaf, before rebalancing.
    fn attached<T>(pool: &mut NodePool<T, Self>, id: NodeId) {
        let _ = (pool, id);
    }

    /// Runs right before `id` is unlinked from the tree.
    fn detached<T>(pool: &mut NodePool<T, Self>, id: NodeId) {
        let _ = (pool, id);
    }

    /// Runs after a bulk build; `ids` lists every node in sorted order.
    fn built<T>(pool: &mut NodePool<T, Self>, ids: &[NodeId]) {
        let _ = (pool, ids);
    }
}

/// Plain order-statistic tree: no extra per-node state.
impl Augment for () {}

/// Augmentation of the linked variants: the doubly linked in-order chain.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Chain {
    pub(crate) prev: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
}

impl Augment for Chain {
    fn attached<T>(pool: &mut NodePool<T, Self>, id: NodeId) {
        thread_in(pool, id);
    }

    fn detached<T>(pool: &mut NodePool<T, Self>, id: NodeId) {
        unthread(pool, id);
    }

    fn built<T>(pool: &mut NodePool<T, Self>, ids: &[NodeId]) {
        thread_run(pool, ids);
    }
}

/// Augmentation of the bag variants: per-key multiplicity and the sum of
/// multiplicities over the subtree.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Counted {
    pub(crate) count: usize,
    pub(crate) bag: usize,
}

impl Default for Counted {
    fn default() -> Self {
        Counted { count: 1, bag: 1 }
    }
}

impl Augment for Counted {
    fn refresh<T>(pool: &mut NodePool<T, Self>, id: NodeId) {
        refresh_bag(pool, id);
    }
}

/// Augmentation of the linked bag: chain plus multiplicity.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ChainCounted {
    pub(crate) prev: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
    pub(crate) count: usize,
    pub(crate) bag: usize,
}

impl Default for ChainCounted {
    fn default() -> Self {
        ChainCounted {
            prev: None,
            next: None,
            count: 1,
            bag: 1,
        }
    }
}

impl Augment for ChainCounted {
    fn refresh<T>(pool: &mut NodePool<T, Self>, id: NodeId) {
        refresh_bag(pool, id);
    }

    fn attached<T>(pool: &mut NodePool<T, Self>, id: NodeId) {
        thread_in(pool, id);
    }

    fn detached<T>(pool: &mut NodePool<T, Self>, id: NodeId) {
        unthread(pool, id);
    }

    fn built<T>(pool: &mut NodePool<T, Self>, ids: &[NodeId]) {
        thread_run(pool, ids);
    }
}

/// Chain pointer access shared by [`Chain`] and [`ChainCounted`].
pub(crate) trait ChainAug: Augment {
    fn prev(&self) -> Option<NodeId>;
    fn next(&self) -> Option<NodeId>;
    fn set_prev(&mut self, prev: Option<NodeId>);
    fn set_next(&mut self, next: Option<NodeId>);
}

impl ChainAug for Chain {
    fn prev(&self) -> Option<NodeId> {
        self.prev
    }
    fn next(&self) -> Option<NodeId> {
        self.next
    }
    fn set_prev(&mut self, prev: Option<NodeId>) {
        self.prev = prev;
    }
    fn set_next(&mut self, next: Option<NodeId>) {
        self.next = next;
    }
}

impl ChainAug for ChainCounted {
    fn prev(&self) -> Option<NodeId> {
        self.prev
    }
    fn next(&self) -> Option<NodeId> {
        self.next
    }
    fn set_prev(&mut self, prev: Option<NodeId>) {
        self.prev = prev;
    }
    fn set_next(&mut self, next: Option<NodeId>) {
        self.next = next;
    }
}

/// Multiplicity access shared by [`Counted`] and [`ChainCounted`].
pub(crate) trait CountAug: Augment {
    fn count(&self) -> usize;
    fn set_count(&mut self, count: usize);
    fn bag(&self) -> usize;
    fn set_bag(&mut self, bag: usize);
}

impl CountAug for Counted {
    fn count(&self) -> usize {
        self.count
    }
    fn set_count(&mut self, count: usize) {
        self.count = count;
    }
    fn bag(&self) -> usize {
        self.bag
    }
    fn set_bag(&mut self, bag: usize) {
        self.bag = bag;
    }
}

impl CountAug for ChainCounted {
    fn count(&self) -> usize {
        self.count
    }
    fn set_count(&mut self, count: usize) {
        self.count = count;
    }
    fn bag(&self) -> usize {
        self.bag
    }
    fn set_bag(&mut self, bag: usize) {
        self.bag = bag;
    }
}

/// Recompute a node's subtree multiplicity sum from its children.
fn refresh_bag<T, X: CountAug>(pool: &mut NodePool<T, X>, id: NodeId) {
    let left = pool[id].left.map_or(0, |l| pool[l].aug.bag());
    let right = pool[id].right.map_or(0, |r| pool[r].aug.bag());
    let sum = pool[id].aug.count() + left + right;
    pool[id].aug.set_bag(sum);
}

/// Thread `id` into the chain using its parent's position.
///
/// A freshly attached right child sits between its parent and the parent's
/// successor; a left child sits between the parent's predecessor and the
/// parent.
fn thread_in<T, X: ChainAug>(pool: &mut NodePool<T, X>, id: NodeId) {
    let Some(p) = pool[id].parent else {
        // sole node: both chain ends stay absent
        return;
    };
    if pool[p].right == Some(id) {
        let succ = pool[p].aug.next();
        pool[id].aug.set_prev(Some(p));
        pool[id].aug.set_next(succ);
        pool[p].aug.set_next(Some(id));
        if let Some(s) = succ {
            pool[s].aug.set_prev(Some(id));
        }
    } else {
        let pred = pool[p].aug.prev();
        pool[id].aug.set_next(Some(p));
        pool[id].aug.set_prev(pred);
        pool[p].aug.set_prev(Some(id));
        if let Some(q) = pred {
            pool[q].aug.set_next(Some(id));
        }
    }
}

/// Splice `id` out of the chain and clear its chain pointers.
fn unthread<T, X: ChainAug>(pool: &mut NodePool<T, X>, id: NodeId) {
    let prev = pool[id].aug.prev();
    let next = pool[id].aug.next();
    if let Some(p) = prev {
        pool[p].aug.set_next(next);
    }
    if let Some(n) = next {
        pool[n].aug.set_prev(prev);
    }
    pool[id].aug.set_prev(None);
    pool[id].aug.set_next(None);
}

/// Thread a sorted run of nodes linearly, overwriting any stale pointers.
fn thread_run<T, X: ChainAug>(pool: &mut NodePool<T, X>, ids: &[NodeId]) {
    for (i, &id) in ids.iter().enumerate() {
        let prev = if i > 0 { Some(ids[i - 1]) } else { None };
        let next = ids.get(i + 1).copied();
        pool[id].aug.set_prev(prev);
        pool[id].aug.set_next(next);
    }
}
