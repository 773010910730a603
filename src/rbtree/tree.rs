//! The balanced-tree core shared by every public tree variant.
//!
//! `Tree` implements the whole order-statistic red-black tree once,
//! generic over the augmentation type: search, insert and delete with
//! their rebalancing cascades, rank and select over subtree sizes, cached
//! min/max, structural neighbor queries, O(n) bulk construction from
//! sorted input, predicate retention with algorithm selection, and the
//! oracle-directed search.  The public types in [`crate::rbtree`],
//! [`crate::linked`], and [`crate::bag`] are thin shells around this one.

use super::node::{Augment, Color, Node, NodeId};
use super::pool::NodePool;
use crate::compare::Comparator;
use crate::rbtree::SearchStep;
use std::cmp::Ordering;

/// Tree header: node storage plus the cached handles and counters that
/// every structural change keeps current.
#[derive(Clone, Debug)]
pub(crate) struct Tree<T, X: Augment, C> {
    pub(crate) pool: NodePool<T, X>,
    pub(crate) root: Option<NodeId>,
    pub(crate) min: Option<NodeId>,
    pub(crate) max: Option<NodeId>,
    pub(crate) len: usize,
    pub(crate) cmp: C,
}

impl<T, X: Augment, C> Tree<T, X, C> {
    pub(crate) fn new(cmp: C) -> Self {
        Tree {
            pool: NodePool::new(),
            root: None,
            min: None,
            max: None,
            len: 0,
            cmp,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every node and resets the header.
    pub(crate) fn clear(&mut self) {
        self.pool.clear();
        self.root = None;
        self.min = None;
        self.max = None;
        self.len = 0;
    }

    fn is_red(&self, id: Option<NodeId>) -> bool {
        id.is_some_and(|n| self.pool[n].color == Color::Red)
    }

    fn left_size(&self, id: NodeId) -> usize {
        self.pool[id].left.map_or(0, |l| self.pool[l].size)
    }

    /// Smallest node of the subtree rooted at `id`.
    pub(crate) fn min_in(&self, mut id: NodeId) -> NodeId {
        while let Some(l) = self.pool[id].left {
            id = l;
        }
        id
    }

    /// Largest node of the subtree rooted at `id`.
    pub(crate) fn max_in(&self, mut id: NodeId) -> NodeId {
        while let Some(r) = self.pool[id].right {
            id = r;
        }
        id
    }

    /// Structural in-order successor: the minimum of the right subtree, or
    /// the first ancestor reached from a left child.
    pub(crate) fn successor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(r) = self.pool[id].right {
            return Some(self.min_in(r));
        }
        let mut cur = id;
        let mut parent = self.pool[id].parent;
        while let Some(p) = parent {
            if self.pool[p].right == Some(cur) {
                cur = p;
                parent = self.pool[p].parent;
            } else {
                return Some(p);
            }
        }
        None
    }

    /// Mirror of [`Tree::successor`].
    pub(crate) fn predecessor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(l) = self.pool[id].left {
            return Some(self.max_in(l));
        }
        let mut cur = id;
        let mut parent = self.pool[id].parent;
        while let Some(p) = parent {
            if self.pool[p].left == Some(cur) {
                cur = p;
                parent = self.pool[p].parent;
            } else {
                return Some(p);
            }
        }
        None
    }

    /// Node of the given in-order rank, by subtree-size descent.
    /// Precondition: `rank < self.len`.
    pub(crate) fn select(&self, mut rank: usize) -> Option<NodeId> {
        let mut cur = self.root?;
        loop {
            let left = self.left_size(cur);
            match rank.cmp(&left) {
                Ordering::Less => {
                    cur = self.pool[cur].left.expect("nonzero left size");
                }
                Ordering::Equal => return Some(cur),
                Ordering::Greater => {
                    rank -= left + 1;
                    cur = self.pool[cur].right.expect("rank within subtree");
                }
            }
        }
    }

    /// Every payload in sorted order.  Eager by design: the caller gets a
    /// plain vector of references and the tree is free again immediately.
    pub(crate) fn items_in_order(&self) -> Vec<&T> {
        let mut out = Vec::with_capacity(self.len);
        let mut cur = self.min;
        while let Some(id) = cur {
            out.push(&self.pool[id].item);
            cur = self.successor(id);
        }
        out
    }

    /// Height of the tree (a 1-node tree has height 0; empty is -1).
    pub(crate) fn height(&self) -> isize {
        fn walk<T, X: Augment, C>(t: &Tree<T, X, C>, x: Option<NodeId>) -> isize {
            match x {
                None => -1,
                Some(id) => 1 + walk(t, t.pool[id].left).max(walk(t, t.pool[id].right)),
            }
        }
        walk(self, self.root)
    }
}

impl<T, X: Augment, C: Comparator<T>> Tree<T, X, C> {
    /// Binary search for the node comparing equal to `probe`.
    pub(crate) fn find(&self, probe: &T) -> Option<NodeId> {
        let mut cur = self.root;
        while let Some(id) = cur {
            match self.cmp.cmp(probe, &self.pool[id].item) {
                Ordering::Less => cur = self.pool[id].left,
                Ordering::Greater => cur = self.pool[id].right,
                Ordering::Equal => return Some(id),
            }
        }
        None
    }

    /// Number of stored elements strictly less than `probe`.
    pub(crate) fn rank_of(&self, probe: &T) -> usize {
        let mut rank = 0;
        let mut cur = self.root;
        while let Some(id) = cur {
            match self.cmp.cmp(probe, &self.pool[id].item) {
                Ordering::Less => cur = self.pool[id].left,
                Ordering::Greater => {
                    rank += self.left_size(id) + 1;
                    cur = self.pool[id].right;
                }
                Ordering::Equal => {
                    rank += self.left_size(id);
                    break;
                }
            }
        }
        rank
    }

    /// Smallest stored element strictly greater than `probe`.
    pub(crate) fn higher(&self, probe: &T) -> Option<NodeId> {
        let mut best = None;
        let mut cur = self.root;
        while let Some(id) = cur {
            if self.cmp.cmp(probe, &self.pool[id].item) == Ordering::Less {
                best = Some(id);
                cur = self.pool[id].left;
            } else {
                cur = self.pool[id].right;
            }
        }
        best
    }

    /// Greatest stored element strictly less than `probe`.
    pub(crate) fn lower(&self, probe: &T) -> Option<NodeId> {
        let mut best = None;
        let mut cur = self.root;
        while let Some(id) = cur {
            if self.cmp.cmp(probe, &self.pool[id].item) == Ordering::Greater {
                best = Some(id);
                cur = self.pool[id].right;
            } else {
                cur = self.pool[id].left;
            }
        }
        best
    }

    /// BST insert plus rebalance.  Returns `Ok(id)` of the new node, or
    /// `Err(id)` of the existing node when an equal element is present (in
    /// which case nothing was mutated and `item` was dropped).
    pub(crate) fn insert(&mut self, item: T) -> Result<NodeId, NodeId> {
        let mut parent = None;
        let mut cur = self.root;
        let mut went_left = false;
        while let Some(id) = cur {
            match self.cmp.cmp(&item, &self.pool[id].item) {
                Ordering::Less => {
                    parent = Some(id);
                    cur = self.pool[id].left;
                    went_left = true;
                }
                Ordering::Greater => {
                    parent = Some(id);
                    cur = self.pool[id].right;
                    went_left = false;
                }
                Ordering::Equal => return Err(id),
            }
        }

        let id = self.pool.alloc(Node::new(item));
        self.pool[id].parent = parent;
        match parent {
            None => {
                self.root = Some(id);
                self.min = Some(id);
                self.max = Some(id);
            }
            Some(p) => {
                if went_left {
                    self.pool[p].left = Some(id);
                    if self.min == Some(p) {
                        self.min = Some(id);
                    }
                } else {
                    self.pool[p].right = Some(id);
                    if self.max == Some(p) {
                        self.max = Some(id);
                    }
                }
            }
        }
        X::attached(&mut self.pool, id);
        self.refresh_to_root(parent);
        self.insert_fixup(id);
        self.len += 1;
        Ok(id)
    }

    /// Unlinks `id` from the tree, rebalances, and returns its payload.
    pub(crate) fn remove_node(&mut self, z: NodeId) -> T {
        X::detached(&mut self.pool, z);
        if self.min == Some(z) {
            self.min = self.successor(z);
        }
        if self.max == Some(z) {
            self.max = self.predecessor(z);
        }

        if self.pool[z].left.is_some() && self.pool[z].right.is_some() {
            let right = self.pool[z].right.expect("two children");
            let y = self.min_in(right);
            self.swap_places(z, y);
        }

        // z now has at most one child
        let child = self.pool[z].left.or(self.pool[z].right);
        let parent = self.pool[z].parent;
        let removed_color = self.pool[z].color;
        if let Some(c) = child {
            self.pool[c].parent = parent;
        }
        match parent {
            None => self.root = child,
            Some(p) => {
                if self.pool[p].left == Some(z) {
                    self.pool[p].left = child;
                } else {
                    self.pool[p].right = child;
                }
            }
        }
        self.refresh_to_root(parent);
        if removed_color == Color::Black {
            self.remove_fixup(child, parent);
        }
        self.len -= 1;
        self.pool.release(z).item
    }

    /// Exchanges the tree positions of `z` and its in-order successor `y`,
    /// including colors and position sizes.  `y` is the minimum of `z`'s
    /// right subtree, so it has no left child; when it is `z`'s own right
    /// child the two are adjacent and the parent/child links must be tied
    /// to each other rather than copied.
    fn swap_places(&mut self, z: NodeId, y: NodeId) {
        debug_assert!(self.pool[y].left.is_none());
        let zp = self.pool[z].parent;
        let zl = self.pool[z].left;
        let zr = self.pool[z].right;
        let yp = self.pool[y].parent;
        let yr = self.pool[y].right;

        let zc = self.pool[z].color;
        self.pool[z].color = self.pool[y].color;
        self.pool[y].color = zc;
        let zs = self.pool[z].size;
        self.pool[z].size = self.pool[y].size;
        self.pool[y].size = zs;

        // y takes z's place
        self.pool[y].parent = zp;
        match zp {
            None => self.root = Some(y),
            Some(p) => {
                if self.pool[p].left == Some(z) {
                    self.pool[p].left = Some(y);
                } else {
                    self.pool[p].right = Some(y);
                }
            }
        }
        self.pool[y].left = zl;
        if let Some(l) = zl {
            self.pool[l].parent = Some(y);
        }

        if yp == Some(z) {
            // adjacent: y was z's right child, so z hangs directly off y
            self.pool[y].right = Some(z);
            self.pool[z].parent = Some(y);
        } else {
            self.pool[y].right = zr;
            if let Some(r) = zr {
                self.pool[r].parent = Some(y);
            }
            self.pool[z].parent = yp;
            if let Some(p) = yp {
                // a non-adjacent successor is always a left child
                self.pool[p].left = Some(z);
            }
        }

        // z takes y's old shape
        self.pool[z].left = None;
        self.pool[z].right = yr;
        if let Some(r) = yr {
            self.pool[r].parent = Some(z);
        }
    }

    /// Recomputes `size` and the augmentation aggregates of `id` from its
    /// children.  Called on exactly the nodes whose child set changed.
    fn refresh(&mut self, id: NodeId) {
        let left = self.pool[id].left.map_or(0, |l| self.pool[l].size);
        let right = self.pool[id].right.map_or(0, |r| self.pool[r].size);
        self.pool[id].size = 1 + left + right;
        X::refresh(&mut self.pool, id);
    }

    /// Repairs aggregates bottom-up from `from` to the root.
    pub(crate) fn refresh_to_root(&mut self, mut from: Option<NodeId>) {
        while let Some(id) = from {
            self.refresh(id);
            from = self.pool[id].parent;
        }
    }

    /// Left rotation around `x`: its right child rises, `x` sinks to the
    /// left, and the child's left subtree switches sides.  Aggregates are
    /// repaired on exactly the two nodes whose child sets changed.
    fn rotate_left(&mut self, x: NodeId) {
        let y = self.pool[x].right.expect("left rotation requires a right child");
        let across = self.pool[y].left;
        self.pool[x].right = across;
        if let Some(b) = across {
            self.pool[b].parent = Some(x);
        }
        let xp = self.pool[x].parent;
        self.pool[y].parent = xp;
        match xp {
            None => self.root = Some(y),
            Some(p) => {
                if self.pool[p].left == Some(x) {
                    self.pool[p].left = Some(y);
                } else {
                    self.pool[p].right = Some(y);
                }
            }
        }
        self.pool[y].left = Some(x);
        self.pool[x].parent = Some(y);
        self.refresh(x);
        self.refresh(y);
    }

    /// Mirror of [`Tree::rotate_left`].
    fn rotate_right(&mut self, x: NodeId) {
        let y = self.pool[x].left.expect("right rotation requires a left child");
        let across = self.pool[y].right;
        self.pool[x].left = across;
        if let Some(b) = across {
            self.pool[b].parent = Some(x);
        }
        let xp = self.pool[x].parent;
        self.pool[y].parent = xp;
        match xp {
            None => self.root = Some(y),
            Some(p) => {
                if self.pool[p].left == Some(x) {
                    self.pool[p].left = Some(y);
                } else {
                    self.pool[p].right = Some(y);
                }
            }
        }
        self.pool[y].right = Some(x);
        self.pool[x].parent = Some(y);
        self.refresh(x);
        self.refresh(y);
    }

    /// Recolor/rotate cascade after inserting the red leaf `z`.
    fn insert_fixup(&mut self, mut z: NodeId) {
        loop {
            let Some(p) = self.pool[z].parent else { break };
            if self.pool[p].color == Color::Black {
                break;
            }
            // a red parent is never the root, so the grandparent exists
            let g = self.pool[p].parent.expect("red parent has a parent");
            if self.pool[g].left == Some(p) {
                match self.pool[g].right {
                    Some(u) if self.pool[u].color == Color::Red => {
                        self.pool[p].color = Color::Black;
                        self.pool[u].color = Color::Black;
                        self.pool[g].color = Color::Red;
                        z = g;
                    }
                    _ => {
                        if self.pool[p].right == Some(z) {
                            z = p;
                            self.rotate_left(z);
                        }
                        let p = self.pool[z].parent.expect("parent survives the rotation");
                        let g = self.pool[p].parent.expect("grandparent survives the rotation");
                        self.pool[p].color = Color::Black;
                        self.pool[g].color = Color::Red;
                        self.rotate_right(g);
                    }
                }
            } else {
                match self.pool[g].left {
                    Some(u) if self.pool[u].color == Color::Red => {
                        self.pool[p].color = Color::Black;
                        self.pool[u].color = Color::Black;
                        self.pool[g].color = Color::Red;
                        z = g;
                    }
                    _ => {
                        if self.pool[p].left == Some(z) {
                            z = p;
                            self.rotate_right(z);
                        }
                        let p = self.pool[z].parent.expect("parent survives the rotation");
                        let g = self.pool[p].parent.expect("grandparent survives the rotation");
                        self.pool[p].color = Color::Black;
                        self.pool[g].color = Color::Red;
                        self.rotate_left(g);
                    }
                }
            }
        }
        if let Some(r) = self.root {
            self.pool[r].color = Color::Black;
        }
    }

    /// Repairs the black-height deficit left by unlinking a black node.
    /// `x` is the (possibly absent) child that replaced it; `parent` its
    /// parent, tracked separately because `x` may be absent.
    fn remove_fixup(&mut self, mut x: Option<NodeId>, mut parent: Option<NodeId>) {
        while x != self.root && !self.is_red(x) {
            let Some(p) = parent else { break };
            if self.pool[p].left == x {
                let mut s = self.pool[p].right.expect("short side has a sibling");
                if self.pool[s].color == Color::Red {
                    // reduce to the black-sibling cases
                    self.pool[s].color = Color::Black;
                    self.pool[p].color = Color::Red;
                    self.rotate_left(p);
                    s = self.pool[p].right.expect("rotation leaves a sibling");
                }
                if !self.is_red(self.pool[s].left) && !self.is_red(self.pool[s].right) {
                    self.pool[s].color = Color::Red;
                    x = Some(p);
                    parent = self.pool[p].parent;
                } else {
                    if !self.is_red(self.pool[s].right) {
                        let sl = self.pool[s].left.expect("red near nephew");
                        self.pool[sl].color = Color::Black;
                        self.pool[s].color = Color::Red;
                        self.rotate_right(s);
                        s = self.pool[p].right.expect("rotation leaves a sibling");
                    }
                    self.pool[s].color = self.pool[p].color;
                    self.pool[p].color = Color::Black;
                    if let Some(sr) = self.pool[s].right {
                        self.pool[sr].color = Color::Black;
                    }
                    self.rotate_left(p);
                    x = self.root;
                    parent = None;
                }
            } else {
                let mut s = self.pool[p].left.expect("short side has a sibling");
                if self.pool[s].color == Color::Red {
                    self.pool[s].color = Color::Black;
                    self.pool[p].color = Color::Red;
                    self.rotate_right(p);
                    s = self.pool[p].left.expect("rotation leaves a sibling");
                }
                if !self.is_red(self.pool[s].left) && !self.is_red(self.pool[s].right) {
                    self.pool[s].color = Color::Red;
                    x = Some(p);
                    parent = self.pool[p].parent;
                } else {
                    if !self.is_red(self.pool[s].left) {
                        let sr = self.pool[s].right.expect("red near nephew");
                        self.pool[sr].color = Color::Black;
                        self.pool[s].color = Color::Red;
                        self.rotate_left(s);
                        s = self.pool[p].left.expect("rotation leaves a sibling");
                    }
                    self.pool[s].color = self.pool[p].color;
                    self.pool[p].color = Color::Black;
                    if let Some(sl) = self.pool[s].left {
                        self.pool[sl].color = Color::Black;
                    }
                    self.rotate_right(p);
                    x = self.root;
                    parent = None;
                }
            }
        }
        if let Some(id) = x {
            self.pool[id].color = Color::Black;
        }
    }

    /// Builds the tree from a sorted, comparator-distinct run in O(n).
    ///
    /// The tree must be empty.  An explicit workstack of half-open ranges
    /// places the middle element of each range as its subtree root; nodes
    /// on the deepest (partial) level are painted red and everything above
    /// is black, which satisfies every red-black invariant with maximal
    /// balance.  Sizes and augmentation aggregates are repaired in a
    /// bottom-up second pass, then the augmentation sees the whole sorted
    /// run at once (the linked variants thread their chain there).
    pub(crate) fn build_sorted(&mut self, items: Vec<(T, X)>) {
        debug_assert!(self.is_empty(), "bulk build requires an empty tree");
        let n = items.len();
        if n == 0 {
            return;
        }
        let mut ids = Vec::with_capacity(n);
        for (item, aug) in items {
            let mut node = Node::new(item);
            node.aug = aug;
            ids.push(self.pool.alloc(node));
        }

        // depth of the deepest level of a size-n middle-split tree
        let red_depth = (usize::BITS - (n + 1).leading_zeros() - 1) as usize;

        let mut order = Vec::with_capacity(n);
        let mut stack: Vec<(usize, usize, Option<NodeId>, usize, bool)> =
            vec![(0, n, None, 0, false)];
        while let Some((lo, hi, parent, depth, is_left)) = stack.pop() {
            if lo >= hi {
                continue;
            }
            let mid = lo + (hi - lo) / 2;
            let id = ids[mid];
            self.pool[id].parent = parent;
            self.pool[id].color = if depth == red_depth {
                Color::Red
            } else {
                Color::Black
            };
            match parent {
                None => self.root = Some(id),
                Some(p) => {
                    if is_left {
                        self.pool[p].left = Some(id);
                    } else {
                        self.pool[p].right = Some(id);
                    }
                }
            }
            order.push(id);
            stack.push((lo, mid, Some(id), depth + 1, true));
            stack.push((mid + 1, hi, Some(id), depth + 1, false));
        }

        // children precede parents when the preorder is replayed backwards
        for &id in order.iter().rev() {
            self.refresh(id);
        }
        X::built(&mut self.pool, &ids);

        self.min = Some(ids[0]);
        self.max = Some(ids[n - 1]);
        self.len = n;
    }

    /// Keeps exactly the elements accepted by `keep`, choosing between
    /// individual deletions and a rebuild of the kept run by estimated
    /// cost.  Returns whether the tree changed.
    pub(crate) fn retain_with<F>(&mut self, mut keep: F) -> bool
    where
        F: FnMut(&C, &T) -> bool,
    {
        if self.is_empty() {
            return false;
        }
        let mut flags: Vec<(NodeId, bool)> = Vec::with_capacity(self.len);
        let mut cur = self.min;
        while let Some(id) = cur {
            flags.push((id, keep(&self.cmp, &self.pool[id].item)));
            cur = self.successor(id);
        }
        let dropped = flags.iter().filter(|(_, kept)| !kept).count();
        if dropped == 0 {
            return false;
        }
        let kept = self.len - dropped;

        // ceil(log2(n + 1)): the per-deletion depth factor
        let depth = (usize::BITS - self.len.leading_zeros()) as usize;
        if dropped * depth <= kept {
            for (id, kept) in flags {
                if !kept {
                    self.remove_node(id);
                }
            }
        } else {
            self.root = None;
            self.min = None;
            self.max = None;
            self.len = 0;
            let mut survivors = Vec::with_capacity(kept);
            for (id, kept) in flags {
                let node = self.pool.release(id);
                if kept {
                    survivors.push((node.item, node.aug));
                }
            }
            self.build_sorted(survivors);
        }
        true
    }

    /// Descends under the direction of `oracle`; see
    /// [`RBTree::search`](crate::RBTree::search) for the step semantics.
    pub(crate) fn search_by<F>(&self, mut oracle: F) -> Option<&T>
    where
        F: FnMut(&C, &T, Option<&T>, Option<&T>) -> SearchStep,
    {
        let mut cur = self.root;
        while let Some(id) = cur {
            let node = &self.pool[id];
            let left = node.left.map(|l| &self.pool[l].item);
            let right = node.right.map(|r| &self.pool[r].item);
            match oracle(&self.cmp, &node.item, left, right) {
                SearchStep::GoLeft => cur = node.left,
                SearchStep::GoRight => cur = node.right,
                SearchStep::Current => return Some(&node.item),
                SearchStep::Left => return left,
                SearchStep::Right => return right,
                SearchStep::Stop => return None,
            }
        }
        None
    }

    // ------------------------------------------------------------------
    // Invariant validation (debug builds and tests)
    // ------------------------------------------------------------------

    pub(crate) fn check(&self) -> bool {
        let a = self.is_bst();
        if !a {
            eprintln!("Not in symmetric order");
        }
        let b = self.is_size_consistent();
        if !b {
            eprintln!("Subtree sizes not consistent");
        }
        let c = self.is_red_safe();
        if !c {
            eprintln!("Red invariant violated");
        }
        let d = self.is_balanced();
        if !d {
            eprintln!("Black height not uniform");
        }
        let e = self.is_header_consistent();
        if !e {
            eprintln!("Header or parent links not consistent");
        }
        a && b && c && d && e
    }

    fn is_bst(&self) -> bool {
        self.is_bst_in(self.root, None, None)
    }

    fn is_bst_in(&self, x: Option<NodeId>, lo: Option<&T>, hi: Option<&T>) -> bool {
        let Some(id) = x else { return true };
        let item = &self.pool[id].item;
        if let Some(lo) = lo
            && self.cmp.cmp(item, lo) != Ordering::Greater
        {
            return false;
        }
        if let Some(hi) = hi
            && self.cmp.cmp(item, hi) != Ordering::Less
        {
            return false;
        }
        self.is_bst_in(self.pool[id].left, lo, Some(item))
            && self.is_bst_in(self.pool[id].right, Some(item), hi)
    }

    fn is_size_consistent(&self) -> bool {
        self.is_size_consistent_in(self.root)
    }

    fn is_size_consistent_in(&self, x: Option<NodeId>) -> bool {
        let Some(id) = x else { return true };
        let left = self.pool[id].left.map_or(0, |l| self.pool[l].size);
        let right = self.pool[id].right.map_or(0, |r| self.pool[r].size);
        if self.pool[id].size != left + right + 1 {
            return false;
        }
        self.is_size_consistent_in(self.pool[id].left)
            && self.is_size_consistent_in(self.pool[id].right)
    }

    fn is_red_safe(&self) -> bool {
        if self.is_red(self.root) {
            return false;
        }
        self.is_red_safe_in(self.root)
    }

    fn is_red_safe_in(&self, x: Option<NodeId>) -> bool {
        let Some(id) = x else { return true };
        if self.pool[id].color == Color::Red
            && (self.is_red(self.pool[id].left) || self.is_red(self.pool[id].right))
        {
            return false;
        }
        self.is_red_safe_in(self.pool[id].left) && self.is_red_safe_in(self.pool[id].right)
    }

    fn is_balanced(&self) -> bool {
        let mut black = 0isize;
        let mut x = self.root;
        while let Some(id) = x {
            if self.pool[id].color == Color::Black {
                black += 1;
            }
            x = self.pool[id].left;
        }
        self.is_balanced_in(self.root, black)
    }

    fn is_balanced_in(&self, x: Option<NodeId>, black: isize) -> bool {
        let Some(id) = x else { return black == 0 };
        let black = black - (self.pool[id].color == Color::Black) as isize;
        self.is_balanced_in(self.pool[id].left, black)
            && self.is_balanced_in(self.pool[id].right, black)
    }

    fn is_header_consistent(&self) -> bool {
        match self.root {
            None => self.min.is_none() && self.max.is_none() && self.len == 0,
            Some(r) => {
                self.pool[r].parent.is_none()
                    && self.pool[r].size == self.len
                    && self.min == Some(self.min_in(r))
                    && self.max == Some(self.max_in(r))
                    && self.parents_ok(r)
            }
        }
    }

    fn parents_ok(&self, id: NodeId) -> bool {
        for child in [self.pool[id].left, self.pool[id].right] {
            if let Some(c) = child {
                if self.pool[c].parent != Some(id) || !self.parents_ok(c) {
                    return false;
                }
            }
        }
        true
    }
}

/// Shared engine of the bidirectional list iterators.
///
/// The cursor sits in a gap between elements: `next` is the element just
/// after the gap (`None` at the back).  Node ids are stable across the
/// rebalancing that a removal triggers, so holding ids across mutations of
/// *this* cursor is sound; the borrow on the tree keeps every other mutator
/// out.
pub(crate) struct CursorCore<'a, T, X: Augment, C> {
    tree: &'a mut Tree<T, X, C>,
    next: Option<NodeId>,
    last: Option<NodeId>,
}

impl<'a, T, X: Augment, C: Comparator<T>> CursorCore<'a, T, X, C> {
    pub(crate) fn new(tree: &'a mut Tree<T, X, C>, from_start: bool) -> Self {
        let next = if from_start { tree.min } else { None };
        CursorCore {
            tree,
            next,
            last: None,
        }
    }

    /// Yields the element after the gap and moves the gap past it.
    pub(crate) fn next(&mut self) -> Option<&T> {
        let id = self.next?;
        self.last = Some(id);
        self.next = self.tree.successor(id);
        Some(&self.tree.pool[id].item)
    }

    /// Yields the element before the gap and moves the gap before it.
    pub(crate) fn prev(&mut self) -> Option<&T> {
        let id = match self.next {
            Some(n) => self.tree.predecessor(n),
            None => self.tree.max,
        }?;
        self.last = Some(id);
        self.next = Some(id);
        Some(&self.tree.pool[id].item)
    }

    /// Removes the last yielded element, repositioning the gap at that
    /// element's successor.  `None` if nothing was yielded since the last
    /// removal.
    pub(crate) fn remove(&mut self) -> Option<T> {
        let id = self.last.take()?;
        if self.next == Some(id) {
            self.next = self.tree.successor(id);
        }
        let item = self.tree.remove_node(id);
        debug_assert!(self.tree.check());
        Some(item)
    }
}
