use super::{Bag, LinkedRBTreeBag, RBTreeBag, bag_consistent};
use crate::error::TreeError;
use crate::linked::{Linked, NodeRef, chain_consistent};
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[test]
fn multiplicities_accumulate() {
    let mut bag = RBTreeBag::new();
    assert!(bag.add_times('a', 3).unwrap());
    assert!(bag.add('b'));
    assert!(bag.add_times('a', 2).unwrap());
    assert_eq!(bag.count(&'a'), 5);
    assert_eq!(bag.count(&'b'), 1);
    assert_eq!(bag.len(), 2);
    assert_eq!(bag.bag_size(), 6);

    assert!(bag.remove_times(&'a', 4).unwrap());
    assert_eq!(bag.count(&'a'), 1);
    assert_eq!(bag.bag_size(), 2);

    // Set-form removal takes every remaining occurrence
    assert!(bag.remove(&'a'));
    assert_eq!(bag.count(&'a'), 0);
    assert_eq!(bag.len(), 1);
    assert_eq!(bag.bag_size(), 1);
}

#[test]
fn zero_multiplicity_is_invalid() {
    let mut bag = RBTreeBag::new();
    bag.add('x');
    assert!(matches!(
        bag.add_times('y', 0),
        Err(TreeError::InvalidArgument(_))
    ));
    assert!(matches!(
        bag.remove_times(&'x', 0),
        Err(TreeError::InvalidArgument(_))
    ));
    // nothing changed
    assert_eq!(bag.len(), 1);
    assert_eq!(bag.bag_size(), 1);
    assert!(!bag.contains(&'y'));
}

#[test]
fn removing_an_absent_element_reports_false() {
    let mut bag: RBTreeBag<i32> = RBTreeBag::new();
    assert!(!bag.remove_times(&7, 3).unwrap());
    assert!(!bag.remove(&7));
}

#[test]
fn exhausting_a_count_removes_the_node() {
    let mut bag = RBTreeBag::new();
    for k in [5, 1, 9, 3, 7] {
        bag.add_times(k, 2).unwrap();
    }
    // an over-large multiplicity clamps to the count
    assert!(bag.remove_times(&5, 99).unwrap());
    assert!(!bag.contains(&5));
    assert_eq!(bag.len(), 4);
    assert_eq!(bag.bag_size(), 8);
    assert!(bag.t.check());
    assert!(bag_consistent(&bag.t, bag.total));
}

#[test]
fn random_workload_keeps_bag_sums() {
    let mut bag = RBTreeBag::new();
    let mut shadow: BTreeMap<i32, usize> = BTreeMap::new();
    for _ in 0..1500 {
        let k = rand::random_range(0..40);
        let n = rand::random_range(1..5);
        if rand::random_range(0..3) == 0 {
            let had = shadow.get(&k).copied().unwrap_or(0);
            assert_eq!(bag.remove_times(&k, n).unwrap(), had > 0);
            if had > n {
                shadow.insert(k, had - n);
            } else {
                shadow.remove(&k);
            }
        } else {
            bag.add_times(k, n).unwrap();
            *shadow.entry(k).or_insert(0) += n;
        }
        assert_eq!(bag.len(), shadow.len());
        assert_eq!(bag.bag_size(), shadow.values().sum::<usize>());
    }
    assert!(bag.t.check());
    assert!(bag_consistent(&bag.t, bag.total));
    for (k, n) in &shadow {
        assert_eq!(bag.count(k), *n);
    }
    let listed: Vec<(i32, usize)> = bag.counts().map(|(k, n)| (*k, n)).collect();
    let expected: Vec<(i32, usize)> = shadow.into_iter().collect();
    assert_eq!(listed, expected);
}

#[test]
fn from_items_builds_the_multiset() {
    let bag: RBTreeBag<char> = "abracadabra".chars().collect();
    assert_eq!(bag.count(&'a'), 5);
    assert_eq!(bag.count(&'b'), 2);
    assert_eq!(bag.count(&'r'), 2);
    assert_eq!(bag.count(&'c'), 1);
    assert_eq!(bag.count(&'d'), 1);
    assert_eq!(bag.len(), 5);
    assert_eq!(bag.bag_size(), 11);
    assert_eq!(bag.min(), Some(&'a'));
    assert_eq!(bag.max(), Some(&'r'));
    assert!(bag.t.check());
    assert!(bag_consistent(&bag.t, bag.total));
}

#[test]
fn bag_wide_add_and_remove() {
    let mut a: RBTreeBag<i32> = [1, 1, 2].into_iter().collect();
    let b: RBTreeBag<i32> = [1, 2, 2, 3].into_iter().collect();

    assert!(a.add_all(&b));
    assert_eq!(a.count(&1), 3);
    assert_eq!(a.count(&2), 3);
    assert_eq!(a.count(&3), 1);
    assert_eq!(a.bag_size(), 7);

    assert!(a.remove_all(&b));
    assert_eq!(a.count(&1), 2);
    assert_eq!(a.count(&2), 1);
    assert_eq!(a.count(&3), 0);
    assert_eq!(a.len(), 2);

    // an empty argument changes nothing
    let empty: RBTreeBag<i32> = RBTreeBag::new();
    assert!(!a.add_all(&empty));
    assert!(!a.remove_all(&empty));
}

#[test]
fn add_all_bulk_builds_into_an_empty_bag() {
    let source: RBTreeBag<i32> = [4, 4, 1, 3, 3, 3].into_iter().collect();
    let mut target: RBTreeBag<i32> = RBTreeBag::new();
    assert!(target.add_all(&source));
    assert_eq!(target.count(&3), 3);
    assert_eq!(target.count(&4), 2);
    assert_eq!(target.count(&1), 1);
    assert_eq!(target.bag_size(), 6);
    assert!(target.t.check());
    assert!(bag_consistent(&target.t, target.total));
}

#[test]
fn retain_all_trims_to_the_other_bag() {
    let mut a: RBTreeBag<i32> = [1, 1, 1, 2, 2, 3, 4, 4].into_iter().collect();
    let b: RBTreeBag<i32> = [1, 2, 2, 2, 4, 4].into_iter().collect();
    // 1: 3 > 1 -> trim to 1;  2: 2 <= 3 -> unchanged;
    // 3: absent in b -> removed;  4: 2 <= 2 -> unchanged
    assert!(a.retain_all(&b));
    assert_eq!(a.count(&1), 1);
    assert_eq!(a.count(&2), 2);
    assert_eq!(a.count(&3), 0);
    assert_eq!(a.count(&4), 2);
    assert_eq!(a.len(), 3);
    assert_eq!(a.bag_size(), 5);
    assert!(!a.retain_all(&b));
}

#[test]
fn count_keyed_bulk_operations() {
    let mut bag: RBTreeBag<&str> = RBTreeBag::new();
    // empty target: bulk build, merging equal keys
    assert!(
        bag.add_all_counts(vec![("b", 2), ("a", 1), ("b", 1)])
            .unwrap()
    );
    assert_eq!(bag.count(&"a"), 1);
    assert_eq!(bag.count(&"b"), 3);
    assert_eq!(bag.bag_size(), 4);

    // non-empty target: per-key addition
    assert!(bag.add_all_counts(vec![("a", 2), ("c", 5)]).unwrap());
    assert_eq!(bag.count(&"a"), 3);
    assert_eq!(bag.count(&"c"), 5);

    let removals = [("a", 1usize), ("c", 9)];
    assert!(
        bag.remove_all_counts(removals.iter().map(|(k, n)| (k, *n)))
            .unwrap()
    );
    assert_eq!(bag.count(&"a"), 2);
    assert!(!bag.contains(&"c"));

    // a zero multiplicity fails before anything is applied
    let before = bag.bag_size();
    assert!(matches!(
        bag.add_all_counts(vec![("x", 1), ("y", 0)]),
        Err(TreeError::InvalidArgument(_))
    ));
    assert!(!bag.contains(&"x"));
    assert_eq!(bag.bag_size(), before);
}

#[test]
fn clear_resets_counts() {
    let mut bag: RBTreeBag<i32> = [1, 1, 2].into_iter().collect();
    bag.clear();
    assert!(bag.is_empty());
    assert_eq!(bag.bag_size(), 0);
    assert!(bag.add(1));
    assert_eq!(bag.bag_size(), 1);
}

#[test]
fn debug_formats_as_count_map() {
    let bag: RBTreeBag<char> = "aab".chars().collect();
    assert_eq!(format!("{:?}", bag), "{'a': 2, 'b': 1}");
}

// ----------------------------------------------------------------------
// Linked bag
// ----------------------------------------------------------------------

#[derive(Clone, Debug)]
struct Item {
    key: i32,
    tag: &'static str,
    node: Option<NodeRef>,
}

impl Item {
    fn new(key: i32) -> Self {
        Item {
            key,
            tag: "",
            node: None,
        }
    }

    fn tagged(key: i32, tag: &'static str) -> Self {
        Item {
            key,
            tag,
            node: None,
        }
    }
}

impl Linked for Item {
    fn node(&self) -> Option<NodeRef> {
        self.node
    }
    fn set_node(&mut self, node: Option<NodeRef>) {
        self.node = node;
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Item {}

impl PartialOrd for Item {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Item {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

#[test]
fn linked_bag_counts_and_neighbors() {
    let mut bag = LinkedRBTreeBag::new();
    for k in [20, 10, 30, 20, 10, 20] {
        bag.add_times(Item::new(k), 1).unwrap();
    }
    assert_eq!(bag.len(), 3);
    assert_eq!(bag.bag_size(), 6);
    assert_eq!(bag.count(&Item::new(20)), 3);

    let ten = bag.min().unwrap();
    assert_eq!(ten.key, 10);
    assert_eq!(bag.next(ten).map(|x| x.key), Some(20));
    let twenty = bag.next(ten).unwrap();
    assert_eq!(bag.next(twenty).map(|x| x.key), Some(30));
    assert_eq!(bag.prev(twenty).map(|x| x.key), Some(10));
    assert!(bag.t.check());
    assert!(bag_consistent(&bag.t, bag.total));
    assert!(chain_consistent(&bag.t));
}

#[test]
fn linked_bag_rejects_bound_payloads() {
    let mut a = LinkedRBTreeBag::new();
    a.add_times(Item::new(1), 1).unwrap();
    let bound = a.min().unwrap().clone();
    let mut b = LinkedRBTreeBag::new();
    assert!(matches!(
        b.add_times(bound, 1),
        Err(TreeError::InvalidArgument(_))
    ));
    assert!(b.is_empty());
}

#[test]
fn linked_bag_swap_leaves_counts_in_place() {
    let mut bag = LinkedRBTreeBag::new();
    bag.add_times(Item::tagged(10, "low"), 4).unwrap();
    bag.add_times(Item::tagged(30, "high"), 1).unwrap();

    let a = bag.min().unwrap().clone();
    let b = bag.max().unwrap().clone();
    bag.swap(&a, &b, |x, y| std::mem::swap(&mut x.tag, &mut y.tag))
        .unwrap();

    // tags moved, multiplicities stayed with their keys
    assert_eq!(bag.min().unwrap().tag, "high");
    assert_eq!(bag.max().unwrap().tag, "low");
    assert_eq!(bag.count(&Item::new(10)), 4);
    assert_eq!(bag.count(&Item::new(30)), 1);
    assert_eq!(bag.bag_size(), 5);
}

#[test]
fn linked_bag_merge_bookkeeps_totals() {
    let mut bag = LinkedRBTreeBag::new();
    bag.add_times(Item::tagged(1, "old"), 3).unwrap();

    let merged = bag
        .merge(Item::tagged(1, "new"), |kept, incoming| {
            kept.tag = incoming.tag;
        })
        .unwrap();
    assert!(merged);
    assert_eq!(bag.count(&Item::new(1)), 3);
    assert_eq!(bag.bag_size(), 3);
    assert_eq!(bag.min().unwrap().tag, "new");

    let merged = bag.merge(Item::new(2), |_, _| unreachable!()).unwrap();
    assert!(!merged);
    assert_eq!(bag.count(&Item::new(2)), 1);
    assert_eq!(bag.bag_size(), 4);
    assert!(bag_consistent(&bag.t, bag.total));
    assert!(chain_consistent(&bag.t));
}

#[test]
fn linked_bag_add_all_severs_cloned_references() {
    let mut source = LinkedRBTreeBag::new();
    for k in [1, 2, 2, 3] {
        source.add_times(Item::new(k), 1).unwrap();
    }
    // empty target takes the bulk-build path
    let mut target = LinkedRBTreeBag::new();
    assert!(target.add_all(&source));
    assert_eq!(target.len(), 3);
    assert_eq!(target.bag_size(), 4);
    assert!(chain_consistent(&target.t));
    let one = target.min().unwrap();
    assert_eq!(target.next(one).map(|x| x.key), Some(2));

    // non-empty target inserts element by element, also from clones
    assert!(target.add_all(&source));
    assert_eq!(target.count(&Item::new(2)), 4);
    assert_eq!(target.bag_size(), 8);
    assert!(bag_consistent(&target.t, target.total));
}

#[test]
fn linked_bag_from_items_and_clear() {
    let bag =
        LinkedRBTreeBag::from_items(crate::compare::Natural, [2, 1, 2].map(Item::new)).unwrap();
    assert_eq!(bag.len(), 2);
    assert_eq!(bag.bag_size(), 3);
    assert!(chain_consistent(&bag.t));

    let mut bag = bag;
    bag.clear();
    assert!(bag.is_empty());
    assert_eq!(bag.bag_size(), 0);
    assert!(bag.add_times(Item::new(9), 2).unwrap());
    assert_eq!(bag.bag_size(), 2);
}
