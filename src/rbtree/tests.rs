use super::{RBTree, SearchStep};
use crate::compare::{CmpFn, Comparator};
use crate::error::TreeError;
use rand::seq::SliceRandom;
use std::cmp::Ordering;

#[test]
fn insertion_and_iteration() {
    let mut t = RBTree::new();
    for x in [5, 1, 4, 2, 3] {
        assert!(t.add(x));
    }
    assert_eq!(t.len(), 5);
    assert_eq!(t.iter().copied().collect::<Vec<i32>>(), vec![1, 2, 3, 4, 5]);
    assert_eq!(t.get(0), Ok(&1));
    assert_eq!(t.get(4), Ok(&5));
    // the root of a balanced 5-node tree is one of the middle keys
    let root = *t.root().unwrap();
    assert!((2..=4).contains(&root));
    assert!(t.t.check());
}

#[test]
fn deletion_with_two_children() {
    let mut t = RBTree::new();
    for x in [10, 5, 15, 3, 7, 12, 20] {
        assert!(t.add(x));
    }
    assert!(t.remove(&10));
    assert!(!t.contains(&10));
    assert!(t.contains_all(&[3, 5, 7, 12, 15, 20]));
    assert_eq!(t.len(), 6);
    assert_eq!(t.min(), Some(&3));
    assert_eq!(t.max(), Some(&20));
    assert!(t.t.check());
}

#[test]
fn successor_swap_adjacent_and_distant() {
    // a 7-element bulk build is the perfect tree rooted at 4
    let mut t: RBTree<i32> = (1..=7).collect();
    assert_eq!(t.root(), Some(&4));

    // removing 6 swaps it with its own right child 7 (the adjacent case)
    assert!(t.remove(&6));
    assert!(t.t.check());
    assert_eq!(t.iter().copied().collect::<Vec<i32>>(), vec![1, 2, 3, 5, 7]);

    // removing the root exercises the general successor swap
    let root = *t.root().unwrap();
    assert!(t.remove(&root));
    assert!(t.t.check());
    assert_eq!(t.len(), 4);
    assert!(!t.contains(&root));
}

#[test]
fn rank_stability_under_removal() {
    let mut keys: Vec<i32> = (0..1000).collect();
    keys.shuffle(&mut rand::rng());
    let mut t = RBTree::new();
    for &k in &keys {
        assert!(t.add(k));
    }
    for i in 0..1000 {
        assert_eq!(t.get(i as usize), Ok(&i));
        assert_eq!(t.rank(&i), i as usize);
    }
    for k in (0..1000).step_by(2) {
        assert!(t.remove(&k));
    }
    assert_eq!(t.len(), 500);
    for i in 0..500 {
        assert_eq!(t.get(i as usize), Ok(&(2 * i + 1)));
    }
    assert!(t.t.check());
}

#[test]
fn random_workload_keeps_invariants() {
    let mut t = RBTree::new();
    let mut shadow = std::collections::BTreeSet::new();
    for _ in 0..2000 {
        let k: i16 = rand::random_range(-100..100);
        if rand::random_range(0..3) == 0 {
            assert_eq!(t.remove(&k), shadow.remove(&k));
        } else {
            assert_eq!(t.add(k), shadow.insert(k));
        }
        assert_eq!(t.len(), shadow.len());
    }
    assert!(t.t.check());
    let got: Vec<i16> = t.iter().copied().collect();
    let want: Vec<i16> = shadow.iter().copied().collect();
    assert_eq!(got, want);
    // rank/select round trip
    for (i, k) in want.iter().enumerate() {
        assert_eq!(t.get(i), Ok(k));
        assert_eq!(t.rank(k), i);
    }
}

#[test]
fn neighbors_are_inverse() {
    let t: RBTree<i32> = [10, 20, 30, 40, 50].into_iter().collect();
    assert_eq!(t.next(&10), Some(&20));
    assert_eq!(t.prev(&20), Some(&10));
    assert_eq!(t.next(&50), None);
    assert_eq!(t.prev(&10), None);
    // probes between and outside the stored keys
    assert_eq!(t.next(&25), Some(&30));
    assert_eq!(t.prev(&25), Some(&20));
    assert_eq!(t.next(&99), None);
    assert_eq!(t.prev(&-1), Some(&10));
    // next . prev and prev . next are identities on interior elements
    for k in [20, 30, 40] {
        assert_eq!(t.prev(t.next(&k).unwrap()), Some(&k));
        assert_eq!(t.next(t.prev(&k).unwrap()), Some(&k));
    }
}

#[test]
fn idempotent_add_and_remove() {
    let mut t = RBTree::new();
    assert!(t.add(7));
    assert!(!t.add(7));
    assert_eq!(t.len(), 1);
    assert!(t.remove(&7));
    assert!(!t.remove(&7));
    assert!(t.is_empty());
}

#[test]
fn bulk_build_equals_distinct_set() {
    let mut input = Vec::new();
    for _ in 0..500 {
        input.push(rand::random_range(0i32..120));
    }
    let distinct: Vec<i32> = {
        let set: std::collections::BTreeSet<i32> = input.iter().copied().collect();
        set.into_iter().collect()
    };
    let t: RBTree<i32> = input.into_iter().collect();
    assert!(t.t.check());
    assert_eq!(t.len(), distinct.len());
    assert_eq!(t.iter().copied().collect::<Vec<i32>>(), distinct);
    assert_eq!(t.min(), distinct.first());
    assert_eq!(t.max(), distinct.last());
    // a bulk-built tree is maximally balanced
    let bound = (usize::BITS - t.len().leading_zeros()) as isize + 1;
    assert!(t.height() <= bound);
}

#[test]
fn empty_tree_queries() {
    let t: RBTree<i32> = RBTree::new();
    assert!(t.is_empty());
    assert_eq!(t.min(), None);
    assert_eq!(t.max(), None);
    assert_eq!(t.root(), None);
    assert_eq!(t.next(&0), None);
    assert_eq!(t.prev(&0), None);
    assert_eq!(t.height(), -1);
    assert!(matches!(t.get(0), Err(TreeError::OutOfRange(_))));
}

#[test]
fn get_rejects_out_of_range() {
    let t: RBTree<i32> = (0..5).collect();
    assert_eq!(t.get(4), Ok(&4));
    assert!(matches!(t.get(5), Err(TreeError::OutOfRange(_))));
    assert!(matches!(t.get(usize::MAX), Err(TreeError::OutOfRange(_))));
}

#[test]
fn queue_facade() {
    let mut t = RBTree::new();
    assert_eq!(t.poll(), None);
    assert_eq!(t.peek(), None);
    assert!(matches!(t.element(), Err(TreeError::NoSuchElement(_))));
    assert!(matches!(t.remove_first(), Err(TreeError::NoSuchElement(_))));

    assert!(t.offer(3));
    assert!(t.offer(1));
    assert!(t.offer(2));
    assert!(!t.offer(1));
    assert_eq!(t.peek(), Some(&1));
    assert_eq!(t.element(), Ok(&1));
    assert_eq!(t.poll(), Some(1));
    assert_eq!(t.remove_first(), Ok(2));
    assert_eq!(t.poll(), Some(3));
    assert_eq!(t.poll(), None);
}

#[test]
fn add_all_uses_bulk_build_when_empty() {
    let mut t = RBTree::new();
    assert!(t.add_all(vec![9, 3, 3, 7, 1, 9]));
    assert_eq!(t.iter().copied().collect::<Vec<i32>>(), vec![1, 3, 7, 9]);
    assert!(t.t.check());

    // non-empty target falls back to one-by-one insertion
    assert!(t.add_all(vec![2, 7]));
    assert_eq!(t.iter().copied().collect::<Vec<i32>>(), vec![1, 2, 3, 7, 9]);
    assert!(!t.add_all(vec![1, 9]));
}

#[test]
fn remove_all_reports_mutation() {
    let mut t: RBTree<i32> = (0..10).collect();
    assert!(t.remove_all(&[2, 4, 99]));
    assert!(!t.remove_all(&[2, 4, 99]));
    assert_eq!(t.len(), 8);
}

#[test]
fn retain_all_deletion_path() {
    // few casualties: individual deletion is the cheaper strategy
    let mut t: RBTree<i32> = (0..200).collect();
    let keep: Vec<i32> = (0..200).filter(|k| k % 100 != 7).collect();
    assert!(t.retain_all(&keep));
    assert_eq!(t.len(), 198);
    assert!(!t.contains(&7));
    assert!(!t.contains(&107));
    assert!(t.t.check());
    assert!(!t.retain_all(&keep));
}

#[test]
fn retain_all_rebuild_path() {
    // mass extinction: rebuilding from the kept run is cheaper
    let mut t: RBTree<i32> = (0..200).collect();
    let keep = [5, 50, 150, 500];
    assert!(t.retain_all(&keep));
    assert_eq!(t.iter().copied().collect::<Vec<i32>>(), vec![5, 50, 150]);
    assert!(t.t.check());
}

#[test]
fn retain_all_empty_keep() {
    let mut t: RBTree<i32> = (0..10).collect();
    assert!(t.retain_all(&[]));
    assert!(t.is_empty());
    assert!(!t.retain_all(&[]));
}

#[test]
fn cursor_walks_both_ways() {
    let mut t: RBTree<i32> = (1..=5).collect();
    let mut cur = t.cursor();
    assert_eq!(cur.next(), Some(&1));
    assert_eq!(cur.next(), Some(&2));
    assert_eq!(cur.prev(), Some(&2));
    assert_eq!(cur.prev(), Some(&1));
    assert_eq!(cur.prev(), None);

    let mut back = t.cursor_back();
    assert_eq!(back.prev(), Some(&5));
    assert_eq!(back.next(), Some(&5));
    assert_eq!(back.next(), None);
}

#[test]
fn cursor_remove_repositions() {
    let mut t: RBTree<i32> = (1..=5).collect();
    let mut cur = t.cursor();
    assert_eq!(cur.remove(), None); // nothing yielded yet
    cur.next();
    cur.next();
    assert_eq!(cur.remove(), Some(2)); // last yielded moving forward
    assert_eq!(cur.next(), Some(&3)); // cursor sits at the successor
    assert_eq!(cur.remove(), Some(3));
    assert_eq!(cur.remove(), None);
    assert_eq!(cur.prev(), Some(&1));
    assert_eq!(cur.remove(), Some(1)); // last yielded moving backward
    assert_eq!(cur.next(), Some(&4));
    drop(cur);
    assert_eq!(t.iter().copied().collect::<Vec<i32>>(), vec![4, 5]);
    assert!(t.t.check());
}

#[test]
fn oracle_search_recovers_every_element() {
    let t: RBTree<i32> = [10, 20, 30, 40, 50].into_iter().collect();
    for target in [10, 20, 30, 40, 50] {
        let found = t.search(|_, cur, _, _| match target.cmp(cur) {
            Ordering::Less => SearchStep::GoLeft,
            Ordering::Greater => SearchStep::GoRight,
            Ordering::Equal => SearchStep::Current,
        });
        assert_eq!(found, Some(&target));
    }
    // a miss runs off an absent subtree and comes back empty
    let missing = t.search(|_, cur, _, _| match 35.cmp(cur) {
        Ordering::Less => SearchStep::GoLeft,
        Ordering::Greater => SearchStep::GoRight,
        Ordering::Equal => SearchStep::Current,
    });
    assert_eq!(missing, None);
}

#[test]
fn oracle_terminal_steps() {
    // the 5-element bulk build puts 30 at the root with 20 on its left
    let t: RBTree<i32> = (1..=5).map(|k| k * 10).collect();
    assert_eq!(t.root(), Some(&30));
    assert_eq!(t.search(|_, _, _, _| SearchStep::Left), Some(&20));
    assert_eq!(t.search(|_, _, _, _| SearchStep::Right), Some(&50));
    assert_eq!(t.search(|_, cur, _, _| {
        if *cur == 30 { SearchStep::GoLeft } else { SearchStep::Current }
    }), Some(&20));
    assert_eq!(t.search(|_, _, _, _| SearchStep::Stop), None);

    // terminal Left at a leaf reports the absent child
    let t1: RBTree<i32> = std::iter::once(1).collect();
    assert_eq!(t1.search(|_, _, _, _| SearchStep::Left), None);
}

#[test]
fn oracle_sees_comparator_and_children() {
    let t: RBTree<i32> = (1..=5).map(|k| k * 10).collect();
    let found = t.search(|cmp, cur, left, right| {
        // drift toward the largest payload the oracle can see
        let mut best = cur;
        for side in [left, right].into_iter().flatten() {
            if cmp.cmp(side, best) == Ordering::Greater {
                best = side;
            }
        }
        if std::ptr::eq(best, cur) {
            SearchStep::Current
        } else if right.is_some_and(|r| std::ptr::eq(best, r)) {
            SearchStep::GoRight
        } else {
            SearchStep::GoLeft
        }
    });
    assert_eq!(found, Some(&50));
}

#[test]
fn binary_search_returns_stored_payload() {
    // payloads compare on the key field only; satellite data rides along
    let cmp = CmpFn(|a: &(u32, &str), b: &(u32, &str)| a.0.cmp(&b.0));
    let mut t = RBTree::with_comparator(cmp);
    assert!(t.add((1, "one")));
    assert!(t.add((2, "two")));
    assert!(!t.add((2, "deux"))); // equal key: rejected, tree unchanged
    let hit = t.binary_search(&(2, "")).unwrap();
    assert_eq!(hit.1, "two");
    assert_eq!(t.binary_search(&(9, "")), None);
}

#[test]
fn reverse_comparator_orders_descending() {
    let cmp = CmpFn(|a: &i32, b: &i32| b.cmp(a));
    let t = RBTree::from_items(cmp, vec![1, 5, 3, 2, 4]);
    assert_eq!(t.iter().copied().collect::<Vec<i32>>(), vec![5, 4, 3, 2, 1]);
    assert_eq!(t.min(), Some(&5));
    assert_eq!(t.max(), Some(&1));
    assert!(t.t.check());
}

#[test]
fn into_iter_drains_sorted() {
    let t: RBTree<i32> = [4, 1, 3, 2].into_iter().collect();
    assert_eq!(t.into_iter().collect::<Vec<i32>>(), vec![1, 2, 3, 4]);
}

#[test]
fn iter_is_double_ended() {
    let t: RBTree<i32> = (1..=4).collect();
    assert_eq!(t.iter().rev().copied().collect::<Vec<i32>>(), vec![4, 3, 2, 1]);
    let mut it = t.iter();
    assert_eq!(it.len(), 4);
    assert_eq!(it.next(), Some(&1));
    assert_eq!(it.next_back(), Some(&4));
    assert_eq!(it.next(), Some(&2));
    assert_eq!(it.next_back(), Some(&3));
    assert_eq!(it.next(), None);
}

#[test]
fn clear_releases_everything() {
    let mut t: RBTree<i32> = (0..100).collect();
    t.clear();
    assert!(t.is_empty());
    assert_eq!(t.min(), None);
    assert!(t.add(42));
    assert_eq!(t.len(), 1);
    assert!(t.t.check());
}

#[test]
fn debug_formats_as_set() {
    let t: RBTree<i32> = [2, 1, 3].into_iter().collect();
    assert_eq!(format!("{:?}", t), "{1, 2, 3}");
}
