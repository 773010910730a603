//! Payload comparators.
//!
//! The trees in this crate never require `T: Ord`.  Ordering and equality
//! are defined solely by a comparator supplied at construction time, so a
//! payload can carry satellite data that takes no part in the comparison
//! ("map" behavior is obtained by comparing on the key part only).

use std::cmp::Ordering;

/// Payload comparator.
///
/// This relation must provide a total order on the payload space, and it
/// must be deterministic: two payloads compare the same way every time.
/// Payloads that compare `Equal` are the same element as far as a tree is
/// concerned, regardless of any satellite data they carry.
pub trait Comparator<T> {
    /// Compare payloads `a` and `b`.
    fn cmp(&self, a: &T, b: &T) -> Ordering;
}

/// Comparator backed by the payload's own [`Ord`] instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Natural;

impl<T: Ord> Comparator<T> for Natural {
    fn cmp(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

/// Adapter turning a comparison closure into a [`Comparator`].
///
/// ```
/// use rbtree_rs::{CmpFn, RBTree};
///
/// // order pairs by their first component only
/// let mut t = RBTree::with_comparator(CmpFn(|a: &(i32, &str), b: &(i32, &str)| a.0.cmp(&b.0)));
/// assert!(t.add((2, "two")));
/// assert!(!t.add((2, "TWO"))); // same key, not inserted
/// ```
#[derive(Clone, Copy, Debug)]
pub struct CmpFn<F>(pub F);

impl<T, F> Comparator<T> for CmpFn<F>
where
    F: Fn(&T, &T) -> Ordering,
{
    fn cmp(&self, a: &T, b: &T) -> Ordering {
        (self.0)(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_follows_ord() {
        assert_eq!(Comparator::cmp(&Natural, &1, &2), Ordering::Less);
        assert_eq!(Comparator::cmp(&Natural, &2, &2), Ordering::Equal);
        assert_eq!(Comparator::cmp(&Natural, &3, &2), Ordering::Greater);
    }

    #[test]
    fn cmp_fn_wraps_closure() {
        let rev = CmpFn(|a: &i32, b: &i32| b.cmp(a));
        assert_eq!(rev.cmp(&1, &2), Ordering::Greater);
        assert_eq!(rev.cmp(&2, &1), Ordering::Less);
    }
}
