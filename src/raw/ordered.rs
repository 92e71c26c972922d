use core::borrow::Borrow;
use core::cmp::Ordering;

use super::handle::Handle;
use super::node::{Augment, Side};
use super::tree::RawTree;

/// Comparator-driven search and insertion, layered over the positional
/// engine. Nothing here touches colors or rotations; the ordering layer only
/// decides *where* an edit happens.
impl<T, A: Augment> RawTree<T, A> {
    /// Descends by comparison from the root and returns the last node
    /// visited together with the final comparison of `key` against it.
    ///
    /// `Ordering::Equal` means an exact match; `Less`/`Greater` mean the
    /// descent stopped at a node whose facing child slot is empty, which is
    /// exactly where an insertion of `key` would attach.
    pub(crate) fn closest<Q>(&self, key: &Q) -> Option<(Handle, Ordering)>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root()?;
        loop {
            let ordering = key.cmp(self.element(current).borrow());
            let side = match ordering {
                Ordering::Equal => return Some((current, Ordering::Equal)),
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
            };
            match self.child(current, side) {
                Some(child) => current = child,
                None => return Some((current, ordering)),
            }
        }
    }

    /// Returns the node holding an element equal to `key`.
    pub(crate) fn find<Q>(&self, key: &Q) -> Option<Handle>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.closest(key)? {
            (handle, Ordering::Equal) => Some(handle),
            _ => None,
        }
    }

    /// Inserts `element` at its ordered position. Returns the new node's
    /// handle, or `None` if an equal element is already present (the tree is
    /// left untouched).
    pub(crate) fn insert_ordered(&mut self, element: T) -> Option<Handle>
    where
        T: Ord,
    {
        let Some((closest, ordering)) = self.closest(&element) else {
            return Some(self.attach(None, Side::Right, element));
        };
        let side = match ordering {
            Ordering::Equal => return None,
            Ordering::Less => Side::Left,
            Ordering::Greater => Side::Right,
        };
        let new = self.attach(Some(closest), side, element);
        self.debug_assert_neighbors_ordered(new);
        Some(new)
    }

    /// Inserts a batch of elements presented in ascending order, skipping
    /// duplicates.
    ///
    /// The run is threaded through a hint: the last inserted node plus its
    /// cached in-order successor. An element that falls strictly between the
    /// two attaches next to the hint without a descent, so an already-sorted
    /// run approaches O(1) amortized per element; anything else falls back
    /// to an ordinary O(log n) insert, never a misplaced node.
    pub(crate) fn extend_sorted<I: IntoIterator<Item = T>>(&mut self, items: I)
    where
        T: Ord,
    {
        let mut hint: Option<(Handle, Option<Handle>)> = None;
        for item in items {
            if let Some((previous, bound)) = hint
                && *self.element(previous) < item
                && bound.is_none_or(|b| item < *self.element(b))
            {
                let new = self.attach(Some(previous), Side::Right, item);
                self.debug_assert_neighbors_ordered(new);
                // the new node slides in before the same bound
                hint = Some((new, bound));
                continue;
            }
            if let Some(new) = self.insert_ordered(item) {
                hint = Some((new, self.successor(new)));
            }
        }
    }

    /// Finds and detaches the element equal to `key`.
    pub(crate) fn remove_value<Q>(&mut self, key: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.find(key)?;
        Some(self.detach(handle))
    }

    /// Checks the new node against its in-order neighbors. Misordering here
    /// means an inconsistent comparator or a bad insertion hint; the check
    /// compiles away in release builds.
    fn debug_assert_neighbors_ordered(&self, handle: Handle)
    where
        T: Ord,
    {
        #[cfg(debug_assertions)]
        {
            if let Some(previous) = self.predecessor(handle) {
                debug_assert!(
                    self.element(previous) < self.element(handle),
                    "ordered insert broke the in-order sequence"
                );
            }
            if let Some(next) = self.successor(handle) {
                debug_assert!(
                    self.element(handle) < self.element(next),
                    "ordered insert broke the in-order sequence"
                );
            }
        }
        #[cfg(not(debug_assertions))]
        let _ = handle;
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::super::node::Count;
    use super::*;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    #[test]
    fn closest_reports_the_attachment_point() {
        let mut tree: RawTree<i64, Count> = RawTree::new();
        assert!(tree.closest(&5).is_none());

        tree.bulk_build(alloc::vec![10, 20, 30]);
        let (_, ordering) = tree.closest(&20).unwrap();
        assert_eq!(ordering, Ordering::Equal);

        let (handle, ordering) = tree.closest(&15).unwrap();
        assert_eq!(ordering, Ordering::Less);
        assert_eq!(*tree.element(handle), 20);

        let (handle, ordering) = tree.closest(&35).unwrap();
        assert_eq!(ordering, Ordering::Greater);
        assert_eq!(*tree.element(handle), 30);
    }

    #[test]
    fn duplicate_insert_is_a_no_op() {
        let mut tree: RawTree<i64, Count> = RawTree::new();
        assert!(tree.insert_ordered(7).is_some());
        let generation = tree.generation();
        assert!(tree.insert_ordered(7).is_none());
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.generation(), generation);
    }

    #[test]
    fn remove_value_round_trip() {
        let mut tree: RawTree<i64, Count> = RawTree::new();
        tree.bulk_build((0..32).collect());
        assert_eq!(tree.remove_value(&17), Some(17));
        assert_eq!(tree.remove_value(&17), None);
        assert_eq!(tree.len(), 31);
        tree.validate();
    }

    proptest! {
        #[test]
        fn hinted_run_matches_plain_inserts(
            base in prop::collection::btree_set(0..1000i64, 0..64),
            run in prop::collection::btree_set(0..1000i64, 0..64),
        ) {
            let mut plain: RawTree<i64, Count> = RawTree::new();
            let mut hinted: RawTree<i64, Count> = RawTree::new();
            for &value in &base {
                plain.insert_ordered(value);
                hinted.insert_ordered(value);
            }

            for &value in &run {
                plain.insert_ordered(value);
            }
            hinted.extend_sorted(run.iter().copied());

            hinted.validate();
            hinted.validate_ordered();
            prop_assert_eq!(plain.len(), hinted.len());

            let mut expected: Vec<i64> = base.iter().chain(run.iter()).copied().collect();
            expected.sort_unstable();
            expected.dedup();
            let mut walked = Vec::new();
            let mut current = hinted.first();
            while let Some(handle) = current {
                walked.push(*hinted.element(handle));
                current = hinted.successor(handle);
            }
            prop_assert_eq!(walked, expected);
        }
    }
}
