use super::handle::Handle;
use super::node::{Side, SubtreeSize};
use super::tree::RawTree;

/// The rank-to-node translator, defined only for trees whose augmentation
/// carries a subtree count. Both directions are O(log n) and never consult
/// the elements, so they work identically for ordered and unordered trees.
impl<T, A: SubtreeSize> RawTree<T, A> {
    /// Returns the node holding the element with zero-based in-order `rank`,
    /// or `None` if `rank >= len`.
    pub(crate) fn node_at(&self, rank: usize) -> Option<Handle> {
        if rank >= self.len() {
            return None;
        }
        let mut current = self.root()?;
        let mut remaining = rank;
        loop {
            let left_len = self.child(current, Side::Left).map_or(0, |child| self.aug(child).len());
            if remaining < left_len {
                current = self
                    .child(current, Side::Left)
                    .expect("`RawTree::node_at()` - subtree counts are inconsistent!");
            } else if remaining == left_len {
                return Some(current);
            } else {
                remaining -= left_len + 1;
                current = self
                    .child(current, Side::Right)
                    .expect("`RawTree::node_at()` - subtree counts are inconsistent!");
            }
        }
    }

    /// Returns the zero-based in-order rank of the node named by `handle`.
    ///
    /// Walks from the node to the root: the node contributes its own left
    /// count, and each ascent from a right child adds the parent's count
    /// minus the child's (the parent itself plus everything on its left).
    pub(crate) fn rank_of(&self, handle: Handle) -> usize {
        let mut rank = self.child(handle, Side::Left).map_or(0, |child| self.aug(child).len());
        let mut current = handle;
        while let Some(parent) = self.parent(current) {
            if self.side_of(current) == Some(Side::Right) {
                rank += self.aug(parent).len() - self.aug(current).len();
            }
            current = parent;
        }
        rank
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
impl<T, A: SubtreeSize> RawTree<T, A> {
    /// Checks that every node's count is one plus the sum of its children's
    /// counts and that the root count matches `len`.
    pub(crate) fn validate_counts(&self) {
        let Some(root) = self.root() else {
            return;
        };
        assert_eq!(self.aug(root).len(), self.len(), "root count does not match len");
        self.validate_counts_at(root);
    }

    fn validate_counts_at(&self, handle: Handle) {
        let mut expected = 1;
        for side in [Side::Left, Side::Right] {
            if let Some(child) = self.child(handle, side) {
                self.validate_counts_at(child);
                expected += self.aug(child).len();
            }
        }
        assert_eq!(self.aug(handle).len(), expected, "node count is not 1 + left + right");
    }
}
