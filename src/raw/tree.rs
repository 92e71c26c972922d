use alloc::vec::Vec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Augment, Color, Node, Side};

/// The core red-black tree engine backing every container in this crate.
///
/// The engine is purely positional: it attaches nodes at explicit slots,
/// removes nodes by handle, and keeps the red-black and augmentation
/// invariants. Comparator-driven search and rank translation are layered on
/// top of it and never reach into the balancing machinery.
pub(crate) struct RawTree<T, A: Augment> {
    /// Arena storing all tree nodes.
    arena: Arena<Node<T, A>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Total number of elements in the tree.
    len: usize,
    /// Bumped on every structural mutation; detached cursors snapshot it and
    /// refuse to step once it has moved on.
    generation: u64,
}

impl<T, A: Augment> Clone for RawTree<T, A>
where
    T: Clone,
{
    fn clone(&self) -> Self {
        Self {
            arena: self.arena.clone(),
            root: self.root,
            len: self.len,
            generation: self.generation,
        }
    }
}

impl<T, A: Augment> RawTree<T, A> {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            len: 0,
            generation: 0,
        }
    }

    /// Creates a new tree with room for `capacity` elements.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: Arena::with_capacity(capacity),
            root: None,
            len: 0,
            generation: 0,
        }
    }

    /// Returns the number of elements in the tree.
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the tree contains no elements.
    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the capacity of the backing arena.
    pub(crate) fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Returns the current modification generation.
    pub(crate) const fn generation(&self) -> u64 {
        self.generation
    }

    /// Removes all elements from the tree.
    pub(crate) fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
        self.len = 0;
        self.generation += 1;
    }

    pub(crate) fn root(&self) -> Option<Handle> {
        self.root
    }

    #[inline]
    fn node(&self, handle: Handle) -> &Node<T, A> {
        self.arena.get(handle)
    }

    #[inline]
    fn node_mut(&mut self, handle: Handle) -> &mut Node<T, A> {
        self.arena.get_mut(handle)
    }

    /// Returns a reference to the element stored at `handle`.
    #[inline]
    pub(crate) fn element(&self, handle: Handle) -> &T {
        self.node(handle).element()
    }

    /// Returns a mutable reference to the element stored at `handle`.
    #[inline]
    pub(crate) fn element_mut(&mut self, handle: Handle) -> &mut T {
        self.node_mut(handle).element_mut()
    }

    #[inline]
    pub(crate) fn child(&self, handle: Handle, side: Side) -> Option<Handle> {
        self.node(handle).child(side)
    }

    #[inline]
    pub(crate) fn parent(&self, handle: Handle) -> Option<Handle> {
        self.node(handle).parent()
    }

    #[inline]
    pub(crate) fn aug(&self, handle: Handle) -> A {
        self.node(handle).aug()
    }

    #[inline]
    fn color(&self, handle: Handle) -> Color {
        self.node(handle).color()
    }

    #[inline]
    fn set_color(&mut self, handle: Handle, color: Color) {
        self.node_mut(handle).set_color(color);
    }

    /// Absent nodes count as black.
    #[inline]
    fn is_red(&self, handle: Option<Handle>) -> bool {
        handle.is_some_and(|h| self.color(h) == Color::Red)
    }

    // ─── Traversal primitives (derived purely from link structure) ───────────

    /// Returns which side of its parent `handle` hangs on, or `None` for the
    /// root.
    pub(crate) fn side_of(&self, handle: Handle) -> Option<Side> {
        let parent = self.parent(handle)?;
        if self.child(parent, Side::Left) == Some(handle) {
            Some(Side::Left)
        } else {
            Some(Side::Right)
        }
    }

    /// Returns the child slot currently holding `handle`, or `None` for the
    /// root.
    fn slot_of(&self, handle: Handle) -> Option<(Handle, Side)> {
        let side = self.side_of(handle)?;
        Some((self.parent(handle)?, side))
    }

    /// Returns the other child of `handle`'s parent.
    pub(crate) fn sibling(&self, handle: Handle) -> Option<Handle> {
        let (parent, side) = self.slot_of(handle)?;
        self.child(parent, side.opposite())
    }

    /// Walks to the extreme descendant of `handle` on the given side.
    pub(crate) fn extreme_in(&self, handle: Handle, side: Side) -> Handle {
        let mut current = handle;
        while let Some(child) = self.child(current, side) {
            current = child;
        }
        current
    }

    /// Returns the leftmost node of the tree.
    pub(crate) fn first(&self) -> Option<Handle> {
        self.root.map(|root| self.extreme_in(root, Side::Left))
    }

    /// Returns the rightmost node of the tree.
    pub(crate) fn last(&self) -> Option<Handle> {
        self.root.map(|root| self.extreme_in(root, Side::Right))
    }

    /// Returns the in-order neighbor of `handle` in the given direction.
    fn neighbor(&self, handle: Handle, direction: Side) -> Option<Handle> {
        if let Some(child) = self.child(handle, direction) {
            return Some(self.extreme_in(child, direction.opposite()));
        }
        let mut current = handle;
        while let Some(parent) = self.parent(current) {
            if self.side_of(current) == Some(direction.opposite()) {
                return Some(parent);
            }
            current = parent;
        }
        None
    }

    /// Returns the in-order successor of `handle`.
    pub(crate) fn successor(&self, handle: Handle) -> Option<Handle> {
        self.neighbor(handle, Side::Right)
    }

    /// Returns the in-order predecessor of `handle`.
    pub(crate) fn predecessor(&self, handle: Handle) -> Option<Handle> {
        self.neighbor(handle, Side::Left)
    }

    // ─── Structural mutation ─────────────────────────────────────────────────

    /// Installs `child` into `slot` (a parent's child position, or the root).
    ///
    /// This is the sole mutator of parent back-links, which keeps every
    /// node's parent in agreement with the unique child slot holding it.
    fn link(&mut self, slot: Option<(Handle, Side)>, child: Option<Handle>) {
        match slot {
            Some((parent, side)) => self.node_mut(parent).set_child(side, child),
            None => self.root = child,
        }
        if let Some(child) = child {
            self.node_mut(child).set_parent(slot.map(|(parent, _)| parent));
        }
    }

    /// Recomputes `handle`'s aggregate from its children. Returns whether the
    /// stored value changed.
    fn refresh_aug(&mut self, handle: Handle) -> bool {
        let node = self.node(handle);
        let left = node.child(Side::Left).map(|c| self.node(c).aug());
        let right = node.child(Side::Right).map(|c| self.node(c).aug());
        let aug = A::combine(left, right);
        let node = self.node_mut(handle);
        if node.aug() == aug {
            false
        } else {
            node.set_aug(aug);
            true
        }
    }

    /// Re-aggregates from `handle` toward the root, stopping at the first
    /// ancestor whose statistic is unchanged.
    fn update_aug_from(&mut self, handle: Handle) {
        let mut current = handle;
        while self.refresh_aug(current) {
            match self.parent(current) {
                Some(parent) => current = parent,
                None => break,
            }
        }
    }

    /// Rotates at `handle`, moving it down toward `direction` and promoting
    /// its other child into its place.
    ///
    /// The two nodes swap colors, so the number of black nodes along every
    /// affected path is preserved; fix-up procedures rely on this to recolor
    /// and restructure in a single step.
    fn rotate(&mut self, handle: Handle, direction: Side) {
        let promoted = self
            .child(handle, direction.opposite())
            .expect("`RawTree::rotate()` - no child to promote!");
        let slot = self.slot_of(handle);
        let across = self.child(promoted, direction);

        self.link(Some((handle, direction.opposite())), across);
        self.link(slot, Some(promoted));
        self.link(Some((promoted, direction)), Some(handle));

        let handle_color = self.color(handle);
        let promoted_color = self.color(promoted);
        self.set_color(handle, promoted_color);
        self.set_color(promoted, handle_color);

        // the node that moved down re-aggregates; propagation stops once an
        // ancestor's statistic is unchanged
        self.update_aug_from(handle);
    }

    /// Attaches `element` as a new leaf at the slot described by `hint` and
    /// `side`, then rebalances.
    ///
    /// A `None` hint resolves to the extreme node on `side` (or the root slot
    /// of an empty tree), so `attach(None, Side::Left, ..)` prepends and
    /// `attach(None, Side::Right, ..)` appends. If the hinted slot is
    /// occupied, the insertion point advances to the in-order neighbor in
    /// that direction, whose facing slot is necessarily empty; an
    /// approximate hint therefore still lands the element in the position
    /// the caller named.
    pub(crate) fn attach(&mut self, hint: Option<Handle>, side: Side, element: T) -> Handle {
        let slot = match hint {
            None => self.root.map(|root| (self.extreme_in(root, side), side)),
            Some(node) => {
                if self.child(node, side).is_none() {
                    Some((node, side))
                } else {
                    let neighbor = self
                        .neighbor(node, side)
                        .expect("`RawTree::attach()` - occupied slot with no in-order neighbor!");
                    Some((neighbor, side.opposite()))
                }
            }
        };

        let new = self.arena.alloc(Node::new(element));
        self.len += 1;
        self.generation += 1;

        self.link(slot, Some(new));
        if let Some((parent, _)) = slot {
            self.update_aug_from(parent);
        }
        self.insert_fixup(new);
        new
    }

    /// Restores the red-black invariants after attaching the red node
    /// `handle`. Only the red-uncle case propagates, and it may reach the
    /// root; every other case terminates after at most two rotations.
    fn insert_fixup(&mut self, handle: Handle) {
        let Some(parent) = self.parent(handle) else {
            self.set_color(handle, Color::Black);
            return;
        };
        if self.color(parent) == Color::Black {
            return;
        }
        let Some(grand) = self.parent(parent) else {
            // the parent is the red root
            self.set_color(parent, Color::Black);
            return;
        };
        match self.sibling(parent) {
            Some(uncle) if self.color(uncle) == Color::Red => {
                // red uncle: push the grandparent's blackness down and retry
                // one level up
                self.set_color(parent, Color::Black);
                self.set_color(uncle, Color::Black);
                self.set_color(grand, Color::Red);
                self.insert_fixup(grand);
            }
            _ => {
                let parent_side = self
                    .side_of(parent)
                    .expect("`RawTree::insert_fixup()` - parent vanished from its slot!");
                if self.side_of(handle) != Some(parent_side) {
                    // inner grandchild: rotate it to the outside first
                    self.rotate(parent, parent_side);
                }
                // promote the outside red child; the rotation's color swap
                // blackens it and reddens the displaced grandparent
                self.rotate(grand, parent_side.opposite());
            }
        }
    }

    /// Detaches the node named by `handle` and returns its element.
    ///
    /// A node with two children first exchanges structural positions with
    /// its in-order successor by relinking the two arena slots; element
    /// payloads never move between slots, so `handle` keeps naming the
    /// element being removed and the successor's handle glides into the
    /// vacated tree position.
    pub(crate) fn detach(&mut self, handle: Handle) -> T {
        if self.child(handle, Side::Left).is_some()
            && let Some(right) = self.child(handle, Side::Right)
        {
            let successor = self.extreme_in(right, Side::Left);
            self.swap_with_successor(handle, successor);
        }

        let replacement = self.child(handle, Side::Left).or_else(|| self.child(handle, Side::Right));
        let slot = self.slot_of(handle);
        let removed_black = self.color(handle) == Color::Black;

        self.link(slot, replacement);

        if let Some((parent, side)) = slot {
            self.update_aug_from(parent);
            if removed_black {
                if self.is_red(replacement) {
                    // a red replacement absorbs the missing black
                    self.set_color(replacement.expect("`RawTree::detach()` - red replacement is absent!"), Color::Black);
                } else {
                    // black (or absent) replacement: the vacated position is
                    // short one black node
                    self.remove_fixup(parent, side);
                }
            }
        } else if let Some(root) = self.root
            && self.color(root) == Color::Red
        {
            // the replacement became the root; the root's black-height is
            // free to decrease, it only needs to be black
            self.set_color(root, Color::Black);
        }

        self.len -= 1;
        self.generation += 1;
        let element = self.arena.take(handle).into_element();
        debug_assert_eq!(self.arena.len(), self.len);
        element
    }

    /// Exchanges the structural position of `handle` with its in-order
    /// successor: colors, aggregates, parent and child links all swap, the
    /// elements stay in their slots.
    fn swap_with_successor(&mut self, handle: Handle, successor: Handle) {
        let handle_color = self.color(handle);
        let successor_color = self.color(successor);
        self.set_color(handle, successor_color);
        self.set_color(successor, handle_color);

        let handle_aug = self.node(handle).aug();
        let successor_aug = self.node(successor).aug();
        self.node_mut(handle).set_aug(successor_aug);
        self.node_mut(successor).set_aug(handle_aug);

        let slot = self.slot_of(handle);
        let left = self.child(handle, Side::Left);
        let right = self.child(handle, Side::Right);
        // the successor is the minimum of the right subtree: no left child
        let successor_right = self.child(successor, Side::Right);

        if right == Some(successor) {
            // adjacent: the successor takes `handle`'s place and `handle`
            // hangs directly below it
            self.link(slot, Some(successor));
            self.link(Some((successor, Side::Left)), left);
            self.link(Some((successor, Side::Right)), Some(handle));
            self.link(Some((handle, Side::Right)), successor_right);
        } else {
            let successor_slot = self.slot_of(successor);
            self.link(slot, Some(successor));
            self.link(Some((successor, Side::Left)), left);
            self.link(Some((successor, Side::Right)), right);
            self.link(successor_slot, Some(handle));
            self.link(Some((handle, Side::Right)), successor_right);
        }
        self.node_mut(handle).set_child(Side::Left, None);
    }

    /// Restores the black-height invariant after a black node was removed
    /// from the `short` side of `parent`.
    fn remove_fixup(&mut self, parent: Handle, short: Side) {
        let long = short.opposite();
        // a deficiency implies the long side has height at least one
        let mut sibling = self
            .child(parent, long)
            .expect("`RawTree::remove_fixup()` - deficient position has no sibling!");

        if self.color(sibling) == Color::Red {
            // rotate the red sibling into the parent's position; the color
            // swap reddens the parent and blackens the sibling
            self.rotate(parent, short);
            sibling = self
                .child(parent, long)
                .expect("`RawTree::remove_fixup()` - red sibling had no inner child!");
        }

        let outer = self.child(sibling, long);
        let inner = self.child(sibling, short);

        if !self.is_red(outer) && !self.is_red(inner) {
            // both nephews black: recolor the sibling red, which evens out
            // the two sides but leaves the whole subtree short by one
            self.set_color(sibling, Color::Red);
            if self.color(parent) == Color::Red {
                self.set_color(parent, Color::Black);
            } else if let Some((grand, parent_side)) = self.slot_of(parent) {
                self.remove_fixup(grand, parent_side);
            }
            // a black root absorbs the deficiency: its black-height shrinks
            return;
        }

        if !self.is_red(outer) {
            // inner nephew red: rotate it into the sibling's position; the
            // color swap blackens it and the displaced sibling absorbs red
            // on the outside
            self.rotate(sibling, long);
            sibling = self
                .child(parent, long)
                .expect("`RawTree::remove_fixup()` - rotation lost the sibling!");
        }

        // outer nephew red: terminal. The rotation hands the parent's color
        // to the promoted sibling and moves the parent down to the short
        // side; blackening the outer nephew restores both sides' counts.
        self.rotate(parent, short);
        let outer = self
            .child(sibling, long)
            .expect("`RawTree::remove_fixup()` - outer nephew vanished!");
        self.set_color(outer, Color::Black);
    }

    // ─── Bulk construction ───────────────────────────────────────────────────

    /// Builds a minimum-height tree from elements already in ascending
    /// order, in one O(n) pass.
    ///
    /// # Panics
    ///
    /// Panics if the tree is not empty.
    pub(crate) fn bulk_build(&mut self, items: Vec<T>) {
        assert!(self.root.is_none(), "`RawTree::bulk_build()` - tree is not empty!");
        let n = items.len();
        if n == 0 {
            return;
        }
        // Every node is black except, in an imperfect tree, the deepest
        // level; black-height is then uniform because the median recursion
        // fills every level but the last.
        let levels = usize::BITS - n.leading_zeros();
        let red_level = if (n + 1).is_power_of_two() { 0 } else { levels };
        let mut items = items.into_iter();
        self.root = self.build_range(&mut items, n, 1, red_level);
        debug_assert!(items.next().is_none());
        if let Some(root) = self.root {
            self.set_color(root, Color::Black);
        }
        self.len = n;
        self.generation += 1;
    }

    fn build_range(
        &mut self,
        items: &mut alloc::vec::IntoIter<T>,
        n: usize,
        level: u32,
        red_level: u32,
    ) -> Option<Handle> {
        if n == 0 {
            return None;
        }
        let left_n = n / 2;
        let left = self.build_range(items, left_n, level + 1, red_level);
        let element = items.next().expect("`RawTree::bulk_build()` - sequence ended early!");
        let right = self.build_range(items, n - 1 - left_n, level + 1, red_level);

        let aug = A::combine(left.map(|c| self.node(c).aug()), right.map(|c| self.node(c).aug()));
        let color = if level == red_level { Color::Red } else { Color::Black };
        let handle = self.arena.alloc(Node::prelinked(element, color, [left, right], aug));
        if let Some(child) = left {
            self.node_mut(child).set_parent(Some(handle));
        }
        if let Some(child) = right {
            self.node_mut(child).set_parent(Some(handle));
        }
        Some(handle)
    }

    /// Drains all elements in ascending order by walking the successor
    /// chain. O(n), no rebalancing.
    pub(crate) fn drain_ascending(&mut self) -> Vec<T> {
        let mut handles = Vec::with_capacity(self.len);
        let mut current = self.first();
        while let Some(handle) = current {
            handles.push(handle);
            current = self.successor(handle);
        }

        let mut result = Vec::with_capacity(handles.len());
        for handle in handles {
            result.push(self.arena.take(handle).into_element());
        }
        debug_assert!(self.arena.is_empty());

        self.arena.clear();
        self.root = None;
        self.len = 0;
        self.generation += 1;
        result
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
impl<T, A: Augment> RawTree<T, A> {
    /// Checks parent back-links, the red-red rule, black-height uniformity,
    /// and the element count. Panics with a description on any violation.
    pub(crate) fn validate(&self) {
        let Some(root) = self.root else {
            assert_eq!(self.len, 0, "empty tree has len {}", self.len);
            return;
        };
        assert!(self.node(root).parent().is_none(), "root has a parent");
        assert_eq!(self.color(root), Color::Black, "root is red");
        let (_, count) = self.validate_node(root);
        assert_eq!(count, self.len, "len is {} but the tree holds {count} nodes", self.len);
    }

    /// Returns (black-height, node count) of the subtree at `handle`.
    fn validate_node(&self, handle: Handle) -> (usize, usize) {
        let node = self.node(handle);
        let mut count = 1;
        let mut black_heights = [0, 0];
        for side in [Side::Left, Side::Right] {
            if let Some(child) = node.child(side) {
                assert_eq!(
                    self.node(child).parent(),
                    Some(handle),
                    "child's parent link does not point back"
                );
                if node.color() == Color::Red {
                    assert_eq!(self.node(child).color(), Color::Black, "red node has a red child");
                }
                let (black_height, child_count) = self.validate_node(child);
                black_heights[side.index()] = black_height;
                count += child_count;
            }
        }
        assert_eq!(
            black_heights[0], black_heights[1],
            "black-height differs between the two sides of a node"
        );
        (black_heights[0] + usize::from(node.color() == Color::Black), count)
    }

    /// Returns the height of the tree in nodes.
    pub(crate) fn height(&self) -> usize {
        fn depth<T, A: Augment>(tree: &RawTree<T, A>, handle: Option<Handle>) -> usize {
            handle.map_or(0, |h| {
                1 + depth(tree, tree.child(h, Side::Left)).max(depth(tree, tree.child(h, Side::Right)))
            })
        }
        depth(self, self.root)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
impl<T: Ord, A: Augment> RawTree<T, A> {
    /// Checks that the in-order walk is strictly increasing.
    pub(crate) fn validate_ordered(&self) {
        let mut current = self.first();
        while let Some(handle) = current {
            let next = self.successor(handle);
            if let Some(next) = next {
                assert!(
                    self.element(handle) < self.element(next),
                    "in-order neighbors are not strictly increasing"
                );
            }
            current = next;
        }
    }
}
