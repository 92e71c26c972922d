//! Augmented red-black tree collections for Rust.
//!
//! This crate provides three containers built on a single arena-backed
//! red-black tree engine:
//!
//! - [`RBTreeSet`] - an ordered set with the familiar `BTreeSet`-style API
//! - [`SortedList`] - an ordered set that is simultaneously indexable by
//!   position, with O(log n) [`get_at`](SortedList::get_at),
//!   [`remove_at`](SortedList::remove_at), [`index_of`](SortedList::index_of)
//!   and indexing by [`Rank`]
//! - [`PositionalList`] - a purely positional list with O(log n) insert and
//!   remove at arbitrary indices and no ordering requirement on the elements
//!
//! # Example
//!
//! ```
//! use rubra_tree::{Rank, SortedList};
//!
//! let mut scores = SortedList::new();
//! scores.insert(85);
//! scores.insert(100);
//! scores.insert(92);
//!
//! // Ordered operations (O(log n))
//! assert!(scores.contains(&92));
//!
//! // Positional operations (O(log n))
//! assert_eq!(scores.get_at(1), Some(&92));
//! assert_eq!(scores.index_of(&100), Some(2));
//! assert_eq!(scores[Rank(0)], 85);
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **O(log n) everything** - insert, remove, lookup, and rank queries all
//!   bounded by tree height
//! - **Arena storage** - nodes live in a contiguous slot arena addressed by
//!   niche-optimized handles; no per-node heap allocation
//! - **O(n) bulk construction** - building from sorted input produces a
//!   minimum-height tree in a single pass
//!
//! # Implementation
//!
//! The containers share one core engine: an intrusive red-black tree whose
//! nodes carry parent and child links as arena handles. Positional access is
//! provided by a subtree-count augmentation maintained incrementally on every
//! structural change; the plain set carries no augmentation and pays nothing
//! for it.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod rank;
mod raw;

pub mod positional_list;
pub mod rb_tree_set;
pub mod sorted_list;

pub use positional_list::PositionalList;
pub use rank::Rank;
pub use rb_tree_set::RBTreeSet;
pub use sorted_list::SortedList;
