/// A zero-based rank into the sorted order of a [`SortedList`](crate::SortedList).
///
/// This is an order-statistic extension and is not part of the standard
/// `BTreeSet` API.
///
/// # Examples
///
/// ```
/// use rubra_tree::{Rank, SortedList};
///
/// let mut list = SortedList::new();
/// list.insert(10);
/// list.insert(20);
///
/// assert_eq!(list[Rank(0)], 10);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Rank(pub usize);
