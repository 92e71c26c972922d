use proptest::prelude::*;
use rubra_tree::{Rank, SortedList};

/// The number of operations to perform in each proptest case. The reference
/// model pays O(n) per edit, so this is smaller than the set-test count.
const TEST_SIZE: usize = 2_000;

/// Generates a vector of random values in a range that ensures collisions.
fn value_strategy() -> impl Strategy<Value = i64> {
    -5_000i64..5_000i64
}

/// A sorted, duplicate-free Vec mirroring the list's contract.
#[derive(Debug, Default)]
struct Model {
    items: Vec<i64>,
}

impl Model {
    fn insert(&mut self, value: i64) -> bool {
        match self.items.binary_search(&value) {
            Ok(_) => false,
            Err(at) => {
                self.items.insert(at, value);
                true
            }
        }
    }

    fn remove(&mut self, value: i64) -> bool {
        match self.items.binary_search(&value) {
            Ok(at) => {
                self.items.remove(at);
                true
            }
            Err(_) => false,
        }
    }
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum ListOp {
    Insert(i64),
    Remove(i64),
    RemoveAt(usize),
    Contains(i64),
    GetAt(usize),
    IndexOf(i64),
    First,
    Last,
}

fn list_op_strategy() -> impl Strategy<Value = ListOp> {
    prop_oneof![
        5 => value_strategy().prop_map(ListOp::Insert),
        2 => value_strategy().prop_map(ListOp::Remove),
        2 => any::<usize>().prop_map(ListOp::RemoveAt),
        2 => value_strategy().prop_map(ListOp::Contains),
        2 => any::<usize>().prop_map(ListOp::GetAt),
        2 => value_strategy().prop_map(ListOp::IndexOf),
        1 => Just(ListOp::First),
        1 => Just(ListOp::Last),
    ]
}

// ─── Mixed ordered and positional operations ─────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays a random sequence of ordered and positional operations on
    /// both SortedList and a sorted Vec, asserting element-for-element
    /// equality after every step.
    #[test]
    fn list_ops_match_sorted_vec(ops in proptest::collection::vec(list_op_strategy(), TEST_SIZE)) {
        let mut list: SortedList<i64> = SortedList::new();
        let mut model = Model::default();

        for op in &ops {
            match op {
                ListOp::Insert(v) => {
                    prop_assert_eq!(list.insert(*v), model.insert(*v), "insert({})", v);
                }
                ListOp::Remove(v) => {
                    prop_assert_eq!(list.remove(v), model.remove(*v), "remove({})", v);
                }
                ListOp::RemoveAt(at) => {
                    if model.items.is_empty() {
                        continue;
                    }
                    let at = at % model.items.len();
                    prop_assert_eq!(list.remove_at(at), model.items.remove(at), "remove_at({})", at);
                }
                ListOp::Contains(v) => {
                    prop_assert_eq!(list.contains(v), model.items.binary_search(v).is_ok(), "contains({})", v);
                }
                ListOp::GetAt(at) => {
                    prop_assert_eq!(list.get_at(*at), model.items.get(*at), "get_at({})", at);
                }
                ListOp::IndexOf(v) => {
                    prop_assert_eq!(list.index_of(v), model.items.binary_search(v).ok(), "index_of({})", v);
                }
                ListOp::First => {
                    prop_assert_eq!(list.first(), model.items.first(), "first()");
                }
                ListOp::Last => {
                    prop_assert_eq!(list.last(), model.items.last(), "last()");
                }
            }
            prop_assert_eq!(list.len(), model.items.len(), "len mismatch after {:?}", op);
            prop_assert!(list.iter().eq(model.items.iter()), "contents mismatch after {:?}", op);
        }
    }

    /// `get_at(index_of(v)) == v` and `index_of(get_at(i)) == i` for every
    /// element.
    #[test]
    fn ranks_round_trip(values in proptest::collection::btree_set(value_strategy(), 0..TEST_SIZE)) {
        let list: SortedList<i64> = values.iter().copied().collect();

        for (rank, value) in values.iter().enumerate() {
            prop_assert_eq!(list.get_at(rank), Some(value));
            prop_assert_eq!(list.index_of(value), Some(rank));
            prop_assert_eq!(&list[Rank(rank)], value);
        }
        prop_assert!(list.get_at(values.len()).is_none());
    }

    /// `from_sorted` must agree with element-by-element insertion.
    #[test]
    fn from_sorted_matches_inserts(values in proptest::collection::btree_set(value_strategy(), 0..TEST_SIZE)) {
        let sorted: Vec<i64> = values.iter().copied().collect();
        let built = SortedList::from_sorted(sorted.clone());

        let mut inserted = SortedList::new();
        for v in &sorted {
            inserted.insert(*v);
        }

        prop_assert_eq!(&built, &inserted);
        prop_assert_eq!(built.iter().copied().collect::<Vec<_>>(), sorted);
    }

    /// `extend_sorted` and `remove_sorted` must agree with their one-at-a-
    /// time counterparts.
    #[test]
    fn sorted_batches_match_single_ops(
        base in proptest::collection::vec(value_strategy(), 0..500),
        batch in proptest::collection::btree_set(value_strategy(), 0..500),
    ) {
        let mut batched: SortedList<i64> = base.iter().copied().collect();
        let mut single: SortedList<i64> = base.iter().copied().collect();

        batched.extend_sorted(batch.iter().copied());
        for v in &batch {
            single.insert(*v);
        }
        prop_assert_eq!(&batched, &single);

        let victims: Vec<i64> = batch.iter().copied().collect();
        let removed = batched.remove_sorted(victims.iter());
        let mut expected = 0;
        for v in &victims {
            if single.remove(v) {
                expected += 1;
            }
        }
        prop_assert_eq!(removed, expected);
        prop_assert_eq!(batched, single);
    }
}

// ─── Deterministic unit tests ────────────────────────────────────────────────

#[test]
fn positional_and_ordered_views_stay_consistent() {
    let mut list = SortedList::new();
    for value in [50, 20, 90, 10, 40] {
        list.insert(value);
    }

    assert_eq!(list.iter().copied().collect::<Vec<_>>(), [10, 20, 40, 50, 90]);
    assert_eq!(list.get_at(2), Some(&40));
    assert_eq!(list.index_of(&90), Some(4));

    assert_eq!(list.remove_at(0), 10);
    assert_eq!(list.index_of(&90), Some(3));
    assert_eq!(list[Rank(0)], 20);
}

#[test]
#[should_panic(expected = "`SortedList::remove_at()` - rank 3 is out of bounds!")]
fn remove_at_rejects_out_of_range() {
    let mut list = SortedList::from([1, 2, 3]);
    list.remove_at(3);
}

#[test]
#[should_panic(expected = "index out of bounds")]
fn rank_index_rejects_out_of_range() {
    let list = SortedList::from([1, 2, 3]);
    let _ = list[Rank(3)];
}

#[test]
fn pop_ends() {
    let mut list = SortedList::from([2, 1, 3]);
    assert_eq!(list.pop_first(), Some(1));
    assert_eq!(list.pop_last(), Some(3));
    assert_eq!(list.pop_last(), Some(2));
    assert_eq!(list.pop_first(), None);
}

// ─── Cursors ─────────────────────────────────────────────────────────────────

#[test]
fn cursor_walks_the_whole_list() {
    let list = SortedList::from([3, 1, 2]);
    let mut cursor = list.cursor();
    let mut walked = Vec::new();
    while let Some(value) = cursor.next(&list) {
        walked.push(*value);
    }
    assert_eq!(walked, [1, 2, 3]);
    assert_eq!(cursor.next(&list), None);
}

#[test]
#[should_panic(expected = "tree was modified after the cursor was created!")]
fn cursor_fails_after_insert() {
    let mut list = SortedList::from([1, 2, 3]);
    let mut cursor = list.cursor();
    assert_eq!(cursor.next(&list), Some(&1));
    list.insert(10);
    let _ = cursor.next(&list);
}

#[test]
#[should_panic(expected = "tree was modified after the cursor was created!")]
fn cursor_fails_after_remove() {
    let mut list = SortedList::from([1, 2, 3]);
    let mut cursor = list.cursor();
    list.remove(&2);
    let _ = cursor.next(&list);
}

#[test]
fn lookups_do_not_invalidate_cursors() {
    let list = SortedList::from([1, 2, 3]);
    let mut cursor = list.cursor();
    assert!(list.contains(&2));
    assert_eq!(list.get_at(0), Some(&1));
    assert_eq!(cursor.next(&list), Some(&1));
}
