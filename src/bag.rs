//! Sorted multiset.

use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::iter::{FusedIterator, Repeat, Take};

/// A multiset that keeps an occurrence count per distinct item and iterates
/// in ascending item order.
///
/// Every stored item has a count of at least one, and [`len`](Self::len) is
/// the sum of all counts.
///
/// # Examples
///
/// ```
/// use nlib::SortedBag;
///
/// let mut bag = SortedBag::new();
/// bag.add_range([1, 2, 1]);
///
/// assert_eq!(bag.len(), 3);
/// assert_eq!(bag.get_count(&1), 2);
/// assert_eq!(bag.get_count(&2), 1);
/// assert_eq!(bag.get_count(&7), 0);
/// assert_eq!(bag.iter().collect::<Vec<_>>(), vec![&1, &1, &2]);
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SortedBag<T> {
    counts: BTreeMap<T, usize>,
    len: usize,
}

impl<T: Ord> SortedBag<T> {
    /// Creates an empty bag.
    pub fn new() -> Self {
        Self {
            counts: BTreeMap::new(),
            len: 0,
        }
    }

    /// Adds one occurrence of `item`.
    pub fn add(&mut self, item: T) {
        self.add_count(item, 1);
    }

    /// Adds `count` occurrences of `item`.
    ///
    /// Adding zero occurrences leaves the bag unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the total number of occurrences would overflow `usize`. The
    /// bag is left unchanged in that case.
    pub fn add_count(&mut self, item: T, count: usize) {
        if count == 0 {
            return;
        }
        // Every count is bounded by `len`, so checking `len` covers both.
        let Some(len) = self.len.checked_add(count) else {
            panic!("bag length overflow: cannot add {count} to {}", self.len);
        };
        *self.counts.entry(item).or_insert(0) += count;
        self.len = len;
    }

    /// Adds one occurrence of every item produced by `items`.
    pub fn add_range<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        for item in items {
            self.add(item);
        }
    }

    /// Removes one occurrence of `item`, returning whether it was present.
    pub fn remove(&mut self, item: &T) -> bool {
        let Some(count) = self.counts.get_mut(item) else {
            return false;
        };
        *count -= 1;
        if *count == 0 {
            self.counts.remove(item);
        }
        self.len -= 1;
        true
    }

    /// Removes every occurrence of `item`, returning how many there were.
    pub fn remove_all(&mut self, item: &T) -> usize {
        let removed = self.counts.remove(item).unwrap_or(0);
        self.len -= removed;
        removed
    }

    /// Returns the number of occurrences of `item`, or 0 if absent.
    pub fn get_count(&self, item: &T) -> usize {
        self.counts.get(item).copied().unwrap_or(0)
    }

    /// Returns true if at least one occurrence of `item` is present.
    pub fn contains(&self, item: &T) -> bool {
        self.counts.contains_key(item)
    }

    /// Returns the smallest item.
    pub fn first(&self) -> Option<&T> {
        self.counts.keys().next()
    }

    /// Returns the largest item.
    pub fn last(&self) -> Option<&T> {
        self.counts.keys().next_back()
    }
}

impl<T> SortedBag<T> {
    /// Total number of occurrences across all items.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Number of distinct items.
    pub fn distinct_len(&self) -> usize {
        self.counts.len()
    }

    /// Returns true if the bag holds no items.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes every item.
    pub fn clear(&mut self) {
        self.counts.clear();
        self.len = 0;
    }

    /// Iterates over every occurrence in ascending order.
    ///
    /// An item with count `k` is yielded `k` times.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            counts: self.counts.iter(),
            current: None,
            remaining: self.len,
        }
    }

    /// Iterates over `(item, count)` pairs in ascending order.
    pub fn counts(&self) -> btree_map::Iter<'_, T, usize> {
        self.counts.iter()
    }
}

impl<T: Ord> Default for SortedBag<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for SortedBag<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.counts.iter()).finish()
    }
}

impl<T: Ord> Extend<T> for SortedBag<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.add_range(iter);
    }
}

impl<T: Ord> FromIterator<T> for SortedBag<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut bag = Self::new();
        bag.add_range(iter);
        bag
    }
}

impl<'a, T> IntoIterator for &'a SortedBag<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over every occurrence in a [`SortedBag`], in ascending order.
#[derive(Debug, Clone)]
pub struct Iter<'a, T> {
    counts: btree_map::Iter<'a, T, usize>,
    current: Option<Take<Repeat<&'a T>>>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.current.as_mut().and_then(Iterator::next) {
                self.remaining -= 1;
                return Some(item);
            }
            let (item, count) = self.counts.next()?;
            self.current = Some(std::iter::repeat(item).take(*count));
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_bag_is_empty() {
        let bag: SortedBag<i32> = SortedBag::new();

        assert!(bag.is_empty());
        assert_eq!(bag.len(), 0);
        assert_eq!(bag.distinct_len(), 0);
        assert_eq!(bag.iter().next(), None);
    }

    #[test]
    fn add_range_counts_duplicates() {
        let mut bag = SortedBag::new();
        bag.add_range([1, 2, 1]);

        assert_eq!(bag.len(), 3);
        assert_eq!(bag.distinct_len(), 2);
        assert_eq!(bag.get_count(&1), 2);
        assert_eq!(bag.get_count(&2), 1);
    }

    #[test]
    fn get_count_of_absent_item_is_zero() {
        let bag: SortedBag<&str> = ["a", "b"].into_iter().collect();

        assert_eq!(bag.get_count(&"z"), 0);
        assert!(!bag.contains(&"z"));
    }

    #[test]
    fn add_empty_range_leaves_bag_unchanged() {
        let mut bag: SortedBag<i32> = [3, 3, 5].into_iter().collect();
        let before = bag.clone();

        bag.add_range(Vec::new());

        assert_eq!(bag, before);
        assert_eq!(bag.len(), 3);
    }

    #[test]
    fn add_count_adds_many_occurrences() {
        let mut bag = SortedBag::new();
        bag.add_count("x", 4);
        bag.add("x");

        assert_eq!(bag.get_count(&"x"), 5);
        assert_eq!(bag.len(), 5);
    }

    #[test]
    fn add_count_zero_is_noop() {
        let mut bag = SortedBag::new();
        bag.add_count(9, 0);

        assert!(bag.is_empty());
        assert!(!bag.contains(&9));
        assert_eq!(bag.distinct_len(), 0);
    }

    #[test]
    #[should_panic(expected = "bag length overflow")]
    fn add_count_panics_on_length_overflow() {
        let mut bag = SortedBag::new();
        bag.add_count(1u8, usize::MAX);
        bag.add_count(2u8, 1);
    }

    #[test]
    fn overflowing_add_leaves_bag_unchanged() {
        let mut bag = SortedBag::new();
        bag.add_count(1u8, usize::MAX);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            bag.add_count(1u8, 1);
        }));

        assert!(result.is_err());
        assert_eq!(bag.len(), usize::MAX);
        assert_eq!(bag.get_count(&1), usize::MAX);
        assert_eq!(bag.distinct_len(), 1);
    }

    #[test]
    fn iteration_is_sorted_regardless_of_insertion_order() {
        let bag: SortedBag<i32> = [5, 1, 4, 1, 3, 5].into_iter().collect();

        let items: Vec<i32> = bag.iter().copied().collect();
        assert_eq!(items, vec![1, 1, 3, 4, 5, 5]);
    }

    #[test]
    fn counts_yields_pairs_in_order() {
        let bag: SortedBag<char> = "banana".chars().collect();

        let pairs: Vec<(char, usize)> = bag.counts().map(|(c, n)| (*c, *n)).collect();
        assert_eq!(pairs, vec![('a', 3), ('b', 1), ('n', 2)]);
    }

    #[test]
    fn iter_reports_exact_size() {
        let bag: SortedBag<i32> = [2, 2, 2, 7].into_iter().collect();
        let mut iter = bag.iter();

        assert_eq!(iter.len(), 4);
        iter.next();
        assert_eq!(iter.len(), 3);
    }

    #[test]
    fn remove_decrements_then_drops_key() {
        let mut bag: SortedBag<i32> = [1, 1].into_iter().collect();

        assert!(bag.remove(&1));
        assert_eq!(bag.get_count(&1), 1);
        assert!(bag.remove(&1));
        assert!(!bag.contains(&1));
        assert!(!bag.remove(&1));
        assert!(bag.is_empty());
    }

    #[test]
    fn remove_all_returns_removed_count() {
        let mut bag: SortedBag<i32> = [4, 4, 4, 8].into_iter().collect();

        assert_eq!(bag.remove_all(&4), 3);
        assert_eq!(bag.remove_all(&4), 0);
        assert_eq!(bag.len(), 1);
    }

    #[test]
    fn first_and_last() {
        let bag: SortedBag<i32> = [10, -2, 7].into_iter().collect();

        assert_eq!(bag.first(), Some(&-2));
        assert_eq!(bag.last(), Some(&10));
    }

    #[test]
    fn extend_adds_items() {
        let mut bag: SortedBag<u8> = SortedBag::default();
        bag.extend([1u8, 1, 2]);

        assert_eq!(bag.len(), 3);
    }

    #[test]
    fn debug_shows_counts() {
        let bag: SortedBag<i32> = [1, 1, 2].into_iter().collect();

        assert_eq!(format!("{:?}", bag), "{1: 2, 2: 1}");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: len equals the sum of counts and every count is positive
            #[test]
            fn proptest_len_is_sum_of_counts(items in prop::collection::vec(0u8..16, 0..100)) {
                let bag: SortedBag<u8> = items.iter().copied().collect();

                let total: usize = bag.counts().map(|(_, n)| *n).sum();
                prop_assert_eq!(bag.len(), total);
                prop_assert_eq!(bag.len(), items.len());
                prop_assert!(bag.counts().all(|(_, n)| *n >= 1));
            }

            /// Property: iteration matches the sorted input
            #[test]
            fn proptest_iteration_matches_sorted_input(
                items in prop::collection::vec(any::<i16>(), 0..100)
            ) {
                let bag: SortedBag<i16> = items.iter().copied().collect();

                let mut expected = items.clone();
                expected.sort();
                let actual: Vec<i16> = bag.iter().copied().collect();
                prop_assert_eq!(actual, expected);
            }
        }
    }
}
