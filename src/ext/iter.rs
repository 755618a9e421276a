use std::collections::HashSet;
use std::hash::Hash;
use std::iter::FusedIterator;

use crate::SortedBag;

/// Extra adapters and collectors for every iterator.
pub trait IterExt: Iterator + Sized {
    /// Collects the items into a [`SortedBag`].
    ///
    /// ```
    /// use nlib::ext::IterExt;
    ///
    /// let bag = "mississippi".chars().to_sorted_bag();
    /// assert_eq!(bag.get_count(&'s'), 4);
    /// ```
    fn to_sorted_bag(self) -> SortedBag<Self::Item>
    where
        Self::Item: Ord,
    {
        self.collect()
    }

    /// Yields only the first item for each distinct key.
    ///
    /// ```
    /// use nlib::ext::IterExt;
    ///
    /// let words = ["apple", "avocado", "banana", "blueberry", "cherry"];
    /// let firsts: Vec<_> = words.into_iter().distinct_by(|w| w.chars().next()).collect();
    /// assert_eq!(firsts, vec!["apple", "banana", "cherry"]);
    /// ```
    fn distinct_by<K, F>(self, key: F) -> DistinctBy<Self, K, F>
    where
        K: Eq + Hash,
        F: FnMut(&Self::Item) -> K,
    {
        DistinctBy {
            iter: self,
            key,
            seen: HashSet::new(),
        }
    }

    /// Groups the items into vectors of `size`; the last one may be shorter.
    ///
    /// # Panics
    ///
    /// Panics if `size` is 0.
    ///
    /// ```
    /// use nlib::ext::IterExt;
    ///
    /// let chunks: Vec<Vec<i32>> = (1..=5).chunked(2).collect();
    /// assert_eq!(chunks, vec![vec![1, 2], vec![3, 4], vec![5]]);
    /// ```
    fn chunked(self, size: usize) -> Chunked<Self> {
        assert!(size > 0, "chunk size must be greater than 0");
        Chunked { iter: self, size }
    }
}

impl<I: Iterator> IterExt for I {}

/// Iterator returned by [`IterExt::distinct_by`].
#[derive(Debug, Clone)]
pub struct DistinctBy<I, K, F> {
    iter: I,
    key: F,
    seen: HashSet<K>,
}

impl<I, K, F> Iterator for DistinctBy<I, K, F>
where
    I: Iterator,
    K: Eq + Hash,
    F: FnMut(&I::Item) -> K,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let item = self.iter.next()?;
            if self.seen.insert((self.key)(&item)) {
                return Some(item);
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (_, upper) = self.iter.size_hint();
        (0, upper)
    }
}

/// Iterator returned by [`IterExt::chunked`].
#[derive(Debug, Clone)]
pub struct Chunked<I> {
    iter: I,
    size: usize,
}

impl<I: Iterator> Iterator for Chunked<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let chunk: Vec<I::Item> = self.iter.by_ref().take(self.size).collect();
        if chunk.is_empty() {
            None
        } else {
            Some(chunk)
        }
    }
}

/// A lazily generated sequence.
///
/// Created by [`generate`] and [`generate_while`]. Each element is computed
/// from the previous one only when it is requested.
#[derive(Debug, Clone)]
pub struct Generate<T, F> {
    last: Option<T>,
    started: bool,
    next: F,
}

/// Returns the infinite sequence `seed, next(seed), next(next(seed)), ...`.
///
/// ```
/// use nlib::ext::generate;
///
/// let powers: Vec<u32> = generate(1, |n| n * 2).take(5).collect();
/// assert_eq!(powers, vec![1, 2, 4, 8, 16]);
/// ```
pub fn generate<T, F>(seed: T, mut next: F) -> Generate<T, impl FnMut(&T) -> Option<T>>
where
    T: Clone,
    F: FnMut(&T) -> T,
{
    generate_while(seed, move |previous: &T| Some(next(previous)))
}

/// Like [`generate`], but the sequence ends when `next` returns `None`.
///
/// ```
/// use nlib::ext::generate_while;
///
/// let collatz: Vec<u64> = generate_while(6, |&n| match n {
///     1 => None,
///     n if n % 2 == 0 => Some(n / 2),
///     n => Some(3 * n + 1),
/// })
/// .collect();
/// assert_eq!(collatz, vec![6, 3, 10, 5, 16, 8, 4, 2, 1]);
/// ```
pub fn generate_while<T, F>(seed: T, next: F) -> Generate<T, F>
where
    T: Clone,
    F: FnMut(&T) -> Option<T>,
{
    Generate {
        last: Some(seed),
        started: false,
        next,
    }
}

impl<T, F> Iterator for Generate<T, F>
where
    T: Clone,
    F: FnMut(&T) -> Option<T>,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if !self.started {
            self.started = true;
            return self.last.clone();
        }
        let following = (self.next)(self.last.as_ref()?);
        self.last.clone_from(&following);
        following
    }
}

impl<T, F> FusedIterator for Generate<T, F>
where
    T: Clone,
    F: FnMut(&T) -> Option<T>,
{
}
