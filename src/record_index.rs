//! An `i64`-keyed ordered index backed by a left-leaning red-black tree.

use alloc::vec::Vec;
use core::fmt;
use core::iter::FusedIterator;

use crate::error::{Error, Result};
use crate::raw::{BoundedInOrder, RawLlrbMap};

mod capacity;

/// An ordered index of records keyed by a unique `i64` id.
///
/// The index is a left-leaning red-black tree: after every insert and remove the root is
/// black, red links lean left, no two red links are consecutive, and every path from the
/// root to a missing child crosses the same number of black links. Each rotation or color
/// flip performed to keep that shape is counted, see [`RecordIndex::rebalance_events`].
///
/// Unlike `BTreeMap::insert`, inserting an id that is already present is an error and leaves
/// the stored record untouched.
///
/// # Examples
///
/// ```
/// use catalog_tree::RecordIndex;
///
/// let mut index = RecordIndex::new();
/// index.insert(20, "Dune").unwrap();
/// index.insert(10, "Emma").unwrap();
/// index.insert(30, "Ulysses").unwrap();
///
/// assert!(index.insert(20, "Middlemarch").is_err());
/// assert_eq!(index.get(20), Some(&"Dune"));
///
/// let ids: Vec<i64> = index.range(15, 30).map(|(id, _)| id).collect();
/// assert_eq!(ids, [20, 30]);
///
/// let closest: Vec<i64> = index.nearest(25).into_iter().map(|(id, _)| id).collect();
/// assert_eq!(closest, [20, 30]);
/// ```
#[derive(Clone)]
pub struct RecordIndex<V> {
    raw: RawLlrbMap<V>,
}

impl<V> RecordIndex<V> {
    /// Makes a new, empty `RecordIndex`.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use catalog_tree::RecordIndex;
    ///
    /// let index: RecordIndex<&str> = RecordIndex::new();
    /// assert!(index.is_empty());
    /// assert_eq!(index.rebalance_events(), 0);
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        RecordIndex { raw: RawLlrbMap::new() }
    }

    /// Returns the number of records in the index.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the index contains no records.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Removes every record and resets the rebalancing counter to zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use catalog_tree::RecordIndex;
    ///
    /// let mut index = RecordIndex::new();
    /// for id in 0..8 {
    ///     index.insert(id, ()).unwrap();
    /// }
    /// assert!(index.rebalance_events() > 0);
    ///
    /// index.clear();
    /// assert!(index.is_empty());
    /// assert_eq!(index.rebalance_events(), 0);
    /// ```
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the number of rotations and color flips performed since the index was created
    /// or last cleared.
    ///
    /// The count never decreases while records are inserted and removed.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn rebalance_events(&self) -> u64 {
        self.raw.rebalance_events()
    }

    /// Returns a reference to the record stored under `id`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn get(&self, id: i64) -> Option<&V> {
        self.raw.get(id)
    }

    /// Returns a mutable reference to the record stored under `id`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn get_mut(&mut self, id: i64) -> Option<&mut V> {
        self.raw.get_mut(id)
    }

    /// Returns `true` if a record is stored under `id`.
    #[must_use]
    pub fn contains_key(&self, id: i64) -> bool {
        self.raw.search(id).is_some()
    }

    /// Inserts `record` under `id` and returns a mutable reference to it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`] if `id` is already present. The existing record is
    /// not modified and `record` is dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use catalog_tree::{Error, RecordIndex};
    ///
    /// let mut index = RecordIndex::new();
    /// assert!(index.insert(37, "a").is_ok());
    /// assert_eq!(index.insert(37, "b"), Err(Error::DuplicateKey(37)));
    /// assert_eq!(index.get(37), Some(&"a"));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, id: i64, record: V) -> Result<&mut V> {
        self.raw.insert(id, record).map_err(|_| Error::DuplicateKey(id))
    }

    /// Removes the record stored under `id` and returns it.
    ///
    /// # Examples
    ///
    /// ```
    /// use catalog_tree::RecordIndex;
    ///
    /// let mut index = RecordIndex::new();
    /// index.insert(1, "a").unwrap();
    /// assert_eq!(index.remove(1), Some("a"));
    /// assert_eq!(index.remove(1), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove(&mut self, id: i64) -> Option<V> {
        self.raw.remove(id)
    }

    /// Iterates over the records whose ids fall in `lo..=hi`, in increasing id order.
    ///
    /// An inverted range (`lo > hi`) yields nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use catalog_tree::RecordIndex;
    ///
    /// let mut index = RecordIndex::new();
    /// for id in [5, 1, 9, 3, 7] {
    ///     index.insert(id, id * 10).unwrap();
    /// }
    ///
    /// let hits: Vec<_> = index.range(2, 7).collect();
    /// assert_eq!(hits, [(3, &30), (5, &50), (7, &70)]);
    /// assert_eq!(index.range(7, 2).next(), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n + k) for k yielded records.
    pub fn range(&self, lo: i64, hi: i64) -> Range<'_, V> {
        Range {
            raw: Some(&self.raw),
            walk: BoundedInOrder::new(&self.raw, lo, hi),
        }
    }

    /// Iterates over all records in increasing id order.
    pub fn iter(&self) -> Range<'_, V> {
        self.range(i64::MIN, i64::MAX)
    }

    /// Returns the record(s) whose id is closest to `target`, sorted by id.
    ///
    /// At most two records can tie (one on each side of `target`). The result is empty only
    /// when the index is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use catalog_tree::RecordIndex;
    ///
    /// let mut index = RecordIndex::new();
    /// index.insert(10, 'a').unwrap();
    /// index.insert(20, 'b').unwrap();
    ///
    /// assert_eq!(index.nearest(15), [(10, &'a'), (20, &'b')]);
    /// assert_eq!(index.nearest(20), [(20, &'b')]);
    /// assert_eq!(index.nearest(-100), [(10, &'a')]);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n); only the search path for `target` is visited.
    #[must_use]
    pub fn nearest(&self, target: i64) -> Vec<(i64, &V)> {
        self.raw.nearest(target).into_iter().map(|node| self.raw.entry(node)).collect()
    }
}

impl<V: fmt::Debug> fmt::Debug for RecordIndex<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V> Default for RecordIndex<V> {
    fn default() -> Self {
        RecordIndex::new()
    }
}

impl<'a, V> IntoIterator for &'a RecordIndex<V> {
    type Item = (i64, &'a V);
    type IntoIter = Range<'a, V>;

    fn into_iter(self) -> Range<'a, V> {
        self.iter()
    }
}

/// An iterator over a sub-range of records in a [`RecordIndex`].
///
/// This `struct` is created by the [`range`] and [`iter`] methods on [`RecordIndex`].
///
/// [`range`]: RecordIndex::range
/// [`iter`]: RecordIndex::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Range<'a, V> {
    // `None` for an iterator that was never attached to an index.
    raw: Option<&'a RawLlrbMap<V>>,
    walk: BoundedInOrder,
}

impl<'a, V> Iterator for Range<'a, V> {
    type Item = (i64, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let raw = self.raw?;
        let node = self.walk.next_node(raw)?;
        Some(raw.entry(node))
    }
}

impl<V> FusedIterator for Range<'_, V> {}

impl<V> Clone for Range<'_, V> {
    fn clone(&self) -> Self {
        Range {
            raw: self.raw,
            walk: self.walk.clone(),
        }
    }
}

impl<V> fmt::Debug for Range<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Range").finish_non_exhaustive()
    }
}

impl<V> Default for Range<'_, V> {
    /// Creates an empty `record_index::Range`.
    ///
    /// ```
    /// use catalog_tree::record_index;
    ///
    /// let mut range: record_index::Range<'_, u8> = Default::default();
    /// assert_eq!(range.next(), None);
    /// ```
    fn default() -> Self {
        Range {
            raw: None,
            walk: BoundedInOrder::empty(),
        }
    }
}
