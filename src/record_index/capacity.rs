use super::RecordIndex;
use crate::raw::RawLlrbMap;

impl<V> RecordIndex<V> {
    /// Creates an empty index with room for at least `capacity` records.
    ///
    /// This is an extension and is not part of the standard `BTreeMap` API.
    ///
    /// # Examples
    ///
    /// ```
    /// use catalog_tree::RecordIndex;
    ///
    /// let index: RecordIndex<u32> = RecordIndex::with_capacity(32);
    /// assert!(index.is_empty());
    /// assert!(index.capacity() >= 32);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        RecordIndex {
            raw: RawLlrbMap::with_capacity(capacity),
        }
    }

    /// Returns how many records the index can hold before reallocating.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }
}
