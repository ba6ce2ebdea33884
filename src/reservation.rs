//! Per-book queue of pending reservations.
//!
//! [`ReservationQueue`] is a binary min-heap ordered by `(priority, arrival)`: the numerically
//! smallest priority is served first, and reservations sharing a priority are served in the
//! order they arrived.
//!
//! # Example
//!
//! ```
//! use catalog_tree::{ArrivalOrder, Reservation, ReservationQueue};
//!
//! let mut queue = ReservationQueue::new();
//! queue.push(Reservation::new(10, 2, ArrivalOrder(0)));
//! queue.push(Reservation::new(11, 1, ArrivalOrder(1)));
//! queue.push(Reservation::new(12, 1, ArrivalOrder(2)));
//!
//! assert_eq!(queue.extract_min().map(|r| r.patron), Ok(11));
//! assert_eq!(queue.extract_min().map(|r| r.patron), Ok(12));
//! assert_eq!(queue.extract_min().map(|r| r.patron), Ok(10));
//! assert!(queue.is_empty());
//! ```

use alloc::vec::Vec;
use core::slice;

use smallvec::SmallVec;

use crate::error::EmptyQueue;
use crate::{PatronId, Priority};

/// Position of a reservation in the global arrival sequence; breaks priority ties.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ArrivalOrder(pub u64);

/// A patron's pending claim on a book.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Reservation {
    pub patron: PatronId,
    /// Lower values are served first.
    pub priority: Priority,
    pub arrival: ArrivalOrder,
}

impl Reservation {
    #[must_use]
    pub const fn new(patron: PatronId, priority: Priority, arrival: ArrivalOrder) -> Self {
        Self {
            patron,
            priority,
            arrival,
        }
    }

    #[inline]
    fn sort_key(&self) -> (Priority, ArrivalOrder) {
        (self.priority, self.arrival)
    }
}

/// A min-heap of [`Reservation`]s keyed by `(priority, arrival)`.
///
/// Most books carry only a handful of reservations, so the first few live inline.
#[derive(Clone, Debug, Default)]
pub struct ReservationQueue {
    heap: SmallVec<[Reservation; 4]>,
}

impl ReservationQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self { heap: SmallVec::new() }
    }

    /// Returns the number of pending reservations.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns `true` if no reservations are pending.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Adds a reservation.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn push(&mut self, reservation: Reservation) {
        self.heap.push(reservation);
        self.sift_up(self.heap.len() - 1);
    }

    /// Returns the reservation that would be served next, without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<&Reservation> {
        self.heap.first()
    }

    /// Removes and returns the reservation with the smallest `(priority, arrival)`.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyQueue`] if there are no reservations.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn extract_min(&mut self) -> Result<Reservation, EmptyQueue> {
        if self.heap.is_empty() {
            return Err(EmptyQueue);
        }

        let min = self.heap.swap_remove(0);
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Ok(min)
    }

    /// Iterates over pending reservations in heap order, which is not service order.
    pub fn iter(&self) -> slice::Iter<'_, Reservation> {
        self.heap.iter()
    }

    /// Returns the pending reservations in the order they would be served.
    #[must_use]
    pub fn to_sorted_vec(&self) -> Vec<Reservation> {
        let mut queue = self.clone();
        let mut sorted = Vec::with_capacity(queue.len());
        while let Ok(reservation) = queue.extract_min() {
            sorted.push(reservation);
        }
        sorted
    }

    /// Returns the waiting patrons in the order they would be served.
    #[must_use]
    pub fn patrons(&self) -> Vec<PatronId> {
        self.to_sorted_vec().into_iter().map(|reservation| reservation.patron).collect()
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.heap[parent].sort_key() <= self.heap[index].sort_key() {
                break;
            }
            self.heap.swap(parent, index);
            index = parent;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut smallest = index;

            if left < len && self.heap[left].sort_key() < self.heap[smallest].sort_key() {
                smallest = left;
            }
            if right < len && self.heap[right].sort_key() < self.heap[smallest].sort_key() {
                smallest = right;
            }
            if smallest == index {
                break;
            }

            self.heap.swap(index, smallest);
            index = smallest;
        }
    }
}

impl<'a> IntoIterator for &'a ReservationQueue {
    type Item = &'a Reservation;
    type IntoIter = slice::Iter<'a, Reservation>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Extend<Reservation> for ReservationQueue {
    fn extend<I: IntoIterator<Item = Reservation>>(&mut self, iter: I) {
        for reservation in iter {
            self.push(reservation);
        }
    }
}

impl FromIterator<Reservation> for ReservationQueue {
    fn from_iter<I: IntoIterator<Item = Reservation>>(iter: I) -> Self {
        let mut queue = ReservationQueue::new();
        queue.extend(iter);
        queue
    }
}
