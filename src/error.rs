//! Error types returned by the catalog.

use thiserror::Error;

use crate::{BookId, PatronId};

/// Failures reported by [`Library`](crate::Library) and [`RecordIndex`](crate::RecordIndex).
///
/// A call that returns an error leaves the catalog exactly as it found it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum Error {
    #[error("book {0} not found")]
    NotFound(BookId),

    #[error("book {0} already exists")]
    DuplicateKey(BookId),

    #[error("patron {patron} does not hold book {book}")]
    NotBorrower { patron: PatronId, book: BookId },
}

/// Extraction was attempted on a [`ReservationQueue`](crate::ReservationQueue) with no entries.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("reservation queue is empty")]
pub struct EmptyQueue;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;
