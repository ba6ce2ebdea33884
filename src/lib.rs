//! A library catalog indexed by a left-leaning red-black tree.
//!
//! This crate provides [`RecordIndex`], an `i64`-keyed ordered index that keeps itself
//! height-balanced and counts the rotations and color flips it performs, and [`Library`],
//! which stores books in a `RecordIndex` and gives each book a [`ReservationQueue`] of
//! patrons waiting for it.
//!
//! # Example
//!
//! ```
//! use catalog_tree::{BorrowOutcome, Error, Library};
//!
//! let mut library = Library::new();
//! library.insert_book(20, "Middlemarch", "George Eliot", false).unwrap();
//! library.insert_book(10, "Emma", "Jane Austen", true).unwrap();
//!
//! // Book 20 is out, so both requests become reservations.
//! assert_eq!(library.borrow_book(1, 20, 2), Ok(BorrowOutcome::Reserved));
//! assert_eq!(library.borrow_book(2, 20, 1), Ok(BorrowOutcome::Reserved));
//!
//! // Deleting it cancels them, most urgent first.
//! assert_eq!(library.delete_book(20), Ok(vec![2, 1]));
//! assert_eq!(library.lookup(20).err(), Some(Error::NotFound(20)));
//!
//! // Nearest-id search reports ties on both sides of the target.
//! library.insert_book(30, "Ulysses", "James Joyce", true).unwrap();
//! let ids: Vec<i64> = library.nearest(20).iter().map(|book| book.id()).collect();
//! assert_eq!(ids, [10, 30]);
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Strict inserts** - Inserting an id that already exists fails and leaves the stored record alone
//! - **Bounded scans** - Range and nearest-id queries only visit the part of the tree they need
//! - **Arena storage** - Nodes and records live in slot arenas linked by 32-bit handles
//!
//! # Implementation
//!
//! The index is a left-leaning red-black tree. Insertion restores balance bottom-up with
//! rotate-left, rotate-right and color-flip steps; deletion additionally borrows red links
//! from siblings on the way down so that every deletion shape stays balanced. Reservation
//! queues are binary min-heaps ordered by priority and then by arrival.

#![no_std]
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

mod error;
mod raw;

pub mod library;
pub mod record_index;
pub mod reservation;

pub use error::{EmptyQueue, Error, Result};
pub use library::{Book, BorrowOutcome, Library, ReturnOutcome};
pub use record_index::RecordIndex;
pub use reservation::{ArrivalOrder, Reservation, ReservationQueue};

/// Unique id of a book.
pub type BookId = i64;

/// Id of a patron borrowing or reserving books.
pub type PatronId = i64;

/// Reservation urgency; lower values are served first.
pub type Priority = i64;
