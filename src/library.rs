//! Circulation rules for books stored in a [`RecordIndex`].
//!
//! A book is either available or borrowed. Borrowing a book that is out converts the request
//! into a reservation on that book's [`ReservationQueue`]. Returning a book hands it straight
//! to the most urgent waiting patron, and deleting a book cancels everything still queued.

use alloc::string::String;
use alloc::vec::Vec;
use core::iter::FusedIterator;

use tracing::debug;

use crate::error::{Error, Result};
use crate::record_index::{self, RecordIndex};
use crate::reservation::{ArrivalOrder, Reservation, ReservationQueue};
use crate::{BookId, PatronId, Priority};

/// A catalog entry together with its pending reservations.
#[derive(Clone, Debug)]
pub struct Book {
    id: BookId,
    title: String,
    author: String,
    available: bool,
    borrowed_by: Option<PatronId>,
    reservations: ReservationQueue,
}

impl Book {
    fn new(id: BookId, title: String, author: String, available: bool) -> Self {
        Self {
            id,
            title,
            author,
            available,
            borrowed_by: None,
            reservations: ReservationQueue::new(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> BookId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.available
    }

    /// The patron currently holding the book.
    ///
    /// A book inserted as unavailable is out but has no recorded borrower.
    #[must_use]
    pub const fn borrowed_by(&self) -> Option<PatronId> {
        self.borrowed_by
    }

    #[must_use]
    pub const fn reservations(&self) -> &ReservationQueue {
        &self.reservations
    }

    /// Patrons waiting for this book, in the order they would be served.
    #[must_use]
    pub fn reservation_patrons(&self) -> Vec<PatronId> {
        self.reservations.patrons()
    }
}

/// What [`Library::borrow_book`] did with the request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BorrowOutcome {
    /// The book was available and is now held by the patron.
    Lent,
    /// The book was out; the patron joined its reservation queue.
    Reserved,
}

/// What [`Library::return_book`] did with the returned book.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReturnOutcome {
    /// Nobody was waiting; the book is back on the shelf.
    NowAvailable,
    /// The book went directly to the next patron in the queue.
    Reallocated(PatronId),
}

/// A catalog of books indexed by id.
///
/// # Examples
///
/// ```
/// use catalog_tree::{BorrowOutcome, Library, ReturnOutcome};
///
/// let mut library = Library::new();
/// library.insert_book(5, "Dune", "Frank Herbert", true).unwrap();
///
/// assert_eq!(library.borrow_book(1, 5, 3), Ok(BorrowOutcome::Lent));
/// assert_eq!(library.borrow_book(2, 5, 1), Ok(BorrowOutcome::Reserved));
///
/// assert_eq!(library.return_book(1, 5), Ok(ReturnOutcome::Reallocated(2)));
/// assert_eq!(library.lookup(5).unwrap().borrowed_by(), Some(2));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Library {
    books: RecordIndex<Book>,
    // Stamped on each reservation so equal priorities are served first come, first served.
    next_arrival: u64,
}

impl Library {
    /// Creates an empty library.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            books: RecordIndex::new(),
            next_arrival: 0,
        }
    }

    /// Creates an empty library with room for at least `capacity` books.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            books: RecordIndex::with_capacity(capacity),
            next_arrival: 0,
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.books.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Rotations and color flips the underlying index has performed so far.
    #[must_use]
    pub const fn rebalance_events(&self) -> u64 {
        self.books.rebalance_events()
    }

    /// Adds a book with no borrower and no reservations.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateKey`] if a book with `id` already exists; that book is unchanged.
    pub fn insert_book(
        &mut self,
        id: BookId,
        title: impl Into<String>,
        author: impl Into<String>,
        available: bool,
    ) -> Result<()> {
        self.books.insert(id, Book::new(id, title.into(), author.into(), available))?;
        debug!(book_id = id, available, "book_inserted");
        Ok(())
    }

    /// Returns the book stored under `id`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if there is no such book.
    pub fn lookup(&self, id: BookId) -> Result<&Book> {
        self.books.get(id).ok_or(Error::NotFound(id))
    }

    /// Iterates over the books with ids in `lo..=hi`, in increasing id order.
    pub fn range(&self, lo: BookId, hi: BookId) -> Books<'_> {
        Books {
            inner: self.books.range(lo, hi),
        }
    }

    /// Iterates over every book in increasing id order.
    pub fn books(&self) -> Books<'_> {
        Books {
            inner: self.books.iter(),
        }
    }

    /// Returns the book(s) whose id is closest to `target`, sorted by id.
    ///
    /// Two books tie when they sit at the same distance on either side of `target`.
    #[must_use]
    pub fn nearest(&self, target: BookId) -> Vec<&Book> {
        self.books.nearest(target).into_iter().map(|(_, book)| book).collect()
    }

    /// Lends the book to `patron`, or queues a reservation at `priority` if it is out.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if there is no such book.
    pub fn borrow_book(&mut self, patron: PatronId, id: BookId, priority: Priority) -> Result<BorrowOutcome> {
        let book = self.books.get_mut(id).ok_or(Error::NotFound(id))?;

        if book.available {
            book.available = false;
            book.borrowed_by = Some(patron);
            debug!(book_id = id, patron_id = patron, "book_lent");
            return Ok(BorrowOutcome::Lent);
        }

        let arrival = ArrivalOrder(self.next_arrival);
        self.next_arrival += 1;
        book.reservations.push(Reservation::new(patron, priority, arrival));
        debug!(
            book_id = id,
            patron_id = patron,
            priority,
            queued = book.reservations.len(),
            "book_reserved"
        );
        Ok(BorrowOutcome::Reserved)
    }

    /// Takes the book back from `patron` and passes it to the next waiting patron, if any.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if there is no such book.
    /// - [`Error::NotBorrower`] if `patron` is not the one holding it. Nothing changes.
    pub fn return_book(&mut self, patron: PatronId, id: BookId) -> Result<ReturnOutcome> {
        let book = self.books.get_mut(id).ok_or(Error::NotFound(id))?;

        if book.available || book.borrowed_by != Some(patron) {
            return Err(Error::NotBorrower { patron, book: id });
        }

        // The book never rests on the shelf while someone is queued for it.
        if let Ok(next) = book.reservations.extract_min() {
            book.borrowed_by = Some(next.patron);
            debug!(book_id = id, from = patron, to = next.patron, "book_reallocated");
            return Ok(ReturnOutcome::Reallocated(next.patron));
        }

        book.available = true;
        book.borrowed_by = None;
        debug!(book_id = id, patron_id = patron, "book_returned");
        Ok(ReturnOutcome::NowAvailable)
    }

    /// Removes the book and cancels its reservations.
    ///
    /// Returns the patrons whose reservations were cancelled, in the order they would have
    /// been served.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if there is no such book.
    pub fn delete_book(&mut self, id: BookId) -> Result<Vec<PatronId>> {
        let mut book = self.books.remove(id).ok_or(Error::NotFound(id))?;

        let mut cancelled = Vec::with_capacity(book.reservations.len());
        while let Ok(reservation) = book.reservations.extract_min() {
            cancelled.push(reservation.patron);
        }

        debug!(book_id = id, cancelled = cancelled.len(), "book_deleted");
        Ok(cancelled)
    }
}

/// An iterator over books in id order.
///
/// This `struct` is created by [`Library::range`] and [`Library::books`].
#[derive(Clone, Debug, Default)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Books<'a> {
    inner: record_index::Range<'a, Book>,
}

impl<'a> Iterator for Books<'a> {
    type Item = &'a Book;

    fn next(&mut self) -> Option<&'a Book> {
        self.inner.next().map(|(_, book)| book)
    }
}

impl FusedIterator for Books<'_> {}

impl<'a> IntoIterator for &'a Library {
    type Item = &'a Book;
    type IntoIter = Books<'a>;

    fn into_iter(self) -> Books<'a> {
        self.books()
    }
}
