use catalog_tree::{BorrowOutcome, Error, Library, ReturnOutcome};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn ids<'a>(books: impl IntoIterator<Item = &'a catalog_tree::Book>) -> Vec<i64> {
    books.into_iter().map(|book| book.id()).collect()
}

// ─── Record lifecycle ────────────────────────────────────────────────────────

#[test]
fn inserted_book_reads_back_unchanged() {
    let mut library = Library::new();
    library.insert_book(7, "Beloved", "Toni Morrison", true).unwrap();

    let book = library.lookup(7).unwrap();
    assert_eq!(book.id(), 7);
    assert_eq!(book.title(), "Beloved");
    assert_eq!(book.author(), "Toni Morrison");
    assert!(book.is_available());
    assert_eq!(book.borrowed_by(), None);
    assert!(book.reservations().is_empty());
}

#[test]
fn duplicate_insert_keeps_the_first_record() {
    let mut library = Library::new();
    library.insert_book(7, "Beloved", "Toni Morrison", true).unwrap();
    library.borrow_book(1, 7, 1).unwrap();

    assert_eq!(
        library.insert_book(7, "Jazz", "Toni Morrison", true),
        Err(Error::DuplicateKey(7))
    );

    let book = library.lookup(7).unwrap();
    assert_eq!(book.title(), "Beloved");
    assert_eq!(book.borrowed_by(), Some(1));
    assert_eq!(library.len(), 1);
}

#[test]
fn missing_books_report_not_found() {
    let mut library = Library::new();
    assert_eq!(library.lookup(3).err(), Some(Error::NotFound(3)));
    assert_eq!(library.borrow_book(1, 3, 1), Err(Error::NotFound(3)));
    assert_eq!(library.return_book(1, 3), Err(Error::NotFound(3)));
    assert_eq!(library.delete_book(3), Err(Error::NotFound(3)));
    assert!(library.is_empty());
}

// ─── Circulation ─────────────────────────────────────────────────────────────

#[test]
fn delete_cancels_reservations_in_priority_order() {
    let (a, b) = (101, 102);
    let mut library = Library::new();
    library.insert_book(20, "Middlemarch", "George Eliot", false).unwrap();

    assert_eq!(library.borrow_book(a, 20, 2), Ok(BorrowOutcome::Reserved));
    assert_eq!(library.borrow_book(b, 20, 1), Ok(BorrowOutcome::Reserved));
    assert_eq!(library.lookup(20).unwrap().reservation_patrons(), vec![b, a]);

    assert_eq!(library.delete_book(20), Ok(vec![b, a]));
    assert_eq!(library.lookup(20).err(), Some(Error::NotFound(20)));
}

#[test]
fn delete_without_reservations_cancels_nobody() {
    let mut library = Library::new();
    library.insert_book(1, "A", "B", true).unwrap();
    assert_eq!(library.delete_book(1), Ok(Vec::new()));
    assert!(library.is_empty());
}

#[test]
fn return_hands_book_to_next_in_queue() {
    let mut library = Library::new();
    library.insert_book(5, "Dune", "Frank Herbert", true).unwrap();

    assert_eq!(library.borrow_book(1, 5, 3), Ok(BorrowOutcome::Lent));
    assert_eq!(library.borrow_book(2, 5, 3), Ok(BorrowOutcome::Reserved));

    assert_eq!(library.return_book(1, 5), Ok(ReturnOutcome::Reallocated(2)));
    assert_eq!(library.return_book(1, 5), Err(Error::NotBorrower { patron: 1, book: 5 }));

    let book = library.lookup(5).unwrap();
    assert!(!book.is_available());
    assert_eq!(book.borrowed_by(), Some(2));
    assert!(book.reservations().is_empty());

    assert_eq!(library.return_book(2, 5), Ok(ReturnOutcome::NowAvailable));
    let book = library.lookup(5).unwrap();
    assert!(book.is_available());
    assert_eq!(book.borrowed_by(), None);
}

#[test]
fn rejected_return_changes_nothing() {
    let mut library = Library::new();
    library.insert_book(5, "Dune", "Frank Herbert", true).unwrap();
    library.borrow_book(1, 5, 1).unwrap();
    library.borrow_book(2, 5, 1).unwrap();

    assert_eq!(library.return_book(3, 5), Err(Error::NotBorrower { patron: 3, book: 5 }));

    let book = library.lookup(5).unwrap();
    assert_eq!(book.borrowed_by(), Some(1));
    assert_eq!(book.reservation_patrons(), vec![2]);
}

#[test]
fn returning_an_available_book_is_rejected() {
    let mut library = Library::new();
    library.insert_book(5, "Dune", "Frank Herbert", true).unwrap();
    assert_eq!(library.return_book(1, 5), Err(Error::NotBorrower { patron: 1, book: 5 }));
    assert!(library.lookup(5).unwrap().is_available());
}

#[test]
fn equal_priorities_are_served_in_arrival_order() {
    let mut library = Library::new();
    library.insert_book(1, "A", "B", true).unwrap();
    library.borrow_book(10, 1, 0).unwrap();
    for patron in [11, 12, 13] {
        library.borrow_book(patron, 1, 4).unwrap();
    }
    library.borrow_book(14, 1, 2).unwrap();

    assert_eq!(library.return_book(10, 1), Ok(ReturnOutcome::Reallocated(14)));
    assert_eq!(library.return_book(14, 1), Ok(ReturnOutcome::Reallocated(11)));
    assert_eq!(library.return_book(11, 1), Ok(ReturnOutcome::Reallocated(12)));
    assert_eq!(library.return_book(12, 1), Ok(ReturnOutcome::Reallocated(13)));
    assert_eq!(library.return_book(13, 1), Ok(ReturnOutcome::NowAvailable));
}

// ─── Queries ─────────────────────────────────────────────────────────────────

#[test]
fn range_lists_books_in_id_order() {
    let mut library = Library::new();
    for id in [50, 10, 40, 20, 30] {
        library.insert_book(id, "t", "a", true).unwrap();
    }

    assert_eq!(ids(library.range(15, 45)), vec![20, 30, 40]);
    assert_eq!(ids(library.range(10, 10)), vec![10]);
    assert_eq!(ids(library.range(45, 15)), Vec::<i64>::new());
    assert_eq!(ids(library.range(60, 70)), Vec::<i64>::new());
    assert_eq!(ids(&library), vec![10, 20, 30, 40, 50]);
}

#[test]
fn nearest_finds_exact_match_and_ties() {
    let mut library = Library::new();
    assert!(library.nearest(15).is_empty());

    library.insert_book(10, "t", "a", true).unwrap();
    library.insert_book(20, "t", "a", true).unwrap();

    assert_eq!(ids(library.nearest(15)), vec![10, 20]);
    assert_eq!(ids(library.nearest(20)), vec![20]);
    assert_eq!(ids(library.nearest(19)), vec![20]);
    assert_eq!(ids(library.nearest(-5)), vec![10]);
}

// ─── Instrumentation ─────────────────────────────────────────────────────────

#[test]
fn fresh_library_has_zero_rebalance_events() {
    let library = Library::with_capacity(16);
    assert_eq!(library.rebalance_events(), 0);
}

#[test]
fn circulation_does_not_rebalance() {
    let mut library = Library::new();
    for id in 0..32 {
        library.insert_book(id, "t", "a", true).unwrap();
    }
    let events = library.rebalance_events();

    library.borrow_book(1, 3, 1).unwrap();
    library.borrow_book(2, 3, 1).unwrap();
    library.return_book(1, 3).unwrap();
    let _ = library.range(0, 31).count();
    let _ = library.nearest(100);

    assert_eq!(library.rebalance_events(), events);
}

#[derive(Debug, Clone)]
enum LibraryOp {
    Insert(i64, bool),
    Delete(i64),
    Borrow(i64, i64, i64),
    Return(i64, i64),
}

fn library_op_strategy() -> impl Strategy<Value = LibraryOp> {
    let id = 0i64..64;
    let patron = 0i64..8;
    prop_oneof![
        4 => (id.clone(), any::<bool>()).prop_map(|(id, available)| LibraryOp::Insert(id, available)),
        2 => id.clone().prop_map(LibraryOp::Delete),
        3 => (patron.clone(), id.clone(), 0i64..4).prop_map(|(p, id, pr)| LibraryOp::Borrow(p, id, pr)),
        3 => (patron, id).prop_map(|(p, id)| LibraryOp::Return(p, id)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn counter_never_decreases(ops in proptest::collection::vec(library_op_strategy(), 0..400)) {
        let mut library = Library::new();
        let mut events = 0;

        for op in ops {
            match op {
                LibraryOp::Insert(id, available) => {
                    let _ = library.insert_book(id, "t", "a", available);
                }
                LibraryOp::Delete(id) => {
                    let _ = library.delete_book(id);
                }
                LibraryOp::Borrow(patron, id, priority) => {
                    let _ = library.borrow_book(patron, id, priority);
                }
                LibraryOp::Return(patron, id) => {
                    let before = library.lookup(id).ok().map(|book| book.borrowed_by());
                    let result = library.return_book(patron, id);
                    if let Err(Error::NotBorrower { .. }) = result {
                        let after = library.lookup(id).ok().map(|book| book.borrowed_by());
                        prop_assert_eq!(before, after);
                    }
                }
            }

            prop_assert!(library.rebalance_events() >= events);
            events = library.rebalance_events();

            let all = ids(&library);
            prop_assert!(all.windows(2).all(|pair| pair[0] < pair[1]));
            prop_assert_eq!(all.len(), library.len());
        }
    }
}
