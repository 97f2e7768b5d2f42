use crate::commands::helpers::save_all;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{LibrisError, Result};
use crate::library::{ItemSelector, Library};
use crate::model::{validate_borrower, Loan, LoanPolicy};
use crate::store::StorageBackend;
use chrono::NaiveDate;

/// Lends one copy of the selected record to `borrower`.
///
/// Checks run in order: the record must exist, the borrower must not already
/// hold it (unless the policy allows repeat loans), and a copy must be on the
/// shelf. Nothing is written unless all of them pass.
pub fn run<B: StorageBackend>(
    library: &mut Library,
    backend: &B,
    policy: &LoanPolicy,
    selector: &ItemSelector,
    borrower: &str,
    today: NaiveDate,
) -> Result<CmdResult> {
    let index = library.resolve(selector)?;
    let name = validate_borrower(borrower)?;

    let record = &library.items[index];
    let slot = record.id;
    let title = record.title.clone();

    if !policy.allow_repeat_loans && library.borrower(&name).is_some_and(|b| b.holds(slot)) {
        return Err(LibrisError::AlreadyHeld {
            borrower: name,
            title,
        });
    }
    if record.available == 0 {
        return Err(LibrisError::NoCopiesAvailable(title));
    }

    library.items[index].check_out();
    let loan = Loan {
        slot,
        title,
        borrowed_on: today,
        due_on: policy.due_date(today),
    };
    library.borrower_entry(&name).loans.push(loan.clone());

    save_all(library, backend)?;
    tracing::info!(slot = %slot, borrower = %name, due = %loan.due_on, "lent a copy");

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "{} borrowed \"{}\", due {}",
        name, loan.title, loan.due_on
    )));
    result.affected_items.push(library.items[index].clone());
    result.affected_loans.push(loan);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::helpers::fixtures::*;
    use crate::store::memory::InMemoryStore;
    use crate::store::StoreKind;

    fn title(t: &str) -> ItemSelector {
        ItemSelector::Title(t.to_string())
    }

    #[test]
    fn lends_a_copy_and_persists_both_stores() {
        let store = InMemoryStore::new();
        let mut lib = library(&[("Foundation", 1), ("Dune", 2)]);
        let result = run(
            &mut lib,
            &store,
            &LoanPolicy::default(),
            &title("dune"),
            "Alice",
            today(),
        )
        .unwrap();

        let loan = &result.affected_loans[0];
        assert_eq!(loan.due_on, date(2024, 3, 15));
        let dune = &lib.items()[1];
        assert_eq!((dune.total, dune.borrowed, dune.available), (2, 1, 1));
        assert_eq!(
            ledger_lines(&store),
            vec!["Alice | 2 | Dune | 2024-03-01 | 2024-03-15"]
        );
        assert_persisted(&lib, &store);
        assert_invariants(&lib);
    }

    #[test]
    fn resolves_by_position() {
        let store = InMemoryStore::new();
        let mut lib = library(&[("Foundation", 1), ("Dune", 2)]);
        run(
            &mut lib,
            &store,
            &LoanPolicy::default(),
            &ItemSelector::Position(1),
            "Bob",
            today(),
        )
        .unwrap();
        assert_eq!(lib.borrower("Bob").unwrap().loans[0].title, "Foundation");
    }

    #[test]
    fn runs_out_of_copies() {
        let store = InMemoryStore::new();
        let mut lib = library(&[("Dune", 2)]);
        let policy = LoanPolicy::default();
        run(&mut lib, &store, &policy, &title("Dune"), "Alice", today()).unwrap();
        run(&mut lib, &store, &policy, &title("Dune"), "Bob", today()).unwrap();
        let err = run(&mut lib, &store, &policy, &title("Dune"), "Carol", today()).unwrap_err();

        assert!(matches!(err, LibrisError::NoCopiesAvailable(_)));
        let dune = &lib.items()[0];
        assert_eq!((dune.borrowed, dune.available), (2, 0));
        assert!(lib.borrower("Carol").is_none());
        assert_invariants(&lib);
    }

    #[test]
    fn one_borrower_can_take_every_copy_when_repeat_loans_are_allowed() {
        let store = InMemoryStore::new();
        let mut lib = library(&[("Dune", 2)]);
        let policy = LoanPolicy {
            allow_repeat_loans: true,
            ..LoanPolicy::default()
        };
        run(&mut lib, &store, &policy, &title("Dune"), "Alice", today()).unwrap();
        run(&mut lib, &store, &policy, &title("Dune"), "Alice", today()).unwrap();
        let err = run(&mut lib, &store, &policy, &title("Dune"), "Bob", today()).unwrap_err();

        assert!(matches!(err, LibrisError::NoCopiesAvailable(_)));
        let dune = &lib.items()[0];
        assert_eq!((dune.borrowed, dune.available), (2, 0));
        assert_eq!(lib.borrower("Alice").unwrap().loans.len(), 2);
    }

    #[test]
    fn refuses_a_second_copy_to_the_same_borrower() {
        let store = InMemoryStore::new();
        let mut lib = library(&[("Dune", 3)]);
        let policy = LoanPolicy::default();
        run(&mut lib, &store, &policy, &title("Dune"), "Alice", today()).unwrap();
        let writes = store.write_count(StoreKind::Inventory);

        let err = run(&mut lib, &store, &policy, &title("DUNE"), "Alice", today()).unwrap_err();
        assert!(matches!(err, LibrisError::AlreadyHeld { .. }));
        assert_eq!(store.write_count(StoreKind::Inventory), writes);
        assert_eq!(lib.items()[0].borrowed, 1);
    }

    #[test]
    fn unknown_items_and_bad_names_fail() {
        let store = InMemoryStore::new();
        let mut lib = library(&[("Dune", 1)]);
        let policy = LoanPolicy::default();
        assert!(matches!(
            run(&mut lib, &store, &policy, &title("Emma"), "Alice", today()),
            Err(LibrisError::NotFound(_))
        ));
        assert!(matches!(
            run(&mut lib, &store, &policy, &ItemSelector::Position(2), "Alice", today()),
            Err(LibrisError::NotFound(_))
        ));
        assert!(matches!(
            run(&mut lib, &store, &policy, &title("Dune"), "A | B", today()),
            Err(LibrisError::InvalidBorrower(_))
        ));
        assert_eq!(store.write_count(StoreKind::Ledger), 0);
    }
}
