//! Returning a borrowed copy.
//!
//! Named `give_back` because `return` is a keyword.

use crate::commands::helpers::save_all;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{LibrisError, Result};
use crate::library::{ItemSelector, Library};
use crate::store::StorageBackend;
use chrono::NaiveDate;

pub fn run<B: StorageBackend>(
    library: &mut Library,
    backend: &B,
    selector: &ItemSelector,
    borrower: &str,
    today: NaiveDate,
) -> Result<CmdResult> {
    let index = library.resolve(selector)?;
    let name = borrower.trim();
    let slot = library.items[index].id;
    let title = library.items[index].title.clone();

    let not_held = || LibrisError::NotHeldByBorrower {
        borrower: name.to_string(),
        title: title.clone(),
    };
    let holder = library.borrower_mut(name).ok_or_else(not_held)?;
    // With repeat loans the copy due soonest goes back first
    let loan_index = holder
        .loans
        .iter()
        .enumerate()
        .filter(|(_, loan)| loan.slot == slot)
        .min_by_key(|(_, loan)| loan.due_on)
        .map(|(i, _)| i)
        .ok_or_else(not_held)?;
    let loan = holder.loans.remove(loan_index);
    library.prune_borrowers();
    library.items[index].check_in();

    save_all(library, backend)?;
    tracing::info!(slot = %slot, borrower = %name, "copy returned");

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "{} returned \"{}\"",
        name, loan.title
    )));
    if let Some(days) = loan.days_overdue(today) {
        result.add_message(CmdMessage::warning(format!(
            "\"{}\" was due {} and came back {} day(s) late",
            loan.title, loan.due_on, days
        )));
    }
    result.affected_items.push(library.items[index].clone());
    result.affected_loans.push(loan);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::borrow;
    use crate::commands::helpers::fixtures::*;
    use crate::commands::MessageLevel;
    use crate::model::LoanPolicy;
    use crate::store::memory::InMemoryStore;
    use crate::store::StoreKind;

    fn title(t: &str) -> ItemSelector {
        ItemSelector::Title(t.to_string())
    }

    #[test]
    fn returns_the_copy_and_drops_the_empty_borrower() {
        let store = InMemoryStore::new();
        let mut lib = library(&[("Dune", 2)]);
        borrow::run(
            &mut lib,
            &store,
            &LoanPolicy::default(),
            &title("Dune"),
            "Alice",
            today(),
        )
        .unwrap();

        let result = run(&mut lib, &store, &title("dune"), "Alice", today()).unwrap();
        assert_eq!(result.messages.len(), 1);
        let dune = &lib.items()[0];
        assert_eq!((dune.total, dune.borrowed, dune.available), (2, 0, 2));
        assert!(lib.borrowers().is_empty());
        assert!(ledger_lines(&store).is_empty());
        assert_persisted(&lib, &store);
        assert_invariants(&lib);
    }

    #[test]
    fn keeps_the_borrowers_other_loans() {
        let store = InMemoryStore::new();
        let mut lib = library(&[("Dune", 1), ("Emma", 1)]);
        let policy = LoanPolicy::default();
        borrow::run(&mut lib, &store, &policy, &title("Dune"), "Alice", today()).unwrap();
        borrow::run(&mut lib, &store, &policy, &title("Emma"), "Alice", today()).unwrap();

        run(&mut lib, &store, &ItemSelector::Position(1), "Alice", today()).unwrap();
        let alice = lib.borrower("Alice").unwrap();
        assert_eq!(alice.loans.len(), 1);
        assert_eq!(alice.loans[0].title, "Emma");
        assert_invariants(&lib);
    }

    #[test]
    fn late_returns_carry_an_overdue_notice() {
        let store = InMemoryStore::new();
        let mut lib = library(&[("Dune", 1)]);
        borrow::run(
            &mut lib,
            &store,
            &LoanPolicy::default(),
            &title("Dune"),
            "Alice",
            today(),
        )
        .unwrap();

        let result = run(&mut lib, &store, &title("Dune"), "Alice", date(2024, 3, 20)).unwrap();
        let warning = result
            .messages
            .iter()
            .find(|m| m.level == MessageLevel::Warning)
            .unwrap();
        assert!(warning.content.contains("5 day(s) late"));
    }

    #[test]
    fn not_held_fails_without_writing() {
        let store = InMemoryStore::new();
        let mut lib = library(&[("Dune", 2), ("Emma", 1)]);
        borrow::run(
            &mut lib,
            &store,
            &LoanPolicy::default(),
            &title("Emma"),
            "Alice",
            today(),
        )
        .unwrap();
        let inventory_writes = store.write_count(StoreKind::Inventory);
        let ledger_writes = store.write_count(StoreKind::Ledger);

        for name in ["Alice", "Bob"] {
            let err = run(&mut lib, &store, &title("Dune"), name, today()).unwrap_err();
            assert!(matches!(err, LibrisError::NotHeldByBorrower { .. }));
        }
        assert!(matches!(
            run(&mut lib, &store, &title("Persuasion"), "Alice", today()),
            Err(LibrisError::NotFound(_))
        ));
        assert_eq!(store.write_count(StoreKind::Inventory), inventory_writes);
        assert_eq!(store.write_count(StoreKind::Ledger), ledger_writes);
    }

    #[test]
    fn repeat_loans_return_the_earliest_due_first() {
        let mut lib = library(&[("Dune", 2)]);
        lib.items[0].check_out();
        lib.items[0].check_out();
        lib.borrowers.push(borrower(
            "Alice",
            vec![
                loan(1, "Dune", date(2024, 3, 20)),
                loan(1, "Dune", date(2024, 3, 10)),
            ],
        ));
        let store = InMemoryStore::new();
        let result = run(&mut lib, &store, &title("Dune"), "Alice", today()).unwrap();
        assert_eq!(result.affected_loans[0].due_on, date(2024, 3, 10));
        assert_eq!(lib.borrower("Alice").unwrap().loans[0].due_on, date(2024, 3, 20));
    }
}
