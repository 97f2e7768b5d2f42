//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It serves as the single
//! entry point for all libris operations, regardless of the UI being used.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Owns the session state**: the [`Library`], the loan policy and the load report
//! - **Dispatches** to the appropriate command function
//! - **Normalizes inputs** (e.g., telling positions from titles)
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! ## What the API Does NOT Do
//!
//! - **Business logic**: That belongs in `commands/*.rs`
//! - **Presentation concerns**: Returns data structures, not strings
//! - **Clock reads**: every date-dependent call takes `today` from the caller
//!
//! ## Session Lifecycle
//!
//! [`LibrisApi::open`] loads both stores and reconciles them without writing.
//! [`LibrisApi::heal`] then rewrites whatever had to be repaired. The CLI always
//! calls both before running a command; tests may stop after `open` to inspect
//! the report.
//!
//! ## Generic Over StorageBackend
//!
//! - Production: `LibrisApi<FileStore>`
//! - Testing: `LibrisApi<InMemoryStore>`

use crate::commands;
use crate::error::Result;
use crate::library::{ItemSelector, Library};
use crate::model::LoanPolicy;
use crate::store::{StorageBackend, StoreKind};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

pub struct LibrisApi<B: StorageBackend> {
    backend: B,
    library: Library,
    policy: LoanPolicy,
    report: commands::LoadReport,
    data_dir: PathBuf,
    healed: bool,
}

impl<B: StorageBackend> LibrisApi<B> {
    pub fn open(
        backend: B,
        data_dir: impl Into<PathBuf>,
        policy: LoanPolicy,
        today: NaiveDate,
    ) -> Result<Self> {
        let (library, report) = commands::open::run(&backend, &policy, today)?;
        Ok(Self {
            backend,
            library,
            policy,
            report,
            data_dir: data_dir.into(),
            healed: false,
        })
    }

    /// Rewrites the stores repaired during [`open`](Self::open). Runs once;
    /// later calls are no-ops.
    pub fn heal(&mut self) -> Result<commands::CmdResult> {
        let mut result = commands::CmdResult::default();
        if self.healed {
            return Ok(result);
        }
        let (inventory, ledger) =
            commands::doctor::heal(&self.library, &self.backend, &self.report)?;
        self.healed = true;

        let repaired: Vec<String> = [(inventory, StoreKind::Inventory), (ledger, StoreKind::Ledger)]
            .into_iter()
            .filter(|(written, _)| *written)
            .map(|(_, kind)| kind.to_string())
            .collect();
        if !repaired.is_empty() {
            result.add_message(commands::CmdMessage::warning(format!(
                "Repaired the {} store ({} issue(s)); run `libris doctor` for details",
                repaired.join(" and "),
                self.report.diagnostics().count() + self.report.syncs.len()
            )));
        }
        Ok(result)
    }

    pub fn report(&self) -> &commands::LoadReport {
        &self.report
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn policy(&self) -> &LoanPolicy {
        &self.policy
    }

    pub fn add_items<I: AsRef<str>>(
        &mut self,
        title: &[I],
        quantity: u32,
    ) -> Result<commands::CmdResult> {
        let title = join_words(title);
        commands::add::run(
            &mut self.library,
            &self.backend,
            &self.policy,
            &title,
            quantity,
        )
    }

    pub fn delete_item<I: AsRef<str>>(&mut self, item: &[I]) -> Result<commands::CmdResult> {
        let selector = parse_selector(item);
        commands::delete::run(&mut self.library, &self.backend, &selector)
    }

    pub fn edit_title<I: AsRef<str>>(
        &mut self,
        position: usize,
        new_title: &[I],
    ) -> Result<commands::CmdResult> {
        let title = join_words(new_title);
        commands::edit::run(&mut self.library, &self.backend, position, &title)
    }

    pub fn borrow<I: AsRef<str>>(
        &mut self,
        item: &[I],
        borrower: &str,
        today: NaiveDate,
    ) -> Result<commands::CmdResult> {
        let selector = parse_selector(item);
        commands::borrow::run(
            &mut self.library,
            &self.backend,
            &self.policy,
            &selector,
            borrower,
            today,
        )
    }

    pub fn return_item<I: AsRef<str>>(
        &mut self,
        item: &[I],
        borrower: &str,
        today: NaiveDate,
    ) -> Result<commands::CmdResult> {
        let selector = parse_selector(item);
        commands::give_back::run(&mut self.library, &self.backend, &selector, borrower, today)
    }

    pub fn extend<I: AsRef<str>>(&mut self, title: &[I]) -> Result<commands::CmdResult> {
        let title = join_words(title);
        commands::extend::run(&mut self.library, &self.backend, &self.policy, &title)
    }

    pub fn list_items(
        &self,
        order: commands::ItemOrder,
        today: NaiveDate,
    ) -> Result<commands::CmdResult> {
        commands::list::run(&self.library, order, today)
    }

    pub fn list_borrowers(&self, today: NaiveDate) -> Result<commands::CmdResult> {
        commands::borrowers::run(&self.library, today)
    }

    pub fn find_items<I: AsRef<str>>(
        &self,
        term: &[I],
        today: NaiveDate,
    ) -> Result<commands::CmdResult> {
        let term = join_words(term);
        commands::find::run(&self.library, &term, today)
    }

    pub fn doctor_report(&self) -> commands::CmdResult {
        commands::doctor::describe(&self.report)
    }

    pub fn paths(&self) -> Result<commands::CmdResult> {
        commands::paths::run(&self.backend, &self.data_dir)
    }

    pub fn config(&self, action: ConfigAction) -> Result<commands::CmdResult> {
        commands::config::run(&self.data_dir, action)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// Multi-word input is one title: `borrow The Left Hand of Darkness`.
fn join_words<I: AsRef<str>>(inputs: &[I]) -> String {
    inputs
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<&str>>()
        .join(" ")
}

/// A single number is a position; anything else is read as one title.
fn parse_selector<I: AsRef<str>>(inputs: &[I]) -> ItemSelector {
    ItemSelector::parse(&join_words(inputs))
}

pub use crate::commands::config::ConfigAction;
pub use commands::{
    BorrowerView, CmdMessage, CmdResult, ItemOrder, ItemView, LoadReport, LoanView, MessageLevel,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LibrisError;
    use crate::store::memory::InMemoryStore;
    use crate::store::DiagnosticKind;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn api_with(store: InMemoryStore, policy: LoanPolicy) -> LibrisApi<InMemoryStore> {
        LibrisApi::open(store, "/tmp/libris-test", policy, today()).unwrap()
    }

    fn dune_with_two_copies() -> InMemoryStore {
        InMemoryStore::new().with_lines(StoreKind::Inventory, &["Dune | 2 | 0 | 2"])
    }

    fn counts(api: &LibrisApi<InMemoryStore>, position: usize) -> (u32, u32, u32) {
        let r = &api.library().items()[position - 1];
        (r.total, r.borrowed, r.available)
    }

    fn check_invariants(api: &LibrisApi<InMemoryStore>) {
        let lib = api.library();
        for record in lib.items() {
            assert_eq!(record.total, record.borrowed + record.available);
            assert_eq!(record.borrowed, lib.loan_count(record.id));
        }
    }

    #[test]
    fn distinct_borrowers_exhaust_the_copies() {
        let mut api = api_with(dune_with_two_copies(), LoanPolicy::default());
        api.heal().unwrap();

        api.borrow(&["Dune"], "Alice", today()).unwrap();
        api.borrow(&["1"], "Bob", today()).unwrap();
        let err = api.borrow(&["dune"], "Carol", today()).unwrap_err();

        assert!(matches!(err, LibrisError::NoCopiesAvailable(_)));
        assert_eq!(counts(&api, 1), (2, 2, 0));
        check_invariants(&api);
    }

    #[test]
    fn repeat_borrows_follow_the_policy() {
        let mut strict = api_with(dune_with_two_copies(), LoanPolicy::default());
        strict.borrow(&["Dune"], "Alice", today()).unwrap();
        assert!(matches!(
            strict.borrow(&["Dune"], "Alice", today()),
            Err(LibrisError::AlreadyHeld { .. })
        ));

        let lenient = LoanPolicy {
            allow_repeat_loans: true,
            ..LoanPolicy::default()
        };
        let mut api = api_with(dune_with_two_copies(), lenient);
        api.borrow(&["Dune"], "Alice", today()).unwrap();
        api.borrow(&["Dune"], "Alice", today()).unwrap();
        assert!(matches!(
            api.borrow(&["Dune"], "Bob", today()),
            Err(LibrisError::NoCopiesAvailable(_))
        ));
        assert_eq!(counts(&api, 1), (2, 2, 0));
        check_invariants(&api);
    }

    #[test]
    fn extend_moves_the_representative_due_date_by_a_week() {
        let mut api = api_with(dune_with_two_copies(), LoanPolicy::default());
        api.borrow(&["Dune"], "Alice", today()).unwrap();
        let listed = api.list_items(ItemOrder::Insertion, today()).unwrap();
        let before = listed.listed_items[0].earliest_due.unwrap();

        api.extend(&["Dune"]).unwrap();

        let listed = api.list_items(ItemOrder::Insertion, today()).unwrap();
        let after = listed.listed_items[0].earliest_due.unwrap();
        assert_eq!((after - before).num_days(), 7);
    }

    #[test]
    fn mismatched_ledger_titles_create_nobody() {
        let store = InMemoryStore::new()
            .with_lines(StoreKind::Inventory, &["Foundation | 1 | 0 | 1"])
            .with_lines(
                StoreKind::Ledger,
                &["Eve | 1 | Dune | 2024-02-01 | 2024-02-15"],
            );
        let api = api_with(store, LoanPolicy::default());

        assert_eq!(api.report().count(DiagnosticKind::CrossStoreMismatch), 1);
        assert!(api.library().borrower("Eve").is_none());
        assert!(api.list_borrowers(today()).unwrap().listed_borrowers.is_empty());
    }

    #[test]
    fn reconcile_grows_the_inventory_for_unrecorded_loans() {
        let store = InMemoryStore::new()
            .with_lines(StoreKind::Inventory, &["Dune | 1 | 0 | 1"])
            .with_lines(
                StoreKind::Ledger,
                &["Alice | 1 | Dune | 2024-02-20 | 2024-03-05"],
            );
        let mut api = api_with(store, LoanPolicy::default());
        assert_eq!(counts(&api, 1), (2, 1, 1));

        let healed = api.heal().unwrap();
        assert_eq!(healed.messages.len(), 1);
        assert_eq!(api.heal().unwrap().messages.len(), 0);
    }

    #[test]
    fn returning_an_unheld_title_writes_nothing() {
        let mut api = api_with(dune_with_two_copies(), LoanPolicy::default());
        api.heal().unwrap();
        let inventory_writes = api.backend.write_count(StoreKind::Inventory);
        let ledger_writes = api.backend.write_count(StoreKind::Ledger);

        let err = api.return_item(&["Dune"], "Alice", today()).unwrap_err();

        assert!(matches!(err, LibrisError::NotHeldByBorrower { .. }));
        assert_eq!(api.backend.write_count(StoreKind::Inventory), inventory_writes);
        assert_eq!(api.backend.write_count(StoreKind::Ledger), ledger_writes);
    }

    #[test]
    fn full_session_round_trips_through_the_stores() {
        let mut api = api_with(InMemoryStore::new(), LoanPolicy::default());
        api.add_items(&["The", "Left", "Hand", "of", "Darkness"], 2)
            .unwrap();
        api.add_items(&["Dune"], 1).unwrap();
        api.borrow(&["the left hand of darkness"], "Alice", today())
            .unwrap();
        api.borrow(&["2"], "Bob", today()).unwrap();
        api.edit_title(2, &["Dune", "Messiah"]).unwrap();
        api.return_item(&["Dune Messiah"], "Bob", today()).unwrap();
        api.delete_item(&["Dune", "Messiah"]).unwrap();
        check_invariants(&api);

        let found = api.find_items(&["darkness"], today()).unwrap();
        assert_eq!(found.listed_items.len(), 1);

        let LibrisApi { backend, library, .. } = api;
        let reopened = api_with(backend, LoanPolicy::default());
        assert!(reopened.report().is_clean());
        assert_eq!(reopened.library().items(), library.items());
        assert_eq!(reopened.library().borrowers(), library.borrowers());
    }

    #[test]
    fn selectors_treat_numbers_as_positions() {
        assert_eq!(parse_selector(&["3"]), ItemSelector::Position(3));
        assert_eq!(
            parse_selector(&["Dune", "Messiah"]),
            ItemSelector::Title("Dune Messiah".into())
        );
    }
}
