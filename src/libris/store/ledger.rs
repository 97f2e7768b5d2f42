//! Ledger store codec.
//!
//! One borrower per line: the name, then one `IDX | TITLE | BORROWED ON | DUE ON`
//! group per active loan. IDX is the slot id of the borrowed record; TITLE is
//! the record's title at borrow time and must still match the inventory, or
//! the loan is dropped on load.

use super::{
    split_fields, undecodable, Diagnostic, DiagnosticKind, Loaded, StorageBackend, StoreKind, DATE_FORMAT,
};
use crate::error::Result;
use crate::model::{Borrower, InventoryRecord, Loan, LoanPolicy, SlotId, FIELD_SEPARATOR};
use chrono::NaiveDate;

const GROUP_LEN: usize = 4;

pub fn load<B: StorageBackend>(
    backend: &B,
    inventory: &[InventoryRecord],
    policy: &LoanPolicy,
    today: NaiveDate,
) -> Result<Loaded<Vec<Borrower>>> {
    let lines = backend.read_lines(StoreKind::Ledger)?;
    let loaded = parse(&lines, inventory, policy, today);
    tracing::debug!(
        borrowers = loaded.value.len(),
        diagnostics = loaded.diagnostics.len(),
        "loaded ledger"
    );
    Ok(loaded)
}

pub fn save<B: StorageBackend>(backend: &B, borrowers: &[Borrower]) -> Result<()> {
    let lines: Vec<String> = borrowers.iter().map(format_line).collect();
    backend.write_lines(StoreKind::Ledger, &lines)?;
    tracing::debug!(borrowers = borrowers.len(), "saved ledger");
    Ok(())
}

pub fn format_line(borrower: &Borrower) -> String {
    let mut fields = vec![borrower.name.clone()];
    for loan in &borrower.loans {
        fields.push(loan.slot.to_string());
        fields.push(loan.title.clone());
        fields.push(loan.borrowed_on.format(DATE_FORMAT).to_string());
        fields.push(loan.due_on.format(DATE_FORMAT).to_string());
    }
    fields.join(FIELD_SEPARATOR)
}

pub fn parse(
    lines: &[String],
    inventory: &[InventoryRecord],
    policy: &LoanPolicy,
    today: NaiveDate,
) -> Loaded<Vec<Borrower>> {
    let mut diagnostics = Vec::new();
    let mut borrowers: Vec<Borrower> = Vec::new();

    for (i, raw) in lines.iter().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        let line = i + 1;
        if let Some(diagnostic) = undecodable(StoreKind::Ledger, line, raw) {
            diagnostics.push(diagnostic);
            continue;
        }
        let Some((name, loans)) = parse_line(line, raw, inventory, policy, today, &mut diagnostics)
        else {
            continue;
        };

        let index = match borrowers.iter().position(|b| b.name == name) {
            Some(index) => index,
            None => {
                borrowers.push(Borrower::new(name));
                borrowers.len() - 1
            }
        };
        let borrower = &mut borrowers[index];
        for loan in loans {
            if !policy.allow_repeat_loans && borrower.holds(loan.slot) {
                diagnostics.push(Diagnostic::new(
                    StoreKind::Ledger,
                    DiagnosticKind::MalformedLine,
                    line,
                    format!(
                        "duplicate loan of \"{}\" by {} dropped",
                        loan.title, borrower.name
                    ),
                ));
                continue;
            }
            borrower.loans.push(loan);
        }
    }

    borrowers.retain(|b| !b.loans.is_empty());
    Loaded {
        value: borrowers,
        diagnostics,
    }
}

fn parse_line(
    line: usize,
    raw: &str,
    inventory: &[InventoryRecord],
    policy: &LoanPolicy,
    today: NaiveDate,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<(String, Vec<Loan>)> {
    let diag = |kind: DiagnosticKind, detail: String| {
        Diagnostic::new(StoreKind::Ledger, kind, line, detail)
    };

    let fields = split_fields(raw);
    let name = fields[0];
    if name.is_empty() {
        diagnostics.push(diag(
            DiagnosticKind::MalformedLine,
            "blank borrower name".to_string(),
        ));
        return None;
    }

    let groups = &fields[1..];
    if groups.len() < GROUP_LEN {
        diagnostics.push(diag(
            DiagnosticKind::MalformedLine,
            format!("no complete loan for {}", name),
        ));
        return None;
    }
    if groups.len() % GROUP_LEN != 0 {
        diagnostics.push(diag(
            DiagnosticKind::MalformedLine,
            format!("incomplete trailing loan for {} dropped", name),
        ));
    }

    // An unreadable index makes the whole line untrustworthy.
    let mut parsed = Vec::new();
    for group in groups.chunks_exact(GROUP_LEN) {
        match group[0].parse::<u32>() {
            Ok(slot) => parsed.push((SlotId(slot), group)),
            Err(_) => {
                diagnostics.push(diag(
                    DiagnosticKind::MalformedLine,
                    format!(
                        "loan index \"{}\" for {} is not an integer, borrower skipped",
                        group[0], name
                    ),
                ));
                return None;
            }
        }
    }

    let mut loans = Vec::with_capacity(parsed.len());
    for (slot, group) in parsed {
        let title = group[1];
        let Some(record) = inventory.iter().find(|r| r.id == slot) else {
            diagnostics.push(diag(
                DiagnosticKind::CrossStoreMismatch,
                format!(
                    "loan of \"{}\" by {} references unknown slot {}, dropped",
                    title, name, slot
                ),
            ));
            continue;
        };
        if record.title != title {
            diagnostics.push(diag(
                DiagnosticKind::CrossStoreMismatch,
                format!(
                    "loan by {} names \"{}\" but slot {} holds \"{}\", dropped",
                    name, title, slot, record.title
                ),
            ));
            continue;
        }

        let borrowed_on = match NaiveDate::parse_from_str(group[2], DATE_FORMAT) {
            Ok(date) => date,
            Err(_) => {
                diagnostics.push(diag(
                    DiagnosticKind::DateRepaired,
                    format!(
                        "borrow date \"{}\" of \"{}\" by {} unreadable, using {}",
                        group[2], title, name, today
                    ),
                ));
                today
            }
        };
        let mut due_on = match NaiveDate::parse_from_str(group[3], DATE_FORMAT) {
            Ok(date) => date,
            Err(_) => {
                let due = policy.due_date(today);
                diagnostics.push(diag(
                    DiagnosticKind::DateRepaired,
                    format!(
                        "due date \"{}\" of \"{}\" by {} unreadable, using {}",
                        group[3], title, name, due
                    ),
                ));
                due
            }
        };
        if due_on <= borrowed_on {
            let due = policy.due_date(borrowed_on);
            diagnostics.push(diag(
                DiagnosticKind::DateRepaired,
                format!(
                    "due date {} of \"{}\" by {} is not after borrow date {}, using {}",
                    due_on, title, name, borrowed_on, due
                ),
            ));
            due_on = due;
        }

        loans.push(Loan {
            slot,
            title: title.to_string(),
            borrowed_on,
            due_on,
        });
    }

    Some((name.to_string(), loans))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn inventory() -> Vec<InventoryRecord> {
        vec![
            InventoryRecord::new(SlotId(1), "Foundation".into(), 2),
            InventoryRecord::new(SlotId(2), "Dune".into(), 2),
        ]
    }

    fn run(raw: &[&str]) -> Loaded<Vec<Borrower>> {
        parse(
            &lines(raw),
            &inventory(),
            &LoanPolicy::default(),
            date("2024-03-01"),
        )
    }

    #[test]
    fn parses_multiple_loans_per_borrower() {
        let loaded =
            run(&["Alice | 1 | Foundation | 2024-02-01 | 2024-02-15 | 2 | Dune | 2024-02-03 | 2024-02-17"]);
        assert!(loaded.is_clean());
        assert_eq!(loaded.value.len(), 1);
        let alice = &loaded.value[0];
        assert_eq!(alice.name, "Alice");
        assert_eq!(alice.loans.len(), 2);
        assert_eq!(alice.loans[1].slot, SlotId(2));
        assert_eq!(alice.loans[1].due_on, date("2024-02-17"));
    }

    #[test]
    fn title_mismatch_drops_loan_and_borrower() {
        let loaded = run(&["Eve | 1 | Dune | 2024-02-01 | 2024-02-15"]);
        assert!(loaded.value.is_empty());
        assert_eq!(loaded.count(DiagnosticKind::CrossStoreMismatch), 1);
    }

    #[test]
    fn unknown_slot_drops_only_that_loan() {
        let loaded =
            run(&["Bob | 9 | Emma | 2024-02-01 | 2024-02-15 | 2 | Dune | 2024-02-01 | 2024-02-15"]);
        assert_eq!(loaded.value[0].loans.len(), 1);
        assert_eq!(loaded.value[0].loans[0].title, "Dune");
        assert_eq!(loaded.count(DiagnosticKind::CrossStoreMismatch), 1);
    }

    #[test]
    fn undecodable_lines_are_skipped() {
        let loaded = run(&[
            "Ren\u{FFFD}e | 1 | Foundation | 2024-02-01 | 2024-02-15",
            "Bob | 2 | Dune | 2024-02-01 | 2024-02-15",
        ]);
        assert_eq!(loaded.value.len(), 1);
        assert_eq!(loaded.value[0].name, "Bob");
        assert_eq!(loaded.count(DiagnosticKind::MalformedLine), 1);
        assert_eq!(loaded.diagnostics[0].line, 1);
    }

    #[test]
    fn bad_index_skips_the_whole_borrower() {
        let loaded =
            run(&["Bob | 2 | Dune | 2024-02-01 | 2024-02-15 | x | Foundation | 2024-02-01 | 2024-02-15"]);
        assert!(loaded.value.is_empty());
        assert_eq!(loaded.count(DiagnosticKind::MalformedLine), 1);
    }

    #[test]
    fn repairs_unreadable_and_inverted_dates() {
        let loaded = run(&[
            "Ann | 1 | Foundation | someday | 2024-02-15",
            "Ben | 1 | Foundation | 2024-02-01 | never",
            "Cal | 2 | Dune | 2024-02-10 | 2024-02-10",
        ]);
        // Ann gets two repairs: the defaulted borrow date overtakes her due date
        assert_eq!(loaded.count(DiagnosticKind::DateRepaired), 4);
        let ann = &loaded.value[0].loans[0];
        assert_eq!(ann.borrowed_on, date("2024-03-01"));
        assert_eq!(ann.due_on, date("2024-03-15"));
        let ben = &loaded.value[1].loans[0];
        assert_eq!(ben.due_on, date("2024-03-15"));
        let cal = &loaded.value[2].loans[0];
        assert_eq!(cal.due_on, date("2024-02-24"));
    }

    #[test]
    fn skips_lines_without_a_complete_loan() {
        let loaded = run(&["Dan", "Dan | 1 | Foundation", " | 1 | Foundation | 2024-02-01 | 2024-02-15"]);
        assert!(loaded.value.is_empty());
        assert_eq!(loaded.count(DiagnosticKind::MalformedLine), 3);
    }

    #[test]
    fn drops_incomplete_trailing_group() {
        let loaded = run(&["Dan | 1 | Foundation | 2024-02-01 | 2024-02-15 | 2 | Dune"]);
        assert_eq!(loaded.value[0].loans.len(), 1);
        assert_eq!(loaded.count(DiagnosticKind::MalformedLine), 1);
    }

    #[test]
    fn merges_repeated_borrower_lines_and_drops_duplicate_loans() {
        let loaded = run(&[
            "Ann | 1 | Foundation | 2024-02-01 | 2024-02-15",
            "Ann | 2 | Dune | 2024-02-01 | 2024-02-15 | 1 | Foundation | 2024-02-02 | 2024-02-16",
        ]);
        assert_eq!(loaded.value.len(), 1);
        assert_eq!(loaded.value[0].loans.len(), 2);
        assert_eq!(loaded.count(DiagnosticKind::MalformedLine), 1);
    }

    #[test]
    fn repeat_loans_survive_when_policy_allows_them() {
        let policy = LoanPolicy {
            allow_repeat_loans: true,
            ..LoanPolicy::default()
        };
        let loaded = parse(
            &lines(&["Ann | 2 | Dune | 2024-02-01 | 2024-02-15 | 2 | Dune | 2024-02-01 | 2024-02-15"]),
            &inventory(),
            &policy,
            date("2024-03-01"),
        );
        assert!(loaded.is_clean());
        assert_eq!(loaded.value[0].loans.len(), 2);
    }

    #[test]
    fn save_then_load_is_stable() {
        let store = InMemoryStore::new();
        let borrowers = vec![Borrower {
            name: "Alice".into(),
            loans: vec![Loan {
                slot: SlotId(2),
                title: "Dune".into(),
                borrowed_on: date("2024-02-01"),
                due_on: date("2024-02-15"),
            }],
        }];
        save(&store, &borrowers).unwrap();
        assert_eq!(
            store.raw_lines(StoreKind::Ledger),
            vec!["Alice | 2 | Dune | 2024-02-01 | 2024-02-15"]
        );
        let loaded = load(&store, &inventory(), &LoanPolicy::default(), date("2024-03-01")).unwrap();
        assert!(loaded.is_clean());
        assert_eq!(loaded.value, borrowers);
    }
}
