use crate::commands::CmdResult;
use crate::error::Result;
use crate::library::Library;
use crate::model::Loan;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanView {
    /// Current 1-based position of the borrowed record.
    pub position: Option<usize>,
    pub loan: Loan,
    pub overdue_days: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowerView {
    pub name: String,
    pub loans: Vec<LoanView>,
}

pub fn run(library: &Library, today: NaiveDate) -> Result<CmdResult> {
    let mut views: Vec<BorrowerView> = library
        .borrowers()
        .iter()
        .map(|borrower| BorrowerView {
            name: borrower.name.clone(),
            loans: borrower
                .loans
                .iter()
                .map(|loan| LoanView {
                    position: library.position_of(loan.slot),
                    loan: loan.clone(),
                    overdue_days: loan.days_overdue(today),
                })
                .collect(),
        })
        .collect();
    views.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });

    Ok(CmdResult::default().with_listed_borrowers(views))
}
