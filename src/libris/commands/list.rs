use crate::commands::CmdResult;
use crate::error::Result;
use crate::library::Library;
use crate::model::InventoryRecord;
use chrono::NaiveDate;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemOrder {
    #[default]
    Insertion,
    Alphabetical,
    /// Borrowed records first, soonest due on top; the rest in insertion order.
    DueDate,
}

impl FromStr for ItemOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "insertion" | "added" => Ok(ItemOrder::Insertion),
            "alpha" | "alphabetical" | "title" => Ok(ItemOrder::Alphabetical),
            "due" | "due-date" => Ok(ItemOrder::DueDate),
            other => Err(format!(
                "unknown sort order '{}' (expected insertion, alpha or due)",
                other
            )),
        }
    }
}

/// A record as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
    /// 1-based position in inventory order, whatever the listing order.
    pub position: usize,
    pub record: InventoryRecord,
    pub earliest_due: Option<NaiveDate>,
    pub overdue: bool,
}

impl ItemView {
    pub(crate) fn new(library: &Library, index: usize, today: NaiveDate) -> Self {
        let record = library.items()[index].clone();
        let earliest_due = library.earliest_due(record.id);
        Self {
            position: index + 1,
            overdue: earliest_due.is_some_and(|due| due < today),
            earliest_due,
            record,
        }
    }
}

pub fn run(library: &Library, order: ItemOrder, today: NaiveDate) -> Result<CmdResult> {
    let mut views: Vec<ItemView> = (0..library.items().len())
        .map(|i| ItemView::new(library, i, today))
        .collect();

    match order {
        ItemOrder::Insertion => {}
        ItemOrder::Alphabetical => views.sort_by(|a, b| {
            a.record
                .title
                .to_lowercase()
                .cmp(&b.record.title.to_lowercase())
                .then(a.position.cmp(&b.position))
        }),
        // None sorts before Some, so flip it to push unborrowed records last
        ItemOrder::DueDate => views.sort_by_key(|v| (v.earliest_due.is_none(), v.earliest_due)),
    }

    Ok(CmdResult::default().with_listed_items(views))
}
