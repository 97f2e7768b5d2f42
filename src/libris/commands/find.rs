use crate::commands::list::ItemView;
use crate::commands::CmdResult;
use crate::error::Result;
use crate::library::Library;
use chrono::NaiveDate;

pub fn run(library: &Library, term: &str, today: NaiveDate) -> Result<CmdResult> {
    let term_lower = term.trim().to_lowercase();
    if term_lower.is_empty() {
        return Ok(CmdResult::default());
    }

    let mut matches: Vec<(ItemView, u8)> = library
        .items()
        .iter()
        .enumerate()
        .filter_map(|(i, record)| {
            let title_lower = record.title.to_lowercase();

            let score = if title_lower == term_lower {
                1
            } else if title_lower.starts_with(&term_lower) {
                2
            } else if title_lower.contains(&term_lower) {
                3
            } else {
                return None;
            };

            Some((ItemView::new(library, i, today), score))
        })
        .collect();

    matches.sort_by(|(a, score_a), (b, score_b)| match score_a.cmp(score_b) {
        std::cmp::Ordering::Equal => {
            let len_a = a.record.title.chars().count();
            let len_b = b.record.title.chars().count();
            match len_a.cmp(&len_b) {
                std::cmp::Ordering::Equal => a.position.cmp(&b.position),
                ord => ord,
            }
        }
        ord => ord,
    });

    let listed = matches.into_iter().map(|(view, _)| view).collect();
    Ok(CmdResult::default().with_listed_items(listed))
}
