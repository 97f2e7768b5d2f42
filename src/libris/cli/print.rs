use colored::Colorize;
use libris::api::{BorrowerView, CmdMessage, ItemView, MessageLevel};
use libris::config::LibrisConfig;
use std::path::PathBuf;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const TITLE_WIDTH: usize = 48;
const COUNT_WIDTH: usize = 14;

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

pub(super) fn print_items(items: &[ItemView]) {
    if items.is_empty() {
        println!("No items found.");
        return;
    }

    let idx_width = items
        .iter()
        .map(|v| format!("{}. ", v.position).width())
        .max()
        .unwrap_or(0);

    for view in items {
        let idx = format!("{}. ", view.position);
        let idx = format!("{}{}", " ".repeat(idx_width - idx.width()), idx);

        let title = truncate_to_width(&view.record.title, TITLE_WIDTH);
        let padding = TITLE_WIDTH.saturating_sub(title.width());

        let record = &view.record;
        let counts = format!("{}/{} available", record.available, record.total);
        let counts = format!("{:>width$}", counts, width = COUNT_WIDTH);
        let counts = if record.available == 0 {
            counts.red()
        } else {
            counts.normal()
        };

        let due = match view.earliest_due {
            Some(date) if view.overdue => format!("  overdue since {}", date).red(),
            Some(date) => format!("  due {}", date).dimmed(),
            None => "".normal(),
        };

        println!(
            "  {}{}{}  {}{}",
            idx.yellow(),
            title,
            " ".repeat(padding),
            counts,
            due
        );
    }
}

pub(super) fn print_borrowers(borrowers: &[BorrowerView]) {
    if borrowers.is_empty() {
        println!("Nobody has anything on loan.");
        return;
    }

    for borrower in borrowers {
        println!("{}", borrower.name.bold());
        for view in &borrower.loans {
            let idx = view
                .position
                .map(|p| format!("{}. ", p))
                .unwrap_or_else(|| "?. ".to_string());
            let line = format!(
                "    {}{}  borrowed {}, due {}",
                idx, view.loan.title, view.loan.borrowed_on, view.loan.due_on
            );
            match view.overdue_days {
                Some(days) => println!("{} {}", line, format!("({} day(s) overdue)", days).red()),
                None => println!("{}", line),
            }
        }
    }
}

pub(super) fn print_paths(paths: &[PathBuf]) {
    for path in paths {
        println!("{}", path.display());
    }
}

pub(super) fn print_config(config: &LibrisConfig) {
    for (key, value) in config.list_all() {
        println!("{} = {}", key, value);
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_titles_are_untouched() {
        assert_eq!(truncate_to_width("Dune", 10), "Dune");
    }

    #[test]
    fn long_titles_end_in_an_ellipsis_within_the_width() {
        let cut = truncate_to_width("The Left Hand of Darkness", 10);
        assert_eq!(cut, "The Left …");
        assert_eq!(cut.width(), 10);
    }

    #[test]
    fn wide_characters_count_double() {
        let cut = truncate_to_width("吾輩は猫である", 7);
        assert!(cut.width() <= 7);
        assert!(cut.ends_with('…'));
    }
}
