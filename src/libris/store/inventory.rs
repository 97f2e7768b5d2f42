//! Inventory store codec.
//!
//! One record per line, `ID | TITLE | TOTAL | BORROWED | AVAILABLE`. Lines in
//! the legacy `TITLE | TOTAL | BORROWED | AVAILABLE` format are still read;
//! their slot id is their 1-based position among the accepted records, which
//! is exactly what legacy ledgers stored as the loan index.

use super::{split_fields, undecodable, Diagnostic, DiagnosticKind, Loaded, StorageBackend, StoreKind};
use crate::error::Result;
use crate::model::{InventoryRecord, SlotId, FIELD_SEPARATOR};
use std::collections::HashSet;

struct ParsedLine {
    line: usize,
    id: Option<u32>,
    legacy: bool,
    title: String,
    total: u32,
    borrowed: u32,
    available: u32,
}

pub fn load<B: StorageBackend>(backend: &B) -> Result<Loaded<Vec<InventoryRecord>>> {
    let lines = backend.read_lines(StoreKind::Inventory)?;
    let loaded = parse(&lines);
    tracing::debug!(
        records = loaded.value.len(),
        diagnostics = loaded.diagnostics.len(),
        "loaded inventory"
    );
    Ok(loaded)
}

pub fn save<B: StorageBackend>(backend: &B, records: &[InventoryRecord]) -> Result<()> {
    let lines: Vec<String> = records.iter().map(format_line).collect();
    backend.write_lines(StoreKind::Inventory, &lines)?;
    tracing::debug!(records = records.len(), "saved inventory");
    Ok(())
}

pub fn format_line(record: &InventoryRecord) -> String {
    [
        record.id.to_string(),
        record.title.clone(),
        record.total.to_string(),
        record.borrowed.to_string(),
        record.available.to_string(),
    ]
    .join(FIELD_SEPARATOR)
}

pub fn parse(lines: &[String]) -> Loaded<Vec<InventoryRecord>> {
    let mut diagnostics = Vec::new();
    let mut parsed = Vec::new();

    for (i, raw) in lines.iter().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        if let Some(diagnostic) = undecodable(StoreKind::Inventory, i + 1, raw) {
            diagnostics.push(diagnostic);
            continue;
        }
        if let Some(line) = parse_line(i + 1, raw, &mut diagnostics) {
            parsed.push(line);
        }
    }

    let records = assign_ids(parsed, &mut diagnostics);
    Loaded {
        value: records,
        diagnostics,
    }
}

fn parse_line(line: usize, raw: &str, diagnostics: &mut Vec<Diagnostic>) -> Option<ParsedLine> {
    let malformed = |detail: String| {
        Diagnostic::new(StoreKind::Inventory, DiagnosticKind::MalformedLine, line, detail)
    };

    let fields = split_fields(raw);
    let (id, rest) = match fields.len() {
        4 => (None, &fields[..]),
        5 => match fields[0].parse::<u32>() {
            Ok(id) if id > 0 => (Some(id), &fields[1..]),
            _ => {
                diagnostics.push(malformed(format!(
                    "slot id \"{}\" is not a positive integer",
                    fields[0]
                )));
                return None;
            }
        },
        n => {
            diagnostics.push(malformed(format!("expected 4 or 5 fields, found {}", n)));
            return None;
        }
    };

    let title = rest[0];
    if title.is_empty() {
        diagnostics.push(malformed("blank title".to_string()));
        return None;
    }

    let mut counts = [0u32; 3];
    for (slot, field) in counts.iter_mut().zip(&rest[1..]) {
        match field.parse::<u32>() {
            Ok(n) => *slot = n,
            Err(_) => {
                diagnostics.push(malformed(format!(
                    "count \"{}\" for \"{}\" is not a non-negative integer",
                    field, title
                )));
                return None;
            }
        }
    }
    let [mut total, borrowed, mut available] = counts;

    let held = u64::from(borrowed) + u64::from(available);
    if held < u64::from(total) {
        let repaired = total - borrowed;
        diagnostics.push(Diagnostic::new(
            StoreKind::Inventory,
            DiagnosticKind::QuantityInvariantViolation,
            line,
            format!(
                "\"{}\": available {} -> {} to match total {} and borrowed {}",
                title, available, repaired, total, borrowed
            ),
        ));
        available = repaired;
    } else if held > u64::from(total) {
        let Ok(repaired) = u32::try_from(held) else {
            diagnostics.push(malformed(format!("counts for \"{}\" overflow", title)));
            return None;
        };
        diagnostics.push(Diagnostic::new(
            StoreKind::Inventory,
            DiagnosticKind::QuantityInvariantViolation,
            line,
            format!(
                "\"{}\": total {} -> {} to cover borrowed {} and available {}",
                title, total, repaired, borrowed, available
            ),
        ));
        total = repaired;
    }

    Some(ParsedLine {
        line,
        id,
        legacy: id.is_none(),
        title: title.to_string(),
        total,
        borrowed,
        available,
    })
}

/// Gives every record a unique slot id.
///
/// Explicit ids are claimed first, in file order. Legacy lines take their
/// position when it is free. Anything left over gets a fresh id above the
/// highest one in use.
fn assign_ids(mut parsed: Vec<ParsedLine>, diagnostics: &mut Vec<Diagnostic>) -> Vec<InventoryRecord> {
    let mut used = HashSet::new();
    for line in parsed.iter_mut() {
        if let Some(id) = line.id {
            if !used.insert(id) {
                diagnostics.push(Diagnostic::new(
                    StoreKind::Inventory,
                    DiagnosticKind::MalformedLine,
                    line.line,
                    format!(
                        "duplicate slot id {} for \"{}\", assigning a new one",
                        id, line.title
                    ),
                ));
                line.id = None;
            }
        }
    }

    let legacy: Vec<usize> = parsed.iter().filter(|l| l.legacy).map(|l| l.line).collect();
    if let Some(first) = legacy.first() {
        diagnostics.push(Diagnostic::new(
            StoreKind::Inventory,
            DiagnosticKind::LegacyFormat,
            *first,
            format!(
                "{} line(s) use the legacy positional format, slot ids assigned from positions",
                legacy.len()
            ),
        ));
    }

    let mut next = used.iter().copied().max().unwrap_or(0) + 1;
    let mut fresh_id = |used: &mut HashSet<u32>| {
        while used.contains(&next) {
            next += 1;
        }
        used.insert(next);
        next
    };

    let mut records = Vec::with_capacity(parsed.len());
    for (index, line) in parsed.into_iter().enumerate() {
        let id = match line.id {
            Some(id) => id,
            None => {
                let position = index as u32 + 1;
                if line.legacy && used.insert(position) {
                    position
                } else {
                    fresh_id(&mut used)
                }
            }
        };
        records.push(InventoryRecord {
            id: SlotId(id),
            title: line.title,
            total: line.total,
            borrowed: line.borrowed,
            available: line.available,
        });
    }
    records
}
