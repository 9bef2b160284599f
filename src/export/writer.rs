use std::io;

use chrono::SecondsFormat;

use crate::entry::models::LedgerEntry;

const HEADER: [&str; 8] = [
    "id",
    "kind",
    "amount",
    "category",
    "description",
    "date",
    "created_at",
    "updated_at",
];

/// Write entries as CSV: amounts with two decimals, dates as YYYY-MM-DD, timestamps RFC 3339.
pub fn write_entries<W: io::Write>(writer: W, entries: &[LedgerEntry]) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;

    for entry in entries {
        wtr.write_record([
            entry.id.to_string(),
            entry.kind.clone(),
            format!("{:.2}", entry.amount),
            entry.category.clone(),
            entry.description.clone().unwrap_or_default(),
            entry.entry_date.format("%Y-%m-%d").to_string(),
            entry.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            entry.updated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
