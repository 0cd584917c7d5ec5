//! Roster CSV parsing, shared by the upload service and the generation batch.
//!
//! Columns are header-keyed and order-independent; header names are matched
//! case-insensitively after trimming. Email is the dedup key, so rows
//! without one are skipped silently at ingestion; they never become
//! recipient entities, which is why they do not show up as batch errors.

use crate::store::roster::RosterRow;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

pub(crate) fn parse_roster_file(path: &Path) -> Result<Vec<RosterRow>, String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    parse_roster(BufReader::new(file))
}

pub(crate) fn parse_roster<R: Read>(reader: R) -> Result<Vec<RosterRow>, String> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().map_err(|e| e.to_string())?.clone();
    let name_idx =
        find_column(&headers, "name").ok_or("Roster file has no 'name' column")?;
    let email_idx =
        find_column(&headers, "email").ok_or("Roster file has no 'email' column")?;
    let event_idx = find_column(&headers, "event");

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| e.to_string())?;
        let email = record.get(email_idx).unwrap_or("").trim();
        if email.is_empty() {
            continue;
        }
        let name = record.get(name_idx).unwrap_or("").trim();
        let event = event_idx
            .and_then(|i| record.get(i))
            .unwrap_or("")
            .trim();
        rows.push(RosterRow {
            name: name.to_string(),
            email: email.to_string(),
            event: event.to_string(),
        });
    }
    Ok(rows)
}

fn find_column(headers: &csv::StringRecord, wanted: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(wanted))
}
