use std::collections::BTreeMap;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::warn;

/// One data line keyed by header name. All values are strings.
pub type RawRow = BTreeMap<String, String>;

const BOM: char = '\u{feff}';

/// Parses comma or tab separated text into header-keyed rows.
///
/// The delimiter is picked once from the header line (tab if it contains one).
/// Quoted fields may hold delimiters and newlines; `""` inside quotes is a
/// literal quote. Blank lines produce no row, short rows are padded with empty
/// strings and surplus fields are dropped.
pub fn parse(text: &str) -> Vec<RawRow> {
    let raw = text.strip_prefix(BOM).unwrap_or(text).trim();
    if raw.is_empty() {
        return Vec::new();
    }

    let header_line = raw.split('\n').next().unwrap_or_default();
    let delimiter = if header_line.contains('\t') { b'\t' } else { b',' };

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(raw.as_bytes());

    let mut records = reader
        .records()
        .filter_map(|record| match record {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping unreadable line: {}", e);
                None
            }
        })
        .filter(|record| !is_blank(record, delimiter));

    let headers = match records.next() {
        Some(headers) => headers,
        None => return Vec::new(),
    };

    records
        .map(|fields| {
            let mut row = RawRow::new();
            for (i, header) in headers.iter().enumerate() {
                let value = fields.get(i).unwrap_or_default();
                row.insert(header.to_string(), value.to_string());
            }
            row
        })
        .collect()
}

/// Whitespace-only lines, including a line of bare tabs when tab separated.
fn is_blank(record: &StringRecord, delimiter: u8) -> bool {
    let all_empty = record.iter().all(str::is_empty);
    all_empty && (record.len() <= 1 || delimiter.is_ascii_whitespace())
}
