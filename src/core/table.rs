//! TZ-004: Tabular output conversion.
//!
//! Turns columnar command output (`ps`, `df`, `ls -l`, ...) into records
//! keyed by header field. Rows whose field count disagrees with the
//! header are dropped, not repaired.

use indexmap::IndexMap;

/// A single table row: header field name → cell text, in column order.
pub type Record = IndexMap<String, String>;

/// Split `text` into records.
///
/// When `header` is absent the first non-empty line is consumed as the
/// header row. Empty fields produced by runs of the delimiter are
/// dropped, so whitespace-aligned output splits cleanly with the default
/// `' '` delimiter.
pub fn as_table(text: &str, delimiter: char, header: Option<Vec<String>>) -> Vec<Record> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    let fields = match header {
        Some(h) => h,
        None => match lines.next() {
            Some(line) => split_fields(line, delimiter),
            None => return Vec::new(),
        },
    };
    if fields.is_empty() {
        return Vec::new();
    }

    let mut records = Vec::new();
    for line in lines {
        let cells = split_fields(line, delimiter);
        if cells.len() != fields.len() {
            continue;
        }
        records.push(fields.iter().cloned().zip(cells).collect());
    }
    records
}

fn split_fields(line: &str, delimiter: char) -> Vec<String> {
    line.split(delimiter)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect()
}
