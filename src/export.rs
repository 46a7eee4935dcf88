use crate::state::StoreDoc;
use chrono::{DateTime, SecondsFormat};

pub const NOTES_CSV_HEADER: &str = "timestamp,date,classId,className,block,students,note";

fn csv_quote(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn iso_date(ts_ms: i64) -> String {
    DateTime::from_timestamp_millis(ts_ms)
        .map(|d| d.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

/// Renders every note as CSV, in stored (newest-first) order. Rows are
/// joined by `\n` with no trailing line break. Returns the text and the
/// number of data rows.
pub fn notes_csv(doc: &StoreDoc) -> (String, usize) {
    let mut lines = Vec::with_capacity(doc.quick_adds.len() + 1);
    lines.push(NOTES_CSV_HEADER.to_string());
    for entry in &doc.quick_adds {
        let class = doc.class(&entry.class_id);
        let row = [
            entry.ts.to_string(),
            iso_date(entry.ts),
            entry.class_id.clone(),
            class.map(|c| c.name.clone()).unwrap_or_default(),
            class.map(|c| c.block.clone()).unwrap_or_default(),
            entry.students.join("; "),
            entry.note.clone(),
        ];
        let fields: Vec<String> = row.iter().map(|f| csv_quote(f)).collect();
        lines.push(fields.join(","));
    }
    (lines.join("\n"), doc.quick_adds.len())
}
