use chrono::{DateTime, Datelike, Timelike, Utc};

/// Escape a raw value for use as an aggregate map key. Dots are structurally
/// significant to the storage layer (nested field paths), so every literal
/// `.` becomes `_`.
pub fn to_safe_key(raw: &str) -> String {
    raw.replace('.', "_")
}

/// Canonicalize free text for counting: trim, lowercase, collapse internal
/// whitespace runs. An empty result maps to the literal `"(empty)"`.
pub fn normalize_free_text(raw: &str) -> String {
    let normalized = raw
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ");

    if normalized.is_empty() {
        "(empty)".to_owned()
    } else {
        normalized
    }
}

/// Minute-level bucket id, `YYYYMMDDHHmm`. No separators, zero padded, so
/// lexical order equals chronological order for same-length keys.
pub fn minute_bucket_id(ts: DateTime<Utc>) -> String {
    format!(
        "{:04}{:02}{:02}{:02}{:02}",
        ts.year(),
        ts.month(),
        ts.day(),
        ts.hour(),
        ts.minute()
    )
}

/// Chart-friendly 15-minute bucket, `YYYY-MM-DD-HH-mm` with minutes floored
/// to 00/15/30/45.
pub fn quarter_hour_bucket_id(ts: DateTime<Utc>) -> String {
    format!(
        "{:04}-{:02}-{:02}-{:02}-{:02}",
        ts.year(),
        ts.month(),
        ts.day(),
        ts.hour(),
        ts.minute() / 15 * 15
    )
}
