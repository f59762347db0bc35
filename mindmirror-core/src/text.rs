use chrono::{DateTime, NaiveDateTime};

pub const TRANSCRIPT_PREVIEW_CHARS: usize = 100;
pub const ELLIPSIS: &str = "...";

// e.g. "Jan 1, 2024 10:00 AM"
const DISPLAY_FORMAT: &str = "%b %-d, %Y %-I:%M %p";

/// Shortens a transcript for list display.
///
/// Counts characters, not bytes, so multi-byte text is never split mid-codepoint.
pub fn truncate_transcript(text: &str) -> String {
    match text.char_indices().nth(TRANSCRIPT_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text.to_string(),
    }
}

pub fn quote(text: &str) -> String {
    format!("\u{201c}{text}\u{201d}")
}

/// Formats an ISO-8601 timestamp for display.
///
/// Accepts RFC 3339 (with offset) as well as the naive `YYYY-MM-DDTHH:MM:SS[.ffffff]`
/// form the backend produces. Unparseable input is returned unchanged.
pub fn format_timestamp(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(DISPLAY_FORMAT).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format(DISPLAY_FORMAT).to_string();
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_transcripts_are_verbatim() {
        let exact = "a".repeat(100);
        assert_eq!(truncate_transcript(&exact), exact);
        assert_eq!(truncate_transcript("hello"), "hello");
        assert_eq!(truncate_transcript(""), "");
    }

    #[test]
    fn long_transcripts_keep_first_hundred_chars() {
        let long = format!("{}{}", "b".repeat(100), "tail");
        let out = truncate_transcript(&long);
        assert_eq!(out, format!("{}...", "b".repeat(100)));
    }

    #[test]
    fn truncation_counts_chars_not_bytes() {
        let long = "é".repeat(101);
        let out = truncate_transcript(&long);
        assert_eq!(out.chars().count(), 103);
        assert!(out.starts_with(&"é".repeat(100)));
    }

    #[test]
    fn formats_rfc3339_and_naive_timestamps() {
        assert_eq!(format_timestamp("2024-01-01T10:00:00Z"), "Jan 1, 2024 10:00 AM");
        assert_eq!(
            format_timestamp("2024-03-15T21:05:09.123456"),
            "Mar 15, 2024 9:05 PM"
        );
        assert_eq!(format_timestamp("yesterday"), "yesterday");
    }

    #[test]
    fn quotes_text() {
        assert_eq!(quote("hi"), "\u{201c}hi\u{201d}");
    }
}
