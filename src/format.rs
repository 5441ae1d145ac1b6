// Display formatting for dates and addresses

use chrono::{TimeZone, Utc};

/// Format a millisecond timestamp as "Tue, Mar 14, 2023" (UTC).
/// Out-of-range timestamps format as an empty string.
pub fn format_date(timestamp_ms: i64) -> String {
    match Utc.timestamp_millis_opt(timestamp_ms).single() {
        Some(date) => date.format("%a, %b %-d, %Y").to_string(),
        None => String::new(),
    }
}

/// Shorten `text` to `max_length` characters, keeping `start_chars` leading
/// and `end_chars` trailing characters and padding the middle with dots.
pub fn truncate(text: &str, start_chars: usize, end_chars: usize, max_length: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_length {
        return text.to_string();
    }

    let start_len = start_chars.min(chars.len());
    let end_len = end_chars.min(chars.len());
    let mut start: String = chars[..start_len].iter().collect();
    let end: String = chars[chars.len() - end_len..].iter().collect();

    let mut len = start_len + end_len;
    while len < max_length {
        start.push('.');
        len += 1;
    }
    start + &end
}
