//! Helpers for printing remote console lines and user content on one line each.

use crate::console::LogEntry;

/// Escape a string for single-line output:
/// - `\n` => `\\n`
/// - `\r` => `\\r`
/// - `\t` => `\\t`
/// - backslash => `\\\\`
///
/// Long strings are cut at `MAX_PREVIEW` characters with an ellipsis.
pub fn escape_log(s: &str) -> String {
    const MAX_PREVIEW: usize = 300;
    let mut out = String::with_capacity(s.len().min(MAX_PREVIEW) + 8);
    for (count, ch) in s.chars().enumerate() {
        if count >= MAX_PREVIEW {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                use std::fmt::Write;
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// Terminal line for a console entry: `HH:MM:SS [LEVEL] message`.
pub fn format_console_entry(entry: &LogEntry) -> String {
    format!(
        "{} [{:<5}] {}",
        entry.display_time(),
        entry.level.as_str().to_ascii_uppercase(),
        escape_log(&entry.message)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::LogLevel;

    #[test]
    fn escapes_newlines_and_truncates() {
        let s = "Line1\nLine2\r\tEnd";
        assert_eq!(escape_log(s), "Line1\\nLine2\\r\\tEnd");

        let long = "x".repeat(400);
        let esc = escape_log(&long);
        assert_eq!(esc.chars().count(), 301);
        assert!(esc.ends_with('…'));
    }

    #[test]
    fn console_entries_stay_on_one_line() {
        let entry = LogEntry {
            timestamp: "not a timestamp".to_string(),
            level: LogLevel::Warn,
            message: "reconnecting\nattempt 2".to_string(),
        };
        assert_eq!(
            format_console_entry(&entry),
            "not a timestamp [WARN ] reconnecting\\nattempt 2"
        );
    }
}
