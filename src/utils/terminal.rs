//! Sanitization of server-provided text before it reaches the terminal
//!
//! Lead fields come from scraped third-party pages. A business name or opening-hours string
//! can carry escape sequences that would clear the screen, retitle the window or move the
//! cursor when printed as-is, so every value shown in the table, the detail pane or the
//! one-shot output goes through [`sanitize_cell`] first. CSV exports write the raw values.

/// Removes CSI (`ESC [ ... letter`) and OSC (`ESC ] ... BEL` or `ESC ] ... ESC \`) sequences
/// and any other control characters except tab and newline.
///
/// # Examples
///
/// ```
/// use lead_search::utils::terminal::strip_control_sequences;
///
/// assert_eq!(strip_control_sequences("\x1b[31mAcme\x1b[0m"), "Acme");
/// assert_eq!(strip_control_sequences("\x1b]0;owned\x07Acme"), "Acme");
/// ```
pub fn strip_control_sequences(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            match chars.peek() {
                Some('[') => {
                    chars.next();
                    for next_ch in chars.by_ref() {
                        if next_ch.is_ascii_alphabetic() || next_ch == '~' {
                            break;
                        }
                    }
                }
                Some(']') => {
                    chars.next();
                    while let Some(next_ch) = chars.next() {
                        if next_ch == '\x07' {
                            break;
                        }
                        if next_ch == '\x1b' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                // Lone ESC or a two-character sequence: drop ESC and the following byte
                Some(_) => {
                    chars.next();
                }
                None => {}
            }
            continue;
        }

        if ch.is_control() && ch != '\t' && ch != '\n' {
            continue;
        }

        result.push(ch);
    }

    result
}

/// Single-line display form of a cell: control sequences stripped, runs of whitespace
/// (including newlines) collapsed to one space, ends trimmed
pub fn sanitize_cell(text: &str) -> String {
    strip_control_sequences(text).split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to at most `max` characters, marking the cut with `…`
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut truncated: String = text.chars().take(max - 1).collect();
    truncated.push('…');
    truncated
}
