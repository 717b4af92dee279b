//! Greedy line wrapping for help text.
//!
//! Widths are measured in terminal columns, so wide characters count double.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Characters a line may be broken after.
pub const DELIMITERS: [char; 5] = [' ', '.', ',', '!', '?'];

/// Returns the terminal column width of `s`.
pub fn display_width(s: &str) -> usize {
    s.width()
}

/// Wraps `text` to `width` columns.
///
/// Whitespace runs collapse to single spaces and the text is trimmed. Lines
/// break at the nearest delimiter before the cut point; a space delimiter is
/// dropped while punctuation stays at the end of the emitted line. A token
/// with no delimiter inside the window is emitted whole on its own line, even
/// when it exceeds `width`.
///
/// # Examples
///
/// ```
/// use helpfmt_render::wrap::wrap;
///
/// assert_eq!(wrap("the quick  brown\nfox", 10), vec!["the quick", "brown fox"]);
/// assert_eq!(wrap("one,two,three", 8), vec!["one,two,", "three"]);
/// assert_eq!(wrap("tiny extraordinarily", 6), vec!["tiny", "extraordinarily"]);
/// assert!(wrap("   ", 10).is_empty());
/// ```
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut lines = Vec::new();
    let mut rest = collapsed.as_str();
    while rest.width() > width {
        let (end, resume) = break_point(rest, width);
        lines.push(rest[..end].trim_end().to_string());
        rest = rest[resume..].trim_start();
    }
    if !rest.is_empty() {
        lines.push(rest.to_string());
    }
    lines
}

/// Wraps `text` and prefixes every line with `indent`.
///
/// # Examples
///
/// ```
/// use helpfmt_render::wrap::fill;
///
/// assert_eq!(fill("alpha beta gamma", 11, "  "), "  alpha beta\n  gamma");
/// ```
pub fn fill(text: &str, width: usize, indent: &str) -> String {
    wrap(text, width)
        .into_iter()
        .map(|line| format!("{indent}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Splits `text` on its own line breaks without re-flowing.
pub fn split_raw(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

/// Prefixes every line of `text` with `indent` without re-flowing.
pub fn fill_raw(text: &str, indent: &str) -> String {
    text.lines()
        .map(|line| format!("{indent}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Returns `(end, resume)` byte offsets: the emitted line is `line[..end]`
/// and wrapping continues at `line[resume..]`.
fn break_point(line: &str, width: usize) -> (usize, usize) {
    let limit = fitting_prefix(line, width);
    if line[limit..].starts_with(' ') {
        return (limit, limit + 1);
    }

    match line[..limit]
        .char_indices()
        .rev()
        .find(|(_, ch)| DELIMITERS.contains(ch))
    {
        Some((idx, ' ')) => (idx, idx + 1),
        Some((idx, ch)) => {
            let end = idx + ch.len_utf8();
            (end, end)
        }
        None => match line[limit..].find(' ') {
            Some(offset) => (limit + offset, limit + offset + 1),
            None => (line.len(), line.len()),
        },
    }
}

/// Byte length of the longest prefix of `line` fitting in `width` columns.
fn fitting_prefix(line: &str, width: usize) -> usize {
    let mut used = 0;
    for (idx, ch) in line.char_indices() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width > width {
            return idx;
        }
        used += ch_width;
    }
    line.len()
}
