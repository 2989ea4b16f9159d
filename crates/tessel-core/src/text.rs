//! CSI-aware text helpers.
//!
//! Styled-text runs carry embedded `ESC [ … m` style sequences. These helpers
//! strip the sequences, measure the visible remainder, and detect styled
//! lines so the renderer can keep them atomic.

use unicode_width::UnicodeWidthChar;

/// Returns true if the string contains a CSI introducer (`ESC [`).
pub fn contains_csi(s: &str) -> bool {
    s.as_bytes().windows(2).any(|w| w == b"\x1b[")
}

/// Iterate the visible (non-escape) characters of a string.
///
/// CSI sequences are skipped in full: from `ESC [` through the final byte
/// (`@`..=`~`). A bare trailing escape is dropped.
pub fn visible_chars(s: &str) -> impl Iterator<Item = char> + '_ {
    let mut chars = s.chars().peekable();
    std::iter::from_fn(move || {
        loop {
            let c = chars.next()?;
            if c != '\u{1b}' {
                return Some(c);
            }
            // Only CSI sequences are recognized; a lone ESC is dropped.
            if chars.peek() == Some(&'[') {
                chars.next();
                for t in chars.by_ref() {
                    if ('\u{40}'..='\u{7e}').contains(&t) {
                        break;
                    }
                }
            }
        }
    })
}

/// Strip all CSI sequences, returning only the visible characters.
pub fn strip_csi(s: &str) -> String {
    visible_chars(s).collect()
}

/// Number of visible characters after stripping CSI sequences.
pub fn visible_char_count(s: &str) -> usize {
    visible_chars(s).count()
}

/// Display width in terminal cells of the visible characters.
///
/// Wide (CJK) characters count as two cells, zero-width marks as none.
pub fn visible_width(s: &str) -> usize {
    visible_chars(s)
        .map(|c| UnicodeWidthChar::width(c).unwrap_or(0))
        .sum()
}

/// Cut a styled string down to at most `max_cells` of visible width.
///
/// Escape sequences up to the cut point are kept, so the truncated string
/// still styles what remains of it.
pub fn truncate_visible(s: &str, max_cells: usize) -> String {
    let mut out = String::with_capacity(s.len());
    let mut used = 0usize;
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            out.push(c);
            if chars.peek() == Some(&'[') {
                for t in chars.by_ref() {
                    out.push(t);
                    if ('\u{40}'..='\u{7e}').contains(&t) {
                        break;
                    }
                }
            }
            continue;
        }
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > max_cells {
            break;
        }
        out.push(c);
        used += w;
    }
    out
}
