//! ANSI encoder: cell buffer to terminal byte stream.
//!
//! Plain cells are emitted with minimal SGR transitions (attributes are only
//! re-sent when they change); styled-text runs are emitted verbatim. Selected
//! regions are wrapped in reverse video, re-asserting it after any embedded
//! reset so a selection survives a run's internal style resets.

use std::fmt::Write as _;

use crate::buffer::CellBuffer;
use crate::cell::CellStyle;
use crate::color::{bg_color_codes, fg_color_codes};
use crate::geometry::Rect;
use crate::text;

const REVERSE_ON: &str = "\x1b[7m";
const REVERSE_OFF: &str = "\x1b[27m";
const RESET: &str = "\x1b[0m";

/// Encode a whole frame as newline-delimited rows.
///
/// Each row ends with a full SGR reset. A leading clear-screen or
/// cursor-home is the caller's responsibility.
pub fn encode_frame(buffer: &CellBuffer) -> String {
    let mut out = String::with_capacity(
        usize::from(buffer.width()) * usize::from(buffer.height()) * 2,
    );
    for y in 0..buffer.height() {
        encode_row_segment(buffer, y, 0, buffer.width(), &mut out);
        out.push_str(RESET);
        out.push('\n');
    }
    out
}

/// Encode only the given dirty regions, cursor-addressing each row segment.
///
/// Regions outside the buffer are clipped; each emitted segment ends with a
/// full SGR reset so stale attributes never leak into the next one.
pub fn encode_regions(buffer: &CellBuffer, rects: &[Rect]) -> String {
    let frame = Rect::new(0, 0, buffer.width(), buffer.height());
    let mut out = String::new();
    for rect in rects {
        let Some(rect) = rect.intersection(&frame) else {
            continue;
        };
        for y in rect.y()..rect.bottom() {
            // Runs are atomic: when the segment starts mid-run, back up to
            // the head so the run is re-emitted whole.
            let mut x0 = rect.x();
            if let Some((head_x, offset)) = buffer.run_head(x0, y)
                && offset > 0
            {
                x0 = head_x;
            }
            let _ = write!(out, "\x1b[{};{}H", y + 1, x0 + 1);
            encode_row_segment(buffer, y, x0, rect.right(), &mut out);
            out.push_str(RESET);
        }
    }
    out
}

/// Emit the cells of `[x0, x1)` on row `y`.
fn encode_row_segment(buffer: &CellBuffer, y: u16, x0: u16, x1: u16, out: &mut String) {
    let mut last_style = CellStyle::default();
    let mut style_active = false;
    let mut in_selected = false;

    let mut x = x0;
    while x < x1 {
        let Some(cell) = buffer.get(x, y) else {
            break;
        };

        if cell.selected && !in_selected {
            out.push_str(REVERSE_ON);
            in_selected = true;
        } else if !cell.selected && in_selected {
            out.push_str(REVERSE_OFF);
            in_selected = false;
        }

        if let Some(styled) = cell.styled_text.as_deref() {
            emit_run(styled, in_selected, out);
            last_style = CellStyle::default();
            style_active = false;
            let cells = text::visible_width(styled).max(1) as u16;
            x = x.saturating_add(cells);
            continue;
        }

        write_style_transition(out, &last_style, &cell.style, style_active, in_selected);
        last_style = cell.style;
        style_active = true;

        out.push(cell.ch);
        let wide = unicode_width::UnicodeWidthChar::width(cell.ch).unwrap_or(1) >= 2;
        x += if wide { 2 } else { 1 };
    }

    if in_selected {
        out.push_str(REVERSE_OFF);
    }
}

/// Emit a styled run verbatim, re-asserting reverse video after embedded
/// resets while a selection covers the run.
fn emit_run(styled: &str, in_selected: bool, out: &mut String) {
    if in_selected && styled.contains(RESET) {
        out.push_str(&styled.replace(RESET, "\x1b[0m\x1b[7m"));
    } else {
        out.push_str(styled);
    }
    // Leave a clean slate for the following plain cells.
    if !styled.ends_with(RESET) {
        out.push_str(RESET);
    } else if in_selected {
        // The replacement above already re-asserted reverse for this case.
        return;
    }
    if in_selected {
        out.push_str(REVERSE_ON);
    }
}

/// Check if transitioning from `prev` to `next` requires a full SGR reset:
/// any attribute turning off, or a color going back to default.
fn needs_reset(prev: &CellStyle, next: &CellStyle) -> bool {
    (prev.bold && !next.bold)
        || (prev.italic && !next.italic)
        || (prev.underline && !next.underline)
        || (prev.strikethrough && !next.strikethrough)
        || (prev.blink && !next.blink)
        || (prev.reverse && !next.reverse)
        || (prev.fg.is_some() && next.fg.is_none())
        || (prev.bg.is_some() && next.bg.is_none())
}

/// Write the minimal SGR bytes taking the terminal from `prev` to `next`.
fn write_style_transition(
    out: &mut String,
    prev: &CellStyle,
    next: &CellStyle,
    active: bool,
    in_selected: bool,
) {
    if !active || needs_reset(prev, next) {
        if active {
            out.push_str(RESET);
            if in_selected {
                out.push_str(REVERSE_ON);
            }
        }
        let sgr = build_sgr(next);
        out.push_str(&sgr);
        return;
    }

    if prev.fg != next.fg
        && let Some(fg) = next.fg
    {
        let _ = write!(out, "\x1b[{}m", fg_color_codes(fg).join(";"));
    }
    if prev.bg != next.bg
        && let Some(bg) = next.bg
    {
        let _ = write!(out, "\x1b[{}m", bg_color_codes(bg).join(";"));
    }
    if !prev.bold && next.bold {
        out.push_str("\x1b[1m");
    }
    if !prev.italic && next.italic {
        out.push_str("\x1b[3m");
    }
    if !prev.underline && next.underline {
        out.push_str("\x1b[4m");
    }
    if !prev.blink && next.blink {
        out.push_str("\x1b[5m");
    }
    if !prev.reverse && next.reverse {
        out.push_str("\x1b[7m");
    }
    if !prev.strikethrough && next.strikethrough {
        out.push_str("\x1b[9m");
    }
}

/// Build one combined SGR sequence for every active attribute of a style.
/// Returns an empty string for the default style.
pub fn build_sgr(style: &CellStyle) -> String {
    let mut codes: Vec<String> = Vec::new();
    if style.bold {
        codes.push("1".into());
    }
    if style.italic {
        codes.push("3".into());
    }
    if style.underline {
        codes.push("4".into());
    }
    if style.blink {
        codes.push("5".into());
    }
    if style.reverse {
        codes.push("7".into());
    }
    if style.strikethrough {
        codes.push("9".into());
    }
    if let Some(fg) = style.fg {
        codes.extend(fg_color_codes(fg));
    }
    if let Some(bg) = style.bg {
        codes.extend(bg_color_codes(bg));
    }
    if codes.is_empty() {
        return String::new();
    }
    format!("\x1b[{}m", codes.join(";"))
}

impl std::fmt::Display for CellBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&encode_frame(self))
    }
}
