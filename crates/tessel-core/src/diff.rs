//! Frame diffing: turn per-cell changes into merged dirty rectangles.
//!
//! Rows are scanned for differing spans, vertically adjacent spans are
//! grouped while their union stays rectangular within a slack, and the
//! resulting rectangles are merged to a fixed point.

use crate::buffer::CellBuffer;
use crate::cell::Cell;
use crate::geometry::Rect;

/// Horizontal slack when chaining row spans into one rectangle: spans whose
/// edges differ by at most this many cells still extend the open rectangle.
pub const DEFAULT_SLACK: u16 = 4;

/// The outcome of diffing two frames.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiffResult {
    /// Whether any cell changed.
    pub has_changes: bool,
    /// Dirty regions, sorted by (y, x). Every differing cell is covered by
    /// at least one rectangle; every rectangle lies within the frame.
    pub rects: Vec<Rect>,
}

impl DiffResult {
    fn full(current: &CellBuffer) -> Self {
        let rect = Rect::new(0, 0, current.width(), current.height());
        Self {
            has_changes: !rect.is_empty(),
            rects: if rect.is_empty() { Vec::new() } else { vec![rect] },
        }
    }
}

/// Whether two cells are visibly different.
///
/// The z level and node tag are bookkeeping; they do not affect the bytes
/// a terminal receives.
fn cells_differ(a: &Cell, b: &Cell) -> bool {
    a.ch != b.ch || a.style != b.style || a.selected != b.selected || a.styled_text != b.styled_text
}

/// Diff two frames with the default slack.
pub fn diff(previous: Option<&CellBuffer>, current: &CellBuffer) -> DiffResult {
    diff_with_slack(previous, current, DEFAULT_SLACK)
}

/// Diff two frames into merged dirty rectangles.
///
/// With no previous frame, or when dimensions differ, the whole frame is
/// one dirty rectangle.
pub fn diff_with_slack(
    previous: Option<&CellBuffer>,
    current: &CellBuffer,
    slack: u16,
) -> DiffResult {
    let Some(previous) = previous else {
        return DiffResult::full(current);
    };
    if previous.size() != current.size() {
        return DiffResult::full(current);
    }

    // Per-row dirty spans: (y, lo, hi) inclusive.
    let mut rects: Vec<Rect> = Vec::new();
    let mut open: Option<(u16, u16, u16, u16)> = None; // (y0, y1, lo, hi)

    for y in 0..current.height() {
        let span = row_span(previous, current, y);
        match (open, span) {
            (None, Some((lo, hi))) => {
                open = Some((y, y, lo, hi));
            }
            (Some((y0, y1, olo, ohi)), Some((lo, hi))) => {
                let contiguous = y == y1 + 1;
                let aligned = lo.abs_diff(olo) <= slack && hi.abs_diff(ohi) <= slack;
                if contiguous && aligned {
                    open = Some((y0, y, olo.min(lo), ohi.max(hi)));
                } else {
                    rects.push(span_rect(y0, y1, olo, ohi));
                    open = Some((y, y, lo, hi));
                }
            }
            (Some((y0, y1, olo, ohi)), None) => {
                rects.push(span_rect(y0, y1, olo, ohi));
                open = None;
            }
            (None, None) => {}
        }
    }
    if let Some((y0, y1, lo, hi)) = open {
        rects.push(span_rect(y0, y1, lo, hi));
    }

    merge_rects(&mut rects);
    rects.sort_by_key(|r| (r.y(), r.x()));

    DiffResult {
        has_changes: !rects.is_empty(),
        rects,
    }
}

/// The inclusive [lo, hi] span of differing cells in a row, if any.
fn row_span(previous: &CellBuffer, current: &CellBuffer, y: u16) -> Option<(u16, u16)> {
    let prev_row = previous.row(y)?;
    let cur_row = current.row(y)?;
    let mut lo = None;
    let mut hi = 0;
    for (x, (p, c)) in prev_row.iter().zip(cur_row.iter()).enumerate() {
        if cells_differ(p, c) {
            if lo.is_none() {
                lo = Some(x as u16);
            }
            hi = x as u16;
        }
    }
    lo.map(|lo| (lo, hi))
}

fn span_rect(y0: u16, y1: u16, lo: u16, hi: u16) -> Rect {
    Rect::new(lo, y0, hi - lo + 1, y1 - y0 + 1)
}

/// Merge overlapping or touching rectangles until no pair can merge.
fn merge_rects(rects: &mut Vec<Rect>) {
    loop {
        let mut merged = false;
        'outer: for i in 0..rects.len() {
            for j in (i + 1)..rects.len() {
                if rects[i].touches(&rects[j]) {
                    let union = rects[i].union(&rects[j]);
                    rects[i] = union;
                    rects.swap_remove(j);
                    merged = true;
                    break 'outer;
                }
            }
        }
        if !merged {
            break;
        }
    }
}
