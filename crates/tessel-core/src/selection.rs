//! Mouse-drag selection over the cell buffer.
//!
//! Selections are tracked in cell coordinates. Text extraction is aware of
//! styled-text runs: embedded escape sequences never appear in the returned
//! string, and double-width characters are emitted once.

use crate::buffer::CellBuffer;

/// How the selection grows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectionMode {
    /// Cell-by-cell drag.
    #[default]
    Char,
    /// Whole words (whitespace-delimited).
    Word,
    /// Whole rows.
    Line,
}

/// Tracks an in-progress or completed selection.
#[derive(Clone, Debug)]
pub struct SelectionManager {
    enabled: bool,
    active: bool,
    start: (u16, u16),
    current: (u16, u16),
    anchor: (u16, u16),
    mode: SelectionMode,
}

impl SelectionManager {
    /// Create a selection manager.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            active: false,
            start: (0, 0),
            current: (0, 0),
            anchor: (0, 0),
            mode: SelectionMode::Char,
        }
    }

    /// Whether selection handling is enabled at all.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable selection handling. Disabling clears any selection.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.active = false;
        }
    }

    /// Whether a selection is active.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The selection mode of the active selection.
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Begin a drag selection at (x, y). No-op while disabled.
    pub fn start(&mut self, x: u16, y: u16) {
        if !self.enabled {
            return;
        }
        self.active = true;
        self.start = (x, y);
        self.current = (x, y);
        self.anchor = (x, y);
        self.mode = SelectionMode::Char;
    }

    /// Move the selection head while dragging.
    pub fn update(&mut self, x: u16, y: u16) {
        if self.active {
            self.current = (x, y);
        }
    }

    /// Shift-click semantics: start a selection when inactive, otherwise
    /// move the head while the anchor stays put.
    pub fn extend(&mut self, x: u16, y: u16) {
        if !self.enabled {
            return;
        }
        if !self.active {
            self.start(x, y);
            return;
        }
        self.start = self.anchor;
        self.current = (x, y);
    }

    /// Select the whitespace-delimited word around (x, y) on its row.
    pub fn select_word(&mut self, x: u16, y: u16, buffer: &CellBuffer) {
        if !self.enabled || y >= buffer.height() || x >= buffer.width() {
            return;
        }
        if is_word_gap(buffer, x, y) {
            return;
        }
        let mut lo = x;
        while lo > 0 && !is_word_gap(buffer, lo - 1, y) {
            lo -= 1;
        }
        let mut hi = x;
        while hi + 1 < buffer.width() && !is_word_gap(buffer, hi + 1, y) {
            hi += 1;
        }
        self.active = true;
        self.start = (lo, y);
        self.current = (hi, y);
        self.anchor = (lo, y);
        self.mode = SelectionMode::Word;
    }

    /// Select a whole row.
    pub fn select_line(&mut self, y: u16, buffer: &CellBuffer) {
        if !self.enabled || y >= buffer.height() || buffer.width() == 0 {
            return;
        }
        self.active = true;
        self.start = (0, y);
        self.current = (buffer.width() - 1, y);
        self.anchor = (0, y);
        self.mode = SelectionMode::Line;
    }

    /// Select the whole buffer.
    pub fn select_all(&mut self, buffer: &CellBuffer) {
        if !self.enabled || buffer.size().is_empty() {
            return;
        }
        self.active = true;
        self.start = (0, 0);
        self.current = (buffer.width() - 1, buffer.height() - 1);
        self.anchor = (0, 0);
        self.mode = SelectionMode::Line;
    }

    /// Deactivate the selection.
    pub fn clear(&mut self) {
        self.active = false;
    }

    /// Mark every cell inside the normalized rectangle as selected.
    ///
    /// The caller sweeps old marks first (`CellBuffer::clear_selection`).
    pub fn apply_highlight(&self, buffer: &mut CellBuffer) {
        if !self.active {
            return;
        }
        let (sx, ex, sy, ey) = self.normalized();
        // A multi-row drag can normalize with sx right of ex; the highlight
        // rectangle spans both columns either way.
        let (lo_x, hi_x) = (sx.min(ex), sx.max(ex));
        for y in sy..=ey.min(buffer.height().saturating_sub(1)) {
            for x in lo_x..=hi_x.min(buffer.width().saturating_sub(1)) {
                buffer.set_selected(x, y, true);
            }
        }
    }

    /// Extract the selected text as visible characters.
    ///
    /// The first row starts at the selection head column, the last row ends
    /// at the tail column, and inner rows are taken in full. Styled-text
    /// runs contribute only visible characters; trailing spaces are trimmed
    /// per row and rows join with newlines.
    pub fn selected_text(&self, buffer: &CellBuffer) -> String {
        if !self.active || buffer.size().is_empty() {
            return String::new();
        }
        let (sx, ex, sy, ey) = self.normalized();
        let last_col = buffer.width().saturating_sub(1);

        let mut rows = Vec::new();
        for y in sy..=ey.min(buffer.height().saturating_sub(1)) {
            let (lo, hi) = if sy == ey {
                (sx, ex)
            } else if y == sy {
                (sx, last_col)
            } else if y == ey {
                (0, ex)
            } else {
                (0, last_col)
            };
            let mut row = String::new();
            for x in lo..=hi.min(last_col) {
                if let Some(c) = buffer.visible_char_at(x, y) {
                    row.push(c);
                }
            }
            rows.push(row.trim_end().to_string());
        }
        rows.join("\n")
    }

    /// Normalize (start, current) to `(sx, ex, sy, ey)`.
    fn normalized(&self) -> (u16, u16, u16, u16) {
        let (sx, sy) = self.start;
        let (cx, cy) = self.current;
        if (sy, sx) <= (cy, cx) {
            (sx, cx, sy, cy)
        } else {
            (cx, sx, cy, sy)
        }
    }
}

impl Default for SelectionManager {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Whether the cell reads as a gap (blank or whitespace) for word selection.
fn is_word_gap(buffer: &CellBuffer, x: u16, y: u16) -> bool {
    match buffer.visible_char_at(x, y) {
        Some(c) => c.is_whitespace(),
        None => false, // trailing half of a wide char stays inside the word
    }
}
