//! The virtual cell buffer: a dense 2D grid of styled cells.
//!
//! Writes are z-index gated: a write at level `z` lands only when
//! `z >= existing.z_index` at that cell. Styled-text runs keep pre-styled
//! strings (with embedded escape sequences) atomic: the head cell carries
//! the full string, the remaining cells of the run are continuations.

use std::sync::{Mutex, OnceLock};

use tracing::debug;
use unicode_width::UnicodeWidthChar;

use crate::cell::{Cell, CellStyle};
use crate::geometry::Size;
use crate::node::NodeId;
use crate::text;

/// A 2D grid of cells representing one frame of terminal content.
#[derive(Clone, Debug)]
pub struct CellBuffer {
    cells: Vec<Cell>,
    width: u16,
    height: u16,
}

impl CellBuffer {
    /// Create a new buffer filled with blank cells.
    pub fn new(size: Size) -> Self {
        let len = usize::from(size.width) * usize::from(size.height);
        Self {
            cells: vec![Cell::blank(); len],
            width: size.width,
            height: size.height,
        }
    }

    /// Buffer dimensions.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Buffer width.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Buffer height.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Borrow the cell at (x, y), or `None` if out of bounds.
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if x < self.width && y < self.height {
            self.cells.get(self.index(x, y))
        } else {
            None
        }
    }

    /// Borrow a whole row of cells.
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y < self.height {
            let start = self.index(0, y);
            Some(&self.cells[start..start + usize::from(self.width)])
        } else {
            None
        }
    }

    /// Write a plain content cell at (x, y) on z level `z`.
    ///
    /// Out-of-bounds writes and writes below the cell's current z level are
    /// dropped silently. The selection flag is content-orthogonal and
    /// survives the write.
    pub fn set_content(
        &mut self,
        x: u16,
        y: u16,
        z: i32,
        ch: char,
        style: CellStyle,
        node_id: Option<NodeId>,
    ) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = self.index(x, y);
        if let Some(cell) = self.cells.get_mut(idx) {
            if z < cell.z_index {
                return;
            }
            let selected = cell.selected;
            *cell = Cell {
                ch,
                style,
                z_index: z,
                node_id,
                styled_text: None,
                selected,
            };
        }
    }

    /// Write a styled-text run starting at (x, y) on z level `z`.
    ///
    /// The run occupies as many cells as the string's visible display width
    /// (CJK characters take two). The head cell stores the full string; the
    /// rest become continuation cells sharing the head's z level and node
    /// tag. Each cell write obeys the z rule independently. A run longer
    /// than the remaining row is truncated at the row boundary.
    pub fn set_styled_text(
        &mut self,
        x: u16,
        y: u16,
        z: i32,
        styled: impl Into<String>,
        node_id: Option<NodeId>,
    ) {
        let mut styled = styled.into();
        if y >= self.height || x >= self.width {
            return;
        }
        let mut cells = text::visible_width(&styled);
        if cells == 0 {
            return;
        }
        let available = usize::from(self.width - x);
        if cells > available {
            debug!(
                error = %crate::error::TesselError::BadStyledText(format!(
                    "{cells} cells claimed, {available} available"
                )),
                "styled text truncated at row boundary"
            );
            styled = text::truncate_visible(&styled, available);
            cells = text::visible_width(&styled);
            if cells == 0 {
                return;
            }
        }

        let head_char = text::visible_chars(&styled).next().unwrap_or(' ');
        let head_idx = self.index(x, y);
        if let Some(cell) = self.cells.get_mut(head_idx)
            && z >= cell.z_index
        {
            let selected = cell.selected;
            *cell = Cell {
                ch: head_char,
                style: CellStyle::default(),
                z_index: z,
                node_id,
                styled_text: Some(styled),
                selected,
            };
        }

        for offset in 1..cells {
            let idx = head_idx + offset;
            if let Some(cell) = self.cells.get_mut(idx)
                && z >= cell.z_index
            {
                let selected = cell.selected;
                *cell = Cell {
                    ch: ' ',
                    style: CellStyle::default(),
                    z_index: z,
                    node_id,
                    styled_text: None,
                    selected,
                };
            }
        }
    }

    /// Set or clear the selection flag at (x, y).
    pub fn set_selected(&mut self, x: u16, y: u16, flag: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = self.index(x, y);
        if let Some(cell) = self.cells.get_mut(idx) {
            cell.selected = flag;
        }
    }

    /// Clear the selection flag on every cell.
    pub fn clear_selection(&mut self) {
        for cell in &mut self.cells {
            cell.selected = false;
        }
    }

    /// Reset every cell to blank.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = Cell::blank();
        }
    }

    /// Prepare the buffer for reuse at the given dimensions.
    ///
    /// Rows are reallocated only when the dimensions change; otherwise the
    /// existing storage is blanked in place.
    pub fn reset(&mut self, size: Size) {
        if size.width == self.width && size.height == self.height {
            self.clear();
            return;
        }
        self.width = size.width;
        self.height = size.height;
        let len = usize::from(size.width) * usize::from(size.height);
        self.cells.clear();
        self.cells.resize(len, Cell::blank());
    }

    /// Scan back along a row from a continuation cell to the run's head.
    ///
    /// Returns `(head_x, cell_offset)` where `cell_offset` is the distance
    /// from the head, or `None` when the cell belongs to no run.
    pub fn run_head(&self, x: u16, y: u16) -> Option<(u16, u16)> {
        let cell = self.get(x, y)?;
        if cell.is_run_head() {
            return Some((x, 0));
        }
        let (node_id, z) = (cell.node_id, cell.z_index);
        let mut cursor = x;
        while cursor > 0 {
            cursor -= 1;
            let c = self.get(cursor, y)?;
            if c.node_id != node_id || c.z_index != z {
                return None;
            }
            if c.is_run_head() {
                let width = text::visible_width(c.styled_text.as_deref().unwrap_or(""));
                let offset = x - cursor;
                if usize::from(offset) < width {
                    return Some((cursor, offset));
                }
                return None;
            }
        }
        None
    }

    /// The visible character at (x, y), resolving styled runs.
    ///
    /// Continuation cells inside a run yield `None` for the trailing half of
    /// wide characters and the run's character otherwise.
    pub fn visible_char_at(&self, x: u16, y: u16) -> Option<char> {
        let cell = self.get(x, y)?;
        if cell.styled_text.is_none() {
            match self.run_head(x, y) {
                Some((head_x, offset)) if offset > 0 => {
                    let head = self.get(head_x, y)?;
                    let styled = head.styled_text.as_deref()?;
                    return char_at_cell_offset(styled, usize::from(offset));
                }
                _ => return Some(cell.ch),
            }
        }
        // Run head: first visible char.
        let styled = cell.styled_text.as_deref()?;
        text::visible_chars(styled).next()
    }

    fn index(&self, x: u16, y: u16) -> usize {
        usize::from(y) * usize::from(self.width) + usize::from(x)
    }
}

/// Map a cell offset within a run to the character covering that cell.
///
/// Wide characters cover two cells; the second cell maps to `None` so the
/// character is emitted once during selection extraction.
fn char_at_cell_offset(styled: &str, offset: usize) -> Option<char> {
    let mut covered = 0usize;
    for c in text::visible_chars(styled) {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if offset < covered + w {
            if offset == covered {
                return Some(c);
            }
            return None; // trailing half of a wide character
        }
        covered += w;
    }
    None
}

// Process-wide buffer pool. Buffers at or below the pooling threshold are
// retained for reuse; larger ones go to the allocator.

static POOL: OnceLock<Mutex<Vec<CellBuffer>>> = OnceLock::new();

fn pool() -> &'static Mutex<Vec<CellBuffer>> {
    POOL.get_or_init(|| Mutex::new(Vec::new()))
}

/// Acquire a buffer of the given size, reusing a pooled one when possible.
pub fn acquire_buffer(size: Size, max_cells: u32) -> CellBuffer {
    if size.area() <= max_cells
        && let Ok(mut buffers) = pool().lock()
        && let Some(mut buf) = buffers.pop()
    {
        buf.reset(size);
        return buf;
    }
    CellBuffer::new(size)
}

/// Return a buffer to the pool. Oversize buffers are dropped.
pub fn release_buffer(buf: CellBuffer, max_cells: u32) {
    if buf.size().area() > max_cells {
        return;
    }
    if let Ok(mut buffers) = pool().lock() {
        buffers.push(buf);
    }
}

/// Drop every pooled buffer. Intended for host shutdown.
pub fn clear_buffer_pool() {
    if let Ok(mut buffers) = pool().lock() {
        buffers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buf(w: u16, h: u16) -> CellBuffer {
        CellBuffer::new(Size::new(w, h))
    }

    #[test]
    fn new_buffer_all_blank() {
        let b = buf(10, 5);
        for y in 0..5 {
            for x in 0..10 {
                assert!(b.get(x, y).is_some_and(|c| c.is_blank()));
            }
        }
    }

    #[test]
    fn set_and_get() {
        let mut b = buf(10, 5);
        b.set_content(3, 2, 0, 'A', CellStyle::new().bold(true), Some(7));
        let cell = b.get(3, 2);
        assert_eq!(cell.map(|c| c.ch), Some('A'));
        assert_eq!(cell.map(|c| c.node_id), Some(Some(7)));
    }

    #[test]
    fn out_of_bounds_write_dropped() {
        let mut b = buf(5, 3);
        b.set_content(5, 0, 0, 'X', CellStyle::default(), None);
        b.set_content(0, 3, 0, 'X', CellStyle::default(), None);
        for y in 0..3 {
            for x in 0..5 {
                assert!(b.get(x, y).is_some_and(|c| c.is_blank()));
            }
        }
    }

    #[test]
    fn lower_z_write_rejected() {
        let mut b = buf(5, 1);
        b.set_content(0, 0, 10, 'B', CellStyle::default(), None);
        b.set_content(0, 0, 0, 'A', CellStyle::default(), None);
        assert_eq!(b.get(0, 0).map(|c| c.ch), Some('B'));
    }

    #[test]
    fn equal_z_write_wins() {
        let mut b = buf(5, 1);
        b.set_content(0, 0, 5, 'A', CellStyle::default(), None);
        b.set_content(0, 0, 5, 'B', CellStyle::default(), None);
        assert_eq!(b.get(0, 0).map(|c| c.ch), Some('B'));
    }

    #[test]
    fn styled_run_occupies_visible_width() {
        let mut b = buf(20, 1);
        b.set_styled_text(2, 0, 0, "\x1b[1mhello\x1b[0m", Some(1));
        let head = b.get(2, 0);
        assert!(head.is_some_and(Cell::is_run_head));
        assert_eq!(head.map(|c| c.ch), Some('h'));
        for x in 3..7 {
            let c = b.get(x, 0);
            assert!(c.is_some_and(|c| !c.is_run_head()));
            assert_eq!(c.map(|c| c.node_id), Some(Some(1)));
        }
        // Cell after the run is untouched.
        assert!(b.get(7, 0).is_some_and(|c| c.node_id.is_none()));
    }

    #[test]
    fn styled_run_truncated_at_row_edge() {
        let mut b = buf(5, 1);
        b.set_styled_text(3, 0, 0, "\x1b[1mhello\x1b[0m", None);
        assert!(b.get(3, 0).is_some_and(Cell::is_run_head));
        assert!(b.get(4, 0).is_some_and(|c| !c.is_run_head()));
    }

    #[test]
    fn styled_run_z_rule_per_cell() {
        let mut b = buf(10, 1);
        b.set_content(4, 0, 10, 'X', CellStyle::default(), None);
        b.set_styled_text(2, 0, 5, "abcd", None);
        assert_eq!(b.get(2, 0).map(|c| c.ch), Some('a'));
        assert_eq!(b.get(3, 0).map(|c| c.ch), Some(' ')); // continuation
        assert_eq!(b.get(4, 0).map(|c| c.ch), Some('X')); // kept the higher z
    }

    #[test]
    fn run_head_scan_back() {
        let mut b = buf(20, 1);
        b.set_styled_text(2, 0, 0, "\x1b[1mhello\x1b[0m", Some(1));
        assert_eq!(b.run_head(2, 0), Some((2, 0)));
        assert_eq!(b.run_head(4, 0), Some((2, 2)));
        assert_eq!(b.run_head(6, 0), Some((2, 4)));
        assert_eq!(b.run_head(9, 0), None);
    }

    #[test]
    fn visible_char_resolves_run_cells() {
        let mut b = buf(20, 1);
        b.set_styled_text(0, 0, 0, "\x1b[32mhi\x1b[0m there", None);
        assert_eq!(b.visible_char_at(0, 0), Some('h'));
        assert_eq!(b.visible_char_at(1, 0), Some('i'));
        assert_eq!(b.visible_char_at(3, 0), Some('t'));
    }

    #[test]
    fn visible_char_cjk_emitted_once() {
        let mut b = buf(20, 1);
        b.set_styled_text(0, 0, 0, "\x1b[1m\u{4e16}\u{754c}\x1b[0m", None);
        assert_eq!(b.visible_char_at(0, 0), Some('\u{4e16}'));
        assert_eq!(b.visible_char_at(1, 0), None); // trailing half
        assert_eq!(b.visible_char_at(2, 0), Some('\u{754c}'));
        assert_eq!(b.visible_char_at(3, 0), None);
    }

    #[test]
    fn selection_survives_content_write() {
        let mut b = buf(5, 1);
        b.set_selected(1, 0, true);
        b.set_content(1, 0, 0, 'Q', CellStyle::default(), None);
        assert!(b.get(1, 0).is_some_and(|c| c.selected));
    }

    #[test]
    fn clear_selection_sweeps_all() {
        let mut b = buf(5, 2);
        b.set_selected(0, 0, true);
        b.set_selected(4, 1, true);
        b.clear_selection();
        for y in 0..2 {
            for x in 0..5 {
                assert!(b.get(x, y).is_some_and(|c| !c.selected));
            }
        }
    }

    #[test]
    fn reset_same_size_keeps_storage() {
        let mut b = buf(5, 3);
        b.set_content(0, 0, 3, 'A', CellStyle::default(), None);
        b.reset(Size::new(5, 3));
        assert!(b.get(0, 0).is_some_and(|c| c.is_blank()));
        assert_eq!(b.get(0, 0).map(|c| c.z_index), Some(0));
    }

    #[test]
    fn reset_new_size_reallocates() {
        let mut b = buf(5, 3);
        b.reset(Size::new(8, 4));
        assert_eq!(b.size(), Size::new(8, 4));
        assert!(b.get(7, 3).is_some_and(|c| c.is_blank()));
    }

    #[test]
    fn pool_round_trip_resets_reused_buffers() {
        // One test covers the pool: the global store is shared across the
        // test binary, so assertions stay local to what this test releases.
        let b = acquire_buffer(Size::new(10, 10), 10_000);
        release_buffer(b, 10_000);
        let b2 = acquire_buffer(Size::new(4, 4), 10_000);
        assert_eq!(b2.size(), Size::new(4, 4));
        assert!(b2.get(0, 0).is_some_and(|c| c.is_blank()));

        // An oversize buffer is never pooled: acquiring at its size again
        // always yields blank storage.
        let mut big = CellBuffer::new(Size::new(200, 100)); // 20_000 cells
        big.set_content(0, 0, 0, 'Z', CellStyle::default(), None);
        release_buffer(big, 10_000);
        let again = acquire_buffer(Size::new(200, 100), 10_000);
        assert!(again.get(0, 0).is_some_and(|c| c.is_blank()));
    }
}
