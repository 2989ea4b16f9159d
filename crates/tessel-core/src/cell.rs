//! Cell types — the smallest addressable unit of the virtual canvas.

use crate::color::Color;
use crate::node::NodeId;

/// Style attributes for a single cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CellStyle {
    /// Bold text.
    pub bold: bool,
    /// Italic text.
    pub italic: bool,
    /// Underlined text.
    pub underline: bool,
    /// Strikethrough text.
    pub strikethrough: bool,
    /// Blinking text.
    pub blink: bool,
    /// Reverse video.
    pub reverse: bool,
    /// Foreground color.
    pub fg: Option<Color>,
    /// Background color.
    pub bg: Option<Color>,
}

impl CellStyle {
    /// Create an empty style with no attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bold.
    #[must_use]
    pub fn bold(mut self, val: bool) -> Self {
        self.bold = val;
        self
    }

    /// Set italic.
    #[must_use]
    pub fn italic(mut self, val: bool) -> Self {
        self.italic = val;
        self
    }

    /// Set underline.
    #[must_use]
    pub fn underline(mut self, val: bool) -> Self {
        self.underline = val;
        self
    }

    /// Set strikethrough.
    #[must_use]
    pub fn strikethrough(mut self, val: bool) -> Self {
        self.strikethrough = val;
        self
    }

    /// Set blink.
    #[must_use]
    pub fn blink(mut self, val: bool) -> Self {
        self.blink = val;
        self
    }

    /// Set reverse video.
    #[must_use]
    pub fn reverse(mut self, val: bool) -> Self {
        self.reverse = val;
        self
    }

    /// Set the foreground color.
    #[must_use]
    pub fn fg(mut self, color: Color) -> Self {
        self.fg = Some(color);
        self
    }

    /// Set the background color.
    #[must_use]
    pub fn bg(mut self, color: Color) -> Self {
        self.bg = Some(color);
        self
    }

    /// Returns true if no attributes are set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A single cell in the virtual canvas.
///
/// A cell is either plain (one character plus style) or part of a
/// styled-text run: the head cell carries the full pre-styled string in
/// `styled_text` while the following cells of the run are continuation
/// markers sharing the head's `z_index` and `node_id`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    /// The character displayed in this cell.
    pub ch: char,
    /// The style of this cell (unused on run cells; the run carries its own).
    pub style: CellStyle,
    /// Z level that produced this cell; writes below it are rejected.
    pub z_index: i32,
    /// The layout node that painted this cell, for hit-testing.
    pub node_id: Option<NodeId>,
    /// Pre-styled content with embedded escape sequences.
    /// Non-empty only on the first cell of a run.
    pub styled_text: Option<String>,
    /// Whether this cell is inside the active selection.
    pub selected: bool,
}

impl Cell {
    /// Create a blank cell (space, default style, z 0).
    pub fn blank() -> Self {
        Self {
            ch: ' ',
            ..Self::default()
        }
    }

    /// Create a plain content cell.
    pub fn new(ch: char, style: CellStyle) -> Self {
        Self {
            ch,
            style,
            ..Self::default()
        }
    }

    /// Returns true if this is a blank cell (space, default everything).
    pub fn is_blank(&self) -> bool {
        self.ch == ' '
            && self.style.is_empty()
            && self.styled_text.is_none()
            && !self.selected
    }

    /// Returns true if this cell is the head of a styled-text run.
    pub fn is_run_head(&self) -> bool {
        self.styled_text.is_some()
    }
}
