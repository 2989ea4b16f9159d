//! Render: paint component views onto the cell buffer.
//!
//! Boxes are painted in ascending effective z order (document order on
//! ties), so higher levels overwrite lower ones and the buffer's own z gate
//! keeps late low-z writes out. Lines containing embedded escape sequences
//! go through styled-text runs so pre-styled strings stay atomic.

use unicode_width::UnicodeWidthChar;

use crate::buffer::CellBuffer;
use crate::cell::CellStyle;
use crate::geometry::Rect;
use crate::layout::{LayoutBox, LayoutResult};
use crate::node::{NodeArena, NodeId};
use crate::text;

/// Paint a laid-out frame into the buffer.
///
/// The buffer is expected to be cleared (or freshly acquired); the renderer
/// only writes content cells.
pub fn render(arena: &NodeArena, result: &LayoutResult, buffer: &mut CellBuffer) {
    for layout_box in result.paint_order() {
        paint_box(arena, layout_box, buffer);
    }
}

fn paint_box(arena: &NodeArena, layout_box: &LayoutBox, buffer: &mut CellBuffer) {
    let Some(node) = arena.get(layout_box.node) else {
        return;
    };
    let Some(component) = node.component.as_ref() else {
        return;
    };

    let clip = clip_rect(arena, layout_box.node, buffer);
    let view = component.view();
    if view.is_empty() {
        return;
    }

    let z = layout_box.z_index;
    let node_id = layout_box.node;
    for (i, line) in view.split('\n').enumerate() {
        if i >= usize::from(layout_box.height) {
            break;
        }
        let y = layout_box.y + i as i32;
        if y < 0 {
            continue;
        }
        let y = y as u16;
        if text::contains_csi(line) {
            paint_styled_line(layout_box, line, y, z, node_id, clip, buffer);
        } else {
            paint_plain_line(layout_box, line, y, z, node_id, clip, buffer);
        }
    }
}

/// Effective clip for a node: the intersection of every clipping ancestor's
/// content rectangle (and the node's own, when it clips), bounded by the
/// buffer. `None` means everything is clipped away.
fn clip_rect(arena: &NodeArena, id: NodeId, buffer: &CellBuffer) -> Option<Rect> {
    let mut clip = Rect::new(0, 0, buffer.width(), buffer.height());
    let mut cursor = Some(id);
    while let Some(cur) = cursor {
        let node = arena.get(cur)?;
        if node.style.clips_content() {
            let inner = node.inner_bounds()?;
            clip = clip.intersection(&inner)?;
        }
        cursor = node.parent();
    }
    Some(clip)
}

fn paint_styled_line(
    layout_box: &LayoutBox,
    line: &str,
    y: u16,
    z: i32,
    node_id: NodeId,
    clip: Option<Rect>,
    buffer: &mut CellBuffer,
) {
    let Some(clip) = clip else {
        return;
    };
    if y < clip.y() || y >= clip.bottom() || layout_box.x < 0 {
        return;
    }
    let x = layout_box.x as u16;
    if x < clip.x() || x >= clip.right() {
        return;
    }
    // The run is atomic; it is dropped when it would start outside the clip
    // and truncated by the buffer at the row boundary. Cap to the box width.
    let max_cells = usize::from(layout_box.width).min(usize::from(clip.right() - x));
    let width = text::visible_width(line);
    if width == 0 {
        return;
    }
    if width > max_cells {
        let truncated = text::truncate_visible(line, max_cells);
        buffer.set_styled_text(x, y, z, truncated, Some(node_id));
    } else {
        buffer.set_styled_text(x, y, z, line, Some(node_id));
    }
}

fn paint_plain_line(
    layout_box: &LayoutBox,
    line: &str,
    y: u16,
    z: i32,
    node_id: NodeId,
    clip: Option<Rect>,
    buffer: &mut CellBuffer,
) {
    let Some(clip) = clip else {
        return;
    };
    if y < clip.y() || y >= clip.bottom() {
        return;
    }
    let mut cursor = layout_box.x;
    let end = layout_box.x + i32::from(layout_box.width);
    for ch in line.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0).max(1) as i32;
        if cursor + w > end {
            break;
        }
        if cursor >= 0 {
            let x = cursor as u16;
            if x >= clip.x() && x < clip.right() {
                buffer.set_content(x, y, z, ch, CellStyle::default(), Some(node_id));
            }
        }
        cursor += w;
    }
}
