//! Layout: the top-down position assignment pass.
//!
//! Consumes the sizes produced by [`crate::measure`] and writes every node's
//! position, first relative to its parent and then absolute. The output is a
//! [`LayoutResult`]: the per-frame list of laid-out boxes used by the
//! renderer and the event dispatcher.

use crate::constraints::BoxConstraints;
use crate::geometry::{Rect, Size};
use crate::measure::container_direction;
use crate::node::{NodeArena, NodeId, PositionKind};
use crate::style::{AlignItems, Direction, Justify};

/// The per-frame output of layout for one node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutBox {
    /// The node this box belongs to.
    pub node: NodeId,
    /// Absolute column of the left edge. May be negative for absolute nodes.
    pub x: i32,
    /// Absolute row of the top edge. May be negative for absolute nodes.
    pub y: i32,
    /// Box width.
    pub width: u16,
    /// Box height.
    pub height: u16,
    /// Effective z level (parent levels accumulated).
    pub z_index: i32,
}

impl LayoutBox {
    /// The on-screen portion of this box, or `None` when fully off-screen.
    pub fn screen_rect(&self) -> Option<Rect> {
        let right = self.x + i32::from(self.width);
        let bottom = self.y + i32::from(self.height);
        if right <= 0 || bottom <= 0 || self.width == 0 || self.height == 0 {
            return None;
        }
        let x = self.x.max(0);
        let y = self.y.max(0);
        Some(Rect::new(
            x as u16,
            y as u16,
            (right - x) as u16,
            (bottom - y) as u16,
        ))
    }

    /// Returns true if the point lies inside this box.
    pub fn contains(&self, x: u16, y: u16) -> bool {
        let (x, y) = (i32::from(x), i32::from(y));
        x >= self.x
            && x < self.x + i32::from(self.width)
            && y >= self.y
            && y < self.y + i32::from(self.height)
    }
}

/// The laid-out boxes of one frame, in tree pre-order, plus the root size.
#[derive(Clone, Debug, Default)]
pub struct LayoutResult {
    /// Boxes in pre-order of the tree walk.
    pub boxes: Vec<LayoutBox>,
    /// The root's outer size.
    pub size: Size,
}

impl LayoutResult {
    /// The box for a specific node, if it was laid out.
    pub fn box_of(&self, node: NodeId) -> Option<&LayoutBox> {
        self.boxes.iter().find(|b| b.node == node)
    }

    /// The topmost box containing the point.
    ///
    /// Boxes are compared by effective z level; ties go to the later box in
    /// document order, matching paint order.
    pub fn hit_test(&self, x: u16, y: u16) -> Option<NodeId> {
        self.boxes
            .iter()
            .enumerate()
            .filter(|(_, b)| b.contains(x, y))
            .max_by_key(|(i, b)| (b.z_index, *i))
            .map(|(_, b)| b.node)
    }

    /// Boxes sorted ascending by effective z, document order preserved on
    /// ties — the renderer's paint order.
    pub fn paint_order(&self) -> Vec<&LayoutBox> {
        let mut order: Vec<&LayoutBox> = self.boxes.iter().collect();
        order.sort_by_key(|b| b.z_index); // stable: pre-order breaks ties
        order
    }
}

/// Assign positions to a measured tree and collect the frame's boxes.
///
/// `measure` must have run for the same tree first; the runtime guarantees
/// the ordering.
pub fn layout(arena: &mut NodeArena, root: NodeId, _constraints: BoxConstraints) -> LayoutResult {
    let Some(node) = arena.get_mut(root) else {
        return LayoutResult::default();
    };
    node.x = 0;
    node.y = 0;
    node.abs_x = 0;
    node.abs_y = 0;
    let root_size = node.measured;

    // Pre-order placement of the in-flow tree; absolute nodes are queued.
    let mut absolutes = Vec::new();
    place_children(arena, root, &mut absolutes);

    // Absolute pass: each queued node resolves against its (already placed)
    // parent, then its own subtree is placed, which may queue more.
    let mut i = 0;
    while i < absolutes.len() {
        let id = absolutes[i];
        i += 1;
        place_absolute(arena, id);
        let mut nested = Vec::new();
        place_children(arena, id, &mut nested);
        absolutes.extend(nested);
    }

    let mut boxes = Vec::with_capacity(arena.len());
    collect_boxes(arena, root, 0, &mut boxes);

    LayoutResult {
        boxes,
        size: root_size,
    }
}

/// Place the children of `id` and recurse. Absolute children are recorded
/// for the later pass instead of being placed here.
fn place_children(arena: &mut NodeArena, id: NodeId, absolutes: &mut Vec<NodeId>) {
    let Some(node) = arena.get(id) else {
        return;
    };
    if node.children.is_empty() {
        return;
    }
    let kind = node.kind;
    let style = node.style.clone();
    let children = node.children.clone();
    let insets = style.inner_insets();
    let origin_x = node.abs_x + i32::from(insets.left);
    let origin_y = node.abs_y + i32::from(insets.top);
    let inner_w = node.measured.width.saturating_sub(insets.horizontal());
    let inner_h = node.measured.height.saturating_sub(insets.vertical());
    let parent_abs = (node.abs_x, node.abs_y);

    let in_flow: Vec<NodeId> = children
        .iter()
        .copied()
        .filter(|&c| {
            let absolute = arena
                .get(c)
                .is_some_and(|n| n.position == PositionKind::Absolute);
            if absolute {
                absolutes.push(c);
            }
            !absolute
        })
        .collect();

    if kind.is_flex_container() {
        let dir = container_direction(kind, &style);
        flex_layout(
            arena, &in_flow, dir, &style, origin_x, origin_y, inner_w, inner_h, parent_abs,
        );
    } else {
        // Leaf kinds with children: stack vertically at the inner origin.
        let mut cursor_y = origin_y;
        for &child in &in_flow {
            let Some(c) = arena.get_mut(child) else {
                continue;
            };
            let margin = c.style.margin;
            c.abs_x = origin_x + i32::from(margin.left);
            c.abs_y = cursor_y + i32::from(margin.top);
            c.x = c.abs_x - parent_abs.0;
            c.y = c.abs_y - parent_abs.1;
            cursor_y += i32::from(c.measured.height) + i32::from(margin.vertical());
        }
    }

    for &child in &in_flow {
        place_children(arena, child, absolutes);
    }
}

#[allow(clippy::too_many_arguments)]
fn flex_layout(
    arena: &mut NodeArena,
    in_flow: &[NodeId],
    dir: Direction,
    style: &crate::style::Style,
    origin_x: i32,
    origin_y: i32,
    inner_w: u16,
    inner_h: u16,
    parent_abs: (i32, i32),
) {
    let n = in_flow.len() as i64;
    if n == 0 {
        return;
    }

    let (main_extent, cross_extent) = match dir {
        Direction::Row => (i64::from(inner_w), i64::from(inner_h)),
        Direction::Column => (i64::from(inner_h), i64::from(inner_w)),
    };
    let gap = i64::from(style.gap);

    // Occupied main extents (measured size plus margins).
    let occupied: Vec<i64> = in_flow
        .iter()
        .map(|&c| {
            arena
                .get(c)
                .map(|node| {
                    let m = node.style.margin;
                    let (size_main, margin_main) = match dir {
                        Direction::Row => (node.measured.width, m.horizontal()),
                        Direction::Column => (node.measured.height, m.vertical()),
                    };
                    i64::from(size_main) + i64::from(margin_main)
                })
                .unwrap_or(0)
        })
        .collect();

    let content_main: i64 = occupied.iter().sum::<i64>() + gap * (n - 1);
    let slack = main_extent - content_main;

    let (offset, spacing, last_gap_extra) = match style.justify {
        Justify::Start => (0, gap, 0),
        Justify::Center => (slack / 2, gap, 0),
        Justify::End => (slack, gap, 0),
        Justify::SpaceBetween => {
            if n >= 2 {
                let share = slack / (n - 1);
                (0, gap + share, slack - share * (n - 1))
            } else {
                (0, gap, 0)
            }
        }
        Justify::SpaceAround => (gap + slack / (2 * n), gap + slack / n, 0),
        Justify::SpaceEvenly => (gap + slack / (n + 1), gap + slack / (n + 1), 0),
    };

    let mut cursor = offset;
    for (i, &child) in in_flow.iter().enumerate() {
        let Some(node) = arena.get_mut(child) else {
            continue;
        };
        let margin = node.style.margin;
        let size_cross = match dir {
            Direction::Row => node.measured.height,
            Direction::Column => node.measured.width,
        };
        let (margin_cross_start, margin_cross_total) = match dir {
            Direction::Row => (margin.top, margin.vertical()),
            Direction::Column => (margin.left, margin.horizontal()),
        };
        let margin_main_start = match dir {
            Direction::Row => margin.left,
            Direction::Column => margin.top,
        };

        let occupied_cross = i64::from(size_cross) + i64::from(margin_cross_total);
        let cross_pos = match style.align_items {
            AlignItems::Start | AlignItems::Stretch => i64::from(margin_cross_start),
            AlignItems::Center => (cross_extent - occupied_cross) / 2 + i64::from(margin_cross_start),
            AlignItems::End => cross_extent - occupied_cross + i64::from(margin_cross_start),
        };

        let main_pos = cursor + i64::from(margin_main_start);
        let (ax, ay) = match dir {
            Direction::Row => (origin_x + main_pos as i32, origin_y + cross_pos as i32),
            Direction::Column => (origin_x + cross_pos as i32, origin_y + main_pos as i32),
        };
        node.abs_x = ax;
        node.abs_y = ay;
        node.x = ax - parent_abs.0;
        node.y = ay - parent_abs.1;

        cursor += occupied[i] + spacing;
        if i as i64 == n - 2 {
            cursor += last_gap_extra;
        }
    }
}

/// Resolve one absolute node against its parent's inner rectangle.
fn place_absolute(arena: &mut NodeArena, id: NodeId) {
    let Some(node) = arena.get(id) else {
        return;
    };
    let Some(parent_id) = node.parent else {
        return;
    };
    let offsets = node.offsets;
    let size = node.measured;
    let Some(parent) = arena.get(parent_id) else {
        return;
    };
    let insets = parent.style.inner_insets();
    let inner_x = parent.abs_x + i32::from(insets.left);
    let inner_y = parent.abs_y + i32::from(insets.top);
    let inner_w = i32::from(parent.measured.width.saturating_sub(insets.horizontal()));
    let inner_h = i32::from(parent.measured.height.saturating_sub(insets.vertical()));
    let parent_abs = (parent.abs_x, parent.abs_y);

    let x = match (offsets.left, offsets.right) {
        (Some(left), _) => inner_x + left,
        (None, Some(right)) => inner_x + inner_w - i32::from(size.width) - right,
        (None, None) => inner_x,
    };
    let y = match (offsets.top, offsets.bottom) {
        (Some(top), _) => inner_y + top,
        (None, Some(bottom)) => inner_y + inner_h - i32::from(size.height) - bottom,
        (None, None) => inner_y,
    };

    if let Some(node) = arena.get_mut(id) {
        node.abs_x = x;
        node.abs_y = y;
        node.x = x - parent_abs.0;
        node.y = y - parent_abs.1;
    }
}

/// Collect boxes in pre-order, accumulating effective z levels.
fn collect_boxes(arena: &NodeArena, id: NodeId, parent_z: i32, out: &mut Vec<LayoutBox>) {
    let Some(node) = arena.get(id) else {
        return;
    };
    let z = parent_z.saturating_add(node.style.z_index);
    out.push(LayoutBox {
        node: id,
        x: node.abs_x,
        y: node.abs_y,
        width: node.measured.width,
        height: node.measured.height,
        z_index: z,
    });
    for &child in &node.children {
        collect_boxes(arena, child, z, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::measure;
    use crate::node::{LayoutNode, NodeKind, Offsets};
    use crate::style::{Dimension, Insets, Style};

    fn fixed(w: u16, h: u16) -> Style {
        Style::new()
            .width(Dimension::Cells(w))
            .height(Dimension::Cells(h))
    }

    fn run(arena: &mut NodeArena, root: NodeId, w: u16, h: u16) -> LayoutResult {
        let c = BoxConstraints::tight(w, h);
        measure(arena, root, c);
        layout(arena, root, c)
    }

    fn xs(arena: &NodeArena, ids: &[NodeId]) -> Vec<i32> {
        ids.iter()
            .map(|&id| arena.get(id).map(|n| n.absolute_origin().0).unwrap_or(-1))
            .collect()
    }

    fn row_of(
        arena: &mut NodeArena,
        style: Style,
        child_styles: &[Style],
    ) -> (NodeId, Vec<NodeId>) {
        let root = arena.insert(LayoutNode::new("root", NodeKind::Row).with_style(style));
        arena.set_root(root);
        let ids: Vec<NodeId> = child_styles
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let id = arena.insert(
                    LayoutNode::new(format!("c{i}"), NodeKind::Flex).with_style(s.clone()),
                );
                arena.add_child(root, id);
                id
            })
            .collect();
        (root, ids)
    }

    #[test]
    fn flex_row_with_grow() {
        // E1: Row 80, children {20, grow 1, 15} -> x {0, 20, 65}.
        let mut arena = NodeArena::new();
        let (root, ids) = row_of(
            &mut arena,
            Style::new(),
            &[
                fixed(20, 1),
                Style::new().height(Dimension::Cells(1)).flex_grow(1.0),
                fixed(15, 1),
            ],
        );
        run(&mut arena, root, 80, 24);
        assert_eq!(xs(&arena, &ids), vec![0, 20, 65]);
        let widths: Vec<u16> = ids
            .iter()
            .map(|&id| arena.get(id).map(|n| n.measured().width).unwrap_or(0))
            .collect();
        assert_eq!(widths, vec![20, 45, 15]);
    }

    #[test]
    fn justify_center() {
        // E2: Row 60, three fixed-10, Center -> x {15, 25, 35}.
        let mut arena = NodeArena::new();
        let (root, ids) = row_of(
            &mut arena,
            Style::new().justify(Justify::Center),
            &[fixed(10, 1), fixed(10, 1), fixed(10, 1)],
        );
        run(&mut arena, root, 60, 24);
        assert_eq!(xs(&arena, &ids), vec![15, 25, 35]);
    }

    #[test]
    fn justify_space_between() {
        // E3: Row 60, three fixed-10, SpaceBetween -> x {0, 25, 50}.
        let mut arena = NodeArena::new();
        let (root, ids) = row_of(
            &mut arena,
            Style::new().justify(Justify::SpaceBetween),
            &[fixed(10, 1), fixed(10, 1), fixed(10, 1)],
        );
        run(&mut arena, root, 60, 24);
        assert_eq!(xs(&arena, &ids), vec![0, 25, 50]);
    }

    #[test]
    fn justify_end() {
        let mut arena = NodeArena::new();
        let (root, ids) = row_of(
            &mut arena,
            Style::new().justify(Justify::End),
            &[fixed(10, 1), fixed(10, 1)],
        );
        run(&mut arena, root, 60, 24);
        assert_eq!(xs(&arena, &ids), vec![40, 50]);
    }

    #[test]
    fn justify_space_evenly() {
        let mut arena = NodeArena::new();
        let (root, ids) = row_of(
            &mut arena,
            Style::new().justify(Justify::SpaceEvenly),
            &[fixed(10, 1), fixed(10, 1), fixed(10, 1)],
        );
        run(&mut arena, root, 70, 24);
        // slack 40, four gaps of 10
        assert_eq!(xs(&arena, &ids), vec![10, 30, 50]);
    }

    #[test]
    fn centered_modal() {
        // E4: 80x24 root, Center/Center, single 40x15 child -> (20, 4).
        let mut arena = NodeArena::new();
        let (root, ids) = row_of(
            &mut arena,
            Style::new()
                .justify(Justify::Center)
                .align_items(AlignItems::Center),
            &[fixed(40, 15)],
        );
        run(&mut arena, root, 80, 24);
        let node = arena.get(ids[0]);
        assert_eq!(node.map(|n| n.absolute_origin()), Some((20, 4)));
        assert_eq!(node.map(|n| n.measured()), Some(Size::new(40, 15)));
    }

    #[test]
    fn gap_spaces_children() {
        let mut arena = NodeArena::new();
        let (root, ids) = row_of(
            &mut arena,
            Style::new().gap(3),
            &[fixed(5, 1), fixed(5, 1), fixed(5, 1)],
        );
        run(&mut arena, root, 60, 24);
        assert_eq!(xs(&arena, &ids), vec![0, 8, 16]);
    }

    #[test]
    fn padding_and_border_shift_inner_origin() {
        let mut arena = NodeArena::new();
        let (root, ids) = row_of(
            &mut arena,
            Style::new()
                .padding(Insets::uniform(2))
                .border(Insets::uniform(1)),
            &[fixed(5, 1)],
        );
        run(&mut arena, root, 60, 24);
        let node = arena.get(ids[0]);
        assert_eq!(node.map(|n| n.absolute_origin()), Some((3, 3)));
        assert_eq!(arena.get(root).map(|n| n.absolute_origin()), Some((0, 0)));
    }

    #[test]
    fn column_direction_stacks_down() {
        let mut arena = NodeArena::new();
        let root = arena.insert(LayoutNode::new("root", NodeKind::Column));
        arena.set_root(root);
        let a = arena.insert(LayoutNode::new("a", NodeKind::Flex).with_style(fixed(10, 3)));
        let b = arena.insert(LayoutNode::new("b", NodeKind::Flex).with_style(fixed(10, 5)));
        arena.add_child(root, a);
        arena.add_child(root, b);
        run(&mut arena, root, 80, 24);
        assert_eq!(arena.get(a).map(|n| n.absolute_origin()), Some((0, 0)));
        assert_eq!(arena.get(b).map(|n| n.absolute_origin()), Some((0, 3)));
    }

    #[test]
    fn absolute_child_uses_offsets() {
        let mut arena = NodeArena::new();
        let root = arena.insert(LayoutNode::new("root", NodeKind::Row));
        arena.set_root(root);
        let float = arena.insert(
            LayoutNode::new("float", NodeKind::Flex)
                .with_style(fixed(10, 4))
                .with_position(
                    PositionKind::Absolute,
                    Offsets {
                        top: Some(2),
                        left: Some(5),
                        ..Offsets::default()
                    },
                ),
        );
        arena.add_child(root, float);
        run(&mut arena, root, 80, 24);
        assert_eq!(arena.get(float).map(|n| n.absolute_origin()), Some((5, 2)));
    }

    #[test]
    fn absolute_right_bottom_anchors() {
        let mut arena = NodeArena::new();
        let root = arena.insert(LayoutNode::new("root", NodeKind::Row));
        arena.set_root(root);
        let float = arena.insert(
            LayoutNode::new("float", NodeKind::Flex)
                .with_style(fixed(10, 4))
                .with_position(
                    PositionKind::Absolute,
                    Offsets {
                        right: Some(2),
                        bottom: Some(1),
                        ..Offsets::default()
                    },
                ),
        );
        arena.add_child(root, float);
        run(&mut arena, root, 80, 24);
        assert_eq!(
            arena.get(float).map(|n| n.absolute_origin()),
            Some((80 - 10 - 2, 24 - 4 - 1))
        );
    }

    #[test]
    fn absolute_skipped_in_flex_walk() {
        let mut arena = NodeArena::new();
        let root = arena.insert(LayoutNode::new("root", NodeKind::Row));
        arena.set_root(root);
        let a = arena.insert(LayoutNode::new("a", NodeKind::Flex).with_style(fixed(10, 1)));
        let float = arena.insert(
            LayoutNode::new("float", NodeKind::Flex)
                .with_style(fixed(10, 1))
                .with_position(PositionKind::Absolute, Offsets::default()),
        );
        let b = arena.insert(LayoutNode::new("b", NodeKind::Flex).with_style(fixed(10, 1)));
        arena.add_child(root, a);
        arena.add_child(root, float);
        arena.add_child(root, b);
        run(&mut arena, root, 80, 24);
        // b packs directly after a; the absolute child takes no slot.
        assert_eq!(arena.get(b).map(|n| n.absolute_origin().0), Some(10));
    }

    #[test]
    fn effective_z_accumulates() {
        let mut arena = NodeArena::new();
        let root = arena.insert(LayoutNode::new("root", NodeKind::Row));
        arena.set_root(root);
        let overlay = arena.insert(
            LayoutNode::new("overlay", NodeKind::Column)
                .with_style(fixed(10, 5).z_index(10)),
        );
        let inner = arena.insert(
            LayoutNode::new("inner", NodeKind::Flex).with_style(fixed(5, 1).z_index(1)),
        );
        arena.add_child(root, overlay);
        arena.add_child(overlay, inner);
        let result = run(&mut arena, root, 80, 24);
        assert_eq!(result.box_of(overlay).map(|b| b.z_index), Some(10));
        assert_eq!(result.box_of(inner).map(|b| b.z_index), Some(11));
    }

    #[test]
    fn hit_test_prefers_higher_z() {
        let mut arena = NodeArena::new();
        let (root, ids) = row_of(
            &mut arena,
            Style::new(),
            &[fixed(5, 5), fixed(5, 5).z_index(10)],
        );
        // Overlap both children at (0,0) via absolute positioning.
        for &id in &ids {
            if let Some(n) = arena.get_mut(id) {
                n.position = PositionKind::Absolute;
                n.offsets = Offsets {
                    top: Some(0),
                    left: Some(0),
                    ..Offsets::default()
                };
            }
        }
        let result = run(&mut arena, root, 80, 24);
        assert_eq!(result.hit_test(2, 2), Some(ids[1]));
    }

    #[test]
    fn hit_test_tie_goes_to_document_order() {
        let mut arena = NodeArena::new();
        let (root, ids) = row_of(&mut arena, Style::new(), &[fixed(5, 5), fixed(5, 5)]);
        for &id in &ids {
            if let Some(n) = arena.get_mut(id) {
                n.position = PositionKind::Absolute;
            }
        }
        let result = run(&mut arena, root, 80, 24);
        assert_eq!(result.hit_test(2, 2), Some(ids[1]));
    }

    #[test]
    fn layout_bounds_hold() {
        let mut arena = NodeArena::new();
        let (root, _) = row_of(
            &mut arena,
            Style::new().gap(2).justify(Justify::SpaceAround),
            &[fixed(10, 3), fixed(8, 2), fixed(12, 4)],
        );
        let result = run(&mut arena, root, 80, 24);
        for b in &result.boxes {
            assert!(b.x >= 0 && b.y >= 0);
            assert!(b.x + i32::from(b.width) <= 80);
            assert!(b.y + i32::from(b.height) <= 24);
        }
    }

    #[test]
    fn screen_rect_clips_negative_origin() {
        let b = LayoutBox {
            node: 1,
            x: -3,
            y: 2,
            width: 10,
            height: 4,
            z_index: 0,
        };
        assert_eq!(b.screen_rect(), Some(Rect::new(0, 2, 7, 4)));
    }
}
