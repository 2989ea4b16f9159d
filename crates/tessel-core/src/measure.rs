//! Measure: the bottom-up intrinsic sizing pass.
//!
//! Walks the tree depth-first, asking leaves for their content size and
//! aggregating flex containers along the main axis. Writes each node's
//! `measured` size; positions are assigned later by the layout pass.

use crate::constraints::BoxConstraints;
use crate::geometry::Size;
use crate::node::{NodeArena, NodeId, NodeKind, PositionKind};
use crate::style::{AlignItems, Dimension, Direction, Style};

/// Measure a node and its subtree under the given constraints.
///
/// Returns the node's chosen size, already stored into the node.
pub fn measure(arena: &mut NodeArena, id: NodeId, constraints: BoxConstraints) -> Size {
    let Some(node) = arena.get(id) else {
        return Size::default();
    };
    let kind = node.kind;
    let style = node.style.clone();
    let children = node.children().to_vec();

    let explicit_w = style.width.resolve(constraints.max_width);
    let explicit_h = style.height.resolve(constraints.max_height);
    let insets = style.inner_insets();

    // Children size against the node's own extent when it is explicit,
    // otherwise against whatever the parent offered.
    let avail_w = explicit_w.unwrap_or(constraints.max_width);
    let avail_h = explicit_h.unwrap_or(constraints.max_height);
    let inner = BoxConstraints::loose(avail_w, avail_h).deflate(insets);

    let content = if children.is_empty() {
        component_size(arena, id, inner)
    } else if kind.is_flex_container() {
        flex_measure(arena, id, &style, &children, inner)
    } else {
        // Text/Custom with children: the node sizes from its component;
        // children are measured for their own sake but do not contribute.
        for &child in &children {
            measure(arena, child, inner.loosen());
        }
        component_size(arena, id, inner)
    };

    let outer_w = content.width.saturating_add(insets.horizontal());
    let outer_h = content.height.saturating_add(insets.vertical());
    let size = constraints.constrain(
        explicit_w.unwrap_or(outer_w),
        explicit_h.unwrap_or(outer_h),
    );

    if let Some(node) = arena.get_mut(id) {
        node.measured = size;
    }
    size
}

/// Ask the node's component for its intrinsic size, defaulting to zero.
fn component_size(arena: &NodeArena, id: NodeId, inner: BoxConstraints) -> Size {
    arena
        .get(id)
        .and_then(|n| n.component.as_ref())
        .and_then(|c| c.measure(inner))
        .unwrap_or_default()
}

/// The main axis of a container, honoring the forced Row/Column kinds.
pub(crate) fn container_direction(kind: NodeKind, style: &Style) -> Direction {
    match kind {
        NodeKind::Row => Direction::Row,
        NodeKind::Column => Direction::Column,
        _ => style.direction,
    }
}

fn main_of(size: Size, dir: Direction) -> u16 {
    match dir {
        Direction::Row => size.width,
        Direction::Column => size.height,
    }
}

fn cross_of(size: Size, dir: Direction) -> u16 {
    match dir {
        Direction::Row => size.height,
        Direction::Column => size.width,
    }
}

fn size_from_axes(main: u16, cross: u16, dir: Direction) -> Size {
    match dir {
        Direction::Row => Size::new(main, cross),
        Direction::Column => Size::new(cross, main),
    }
}

struct ChildInfo {
    id: NodeId,
    main: u16,
    cross: u16,
    margin_main: u16,
    margin_cross: u16,
    grow: f32,
    shrink: f32,
    cross_is_auto: bool,
}

/// Aggregate a flex container's children along its main axis.
///
/// Returns the container's content size (insets excluded). Distributed
/// grow/shrink results are written back into the children's measured sizes
/// so the layout pass can place them directly.
fn flex_measure(
    arena: &mut NodeArena,
    id: NodeId,
    style: &Style,
    children: &[NodeId],
    inner: BoxConstraints,
) -> Size {
    let dir = container_direction(arena.get(id).map(|n| n.kind).unwrap_or_default(), style);

    let mut in_flow: Vec<ChildInfo> = Vec::with_capacity(children.len());
    for &child in children {
        let size = measure(arena, child, inner.loosen());
        let Some(node) = arena.get(child) else {
            continue;
        };
        if node.position == PositionKind::Absolute {
            continue; // sized here, placed by the absolute pass
        }
        let margin = node.style.margin;
        let (margin_main, margin_cross) = match dir {
            Direction::Row => (margin.horizontal(), margin.vertical()),
            Direction::Column => (margin.vertical(), margin.horizontal()),
        };
        let cross_dim = match dir {
            Direction::Row => node.style.height,
            Direction::Column => node.style.width,
        };
        in_flow.push(ChildInfo {
            id: child,
            main: main_of(size, dir),
            cross: cross_of(size, dir),
            margin_main,
            margin_cross,
            grow: node.style.flex_grow,
            shrink: node.style.flex_shrink,
            cross_is_auto: matches!(cross_dim, Dimension::Auto),
        });
    }

    let n = in_flow.len();
    if n == 0 {
        return Size::default();
    }

    let gap_total = i64::from(style.gap) * (n as i64 - 1);
    let max_main = i64::from(main_of(
        Size::new(inner.max_width, inner.max_height),
        dir,
    ));

    let fixed_total: i64 = in_flow
        .iter()
        .filter(|c| c.grow == 0.0)
        .map(|c| i64::from(c.main) + i64::from(c.margin_main))
        .sum();
    let grow_sum: f32 = in_flow.iter().map(|c| c.grow).sum();
    let shrink_sum: f32 = in_flow.iter().map(|c| c.shrink).sum();

    let remaining = max_main - fixed_total - gap_total;

    if remaining > 0 && grow_sum > 0.0 {
        distribute_growth(arena, &mut in_flow, remaining, grow_sum, dir);
    } else if remaining < 0 && shrink_sum > 0.0 {
        distribute_shrink(arena, &mut in_flow, -remaining, shrink_sum, dir);
    }

    let content_main: i64 = in_flow
        .iter()
        .map(|c| i64::from(c.main) + i64::from(c.margin_main))
        .sum::<i64>()
        + gap_total;
    let max_child_cross = in_flow
        .iter()
        .map(|c| c.cross.saturating_add(c.margin_cross))
        .max()
        .unwrap_or(0);

    let inner_cross_max = cross_of(Size::new(inner.max_width, inner.max_height), dir);
    let bounded_cross = inner_cross_max < u16::MAX;
    let container_cross = if style.align_items == AlignItems::Stretch && bounded_cross {
        inner_cross_max
    } else {
        max_child_cross
    };

    // Stretch auto-cross children to the container's inner cross extent.
    if style.align_items == AlignItems::Stretch && bounded_cross {
        for info in &in_flow {
            if !info.cross_is_auto {
                continue;
            }
            let stretched = container_cross.saturating_sub(info.margin_cross);
            if let Some(node) = arena.get_mut(info.id) {
                node.measured = size_from_axes(
                    main_of(node.measured, dir),
                    stretched,
                    dir,
                );
            }
        }
    }

    let content_main = content_main.clamp(0, i64::from(u16::MAX)) as u16;
    size_from_axes(content_main, container_cross, dir)
}

/// Hand positive free space to growable children, floor-rounded with the
/// residual on the last growable child so the total consumed is exact.
fn distribute_growth(
    arena: &mut NodeArena,
    in_flow: &mut [ChildInfo],
    remaining: i64,
    grow_sum: f32,
    dir: Direction,
) {
    let last_growable = in_flow.iter().rposition(|c| c.grow > 0.0);
    let mut handed_out: i64 = 0;
    for (i, info) in in_flow.iter_mut().enumerate() {
        if info.grow == 0.0 {
            continue;
        }
        let share = if Some(i) == last_growable {
            remaining - handed_out
        } else {
            ((remaining as f64) * f64::from(info.grow) / f64::from(grow_sum)).floor() as i64
        };
        handed_out += share;
        let main = (share - i64::from(info.margin_main)).clamp(0, i64::from(u16::MAX)) as u16;
        info.main = main;
        if let Some(node) = arena.get_mut(info.id) {
            node.measured = size_from_axes(main, cross_of(node.measured, dir), dir);
        }
    }
}

/// Remove a deficit from shrinkable children, proportionally by flex-shrink,
/// never below zero. The residual lands on the last shrinkable child.
fn distribute_shrink(
    arena: &mut NodeArena,
    in_flow: &mut [ChildInfo],
    deficit: i64,
    shrink_sum: f32,
    dir: Direction,
) {
    let last_shrinkable = in_flow.iter().rposition(|c| c.shrink > 0.0);
    let mut removed: i64 = 0;
    for (i, info) in in_flow.iter_mut().enumerate() {
        if info.shrink == 0.0 {
            continue;
        }
        let cut = if Some(i) == last_shrinkable {
            deficit - removed
        } else {
            ((deficit as f64) * f64::from(info.shrink) / f64::from(shrink_sum)).floor() as i64
        };
        removed += cut;
        let main = (i64::from(info.main) - cut).clamp(0, i64::from(u16::MAX)) as u16;
        info.main = main;
        if let Some(node) = arena.get_mut(info.id) {
            node.measured = size_from_axes(main, cross_of(node.measured, dir), dir);
        }
    }
}
