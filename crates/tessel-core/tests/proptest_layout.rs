//! Property-based tests for the measure/layout/diff pipeline.
//!
//! Random trees and frames exercise the invariants: idempotent measurement,
//! in-bounds placement, flex conservation, and diff soundness.

use proptest::prelude::*;
use tessel_core::{
    BoxConstraints, CellBuffer, CellStyle, Dimension, Justify, LayoutNode, NodeArena, NodeId,
    NodeKind, Position, Size, Style,
};

/// A generated flex child: explicit main size or a grow factor.
#[derive(Clone, Debug)]
struct GenChild {
    width: u16,
    grow: f32,
}

fn gen_child() -> impl Strategy<Value = GenChild> {
    (1u16..=20, prop_oneof![Just(0.0f32), Just(1.0), Just(2.0)]).prop_map(|(width, grow)| {
        GenChild { width, grow }
    })
}

fn gen_children() -> impl Strategy<Value = Vec<GenChild>> {
    proptest::collection::vec(gen_child(), 1..=8)
}

fn build_row(children: &[GenChild], gap: u16, justify: Justify) -> (NodeArena, NodeId, Vec<NodeId>) {
    let mut arena = NodeArena::new();
    let root = arena.insert(
        LayoutNode::new("root", NodeKind::Row)
            .with_style(Style::new().gap(i32::from(gap)).justify(justify)),
    );
    arena.set_root(root);
    let ids = children
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let style = if c.grow > 0.0 {
                Style::new().height(Dimension::Cells(1)).flex_grow(c.grow)
            } else {
                Style::new()
                    .width(Dimension::Cells(c.width))
                    .height(Dimension::Cells(1))
            };
            let id = arena.insert(LayoutNode::new(format!("c{i}"), NodeKind::Flex).with_style(style));
            arena.add_child(root, id);
            id
        })
        .collect();
    (arena, root, ids)
}

proptest! {
    /// Measuring twice under identical constraints yields identical sizes.
    #[test]
    fn measure_idempotent(
        children in gen_children(),
        width in 30u16..=120,
        gap in 0u16..=3,
    ) {
        let (mut arena, root, ids) = build_row(&children, gap, Justify::Start);
        let c = BoxConstraints::tight(width, 24);

        let first = tessel_core::measure(&mut arena, root, c);
        let sizes1: Vec<Size> = ids.iter()
            .map(|&id| arena.get(id).map(|n| n.measured()).unwrap_or_default())
            .collect();
        let second = tessel_core::measure(&mut arena, root, c);
        let sizes2: Vec<Size> = ids.iter()
            .map(|&id| arena.get(id).map(|n| n.measured()).unwrap_or_default())
            .collect();

        prop_assert_eq!(first, second);
        prop_assert_eq!(sizes1, sizes2);
    }

    /// Every relative box stays inside the root after layout.
    #[test]
    fn layout_bounds(
        children in gen_children(),
        width in 30u16..=120,
        gap in 0u16..=3,
        justify_idx in 0usize..6,
    ) {
        let justify = [
            Justify::Start,
            Justify::Center,
            Justify::End,
            Justify::SpaceBetween,
            Justify::SpaceAround,
            Justify::SpaceEvenly,
        ][justify_idx];
        // Keep content within the row so slack stays non-negative.
        let fits: i64 = children.iter().map(|c| i64::from(c.width)).sum::<i64>()
            + i64::from(gap) * (children.len() as i64 - 1);
        prop_assume!(fits <= i64::from(width));

        let (mut arena, root, _) = build_row(&children, gap, justify);
        let c = BoxConstraints::tight(width, 24);
        tessel_core::measure(&mut arena, root, c);
        let result = tessel_core::layout(&mut arena, root, c);

        for b in &result.boxes {
            prop_assert!(b.x >= 0, "box {:?} left of root", b);
            prop_assert!(b.y >= 0, "box {:?} above root", b);
            prop_assert!(
                b.x + i64::from(b.width) as i32 <= i32::from(width),
                "box {:?} exceeds width {}", b, width
            );
            prop_assert!(
                b.y + i64::from(b.height) as i32 <= 24,
                "box {:?} exceeds height", b
            );
        }
    }

    /// Flex conservation: child extents, gaps, and slack sum to the row.
    #[test]
    fn flex_conservation(
        children in gen_children(),
        width in 30u16..=120,
        gap in 0u16..=3,
    ) {
        let fits: i64 = children.iter().map(|c| i64::from(c.width)).sum::<i64>()
            + i64::from(gap) * (children.len() as i64 - 1);
        prop_assume!(fits <= i64::from(width));

        let (mut arena, root, ids) = build_row(&children, gap, Justify::Start);
        let c = BoxConstraints::tight(width, 24);
        tessel_core::measure(&mut arena, root, c);
        tessel_core::layout(&mut arena, root, c);

        let total_main: i64 = ids.iter()
            .map(|&id| arena.get(id).map(|n| i64::from(n.measured().width)).unwrap_or(0))
            .sum();
        let gaps = i64::from(gap) * (ids.len() as i64 - 1);
        let slack = i64::from(width) - total_main - gaps;

        prop_assert!(slack >= 0, "content exceeded the container");
        if children.iter().any(|c| c.grow > 0.0) {
            // Growable children absorb all slack.
            prop_assert_eq!(slack, 0);
        }
        prop_assert_eq!(total_main + gaps + slack, i64::from(width));
    }

    /// Children placed by a Start-justified row never overlap.
    #[test]
    fn no_overlap_in_row(
        children in gen_children(),
        width in 30u16..=120,
        gap in 0u16..=3,
    ) {
        let fits: i64 = children.iter().map(|c| i64::from(c.width)).sum::<i64>()
            + i64::from(gap) * (children.len() as i64 - 1);
        prop_assume!(fits <= i64::from(width));

        let (mut arena, root, ids) = build_row(&children, gap, Justify::Start);
        let c = BoxConstraints::tight(width, 24);
        tessel_core::measure(&mut arena, root, c);
        tessel_core::layout(&mut arena, root, c);

        let mut prev_right: i32 = 0;
        for &id in &ids {
            let Some(node) = arena.get(id) else { continue };
            let (x, _) = node.absolute_origin();
            prop_assert!(x >= prev_right, "child {} overlaps previous", node.id());
            prev_right = x + i32::from(node.measured().width);
        }
    }

    /// Diff soundness: every differing cell is covered; rects stay in frame.
    #[test]
    fn diff_soundness(
        changes in proptest::collection::vec((0u16..30, 0u16..12), 0..40),
        width in 10u16..=30,
        height in 4u16..=12,
    ) {
        let previous = CellBuffer::new(Size::new(width, height));
        let mut current = CellBuffer::new(Size::new(width, height));
        for &(x, y) in &changes {
            current.set_content(x % width, y % height, 0, '#', CellStyle::default(), None);
        }

        let result = tessel_core::diff(Some(&previous), &current);
        let frame = tessel_core::Rect::new(0, 0, width, height);

        for y in 0..height {
            for x in 0..width {
                let differs = previous.get(x, y) != current.get(x, y);
                if differs {
                    prop_assert!(
                        result.rects.iter().any(|r| r.contains(Position::new(x, y))),
                        "cell ({}, {}) changed but no rect covers it", x, y
                    );
                }
            }
        }
        for r in &result.rects {
            prop_assert_eq!(frame.union(r), frame, "rect escapes the frame");
        }
        prop_assert_eq!(result.has_changes, !result.rects.is_empty());
    }

    /// Weak minimality: every returned rectangle holds a real change.
    #[test]
    fn diff_weak_minimality(
        changes in proptest::collection::vec((0u16..30, 0u16..12), 1..10),
    ) {
        let previous = CellBuffer::new(Size::new(30, 12));
        let mut current = CellBuffer::new(Size::new(30, 12));
        for &(x, y) in &changes {
            current.set_content(x, y, 0, '!', CellStyle::default(), None);
        }

        let result = tessel_core::diff(Some(&previous), &current);
        for r in &result.rects {
            let mut any = false;
            for y in r.y()..r.bottom() {
                for x in r.x()..r.right() {
                    any |= previous.get(x, y) != current.get(x, y);
                }
            }
            prop_assert!(any, "rect {:?} contains no change", r);
        }
    }

    /// Encoding then stripping escapes preserves the visible characters.
    #[test]
    fn ansi_stability(
        text in "[a-z ]{0,20}",
        bold_from in 0u16..20,
    ) {
        let mut buffer = CellBuffer::new(Size::new(24, 1));
        for (x, ch) in text.chars().enumerate() {
            let style = if (x as u16) >= bold_from {
                CellStyle::new().bold(true)
            } else {
                CellStyle::default()
            };
            buffer.set_content(x as u16, 0, 0, ch, style, None);
        }

        let encoded = tessel_core::encode_frame(&buffer);
        let stripped = tessel_core::text::strip_csi(&encoded);
        let expected: String = (0..24)
            .map(|x| buffer.get(x, 0).map(|c| c.ch).unwrap_or(' '))
            .collect();
        prop_assert_eq!(stripped.trim_end_matches('\n'), expected.as_str());
    }
}
