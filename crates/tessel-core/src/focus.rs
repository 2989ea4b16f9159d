//! Focus management: ordered traversal, modal trapping, directional hints.
//!
//! The registry is rebuilt from the tree on every layout pass; event
//! dispatch reads it without further synchronization (the runtime is
//! single-threaded).

use crate::event::{BlurEvent, Event, FocusEvent, FocusReason};
use crate::layout::LayoutResult;
use crate::node::{NodeArena, NodeId};

/// The focus machine's current state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusState {
    /// Nothing is focused.
    NoFocus,
    /// A node is focused, no modal is active.
    Focused(NodeId),
    /// A modal traps focus; a node inside it is focused.
    ModalFocused {
        /// The modal subtree root.
        modal: NodeId,
        /// The focused node inside the modal.
        node: NodeId,
    },
}

/// A cardinal direction for spatial focus navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusDirection {
    /// Toward smaller rows.
    Up,
    /// Toward larger rows.
    Down,
    /// Toward smaller columns.
    Left,
    /// Toward larger columns.
    Right,
}

/// Manages which component currently holds keyboard focus.
#[derive(Debug, Default)]
pub struct FocusManager {
    /// Focusable node ids in tree pre-order.
    order: Vec<NodeId>,
    /// Index of the focused entry, if any.
    current: Option<usize>,
    /// Stack of modal subtree roots; the top traps traversal.
    modals: Vec<NodeId>,
}

impl FocusManager {
    /// Create a focus manager with an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the registry with a freshly collected focusable list.
    ///
    /// Focus is preserved when the focused node is still present; otherwise
    /// it moves to the nearest index, or clears when the list is empty.
    /// Rebuilding never steals focus for a previously unfocused tree.
    pub fn set_focusables(&mut self, order: Vec<NodeId>, arena: &mut NodeArena) {
        let previous = self.current_node();
        self.order = order;
        self.current = match previous {
            None => None,
            Some(prev) => match self.order.iter().position(|&id| id == prev) {
                Some(pos) => Some(pos),
                None => {
                    let stale = arena
                        .get(prev)
                        .map(|n| n.id().to_string())
                        .unwrap_or_default();
                    tracing::debug!(
                        error = %crate::error::TesselError::StaleFocus(stale),
                        "repositioning focus"
                    );
                    if self.order.is_empty() {
                        None
                    } else {
                        let pos = self.current.unwrap_or(0).min(self.order.len() - 1);
                        Some(pos)
                    }
                }
            },
        };
        let now = self.current_node();
        if previous != now {
            self.notify_change(arena, previous, now, FocusReason::Programmatic);
        }
    }

    /// The focused node, if any.
    pub fn current_node(&self) -> Option<NodeId> {
        self.current.and_then(|i| self.order.get(i).copied())
    }

    /// The current state of the focus machine.
    pub fn state(&self) -> FocusState {
        match (self.current_node(), self.modals.last()) {
            (None, _) => FocusState::NoFocus,
            (Some(node), None) => FocusState::Focused(node),
            (Some(node), Some(&modal)) => FocusState::ModalFocused { modal, node },
        }
    }

    /// Number of registered focusables.
    pub fn count(&self) -> usize {
        self.order.len()
    }

    /// Trap focus traversal within a modal subtree.
    ///
    /// If the focused node is outside the modal, focus moves to the first
    /// focusable inside it.
    pub fn push_modal(&mut self, modal: NodeId, arena: &mut NodeArena) {
        self.modals.push(modal);
        let inside = self
            .current_node()
            .is_some_and(|node| in_subtree(arena, node, modal));
        if !inside {
            let first = self
                .order
                .iter()
                .position(|&id| self.visitable(id, arena));
            let previous = self.current_node();
            self.current = first;
            let now = self.current_node();
            if previous != now {
                self.notify_change(arena, previous, now, FocusReason::Programmatic);
            }
        }
    }

    /// Release the top modal trap.
    pub fn pop_modal(&mut self) -> Option<NodeId> {
        self.modals.pop()
    }

    /// Move focus to the next visitable entry (Tab order).
    pub fn focus_next(&mut self, arena: &mut NodeArena) {
        self.advance(arena, 1, FocusReason::Tab);
    }

    /// Move focus to the previous visitable entry (Shift-Tab order).
    pub fn focus_prev(&mut self, arena: &mut NodeArena) {
        self.advance(arena, -1, FocusReason::ShiftTab);
    }

    /// Focus a node by its stable string identity.
    pub fn focus_by_id(&mut self, id: &str, arena: &mut NodeArena) -> bool {
        match arena.find_by_id(id) {
            Some(node) => self.focus_node(node, arena, FocusReason::Programmatic),
            None => false,
        }
    }

    /// Focus a specific node, if it is registered and visitable.
    pub fn focus_node(&mut self, node: NodeId, arena: &mut NodeArena, reason: FocusReason) -> bool {
        let Some(pos) = self.order.iter().position(|&id| id == node) else {
            return false;
        };
        if !self.visitable(node, arena) {
            return false;
        }
        let previous = self.current_node();
        if previous == Some(node) {
            return true;
        }
        self.current = Some(pos);
        self.notify_change(arena, previous, Some(node), reason);
        true
    }

    /// Focus the nearest focusable in the given cardinal direction.
    ///
    /// Distance along the direction's axis wins; the cross-axis offset
    /// breaks ties. Without a current focus the first visitable entry is
    /// taken.
    pub fn focus_by_direction(
        &mut self,
        dir: FocusDirection,
        result: &LayoutResult,
        arena: &mut NodeArena,
    ) -> bool {
        let Some(from) = self.current_node() else {
            let first = self.order.iter().position(|&id| self.visitable(id, arena));
            if let Some(pos) = first {
                let node = self.order[pos];
                return self.focus_node(node, arena, FocusReason::Programmatic);
            }
            return false;
        };
        let Some(from_box) = result.box_of(from) else {
            return false;
        };
        let (fx, fy) = box_center(from_box);

        let mut best: Option<(i64, i64, NodeId)> = None;
        for &candidate in &self.order {
            if candidate == from || !self.visitable(candidate, arena) {
                continue;
            }
            let Some(b) = result.box_of(candidate) else {
                continue;
            };
            let (cx, cy) = box_center(b);
            let (main, cross) = match dir {
                FocusDirection::Up => (fy - cy, (cx - fx).abs()),
                FocusDirection::Down => (cy - fy, (cx - fx).abs()),
                FocusDirection::Left => (fx - cx, (cy - fy).abs()),
                FocusDirection::Right => (cx - fx, (cy - fy).abs()),
            };
            if main <= 0 {
                continue;
            }
            let key = (main, cross, candidate);
            if best.is_none_or(|b| (key.0, key.1) < (b.0, b.1)) {
                best = Some(key);
            }
        }
        match best {
            Some((_, _, node)) => self.focus_node(node, arena, FocusReason::Programmatic),
            None => false,
        }
    }

    /// Clear focus entirely, notifying the blurred component.
    pub fn clear(&mut self, arena: &mut NodeArena) {
        let previous = self.current_node();
        self.current = None;
        if previous.is_some() {
            self.notify_change(arena, previous, None, FocusReason::Programmatic);
        }
    }

    /// Step through the registry skipping unvisitable entries.
    fn advance(&mut self, arena: &mut NodeArena, step: i64, reason: FocusReason) {
        let n = self.order.len() as i64;
        if n == 0 {
            return;
        }
        let start = self.current.map(|i| i as i64).unwrap_or(if step > 0 {
            -1
        } else {
            n
        });
        let mut cursor = start;
        for _ in 0..n {
            cursor = (cursor + step).rem_euclid(n);
            let id = self.order[cursor as usize];
            if self.visitable(id, arena) {
                let previous = self.current_node();
                if previous == Some(id) {
                    return; // only one visitable entry
                }
                self.current = Some(cursor as usize);
                self.notify_change(arena, previous, Some(id), reason);
                return;
            }
        }
    }

    /// Whether a registered node can take focus right now: its component
    /// still reports focusable, and it sits inside the active modal.
    fn visitable(&self, id: NodeId, arena: &NodeArena) -> bool {
        let focusable = arena.get(id).is_some_and(|n| n.is_focusable());
        if !focusable {
            return false;
        }
        match self.modals.last() {
            Some(&modal) => in_subtree(arena, id, modal),
            None => true,
        }
    }

    /// Deliver blur and focus notifications for a completed transition.
    fn notify_change(
        &self,
        arena: &mut NodeArena,
        from: Option<NodeId>,
        to: Option<NodeId>,
        reason: FocusReason,
    ) {
        let from_sid = from.and_then(|id| arena.get(id).map(|n| n.id().to_string()));
        let to_sid = to.and_then(|id| arena.get(id).map(|n| n.id().to_string()));

        if let Some(prev) = from
            && let Some(node) = arena.get_mut(prev)
            && let Some(component) = node.component.as_mut()
        {
            component.set_focus(false);
            component.on_event(&Event::Blur(BlurEvent {
                to_id: to_sid.clone(),
            }));
        }
        if let Some(next) = to
            && let Some(to_sid) = to_sid
            && let Some(node) = arena.get_mut(next)
            && let Some(component) = node.component.as_mut()
        {
            component.set_focus(true);
            component.on_event(&Event::Focus(FocusEvent {
                reason,
                from_id: from_sid,
                to_id: to_sid,
            }));
        }
    }
}

/// Whether `node` lies inside the subtree rooted at `root` (inclusive).
fn in_subtree(arena: &NodeArena, node: NodeId, root: NodeId) -> bool {
    let mut cursor = Some(node);
    while let Some(cur) = cursor {
        if cur == root {
            return true;
        }
        cursor = arena.get(cur).and_then(|n| n.parent());
    }
    false
}

fn box_center(b: &crate::layout::LayoutBox) -> (i64, i64) {
    (
        i64::from(b.x) + i64::from(b.width) / 2,
        i64::from(b.y) + i64::from(b.height) / 2,
    )
}
