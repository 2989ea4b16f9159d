//! The runtime facade: layout -> render -> diff -> present.
//!
//! Owns the per-frame caches (layout result, previous frame, dirty regions),
//! the focus registry, the selection state, and the event dispatcher. The
//! node tree itself stays with the caller; the runtime only reads structure
//! and writes measured/final fields during its passes.

use tracing::warn;

use crate::buffer::{self, CellBuffer};
use crate::component::EventOutcome;
use crate::constraints::BoxConstraints;
use crate::diff;
use crate::dispatch::Dispatcher;
use crate::event::{Event, MouseButton, MouseEvent, MouseEventKind};
use crate::focus::FocusManager;
use crate::geometry::{Rect, Size};
use crate::layout::{layout, LayoutResult};
use crate::measure::measure;
use crate::node::{NodeArena, NodeId, PositionKind};
use crate::render::render;
use crate::selection::SelectionManager;

/// Runtime construction parameters.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Initial terminal width in cells.
    pub initial_width: u16,
    /// Initial terminal height in cells.
    pub initial_height: u16,
    /// Buffers at or below this cell count are pooled for reuse.
    pub buffer_pool_max_cells: u32,
    /// Repaint the whole frame after a resize.
    pub force_full_render_on_resize: bool,
    /// Whether mouse-drag selection is handled.
    pub selection_enabled: bool,
    /// Whether Tab / Shift-Tab move focus.
    pub modifier_tab_switches_focus: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            initial_width: 80,
            initial_height: 24,
            buffer_pool_max_cells: 10_000,
            force_full_render_on_resize: true,
            selection_enabled: true,
            modifier_tab_switches_focus: true,
        }
    }
}

/// One rendered frame: the cell buffer plus its dimensions and dirty flag.
#[derive(Clone, Debug)]
pub struct Frame {
    /// The frame's cells.
    pub buffer: CellBuffer,
    /// Frame width.
    pub width: u16,
    /// Frame height.
    pub height: u16,
    /// Whether this frame differs from the one before it.
    pub dirty: bool,
}

/// Orchestrates the frame pipeline and input routing.
pub struct Runtime {
    width: u16,
    height: u16,
    pool_max_cells: u32,
    force_full_on_resize: bool,

    dispatcher: Dispatcher,
    focus: FocusManager,
    selection: SelectionManager,

    root: Option<NodeId>,
    result: LayoutResult,
    previous: Option<Frame>,
    dirty: Vec<Rect>,
    pending_regions: Vec<Rect>,
    force_full: bool,
}

impl Runtime {
    /// Create a runtime with the given configuration.
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            width: config.initial_width,
            height: config.initial_height,
            pool_max_cells: config.buffer_pool_max_cells,
            force_full_on_resize: config.force_full_render_on_resize,
            dispatcher: Dispatcher::new(config.modifier_tab_switches_focus),
            focus: FocusManager::new(),
            selection: SelectionManager::new(config.selection_enabled),
            root: None,
            result: LayoutResult::default(),
            previous: None,
            dirty: Vec::new(),
            pending_regions: Vec::new(),
            force_full: true,
        }
    }

    /// Current cell dimensions.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// The most recent layout result.
    pub fn layout_result(&self) -> &LayoutResult {
        &self.result
    }

    /// The root node of the most recently laid-out tree.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// The focus manager.
    pub fn focus(&self) -> &FocusManager {
        &self.focus
    }

    /// The selection manager.
    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    /// The selection manager, mutable (for host-invoked word/line/all).
    pub fn selection_mut(&mut self) -> &mut SelectionManager {
        &mut self.selection
    }

    /// Dirty regions produced by the most recent render.
    pub fn dirty_regions(&self) -> &[Rect] {
        &self.dirty
    }

    /// Run Measure then Layout over the tree, cache the result, and rebuild
    /// the focus registry. Dirty bits are cleared for the whole tree.
    ///
    /// An empty or missing tree yields an empty result, never an error.
    pub fn layout(&mut self, arena: &mut NodeArena, root: NodeId) -> &LayoutResult {
        let constraints = BoxConstraints::tight(self.width, self.height);
        measure(arena, root, constraints);
        self.result = layout(arena, root, constraints);
        arena.clear_dirty(root);
        self.root = Some(root);

        let focusables: Vec<NodeId> = arena
            .pre_order(root)
            .into_iter()
            .filter(|&id| arena.get(id).is_some_and(|n| n.is_focusable()))
            .collect();
        self.focus.set_focusables(focusables, arena);

        self.validate_layout(arena);
        &self.result
    }

    /// Paint the cached layout into a fresh buffer, diff against the
    /// previous frame, and retain the new frame. Returns the frame.
    pub fn render(&mut self, arena: &NodeArena) -> &Frame {
        let size = self.size();
        let mut buffer = buffer::acquire_buffer(size, self.pool_max_cells);
        render(arena, &self.result, &mut buffer);

        if self.selection.is_active() {
            self.selection.apply_highlight(&mut buffer);
        }

        let full = self.force_full || self.previous.is_none();
        let mut outcome = if full {
            diff::diff(None, &buffer)
        } else {
            diff::diff(self.previous.as_ref().map(|f| &f.buffer), &buffer)
        };

        // Host-marked regions are dirty regardless of the cell diff.
        if !self.pending_regions.is_empty() {
            let frame_rect = Rect::new(0, 0, size.width, size.height);
            for region in self.pending_regions.drain(..) {
                if let Some(clipped) = region.intersection(&frame_rect) {
                    outcome.rects.push(clipped);
                    outcome.has_changes = true;
                }
            }
            outcome.rects.sort_by_key(|r| (r.y(), r.x()));
        }
        self.force_full = false;
        self.dirty = outcome.rects;

        if let Some(old) = self.previous.take() {
            buffer::release_buffer(old.buffer, self.pool_max_cells);
        }
        self.previous.insert(Frame {
            buffer,
            width: size.width,
            height: size.height,
            dirty: outcome.has_changes,
        })
    }

    /// Encode the current frame's dirty regions as terminal bytes.
    ///
    /// Returns an empty string when nothing changed.
    pub fn present(&self) -> String {
        match &self.previous {
            Some(frame) if frame.dirty => crate::ansi::encode_regions(&frame.buffer, &self.dirty),
            _ => String::new(),
        }
    }

    /// Encode the current frame in full, newline-delimited.
    pub fn present_full(&self) -> String {
        match &self.previous {
            Some(frame) => crate::ansi::encode_frame(&frame.buffer),
            None => String::new(),
        }
    }

    /// Route an input event through the dispatcher, driving focus and
    /// selection along the way.
    pub fn dispatch(&mut self, arena: &mut NodeArena, event: &Event) -> EventOutcome {
        if let Event::Resize { width, height } = event {
            self.update_dimensions(*width, *height);
            return EventOutcome::Handled;
        }

        if let Event::Mouse(m) = event
            && (m.x >= self.width || m.y >= self.height)
        {
            tracing::debug!(
                error = %crate::error::TesselError::OutOfBounds {
                    x: m.x,
                    y: m.y,
                    width: self.width,
                    height: self.height,
                },
                "mouse event dropped"
            );
            return EventOutcome::Ignored;
        }

        let outcome = self
            .dispatcher
            .dispatch(event, arena, &self.result, &mut self.focus);

        if let Event::Mouse(mouse) = event {
            self.drive_selection(mouse, outcome);
        }
        outcome
    }

    /// Move focus to the next focusable.
    pub fn focus_next(&mut self, arena: &mut NodeArena) {
        self.focus.focus_next(arena);
    }

    /// Move focus to the previous focusable.
    pub fn focus_prev(&mut self, arena: &mut NodeArena) {
        self.focus.focus_prev(arena);
    }

    /// Trap focus inside a modal subtree.
    pub fn push_modal(&mut self, arena: &mut NodeArena, modal: NodeId) {
        self.focus.push_modal(modal, arena);
    }

    /// Release the top modal trap.
    pub fn pop_modal(&mut self) {
        self.focus.pop_modal();
    }

    /// Mark a region dirty for the next present, regardless of cell diffs.
    pub fn mark_dirty(&mut self, region: Rect) {
        self.pending_regions.push(region);
    }

    /// Force the next render to treat the whole frame as dirty.
    pub fn mark_full_render(&mut self) {
        self.force_full = true;
    }

    /// Adopt new terminal dimensions.
    pub fn update_dimensions(&mut self, width: u16, height: u16) {
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        if self.force_full_on_resize {
            self.force_full = true;
        }
        // Sizes differ, so the next diff covers the whole frame anyway;
        // drop the stale buffer back to the pool now.
        if let Some(old) = self.previous.take() {
            buffer::release_buffer(old.buffer, self.pool_max_cells);
        }
    }

    /// Mouse wiring for the drag selection.
    fn drive_selection(&mut self, mouse: &MouseEvent, outcome: EventOutcome) {
        if !self.selection.is_enabled() {
            return;
        }
        match mouse.kind {
            MouseEventKind::Press if mouse.button == MouseButton::Left => {
                if outcome == EventOutcome::Handled {
                    self.selection.clear();
                } else if mouse.modifiers.contains(crate::event::Modifiers::SHIFT) {
                    self.selection.extend(mouse.x, mouse.y);
                } else {
                    self.selection.start(mouse.x, mouse.y);
                }
            }
            MouseEventKind::Move if mouse.button == MouseButton::Left => {
                self.selection.update(mouse.x, mouse.y);
            }
            _ => {}
        }
    }

    /// Check layout invariants: in-flow boxes stay inside the root.
    ///
    /// Nodes inside absolutely positioned subtrees are exempt, since those
    /// may legitimately sit outside the root. Fatal in debug builds;
    /// degrades to a full re-render in release.
    fn validate_layout(&mut self, arena: &NodeArena) {
        let w = i32::from(self.result.size.width);
        let h = i32::from(self.result.size.height);
        let mut ok = true;
        for b in &self.result.boxes {
            if in_absolute_subtree(arena, b.node) {
                continue;
            }
            if b.x < 0 || b.y < 0 || b.x + i32::from(b.width) > w || b.y + i32::from(b.height) > h
            {
                ok = false;
                break;
            }
        }
        debug_assert!(ok, "in-flow layout box escaped the root");
        if !ok {
            warn!("layout invariant violated; forcing a full render");
            self.force_full = true;
        }
    }
}

/// Whether the node or any ancestor is absolutely positioned.
fn in_absolute_subtree(arena: &NodeArena, id: NodeId) -> bool {
    let mut cursor = Some(id);
    while let Some(cur) = cursor {
        let Some(node) = arena.get(cur) else {
            return false;
        };
        if node.position == PositionKind::Absolute {
            return true;
        }
        cursor = node.parent();
    }
    false
}
