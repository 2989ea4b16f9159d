//! The component contract between the runtime and external widgets.

use crate::constraints::BoxConstraints;
use crate::event::Event;
use crate::geometry::Size;

/// Result of a component handling an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventOutcome {
    /// The event was consumed; routing stops.
    Handled,
    /// The event was not handled; the dispatcher bubbles it to the parent.
    Ignored,
    /// The component observed the event but wants it to keep bubbling.
    PassThrough,
}

/// What the core expects from every component attached to a layout node.
///
/// One capability-set trait with default no-op implementations: the core
/// never needs to know concrete widget types. Only `view` is required.
pub trait Component {
    /// The component's content as a lines-separated string.
    ///
    /// Embedded `ESC [ … m` sequences are permitted; the renderer preserves
    /// them atomically via styled-text runs.
    fn view(&self) -> String;

    /// Intrinsic size under the given constraints, if the component has one.
    ///
    /// The returned size must respect the constraints. Leaf nodes without a
    /// measure implementation size to zero.
    fn measure(&self, constraints: BoxConstraints) -> Option<Size> {
        let _ = constraints;
        None
    }

    /// Notification that this component gained or lost focus.
    fn set_focus(&mut self, focused: bool) {
        let _ = focused;
    }

    /// Whether this component participates in focus traversal.
    fn is_focusable(&self) -> bool {
        false
    }

    /// Handle an input or focus event.
    fn on_event(&mut self, event: &Event) -> EventOutcome {
        let _ = event;
        EventOutcome::Ignored
    }

    /// When true and focused, Tab / Shift-Tab are delivered to this
    /// component instead of switching focus.
    fn captures_tab(&self) -> bool {
        false
    }
}
