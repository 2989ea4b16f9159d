//! Event dispatch: geometry-first routing of input to components.
//!
//! Key events go to the focused component (Tab and Shift-Tab switch focus
//! unless the focused component captures them). Mouse events hit-test the
//! cached layout boxes top-down and bubble up the parent chain while
//! components decline them.

use crate::component::EventOutcome;
use crate::event::{Event, FocusReason, KeyCode, KeyEvent, MouseEvent, MouseEventKind};
use crate::focus::FocusManager;
use crate::layout::LayoutResult;
use crate::node::{NodeArena, NodeId};

/// Routes events to components using the most recent layout.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    /// Whether Tab / Shift-Tab move focus (`modifier_tab_switches_focus`).
    pub tab_switches_focus: bool,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self {
            tab_switches_focus: true,
        }
    }
}

impl Dispatcher {
    /// Create a dispatcher.
    pub fn new(tab_switches_focus: bool) -> Self {
        Self { tab_switches_focus }
    }

    /// Route one event. Returns how the event ended up being treated.
    pub fn dispatch(
        &self,
        event: &Event,
        arena: &mut NodeArena,
        result: &LayoutResult,
        focus: &mut FocusManager,
    ) -> EventOutcome {
        match event {
            Event::Key(key) => self.dispatch_key(key, arena, focus),
            Event::Mouse(mouse) => self.dispatch_mouse(mouse, arena, result, focus),
            Event::Paste(_) => deliver_to_focused(event, arena, focus),
            // Resize is runtime-level; focus/blur are delivered by the
            // focus manager itself.
            _ => EventOutcome::Ignored,
        }
    }

    fn dispatch_key(
        &self,
        key: &KeyEvent,
        arena: &mut NodeArena,
        focus: &mut FocusManager,
    ) -> EventOutcome {
        if key.code == KeyCode::Tab && self.tab_switches_focus {
            let captured = focus
                .current_node()
                .and_then(|id| arena.get(id))
                .and_then(|n| n.component.as_ref())
                .is_some_and(|c| c.captures_tab());
            if !captured {
                if key.shift() {
                    focus.focus_prev(arena);
                } else {
                    focus.focus_next(arena);
                }
                return EventOutcome::Handled;
            }
        }
        deliver_to_focused(&Event::Key(key.clone()), arena, focus)
    }

    fn dispatch_mouse(
        &self,
        mouse: &MouseEvent,
        arena: &mut NodeArena,
        result: &LayoutResult,
        focus: &mut FocusManager,
    ) -> EventOutcome {
        let Some(target) = result.hit_test(mouse.x, mouse.y) else {
            return EventOutcome::Ignored;
        };

        // A press moves focus onto focusable targets.
        if mouse.kind == MouseEventKind::Press
            && arena.get(target).is_some_and(|n| n.is_focusable())
        {
            focus.focus_node(target, arena, FocusReason::Click);
        }

        // Deliver to the target, bubbling up while components decline.
        let event = Event::Mouse(mouse.clone());
        let mut cursor = Some(target);
        while let Some(id) = cursor {
            match deliver(&event, arena, id) {
                EventOutcome::Handled => return EventOutcome::Handled,
                EventOutcome::Ignored | EventOutcome::PassThrough => {
                    cursor = arena.get(id).and_then(|n| n.parent());
                }
            }
        }
        EventOutcome::Ignored
    }
}

/// Deliver an event to one node's component.
fn deliver(event: &Event, arena: &mut NodeArena, id: NodeId) -> EventOutcome {
    match arena.get_mut(id).and_then(|n| n.component.as_mut()) {
        Some(component) => component.on_event(event),
        None => EventOutcome::Ignored,
    }
}

/// Deliver an event to the focused node's component, if any.
fn deliver_to_focused(
    event: &Event,
    arena: &mut NodeArena,
    focus: &mut FocusManager,
) -> EventOutcome {
    match focus.current_node() {
        Some(id) => deliver(event, arena, id),
        None => EventOutcome::Ignored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;
    use crate::constraints::BoxConstraints;
    use crate::event::{Modifiers, MouseButton};
    use crate::layout::layout;
    use crate::measure::measure;
    use crate::node::{LayoutNode, NodeKind};
    use crate::style::{Dimension, Style};
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Probe {
        name: &'static str,
        log: Log,
        outcome: EventOutcome,
        focusable: bool,
        captures_tab: bool,
    }

    impl Component for Probe {
        fn view(&self) -> String {
            String::new()
        }
        fn is_focusable(&self) -> bool {
            self.focusable
        }
        fn captures_tab(&self) -> bool {
            self.captures_tab
        }
        fn on_event(&mut self, event: &Event) -> EventOutcome {
            let tag = match event {
                Event::Key(k) => format!("{}:key:{}", self.name, k.code),
                Event::Mouse(m) => format!("{}:mouse:{},{}", self.name, m.x, m.y),
                Event::Paste(p) => format!("{}:paste:{p}", self.name),
                Event::Focus(_) => format!("{}:focus", self.name),
                Event::Blur(_) => format!("{}:blur", self.name),
                _ => format!("{}:other", self.name),
            };
            self.log.borrow_mut().push(tag);
            self.outcome
        }
    }

    fn probe(name: &'static str, log: &Log, outcome: EventOutcome, focusable: bool) -> Box<Probe> {
        Box::new(Probe {
            name,
            log: log.clone(),
            outcome,
            focusable,
            captures_tab: false,
        })
    }

    fn fixed(w: u16, h: u16) -> Style {
        Style::new()
            .width(Dimension::Cells(w))
            .height(Dimension::Cells(h))
    }

    fn press(x: u16, y: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Press,
            x,
            y,
            button: MouseButton::Left,
            modifiers: Modifiers::NONE,
        })
    }

    struct Fixture {
        arena: NodeArena,
        result: LayoutResult,
        focus: FocusManager,
        log: Log,
        left: crate::node::NodeId,
        right: crate::node::NodeId,
        root: crate::node::NodeId,
    }

    fn fixture(left_outcome: EventOutcome, root_outcome: EventOutcome) -> Fixture {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let mut arena = NodeArena::new();
        let root = arena.insert(
            LayoutNode::new("root", NodeKind::Row)
                .with_component(probe("root", &log, root_outcome, false)),
        );
        arena.set_root(root);
        let left = arena.insert(
            LayoutNode::new("left", NodeKind::Custom)
                .with_style(fixed(10, 5))
                .with_component(probe("left", &log, left_outcome, true)),
        );
        let right = arena.insert(
            LayoutNode::new("right", NodeKind::Custom)
                .with_style(fixed(10, 5))
                .with_component(probe("right", &log, EventOutcome::Handled, true)),
        );
        arena.add_child(root, left);
        arena.add_child(root, right);

        let c = BoxConstraints::tight(40, 10);
        measure(&mut arena, root, c);
        let result = layout(&mut arena, root, c);

        let mut focus = FocusManager::new();
        focus.set_focusables(vec![left, right], &mut arena);

        Fixture {
            arena,
            result,
            focus,
            log,
            left,
            right,
            root,
        }
    }

    #[test]
    fn tab_switches_focus() {
        let mut f = fixture(EventOutcome::Handled, EventOutcome::Ignored);
        let d = Dispatcher::default();
        let out = d.dispatch(
            &Event::Key(KeyEvent::plain(KeyCode::Tab)),
            &mut f.arena,
            &f.result,
            &mut f.focus,
        );
        assert_eq!(out, EventOutcome::Handled);
        assert_eq!(f.focus.current_node(), Some(f.left));
    }

    #[test]
    fn shift_tab_goes_backwards() {
        let mut f = fixture(EventOutcome::Handled, EventOutcome::Ignored);
        let d = Dispatcher::default();
        d.dispatch(
            &Event::Key(KeyEvent::new(KeyCode::Tab, Modifiers::SHIFT)),
            &mut f.arena,
            &f.result,
            &mut f.focus,
        );
        assert_eq!(f.focus.current_node(), Some(f.right));
    }

    #[test]
    fn tab_disabled_reaches_component() {
        let mut f = fixture(EventOutcome::Handled, EventOutcome::Ignored);
        f.focus.focus_node(f.left, &mut f.arena, FocusReason::Programmatic);
        f.log.borrow_mut().clear();
        let d = Dispatcher::new(false);
        d.dispatch(
            &Event::Key(KeyEvent::plain(KeyCode::Tab)),
            &mut f.arena,
            &f.result,
            &mut f.focus,
        );
        assert_eq!(f.log.borrow().as_slice(), ["left:key:Tab"]);
    }

    #[test]
    fn captured_tab_reaches_component() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let mut arena = NodeArena::new();
        let root = arena.insert(LayoutNode::new("root", NodeKind::Row));
        arena.set_root(root);
        let editor = arena.insert(
            LayoutNode::new("editor", NodeKind::Custom)
                .with_style(fixed(10, 5))
                .with_component(Box::new(Probe {
                    name: "editor",
                    log: log.clone(),
                    outcome: EventOutcome::Handled,
                    focusable: true,
                    captures_tab: true,
                })),
        );
        arena.add_child(root, editor);
        let c = BoxConstraints::tight(40, 10);
        measure(&mut arena, root, c);
        let result = layout(&mut arena, root, c);
        let mut focus = FocusManager::new();
        focus.set_focusables(vec![editor], &mut arena);
        focus.focus_node(editor, &mut arena, FocusReason::Programmatic);
        log.borrow_mut().clear();

        let d = Dispatcher::default();
        d.dispatch(
            &Event::Key(KeyEvent::plain(KeyCode::Tab)),
            &mut arena,
            &result,
            &mut focus,
        );
        assert_eq!(log.borrow().as_slice(), ["editor:key:Tab"]);
    }

    #[test]
    fn keys_go_to_focused_component() {
        let mut f = fixture(EventOutcome::Handled, EventOutcome::Ignored);
        f.focus.focus_node(f.right, &mut f.arena, FocusReason::Programmatic);
        f.log.borrow_mut().clear();
        let d = Dispatcher::default();
        d.dispatch(
            &Event::Key(KeyEvent::plain(KeyCode::Enter)),
            &mut f.arena,
            &f.result,
            &mut f.focus,
        );
        assert_eq!(f.log.borrow().as_slice(), ["right:key:Enter"]);
    }

    #[test]
    fn mouse_press_hits_and_focuses_target() {
        let mut f = fixture(EventOutcome::Handled, EventOutcome::Ignored);
        let d = Dispatcher::default();
        let out = d.dispatch(&press(12, 2), &mut f.arena, &f.result, &mut f.focus);
        assert_eq!(out, EventOutcome::Handled);
        assert_eq!(f.focus.current_node(), Some(f.right));
        assert!(f
            .log
            .borrow()
            .iter()
            .any(|e| e == "right:mouse:12,2"));
    }

    #[test]
    fn unconsumed_mouse_bubbles_to_parent() {
        let mut f = fixture(EventOutcome::Ignored, EventOutcome::Handled);
        let d = Dispatcher::default();
        let out = d.dispatch(&press(2, 2), &mut f.arena, &f.result, &mut f.focus);
        assert_eq!(out, EventOutcome::Handled);
        let log = f.log.borrow();
        let left_pos = log.iter().position(|e| e == "left:mouse:2,2");
        let root_pos = log.iter().position(|e| e == "root:mouse:2,2");
        assert!(left_pos.is_some() && root_pos.is_some());
        assert!(left_pos < root_pos);
        let _ = f.root;
    }

    #[test]
    fn pass_through_also_bubbles() {
        let mut f = fixture(EventOutcome::PassThrough, EventOutcome::Handled);
        let d = Dispatcher::default();
        let out = d.dispatch(&press(2, 2), &mut f.arena, &f.result, &mut f.focus);
        assert_eq!(out, EventOutcome::Handled);
        assert!(f.log.borrow().iter().any(|e| e == "root:mouse:2,2"));
    }

    #[test]
    fn miss_is_ignored() {
        let mut f = fixture(EventOutcome::Handled, EventOutcome::Ignored);
        let d = Dispatcher::default();
        // Inside the root but outside both children; the root handles
        // nothing here.
        let out = d.dispatch(&press(39, 9), &mut f.arena, &f.result, &mut f.focus);
        assert_eq!(out, EventOutcome::Ignored);
    }

    #[test]
    fn paste_goes_to_focused() {
        let mut f = fixture(EventOutcome::Handled, EventOutcome::Ignored);
        f.focus.focus_node(f.left, &mut f.arena, FocusReason::Programmatic);
        f.log.borrow_mut().clear();
        let d = Dispatcher::default();
        d.dispatch(
            &Event::Paste("hi".into()),
            &mut f.arena,
            &f.result,
            &mut f.focus,
        );
        assert_eq!(f.log.borrow().as_slice(), ["left:paste:hi"]);
    }

    #[test]
    fn hit_test_agrees_with_layout_centers() {
        let mut f = fixture(EventOutcome::Handled, EventOutcome::Ignored);
        for id in [f.left, f.right] {
            let b = f.result.box_of(id).cloned();
            let b = match b {
                Some(b) => b,
                None => continue,
            };
            let cx = (b.x + i32::from(b.width) / 2) as u16;
            let cy = (b.y + i32::from(b.height) / 2) as u16;
            assert_eq!(f.result.hit_test(cx, cy), Some(id));
        }
    }
}
