//! The layout node tree.
//!
//! Nodes live in an arena keyed by numeric ids; each node carries a stable
//! string identity, a parent back-link (relation only, never ownership), and
//! an ordered child list. The runtime reads structure and writes the
//! measured/final fields; everything else belongs to the external owner.

use std::collections::HashMap;

use crate::component::Component;
use crate::geometry::{Rect, Size};
use crate::style::Style;

/// Arena key for a layout node.
pub type NodeId = u64;

/// The layout role of a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Generic flex container (direction from style).
    #[default]
    Flex,
    /// Flex container forced to row direction.
    Row,
    /// Flex container forced to column direction.
    Column,
    /// Text leaf.
    Text,
    /// Component-defined leaf.
    Custom,
}

impl NodeKind {
    /// Returns true for kinds that lay children out with the flex algorithm.
    pub fn is_flex_container(self) -> bool {
        matches!(self, NodeKind::Flex | NodeKind::Row | NodeKind::Column)
    }
}

/// Rendering priority, reserved for time-sliced scheduling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    /// Background work.
    Low,
    /// Default.
    #[default]
    Normal,
    /// Render soon.
    High,
    /// Render this frame.
    Critical,
}

/// How a node is positioned by layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PositionKind {
    /// Placed by the parent's layout algorithm.
    #[default]
    Relative,
    /// Placed against the parent's inner rectangle using offsets.
    Absolute,
}

/// Optional edge offsets for positioned nodes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Offsets {
    /// Distance from the parent's inner top edge.
    pub top: Option<i32>,
    /// Distance from the parent's inner right edge.
    pub right: Option<i32>,
    /// Distance from the parent's inner bottom edge.
    pub bottom: Option<i32>,
    /// Distance from the parent's inner left edge.
    pub left: Option<i32>,
}

/// An opaque property value, consumed only by the owning component.
#[derive(Clone, Debug, PartialEq)]
pub enum PropValue {
    /// String value.
    Str(String),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Boolean value.
    Bool(bool),
}

/// A node in the layout tree.
pub struct LayoutNode {
    /// Stable external identity.
    id: String,
    /// Layout role.
    pub kind: NodeKind,
    /// Visual and layout style.
    pub style: Style,
    /// Opaque properties for the owning component.
    pub props: HashMap<String, PropValue>,
    /// Positioning mode.
    pub position: PositionKind,
    /// Edge offsets, honored when `position` is absolute.
    pub offsets: Offsets,
    /// Attached component, if any.
    pub component: Option<Box<dyn Component>>,
    /// Reserved scheduling priority.
    pub priority: Priority,

    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,

    // Written by Measure.
    pub(crate) measured: Size,
    // Written by Layout: position within the parent, then absolute.
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) abs_x: i32,
    pub(crate) abs_y: i32,

    pub(crate) layout_dirty: bool,
    pub(crate) paint_dirty: bool,
}

impl LayoutNode {
    /// Create a node with the given identity and kind.
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            style: Style::default(),
            props: HashMap::new(),
            position: PositionKind::Relative,
            offsets: Offsets::default(),
            component: None,
            priority: Priority::Normal,
            parent: None,
            children: Vec::new(),
            measured: Size::default(),
            x: 0,
            y: 0,
            abs_x: 0,
            abs_y: 0,
            layout_dirty: true,
            paint_dirty: true,
        }
    }

    /// Set the style.
    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Attach a component.
    #[must_use]
    pub fn with_component(mut self, component: Box<dyn Component>) -> Self {
        self.component = Some(component);
        self
    }

    /// Set the positioning mode.
    #[must_use]
    pub fn with_position(mut self, position: PositionKind, offsets: Offsets) -> Self {
        self.position = position;
        self.offsets = offsets;
        self
    }

    /// The node's stable string identity.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The parent's arena id, if linked.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The ordered child ids.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Size chosen by the most recent Measure pass.
    pub fn measured(&self) -> Size {
        self.measured
    }

    /// Position within the parent, from the most recent Layout pass.
    pub fn origin(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Absolute position, from the most recent Layout pass.
    pub fn absolute_origin(&self) -> (i32, i32) {
        (self.abs_x, self.abs_y)
    }

    /// Reserved scheduling priority.
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Whether this node needs a new Measure/Layout pass.
    pub fn is_layout_dirty(&self) -> bool {
        self.layout_dirty
    }

    /// Whether this node's content needs repainting.
    pub fn is_paint_dirty(&self) -> bool {
        self.paint_dirty
    }

    /// Returns true if the point is inside this node's laid-out box.
    pub fn contains_point(&self, x: u16, y: u16) -> bool {
        let (x, y) = (i32::from(x), i32::from(y));
        x >= self.abs_x
            && x < self.abs_x + i32::from(self.measured.width)
            && y >= self.abs_y
            && y < self.abs_y + i32::from(self.measured.height)
    }

    /// The content rectangle: the laid-out box minus padding and border.
    ///
    /// Returns `None` when the box sits fully outside the frame or the
    /// insets consume the whole box.
    pub fn inner_bounds(&self) -> Option<Rect> {
        let insets = self.style.inner_insets();
        let x = self.abs_x + i32::from(insets.left);
        let y = self.abs_y + i32::from(insets.top);
        let w = self.measured.width.saturating_sub(insets.horizontal());
        let h = self.measured.height.saturating_sub(insets.vertical());
        if x < 0 || y < 0 || w == 0 || h == 0 {
            return None;
        }
        Some(Rect::new(x as u16, y as u16, w, h))
    }

    /// Whether this node's component takes focus.
    pub fn is_focusable(&self) -> bool {
        self.component.as_ref().is_some_and(|c| c.is_focusable())
    }
}

impl std::fmt::Debug for LayoutNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutNode")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("children", &self.children.len())
            .field("measured", &self.measured)
            .field("origin", &(self.x, self.y))
            .finish_non_exhaustive()
    }
}

/// Arena owning every layout node, keyed by numeric id.
pub struct NodeArena {
    next_id: NodeId,
    root: Option<NodeId>,
    nodes: HashMap<NodeId, LayoutNode>,
}

impl NodeArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            root: None,
            nodes: HashMap::new(),
        }
    }

    /// Insert a node, returning its arena id.
    pub fn insert(&mut self, node: LayoutNode) -> NodeId {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        self.nodes.insert(id, node);
        id
    }

    /// The root node id, if set.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Set the root node.
    pub fn set_root(&mut self, id: NodeId) {
        if self.nodes.contains_key(&id) {
            self.root = Some(id);
        }
    }

    /// Borrow a node.
    pub fn get(&self, id: NodeId) -> Option<&LayoutNode> {
        self.nodes.get(&id)
    }

    /// Borrow a node mutably.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut LayoutNode> {
        self.nodes.get_mut(&id)
    }

    /// Returns whether a node exists.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the arena holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append `child` as the last child of `parent`.
    ///
    /// A child already linked elsewhere is detached first, so every node has
    /// exactly one parent slot pointing at it.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || !self.nodes.contains_key(&parent) || !self.nodes.contains_key(&child)
        {
            return;
        }
        self.detach(child);
        if let Some(c) = self.nodes.get_mut(&child) {
            c.parent = Some(parent);
        }
        if let Some(p) = self.nodes.get_mut(&parent)
            && !p.children.contains(&child)
        {
            p.children.push(child);
        }
        self.mark_layout_dirty(parent);
    }

    /// Detach a node from its parent, if it has one.
    pub fn detach(&mut self, id: NodeId) {
        let parent = self.nodes.get(&id).and_then(|n| n.parent);
        if let Some(pid) = parent {
            if let Some(p) = self.nodes.get_mut(&pid) {
                p.children.retain(|&c| c != id);
            }
            self.mark_layout_dirty(pid);
        }
        if let Some(n) = self.nodes.get_mut(&id) {
            n.parent = None;
        }
    }

    /// Remove a node and all descendants, returning removed ids (leaves first).
    pub fn remove_subtree(&mut self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.nodes.contains_key(&id) {
            return out;
        }
        if self.root == Some(id) {
            self.root = None;
        } else {
            self.detach(id);
        }
        self.post_order_into(id, &mut out);
        for rid in &out {
            self.nodes.remove(rid);
        }
        out
    }

    /// Mark a node as needing relayout. Propagates to every ancestor.
    pub fn mark_layout_dirty(&mut self, id: NodeId) {
        let mut cursor = Some(id);
        while let Some(cur) = cursor {
            match self.nodes.get_mut(&cur) {
                Some(n) => {
                    if n.layout_dirty {
                        break; // ancestors already marked
                    }
                    n.layout_dirty = true;
                    cursor = n.parent;
                }
                None => break,
            }
        }
    }

    /// Mark a node's content as needing repaint. Does not propagate.
    pub fn mark_paint_dirty(&mut self, id: NodeId) {
        if let Some(n) = self.nodes.get_mut(&id) {
            n.paint_dirty = true;
        }
    }

    /// Returns true if any node reachable from the root is layout-dirty.
    pub fn any_layout_dirty(&self) -> bool {
        match self.root {
            Some(root) => self.get(root).is_some_and(|n| n.layout_dirty),
            None => false,
        }
    }

    /// Clear both dirty bits on every node in the subtree.
    ///
    /// Called by the runtime after the subtree participated in a layout pass.
    pub(crate) fn clear_dirty(&mut self, id: NodeId) {
        for nid in self.pre_order(id) {
            if let Some(n) = self.nodes.get_mut(&nid) {
                n.layout_dirty = false;
                n.paint_dirty = false;
            }
        }
    }

    /// Node ids of the subtree rooted at `id`, in pre-order.
    pub fn pre_order(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if self.nodes.contains_key(&id) {
            self.pre_order_into(id, &mut out);
        }
        out
    }

    fn pre_order_into(&self, id: NodeId, out: &mut Vec<NodeId>) {
        out.push(id);
        let children = match self.nodes.get(&id) {
            Some(n) => n.children.clone(),
            None => return,
        };
        for child in children {
            self.pre_order_into(child, out);
        }
    }

    fn post_order_into(&self, id: NodeId, out: &mut Vec<NodeId>) {
        let children = match self.nodes.get(&id) {
            Some(n) => n.children.clone(),
            None => return,
        };
        for child in children {
            self.post_order_into(child, out);
        }
        out.push(id);
    }

    /// Find a node by its stable string identity.
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.nodes.iter().find(|(_, n)| n.id == id).map(|(k, _)| *k)
    }
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NodeArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeArena")
            .field("nodes", &self.nodes.len())
            .field("root", &self.root)
            .finish()
    }
}
