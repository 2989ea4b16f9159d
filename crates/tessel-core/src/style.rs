//! Layout style value types: dimensions, insets, and flex enums.

use tracing::debug;

/// Four non-negative edge widths (top, right, bottom, left).
///
/// Used for padding, border, and margin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Insets {
    /// Top edge.
    pub top: u16,
    /// Right edge.
    pub right: u16,
    /// Bottom edge.
    pub bottom: u16,
    /// Left edge.
    pub left: u16,
}

impl Insets {
    /// Create insets with distinct edges.
    pub const fn new(top: u16, right: u16, bottom: u16, left: u16) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Create uniform insets.
    pub const fn uniform(v: u16) -> Self {
        Self::new(v, v, v, v)
    }

    /// Total horizontal inset (left + right).
    pub const fn horizontal(self) -> u16 {
        self.left.saturating_add(self.right)
    }

    /// Total vertical inset (top + bottom).
    pub const fn vertical(self) -> u16 {
        self.top.saturating_add(self.bottom)
    }

    /// Sum two insets edge-wise.
    pub const fn add(self, other: Insets) -> Insets {
        Insets::new(
            self.top.saturating_add(other.top),
            self.right.saturating_add(other.right),
            self.bottom.saturating_add(other.bottom),
            self.left.saturating_add(other.left),
        )
    }
}

/// A requested extent along one axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// Size from content / flex distribution.
    #[default]
    Auto,
    /// Fixed size in cells.
    Cells(u16),
    /// Percentage of the parent's available extent (1-100).
    Percent(u8),
}

impl Dimension {
    /// Decode the numeric wire form: `-1` is auto, values in `(-100, -1)`
    /// are percentages, non-negative values are cell counts.
    ///
    /// Out-of-range values are clamped to the nearest valid form.
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            -1 => Dimension::Auto,
            v if v >= 0 => Dimension::Cells(v.min(i32::from(u16::MAX)) as u16),
            v if v >= -100 => Dimension::Percent((-v) as u8),
            v => {
                debug!(raw = v, "percentage below -100 clamped to 100%");
                Dimension::Percent(100)
            }
        }
    }

    /// Resolve against the parent's available extent. `None` for auto.
    pub fn resolve(self, available: u16) -> Option<u16> {
        match self {
            Dimension::Auto => None,
            Dimension::Cells(n) => Some(n),
            Dimension::Percent(p) => {
                Some((u32::from(available) * u32::from(p.min(100)) / 100) as u16)
            }
        }
    }

    /// Returns true if this dimension is auto.
    pub fn is_auto(self) -> bool {
        matches!(self, Dimension::Auto)
    }
}

/// Main-axis direction of a flex container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Lay children out left to right.
    #[default]
    Row,
    /// Lay children out top to bottom.
    Column,
}

/// Cross-axis alignment of flex children.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AlignItems {
    /// Pack children at the cross-axis start.
    #[default]
    Start,
    /// Center children on the cross axis.
    Center,
    /// Pack children at the cross-axis end.
    End,
    /// Stretch children to the container's inner cross extent.
    Stretch,
}

/// Main-axis distribution of flex children.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Justify {
    /// Pack children at the main-axis start.
    #[default]
    Start,
    /// Center the children as a group.
    Center,
    /// Pack children at the main-axis end.
    End,
    /// Equal space between children, none at the edges.
    SpaceBetween,
    /// Equal space around each child (half-size at the edges).
    SpaceAround,
    /// Equal space between children and at the edges.
    SpaceEvenly,
}

/// What happens to content that exceeds a node's box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Overflow {
    /// Content may paint outside the box.
    #[default]
    Visible,
    /// Content outside the box is clipped.
    Hidden,
    /// Clipped, with scrolling managed by the owning component.
    Scroll,
}

/// Visual and layout style of a node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Style {
    /// Requested width.
    pub width: Dimension,
    /// Requested height.
    pub height: Dimension,
    /// Share of positive free space along the main axis.
    pub flex_grow: f32,
    /// Share of overflow removed along the main axis.
    pub flex_shrink: f32,
    /// Main-axis direction for flex children.
    pub direction: Direction,
    /// Cross-axis alignment of children.
    pub align_items: AlignItems,
    /// Main-axis distribution of children.
    pub justify: Justify,
    /// Inner padding.
    pub padding: Insets,
    /// Border widths (consume space like padding).
    pub border: Insets,
    /// Outer margin.
    pub margin: Insets,
    /// Cells between adjacent flex children.
    pub gap: u16,
    /// Stacking order relative to the parent.
    pub z_index: i32,
    /// Clipping behavior for child content.
    pub overflow: Overflow,
}

impl Style {
    /// Create a default style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the requested width.
    #[must_use]
    pub fn width(mut self, w: Dimension) -> Self {
        self.width = w;
        self
    }

    /// Set the requested height.
    #[must_use]
    pub fn height(mut self, h: Dimension) -> Self {
        self.height = h;
        self
    }

    /// Set flex-grow. Negative values clamp to zero.
    #[must_use]
    pub fn flex_grow(mut self, g: f32) -> Self {
        if g < 0.0 {
            debug!(value = g, "negative flex_grow clamped to 0");
        }
        self.flex_grow = g.max(0.0);
        self
    }

    /// Set flex-shrink. Negative values clamp to zero.
    #[must_use]
    pub fn flex_shrink(mut self, s: f32) -> Self {
        if s < 0.0 {
            debug!(value = s, "negative flex_shrink clamped to 0");
        }
        self.flex_shrink = s.max(0.0);
        self
    }

    /// Set the flex direction.
    #[must_use]
    pub fn direction(mut self, d: Direction) -> Self {
        self.direction = d;
        self
    }

    /// Set cross-axis alignment.
    #[must_use]
    pub fn align_items(mut self, a: AlignItems) -> Self {
        self.align_items = a;
        self
    }

    /// Set main-axis distribution.
    #[must_use]
    pub fn justify(mut self, j: Justify) -> Self {
        self.justify = j;
        self
    }

    /// Set padding.
    #[must_use]
    pub fn padding(mut self, p: Insets) -> Self {
        self.padding = p;
        self
    }

    /// Set border widths.
    #[must_use]
    pub fn border(mut self, b: Insets) -> Self {
        self.border = b;
        self
    }

    /// Set margin.
    #[must_use]
    pub fn margin(mut self, m: Insets) -> Self {
        self.margin = m;
        self
    }

    /// Set the gap between flex children. Negative raw values clamp to zero.
    #[must_use]
    pub fn gap(mut self, gap: i32) -> Self {
        if gap < 0 {
            debug!(value = gap, "negative gap clamped to 0");
        }
        self.gap = gap.clamp(0, i32::from(u16::MAX)) as u16;
        self
    }

    /// Set the z-index.
    #[must_use]
    pub fn z_index(mut self, z: i32) -> Self {
        self.z_index = z;
        self
    }

    /// Set overflow behavior.
    #[must_use]
    pub fn overflow(mut self, o: Overflow) -> Self {
        self.overflow = o;
        self
    }

    /// Combined padding + border insets: the edges that shrink the content box.
    pub fn inner_insets(&self) -> Insets {
        self.padding.add(self.border)
    }

    /// Returns true if the node clips child content.
    pub fn clips_content(&self) -> bool {
        matches!(self.overflow, Overflow::Hidden | Overflow::Scroll)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insets_totals() {
        let i = Insets::new(1, 2, 3, 4);
        assert_eq!(i.horizontal(), 6);
        assert_eq!(i.vertical(), 4);
    }

    #[test]
    fn insets_add() {
        let a = Insets::uniform(1);
        let b = Insets::new(0, 2, 0, 2);
        assert_eq!(a.add(b), Insets::new(1, 3, 1, 3));
    }

    #[test]
    fn dimension_from_raw() {
        assert_eq!(Dimension::from_raw(-1), Dimension::Auto);
        assert_eq!(Dimension::from_raw(40), Dimension::Cells(40));
        assert_eq!(Dimension::from_raw(-30), Dimension::Percent(30));
        assert_eq!(Dimension::from_raw(-250), Dimension::Percent(100));
    }

    #[test]
    fn dimension_resolve() {
        assert_eq!(Dimension::Auto.resolve(80), None);
        assert_eq!(Dimension::Cells(20).resolve(80), Some(20));
        assert_eq!(Dimension::Percent(30).resolve(80), Some(24));
        assert_eq!(Dimension::Percent(50).resolve(81), Some(40)); // floor
    }

    #[test]
    fn builder_clamps_negatives() {
        let s = Style::new().flex_grow(-1.0).flex_shrink(-2.0).gap(-3);
        assert_eq!(s.flex_grow, 0.0);
        assert_eq!(s.flex_shrink, 0.0);
        assert_eq!(s.gap, 0);
    }

    #[test]
    fn inner_insets_combines_padding_and_border() {
        let s = Style::new()
            .padding(Insets::uniform(1))
            .border(Insets::uniform(1));
        assert_eq!(s.inner_insets(), Insets::uniform(2));
    }

    #[test]
    fn clips_content() {
        assert!(!Style::new().clips_content());
        assert!(Style::new().overflow(Overflow::Hidden).clips_content());
        assert!(Style::new().overflow(Overflow::Scroll).clips_content());
    }
}
