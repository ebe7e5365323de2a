#![forbid(unsafe_code)]

//! Measurement host seam.
//!
//! The solver never touches a live document. Everything it needs is read
//! through [`LayoutHost`]: bounding rectangles, box-model sizes, overflow
//! styles, and the viewport's scroll state. A host may be backed by a real
//! renderer or by a [`LayoutSnapshot`](crate::snapshot::LayoutSnapshot).

use anchorage_core::{Point, Rect, Sides, Size};

/// Opaque handle to an element owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Computed `overflow-x` / `overflow-y` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OverflowStyle {
    #[default]
    Visible,
    Hidden,
    Scroll,
    Clip,
    Auto,
}

impl OverflowStyle {
    /// Whether content outside the box is cut off.
    #[inline]
    pub const fn clips(self) -> bool {
        !matches!(self, Self::Visible)
    }
}

/// Layout measurements for one element.
///
/// `rect` is in viewport pixels and reflects any ancestor transform.
/// `offset_size`, `client_size` and `border` are untransformed CSS pixels,
/// which is what lets the collector recover an element's own scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementMetrics {
    /// Bounding client rect.
    pub rect: Rect,
    /// Border box size (offsetWidth/offsetHeight).
    pub offset_size: Size,
    /// Padding box size without scrollbars (clientWidth/clientHeight).
    pub client_size: Size,
    /// Border widths.
    pub border: Sides,
    pub overflow_x: OverflowStyle,
    pub overflow_y: OverflowStyle,
    /// `overflow-clip-margin`, only honoured for `overflow: clip`.
    pub clip_margin: f64,
    /// Computed `width`/`height`, used for scale detection.
    pub css_size: Size,
    /// False for `display: none` or detached elements.
    pub visible: bool,
    /// The document root or body; never treated as a clipping ancestor.
    pub is_root: bool,
}

impl ElementMetrics {
    /// Metrics for an untransformed, borderless, non-clipping box.
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            offset_size: rect.size(),
            client_size: rect.size(),
            border: Sides::default(),
            overflow_x: OverflowStyle::Visible,
            overflow_y: OverflowStyle::Visible,
            clip_margin: 0.0,
            css_size: rect.size(),
            visible: true,
            is_root: false,
        }
    }

    /// Set both overflow axes.
    #[must_use]
    pub fn overflow(mut self, overflow: OverflowStyle) -> Self {
        self.overflow_x = overflow;
        self.overflow_y = overflow;
        self
    }

    #[must_use]
    pub fn overflow_xy(mut self, x: OverflowStyle, y: OverflowStyle) -> Self {
        self.overflow_x = x;
        self.overflow_y = y;
        self
    }

    /// Set border widths; the client size shrinks accordingly.
    #[must_use]
    pub fn border(mut self, border: Sides) -> Self {
        self.border = border;
        self.client_size = Size::new(
            self.offset_size.width - border.horizontal_sum(),
            self.offset_size.height - border.vertical_sum(),
        );
        self
    }

    /// Reserve scrollbar gutters on the right (`width`) and bottom (`height`).
    #[must_use]
    pub fn scrollbars(mut self, width: f64, height: f64) -> Self {
        self.client_size = Size::new(
            self.client_size.width - width,
            self.client_size.height - height,
        );
        self
    }

    #[must_use]
    pub fn clip_margin(mut self, margin: f64) -> Self {
        self.clip_margin = margin;
        self
    }

    /// Declare the CSS size; a measured rect smaller than this means the
    /// element is scaled down. Also resets the offset and client sizes, so
    /// call it before [`border`](Self::border) and
    /// [`scrollbars`](Self::scrollbars).
    #[must_use]
    pub fn css_size(mut self, size: Size) -> Self {
        self.css_size = size;
        self.offset_size = size;
        self.client_size = size;
        self
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    #[must_use]
    pub fn root(mut self) -> Self {
        self.is_root = true;
        self
    }

    /// Whether this element clips its descendants.
    #[inline]
    pub fn is_scroller(&self) -> bool {
        self.overflow_x.clips() || self.overflow_y.clips()
    }

    /// Whether both axes use `overflow: clip`.
    #[inline]
    pub fn is_overflow_clip(&self) -> bool {
        self.overflow_x == OverflowStyle::Clip && self.overflow_y == OverflowStyle::Clip
    }

    /// Visible enough to align against: displayed and extended on some axis.
    ///
    /// Only a target empty on both axes is skipped; a zero-width but tall
    /// target still aligns.
    #[inline]
    pub fn is_displayed(&self) -> bool {
        self.visible && (self.rect.width > 0.0 || self.rect.height > 0.0)
    }
}

/// Scroll state of the root viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportMetrics {
    pub client_width: f64,
    pub client_height: f64,
    pub scroll_width: f64,
    pub scroll_height: f64,
    pub scroll_left: f64,
    pub scroll_top: f64,
}

impl ViewportMetrics {
    /// A viewport whose content exactly fits (nothing to scroll).
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            client_width: width,
            client_height: height,
            scroll_width: width,
            scroll_height: height,
            scroll_left: 0.0,
            scroll_top: 0.0,
        }
    }

    /// Set the scrollable content size.
    #[must_use]
    pub const fn scroll_size(mut self, width: f64, height: f64) -> Self {
        self.scroll_width = width;
        self.scroll_height = height;
        self
    }

    /// Set the current scroll position.
    #[must_use]
    pub const fn scrolled_to(mut self, left: f64, top: f64) -> Self {
        self.scroll_left = left;
        self.scroll_top = top;
        self
    }
}

/// Client area of a popup's positioning container, in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContainerMetrics {
    pub origin: Point,
    pub client_size: Size,
}

impl ContainerMetrics {
    pub const fn new(origin: Point, client_size: Size) -> Self {
        Self {
            origin,
            client_size,
        }
    }
}

/// Where `rect` would sit if anchored with `right: 0; bottom: 0` inside
/// `container` instead of `left: 0; top: 0`.
///
/// This stands in for re-anchoring a live element and reading it back.
pub fn measure_mirrored(rect: &Rect, container: &ContainerMetrics) -> Rect {
    Rect::new(
        container.origin.x + container.client_size.width - rect.width,
        container.origin.y + container.client_size.height - rect.height,
        rect.width,
        rect.height,
    )
}

/// Source of layout measurements for alignment passes.
pub trait LayoutHost {
    /// Parent element, `None` at the root.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Current measurements, `None` once the element is unmounted.
    fn metrics(&self, node: NodeId) -> Option<ElementMetrics>;

    /// Root viewport scroll state.
    fn viewport(&self) -> ViewportMetrics;

    /// Positioning container of a popup. Defaults to the viewport.
    fn containing_block(&self, node: NodeId) -> ContainerMetrics {
        let _ = node;
        let vp = self.viewport();
        ContainerMetrics::new(
            Point::default(),
            Size::new(vp.client_width, vp.client_height),
        )
    }

    /// Structural generation; must change whenever elements are added,
    /// removed or re-parented.
    fn generation(&self) -> u64 {
        0
    }
}

impl<H: LayoutHost + ?Sized> LayoutHost for &H {
    fn parent(&self, node: NodeId) -> Option<NodeId> {
        (**self).parent(node)
    }

    fn metrics(&self, node: NodeId) -> Option<ElementMetrics> {
        (**self).metrics(node)
    }

    fn viewport(&self) -> ViewportMetrics {
        (**self).viewport()
    }

    fn containing_block(&self, node: NodeId) -> ContainerMetrics {
        (**self).containing_block(node)
    }

    fn generation(&self) -> u64 {
        (**self).generation()
    }
}
