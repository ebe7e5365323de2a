#![forbid(unsafe_code)]

//! Region collection: which part of the page a popup may occupy.
//!
//! Two boundaries are produced per pass:
//!
//! - the **visible region**, the viewport's client box cut down by every
//!   clipping ancestor of the target and the popup;
//! - the **scroll region**, the viewport's whole scrollable extent cut down
//!   the same way.
//!
//! Ancestor discovery is comparatively expensive (a style read per
//! ancestor) and only changes when the tree does, so [`ScrollerCache`] keeps
//! the list keyed on the host's structural generation. The regions
//! themselves depend on scroll offsets and are recomputed every pass.

use rustc_hash::FxHashSet;

use anchorage_core::Region;

use crate::host::{ElementMetrics, LayoutHost, NodeId};

/// Visible and scroll boundaries for one pass.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Regions {
    pub visible: Region,
    pub scroll: Region,
}

/// Clipping ancestors of `node`, nearest first.
pub fn collect_scrollers<H: LayoutHost + ?Sized>(host: &H, node: NodeId) -> Vec<NodeId> {
    let mut scrollers = Vec::new();
    let mut current = host.parent(node);
    while let Some(id) = current {
        match host.metrics(id) {
            Some(metrics) if metrics.is_scroller() => scrollers.push(id),
            Some(_) => {}
            None => break,
        }
        current = host.parent(id);
    }
    scrollers
}

/// De-duplicated union of the target's and the popup's scrollers.
///
/// Target scrollers come first; a point-mode target contributes none.
pub fn collect_shared_scrollers<H: LayoutHost + ?Sized>(
    host: &H,
    target: Option<NodeId>,
    popup: NodeId,
) -> Vec<NodeId> {
    let mut seen = FxHashSet::default();
    let mut list = Vec::new();
    let target_list = target
        .map(|t| collect_scrollers(host, t))
        .unwrap_or_default();
    for id in target_list.into_iter().chain(collect_scrollers(host, popup)) {
        if seen.insert(id) {
            list.push(id);
        }
    }
    list
}

/// Ratio of rendered to layout size, rounded to three decimals.
///
/// Returns 1 when the ratio is undefined (zero layout size).
pub(crate) fn measured_scale(rendered: f64, layout: f64) -> f64 {
    let ratio = (rendered / layout * 1000.0).round() / 1000.0;
    if ratio.is_finite() { ratio } else { 1.0 }
}

/// The box within which a scroller shows its content, in viewport pixels.
///
/// That is the bounding rect minus borders and scrollbar gutters, widened by
/// the clip margin under `overflow: clip`.
pub fn scroller_clip_box(metrics: &ElementMetrics) -> Region {
    let rect = metrics.rect;
    let border = metrics.border;
    let scale_x = measured_scale(rect.width, metrics.offset_size.width);
    let scale_y = measured_scale(rect.height, metrics.offset_size.height);

    let gutter_x = (metrics.offset_size.width
        - metrics.client_size.width
        - border.horizontal_sum())
        * scale_x;
    let gutter_y = (metrics.offset_size.height
        - metrics.client_size.height
        - border.vertical_sum())
        * scale_y;

    let (clip_x, clip_y) = if metrics.is_overflow_clip() {
        (metrics.clip_margin * scale_x, metrics.clip_margin * scale_y)
    } else {
        (0.0, 0.0)
    };

    let left = rect.x + border.left * scale_x - clip_x;
    let top = rect.y + border.top * scale_y - clip_y;
    let right = left + rect.width + 2.0 * clip_x
        - border.left * scale_x
        - border.right * scale_x
        - gutter_x;
    let bottom = top + rect.height + 2.0 * clip_y
        - border.top * scale_y
        - border.bottom * scale_y
        - gutter_y;

    Region::new(left, top, right, bottom)
}

/// Cut `initial` down by the clip box of every non-root scroller.
pub fn visible_area<H: LayoutHost + ?Sized>(
    host: &H,
    initial: Region,
    scrollers: &[NodeId],
) -> Region {
    scrollers
        .iter()
        .filter_map(|id| host.metrics(*id))
        .filter(|metrics| !metrics.is_root)
        .fold(initial, |area, metrics| {
            area.intersect(&scroller_clip_box(&metrics))
        })
}

/// Build both regions from the viewport and the given scrollers.
pub fn collect_regions<H: LayoutHost + ?Sized>(host: &H, scrollers: &[NodeId]) -> Regions {
    let vp = host.viewport();
    let visible = Region::new(0.0, 0.0, vp.client_width, vp.client_height);
    let scroll = Region::new(
        -vp.scroll_left,
        -vp.scroll_top,
        vp.scroll_width - vp.scroll_left,
        vp.scroll_height - vp.scroll_top,
    );
    Regions {
        visible: visible_area(host, visible, scrollers),
        scroll: visible_area(host, scroll, scrollers),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ScrollerKey {
    target: Option<NodeId>,
    popup: NodeId,
    generation: u64,
}

/// Memoized scroller list for one target/popup pair.
#[derive(Debug, Clone, Default)]
pub struct ScrollerCache {
    key: Option<ScrollerKey>,
    scrollers: Vec<NodeId>,
}

impl ScrollerCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-collect if the pair or the host generation changed.
    ///
    /// Returns `true` when the scroller list differs from the previous one.
    pub fn refresh<H: LayoutHost + ?Sized>(
        &mut self,
        host: &H,
        target: Option<NodeId>,
        popup: NodeId,
    ) -> bool {
        let key = ScrollerKey {
            target,
            popup,
            generation: host.generation(),
        };
        if self.key.as_ref() == Some(&key) {
            return false;
        }
        let scrollers = collect_shared_scrollers(host, target, popup);
        self.key = Some(key);
        if scrollers == self.scrollers {
            return false;
        }
        self.scrollers = scrollers;
        true
    }

    /// The cached list (empty before the first refresh).
    pub fn scrollers(&self) -> &[NodeId] {
        &self.scrollers
    }

    /// Drop the cached list; the next refresh always re-collects.
    pub fn invalidate(&mut self) {
        self.key = None;
        self.scrollers.clear();
    }
}
