#![forbid(unsafe_code)]

//! The alignment solver.
//!
//! [`solve`] is a pure function of one pass's measurements plus the
//! session's [`FlipCache`]. A pass runs in order:
//!
//! 1. pick the scoring and trigger regions from `htmlRegion`;
//! 2. align the popup anchor onto the (offset) target anchor;
//! 3. flip vertically, then horizontally, when the preferred side overflows
//!    the trigger region (or the flip is sticky) and the mirrored side
//!    scores at least as well;
//! 4. shift along each enabled axis to stay inside the visible region,
//!    without letting the popup detach from the target;
//! 5. put the arrow at the middle of the popup/target overlap;
//! 6. convert everything to the popup's own (unscaled) CSS pixels.
//!
//! Under right-to-left direction the placement is mirrored horizontally
//! once up front; the rest of the pass is direction-agnostic.

use serde::Serialize;

use anchorage_core::{
    AnchorCode, Axis, HorizontalAnchor, Rect, Region, Size, VerticalAnchor, resolve_offset_pair,
};

use crate::flip_cache::{FlipCache, FlipFlags};
use crate::placement::{Direction, HtmlRegion, Placement};
use crate::region::{Regions, measured_scale};

const LOG_TARGET: &str = "anchorage.align";

/// Measurements for one alignment pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverInput {
    /// Target bounding rect; zero-sized for a raw point.
    pub target: Rect,
    /// Popup bounding rect, measured while anchored `left: 0; top: 0`.
    pub popup: Rect,
    /// Popup computed width/height, for scale detection.
    pub popup_css_size: Size,
    /// Popup bounding rect while anchored `right: 0; bottom: 0`.
    pub popup_mirror: Rect,
    /// Placement after registry lookup and overrides.
    pub placement: Placement,
    pub regions: Regions,
    pub direction: Direction,
}

/// Outcome of an alignment pass.
///
/// All lengths are in the popup's CSS pixels: divide-by-scale has already
/// been applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignResult {
    /// False until a pass succeeds; consumers must not apply geometry before.
    pub ready: bool,
    pub offset_x: f64,
    pub offset_y: f64,
    /// Same position expressed for `right`-anchored styling.
    pub offset_right: f64,
    /// Same position expressed for `bottom`-anchored styling.
    pub offset_bottom: f64,
    /// Arrow anchor relative to the popup's top-left corner.
    pub arrow_x: f64,
    pub arrow_y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// The placement actually used, with flipped points.
    pub resolved_placement: Placement,
}

impl AlignResult {
    /// A not-yet-aligned result carrying the requested placement.
    pub fn pending(placement: Placement) -> Self {
        Self {
            ready: false,
            offset_x: 0.0,
            offset_y: 0.0,
            offset_right: 0.0,
            offset_bottom: 0.0,
            arrow_x: 0.0,
            arrow_y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            resolved_placement: placement,
        }
    }
}

impl Default for AlignResult {
    fn default() -> Self {
        Self::pending(Placement::default())
    }
}

/// Offset that moves the popup's anchor onto the target's anchor.
fn align_offset(
    popup: &Rect,
    target: &Rect,
    points: [AnchorCode; 2],
    nudge: (f64, f64),
) -> (f64, f64) {
    let popup_point = points[0].resolve(popup);
    let target_point = points[1].resolve(target);
    (
        target_point.x - popup_point.x + nudge.0,
        target_point.y - popup_point.y + nudge.1,
    )
}

/// Intersection-area objective for candidate offsets.
struct Scorer {
    popup: Rect,
    score: Region,
    recommend: Region,
    visible_first: bool,
}

impl Scorer {
    fn area(&self, offset: (f64, f64), region: &Region) -> f64 {
        region.overlap_area(&self.popup.translate(offset.0, offset.1))
    }

    /// Strictly better, or tied and (outside visible-first) not worse on
    /// the recommend region.
    fn prefers(&self, candidate: (f64, f64), current: (f64, f64)) -> bool {
        let candidate_area = self.area(candidate, &self.score);
        let current_area = self.area(current, &self.score);
        if candidate_area > current_area {
            return true;
        }
        candidate_area == current_area
            && (!self.visible_first
            || self.area(candidate, &self.recommend) >= self.area(current, &self.recommend))
    }
}

/// Working state of one pass.
struct Pass<'a> {
    popup: Rect,
    target: Rect,
    nudge: (f64, f64),
    points: [AnchorCode; 2],
    offset: (f64, f64),
    check: Region,
    scorer: Scorer,
    flips: &'a mut FlipCache,
}

impl Pass<'_> {
    /// Which sticky flip applies to the current points on `axis`, and
    /// whether the popup currently overflows on that side.
    fn flip_trigger(&self, axis: Axis) -> Option<(FlipFlags, bool)> {
        let placed = self.popup.translate(self.offset.0, self.offset.1);
        let popup_anchor = self.points[0];
        match axis {
            Axis::Vertical => match popup_anchor.vertical {
                VerticalAnchor::Top => Some((
                    FlipFlags::BOTTOM_TO_TOP,
                    placed.bottom() > self.check.bottom,
                )),
                VerticalAnchor::Bottom => {
                    Some((FlipFlags::TOP_TO_BOTTOM, placed.top() < self.check.top))
                }
                VerticalAnchor::Center => None,
            },
            Axis::Horizontal => match popup_anchor.horizontal {
                HorizontalAnchor::Left => Some((
                    FlipFlags::RIGHT_TO_LEFT,
                    placed.right() > self.check.right,
                )),
                HorizontalAnchor::Right => {
                    Some((FlipFlags::LEFT_TO_RIGHT, placed.left() < self.check.left))
                }
                HorizontalAnchor::Center => None,
            },
        }
    }

    fn try_flip(&mut self, axis: Axis) {
        let Some((flag, overflowing)) = self.flip_trigger(axis) else {
            return;
        };
        let sticky = self.flips.is_sticky(flag);
        if !overflowing && !sticky {
            return;
        }

        let mirrored = [self.points[0].reverse(axis), self.points[1].reverse(axis)];
        let nudge = match axis {
            Axis::Vertical => (self.nudge.0, -self.nudge.1),
            Axis::Horizontal => (-self.nudge.0, self.nudge.1),
        };
        let aligned = align_offset(&self.popup, &self.target, mirrored, nudge);
        let candidate = match axis {
            Axis::Vertical => (self.offset.0, aligned.1),
            Axis::Horizontal => (aligned.0, self.offset.1),
        };

        let taken = self.scorer.prefers(candidate, self.offset);
        self.flips.record(flag, taken);
        tracing::debug!(
            target: LOG_TARGET,
            ?axis,
            from = %self.points[0],
            to = %mirrored[0],
            overflowing,
            sticky,
            taken,
            "flip evaluated"
        );
        if taken {
            self.points = mirrored;
            self.offset = candidate;
            self.nudge = nudge;
        }
    }

    /// Slide inward by the overflow on each edge of `visible`, then pull
    /// back so the popup keeps `threshold` pixels of the target in reach.
    fn shift(&mut self, axis: Axis, visible: &Region, threshold: f64) {
        let placed = self.popup.translate(self.offset.0, self.offset.1);
        let (start, end, region_start, region_end, target_start, target_end) = match axis {
            Axis::Horizontal => (
                placed.left(),
                placed.right(),
                visible.left,
                visible.right,
                self.target.left(),
                self.target.right(),
            ),
            Axis::Vertical => (
                placed.top(),
                placed.bottom(),
                visible.top,
                visible.bottom,
                self.target.top(),
                self.target.bottom(),
            ),
        };

        let mut delta = 0.0;
        if start < region_start {
            delta += region_start - start;
            if target_end < region_start + threshold {
                delta += target_end - region_start - threshold;
            }
        }
        if end > region_end {
            delta -= end - region_end;
            if target_start > region_end - threshold {
                delta += target_start - region_end + threshold;
            }
        }

        if delta != 0.0 {
            tracing::debug!(target: LOG_TARGET, ?axis, delta, threshold, "shifted into view");
        }
        match axis {
            Axis::Horizontal => self.offset.0 += delta,
            Axis::Vertical => self.offset.1 += delta,
        }
    }
}

/// Midpoint of the overlap of `[a0, a1]` and `[b0, b1]`, relative to `a0`.
fn overlap_center(a0: f64, a1: f64, b0: f64, b1: f64) -> f64 {
    (a0.max(b0) + a1.min(b1)) / 2.0 - a0
}

/// Run one alignment pass.
///
/// Returns `None` when the popup has no measurable size; the caller keeps
/// its previous result in that case.
pub fn solve(input: &SolverInput, flips: &mut FlipCache) -> Option<AlignResult> {
    let popup = input.popup;
    let scale_x = measured_scale(popup.width, input.popup_css_size.width);
    let scale_y = measured_scale(popup.height, input.popup_css_size.height);

    if scale_x == 0.0 || scale_y == 0.0 || popup.is_empty() {
        tracing::debug!(
            target: LOG_TARGET,
            width = popup.width,
            height = popup.height,
            "align pass aborted: popup has no size"
        );
        return None;
    }

    let placement = input.placement.for_direction(input.direction);
    let nudge = resolve_offset_pair(popup.size(), placement.offset);
    let (target_dx, target_dy) = resolve_offset_pair(input.target.size(), placement.target_offset);
    let target = input.target.translate(-target_dx, -target_dy);

    let regions = input.regions;
    let (score, check) = match placement.html_region {
        HtmlRegion::Visible => (regions.visible, regions.visible),
        HtmlRegion::Scroll => (regions.scroll, regions.scroll),
        HtmlRegion::VisibleFirst => (regions.scroll, regions.visible),
    };

    let points = placement.anchor_points();
    let mut pass = Pass {
        popup,
        target,
        nudge,
        points,
        offset: align_offset(&popup, &target, points, nudge),
        check,
        scorer: Scorer {
            popup,
            score,
            recommend: regions.visible,
            visible_first: placement.html_region == HtmlRegion::VisibleFirst,
        },
        flips,
    };

    let overflow = placement.overflow;
    for axis in [Axis::Vertical, Axis::Horizontal] {
        if overflow.can_flip(axis) {
            pass.try_flip(axis);
        }
    }

    if let Some(threshold) = overflow.shift_threshold(Axis::Horizontal, target.width) {
        pass.shift(Axis::Horizontal, &regions.visible, threshold);
    }
    if let Some(threshold) = overflow.shift_threshold(Axis::Vertical, target.height) {
        pass.shift(Axis::Vertical, &regions.visible, threshold);
    }

    let (mut offset_x, mut offset_y) = pass.offset;
    let placed = popup.translate(offset_x, offset_y);
    let arrow_x = overlap_center(placed.left(), placed.right(), target.left(), target.right());
    let arrow_y = overlap_center(placed.top(), placed.bottom(), target.top(), target.bottom());

    let mirror = input.popup_mirror;
    let mut offset_right = mirror.right() - popup.x - (offset_x + popup.width);
    let mut offset_bottom = mirror.bottom() - popup.y - (offset_y + popup.height);

    if scale_x == 1.0 {
        offset_x = offset_x.round();
        offset_right = offset_right.round();
    }
    if scale_y == 1.0 {
        offset_y = offset_y.round();
        offset_bottom = offset_bottom.round();
    }

    let mut resolved_placement = placement;
    resolved_placement.points = Some(pass.points);

    // Outputs are in the popup's own CSS pixels, so a 0.5 scale doubles the
    // raw viewport offset.
    Some(AlignResult {
        ready: true,
        offset_x: offset_x / scale_x,
        offset_y: offset_y / scale_y,
        offset_right: offset_right / scale_x,
        offset_bottom: offset_bottom / scale_y,
        arrow_x: arrow_x / scale_x,
        arrow_y: arrow_y / scale_y,
        scale_x,
        scale_y,
        resolved_placement,
    })
}
