#![forbid(unsafe_code)]

//! Arrow pinning derived from a resolved placement.

use anchorage_core::{HorizontalAnchor, VerticalAnchor};

use crate::solver::AlignResult;

/// Where an arrow sits on one axis of the popup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArrowEdge {
    /// Offset from the popup's top/left edge.
    Start(f64),
    /// Flush with the popup's bottom/right edge.
    End,
}

/// Arrow position for both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowStyle {
    pub vertical: ArrowEdge,
    pub horizontal: ArrowEdge,
}

impl ArrowStyle {
    /// Pin the arrow for `result`.
    ///
    /// When the popup sits beside the target on an axis, the arrow hugs the
    /// popup edge facing the target. When the popup and target share an
    /// anchor on that axis (or the popup is centered), the arrow follows the
    /// solved overlap midpoint instead.
    pub fn from_result(result: &AlignResult) -> Self {
        let [popup, target] = result.resolved_placement.anchor_points();

        let vertical = match popup.vertical {
            VerticalAnchor::Top if popup.vertical != target.vertical => ArrowEdge::Start(0.0),
            VerticalAnchor::Bottom if popup.vertical != target.vertical => ArrowEdge::End,
            _ => ArrowEdge::Start(result.arrow_y),
        };
        let horizontal = match popup.horizontal {
            HorizontalAnchor::Left if popup.horizontal != target.horizontal => {
                ArrowEdge::Start(0.0)
            }
            HorizontalAnchor::Right if popup.horizontal != target.horizontal => ArrowEdge::End,
            _ => ArrowEdge::Start(result.arrow_x),
        };

        Self {
            vertical,
            horizontal,
        }
    }
}
