#![forbid(unsafe_code)]

//! Declarative placement records.
//!
//! A [`Placement`] says which anchor on the popup meets which anchor on the
//! target, how far to nudge the result, and what to do when the popup does
//! not fit: flip to the opposite side (`adjust*`), slide along the edge
//! (`shift*`), or both.

use serde::{Deserialize, Deserializer, Serialize};

use anchorage_core::{AnchorCode, Axis, OffsetValue};

/// Boolean-or-number overflow switch.
///
/// For flipping, a number enables the axis when it is non-negative. For
/// shifting, `true` means a zero threshold and a number is the threshold
/// itself; percentages resolve against the target's size on that axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OverflowToggle {
    Flag(bool),
    Amount(OffsetValue),
}

impl OverflowToggle {
    /// Whether this toggle turns flipping on.
    pub fn adjust_enabled(self) -> bool {
        match self {
            Self::Flag(flag) => flag,
            Self::Amount(OffsetValue::Px(v) | OffsetValue::Percent(v)) => v >= 0.0,
        }
    }

    /// Shift threshold in pixels, `None` when shifting is off.
    pub fn shift_threshold(self, target_size: f64) -> Option<f64> {
        match self {
            Self::Flag(true) => Some(0.0),
            Self::Flag(false) => None,
            Self::Amount(amount) => Some(amount.resolve(target_size)),
        }
    }
}

impl From<bool> for OverflowToggle {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}

impl From<f64> for OverflowToggle {
    fn from(px: f64) -> Self {
        Self::Amount(OffsetValue::Px(px))
    }
}

/// Per-axis overflow handling.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverflowPolicy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjust_x: Option<OverflowToggle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjust_y: Option<OverflowToggle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shift_x: Option<OverflowToggle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shift_y: Option<OverflowToggle>,
}

impl OverflowPolicy {
    #[must_use]
    pub fn adjust_x(mut self, toggle: impl Into<OverflowToggle>) -> Self {
        self.adjust_x = Some(toggle.into());
        self
    }

    #[must_use]
    pub fn adjust_y(mut self, toggle: impl Into<OverflowToggle>) -> Self {
        self.adjust_y = Some(toggle.into());
        self
    }

    #[must_use]
    pub fn shift_x(mut self, toggle: impl Into<OverflowToggle>) -> Self {
        self.shift_x = Some(toggle.into());
        self
    }

    #[must_use]
    pub fn shift_y(mut self, toggle: impl Into<OverflowToggle>) -> Self {
        self.shift_y = Some(toggle.into());
        self
    }

    /// Whether flipping is enabled on `axis`.
    pub fn can_flip(&self, axis: Axis) -> bool {
        let toggle = match axis {
            Axis::Vertical => self.adjust_y,
            Axis::Horizontal => self.adjust_x,
        };
        toggle.is_some_and(OverflowToggle::adjust_enabled)
    }

    /// Shift threshold on `axis`, `None` when shifting is off.
    pub fn shift_threshold(&self, axis: Axis, target_size: f64) -> Option<f64> {
        let toggle = match axis {
            Axis::Vertical => self.shift_y,
            Axis::Horizontal => self.shift_x,
        };
        toggle.and_then(|t| t.shift_threshold(target_size))
    }
}

/// Which boundary constrains flipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HtmlRegion {
    /// The currently visible region.
    #[default]
    Visible,
    /// Everything reachable by scrolling.
    Scroll,
    /// Trigger flips on the visible region, score them on the scroll region,
    /// and break ties in favour of the visible region.
    VisibleFirst,
}

impl HtmlRegion {
    /// Parse a region name; anything unrecognized is `Visible`.
    pub fn parse(name: &str) -> Self {
        match name {
            "scroll" => Self::Scroll,
            "visibleFirst" => Self::VisibleFirst,
            _ => Self::Visible,
        }
    }
}

impl<'de> Deserialize<'de> for HtmlRegion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Text direction of the popup's context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

/// A full placement rule.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Placement {
    /// `[popup anchor, target anchor]`; missing means center/center.
    pub points: Option<[AnchorCode; 2]>,
    /// Applied to the popup after alignment.
    pub offset: [OffsetValue; 2],
    /// Applied to the target before alignment (subtracted).
    pub target_offset: [OffsetValue; 2],
    pub overflow: OverflowPolicy,
    pub html_region: HtmlRegion,
}

impl Placement {
    /// Align `popup` on the popup with `target` on the target.
    pub fn new(popup: impl Into<AnchorCode>, target: impl Into<AnchorCode>) -> Self {
        Self {
            points: Some([popup.into(), target.into()]),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn offset(mut self, x: impl Into<OffsetValue>, y: impl Into<OffsetValue>) -> Self {
        self.offset = [x.into(), y.into()];
        self
    }

    #[must_use]
    pub fn target_offset(mut self, x: impl Into<OffsetValue>, y: impl Into<OffsetValue>) -> Self {
        self.target_offset = [x.into(), y.into()];
        self
    }

    #[must_use]
    pub fn overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    #[must_use]
    pub fn html_region(mut self, region: HtmlRegion) -> Self {
        self.html_region = region;
        self
    }

    /// `[popup, target]` anchors with the center fallback applied.
    pub fn anchor_points(&self) -> [AnchorCode; 2] {
        self.points.unwrap_or([AnchorCode::CENTER; 2])
    }

    /// The right-to-left reading of this placement: horizontal anchors
    /// swapped and horizontal offsets negated.
    #[must_use]
    pub fn mirrored_horizontally(&self) -> Self {
        let mut mirrored = self.clone();
        if let Some([popup, target]) = self.points {
            mirrored.points = Some([
                popup.reverse(Axis::Horizontal),
                target.reverse(Axis::Horizontal),
            ]);
        }
        mirrored.offset[0] = self.offset[0].negate();
        mirrored.target_offset[0] = self.target_offset[0].negate();
        mirrored
    }

    /// This placement as seen under `direction`.
    #[must_use]
    pub fn for_direction(&self, direction: Direction) -> Self {
        match direction {
            Direction::Ltr => self.clone(),
            Direction::Rtl => self.mirrored_horizontally(),
        }
    }
}

/// Caller-supplied partial placement, merged field-by-field over a
/// registry entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlacementOverride {
    pub points: Option<[AnchorCode; 2]>,
    pub offset: Option<[OffsetValue; 2]>,
    pub target_offset: Option<[OffsetValue; 2]>,
    pub overflow: Option<OverflowPolicy>,
    pub html_region: Option<HtmlRegion>,
}

impl PlacementOverride {
    /// Overlay the set fields onto `base`. Nested records such as
    /// `overflow` replace the base value wholesale.
    pub fn apply(&self, mut base: Placement) -> Placement {
        if let Some(points) = self.points {
            base.points = Some(points);
        }
        if let Some(offset) = self.offset {
            base.offset = offset;
        }
        if let Some(target_offset) = self.target_offset {
            base.target_offset = target_offset;
        }
        if let Some(overflow) = self.overflow {
            base.overflow = overflow;
        }
        if let Some(region) = self.html_region {
            base.html_region = region;
        }
        base
    }
}
