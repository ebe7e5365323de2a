#![forbid(unsafe_code)]

//! Anchor codes: the nine named points on a rectangle.
//!
//! An [`AnchorCode`] is written as two characters, vertical first: `t`/`c`/`b`
//! followed by `l`/`c`/`r`. `"tl"` is the top-left corner, `"cc"` the center,
//! `"br"` the bottom-right corner.
//!
//! Parsing is lenient: any character outside the expected set on an axis
//! resolves to center on that axis, and a missing code is `"cc"`. Placement
//! records come from caller configuration, and a bad code should degrade the
//! alignment, not reject it.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::geometry::{Point, Rect};

/// One of the two alignment axes.
///
/// The order matches the character order of an anchor code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Top/bottom (first character).
    Vertical,
    /// Left/right (second character).
    Horizontal,
}

/// Position along the vertical axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VerticalAnchor {
    Top,
    #[default]
    Center,
    Bottom,
}

impl VerticalAnchor {
    fn from_char(c: char) -> Self {
        match c {
            't' => Self::Top,
            'b' => Self::Bottom,
            _ => Self::Center,
        }
    }

    const fn as_char(self) -> char {
        match self {
            Self::Top => 't',
            Self::Center => 'c',
            Self::Bottom => 'b',
        }
    }

    /// Swap top and bottom; center stays put.
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Center => Self::Center,
        }
    }
}

/// Position along the horizontal axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HorizontalAnchor {
    Left,
    #[default]
    Center,
    Right,
}

impl HorizontalAnchor {
    fn from_char(c: char) -> Self {
        match c {
            'l' => Self::Left,
            'r' => Self::Right,
            _ => Self::Center,
        }
    }

    const fn as_char(self) -> char {
        match self {
            Self::Left => 'l',
            Self::Center => 'c',
            Self::Right => 'r',
        }
    }

    /// Swap left and right; center stays put.
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Center => Self::Center,
        }
    }
}

/// A named point on a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AnchorCode {
    pub vertical: VerticalAnchor,
    pub horizontal: HorizontalAnchor,
}

impl AnchorCode {
    pub const TOP_LEFT: Self = Self::new(VerticalAnchor::Top, HorizontalAnchor::Left);
    pub const BOTTOM_RIGHT: Self = Self::new(VerticalAnchor::Bottom, HorizontalAnchor::Right);
    pub const CENTER: Self = Self::new(VerticalAnchor::Center, HorizontalAnchor::Center);

    pub const fn new(vertical: VerticalAnchor, horizontal: HorizontalAnchor) -> Self {
        Self {
            vertical,
            horizontal,
        }
    }

    /// Parse a two-character code, falling back to center per axis.
    pub fn parse(code: &str) -> Self {
        let mut chars = code.chars();
        let vertical = chars
            .next()
            .map(VerticalAnchor::from_char)
            .unwrap_or_default();
        let horizontal = chars
            .next()
            .map(HorizontalAnchor::from_char)
            .unwrap_or_default();
        Self::new(vertical, horizontal)
    }

    /// Mirror the code on one axis (`t↔b` or `l↔r`).
    #[must_use]
    pub const fn reverse(self, axis: Axis) -> Self {
        match axis {
            Axis::Vertical => Self::new(self.vertical.reverse(), self.horizontal),
            Axis::Horizontal => Self::new(self.vertical, self.horizontal.reverse()),
        }
    }

    /// Resolve the code against a rectangle.
    pub fn resolve(self, rect: &Rect) -> Point {
        let y = match self.vertical {
            VerticalAnchor::Top => rect.y,
            VerticalAnchor::Bottom => rect.y + rect.height,
            VerticalAnchor::Center => rect.y + rect.height / 2.0,
        };
        let x = match self.horizontal {
            HorizontalAnchor::Left => rect.x,
            HorizontalAnchor::Right => rect.x + rect.width,
            HorizontalAnchor::Center => rect.x + rect.width / 2.0,
        };
        Point::new(x, y)
    }
}

/// Point on `rect` named by `code`.
#[inline]
pub fn resolve_point(rect: &Rect, code: AnchorCode) -> Point {
    code.resolve(rect)
}

/// `code` with the given axis mirrored.
#[inline]
pub fn reverse_anchor(code: AnchorCode, axis: Axis) -> AnchorCode {
    code.reverse(axis)
}

impl fmt::Display for AnchorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.vertical.as_char(), self.horizontal.as_char())
    }
}

impl From<&str> for AnchorCode {
    fn from(code: &str) -> Self {
        Self::parse(code)
    }
}

impl Serialize for AnchorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AnchorCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}
