#![forbid(unsafe_code)]

//! Pixel-or-percentage offsets.
//!
//! Placement offsets and shift thresholds are written either as plain
//! numbers (pixels) or as strings ending in `%`, which are resolved against
//! the size of the box they apply to.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::geometry::Size;

/// An offset along one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OffsetValue {
    /// Absolute pixels.
    Px(f64),
    /// Percentage of the owning box's size on that axis.
    Percent(f64),
}

impl Default for OffsetValue {
    fn default() -> Self {
        Self::Px(0.0)
    }
}

impl OffsetValue {
    /// Resolve to pixels against `size`.
    #[inline]
    pub fn resolve(self, size: f64) -> f64 {
        match self {
            Self::Px(px) => px,
            Self::Percent(pct) => size * pct / 100.0,
        }
    }

    /// The same offset pointing the other way.
    #[must_use]
    pub fn negate(self) -> Self {
        match self {
            Self::Px(px) => Self::Px(-px),
            Self::Percent(pct) => Self::Percent(-pct),
        }
    }
}

/// Resolve `value` to pixels relative to `size`.
#[inline]
pub fn parse_offset(size: f64, value: OffsetValue) -> f64 {
    value.resolve(size)
}

/// Resolve an `[x, y]` offset pair against a box size.
#[inline]
pub fn resolve_offset_pair(size: Size, pair: [OffsetValue; 2]) -> (f64, f64) {
    (pair[0].resolve(size.width), pair[1].resolve(size.height))
}

/// Failure to read an offset string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid offset `{input}`: expected a number or a percentage like `50%`")]
pub struct ParseOffsetError {
    pub input: String,
}

impl FromStr for OffsetValue {
    type Err = ParseOffsetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let err = || ParseOffsetError {
            input: s.to_string(),
        };
        if let Some(pct) = trimmed.strip_suffix('%') {
            let value: f64 = pct.trim().parse().map_err(|_| err())?;
            return Ok(Self::Percent(value));
        }
        if trimmed.is_empty() {
            return Ok(Self::Px(0.0));
        }
        trimmed.parse().map(Self::Px).map_err(|_| err())
    }
}

impl From<f64> for OffsetValue {
    fn from(px: f64) -> Self {
        Self::Px(px)
    }
}

impl fmt::Display for OffsetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(px) => write!(f, "{px}"),
            Self::Percent(pct) => write!(f, "{pct}%"),
        }
    }
}

impl Serialize for OffsetValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Px(px) => serializer.serialize_f64(*px),
            Self::Percent(_) => serializer.collect_str(self),
        }
    }
}

struct OffsetVisitor;

impl Visitor<'_> for OffsetVisitor {
    type Value = OffsetValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a pixel number or a percentage string")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(OffsetValue::Px(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(OffsetValue::Px(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(OffsetValue::Px(v as f64))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for OffsetValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(OffsetVisitor)
    }
}
