#![forbid(unsafe_code)]

//! Named placement presets.
//!
//! [`PlacementRegistry`] is plain data: a name-to-[`Placement`] table with
//! insertion order preserved, so reverse lookups from a resolved anchor pair
//! back to a name are deterministic.
//!
//! The built-in table follows the usual tooltip conventions: a 4px gap
//! towards the target, flipping across the target's main axis, and
//! shifting along the other one.

use std::collections::BTreeMap;
use std::path::Path;

use rustc_hash::FxHashMap;

use anchorage_core::AnchorCode;

use crate::error::{ConfigError, Result};
use crate::placement::{OverflowPolicy, Placement, PlacementOverride};

const GAP: f64 = 4.0;

/// Name-indexed placement table.
#[derive(Debug, Clone, Default)]
pub struct PlacementRegistry {
    entries: Vec<(String, Placement)>,
    index: FxHashMap<String, usize>,
}

impl PlacementRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The twelve built-in presets.
    #[must_use]
    pub fn builtin() -> Self {
        let top_bottom = OverflowPolicy::default().shift_x(64.0).adjust_y(1.0);
        let left_right = OverflowPolicy::default().adjust_x(1.0).shift_y(true);

        let vertical = |popup: &str, target: &str, dy: f64| {
            Placement::new(popup, target)
                .offset(0.0, dy)
                .overflow(top_bottom)
        };
        let horizontal = |popup: &str, target: &str, dx: f64| {
            Placement::new(popup, target)
                .offset(dx, 0.0)
                .overflow(left_right)
        };

        let mut registry = Self::new();
        registry.insert("left", horizontal("cr", "cl", -GAP));
        registry.insert("right", horizontal("cl", "cr", GAP));
        registry.insert("top", vertical("bc", "tc", -GAP));
        registry.insert("bottom", vertical("tc", "bc", GAP));
        registry.insert("topLeft", vertical("bl", "tl", -GAP));
        registry.insert("leftTop", horizontal("tr", "tl", -GAP));
        registry.insert("topRight", vertical("br", "tr", -GAP));
        registry.insert("rightTop", horizontal("tl", "tr", GAP));
        registry.insert("bottomRight", vertical("tr", "br", GAP));
        registry.insert("rightBottom", horizontal("bl", "br", GAP));
        registry.insert("bottomLeft", vertical("tl", "bl", GAP));
        registry.insert("leftBottom", horizontal("br", "bl", -GAP));
        registry
    }

    /// Parse a JSON object of `name -> placement`.
    ///
    /// Entries are registered in name order.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, Placement> = serde_json::from_str(json)?;
        let mut registry = Self::new();
        for (name, placement) in raw {
            if name.is_empty() {
                return Err(ConfigError::EmptyName);
            }
            registry.insert(name, placement);
        }
        Ok(registry)
    }

    /// Read and parse a JSON registry file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Serialize back to a JSON object.
    pub fn to_json_string(&self) -> Result<String> {
        let map: BTreeMap<&str, &Placement> = self
            .entries
            .iter()
            .map(|(name, placement)| (name.as_str(), placement))
            .collect();
        Ok(serde_json::to_string_pretty(&map)?)
    }

    /// Add or replace an entry. Replacing keeps the original position.
    pub fn insert(&mut self, name: impl Into<String>, placement: Placement) {
        let name = name.into();
        match self.index.get(&name) {
            Some(&slot) => self.entries[slot].1 = placement,
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, placement));
            }
        }
    }

    /// Layer every entry of `other` over this registry.
    pub fn extend(&mut self, other: PlacementRegistry) {
        for (name, placement) in other.entries {
            self.insert(name, placement);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Placement> {
        self.index.get(name).map(|&slot| &self.entries[slot].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// The placement to align with: the named entry (or an empty placement
    /// when unknown) with `overrides` laid on top.
    pub fn resolve(&self, name: &str, overrides: Option<&PlacementOverride>) -> Placement {
        let base = self.get(name).cloned().unwrap_or_default();
        match overrides {
            Some(overrides) => overrides.apply(base),
            None => base,
        }
    }

    /// First entry whose anchor pair equals `points`.
    ///
    /// In point mode only the popup anchor is compared; the target side is
    /// a bare point.
    pub fn match_points(&self, points: &[AnchorCode; 2], point_mode: bool) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, placement)| {
                placement
                    .points
                    .is_some_and(|candidate| points_eq(&candidate, points, point_mode))
            })
            .map(|(name, _)| name.as_str())
    }

    /// `"{prefix}-placement-{name}"` for the entry matching `resolved`.
    pub fn popup_class_name(
        &self,
        prefix: &str,
        resolved: &Placement,
        point_mode: bool,
    ) -> Option<String> {
        let points = resolved.points?;
        self.match_points(&points, point_mode)
            .map(|name| format!("{prefix}-placement-{name}"))
    }
}

fn points_eq(a: &[AnchorCode; 2], b: &[AnchorCode; 2], point_mode: bool) -> bool {
    if point_mode {
        a[0] == b[0]
    } else {
        a == b
    }
}
