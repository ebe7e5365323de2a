#![forbid(unsafe_code)]

//! Core: geometry, anchor codes and offsets for popup alignment.
//!
//! # Role in anchorage
//! `anchorage-core` holds the value types every alignment pass is built
//! from. It has no notion of a document tree or of measurement; the solver
//! in `anchorage-align` consumes these types.
//!
//! # Primary responsibilities
//! - **Geometry**: [`Rect`], [`Region`], [`Point`], [`Size`], [`Sides`].
//! - **Anchors**: the nine [`AnchorCode`]s, point resolution and mirroring.
//! - **Offsets**: pixel or percentage [`OffsetValue`]s.

pub mod anchor;
pub mod geometry;
pub mod offset;

pub use anchor::{
    AnchorCode, Axis, HorizontalAnchor, VerticalAnchor, resolve_point, reverse_anchor,
};
pub use geometry::{Point, Rect, Region, Sides, Size};
pub use offset::{OffsetValue, ParseOffsetError, parse_offset, resolve_offset_pair};
