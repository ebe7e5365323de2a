#![forbid(unsafe_code)]

//! Popup alignment: place a floating element next to a target.
//!
//! # Role in anchorage
//! `anchorage-align` turns a target, a popup and a named placement into the
//! popup's offset, arrow position and effective placement. It builds on the
//! value types of `anchorage-core`.
//!
//! # Primary responsibilities
//! - **Measurement**: the [`LayoutHost`] seam and an in-memory
//!   [`LayoutSnapshot`] implementation.
//! - **Regions**: visible and scrollable areas clipped by ancestor scrollers.
//! - **Solving**: [`solve`] aligns, flips, shifts and rescales one pass.
//! - **Sessions**: [`Aligner`] keeps the flip cache, coalesces requests and
//!   tracks scroll subscriptions while a popup is open.
//! - **Configuration**: [`PlacementRegistry`] with built-in presets and JSON
//!   loading.
//!
//! # How it fits in the system
//! The host measures; the aligner decides; the host then applies the
//! [`AlignResult`] as styles. Nothing here touches a real document.

pub mod aligner;
pub mod arrow;
pub mod error;
pub mod flip_cache;
pub mod host;
pub mod placement;
pub mod region;
pub mod registry;
pub mod scheduler;
pub mod snapshot;
pub mod solver;

pub use aligner::{AlignRequest, AlignTarget, Aligner};
pub use arrow::{ArrowEdge, ArrowStyle};
pub use error::{ConfigError, Result};
pub use flip_cache::{FlipCache, FlipFlags};
pub use host::{
    ContainerMetrics, ElementMetrics, LayoutHost, NodeId, OverflowStyle, ViewportMetrics,
    measure_mirrored,
};
pub use placement::{
    Direction, HtmlRegion, OverflowPolicy, OverflowToggle, Placement, PlacementOverride,
};
pub use region::{Regions, ScrollerCache, collect_regions, collect_scrollers, collect_shared_scrollers};
pub use registry::PlacementRegistry;
pub use scheduler::{AlignScheduler, AlignTicket, AlignTrigger, EventSource};
pub use snapshot::LayoutSnapshot;
pub use solver::{AlignResult, SolverInput, solve};
