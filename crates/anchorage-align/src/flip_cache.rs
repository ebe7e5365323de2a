#![forbid(unsafe_code)]

//! Sticky flip memory for one open session of a popup.
//!
//! Once a pass flips the popup across the target, the next pass evaluates
//! the mirrored side even if the preferred side would now seem to have room.
//! The preferred side only wins back when the mirrored side scores strictly
//! worse. This stops a popup sitting on a boundary from flipping every pass
//! when its own measured size depends on the side it is drawn on.
//!
//! The cache is plain state owned by the caller's session; the solver reads
//! and writes it through `&mut`. Reset it when the popup closes or the
//! placement name is switched.

use bitflags::bitflags;

bitflags! {
    /// Axis-direction flips that held on the previous pass.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FlipFlags: u8 {
        /// Preferred below, flipped above.
        const BOTTOM_TO_TOP = 0b0001;
        /// Preferred above, flipped below.
        const TOP_TO_BOTTOM = 0b0010;
        /// Preferred right, flipped left.
        const RIGHT_TO_LEFT = 0b0100;
        /// Preferred left, flipped right.
        const LEFT_TO_RIGHT = 0b1000;
    }
}

/// Per-session flip memo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlipCache {
    flags: FlipFlags,
}

impl FlipCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `flip` was taken on the last pass that evaluated it.
    #[inline]
    pub fn is_sticky(&self, flip: FlipFlags) -> bool {
        self.flags.contains(flip)
    }

    /// Record whether `flip` was taken.
    #[inline]
    pub fn record(&mut self, flip: FlipFlags, taken: bool) {
        self.flags.set(flip, taken);
    }

    /// All currently sticky flips.
    #[inline]
    pub fn flags(&self) -> FlipFlags {
        self.flags
    }

    /// Forget every flip.
    pub fn clear(&mut self) {
        self.flags = FlipFlags::empty();
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}
