//! Layer membership masks.
//!
//! An object is drawn by a camera only if both share at least one layer. Selective
//! bloom uses a dedicated layer to tell glowing objects apart from the rest.

/// Layer that marks objects as glowing for [`SelectiveBloom`](crate::postprocessing::selective_bloom::SelectiveBloom).
pub const BLOOM_LAYER: u32 = 1;

/// 32 layers packed in a mask. Layer 0 is enabled by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Layers {
    pub mask: u32,
}

impl Layers {
    pub const fn new() -> Self {
        Self { mask: 1 }
    }

    pub const fn none() -> Self {
        Self { mask: 0 }
    }

    pub const fn all() -> Self {
        Self { mask: u32::MAX }
    }

    /// Membership of exactly `layer`.
    pub fn set(&mut self, layer: u32) {
        self.mask = bit(layer);
    }

    pub fn enable(&mut self, layer: u32) {
        self.mask |= bit(layer);
    }

    pub fn disable(&mut self, layer: u32) {
        self.mask &= !bit(layer);
    }

    pub fn toggle(&mut self, layer: u32) {
        self.mask ^= bit(layer);
    }

    /// `true` if the layers share at least one enabled layer.
    pub fn test(&self, other: &Layers) -> bool {
        self.mask & other.mask != 0
    }

    pub fn is_enabled(&self, layer: u32) -> bool {
        self.mask & bit(layer) != 0
    }

    pub fn with(mut self, layer: u32) -> Self {
        self.enable(layer);
        self
    }
}

impl Default for Layers {
    fn default() -> Self {
        Self::new()
    }
}

fn bit(layer: u32) -> u32 {
    debug_assert!(layer < 32, "only 32 layers are supported");
    1u32.checked_shl(layer).unwrap_or(0)
}
