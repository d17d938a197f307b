//! Environment - Shared context every component reads
//!
//! Holds the values several components need but none of them owns:
//! - `header_height` - last measured height of the fixed header
//! - `reduced_motion` - live reduced-motion preference
//! - `viewport` - last known viewport size
//! - pointer capability and animator availability (resolved once)
//!
//! Reduced motion is read once at mount for the particle field and the
//! pointer glow. Later preference changes update the signal but do not
//! start or stop effects that were already decided.

use bitflags::bitflags;
use spark_signals::{signal, Signal};

use crate::types::Viewport;

bitflags! {
    /// Input capabilities of the primary pointer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PointerCapability: u8 {
        /// The pointer can hover.
        const HOVER = 1 << 0;
        /// The pointer is precise (mouse, trackpad).
        const FINE = 1 << 1;
    }
}

impl PointerCapability {
    /// Mouse-following effects need a precise pointer that can hover.
    pub fn supports_follow(self) -> bool {
        self.contains(Self::HOVER | Self::FINE)
    }
}

/// Facts about the page resolved once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Capabilities {
    pub pointer: PointerCapability,
    pub reduced_motion: bool,
    /// An external tween library is present.
    pub animator: bool,
}

/// Shared, reactive environment context.
#[derive(Clone)]
pub struct Environment {
    pub header_height: Signal<f64>,
    pub reduced_motion: Signal<bool>,
    pub viewport: Signal<Viewport>,
    pointer: PointerCapability,
    reduced_motion_at_mount: bool,
}

impl Environment {
    pub fn new(capabilities: Capabilities, viewport: Viewport) -> Self {
        Self {
            header_height: signal(0.0),
            reduced_motion: signal(capabilities.reduced_motion),
            viewport: signal(viewport),
            pointer: capabilities.pointer,
            reduced_motion_at_mount: capabilities.reduced_motion,
        }
    }

    pub fn pointer(&self) -> PointerCapability {
        self.pointer
    }

    /// Preference as it was when the engine mounted.
    pub fn reduced_motion_at_mount(&self) -> bool {
        self.reduced_motion_at_mount
    }

    /// Record a live preference change. Already-decided effects keep running
    /// (or stay off).
    pub fn set_reduced_motion(&self, reduced: bool) {
        if self.reduced_motion.get() != reduced {
            tracing::debug!(reduced, "reduced-motion preference changed");
            self.reduced_motion.set(reduced);
        }
    }
}
