//! Detectors over counted interactions:
//! - Honeypot contents
//! - Paste volume
//! - Pointer activity
//! - Tab visibility

use super::{DetectionContext, Detector};
use crate::signals::Signal;

/// Fires when the decoy field holds anything at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoneypotDetector;

impl Detector for HoneypotDetector {
    fn signal(&self) -> Signal {
        Signal::HoneypotTrap
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> bool {
        !ctx.state.honeypot_value.is_empty()
    }
}

/// Fires when total pastes reach the threshold.
#[derive(Debug, Clone, Copy)]
pub struct HighPasteCountDetector {
    threshold: u32,
}

impl HighPasteCountDetector {
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }
}

impl Detector for HighPasteCountDetector {
    fn signal(&self) -> Signal {
        Signal::HighPasteCount
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> bool {
        ctx.state.total_pastes() >= self.threshold
    }
}

/// Fires on fewer pointer moves than the minimum.
#[derive(Debug, Clone, Copy)]
pub struct LowMouseMovementDetector {
    min_moves: u32,
}

impl LowMouseMovementDetector {
    pub fn new(min_moves: u32) -> Self {
        Self { min_moves }
    }
}

impl Detector for LowMouseMovementDetector {
    fn signal(&self) -> Signal {
        Signal::LowMouseMovement
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> bool {
        ctx.state.pointer_move_count < self.min_moves
    }
}

/// Fires once the page has gone hidden `min_hidden` times.
///
/// With the default of one transition, any tab switch during the fill is
/// flagged. Hosts without a visibility API never report one, so the
/// signal stays off. A `min_hidden` of zero is rejected by config
/// validation.
#[derive(Debug, Clone, Copy)]
pub struct TabSwitchDetector {
    min_hidden: u32,
}

impl TabSwitchDetector {
    pub fn new(min_hidden: u32) -> Self {
        Self { min_hidden }
    }
}

impl Detector for TabSwitchDetector {
    fn signal(&self) -> Signal {
        Signal::TabSwitching
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> bool {
        ctx.state.hidden_transition_count >= self.min_hidden
    }
}
