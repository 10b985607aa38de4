//! Signal detectors.
//!
//! Each detector judges one [`Signal`] from the session state and its
//! derived features. Detectors are pure: they never touch the tracker and
//! give the same answer for the same state and `now`.

pub mod interaction;
pub mod timing;

pub use interaction::{
    HighPasteCountDetector, HoneypotDetector, LowMouseMovementDetector, TabSwitchDetector,
};
pub use timing::{
    FastCheckboxDetector, FastFieldEntryDetector, FastSubmitDetector, RoboticTypingDetector,
};

use crate::config::TimingConfig;
use crate::features::SessionFeatures;
use crate::signals::Signal;
use crate::tracker::SessionTrackingState;
use chrono::{DateTime, Utc};

/// Everything a detector may look at.
#[derive(Debug, Clone)]
pub struct DetectionContext<'a> {
    /// Raw session events
    pub state: &'a SessionTrackingState,
    /// Features measured at `now`
    pub features: SessionFeatures,
    /// The instant being judged (normally the submission time)
    pub now: DateTime<Utc>,
}

impl<'a> DetectionContext<'a> {
    pub fn new(state: &'a SessionTrackingState, now: DateTime<Utc>) -> Self {
        Self {
            state,
            features: SessionFeatures::extract(state, now),
            now,
        }
    }
}

/// Trait for signal detectors.
pub trait Detector: Send + Sync {
    /// The signal this detector decides.
    fn signal(&self) -> Signal;

    /// Whether the signal fires for this session.
    fn detect(&self, ctx: &DetectionContext<'_>) -> bool;
}

/// One detector per signal, configured from `timing`.
pub fn default_detectors(timing: &TimingConfig) -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(HoneypotDetector),
        Box::new(FastSubmitDetector::new(timing.fast_submit_ms)),
        Box::new(HighPasteCountDetector::new(timing.high_paste_count)),
        Box::new(RoboticTypingDetector::new(
            timing.min_keystrokes_for_cadence,
            timing.robotic_stddev_ms,
        )),
        Box::new(LowMouseMovementDetector::new(timing.low_pointer_moves)),
        Box::new(FastCheckboxDetector::new(timing.fast_checkbox_ms)),
        Box::new(FastFieldEntryDetector::new(
            timing.min_field_samples,
            timing.fast_field_entry_ms,
        )),
        Box::new(TabSwitchDetector::new(timing.tab_switch_hidden_count)),
    ]
}
