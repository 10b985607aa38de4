//! Detectors over event timing:
//! - Time to submit
//! - Keystroke cadence
//! - Time to the consent checkbox
//! - Field-to-field speed

use super::{DetectionContext, Detector};
use crate::signals::Signal;

/// Fires when the form is submitted within `min_ms` of the start.
#[derive(Debug, Clone, Copy)]
pub struct FastSubmitDetector {
    min_ms: i64,
}

impl FastSubmitDetector {
    pub fn new(min_ms: i64) -> Self {
        Self { min_ms }
    }
}

impl Detector for FastSubmitDetector {
    fn signal(&self) -> Signal {
        Signal::FastSubmit
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> bool {
        ctx.features.elapsed_ms < self.min_ms
    }
}

/// Fires on a long run of keystrokes with near-constant spacing.
///
/// Human cadence jitters; programmatic key dispatch does not.
#[derive(Debug, Clone, Copy)]
pub struct RoboticTypingDetector {
    /// Keystroke count must exceed this
    min_keystrokes: usize,
    /// Standard deviation (ms) below which cadence is robotic
    max_std_dev_ms: f64,
}

impl RoboticTypingDetector {
    pub fn new(min_keystrokes: usize, max_std_dev_ms: f64) -> Self {
        Self {
            min_keystrokes,
            max_std_dev_ms,
        }
    }
}

impl Detector for RoboticTypingDetector {
    fn signal(&self) -> Signal {
        Signal::RoboticTyping
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> bool {
        // fewer than two keystrokes leaves no delta to judge
        if ctx.features.keystroke_deltas.is_empty() {
            return false;
        }
        ctx.state.keystroke_count() > self.min_keystrokes
            && ctx.features.keystroke_std_dev < self.max_std_dev_ms
    }
}

/// Fires when the checkbox was clicked within `min_ms` of the start.
///
/// Sessions that never click stay clear of this signal.
#[derive(Debug, Clone, Copy)]
pub struct FastCheckboxDetector {
    min_ms: i64,
}

impl FastCheckboxDetector {
    pub fn new(min_ms: i64) -> Self {
        Self { min_ms }
    }
}

impl Detector for FastCheckboxDetector {
    fn signal(&self) -> Signal {
        Signal::FastCheckbox
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> bool {
        ctx.features
            .time_to_checkbox_ms
            .is_some_and(|ms| ms < self.min_ms)
    }
}

/// Fires when fields are entered faster than anyone reads them.
#[derive(Debug, Clone, Copy)]
pub struct FastFieldEntryDetector {
    min_samples: usize,
    max_avg_ms: f64,
}

impl FastFieldEntryDetector {
    pub fn new(min_samples: usize, max_avg_ms: f64) -> Self {
        Self {
            min_samples,
            max_avg_ms,
        }
    }
}

impl Detector for FastFieldEntryDetector {
    fn signal(&self) -> Signal {
        Signal::FastFieldEntry
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> bool {
        ctx.features.inter_field_timings.len() >= self.min_samples
            && ctx.features.avg_inter_field_ms < self.max_avg_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::{FormField, SessionTrackingState};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn at(ms: i64) -> DateTime<Utc> {
        t0() + Duration::milliseconds(ms)
    }

    fn detect_at(detector: &dyn Detector, state: &SessionTrackingState, now_ms: i64) -> bool {
        let ctx = DetectionContext::new(state, at(now_ms));
        detector.detect(&ctx)
    }

    fn typed(offsets: &[i64]) -> SessionTrackingState {
        let mut state = SessionTrackingState::new(t0());
        state.key_press_timestamps = offsets.iter().map(|ms| at(*ms)).collect();
        state
    }

    #[test]
    fn test_fast_submit_boundary() {
        let detector = FastSubmitDetector::new(3_000);
        let state = SessionTrackingState::new(t0());

        assert!(detect_at(&detector, &state, 2_999));
        assert!(!detect_at(&detector, &state, 3_000));
        assert!(!detect_at(&detector, &state, 10_000));
    }

    #[test]
    fn test_uniform_typing_is_robotic() {
        let detector = RoboticTypingDetector::new(10, 15.0);
        let offsets: Vec<i64> = (0..=10).map(|i| i * 10).collect();

        assert!(detect_at(&detector, &typed(&offsets), 10_000));
    }

    #[test]
    fn test_irregular_typing_is_not_robotic() {
        let detector = RoboticTypingDetector::new(10, 15.0);
        let deltas = [5, 200, 15, 600, 8, 450, 12, 700, 20, 300];
        let mut offsets = vec![0i64];
        for d in deltas {
            offsets.push(offsets.last().unwrap() + d);
        }
        assert_eq!(offsets.len(), 11);

        assert!(!detect_at(&detector, &typed(&offsets), 10_000));
    }

    #[test]
    fn test_typing_needs_more_than_ten_keystrokes() {
        let detector = RoboticTypingDetector::new(10, 15.0);
        let offsets: Vec<i64> = (0..10).map(|i| i * 10).collect();

        assert!(!detect_at(&detector, &typed(&offsets), 10_000));
    }

    #[test]
    fn test_single_keystroke_is_not_robotic() {
        let detector = RoboticTypingDetector::new(0, 15.0);
        assert!(!detect_at(&detector, &typed(&[0]), 10_000));
    }

    #[test]
    fn test_fast_checkbox() {
        let detector = FastCheckboxDetector::new(500);
        let mut state = SessionTrackingState::new(t0());
        assert!(!detect_at(&detector, &state, 10_000));

        state.checkbox_click_time = Some(at(499));
        assert!(detect_at(&detector, &state, 10_000));

        state.checkbox_click_time = Some(at(500));
        assert!(!detect_at(&detector, &state, 10_000));
    }

    fn focused(offsets: &[(FormField, i64)]) -> SessionTrackingState {
        let mut state = SessionTrackingState::new(t0());
        for (field, ms) in offsets {
            state.field_first_focus.insert(*field, at(*ms));
            state.field_focus_order.push(*field);
        }
        state
    }

    #[test]
    fn test_fast_field_entry_needs_two_samples() {
        let detector = FastFieldEntryDetector::new(2, 100.0);

        let one_gap = focused(&[(FormField::Name, 1_000), (FormField::Email, 1_010)]);
        assert!(!detect_at(&detector, &one_gap, 10_000));

        let two_gaps = focused(&[
            (FormField::Name, 1_000),
            (FormField::Email, 1_010),
            (FormField::Subject, 1_030),
        ]);
        assert!(detect_at(&detector, &two_gaps, 10_000));
    }

    #[test]
    fn test_field_entry_uses_configured_sample_count() {
        let detector = FastFieldEntryDetector::new(3, 100.0);
        let two_gaps = focused(&[
            (FormField::Name, 1_000),
            (FormField::Email, 1_010),
            (FormField::Subject, 1_030),
        ]);
        assert!(!detect_at(&detector, &two_gaps, 10_000));
    }

    #[test]
    fn test_human_field_entry() {
        let detector = FastFieldEntryDetector::new(2, 100.0);
        let state = focused(&[
            (FormField::Name, 1_000),
            (FormField::Email, 4_000),
            (FormField::Content, 9_000),
        ]);
        assert!(!detect_at(&detector, &state, 10_000));
    }
}
