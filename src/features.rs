//! Numeric features derived from a session's raw events.
//!
//! Detectors judge these values and the evidence report prints them, so
//! both always agree on what was measured.

use crate::tracker::{FormField, SessionTrackingState};
use chrono::{DateTime, Duration, Utc};

/// Derived measurements for one session at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionFeatures {
    /// Milliseconds from session start to `now`
    pub elapsed_ms: i64,
    /// Gaps between consecutive keydowns (ms)
    pub keystroke_deltas: Vec<f64>,
    /// Population standard deviation of `keystroke_deltas`, 0 when undefined
    pub keystroke_std_dev: f64,
    /// Gaps between first focuses of consecutive fields (ms)
    pub inter_field_timings: Vec<f64>,
    /// Mean of `inter_field_timings`, 0 when empty
    pub avg_inter_field_ms: f64,
    /// Milliseconds from session start to the first checkbox click
    pub time_to_checkbox_ms: Option<i64>,
}

impl SessionFeatures {
    /// Measure `state` as of `now`.
    pub fn extract(state: &SessionTrackingState, now: DateTime<Utc>) -> Self {
        let keystroke_deltas = keystroke_deltas(&state.key_press_timestamps);
        let inter_field_timings = inter_field_timings(state);

        Self {
            elapsed_ms: (now - state.start_time).num_milliseconds(),
            keystroke_std_dev: population_std_dev(&keystroke_deltas).unwrap_or(0.0),
            avg_inter_field_ms: mean(&inter_field_timings).unwrap_or(0.0),
            time_to_checkbox_ms: state
                .checkbox_click_time
                .map(|clicked| (clicked - state.start_time).num_milliseconds()),
            keystroke_deltas,
            inter_field_timings,
        }
    }
}

/// Duration as fractional milliseconds.
pub fn as_millis_f64(d: Duration) -> f64 {
    d.num_microseconds()
        .map(|us| us as f64 / 1_000.0)
        .unwrap_or_else(|| d.num_milliseconds() as f64)
}

/// `timestamps[i] - timestamps[i - 1]` for every `i >= 1`.
pub fn keystroke_deltas(timestamps: &[DateTime<Utc>]) -> Vec<f64> {
    timestamps
        .windows(2)
        .map(|pair| as_millis_f64(pair[1] - pair[0]))
        .collect()
}

/// Gaps between first focuses, walking the focus order pairwise.
///
/// A pair contributes only when both fields have a recorded timestamp.
pub fn inter_field_timings(state: &SessionTrackingState) -> Vec<f64> {
    let focus_time = |field: &FormField| state.field_first_focus.get(field).copied();

    state
        .field_focus_order
        .windows(2)
        .filter_map(|pair| {
            let from = focus_time(&pair[0])?;
            let to = focus_time(&pair[1])?;
            Some(as_millis_f64(to - from))
        })
        .collect()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Square root of the mean squared deviation from the mean.
pub fn population_std_dev(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn at(ms: i64) -> DateTime<Utc> {
        t0() + Duration::milliseconds(ms)
    }

    #[test]
    fn test_uniform_deltas_have_zero_std_dev() {
        let stamps: Vec<_> = (0..=10).map(|i| at(i * 10)).collect();
        let deltas = keystroke_deltas(&stamps);

        assert_eq!(deltas.len(), 10);
        assert!(deltas.iter().all(|d| (*d - 10.0).abs() < f64::EPSILON));
        assert_eq!(population_std_dev(&deltas), Some(0.0));
    }

    #[test]
    fn test_population_std_dev() {
        // mean 5, squared deviations sum to 32 over 8 values
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let sd = population_std_dev(&values).unwrap();
        assert!((sd - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_statistics() {
        assert_eq!(keystroke_deltas(&[]), Vec::<f64>::new());
        assert_eq!(keystroke_deltas(&[t0()]), Vec::<f64>::new());
        assert_eq!(mean(&[]), None);
        assert_eq!(population_std_dev(&[]), None);
    }

    #[test]
    fn test_sub_millisecond_precision() {
        let d = Duration::microseconds(1_500);
        assert!((as_millis_f64(d) - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_inter_field_timings_follow_focus_order() {
        let mut state = SessionTrackingState::new(t0());
        let focuses = [
            (FormField::Email, 1_000),
            (FormField::Name, 1_400),
            (FormField::Content, 3_400),
        ];
        for (field, ms) in focuses {
            state.field_first_focus.insert(field, at(ms));
            state.field_focus_order.push(field);
        }

        assert_eq!(inter_field_timings(&state), vec![400.0, 2_000.0]);
    }

    #[test]
    fn test_inter_field_pair_skipped_without_timestamp() {
        let mut state = SessionTrackingState::new(t0());
        state.field_first_focus.insert(FormField::Name, at(100));
        state.field_focus_order = vec![FormField::Name, FormField::Email];

        assert!(inter_field_timings(&state).is_empty());
    }

    #[test]
    fn test_extract() {
        let mut state = SessionTrackingState::new(t0());
        state.key_press_timestamps = vec![at(0), at(100), at(300)];
        state.checkbox_click_time = Some(at(2_500));

        let features = SessionFeatures::extract(&state, at(9_000));
        assert_eq!(features.elapsed_ms, 9_000);
        assert_eq!(features.keystroke_deltas, vec![100.0, 200.0]);
        assert!((features.keystroke_std_dev - 50.0).abs() < 1e-9);
        assert_eq!(features.avg_inter_field_ms, 0.0);
        assert_eq!(features.time_to_checkbox_ms, Some(2_500));
    }
}
