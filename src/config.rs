//! Configuration types for the form guard.

use crate::error::ConfigError;
use crate::signals::{default_weight_table, Signal, SignalWeights};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Main configuration for the form guard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormGuardConfig {
    /// Classification threshold
    pub thresholds: ThresholdConfig,

    /// Signal weights and timing cut-offs
    pub detection: DetectionConfig,

    /// Log the full evidence report at debug level on every score
    pub debug_evidence: bool,
}

impl FormGuardConfig {
    /// Load a configuration file.
    ///
    /// Files ending in `.yaml` or `.yml` are parsed as YAML, anything else
    /// as JSON. Missing sections fall back to their defaults.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = if path.extension().is_some_and(|e| e == "yaml" || e == "yml") {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration can produce a score.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.thresholds.bot_threshold == 0 {
            return Err(ConfigError::InvalidThreshold);
        }
        SignalWeights::from_table(&self.detection.weights)?;
        self.detection.timing.validate()
    }
}

/// Score threshold for the bot verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// A session scoring at or above this is classified as a bot
    pub bot_threshold: u32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self { bot_threshold: 50 }
    }
}

/// Detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Points per signal. Must name every signal.
    pub weights: BTreeMap<Signal, u32>,

    /// Cut-offs for the individual signals
    pub timing: TimingConfig,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            weights: default_weight_table(),
            timing: TimingConfig::default(),
        }
    }
}

/// Cut-offs used by the detectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Submissions faster than this (ms after start) are flagged
    pub fast_submit_ms: i64,

    /// Total pastes at or above this are flagged
    pub high_paste_count: u32,

    /// Cadence is only judged with more keystrokes than this
    pub min_keystrokes_for_cadence: usize,

    /// Keystroke delta standard deviation below this (ms) is robotic
    pub robotic_stddev_ms: f64,

    /// Fewer pointer moves than this are flagged
    pub low_pointer_moves: u32,

    /// Checkbox clicks sooner than this (ms after start) are flagged
    pub fast_checkbox_ms: i64,

    /// Minimum inter-field samples before field entry speed is judged
    pub min_field_samples: usize,

    /// Average inter-field time below this (ms) is flagged
    pub fast_field_entry_ms: f64,

    /// Hidden transitions at or above this are flagged
    pub tab_switch_hidden_count: u32,
}

impl TimingConfig {
    /// Reject cut-offs no session could meaningfully be judged against.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |name: &'static str, reason: &'static str| -> Result<(), ConfigError> {
            Err(ConfigError::InvalidTiming { name, reason })
        };

        if self.fast_submit_ms < 0 {
            return invalid("fast_submit_ms", "must not be negative");
        }
        if self.fast_checkbox_ms < 0 {
            return invalid("fast_checkbox_ms", "must not be negative");
        }
        if !(self.robotic_stddev_ms.is_finite() && self.robotic_stddev_ms >= 0.0) {
            return invalid("robotic_stddev_ms", "must be a finite, non-negative number");
        }
        if !(self.fast_field_entry_ms.is_finite() && self.fast_field_entry_ms >= 0.0) {
            return invalid("fast_field_entry_ms", "must be a finite, non-negative number");
        }
        if self.min_field_samples == 0 {
            return invalid("min_field_samples", "must be at least 1");
        }
        if self.tab_switch_hidden_count == 0 {
            return invalid("tab_switch_hidden_count", "must be at least 1");
        }
        Ok(())
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            fast_submit_ms: 3_000,
            high_paste_count: 2,
            min_keystrokes_for_cadence: 10,
            robotic_stddev_ms: 15.0,
            low_pointer_moves: 25,
            fast_checkbox_ms: 500,
            min_field_samples: 2,
            fast_field_entry_ms: 100.0,
            tab_switch_hidden_count: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FormGuardConfig::default();
        assert_eq!(config.thresholds.bot_threshold, 50);
        assert_eq!(config.detection.weights.len(), Signal::ALL.len());
        assert_eq!(config.detection.timing.fast_submit_ms, 3_000);
        assert!(!config.debug_evidence);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = FormGuardConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: FormGuardConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.thresholds.bot_threshold, config.thresholds.bot_threshold);
        assert_eq!(parsed.detection.weights, config.detection.weights);
    }

    #[test]
    fn test_weights_use_signal_names() {
        let json = serde_json::to_value(FormGuardConfig::default()).unwrap();
        assert_eq!(json["detection"]["weights"]["honeypotTrap"], 50);
        assert_eq!(json["detection"]["weights"]["fastSubmit"], 30);
    }

    #[test]
    fn test_zero_threshold_is_rejected() {
        let mut config = FormGuardConfig::default();
        config.thresholds.bot_threshold = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidThreshold)));
    }

    #[test]
    fn test_partial_weight_table_is_rejected() {
        let json = r#"{ "detection": { "weights": { "honeypotTrap": 10 } } }"#;
        let config: FormGuardConfig = serde_json::from_str(json).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingWeight(Signal::FastSubmit))
        ));
    }

    fn timing_error(config: &FormGuardConfig) -> Option<&'static str> {
        match config.validate() {
            Err(ConfigError::InvalidTiming { name, .. }) => Some(name),
            _ => None,
        }
    }

    #[test]
    fn test_negative_time_limits_are_rejected() {
        let mut config = FormGuardConfig::default();
        config.detection.timing.fast_submit_ms = -1;
        assert_eq!(timing_error(&config), Some("fast_submit_ms"));

        let mut config = FormGuardConfig::default();
        config.detection.timing.fast_checkbox_ms = -500;
        assert_eq!(timing_error(&config), Some("fast_checkbox_ms"));
    }

    #[test]
    fn test_non_finite_cut_offs_are_rejected() {
        let mut config = FormGuardConfig::default();
        config.detection.timing.robotic_stddev_ms = f64::NAN;
        assert_eq!(timing_error(&config), Some("robotic_stddev_ms"));

        let mut config = FormGuardConfig::default();
        config.detection.timing.robotic_stddev_ms = -0.5;
        assert_eq!(timing_error(&config), Some("robotic_stddev_ms"));

        let mut config = FormGuardConfig::default();
        config.detection.timing.fast_field_entry_ms = f64::INFINITY;
        assert_eq!(timing_error(&config), Some("fast_field_entry_ms"));

        let mut config = FormGuardConfig::default();
        config.detection.timing.fast_field_entry_ms = -100.0;
        assert_eq!(timing_error(&config), Some("fast_field_entry_ms"));
    }

    #[test]
    fn test_zero_counts_are_rejected() {
        let mut config = FormGuardConfig::default();
        config.detection.timing.min_field_samples = 0;
        assert_eq!(timing_error(&config), Some("min_field_samples"));

        let mut config = FormGuardConfig::default();
        config.detection.timing.tab_switch_hidden_count = 0;
        assert_eq!(timing_error(&config), Some("tab_switch_hidden_count"));
    }

    #[test]
    fn test_oversized_weight_table_is_rejected() {
        let mut config = FormGuardConfig::default();
        config.detection.weights.insert(Signal::HoneypotTrap, u32::MAX);
        assert!(matches!(config.validate(), Err(ConfigError::WeightOverflow)));
    }

    #[test]
    fn test_unknown_signal_name_fails_to_parse() {
        let json = r#"{ "detection": { "weights": { "mouseEntropy": 10 } } }"#;
        assert!(serde_json::from_str::<FormGuardConfig>(json).is_err());
    }
}
