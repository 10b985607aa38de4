//! Score calculation, classification and evidence reports.

use crate::config::FormGuardConfig;
use crate::detectors::{default_detectors, DetectionContext, Detector};
use crate::error::ConfigError;
use crate::features::SessionFeatures;
use crate::signals::{Signal, SignalWeights};
use crate::tracker::{FormField, SessionTrackingState};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Placeholder for values the session never produced or the host lacks.
pub const NOT_AVAILABLE: &str = "N/A";

/// Raw and derived numbers behind a score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehavioralData {
    /// Pastes per field
    pub paste_counts: BTreeMap<FormField, u32>,
    /// Number of keydown events
    pub keystroke_count: usize,
    /// Keystroke delta standard deviation (ms, two decimals)
    pub keystroke_std_dev: String,
    /// First focus of each field (RFC 3339)
    pub field_focus_times: BTreeMap<FormField, String>,
    /// Fields in first-focus order
    pub field_focus_order: Vec<FormField>,
    /// Mean time between field entries (ms, two decimals)
    pub avg_inter_field_time: String,
    /// Pointer-move events
    pub pointer_move_count: u32,
    /// Time from start to checkbox click (ms), or "N/A"
    pub time_to_checkbox: String,
    /// Transitions into the hidden state
    pub hidden_transition_count: u32,
}

/// Snapshot of the evidence behind one score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceReport {
    /// Milliseconds from session start to submission
    pub time_to_submit_ms: i64,
    /// Submission time (RFC 3339, millisecond precision)
    pub completed_at: String,
    /// Client user-agent, or "N/A"
    pub user_agent: String,
    /// Every signal and whether it fired
    pub signals: BTreeMap<Signal, bool>,
    pub behavioral_data: BehavioralData,
}

/// Outcome of scoring a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    /// Sum of the weights of every fired signal
    pub score: u32,
    /// `score >= bot_threshold`
    pub is_bot: bool,
    pub evidence: EvidenceReport,
}

impl ScoreResult {
    /// Signals that fired, in [`Signal::ALL`] order.
    pub fn triggered(&self) -> Vec<Signal> {
        Signal::ALL
            .into_iter()
            .filter(|s| self.evidence.signals.get(s).copied().unwrap_or(false))
            .collect()
    }
}

/// Runs every detector and combines their verdicts with the weight table.
///
/// A `Scorer` holds only validated configuration and can be shared by any
/// number of sessions.
pub struct Scorer {
    detectors: Vec<Box<dyn Detector>>,
    weights: SignalWeights,
    bot_threshold: u32,
    debug_evidence: bool,
}

impl Scorer {
    /// Build a scorer, failing if the weight table misses a detector's
    /// signal or the threshold is unusable.
    pub fn new(config: &FormGuardConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let weights = SignalWeights::from_table(&config.detection.weights)?;
        Self::with_detectors(
            default_detectors(&config.detection.timing),
            weights,
            config.thresholds.bot_threshold,
        )
        .map(|scorer| Self {
            debug_evidence: config.debug_evidence,
            ..scorer
        })
    }

    /// Build a scorer over an explicit detector set.
    ///
    /// The set must decide every [`Signal`] exactly once.
    pub fn with_detectors(
        detectors: Vec<Box<dyn Detector>>,
        weights: SignalWeights,
        bot_threshold: u32,
    ) -> Result<Self, ConfigError> {
        if bot_threshold == 0 {
            return Err(ConfigError::InvalidThreshold);
        }

        let mut covered = BTreeSet::new();
        for detector in &detectors {
            if !covered.insert(detector.signal()) {
                return Err(ConfigError::DuplicateDetector(detector.signal()));
            }
        }
        if let Some(missing) = Signal::ALL.into_iter().find(|s| !covered.contains(s)) {
            return Err(ConfigError::MissingDetector(missing));
        }

        Ok(Self {
            detectors,
            weights,
            bot_threshold,
            debug_evidence: false,
        })
    }

    /// The validated weight table.
    pub fn weights(&self) -> &SignalWeights {
        &self.weights
    }

    /// Scores at or above this classify as a bot.
    pub fn bot_threshold(&self) -> u32 {
        self.bot_threshold
    }

    /// Whether `score` classifies as a bot.
    pub fn classify(&self, score: u32) -> bool {
        score >= self.bot_threshold
    }

    /// Evaluate every signal against `state` as of `end_time`.
    pub fn evaluate(
        &self,
        state: &SessionTrackingState,
        end_time: DateTime<Utc>,
    ) -> BTreeMap<Signal, bool> {
        let ctx = DetectionContext::new(state, end_time);
        self.evaluate_context(&ctx)
    }

    fn evaluate_context(&self, ctx: &DetectionContext<'_>) -> BTreeMap<Signal, bool> {
        let mut signals: BTreeMap<Signal, bool> =
            Signal::ALL.into_iter().map(|s| (s, false)).collect();
        for detector in &self.detectors {
            if detector.detect(ctx) {
                debug!(signal = %detector.signal(), "Signal fired");
                signals.insert(detector.signal(), true);
            }
        }
        signals
    }

    /// Sum the weights of the fired signals.
    ///
    /// Bounded by [`SignalWeights::max_score`], so it never overflows.
    pub fn total(&self, signals: &BTreeMap<Signal, bool>) -> u32 {
        signals
            .iter()
            .filter(|(_, fired)| **fired)
            .map(|(signal, _)| self.weights.weight(*signal))
            .sum()
    }

    /// Score a session submitted at `end_time`.
    ///
    /// Reads `state` only; calling this repeatedly never changes a later
    /// result.
    pub fn calculate(
        &self,
        state: &SessionTrackingState,
        end_time: DateTime<Utc>,
        user_agent: Option<&str>,
    ) -> ScoreResult {
        let ctx = DetectionContext::new(state, end_time);
        let signals = self.evaluate_context(&ctx);
        let score = self.total(&signals);
        let is_bot = self.classify(score);

        let evidence = EvidenceReport {
            time_to_submit_ms: ctx.features.elapsed_ms,
            completed_at: end_time.to_rfc3339_opts(SecondsFormat::Millis, true),
            user_agent: user_agent
                .filter(|ua| !ua.trim().is_empty())
                .unwrap_or(NOT_AVAILABLE)
                .to_string(),
            signals,
            behavioral_data: behavioral_data(state, &ctx.features),
        };

        let result = ScoreResult {
            score,
            is_bot,
            evidence,
        };

        info!(
            score = result.score,
            threshold = self.bot_threshold,
            is_bot = result.is_bot,
            triggered = ?result.triggered(),
            "Form scoring complete"
        );
        if self.debug_evidence {
            debug!(evidence = ?result.evidence, "Form scoring evidence");
        }

        result
    }
}

fn behavioral_data(state: &SessionTrackingState, features: &SessionFeatures) -> BehavioralData {
    BehavioralData {
        paste_counts: state.paste_counts.clone(),
        keystroke_count: state.keystroke_count(),
        keystroke_std_dev: format!("{:.2}", features.keystroke_std_dev),
        field_focus_times: state
            .field_first_focus
            .iter()
            .map(|(field, at)| (*field, at.to_rfc3339_opts(SecondsFormat::Millis, true)))
            .collect(),
        field_focus_order: state.field_focus_order.clone(),
        avg_inter_field_time: format!("{:.2}", features.avg_inter_field_ms),
        pointer_move_count: state.pointer_move_count,
        time_to_checkbox: features
            .time_to_checkbox_ms
            .map(|ms| ms.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        hidden_transition_count: state.hidden_transition_count,
    }
}
