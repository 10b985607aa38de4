//! Recorded sessions.
//!
//! A recording is the host's event stream for one form fill, with the
//! timestamp of every event. Replaying it through a fresh guard yields the
//! same verdict the live session produced.

use anyhow::Context;
use crate::guard::FormGuard;
use crate::score::{ScoreResult, Scorer};
use crate::tracker::{FixedClock, SessionTracker, VisibilityState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// One host event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    Paste { field: String },
    KeyDown { at: DateTime<Utc> },
    Focus { field: String, at: DateTime<Utc> },
    PointerMove,
    CheckboxClick { at: DateTime<Utc> },
    Visibility { state: VisibilityState },
    Honeypot { value: String },
    Reset { at: DateTime<Utc> },
}

/// The event stream of one form fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecording {
    /// Client user-agent
    #[serde(default)]
    pub user_agent: Option<String>,
    /// When the form first rendered
    pub started_at: DateTime<Utc>,
    /// When the visitor submitted
    pub submitted_at: DateTime<Utc>,
    /// Events in dispatch order
    #[serde(default)]
    pub events: Vec<SessionEvent>,
}

impl SessionRecording {
    /// Load a recording from a JSON or YAML file.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading recording {}", path.display()))?;
        let recording = if path.extension().is_some_and(|e| e == "yaml" || e == "yml") {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };
        Ok(recording)
    }
}

/// Feed `recording` through a fresh guard and score it.
///
/// Events naming fields outside the tracked set are skipped.
pub fn replay(scorer: Arc<Scorer>, recording: &SessionRecording) -> ScoreResult {
    let tracker =
        SessionTracker::starting_at(recording.started_at, FixedClock(recording.submitted_at));
    let mut guard = FormGuard::with_tracker(scorer, tracker);
    if let Some(ua) = &recording.user_agent {
        guard = guard.with_user_agent(ua.clone());
    }

    let mut skipped = 0usize;
    for event in &recording.events {
        let tracker = guard.tracker_mut();
        match event {
            SessionEvent::Paste { field } => {
                if !tracker.record_paste_id(field) {
                    skipped += 1;
                }
            }
            SessionEvent::KeyDown { at } => tracker.record_key_down_at(*at),
            SessionEvent::Focus { field, at } => {
                if !tracker.record_focus_id_at(field, *at) {
                    skipped += 1;
                }
            }
            SessionEvent::PointerMove => tracker.record_pointer_move(),
            SessionEvent::CheckboxClick { at } => tracker.record_checkbox_click_at(*at),
            SessionEvent::Visibility { state } => tracker.record_visibility_change(*state),
            SessionEvent::Honeypot { value } => tracker.set_honeypot_value(value.clone()),
            SessionEvent::Reset { at } => tracker.reset_at(*at),
        }
    }

    debug!(
        events = recording.events.len(),
        skipped = skipped,
        "Recording replayed"
    );

    guard.calculate_score(recording.submitted_at)
}
