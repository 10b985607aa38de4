//! Interaction state tracking.
//!
//! Accumulates the raw events of one form-fill session:
//! - Keystroke and paste activity
//! - First focus of each field, in order
//! - Pointer movement, checkbox timing and tab visibility
//! - The honeypot field value

use crate::error::FieldError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{trace, warn};

/// Fields whose paste and focus activity is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Name,
    Email,
    Cc,
    Subject,
    Content,
}

impl FormField {
    /// Every tracked field, in layout order.
    pub const ALL: [FormField; 5] = [
        FormField::Name,
        FormField::Email,
        FormField::Cc,
        FormField::Subject,
        FormField::Content,
    ];

    /// Returns the field identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::Email => "email",
            FormField::Cc => "cc",
            FormField::Subject => "subject",
            FormField::Content => "content",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormField {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormField::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FieldError::UnknownField(s.to_string()))
    }
}

/// Page visibility as reported by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityState {
    #[default]
    Visible,
    Hidden,
}

/// Source of "now" for event timestamps.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stuck at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Raw interaction data for one form-fill session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionTrackingState {
    /// When the session began
    pub start_time: DateTime<Utc>,
    /// Paste events per field
    pub paste_counts: BTreeMap<FormField, u32>,
    /// One entry per keydown, across all fields
    pub key_press_timestamps: Vec<DateTime<Utc>>,
    /// First focus of each field
    pub field_first_focus: BTreeMap<FormField, DateTime<Utc>>,
    /// Fields in the order they were first focused
    pub field_focus_order: Vec<FormField>,
    /// Pointer-move events seen
    pub pointer_move_count: u32,
    /// First checkbox click
    pub checkbox_click_time: Option<DateTime<Utc>>,
    /// Transitions into the hidden state
    pub hidden_transition_count: u32,
    /// Value of the decoy field
    pub honeypot_value: String,
    /// Last visibility reported by the host
    pub visibility: VisibilityState,
}

impl SessionTrackingState {
    /// Create an empty session starting at `start_time`.
    pub fn new(start_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            paste_counts: FormField::ALL.into_iter().map(|f| (f, 0)).collect(),
            key_press_timestamps: Vec::new(),
            field_first_focus: BTreeMap::new(),
            field_focus_order: Vec::new(),
            pointer_move_count: 0,
            checkbox_click_time: None,
            hidden_transition_count: 0,
            honeypot_value: String::new(),
            visibility: VisibilityState::Visible,
        }
    }

    /// Pastes across all fields.
    pub fn total_pastes(&self) -> u32 {
        self.paste_counts.values().sum()
    }

    /// Number of keydown events.
    pub fn keystroke_count(&self) -> usize {
        self.key_press_timestamps.len()
    }
}

/// Owns and mutates the [`SessionTrackingState`] of one session.
///
/// Every operation is a plain state transition and never fails. The bare
/// `record_*` methods stamp events with the tracker's clock; the `_at`
/// variants take an explicit timestamp.
#[derive(Debug)]
pub struct SessionTracker<C: Clock = SystemClock> {
    state: SessionTrackingState,
    clock: C,
}

impl SessionTracker<SystemClock> {
    /// Start a session on the wall clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for SessionTracker<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> SessionTracker<C> {
    /// Start a session on the given clock.
    pub fn with_clock(clock: C) -> Self {
        let state = SessionTrackingState::new(clock.now());
        Self { state, clock }
    }

    /// Start a session at an explicit instant.
    pub fn starting_at(start_time: DateTime<Utc>, clock: C) -> Self {
        Self {
            state: SessionTrackingState::new(start_time),
            clock,
        }
    }

    /// Current state.
    pub fn state(&self) -> &SessionTrackingState {
        &self.state
    }

    /// The tracker's clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Count a paste into `field`.
    pub fn record_paste(&mut self, field: FormField) {
        let count = self.state.paste_counts.entry(field).or_insert(0);
        *count = count.saturating_add(1);
        trace!(field = %field, "paste");
    }

    /// Count a paste into the field named `id`.
    ///
    /// Unknown identifiers are ignored and leave the state untouched.
    /// Returns whether the event was recorded.
    pub fn record_paste_id(&mut self, id: &str) -> bool {
        match id.parse() {
            Ok(field) => {
                self.record_paste(field);
                true
            }
            Err(e) => {
                warn!(error = %e, "Ignoring paste on untracked field");
                false
            }
        }
    }

    /// Append a keydown stamped now.
    pub fn record_key_down(&mut self) {
        let now = self.clock.now();
        self.record_key_down_at(now);
    }

    /// Append a keydown at `at`.
    pub fn record_key_down_at(&mut self, at: DateTime<Utc>) {
        self.state.key_press_timestamps.push(at);
    }

    /// Note a focus on `field`. Only the first focus of a field counts.
    pub fn record_focus(&mut self, field: FormField) {
        let now = self.clock.now();
        self.record_focus_at(field, now);
    }

    /// Note a focus on `field` at `at`. Only the first focus counts.
    pub fn record_focus_at(&mut self, field: FormField, at: DateTime<Utc>) {
        if self.state.field_first_focus.contains_key(&field) {
            return;
        }
        self.state.field_first_focus.insert(field, at);
        self.state.field_focus_order.push(field);
        trace!(field = %field, "first focus");
    }

    /// Focus by identifier; see [`Self::record_paste_id`].
    pub fn record_focus_id(&mut self, id: &str) -> bool {
        let now = self.clock.now();
        self.record_focus_id_at(id, now)
    }

    /// Focus by identifier at `at`; unknown identifiers are ignored.
    pub fn record_focus_id_at(&mut self, id: &str, at: DateTime<Utc>) -> bool {
        match id.parse() {
            Ok(field) => {
                self.record_focus_at(field, at);
                true
            }
            Err(e) => {
                warn!(error = %e, "Ignoring focus on untracked field");
                false
            }
        }
    }

    /// Count one pointer-move event.
    pub fn record_pointer_move(&mut self) {
        self.state.pointer_move_count = self.state.pointer_move_count.saturating_add(1);
    }

    /// Note a checkbox click. Later clicks are ignored.
    pub fn record_checkbox_click(&mut self) {
        let now = self.clock.now();
        self.record_checkbox_click_at(now);
    }

    /// Note a checkbox click at `at`. Later clicks are ignored.
    pub fn record_checkbox_click_at(&mut self, at: DateTime<Utc>) {
        self.state.checkbox_click_time.get_or_insert(at);
    }

    /// Count one transition into the hidden state.
    pub fn record_visibility_hidden(&mut self) {
        self.state.visibility = VisibilityState::Hidden;
        self.state.hidden_transition_count = self.state.hidden_transition_count.saturating_add(1);
    }

    /// Host visibility-change notification.
    ///
    /// Only a visible-to-hidden transition is counted; a repeated hidden
    /// notification without a visible one in between is not.
    pub fn record_visibility_change(&mut self, state: VisibilityState) {
        match (self.state.visibility, state) {
            (VisibilityState::Visible, VisibilityState::Hidden) => self.record_visibility_hidden(),
            (_, new) => self.state.visibility = new,
        }
    }

    /// Replace the decoy field's value.
    pub fn set_honeypot_value(&mut self, value: impl Into<String>) {
        self.state.honeypot_value = value.into();
    }

    /// Discard everything and start a new session now.
    pub fn reset(&mut self) {
        let now = self.clock.now();
        self.reset_at(now);
    }

    /// Discard everything and start a new session at `start_time`.
    pub fn reset_at(&mut self, start_time: DateTime<Utc>) {
        self.state = SessionTrackingState::new(start_time);
    }
}
