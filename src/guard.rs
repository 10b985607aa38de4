//! Per-session controller tying a tracker to a shared scorer.

use crate::score::{ScoreResult, Scorer};
use crate::tracker::{
    Clock, FormField, SessionTracker, SessionTrackingState, SystemClock, VisibilityState,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

/// Behavioral bot guard for one form-fill session.
///
/// The form host forwards its input events here and calls
/// [`FormGuard::calculate_score`] when the visitor submits. Guards never
/// share state; they may share a [`Scorer`].
pub struct FormGuard<C: Clock = SystemClock> {
    /// Session events
    tracker: SessionTracker<C>,
    /// Shared, validated scorer
    scorer: Arc<Scorer>,
    /// Client user-agent, if the host has one
    user_agent: Option<String>,
}

impl FormGuard<SystemClock> {
    /// Start a session on the wall clock.
    pub fn new(scorer: Arc<Scorer>) -> Self {
        Self::with_clock(scorer, SystemClock)
    }
}

impl<C: Clock> FormGuard<C> {
    /// Start a session on the given clock.
    pub fn with_clock(scorer: Arc<Scorer>, clock: C) -> Self {
        Self::with_tracker(scorer, SessionTracker::with_clock(clock))
    }

    /// Wrap an existing tracker.
    pub fn with_tracker(scorer: Arc<Scorer>, tracker: SessionTracker<C>) -> Self {
        Self {
            tracker,
            scorer,
            user_agent: None,
        }
    }

    /// Set the client user-agent reported in evidence.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Current session state.
    pub fn state(&self) -> &SessionTrackingState {
        self.tracker.state()
    }

    /// The tracker, for hosts that supply their own timestamps.
    pub fn tracker_mut(&mut self) -> &mut SessionTracker<C> {
        &mut self.tracker
    }

    /// Count a paste into `field`.
    pub fn record_paste(&mut self, field: FormField) {
        self.tracker.record_paste(field);
    }

    /// Record a keydown stamped now.
    pub fn record_key_down(&mut self) {
        self.tracker.record_key_down();
    }

    /// Note a focus on `field`; only the first focus counts.
    pub fn record_focus(&mut self, field: FormField) {
        self.tracker.record_focus(field);
    }

    /// Count one pointer-move event.
    pub fn record_pointer_move(&mut self) {
        self.tracker.record_pointer_move();
    }

    /// Note a checkbox click; later clicks are ignored.
    pub fn record_checkbox_click(&mut self) {
        self.tracker.record_checkbox_click();
    }

    /// Count one transition into the hidden state.
    pub fn record_visibility_hidden(&mut self) {
        self.tracker.record_visibility_hidden();
    }

    /// Host visibility-change notification.
    pub fn record_visibility_change(&mut self, state: VisibilityState) {
        self.tracker.record_visibility_change(state);
    }

    /// Replace the decoy field's value.
    pub fn set_honeypot_value(&mut self, value: impl Into<String>) {
        self.tracker.set_honeypot_value(value);
    }

    /// Drop all evidence and start over with a fresh start time.
    pub fn reset(&mut self) {
        self.tracker.reset();
        debug!(start_time = %self.tracker.state().start_time, "Form session reset");
    }

    /// Score the session as submitted at `end_time`.
    pub fn calculate_score(&self, end_time: DateTime<Utc>) -> ScoreResult {
        self.scorer
            .calculate(self.tracker.state(), end_time, self.user_agent.as_deref())
    }

    /// Score the session as submitted now, by the tracker's clock.
    pub fn calculate_score_now(&self) -> ScoreResult {
        self.calculate_score(self.tracker.clock().now())
    }
}
