//! Behavioral bot scoring for form submissions.
//!
//! Tracks how a visitor fills a form and decides, at submission time and
//! without a server round-trip, whether an automated agent produced it.
//!
//! # Features
//!
//! - Honeypot field trap
//! - Submission, checkbox and field-entry timing
//! - Keystroke cadence variance
//! - Paste, pointer and tab-visibility activity
//! - Weighted score with a single bot threshold and an evidence report
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use zentinel_form_guard::{FormField, FormGuard, FormGuardConfig, Scorer};
//!
//! let scorer = Arc::new(Scorer::new(&FormGuardConfig::default())?);
//! let mut guard = FormGuard::new(scorer).with_user_agent("Mozilla/5.0");
//!
//! guard.record_focus(FormField::Email);
//! guard.record_key_down();
//! guard.set_honeypot_value("http://spam.example");
//!
//! let result = guard.calculate_score(chrono::Utc::now());
//! assert!(result.is_bot);
//! # Ok::<(), zentinel_form_guard::ConfigError>(())
//! ```

pub mod config;
pub mod detectors;
pub mod error;
pub mod features;
pub mod guard;
pub mod replay;
pub mod score;
pub mod signals;
pub mod tracker;

pub use config::FormGuardConfig;
pub use error::{ConfigError, FieldError};
pub use guard::FormGuard;
pub use score::{EvidenceReport, ScoreResult, Scorer};
pub use signals::{Signal, SignalWeights};
pub use tracker::{FormField, SessionTracker, SessionTrackingState, VisibilityState};
