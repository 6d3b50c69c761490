//! Core data types for the rest timer.
//!
//! This module defines the data structures used for:
//! - The caller's rest request (exercise, duration, completed sets)
//! - Rest session state and its countdown bookkeeping
//! - Timer configuration with validation
//! - Display helpers shared by hosts

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::alert::AlertConfig;

/// Fixed length of an extension after the countdown completes.
pub const EXTENSION_SECONDS: u32 = 30;

/// Cadence of the countdown tick source.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

// ============================================================================
// SetEntry
// ============================================================================

/// One completed set, shown in the overlay for reference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SetEntry {
    /// Weight in pounds (bodyweight sets have none)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Repetitions performed
    pub reps: u32,
}

impl SetEntry {
    /// Creates a weighted set.
    pub fn weighted(weight: f64, reps: u32) -> Self {
        Self {
            weight: Some(weight),
            reps,
        }
    }

    /// Creates a set without weight.
    pub fn bodyweight(reps: u32) -> Self {
        Self { weight: None, reps }
    }

    /// Returns the overlay label, e.g. `135 lb × 10` or `12 reps`.
    pub fn label(&self) -> String {
        match self.weight {
            Some(weight) => format!("{} lb × {}", format_weight(weight), self.reps),
            None => format!("{} reps", self.reps),
        }
    }
}

// ============================================================================
// RestRequest
// ============================================================================

/// What the caller hands over when it opens the overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestRequest {
    /// Exercise title (display only)
    pub exercise_name: String,
    /// Requested rest in seconds; zero or negative completes immediately
    pub rest_seconds: i64,
    /// Sets completed so far, in order
    #[serde(default)]
    pub sets: Vec<SetEntry>,
}

impl RestRequest {
    /// Creates a request with no sets.
    pub fn new(exercise_name: impl Into<String>, rest_seconds: i64) -> Self {
        Self {
            exercise_name: exercise_name.into(),
            rest_seconds,
            sets: Vec::new(),
        }
    }

    /// Appends a completed set.
    pub fn with_set(mut self, set: SetEntry) -> Self {
        self.sets.push(set);
        self
    }

    /// Returns the countdown length, clamped to zero.
    pub fn total_seconds(&self) -> u32 {
        u32::try_from(self.rest_seconds.max(0)).unwrap_or(u32::MAX)
    }

    /// Validates the request.
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.exercise_name.trim().is_empty() {
            return Err("exercise name must not be empty".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// SessionState
// ============================================================================

/// Countdown state of a rest session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Counting down
    Running,
    /// Counting suspended by the user
    Paused,
    /// Reached zero; alert has fired
    Complete,
}

impl SessionState {
    /// Returns the string representation of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Running => "running",
            SessionState::Paused => "paused",
            SessionState::Complete => "complete",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// RestSession
// ============================================================================

/// One rest interval, from overlay open to dismissal.
#[derive(Debug, Clone)]
pub struct RestSession {
    /// Session id used in log fields
    pub id: Uuid,
    /// Exercise title
    pub exercise_name: String,
    /// Completed sets (read-only after construction)
    pub sets: Vec<SetEntry>,
    /// Originally requested duration
    pub total: u32,
    /// Seconds left in the current countdown
    pub remaining: u32,
    /// Current state
    pub state: SessionState,
    /// Flash toggles performed in the current Complete burst
    pub flash_toggle_count: u32,
    /// Ticks applied across every Running phase
    pub ticks_elapsed: u32,
    /// Number of Complete entries
    pub completions: u32,
    /// Number of alert dispatches
    pub alerts_fired: u32,
}

impl RestSession {
    /// Creates a running session from the caller's request.
    pub fn new(request: RestRequest) -> Self {
        let total = request.total_seconds();
        Self {
            id: Uuid::new_v4(),
            exercise_name: request.exercise_name,
            sets: request.sets,
            total,
            remaining: total,
            state: SessionState::Running,
            flash_toggle_count: 0,
            ticks_elapsed: 0,
            completions: 0,
            alerts_fired: 0,
        }
    }

    /// Decrements the countdown by one second.
    ///
    /// Returns true if the countdown has reached 0.
    pub fn tick(&mut self) -> bool {
        if self.remaining > 0 {
            self.remaining -= 1;
            self.ticks_elapsed += 1;
        }
        self.remaining == 0
    }

    /// Suspends the countdown.
    pub fn pause(&mut self) {
        self.state = SessionState::Paused;
    }

    /// Continues a paused countdown.
    pub fn resume(&mut self) {
        self.state = SessionState::Running;
    }

    /// Marks the countdown complete.
    pub fn complete(&mut self) {
        self.remaining = 0;
        self.state = SessionState::Complete;
        self.flash_toggle_count = 0;
        self.completions += 1;
    }

    /// Starts a fresh Running phase of `seconds`.
    pub fn extend(&mut self, seconds: u32) {
        self.remaining = seconds;
        self.state = SessionState::Running;
        self.flash_toggle_count = 0;
    }

    /// Returns true if the countdown is running.
    pub fn is_running(&self) -> bool {
        self.state == SessionState::Running
    }

    /// Returns true if the countdown is paused.
    pub fn is_paused(&self) -> bool {
        self.state == SessionState::Paused
    }

    /// Returns true if the countdown has completed.
    pub fn is_complete(&self) -> bool {
        self.state == SessionState::Complete
    }
}

// ============================================================================
// RestTimerConfig
// ============================================================================

fn default_extension_seconds() -> u32 {
    EXTENSION_SECONDS
}

fn default_wake_lock() -> bool {
    true
}

/// Configuration for the rest timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestTimerConfig {
    /// Length of `extend()` in seconds
    #[serde(default = "default_extension_seconds")]
    pub extension_seconds: u32,
    /// Whether to hold a wake lock while counting down
    #[serde(default = "default_wake_lock")]
    pub wake_lock: bool,
    /// Alert channel settings
    #[serde(default)]
    pub alert: AlertConfig,
}

impl Default for RestTimerConfig {
    fn default() -> Self {
        Self {
            extension_seconds: default_extension_seconds(),
            wake_lock: default_wake_lock(),
            alert: AlertConfig::default(),
        }
    }
}

impl RestTimerConfig {
    /// Sets the extension length.
    pub fn with_extension_seconds(mut self, seconds: u32) -> Self {
        self.extension_seconds = seconds;
        self
    }

    /// Validates the configuration.
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.extension_seconds == 0 || self.extension_seconds > 3600 {
            return Err("extension_seconds must be within 1-3600".to_string());
        }
        self.alert.validate()
    }
}

// ============================================================================
// Display helpers
// ============================================================================

/// Formats seconds as `m:ss`.
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Joins the reps of each set, e.g. `10 × 10 × 8`.
pub fn format_reps(sets: &[SetEntry]) -> String {
    sets.iter()
        .map(|set| set.reps.to_string())
        .collect::<Vec<_>>()
        .join(" × ")
}

fn format_weight(weight: f64) -> String {
    if weight.fract() == 0.0 {
        format!("{}", weight as i64)
    } else {
        format!("{:.1}", weight)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // SetEntry / RestRequest Tests
    // ------------------------------------------------------------------------

    mod request_tests {
        use super::*;

        #[test]
        fn test_set_label_weighted() {
            assert_eq!(SetEntry::weighted(135.0, 10).label(), "135 lb × 10");
            assert_eq!(SetEntry::weighted(47.5, 8).label(), "47.5 lb × 8");
        }

        #[test]
        fn test_set_label_bodyweight() {
            assert_eq!(SetEntry::bodyweight(12).label(), "12 reps");
        }

        #[test]
        fn test_total_seconds_clamps_negative() {
            assert_eq!(RestRequest::new("Squat", -5).total_seconds(), 0);
            assert_eq!(RestRequest::new("Squat", 0).total_seconds(), 0);
            assert_eq!(RestRequest::new("Squat", 90).total_seconds(), 90);
        }

        #[test]
        fn test_validate_rejects_blank_name() {
            assert!(RestRequest::new("   ", 60).validate().is_err());
            assert!(RestRequest::new("Deadlift", 60).validate().is_ok());
        }

        #[test]
        fn test_request_deserialize_without_weight() {
            let json = r#"{"exercise_name":"Pull-up","rest_seconds":90,"sets":[{"reps":8}]}"#;
            let request: RestRequest = serde_json::from_str(json).unwrap();
            assert_eq!(request.sets, vec![SetEntry::bodyweight(8)]);
        }

        #[test]
        fn test_request_deserialize_without_sets() {
            let json = r#"{"exercise_name":"Row","rest_seconds":60}"#;
            let request: RestRequest = serde_json::from_str(json).unwrap();
            assert!(request.sets.is_empty());
        }
    }

    // ------------------------------------------------------------------------
    // RestSession Tests
    // ------------------------------------------------------------------------

    mod session_tests {
        use super::*;

        #[test]
        fn test_new_session_is_running() {
            let request = RestRequest::new("Bench", 5).with_set(SetEntry::weighted(135.0, 10));
            let session = RestSession::new(request);

            assert_eq!(session.state, SessionState::Running);
            assert_eq!(session.remaining, 5);
            assert_eq!(session.total, 5);
            assert_eq!(session.sets.len(), 1);
        }

        #[test]
        fn test_tick_stops_at_zero() {
            let mut session = RestSession::new(RestRequest::new("Bench", 2));

            assert!(!session.tick());
            assert!(session.tick());
            assert!(session.tick());
            assert_eq!(session.remaining, 0);
            assert_eq!(session.ticks_elapsed, 2);
        }

        #[test]
        fn test_pause_and_resume_keep_remaining() {
            let mut session = RestSession::new(RestRequest::new("Bench", 10));
            session.tick();

            session.pause();
            assert!(session.is_paused());
            assert!(!session.is_running());
            assert_eq!(session.remaining, 9);

            session.resume();
            assert!(session.is_running());
            assert!(!session.is_paused());
            assert_eq!(session.remaining, 9);
        }

        #[test]
        fn test_complete_and_extend() {
            let mut session = RestSession::new(RestRequest::new("Bench", 1));
            session.tick();
            session.complete();
            assert!(session.is_complete());
            assert_eq!(session.completions, 1);

            session.extend(EXTENSION_SECONDS);
            assert!(session.is_running());
            assert_eq!(session.remaining, 30);
            assert_eq!(session.total, 1);
        }

        #[test]
        fn test_state_as_str() {
            assert_eq!(SessionState::Running.as_str(), "running");
            assert_eq!(SessionState::Paused.as_str(), "paused");
            assert_eq!(SessionState::Complete.to_string(), "complete");
        }
    }

    // ------------------------------------------------------------------------
    // Config Tests
    // ------------------------------------------------------------------------

    mod config_tests {
        use super::*;

        #[test]
        fn test_default_config() {
            let config = RestTimerConfig::default();
            assert_eq!(config.extension_seconds, 30);
            assert!(config.wake_lock);
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_partial_json_uses_defaults() {
            let config: RestTimerConfig = serde_json::from_str(r#"{"wake_lock":false}"#).unwrap();
            assert!(!config.wake_lock);
            assert_eq!(config.extension_seconds, 30);
            assert_eq!(config.alert, AlertConfig::default());
        }

        #[test]
        fn test_validate_extension_range() {
            assert!(RestTimerConfig::default()
                .with_extension_seconds(0)
                .validate()
                .is_err());
            assert!(RestTimerConfig::default()
                .with_extension_seconds(45)
                .validate()
                .is_ok());
        }
    }

    // ------------------------------------------------------------------------
    // Display Helper Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(5), "0:05");
        assert_eq!(format_clock(90), "1:30");
        assert_eq!(format_clock(600), "10:00");
    }

    #[test]
    fn test_format_reps() {
        let sets = [
            SetEntry::weighted(135.0, 10),
            SetEntry::weighted(135.0, 10),
            SetEntry::bodyweight(8),
        ];
        assert_eq!(format_reps(&sets), "10 × 10 × 8");
        assert_eq!(format_reps(&[]), "");
    }
}
