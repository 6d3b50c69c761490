//! Display utilities for the rest timer CLI.
//!
//! This module renders the terminal overlay:
//! - Session header (exercise, sets)
//! - Countdown and state changes
//! - Alert outcome and final summary

use std::io::{self, Write};

use crate::alert::{AlertReport, ChannelOutcome};
use crate::timer::RestEvent;
use crate::types::{format_clock, format_reps, RestRequest, RestSession};

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the overlay header.
    pub fn show_header(request: &RestRequest, extension_seconds: u32) {
        println!("{}", Self::header(request));
        println!("{}", Self::key_help(extension_seconds));
    }

    /// Shows one session event.
    ///
    /// Countdown ticks overwrite the current line; everything else gets its
    /// own line.
    pub fn show_event(event: &RestEvent) {
        let Some(line) = Self::render_event(event) else {
            return;
        };
        let mut stdout = io::stdout().lock();
        let result = match event {
            RestEvent::Tick { .. } => write!(stdout, "\r\x1b[2K{}", line),
            _ => writeln!(stdout, "\r\x1b[2K{}", line),
        };
        if result.and_then(|()| stdout.flush()).is_err() {
            tracing::debug!("Failed to write to stdout");
        }
    }

    /// Shows the final line once the overlay has closed.
    pub fn show_summary(session: &RestSession) {
        println!("{}", Self::summary(session));
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("error: {}", message);
    }

    /// Renders the header: exercise title and the sets done so far.
    pub fn header(request: &RestRequest) -> String {
        let mut header = format!("Rest: {}", request.exercise_name);
        if !request.sets.is_empty() {
            let sets = request
                .sets
                .iter()
                .map(|set| set.label())
                .collect::<Vec<_>>()
                .join(", ");
            header.push_str(&format!("\n  Sets: {} ({})", sets, format_reps(&request.sets)));
        }
        header
    }

    /// Key help shown under the header.
    pub fn key_help(extension_seconds: u32) -> String {
        format!(
            "[p] pause  [r] resume  [e] +{}s  [a] done  [c] cancel",
            extension_seconds
        )
    }

    /// Renders one event, or `None` for events with nothing to show.
    pub fn render_event(event: &RestEvent) -> Option<String> {
        match event {
            RestEvent::Started { remaining } => Some(format!("> {}", format_clock(*remaining))),
            RestEvent::Tick { remaining } => Some(format!("> {}", format_clock(*remaining))),
            RestEvent::Paused { remaining } => {
                Some(format!("|| {} paused", format_clock(*remaining)))
            }
            RestEvent::Resumed { remaining } => Some(format!("> {}", format_clock(*remaining))),
            RestEvent::Extended { remaining } => {
                Some(format!("+ {} more rest", format_clock(*remaining)))
            }
            RestEvent::Completed { report } => Some(Self::completed(report)),
            RestEvent::FlashToggled { .. } => None,
            RestEvent::Closed => None,
        }
    }

    /// Renders the final line.
    pub fn summary(session: &RestSession) -> String {
        if session.is_complete() {
            format!(
                "* Rest over after {} ({})",
                format_clock(session.ticks_elapsed),
                session.exercise_name
            )
        } else {
            format!(
                "[] Rest cancelled with {} left ({})",
                format_clock(session.remaining),
                session.exercise_name
            )
        }
    }

    fn completed(report: &AlertReport) -> String {
        let mut line = "* Time's up! Next set".to_string();
        let degraded = report
            .outcomes()
            .iter()
            .filter(|(_, outcome)| matches!(outcome, ChannelOutcome::Degraded { .. }))
            .map(|(channel, _)| channel.as_str())
            .collect::<Vec<_>>();
        if !degraded.is_empty() {
            line.push_str(&format!(" (alert degraded: {})", degraded.join(", ")));
        }
        line
    }
}

// ============================================================================
// Tests
// ============================================================================
