//! Messages flowing into and out of a rest session.

use crate::alert::AlertReport;
use crate::resource::Visibility;

use super::token::AlertToken;

/// A user intent from the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Pause,
    Resume,
    Extend,
    Acknowledge,
    Cancel,
}

impl UserAction {
    /// Returns the string representation of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserAction::Pause => "pause",
            UserAction::Resume => "resume",
            UserAction::Extend => "extend",
            UserAction::Acknowledge => "acknowledge",
            UserAction::Cancel => "cancel",
        }
    }
}

impl std::fmt::Display for UserAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything that wakes the session up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wakeup {
    /// One second elapsed on the tick source stamped with this token.
    Tick(AlertToken),
    /// A flash toggle came due.
    Flash(AlertToken),
    /// The overlay changed visibility.
    Visibility(Visibility),
    /// The user did something.
    Action(UserAction),
}

/// Session events for the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestEvent {
    /// Countdown started
    Started {
        /// Seconds to count down
        remaining: u32,
    },
    /// One second elapsed
    Tick {
        /// Seconds left
        remaining: u32,
    },
    /// Countdown paused
    Paused {
        /// Seconds left
        remaining: u32,
    },
    /// Countdown resumed
    Resumed {
        /// Seconds left
        remaining: u32,
    },
    /// Countdown reached zero and the alert fired
    Completed {
        /// Per-channel alert outcome
        report: AlertReport,
    },
    /// A new countdown started after completion
    Extended {
        /// Seconds to count down
        remaining: u32,
    },
    /// The overlay colors flipped
    FlashToggled {
        /// Whether the overlay is now inverted
        inverted: bool,
    },
    /// The host should dismiss the overlay. Sent exactly once.
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_as_str() {
        assert_eq!(UserAction::Pause.as_str(), "pause");
        assert_eq!(UserAction::Resume.as_str(), "resume");
        assert_eq!(UserAction::Extend.as_str(), "extend");
        assert_eq!(UserAction::Acknowledge.to_string(), "acknowledge");
        assert_eq!(UserAction::Cancel.to_string(), "cancel");
    }

    #[test]
    fn test_event_debug() {
        assert_eq!(format!("{:?}", RestEvent::Closed), "Closed");
    }
}
