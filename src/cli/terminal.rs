//! Terminal capabilities: reverse-video flash and the stdin key reader.

use std::io::{self, BufRead, Write};
use std::thread;

use tracing::debug;

use crate::alert::FlashSurface;
use crate::timer::{SessionHandle, UserAction};

const REVERSE_VIDEO_ON: &str = "\x1b[?5h";
const REVERSE_VIDEO_OFF: &str = "\x1b[?5l";

/// Flashes the whole terminal through DECSCNM reverse video.
#[derive(Debug, Clone, Copy)]
pub struct TerminalFlash {
    enabled: bool,
}

impl TerminalFlash {
    /// `enabled` should be false when stdout is not a terminal.
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl FlashSurface for TerminalFlash {
    fn set_inverted(&self, inverted: bool) {
        if !self.enabled {
            return;
        }
        let code = if inverted {
            REVERSE_VIDEO_ON
        } else {
            REVERSE_VIDEO_OFF
        };
        let mut stdout = io::stdout().lock();
        if stdout
            .write_all(code.as_bytes())
            .and_then(|()| stdout.flush())
            .is_err()
        {
            debug!("Failed to write flash sequence");
        }
    }

    fn is_available(&self) -> bool {
        self.enabled
    }
}

/// Maps one input line to a user intent.
pub fn parse_action(line: &str) -> Option<UserAction> {
    match line.trim().to_ascii_lowercase().as_str() {
        "p" | "pause" => Some(UserAction::Pause),
        "r" | "resume" => Some(UserAction::Resume),
        "e" | "extend" => Some(UserAction::Extend),
        "a" | "ack" | "done" => Some(UserAction::Acknowledge),
        "c" | "cancel" | "q" => Some(UserAction::Cancel),
        _ => None,
    }
}

/// Reads intents from `input` until EOF, which cancels the session.
///
/// Returns when the input ends or the session has finished.
pub fn forward_actions(input: impl BufRead, handle: &SessionHandle) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                debug!("Failed to read input: {}", e);
                break;
            }
        };
        match parse_action(&line) {
            Some(action) => {
                if !handle.send(action) {
                    return;
                }
            }
            None if line.trim().is_empty() => {}
            None => debug!("Unknown command: {}", line.trim()),
        }
    }
    handle.cancel();
}

/// Spawns a thread forwarding stdin to the session.
///
/// Stdin reads block, so this runs off the runtime; the thread is left
/// behind when the session closes.
pub fn spawn_stdin_reader(handle: SessionHandle) -> io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("rest-timer-stdin".to_string())
        .spawn(move || forward_actions(io::stdin().lock(), &handle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_action() {
        assert_eq!(parse_action("p"), Some(UserAction::Pause));
        assert_eq!(parse_action(" R \n"), Some(UserAction::Resume));
        assert_eq!(parse_action("extend"), Some(UserAction::Extend));
        assert_eq!(parse_action("a"), Some(UserAction::Acknowledge));
        assert_eq!(parse_action("c"), Some(UserAction::Cancel));
        assert_eq!(parse_action("x"), None);
        assert_eq!(parse_action(""), None);
    }

    #[test]
    fn test_disabled_flash_writes_nothing() {
        let flash = TerminalFlash::new(false);
        flash.set_inverted(true);
        flash.set_inverted(false);
        assert!(!flash.is_available());
    }

    #[test]
    fn test_enabled_flash_is_available() {
        assert!(TerminalFlash::new(true).is_available());
    }

    #[test]
    fn test_non_terminal_flash_channel_is_unavailable() {
        use std::time::Duration;

        use crate::alert::{ChannelOutcome, FlashChannel};
        use crate::timer::{ManualScheduler, TokenSource};

        let mut channel =
            FlashChannel::new(Box::new(TerminalFlash::new(false)), Duration::from_millis(150), 10);
        let mut scheduler = ManualScheduler::new();
        let token = TokenSource::new().advance();

        assert_eq!(channel.start(token, &mut scheduler), ChannelOutcome::Unavailable);
        assert_eq!(scheduler.pending_flashes(), 0);
    }
}
