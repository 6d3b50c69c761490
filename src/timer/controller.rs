//! Countdown state machine for one rest session.
//!
//! ```text
//!              pause()              zero crossing
//!   Running ───────────▶ Paused     Running ───────▶ Complete
//!      ▲                   │                            │
//!      └──── resume() ─────┘        Running ◀─ extend() ┘
//!
//!   cancel() from any state, acknowledge() from Complete ──▶ closed
//! ```
//!
//! Every transition happens synchronously inside the call that triggered it.
//! Whenever the tick source or the flash loop is torn down, the token source
//! advances so that callbacks already in flight are discarded on arrival.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, trace};

use super::error::SessionError;
use super::event::{RestEvent, UserAction, Wakeup};
use super::scheduler::Scheduler;
use super::token::{AlertToken, TokenSource};
use crate::alert::AlertSubsystem;
use crate::resource::{ResourceLifecycleManager, Visibility};
use crate::types::{RestRequest, RestSession, SessionState};

/// Drives the countdown and mediates user intents.
pub struct TimerController {
    session: RestSession,
    extension_seconds: u32,
    tokens: TokenSource,
    scheduler: Box<dyn Scheduler>,
    alerts: AlertSubsystem,
    resources: ResourceLifecycleManager,
    events: mpsc::UnboundedSender<RestEvent>,
    closed: bool,
}

impl TimerController {
    /// Opens a session and starts counting down immediately.
    ///
    /// Pre-warms the audio device, subscribes to visibility changes (posted
    /// to `wakeups`) and takes the wake lock. A zero-length request completes
    /// before this returns.
    pub fn start(
        request: RestRequest,
        extension_seconds: u32,
        alerts: AlertSubsystem,
        resources: ResourceLifecycleManager,
        scheduler: Box<dyn Scheduler>,
        wakeups: mpsc::UnboundedSender<Wakeup>,
        events: mpsc::UnboundedSender<RestEvent>,
    ) -> Self {
        let mut controller = Self {
            session: RestSession::new(request),
            extension_seconds,
            tokens: TokenSource::new(),
            scheduler,
            alerts,
            resources,
            events,
            closed: false,
        };

        info!(
            session = %controller.session.id,
            exercise = %controller.session.exercise_name,
            total = controller.session.total,
            "Rest session opened"
        );

        controller.alerts.prewarm();
        controller.resources.begin(Arc::new(move |visibility| {
            let _ = wakeups.send(Wakeup::Visibility(visibility));
        }));

        controller.emit(RestEvent::Started {
            remaining: controller.session.remaining,
        });
        if controller.session.remaining == 0 {
            controller.enter_complete();
        } else {
            controller.arm_ticks();
        }
        controller
    }

    // ------------------------------------------------------------------------
    // Wakeups
    // ------------------------------------------------------------------------

    /// Routes one wakeup to its handler.
    pub fn handle(&mut self, wakeup: Wakeup) {
        match wakeup {
            Wakeup::Tick(token) => self.on_tick(token),
            Wakeup::Flash(token) => self.on_flash(token),
            Wakeup::Visibility(visibility) => self.on_visibility(visibility),
            Wakeup::Action(action) => {
                if let Err(e) = self.apply(action) {
                    debug!(session = %self.session.id, "Ignoring {}: {}", action, e);
                }
            }
        }
    }

    /// Applies one second of countdown.
    pub fn on_tick(&mut self, token: AlertToken) {
        if self.closed || !self.tokens.is_current(token) || !self.session.is_running() {
            trace!(generation = token.generation(), "Discarding stale tick");
            return;
        }

        let completed = self.session.tick();
        self.emit(RestEvent::Tick {
            remaining: self.session.remaining,
        });
        if completed {
            self.enter_complete();
        }
    }

    /// Performs the next flash toggle.
    pub fn on_flash(&mut self, token: AlertToken) {
        if self.closed || !self.tokens.is_current(token) || !self.session.is_complete() {
            trace!(generation = token.generation(), "Discarding stale flash");
            return;
        }

        let before = self.session.flash_toggle_count;
        let progress = self.alerts.flash_step(token, self.scheduler.as_mut());
        self.session.flash_toggle_count = progress.toggles;
        if progress.toggles != before {
            self.emit(RestEvent::FlashToggled {
                inverted: progress.inverted,
            });
        }
    }

    /// Reacts to the overlay entering or leaving the foreground.
    pub fn on_visibility(&mut self, visibility: Visibility) {
        if self.closed {
            return;
        }
        debug!(session = %self.session.id, ?visibility, "Visibility changed");
        self.resources
            .on_visibility(visibility, self.session.is_running());
    }

    // ------------------------------------------------------------------------
    // User intents
    // ------------------------------------------------------------------------

    /// Applies a user intent.
    pub fn apply(&mut self, action: UserAction) -> Result<(), SessionError> {
        match action {
            UserAction::Pause => self.pause(),
            UserAction::Resume => self.resume(),
            UserAction::Extend => self.extend(),
            UserAction::Acknowledge => self.acknowledge(),
            UserAction::Cancel => self.cancel(),
        }
    }

    /// Pauses a running countdown, tearing down its tick source.
    ///
    /// # Errors
    ///
    /// Returns an error if the countdown is not running.
    pub fn pause(&mut self) -> Result<(), SessionError> {
        self.require(UserAction::Pause, SessionState::Running)?;

        self.tokens.advance();
        self.scheduler.stop_ticks();
        self.session.pause();
        self.resources.release();

        info!(session = %self.session.id, remaining = self.session.remaining, "Rest paused");
        self.emit(RestEvent::Paused {
            remaining: self.session.remaining,
        });
        Ok(())
    }

    /// Resumes a paused countdown on a fresh tick source.
    ///
    /// # Errors
    ///
    /// Returns an error if the countdown is not paused.
    pub fn resume(&mut self) -> Result<(), SessionError> {
        self.require(UserAction::Resume, SessionState::Paused)?;

        self.session.resume();
        self.arm_ticks();
        self.resources.acquire();

        info!(session = %self.session.id, remaining = self.session.remaining, "Rest resumed");
        self.emit(RestEvent::Resumed {
            remaining: self.session.remaining,
        });
        Ok(())
    }

    /// Starts a new countdown of the extension length after completion.
    ///
    /// # Errors
    ///
    /// Returns an error if the countdown has not completed.
    pub fn extend(&mut self) -> Result<(), SessionError> {
        self.require(UserAction::Extend, SessionState::Complete)?;

        self.alerts.cancel();
        self.session.extend(self.extension_seconds);
        self.resources.acquire();

        info!(session = %self.session.id, remaining = self.session.remaining, "Rest extended");
        self.emit(RestEvent::Extended {
            remaining: self.session.remaining,
        });
        if self.session.remaining == 0 {
            self.enter_complete();
        } else {
            self.arm_ticks();
        }
        Ok(())
    }

    /// Dismisses a completed session.
    ///
    /// # Errors
    ///
    /// Returns an error if the countdown has not completed.
    pub fn acknowledge(&mut self) -> Result<(), SessionError> {
        self.require(UserAction::Acknowledge, SessionState::Complete)?;
        self.close("acknowledged");
        Ok(())
    }

    /// Aborts the session from any state.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is already closed.
    pub fn cancel(&mut self) -> Result<(), SessionError> {
        if self.closed {
            return Err(SessionError::Closed);
        }
        self.close("cancelled");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// The session data.
    pub fn session(&self) -> &RestSession {
        &self.session
    }

    /// Current countdown state.
    pub fn state(&self) -> SessionState {
        self.session.state
    }

    /// Seconds left in the current countdown.
    pub fn remaining(&self) -> u32 {
        self.session.remaining
    }

    /// Returns true once the close signal has been emitted.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Returns true while an active wake lock is held.
    pub fn holds_wake_lock(&mut self) -> bool {
        self.resources.holds_wake_lock()
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn require(&self, action: UserAction, state: SessionState) -> Result<(), SessionError> {
        if self.closed {
            return Err(SessionError::Closed);
        }
        if self.session.state != state {
            return Err(SessionError::InvalidTransition {
                action,
                state: self.session.state,
            });
        }
        Ok(())
    }

    fn arm_ticks(&mut self) {
        let token = self.tokens.advance();
        self.scheduler.start_ticks(token);
    }

    fn enter_complete(&mut self) {
        let token = self.tokens.advance();
        self.scheduler.stop_ticks();
        self.session.complete();

        self.session.alerts_fired += 1;
        let report = self.alerts.dispatch(token, self.scheduler.as_mut());

        info!(
            session = %self.session.id,
            completions = self.session.completions,
            "Rest complete"
        );
        self.emit(RestEvent::Completed { report });

        let progress = self.alerts.flash_progress();
        self.session.flash_toggle_count = progress.toggles;
        if progress.toggles > 0 {
            self.emit(RestEvent::FlashToggled {
                inverted: progress.inverted,
            });
        }
    }

    fn close(&mut self, reason: &str) {
        self.tokens.advance();
        self.scheduler.cancel_all();
        self.alerts.cancel();
        self.resources.end();
        self.closed = true;

        info!(session = %self.session.id, reason, "Rest session closed");
        self.emit(RestEvent::Closed);
    }

    fn emit(&self, event: RestEvent) {
        if self.events.send(event).is_err() {
            trace!("Event receiver dropped");
        }
    }
}

impl std::fmt::Debug for TimerController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerController")
            .field("session", &self.session)
            .field("token", &self.tokens.current())
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
