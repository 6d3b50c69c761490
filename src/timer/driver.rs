//! Async glue between the controller and its wakeup sources.

use tokio::sync::mpsc;
use tracing::debug;

use super::controller::TimerController;
use super::event::{RestEvent, UserAction, Wakeup};
use super::scheduler::TokioScheduler;
use crate::alert::{AlertCapabilities, AlertSubsystem, AudioDevice, FlashSurface, Haptics};
use crate::resource::{ForegroundObserver, ResourceLifecycleManager, WakeLockProvider};
use crate::types::{RestRequest, RestSession, RestTimerConfig};

/// Platform capabilities a session is built from.
pub struct Capabilities {
    /// Audio output, if any
    pub audio: Option<Box<dyn AudioDevice>>,
    /// Vibration, if any
    pub haptics: Option<Box<dyn Haptics>>,
    /// The overlay to flash
    pub flash: Box<dyn FlashSurface>,
    /// Wake lock provider, if any
    pub wake_lock: Option<Box<dyn WakeLockProvider>>,
    /// Visibility notifications
    pub observer: Box<dyn ForegroundObserver>,
}

/// Opens a rest session on the current tokio runtime.
///
/// The countdown starts immediately. Poll [`SessionDriver::run`] to make it
/// progress, send intents through the [`SessionHandle`] and read
/// [`RestEvent`]s from the returned receiver.
///
/// Must be called from within a tokio runtime; the driver is not `Send` and
/// is meant for a `current_thread` runtime or a `LocalSet`.
pub fn open(
    request: RestRequest,
    config: &RestTimerConfig,
    capabilities: Capabilities,
) -> (SessionDriver, SessionHandle, mpsc::UnboundedReceiver<RestEvent>) {
    let (wakeup_tx, wakeup_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let alerts = AlertSubsystem::new(
        config.alert.clone(),
        AlertCapabilities {
            audio: capabilities.audio,
            haptics: capabilities.haptics,
            flash: capabilities.flash,
        },
    );
    let wake_lock = if config.wake_lock {
        capabilities.wake_lock
    } else {
        None
    };
    let resources = ResourceLifecycleManager::new(wake_lock, capabilities.observer);
    let scheduler = TokioScheduler::new(wakeup_tx.clone());

    let controller = TimerController::start(
        request,
        config.extension_seconds,
        alerts,
        resources,
        Box::new(scheduler),
        wakeup_tx.clone(),
        event_tx,
    );

    let driver = SessionDriver {
        controller,
        wakeups: wakeup_rx,
    };
    let handle = SessionHandle { wakeups: wakeup_tx };
    (driver, handle, event_rx)
}

/// Owns the controller and feeds it wakeups.
#[derive(Debug)]
pub struct SessionDriver {
    controller: TimerController,
    wakeups: mpsc::UnboundedReceiver<Wakeup>,
}

impl SessionDriver {
    /// Runs the session until it closes and returns its final state.
    pub async fn run(mut self) -> RestSession {
        while !self.controller.is_closed() {
            match self.wakeups.recv().await {
                Some(wakeup) => self.controller.handle(wakeup),
                None => {
                    debug!("Wakeup channel closed, cancelling session");
                    let _ = self.controller.cancel();
                }
            }
        }
        self.controller.session().clone()
    }

    /// The controller, for inspection.
    pub fn controller(&self) -> &TimerController {
        &self.controller
    }
}

/// Caller-side sender of user intents.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    wakeups: mpsc::UnboundedSender<Wakeup>,
}

impl SessionHandle {
    /// Sends an intent. Returns false if the session has already finished.
    pub fn send(&self, action: UserAction) -> bool {
        self.wakeups.send(Wakeup::Action(action)).is_ok()
    }

    pub fn pause(&self) -> bool {
        self.send(UserAction::Pause)
    }

    pub fn resume(&self) -> bool {
        self.send(UserAction::Resume)
    }

    pub fn extend(&self) -> bool {
        self.send(UserAction::Extend)
    }

    pub fn acknowledge(&self) -> bool {
        self.send(UserAction::Acknowledge)
    }

    pub fn cancel(&self) -> bool {
        self.send(UserAction::Cancel)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::alert::{MockAudioDevice, MockFlashSurface, MockHaptics};
    use crate::resource::{ManualForegroundObserver, MockWakeLock};
    use crate::types::SessionState;

    fn capabilities(wake: &Arc<MockWakeLock>) -> Capabilities {
        Capabilities {
            audio: Some(Box::new(MockAudioDevice::new())),
            haptics: Some(Box::new(MockHaptics::new())),
            flash: Box::new(MockFlashSurface::new()),
            wake_lock: Some(Box::new(Arc::clone(wake))),
            observer: Box::new(ManualForegroundObserver::new()),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_counts_down_and_closes_on_acknowledge() {
        let wake = Arc::new(MockWakeLock::new());
        let (driver, handle, mut events) = open(
            RestRequest::new("Squat", 3),
            &RestTimerConfig::default(),
            capabilities(&wake),
        );

        let script = async {
            loop {
                match events.recv().await {
                    Some(RestEvent::Completed { .. }) => {
                        handle.acknowledge();
                    }
                    Some(RestEvent::Closed) | None => break,
                    Some(_) => {}
                }
            }
        };
        let (session, ()) = tokio::join!(driver.run(), script);

        assert_eq!(session.state, SessionState::Complete);
        assert_eq!(session.ticks_elapsed, 3);
        assert_eq!(wake.live_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wake_lock_disabled_in_config() {
        let wake = Arc::new(MockWakeLock::new());
        let config = RestTimerConfig {
            wake_lock: false,
            ..RestTimerConfig::default()
        };
        let (driver, handle, _events) =
            open(RestRequest::new("Squat", 60), &config, capabilities(&wake));

        assert_eq!(wake.acquire_count(), 0);
        handle.cancel();
        let session = driver.run().await;
        assert_eq!(session.remaining, 60);
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_after_close_reports_false() {
        let wake = Arc::new(MockWakeLock::new());
        let (driver, handle, _events) = open(
            RestRequest::new("Squat", 10),
            &RestTimerConfig::default(),
            capabilities(&wake),
        );

        handle.cancel();
        driver.run().await;
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(!handle.pause());
    }
}
