//! Foreground/background visibility notifications.
//!
//! Platforms force-release wake locks when the view leaves the foreground.
//! A [`ForegroundObserver`] reports those transitions through a callback so
//! the lock can be re-acquired when the user comes back.

use std::sync::{Arc, Mutex};

use tracing::debug;

use super::error::ResourceError;

/// Whether the overlay is currently visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Foreground,
    Background,
}

/// Callback invoked on every visibility transition.
pub type VisibilityCallback = Arc<dyn Fn(Visibility) + Send + Sync>;

/// Process-wide visibility notification source.
pub trait ForegroundObserver {
    /// Starts delivering transitions to `callback`.
    fn subscribe(&self, callback: VisibilityCallback) -> Result<(), ResourceError>;

    /// Stops delivering transitions.
    fn unsubscribe(&self);
}

impl<T: ForegroundObserver + ?Sized> ForegroundObserver for Arc<T> {
    fn subscribe(&self, callback: VisibilityCallback) -> Result<(), ResourceError> {
        (**self).subscribe(callback)
    }

    fn unsubscribe(&self) {
        (**self).unsubscribe()
    }
}

// ============================================================================
// SignalForegroundObserver
// ============================================================================

/// Terminal job-control observer.
///
/// A suspended job (`Ctrl-Z`) receives `SIGCONT` when it is brought back with
/// `fg`, which is reported as [`Visibility::Foreground`]. Requires a running
/// tokio runtime.
#[derive(Debug, Default)]
pub struct SignalForegroundObserver {
    task: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl SignalForegroundObserver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(unix)]
impl ForegroundObserver for SignalForegroundObserver {
    fn subscribe(&self, callback: VisibilityCallback) -> Result<(), ResourceError> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut resumed = signal(SignalKind::from_raw(libc::SIGCONT))
            .map_err(|e| ResourceError::ObserverUnavailable(e.to_string()))?;

        let task = tokio::spawn(async move {
            while resumed.recv().await.is_some() {
                debug!("SIGCONT received, back in foreground");
                callback(Visibility::Foreground);
            }
        });

        if let Some(previous) = self.task.lock().unwrap_or_else(|e| e.into_inner()).replace(task) {
            previous.abort();
        }
        Ok(())
    }

    fn unsubscribe(&self) {
        if let Some(task) = self.task.lock().unwrap_or_else(|e| e.into_inner()).take() {
            task.abort();
        }
    }
}

#[cfg(not(unix))]
impl ForegroundObserver for SignalForegroundObserver {
    fn subscribe(&self, _callback: VisibilityCallback) -> Result<(), ResourceError> {
        Err(ResourceError::ObserverUnavailable(
            "job control signals are unix-only".to_string(),
        ))
    }

    fn unsubscribe(&self) {}
}

// ============================================================================
// ManualForegroundObserver
// ============================================================================

/// Observer driven by hand, for tests and hosts with their own UI events.
#[derive(Default)]
pub struct ManualForegroundObserver {
    callback: Mutex<Option<VisibilityCallback>>,
    subscribe_calls: Mutex<usize>,
}

impl ManualForegroundObserver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers a transition to the current subscriber, if any.
    pub fn emit(&self, visibility: Visibility) {
        let callback = self.callback.lock().unwrap().clone();
        if let Some(callback) = callback {
            callback(visibility);
        }
    }

    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.callback.lock().unwrap().is_some()
    }

    #[must_use]
    pub fn subscribe_count(&self) -> usize {
        *self.subscribe_calls.lock().unwrap()
    }
}

impl ForegroundObserver for ManualForegroundObserver {
    fn subscribe(&self, callback: VisibilityCallback) -> Result<(), ResourceError> {
        *self.subscribe_calls.lock().unwrap() += 1;
        *self.callback.lock().unwrap() = Some(callback);
        Ok(())
    }

    fn unsubscribe(&self) {
        self.callback.lock().unwrap().take();
    }
}

impl std::fmt::Debug for ManualForegroundObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualForegroundObserver")
            .field("subscribed", &self.is_subscribed())
            .finish()
    }
}
