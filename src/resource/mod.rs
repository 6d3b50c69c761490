//! Screen wake lock lifecycle for a rest session.
//!
//! [`ResourceLifecycleManager`] is the only owner of the session's wake lock
//! and visibility subscription:
//!
//! - acquire at construction and on every resume
//! - re-acquire on return to the foreground while the countdown runs
//! - release on pause, cancel and acknowledge, and on drop
//!
//! A missing or refused wake lock is a degraded state, not an error: the
//! countdown and the alert never depend on it.

mod error;
mod foreground;
mod wake_lock;

pub use error::ResourceError;
pub use foreground::{
    ForegroundObserver, ManualForegroundObserver, SignalForegroundObserver, Visibility,
    VisibilityCallback,
};
pub use wake_lock::{
    InhibitorWakeLock, MockWakeLock, WakeLockGuard, WakeLockHandle, WakeLockProvider,
};

use tracing::{debug, info};

/// Keeps the display awake for the duration of an active rest interval.
pub struct ResourceLifecycleManager {
    provider: Option<Box<dyn WakeLockProvider>>,
    observer: Box<dyn ForegroundObserver>,
    guard: Option<WakeLockGuard>,
    visibility: Visibility,
    subscribed: bool,
}

impl ResourceLifecycleManager {
    /// Creates a manager. `provider` is `None` when wake locks are disabled.
    pub fn new(
        provider: Option<Box<dyn WakeLockProvider>>,
        observer: Box<dyn ForegroundObserver>,
    ) -> Self {
        Self {
            provider,
            observer,
            guard: None,
            visibility: Visibility::Foreground,
            subscribed: false,
        }
    }

    /// Subscribes to visibility changes and takes the first wake lock.
    pub fn begin(&mut self, on_visibility: VisibilityCallback) {
        match self.observer.subscribe(on_visibility) {
            Ok(()) => self.subscribed = true,
            Err(e) => debug!("Visibility notifications unavailable: {}", e),
        }
        self.acquire();
    }

    /// Takes a wake lock unless an active one is already held.
    pub fn acquire(&mut self) {
        if let Some(guard) = self.guard.as_mut() {
            if guard.is_active() {
                return;
            }
        }
        // Drop a lock the platform already revoked before asking again
        if let Some(stale) = self.guard.take() {
            stale.release();
        }

        let Some(provider) = &self.provider else {
            return;
        };
        match provider.acquire() {
            Ok(handle) => {
                self.guard = Some(WakeLockGuard::new(handle));
                debug!("Wake lock held");
            }
            Err(e) => debug!("Wake lock unavailable, continuing without: {}", e),
        }
    }

    /// Releases the wake lock if one is held.
    pub fn release(&mut self) {
        if let Some(guard) = self.guard.take() {
            guard.release();
        }
    }

    /// Handles a visibility transition.
    ///
    /// `running` is whether the countdown is currently running.
    pub fn on_visibility(&mut self, visibility: Visibility, running: bool) {
        self.visibility = visibility;
        if visibility == Visibility::Foreground && running {
            info!("Back in foreground, re-acquiring wake lock");
            self.acquire();
        }
    }

    /// Releases everything and stops listening for visibility changes.
    pub fn end(&mut self) {
        self.release();
        if self.subscribed {
            self.observer.unsubscribe();
            self.subscribed = false;
        }
    }

    /// Returns true if an active wake lock is held.
    pub fn holds_wake_lock(&mut self) -> bool {
        self.guard.as_mut().is_some_and(|g| g.is_active())
    }

    /// Last reported visibility.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }
}

impl Drop for ResourceLifecycleManager {
    fn drop(&mut self) {
        self.end();
    }
}

impl std::fmt::Debug for ResourceLifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceLifecycleManager")
            .field("wake_lock_enabled", &self.provider.is_some())
            .field("guard", &self.guard)
            .field("visibility", &self.visibility)
            .field("subscribed", &self.subscribed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn manager(
        wake: &Arc<MockWakeLock>,
        observer: &Arc<ManualForegroundObserver>,
    ) -> ResourceLifecycleManager {
        ResourceLifecycleManager::new(
            Some(Box::new(Arc::clone(wake))),
            Box::new(Arc::clone(observer)),
        )
    }

    fn noop() -> VisibilityCallback {
        Arc::new(|_| {})
    }

    #[test]
    fn test_begin_subscribes_and_acquires() {
        let wake = Arc::new(MockWakeLock::new());
        let observer = Arc::new(ManualForegroundObserver::new());
        let mut resources = manager(&wake, &observer);

        resources.begin(noop());

        assert!(observer.is_subscribed());
        assert!(resources.holds_wake_lock());
        assert_eq!(wake.live_count(), 1);
    }

    #[test]
    fn test_acquire_keeps_single_live_handle() {
        let wake = Arc::new(MockWakeLock::new());
        let observer = Arc::new(ManualForegroundObserver::new());
        let mut resources = manager(&wake, &observer);

        resources.begin(noop());
        resources.acquire();
        resources.acquire();

        assert_eq!(wake.acquire_count(), 1);
        assert_eq!(wake.live_count(), 1);
    }

    #[test]
    fn test_denied_wake_lock_is_swallowed() {
        let wake = Arc::new(MockWakeLock::new());
        wake.set_should_deny(true);
        let observer = Arc::new(ManualForegroundObserver::new());
        let mut resources = manager(&wake, &observer);

        resources.begin(noop());

        assert!(!resources.holds_wake_lock());
        resources.end();
    }

    #[test]
    fn test_foreground_reacquires_revoked_lock_while_running() {
        let wake = Arc::new(MockWakeLock::new());
        let observer = Arc::new(ManualForegroundObserver::new());
        let mut resources = manager(&wake, &observer);
        resources.begin(noop());

        resources.on_visibility(Visibility::Background, true);
        wake.revoke_all();
        assert!(!resources.holds_wake_lock());

        resources.on_visibility(Visibility::Foreground, true);

        assert!(resources.holds_wake_lock());
        assert_eq!(wake.acquire_count(), 2);
        assert_eq!(wake.live_count(), 1);
    }

    #[test]
    fn test_foreground_does_not_acquire_when_not_running() {
        let wake = Arc::new(MockWakeLock::new());
        let observer = Arc::new(ManualForegroundObserver::new());
        let mut resources = manager(&wake, &observer);
        resources.begin(noop());
        resources.release();

        resources.on_visibility(Visibility::Foreground, false);

        assert_eq!(wake.acquire_count(), 1);
        assert!(!resources.holds_wake_lock());
        assert_eq!(resources.visibility(), Visibility::Foreground);
    }

    #[test]
    fn test_end_releases_and_unsubscribes() {
        let wake = Arc::new(MockWakeLock::new());
        let observer = Arc::new(ManualForegroundObserver::new());
        let mut resources = manager(&wake, &observer);
        resources.begin(noop());

        resources.end();
        resources.end();

        assert_eq!(wake.live_count(), 0);
        assert_eq!(wake.release_count(), 1);
        assert!(!observer.is_subscribed());
    }

    #[test]
    fn test_drop_releases() {
        let wake = Arc::new(MockWakeLock::new());
        let observer = Arc::new(ManualForegroundObserver::new());
        {
            let mut resources = manager(&wake, &observer);
            resources.begin(noop());
        }
        assert_eq!(wake.live_count(), 0);
        assert!(!observer.is_subscribed());
    }

    #[test]
    fn test_disabled_wake_lock() {
        let observer = Arc::new(ManualForegroundObserver::new());
        let mut resources = ResourceLifecycleManager::new(None, Box::new(Arc::clone(&observer)));

        resources.begin(noop());

        assert!(!resources.holds_wake_lock());
        assert!(observer.is_subscribed());
    }
}
