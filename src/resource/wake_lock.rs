//! Screen wake lock.
//!
//! A wake lock is an opaque platform handle that keeps the display awake
//! while held. The platform may revoke it at any time (typically when the
//! view leaves the foreground), so holders check [`WakeLockHandle::is_active`]
//! before trusting it. [`WakeLockGuard`] ties release to scope.

use std::io;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tracing::debug;

use super::error::ResourceError;

/// A live wake lock.
pub trait WakeLockHandle {
    /// Returns false once released or revoked by the platform.
    fn is_active(&mut self) -> bool;

    /// Releases the lock. Releasing an inactive lock is not an error.
    fn release(&mut self) -> Result<(), ResourceError>;
}

/// Source of wake locks.
pub trait WakeLockProvider {
    /// Requests a new wake lock.
    fn acquire(&self) -> Result<Box<dyn WakeLockHandle>, ResourceError>;
}

impl<T: WakeLockProvider + ?Sized> WakeLockProvider for Arc<T> {
    fn acquire(&self) -> Result<Box<dyn WakeLockHandle>, ResourceError> {
        (**self).acquire()
    }
}

// ============================================================================
// WakeLockGuard
// ============================================================================

/// Owns a wake lock handle and releases it when dropped.
pub struct WakeLockGuard {
    handle: Option<Box<dyn WakeLockHandle>>,
}

impl WakeLockGuard {
    pub fn new(handle: Box<dyn WakeLockHandle>) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    /// Returns true while the platform still honors the lock.
    pub fn is_active(&mut self) -> bool {
        self.handle.as_mut().is_some_and(|h| h.is_active())
    }

    /// Releases the lock now.
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            match handle.release() {
                Ok(()) => debug!("Wake lock released"),
                Err(e) => debug!("Wake lock release failed, ignoring: {}", e),
            }
        }
    }
}

impl Drop for WakeLockGuard {
    fn drop(&mut self) {
        self.release_inner();
    }
}

impl std::fmt::Debug for WakeLockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WakeLockGuard")
            .field("held", &self.handle.is_some())
            .finish()
    }
}

// ============================================================================
// InhibitorWakeLock
// ============================================================================

/// Desktop wake lock backed by an inhibitor child process.
///
/// - Linux: `systemd-inhibit --what=idle ... sleep infinity`
/// - macOS: `caffeinate -d`
///
/// The lock lasts as long as the child runs; release kills it.
#[derive(Debug, Clone)]
pub struct InhibitorWakeLock {
    reason: String,
}

impl InhibitorWakeLock {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// The command that holds the lock on this platform.
    fn command(&self) -> Option<Command> {
        if cfg!(target_os = "linux") {
            let mut cmd = Command::new("systemd-inhibit");
            cmd.arg("--what=idle")
                .arg("--who=rest-timer")
                .arg(format!("--why={}", self.reason))
                .arg("--mode=block")
                .arg("sleep")
                .arg("infinity");
            Some(cmd)
        } else if cfg!(target_os = "macos") {
            let mut cmd = Command::new("caffeinate");
            cmd.arg("-d");
            Some(cmd)
        } else {
            None
        }
    }
}

impl WakeLockProvider for InhibitorWakeLock {
    fn acquire(&self) -> Result<Box<dyn WakeLockHandle>, ResourceError> {
        let mut cmd = self.command().ok_or(ResourceError::WakeLockUnsupported)?;
        let mut child = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => ResourceError::WakeLockUnsupported,
                _ => ResourceError::WakeLockDenied(e.to_string()),
            })?;

        if let Ok(Some(status)) = child.try_wait() {
            return Err(ResourceError::WakeLockDenied(format!(
                "inhibitor exited immediately ({})",
                status
            )));
        }

        debug!(pid = child.id(), "Wake lock acquired");
        Ok(Box::new(InhibitorHandle { child: Some(child) }))
    }
}

struct InhibitorHandle {
    child: Option<Child>,
}

impl WakeLockHandle for InhibitorHandle {
    fn is_active(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    fn release(&mut self) -> Result<(), ResourceError> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        if let Err(e) = child.kill() {
            // Already exited
            if e.kind() != io::ErrorKind::InvalidInput {
                return Err(ResourceError::WakeLockRelease(e.to_string()));
            }
        }
        child
            .wait()
            .map_err(|e| ResourceError::WakeLockRelease(e.to_string()))?;
        Ok(())
    }
}

// ============================================================================
// MockWakeLock
// ============================================================================

/// Mock wake lock provider for testing.
#[derive(Debug, Default)]
pub struct MockWakeLock {
    handles: Mutex<Vec<Arc<AtomicBool>>>,
    acquire_calls: AtomicUsize,
    release_calls: Arc<AtomicUsize>,
    should_deny: AtomicBool,
}

impl MockWakeLock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_deny(&self, deny: bool) {
        self.should_deny.store(deny, Ordering::SeqCst);
    }

    /// Simulates the platform force-releasing every lock.
    pub fn revoke_all(&self) {
        for active in self.handles.lock().unwrap().iter() {
            active.store(false, Ordering::SeqCst);
        }
    }

    #[must_use]
    pub fn acquire_count(&self) -> usize {
        self.acquire_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn release_count(&self) -> usize {
        self.release_calls.load(Ordering::SeqCst)
    }

    /// Number of locks currently held.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.handles
            .lock()
            .unwrap()
            .iter()
            .filter(|active| active.load(Ordering::SeqCst))
            .count()
    }
}

impl WakeLockProvider for MockWakeLock {
    fn acquire(&self) -> Result<Box<dyn WakeLockHandle>, ResourceError> {
        self.acquire_calls.fetch_add(1, Ordering::SeqCst);
        if self.should_deny.load(Ordering::SeqCst) {
            return Err(ResourceError::WakeLockDenied("mock".to_string()));
        }

        let active = Arc::new(AtomicBool::new(true));
        self.handles.lock().unwrap().push(Arc::clone(&active));
        Ok(Box::new(MockHandle {
            active,
            release_calls: Arc::clone(&self.release_calls),
        }))
    }
}

struct MockHandle {
    active: Arc<AtomicBool>,
    release_calls: Arc<AtomicUsize>,
}

impl WakeLockHandle for MockHandle {
    fn is_active(&mut self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn release(&mut self) -> Result<(), ResourceError> {
        self.release_calls.fetch_add(1, Ordering::SeqCst);
        self.active.store(false, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_releases_on_drop() {
        let provider = MockWakeLock::new();
        {
            let mut guard = WakeLockGuard::new(provider.acquire().unwrap());
            assert!(guard.is_active());
            assert_eq!(provider.live_count(), 1);
        }
        assert_eq!(provider.live_count(), 0);
        assert_eq!(provider.release_count(), 1);
    }

    #[test]
    fn test_explicit_release_happens_once() {
        let provider = MockWakeLock::new();
        let guard = WakeLockGuard::new(provider.acquire().unwrap());
        guard.release();
        assert_eq!(provider.release_count(), 1);
    }

    #[test]
    fn test_revoked_guard_reports_inactive() {
        let provider = MockWakeLock::new();
        let mut guard = WakeLockGuard::new(provider.acquire().unwrap());

        provider.revoke_all();

        assert!(!guard.is_active());
    }

    #[test]
    fn test_denied_acquire() {
        let provider = MockWakeLock::new();
        provider.set_should_deny(true);

        let result = provider.acquire();
        assert!(matches!(result, Err(ResourceError::WakeLockDenied(_))));
        assert_eq!(provider.acquire_count(), 1);
        assert_eq!(provider.live_count(), 0);
    }

    #[test]
    fn test_inhibitor_graceful_degradation() {
        // The inhibitor binary may be missing in containers; either way the
        // result must be usable without panicking.
        let provider = InhibitorWakeLock::new("resting between sets");
        match provider.acquire() {
            Ok(handle) => WakeLockGuard::new(handle).release(),
            Err(e) => assert!(e.is_recoverable()),
        }
    }
}
