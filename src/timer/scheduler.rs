//! Tick and flash scheduling.
//!
//! The controller never waits on time itself. It asks a [`Scheduler`] to
//! deliver [`Wakeup::Tick`] and [`Wakeup::Flash`] messages later, stamped with
//! an [`AlertToken`], and ignores any that arrive stale.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::trace;

use super::event::Wakeup;
use super::token::AlertToken;
use crate::types::TICK_INTERVAL;

/// Source of delayed wakeups.
pub trait Scheduler {
    /// Installs a fresh one-second tick source.
    ///
    /// Any previous tick source is torn down first.
    fn start_ticks(&mut self, token: AlertToken);

    /// Tears down the tick source.
    fn stop_ticks(&mut self);

    /// Delivers one flash wakeup after `delay`.
    fn schedule_flash(&mut self, token: AlertToken, delay: Duration);

    /// Tears down everything.
    fn cancel_all(&mut self);
}

// ============================================================================
// TokioScheduler
// ============================================================================

/// Scheduler backed by tokio tasks posting into the session's wakeup channel.
#[derive(Debug)]
pub struct TokioScheduler {
    wakeups: mpsc::UnboundedSender<Wakeup>,
    ticks: Option<JoinHandle<()>>,
    flashes: Vec<JoinHandle<()>>,
}

impl TokioScheduler {
    pub fn new(wakeups: mpsc::UnboundedSender<Wakeup>) -> Self {
        Self {
            wakeups,
            ticks: None,
            flashes: Vec::new(),
        }
    }
}

impl Scheduler for TokioScheduler {
    fn start_ticks(&mut self, token: AlertToken) {
        self.stop_ticks();

        let tx = self.wakeups.clone();
        self.ticks = Some(tokio::spawn(async move {
            let mut ticker = interval(TICK_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if tx.send(Wakeup::Tick(token)).is_err() {
                    break;
                }
            }
        }));
        trace!(generation = token.generation(), "Tick source installed");
    }

    fn stop_ticks(&mut self) {
        if let Some(handle) = self.ticks.take() {
            handle.abort();
        }
    }

    fn schedule_flash(&mut self, token: AlertToken, delay: Duration) {
        self.flashes.retain(|handle| !handle.is_finished());

        let tx = self.wakeups.clone();
        self.flashes.push(tokio::spawn(async move {
            sleep(delay).await;
            let _ = tx.send(Wakeup::Flash(token));
        }));
    }

    fn cancel_all(&mut self) {
        self.stop_ticks();
        for handle in self.flashes.drain(..) {
            handle.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

// ============================================================================
// ManualScheduler
// ============================================================================

#[derive(Debug, Default)]
struct ManualState {
    ticks: Option<AlertToken>,
    tick_sources: usize,
    flashes: VecDeque<(AlertToken, Duration)>,
    cancels: usize,
}

/// Scheduler that only records requests, for deterministic tests.
///
/// Clones share state, so a test can keep one clone while the controller
/// owns another.
#[derive(Debug, Default, Clone)]
pub struct ManualScheduler {
    state: Rc<RefCell<ManualState>>,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Token of the installed tick source, if any.
    #[must_use]
    pub fn armed_tick(&self) -> Option<AlertToken> {
        self.state.borrow().ticks
    }

    /// How many tick sources have been installed.
    #[must_use]
    pub fn tick_sources_installed(&self) -> usize {
        self.state.borrow().tick_sources
    }

    /// Pops the oldest pending flash.
    pub fn take_flash(&self) -> Option<(AlertToken, Duration)> {
        self.state.borrow_mut().flashes.pop_front()
    }

    #[must_use]
    pub fn pending_flashes(&self) -> usize {
        self.state.borrow().flashes.len()
    }

    #[must_use]
    pub fn cancel_count(&self) -> usize {
        self.state.borrow().cancels
    }
}

impl Scheduler for ManualScheduler {
    fn start_ticks(&mut self, token: AlertToken) {
        let mut state = self.state.borrow_mut();
        state.ticks = Some(token);
        state.tick_sources += 1;
    }

    fn stop_ticks(&mut self) {
        self.state.borrow_mut().ticks = None;
    }

    fn schedule_flash(&mut self, token: AlertToken, delay: Duration) {
        self.state.borrow_mut().flashes.push_back((token, delay));
    }

    fn cancel_all(&mut self) {
        let mut state = self.state.borrow_mut();
        state.ticks = None;
        state.flashes.clear();
        state.cancels += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::TokenSource;

    mod manual_tests {
        use super::*;

        #[test]
        fn test_records_tick_source() {
            let mut scheduler = ManualScheduler::new();
            let token = TokenSource::new().advance();

            scheduler.start_ticks(token);
            assert_eq!(scheduler.armed_tick(), Some(token));
            assert_eq!(scheduler.tick_sources_installed(), 1);

            scheduler.stop_ticks();
            assert_eq!(scheduler.armed_tick(), None);
        }

        #[test]
        fn test_cancel_all_clears_flashes() {
            let mut scheduler = ManualScheduler::new();
            let token = TokenSource::new().advance();

            scheduler.schedule_flash(token, Duration::from_millis(150));
            scheduler.schedule_flash(token, Duration::from_millis(150));
            assert_eq!(scheduler.pending_flashes(), 2);

            scheduler.cancel_all();
            assert_eq!(scheduler.pending_flashes(), 0);
            assert_eq!(scheduler.cancel_count(), 1);
        }

        #[test]
        fn test_clones_share_state() {
            let scheduler = ManualScheduler::new();
            let mut owned = scheduler.clone();
            owned.start_ticks(TokenSource::new().advance());
            assert!(scheduler.armed_tick().is_some());
        }
    }

    mod tokio_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_ticks_once_per_second() {
            let (tx, mut rx) = mpsc::unbounded_channel();
            let mut scheduler = TokioScheduler::new(tx);
            let token = TokenSource::new().advance();

            scheduler.start_ticks(token);

            for _ in 0..3 {
                let before = tokio::time::Instant::now();
                assert_eq!(rx.recv().await, Some(Wakeup::Tick(token)));
                assert_eq!(before.elapsed(), Duration::from_secs(1));
            }
            scheduler.cancel_all();
        }

        #[tokio::test(start_paused = true)]
        async fn test_stop_ticks_silences_source() {
            let (tx, mut rx) = mpsc::unbounded_channel();
            let mut scheduler = TokioScheduler::new(tx);

            scheduler.start_ticks(TokenSource::new().advance());
            scheduler.stop_ticks();
            tokio::time::sleep(Duration::from_secs(5)).await;

            assert!(rx.try_recv().is_err());
        }

        #[tokio::test(start_paused = true)]
        async fn test_flash_after_delay() {
            let (tx, mut rx) = mpsc::unbounded_channel();
            let mut scheduler = TokioScheduler::new(tx);
            let token = TokenSource::new().advance();

            let before = tokio::time::Instant::now();
            scheduler.schedule_flash(token, Duration::from_millis(150));

            assert_eq!(rx.recv().await, Some(Wakeup::Flash(token)));
            assert_eq!(before.elapsed(), Duration::from_millis(150));
        }
    }
}
