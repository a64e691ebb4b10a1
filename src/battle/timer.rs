//! Response countdown
//!
//! Expiry is a delayed task aimed at an absolute deadline; a separate interval
//! reports the remaining time for display. Cancel and expire race through a
//! single atomic state, so exactly one of them wins.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::AbortHandle;
use tokio::time::{interval, sleep_until, Instant, MissedTickBehavior};

const RUNNING: u8 = 0;
const CANCELLED: u8 = 1;
const EXPIRED: u8 = 2;

/// Handle to one running countdown
#[derive(Debug, Clone)]
pub struct TimerHandle {
    state: Arc<AtomicU8>,
    task: AbortHandle,
}

impl TimerHandle {
    /// Stop ticking and expiry. Returns true if this call stopped a running timer;
    /// calling again or after expiry does nothing.
    pub fn cancel(&self) -> bool {
        let stopped = self
            .state
            .compare_exchange(RUNNING, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if stopped {
            self.task.abort();
        }
        stopped
    }

    pub fn is_running(&self) -> bool {
        self.state.load(Ordering::Acquire) == RUNNING
    }

    pub fn has_expired(&self) -> bool {
        self.state.load(Ordering::Acquire) == EXPIRED
    }
}

/// Owner of at most one live countdown
#[derive(Debug)]
pub struct ResponseTimer {
    tick_interval: Duration,
    active: Option<TimerHandle>,
}

impl ResponseTimer {
    pub fn new(tick_interval: Duration) -> Self {
        Self {
            tick_interval,
            active: None,
        }
    }

    /// Start a countdown, cancelling any previous one owned by this timer.
    ///
    /// `on_tick` receives the remaining time every tick interval; `on_expire`
    /// runs exactly once when the deadline passes, unless cancelled first.
    /// Must be called from within a tokio runtime.
    pub fn start<T, E>(&mut self, duration: Duration, on_tick: T, on_expire: E) -> TimerHandle
    where
        T: Fn(Duration) + Send + 'static,
        E: FnOnce() + Send + 'static,
    {
        self.cancel();

        let state = Arc::new(AtomicU8::new(RUNNING));
        let deadline = Instant::now() + duration;
        let tick_every = self.tick_interval;
        let task_state = state.clone();

        let task = tokio::spawn(async move {
            let expiry = sleep_until(deadline);
            tokio::pin!(expiry);

            let mut ticker = interval(tick_every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // first tick completes immediately; the caller already knows the full duration
            ticker.tick().await;

            loop {
                tokio::select! {
                    biased;
                    _ = &mut expiry => break,
                    _ = ticker.tick() => {
                        let remaining = deadline.saturating_duration_since(Instant::now());
                        if remaining.is_zero() {
                            break;
                        }
                        if task_state.load(Ordering::Acquire) != RUNNING {
                            return;
                        }
                        on_tick(remaining);
                    }
                }
            }

            if task_state
                .compare_exchange(RUNNING, EXPIRED, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                on_tick(Duration::ZERO);
                on_expire();
            }
        });

        let handle = TimerHandle {
            state,
            task: task.abort_handle(),
        };
        self.active = Some(handle.clone());
        handle
    }

    /// Cancel the live countdown, if any. Safe to call repeatedly.
    pub fn cancel(&mut self) -> bool {
        self.active.take().map_or(false, |handle| handle.cancel())
    }

    pub fn is_active(&self) -> bool {
        self.active.as_ref().map_or(false, TimerHandle::is_running)
    }
}
