//! Concurrency and rate throttle with FIFO admission.
//!
//! A [`ConcurrencyLimiter`] admits at most `max_concurrent` tasks at once.
//! Callers beyond that wait in a queue and are admitted strictly in arrival
//! order. After a task finishes, successfully or not, its slot stays held for
//! `min_spacing` before being handed to the next waiter. This throttles the
//! call *rate* as well as the parallelism.
//!
//! Freed slots are handed directly to the head of the queue rather than
//! returned to a pool, so a late arrival can never overtake a waiter.
//!
//! Neither waiting nor running has a timeout. Dropping the future returned by
//! [`ConcurrencyLimiter::run`] is the only way to give up; the limiter's
//! bookkeeping survives that at any point.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use pipeline::PolicyError;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::trace;

/// Snapshot of a limiter's bounds and load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LimiterStatus {
    /// Slots currently held, including slots in their post-task spacing.
    pub running: usize,
    /// Callers waiting for a slot.
    pub queued: usize,
    /// Configured slot count.
    pub max_concurrent: usize,
    /// Configured post-task spacing, in milliseconds.
    pub min_spacing_ms: u64,
}

/// Serialisable form of the limiter bounds as they appear in configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LimiterSettings {
    /// Maximum simultaneously admitted tasks.
    pub max_concurrent: usize,
    /// Delay after each task before its slot is released, in milliseconds.
    pub min_spacing_ms: u64,
}

struct Waiter {
    id: u64,
    wake: oneshot::Sender<()>,
}

#[derive(Default)]
struct LimiterState {
    running: usize,
    waiters: VecDeque<Waiter>,
    next_waiter_id: u64,
}

impl LimiterState {
    /// Passes a freed slot to the oldest live waiter, or returns it.
    fn release_slot(&mut self) {
        while let Some(waiter) = self.waiters.pop_front() {
            if waiter.wake.send(()).is_ok() {
                return;
            }
        }
        self.running -= 1;
    }
}

/// Bounds simultaneous tasks and spaces out their completions.
pub struct ConcurrencyLimiter {
    max_concurrent: usize,
    min_spacing: Duration,
    state: Mutex<LimiterState>,
}

impl ConcurrencyLimiter {
    /// Creates a limiter. `max_concurrent` must be at least 1.
    pub fn new(max_concurrent: usize, min_spacing: Duration) -> Result<Self, PolicyError> {
        if max_concurrent == 0 {
            return Err(PolicyError::ZeroConcurrency);
        }
        Ok(Self {
            max_concurrent,
            min_spacing,
            state: Mutex::new(LimiterState::default()),
        })
    }

    /// Runs `task` once a slot is free and returns its output unchanged.
    ///
    /// The slot is released `min_spacing` after `task` completes, or
    /// immediately if this future is dropped.
    pub async fn run<F>(&self, task: F) -> F::Output
    where
        F: Future,
    {
        let _slot = self.acquire().await;
        let output = task.await;
        if !self.min_spacing.is_zero() {
            tokio::time::sleep(self.min_spacing).await;
        }
        output
    }

    /// Current load.
    pub fn status(&self) -> LimiterStatus {
        let state = self.lock();
        LimiterStatus {
            running: state.running,
            queued: state.waiters.len(),
            max_concurrent: self.max_concurrent,
            min_spacing_ms: self.min_spacing.as_millis() as u64,
        }
    }

    async fn acquire(&self) -> Slot<'_> {
        let mut queued = {
            let mut state = self.lock();
            if state.running < self.max_concurrent && state.waiters.is_empty() {
                state.running += 1;
                return Slot { limiter: self };
            }

            let (wake, rx) = oneshot::channel();
            let id = state.next_waiter_id;
            state.next_waiter_id += 1;
            state.waiters.push_back(Waiter { id, wake });
            trace!(id, queued = state.waiters.len(), "waiting for limiter slot");
            Queued {
                limiter: self,
                id,
                rx,
                admitted: false,
            }
        };

        // A queued sender is only ever consumed by a hand-off, and `Queued`
        // leaves the queue before its receiver drops, so this resolves Ok.
        let _ = (&mut queued.rx).await;
        queued.admitted = true;
        Slot { limiter: self }
    }

    fn lock(&self) -> MutexGuard<'_, LimiterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TryFrom<LimiterSettings> for ConcurrencyLimiter {
    type Error = PolicyError;

    fn try_from(s: LimiterSettings) -> Result<Self, Self::Error> {
        ConcurrencyLimiter::new(s.max_concurrent, Duration::from_millis(s.min_spacing_ms))
    }
}

/// A held slot; released on drop.
struct Slot<'a> {
    limiter: &'a ConcurrencyLimiter,
}

impl Drop for Slot<'_> {
    fn drop(&mut self) {
        self.limiter.lock().release_slot();
    }
}

/// A caller parked in the wait queue.
struct Queued<'a> {
    limiter: &'a ConcurrencyLimiter,
    id: u64,
    rx: oneshot::Receiver<()>,
    admitted: bool,
}

impl Drop for Queued<'_> {
    fn drop(&mut self) {
        if self.admitted {
            return;
        }
        let mut state = self.limiter.lock();
        match state.waiters.iter().position(|w| w.id == self.id) {
            Some(pos) => {
                state.waiters.remove(pos);
            }
            // Already handed a slot that will never be used: pass it on.
            None => state.release_slot(),
        }
    }
}
