//! [`Watchdog`] – behavior-loop health monitor.
//!
//! Every behavior loop calls [`Watchdog::heartbeat`] at the top of each
//! iteration. The watchdog tracks the timestamp of each heartbeat and
//! considers a loop *frozen* once its deadline is exceeded — which is what
//! a loop that died on a collaborator fault looks like from the outside.
//! Loop failures are isolated by design: a frozen entry here never affects
//! the sibling loops, it only makes the condition observable (e.g. via the
//! console `/state` command).

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Health state reported for a single loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopHealth {
    /// The loop has sent a heartbeat within its deadline.
    Healthy,
    /// The loop has not sent a heartbeat within its deadline.
    TimedOut,
}

struct LoopEntry {
    last_heartbeat: Instant,
    timeout: Duration,
}

/// Tracks heartbeats from the behavior loops and detects frozen ones.
///
/// All methods take `&self`: the watchdog is shared as an `Arc` across
/// concurrently running loops.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use pupos_runtime::watchdog::{LoopHealth, Watchdog};
///
/// let wd = Watchdog::new();
/// wd.register("heel", Duration::from_secs(5));
/// wd.heartbeat("heel");
///
/// assert_eq!(wd.health("heel"), LoopHealth::Healthy);
/// ```
#[derive(Default)]
pub struct Watchdog {
    loops: Mutex<HashMap<String, LoopEntry>>,
}

impl Watchdog {
    /// Create an empty watchdog with no registered loops.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, LoopEntry>> {
        self.loops.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `loop_id` with a maximum heartbeat `timeout`.
    ///
    /// The last-heartbeat timestamp is initialised to now, so the loop
    /// starts out [`LoopHealth::Healthy`]. Re-registering resets the
    /// deadline.
    pub fn register(&self, loop_id: &str, timeout: Duration) {
        self.lock().insert(
            loop_id.to_string(),
            LoopEntry {
                last_heartbeat: Instant::now(),
                timeout,
            },
        );
    }

    /// Record a heartbeat for `loop_id`, resetting its deadline.
    ///
    /// No-ops for loops that have not been registered.
    pub fn heartbeat(&self, loop_id: &str) {
        if let Some(entry) = self.lock().get_mut(loop_id) {
            entry.last_heartbeat = Instant::now();
        }
    }

    /// Return the [`LoopHealth`] of `loop_id`.
    ///
    /// Returns [`LoopHealth::TimedOut`] for unknown loops.
    pub fn health(&self, loop_id: &str) -> LoopHealth {
        match self.lock().get(loop_id) {
            Some(entry) if entry.last_heartbeat.elapsed() <= entry.timeout => LoopHealth::Healthy,
            _ => LoopHealth::TimedOut,
        }
    }

    /// Health of every registered loop, sorted by id.
    pub fn statuses(&self) -> Vec<(String, LoopHealth)> {
        let guard = self.lock();
        let mut statuses: Vec<(String, LoopHealth)> = guard
            .iter()
            .map(|(id, entry)| {
                let health = if entry.last_heartbeat.elapsed() <= entry.timeout {
                    LoopHealth::Healthy
                } else {
                    LoopHealth::TimedOut
                };
                (id.clone(), health)
            })
            .collect();
        statuses.sort_by(|a, b| a.0.cmp(&b.0));
        statuses
    }
}
