//! [`ModeState`] – the shared behavior flags.
//!
//! One instance lives for the process lifetime and is shared by the
//! dispatcher and every behavior loop. The six flags sit behind a single
//! mutex whose critical sections are exactly one read or one write; the
//! lock is never held across a sleep or an actuation call.
//!
//! Deliberately, that is *all* the synchronization there is: flags are
//! individually consistent, but nothing serializes the behaviors gated on
//! them. `patrol_mode` and `dance` may both be true at once and their loops
//! will interleave motor commands — the actuator's last-write-wins
//! semantics arbitrate, not this type.

use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy)]
struct Flags {
    heel_mode: bool,
    patrol_mode: bool,
    dance: bool,
    sitting: bool,
    tempo_active: bool,
    eyes_on: bool,
}

/// Read-only copy of all six flags at one lock acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeSnapshot {
    pub heel_mode: bool,
    pub patrol_mode: bool,
    pub dance: bool,
    pub sitting: bool,
    pub tempo_active: bool,
    pub eyes_on: bool,
}

/// The shared mode record. Share via `Arc`.
pub struct ModeState {
    flags: Mutex<Flags>,
}

impl ModeState {
    /// All behaviors off; the eye animation starts enabled.
    pub fn new() -> Self {
        Self {
            flags: Mutex::new(Flags {
                heel_mode: false,
                patrol_mode: false,
                dance: false,
                sitting: false,
                tempo_active: false,
                eyes_on: true,
            }),
        }
    }

    // The flags remain plain booleans even if a holder panicked, so a
    // poisoned lock is safe to recover.
    fn lock(&self) -> MutexGuard<'_, Flags> {
        self.flags.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn heel_mode(&self) -> bool {
        self.lock().heel_mode
    }

    pub fn set_heel_mode(&self, on: bool) {
        self.lock().heel_mode = on;
    }

    pub fn patrol_mode(&self) -> bool {
        self.lock().patrol_mode
    }

    pub fn set_patrol_mode(&self, on: bool) {
        self.lock().patrol_mode = on;
    }

    pub fn dance(&self) -> bool {
        self.lock().dance
    }

    pub fn set_dance(&self, on: bool) {
        self.lock().dance = on;
    }

    pub fn sitting(&self) -> bool {
        self.lock().sitting
    }

    pub fn set_sitting(&self, on: bool) {
        self.lock().sitting = on;
    }

    pub fn tempo_active(&self) -> bool {
        self.lock().tempo_active
    }

    pub fn set_tempo_active(&self, on: bool) {
        self.lock().tempo_active = on;
    }

    pub fn eyes_on(&self) -> bool {
        self.lock().eyes_on
    }

    pub fn set_eyes_on(&self, on: bool) {
        self.lock().eyes_on = on;
    }

    /// All six flags under one lock acquisition.
    pub fn snapshot(&self) -> ModeSnapshot {
        let flags = self.lock();
        ModeSnapshot {
            heel_mode: flags.heel_mode,
            patrol_mode: flags.patrol_mode,
            dance: flags.dance,
            sitting: flags.sitting,
            tempo_active: flags.tempo_active,
            eyes_on: flags.eyes_on,
        }
    }
}

impl Default for ModeState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn initial_state_has_only_eyes_on() {
        let mode = ModeState::new();
        let snap = mode.snapshot();
        assert!(snap.eyes_on);
        assert!(!snap.heel_mode);
        assert!(!snap.patrol_mode);
        assert!(!snap.dance);
        assert!(!snap.sitting);
        assert!(!snap.tempo_active);
    }

    #[test]
    fn flags_are_independent() {
        let mode = ModeState::new();
        mode.set_heel_mode(true);
        mode.set_dance(true);
        assert!(mode.heel_mode());
        assert!(mode.dance());
        mode.set_heel_mode(false);
        assert!(!mode.heel_mode());
        assert!(mode.dance());
    }

    #[test]
    fn patrol_and_dance_may_be_true_simultaneously() {
        // No exclusivity is enforced between behaviors; both loops may run
        // and race at the actuator. This is load-bearing, not an oversight.
        let mode = ModeState::new();
        mode.set_patrol_mode(true);
        mode.set_dance(true);
        let snap = mode.snapshot();
        assert!(snap.patrol_mode && snap.dance);
    }

    #[test]
    fn concurrent_writers_do_not_lose_unrelated_flags() {
        let mode = Arc::new(ModeState::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let mode = Arc::clone(&mode);
            handles.push(std::thread::spawn(move || {
                for _ in 0..500 {
                    mode.set_heel_mode(true);
                    mode.set_dance(true);
                }
            }));
        }
        for handle in handles {
            handle.join().expect("writer thread");
        }
        assert!(mode.heel_mode());
        assert!(mode.dance());
        // eyes_on was never touched by the writers.
        assert!(mode.eyes_on());
    }
}
