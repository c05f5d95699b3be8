//! Shared countdown bounding each decode window.
//!
//! A single counter serves every window: the edge handler re-arms it each
//! time the decoder advances, and the tick handler decrements it. Expiry is
//! the transition to zero; an already-idle counter stays silent, so a stale
//! countdown fires at most once.

use crate::timing::WindowTicks;

/// What the countdown did during one scheduler tick.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CountdownStep {
    /// Counter was already zero.
    Idle,
    /// Counter decremented without reaching zero.
    Running,
    /// Counter reached zero on this tick.
    Expired,
}

/// Tick-driven countdown used to bound decode windows.
#[derive(Debug)]
pub struct TimeoutMonitor {
    remaining: WindowTicks,
}

impl TimeoutMonitor {
    /// Creates an idle countdown.
    #[must_use]
    pub const fn new() -> Self {
        Self { remaining: 0 }
    }

    /// Arms the countdown with a fresh window, replacing any residue.
    pub fn arm(&mut self, window: WindowTicks) {
        self.remaining = window;
    }

    /// Ticks remaining before expiry; zero while idle.
    #[must_use]
    pub const fn remaining(&self) -> WindowTicks {
        self.remaining
    }

    /// Advances the countdown by one scheduler tick.
    pub fn tick(&mut self) -> CountdownStep {
        match self.remaining {
            0 => CountdownStep::Idle,
            1 => {
                self.remaining = 0;
                CountdownStep::Expired
            }
            _ => {
                self.remaining -= 1;
                CountdownStep::Running
            }
        }
    }
}

impl Default for TimeoutMonitor {
    fn default() -> Self {
        Self::new()
    }
}
