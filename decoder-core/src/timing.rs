//! Timing constants for the decode protocol and the output burst.
//!
//! A 2 ms scheduler tick drives everything: a short/long/short run of
//! decode windows, and a four-phase burst lasting one tick per phase.
//! Window widths are kept both as durations
//! (for host simulation and transcripts) and as tick counts (what the
//! timeout monitor actually consumes).

use core::time::Duration;

/// Scheduler tick interval in milliseconds.
pub const TICK_INTERVAL_MS: u64 = 2;

/// Interval between scheduler ticks; the system's only time base.
pub const TICK_INTERVAL: Duration = Duration::from_millis(TICK_INTERVAL_MS);

/// Maximum permitted duration of each short (low) lobe of the input signal.
pub const SHORT_LOBE_WINDOW: Duration = Duration::from_millis(120);

/// Maximum permitted duration of the long (high) lobe between the two pulses.
pub const LONG_LOBE_WINDOW: Duration = Duration::from_millis(450);

/// Decode window width expressed in scheduler ticks.
pub type WindowTicks = u16;

/// Short lobe window in ticks (120 ms at the 2 ms tick).
pub const SHORT_LOBE_TICKS: WindowTicks = ticks_for(SHORT_LOBE_WINDOW);

/// Long lobe window in ticks (450 ms at the 2 ms tick).
pub const LONG_LOBE_TICKS: WindowTicks = ticks_for(LONG_LOBE_WINDOW);

/// Number of phases in a gated output burst.
pub const BURST_PHASES: usize = 4;

/// Total duration of a gated burst, one phase per tick.
pub const BURST_DURATION: Duration =
    Duration::from_millis(TICK_INTERVAL_MS * BURST_PHASES as u64);

/// Converts a window duration into whole scheduler ticks.
#[must_use]
pub const fn ticks_for(window: Duration) -> WindowTicks {
    (window.as_millis() / TICK_INTERVAL.as_millis()) as WindowTicks
}
