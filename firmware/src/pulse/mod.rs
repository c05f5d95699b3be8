//! Shared controller cell and timestamp plumbing for the MCU build.
//!
//! The tick and edge tasks never touch the decoder state directly. Both go
//! through [`ControllerCell`], which serializes access behind a
//! critical-section mutex so a checkpoint observes the other handler's
//! writes only at well-defined boundaries.

// The host build compiles this module for the test suite only.
#![cfg_attr(not(target_os = "none"), allow(dead_code))]

use core::cell::RefCell;
use core::time::Duration;

use decoder_core::controller::{Controller, EdgeResponse, TickOutcome};
use decoder_core::decoder::EdgePolarity;
use decoder_core::sequencer::SequencerPolicy;
use decoder_core::telemetry::{TelemetryInstant, TelemetryRecorder};
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Instant;

/// Monotonic timestamp recorded alongside telemetry events.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct FirmwareInstant(Instant);

impl FirmwareInstant {
    #[cfg(target_os = "none")]
    pub fn now() -> Self {
        Self(Instant::now())
    }

    #[cfg(not(target_os = "none"))]
    pub const fn from_millis(ms: u64) -> Self {
        Self(Instant::from_millis(ms))
    }
}

impl TelemetryInstant for FirmwareInstant {
    fn saturating_duration_since(&self, earlier: Self) -> Duration {
        Duration::from_micros(self.0.saturating_duration_since(earlier.0).as_micros())
    }
}

/// Telemetry recorder specialized to the firmware timestamp.
pub type Recorder = TelemetryRecorder<FirmwareInstant>;

/// Raised by the tick task when the edge task must re-arm for a falling
/// edge after a timeout reset or a completed burst.
pub type RearmSignal = Signal<CriticalSectionRawMutex, ()>;

struct Shared {
    controller: Controller,
    telemetry: Recorder,
}

/// Controller state shared between the tick and edge tasks.
pub struct ControllerCell {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Shared>>,
}

impl ControllerCell {
    pub const fn new(policy: SequencerPolicy) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Shared {
                controller: Controller::new(policy),
                telemetry: Recorder::new(),
            })),
        }
    }

    /// Runs `f` with exclusive access to the controller and its telemetry.
    pub fn with<R>(&self, f: impl FnOnce(&mut Controller, &mut Recorder) -> R) -> R {
        self.inner.lock(|cell| {
            let shared = &mut *cell.borrow_mut();
            f(&mut shared.controller, &mut shared.telemetry)
        })
    }

    /// Runs the tick checkpoint.
    pub fn tick(&self, now: FirmwareInstant) -> TickOutcome {
        self.with(|controller, telemetry| controller.on_tick(telemetry, now))
    }

    /// Runs the edge checkpoint.
    pub fn edge(&self, polarity: EdgePolarity, now: FirmwareInstant) -> EdgeResponse {
        self.with(|controller, telemetry| controller.on_edge(polarity, telemetry, now))
    }

    /// Polarity the input trigger should be armed for, `None` while edge
    /// detection is disabled during a burst.
    pub fn armed_polarity(&self) -> Option<EdgePolarity> {
        self.with(|controller, _| controller.armed_polarity())
    }
}
