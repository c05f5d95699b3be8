//! Shared harness replaying tick/edge timelines against the controller.
//!
//! Time is tracked in simulated milliseconds with the scheduler ticking
//! every 2 ms. When an edge lands exactly on a tick boundary the tick runs
//! first, modeling a timer interrupt that outranks the port interrupt.

#![allow(dead_code)]

use core::time::Duration;

use decoder_core::controller::{Controller, EdgeResponse};
use decoder_core::decoder::EdgePolarity;
use decoder_core::sequencer::{LineLevel, OutputLine, SequencerPolicy};
use decoder_core::telemetry::{TelemetryInstant, TelemetryRecorder};
use decoder_core::timing::TICK_INTERVAL_MS;

/// Millisecond timestamp used by the host-side suites.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct MsInstant(pub u64);

impl TelemetryInstant for MsInstant {
    fn saturating_duration_since(&self, earlier: Self) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

/// Line transition observed at a given millisecond.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LineEvent {
    pub at_ms: u64,
    pub line: OutputLine,
    pub level: LineLevel,
}

impl LineEvent {
    pub fn new(at_ms: u64, line: OutputLine, level: LineLevel) -> Self {
        Self { at_ms, line, level }
    }
}

pub struct Harness {
    pub controller: Controller,
    pub telemetry: TelemetryRecorder<MsInstant>,
    last_tick_ms: u64,
    /// Every line transition the tick handler asked for.
    pub lines: Vec<LineEvent>,
    /// Milliseconds at which a decode window expired.
    pub timeouts: Vec<u64>,
    /// Milliseconds at which a completed decode set the activation flag.
    pub activations: Vec<u64>,
    /// Milliseconds at which a gated burst finished.
    pub bursts_completed: Vec<u64>,
}

impl Harness {
    pub fn gated() -> Self {
        Self::with_policy(SequencerPolicy::GatedBurst)
    }

    pub fn with_policy(policy: SequencerPolicy) -> Self {
        Self {
            controller: Controller::new(policy),
            telemetry: TelemetryRecorder::new(),
            last_tick_ms: 0,
            lines: Vec::new(),
            timeouts: Vec::new(),
            activations: Vec::new(),
            bursts_completed: Vec::new(),
        }
    }

    /// Runs scheduler ticks up to and including `target_ms`.
    pub fn advance_to(&mut self, target_ms: u64) {
        while self.last_tick_ms + TICK_INTERVAL_MS <= target_ms {
            self.last_tick_ms += TICK_INTERVAL_MS;
            let now = MsInstant(self.last_tick_ms);
            let outcome = self.controller.on_tick(&mut self.telemetry, now);

            for command in outcome.commands {
                self.lines
                    .push(LineEvent::new(self.last_tick_ms, command.line, command.level));
            }
            if outcome.decode_timed_out {
                self.timeouts.push(self.last_tick_ms);
            }
            if outcome.burst_completed {
                self.bursts_completed.push(self.last_tick_ms);
            }
        }
    }

    /// Delivers an edge at `at_ms`, after any tick due at that instant.
    pub fn edge_at(&mut self, at_ms: u64, polarity: EdgePolarity) -> EdgeResponse {
        self.advance_to(at_ms);
        let response = self
            .controller
            .on_edge(polarity, &mut self.telemetry, MsInstant(at_ms));
        if response.activated {
            self.activations.push(at_ms);
        }
        response
    }

    /// Drives the canonical valid pattern with gaps of 100/100/50 ms,
    /// offset by `start_ms`, and returns the completion timestamp.
    pub fn decode_valid_pattern(&mut self, start_ms: u64) -> u64 {
        assert!(self.edge_at(start_ms, EdgePolarity::Falling).accepted);
        assert!(self.edge_at(start_ms + 100, EdgePolarity::Rising).accepted);
        assert!(self.edge_at(start_ms + 200, EdgePolarity::Falling).accepted);
        assert!(self.edge_at(start_ms + 250, EdgePolarity::Rising).accepted);
        start_ms + 250
    }
}
