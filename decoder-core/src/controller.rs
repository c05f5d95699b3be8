//! Interrupt-shared controller state and its two handler checkpoints.
//!
//! All cross-handler coordination happens through this single state holder.
//! No component calls another directly: the edge handler advances the
//! decoder and arms the countdown, and the tick handler inspects the shared
//! fields at the start of its next invocation. Field ownership:
//!
//! * `decoder` — advanced by the edge handler; the tick handler touches it
//!   only through the timeout reset and the burst-completion re-arm.
//! * `countdown` — armed by the edge handler, decremented by the tick
//!   handler.
//! * `activation` — set by the edge handler on a completed decode, cleared
//!   by the tick handler when the burst finishes.
//! * `sequencer` — advanced only by the tick handler.
//!
//! Exactly one of {decoder listening, sequencer running} holds at any time
//! under the gated policy. Callers serialize the two handlers against each
//! other: the firmware wraps this struct in a critical-section mutex, while
//! the tests and the emulator are single-threaded.

use crate::decoder::{DecodeState, EdgeOutcome, EdgePolarity, PulseDecoder};
use crate::sequencer::{
    LineCommand, LineLevel, OutputLine, OutputSequencer, SequencePhase, SequencerPolicy,
};
use crate::telemetry::{TelemetryInstant, TelemetryRecorder};
use crate::timeout::{CountdownStep, TimeoutMonitor};
use crate::timing::WindowTicks;

/// Abstraction over the physical output lines.
pub trait LineDriver {
    /// Drives one line to the requested level.
    fn drive(&mut self, line: OutputLine, level: LineLevel);

    /// Returns every line to its idle (high) level.
    fn set_all_idle(&mut self);
}

/// Line driver that performs no hardware interaction.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopLineDriver;

impl NoopLineDriver {
    /// Creates a new no-op line driver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl LineDriver for NoopLineDriver {
    fn drive(&mut self, _: OutputLine, _: LineLevel) {}

    fn set_all_idle(&mut self) {}
}

/// Effects of one tick checkpoint, applied by the caller after the shared
/// state has been released.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TickOutcome {
    /// Line transitions for this tick's phase, in application order; empty
    /// when the sequencer did not run.
    pub commands: &'static [LineCommand],
    /// An incomplete decode ran out of its window on this tick; the decoder
    /// reset to idle and the input must re-arm for a falling edge.
    pub decode_timed_out: bool,
    /// The final burst phase completed: the activation flag cleared, edge
    /// detection re-armed for a falling edge, and any edge indication that
    /// latched during the burst must be discarded.
    pub burst_completed: bool,
}

impl TickOutcome {
    const fn quiet() -> Self {
        Self {
            commands: &[],
            decode_timed_out: false,
            burst_completed: false,
        }
    }

    /// Returns `true` when the input trigger needs re-arming for a falling
    /// edge, for either reason.
    #[must_use]
    pub const fn rearms_input(&self) -> bool {
        self.decode_timed_out || self.burst_completed
    }
}

/// Effects of one edge checkpoint.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EdgeResponse {
    /// Whether the edge advanced the decoder.
    pub accepted: bool,
    /// Polarity to re-arm the input trigger with, when it changed.
    pub rearm: Option<EdgePolarity>,
    /// The edge completed the pattern: the burst starts on the next tick
    /// and edge detection stays disabled until it finishes.
    pub activated: bool,
}

impl EdgeResponse {
    const fn ignored() -> Self {
        Self {
            accepted: false,
            rearm: None,
            activated: false,
        }
    }
}

/// Single state holder shared by the tick and edge handlers.
#[derive(Debug)]
pub struct Controller {
    decoder: PulseDecoder,
    countdown: TimeoutMonitor,
    sequencer: OutputSequencer,
    activation: bool,
}

impl Controller {
    /// Creates a controller in the decode-ready state.
    #[must_use]
    pub const fn new(policy: SequencerPolicy) -> Self {
        Self {
            decoder: PulseDecoder::new(),
            countdown: TimeoutMonitor::new(),
            sequencer: OutputSequencer::new(policy),
            activation: false,
        }
    }

    /// Current decoder position.
    #[must_use]
    pub const fn decode_state(&self) -> DecodeState {
        self.decoder.state()
    }

    /// Phase the sequencer will apply on its next tick.
    #[must_use]
    pub const fn phase(&self) -> SequencePhase {
        self.sequencer.phase()
    }

    /// Whether a completed decode is awaiting or driving a burst.
    #[must_use]
    pub const fn activation(&self) -> bool {
        self.activation
    }

    /// Polarity the input trigger should currently be armed for; `None`
    /// while edge detection is disabled during a burst.
    #[must_use]
    pub const fn armed_polarity(&self) -> Option<EdgePolarity> {
        self.decoder.armed_polarity()
    }

    /// Ticks left in the active decode window; zero while idle. The counter
    /// keeps draining across a burst and its expiry while the decoder is
    /// already idle is a harmless re-arm.
    #[must_use]
    pub const fn countdown_remaining(&self) -> WindowTicks {
        self.countdown.remaining()
    }

    /// Tick checkpoint. Drains the countdown, applies the timeout reset
    /// when no burst is active, and advances the sequencer one phase while
    /// the activation flag is set (or unconditionally under the rotation
    /// policy). Completes in bounded time; never blocks.
    pub fn on_tick<I: TelemetryInstant>(
        &mut self,
        telemetry: &mut TelemetryRecorder<I>,
        now: I,
    ) -> TickOutcome {
        let mut outcome = TickOutcome::quiet();

        if self.countdown.tick() == CountdownStep::Expired && !self.activation {
            // Incomplete pattern: fail closed and listen again from idle.
            self.decoder.rearm_falling();
            outcome.decode_timed_out = true;
            telemetry.record_decode_timeout(now);
        }

        let run_sequencer = match self.sequencer.policy() {
            SequencerPolicy::GatedBurst => self.activation,
            SequencerPolicy::ContinuousRotation => true,
        };

        if run_sequencer {
            let step = self.sequencer.advance();
            outcome.commands = step.commands;
            for command in step.commands {
                telemetry.record_line_drive(command.line, command.level, step.phase, now);
            }

            if step.completed {
                self.activation = false;
                self.decoder.rearm_falling();
                outcome.burst_completed = true;
                telemetry.record_burst_complete(now);
            }
        }

        outcome
    }

    /// Edge checkpoint. `polarity` is the observed transition direction;
    /// edges that mismatch the armed polarity, or arrive while detection is
    /// disabled, are silently ignored.
    pub fn on_edge<I: TelemetryInstant>(
        &mut self,
        polarity: EdgePolarity,
        telemetry: &mut TelemetryRecorder<I>,
        now: I,
    ) -> EdgeResponse {
        match self.decoder.on_edge(polarity) {
            EdgeOutcome::Advanced { window, arm } => {
                self.countdown.arm(window);
                telemetry.record_edge_accepted(self.decoder.state(), polarity, window, now);
                EdgeResponse {
                    accepted: true,
                    rearm: Some(arm),
                    activated: false,
                }
            }
            EdgeOutcome::Completed => {
                self.activation = true;
                telemetry.record_decode_complete(now);
                EdgeResponse {
                    accepted: true,
                    rearm: Some(EdgePolarity::Falling),
                    activated: true,
                }
            }
            EdgeOutcome::Ignored => EdgeResponse::ignored(),
        }
    }
}
