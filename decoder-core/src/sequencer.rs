//! Tick-driven output sequencing policies.
//!
//! Two observed configurations of the controller share one interface: the
//! gated four-phase burst that runs once per completed decode, and the
//! free-running three-step rotation with no input gating. The policy is
//! chosen when the sequencer is assembled, never at runtime.

use crate::timing::BURST_PHASES;

/// Identifier for the three actuation lines.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputLine {
    A,
    B,
    C,
}

impl OutputLine {
    /// Deterministic index for lookups and telemetry codes.
    #[must_use]
    pub const fn as_index(self) -> usize {
        match self {
            OutputLine::A => 0,
            OutputLine::B => 1,
            OutputLine::C => 2,
        }
    }

    /// Attempts to construct an [`OutputLine`] from a raw index.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(OutputLine::A),
            1 => Some(OutputLine::B),
            2 => Some(OutputLine::C),
            _ => None,
        }
    }

    /// Short label used in logs and transcripts.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            OutputLine::A => "A",
            OutputLine::B => "B",
            OutputLine::C => "C",
        }
    }
}

/// Logic level driven onto an output line.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LineLevel {
    Low,
    High,
}

impl LineLevel {
    /// Short label used in logs and transcripts.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            LineLevel::Low => "low",
            LineLevel::High => "high",
        }
    }
}

/// One line transition applied during a sequencer step.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LineCommand {
    pub line: OutputLine,
    pub level: LineLevel,
}

impl LineCommand {
    #[must_use]
    pub const fn new(line: OutputLine, level: LineLevel) -> Self {
        Self { line, level }
    }
}

/// Phases of the actuation sequence. The gated burst uses all four; the
/// free-running rotation cycles through the first three.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum SequencePhase {
    #[default]
    P0,
    P1,
    P2,
    P3,
}

impl SequencePhase {
    /// Deterministic index into the phase tables.
    #[must_use]
    pub const fn as_index(self) -> usize {
        match self {
            SequencePhase::P0 => 0,
            SequencePhase::P1 => 1,
            SequencePhase::P2 => 2,
            SequencePhase::P3 => 3,
        }
    }

    /// Next phase in ascending order, wrapping after [`SequencePhase::P3`].
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            SequencePhase::P0 => SequencePhase::P1,
            SequencePhase::P1 => SequencePhase::P2,
            SequencePhase::P2 => SequencePhase::P3,
            SequencePhase::P3 => SequencePhase::P0,
        }
    }
}

/// Line transitions applied in each gated burst phase. Lines not listed
/// keep their previous level.
pub const GATED_BURST_PHASES: [&[LineCommand]; BURST_PHASES] = [
    &[LineCommand::new(OutputLine::A, LineLevel::Low)],
    &[
        LineCommand::new(OutputLine::A, LineLevel::High),
        LineCommand::new(OutputLine::B, LineLevel::Low),
    ],
    &[
        LineCommand::new(OutputLine::B, LineLevel::High),
        LineCommand::new(OutputLine::C, LineLevel::Low),
    ],
    &[LineCommand::new(OutputLine::C, LineLevel::High)],
];

/// Line transitions for the free-running rotation.
pub const CONTINUOUS_ROTATION_STEPS: [&[LineCommand]; 3] = [
    &[
        LineCommand::new(OutputLine::C, LineLevel::High),
        LineCommand::new(OutputLine::A, LineLevel::Low),
    ],
    &[
        LineCommand::new(OutputLine::A, LineLevel::High),
        LineCommand::new(OutputLine::B, LineLevel::Low),
    ],
    &[
        LineCommand::new(OutputLine::B, LineLevel::High),
        LineCommand::new(OutputLine::C, LineLevel::Low),
    ],
];

/// Assembly-time choice of sequencing behavior.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SequencerPolicy {
    /// Four-phase burst that runs once per completed decode.
    GatedBurst,
    /// Unconditional three-step rotation, one step per tick, forever.
    ContinuousRotation,
}

/// What one sequencer step drove, and whether a gated burst finished.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PhaseStep {
    /// The phase that was just applied.
    pub phase: SequencePhase,
    /// Line transitions for that phase, in application order.
    pub commands: &'static [LineCommand],
    /// Set when the final gated phase completed; always `false` for the
    /// free-running rotation.
    pub completed: bool,
}

/// Tick-driven output state machine.
#[derive(Debug)]
pub struct OutputSequencer {
    policy: SequencerPolicy,
    phase: SequencePhase,
}

impl OutputSequencer {
    /// Creates a sequencer parked at [`SequencePhase::P0`].
    #[must_use]
    pub const fn new(policy: SequencerPolicy) -> Self {
        Self {
            policy,
            phase: SequencePhase::P0,
        }
    }

    /// The policy this sequencer was assembled with.
    #[must_use]
    pub const fn policy(&self) -> SequencerPolicy {
        self.policy
    }

    /// Phase the next call to [`OutputSequencer::advance`] will apply.
    #[must_use]
    pub const fn phase(&self) -> SequencePhase {
        self.phase
    }

    /// Applies the current phase and moves to the next one. The gated
    /// policy reports completion on its final phase and wraps to `P0`; the
    /// rotation wraps after its third step and never completes.
    pub fn advance(&mut self) -> PhaseStep {
        let phase = self.phase;
        match self.policy {
            SequencerPolicy::GatedBurst => {
                self.phase = phase.next();
                PhaseStep {
                    phase,
                    commands: GATED_BURST_PHASES[phase.as_index()],
                    completed: matches!(phase, SequencePhase::P3),
                }
            }
            SequencerPolicy::ContinuousRotation => {
                self.phase = match phase {
                    SequencePhase::P2 | SequencePhase::P3 => SequencePhase::P0,
                    other => other.next(),
                };
                PhaseStep {
                    phase,
                    commands: CONTINUOUS_ROTATION_STEPS[phase.as_index()],
                    completed: false,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gated_burst_walks_all_four_phases_and_completes() {
        let mut sequencer = OutputSequencer::new(SequencerPolicy::GatedBurst);

        let p0 = sequencer.advance();
        assert_eq!(p0.phase, SequencePhase::P0);
        assert_eq!(
            p0.commands,
            &[LineCommand::new(OutputLine::A, LineLevel::Low)]
        );
        assert!(!p0.completed);

        let p1 = sequencer.advance();
        assert_eq!(p1.phase, SequencePhase::P1);
        assert_eq!(
            p1.commands,
            &[
                LineCommand::new(OutputLine::A, LineLevel::High),
                LineCommand::new(OutputLine::B, LineLevel::Low),
            ]
        );

        let p2 = sequencer.advance();
        assert_eq!(p2.phase, SequencePhase::P2);

        let p3 = sequencer.advance();
        assert_eq!(p3.phase, SequencePhase::P3);
        assert_eq!(
            p3.commands,
            &[LineCommand::new(OutputLine::C, LineLevel::High)]
        );
        assert!(p3.completed);

        // Wrapped back to the start for the next burst.
        assert_eq!(sequencer.phase(), SequencePhase::P0);
    }

    #[test]
    fn rotation_cycles_three_steps_without_completing() {
        let mut sequencer = OutputSequencer::new(SequencerPolicy::ContinuousRotation);

        for _ in 0..3 {
            let s0 = sequencer.advance();
            assert_eq!(s0.phase, SequencePhase::P0);
            assert_eq!(
                s0.commands,
                &[
                    LineCommand::new(OutputLine::C, LineLevel::High),
                    LineCommand::new(OutputLine::A, LineLevel::Low),
                ]
            );
            assert!(!s0.completed);

            assert_eq!(sequencer.advance().phase, SequencePhase::P1);

            let s2 = sequencer.advance();
            assert_eq!(s2.phase, SequencePhase::P2);
            assert!(!s2.completed);
        }
    }

    #[test]
    fn no_phase_drives_more_than_two_lines() {
        for commands in GATED_BURST_PHASES.iter().chain(CONTINUOUS_ROTATION_STEPS.iter()) {
            assert!(commands.len() <= 2);
        }
    }
}
