//! Host-side replay of synthetic trigger waveforms against the controller.
//!
//! The generator plays a repeating segment table on the simulated trigger
//! line while the scheduler ticks every 2 ms. When an edge lands exactly on
//! a tick boundary the tick runs first, matching the interrupt priority of
//! the target hardware.

use core::time::Duration;
use std::fmt::Write as _;

use decoder_core::controller::Controller;
use decoder_core::decoder::EdgePolarity;
use decoder_core::sequencer::SequencerPolicy;
use decoder_core::telemetry::{TelemetryInstant, TelemetryRecorder};
use decoder_core::timing::TICK_INTERVAL_MS;

/// Simulated millisecond timestamp.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct SimInstant(pub u64);

impl TelemetryInstant for SimInstant {
    fn saturating_duration_since(&self, earlier: Self) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

/// One lobe of the synthetic trigger waveform.
#[derive(Copy, Clone, Debug)]
struct Segment {
    high: bool,
    ms: u64,
}

const fn seg(high: bool, ms: u64) -> Segment {
    Segment { high, ms }
}

/// Nominal two-pulse pattern: both low lobes fit their windows.
const NOMINAL: &[Segment] = &[
    seg(true, 1000),
    seg(false, 100),
    seg(true, 400),
    seg(false, 100),
];

/// First low lobe overruns its 120 ms window.
const LATE_RISE: &[Segment] = &[
    seg(true, 1000),
    seg(false, 200),
    seg(true, 400),
    seg(false, 100),
];

/// Very narrow lobes; the decoder has no minimum width so these still
/// count as a valid pattern.
const CHATTER: &[Segment] = &[
    seg(true, 1000),
    seg(false, 50),
    seg(true, 30),
    seg(false, 50),
    seg(true, 470),
];

/// Waveform profile replayed on the trigger line.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SignalProfile {
    /// Valid pattern every cycle.
    Nominal,
    /// First rising edge arrives too late.
    LateRise,
    /// Glitch-width pulses that still satisfy the windows.
    Chatter,
    /// Nominal waveform under the free-running rotation policy.
    Rotation,
}

impl SignalProfile {
    pub fn from_tag(tag: &str) -> Result<Self, String> {
        match tag.to_ascii_lowercase().as_str() {
            "nominal" => Ok(Self::Nominal),
            "late-rise" | "late_rise" => Ok(Self::LateRise),
            "chatter" => Ok(Self::Chatter),
            "rotation" => Ok(Self::Rotation),
            other => Err(format!("Unknown profile `{other}`")),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Nominal => "nominal",
            Self::LateRise => "late-rise",
            Self::Chatter => "chatter",
            Self::Rotation => "rotation",
        }
    }

    fn policy(self) -> SequencerPolicy {
        match self {
            Self::Rotation => SequencerPolicy::ContinuousRotation,
            _ => SequencerPolicy::GatedBurst,
        }
    }

    fn segments(self) -> &'static [Segment] {
        match self {
            Self::Nominal | Self::Rotation => NOMINAL,
            Self::LateRise => LATE_RISE,
            Self::Chatter => CHATTER,
        }
    }

    /// Replay length that shows the profile's behavior at least twice.
    pub fn default_duration_ms(self) -> u64 {
        match self {
            // Two full generator cycles plus the trailing burst.
            Self::Nominal | Self::LateRise => 3300,
            Self::Chatter => 3300,
            // A handful of ticks is enough to show the free-running steps.
            Self::Rotation => 24,
        }
    }
}

/// Plays the segment table as a stream of timestamped edges.
struct PulseGenerator {
    segments: &'static [Segment],
    index: usize,
    boundary_at: u64,
}

impl PulseGenerator {
    fn new(segments: &'static [Segment]) -> Self {
        Self {
            segments,
            index: 0,
            boundary_at: segments[0].ms,
        }
    }

    /// Timestamp and polarity of the next transition.
    fn peek(&self) -> (u64, EdgePolarity) {
        let leaving = self.segments[self.index];
        let polarity = if leaving.high {
            EdgePolarity::Falling
        } else {
            EdgePolarity::Rising
        };
        (self.boundary_at, polarity)
    }

    fn advance(&mut self) {
        self.index = (self.index + 1) % self.segments.len();
        self.boundary_at += self.segments[self.index].ms;
    }
}

/// Counters accumulated over a replay.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SimCounters {
    pub edges_accepted: u32,
    pub edges_ignored: u32,
    pub timeouts: u32,
    pub activations: u32,
    pub bursts_completed: u32,
    pub line_events: u32,
}

/// Transcript plus counters from one replay.
pub struct SimReport {
    pub transcript: Vec<String>,
    pub counters: SimCounters,
}

/// Replays `profile` for `duration_ms` of simulated time.
pub fn run(profile: SignalProfile, duration_ms: u64) -> SimReport {
    let mut controller = Controller::new(profile.policy());
    let mut telemetry: TelemetryRecorder<SimInstant> = TelemetryRecorder::new();
    let mut generator = PulseGenerator::new(profile.segments());

    let mut transcript = Vec::new();
    let mut counters = SimCounters::default();

    let mut next_tick = TICK_INTERVAL_MS;
    loop {
        let (edge_at, polarity) = generator.peek();
        let now = next_tick.min(edge_at);
        if now > duration_ms {
            break;
        }

        if next_tick <= edge_at {
            let outcome = controller.on_tick(&mut telemetry, SimInstant(now));
            for command in outcome.commands {
                counters.line_events += 1;
                transcript.push(entry(
                    now,
                    &format!("line {} -> {}", command.line.label(), command.level.label()),
                ));
            }
            if outcome.decode_timed_out {
                counters.timeouts += 1;
                transcript.push(entry(now, "decode window expired"));
            }
            if outcome.burst_completed {
                counters.bursts_completed += 1;
                transcript.push(entry(now, "burst complete"));
            }
            next_tick += TICK_INTERVAL_MS;
        } else {
            let response = controller.on_edge(polarity, &mut telemetry, SimInstant(now));
            if response.accepted {
                counters.edges_accepted += 1;
                transcript.push(entry(now, &format!("{} edge accepted", polarity.label())));
            } else {
                counters.edges_ignored += 1;
                transcript.push(entry(now, &format!("{} edge ignored", polarity.label())));
            }
            if response.activated {
                counters.activations += 1;
                transcript.push(entry(now, "pattern decoded, burst starts next tick"));
            }
            generator.advance();
        }
    }

    SimReport {
        transcript,
        counters,
    }
}

fn entry(at_ms: u64, message: &str) -> String {
    let mut line = String::new();
    let _ = write!(line, "[{at_ms:>6} ms] {message}");
    line
}
