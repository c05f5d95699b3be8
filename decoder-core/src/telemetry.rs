//! Telemetry event catalog and ring buffer shared by firmware and host
//! targets.
//!
//! Events carry strongly typed kinds that serialize to compact numeric
//! codes for transport over diagnostics channels, plus payloads with the
//! extra metadata the emulator transcript and the test suites inspect.
//! Everything here is `no_std` friendly and generic over the monotonic
//! instant supplied by the target.

#![cfg_attr(not(test), allow(dead_code))]

use core::{fmt, time::Duration};

use heapless::history_buf::{HistoryBuf, OldestOrdered};

use crate::decoder::{DecodeState, EdgePolarity};
use crate::sequencer::{LineLevel, OutputLine, SequencePhase};
use crate::timing::WindowTicks;

/// Identifier assigned to each recorded event.
pub type EventId = u32;

/// Discriminated telemetry events shared across all targets.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TelemetryEventKind {
    /// An edge advanced the decoder into the carried state.
    EdgeAccepted(DecodeState),
    /// A decode window expired and the decoder reset to idle.
    DecodeTimeout,
    /// The final edge completed the pattern; the burst starts next tick.
    DecodeComplete,
    /// A burst phase drove a line to the carried level.
    LineDriven(OutputLine, LineLevel),
    /// The final burst phase finished and the decoder re-armed.
    BurstComplete,
    /// Implementation-specific extension.
    Custom(u16),
}

impl fmt::Display for TelemetryEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryEventKind::EdgeAccepted(state) => {
                write!(f, "edge-accepted {state:?}")
            }
            TelemetryEventKind::DecodeTimeout => f.write_str("decode-timeout"),
            TelemetryEventKind::DecodeComplete => f.write_str("decode-complete"),
            TelemetryEventKind::LineDriven(line, level) => {
                write!(f, "line-{} {}", line.label(), level.label())
            }
            TelemetryEventKind::BurstComplete => f.write_str("burst-complete"),
            TelemetryEventKind::Custom(code) => write!(f, "custom({code})"),
        }
    }
}

impl TelemetryEventKind {
    const EDGE_ACCEPT_BASE: u16 = 0x0000;
    const DECODE_TIMEOUT_CODE: u16 = 0x0008;
    const DECODE_COMPLETE_CODE: u16 = 0x0009;
    const BURST_COMPLETE_CODE: u16 = 0x000A;
    const LINE_DRIVE_BASE: u16 = 0x0010;

    /// Encodes the event into a compact transport-friendly discriminant.
    #[must_use]
    pub const fn to_raw(self) -> u16 {
        match self {
            TelemetryEventKind::EdgeAccepted(state) => {
                Self::EDGE_ACCEPT_BASE + state.as_index() as u16
            }
            TelemetryEventKind::DecodeTimeout => Self::DECODE_TIMEOUT_CODE,
            TelemetryEventKind::DecodeComplete => Self::DECODE_COMPLETE_CODE,
            TelemetryEventKind::BurstComplete => Self::BURST_COMPLETE_CODE,
            TelemetryEventKind::LineDriven(line, level) => {
                let level_bit = match level {
                    LineLevel::Low => 0,
                    LineLevel::High => 1,
                };
                Self::LINE_DRIVE_BASE + (line.as_index() as u16) * 2 + level_bit
            }
            TelemetryEventKind::Custom(code) => code,
        }
    }

    /// Decodes a raw discriminant, falling back to [`Self::Custom`].
    #[must_use]
    pub fn from_raw(code: u16) -> Self {
        match code {
            Self::DECODE_TIMEOUT_CODE => TelemetryEventKind::DecodeTimeout,
            Self::DECODE_COMPLETE_CODE => TelemetryEventKind::DecodeComplete,
            Self::BURST_COMPLETE_CODE => TelemetryEventKind::BurstComplete,
            value if (Self::EDGE_ACCEPT_BASE..Self::EDGE_ACCEPT_BASE + 4).contains(&value) => {
                let offset = (value - Self::EDGE_ACCEPT_BASE) as usize;
                DecodeState::from_index(offset).map_or(TelemetryEventKind::Custom(value), |state| {
                    TelemetryEventKind::EdgeAccepted(state)
                })
            }
            value if (Self::LINE_DRIVE_BASE..Self::LINE_DRIVE_BASE + 6).contains(&value) => {
                let offset = value - Self::LINE_DRIVE_BASE;
                let level = if offset % 2 == 0 {
                    LineLevel::Low
                } else {
                    LineLevel::High
                };
                OutputLine::from_index((offset / 2) as usize)
                    .map_or(TelemetryEventKind::Custom(value), |line| {
                        TelemetryEventKind::LineDriven(line, level)
                    })
            }
            other => TelemetryEventKind::Custom(other),
        }
    }
}

/// Payloads carried alongside telemetry events.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TelemetryPayload {
    /// No additional metadata accompanies the event.
    None,
    /// Details describing an accepted edge.
    Edge(EdgeTelemetry),
    /// Details describing a driven line transition.
    Line(LineTelemetry),
    /// Summary of a completed burst.
    Burst(BurstTelemetry),
}

/// Accepted-edge payload.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EdgeTelemetry {
    pub polarity: EdgePolarity,
    /// Window armed by this edge, absent for the completing edge.
    pub window: Option<WindowTicks>,
    pub elapsed_since_previous: Option<Duration>,
}

/// Line transition payload.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LineTelemetry {
    pub line: OutputLine,
    pub level: LineLevel,
    pub phase: SequencePhase,
}

/// Burst completion payload.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BurstTelemetry {
    /// Elapsed time from decode completion to the final phase.
    pub duration: Option<Duration>,
}

/// Total number of telemetry entries retained in memory.
pub const TELEMETRY_RING_CAPACITY: usize = 128;

/// Trait implemented by monotonic instant wrappers used for telemetry.
pub trait TelemetryInstant: Copy {
    /// Returns the saturating duration from `earlier` to `self`.
    fn saturating_duration_since(&self, earlier: Self) -> Duration;
}

/// Telemetry record stored in the ring buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TelemetryRecord<TInstant>
where
    TInstant: Copy,
{
    pub id: EventId,
    pub timestamp: TInstant,
    pub event: TelemetryEventKind,
    pub details: TelemetryPayload,
}

/// Telemetry ring buffer type alias.
pub type TelemetryRing<TInstant, const CAPACITY: usize = TELEMETRY_RING_CAPACITY> =
    HistoryBuf<TelemetryRecord<TInstant>, CAPACITY>;

/// Records telemetry events into a fixed-size ring buffer.
pub struct TelemetryRecorder<TInstant, const CAPACITY: usize = TELEMETRY_RING_CAPACITY>
where
    TInstant: Copy,
{
    ring: TelemetryRing<TInstant, CAPACITY>,
    last_edge_at: Option<TInstant>,
    burst_started_at: Option<TInstant>,
    next_event_id: EventId,
}

impl<TInstant, const CAPACITY: usize> TelemetryRecorder<TInstant, CAPACITY>
where
    TInstant: Copy + TelemetryInstant,
{
    /// Creates a new telemetry recorder with an empty history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ring: HistoryBuf::new(),
            last_edge_at: None,
            burst_started_at: None,
            next_event_id: 0,
        }
    }

    /// Returns an iterator over the recorded telemetry in chronological order.
    pub fn oldest_first(&self) -> OldestOrdered<'_, TelemetryRecord<TInstant>> {
        self.ring.oldest_ordered()
    }

    /// Returns the most recent telemetry record, if available.
    pub fn latest(&self) -> Option<&TelemetryRecord<TInstant>> {
        self.ring.recent()
    }

    /// Returns the number of records currently stored.
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Returns `true` when no telemetry records are stored.
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Records an edge that advanced the decoder, capturing elapsed time
    /// since the previous accepted edge.
    pub fn record_edge_accepted(
        &mut self,
        entered: DecodeState,
        polarity: EdgePolarity,
        window: WindowTicks,
        timestamp: TInstant,
    ) -> EventId {
        let elapsed = self
            .last_edge_at
            .map(|previous| timestamp.saturating_duration_since(previous));
        self.last_edge_at = Some(timestamp);

        let payload = TelemetryPayload::Edge(EdgeTelemetry {
            polarity,
            window: Some(window),
            elapsed_since_previous: elapsed,
        });
        self.record(TelemetryEventKind::EdgeAccepted(entered), payload, timestamp)
    }

    /// Records the completing rising edge and anchors the burst duration.
    pub fn record_decode_complete(&mut self, timestamp: TInstant) -> EventId {
        let elapsed = self
            .last_edge_at
            .map(|previous| timestamp.saturating_duration_since(previous));
        self.last_edge_at = Some(timestamp);
        self.burst_started_at = Some(timestamp);

        let payload = TelemetryPayload::Edge(EdgeTelemetry {
            polarity: EdgePolarity::Rising,
            window: None,
            elapsed_since_previous: elapsed,
        });
        self.record(TelemetryEventKind::DecodeComplete, payload, timestamp)
    }

    /// Records an expired decode window. Edge pacing restarts from scratch.
    pub fn record_decode_timeout(&mut self, timestamp: TInstant) -> EventId {
        self.last_edge_at = None;
        self.record(TelemetryEventKind::DecodeTimeout, TelemetryPayload::None, timestamp)
    }

    /// Records a line transition driven by a burst phase.
    pub fn record_line_drive(
        &mut self,
        line: OutputLine,
        level: LineLevel,
        phase: SequencePhase,
        timestamp: TInstant,
    ) -> EventId {
        let payload = TelemetryPayload::Line(LineTelemetry { line, level, phase });
        self.record(TelemetryEventKind::LineDriven(line, level), payload, timestamp)
    }

    /// Records the completion of a gated burst.
    pub fn record_burst_complete(&mut self, timestamp: TInstant) -> EventId {
        let duration = self
            .burst_started_at
            .take()
            .map(|start| timestamp.saturating_duration_since(start));

        let payload = TelemetryPayload::Burst(BurstTelemetry { duration });
        self.record(TelemetryEventKind::BurstComplete, payload, timestamp)
    }

    /// Records an arbitrary telemetry event with the supplied payload.
    pub fn record(
        &mut self,
        event: TelemetryEventKind,
        payload: TelemetryPayload,
        timestamp: TInstant,
    ) -> EventId {
        let id = self.next_event_id;
        self.next_event_id = self.next_event_id.wrapping_add(1);

        self.ring.write(TelemetryRecord {
            id,
            timestamp,
            event,
            details: payload,
        });

        id
    }
}

impl<TInstant, const CAPACITY: usize> Default for TelemetryRecorder<TInstant, CAPACITY>
where
    TInstant: Copy + TelemetryInstant,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
    struct MicrosInstant(u64);

    impl MicrosInstant {
        fn from_micros(value: u64) -> Self {
            Self(value)
        }
    }

    impl TelemetryInstant for MicrosInstant {
        fn saturating_duration_since(&self, earlier: Self) -> Duration {
            Duration::from_micros(self.0.saturating_sub(earlier.0))
        }
    }

    #[test]
    fn event_codes_round_trip() {
        let fixtures = [
            TelemetryEventKind::EdgeAccepted(DecodeState::Pulse1FallSeen),
            TelemetryEventKind::EdgeAccepted(DecodeState::Pulse2FallSeen),
            TelemetryEventKind::DecodeTimeout,
            TelemetryEventKind::DecodeComplete,
            TelemetryEventKind::LineDriven(OutputLine::A, LineLevel::Low),
            TelemetryEventKind::LineDriven(OutputLine::C, LineLevel::High),
            TelemetryEventKind::BurstComplete,
            TelemetryEventKind::Custom(0x4242),
        ];

        for event in fixtures {
            assert_eq!(TelemetryEventKind::from_raw(event.to_raw()), event);
        }
    }

    #[test]
    fn line_drive_codes_are_distinct() {
        let mut seen = [false; 6];
        for line in [OutputLine::A, OutputLine::B, OutputLine::C] {
            for level in [LineLevel::Low, LineLevel::High] {
                let code = TelemetryEventKind::LineDriven(line, level).to_raw();
                let slot = (code - 0x0010) as usize;
                assert!(!seen[slot], "duplicate code {code:#06x}");
                seen[slot] = true;
            }
        }
    }

    #[test]
    fn records_elapsed_between_accepted_edges() {
        let mut recorder = TelemetryRecorder::<MicrosInstant>::new();

        let id1 = recorder.record_edge_accepted(
            DecodeState::Pulse1FallSeen,
            EdgePolarity::Falling,
            60,
            MicrosInstant::from_micros(1_000),
        );
        assert_eq!(id1, 0);

        let first = recorder.latest().copied().unwrap();
        match first.details {
            TelemetryPayload::Edge(details) => {
                assert_eq!(details.elapsed_since_previous, None);
                assert_eq!(details.window, Some(60));
            }
            _ => panic!("expected edge payload"),
        }

        let id2 = recorder.record_edge_accepted(
            DecodeState::Pulse1RiseSeen,
            EdgePolarity::Rising,
            225,
            MicrosInstant::from_micros(101_000),
        );
        assert_eq!(id2, 1);

        let second = recorder.latest().copied().unwrap();
        match second.details {
            TelemetryPayload::Edge(details) => {
                let elapsed = details.elapsed_since_previous.expect("missing elapsed");
                assert_eq!(elapsed.as_millis(), 100);
            }
            _ => panic!("expected edge payload"),
        }
    }

    #[test]
    fn timeout_resets_edge_pacing() {
        let mut recorder = TelemetryRecorder::<MicrosInstant>::new();
        recorder.record_edge_accepted(
            DecodeState::Pulse1FallSeen,
            EdgePolarity::Falling,
            60,
            MicrosInstant::from_micros(0),
        );
        recorder.record_decode_timeout(MicrosInstant::from_micros(120_000));

        recorder.record_edge_accepted(
            DecodeState::Pulse1FallSeen,
            EdgePolarity::Falling,
            60,
            MicrosInstant::from_micros(500_000),
        );
        let record = recorder.latest().copied().unwrap();
        match record.details {
            TelemetryPayload::Edge(details) => {
                assert_eq!(details.elapsed_since_previous, None);
            }
            _ => panic!("expected edge payload"),
        }
    }

    #[test]
    fn burst_duration_measures_from_decode_complete() {
        let mut recorder = TelemetryRecorder::<MicrosInstant>::new();
        recorder.record_decode_complete(MicrosInstant::from_micros(250_000));
        recorder.record_line_drive(
            OutputLine::A,
            LineLevel::Low,
            SequencePhase::P0,
            MicrosInstant::from_micros(252_000),
        );
        recorder.record_burst_complete(MicrosInstant::from_micros(258_000));

        let record = recorder.latest().copied().unwrap();
        assert_eq!(record.event, TelemetryEventKind::BurstComplete);
        match record.details {
            TelemetryPayload::Burst(details) => {
                let duration = details.duration.expect("missing burst duration");
                assert_eq!(duration.as_millis(), 8);
            }
            _ => panic!("expected burst payload"),
        }
    }
}
