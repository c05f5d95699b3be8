//! Edge-triggered state machine validating the two-pulse timing pattern.
//!
//! The input signal idles high and carries two low pulses: a short lobe of
//! at most 120 ms, a high lobe of at most 450 ms, and a second short lobe of
//! at most 120 ms. Each accepted edge flips the armed trigger polarity and
//! hands the caller a fresh timeout window; the timeout path (not this
//! module) invalidates patterns whose half-period runs too long. There is no
//! minimum-duration bound: an arbitrarily fast edge satisfies the current
//! transition.

use crate::timing::{LONG_LOBE_TICKS, SHORT_LOBE_TICKS, WindowTicks};

/// Edge direction the input trigger is armed for.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EdgePolarity {
    Falling,
    Rising,
}

impl EdgePolarity {
    /// Short label used in logs and transcripts.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            EdgePolarity::Falling => "falling",
            EdgePolarity::Rising => "rising",
        }
    }
}

/// Progress through the two-pulse pattern.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum DecodeState {
    #[default]
    Idle,
    Pulse1FallSeen,
    Pulse1RiseSeen,
    Pulse2FallSeen,
}

impl DecodeState {
    /// Deterministic index used for compact telemetry codes.
    #[must_use]
    pub const fn as_index(self) -> usize {
        match self {
            DecodeState::Idle => 0,
            DecodeState::Pulse1FallSeen => 1,
            DecodeState::Pulse1RiseSeen => 2,
            DecodeState::Pulse2FallSeen => 3,
        }
    }

    /// Attempts to construct a [`DecodeState`] from a raw index.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(DecodeState::Idle),
            1 => Some(DecodeState::Pulse1FallSeen),
            2 => Some(DecodeState::Pulse1RiseSeen),
            3 => Some(DecodeState::Pulse2FallSeen),
            _ => None,
        }
    }
}

/// Result of feeding one edge to the decoder.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EdgeOutcome {
    /// The edge matched the armed polarity and advanced the pattern; the
    /// caller must arm the countdown with `window` and re-arm the input
    /// trigger for `arm`.
    Advanced {
        window: WindowTicks,
        arm: EdgePolarity,
    },
    /// The final rising edge completed the pattern. Edge detection is now
    /// disabled; [`PulseDecoder::rearm_falling`] re-enables it once the
    /// burst finishes.
    Completed,
    /// Edge ignored: polarity mismatch or the decoder is disabled.
    Ignored,
}

/// Two-pulse decode state machine together with its armed trigger polarity.
#[derive(Debug)]
pub struct PulseDecoder {
    state: DecodeState,
    armed: EdgePolarity,
    enabled: bool,
}

impl PulseDecoder {
    /// Creates a decoder listening for the first falling edge.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: DecodeState::Idle,
            armed: EdgePolarity::Falling,
            enabled: true,
        }
    }

    /// Current position in the two-pulse pattern.
    #[must_use]
    pub const fn state(&self) -> DecodeState {
        self.state
    }

    /// Polarity the input trigger should be armed for, or `None` while edge
    /// detection is disabled during a burst.
    #[must_use]
    pub const fn armed_polarity(&self) -> Option<EdgePolarity> {
        if self.enabled { Some(self.armed) } else { None }
    }

    /// Advances the pattern by one edge.
    pub fn on_edge(&mut self, polarity: EdgePolarity) -> EdgeOutcome {
        if !self.enabled || polarity != self.armed {
            return EdgeOutcome::Ignored;
        }

        match self.state {
            DecodeState::Idle => {
                self.state = DecodeState::Pulse1FallSeen;
                self.armed = EdgePolarity::Rising;
                EdgeOutcome::Advanced {
                    window: SHORT_LOBE_TICKS,
                    arm: EdgePolarity::Rising,
                }
            }
            DecodeState::Pulse1FallSeen => {
                self.state = DecodeState::Pulse1RiseSeen;
                self.armed = EdgePolarity::Falling;
                EdgeOutcome::Advanced {
                    window: LONG_LOBE_TICKS,
                    arm: EdgePolarity::Falling,
                }
            }
            DecodeState::Pulse1RiseSeen => {
                self.state = DecodeState::Pulse2FallSeen;
                self.armed = EdgePolarity::Rising;
                EdgeOutcome::Advanced {
                    window: SHORT_LOBE_TICKS,
                    arm: EdgePolarity::Rising,
                }
            }
            DecodeState::Pulse2FallSeen => {
                // Pattern complete. Park the trigger on falling so the next
                // re-arm starts a fresh pattern, and go deaf until then.
                self.state = DecodeState::Idle;
                self.armed = EdgePolarity::Falling;
                self.enabled = false;
                EdgeOutcome::Completed
            }
        }
    }

    /// Abandons any in-progress pattern and listens for the first falling
    /// edge again. Used by both the timeout reset and the burst-completion
    /// re-arm.
    pub fn rearm_falling(&mut self) {
        self.state = DecodeState::Idle;
        self.armed = EdgePolarity::Falling;
        self.enabled = true;
    }
}

impl Default for PulseDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_edge_run_completes_the_pattern() {
        let mut decoder = PulseDecoder::new();

        assert_eq!(
            decoder.on_edge(EdgePolarity::Falling),
            EdgeOutcome::Advanced {
                window: SHORT_LOBE_TICKS,
                arm: EdgePolarity::Rising,
            }
        );
        assert_eq!(decoder.state(), DecodeState::Pulse1FallSeen);

        assert_eq!(
            decoder.on_edge(EdgePolarity::Rising),
            EdgeOutcome::Advanced {
                window: LONG_LOBE_TICKS,
                arm: EdgePolarity::Falling,
            }
        );
        assert_eq!(
            decoder.on_edge(EdgePolarity::Falling),
            EdgeOutcome::Advanced {
                window: SHORT_LOBE_TICKS,
                arm: EdgePolarity::Rising,
            }
        );
        assert_eq!(decoder.on_edge(EdgePolarity::Rising), EdgeOutcome::Completed);
        assert_eq!(decoder.state(), DecodeState::Idle);
    }

    #[test]
    fn mismatched_polarity_is_ignored() {
        let mut decoder = PulseDecoder::new();

        assert_eq!(decoder.on_edge(EdgePolarity::Rising), EdgeOutcome::Ignored);
        assert_eq!(decoder.state(), DecodeState::Idle);

        decoder.on_edge(EdgePolarity::Falling);
        assert_eq!(decoder.on_edge(EdgePolarity::Falling), EdgeOutcome::Ignored);
        assert_eq!(decoder.state(), DecodeState::Pulse1FallSeen);
    }

    #[test]
    fn completion_disables_edge_detection_until_rearmed() {
        let mut decoder = PulseDecoder::new();
        decoder.on_edge(EdgePolarity::Falling);
        decoder.on_edge(EdgePolarity::Rising);
        decoder.on_edge(EdgePolarity::Falling);
        decoder.on_edge(EdgePolarity::Rising);

        assert_eq!(decoder.armed_polarity(), None);
        assert_eq!(decoder.on_edge(EdgePolarity::Falling), EdgeOutcome::Ignored);
        assert_eq!(decoder.on_edge(EdgePolarity::Rising), EdgeOutcome::Ignored);

        decoder.rearm_falling();
        assert_eq!(decoder.armed_polarity(), Some(EdgePolarity::Falling));
        assert!(matches!(
            decoder.on_edge(EdgePolarity::Falling),
            EdgeOutcome::Advanced { .. }
        ));
    }

    #[test]
    fn rearm_abandons_partial_progress() {
        let mut decoder = PulseDecoder::new();
        decoder.on_edge(EdgePolarity::Falling);
        decoder.on_edge(EdgePolarity::Rising);
        assert_eq!(decoder.state(), DecodeState::Pulse1RiseSeen);

        decoder.rearm_falling();
        assert_eq!(decoder.state(), DecodeState::Idle);
        assert_eq!(decoder.armed_polarity(), Some(EdgePolarity::Falling));
    }
}
