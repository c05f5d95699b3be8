//! GPIO adapter for the three burst output lines.

use decoder_core::controller::LineDriver;
use decoder_core::sequencer::{LineLevel, OutputLine};
use embassy_stm32::gpio::{Level, Output};

/// Drives the output lines through push-pull GPIO pins. The pins are
/// configured high at init so the lines idle released.
pub struct HardwareLineDriver<'d> {
    line_a: Output<'d>,
    line_b: Output<'d>,
    line_c: Output<'d>,
}

impl<'d> HardwareLineDriver<'d> {
    pub fn new(line_a: Output<'d>, line_b: Output<'d>, line_c: Output<'d>) -> Self {
        Self {
            line_a,
            line_b,
            line_c,
        }
    }

    fn pin(&mut self, line: OutputLine) -> &mut Output<'d> {
        match line {
            OutputLine::A => &mut self.line_a,
            OutputLine::B => &mut self.line_b,
            OutputLine::C => &mut self.line_c,
        }
    }
}

impl LineDriver for HardwareLineDriver<'_> {
    fn drive(&mut self, line: OutputLine, level: LineLevel) {
        let level = match level {
            LineLevel::Low => Level::Low,
            LineLevel::High => Level::High,
        };
        self.pin(line).set_level(level);
    }

    fn set_all_idle(&mut self) {
        self.line_a.set_high();
        self.line_b.set_high();
        self.line_c.set_high();
    }
}
