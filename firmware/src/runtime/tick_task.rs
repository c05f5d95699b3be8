use decoder_core::controller::LineDriver;
use decoder_core::timing::TICK_INTERVAL_MS;
use embassy_time::{Duration, Ticker};
use portable_atomic::{AtomicU32, Ordering};

use super::{CONTROLLER, REARM};
use crate::hw::HardwareLineDriver;
use crate::pulse::FirmwareInstant;

/// Ticks elapsed since boot, for correlating defmt output with telemetry.
static TICK_COUNT: AtomicU32 = AtomicU32::new(0);

#[embassy_executor::task]
pub async fn run(driver: &'static mut HardwareLineDriver<'static>) -> ! {
    let mut ticker = Ticker::every(Duration::from_millis(TICK_INTERVAL_MS));
    driver.set_all_idle();

    loop {
        ticker.next().await;
        let tick = TICK_COUNT.fetch_add(1, Ordering::Relaxed).wrapping_add(1);

        let outcome = CONTROLLER.tick(FirmwareInstant::now());

        for command in outcome.commands {
            driver.drive(command.line, command.level);
            defmt::debug!(
                "tick {=u32}: line {=str} -> {=str}",
                tick,
                command.line.label(),
                command.level.label()
            );
        }

        if outcome.decode_timed_out {
            defmt::info!("tick {=u32}: decode window expired", tick);
        }
        if outcome.burst_completed {
            defmt::info!("tick {=u32}: burst complete", tick);
        }
        if outcome.rearms_input() {
            REARM.signal(());
        }
    }
}
