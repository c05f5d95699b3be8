use cortex_m::interrupt;
use cortex_m::register::primask;
use critical_section::{self, RawRestoreState};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32 as hal;
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::{Level, Output, Pull, Speed};
use static_cell::StaticCell;

use crate::hw::HardwareLineDriver;
use crate::pulse::{ControllerCell, RearmSignal};
use decoder_core::sequencer::SequencerPolicy;

mod edge_task;
mod tick_task;

critical_section::set_impl!(InterruptCriticalSection);

struct InterruptCriticalSection;

unsafe impl critical_section::Impl for InterruptCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let primask = primask::read();
        interrupt::disable();
        primask.is_active()
    }

    unsafe fn release(restore_state: RawRestoreState) {
        if restore_state {
            unsafe {
                interrupt::enable();
            }
        }
    }
}

pub(super) static CONTROLLER: ControllerCell =
    ControllerCell::new(SequencerPolicy::GatedBurst);
pub(super) static REARM: RearmSignal = RearmSignal::new();

static LINE_DRIVER: StaticCell<HardwareLineDriver<'static>> = StaticCell::new();

#[embassy_executor::main]
pub async fn main(spawner: Spawner) {
    let config = hal::Config::default();
    let hal::Peripherals {
        PA0,
        PB0,
        PB1,
        PB2,
        EXTI0,
        ..
    } = hal::init(config);

    // Output lines idle high; a burst is the only thing that pulls them low.
    let driver = LINE_DRIVER.init(HardwareLineDriver::new(
        Output::new(PB0, Level::High, Speed::Low),
        Output::new(PB1, Level::High, Speed::Low),
        Output::new(PB2, Level::High, Speed::Low),
    ));

    let trigger = ExtiInput::new(PA0, EXTI0, Pull::Up);

    spawner
        .spawn(tick_task::run(driver))
        .expect("failed to spawn tick task");
    spawner
        .spawn(edge_task::run(trigger))
        .expect("failed to spawn edge task");

    core::future::pending::<()>().await;
}
