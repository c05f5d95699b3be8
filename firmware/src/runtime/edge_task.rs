use decoder_core::decoder::EdgePolarity;
use embassy_futures::select::{Either, select};
use embassy_stm32::exti::ExtiInput;

use super::{CONTROLLER, REARM};
use crate::pulse::FirmwareInstant;

#[embassy_executor::task]
pub async fn run(mut trigger: ExtiInput<'static>) -> ! {
    loop {
        // Detection is off while a burst runs; park until the tick task
        // re-arms us. Any edge latched in the meantime is dropped.
        let Some(polarity) = CONTROLLER.armed_polarity() else {
            REARM.wait().await;
            continue;
        };

        let edge = async {
            match polarity {
                EdgePolarity::Falling => trigger.wait_for_falling_edge().await,
                EdgePolarity::Rising => trigger.wait_for_rising_edge().await,
            }
        };

        match select(edge, REARM.wait()).await {
            Either::First(()) => {
                let response = CONTROLLER.edge(polarity, FirmwareInstant::now());
                if response.accepted {
                    defmt::debug!("{=str} edge accepted", polarity.label());
                } else {
                    defmt::trace!("{=str} edge ignored", polarity.label());
                }
                if response.activated {
                    defmt::info!("pattern decoded, burst starts next tick");
                }
            }
            // A timeout reset fired while we were waiting; loop back and
            // re-read the armed polarity.
            Either::Second(()) => {}
        }
    }
}
