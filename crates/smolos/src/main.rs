#![no_std]
#![no_main]

//! SmolOS firmware entry point.
//!
//! Brings up the board, runs the software timer demo setup and then hands the main
//! context over to the timer dispatch loop.

mod board;
mod boot;
mod systick;

use crate::boot::BootConfig;
use cortex_m_rt::{ExceptionFrame, entry, exception};
use cortex_m_semihosting::hprintln;
use panic_semihosting as _;

#[entry]
fn main() -> ! {
    if let Err(l_err) = boot::boot(&BootConfig::default()) {
        panic!("{}", l_err.to_string());
    }

    // The dispatch loop only returns once the timer service is shut down.
    #[allow(clippy::empty_loop)]
    loop {}
}

/// Cortex-M HardFault exception handler.
///
/// Prints the exception frame over semihosting and stops.
#[exception]
unsafe fn HardFault(p_frame: &ExceptionFrame) -> ! {
    hprintln!("{:#?}", p_frame);

    #[allow(clippy::empty_loop)]
    loop {}
}
