#![cfg_attr(not(test), no_std)]

//! Kernel services: software timers, time keeping, console output and error management.
//!
//! The kernel is hardware agnostic. Time comes from an injected [`TimeSource`] and all I/O
//! goes through `hal_interface::Interface` implementations provided by the board crate.

#[macro_use]
mod log;

mod clock;
mod console_output;
mod errors_mgt;
mod timers;
mod types;

#[cfg(feature = "log-base")]
#[doc(hidden)]
pub use cortex_m_semihosting as __semihosting;

pub use clock::{ManualClock, TickCounter, TimeSource, delay, systick_reload};
pub use console_output::{ConsoleFormatting, ConsoleOutput};
pub use errors_mgt::ErrorsManager;
pub use timers::{
    BlockTime, NO_WAIT, TimerCallback, TimerHandle, TimerMode, TimerService, TimerState,
    TimerStats,
};
pub use types::*;
