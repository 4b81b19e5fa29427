//! Software timers.
//!
//! A [`TimerService`] owns a fixed number of timers. Each timer has a period, a mode
//! (one-shot or periodic), a caller-defined identifier and a callback invoked on the
//! dispatch context every time the timer expires.

mod command;
mod due_set;
mod service;
mod timer;


pub use command::{BlockTime, NO_WAIT};
pub use service::TimerService;
pub use timer::{TimerCallback, TimerHandle, TimerMode, TimerState, TimerStats};
