//! Time sources for the timer service.
//!
//! The kernel does not own any clock hardware. A [`TimeSource`] is injected into the
//! timer service and supplies the monotonic time, the sleep primitive used by the
//! dispatch loop and the wake-up used when a command is queued.

use crate::{Hertz, Instant, KernelError, KernelResult, Milliseconds};
use core::sync::atomic::{AtomicU32, Ordering};
use spin::Mutex;

/// Largest value accepted by the 24-bit SysTick reload register.
const K_SYSTICK_MAX_RELOAD: u32 = 0x00FF_FFFF;

/// Monotonic clock and sleep primitive supplied by the platform.
pub trait TimeSource: Sync {
    /// Current time.
    fn now(&self) -> Instant;

    /// Sleeps until `deadline` is reached or [`TimeSource::notify`] is called, whichever
    /// comes first. `None` means there is no deadline. Spurious early returns are allowed.
    fn wait_until(&self, deadline: Option<Instant>);

    /// Wakes a context sleeping in [`TimeSource::wait_until`].
    fn notify(&self) {}

    /// Backs off while waiting for a resource (used while the command queue is full).
    fn relax(&self) {
        core::hint::spin_loop();
    }
}

/// Blocks the calling context for `p_duration`.
///
/// # Parameters
/// - `p_clock`: The time source to sleep on.
/// - `p_duration`: How long to block.
pub fn delay(p_clock: &dyn TimeSource, p_duration: Milliseconds) {
    let l_target = p_clock.now() + p_duration;
    while p_clock.now() < l_target {
        p_clock.wait_until(Some(l_target));
    }
}

/// Computes the SysTick reload value producing one interrupt every `p_period`.
///
/// # Errors
/// Returns [`KernelError::InvalidArgument`] when the period is zero or does not fit in the
/// 24-bit reload register at the given core frequency.
pub fn systick_reload(p_core_frequency: Hertz, p_period: Milliseconds) -> KernelResult<u32> {
    let l_cycles = (p_core_frequency.to_u32() as u64 / 1000) * p_period.to_u32() as u64;
    if l_cycles == 0 {
        return Err(KernelError::InvalidArgument("tick period must be greater than zero"));
    }
    if l_cycles - 1 > K_SYSTICK_MAX_RELOAD as u64 {
        return Err(KernelError::InvalidArgument("tick period is too long for SysTick"));
    }
    Ok((l_cycles - 1) as u32)
}

/// Tick counter fed by a periodic interrupt.
///
/// The counter is kept as two 32-bit halves so that it works on cores without 64-bit
/// atomics. [`TickCounter::tick`] must only be called from a single interrupt handler;
/// readers on the same core never observe a half-updated value.
pub struct TickCounter {
    low: AtomicU32,
    high: AtomicU32,
    tick_period: Milliseconds,
}

impl TickCounter {
    pub const fn new(p_tick_period: Milliseconds) -> Self {
        TickCounter {
            low: AtomicU32::new(0),
            high: AtomicU32::new(0),
            tick_period: p_tick_period,
        }
    }

    /// Advances the counter by one tick.
    pub fn tick(&self) {
        if self.low.fetch_add(1, Ordering::AcqRel) == u32::MAX {
            self.high.fetch_add(1, Ordering::Release);
        }
    }

    /// Number of ticks since start.
    pub fn ticks(&self) -> u64 {
        loop {
            let l_high = self.high.load(Ordering::Acquire);
            let l_low = self.low.load(Ordering::Acquire);
            if l_high == self.high.load(Ordering::Acquire) {
                return ((l_high as u64) << 32) | l_low as u64;
            }
        }
    }

    /// Current time derived from the tick count.
    pub fn now(&self) -> Instant {
        Instant::from_millis(self.ticks() * self.tick_period.to_u32() as u64)
    }

    pub fn tick_period(&self) -> Milliseconds {
        self.tick_period
    }
}

/// A clock that only moves when told to.
///
/// Sleeping on it jumps straight to the deadline, and [`TimeSource::relax`] advances it by
/// one millisecond, so code written against [`TimeSource`] can be driven deterministically
/// on the host.
pub struct ManualClock {
    now: Mutex<u64>,
}

impl ManualClock {
    pub const fn new() -> Self {
        ManualClock { now: Mutex::new(0) }
    }

    /// Moves the clock to `p_instant`. The clock never goes backwards.
    pub fn set(&self, p_instant: Instant) {
        let mut l_now = self.now.lock();
        *l_now = (*l_now).max(p_instant.as_millis());
    }

    pub fn advance(&self, p_duration: Milliseconds) {
        *self.now.lock() += p_duration.to_u32() as u64;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> Instant {
        Instant::from_millis(*self.now.lock())
    }

    fn wait_until(&self, p_deadline: Option<Instant>) {
        if let Some(l_deadline) = p_deadline {
            self.set(l_deadline);
        }
    }

    fn relax(&self) {
        self.advance(Milliseconds(1));
    }
}
