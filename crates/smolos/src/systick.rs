use crate::boot::BootConfig;
use cortex_m::peripheral::SYST;
use cortex_m::peripheral::syst::SystClkSource;
use cortex_m_rt::exception;
use kernel::{Instant, KernelResult, Milliseconds, TickCounter, TimeSource, systick_reload};

/// System tick counter, advanced by the SysTick exception.
static G_TICKS: TickCounter = TickCounter::new(Milliseconds(1));

/// Starts SysTick so that it fires every `systick_period`.
///
/// # Errors
/// Returns [`kernel::KernelError::InvalidArgument`] if the period does not match the tick
/// counter resolution or cannot be reached at the core frequency.
pub fn init_systick(mut p_syst: SYST, p_config: &BootConfig) -> KernelResult<()> {
    if p_config.systick_period != G_TICKS.tick_period() {
        return Err(kernel::KernelError::InvalidArgument(
            "SysTick period must match the tick counter",
        ));
    }
    let l_reload = systick_reload(p_config.core_frequency, p_config.systick_period)?;

    p_syst.set_clock_source(SystClkSource::Core);
    p_syst.set_reload(l_reload);
    p_syst.clear_current();
    p_syst.enable_interrupt();
    p_syst.enable_counter();
    Ok(())
}

#[exception]
fn SysTick() {
    G_TICKS.tick();
}

/// Time source backed by SysTick.
///
/// Sleeping puts the core in WFI; the next SysTick (at most one tick later) wakes it up,
/// so no explicit notification is needed.
pub struct SysTickTimeSource;

impl TimeSource for SysTickTimeSource {
    fn now(&self) -> Instant {
        G_TICKS.now()
    }

    fn wait_until(&self, p_deadline: Option<Instant>) {
        match p_deadline {
            Some(l_deadline) if G_TICKS.now() >= l_deadline => {}
            _ => cortex_m::asm::wfi(),
        }
    }
}
