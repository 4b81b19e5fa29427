//! Software timer demo.
//!
//! Two timers share one callback: a one-shot timer that switches the LED off, and an
//! auto-reload timer that reports every period on the console. The callback tells them
//! apart with the timer identifier.

use hal_interface::{Interface, InterfaceWriteActions, PinLevel};
use kernel::{
    BlockTime, ConsoleFormatting, ConsoleOutput, ErrorsManager, KernelError, KernelResult,
    Milliseconds, TimeSource, TimerCallback, TimerHandle, TimerMode, TimerService, delay,
};

/// One-shot timer period.
pub const K_ONE_SHOT_PERIOD: Milliseconds = Milliseconds(4000);
/// Auto-reload timer period.
pub const K_AUTO_RELOAD_PERIOD: Milliseconds = Milliseconds(1000);
/// Pause before the banner and again before starting the timers.
pub const K_STARTUP_DELAY: Milliseconds = Milliseconds(1000);

/// Identifiers of the demo timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoTimer {
    OneShot,
    AutoReload,
}

/// Demo configuration.
#[derive(Debug, Clone, Copy)]
pub struct SwTimersConfig {
    pub one_shot_period: Milliseconds,
    pub auto_reload_period: Milliseconds,
    pub startup_delay: Milliseconds,
    /// How long `start` may wait for room in the timer command queue.
    pub start_block_time: BlockTime,
}

impl Default for SwTimersConfig {
    fn default() -> Self {
        SwTimersConfig {
            one_shot_period: K_ONE_SHOT_PERIOD,
            auto_reload_period: K_AUTO_RELOAD_PERIOD,
            startup_delay: K_STARTUP_DELAY,
            start_block_time: BlockTime::Forever,
        }
    }
}

/// Handles of the running demo timers.
#[derive(Debug, Clone, Copy)]
pub struct DemoTimers {
    pub one_shot: TimerHandle<DemoTimer>,
    pub auto_reload: TimerHandle<DemoTimer>,
}

/// The demo application. It is also the callback of both timers.
pub struct SwTimersApp<'a> {
    led: &'a dyn Interface,
    console: ConsoleOutput<'a>,
    errors: &'a ErrorsManager<'a>,
}

impl<'a> SwTimersApp<'a> {
    pub fn new(
        p_led: &'a dyn Interface,
        p_console: ConsoleOutput<'a>,
        p_errors: &'a ErrorsManager<'a>,
    ) -> Self {
        SwTimersApp {
            led: p_led,
            console: p_console,
            errors: p_errors,
        }
    }

    /// Prints the banner, creates and starts both timers, then switches the LED on.
    ///
    /// The timers keep running on the dispatch context after this function returns.
    ///
    /// # Parameters
    /// - `p_service`: Timer service the timers are created on.
    /// - `p_clock`: Time source used for the startup delays.
    /// - `p_config`: Periods, delays and start block time.
    ///
    /// # Returns
    /// - `Ok(Some(timers))` when both timers are created. A timer that could not be started
    ///   is reported through the errors manager and the demo goes on with the other one.
    /// - `Ok(None)` when a timer could not be created. The error is reported through the
    ///   errors manager and the demo goes on without timers.
    ///
    /// # Errors
    /// Returns an error if the console or the LED cannot be written.
    pub fn setup<const N: usize, const Q: usize>(
        &'a self,
        p_service: &TimerService<'a, DemoTimer, N, Q>,
        p_clock: &dyn TimeSource,
        p_config: &SwTimersConfig,
    ) -> KernelResult<Option<DemoTimers>> {
        delay(p_clock, p_config.startup_delay);
        self.console.write(&ConsoleFormatting::Newline)?;
        self.console.write_line("Software Timer Demo")?;
        self.console
            .write_line("One one-shot timer and one auto-reload timer")?;

        let l_timers = match self.create_timers(p_service, p_config) {
            Ok(l_timers) => {
                delay(p_clock, p_config.startup_delay);
                self.console.write_line("Starting timers...")?;
                let l_started = p_service
                    .start(l_timers.one_shot, p_config.start_block_time)
                    .and_then(|()| {
                        p_service.start(l_timers.auto_reload, p_config.start_block_time)
                    });
                if let Err(l_err) = l_started {
                    self.console.write_line("Error starting the timers")?;
                    self.errors.error_handler(&l_err);
                }
                Some(l_timers)
            }
            Err(l_err) => {
                self.console.write_line("Error creating the timers")?;
                self.errors.error_handler(&l_err);
                None
            }
        };

        self.led.configure().map_err(KernelError::HalError)?;
        self.set_led(PinLevel::High)?;

        Ok(l_timers)
    }

    fn create_timers<const N: usize, const Q: usize>(
        &'a self,
        p_service: &TimerService<'a, DemoTimer, N, Q>,
        p_config: &SwTimersConfig,
    ) -> KernelResult<DemoTimers> {
        let l_one_shot = p_service.create(
            p_config.one_shot_period,
            TimerMode::OneShot,
            DemoTimer::OneShot,
            Some(self),
        )?;
        let l_auto_reload = p_service.create(
            p_config.auto_reload_period,
            TimerMode::Periodic,
            DemoTimer::AutoReload,
            Some(self),
        )?;

        Ok(DemoTimers {
            one_shot: l_one_shot,
            auto_reload: l_auto_reload,
        })
    }

    fn expired(&self, p_timer: DemoTimer) -> KernelResult<()> {
        match p_timer {
            DemoTimer::OneShot => {
                self.console.write_line("One-shot timer expired")?;
                // Delayed LED switch-off
                self.set_led(PinLevel::Low)
            }
            DemoTimer::AutoReload => self.console.write_line("Auto-reload timer expired"),
        }
    }

    fn set_led(&self, p_level: PinLevel) -> KernelResult<()> {
        self.led
            .write(InterfaceWriteActions::GpioWrite(p_level.into()))
            .map_err(KernelError::HalError)
    }
}

impl TimerCallback<DemoTimer> for SwTimersApp<'_> {
    fn on_expiry(&self, p_timer: TimerHandle<DemoTimer>) {
        if let Err(l_err) = self.expired(p_timer.id()) {
            self.errors.error_handler(&l_err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hal_interface::{GpioWriteAction, HalError, HalResult};
    use kernel::{Instant, KernelErrorLevel, ManualClock};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Pin {
        level: Mutex<Option<PinLevel>>,
        configured: AtomicBool,
        broken: bool,
    }

    impl Pin {
        fn new(p_broken: bool) -> Self {
            Pin {
                level: Mutex::new(None),
                configured: AtomicBool::new(false),
                broken: p_broken,
            }
        }

        fn level(&self) -> Option<PinLevel> {
            *self.level.lock().unwrap()
        }
    }

    impl Interface for Pin {
        fn name(&self) -> &'static str {
            "LED"
        }

        fn write(&self, p_action: InterfaceWriteActions) -> HalResult<()> {
            let l_action = p_action.gpio(self.name())?;
            if !self.configured.load(Ordering::SeqCst) {
                return Err(HalError::InterfaceNotConfigured(self.name()));
            }
            if self.broken && l_action == GpioWriteAction::from(PinLevel::Low) {
                return Err(HalError::WriteError(self.name()));
            }
            let mut l_level = self.level.lock().unwrap();
            *l_level = Some(l_level.unwrap_or(PinLevel::Low).apply(l_action));
            Ok(())
        }

        fn configure(&self) -> HalResult<()> {
            self.configured.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Serial line recording output together with the time it was written.
    struct Serial<'c> {
        clock: &'c ManualClock,
        text: Mutex<String>,
        lines: Mutex<Vec<(u64, String)>>,
    }

    impl<'c> Serial<'c> {
        fn new(p_clock: &'c ManualClock) -> Self {
            Serial {
                clock: p_clock,
                text: Mutex::new(String::new()),
                lines: Mutex::new(Vec::new()),
            }
        }

        fn lines(&self) -> Vec<(u64, String)> {
            self.lines.lock().unwrap().clone()
        }
    }

    impl Interface for Serial<'_> {
        fn name(&self) -> &'static str {
            "SERIAL_MAIN"
        }

        fn write(&self, p_action: InterfaceWriteActions) -> HalResult<()> {
            let l_action = p_action.uart(self.name())?;
            let mut l_scratch = [0u8; 1];
            let l_bytes = l_action.bytes(&mut l_scratch);
            let mut l_text = self.text.lock().unwrap();
            l_text.push_str(std::str::from_utf8(l_bytes).unwrap());
            while let Some(l_end) = l_text.find("\r\n") {
                let l_line: String = l_text.drain(..l_end + 2).collect();
                self.lines.lock().unwrap().push((
                    self.clock.now().as_millis(),
                    l_line.trim_end().to_string(),
                ));
            }
            Ok(())
        }
    }

    fn run_until<const N: usize, const Q: usize>(
        p_service: &TimerService<'_, DemoTimer, N, Q>,
        p_clock: &ManualClock,
        p_end: u64,
    ) {
        let l_end = Instant::from_millis(p_end);
        while let Some(l_next) = p_service.process().filter(|l_next| *l_next <= l_end) {
            p_clock.wait_until(Some(l_next));
        }
        p_clock.set(l_end);
    }

    fn line(p_time: u64, p_text: &str) -> (u64, String) {
        (p_time, p_text.to_string())
    }

    #[test]
    fn demo_output_and_led() {
        let l_clock = ManualClock::new();
        let l_led = Pin::new(false);
        let l_serial = Serial::new(&l_clock);
        let l_errors = ErrorsManager::new(None, Some(ConsoleOutput::new(&l_serial)));
        let l_app = SwTimersApp::new(&l_led, ConsoleOutput::new(&l_serial), &l_errors);
        let l_service: TimerService<DemoTimer, 2, 4> = TimerService::new(&l_clock);

        let l_timers = l_app
            .setup(&l_service, &l_clock, &SwTimersConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(l_timers.one_shot.id(), DemoTimer::OneShot);
        assert_eq!(l_timers.auto_reload.id(), DemoTimer::AutoReload);
        assert_eq!(l_led.level(), Some(PinLevel::High));

        // Timers were started at t=2000.
        run_until(&l_service, &l_clock, 5500);
        assert_eq!(l_led.level(), Some(PinLevel::High));
        run_until(&l_service, &l_clock, 6500);
        assert_eq!(l_led.level(), Some(PinLevel::Low));

        assert_eq!(
            l_serial.lines(),
            vec![
                line(1000, ""),
                line(1000, "Software Timer Demo"),
                line(1000, "One one-shot timer and one auto-reload timer"),
                line(2000, "Starting timers..."),
                line(3000, "Auto-reload timer expired"),
                line(4000, "Auto-reload timer expired"),
                line(5000, "Auto-reload timer expired"),
                line(6000, "One-shot timer expired"),
                line(6000, "Auto-reload timer expired"),
            ]
        );
        assert_eq!(l_service.is_active(l_timers.one_shot), Ok(false));
        assert_eq!(l_service.is_active(l_timers.auto_reload), Ok(true));
        assert_eq!(l_errors.highest_severity(), None);
    }

    #[test]
    fn creation_failure_continues_degraded() {
        let l_clock = ManualClock::new();
        let l_led = Pin::new(false);
        let l_serial = Serial::new(&l_clock);
        let l_errors = ErrorsManager::new(None, Some(ConsoleOutput::new(&l_serial)));
        let l_app = SwTimersApp::new(&l_led, ConsoleOutput::new(&l_serial), &l_errors);
        // Room for a single timer only.
        let l_service: TimerService<DemoTimer, 1, 4> = TimerService::new(&l_clock);

        let l_timers = l_app
            .setup(&l_service, &l_clock, &SwTimersConfig::default())
            .unwrap();
        assert!(l_timers.is_none());
        assert_eq!(l_led.level(), Some(PinLevel::High));
        assert_eq!(l_errors.highest_severity(), Some(KernelErrorLevel::Critical));
        assert_eq!(l_service.process(), None);

        let l_lines = l_serial.lines();
        assert!(l_lines.contains(&line(1000, "Error creating the timers")));
        assert!(!l_lines.iter().any(|(_, l_text)| l_text == "Starting timers..."));
    }

    #[test]
    fn led_failure_in_callback_is_reported() {
        let l_clock = ManualClock::new();
        let l_led = Pin::new(true);
        let l_serial = Serial::new(&l_clock);
        let l_errors = ErrorsManager::new(None, None);
        let l_app = SwTimersApp::new(&l_led, ConsoleOutput::new(&l_serial), &l_errors);
        let l_service: TimerService<DemoTimer, 2, 4> = TimerService::new(&l_clock);
        let l_config = SwTimersConfig {
            one_shot_period: Milliseconds(100),
            auto_reload_period: Milliseconds(50),
            startup_delay: Milliseconds(0),
            start_block_time: kernel::NO_WAIT,
        };

        l_app.setup(&l_service, &l_clock, &l_config).unwrap().unwrap();
        run_until(&l_service, &l_clock, 200);

        assert_eq!(l_errors.highest_severity(), Some(KernelErrorLevel::Error));
        assert_eq!(l_led.level(), Some(PinLevel::High));
        // The auto-reload timer keeps running after the failure.
        let l_expiries = l_serial
            .lines()
            .iter()
            .filter(|(_, l_text)| l_text == "Auto-reload timer expired")
            .count();
        assert_eq!(l_expiries, 4);
    }

    #[test]
    fn start_failure_still_lights_the_led() {
        let l_clock = ManualClock::new();
        let l_led = Pin::new(false);
        let l_serial = Serial::new(&l_clock);
        let l_errors = ErrorsManager::new(None, Some(ConsoleOutput::new(&l_serial)));
        let l_app = SwTimersApp::new(&l_led, ConsoleOutput::new(&l_serial), &l_errors);
        // A single queue entry: the second start finds the queue full.
        let l_service: TimerService<DemoTimer, 2, 1> = TimerService::new(&l_clock);
        let l_config = SwTimersConfig {
            startup_delay: Milliseconds(0),
            start_block_time: kernel::NO_WAIT,
            ..SwTimersConfig::default()
        };

        let l_timers = l_app
            .setup(&l_service, &l_clock, &l_config)
            .unwrap()
            .unwrap();
        assert_eq!(l_led.level(), Some(PinLevel::High));
        assert_eq!(l_errors.highest_severity(), Some(KernelErrorLevel::Error));
        assert!(l_serial.lines().contains(&line(0, "Error starting the timers")));

        // The one-shot timer was started and still switches the LED off.
        run_until(&l_service, &l_clock, 4500);
        assert_eq!(l_led.level(), Some(PinLevel::Low));
        assert_eq!(l_service.is_active(l_timers.auto_reload), Ok(false));
    }
}
