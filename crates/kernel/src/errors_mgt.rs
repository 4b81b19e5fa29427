//! Error management for the kernel.
//!
//! The `ErrorsManager` reacts to runtime errors by updating an error LED and printing the
//! error message on the console.
//!
//! # Error LED behavior
//! - **Fatal**: LED forced ON, then the system panics.
//! - **Critical**: LED forced ON, message printed.
//! - **Error**: message printed, LED left as is.

use crate::KernelErrorLevel::{Critical, Error, Fatal};
use crate::console_output::ConsoleFormatting::StrNewLineBoth;
use crate::{ConsoleOutput, KernelError, KernelErrorLevel, KernelResult};
use core::sync::atomic::{AtomicU8, Ordering};
use hal_interface::{GpioWriteAction, Interface, InterfaceWriteActions};

const K_NO_ERROR: u8 = 0;

/// Centralized manager for kernel error handling.
///
/// Tracks the highest severity observed so far. The manager is shared by reference between
/// the setup code and the timer callbacks, so its state is atomic.
pub struct ErrorsManager<'a> {
    /// Optional LED used for error indication.
    err_led: Option<&'a dyn Interface>,
    /// Console on which messages are printed.
    console: Option<ConsoleOutput<'a>>,
    /// Highest-severity error observed so far, `K_NO_ERROR` if none.
    has_error: AtomicU8,
}

impl<'a> ErrorsManager<'a> {
    /// Creates a manager with no recorded errors.
    ///
    /// # Parameters
    /// - `p_err_led`: Optional GPIO interface used as error LED.
    /// - `p_console`: Optional console on which error messages are printed.
    pub fn new(p_err_led: Option<&'a dyn Interface>, p_console: Option<ConsoleOutput<'a>>) -> Self {
        ErrorsManager {
            err_led: p_err_led,
            console: p_console,
            has_error: AtomicU8::new(K_NO_ERROR),
        }
    }

    /// Configures the error LED (if any) and turns it OFF.
    ///
    /// # Errors
    /// Returns [`KernelError::HalError`] if the LED cannot be configured or written.
    pub fn init(&self) -> KernelResult<()> {
        if let Some(l_led) = self.err_led {
            l_led.configure().map_err(KernelError::HalError)?;
        }
        self.set_err_led(false)
    }

    /// Handles a `KernelError` according to its severity.
    ///
    /// - **Fatal**: LED ON, severity recorded, then panic.
    /// - **Critical**: LED ON, severity recorded, message printed.
    /// - **Error**: severity recorded (unless already higher), message printed.
    ///
    /// LED and console writes are best-effort; a failure while reporting is ignored to
    /// avoid recursive error handling.
    pub fn error_handler(&self, p_err: &KernelError) {
        let l_severity = p_err.severity();
        self.record(l_severity);

        match l_severity {
            Fatal => {
                self.set_err_led(true).unwrap_or(());
                panic!("{}", p_err.to_string())
            }
            Critical => {
                self.set_err_led(true).unwrap_or(());
                self.print(p_err);
            }
            Error => self.print(p_err),
        }
    }

    /// Returns the highest severity handled so far.
    pub fn highest_severity(&self) -> Option<KernelErrorLevel> {
        match self.has_error.load(Ordering::Acquire) {
            1 => Some(Error),
            2 => Some(Critical),
            3 => Some(Fatal),
            _ => None,
        }
    }

    fn record(&self, p_level: KernelErrorLevel) {
        let l_code = match p_level {
            Error => 1,
            Critical => 2,
            Fatal => 3,
        };
        self.has_error.fetch_max(l_code, Ordering::AcqRel);
    }

    fn print(&self, p_err: &KernelError) {
        crate::error!("{}", p_err.to_string().as_str());
        if let Some(l_console) = &self.console {
            l_console
                .write(&StrNewLineBoth(p_err.to_string().as_str()))
                .unwrap_or(());
        }
    }

    fn set_err_led(&self, p_state: bool) -> KernelResult<()> {
        if let Some(l_led) = self.err_led {
            l_led
                .write(InterfaceWriteActions::GpioWrite(if p_state {
                    GpioWriteAction::Set
                } else {
                    GpioWriteAction::Clear
                }))
                .map_err(KernelError::HalError)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hal_interface::{HalResult, PinLevel};
    use std::sync::Mutex;

    struct Led {
        level: Mutex<PinLevel>,
    }

    impl Interface for Led {
        fn name(&self) -> &'static str {
            "ERR_LED"
        }

        fn write(&self, p_action: InterfaceWriteActions) -> HalResult<()> {
            let l_action = p_action.gpio(self.name())?;
            let mut l_level = self.level.lock().unwrap();
            *l_level = l_level.apply(l_action);
            Ok(())
        }
    }

    fn led() -> Led {
        Led {
            level: Mutex::new(PinLevel::High),
        }
    }

    #[test]
    fn init_turns_led_off() {
        let l_led = led();
        let l_mgr = ErrorsManager::new(Some(&l_led), None);
        l_mgr.init().unwrap();
        assert_eq!(*l_led.level.lock().unwrap(), PinLevel::Low);
        assert_eq!(l_mgr.highest_severity(), None);
    }

    #[test]
    fn severity_only_increases() {
        let l_led = led();
        let l_mgr = ErrorsManager::new(Some(&l_led), None);
        l_mgr.init().unwrap();

        l_mgr.error_handler(&KernelError::InvalidHandle);
        assert_eq!(l_mgr.highest_severity(), Some(Error));
        assert_eq!(*l_led.level.lock().unwrap(), PinLevel::Low);

        l_mgr.error_handler(&KernelError::TimerTableFull(2));
        assert_eq!(l_mgr.highest_severity(), Some(Critical));
        assert_eq!(*l_led.level.lock().unwrap(), PinLevel::High);

        l_mgr.error_handler(&KernelError::Timeout);
        assert_eq!(l_mgr.highest_severity(), Some(Critical));
    }

    #[test]
    #[should_panic(expected = "Timer service is shut down")]
    fn fatal_errors_panic() {
        let l_mgr = ErrorsManager::new(None, None);
        l_mgr.error_handler(&KernelError::ChannelClosed);
    }
}
