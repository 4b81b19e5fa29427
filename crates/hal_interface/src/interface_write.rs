use crate::GpioWriteAction::{Clear, Set, Toggle};
use crate::InterfaceWriteActions::{GpioWrite, UartWrite};
use crate::UartWriteActions::{SendChar, SendString};
use crate::{HalError, HalResult};

/// High-level enum representing all possible write actions on any hardware interface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InterfaceWriteActions<'a> {
    /// Write action for GPIO interfaces.
    GpioWrite(GpioWriteAction),
    /// Write action for UART interfaces.
    UartWrite(UartWriteActions<'a>),
}

impl<'a> InterfaceWriteActions<'a> {
    pub fn name(&self) -> &'static str {
        match self {
            GpioWrite(_) => "GPIO Write",
            UartWrite(_) => "UART Write",
        }
    }

    /// Extracts the GPIO action, or reports that `p_interface` cannot perform this action.
    ///
    /// # Errors
    /// Returns [`HalError::IncompatibleAction`] when the action is not a GPIO write.
    pub fn gpio(self, p_interface: &'static str) -> HalResult<GpioWriteAction> {
        match self {
            GpioWrite(l_action) => Ok(l_action),
            _ => Err(HalError::IncompatibleAction(self.name(), p_interface)),
        }
    }

    /// Extracts the UART action, or reports that `p_interface` cannot perform this action.
    ///
    /// # Errors
    /// Returns [`HalError::IncompatibleAction`] when the action is not a UART write.
    pub fn uart(self, p_interface: &'static str) -> HalResult<UartWriteActions<'a>> {
        match self {
            UartWrite(l_action) => Ok(l_action),
            _ => Err(HalError::IncompatibleAction(self.name(), p_interface)),
        }
    }
}

/// Represents write operations specific to UART interfaces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UartWriteActions<'a> {
    /// Send a single byte.
    SendChar(u8),
    /// Send a string of bytes.
    SendString(&'a str),
}

impl UartWriteActions<'_> {
    /// Returns the raw bytes carried by the action.
    ///
    /// `p_scratch` backs the single byte of [`UartWriteActions::SendChar`].
    pub fn bytes<'b>(&'b self, p_scratch: &'b mut [u8; 1]) -> &'b [u8] {
        match self {
            SendChar(l_c) => {
                p_scratch[0] = *l_c;
                &p_scratch[..]
            }
            SendString(l_str) => l_str.as_bytes(),
        }
    }
}

/// Represents possible actions on a GPIO pin.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GpioWriteAction {
    /// Set the pin to a high state.
    Set = 0,
    /// Set the pin to a low state.
    Clear = 1,
    /// Toggle the pin state.
    Toggle = 2,
}

/// Logic level of a digital output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PinLevel {
    High,
    Low,
}

impl PinLevel {
    /// Returns the level reached after applying `p_action` to a pin currently at `self`.
    pub fn apply(self, p_action: GpioWriteAction) -> PinLevel {
        match (p_action, self) {
            (Set, _) => PinLevel::High,
            (Clear, _) => PinLevel::Low,
            (Toggle, PinLevel::High) => PinLevel::Low,
            (Toggle, PinLevel::Low) => PinLevel::High,
        }
    }
}

impl From<PinLevel> for GpioWriteAction {
    fn from(p_level: PinLevel) -> Self {
        match p_level {
            PinLevel::High => Set,
            PinLevel::Low => Clear,
        }
    }
}
