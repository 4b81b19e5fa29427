//! This module defines the `HalError` and `HalErrorLevel` enumerations and their associated
//! functionality. It provides a structured way to represent hardware abstraction layer (HAL)
//! related errors with different severity levels and format them for the console.

use crate::HalError::{
    IncompatibleAction, InterfaceBadConfig, InterfaceNotConfigured, WriteError,
};
use crate::HalErrorLevel::{Critical, Error, Fatal};
use heapless::{String, format};

pub type HalResult<T> = Result<T, HalError>;

/// Represents the severity levels of hardware abstraction layer (HAL) errors.
///
/// # Variants
///
/// - `Fatal`
///   The interface is unusable and the system cannot keep running.
///
/// - `Critical`
///   The interface is misconfigured; the caller should stop using it.
///
/// - `Error`
///   A single action failed and might succeed when retried.
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HalErrorLevel {
    Fatal,
    Critical,
    Error,
}

impl HalErrorLevel {
    /// Converts the `HalErrorLevel` enum variant into a corresponding string slice representation.
    ///
    /// # Returns
    ///
    /// - `"HAL Fatal error : "` for `HalErrorLevel::Fatal` variant.
    /// - `"HAL Critical error : "` for `HalErrorLevel::Critical` variant.
    /// - `"HAL Error : "` for `HalErrorLevel::Error` variant.
    pub fn as_str(&self) -> &str {
        match self {
            Fatal => "HAL Fatal error : ",
            Critical => "HAL Critical error : ",
            Error => "HAL Error : ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HalError {
    /// The action kind (first field) cannot be applied to the interface (second field).
    IncompatibleAction(&'static str, &'static str),
    /// The driver rejected a write on the named interface.
    WriteError(&'static str),
    /// The named interface was used before being configured.
    InterfaceNotConfigured(&'static str),
    /// The named interface has an invalid configuration (second field is the reason).
    InterfaceBadConfig(&'static str, &'static str),
}

impl HalError {
    /// Converts the error into a formatted message prefixed by its severity.
    ///
    /// # Returns
    /// A `String` of at most 256 bytes. Messages that do not fit are truncated to the
    /// severity prefix rather than panicking.
    pub fn to_string(&self) -> String<256> {
        let mut l_msg = String::new();
        l_msg.push_str(self.severity().as_str()).unwrap_or(());

        let l_detail: String<200> = match self {
            IncompatibleAction(l_action, l_interface) => format!(
                200;
                "Action {} is not compatible with interface {}",
                l_action,
                l_interface
            )
            .unwrap_or_default(),
            WriteError(l_ift) => {
                format!(200; "Error during write on interface {}", l_ift).unwrap_or_default()
            }
            InterfaceNotConfigured(l_ift) => {
                format!(200; "Interface {} is not configured", l_ift).unwrap_or_default()
            }
            InterfaceBadConfig(l_ift, l_err) => {
                format!(200; "Wrong configuration for interface {}: {}", l_ift, l_err)
                    .unwrap_or_default()
            }
        };
        l_msg.push_str(l_detail.as_str()).unwrap_or(());
        l_msg
    }

    /// Returns the severity level of the `HalError` instance.
    pub fn severity(&self) -> HalErrorLevel {
        match self {
            IncompatibleAction(_, _) => Error,
            WriteError(_) => Error,
            InterfaceNotConfigured(_) => Critical,
            InterfaceBadConfig(_, _) => Critical,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_is_prefixed_by_severity() {
        let l_err = WriteError("SERIAL_MAIN");
        assert_eq!(
            l_err.to_string().as_str(),
            "HAL Error : Error during write on interface SERIAL_MAIN"
        );

        let l_err = InterfaceNotConfigured("LED");
        assert_eq!(l_err.severity(), Critical);
        assert!(l_err.to_string().starts_with("HAL Critical error : "));
    }

    #[test]
    fn incompatible_action_names_both_sides() {
        let l_msg = IncompatibleAction("UART Write", "LED").to_string();
        assert!(l_msg.contains("UART Write"));
        assert!(l_msg.contains("interface LED"));
    }
}
