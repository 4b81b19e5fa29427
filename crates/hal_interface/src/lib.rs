#![cfg_attr(not(test), no_std)]

//! Hardware interface vocabulary shared by the kernel, the applications and the board
//! support code.
//!
//! Drivers expose each peripheral (a GPIO pin, a UART) as an [`Interface`] that accepts
//! [`InterfaceWriteActions`]. Upper layers never touch the peripheral types directly.

mod errors;
mod interface_write;

pub use errors::*;
pub use interface_write::*;

/// A named hardware interface accepting write actions.
///
/// Implementations must be usable through a shared reference from several execution
/// contexts (setup code and the timer dispatch context), hence the `Sync` bound.
pub trait Interface: Sync {
    /// Human-readable name of the interface, used in error messages.
    fn name(&self) -> &'static str;

    /// Performs a write action on the interface.
    ///
    /// # Errors
    /// - [`HalError::IncompatibleAction`] if the action kind does not match the interface.
    /// - [`HalError::WriteError`] if the driver rejects the write.
    /// - [`HalError::InterfaceNotConfigured`] if the interface has not been set up yet.
    fn write(&self, action: InterfaceWriteActions) -> HalResult<()>;

    /// Prepares the interface for use (e.g. switches a pin to output mode).
    ///
    /// The default implementation does nothing, for interfaces configured at construction.
    fn configure(&self) -> HalResult<()> {
        Ok(())
    }
}
