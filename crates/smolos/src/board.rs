//! Board interfaces of the STM32F769I-DISCO.
//!
//! Each peripheral is wrapped in a spin lock so that it can be shared between the setup
//! code and the timer callbacks.

use core::sync::atomic::{AtomicBool, Ordering};
use embassy_stm32::gpio::{Flex, Speed};
use embassy_stm32::mode::Blocking;
use embassy_stm32::usart::Uart;
use hal_interface::{
    GpioWriteAction, HalError, HalResult, Interface, InterfaceWriteActions,
};
use spin::Mutex;

/// A GPIO pin driving an LED. The pin stays floating until configured.
pub struct BoardLed {
    name: &'static str,
    pin: Mutex<Flex<'static>>,
    configured: AtomicBool,
}

impl BoardLed {
    pub fn new(p_name: &'static str, p_pin: Flex<'static>) -> Self {
        BoardLed {
            name: p_name,
            pin: Mutex::new(p_pin),
            configured: AtomicBool::new(false),
        }
    }
}

impl Interface for BoardLed {
    fn name(&self) -> &'static str {
        self.name
    }

    fn write(&self, p_action: InterfaceWriteActions) -> HalResult<()> {
        let l_action = p_action.gpio(self.name)?;
        if !self.configured.load(Ordering::Acquire) {
            return Err(HalError::InterfaceNotConfigured(self.name));
        }

        let mut l_pin = self.pin.lock();
        match l_action {
            GpioWriteAction::Set => l_pin.set_high(),
            GpioWriteAction::Clear => l_pin.set_low(),
            GpioWriteAction::Toggle => l_pin.toggle(),
        }
        Ok(())
    }

    fn configure(&self) -> HalResult<()> {
        self.pin.lock().set_as_output(Speed::Low);
        self.configured.store(true, Ordering::Release);
        Ok(())
    }
}

/// A UART used as text console.
pub struct BoardSerial {
    name: &'static str,
    uart: Mutex<Uart<'static, Blocking>>,
}

impl BoardSerial {
    pub fn new(p_name: &'static str, p_uart: Uart<'static, Blocking>) -> Self {
        BoardSerial {
            name: p_name,
            uart: Mutex::new(p_uart),
        }
    }
}

impl Interface for BoardSerial {
    fn name(&self) -> &'static str {
        self.name
    }

    fn write(&self, p_action: InterfaceWriteActions) -> HalResult<()> {
        let l_action = p_action.uart(self.name)?;
        let mut l_scratch = [0u8; 1];
        self.uart
            .lock()
            .blocking_write(l_action.bytes(&mut l_scratch))
            .map_err(|_| HalError::WriteError(self.name))
    }
}
