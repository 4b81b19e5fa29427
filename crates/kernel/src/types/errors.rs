use crate::KernelError::{
    ChannelClosed, HalError, InvalidArgument, InvalidHandle, Timeout, TimerTableFull,
};
use crate::KernelErrorLevel::{Critical, Error, Fatal};
use hal_interface::{HalError as HalErrorDef, HalErrorLevel};
use heapless::{String, format};

pub type KernelResult<T> = Result<T, KernelError>;

#[derive(Debug, Clone, Copy, PartialOrd, PartialEq)]
pub enum KernelErrorLevel {
    Error,
    Critical,
    Fatal,
}

impl KernelErrorLevel {
    pub fn as_str(&self) -> &str {
        match self {
            Fatal => "Fatal error : ",
            Critical => "Critical error : ",
            Error => "Error : ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KernelError {
    /// A hardware interface failed.
    HalError(HalErrorDef),
    /// A timer was created with a zero period or without a callback.
    InvalidArgument(&'static str),
    /// The timer handle was deleted or never created.
    InvalidHandle,
    /// The command queue stayed full for the whole block time.
    Timeout,
    /// The timer service was shut down.
    ChannelClosed,
    /// Every timer slot (capacity given) is in use.
    TimerTableFull(usize),
}

impl KernelError {
    pub fn to_string(&self) -> String<256> {
        let mut l_msg = String::new();
        match self {
            HalError(l_e) => l_msg.push_str(l_e.to_string().as_str()).unwrap_or(()),
            InvalidArgument(l_reason) => {
                l_msg.push_str(self.severity().as_str()).unwrap_or(());
                l_msg
                    .push_str(
                        format!(200; "Invalid timer argument : {}", l_reason)
                            .unwrap_or_default()
                            .as_str(),
                    )
                    .unwrap_or(());
            }
            InvalidHandle => {
                l_msg.push_str(self.severity().as_str()).unwrap_or(());
                l_msg
                    .push_str("Timer handle is not valid")
                    .unwrap_or(());
            }
            Timeout => {
                l_msg.push_str(self.severity().as_str()).unwrap_or(());
                l_msg
                    .push_str("Timer command queue is full")
                    .unwrap_or(());
            }
            ChannelClosed => {
                l_msg.push_str(self.severity().as_str()).unwrap_or(());
                l_msg
                    .push_str("Timer service is shut down")
                    .unwrap_or(());
            }
            TimerTableFull(l_capacity) => {
                l_msg.push_str(self.severity().as_str()).unwrap_or(());
                l_msg
                    .push_str(
                        format!(200; "Cannot create timer : all {} slots are used", l_capacity)
                            .unwrap_or_default()
                            .as_str(),
                    )
                    .unwrap_or(());
            }
        }
        l_msg
    }

    /// Returns the severity level of the kernel error.
    ///
    /// HAL errors keep the severity assigned by the HAL. A closed command channel is
    /// fatal since no timer can ever be armed again.
    pub fn severity(&self) -> KernelErrorLevel {
        match self {
            HalError(l_err) => match l_err.severity() {
                HalErrorLevel::Fatal => Fatal,
                HalErrorLevel::Critical => Critical,
                HalErrorLevel::Error => Error,
            },
            InvalidArgument(_) => Error,
            InvalidHandle => Error,
            Timeout => Error,
            ChannelClosed => Fatal,
            TimerTableFull(_) => Critical,
        }
    }

    /// Indicates whether retrying the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Timeout)
    }
}
