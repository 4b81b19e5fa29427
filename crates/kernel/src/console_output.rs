use crate::{KernelError, KernelResult};
use hal_interface::{Interface, InterfaceWriteActions, UartWriteActions};

/// Console output formatting directives.
///
/// This enum describes how a given string should be emitted to the console, including
/// whether to surround it with newlines.
pub enum ConsoleFormatting<'a> {
    /// New line is added after write.
    StrNewLineAfter(&'a str),
    /// New lines are added before and after write.
    StrNewLineBoth(&'a str),
    /// Only adds a new line.
    Newline,
}

/// Line-oriented console on top of a UART [`Interface`].
///
/// Newlines are emitted as CRLF so that the output renders correctly on a serial terminal.
#[derive(Clone, Copy)]
pub struct ConsoleOutput<'a> {
    interface: &'a dyn Interface,
}

impl<'a> ConsoleOutput<'a> {
    /// Creates a console writing to `p_interface`.
    ///
    /// # Parameters
    /// - `p_interface`: A UART interface accepting [`InterfaceWriteActions::UartWrite`].
    pub fn new(p_interface: &'a dyn Interface) -> Self {
        ConsoleOutput {
            interface: p_interface,
        }
    }

    /// Writes `p_format` to the console.
    ///
    /// # Errors
    /// Returns [`KernelError::HalError`] if the underlying interface rejects a write. Output
    /// already sent before the failure is not rolled back.
    pub fn write(&self, p_format: &ConsoleFormatting) -> KernelResult<()> {
        match p_format {
            ConsoleFormatting::StrNewLineAfter(l_str) => {
                self.write_str(l_str)?;
                self.new_line()
            }
            ConsoleFormatting::StrNewLineBoth(l_str) => {
                self.new_line()?;
                self.write_str(l_str)?;
                self.new_line()
            }
            ConsoleFormatting::Newline => self.new_line(),
        }
    }

    /// Writes `p_line` followed by CRLF.
    pub fn write_line(&self, p_line: &str) -> KernelResult<()> {
        self.write(&ConsoleFormatting::StrNewLineAfter(p_line))
    }

    /// Clears the terminal with the ANSI sequence `ESC[2J ESC[H`.
    pub fn clear_terminal(&self) -> KernelResult<()> {
        self.send(UartWriteActions::SendString("\x1B[2J\x1B[H"))
    }

    pub fn name(&self) -> &'static str {
        self.interface.name()
    }

    #[inline(always)]
    fn new_line(&self) -> KernelResult<()> {
        self.send(UartWriteActions::SendString("\r\n"))
    }

    fn write_str(&self, p_data: &str) -> KernelResult<()> {
        self.send(UartWriteActions::SendString(p_data))
    }

    fn send(&self, p_action: UartWriteActions) -> KernelResult<()> {
        self.interface
            .write(InterfaceWriteActions::UartWrite(p_action))
            .map_err(KernelError::HalError)
    }
}
