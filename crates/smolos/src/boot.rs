use crate::board::{BoardLed, BoardSerial};
use crate::systick::{SysTickTimeSource, init_systick};
use embassy_stm32::gpio::Flex;
use embassy_stm32::usart::{self, Uart};
use hal_interface::HalError;
use kernel::{ConsoleOutput, ErrorsManager, Hertz, KernelError, KernelResult, Milliseconds, TimerService};
use kernel_apps::sw_timers::{DemoTimer, SwTimersApp, SwTimersConfig};

/// Core clock after reset (HSI, no PLL).
const K_CORE_FREQUENCY: Hertz = Hertz::mhz(16);
const K_SYSTICK_PERIOD: Milliseconds = Milliseconds(1);
const K_UART_BAUDRATE: u32 = 115_200;

/// Number of software timers the service can hold.
const K_MAX_TIMERS: usize = 4;
/// Depth of the timer command queue.
const K_TIMER_QUEUE_LEN: usize = 8;

const K_SERIAL_NAME: &str = "SERIAL_MAIN";

/// Configuration parameters for the boot process.
pub struct BootConfig {
    /// Core clock frequency, used to program SysTick.
    pub core_frequency: Hertz,
    /// SysTick interrupt period.
    pub systick_period: Milliseconds,
    /// Baud rate of the console UART.
    pub uart_baudrate: u32,
}

impl Default for BootConfig {
    fn default() -> Self {
        BootConfig {
            core_frequency: K_CORE_FREQUENCY,
            systick_period: K_SYSTICK_PERIOD,
            uart_baudrate: K_UART_BAUDRATE,
        }
    }
}

/// Initializes the board, starts the software timer demo and runs the timer dispatch
/// loop on the calling context.
///
/// This function performs the following steps:
/// 1. Initializes the STM32 peripherals and starts SysTick.
/// 2. Builds the LED and console interfaces.
/// 3. Initializes the errors manager.
/// 4. Runs the demo setup.
/// 5. Enters the timer dispatch loop.
///
/// # Errors
/// Returns an error if any initialization step fails. Once the dispatch loop is entered,
/// this function does not return.
pub fn boot(p_config: &BootConfig) -> KernelResult<()> {
    let l_peripherals = embassy_stm32::init(embassy_stm32::Config::default());
    let l_core = cortex_m::Peripherals::take().ok_or(KernelError::HalError(
        HalError::InterfaceBadConfig("SYSTICK", "core peripherals already taken"),
    ))?;
    init_systick(l_core.SYST, p_config)?;

    // Interfaces
    let l_act_led = BoardLed::new("ACT_LED", Flex::new(l_peripherals.PJ5));
    let l_err_led = BoardLed::new("ERR_LED", Flex::new(l_peripherals.PJ13));
    let mut l_uart_config = usart::Config::default();
    l_uart_config.baudrate = p_config.uart_baudrate;
    let l_serial = BoardSerial::new(
        K_SERIAL_NAME,
        Uart::new_blocking(
            l_peripherals.USART1,
            l_peripherals.PA10,
            l_peripherals.PA9,
            l_uart_config,
        )
        .map_err(|_| {
            KernelError::HalError(HalError::InterfaceBadConfig(
                K_SERIAL_NAME,
                "unsupported UART configuration",
            ))
        })?,
    );
    let l_console = ConsoleOutput::new(&l_serial);
    l_console.clear_terminal()?;

    // Errors manager
    let l_errors = ErrorsManager::new(Some(&l_err_led), Some(l_console));
    l_errors.init()?;
    kernel::info!("Core frequency is {}", p_config.core_frequency);

    // Software timers
    let l_clock = SysTickTimeSource;
    let l_app = SwTimersApp::new(&l_act_led, l_console, &l_errors);
    let l_service: TimerService<DemoTimer, K_MAX_TIMERS, K_TIMER_QUEUE_LEN> =
        TimerService::new(&l_clock);
    l_app.setup(&l_service, &l_clock, &SwTimersConfig::default())?;

    kernel::info!("Timer dispatch loop started");
    l_service.run();
    Ok(())
}
