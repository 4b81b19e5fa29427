//! Logging macros for the kernel.
//!
//! With the `log-base` feature the macros print over semihosting, prefixed by the log
//! level. Without it they compile to nothing (the arguments are still type-checked).
//! Category macros such as [`timer_log!`](crate::timer_log) are enabled separately so
//! that noisy traces can be switched on one subsystem at a time.

#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => { $crate::__log!("DEBUG", $($arg)*) };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => { $crate::__log!("INFO", $($arg)*) };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => { $crate::__log!("WARN", $($arg)*) };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => { $crate::__log!("ERROR", $($arg)*) };
}

#[cfg(feature = "log-base")]
#[doc(hidden)]
#[macro_export]
macro_rules! __log {
    ($level:literal, $($arg:tt)*) => {
        $crate::__semihosting::hprintln!("[{}] {}", $level, format_args!($($arg)*))
    };
}

#[cfg(not(feature = "log-base"))]
#[doc(hidden)]
#[macro_export]
macro_rules! __log {
    ($level:literal, $($arg:tt)*) => {{
        let _ = format_args!($($arg)*);
    }};
}

// Timer service logging macros
#[cfg(feature = "log-timer")]
#[macro_export]
macro_rules! timer_log {
    ($level:ident, $($args:tt)*) => { $crate::$level!($($args)*); };
}

#[cfg(not(feature = "log-timer"))]
#[macro_export]
macro_rules! timer_log {
    ($level:ident, $($args:tt)*) => {{
        let _ = format_args!($($args)*);
    }};
}
