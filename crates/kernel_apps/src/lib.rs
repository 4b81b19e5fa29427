#![cfg_attr(not(test), no_std)]

//! Applications running on top of the kernel.

pub mod sw_timers;
