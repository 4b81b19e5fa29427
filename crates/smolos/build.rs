//! Build script for the `smolos` firmware.
//!
//! `memory.x` is generated by `embassy-stm32` (feature `memory-x`), so the only job left
//! here is to pass the linker arguments required by `cortex-m-rt`.

fn main() {
    // `--nmagic` is required when memory regions are not aligned to 0x10000.
    println!("cargo:rustc-link-arg-bins=--nmagic");

    // Use the linker script provided by cortex-m-rt (it includes `memory.x`).
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
}
