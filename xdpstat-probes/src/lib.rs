//! eBPF programs for xdpstat
//!
//! The only program is the XDP classifier in `src/bin/xdp_counter.rs`. It is
//! built for `bpfel-unknown-none` and the resulting object is handed to the
//! controller on its command line:
//!
//! ```text
//! cargo +nightly build --release --target bpfel-unknown-none -Z build-std=core
//! ```
//!
//! Classification logic lives in `xdpstat-common` so it can be unit tested on
//! the host.

#![cfg_attr(not(test), no_std)]

#[cfg(not(test))]
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    loop {}
}
