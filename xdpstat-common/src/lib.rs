//! Types shared between the XDP probe (kernel) and the controller (userspace)
//!
//! This crate must stay:
//! - `no_std` when built for the eBPF target
//! - free of allocation and unbounded loops
//! - `#[repr(C)]` wherever a layout crosses the kernel boundary
//!
//! The classification routine lives here rather than in the probe so the exact
//! code the verifier sees is also exercised by ordinary unit tests.

#![cfg_attr(not(feature = "userspace"), no_std)]

pub mod classifier;
pub mod counters;
pub mod headers;

pub use classifier::{classify, Verdict};
pub use counters::{CounterId, CounterSink, CounterTable};
pub use headers::PacketView;

/// Name of the XDP entry point inside the compiled probe object.
pub const PROGRAM_NAME: &str = "xdp_count_and_filter";

/// Name of the shared counter array inside the compiled probe object.
pub const COUNTER_MAP_NAME: &str = "packet_cnt";
