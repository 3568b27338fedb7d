//! XDP classifier that counts IPv4 traffic and drops TCP to port 80
//!
//! This probe:
//! - Attaches at the XDP hook of one interface
//! - Parses Ethernet, IPv4 and the TCP/UDP destination port
//! - Bumps slots of the `packet_cnt` array with atomic adds
//! - Passes every frame except TCP/80, including frames it cannot parse
//!
//! Note: This binary must be built for the bpfel-unknown-none target.

#![no_std]
#![no_main]

use core::mem;
use core::sync::atomic::{AtomicU64, Ordering};

use aya_ebpf::{
    macros::{map, xdp},
    maps::Array,
    programs::XdpContext,
};
use aya_log_ebpf::debug;
use xdpstat_common::{
    classify,
    headers::{Header, PacketView},
    CounterId, CounterSink, Verdict,
};

#[map(name = "packet_cnt")]
static PACKET_CNT: Array<u64> = Array::with_max_entries(CounterId::COUNT as u32, 0);

/// Bounds-checked view over `[ctx.data(), ctx.data_end())`.
struct XdpPacket<'a>(&'a XdpContext);

impl PacketView for XdpPacket<'_> {
    #[inline(always)]
    fn load<H: Header>(&self, offset: usize) -> Option<H> {
        let start = self.0.data();
        let end = self.0.data_end();

        if start + offset + mem::size_of::<H>() > end {
            return None;
        }
        // SAFETY: the verifier has seen the comparison against data_end above
        Some(unsafe { ((start + offset) as *const H).read_unaligned() })
    }
}

/// Counter sink backed by the `packet_cnt` map.
struct MapCounters;

impl CounterSink for MapCounters {
    #[inline(always)]
    fn increment(&self, id: CounterId) {
        if let Some(slot) = PACKET_CNT.get_ptr_mut(id.index()) {
            // SAFETY: array map values live as long as the map and are 8-byte aligned
            unsafe { AtomicU64::from_ptr(slot) }.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[xdp]
pub fn xdp_count_and_filter(ctx: XdpContext) -> u32 {
    let verdict = classify(&XdpPacket(&ctx), &MapCounters);
    if verdict == Verdict::Drop {
        debug!(&ctx, "dropping TCP/80 packet");
    }
    verdict.action()
}

#[cfg(not(test))]
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    loop {}
}
