//! Per-packet classification
//!
//! Runs once per received frame, before the kernel network stack sees it.
//! Every early exit returns [`Verdict::Pass`]: a frame that cannot be parsed
//! is never dropped. Only TCP to port 80 is dropped.

use crate::counters::{CounterId, CounterSink};
use crate::headers::{
    ether_type, protocol, EthHdr, Ipv4Hdr, PacketView, TcpHdr, UdpHdr, ETH_HDR_LEN,
};

/// `enum xdp_action` values from `linux/bpf.h`
pub const XDP_DROP: u32 = 1;
pub const XDP_PASS: u32 = 2;

const ETHER_TYPE_IPV4_BE: u16 = ether_type::IPV4.to_be();
const PORT_HTTP_BE: u16 = 80u16.to_be();
const PORT_HTTPS_BE: u16 = 443u16.to_be();

const IPV4_MIN_IHL: u8 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Drop,
}

impl Verdict {
    /// XDP return code for this verdict.
    #[inline(always)]
    pub const fn action(self) -> u32 {
        match self {
            Verdict::Pass => XDP_PASS,
            Verdict::Drop => XDP_DROP,
        }
    }
}

/// Classify one frame, bump the matching counters and decide its fate.
#[inline(always)]
pub fn classify<P, S>(packet: &P, counters: &S) -> Verdict
where
    P: PacketView + ?Sized,
    S: CounterSink,
{
    let Some(eth) = packet.load::<EthHdr>(0) else {
        return Verdict::Pass;
    };
    if eth.ether_type != ETHER_TYPE_IPV4_BE {
        return Verdict::Pass;
    }

    let Some(ip) = packet.load::<Ipv4Hdr>(ETH_HDR_LEN) else {
        return Verdict::Pass;
    };
    counters.increment(CounterId::Ipv4Total);

    match ip.proto {
        protocol::ICMP => {
            counters.increment(CounterId::Icmp);
            Verdict::Pass
        }
        protocol::TCP => classify_tcp(packet, &ip, counters),
        protocol::UDP => classify_udp(packet, &ip, counters),
        _ => Verdict::Pass,
    }
}

#[inline(always)]
fn classify_tcp<P, S>(packet: &P, ip: &Ipv4Hdr, counters: &S) -> Verdict
where
    P: PacketView + ?Sized,
    S: CounterSink,
{
    let Some(tcp) = l4_offset(ip).and_then(|offset| packet.load::<TcpHdr>(offset)) else {
        return Verdict::Pass;
    };

    match tcp.dest {
        PORT_HTTPS_BE => {
            counters.increment(CounterId::Tcp443);
            Verdict::Pass
        }
        PORT_HTTP_BE => {
            counters.increment(CounterId::Tcp80Dropped);
            Verdict::Drop
        }
        _ => Verdict::Pass,
    }
}

#[inline(always)]
fn classify_udp<P, S>(packet: &P, ip: &Ipv4Hdr, counters: &S) -> Verdict
where
    P: PacketView + ?Sized,
    S: CounterSink,
{
    let Some(udp) = l4_offset(ip).and_then(|offset| packet.load::<UdpHdr>(offset)) else {
        return Verdict::Pass;
    };

    if udp.dest == PORT_HTTPS_BE {
        counters.increment(CounterId::Udp443);
    }
    Verdict::Pass
}

/// Offset of the transport header, honouring IHL. `None` for an IHL below the
/// 20-byte minimum.
#[inline(always)]
fn l4_offset(ip: &Ipv4Hdr) -> Option<usize> {
    if ip.ihl() < IPV4_MIN_IHL {
        return None;
    }
    Some(ETH_HDR_LEN + ip.header_len())
}
