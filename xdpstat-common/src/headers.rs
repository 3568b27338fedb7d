//! Zero-copy header views and bounds-checked packet access
//!
//! Multi-byte fields are kept in network byte order exactly as they sit on the
//! wire. Callers compare them against constants converted with `to_be()`.

use core::mem;

pub const ETH_HDR_LEN: usize = mem::size_of::<EthHdr>();
pub const IPV4_HDR_LEN: usize = mem::size_of::<Ipv4Hdr>();
pub const TCP_HDR_LEN: usize = mem::size_of::<TcpHdr>();
pub const UDP_HDR_LEN: usize = mem::size_of::<UdpHdr>();

/// EtherType values (host byte order)
pub mod ether_type {
    pub const IPV4: u16 = 0x0800;
    pub const IPV6: u16 = 0x86DD;
    pub const ARP: u16 = 0x0806;
    pub const VLAN_8021Q: u16 = 0x8100;
}

/// IP protocol numbers
pub mod protocol {
    pub const ICMP: u8 = 1;
    pub const TCP: u8 = 6;
    pub const UDP: u8 = 17;
}

/// Plain-old-data header that may be read from any byte offset.
///
/// # Safety
///
/// Implementors must be `#[repr(C)]`, contain only integer and integer-array
/// fields, and have no padding, so that every bit pattern is a valid value.
pub unsafe trait Header: Copy {}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EthHdr {
    pub dst_addr: [u8; 6],
    pub src_addr: [u8; 6],
    /// Network byte order
    pub ether_type: u16,
}

/// Fixed 20-byte IPv4 header. Options, if present, follow it and are not
/// described here.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ipv4Hdr {
    pub version_ihl: u8,
    pub tos: u8,
    pub tot_len: u16,
    pub id: u16,
    pub frag_off: u16,
    pub ttl: u8,
    pub proto: u8,
    pub check: u16,
    pub src_addr: [u8; 4],
    pub dst_addr: [u8; 4],
}

impl Ipv4Hdr {
    /// Header length in 32-bit words.
    #[inline(always)]
    pub fn ihl(&self) -> u8 {
        self.version_ihl & 0x0f
    }

    /// Header length in bytes including options, at most 60.
    #[inline(always)]
    pub fn header_len(&self) -> usize {
        self.ihl() as usize * 4
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TcpHdr {
    pub source: u16,
    pub dest: u16,
    pub seq: [u8; 4],
    pub ack_seq: [u8; 4],
    pub doff_flags: u16,
    pub window: u16,
    pub check: u16,
    pub urg_ptr: u16,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UdpHdr {
    pub source: u16,
    pub dest: u16,
    pub len: u16,
    pub check: u16,
}

// SAFETY: integer fields only, layouts asserted below
unsafe impl Header for EthHdr {}
unsafe impl Header for Ipv4Hdr {}
unsafe impl Header for TcpHdr {}
unsafe impl Header for UdpHdr {}

const _: () = {
    assert!(ETH_HDR_LEN == 14, "EthHdr must be exactly 14 bytes");
    assert!(IPV4_HDR_LEN == 20, "Ipv4Hdr must be exactly 20 bytes");
    assert!(TCP_HDR_LEN == 20, "TcpHdr must be exactly 20 bytes");
    assert!(UDP_HDR_LEN == 8, "UdpHdr must be exactly 8 bytes");
};

/// Read-only view of one packet, `[data, data_end)`.
///
/// `load` must return `None` unless the whole of `H` lies inside the packet.
/// The kernel implementation compares against `data_end` on every call; that
/// comparison is what the verifier relies on.
pub trait PacketView {
    fn load<H: Header>(&self, offset: usize) -> Option<H>;
}

impl PacketView for [u8] {
    #[inline]
    fn load<H: Header>(&self, offset: usize) -> Option<H> {
        let end = offset.checked_add(mem::size_of::<H>())?;
        if end > self.len() {
            return None;
        }
        // SAFETY: range checked above; `Header` accepts any bit pattern
        Some(unsafe { core::ptr::read_unaligned(self.as_ptr().add(offset) as *const H) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_rejects_short_buffer() {
        let frame = [0u8; ETH_HDR_LEN - 1];
        assert!(frame[..].load::<EthHdr>(0).is_none());
    }

    #[test]
    fn test_load_rejects_offset_overflow() {
        let frame = [0u8; 64];
        assert!(frame[..].load::<UdpHdr>(usize::MAX - 2).is_none());
    }

    #[test]
    fn test_load_keeps_wire_order() {
        let mut frame = [0u8; ETH_HDR_LEN];
        frame[12] = 0x08;
        frame[13] = 0x00;

        let eth = frame[..].load::<EthHdr>(0).unwrap();
        assert_eq!(eth.ether_type, ether_type::IPV4.to_be());
        assert_eq!(u16::from_be(eth.ether_type), ether_type::IPV4);
    }

    #[test]
    fn test_ipv4_header_len() {
        let mut raw = [0u8; IPV4_HDR_LEN];
        raw[0] = 0x46;
        let ip = raw[..].load::<Ipv4Hdr>(0).unwrap();
        assert_eq!(ip.ihl(), 6);
        assert_eq!(ip.header_len(), 24);
    }
}
