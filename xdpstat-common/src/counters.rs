//! Counter identifiers and the shared counter table
//!
//! The kernel side stores counters in a `BPF_MAP_TYPE_ARRAY` indexed by
//! [`CounterId`]. [`CounterTable`] is the same table backed by process memory,
//! used when the classifier runs outside the kernel.

use core::sync::atomic::{AtomicU64, Ordering};

/// One slot in the shared counter array.
///
/// Discriminants are the array indices and must not change: the probe and the
/// controller are built separately and only agree through these values.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CounterId {
    /// Every IPv4 packet whose fixed header fit in the frame
    Ipv4Total = 0,
    Icmp = 1,
    /// TCP, destination port 443
    Tcp443 = 2,
    /// UDP, destination port 443
    Udp443 = 3,
    /// TCP, destination port 80 (these packets are dropped)
    Tcp80Dropped = 4,
}

impl CounterId {
    pub const COUNT: usize = 5;

    /// All identifiers in report order.
    pub const ALL: [CounterId; CounterId::COUNT] = [
        CounterId::Ipv4Total,
        CounterId::Icmp,
        CounterId::Tcp443,
        CounterId::Udp443,
        CounterId::Tcp80Dropped,
    ];

    pub const fn index(self) -> u32 {
        self as u32
    }

    /// Human-readable label for console output.
    pub const fn label(self) -> &'static str {
        match self {
            CounterId::Ipv4Total => "IPv4",
            CounterId::Icmp => "ICMP",
            CounterId::Tcp443 => "TCP/443",
            CounterId::Udp443 => "UDP/443",
            CounterId::Tcp80Dropped => "dropped:TCP/80",
        }
    }

    /// Machine-readable key for JSON and Prometheus output.
    pub const fn key(self) -> &'static str {
        match self {
            CounterId::Ipv4Total => "ipv4",
            CounterId::Icmp => "icmp",
            CounterId::Tcp443 => "tcp_443",
            CounterId::Udp443 => "udp_443",
            CounterId::Tcp80Dropped => "dropped_tcp_80",
        }
    }

    #[cfg(test)]
    const fn from_index(index: u32) -> Option<CounterId> {
        match index {
            0 => Some(CounterId::Ipv4Total),
            1 => Some(CounterId::Icmp),
            2 => Some(CounterId::Tcp443),
            3 => Some(CounterId::Udp443),
            4 => Some(CounterId::Tcp80Dropped),
            _ => None,
        }
    }
}

/// Destination for counter increments made by the classifier.
///
/// Implementations must be safe to call from many CPUs at once: the only
/// permitted mutation is an atomic add of one.
pub trait CounterSink {
    fn increment(&self, id: CounterId);
}

/// Fixed-capacity array of atomic counters, zero at creation.
#[derive(Debug)]
pub struct CounterTable {
    slots: [AtomicU64; CounterId::COUNT],
}

impl CounterTable {
    pub const fn new() -> Self {
        Self {
            slots: [
                AtomicU64::new(0),
                AtomicU64::new(0),
                AtomicU64::new(0),
                AtomicU64::new(0),
                AtomicU64::new(0),
            ],
        }
    }

    /// Current value of `id`. Wait-free; may trail concurrent increments.
    #[inline]
    pub fn read(&self, id: CounterId) -> u64 {
        self.slots[id as usize].load(Ordering::Relaxed)
    }

    /// Values of all counters, indexed by [`CounterId::index`].
    pub fn snapshot(&self) -> [u64; CounterId::COUNT] {
        let mut values = [0u64; CounterId::COUNT];
        for id in CounterId::ALL {
            values[id as usize] = self.read(id);
        }
        values
    }
}

impl Default for CounterTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterSink for CounterTable {
    #[inline]
    fn increment(&self, id: CounterId) {
        self.slots[id as usize].fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_are_dense_and_ordered() {
        for (i, id) in CounterId::ALL.iter().enumerate() {
            assert_eq!(id.index() as usize, i);
            assert_eq!(CounterId::from_index(i as u32), Some(*id));
        }
        assert_eq!(CounterId::from_index(CounterId::COUNT as u32), None);
    }

    #[test]
    fn test_table_starts_at_zero() {
        let table = CounterTable::new();
        assert_eq!(table.snapshot(), [0; CounterId::COUNT]);
    }

    #[test]
    fn test_increment_touches_one_slot() {
        let table = CounterTable::new();
        table.increment(CounterId::Udp443);
        table.increment(CounterId::Udp443);

        assert_eq!(table.read(CounterId::Udp443), 2);
        assert_eq!(table.snapshot(), [0, 0, 0, 2, 0]);
    }

    #[test]
    fn test_labels_are_unique() {
        let mut labels: Vec<_> = CounterId::ALL.iter().map(|id| id.label()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), CounterId::COUNT);
    }
}
