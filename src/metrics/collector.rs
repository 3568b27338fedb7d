use crate::ebpf::CounterSource;
use crate::Result;
use serde::Serialize;
use xdpstat_common::CounterId;

/// Values of every counter at one poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CounterSnapshot {
    pub ipv4: u64,
    pub icmp: u64,
    pub tcp_443: u64,
    pub udp_443: u64,
    pub dropped_tcp_80: u64,
}

impl CounterSnapshot {
    /// Read every counter from `source`. Fails on the first unreadable slot.
    pub fn collect<S: CounterSource + ?Sized>(source: &S) -> Result<Self> {
        let mut snapshot = Self::default();
        for id in CounterId::ALL {
            *snapshot.slot_mut(id) = source.read(id)?;
        }
        Ok(snapshot)
    }

    pub fn from_values(values: [u64; CounterId::COUNT]) -> Self {
        let mut snapshot = Self::default();
        for id in CounterId::ALL {
            *snapshot.slot_mut(id) = values[id.index() as usize];
        }
        snapshot
    }

    pub fn get(&self, id: CounterId) -> u64 {
        match id {
            CounterId::Ipv4Total => self.ipv4,
            CounterId::Icmp => self.icmp,
            CounterId::Tcp443 => self.tcp_443,
            CounterId::Udp443 => self.udp_443,
            CounterId::Tcp80Dropped => self.dropped_tcp_80,
        }
    }

    /// `(id, value)` pairs in report order.
    pub fn iter(&self) -> impl Iterator<Item = (CounterId, u64)> + '_ {
        CounterId::ALL.into_iter().map(move |id| (id, self.get(id)))
    }

    fn slot_mut(&mut self, id: CounterId) -> &mut u64 {
        match id {
            CounterId::Ipv4Total => &mut self.ipv4,
            CounterId::Icmp => &mut self.icmp,
            CounterId::Tcp443 => &mut self.tcp_443,
            CounterId::Udp443 => &mut self.udp_443,
            CounterId::Tcp80Dropped => &mut self.dropped_tcp_80,
        }
    }
}

/// `IPv4=8  ICMP=3  TCP/443=2  UDP/443=1  dropped:TCP/80=1`
impl std::fmt::Display for CounterSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (id, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, "  ")?;
            }
            write!(f, "{}={}", id.label(), value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::XdpStatError;
    use xdpstat_common::{CounterSink, CounterTable};

    struct BrokenSource;

    impl CounterSource for BrokenSource {
        fn read(&self, id: CounterId) -> Result<u64> {
            Err(XdpStatError::CounterReadFailed {
                counter: id.label().to_string(),
                reason: "EPERM".to_string(),
            })
        }
    }

    #[test]
    fn test_collect_reads_every_counter() {
        let table = CounterTable::new();
        for _ in 0..3 {
            table.increment(CounterId::Icmp);
        }
        table.increment(CounterId::Tcp80Dropped);

        let snapshot = CounterSnapshot::collect(&table).unwrap();
        assert_eq!(snapshot.icmp, 3);
        assert_eq!(snapshot.dropped_tcp_80, 1);
        assert_eq!(snapshot.ipv4, 0);
    }

    #[test]
    fn test_collect_propagates_read_errors() {
        let err = CounterSnapshot::collect(&BrokenSource).unwrap_err();
        assert!(err.to_string().contains("IPv4"));
    }

    #[test]
    fn test_display_is_fixed_order() {
        let snapshot = CounterSnapshot::from_values([8, 3, 2, 1, 1]);
        assert_eq!(
            snapshot.to_string(),
            "IPv4=8  ICMP=3  TCP/443=2  UDP/443=1  dropped:TCP/80=1"
        );
    }

    #[test]
    fn test_json_keys_match_counter_keys() {
        let snapshot = CounterSnapshot::from_values([8, 3, 2, 1, 1]);
        let json = serde_json::to_value(snapshot).unwrap();
        for (id, value) in snapshot.iter() {
            assert_eq!(json[id.key()], value);
        }
    }
}
