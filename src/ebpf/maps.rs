use crate::Result;
use std::sync::Arc;
use xdpstat_common::{CounterId, CounterTable};

/// Read side of the shared counter table.
///
/// Reads never block and may trail in-flight increments, but never observe a
/// partially written value.
pub trait CounterSource {
    fn read(&self, id: CounterId) -> Result<u64>;
}

impl CounterSource for CounterTable {
    fn read(&self, id: CounterId) -> Result<u64> {
        Ok(CounterTable::read(self, id))
    }
}

impl<T: CounterSource + ?Sized> CounterSource for Arc<T> {
    fn read(&self, id: CounterId) -> Result<u64> {
        (**self).read(id)
    }
}

#[cfg(target_os = "linux")]
pub use kernel::PacketCounters;

#[cfg(target_os = "linux")]
mod kernel {
    use super::CounterSource;
    use crate::{Result, XdpStatError};
    use aya::maps::{Array, Map, MapData};
    use xdpstat_common::CounterId;

    /// The `BPF_MAP_TYPE_ARRAY` the probe increments, owned by the controller.
    pub struct PacketCounters {
        inner: Array<MapData, u64>,
    }

    impl PacketCounters {
        pub fn from_map(name: &str, map: Map) -> Result<Self> {
            let inner = Array::try_from(map).map_err(|e| XdpStatError::MapLookupFailed {
                name: name.to_string(),
                reason: e.to_string(),
            })?;

            if (inner.len() as usize) < CounterId::COUNT {
                return Err(XdpStatError::MapLookupFailed {
                    name: name.to_string(),
                    reason: format!(
                        "expected {} entries, object declares {}",
                        CounterId::COUNT,
                        inner.len()
                    ),
                });
            }

            Ok(Self { inner })
        }
    }

    impl CounterSource for PacketCounters {
        fn read(&self, id: CounterId) -> Result<u64> {
            self.inner
                .get(&id.index(), 0)
                .map_err(|e| XdpStatError::CounterReadFailed {
                    counter: id.label().to_string(),
                    reason: e.to_string(),
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xdpstat_common::CounterSink;

    #[test]
    fn test_table_reads_through_trait() {
        let table = Arc::new(CounterTable::new());
        table.increment(CounterId::Icmp);

        let source: &dyn CounterSource = &table;
        assert_eq!(source.read(CounterId::Icmp).unwrap(), 1);
        assert_eq!(source.read(CounterId::Tcp443).unwrap(), 0);
    }
}
