use crate::metrics::collector::CounterSnapshot;
use crate::{Result, XdpStatError};
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const PACKETS_METRIC: &str = "xdpstat_packets_total";

/// Prometheus view of the counter table, written for the node_exporter
/// textfile collector.
pub struct PrometheusExporter {
    registry: Registry,
    packets: IntCounterVec,
    path: PathBuf,
}

impl PrometheusExporter {
    pub fn new(path: impl Into<PathBuf>, iface: &str) -> Result<Self> {
        let registry = Registry::new();
        let packets = IntCounterVec::new(
            Opts::new(PACKETS_METRIC, "Packets counted by the XDP classifier")
                .const_label("interface", iface),
            &["counter"],
        )
        .map_err(|e| XdpStatError::MetricsError(e.to_string()))?;

        registry
            .register(Box::new(packets.clone()))
            .map_err(|e| XdpStatError::MetricsError(e.to_string()))?;

        Ok(Self {
            registry,
            packets,
            path: path.into(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bring the exported counters up to `snapshot`. Kernel counters only
    /// grow, so a smaller value is ignored.
    pub fn update(&self, snapshot: &CounterSnapshot) {
        for (id, value) in snapshot.iter() {
            let counter = self.packets.with_label_values(&[id.key()]);
            let current = counter.get();
            if value > current {
                counter.inc_by(value - current);
            }
        }
    }

    pub fn format_metrics(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(|e| XdpStatError::MetricsError(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| XdpStatError::MetricsError(e.to_string()))
    }

    /// Replace the textfile atomically so scrapes never see a partial file.
    pub fn write_textfile(&self) -> Result<()> {
        let body = self.format_metrics()?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");

        fs::write(&tmp, body)?;
        fs::rename(&tmp, &self.path)?;
        debug!("Wrote metrics to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_metrics_lists_every_counter() {
        let exporter = PrometheusExporter::new("/unused.prom", "eth0").unwrap();
        exporter.update(&CounterSnapshot::from_values([8, 3, 2, 1, 1]));

        let text = exporter.format_metrics().unwrap();
        assert!(text.contains("# TYPE xdpstat_packets_total counter"));
        assert!(text.contains(r#"xdpstat_packets_total{counter="ipv4",interface="eth0"} 8"#));
        assert!(text.contains(r#"xdpstat_packets_total{counter="icmp",interface="eth0"} 3"#));
        assert!(
            text.contains(r#"xdpstat_packets_total{counter="dropped_tcp_80",interface="eth0"} 1"#)
        );
    }

    #[test]
    fn test_update_tracks_absolute_values() {
        let exporter = PrometheusExporter::new("/unused.prom", "eth0").unwrap();
        exporter.update(&CounterSnapshot::from_values([5, 0, 0, 0, 0]));
        exporter.update(&CounterSnapshot::from_values([9, 0, 0, 0, 0]));
        exporter.update(&CounterSnapshot::from_values([7, 0, 0, 0, 0]));

        let text = exporter.format_metrics().unwrap();
        assert!(text.contains(r#"xdpstat_packets_total{counter="ipv4",interface="eth0"} 9"#));
    }

    #[test]
    fn test_write_textfile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("xdpstat.prom");
        let exporter = PrometheusExporter::new(&path, "lo").unwrap();
        exporter.update(&CounterSnapshot::from_values([1, 1, 0, 0, 0]));

        exporter.write_textfile().unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains(r#"xdpstat_packets_total{counter="icmp",interface="lo"} 1"#));
        assert!(!dir.path().join("xdpstat.prom.tmp").exists());
    }
}
