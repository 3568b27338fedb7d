//! Console output, one line per poll

use crate::metrics::collector::CounterSnapshot;
use crate::metrics::exporter::PrometheusExporter;
use crate::Result;
use clap::ValueEnum;
use serde::Serialize;
use std::io::Write;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// `IPv4=8  ICMP=3  ...`
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Serialize)]
struct JsonLine<'a> {
    interface: &'a str,
    #[serde(flatten)]
    counters: &'a CounterSnapshot,
}

pub struct Reporter<W: Write> {
    format: OutputFormat,
    iface: String,
    out: W,
    exporter: Option<PrometheusExporter>,
}

impl<W: Write> Reporter<W> {
    pub fn new(format: OutputFormat, iface: impl Into<String>, out: W) -> Self {
        Self {
            format,
            iface: iface.into(),
            out,
            exporter: None,
        }
    }

    pub fn with_exporter(mut self, exporter: PrometheusExporter) -> Self {
        self.exporter = Some(exporter);
        self
    }

    /// Print one report line. Console write errors are fatal; a failed
    /// textfile write is only logged.
    pub fn report(&mut self, snapshot: &CounterSnapshot) -> Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(self.out, "{}", snapshot)?,
            OutputFormat::Json => {
                let line = JsonLine {
                    interface: &self.iface,
                    counters: snapshot,
                };
                let json = serde_json::to_string(&line).map_err(std::io::Error::from)?;
                writeln!(self.out, "{}", json)?;
            }
        }
        self.out.flush()?;

        if let Some(exporter) = &self.exporter {
            exporter.update(snapshot);
            if let Err(e) = exporter.write_textfile() {
                warn!(
                    "Failed to write metrics to {}: {}",
                    exporter.path().display(),
                    e
                );
            }
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_lines() {
        let mut reporter = Reporter::new(OutputFormat::Text, "eth0", Vec::new());
        reporter.report(&CounterSnapshot::default()).unwrap();
        reporter
            .report(&CounterSnapshot::from_values([8, 3, 2, 1, 1]))
            .unwrap();

        let out = String::from_utf8(reporter.into_inner()).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(
            lines,
            [
                "IPv4=0  ICMP=0  TCP/443=0  UDP/443=0  dropped:TCP/80=0",
                "IPv4=8  ICMP=3  TCP/443=2  UDP/443=1  dropped:TCP/80=1",
            ]
        );
    }

    #[test]
    fn test_json_line() {
        let mut reporter = Reporter::new(OutputFormat::Json, "eth0", Vec::new());
        reporter
            .report(&CounterSnapshot::from_values([8, 3, 2, 1, 1]))
            .unwrap();

        let out = String::from_utf8(reporter.into_inner()).unwrap();
        let value: serde_json::Value = serde_json::from_str(out.trim_end()).unwrap();
        assert_eq!(value["interface"], "eth0");
        assert_eq!(value["ipv4"], 8);
        assert_eq!(value["udp_443"], 1);
        assert_eq!(value["dropped_tcp_80"], 1);
    }

    #[test]
    fn test_exporter_failure_is_not_fatal() {
        let exporter =
            PrometheusExporter::new("/nonexistent-dir/xdpstat.prom", "eth0").unwrap();
        let mut reporter =
            Reporter::new(OutputFormat::Text, "eth0", Vec::new()).with_exporter(exporter);

        assert!(reporter.report(&CounterSnapshot::default()).is_ok());
    }
}
