use crate::cli::Cli;
use crate::ebpf::AttachMode;
use crate::metrics::OutputFormat;
use crate::{Result, XdpStatError};
use std::path::PathBuf;
use std::time::Duration;

/// Validated controller settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    pub iface: String,
    pub object: PathBuf,
    pub mode: AttachMode,
    pub interval: Duration,
    pub duration: Option<Duration>,
    pub output: OutputFormat,
    pub prometheus_textfile: Option<PathBuf>,
}

impl ControllerConfig {
    pub fn new(iface: impl Into<String>, object: impl Into<PathBuf>) -> Self {
        Self {
            iface: iface.into(),
            object: object.into(),
            mode: AttachMode::default(),
            interval: Duration::from_secs(1),
            duration: None,
            output: OutputFormat::default(),
            prometheus_textfile: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.iface.is_empty() {
            return Err(XdpStatError::ConfigError(
                "interface name must not be empty".to_string(),
            ));
        }
        if self.interval.is_zero() {
            return Err(XdpStatError::ConfigError(
                "report interval must be greater than zero".to_string(),
            ));
        }
        if self.duration.is_some_and(|d| d.is_zero()) {
            return Err(XdpStatError::ConfigError(
                "run duration must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl TryFrom<&Cli> for ControllerConfig {
    type Error = XdpStatError;

    fn try_from(cli: &Cli) -> Result<Self> {
        let config = Self {
            iface: cli.iface.clone(),
            object: cli.object.clone(),
            mode: cli.mode,
            interval: Duration::from_millis(cli.interval_ms),
            duration: cli.duration_secs.map(Duration::from_secs),
            output: cli.output,
            prometheus_textfile: cli.prometheus_textfile.clone(),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_from_cli() {
        let cli = Cli::try_parse_from(["xdpstat", "-i", "500", "-d", "3", "eth0", "xdp.o"]).unwrap();
        let config = ControllerConfig::try_from(&cli).unwrap();

        assert_eq!(config.interval, Duration::from_millis(500));
        assert_eq!(config.duration, Some(Duration::from_secs(3)));
        assert_eq!(config.iface, "eth0");
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let cli = Cli::try_parse_from(["xdpstat", "--interval-ms", "0", "eth0", "xdp.o"]).unwrap();
        assert!(matches!(
            ControllerConfig::try_from(&cli),
            Err(XdpStatError::ConfigError(_))
        ));
    }

    #[test]
    fn test_zero_duration_is_rejected() {
        let mut config = ControllerConfig::new("eth0", "xdp.o");
        config.duration = Some(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_interface_is_rejected() {
        assert!(ControllerConfig::new("", "xdp.o").validate().is_err());
    }
}
