pub mod commands;

use crate::ebpf::AttachMode;
use crate::metrics::OutputFormat;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "xdpstat")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Count IPv4 traffic at the XDP hook and drop TCP/80", long_about = None)]
pub struct Cli {
    #[arg(help = "Network interface to attach the classifier to")]
    pub iface: String,

    #[arg(help = "Compiled classifier object (BPF ELF)")]
    pub object: PathBuf,

    #[arg(short, long, value_enum, default_value_t = AttachMode::Skb, help = "XDP attach mode")]
    pub mode: AttachMode,

    #[arg(
        short,
        long = "interval-ms",
        default_value_t = 1000,
        help = "Milliseconds between counter reports"
    )]
    pub interval_ms: u64,

    #[arg(
        short,
        long = "duration-secs",
        help = "Detach and exit after this many seconds"
    )]
    pub duration_secs: Option<u64>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, help = "Report format")]
    pub output: OutputFormat,

    #[arg(
        long,
        value_name = "PATH",
        help = "Also write counters in Prometheus text format to PATH"
    )]
    pub prometheus_textfile: Option<PathBuf>,

    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_two_positionals() {
        let cli = Cli::try_parse_from(["xdpstat", "eth0", "xdp_counter.o"]).unwrap();
        assert_eq!(cli.iface, "eth0");
        assert_eq!(cli.object, PathBuf::from("xdp_counter.o"));
        assert_eq!(cli.mode, AttachMode::Skb);
        assert_eq!(cli.interval_ms, 1000);
        assert_eq!(cli.output, OutputFormat::Text);
        assert!(cli.duration_secs.is_none());
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "xdpstat",
            "--mode",
            "driver",
            "-o",
            "json",
            "--interval-ms",
            "250",
            "--duration-secs",
            "10",
            "enp0s5",
            "xdp.o",
        ])
        .unwrap();
        assert_eq!(cli.mode, AttachMode::Driver);
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.interval_ms, 250);
        assert_eq!(cli.duration_secs, Some(10));
    }

    #[test]
    fn test_wrong_argument_count_exits_2() {
        for args in [
            vec!["xdpstat"],
            vec!["xdpstat", "eth0"],
            vec!["xdpstat", "eth0", "xdp.o", "extra"],
        ] {
            let err = Cli::try_parse_from(&args).unwrap_err();
            assert_ne!(err.kind(), ErrorKind::DisplayHelp);
            assert_eq!(err.exit_code(), 2, "args {:?}", args);
        }
    }
}
