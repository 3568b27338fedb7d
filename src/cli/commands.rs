use crate::config::ControllerConfig;
use crate::ebpf::{CounterSource, Datapath, Session};
use crate::metrics::{CounterSnapshot, PrometheusExporter, Reporter};
use crate::{Result, XdpStatError};
use std::future::Future;
use std::io::Write;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Attach the classifier described by `config`, report until told to stop,
/// then detach.
#[cfg(target_os = "linux")]
pub async fn run(config: ControllerConfig) -> Result<()> {
    use crate::ebpf::xdp::XdpDatapath;

    // Handlers go in before attaching so an early Ctrl-C still detaches.
    let shutdown = shutdown_signal()?;

    let session = Session::start(
        XdpDatapath::new(),
        &config.object,
        &config.iface,
        config.mode,
    )?;

    run_session(session, &config, std::io::stdout(), shutdown).await
}

#[cfg(not(target_os = "linux"))]
pub async fn run(_config: ControllerConfig) -> Result<()> {
    Err(XdpStatError::UnsupportedFeature(
        "XDP requires Linux".to_string(),
    ))
}

/// Poll a running session until `shutdown` resolves or the configured
/// duration elapses, then release it. Release happens on every return path.
pub async fn run_session<D, W, F>(
    mut session: Session<D>,
    config: &ControllerConfig,
    out: W,
    shutdown: F,
) -> Result<()>
where
    D: Datapath,
    W: Write,
    F: Future<Output = ()>,
{
    let mut reporter = Reporter::new(config.output, config.iface.as_str(), out);
    if let Some(path) = &config.prometheus_textfile {
        reporter = reporter.with_exporter(PrometheusExporter::new(path, &config.iface)?);
    }

    if let Some(iface) = session.interface() {
        info!(
            "Reporting every {:?} on {}. Press Ctrl-C to stop.",
            config.interval, iface
        );
    }

    let polled = match session.counters() {
        Some(counters) => {
            poll_counters(
                counters,
                config.interval,
                config.duration,
                shutdown,
                &mut reporter,
            )
            .await
        }
        None => Err(XdpStatError::MapLookupFailed {
            name: xdpstat_common::COUNTER_MAP_NAME.to_string(),
            reason: format!("session is {}, not running", session.state()),
        }),
    };

    if let Err(e) = session.shutdown() {
        warn!("Shutdown incomplete: {}", e);
    }
    info!("xdpstat stopped");

    polled.map(|_| ())
}

/// Report `counters` every `interval`. Returns the number of reports printed.
///
/// A failed counter read skips that tick; a failed console write ends the loop.
pub async fn poll_counters<C, W, F>(
    counters: &C,
    interval: Duration,
    duration: Option<Duration>,
    shutdown: F,
    reporter: &mut Reporter<W>,
) -> Result<u64>
where
    C: CounterSource + ?Sized,
    W: Write,
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let deadline = async {
        match duration {
            Some(d) => tokio::time::sleep(d).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(shutdown);
    tokio::pin!(deadline);

    let mut reports = 0u64;
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
            _ = &mut deadline => {
                info!("Run duration elapsed");
                break;
            }
            _ = ticker.tick() => {
                match CounterSnapshot::collect(counters) {
                    Ok(snapshot) => {
                        reporter.report(&snapshot)?;
                        reports += 1;
                    }
                    Err(e) => warn!("Skipping report: {}", e),
                }
            }
        }
    }

    debug!("Polling stopped after {} reports", reports);
    Ok(reports)
}

/// Resolves on the first SIGINT or SIGTERM.
///
/// Handlers stay installed after the first signal, so repeats are absorbed
/// instead of killing the process mid-detach.
#[cfg(unix)]
pub fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    Ok(async move {
        tokio::select! {
            _ = sigint.recv() => debug!("SIGINT"),
            _ = sigterm.recv() => debug!("SIGTERM"),
        }
    })
}
