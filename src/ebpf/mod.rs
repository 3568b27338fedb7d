pub mod iface;
pub mod loader;
pub mod maps;
#[cfg(target_os = "linux")]
pub mod xdp;

pub use iface::Interface;
pub use loader::Session;
pub use maps::CounterSource;

use crate::Result;
use clap::ValueEnum;
use std::path::Path;

/// Host environment that verifies, loads and attaches the classifier.
///
/// Calls arrive in lifecycle order from [`Session`]; implementations do not
/// need to guard against out-of-order use beyond refusing a second attach.
pub trait Datapath {
    type Counters: CounterSource;

    /// Open the compiled object, create its maps and pass it through the verifier.
    fn load(&mut self, object: &Path) -> Result<()>;

    /// Bind the loaded classifier to the receive path of `iface`.
    fn attach(&mut self, iface: &Interface, mode: AttachMode) -> Result<()>;

    /// Hand out the counter table declared in the object under `map_name`.
    fn take_counters(&mut self, map_name: &str) -> Result<Self::Counters>;

    fn detach(&mut self) -> Result<()>;

    /// Release the loaded object. Infallible; called after `detach` or on its own.
    fn unload(&mut self);
}

/// Where in the receive path the classifier runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum AttachMode {
    /// Generic XDP, after the driver has built an skb. Works everywhere.
    #[default]
    Skb,
    /// Native XDP inside the driver's receive routine.
    Driver,
    /// Offloaded to the NIC.
    Hardware,
}

impl AttachMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            AttachMode::Skb => "skb",
            AttachMode::Driver => "driver",
            AttachMode::Hardware => "hardware",
        }
    }
}

impl std::fmt::Display for AttachMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Controller lifecycle:
/// `Unloaded -> Loaded -> Attached -> Running -> Detaching -> Unloaded`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Unloaded,
    Loaded,
    Attached,
    Running,
    Detaching,
}

impl Lifecycle {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Lifecycle::Unloaded => "unloaded",
            Lifecycle::Loaded => "loaded",
            Lifecycle::Attached => "attached",
            Lifecycle::Running => "running",
            Lifecycle::Detaching => "detaching",
        }
    }

    /// Whether the classifier is bound to an interface in this state.
    pub const fn is_attached(&self) -> bool {
        matches!(self, Lifecycle::Attached | Lifecycle::Running)
    }
}

impl std::fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
