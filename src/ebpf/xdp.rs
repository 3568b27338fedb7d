//! aya-backed datapath: loads the probe object and binds it at the XDP hook

use crate::ebpf::maps::PacketCounters;
use crate::ebpf::{AttachMode, Datapath, Interface};
use crate::{Result, XdpStatError};
use aya::programs::{xdp::XdpLinkId, Xdp, XdpFlags};
use aya::Ebpf;
use aya_log::EbpfLogger;
use std::path::Path;
use tracing::{debug, info, warn};
use xdpstat_common::PROGRAM_NAME;

impl AttachMode {
    pub fn flags(&self) -> XdpFlags {
        match self {
            AttachMode::Skb => XdpFlags::SKB_MODE,
            AttachMode::Driver => XdpFlags::DRV_MODE,
            AttachMode::Hardware => XdpFlags::HW_MODE,
        }
    }
}

/// Owns the loaded [`Ebpf`] object and at most one XDP link.
#[derive(Default)]
pub struct XdpDatapath {
    bpf: Option<Ebpf>,
    link: Option<XdpLinkId>,
    iface: Option<String>,
}

impl XdpDatapath {
    pub fn new() -> Self {
        Self::default()
    }

    /// The loaded XDP program, or why it is unavailable.
    fn program_mut(&mut self) -> std::result::Result<&mut Xdp, String> {
        let bpf = self
            .bpf
            .as_mut()
            .ok_or_else(|| "classifier object is not loaded".to_string())?;
        let program = bpf
            .program_mut(PROGRAM_NAME)
            .ok_or_else(|| format!("program {} not found", PROGRAM_NAME))?;
        program
            .try_into()
            .map_err(|e: aya::programs::ProgramError| {
                format!("{} is not an XDP program: {}", PROGRAM_NAME, e)
            })
    }
}

impl Datapath for XdpDatapath {
    type Counters = PacketCounters;

    fn load(&mut self, object: &Path) -> Result<()> {
        let load_failed = |reason: String| XdpStatError::ProgramLoadFailed {
            path: object.display().to_string(),
            reason,
        };

        debug!("Opening classifier object {}", object.display());
        let mut bpf = Ebpf::load_file(object).map_err(|e| load_failed(e.to_string()))?;

        if let Err(e) = EbpfLogger::init(&mut bpf) {
            warn!(
                "Failed to initialize EbpfLogger: {}. Classifier logs will not be visible.",
                e
            );
        }

        let available_programs: Vec<_> =
            bpf.programs().map(|(name, _)| name.to_string()).collect();
        let program: &mut Xdp = bpf
            .program_mut(PROGRAM_NAME)
            .ok_or_else(|| {
                load_failed(format!(
                    "program {} not found. Available programs: {:?}",
                    PROGRAM_NAME, available_programs
                ))
            })?
            .try_into()
            .map_err(|e: aya::programs::ProgramError| load_failed(e.to_string()))?;

        program.load().map_err(|e| load_failed(e.to_string()))?;

        info!("Classifier {} verified and loaded", PROGRAM_NAME);
        self.bpf = Some(bpf);
        Ok(())
    }

    fn attach(&mut self, iface: &Interface, mode: AttachMode) -> Result<()> {
        let attach_failed = |reason: String| XdpStatError::AttachFailed {
            iface: iface.name().to_string(),
            reason,
        };

        if let Some(current) = &self.iface {
            return Err(attach_failed(format!("classifier already attached to {}", current)));
        }

        let link = self
            .program_mut()
            .map_err(attach_failed)?
            .attach_to_if_index(iface.index(), mode.flags())
            .map_err(|e| attach_failed(e.to_string()))?;

        info!("Classifier attached to {} in {} mode", iface, mode);
        self.link = Some(link);
        self.iface = Some(iface.name().to_string());
        Ok(())
    }

    fn take_counters(&mut self, map_name: &str) -> Result<PacketCounters> {
        let lookup_failed = |reason: &str| XdpStatError::MapLookupFailed {
            name: map_name.to_string(),
            reason: reason.to_string(),
        };

        let bpf = self
            .bpf
            .as_mut()
            .ok_or_else(|| lookup_failed("classifier object is not loaded"))?;

        // Collect map names first to avoid borrow conflict in error path
        let available_maps: Vec<_> = bpf.maps().map(|(name, _)| name.to_string()).collect();
        let map = bpf.take_map(map_name).ok_or_else(|| {
            lookup_failed(&format!("not found. Available maps: {:?}", available_maps))
        })?;

        PacketCounters::from_map(map_name, map)
    }

    fn detach(&mut self) -> Result<()> {
        let Some(link) = self.link.take() else {
            return Ok(());
        };
        let iface = self.iface.take().unwrap_or_default();

        let detach_failed =
            |reason: String| XdpStatError::DetachFailed(format!("{}: {}", iface, reason));
        self.program_mut()
            .map_err(detach_failed)?
            .detach(link)
            .map_err(|e| detach_failed(e.to_string()))?;

        info!("Classifier detached from {}", iface);
        Ok(())
    }

    fn unload(&mut self) {
        self.link = None;
        self.iface = None;
        if let Some(bpf) = self.bpf.take() {
            info!("Unloading classifier...");
            drop(bpf);
            info!("Classifier unloaded");
        }
    }
}
