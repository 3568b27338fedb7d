//! Classifier lifecycle management
//!
//! A [`Session`] walks a [`Datapath`] through load, attach and counter lookup,
//! and guarantees the reverse walk on every exit path: explicit
//! [`Session::shutdown`], an error part-way through startup, or drop.

use crate::ebpf::{AttachMode, Datapath, Interface, Lifecycle};
use crate::Result;
use std::path::Path;
use tracing::{debug, info, warn};
use xdpstat_common::COUNTER_MAP_NAME;

pub struct Session<D: Datapath> {
    datapath: D,
    state: Lifecycle,
    iface: Option<Interface>,
    counters: Option<D::Counters>,
}

impl<D: Datapath> Session<D> {
    /// Load `object`, attach it to `iface_name` and open the counter table.
    ///
    /// On failure everything acquired so far is released before returning.
    pub fn start(datapath: D, object: &Path, iface_name: &str, mode: AttachMode) -> Result<Self> {
        let mut session = Self::load(datapath, object)?;
        let iface = Interface::resolve(iface_name)?;
        session.attach(iface, mode)?;
        session.open_counters()?;
        Ok(session)
    }

    /// `Unloaded -> Loaded`
    pub fn load(mut datapath: D, object: &Path) -> Result<Self> {
        info!("Loading classifier from {}...", object.display());
        datapath.load(object)?;

        Ok(Self {
            datapath,
            state: Lifecycle::Loaded,
            iface: None,
            counters: None,
        })
    }

    /// `Loaded -> Attached`
    pub fn attach(&mut self, iface: Interface, mode: AttachMode) -> Result<()> {
        debug!("Attaching classifier to {} ({} mode)", iface, mode);
        self.expect_state(Lifecycle::Loaded);

        self.datapath.attach(&iface, mode)?;
        self.iface = Some(iface);
        self.state = Lifecycle::Attached;
        Ok(())
    }

    /// `Attached -> Running`
    pub fn open_counters(&mut self) -> Result<()> {
        self.expect_state(Lifecycle::Attached);

        let counters = self.datapath.take_counters(COUNTER_MAP_NAME)?;
        self.counters = Some(counters);
        self.state = Lifecycle::Running;
        info!("Counter table {} opened", COUNTER_MAP_NAME);
        Ok(())
    }

    pub fn state(&self) -> Lifecycle {
        self.state
    }

    pub fn interface(&self) -> Option<&Interface> {
        self.iface.as_ref()
    }

    /// Counter table handle, present only while running.
    pub fn counters(&self) -> Option<&D::Counters> {
        self.counters.as_ref()
    }

    pub fn datapath(&self) -> &D {
        &self.datapath
    }

    /// Detach and unload, returning the interface to its pre-attach state.
    ///
    /// Idempotent: once unloaded, further calls do nothing. A detach failure
    /// does not stop the unload; it is returned after the session is released.
    pub fn shutdown(&mut self) -> Result<()> {
        if self.state == Lifecycle::Unloaded {
            debug!("Shutdown requested on an unloaded session, nothing to do");
            return Ok(());
        }

        let was_attached = self.state.is_attached();
        self.state = Lifecycle::Detaching;
        self.counters = None;

        let detached = if was_attached {
            let result = self.datapath.detach();
            if let Err(e) = &result {
                warn!("Detach failed, continuing shutdown: {}", e);
            }
            result
        } else {
            Ok(())
        };

        self.datapath.unload();
        self.iface = None;
        self.state = Lifecycle::Unloaded;
        detached
    }

    fn expect_state(&self, expected: Lifecycle) {
        debug_assert_eq!(
            self.state, expected,
            "lifecycle transition from {} attempted in state {}",
            expected, self.state
        );
    }
}

impl<D: Datapath> Drop for Session<D> {
    fn drop(&mut self) {
        if self.state != Lifecycle::Unloaded {
            debug!("Session dropped in state {}, releasing", self.state);
            // detach failures are already logged by shutdown
            let _ = self.shutdown();
        }
    }
}
