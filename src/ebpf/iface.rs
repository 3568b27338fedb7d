//! Network interface name resolution

use crate::{Result, XdpStatError};

/// A network interface resolved to its kernel index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    name: String,
    index: u32,
}

impl Interface {
    pub fn new(name: impl Into<String>, index: u32) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }

    /// Look up `name` with `if_nametoindex(3)`.
    #[cfg(unix)]
    pub fn resolve(name: &str) -> Result<Self> {
        let c_name = std::ffi::CString::new(name)
            .map_err(|_| XdpStatError::InterfaceNotFound(name.to_string()))?;

        // SAFETY: c_name is a valid NUL-terminated string for the duration of the call
        let index = unsafe { libc::if_nametoindex(c_name.as_ptr()) };
        if index == 0 {
            return Err(XdpStatError::InterfaceNotFound(format!(
                "{} ({})",
                name,
                std::io::Error::last_os_error()
            )));
        }

        Ok(Self::new(name, index))
    }

    #[cfg(not(unix))]
    pub fn resolve(name: &str) -> Result<Self> {
        Err(XdpStatError::InterfaceNotFound(name.to_string()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> u32 {
        self.index
    }
}

impl std::fmt::Display for Interface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (ifindex={})", self.name, self.index)
    }
}
