// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Error type shared by every hwtest operation.

use std::fmt;
use std::io;
use std::path::PathBuf;

use hwtest_abi::{PhysAddr, Width};

/// Result alias for hwtest operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur while opening or using a register bus.
///
/// Every error is terminal at the point where it occurs; nothing in this
/// crate retries.
#[derive(Debug)]
pub enum Error {
    /// The process lacks administrative privilege.
    NotPrivileged,
    /// The kernel driver could not be activated.
    DriverLoad {
        /// Module that was requested.
        module: String,
        /// What the loader reported.
        reason: String,
    },
    /// A region helper was constructed without a base address.
    MissingBase,
    /// A device file could not be opened, read or written.
    Io {
        /// Device file involved.
        path: PathBuf,
        /// Underlying OS error.
        source: io::Error,
    },
    /// A physical page could not be mapped.
    Map {
        /// Page base that was being mapped.
        page: PhysAddr,
        /// Underlying OS error.
        source: io::Error,
    },
    /// The access is not naturally aligned for its width.
    Misaligned {
        /// Requested address.
        addr: PhysAddr,
        /// Requested width.
        width: Width,
    },
    /// Raising the I/O privilege level for port access failed.
    IoPrivilege(io::Error),
    /// The operation is not available on this platform.
    Unsupported(&'static str),
    /// A configuration value could not be parsed.
    Config {
        /// Setting name.
        key: &'static str,
        /// Offending value.
        value: String,
    },
    /// Writing diagnostic output failed.
    Output(io::Error),
}

impl Error {
    /// Build an [`Error::Io`] for a device path.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPrivileged => write!(f, "you must be root to access hardware registers"),
            Self::DriverLoad { module, reason } => {
                write!(f, "failed to load the {module} module: {reason}")
            }
            Self::MissingBase => {
                write!(f, "you must specify a base address for the region")
            }
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Map { page, source } => write!(f, "failed to map page {page}: {source}"),
            Self::Misaligned { addr, width } => {
                write!(f, "{width} access at {addr} is not naturally aligned")
            }
            Self::IoPrivilege(source) => write!(
                f,
                "failed to enable permissions to access I/O space for this process: {source}"
            ),
            Self::Unsupported(what) => write!(f, "unsupported on this platform: {what}"),
            Self::Config { key, value } => write!(f, "invalid value for {key}: {value:?}"),
            Self::Output(source) => write!(f, "failed to write output: {source}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } | Self::Map { source, .. } => Some(source),
            Self::IoPrivilege(source) | Self::Output(source) => Some(source),
            _ => None,
        }
    }
}
