// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! One-time process gate.
//!
//! Before any register can be touched the process must run as root, and
//! the `khwtest` driver should be active. [`check`] performs both steps
//! against a [`Host`], so the decision logic can be tested with a fake.

#[cfg(test)]
mod gate_test;

use std::process::Command;

use tracing::{info, warn};

use crate::config::{Config, DriverPolicy};
use crate::{Error, Result};

/// The operating-system facilities the gate depends on.
pub trait Host {
    /// Whether the process has administrative privilege.
    fn is_privileged(&self) -> bool;

    /// Ensure the named kernel module is loaded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DriverLoad`] if the module could not be loaded.
    fn load_driver(&self, module: &str) -> Result<()>;
}

/// The running system: effective uid and `modprobe`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

impl Host for SystemHost {
    #[cfg(unix)]
    fn is_privileged(&self) -> bool {
        // SAFETY: geteuid cannot fail and has no preconditions.
        unsafe { libc::geteuid() == 0 }
    }

    #[cfg(not(unix))]
    fn is_privileged(&self) -> bool {
        false
    }

    fn load_driver(&self, module: &str) -> Result<()> {
        let status = Command::new("modprobe")
            .arg(module)
            .status()
            .map_err(|e| Error::DriverLoad {
                module: module.to_owned(),
                reason: e.to_string(),
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(Error::DriverLoad {
                module: module.to_owned(),
                reason: format!("modprobe exited with {status}"),
            })
        }
    }
}

/// Outcome of a successful gate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateReport {
    /// Whether the driver was confirmed active.
    pub driver_loaded: bool,
}

/// Validate the process environment.
///
/// # Errors
///
/// Returns [`Error::NotPrivileged`] if the host is not privileged, or
/// [`Error::DriverLoad`] if the driver fails to load under
/// [`DriverPolicy::Required`].
pub fn check<H: Host>(host: &H, config: &Config) -> Result<GateReport> {
    if !host.is_privileged() {
        return Err(Error::NotPrivileged);
    }

    let driver_loaded = match host.load_driver(&config.driver_module) {
        Ok(()) => true,
        Err(err) => match config.driver_policy {
            DriverPolicy::Required => return Err(err),
            DriverPolicy::Optional => {
                warn!(
                    module = %config.driver_module,
                    error = %err,
                    "driver not loaded; this is OK if you do not plan to use DMA operations"
                );
                false
            }
        },
    };

    info!(driver_loaded, "hardware access gate passed");
    Ok(GateReport { driver_loaded })
}
