// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! # hwtest
//!
//! Register, port and DMA page access for bringing up and testing hardware
//! from user space.
//!
//! ## Usage
//!
//! ```no_run
//! use hwtest::{Config, MemoryRegion, PhysAddr};
//!
//! let config = Config::from_env()?;
//! let mut regs = hwtest::open(&config)?;
//!
//! let bar = MemoryRegion::new(Some(0xfebf_0000))?;
//! let id = bar.readlw(&mut regs, 0x0)?;
//! regs.dump(PhysAddr::new(0xfebf_0000), 4, &mut std::io::stdout())?;
//! # let _ = id;
//! # Ok::<(), hwtest::Error>(())
//! ```
//!
//! ## Layers
//!
//! - [`gate`]: one-time privilege and driver check
//! - [`bus`]: the [`RawBus`] driver boundary, with real and mock backends
//! - [`registers`]: [`Registers`], [`IoRegion`], [`MemoryRegion`]
//! - [`config`]: [`Config`] and its environment overrides

#[cfg(test)]
mod lib_test;

pub mod bus;
pub mod config;
pub mod gate;
pub mod registers;

mod error;

pub use bus::{MockBus, RawBus};
pub use config::{Config, DriverPolicy};
pub use error::{Error, Result};
pub use gate::{GateReport, Host, SystemHost};
pub use hwtest_abi::{DmaPage, PhysAddr, PortAddr, Width};
pub use registers::{IoRegion, MemoryRegion, Registers};

#[cfg(target_os = "linux")]
pub use bus::DevMemBus;

/// Pass the process gate and open the hardware bus.
///
/// This is the single initialization step for real hardware access. It
/// checks for root, tries to load the driver according to
/// [`Config::driver_policy`], opens `/dev/mem` and enables port I/O.
///
/// # Errors
///
/// Returns an error if any initialization step fails.
#[cfg(target_os = "linux")]
pub fn open(config: &Config) -> Result<Registers<DevMemBus>> {
    open_with(&SystemHost, config)
}

/// Like [`open`], with an explicit [`Host`] for the gate.
///
/// # Errors
///
/// Returns an error if any initialization step fails.
#[cfg(target_os = "linux")]
pub fn open_with<H: Host>(host: &H, config: &Config) -> Result<Registers<DevMemBus>> {
    gate::check(host, config)?;
    let bus = DevMemBus::open(config)?;
    Ok(Registers::new(bus))
}

/// Registers over a fresh [`MockBus`], for dry runs and tests.
#[must_use]
pub fn open_mock() -> Registers<MockBus> {
    Registers::new(MockBus::new())
}
