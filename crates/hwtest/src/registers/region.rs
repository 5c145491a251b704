// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Base-relative register access.

use hwtest_abi::{PhysAddr, PortAddr};

use super::Registers;
use crate::bus::RawBus;
use crate::{Error, Result};

/// Port I/O relative to a fixed base port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoRegion {
    base: PortAddr,
}

impl IoRegion {
    /// Create a region from an optional base.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingBase`] if `base` is absent or zero.
    pub fn new(base: Option<u32>) -> Result<Self> {
        match base {
            Some(base) if base != 0 => Ok(Self {
                base: PortAddr::new(base),
            }),
            _ => Err(Error::MissingBase),
        }
    }

    /// Base port.
    #[must_use]
    pub const fn base(&self) -> PortAddr {
        self.base
    }

    /// Read a long word at `base + offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if port I/O is unavailable.
    pub fn inlw<B: RawBus>(&self, regs: &mut Registers<B>, offset: u32) -> Result<u32> {
        regs.inlw(self.base.add(offset))
    }

    /// Write a long word at `base + offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if port I/O is unavailable.
    pub fn outlw<B: RawBus>(&self, regs: &mut Registers<B>, offset: u32, value: u32) -> Result<()> {
        regs.outlw(self.base.add(offset), value)
    }
}

/// Memory-mapped I/O relative to a fixed base address, typically a BAR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRegion {
    base: PhysAddr,
}

impl MemoryRegion {
    /// Create a region from an optional base.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingBase`] if `base` is absent or zero.
    pub fn new(base: Option<u32>) -> Result<Self> {
        match base {
            Some(base) if base != 0 => Ok(Self {
                base: PhysAddr::new(base),
            }),
            _ => Err(Error::MissingBase),
        }
    }

    /// Base address.
    #[must_use]
    pub const fn base(&self) -> PhysAddr {
        self.base
    }

    /// Read a long word at `base + offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus access fails.
    pub fn readlw<B: RawBus>(&self, regs: &mut Registers<B>, offset: u32) -> Result<u32> {
        regs.readlw(self.base.add(offset))
    }

    /// Write a long word at `base + offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus access fails.
    pub fn writelw<B: RawBus>(
        &self,
        regs: &mut Registers<B>,
        offset: u32,
        value: u32,
    ) -> Result<()> {
        regs.writelw(self.base.add(offset), value)
    }
}
