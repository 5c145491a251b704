// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Register access front end.
//!
//! [`Registers`] is what test code talks to. It takes and returns unsigned
//! register values, converts addresses and values into the boundary's
//! signed form before each [`RawBus`] call, and masks every raw result back
//! to the width of the access.

#[cfg(test)]
mod registers_test;
#[cfg(test)]
mod region_test;

mod region;

pub use region::{IoRegion, MemoryRegion};

use std::io::Write;

use hwtest_abi::{
    DmaPage, PhysAddr, PortAddr, mask8, mask16, mask32, to_signed16, to_signed32,
};

use crate::bus::RawBus;
use crate::{Error, Result};

/// Byte stride between consecutive dump entries.
const DUMP_STRIDE: u32 = 4;

/// Typed register access over a [`RawBus`].
pub struct Registers<B> {
    bus: B,
}

impl<B: RawBus> Registers<B> {
    /// Wrap a bus.
    #[must_use]
    pub const fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Borrow the underlying bus.
    #[must_use]
    pub const fn bus(&self) -> &B {
        &self.bus
    }

    /// Mutably borrow the underlying bus.
    pub const fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    // ---------------------------------------------------------------------
    // Memory-mapped I/O
    // ---------------------------------------------------------------------

    /// Read a byte from a memory-mapped register.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus access fails.
    pub fn readb(&mut self, addr: PhysAddr) -> Result<u8> {
        self.bus.read8(addr.to_raw()).map(mask8)
    }

    /// Read a word from a memory-mapped register.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus access fails.
    pub fn readw(&mut self, addr: PhysAddr) -> Result<u16> {
        self.bus.read16(addr.to_raw()).map(mask16)
    }

    /// Read a long word from a memory-mapped register.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus access fails.
    pub fn readlw(&mut self, addr: PhysAddr) -> Result<u32> {
        self.bus.read32(addr.to_raw()).map(mask32)
    }

    /// Write a byte to a memory-mapped register.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus access fails.
    pub fn writeb(&mut self, addr: PhysAddr, value: u8) -> Result<()> {
        self.bus
            .write8(addr.to_raw(), to_signed32(u32::from(value)))
    }

    /// Write a word to a memory-mapped register.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus access fails.
    pub fn writew(&mut self, addr: PhysAddr, value: u16) -> Result<()> {
        self.bus.write16(addr.to_raw(), to_signed16(value))
    }

    /// Write a long word to a memory-mapped register.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus access fails.
    pub fn writelw(&mut self, addr: PhysAddr, value: u32) -> Result<()> {
        self.bus.write32(addr.to_raw(), to_signed32(value))
    }

    // ---------------------------------------------------------------------
    // Port I/O
    // ---------------------------------------------------------------------

    /// Read a byte from an I/O port.
    ///
    /// # Errors
    ///
    /// Returns an error if port I/O is unavailable.
    pub fn inb(&mut self, port: PortAddr) -> Result<u8> {
        self.bus.port_in8(port.to_raw()).map(mask8)
    }

    /// Read a word from an I/O port.
    ///
    /// # Errors
    ///
    /// Returns an error if port I/O is unavailable.
    pub fn inw(&mut self, port: PortAddr) -> Result<u16> {
        self.bus.port_in16(port.to_raw()).map(mask16)
    }

    /// Read a long word from an I/O port.
    ///
    /// # Errors
    ///
    /// Returns an error if port I/O is unavailable.
    pub fn inlw(&mut self, port: PortAddr) -> Result<u32> {
        self.bus.port_in32(port.to_raw()).map(mask32)
    }

    /// Write a byte to an I/O port.
    ///
    /// # Errors
    ///
    /// Returns an error if port I/O is unavailable.
    pub fn outb(&mut self, port: PortAddr, value: u8) -> Result<()> {
        self.bus
            .port_out8(port.to_raw(), to_signed32(u32::from(value)))
    }

    /// Write a word to an I/O port.
    ///
    /// # Errors
    ///
    /// Returns an error if port I/O is unavailable.
    pub fn outw(&mut self, port: PortAddr, value: u16) -> Result<()> {
        self.bus
            .port_out16(port.to_raw(), to_signed32(u32::from(value)))
    }

    /// Write a long word to an I/O port.
    ///
    /// # Errors
    ///
    /// Returns an error if port I/O is unavailable.
    pub fn outlw(&mut self, port: PortAddr, value: u32) -> Result<()> {
        self.bus.port_out32(port.to_raw(), to_signed32(value))
    }

    // ---------------------------------------------------------------------
    // DMA
    // ---------------------------------------------------------------------

    /// Allocate a page of physical memory usable for DMA by 32-bit devices.
    ///
    /// The returned address can be handed to a device or read back with the
    /// memory access functions. There is no free: the driver reclaims the
    /// page when the bus is dropped or the driver is unloaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver is unavailable or out of memory.
    pub fn alloc_dma_page(&mut self) -> Result<DmaPage> {
        let raw = self.bus.alloc_dma_page()?;
        Ok(DmaPage::new(PhysAddr::new(mask32(raw))))
    }

    // ---------------------------------------------------------------------
    // Diagnostics
    // ---------------------------------------------------------------------

    /// Print `words` consecutive long words starting at `addr`.
    ///
    /// Each line reads `aaaaaaaa: 0xvalue`.
    ///
    /// # Errors
    ///
    /// Returns an error if a read fails or `out` cannot be written.
    pub fn dump<W: Write>(&mut self, addr: PhysAddr, words: u32, out: &mut W) -> Result<()> {
        for index in 0..words {
            let at = addr.add(index.wrapping_mul(DUMP_STRIDE));
            let value = self.readlw(at)?;
            writeln!(out, "{:08x}: {value:#x}", at.as_u32()).map_err(Error::Output)?;
        }
        Ok(())
    }
}
