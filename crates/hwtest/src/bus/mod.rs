// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The driver boundary.
//!
//! [`RawBus`] is the narrow interface to privileged hardware access. It
//! speaks the boundary's signed fixed-width representation: addresses and
//! values arrive as `i32` (`i16` for word writes) and read results leave as
//! a native `i64` that may carry sign extension. Conversion and masking are
//! the caller's job; see [`crate::Registers`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │            Registers / IoRegion / MemoryRegion          │
//! │       (unsigned values, conversion, masking, dump)      │
//! └─────────────────────────────────────────────────────────┘
//!                           │  i32 / i16 in, i64 out
//!                           ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                     `RawBus` trait                      │
//! └─────────────────────────────────────────────────────────┘
//!            │                              │
//!            ▼                              ▼
//! ┌─────────────────────┐      ┌─────────────────────────────┐
//! │     `MockBus`       │      │        `DevMemBus`          │
//! │  (tests, dry runs)  │      │ (/dev/mem, khwtest, in/out) │
//! └─────────────────────┘      └─────────────────────────────┘
//! ```


#[cfg(target_os = "linux")]
mod devmem;
mod mock;

#[cfg(target_os = "linux")]
pub use devmem::DevMemBus;
pub use mock::{BusCall, MockBus, Space};

use crate::Result;

/// Privileged register access in the boundary's signed representation.
///
/// Implementations reinterpret the signed arguments as the unsigned bit
/// patterns they carry. Every method blocks until the access completes.
pub trait RawBus {
    /// Read a byte of physical memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying access fails.
    fn read8(&mut self, addr: i32) -> Result<i64>;

    /// Read a word of physical memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying access fails.
    fn read16(&mut self, addr: i32) -> Result<i64>;

    /// Read a long word of physical memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying access fails.
    fn read32(&mut self, addr: i32) -> Result<i64>;

    /// Write a byte of physical memory; only the low 8 bits of `value` are used.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying access fails.
    fn write8(&mut self, addr: i32, value: i32) -> Result<()>;

    /// Write a word of physical memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying access fails.
    fn write16(&mut self, addr: i32, value: i16) -> Result<()>;

    /// Write a long word of physical memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying access fails.
    fn write32(&mut self, addr: i32, value: i32) -> Result<()>;

    /// Read a byte from an I/O port.
    ///
    /// # Errors
    ///
    /// Returns an error if port I/O is unavailable.
    fn port_in8(&mut self, port: i32) -> Result<i64>;

    /// Read a word from an I/O port.
    ///
    /// # Errors
    ///
    /// Returns an error if port I/O is unavailable.
    fn port_in16(&mut self, port: i32) -> Result<i64>;

    /// Read a long word from an I/O port.
    ///
    /// # Errors
    ///
    /// Returns an error if port I/O is unavailable.
    fn port_in32(&mut self, port: i32) -> Result<i64>;

    /// Write a byte to an I/O port; only the low 8 bits of `value` are used.
    ///
    /// # Errors
    ///
    /// Returns an error if port I/O is unavailable.
    fn port_out8(&mut self, port: i32, value: i32) -> Result<()>;

    /// Write a word to an I/O port; only the low 16 bits of `value` are used.
    ///
    /// # Errors
    ///
    /// Returns an error if port I/O is unavailable.
    fn port_out16(&mut self, port: i32, value: i32) -> Result<()>;

    /// Write a long word to an I/O port.
    ///
    /// # Errors
    ///
    /// Returns an error if port I/O is unavailable.
    fn port_out32(&mut self, port: i32, value: i32) -> Result<()>;

    /// Allocate one DMA-capable page and return its physical address.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver is unavailable or out of memory.
    fn alloc_dma_page(&mut self) -> Result<i64>;
}

/// Sign-extend a byte the way the native boundary returns it.
#[inline]
pub(crate) fn extend8(value: u8) -> i64 {
    i64::from(i8::from_ne_bytes([value]))
}

/// Sign-extend a word the way the native boundary returns it.
#[inline]
pub(crate) fn extend16(value: u16) -> i64 {
    i64::from(i16::from_ne_bytes(value.to_ne_bytes()))
}

/// Long words come back as an unsigned native long.
#[inline]
pub(crate) fn extend32(value: u32) -> i64 {
    i64::from(value)
}

/// Low byte of a boundary value.
#[inline]
pub(crate) fn low8(value: i32) -> u8 {
    value.to_le_bytes()[0]
}

/// Low word of a boundary value.
#[inline]
pub(crate) fn low16(value: i32) -> u16 {
    let [lo, hi, _, _] = value.to_le_bytes();
    u16::from_le_bytes([lo, hi])
}
