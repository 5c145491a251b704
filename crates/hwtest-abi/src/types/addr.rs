// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Physical memory and I/O port address types.

use core::fmt;
use core::ops::Add;

use crate::convert::to_signed32;

/// A 32-bit physical memory address (MMIO register or RAM).
///
/// Offsets wrap within the 32-bit physical space, matching what a device
/// behind a 32-bit BAR can address.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct PhysAddr(u32);

impl PhysAddr {
    /// Create a new physical address.
    #[inline]
    #[must_use]
    pub const fn new(addr: u32) -> Self {
        Self(addr)
    }

    /// Check if this is the zero address.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Get the raw address value.
    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Get the address widened to 64 bits (for file offsets).
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0 as u64
    }

    /// The signed representation carried across the driver boundary.
    #[inline]
    #[must_use]
    pub const fn to_raw(self) -> i32 {
        to_signed32(self.0)
    }

    /// Add a byte offset to this address.
    #[inline]
    #[must_use]
    pub const fn add(self, offset: u32) -> Self {
        Self(self.0.wrapping_add(offset))
    }

    /// Align this address down to the given alignment.
    ///
    /// Returns `None` if alignment is zero or not a power of two.
    #[inline]
    #[must_use]
    pub const fn align_down(self, alignment: u32) -> Option<Self> {
        if !alignment.is_power_of_two() {
            return None;
        }
        Some(Self(self.0 & !(alignment - 1)))
    }

    /// Offset of this address within an aligned block.
    ///
    /// Returns `None` if alignment is zero or not a power of two.
    #[inline]
    #[must_use]
    pub const fn offset_in(self, alignment: u32) -> Option<u32> {
        if !alignment.is_power_of_two() {
            return None;
        }
        Some(self.0 & (alignment - 1))
    }
}

impl fmt::Debug for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysAddr({:#010x})", self.0)
    }
}

impl fmt::Display for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl From<u32> for PhysAddr {
    fn from(addr: u32) -> Self {
        Self(addr)
    }
}

impl Add<u32> for PhysAddr {
    type Output = Self;

    fn add(self, rhs: u32) -> Self::Output {
        self.add(rhs)
    }
}

/// An I/O port number.
///
/// Stored as 32 bits like every other register address; x86 decodes only
/// the low 16 bits.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct PortAddr(u32);

impl PortAddr {
    /// Create a new port address.
    #[inline]
    #[must_use]
    pub const fn new(port: u32) -> Self {
        Self(port)
    }

    /// Get the raw port value.
    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// The signed representation carried across the driver boundary.
    #[inline]
    #[must_use]
    pub const fn to_raw(self) -> i32 {
        to_signed32(self.0)
    }

    /// Add an offset to this port number.
    #[inline]
    #[must_use]
    pub const fn add(self, offset: u32) -> Self {
        Self(self.0.wrapping_add(offset))
    }
}

impl fmt::Debug for PortAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PortAddr({:#06x})", self.0)
    }
}

impl fmt::Display for PortAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

impl From<u32> for PortAddr {
    fn from(port: u32) -> Self {
        Self(port)
    }
}

impl Add<u32> for PortAddr {
    type Output = Self;

    fn add(self, rhs: u32) -> Self::Output {
        self.add(rhs)
    }
}

/// A DMA-capable page handed out by the driver.
///
/// Only the physical address is known to user space. The page stays
/// allocated until the driver handle that produced it is closed.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DmaPage(PhysAddr);

impl DmaPage {
    /// Wrap a physical address returned by the driver.
    #[inline]
    #[must_use]
    pub const fn new(addr: PhysAddr) -> Self {
        Self(addr)
    }

    /// Physical address of the first byte of the page.
    #[inline]
    #[must_use]
    pub const fn addr(self) -> PhysAddr {
        self.0
    }
}

impl fmt::Debug for DmaPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DmaPage({:#010x})", self.0.as_u32())
    }
}

impl fmt::Display for DmaPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
