// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Mock bus for testing.
//!
//! This provides a [`RawBus`] backed by sparse in-memory maps, allowing
//! register logic to be exercised without root, `/dev/mem` or hardware.
//! Every call is logged with the raw signed arguments it received.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use hwtest_abi::driver::PAGE_SIZE;
use hwtest_abi::{Width, from_signed32};

use super::{RawBus, extend8, extend16, extend32, low8, low16};
use crate::Result;

/// First physical address handed out by the mock DMA allocator.
const MOCK_DMA_BASE: u32 = 0x0010_0000;

/// Address space an access targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Space {
    /// Physical memory (MMIO or RAM).
    Memory,
    /// I/O port space.
    Port,
}

/// One call observed by a [`MockBus`], with raw boundary arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusCall {
    /// A read of `width` at `addr`.
    Read {
        /// Target address space.
        space: Space,
        /// Access width.
        width: Width,
        /// Address as it crossed the boundary.
        addr: i32,
    },
    /// A write of `value` at `addr`.
    Write {
        /// Target address space.
        space: Space,
        /// Access width.
        width: Width,
        /// Address as it crossed the boundary.
        addr: i32,
        /// Value as it crossed the boundary (`i16` word writes are widened).
        value: i32,
    },
    /// A DMA page allocation.
    AllocDma,
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Port => write!(f, "port"),
        }
    }
}

/// Raw arguments print as their 32-bit patterns in hex.
impl fmt::Display for BusCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { space, width, addr } => write!(f, "read {width} {space} {addr:#010x}"),
            Self::Write {
                space,
                width,
                addr,
                value,
            } => write!(f, "write {width} {space} {addr:#010x} <- {value:#x}"),
            Self::AllocDma => write!(f, "alloc dma page"),
        }
    }
}

/// Mock bus backed by byte maps.
///
/// Unwritten bytes read as zero. Values are stored little-endian, so a long
/// word written at `a` can be read back byte-wise from `a..a + 4`.
#[derive(Debug, Default)]
pub struct MockBus {
    /// Physical memory contents.
    memory: BTreeMap<u32, u8>,
    /// I/O port contents.
    ports: BTreeMap<u32, u8>,
    /// Raw results returned ahead of memory contents by the next reads.
    queued: VecDeque<i64>,
    /// Every call, in order.
    calls: Vec<BusCall>,
    /// Pages handed out so far.
    dma_pages: Vec<u32>,
}

impl MockBus {
    /// Create an empty mock bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw result for the next read in either space.
    ///
    /// Queued results bypass memory, which lets tests feed values with
    /// arbitrary sign extension or junk in the upper bits.
    pub fn push_raw(&mut self, raw: i64) {
        self.queued.push_back(raw);
    }

    /// Preload physical memory with a little-endian long word.
    pub fn poke32(&mut self, addr: u32, value: u32) {
        store(&mut self.memory, addr, &value.to_le_bytes());
    }

    /// Inspect physical memory as a little-endian long word.
    #[must_use]
    pub fn peek32(&self, addr: u32) -> u32 {
        u32::from_le_bytes(load(&self.memory, addr))
    }

    /// Inspect an I/O port as a little-endian long word.
    #[must_use]
    pub fn peek_port32(&self, port: u32) -> u32 {
        u32::from_le_bytes(load(&self.ports, port))
    }

    /// All calls observed so far.
    #[must_use]
    pub fn calls(&self) -> &[BusCall] {
        &self.calls
    }

    /// Forget the observed calls.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Physical addresses of the pages allocated so far.
    #[must_use]
    pub fn dma_pages(&self) -> &[u32] {
        &self.dma_pages
    }

    fn read(&mut self, space: Space, width: Width, addr: i32) -> [u8; 4] {
        self.calls.push(BusCall::Read { space, width, addr });
        let map = match space {
            Space::Memory => &self.memory,
            Space::Port => &self.ports,
        };
        load(map, from_signed32(addr))
    }

    fn write(&mut self, space: Space, width: Width, addr: i32, value: i32) {
        self.calls.push(BusCall::Write {
            space,
            width,
            addr,
            value,
        });
        let map = match space {
            Space::Memory => &mut self.memory,
            Space::Port => &mut self.ports,
        };
        store(map, from_signed32(addr), &value.to_le_bytes()[..width.bytes()]);
    }

    fn read_width(&mut self, space: Space, width: Width, addr: i32) -> i64 {
        let bytes = self.read(space, width, addr);
        if let Some(raw) = self.queued.pop_front() {
            return raw;
        }
        let [b0, b1, b2, b3] = bytes;
        match width {
            Width::Byte => extend8(b0),
            Width::Word => extend16(u16::from_le_bytes([b0, b1])),
            Width::Long => extend32(u32::from_le_bytes([b0, b1, b2, b3])),
        }
    }
}

fn load(map: &BTreeMap<u32, u8>, addr: u32) -> [u8; 4] {
    let mut out = [0u8; 4];
    for (offset, byte) in (0u32..).zip(out.iter_mut()) {
        *byte = map
            .get(&addr.wrapping_add(offset))
            .copied()
            .unwrap_or_default();
    }
    out
}

fn store(map: &mut BTreeMap<u32, u8>, addr: u32, bytes: &[u8]) {
    for (offset, byte) in (0u32..).zip(bytes) {
        map.insert(addr.wrapping_add(offset), *byte);
    }
}

impl RawBus for MockBus {
    fn read8(&mut self, addr: i32) -> Result<i64> {
        Ok(self.read_width(Space::Memory, Width::Byte, addr))
    }

    fn read16(&mut self, addr: i32) -> Result<i64> {
        Ok(self.read_width(Space::Memory, Width::Word, addr))
    }

    fn read32(&mut self, addr: i32) -> Result<i64> {
        Ok(self.read_width(Space::Memory, Width::Long, addr))
    }

    fn write8(&mut self, addr: i32, value: i32) -> Result<()> {
        self.write(Space::Memory, Width::Byte, addr, i32::from(low8(value)));
        Ok(())
    }

    fn write16(&mut self, addr: i32, value: i16) -> Result<()> {
        self.write(Space::Memory, Width::Word, addr, i32::from(value));
        Ok(())
    }

    fn write32(&mut self, addr: i32, value: i32) -> Result<()> {
        self.write(Space::Memory, Width::Long, addr, value);
        Ok(())
    }

    fn port_in8(&mut self, port: i32) -> Result<i64> {
        Ok(self.read_width(Space::Port, Width::Byte, port))
    }

    fn port_in16(&mut self, port: i32) -> Result<i64> {
        Ok(self.read_width(Space::Port, Width::Word, port))
    }

    fn port_in32(&mut self, port: i32) -> Result<i64> {
        Ok(self.read_width(Space::Port, Width::Long, port))
    }

    fn port_out8(&mut self, port: i32, value: i32) -> Result<()> {
        self.write(Space::Port, Width::Byte, port, i32::from(low8(value)));
        Ok(())
    }

    fn port_out16(&mut self, port: i32, value: i32) -> Result<()> {
        self.write(Space::Port, Width::Word, port, i32::from(low16(value)));
        Ok(())
    }

    fn port_out32(&mut self, port: i32, value: i32) -> Result<()> {
        self.write(Space::Port, Width::Long, port, value);
        Ok(())
    }

    fn alloc_dma_page(&mut self) -> Result<i64> {
        self.calls.push(BusCall::AllocDma);
        let count = u32::try_from(self.dma_pages.len()).unwrap_or(u32::MAX);
        let page = MOCK_DMA_BASE.wrapping_add(count.wrapping_mul(PAGE_SIZE));
        self.dma_pages.push(page);
        // The driver stamps each page with its own physical address.
        self.poke32(page, page);
        Ok(extend32(page))
    }
}

