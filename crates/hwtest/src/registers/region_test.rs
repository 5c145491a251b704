// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for base-relative regions.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use hwtest_abi::{PhysAddr, PortAddr, Width};

use super::{IoRegion, MemoryRegion, Registers};
use crate::Error;
use crate::bus::{BusCall, MockBus, Space};

#[test]
fn memory_region_adds_offset() {
    let mut regs = Registers::new(MockBus::new());
    let region = MemoryRegion::new(Some(0x1000)).unwrap();
    region.readlw(&mut regs, 0x10).unwrap();
    assert_eq!(
        regs.bus().calls(),
        &[BusCall::Read {
            space: Space::Memory,
            width: Width::Long,
            addr: 0x1010,
        }]
    );
}

#[test]
fn memory_region_write_lands_at_offset() {
    let mut regs = Registers::new(MockBus::new());
    let region = MemoryRegion::new(Some(0xfebf_0000)).unwrap();
    region.writelw(&mut regs, 0x8, 0xcafe_f00d).unwrap();
    assert_eq!(regs.bus().peek32(0xfebf_0008), 0xcafe_f00d);
    assert_eq!(regs.readlw(PhysAddr::new(0xfebf_0008)).unwrap(), 0xcafe_f00d);
    assert_eq!(region.base(), PhysAddr::new(0xfebf_0000));
}

#[test]
fn io_region_adds_offset() {
    let mut regs = Registers::new(MockBus::new());
    let region = IoRegion::new(Some(0xc000)).unwrap();
    region.outlw(&mut regs, 4, 0x1234_5678).unwrap();
    assert_eq!(regs.bus().peek_port32(0xc004), 0x1234_5678);
    assert_eq!(region.inlw(&mut regs, 4).unwrap(), 0x1234_5678);
    assert_eq!(region.base(), PortAddr::new(0xc000));
}

#[test]
fn missing_base_is_rejected() {
    assert!(matches!(MemoryRegion::new(None), Err(Error::MissingBase)));
    assert!(matches!(IoRegion::new(None), Err(Error::MissingBase)));
}

#[test]
fn zero_base_counts_as_missing() {
    assert!(matches!(MemoryRegion::new(Some(0)), Err(Error::MissingBase)));
    assert!(matches!(IoRegion::new(Some(0)), Err(Error::MissingBase)));
}
