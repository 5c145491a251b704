// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for the register front end.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use hwtest_abi::{PhysAddr, PortAddr, Width};
use proptest::prelude::*;

use super::Registers;
use crate::Error;
use crate::bus::{BusCall, MockBus, Space};

fn regs() -> Registers<MockBus> {
    Registers::new(MockBus::new())
}

#[test]
fn reads_mask_sign_extended_results() {
    let mut regs = regs();
    regs.bus_mut().push_raw(-1);
    regs.bus_mut().push_raw(-1);
    regs.bus_mut().push_raw(-1);
    assert_eq!(regs.readb(PhysAddr::new(0)).unwrap(), 0xff);
    assert_eq!(regs.readw(PhysAddr::new(0)).unwrap(), 0xffff);
    assert_eq!(regs.readlw(PhysAddr::new(0)).unwrap(), 0xffff_ffff);
}

#[test]
fn high_address_crosses_boundary_negative() {
    let mut regs = regs();
    regs.readlw(PhysAddr::new(0xffff_ffff)).unwrap();
    assert_eq!(
        regs.bus().calls(),
        &[BusCall::Read {
            space: Space::Memory,
            width: Width::Long,
            addr: -1,
        }]
    );
}

#[test]
fn writelw_converts_value_through_32_bit_path() {
    let mut regs = regs();
    regs.writelw(PhysAddr::new(0x1000), 0x8000_0001).unwrap();
    assert_eq!(
        regs.bus().calls(),
        &[BusCall::Write {
            space: Space::Memory,
            width: Width::Long,
            addr: 0x1000,
            value: -0x7fff_ffff,
        }]
    );
    assert_eq!(regs.readlw(PhysAddr::new(0x1000)).unwrap(), 0x8000_0001);
}

#[test]
fn writew_converts_value_through_16_bit_path() {
    let mut regs = regs();
    regs.writew(PhysAddr::new(0x20), 0x8000).unwrap();
    assert_eq!(
        regs.bus().calls(),
        &[BusCall::Write {
            space: Space::Memory,
            width: Width::Word,
            addr: 0x20,
            value: -0x8000,
        }]
    );
    assert_eq!(regs.readw(PhysAddr::new(0x20)).unwrap(), 0x8000);
}

#[test]
fn writeb_round_trips_top_bit() {
    let mut regs = regs();
    regs.writeb(PhysAddr::new(0x30), 0xa5).unwrap();
    assert_eq!(regs.readb(PhysAddr::new(0x30)).unwrap(), 0xa5);
}

#[test]
fn port_operations_target_port_space() {
    let mut regs = regs();
    regs.outb(PortAddr::new(0x80), 0x12).unwrap();
    regs.outw(PortAddr::new(0x82), 0xbeef).unwrap();
    regs.outlw(PortAddr::new(0xcf8), 0x8000_f800).unwrap();
    assert_eq!(regs.inb(PortAddr::new(0x80)).unwrap(), 0x12);
    assert_eq!(regs.inw(PortAddr::new(0x82)).unwrap(), 0xbeef);
    assert_eq!(regs.inlw(PortAddr::new(0xcf8)).unwrap(), 0x8000_f800);
    assert_eq!(regs.readlw(PhysAddr::new(0xcf8)).unwrap(), 0);
    assert!(
        regs.bus()
            .calls()
            .iter()
            .take(6)
            .all(|call| matches!(call, BusCall::Read { space: Space::Port, .. }
                | BusCall::Write { space: Space::Port, .. }))
    );
}

#[test]
fn outlw_uses_long_word_port_write() {
    let mut regs = regs();
    regs.outlw(PortAddr::new(0xcfc), 0xffff_ffff).unwrap();
    assert_eq!(
        regs.bus().calls(),
        &[BusCall::Write {
            space: Space::Port,
            width: Width::Long,
            addr: 0xcfc,
            value: -1,
        }]
    );
}

#[test]
fn dma_page_is_masked_physical_address() {
    let mut regs = regs();
    let first = regs.alloc_dma_page().unwrap();
    let second = regs.alloc_dma_page().unwrap();
    assert_ne!(first, second);
    assert_eq!(regs.readlw(first.addr()).unwrap(), first.addr().as_u32());
}

#[test]
fn dump_reads_consecutive_long_words() {
    let mut regs = regs();
    regs.bus_mut().poke32(0x1000, 0xdead_beef);
    regs.bus_mut().poke32(0x1004, 0);
    regs.bus_mut().poke32(0x1008, 0x10);

    let mut out = Vec::new();
    regs.dump(PhysAddr::new(0x1000), 3, &mut out).unwrap();

    let addrs: Vec<i32> = regs
        .bus()
        .calls()
        .iter()
        .map(|call| match call {
            BusCall::Read { addr, .. } => *addr,
            other => panic!("unexpected call {other:?}"),
        })
        .collect();
    assert_eq!(addrs, [0x1000, 0x1004, 0x1008]);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "00001000: 0xdeadbeef\n00001004: 0x0\n00001008: 0x10\n"
    );
}

#[test]
fn dump_of_zero_words_reads_nothing() {
    let mut regs = regs();
    let mut out = Vec::new();
    regs.dump(PhysAddr::new(0x1000), 0, &mut out).unwrap();
    assert!(out.is_empty());
    assert!(regs.bus().calls().is_empty());
}

#[test]
fn dump_reports_output_failure() {
    struct Broken;
    impl std::io::Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("closed"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let mut regs = regs();
    let err = regs.dump(PhysAddr::new(0), 1, &mut Broken).unwrap_err();
    assert!(matches!(err, Error::Output(_)));
}

proptest! {
    #[test]
    fn reads_equal_raw_masked(raw in any::<i64>()) {
        let mut regs = regs();
        regs.bus_mut().push_raw(raw);
        regs.bus_mut().push_raw(raw);
        regs.bus_mut().push_raw(raw);
        prop_assert_eq!(i64::from(regs.readb(PhysAddr::new(0)).unwrap()), raw & 0xff);
        prop_assert_eq!(i64::from(regs.readw(PhysAddr::new(0)).unwrap()), raw & 0xffff);
        prop_assert_eq!(i64::from(regs.readlw(PhysAddr::new(0)).unwrap()), raw & 0xffff_ffff);
    }

    #[test]
    fn port_reads_equal_raw_masked(raw in any::<i64>()) {
        let mut regs = regs();
        regs.bus_mut().push_raw(raw);
        regs.bus_mut().push_raw(raw);
        regs.bus_mut().push_raw(raw);
        prop_assert_eq!(i64::from(regs.inb(PortAddr::new(0)).unwrap()), raw & 0xff);
        prop_assert_eq!(i64::from(regs.inw(PortAddr::new(0)).unwrap()), raw & 0xffff);
        prop_assert_eq!(i64::from(regs.inlw(PortAddr::new(0)).unwrap()), raw & 0xffff_ffff);
    }

    #[test]
    fn long_word_write_read_preserves_bits(addr in (0u32..0x4000_0000).prop_map(|a| a & !3), value in any::<u32>()) {
        let mut regs = regs();
        regs.writelw(PhysAddr::new(addr), value).unwrap();
        prop_assert_eq!(regs.readlw(PhysAddr::new(addr)).unwrap(), value);
    }
}
