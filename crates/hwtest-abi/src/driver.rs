// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! `khwtest` driver ABI and device paths.
//!
//! # Physical address split
//!
//! ```text
//! 0x0000_0000 ┬─────────────────────────────┐
//!             │ RAM                         │  pread/pwrite on /dev/khwtest
//! RAM_HIGH    ┼─────────────────────────────┤
//!             │ device memory (MMIO BARs)   │  mmap of /dev/mem, one page
//! 0xffff_ffff ┴─────────────────────────────┘
//! ```

/// Kernel physical memory device.
pub const DEV_MEM_PATH: &str = "/dev/mem";

/// Character device registered by the `khwtest` driver.
pub const KHWTEST_DEVICE_PATH: &str = "/dev/khwtest";

/// Kernel module name passed to `modprobe`.
pub const KHWTEST_MODULE: &str = "khwtest";

/// Physical addresses below this boundary are RAM and go through the driver.
pub const DEFAULT_RAM_HIGH: u32 = 0x2000_0000;

/// Size of one DMA page and of the `/dev/mem` mapping window (4 KB).
pub const PAGE_SIZE: u32 = 4096;

/// ioctl magic for the `khwtest` driver.
pub const KHWTEST_CODE: u8 = b'K';

// Linux asm-generic ioctl encoding.
const IOC_NRBITS: u32 = 8;
const IOC_TYPEBITS: u32 = 8;
const IOC_SIZEBITS: u32 = 14;
const IOC_NRSHIFT: u32 = 0;
const IOC_TYPESHIFT: u32 = IOC_NRSHIFT + IOC_NRBITS;
const IOC_SIZESHIFT: u32 = IOC_TYPESHIFT + IOC_TYPEBITS;
const IOC_DIRSHIFT: u32 = IOC_SIZESHIFT + IOC_SIZEBITS;
const IOC_READ: u32 = 2;

/// Encode a read-direction ioctl number (`_IOR`).
#[must_use]
pub const fn ior(ty: u8, nr: u8, size: u32) -> u32 {
    (IOC_READ << IOC_DIRSHIFT)
        | (size << IOC_SIZESHIFT)
        | ((ty as u32) << IOC_TYPESHIFT)
        | ((nr as u32) << IOC_NRSHIFT)
}

/// Allocate one page mapped for DMA by 32-bit devices; the driver writes
/// the page's 32-bit physical address to the `u32` argument.
///
/// There is no matching free. Every page allocated through a device handle
/// is released when that handle is closed.
pub const KHWTEST_ALLOC_DMA_PAGE32: u32 = ior(KHWTEST_CODE, 1, 4);

const _: () = {
    assert!(KHWTEST_ALLOC_DMA_PAGE32 == 0x8004_4b01);
    assert!(PAGE_SIZE.is_power_of_two());
    assert!(DEFAULT_RAM_HIGH % PAGE_SIZE == 0);
};
