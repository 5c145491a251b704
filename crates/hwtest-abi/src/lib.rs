// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Driver boundary definitions shared by the hwtest library and tools.
//!
//! This crate defines the contract between user-space test code and the
//! privileged side (`/dev/mem`, the `khwtest` kernel driver, the I/O port
//! space):
//! - Address newtypes for physical memory and I/O ports
//! - Two's-complement reinterpretation of unsigned register values into the
//!   signed fixed-width integers the boundary carries, and masking back
//! - Driver constants (device paths, module name, ioctl numbers)
//!
//! # Design Principles
//!
//! - **No dependencies**: Pure data types, 100% host-testable
//! - **32-bit registers**: Addresses and values never exceed 32 bits
//!
//! # Modules
//!
//! - [`types`]: `PhysAddr`, `PortAddr`, `DmaPage`
//! - [`convert`]: Signed/unsigned conversion and width masks
//! - [`driver`]: `khwtest` ABI and device paths

#![cfg_attr(not(test), no_std)]


pub mod convert;
pub mod driver;
pub mod types;

// Re-export commonly used types at crate root
pub use convert::{
    Width, from_signed16, from_signed32, mask8, mask16, mask32, to_signed16, to_signed32,
};
pub use types::{DmaPage, PhysAddr, PortAddr};
