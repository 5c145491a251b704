// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Address types for register access.
//!
//! These newtypes prevent accidentally passing an I/O port number where a
//! physical memory address is expected, and vice versa.

mod addr;


pub use addr::{DmaPage, PhysAddr, PortAddr};
