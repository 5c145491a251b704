// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Physical memory bus over `/dev/mem` and the `khwtest` driver.
//!
//! Device memory at or above `ram_high` is reached through a single cached
//! page mapping of `/dev/mem`; moving to another page drops the old mapping
//! first. RAM below `ram_high` is read and written positionally through
//! `/dev/khwtest`, which validates the range in the kernel. Port I/O uses
//! `in`/`out` after the process has raised its I/O privilege level.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::AsRawFd;
use std::os::unix::fs::FileExt;
use std::path::PathBuf;
use std::ptr::NonNull;

use hwtest_abi::driver::{KHWTEST_ALLOC_DMA_PAGE32, PAGE_SIZE};
use hwtest_abi::{PhysAddr, Width, from_signed32};
use tracing::debug;

use super::{RawBus, extend8, extend16, extend32, low8, low16};
use crate::config::Config;
use crate::{Error, Result};

/// One page of `/dev/mem` mapped shared and read-write.
struct Window {
    /// Physical address of the mapped page.
    page: PhysAddr,
    /// Start of the mapping.
    ptr: NonNull<u8>,
    /// Length of the mapping.
    len: usize,
}

impl Window {
    fn map(mem: &File, page: PhysAddr, len: usize) -> Result<Self> {
        let offset = libc::off_t::try_from(page.as_u64()).map_err(|_| Error::Map {
            page,
            source: io::Error::from(io::ErrorKind::InvalidInput),
        })?;
        // SAFETY: Fresh mapping chosen by the kernel; nothing else aliases it.
        let raw = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                mem.as_raw_fd(),
                offset,
            )
        };
        if raw == libc::MAP_FAILED {
            return Err(Error::Map {
                page,
                source: io::Error::last_os_error(),
            });
        }
        let ptr = NonNull::new(raw.cast::<u8>()).ok_or_else(|| Error::Map {
            page,
            source: io::Error::from(io::ErrorKind::AddrNotAvailable),
        })?;
        debug!(%page, "mapped /dev/mem window");
        Ok(Self { page, ptr, len })
    }

    /// Pointer to `offset` bytes into the page, typed for a `T` access.
    fn at<T>(&self, offset: u32) -> *mut T {
        // SAFETY: Callers keep offset + size_of::<T>() within the page.
        unsafe { self.ptr.as_ptr().add(offset as usize).cast::<T>() }
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        // SAFETY: ptr/len describe a mapping created by `Window::map`.
        unsafe {
            libc::munmap(self.ptr.as_ptr().cast::<libc::c_void>(), self.len);
        }
    }
}

/// Register bus backed by the real hardware.
///
/// Owns the `/dev/mem` handle, the lazily opened driver handle and the
/// current mapping window. DMA pages allocated through this bus are
/// released by the driver when the bus is dropped.
pub struct DevMemBus {
    mem: File,
    driver: Option<File>,
    driver_path: PathBuf,
    ram_high: PhysAddr,
    page_size: u32,
    window: Option<Window>,
    ports_enabled: bool,
}

impl DevMemBus {
    /// Open `/dev/mem` and raise the I/O privilege level.
    ///
    /// # Errors
    ///
    /// Returns an error if `/dev/mem` cannot be opened read-write or the
    /// process may not access I/O space.
    pub fn open(config: &Config) -> Result<Self> {
        let mut bus = Self::open_memory(config)?;
        bus.ports_enabled = enable_port_io()?;
        Ok(bus)
    }

    /// Open `/dev/mem` only.
    ///
    /// The I/O privilege level is raised on the first port access instead.
    ///
    /// # Errors
    ///
    /// Returns an error if `/dev/mem` cannot be opened read-write.
    pub fn open_memory(config: &Config) -> Result<Self> {
        let mem = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&config.dev_mem)
            .map_err(|e| Error::io(&config.dev_mem, e))?;
        debug!(path = %config.dev_mem.display(), "opened physical memory device");
        Ok(Self {
            mem,
            driver: None,
            driver_path: config.driver_device.clone(),
            ram_high: config.ram_high,
            page_size: system_page_size(),
            window: None,
            ports_enabled: false,
        })
    }

    fn driver(&mut self) -> Result<&File> {
        if self.driver.is_none() {
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .open(&self.driver_path)
                .map_err(|e| Error::io(&self.driver_path, e))?;
            debug!(path = %self.driver_path.display(), "opened driver device");
            self.driver = Some(file);
        }
        self.driver
            .as_ref()
            .ok_or_else(|| Error::io(&self.driver_path, io::Error::from(io::ErrorKind::NotFound)))
    }

    /// Map the page containing `addr` and return the offset within it.
    fn window_for(&mut self, addr: PhysAddr, width: Width) -> Result<(&Window, u32)> {
        let (Some(page), Some(offset)) =
            (addr.align_down(self.page_size), addr.offset_in(self.page_size))
        else {
            return Err(Error::Unsupported("page size is not a power of two"));
        };
        if offset as usize % width.bytes() != 0 {
            return Err(Error::Misaligned { addr, width });
        }
        if self.window.as_ref().is_none_or(|w| w.page != page) {
            // Unmap before mapping the next page; at most one window exists.
            self.window = None;
            self.window = Some(Window::map(&self.mem, page, self.page_size as usize)?);
        }
        match self.window.as_ref() {
            Some(window) => Ok((window, offset)),
            None => Err(Error::Unsupported("mapping window unavailable")),
        }
    }

    fn is_device_memory(&self, addr: PhysAddr) -> bool {
        addr >= self.ram_high
    }

    fn read_mem(&mut self, addr: i32, width: Width) -> Result<[u8; 4]> {
        let addr = PhysAddr::new(from_signed32(addr));
        let mut out = [0u8; 4];
        if self.is_device_memory(addr) {
            let (window, offset) = self.window_for(addr, width)?;
            // SAFETY: offset is aligned for the width and inside the mapped page.
            unsafe {
                match width {
                    Width::Byte => out[0] = window.at::<u8>(offset).read_volatile(),
                    Width::Word => {
                        out[..2].copy_from_slice(
                            &window.at::<u16>(offset).read_volatile().to_ne_bytes(),
                        );
                    }
                    Width::Long => {
                        out = window.at::<u32>(offset).read_volatile().to_ne_bytes();
                    }
                }
            }
        } else {
            let path = self.driver_path.clone();
            self.driver()?
                .read_exact_at(&mut out[..width.bytes()], addr.as_u64())
                .map_err(|e| Error::io(path, e))?;
        }
        Ok(out)
    }

    fn write_mem(&mut self, addr: i32, width: Width, value: [u8; 4]) -> Result<()> {
        let addr = PhysAddr::new(from_signed32(addr));
        if self.is_device_memory(addr) {
            let (window, offset) = self.window_for(addr, width)?;
            let [b0, b1, b2, b3] = value;
            // SAFETY: offset is aligned for the width and inside the mapped page.
            unsafe {
                match width {
                    Width::Byte => window.at::<u8>(offset).write_volatile(b0),
                    Width::Word => window
                        .at::<u16>(offset)
                        .write_volatile(u16::from_ne_bytes([b0, b1])),
                    Width::Long => window
                        .at::<u32>(offset)
                        .write_volatile(u32::from_ne_bytes([b0, b1, b2, b3])),
                }
            }
        } else {
            let path = self.driver_path.clone();
            self.driver()?
                .write_all_at(&value[..width.bytes()], addr.as_u64())
                .map_err(|e| Error::io(path, e))?;
        }
        Ok(())
    }

    fn ports(&mut self) -> Result<()> {
        if !self.ports_enabled {
            self.ports_enabled = enable_port_io()?;
        }
        if self.ports_enabled {
            Ok(())
        } else {
            Err(Error::Unsupported("port I/O requires x86_64 Linux"))
        }
    }
}

impl RawBus for DevMemBus {
    fn read8(&mut self, addr: i32) -> Result<i64> {
        let [b0, ..] = self.read_mem(addr, Width::Byte)?;
        Ok(extend8(b0))
    }

    fn read16(&mut self, addr: i32) -> Result<i64> {
        let [b0, b1, ..] = self.read_mem(addr, Width::Word)?;
        Ok(extend16(u16::from_ne_bytes([b0, b1])))
    }

    fn read32(&mut self, addr: i32) -> Result<i64> {
        let bytes = self.read_mem(addr, Width::Long)?;
        Ok(extend32(u32::from_ne_bytes(bytes)))
    }

    fn write8(&mut self, addr: i32, value: i32) -> Result<()> {
        self.write_mem(addr, Width::Byte, [low8(value), 0, 0, 0])
    }

    fn write16(&mut self, addr: i32, value: i16) -> Result<()> {
        let [b0, b1] = value.to_ne_bytes();
        self.write_mem(addr, Width::Word, [b0, b1, 0, 0])
    }

    fn write32(&mut self, addr: i32, value: i32) -> Result<()> {
        self.write_mem(addr, Width::Long, value.to_ne_bytes())
    }

    fn port_in8(&mut self, port: i32) -> Result<i64> {
        self.ports()?;
        Ok(extend8(pio::in8(port_number(port))))
    }

    fn port_in16(&mut self, port: i32) -> Result<i64> {
        self.ports()?;
        Ok(extend16(pio::in16(port_number(port))))
    }

    fn port_in32(&mut self, port: i32) -> Result<i64> {
        self.ports()?;
        Ok(extend32(pio::in32(port_number(port))))
    }

    fn port_out8(&mut self, port: i32, value: i32) -> Result<()> {
        self.ports()?;
        pio::out8(port_number(port), low8(value));
        Ok(())
    }

    fn port_out16(&mut self, port: i32, value: i32) -> Result<()> {
        self.ports()?;
        pio::out16(port_number(port), low16(value));
        Ok(())
    }

    fn port_out32(&mut self, port: i32, value: i32) -> Result<()> {
        self.ports()?;
        pio::out32(port_number(port), from_signed32(value));
        Ok(())
    }

    fn alloc_dma_page(&mut self) -> Result<i64> {
        let path = self.driver_path.clone();
        let fd = self.driver()?.as_raw_fd();
        let mut physical: u32 = 0;
        // SAFETY: The request writes exactly one u32 through the pointer.
        let rc = unsafe {
            libc::ioctl(
                fd,
                KHWTEST_ALLOC_DMA_PAGE32 as _,
                std::ptr::from_mut(&mut physical),
            )
        };
        if rc != 0 {
            return Err(Error::io(path, io::Error::last_os_error()));
        }
        debug!(page = format_args!("{physical:#010x}"), "allocated DMA page");
        Ok(extend32(physical))
    }
}

/// x86 decodes only the low 16 bits of a port number.
fn port_number(port: i32) -> u16 {
    low16(port)
}

fn system_page_size() -> u32 {
    // SAFETY: sysconf has no preconditions.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    u32::try_from(size)
        .ok()
        .filter(|s| s.is_power_of_two())
        .unwrap_or(PAGE_SIZE)
}

/// Raise the I/O privilege level so `in`/`out` work from user space.
#[cfg(target_arch = "x86_64")]
fn enable_port_io() -> Result<bool> {
    // SAFETY: iopl only changes this process's privilege flags.
    if unsafe { libc::iopl(3) } != 0 {
        return Err(Error::IoPrivilege(io::Error::last_os_error()));
    }
    debug!("raised I/O privilege level");
    Ok(true)
}

#[cfg(not(target_arch = "x86_64"))]
fn enable_port_io() -> Result<bool> {
    debug!("no port I/O on this architecture");
    Ok(false)
}

#[cfg(target_arch = "x86_64")]
mod pio {
    use x86_64::instructions::port::Port;

    // SAFETY (all functions): only reachable after iopl(3) succeeded; the
    // caller owns the consequences of touching the port.

    pub fn in8(port: u16) -> u8 {
        // SAFETY: see module note.
        unsafe { Port::<u8>::new(port).read() }
    }

    pub fn in16(port: u16) -> u16 {
        // SAFETY: see module note.
        unsafe { Port::<u16>::new(port).read() }
    }

    pub fn in32(port: u16) -> u32 {
        // SAFETY: see module note.
        unsafe { Port::<u32>::new(port).read() }
    }

    pub fn out8(port: u16, value: u8) {
        // SAFETY: see module note.
        unsafe { Port::<u8>::new(port).write(value) }
    }

    pub fn out16(port: u16, value: u16) {
        // SAFETY: see module note.
        unsafe { Port::<u16>::new(port).write(value) }
    }

    pub fn out32(port: u16, value: u32) {
        // SAFETY: see module note.
        unsafe { Port::<u32>::new(port).write(value) }
    }
}

#[cfg(not(target_arch = "x86_64"))]
mod pio {
    // Unreachable: `DevMemBus::ports` rejects every call first.
    pub const fn in8(_port: u16) -> u8 {
        0xff
    }
    pub const fn in16(_port: u16) -> u16 {
        0xffff
    }
    pub const fn in32(_port: u16) -> u32 {
        0xffff_ffff
    }
    pub const fn out8(_port: u16, _value: u8) {}
    pub const fn out16(_port: u16, _value: u16) {}
    pub const fn out32(_port: u16, _value: u32) {}
}
