// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Argument definitions and command dispatch.

use std::fmt;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context as _, Result, anyhow};
use clap::{Parser, Subcommand};
use hwtest::bus::BusCall;
use hwtest::config::parse_u32;
use hwtest::{Config, DriverPolicy, PhysAddr, PortAddr, RawBus, Registers, Width};

/// Access hardware registers, I/O ports and DMA pages.
///
/// Numbers are decimal or `0x`-prefixed hex. Environment variables
/// (`HWTEST_DEV_MEM`, `HWTEST_RAM_HIGH`, ...) provide defaults that the
/// flags below override.
#[derive(Debug, Parser)]
#[command(name = "hwtest", version, about, long_about = None)]
pub struct Cli {
    /// Physical memory device.
    #[arg(long, global = true, value_name = "PATH")]
    pub dev_mem: Option<PathBuf>,

    /// Driver device for low memory and DMA allocation.
    #[arg(long, global = true, value_name = "PATH")]
    pub driver_device: Option<PathBuf>,

    /// Kernel module loaded at startup.
    #[arg(long, global = true, value_name = "NAME")]
    pub driver_module: Option<String>,

    /// Lowest address accessed through the `/dev/mem` mapping.
    #[arg(long, global = true, value_name = "ADDR", value_parser = parse_number)]
    pub ram_high: Option<u32>,

    /// Fail if the kernel module cannot be loaded.
    #[arg(long, global = true)]
    pub require_driver: bool,

    /// Run against an in-memory bus instead of hardware.
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// One register operation.
#[derive(Debug, Clone, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Read a byte of physical memory.
    Readb {
        #[arg(value_parser = parse_number)]
        addr: u32,
    },
    /// Read a word of physical memory.
    Readw {
        #[arg(value_parser = parse_number)]
        addr: u32,
    },
    /// Read a long word of physical memory.
    Readlw {
        #[arg(value_parser = parse_number)]
        addr: u32,
    },
    /// Write a byte of physical memory.
    Writeb {
        #[arg(value_parser = parse_number)]
        addr: u32,
        #[arg(value_parser = parse_number)]
        value: u32,
    },
    /// Write a word of physical memory.
    Writew {
        #[arg(value_parser = parse_number)]
        addr: u32,
        #[arg(value_parser = parse_number)]
        value: u32,
    },
    /// Write a long word of physical memory.
    Writelw {
        #[arg(value_parser = parse_number)]
        addr: u32,
        #[arg(value_parser = parse_number)]
        value: u32,
    },
    /// Read a byte from an I/O port.
    Inb {
        #[arg(value_parser = parse_number)]
        port: u32,
    },
    /// Read a word from an I/O port.
    Inw {
        #[arg(value_parser = parse_number)]
        port: u32,
    },
    /// Read a long word from an I/O port.
    Inlw {
        #[arg(value_parser = parse_number)]
        port: u32,
    },
    /// Write a byte to an I/O port.
    Outb {
        #[arg(value_parser = parse_number)]
        port: u32,
        #[arg(value_parser = parse_number)]
        value: u32,
    },
    /// Write a word to an I/O port.
    Outw {
        #[arg(value_parser = parse_number)]
        port: u32,
        #[arg(value_parser = parse_number)]
        value: u32,
    },
    /// Write a long word to an I/O port.
    Outlw {
        #[arg(value_parser = parse_number)]
        port: u32,
        #[arg(value_parser = parse_number)]
        value: u32,
    },
    /// Allocate a DMA page and print its physical address.
    AllocDma,
    /// Print consecutive long words starting at an address.
    Dump {
        #[arg(value_parser = parse_number)]
        addr: u32,
        /// Number of long words.
        #[arg(default_value = "16", value_parser = parse_number)]
        words: u32,
    },
}

impl Cli {
    /// Apply the flags on top of an environment-derived configuration.
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(path) = &self.dev_mem {
            config.dev_mem.clone_from(path);
        }
        if let Some(path) = &self.driver_device {
            config.driver_device.clone_from(path);
        }
        if let Some(module) = &self.driver_module {
            config.driver_module.clone_from(module);
        }
        if let Some(ram_high) = self.ram_high {
            config.ram_high = PhysAddr::new(ram_high);
        }
        if self.require_driver {
            config.driver_policy = DriverPolicy::Required;
        }
        config
    }
}

/// Parse a decimal or `0x` hex number.
pub fn parse_number(text: &str) -> Result<u32, String> {
    parse_u32(text).ok_or_else(|| format!("not a 32-bit number: {text:?}"))
}

fn narrow<T: TryFrom<u32>>(value: u32, width: Width) -> Result<T> {
    T::try_from(value).map_err(|_| {
        anyhow!(
            "{value:#x} does not fit in a {width} (max {:#x})",
            width.max_value()
        )
    })
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Readb { addr } => write!(f, "readb {addr:#x}"),
            Self::Readw { addr } => write!(f, "readw {addr:#x}"),
            Self::Readlw { addr } => write!(f, "readlw {addr:#x}"),
            Self::Writeb { addr, value } => write!(f, "writeb {addr:#x} {value:#x}"),
            Self::Writew { addr, value } => write!(f, "writew {addr:#x} {value:#x}"),
            Self::Writelw { addr, value } => write!(f, "writelw {addr:#x} {value:#x}"),
            Self::Inb { port } => write!(f, "inb {port:#x}"),
            Self::Inw { port } => write!(f, "inw {port:#x}"),
            Self::Inlw { port } => write!(f, "inlw {port:#x}"),
            Self::Outb { port, value } => write!(f, "outb {port:#x} {value:#x}"),
            Self::Outw { port, value } => write!(f, "outw {port:#x} {value:#x}"),
            Self::Outlw { port, value } => write!(f, "outlw {port:#x} {value:#x}"),
            Self::AllocDma => write!(f, "alloc-dma"),
            Self::Dump { addr, words } => write!(f, "dump {addr:#x} {words}"),
        }
    }
}

/// Run one command, writing results to `out`.
///
/// Errors carry the command line form of the operation as context.
pub fn execute<B: RawBus, W: Write>(
    regs: &mut Registers<B>,
    command: &Command,
    out: &mut W,
) -> Result<()> {
    dispatch(regs, command, out).with_context(|| command.to_string())
}

fn dispatch<B: RawBus, W: Write>(
    regs: &mut Registers<B>,
    command: &Command,
    out: &mut W,
) -> Result<()> {
    let mem = PhysAddr::new;
    let port = PortAddr::new;
    match *command {
        Command::Readb { addr } => writeln!(out, "{:#x}", regs.readb(mem(addr))?)?,
        Command::Readw { addr } => writeln!(out, "{:#x}", regs.readw(mem(addr))?)?,
        Command::Readlw { addr } => writeln!(out, "{:#x}", regs.readlw(mem(addr))?)?,
        Command::Writeb { addr, value } => regs.writeb(mem(addr), narrow(value, Width::Byte)?)?,
        Command::Writew { addr, value } => regs.writew(mem(addr), narrow(value, Width::Word)?)?,
        Command::Writelw { addr, value } => regs.writelw(mem(addr), value)?,
        Command::Inb { port: p } => writeln!(out, "{:#x}", regs.inb(port(p))?)?,
        Command::Inw { port: p } => writeln!(out, "{:#x}", regs.inw(port(p))?)?,
        Command::Inlw { port: p } => writeln!(out, "{:#x}", regs.inlw(port(p))?)?,
        Command::Outb { port: p, value } => regs.outb(port(p), narrow(value, Width::Byte)?)?,
        Command::Outw { port: p, value } => regs.outw(port(p), narrow(value, Width::Word)?)?,
        Command::Outlw { port: p, value } => regs.outlw(port(p), value)?,
        Command::AllocDma => writeln!(out, "{}", regs.alloc_dma_page()?)?,
        Command::Dump { addr, words } => regs.dump(mem(addr), words, out)?,
    }
    Ok(())
}

/// Print a dry run's bus calls, one per line.
pub fn report_calls<W: Write>(calls: &[BusCall], out: &mut W) -> Result<()> {
    for call in calls {
        writeln!(out, "{call}")?;
    }
    Ok(())
}
