// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Runtime configuration.
//!
//! Defaults come from the driver ABI. Each setting can be overridden from
//! the environment:
//!
//! | Variable | Setting | Default |
//! |---|---|---|
//! | `HWTEST_DEV_MEM` | physical memory device | `/dev/mem` |
//! | `HWTEST_DRIVER_DEVICE` | driver character device | `/dev/khwtest` |
//! | `HWTEST_DRIVER_MODULE` | module passed to `modprobe` | `khwtest` |
//! | `HWTEST_RAM_HIGH` | RAM/device memory boundary | `0x20000000` |
//! | `HWTEST_REQUIRE_DRIVER` | driver load failure is fatal | `false` |

#[cfg(test)]
mod config_test;

use std::path::PathBuf;

use hwtest_abi::PhysAddr;
use hwtest_abi::driver::{DEFAULT_RAM_HIGH, DEV_MEM_PATH, KHWTEST_DEVICE_PATH, KHWTEST_MODULE};

use crate::{Error, Result};

/// Environment variable names.
pub mod env {
    /// Physical memory device.
    pub const DEV_MEM: &str = "HWTEST_DEV_MEM";
    /// Driver character device.
    pub const DRIVER_DEVICE: &str = "HWTEST_DRIVER_DEVICE";
    /// Driver module name.
    pub const DRIVER_MODULE: &str = "HWTEST_DRIVER_MODULE";
    /// RAM/device memory boundary.
    pub const RAM_HIGH: &str = "HWTEST_RAM_HIGH";
    /// Whether a driver load failure is fatal.
    pub const REQUIRE_DRIVER: &str = "HWTEST_REQUIRE_DRIVER";
}

/// What to do when the driver cannot be activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverPolicy {
    /// Fail initialization.
    Required,
    /// Log a warning and continue; DMA allocation and RAM access will fail
    /// later if the driver really is missing.
    #[default]
    Optional,
}

impl DriverPolicy {
    /// Policy for a "driver required" flag.
    #[must_use]
    pub const fn from_required(required: bool) -> Self {
        if required {
            Self::Required
        } else {
            Self::Optional
        }
    }
}

/// Settings for opening the hardware bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Physical memory device.
    pub dev_mem: PathBuf,
    /// Driver character device.
    pub driver_device: PathBuf,
    /// Driver module name.
    pub driver_module: String,
    /// Addresses at or above this are device memory.
    pub ram_high: PhysAddr,
    /// Handling of driver activation failure.
    pub driver_policy: DriverPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dev_mem: PathBuf::from(DEV_MEM_PATH),
            driver_device: PathBuf::from(KHWTEST_DEVICE_PATH),
            driver_module: String::from(KHWTEST_MODULE),
            ram_high: PhysAddr::new(DEFAULT_RAM_HIGH),
            driver_policy: DriverPolicy::default(),
        }
    }
}

impl Config {
    /// Defaults overridden by the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a variable holds a malformed value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a variable holds a malformed value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(path) = lookup(env::DEV_MEM) {
            config.dev_mem = PathBuf::from(path);
        }
        if let Some(path) = lookup(env::DRIVER_DEVICE) {
            config.driver_device = PathBuf::from(path);
        }
        if let Some(module) = lookup(env::DRIVER_MODULE) {
            config.driver_module = module;
        }
        if let Some(text) = lookup(env::RAM_HIGH) {
            let value = parse_u32(&text).ok_or(Error::Config {
                key: env::RAM_HIGH,
                value: text,
            })?;
            config.ram_high = PhysAddr::new(value);
        }
        if let Some(text) = lookup(env::REQUIRE_DRIVER) {
            let required = parse_flag(&text).ok_or(Error::Config {
                key: env::REQUIRE_DRIVER,
                value: text,
            })?;
            config.driver_policy = DriverPolicy::from_required(required);
        }
        Ok(config)
    }
}

/// Parse a register number: `0x`-prefixed hex or decimal, at most 32 bits.
///
/// Underscores are accepted as digit separators.
#[must_use]
pub fn parse_u32(text: &str) -> Option<u32> {
    let trimmed = text.trim();
    let cleaned: String = trimmed.chars().filter(|c| *c != '_').collect();
    if cleaned.is_empty() {
        return None;
    }
    match cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => cleaned.parse().ok(),
    }
}

/// Parse a boolean flag value.
#[must_use]
pub fn parse_flag(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
