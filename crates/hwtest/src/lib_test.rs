// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for crate-level entry points and errors.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::error::Error as _;
use std::io;

use crate::{Error, PhysAddr, Width, open_mock};

#[test]
fn mock_registers_start_empty() {
    let mut regs = open_mock();
    assert_eq!(regs.readlw(PhysAddr::new(0x1000)).unwrap(), 0);
    assert_eq!(regs.bus().calls().len(), 1);
}

#[test]
fn error_messages() {
    assert_eq!(
        Error::NotPrivileged.to_string(),
        "you must be root to access hardware registers"
    );
    assert_eq!(
        Error::MissingBase.to_string(),
        "you must specify a base address for the region"
    );
    assert_eq!(
        Error::Misaligned {
            addr: PhysAddr::new(0x1002),
            width: Width::Long,
        }
        .to_string(),
        "long word access at 0x00001002 is not naturally aligned"
    );
    assert_eq!(
        Error::Config {
            key: "HWTEST_RAM_HIGH",
            value: String::from("x"),
        }
        .to_string(),
        "invalid value for HWTEST_RAM_HIGH: \"x\""
    );
}

#[test]
fn io_error_keeps_path_and_source() {
    let err = Error::io("/dev/khwtest", io::Error::from(io::ErrorKind::NotFound));
    assert!(err.to_string().starts_with("/dev/khwtest: "));
    assert!(err.source().is_some());
    assert!(Error::MissingBase.source().is_none());
}

/// Host with a fixed privilege answer that accepts any driver.
#[cfg(target_os = "linux")]
struct FixedHost {
    privileged: bool,
}

#[cfg(target_os = "linux")]
impl crate::Host for FixedHost {
    fn is_privileged(&self) -> bool {
        self.privileged
    }

    fn load_driver(&self, _module: &str) -> crate::Result<()> {
        Ok(())
    }
}

#[cfg(target_os = "linux")]
fn unreachable_devices() -> crate::Config {
    let dir = std::env::temp_dir().join("hwtest-no-such-dir");
    crate::Config {
        dev_mem: dir.join("mem"),
        driver_device: dir.join("khwtest"),
        ..crate::Config::default()
    }
}

#[cfg(target_os = "linux")]
#[test]
fn open_with_checks_privilege_before_opening_devices() {
    let host = FixedHost { privileged: false };
    let result = crate::open_with(&host, &unreachable_devices());
    assert!(matches!(result, Err(Error::NotPrivileged)));
}

#[cfg(target_os = "linux")]
#[test]
fn open_with_opens_dev_mem_after_the_gate() {
    let host = FixedHost { privileged: true };
    let config = unreachable_devices();
    match crate::open_with(&host, &config) {
        Err(Error::Io { path, .. }) => assert_eq!(path, config.dev_mem),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("opened a missing device"),
    }
}
