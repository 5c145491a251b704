// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for configuration.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::path::PathBuf;

use hwtest_abi::PhysAddr;

use super::{Config, DriverPolicy, env, parse_flag, parse_u32};
use crate::Error;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_match_driver_abi() {
    let config = Config::default();
    assert_eq!(config.dev_mem, PathBuf::from("/dev/mem"));
    assert_eq!(config.driver_device, PathBuf::from("/dev/khwtest"));
    assert_eq!(config.driver_module, "khwtest");
    assert_eq!(config.ram_high, PhysAddr::new(0x2000_0000));
    assert_eq!(config.driver_policy, DriverPolicy::Optional);
}

#[test]
fn empty_environment_gives_defaults() {
    let config = Config::from_lookup(|_| None).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn environment_overrides_every_setting() {
    let config = Config::from_lookup(lookup_from(&[
        (env::DEV_MEM, "/tmp/mem"),
        (env::DRIVER_DEVICE, "/tmp/khwtest"),
        (env::DRIVER_MODULE, "khwtest_dbg"),
        (env::RAM_HIGH, "0x4000_0000"),
        (env::REQUIRE_DRIVER, "yes"),
    ]))
    .unwrap();
    assert_eq!(config.dev_mem, PathBuf::from("/tmp/mem"));
    assert_eq!(config.driver_device, PathBuf::from("/tmp/khwtest"));
    assert_eq!(config.driver_module, "khwtest_dbg");
    assert_eq!(config.ram_high, PhysAddr::new(0x4000_0000));
    assert_eq!(config.driver_policy, DriverPolicy::Required);
}

#[test]
fn malformed_ram_high_is_rejected() {
    let err = Config::from_lookup(lookup_from(&[(env::RAM_HIGH, "lots")])).unwrap_err();
    assert!(matches!(err, Error::Config { key, .. } if key == env::RAM_HIGH));
}

#[test]
fn malformed_flag_is_rejected() {
    let err = Config::from_lookup(lookup_from(&[(env::REQUIRE_DRIVER, "maybe")])).unwrap_err();
    assert!(matches!(err, Error::Config { key, .. } if key == env::REQUIRE_DRIVER));
}

#[test]
fn numbers_accept_hex_and_decimal() {
    assert_eq!(parse_u32("0x10"), Some(16));
    assert_eq!(parse_u32("0XFF"), Some(255));
    assert_eq!(parse_u32("4096"), Some(4096));
    assert_eq!(parse_u32(" 0xffff_ffff "), Some(u32::MAX));
}

#[test]
fn numbers_outside_32_bits_are_rejected() {
    assert_eq!(parse_u32("0x1_0000_0000"), None);
    assert_eq!(parse_u32("-1"), None);
    assert_eq!(parse_u32(""), None);
    assert_eq!(parse_u32("0x"), None);
}

#[test]
fn flags() {
    assert_eq!(parse_flag("TRUE"), Some(true));
    assert_eq!(parse_flag("0"), Some(false));
    assert_eq!(parse_flag("perhaps"), None);
}
