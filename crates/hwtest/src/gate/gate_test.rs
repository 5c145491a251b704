// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for the process gate.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::cell::RefCell;

use super::{GateReport, Host, check};
use crate::config::{Config, DriverPolicy};
use crate::{Error, Result};

struct FakeHost {
    privileged: bool,
    driver_ok: bool,
    loads: RefCell<Vec<String>>,
}

impl FakeHost {
    fn new(privileged: bool, driver_ok: bool) -> Self {
        Self {
            privileged,
            driver_ok,
            loads: RefCell::new(Vec::new()),
        }
    }
}

impl Host for FakeHost {
    fn is_privileged(&self) -> bool {
        self.privileged
    }

    fn load_driver(&self, module: &str) -> Result<()> {
        self.loads.borrow_mut().push(module.to_owned());
        if self.driver_ok {
            Ok(())
        } else {
            Err(Error::DriverLoad {
                module: module.to_owned(),
                reason: String::from("not found"),
            })
        }
    }
}

fn config(policy: DriverPolicy) -> Config {
    Config {
        driver_policy: policy,
        ..Config::default()
    }
}

#[test]
fn unprivileged_process_is_rejected_before_loading() {
    let host = FakeHost::new(false, true);
    let err = check(&host, &config(DriverPolicy::Optional)).unwrap_err();
    assert!(matches!(err, Error::NotPrivileged));
    assert!(host.loads.borrow().is_empty());
}

#[test]
fn loaded_driver_is_reported() {
    let host = FakeHost::new(true, true);
    let report = check(&host, &config(DriverPolicy::Required)).unwrap();
    assert_eq!(report, GateReport { driver_loaded: true });
    assert_eq!(host.loads.borrow().as_slice(), ["khwtest"]);
}

#[test]
fn optional_driver_failure_is_a_warning() {
    let host = FakeHost::new(true, false);
    let report = check(&host, &config(DriverPolicy::Optional)).unwrap();
    assert!(!report.driver_loaded);
}

#[test]
fn required_driver_failure_is_fatal() {
    let host = FakeHost::new(true, false);
    let err = check(&host, &config(DriverPolicy::Required)).unwrap_err();
    assert!(matches!(err, Error::DriverLoad { ref module, .. } if module == "khwtest"));
}

#[test]
fn configured_module_name_is_used() {
    let host = FakeHost::new(true, true);
    let cfg = Config {
        driver_module: String::from("khwtest_dbg"),
        ..Config::default()
    };
    check(&host, &cfg).unwrap();
    assert_eq!(host.loads.borrow().as_slice(), ["khwtest_dbg"]);
}
