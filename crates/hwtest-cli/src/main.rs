// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! `hwtest` command line tool.
//!
//! Runs a single register operation per invocation. With `--dry-run` the
//! operation goes to an in-memory bus and the resulting bus calls are
//! printed to stderr, which is useful for checking what a command would do.

mod cli;


use std::io;

use anyhow::Result;
use clap::Parser as _;
use hwtest::Config;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, execute, report_calls};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "HWTEST_LOG";

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config = cli.apply(Config::from_env()?);
    tracing::debug!(?config, "configuration");

    let mut out = io::stdout().lock();
    if cli.dry_run {
        let mut regs = hwtest::open_mock();
        execute(&mut regs, &cli.command, &mut out)?;
        return report_calls(regs.bus().calls(), &mut io::stderr().lock());
    }
    run_hardware(&config, &cli, &mut out)
}

#[cfg(target_os = "linux")]
fn run_hardware(config: &Config, cli: &Cli, out: &mut impl io::Write) -> Result<()> {
    let mut regs = hwtest::open(config)?;
    execute(&mut regs, &cli.command, out)
}

#[cfg(not(target_os = "linux"))]
fn run_hardware(_config: &Config, _cli: &Cli, _out: &mut impl io::Write) -> Result<()> {
    anyhow::bail!("hardware access is only supported on Linux; use --dry-run")
}
