// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and shared helpers.

pub mod golden;
pub mod inspect;
pub mod stress;
pub mod synth;

use policy_runtime::{DriverConfig, OptimizationLevel, PolicyDriver};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level follows the `-v` count.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolves the driver configuration from an optional file and overrides.
pub fn driver_config(
    path: Option<&Path>,
    level: Option<OptimizationLevel>,
) -> anyhow::Result<DriverConfig> {
    let mut config = match path {
        Some(p) => DriverConfig::from_file(p)?,
        None => DriverConfig::default(),
    };
    if let Some(level) = level {
        config.optimization_level = level;
    }
    tracing::debug!("driver config: {config:?}");
    Ok(config)
}

/// Loads a policy or fails with the driver's diagnostic.
pub fn load_driver(model: &Path, config: &DriverConfig) -> anyhow::Result<PolicyDriver> {
    let mut driver = PolicyDriver::new();
    driver
        .try_load(model, config)
        .map_err(|e| anyhow::anyhow!("failed to load policy from '{}': {e}", model.display()))?;
    Ok(driver)
}

/// Prints the boxed command banner.
pub fn banner(title: &str) {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║{:^54}║", format!("policy-rt · {title}"));
    println!("╚══════════════════════════════════════════════════════╝");
    println!();
}
