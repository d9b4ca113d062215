// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `policy-rt golden` command: one run compared against reference files.

use policy_runtime::golden::{max_abs_diff, read_f32_file};
use policy_runtime::DriverConfig;
use std::path::PathBuf;

pub fn execute(
    config: &DriverConfig,
    model: PathBuf,
    obs: PathBuf,
    action: PathBuf,
    tolerance: f32,
) -> anyhow::Result<()> {
    super::banner("Golden Check");

    let mut driver = super::load_driver(&model, config)?;
    let observation = read_f32_file(&obs)?;
    let golden = read_f32_file(&action)?;

    println!("  Model:  {}", model.display());
    println!("  Obs:    {} ({} values)", obs.display(), observation.len());
    println!("  Action: {} ({} values)", action.display(), golden.len());
    println!();

    if observation.len() as i64 != driver.input_dim() {
        anyhow::bail!(
            "observation file has {} values, policy expects {}",
            observation.len(),
            driver.input_dim()
        );
    }
    if golden.len() as i64 != driver.output_dim() {
        anyhow::bail!(
            "action file has {} values, policy produces {}",
            golden.len(),
            driver.output_dim()
        );
    }

    let mut actual = vec![0.0f32; golden.len()];
    driver
        .try_run(&observation, &mut actual)
        .map_err(|e| anyhow::anyhow!("inference failed: {e}"))?;

    let diff = max_abs_diff(&actual, &golden);
    println!("  max_abs_diff = {diff:e} (tolerance {tolerance:e})");

    if diff.is_nan() || diff > tolerance {
        anyhow::bail!("output differs from golden action by {diff:e}");
    }
    println!("  ✓ Output matches golden action.");
    Ok(())
}
