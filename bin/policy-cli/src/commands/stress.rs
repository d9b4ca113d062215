// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `policy-rt stress` command: many consecutive runs on random observations.
//!
//! The first three observation entries look like a velocity command
//! (`[-1, 1]`, `[-0.5, 0.5]`, `[-1, 1]`); the rest are small noise in
//! `0.1 · [-1, 1]`. The run stops at the first failure.

use policy_runtime::DriverConfig;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::path::PathBuf;
use std::time::Instant;

/// Fills `obs` with the next random observation.
fn fill_observation(rng: &mut StdRng, obs: &mut [f32]) {
    for (i, slot) in obs.iter_mut().enumerate() {
        *slot = match i {
            0 | 2 => rng.gen_range(-1.0f32..1.0),
            1 => rng.gen_range(-0.5f32..0.5),
            _ => 0.1 * rng.gen_range(-1.0f32..1.0),
        };
    }
}

pub fn execute(config: &DriverConfig, model: PathBuf, iters: usize, seed: u64) -> anyhow::Result<()> {
    super::banner("Stress Test");

    let mut driver = super::load_driver(&model, config)?;
    let mut obs = vec![0.0f32; driver.input_dim() as usize];
    let mut act = vec![0.0f32; driver.output_dim() as usize];
    let mut rng = StdRng::seed_from_u64(seed);

    println!("  Model:  {}", model.display());
    println!("  Policy: {} -> {}", driver.input_dim(), driver.output_dim());
    println!("  Runs:   {iters} (seed {seed})");
    println!();

    let before = resource_monitor::sample();
    let start = Instant::now();

    for i in 0..iters {
        fill_observation(&mut rng, &mut obs);
        if let Err(e) = driver.try_run(&obs, &mut act) {
            anyhow::bail!("run {i} failed: {e}");
        }
    }

    let elapsed = start.elapsed();
    let after = resource_monitor::sample();

    let total_ms = elapsed.as_secs_f64() * 1e3;
    let avg_us = if iters > 0 {
        elapsed.as_secs_f64() * 1e6 / iters as f64
    } else {
        0.0
    };
    println!("  Total:  {total_ms:.2} ms");
    println!("  Avg:    {avg_us:.3} µs/run");
    println!("  {}", driver.metrics().summary());

    match (before, after) {
        (Some(before), Some(after)) => {
            println!("  {}", after.summary());
            println!("  RSS growth: {} kB", after.growth_since(&before) / 1024);
        }
        _ => println!("  Memory: unavailable on this platform"),
    }
    println!();
    println!("  ✓ All {iters} runs succeeded.");
    Ok(())
}
