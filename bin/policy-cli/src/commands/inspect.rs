// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `policy-rt inspect` command: load a policy and check its dimensions.
//!
//! Prints the bound input/output names and feature dimensions, and fails
//! when they differ from the expected observation/action lengths.

use model_ir::ModelLoader;
use policy_runtime::{DriverConfig, EngineEnvironment};
use std::path::PathBuf;

pub fn execute(
    config: &DriverConfig,
    model: PathBuf,
    expect_input: Option<i64>,
    expect_output: Option<i64>,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        let signature = EngineEnvironment::global()
            .with_framework(|onnx| ModelLoader::read_signature(onnx, &model))?;
        println!("{}", serde_json::to_string_pretty(&signature)?);
        return Ok(());
    }

    super::banner("Policy Inspector");

    let driver = super::load_driver(&model, config)?;
    let session = driver
        .config()
        .ok_or_else(|| anyhow::anyhow!("driver reports loaded without a session"))?;

    println!("  Model:  {}", model.display());
    println!("  Input:  {:<24} dim {}", driver.input_name(), driver.input_dim());
    println!("  Output: {:<24} dim {}", driver.output_name(), driver.output_dim());
    println!();
    println!("  Session:");
    println!("   Optimization:     {}", session.optimization_level);
    println!("   Memory arena:     {}", session.use_memory_arena);
    println!("   Intra-op threads: {}", session.intra_op_threads);
    println!("   Inter-op threads: {}", session.inter_op_threads);
    println!();

    let mut mismatches = Vec::new();
    if let Some(expected) = expect_input {
        if driver.input_dim() != expected {
            mismatches.push(format!("input dim {} != expected {expected}", driver.input_dim()));
        }
    }
    if let Some(expected) = expect_output {
        if driver.output_dim() != expected {
            mismatches.push(format!("output dim {} != expected {expected}", driver.output_dim()));
        }
    }

    if !mismatches.is_empty() {
        anyhow::bail!("dimension contract violated: {}", mismatches.join(", "));
    }
    if expect_input.is_some() || expect_output.is_some() {
        println!("  ✓ Dimension contract holds.");
    }
    Ok(())
}
