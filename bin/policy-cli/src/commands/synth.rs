// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `policy-rt synth` command: generate a linear policy and golden files.
//!
//! Writes `policy.onnx`, `golden_obs.bin` and `golden_action.bin`; the
//! action is computed on the host, independently of the engine.

use model_ir::SyntheticPolicy;
use policy_runtime::golden::write_f32_file;
use std::path::PathBuf;

pub fn execute(out: PathBuf, input: usize, output: usize, seed: u64) -> anyhow::Result<()> {
    if input == 0 || output == 0 {
        anyhow::bail!("input and output dimensions must be positive");
    }
    super::banner("Synthetic Policy");

    std::fs::create_dir_all(&out)?;
    let policy = SyntheticPolicy::linear(input, output);
    let model = out.join("policy.onnx");
    let obs_path = out.join("golden_obs.bin");
    let action_path = out.join("golden_action.bin");

    policy.write_to(&model)?;
    let obs = policy.sample_observation(seed);
    write_f32_file(&obs_path, &obs)?;
    write_f32_file(&action_path, &policy.evaluate(&obs))?;

    tracing::info!("wrote {input} -> {output} policy to '{}'", out.display());
    println!("  Model:  {}", model.display());
    println!("  Obs:    {} ({input} values)", obs_path.display());
    println!("  Action: {} ({output} values)", action_path.display());
    Ok(())
}
