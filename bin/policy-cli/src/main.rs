// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # policy-rt
//!
//! Command-line interface for the policy runtime.
//!
//! ## Usage
//! ```bash
//! # Generate a 45 -> 13 linear policy with golden files
//! policy-rt synth --out ./artifacts --input 45 --output 13
//!
//! # Check the dimension contract
//! policy-rt inspect --model ./artifacts/policy.onnx --expect-input 45 --expect-output 13
//!
//! # Compare one run against golden files
//! policy-rt golden --model ./artifacts/policy.onnx \
//!     --obs ./artifacts/golden_obs.bin --action ./artifacts/golden_action.bin
//!
//! # 200k consecutive runs
//! policy-rt stress --model ./artifacts/policy.onnx
//! ```

mod commands;

use clap::{Parser, Subcommand};
use policy_runtime::OptimizationLevel;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "policy-rt",
    about = "Real-time ONNX policy driver tools",
    version,
    author
)]
struct Cli {
    /// Path to a TOML driver configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the graph optimisation level: disabled, basic, full.
    #[arg(long, global = true)]
    level: Option<OptimizationLevel>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a policy and print its signature.
    Inspect {
        /// Path to the ONNX model.
        #[arg(short, long)]
        model: PathBuf,

        /// Fail unless the observation length equals this.
        #[arg(long)]
        expect_input: Option<i64>,

        /// Fail unless the action length equals this.
        #[arg(long)]
        expect_output: Option<i64>,

        /// Print the declared signature as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Run one observation and compare the action against a golden file.
    Golden {
        /// Path to the ONNX model.
        #[arg(short, long)]
        model: PathBuf,

        /// Raw little-endian f32 observation.
        #[arg(long)]
        obs: PathBuf,

        /// Raw little-endian f32 expected action.
        #[arg(long)]
        action: PathBuf,

        /// Maximum allowed absolute difference.
        #[arg(long, default_value_t = policy_runtime::golden::DEFAULT_TOLERANCE)]
        tolerance: f32,
    },

    /// Run many random observations and report latency and memory growth.
    Stress {
        /// Path to the ONNX model.
        #[arg(short, long)]
        model: PathBuf,

        /// Number of consecutive runs.
        #[arg(long, default_value_t = 200_000)]
        iters: usize,

        /// Seed for the observation generator.
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },

    /// Write a synthetic linear policy with golden observation/action files.
    Synth {
        /// Output directory (created if missing).
        #[arg(short, long)]
        out: PathBuf,

        /// Observation length.
        #[arg(long, default_value_t = 45)]
        input: usize,

        /// Action length.
        #[arg(long, default_value_t = 13)]
        output: usize,

        /// Seed for the golden observation.
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging based on verbosity.
    commands::init_tracing(cli.verbose);

    let config = commands::driver_config(cli.config.as_deref(), cli.level)?;

    match cli.command {
        Commands::Inspect {
            model,
            expect_input,
            expect_output,
            json,
        } => commands::inspect::execute(&config, model, expect_input, expect_output, json),
        Commands::Golden {
            model,
            obs,
            action,
            tolerance,
        } => commands::golden::execute(&config, model, obs, action, tolerance),
        Commands::Stress { model, iters, seed } => {
            commands::stress::execute(&config, model, iters, seed)
        }
        Commands::Synth {
            out,
            input,
            output,
            seed,
        } => commands::synth::execute(out, input, output, seed),
    }
}
