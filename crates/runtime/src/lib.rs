// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # policy-runtime
//!
//! A real-time driver for single-input, single-output ONNX policies.
//!
//! The driver has two halves:
//! - the **Session Manager** ([`PolicyDriver::load`]), which may allocate and
//!   may fail: it reads the model, validates its declared signature through
//!   `model-ir`, prepares the engine and sizes the staging buffers;
//! - the **Inference Executor** ([`PolicyDriver::run_into`]), called once per
//!   control tick: it copies the observation in, runs the engine and copies
//!   the action out, reporting every failure as `false`.
//!
//! # Engine
//! Models run on `tract`, a pure-Rust ONNX engine. The ONNX framework handle
//! is shared process-wide through [`EngineEnvironment`].
//!
//! # Logging
//! The crate emits `tracing` events and never installs a subscriber.

mod config;
mod driver;
mod env;
mod error;
mod executor;
pub mod golden;
mod metrics;
mod session;

pub use config::{DriverConfig, OptimizationLevel};
pub use driver::PolicyDriver;
pub use env::{EngineEnvironment, ENVIRONMENT_NAME};
pub use error::{DriverError, RunError};
pub use metrics::RunMetrics;
