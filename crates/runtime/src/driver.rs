// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The policy driver.
//!
//! ```text
//! PolicyDriver { inner: None }
//!     │  .load(path, &config)   ── fails ──► inner: None, last_error set
//!     ▼
//! PolicyDriver { inner: Some(LoadedPolicy) }
//!     │  .run_into(&obs, &mut act)   (repeat)
//!     ▼
//!   action written, metrics updated
//! ```
//!
//! All loaded state lives in one `LoadedPolicy`, built completely before it
//! is installed. A driver is therefore either fully loaded or unloaded.

use crate::executor::Executor;
use crate::metrics::RunMetrics;
use crate::session::Session;
use crate::{DriverConfig, DriverError, EngineEnvironment, RunError};
use model_ir::ModelLoader;
use std::path::Path;
use std::time::Instant;

/// Everything that exists only while a policy is loaded.
struct LoadedPolicy {
    config: DriverConfig,
    input_name: String,
    output_name: String,
    input_dim: usize,
    output_dim: usize,
    executor: Executor,
}

/// Loads an ONNX policy and evaluates it, one observation at a time.
///
/// The driver owns its engine session and staging buffers exclusively. It
/// must stay on the thread that loaded it; use one driver per thread for
/// concurrent inference.
///
/// # Allocation
/// The driver's own buffers are sized at load and never reallocated. The
/// engine does not offer caller-provided output storage, so each run still
/// allocates the intermediate and output tensors of the plan. That set is
/// fixed by the model: every call allocates the same amount and frees it
/// before returning, and memory stays flat over any number of runs.
/// Enabling `use_memory_arena` reuses the per-node value slots between runs.
///
/// # Example
/// ```no_run
/// use policy_runtime::{DriverConfig, PolicyDriver};
/// use std::path::Path;
///
/// let mut driver = PolicyDriver::new();
/// if !driver.load(Path::new("policy.onnx"), &DriverConfig::default()) {
///     eprintln!("load failed: {}", driver.last_error().unwrap_or_default());
///     return;
/// }
/// let obs = vec![0.0f32; driver.input_dim() as usize];
/// let mut act = vec![0.0f32; driver.output_dim() as usize];
/// assert!(driver.run_into(&obs, &mut act));
/// ```
#[derive(Default)]
pub struct PolicyDriver {
    inner: Option<Box<LoadedPolicy>>,
    metrics: RunMetrics,
    last_error: Option<String>,
}

impl PolicyDriver {
    /// Creates an unloaded driver.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Session Manager ────────────────────────────────────────────

    /// Loads a policy, replacing any loaded one.
    ///
    /// Returns `false` on any failure; the driver is then unloaded and
    /// [`last_error`](Self::last_error) describes the cause.
    pub fn load(&mut self, model_path: &Path, config: &DriverConfig) -> bool {
        self.try_load(model_path, config).is_ok()
    }

    /// Loads a policy, replacing any loaded one, and reports why it failed.
    ///
    /// Steps:
    /// 1. Drop the current session, reset metrics.
    /// 2. Read and validate the model's declared signature.
    /// 3. Prepare the engine session with the requested settings.
    /// 4. Allocate staging buffers and install the new session.
    pub fn try_load(&mut self, model_path: &Path, config: &DriverConfig) -> Result<(), DriverError> {
        self.inner = None;
        self.metrics = RunMetrics::default();
        self.last_error = None;

        match Self::build(model_path, config) {
            Ok(loaded) => {
                tracing::info!(
                    "loaded policy '{}': {} [{}] -> {} [{}], optimization '{}', arena {}",
                    model_path.display(),
                    loaded.input_name,
                    loaded.input_dim,
                    loaded.output_name,
                    loaded.output_dim,
                    loaded.config.optimization_level,
                    loaded.config.use_memory_arena,
                );
                self.inner = Some(Box::new(loaded));
                Ok(())
            }
            Err(e) => {
                tracing::warn!("failed to load policy '{}': {e}", model_path.display());
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn build(model_path: &Path, config: &DriverConfig) -> Result<LoadedPolicy, DriverError> {
        let config = config.normalized();
        let loaded = EngineEnvironment::global()
            .with_framework(|onnx| ModelLoader::load(onnx, model_path))?;

        let signature = loaded.signature;
        let input_dim = signature.input_dim();
        let output_dim = signature.output_dim();

        let session = Session::prepare(loaded.model, input_dim, output_dim, &config)?;
        let executor = Executor::new(session, input_dim, output_dim)?;

        Ok(LoadedPolicy {
            input_name: signature.input().name.clone(),
            output_name: signature.output().name.clone(),
            input_dim,
            output_dim,
            config,
            executor,
        })
    }

    /// Drops the loaded session, if any.
    pub fn unload(&mut self) {
        self.inner = None;
    }

    // ── Accessors ──────────────────────────────────────────────────

    pub fn is_loaded(&self) -> bool {
        self.inner.is_some()
    }

    /// Observation length, or `-1` when unloaded.
    pub fn input_dim(&self) -> i64 {
        self.inner.as_ref().map_or(-1, |p| p.input_dim as i64)
    }

    /// Action length, or `-1` when unloaded.
    pub fn output_dim(&self) -> i64 {
        self.inner.as_ref().map_or(-1, |p| p.output_dim as i64)
    }

    /// Name of the bound input tensor, or `""` when unloaded.
    pub fn input_name(&self) -> &str {
        self.inner.as_ref().map_or("", |p| p.input_name.as_str())
    }

    /// Name of the bound output tensor, or `""` when unloaded.
    pub fn output_name(&self) -> &str {
        self.inner.as_ref().map_or("", |p| p.output_name.as_str())
    }

    /// Settings of the live session, thread counts clamped.
    pub fn config(&self) -> Option<&DriverConfig> {
        self.inner.as_ref().map(|p| &p.config)
    }

    /// Diagnostic of the most recent failed load.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Statistics for calls since the last load.
    pub fn metrics(&self) -> RunMetrics {
        self.metrics
    }

    pub fn reset_metrics(&mut self) {
        self.metrics = RunMetrics::default();
    }

    /// The observation and action held in the staging buffers.
    pub fn staged(&self) -> Option<(&[f32], &[f32])> {
        self.inner
            .as_ref()
            .map(|p| (p.executor.staged_input(), p.executor.staged_output()))
    }

    // ── Inference Executor ─────────────────────────────────────────

    /// Evaluates the policy on one observation.
    ///
    /// Returns `false`, without writing `action`, if no policy is loaded or
    /// either length is wrong. After an engine failure the contents of
    /// `action` are unspecified.
    pub fn run_into(&mut self, observation: &[f32], action: &mut [f32]) -> bool {
        match self.try_run(observation, action) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("policy run failed: {e}");
                false
            }
        }
    }

    /// Evaluates the policy on one observation and reports why it failed.
    pub fn try_run(&mut self, observation: &[f32], action: &mut [f32]) -> Result<(), RunError> {
        let result = self.run_checked(observation, action);
        if result.is_err() {
            self.metrics.record_failure();
        }
        result
    }

    fn run_checked(&mut self, observation: &[f32], action: &mut [f32]) -> Result<(), RunError> {
        let policy = self.inner.as_mut().ok_or(RunError::NotLoaded)?;
        if observation.len() != policy.input_dim {
            return Err(RunError::ObservationLength {
                expected: policy.input_dim,
                got: observation.len(),
            });
        }
        if action.len() != policy.output_dim {
            return Err(RunError::ActionLength {
                expected: policy.output_dim,
                got: action.len(),
            });
        }

        let start = Instant::now();
        policy.executor.run(observation, action)?;
        self.metrics.record_success(start.elapsed());
        Ok(())
    }

    /// Evaluates the policy, resizing `action` to the action length.
    ///
    /// Fails without touching `action` if no policy is loaded or the
    /// observation length is wrong. Allocates only when `action` grows.
    pub fn run_vec(&mut self, observation: &[f32], action: &mut Vec<f32>) -> bool {
        let Some(policy) = self.inner.as_ref() else {
            self.metrics.record_failure();
            return false;
        };
        if observation.len() != policy.input_dim {
            self.metrics.record_failure();
            return false;
        }
        action.resize(policy.output_dim, 0.0);
        self.run_into(observation, action)
    }

    /// Evaluates the policy on raw buffers.
    ///
    /// Returns `false` if either pointer is null, in addition to every
    /// failure of [`run_into`](Self::run_into).
    ///
    /// # Safety
    /// A non-null `observation` must be valid for `observation_len` reads
    /// and a non-null `action` for `action_len` writes, both of properly
    /// aligned `f32`, and the two regions must not overlap.
    pub unsafe fn run_raw(
        &mut self,
        observation: *const f32,
        observation_len: usize,
        action: *mut f32,
        action_len: usize,
    ) -> bool {
        if observation.is_null() || action.is_null() {
            self.metrics.record_failure();
            tracing::debug!("policy run failed: {}", RunError::NullBuffer);
            return false;
        }
        // SAFETY: non-null, and valid for the given lengths per the contract above.
        let observation = std::slice::from_raw_parts(observation, observation_len);
        let action = std::slice::from_raw_parts_mut(action, action_len);
        self.run_into(observation, action)
    }
}

impl std::fmt::Debug for PolicyDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyDriver")
            .field("loaded", &self.is_loaded())
            .field("input", &(self.input_name(), self.input_dim()))
            .field("output", &(self.output_name(), self.output_dim()))
            .field("metrics", &self.metrics)
            .finish()
    }
}
