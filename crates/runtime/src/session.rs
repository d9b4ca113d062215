// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Engine session preparation.
//!
//! ```text
//! InferenceModel (declared IO)
//!     │  pin input fact to [1, in], keep only the first output
//!     ▼
//! TypedModel (typed / decluttered / optimised per OptimizationLevel)
//!     │  into_runnable()
//!     ▼
//! Plan ──► reusable run-state (memory arena on)
//! ```

use crate::{DriverConfig, DriverError, OptimizationLevel};
use std::sync::Arc;
use tensor_core::single_sample_len;
use tract_onnx::prelude::*;

/// The executable form of a typed model.
pub(crate) type Plan = SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>;

type State = SimpleState<TypedFact, Box<dyn TypedOp>, TypedModel, Arc<Plan>>;

/// An engine session: the plan plus, with the arena enabled, one run-state
/// whose per-node value slots are recycled across calls.
pub(crate) struct Session {
    plan: Arc<Plan>,
    state: Option<State>,
}

fn engine_error(stage: &'static str) -> impl FnOnce(TractError) -> DriverError {
    move |e| DriverError::Engine {
        stage,
        detail: format!("{e:#}"),
    }
}

impl Session {
    /// Prepares a session for a model whose signature has been validated.
    ///
    /// Steps:
    /// 1. Pin the first input to `f32[1, input_dim]`.
    /// 2. Keep only the first output and drop its declared fact, so the
    ///    engine infers it from the pinned input.
    /// 3. Type and optimise per `config.optimization_level`.
    /// 4. Check a concrete output shape against `output_dim`.
    /// 5. Build the plan, and the run-state when `use_memory_arena` is set.
    pub fn prepare(
        mut model: InferenceModel,
        input_dim: usize,
        output_dim: usize,
        config: &DriverConfig,
    ) -> Result<Self, DriverError> {
        model = model
            .with_input_fact(0, f32::fact([1, input_dim]).into())
            .map_err(engine_error("set input shape"))?;

        let first = model
            .output_outlets()
            .map_err(engine_error("read outputs"))?[0];
        model
            .set_output_outlets(&[first])
            .map_err(engine_error("select output"))?;
        model
            .set_output_fact(0, InferenceFact::default())
            .map_err(engine_error("select output"))?;

        let typed = match config.optimization_level {
            OptimizationLevel::Disabled => model.into_typed().map_err(engine_error("type graph"))?,
            OptimizationLevel::Basic => model
                .into_typed()
                .and_then(|m| m.into_decluttered())
                .map_err(engine_error("declutter graph"))?,
            OptimizationLevel::Full => model
                .into_optimized()
                .map_err(engine_error("optimise graph"))?,
        };

        let fact = typed.output_fact(0).map_err(engine_error("read output shape"))?;
        if let Some(shape) = fact.shape.as_concrete() {
            if single_sample_len(shape) != Some(output_dim) {
                return Err(DriverError::Engine {
                    stage: "check output shape",
                    detail: format!(
                        "engine infers output shape {shape:?}, declared feature dimension is {output_dim}"
                    ),
                });
            }
        }

        tracing::debug!(
            "prepared {} nodes at level '{}' (intra-op threads {}, inter-op threads {}, runs on caller thread)",
            typed.nodes().len(),
            config.optimization_level,
            config.effective_intra_op_threads(),
            config.effective_inter_op_threads(),
        );

        let plan = Arc::new(typed.into_runnable().map_err(engine_error("build plan"))?);
        let state = if config.use_memory_arena {
            Some(State::new(Arc::clone(&plan)).map_err(engine_error("create run state"))?)
        } else {
            None
        };

        Ok(Self { plan, state })
    }

    /// Runs one forward pass.
    pub fn run(&mut self, input: TValue) -> TractResult<TVec<TValue>> {
        match self.state.as_mut() {
            Some(state) => {
                let result = state.run(tvec!(input));
                // The state keeps the bound inputs after a run; dropping them
                // hands the staging tensor back to its sole owner.
                state.session_state.inputs.clear();
                result
            }
            None => self.plan.run(tvec!(input)),
        }
    }

    /// Rebuilds the run-state after an aborted run.
    pub fn reset(&mut self) {
        if self.state.is_none() {
            return;
        }
        match State::new(Arc::clone(&self.plan)) {
            Ok(state) => self.state = Some(state),
            Err(e) => {
                tracing::warn!("cannot rebuild run state, continuing without memory arena: {e:#}");
                self.state = None;
            }
        }
    }
}
