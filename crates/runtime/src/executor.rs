// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The inference executor: one observation in, one action out.
//!
//! Both staging buffers are sized at load. The input tensor is shared with
//! the engine through an `Arc`, so binding it costs a reference count, not a
//! copy. The session drops the engine's handle when a run completes, so
//! `Arc::make_mut` finds the tensor unshared and writes it in place.

use crate::session::Session;
use crate::{DriverError, RunError};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tensor_core::single_sample_len;
use tract_onnx::prelude::*;

pub(crate) struct Executor {
    session: Session,
    input: Arc<Tensor>,
    output: Box<[f32]>,
}

impl Executor {
    pub fn new(session: Session, input_dim: usize, output_dim: usize) -> Result<Self, DriverError> {
        let input = Tensor::zero::<f32>(&[1, input_dim]).map_err(|e| DriverError::Engine {
            stage: "allocate input",
            detail: format!("{e:#}"),
        })?;
        Ok(Self {
            session,
            input: Arc::new(input),
            output: vec![0.0; output_dim].into_boxed_slice(),
        })
    }

    /// The latest observation passed to the engine.
    pub fn staged_input(&self) -> &[f32] {
        self.input.as_slice::<f32>().unwrap_or(&[])
    }

    /// The latest action produced by the engine.
    pub fn staged_output(&self) -> &[f32] {
        &self.output
    }

    /// Runs one forward pass. Lengths are checked by the caller.
    pub fn run(&mut self, observation: &[f32], action: &mut [f32]) -> Result<(), RunError> {
        Arc::make_mut(&mut self.input)
            .as_slice_mut::<f32>()
            .map_err(|e| RunError::Engine(format!("{e:#}")))?
            .copy_from_slice(observation);

        let input = TValue::Const(Arc::clone(&self.input));
        let session = &mut self.session;
        let outputs = match catch_unwind(AssertUnwindSafe(|| session.run(input))) {
            Ok(Ok(outputs)) => outputs,
            Ok(Err(e)) => return Err(RunError::Engine(format!("{e:#}"))),
            Err(_) => {
                self.session.reset();
                return Err(RunError::Panicked);
            }
        };

        if outputs.len() != 1 {
            return Err(RunError::Engine(format!(
                "engine returned {} outputs, expected 1",
                outputs.len()
            )));
        }
        let out = &outputs[0];
        if out.datum_type() != f32::datum_type() {
            return Err(RunError::OutputType(format!("{:?}", out.datum_type())));
        }
        let expected = self.output.len();
        if single_sample_len(out.shape()) != Some(expected) {
            return Err(RunError::OutputShape {
                shape: out.shape().to_vec(),
                expected,
            });
        }

        let values = out
            .as_slice::<f32>()
            .map_err(|e| RunError::Engine(format!("{e:#}")))?;
        self.output.copy_from_slice(values);
        action.copy_from_slice(&self.output);
        Ok(())
    }
}
