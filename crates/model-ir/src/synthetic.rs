// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Synthetic linear policies.
//!
//! A [`SyntheticPolicy`] is a single dense layer, `actions = obs · W + b`,
//! written out as a real ONNX model. Because the weights are a fixed
//! function of their indices, the host can evaluate the same policy with
//! [`SyntheticPolicy::evaluate`] and produce golden reference outputs
//! without any engine involved.
//!
//! The declared IO (names, element types, shapes) can be overridden to
//! produce models that the signature checks must reject.

use crate::ModelError;
use prost::Message;
use std::path::Path;
use tensor_core::{DType, Dim, Shape};
use tract_onnx::pb;

/// ONNX opset the generated graph targets.
pub const OPSET_VERSION: i64 = 13;
/// ONNX IR version written into generated models.
pub const IR_VERSION: i64 = 7;

const WEIGHT_NAME: &str = "W";
const BIAS_NAME: &str = "b";
const HIDDEN_NAME: &str = "obs_x_w";

/// Builder for a single-layer linear policy model.
#[derive(Debug, Clone)]
pub struct SyntheticPolicy {
    input_features: usize,
    output_features: usize,
    input_name: String,
    output_name: String,
    input_dtype: DType,
    output_dtype: DType,
    input_shape: Shape,
    output_shape: Shape,
    with_outputs: bool,
    extra_inputs: Vec<(String, usize)>,
}

impl SyntheticPolicy {
    /// A policy mapping `input_features` observations to `output_features`
    /// actions, declared as `obs: f32[batch, in]` and
    /// `actions: f32[batch, out]`.
    pub fn linear(input_features: usize, output_features: usize) -> Self {
        Self {
            input_features,
            output_features,
            input_name: "obs".into(),
            output_name: "actions".into(),
            input_dtype: DType::F32,
            output_dtype: DType::F32,
            input_shape: Shape::batched("batch", input_features as i64),
            output_shape: Shape::batched("batch", output_features as i64),
            with_outputs: true,
            extra_inputs: Vec::new(),
        }
    }

    /// Renames the graph input and output.
    pub fn with_names(mut self, input: impl Into<String>, output: impl Into<String>) -> Self {
        self.input_name = input.into();
        self.output_name = output.into();
        self
    }

    /// Overrides the declared input shape. Weights keep their size.
    pub fn with_input_shape(mut self, shape: Shape) -> Self {
        self.input_shape = shape;
        self
    }

    /// Overrides the declared output shape.
    pub fn with_output_shape(mut self, shape: Shape) -> Self {
        self.output_shape = shape;
        self
    }

    /// Declares both sides without a batch axis: `[in]` and `[out]`.
    pub fn unbatched(self) -> Self {
        let input = Shape::fixed(&[self.input_features as i64]);
        let output = Shape::fixed(&[self.output_features as i64]);
        self.with_input_shape(input).with_output_shape(output)
    }

    /// Overrides the declared input element type.
    pub fn with_input_dtype(mut self, dtype: DType) -> Self {
        self.input_dtype = dtype;
        self
    }

    /// Overrides the declared output element type.
    pub fn with_output_dtype(mut self, dtype: DType) -> Self {
        self.output_dtype = dtype;
        self
    }

    /// Drops the graph outputs from the written model.
    pub fn without_outputs(mut self) -> Self {
        self.with_outputs = false;
        self
    }

    /// Declares one more graph input, `name: f32[1, features]`, after the
    /// observation. No node reads it, but the engine still expects a value
    /// for it on every run.
    pub fn with_extra_input(mut self, name: impl Into<String>, features: usize) -> Self {
        self.extra_inputs.push((name.into(), features));
        self
    }

    pub fn input_features(&self) -> usize {
        self.input_features
    }

    pub fn output_features(&self) -> usize {
        self.output_features
    }

    /// Weight `W[i][j]`, a small value in `[-0.05, 0.05)`.
    fn weight(i: usize, j: usize) -> f32 {
        let k = (i * 7 + j * 13) % 17;
        (k as f32 / 17.0 - 0.5) * 0.1
    }

    fn bias(j: usize) -> f32 {
        ((j % 5) as f32 - 2.0) * 0.01
    }

    fn weights(&self) -> Vec<f32> {
        let mut w = Vec::with_capacity(self.input_features * self.output_features);
        for i in 0..self.input_features {
            for j in 0..self.output_features {
                w.push(Self::weight(i, j));
            }
        }
        w
    }

    fn biases(&self) -> Vec<f32> {
        (0..self.output_features).map(Self::bias).collect()
    }

    /// Evaluates the policy on the host.
    ///
    /// # Panics
    /// If `obs.len()` differs from the input feature count.
    pub fn evaluate(&self, obs: &[f32]) -> Vec<f32> {
        assert_eq!(obs.len(), self.input_features, "observation length");
        (0..self.output_features)
            .map(|j| {
                let dot: f32 = obs
                    .iter()
                    .enumerate()
                    .map(|(i, x)| x * Self::weight(i, j))
                    .sum();
                dot + Self::bias(j)
            })
            .collect()
    }

    /// A deterministic observation in `[-1, 1]` derived from `seed`.
    pub fn sample_observation(&self, seed: u64) -> Vec<f32> {
        let phase = (seed % 1000) as f32 * 0.37;
        (0..self.input_features)
            .map(|i| ((i as f32 + phase) * 0.7).sin())
            .collect()
    }

    /// Builds the ONNX model.
    pub fn to_proto(&self) -> pb::ModelProto {
        let mut inputs = vec![value_info(&self.input_name, self.input_dtype, &self.input_shape)];
        inputs.extend(self.extra_inputs.iter().map(|(name, features)| {
            value_info(name, DType::F32, &Shape::fixed(&[1, *features as i64]))
        }));
        let outputs = if self.with_outputs {
            vec![value_info(&self.output_name, self.output_dtype, &self.output_shape)]
        } else {
            Vec::new()
        };

        let initializer = vec![
            float_tensor(
                WEIGHT_NAME,
                &[self.input_features as i64, self.output_features as i64],
                self.weights(),
            ),
            float_tensor(BIAS_NAME, &[self.output_features as i64], self.biases()),
        ];

        let node = vec![
            node("matmul", "MatMul", &[&self.input_name, WEIGHT_NAME], HIDDEN_NAME),
            node("add", "Add", &[HIDDEN_NAME, BIAS_NAME], &self.output_name),
        ];

        pb::ModelProto {
            ir_version: IR_VERSION,
            producer_name: env!("CARGO_PKG_NAME").into(),
            opset_import: vec![pb::OperatorSetIdProto {
                domain: String::new(),
                version: OPSET_VERSION,
            }],
            graph: Some(pb::GraphProto {
                name: "linear_policy".into(),
                node,
                initializer,
                input: inputs,
                output: outputs,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// Serialized ONNX bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_proto().encode_to_vec()
    }

    /// Writes the model to `path`.
    pub fn write_to(&self, path: &Path) -> Result<(), ModelError> {
        std::fs::write(path, self.to_bytes()).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

// ── Proto helpers ──────────────────────────────────────────────────

fn value_info(name: &str, dtype: DType, shape: &Shape) -> pb::ValueInfoProto {
    let shape = shape.dims().map(|dims| pb::TensorShapeProto {
        dim: dims.iter().map(dim_to_proto).collect(),
    });
    pb::ValueInfoProto {
        name: name.into(),
        r#type: Some(pb::TypeProto {
            value: Some(pb::type_proto::Value::TensorType(pb::type_proto::Tensor {
                elem_type: dtype.onnx_code(),
                shape,
            })),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn dim_to_proto(dim: &Dim) -> pb::tensor_shape_proto::Dimension {
    use pb::tensor_shape_proto::dimension::Value;
    let value = match dim {
        Dim::Known(v) => Some(Value::DimValue(*v)),
        Dim::Symbolic(name) => Some(Value::DimParam(name.clone())),
        Dim::Unknown => None,
    };
    pb::tensor_shape_proto::Dimension {
        value,
        ..Default::default()
    }
}

fn float_tensor(name: &str, dims: &[i64], data: Vec<f32>) -> pb::TensorProto {
    pb::TensorProto {
        name: name.into(),
        dims: dims.to_vec(),
        data_type: DType::F32.onnx_code(),
        float_data: data,
        ..Default::default()
    }
}

fn node(name: &str, op_type: &str, inputs: &[&str], output: &str) -> pb::NodeProto {
    pb::NodeProto {
        name: name.into(),
        op_type: op_type.into(),
        input: inputs.iter().map(|s| s.to_string()).collect(),
        output: vec![output.into()],
        ..Default::default()
    }
}
