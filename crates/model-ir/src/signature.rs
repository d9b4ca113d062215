// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The declared IO signature of a policy model.
//!
//! # Type-State Pattern
//!
//! ```text
//! ModelSignature<Declared>   — names, element types and shapes as written
//!       │  .validate()         in the model file; nothing checked yet.
//!       ▼
//! ModelSignature<Validated>  — one f32 input, one f32 output, both with a
//!                              resolved feature dimension.
//! ```
//!
//! The runtime only accepts a `ModelSignature<Validated>`, so an unchecked
//! model can never reach the executor. Unlike a marker-only type-state, the
//! `Validated` state carries the resolved dimensions, so they cannot be read
//! before validation has produced them.

use crate::{ModelError, Role};
use std::collections::HashSet;
use tensor_core::{DType, Dim, Shape};
use tract_onnx::pb;

// ── Type-state markers ─────────────────────────────────────────────

/// State: signature read from the file, not yet checked.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Declared;

/// State: signature checked, feature dimensions resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Validated {
    /// Flat observation length.
    pub input_dim: usize,
    /// Flat action length.
    pub output_dim: usize,
}

/// Sealed trait for signature states.
pub trait SignatureState: std::fmt::Debug + Clone {}
impl SignatureState for Declared {}
impl SignatureState for Validated {}

// ── TensorSpec ─────────────────────────────────────────────────────

/// Name, element type and declared shape of one graph input or output.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TensorSpec {
    pub name: String,
    pub dtype: DType,
    pub shape: Shape,
}

impl TensorSpec {
    /// Reads a spec from an ONNX `ValueInfoProto`.
    ///
    /// Non-tensor declarations (sequences, maps) come out with an
    /// undefined element type and unranked shape, which validation rejects.
    pub fn from_value_info(info: &pb::ValueInfoProto) -> Self {
        #[allow(unreachable_patterns)]
        let tensor = match info.r#type.as_ref().and_then(|t| t.value.as_ref()) {
            Some(pb::type_proto::Value::TensorType(t)) => Some(t),
            _ => None,
        };

        let dtype = tensor
            .map(|t| DType::from_onnx(t.elem_type))
            .unwrap_or(DType::Undefined);
        let shape = tensor
            .and_then(|t| t.shape.as_ref())
            .map(|s| Shape::new(s.dim.iter().map(dim_from_proto).collect()))
            .unwrap_or_else(Shape::unranked);

        Self {
            name: info.name.clone(),
            dtype,
            shape,
        }
    }

    /// One-line description, e.g. `obs: f32[batch, 45]`.
    pub fn summary(&self) -> String {
        format!("{}: {}{}", self.name, self.dtype, self.shape)
    }
}

fn dim_from_proto(dim: &pb::tensor_shape_proto::Dimension) -> Dim {
    use pb::tensor_shape_proto::dimension::Value;
    match &dim.value {
        Some(Value::DimValue(v)) => Dim::Known(*v),
        Some(Value::DimParam(name)) if !name.is_empty() => Dim::Symbolic(name.clone()),
        _ => Dim::Unknown,
    }
}

// ── ModelSignature ─────────────────────────────────────────────────

/// All graph inputs and outputs of a model, in declaration order.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ModelSignature<S: SignatureState = Declared> {
    /// Graph inputs, excluding initializers.
    pub inputs: Vec<TensorSpec>,
    /// Graph outputs.
    pub outputs: Vec<TensorSpec>,
    /// Validation state.
    #[serde(rename = "resolved")]
    state: S,
}

impl ModelSignature<Declared> {
    /// Creates a declared signature from explicit specs.
    pub fn new(inputs: Vec<TensorSpec>, outputs: Vec<TensorSpec>) -> Self {
        Self {
            inputs,
            outputs,
            state: Declared,
        }
    }

    /// Extracts the declared signature from a parsed ONNX model.
    ///
    /// Graph inputs that are also initializers are weights, not runtime
    /// inputs, and are skipped.
    pub fn from_proto(proto: &pb::ModelProto) -> Result<Self, ModelError> {
        let graph = proto.graph.as_ref().ok_or(ModelError::MissingGraph)?;
        let initializers: HashSet<&str> =
            graph.initializer.iter().map(|t| t.name.as_str()).collect();

        let inputs = graph
            .input
            .iter()
            .filter(|vi| !initializers.contains(vi.name.as_str()))
            .map(TensorSpec::from_value_info)
            .collect();
        let outputs = graph.output.iter().map(TensorSpec::from_value_info).collect();

        Ok(Self::new(inputs, outputs))
    }

    /// Validates the signature and transitions to the `Validated` state.
    ///
    /// # Checks, in order
    /// 1. At least one input and one output.
    /// 2. The first input is `f32`.
    /// 3. The first output is `f32`.
    /// 4. Both feature dimensions resolve (see [`Shape::feature_dim`]).
    pub fn validate(self) -> Result<ModelSignature<Validated>, ModelError> {
        let (Some(input), Some(output)) = (self.inputs.first(), self.outputs.first()) else {
            return Err(ModelError::MissingIo {
                inputs: self.inputs.len(),
                outputs: self.outputs.len(),
            });
        };

        check_f32(Role::Input, input)?;
        check_f32(Role::Output, output)?;

        let input_dim = resolve(Role::Input, input)?;
        let output_dim = resolve(Role::Output, output)?;

        if self.inputs.len() > 1 || self.outputs.len() > 1 {
            tracing::debug!(
                "model declares {} inputs and {} outputs; only the first of each is bound",
                self.inputs.len(),
                self.outputs.len(),
            );
        }

        Ok(ModelSignature {
            inputs: self.inputs,
            outputs: self.outputs,
            state: Validated {
                input_dim,
                output_dim,
            },
        })
    }
}

fn check_f32(role: Role, spec: &TensorSpec) -> Result<(), ModelError> {
    if spec.dtype == DType::F32 {
        Ok(())
    } else {
        Err(ModelError::UnsupportedElementType {
            role,
            name: spec.name.clone(),
            dtype: spec.dtype,
        })
    }
}

fn resolve(role: Role, spec: &TensorSpec) -> Result<usize, ModelError> {
    spec.shape
        .feature_dim()
        .map_err(|source| ModelError::UnresolvedDimension {
            role,
            name: spec.name.clone(),
            source,
        })
}

impl ModelSignature<Validated> {
    /// The bound observation tensor.
    pub fn input(&self) -> &TensorSpec {
        &self.inputs[0]
    }

    /// The bound action tensor.
    pub fn output(&self) -> &TensorSpec {
        &self.outputs[0]
    }

    /// Flat observation length.
    pub fn input_dim(&self) -> usize {
        self.state.input_dim
    }

    /// Flat action length.
    pub fn output_dim(&self) -> usize {
        self.state.output_dim
    }

    /// Returns a summary string describing the policy signature.
    pub fn summary(&self) -> String {
        format!(
            "Policy {} -> {} (obs dim {}, action dim {})",
            self.input().summary(),
            self.output().summary(),
            self.input_dim(),
            self.output_dim(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str, dtype: DType, shape: Shape) -> TensorSpec {
        TensorSpec {
            name: name.into(),
            dtype,
            shape,
        }
    }

    #[test]
    fn test_validate_batched() {
        let sig = ModelSignature::new(
            vec![spec("obs", DType::F32, Shape::batched("batch", 45))],
            vec![spec("actions", DType::F32, Shape::batched("batch", 13))],
        )
        .validate()
        .unwrap();
        assert_eq!(sig.input_dim(), 45);
        assert_eq!(sig.output_dim(), 13);
        assert_eq!(sig.input().name, "obs");
        assert_eq!(sig.output().name, "actions");
        assert!(sig.summary().contains("obs dim 45"));
    }

    #[test]
    fn test_first_of_many_is_bound() {
        let sig = ModelSignature::new(
            vec![
                spec("obs", DType::F32, Shape::fixed(&[4])),
                spec("hidden", DType::I64, Shape::unranked()),
            ],
            vec![
                spec("act", DType::F32, Shape::fixed(&[2])),
                spec("value", DType::F32, Shape::fixed(&[1])),
            ],
        )
        .validate()
        .unwrap();
        assert_eq!((sig.input_dim(), sig.output_dim()), (4, 2));
    }

    #[test]
    fn test_missing_outputs() {
        let err = ModelSignature::new(vec![spec("obs", DType::F32, Shape::fixed(&[4]))], vec![])
            .validate()
            .unwrap_err();
        assert!(matches!(err, ModelError::MissingIo { inputs: 1, outputs: 0 }));
        assert!(err.to_string().contains("no inputs/outputs"));
    }

    #[test]
    fn test_non_float_input() {
        let err = ModelSignature::new(
            vec![spec("obs", DType::I64, Shape::fixed(&[4]))],
            vec![spec("act", DType::F32, Shape::fixed(&[2]))],
        )
        .validate()
        .unwrap_err();
        assert!(matches!(
            err,
            ModelError::UnsupportedElementType { role: Role::Input, dtype: DType::I64, .. }
        ));
    }

    #[test]
    fn test_double_output_rejected() {
        let err = ModelSignature::new(
            vec![spec("obs", DType::F32, Shape::fixed(&[4]))],
            vec![spec("act", DType::F64, Shape::fixed(&[2]))],
        )
        .validate()
        .unwrap_err();
        assert!(matches!(
            err,
            ModelError::UnsupportedElementType { role: Role::Output, .. }
        ));
    }

    #[test]
    fn test_type_checked_before_shape() {
        let err = ModelSignature::new(
            vec![spec("obs", DType::F32, Shape::unranked())],
            vec![spec("act", DType::I32, Shape::fixed(&[2]))],
        )
        .validate()
        .unwrap_err();
        assert!(matches!(err, ModelError::UnsupportedElementType { .. }));
    }

    #[test]
    fn test_dynamic_input_rejected() {
        let err = ModelSignature::new(
            vec![spec(
                "obs",
                DType::F32,
                Shape::new(vec![Dim::Symbolic("N".into()), Dim::Symbolic("F".into())]),
            )],
            vec![spec("act", DType::F32, Shape::fixed(&[2]))],
        )
        .validate()
        .unwrap_err();
        assert!(matches!(
            err,
            ModelError::UnresolvedDimension { role: Role::Input, .. }
        ));
        assert!(err.to_string().starts_with("input 'obs'"));
    }

    #[test]
    fn test_from_proto_skips_initializers() {
        let proto = crate::SyntheticPolicy::linear(6, 3).to_proto();
        let mut graph = proto.graph.clone().unwrap();
        // Older exporters list weights among the graph inputs.
        let weight_info = pb::ValueInfoProto {
            name: graph.initializer[0].name.clone(),
            ..Default::default()
        };
        graph.input.insert(0, weight_info);
        let proto = pb::ModelProto {
            graph: Some(graph),
            ..proto
        };

        let sig = ModelSignature::from_proto(&proto).unwrap();
        assert_eq!(sig.inputs.len(), 1);
        assert_eq!(sig.inputs[0].shape, Shape::batched("batch", 6));
    }

    #[test]
    fn test_from_proto_without_graph() {
        let proto = pb::ModelProto::default();
        assert!(matches!(
            ModelSignature::from_proto(&proto),
            Err(ModelError::MissingGraph)
        ));
    }

    #[test]
    fn test_value_info_without_type() {
        let spec = TensorSpec::from_value_info(&pb::ValueInfoProto {
            name: "x".into(),
            ..Default::default()
        });
        assert_eq!(spec.dtype, DType::Undefined);
        assert_eq!(spec.shape, Shape::unranked());
        assert_eq!(spec.summary(), "x: undefined[..]");
    }
}
