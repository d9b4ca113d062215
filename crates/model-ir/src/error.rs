// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for model loading and signature validation.

use std::fmt;
use tensor_core::DType;

/// Which side of the policy an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Role {
    /// The observation tensor.
    Input,
    /// The action tensor.
    Output,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Input => "input",
            Role::Output => "output",
        })
    }
}

/// Errors that can occur when reading or validating a policy model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The model file could not be opened.
    #[error("cannot read model '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a well-formed ONNX model, or the engine rejected it.
    #[error("failed to parse model '{path}': {detail}")]
    Parse { path: String, detail: String },

    /// The model declares no graph at all.
    #[error("model has no graph")]
    MissingGraph,

    /// The graph does not expose at least one input and one output.
    #[error("model has no inputs/outputs (inputs={inputs}, outputs={outputs})")]
    MissingIo { inputs: usize, outputs: usize },

    /// The first input or output is not a 32-bit float tensor.
    #[error("{role} '{name}' has element type {dtype}, expected f32")]
    UnsupportedElementType { role: Role, name: String, dtype: DType },

    /// The feature dimension of the first input or output is not static.
    #[error("{role} '{name}': {source}")]
    UnresolvedDimension {
        role: Role,
        name: String,
        #[source]
        source: tensor_core::TensorError,
    },
}
