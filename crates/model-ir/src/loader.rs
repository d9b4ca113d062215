// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Model loading from ONNX files.
//!
//! Loading happens in two passes over the same file:
//! 1. The raw protobuf is decoded and the *declared* signature is read and
//!    validated. This is what the model author wrote, before any engine
//!    shape inference, and it is cheap to reject a model here.
//! 2. Only a valid model is handed to the engine to build its inference
//!    graph. The engine reads the file itself so that external-data
//!    tensors resolve relative to the model path.

use crate::signature::{Declared, Validated};
use crate::{ModelError, ModelSignature};
use std::path::Path;
use tract_onnx::prelude::*;
use tract_onnx::Onnx;

/// A validated signature together with the engine's inference graph.
#[derive(Debug)]
pub struct LoadedModel {
    /// Checked IO signature with resolved dimensions.
    pub signature: ModelSignature<Validated>,
    /// The engine graph, not yet typed or optimised.
    pub model: InferenceModel,
}

/// Loads ONNX policy models.
///
/// # Example
/// ```no_run
/// use model_ir::ModelLoader;
/// use std::path::Path;
///
/// let onnx = tract_onnx::onnx();
/// let loaded = ModelLoader::load(&onnx, Path::new("policy.onnx")).unwrap();
/// println!("{}", loaded.signature.summary());
/// ```
pub struct ModelLoader;

impl ModelLoader {
    /// Reads the declared signature of a model without building an engine
    /// graph.
    pub fn read_signature(
        framework: &Onnx,
        path: &Path,
    ) -> Result<ModelSignature<Declared>, ModelError> {
        std::fs::metadata(path).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let proto = framework
            .proto_model_for_path(path)
            .map_err(|e| parse_error(path, e))?;
        ModelSignature::from_proto(&proto)
    }

    /// Loads and validates a model.
    ///
    /// Steps:
    /// 1. Decode the protobuf and read the declared signature.
    /// 2. Validate it (IO arity, element types, feature dimensions).
    /// 3. Build the engine's inference graph from the same file.
    pub fn load(framework: &Onnx, path: &Path) -> Result<LoadedModel, ModelError> {
        let signature = Self::read_signature(framework, path)?.validate()?;
        tracing::debug!("{}", signature.summary());

        let model = framework
            .model_for_path(path)
            .map_err(|e| parse_error(path, e))?;

        Ok(LoadedModel { signature, model })
    }
}

fn parse_error(path: &Path, e: TractError) -> ModelError {
    ModelError::Parse {
        path: path.display().to_string(),
        detail: format!("{e:#}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SyntheticPolicy;

    #[test]
    fn test_load_synthetic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.onnx");
        SyntheticPolicy::linear(45, 13).write_to(&path).unwrap();

        let loaded = ModelLoader::load(&tract_onnx::onnx(), &path).unwrap();
        assert_eq!(loaded.signature.input_dim(), 45);
        assert_eq!(loaded.signature.output_dim(), 13);
        assert_eq!(loaded.signature.input().name, "obs");
        assert_eq!(loaded.signature.output().name, "actions");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModelLoader::load(&tract_onnx::onnx(), &dir.path().join("nope.onnx"))
            .unwrap_err();
        assert!(matches!(err, ModelError::Io { .. }));
    }

    #[test]
    fn test_garbage_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.onnx");
        std::fs::write(&path, [0xFFu8, 0xFF, 0xFF, 0xFF, 0x0F, 0x01, 0x02]).unwrap();
        assert!(ModelLoader::load(&tract_onnx::onnx(), &path).is_err());
    }

    #[test]
    fn test_read_signature_does_not_validate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_outputs.onnx");
        SyntheticPolicy::linear(4, 2)
            .without_outputs()
            .write_to(&path)
            .unwrap();

        let declared = ModelLoader::read_signature(&tract_onnx::onnx(), &path).unwrap();
        assert_eq!(declared.inputs.len(), 1);
        assert!(declared.outputs.is_empty());
        assert!(matches!(
            ModelLoader::load(&tract_onnx::onnx(), &path),
            Err(ModelError::MissingIo { outputs: 0, .. })
        ));
    }
}
