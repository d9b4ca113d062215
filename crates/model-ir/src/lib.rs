// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # model-ir
//!
//! What a policy model promises at its boundary, read straight from the
//! ONNX file.
//!
//! - [`TensorSpec`] — name, element type and declared shape of one graph
//!   input or output.
//! - [`ModelSignature`] — all of a model's inputs and outputs, with a
//!   **type-state pattern** (`Declared` → `Validated`).
//! - [`ModelLoader`] — reads and validates the signature, then builds the
//!   engine graph.
//! - [`SyntheticPolicy`] — generates small linear ONNX policies with a host
//!   reference implementation, for tests and golden files.
//!
//! # Example
//! ```no_run
//! use model_ir::ModelLoader;
//! use std::path::Path;
//!
//! let onnx = tract_onnx::onnx();
//! let signature = ModelLoader::read_signature(&onnx, Path::new("policy.onnx"))
//!     .unwrap()
//!     .validate()
//!     .unwrap();
//! println!("{}", signature.summary());
//! ```

mod error;
mod loader;
pub mod signature;
mod synthetic;

pub use error::{ModelError, Role};
pub use loader::{LoadedModel, ModelLoader};
pub use signature::{Declared, ModelSignature, TensorSpec, Validated};
pub use synthetic::{SyntheticPolicy, IR_VERSION, OPSET_VERSION};
