// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-core
//!
//! Element types and declared-shape descriptors for policy models.
//!
//! This crate provides:
//! - [`DType`] — element data types, numbered like ONNX `TensorProto.DataType`.
//! - [`Dim`] / [`Shape`] — declared shapes whose axes may be concrete,
//!   symbolic or blank, and whose rank may be unknown.
//! - [`Shape::feature_dim`] — the single rule that turns a declared shape
//!   into the length of a flat observation/action vector.
//! - [`single_sample_len`] — the same rule for concrete runtime shapes.
//!
//! # Design Goals
//! - No engine dependency: shapes are plain data, testable on their own.
//! - Clean error types via `thiserror`.

mod dtype;
mod error;
mod shape;

pub use dtype::DType;
pub use error::TensorError;
pub use shape::{single_sample_len, Dim, Shape};
