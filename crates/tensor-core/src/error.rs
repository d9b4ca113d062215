// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for shape resolution.

use crate::Shape;

/// Errors that can occur while interpreting declared shapes.
#[derive(Debug, thiserror::Error)]
pub enum TensorError {
    /// No concrete positive feature length could be read from the shape.
    #[error("cannot resolve feature dimension of {shape}: {reason}")]
    UnresolvedDimension { shape: Shape, reason: &'static str },
}
