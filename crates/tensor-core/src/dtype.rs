// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor element data types as declared by ONNX graphs.

use std::fmt;

/// Element type of a declared model input or output.
///
/// The numbering follows the ONNX `TensorProto.DataType` enumeration so that
/// values read from a model file map one-to-one. Codes this crate has no
/// name for are kept verbatim in [`DType::Other`] for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DType {
    /// 32-bit IEEE 754 floating point.
    F32,
    /// 16-bit IEEE 754 floating point.
    F16,
    /// 16-bit brain floating point.
    BF16,
    /// 64-bit IEEE 754 floating point.
    F64,
    /// 8-bit unsigned integer.
    U8,
    /// 8-bit signed integer.
    I8,
    /// 16-bit signed integer.
    I16,
    /// 32-bit signed integer.
    I32,
    /// 64-bit signed integer.
    I64,
    /// Boolean.
    Bool,
    /// String tensor.
    String,
    /// The declaration carried no element type.
    Undefined,
    /// Any other ONNX data type code.
    Other(i32),
}

impl DType {
    /// Maps an ONNX `TensorProto.DataType` code to a [`DType`].
    ///
    /// # Examples
    /// ```
    /// use tensor_core::DType;
    /// assert_eq!(DType::from_onnx(1), DType::F32);
    /// assert_eq!(DType::from_onnx(7), DType::I64);
    /// assert_eq!(DType::from_onnx(42), DType::Other(42));
    /// ```
    pub fn from_onnx(code: i32) -> Self {
        match code {
            0 => DType::Undefined,
            1 => DType::F32,
            2 => DType::U8,
            3 => DType::I8,
            5 => DType::I16,
            6 => DType::I32,
            7 => DType::I64,
            8 => DType::String,
            9 => DType::Bool,
            10 => DType::F16,
            11 => DType::F64,
            16 => DType::BF16,
            other => DType::Other(other),
        }
    }

    /// Returns the ONNX `TensorProto.DataType` code for this type.
    pub fn onnx_code(self) -> i32 {
        match self {
            DType::Undefined => 0,
            DType::F32 => 1,
            DType::U8 => 2,
            DType::I8 => 3,
            DType::I16 => 5,
            DType::I32 => 6,
            DType::I64 => 7,
            DType::String => 8,
            DType::Bool => 9,
            DType::F16 => 10,
            DType::F64 => 11,
            DType::BF16 => 16,
            DType::Other(code) => code,
        }
    }

    /// Returns `true` for the floating-point element types.
    pub fn is_float(self) -> bool {
        matches!(self, DType::F32 | DType::F16 | DType::BF16 | DType::F64)
    }

    /// Returns the size of a single element in bytes, if fixed.
    pub fn size_bytes(self) -> Option<usize> {
        match self {
            DType::F64 | DType::I64 => Some(8),
            DType::F32 | DType::I32 => Some(4),
            DType::F16 | DType::BF16 | DType::I16 => Some(2),
            DType::U8 | DType::I8 | DType::Bool => Some(1),
            DType::String | DType::Undefined | DType::Other(_) => None,
        }
    }

    /// Returns a human-readable label for this data type.
    pub fn as_str(self) -> &'static str {
        match self {
            DType::F32 => "f32",
            DType::F16 => "f16",
            DType::BF16 => "bf16",
            DType::F64 => "f64",
            DType::U8 => "u8",
            DType::I8 => "i8",
            DType::I16 => "i16",
            DType::I32 => "i32",
            DType::I64 => "i64",
            DType::Bool => "bool",
            DType::String => "string",
            DType::Undefined => "undefined",
            DType::Other(_) => "other",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DType::Other(code) => write!(f, "onnx-type-{code}"),
            other => f.write_str(other.as_str()),
        }
    }
}
