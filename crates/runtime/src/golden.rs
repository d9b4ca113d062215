// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Golden reference files.
//!
//! A golden file is a raw array of little-endian IEEE-754 `f32` values with
//! no header; its length in bytes is four times the element count.

use crate::DriverError;
use byteorder::{ByteOrder, LittleEndian};
use std::path::Path;

/// Default absolute tolerance when comparing against a golden action.
pub const DEFAULT_TOLERANCE: f32 = 1e-5;

fn golden_error(path: &Path, detail: impl Into<String>) -> DriverError {
    DriverError::Golden {
        path: path.display().to_string(),
        detail: detail.into(),
    }
}

/// Reads a golden file.
pub fn read_f32_file(path: &Path) -> Result<Vec<f32>, DriverError> {
    let bytes = std::fs::read(path).map_err(|e| golden_error(path, e.to_string()))?;
    if bytes.len() % 4 != 0 {
        return Err(golden_error(
            path,
            format!("size {} bytes is not a multiple of 4", bytes.len()),
        ));
    }
    let mut values = vec![0f32; bytes.len() / 4];
    LittleEndian::read_f32_into(&bytes, &mut values);
    Ok(values)
}

/// Writes a golden file.
pub fn write_f32_file(path: &Path, values: &[f32]) -> Result<(), DriverError> {
    let mut bytes = vec![0u8; values.len() * 4];
    LittleEndian::write_f32_into(values, &mut bytes);
    std::fs::write(path, bytes).map_err(|e| golden_error(path, e.to_string()))
}

/// Largest element-wise absolute difference.
///
/// Slices of different length are never equal: the result is infinite.
/// A NaN on either side makes the result NaN.
pub fn max_abs_diff(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }
    let mut max = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        let diff = (x - y).abs();
        if diff.is_nan() {
            return f32::NAN;
        }
        max = max.max(diff);
    }
    max
}
