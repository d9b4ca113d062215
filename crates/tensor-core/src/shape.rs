// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Declared tensor shapes and the feature-dimension resolution rule.
//!
//! A model file declares each input/output shape axis by axis. An axis is
//! either a concrete extent, a named symbol (`"batch"`), or left blank. The
//! policy runtime needs a single number out of that declaration (the length
//! of the flat observation or action vector) and derives it with one rule:
//!
//! ```text
//! [N]            → N
//! [.., .., N]    → N        (leading axes are batch-like)
//! []  / unranked → unresolved
//! last axis symbolic, blank or ≤ 0 → unresolved
//! ```

use crate::TensorError;
use std::fmt;

/// One axis of a declared shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Dim {
    /// A concrete extent. May be zero or negative in malformed models.
    Known(i64),
    /// A named dynamic axis (ONNX `dim_param`).
    Symbolic(String),
    /// An axis with neither value nor name.
    Unknown,
}

impl Dim {
    /// Returns the extent when it is concrete and strictly positive.
    pub fn positive(&self) -> Option<usize> {
        match self {
            Dim::Known(v) if *v > 0 => usize::try_from(*v).ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dim::Known(v) => write!(f, "{v}"),
            Dim::Symbolic(name) => f.write_str(name),
            Dim::Unknown => f.write_str("?"),
        }
    }
}

/// A declared tensor shape, possibly of unknown rank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Shape {
    dims: Option<Vec<Dim>>,
}

impl Shape {
    /// Creates a ranked shape from the given axes.
    pub fn new(dims: Vec<Dim>) -> Self {
        Self { dims: Some(dims) }
    }

    /// Creates a shape whose rank is not declared.
    pub fn unranked() -> Self {
        Self { dims: None }
    }

    /// Creates a fully static shape.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::Shape;
    /// let s = Shape::fixed(&[1, 45]);
    /// assert_eq!(s.rank(), Some(2));
    /// assert_eq!(s.feature_dim().unwrap(), 45);
    /// ```
    pub fn fixed(dims: &[i64]) -> Self {
        Self::new(dims.iter().map(|&d| Dim::Known(d)).collect())
    }

    /// Creates the conventional policy shape `[batch, features]` with a
    /// symbolic leading axis.
    pub fn batched(batch_symbol: &str, features: i64) -> Self {
        Self::new(vec![
            Dim::Symbolic(batch_symbol.to_string()),
            Dim::Known(features),
        ])
    }

    /// Returns the rank, or `None` if unranked.
    pub fn rank(&self) -> Option<usize> {
        self.dims.as_ref().map(Vec::len)
    }

    /// Returns the declared axes, or `None` if unranked.
    pub fn dims(&self) -> Option<&[Dim]> {
        self.dims.as_deref()
    }

    /// Returns `true` if every axis has a concrete positive extent.
    pub fn is_static(&self) -> bool {
        self.dims
            .as_ref()
            .is_some_and(|dims| dims.iter().all(|d| d.positive().is_some()))
    }

    /// Resolves the flat feature length of this shape.
    ///
    /// A rank-1 shape yields its only axis; a shape of rank two or more
    /// yields its last axis. The chosen axis must be a concrete, strictly
    /// positive extent. Leading axes are never inspected.
    pub fn feature_dim(&self) -> Result<usize, TensorError> {
        let dims = self.dims.as_deref().ok_or_else(|| TensorError::UnresolvedDimension {
            shape: self.clone(),
            reason: "rank is not declared",
        })?;
        let last = dims.last().ok_or_else(|| TensorError::UnresolvedDimension {
            shape: self.clone(),
            reason: "scalar shape has no feature axis",
        })?;
        match last {
            Dim::Known(_) => last.positive().ok_or_else(|| TensorError::UnresolvedDimension {
                shape: self.clone(),
                reason: "feature axis is not positive",
            }),
            Dim::Symbolic(_) | Dim::Unknown => Err(TensorError::UnresolvedDimension {
                shape: self.clone(),
                reason: "feature axis is dynamic",
            }),
        }
    }
}

/// Resolves the feature length of a concrete runtime shape.
///
/// Accepts `[n]` and `[1, n]`; anything else (including a batch axis other
/// than one) returns `None`.
///
/// # Examples
/// ```
/// use tensor_core::single_sample_len;
/// assert_eq!(single_sample_len(&[13]), Some(13));
/// assert_eq!(single_sample_len(&[1, 13]), Some(13));
/// assert_eq!(single_sample_len(&[2, 13]), None);
/// ```
pub fn single_sample_len(shape: &[usize]) -> Option<usize> {
    match *shape {
        [n] => Some(n),
        [1, n] => Some(n),
        _ => None,
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(dims) = &self.dims else {
            return f.write_str("[..]");
        };
        write!(f, "[")?;
        for (i, d) in dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, "]")
    }
}

/// Convenience: `Shape::from(vec![Dim::Known(45)])`.
impl From<Vec<Dim>> for Shape {
    fn from(dims: Vec<Dim>) -> Self {
        Self::new(dims)
    }
}
