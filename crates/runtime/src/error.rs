// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the policy driver.

/// Errors that can occur while loading a policy or handling its files.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// The model file could not be read, or its signature is unusable.
    #[error(transparent)]
    Model(#[from] model_ir::ModelError),

    /// The engine could not prepare the validated model.
    #[error("engine failed to {stage}: {detail}")]
    Engine { stage: &'static str, detail: String },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A golden reference file is missing or malformed.
    #[error("golden file '{path}': {detail}")]
    Golden { path: String, detail: String },
}

/// Why a single inference call failed.
///
/// The first four variants are caller errors detected before the engine is
/// touched; the rest are engine-side failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunError {
    #[error("no policy is loaded")]
    NotLoaded,

    #[error("observation or action buffer is null")]
    NullBuffer,

    #[error("observation has {got} values, policy expects {expected}")]
    ObservationLength { expected: usize, got: usize },

    #[error("action buffer has {got} slots, policy produces {expected}")]
    ActionLength { expected: usize, got: usize },

    #[error("engine run failed: {0}")]
    Engine(String),

    #[error("engine returned shape {shape:?}, expected [{expected}] or [1, {expected}]")]
    OutputShape { shape: Vec<usize>, expected: usize },

    #[error("engine returned {0} output, expected f32")]
    OutputType(String),

    #[error("engine panicked during run")]
    Panicked,
}

impl RunError {
    /// True for failures caused by the caller's arguments or driver state.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            RunError::NotLoaded
                | RunError::NullBuffer
                | RunError::ObservationLength { .. }
                | RunError::ActionLength { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_split() {
        assert!(RunError::NotLoaded.is_precondition());
        assert!(RunError::ActionLength { expected: 2, got: 3 }.is_precondition());
        assert!(!RunError::Panicked.is_precondition());
        assert!(!RunError::Engine("boom".into()).is_precondition());
    }

    #[test]
    fn test_messages() {
        let e = RunError::OutputShape {
            shape: vec![2, 13],
            expected: 13,
        };
        assert_eq!(
            e.to_string(),
            "engine returned shape [2, 13], expected [13] or [1, 13]"
        );
        let e = DriverError::Engine {
            stage: "optimise graph",
            detail: "x".into(),
        };
        assert_eq!(e.to_string(), "engine failed to optimise graph: x");
    }
}
