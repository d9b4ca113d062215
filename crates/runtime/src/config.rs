// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Driver configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! intra_op_threads = 1
//! inter_op_threads = 1
//! optimization_level = "basic"
//! use_memory_arena = true
//! ```
//!
//! Every key is optional; missing keys take the defaults shown above.

use crate::DriverError;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// How much graph rewriting the engine performs at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptimizationLevel {
    /// The graph is typed as written, no rewrites.
    Disabled,
    /// Structural simplification only.
    #[default]
    Basic,
    /// All rewrites, including kernel selection.
    Full,
}

impl OptimizationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptimizationLevel::Disabled => "disabled",
            OptimizationLevel::Basic => "basic",
            OptimizationLevel::Full => "full",
        }
    }
}

impl fmt::Display for OptimizationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptimizationLevel {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "disabled" | "none" => Ok(OptimizationLevel::Disabled),
            "basic" => Ok(OptimizationLevel::Basic),
            "full" | "all" => Ok(OptimizationLevel::Full),
            other => Err(DriverError::Config(format!(
                "unknown optimization level '{other}'; expected 'disabled', 'basic', or 'full'"
            ))),
        }
    }
}

/// Session settings for a [`PolicyDriver`](crate::PolicyDriver).
///
/// Passed once to `load`; the driver keeps its own copy for the lifetime of
/// the session.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Threads used within one operator. Values below 1 are treated as 1.
    pub intra_op_threads: usize,
    /// Threads used across independent operators. Values below 1 are treated as 1.
    pub inter_op_threads: usize,
    /// Graph optimisation applied at load.
    pub optimization_level: OptimizationLevel,
    /// Reuse one engine run-state across calls.
    pub use_memory_arena: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            intra_op_threads: 1,
            inter_op_threads: 1,
            optimization_level: OptimizationLevel::Basic,
            use_memory_arena: true,
        }
    }
}

impl DriverConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, DriverError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DriverError::Config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, DriverError> {
        toml::from_str(toml_str)
            .map_err(|e| DriverError::Config(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, DriverError> {
        toml::to_string_pretty(self)
            .map_err(|e| DriverError::Config(format!("TOML serialise error: {e}")))
    }

    /// Intra-op thread count, at least 1.
    pub fn effective_intra_op_threads(&self) -> usize {
        self.intra_op_threads.max(1)
    }

    /// Inter-op thread count, at least 1.
    pub fn effective_inter_op_threads(&self) -> usize {
        self.inter_op_threads.max(1)
    }

    /// A copy with thread counts clamped.
    pub(crate) fn normalized(&self) -> Self {
        Self {
            intra_op_threads: self.effective_intra_op_threads(),
            inter_op_threads: self.effective_inter_op_threads(),
            ..self.clone()
        }
    }
}
