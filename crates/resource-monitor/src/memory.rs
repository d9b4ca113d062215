// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Process memory via `/proc/self/status`.
//!
//! Only three fields are used: `VmRSS` (resident set now), `VmHWM` (peak
//! resident set) and `VmSize` (virtual size). All are reported in kB.

use crate::MonitorError;
use std::path::Path;

/// Default path to the process status file.
const STATUS_PATH: &str = "/proc/self/status";

/// Memory footprint of one process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ProcessMemory {
    /// Resident set size in bytes.
    pub rss_bytes: u64,
    /// Peak resident set size in bytes.
    pub peak_rss_bytes: u64,
    /// Virtual memory size in bytes.
    pub virtual_bytes: u64,
}

impl ProcessMemory {
    /// Reads the current process's memory from `/proc/self/status`.
    pub fn read() -> Result<Self, MonitorError> {
        Self::read_from(Path::new(STATUS_PATH))
    }

    /// Reads memory information from a specific file.
    pub fn read_from(path: &Path) -> Result<Self, MonitorError> {
        let content = std::fs::read_to_string(path).map_err(|e| MonitorError::ReadError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::parse(&content, path)
    }

    /// Parses the content of a `/proc/<pid>/status`-formatted string.
    pub fn parse(content: &str, source_path: &Path) -> Result<Self, MonitorError> {
        let mut rss_kb: Option<u64> = None;
        let mut hwm_kb: Option<u64> = None;
        let mut size_kb: Option<u64> = None;

        for line in content.lines() {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 2 {
                continue;
            }
            match parts[0] {
                "VmRSS:" => rss_kb = parse_kb_value(parts[1], source_path)?,
                "VmHWM:" => hwm_kb = parse_kb_value(parts[1], source_path)?,
                "VmSize:" => size_kb = parse_kb_value(parts[1], source_path)?,
                _ => {}
            }
        }

        let rss_kb = rss_kb.ok_or_else(|| MonitorError::ParseError {
            path: source_path.display().to_string(),
            detail: "VmRSS not found".to_string(),
        })?;

        Ok(Self {
            rss_bytes: rss_kb * 1024,
            // Kernel threads and some sandboxes omit these.
            peak_rss_bytes: hwm_kb.unwrap_or(rss_kb) * 1024,
            virtual_bytes: size_kb.unwrap_or(0) * 1024,
        })
    }

    /// Resident set growth since `earlier`, in bytes. Shrinkage counts as zero.
    pub fn growth_since(&self, earlier: &ProcessMemory) -> u64 {
        self.rss_bytes.saturating_sub(earlier.rss_bytes)
    }

    /// Returns resident memory in megabytes.
    pub fn rss_mb(&self) -> f64 {
        self.rss_bytes as f64 / (1024.0 * 1024.0)
    }

    /// Returns a one-line summary.
    pub fn summary(&self) -> String {
        format!(
            "RSS {:.1} MB (peak {:.1} MB), virtual {:.1} MB",
            self.rss_mb(),
            self.peak_rss_bytes as f64 / (1024.0 * 1024.0),
            self.virtual_bytes as f64 / (1024.0 * 1024.0),
        )
    }
}

/// Parses a numeric string from `/proc/self/status` (values are in kB).
fn parse_kb_value(s: &str, source_path: &Path) -> Result<Option<u64>, MonitorError> {
    s.parse::<u64>()
        .map(Some)
        .map_err(|_| MonitorError::ParseError {
            path: source_path.display().to_string(),
            detail: format!("expected integer kB value, got '{s}'"),
        })
}
