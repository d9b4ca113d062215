// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Run metrics.
//!
//! [`RunMetrics`] counts calls and tracks the latency of successful ones.
//! Recording is a handful of integer updates, safe on the hot path.

use std::time::Duration;

/// Aggregate statistics for the calls made on one loaded session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct RunMetrics {
    /// Successful calls.
    pub calls: u64,
    /// Failed calls, preconditions included.
    pub failures: u64,
    /// Summed latency of successful calls.
    pub total_latency: Duration,
    /// Fastest successful call, `None` before the first.
    pub min_latency: Option<Duration>,
    /// Slowest successful call.
    pub max_latency: Duration,
}

impl RunMetrics {
    /// Records one successful call.
    pub fn record_success(&mut self, latency: Duration) {
        self.calls += 1;
        self.total_latency += latency;
        self.min_latency = Some(self.min_latency.map_or(latency, |m| m.min(latency)));
        self.max_latency = self.max_latency.max(latency);
    }

    /// Records one failed call.
    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    /// Mean latency of successful calls.
    pub fn mean_latency(&self) -> Duration {
        if self.calls == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.total_latency.as_secs_f64() / self.calls as f64)
    }

    /// Returns a human-readable summary suitable for CLI output.
    pub fn summary(&self) -> String {
        let us = |d: Duration| d.as_secs_f64() * 1e6;
        format!(
            "Runs: {} ok, {} failed, mean {:.2}µs, min {:.2}µs, max {:.2}µs",
            self.calls,
            self.failures,
            us(self.mean_latency()),
            us(self.min_latency.unwrap_or(Duration::ZERO)),
            us(self.max_latency),
        )
    }
}
