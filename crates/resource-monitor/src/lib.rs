// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # resource-monitor
//!
//! Reads the memory footprint of the current process from
//! `/proc/self/status`.
//!
//! The stress harness samples it before and after a long run of inference
//! calls; a resident set that keeps growing means something on the call path
//! allocates without releasing.
//!
//! # Example
//! ```no_run
//! use resource_monitor::ProcessMemory;
//!
//! let before = ProcessMemory::read().expect("failed to read process status");
//! // ... run the workload ...
//! let after = ProcessMemory::read().expect("failed to read process status");
//! println!("{}", after.summary());
//! println!("RSS growth: {} kB", after.growth_since(&before) / 1024);
//! ```

mod error;
mod memory;

pub use error::MonitorError;
pub use memory::ProcessMemory;

/// Reads the current process memory, or `None` where procfs is unavailable.
pub fn sample() -> Option<ProcessMemory> {
    ProcessMemory::read().ok()
}
