// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The process-wide engine environment.
//!
//! Building the ONNX framework handle registers every operator the engine
//! knows, so it is done once per process by whichever driver loads first and
//! shared by all drivers afterwards.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};
use tract_onnx::Onnx;

/// Name reported by the environment.
pub const ENVIRONMENT_NAME: &str = "policy-rt";

static GLOBAL: OnceLock<EngineEnvironment> = OnceLock::new();

/// Shared engine state: the ONNX framework handle.
pub struct EngineEnvironment {
    name: &'static str,
    framework: Mutex<Onnx>,
    sessions: AtomicU64,
}

impl EngineEnvironment {
    /// Returns the environment, creating it on first use.
    pub fn global() -> &'static EngineEnvironment {
        GLOBAL.get_or_init(|| {
            tracing::debug!("creating engine environment '{ENVIRONMENT_NAME}'");
            EngineEnvironment {
                name: ENVIRONMENT_NAME,
                framework: Mutex::new(tract_onnx::onnx()),
                sessions: AtomicU64::new(0),
            }
        })
    }

    /// Whether any caller has created the environment yet.
    pub fn is_initialized() -> bool {
        GLOBAL.get().is_some()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of sessions built from this environment, successful or not.
    pub fn sessions_created(&self) -> u64 {
        self.sessions.load(Ordering::Relaxed)
    }

    /// Runs `f` with the framework handle.
    ///
    /// Loads are serialised through this call; inference never takes the lock.
    pub fn with_framework<R>(&self, f: impl FnOnce(&Onnx) -> R) -> R {
        self.sessions.fetch_add(1, Ordering::Relaxed);
        // A panic while loading cannot leave the handle half-updated, it is
        // only ever read.
        let guard = self
            .framework
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&guard)
    }
}

impl std::fmt::Debug for EngineEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineEnvironment")
            .field("name", &self.name)
            .field("sessions", &self.sessions_created())
            .finish()
    }
}
