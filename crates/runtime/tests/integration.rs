// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: model file → load → repeated inference.
//!
//! Every model is generated on the fly as a real ONNX file, so these tests
//! exercise the full path through `model-ir`, the engine and the driver.

use model_ir::{ModelError, Role, SyntheticPolicy};
use policy_runtime::golden::{max_abs_diff, read_f32_file, write_f32_file, DEFAULT_TOLERANCE};
use policy_runtime::{DriverConfig, DriverError, OptimizationLevel, PolicyDriver, RunError};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::path::PathBuf;
use tempfile::TempDir;
use tensor_core::{DType, Dim, Shape};

// ── Helpers ────────────────────────────────────────────────────

fn write(dir: &TempDir, name: &str, policy: &SyntheticPolicy) -> PathBuf {
    let path = dir.path().join(name);
    policy.write_to(&path).unwrap();
    path
}

fn loaded(policy: &SyntheticPolicy, config: &DriverConfig) -> (TempDir, PolicyDriver) {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "policy.onnx", policy);
    let mut driver = PolicyDriver::new();
    assert!(
        driver.load(&path, config),
        "load failed: {:?}",
        driver.last_error()
    );
    (dir, driver)
}

fn load_error(policy: &SyntheticPolicy) -> DriverError {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "bad.onnx", policy);
    let mut driver = PolicyDriver::new();
    let err = driver.try_load(&path, &DriverConfig::default()).unwrap_err();
    assert!(!driver.is_loaded());
    assert_eq!(driver.input_dim(), -1);
    assert_eq!(driver.output_dim(), -1);
    assert_eq!(driver.last_error(), Some(err.to_string().as_str()));
    err
}

/// Observation in the shape of a locomotion command plus proprioception.
fn random_observation(rng: &mut StdRng, dim: usize) -> Vec<f32> {
    (0..dim)
        .map(|i| match i {
            0 | 2 => rng.gen_range(-1.0f32..1.0),
            1 => rng.gen_range(-0.5f32..0.5),
            _ => 0.1 * rng.gen_range(-1.0f32..1.0),
        })
        .collect()
}

fn assert_close(actual: &[f32], expected: &[f32]) {
    let diff = max_abs_diff(actual, expected);
    assert!(diff <= DEFAULT_TOLERANCE, "max abs diff {diff}");
}

// ── Loading ────────────────────────────────────────────────────

#[test]
fn test_load_45_to_13() {
    let (_dir, driver) = loaded(&SyntheticPolicy::linear(45, 13), &DriverConfig::default());
    assert!(driver.is_loaded());
    assert_eq!(driver.input_dim(), 45);
    assert_eq!(driver.output_dim(), 13);
    assert_eq!(driver.input_name(), "obs");
    assert_eq!(driver.output_name(), "actions");
    assert!(driver.last_error().is_none());
}

#[test]
fn test_unbatched_model_loads() {
    let policy = SyntheticPolicy::linear(45, 13).unbatched();
    let (_dir, mut driver) = loaded(&policy, &DriverConfig::default());
    assert_eq!((driver.input_dim(), driver.output_dim()), (45, 13));

    let obs = policy.sample_observation(1);
    let mut act = [0.0f32; 13];
    assert!(driver.run_into(&obs, &mut act));
    assert_close(&act, &policy.evaluate(&obs));
}

#[test]
fn test_custom_names() {
    let policy = SyntheticPolicy::linear(8, 2).with_names("observation", "mu");
    let (_dir, driver) = loaded(&policy, &DriverConfig::default());
    assert_eq!(driver.input_name(), "observation");
    assert_eq!(driver.output_name(), "mu");
}

#[test]
fn test_zero_outputs_rejected() {
    let err = load_error(&SyntheticPolicy::linear(4, 2).without_outputs());
    assert!(matches!(
        err,
        DriverError::Model(ModelError::MissingIo { inputs: 1, outputs: 0 })
    ));
    assert!(err.to_string().contains("no inputs/outputs"));
}

#[test]
fn test_dynamic_input_rejected() {
    let policy = SyntheticPolicy::linear(4, 2).with_input_shape(Shape::new(vec![
        Dim::Symbolic("N".into()),
        Dim::Symbolic("F".into()),
    ]));
    assert!(matches!(
        load_error(&policy),
        DriverError::Model(ModelError::UnresolvedDimension { role: Role::Input, .. })
    ));
}

#[test]
fn test_unknown_output_dim_rejected() {
    let policy = SyntheticPolicy::linear(4, 2)
        .with_output_shape(Shape::new(vec![Dim::Known(1), Dim::Unknown]));
    assert!(matches!(
        load_error(&policy),
        DriverError::Model(ModelError::UnresolvedDimension { role: Role::Output, .. })
    ));
}

#[test]
fn test_scalar_input_rejected() {
    let policy = SyntheticPolicy::linear(4, 2).with_input_shape(Shape::fixed(&[]));
    let err = load_error(&policy);
    assert!(err.to_string().contains("scalar"), "{err}");
}

#[test]
fn test_integer_input_rejected() {
    let policy = SyntheticPolicy::linear(4, 2).with_input_dtype(DType::I64);
    assert!(matches!(
        load_error(&policy),
        DriverError::Model(ModelError::UnsupportedElementType {
            role: Role::Input,
            dtype: DType::I64,
            ..
        })
    ));
}

#[test]
fn test_double_output_rejected() {
    let policy = SyntheticPolicy::linear(4, 2).with_output_dtype(DType::F64);
    assert!(matches!(
        load_error(&policy),
        DriverError::Model(ModelError::UnsupportedElementType { role: Role::Output, .. })
    ));
}

#[test]
fn test_corrupt_file_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corrupt.onnx");
    let mut bytes = SyntheticPolicy::linear(4, 2).to_bytes();
    bytes.truncate(bytes.len() / 2);
    std::fs::write(&path, bytes).unwrap();

    let mut driver = PolicyDriver::new();
    assert!(!driver.load(&path, &DriverConfig::default()));
    assert!(!driver.is_loaded());
    assert!(driver.last_error().is_some());
}

#[test]
fn test_failed_reload_leaves_driver_unloaded() {
    let dir = tempfile::tempdir().unwrap();
    let good = write(&dir, "good.onnx", &SyntheticPolicy::linear(4, 2));
    let bad = write(&dir, "bad.onnx", &SyntheticPolicy::linear(4, 2).without_outputs());

    let mut driver = PolicyDriver::new();
    assert!(driver.load(&good, &DriverConfig::default()));
    assert!(!driver.load(&bad, &DriverConfig::default()));
    assert!(!driver.is_loaded());
    assert_eq!(driver.input_name(), "");

    let mut act = [0.0f32; 2];
    assert!(!driver.run_into(&[0.0; 4], &mut act));

    assert!(driver.load(&good, &DriverConfig::default()));
    assert!(driver.last_error().is_none());
    assert!(driver.run_into(&[0.0; 4], &mut act));
}

#[test]
fn test_reload_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let policy = SyntheticPolicy::linear(45, 13);
    let path = write(&dir, "policy.onnx", &policy);
    let obs = policy.sample_observation(7);

    let mut driver = PolicyDriver::new();
    let mut first = [0.0f32; 13];
    assert!(driver.load(&path, &DriverConfig::default()));
    assert!(driver.run_into(&obs, &mut first));

    let mut second = [0.0f32; 13];
    assert!(driver.load(&path, &DriverConfig::default()));
    assert_eq!((driver.input_dim(), driver.output_dim()), (45, 13));
    assert_eq!(driver.metrics().calls, 0, "metrics reset on load");
    assert!(driver.run_into(&obs, &mut second));
    assert_eq!(first, second);
}

#[test]
fn test_reload_switches_model() {
    let dir = tempfile::tempdir().unwrap();
    let small = write(&dir, "small.onnx", &SyntheticPolicy::linear(4, 2));
    let large = write(&dir, "large.onnx", &SyntheticPolicy::linear(45, 13));

    let mut driver = PolicyDriver::new();
    assert!(driver.load(&small, &DriverConfig::default()));
    assert!(driver.load(&large, &DriverConfig::default()));
    assert_eq!((driver.input_dim(), driver.output_dim()), (45, 13));
    let mut act = [0.0f32; 2];
    assert!(!driver.run_into(&[0.0; 4], &mut act));
}

// ── Inference ──────────────────────────────────────────────────

#[test]
fn test_wrong_lengths_do_not_write() {
    let (_dir, mut driver) = loaded(&SyntheticPolicy::linear(45, 13), &DriverConfig::default());

    let mut act = [42.0f32; 13];
    assert!(!driver.run_into(&[0.0; 44], &mut act));
    assert!(!driver.run_into(&[0.0; 46], &mut act));
    assert_eq!(act, [42.0; 13]);

    let mut short = [42.0f32; 12];
    assert!(!driver.run_into(&[0.0; 45], &mut short));
    assert_eq!(short, [42.0; 12]);

    assert_eq!(
        driver.try_run(&[0.0; 45], &mut short),
        Err(RunError::ActionLength { expected: 13, got: 12 })
    );
    assert_eq!(driver.metrics().failures, 4);
    assert_eq!(driver.metrics().calls, 0);
}

#[test]
fn test_deterministic_runs() {
    let policy = SyntheticPolicy::linear(45, 13);
    let (_dir, mut driver) = loaded(&policy, &DriverConfig::default());
    let obs = policy.sample_observation(11);

    let mut first = [0.0f32; 13];
    assert!(driver.run_into(&obs, &mut first));
    for _ in 0..50 {
        let mut again = [0.0f32; 13];
        assert!(driver.run_into(&obs, &mut again));
        assert_eq!(first, again);
    }
}

#[test]
fn test_matches_host_reference() {
    let policy = SyntheticPolicy::linear(45, 13);
    let (_dir, mut driver) = loaded(&policy, &DriverConfig::default());
    let mut rng = StdRng::seed_from_u64(3);
    let mut act = [0.0f32; 13];
    for _ in 0..20 {
        let obs = random_observation(&mut rng, 45);
        assert!(driver.run_into(&obs, &mut act));
        assert_close(&act, &policy.evaluate(&obs));
    }
}

#[test]
fn test_every_config_agrees() {
    let policy = SyntheticPolicy::linear(45, 13);
    let obs = policy.sample_observation(5);
    let expected = policy.evaluate(&obs);

    for level in [
        OptimizationLevel::Disabled,
        OptimizationLevel::Basic,
        OptimizationLevel::Full,
    ] {
        for arena in [true, false] {
            let config = DriverConfig {
                optimization_level: level,
                use_memory_arena: arena,
                intra_op_threads: 2,
                inter_op_threads: 0,
            };
            let (_dir, mut driver) = loaded(&policy, &config);
            assert_eq!(driver.config().unwrap().inter_op_threads, 1);
            let mut act = [0.0f32; 13];
            for _ in 0..3 {
                assert!(driver.run_into(&obs, &mut act), "{level} arena={arena}");
                assert_close(&act, &expected);
            }
        }
    }
}

#[test]
fn test_staging_buffers_stay_in_place() {
    let policy = SyntheticPolicy::linear(45, 13);
    let obs = policy.sample_observation(8);

    for arena in [true, false] {
        let config = DriverConfig {
            use_memory_arena: arena,
            ..DriverConfig::default()
        };
        let (_dir, mut driver) = loaded(&policy, &config);
        let (input, output) = driver.staged().unwrap();
        let (input, output) = (input.as_ptr(), output.as_ptr());

        let mut act = [0.0f32; 13];
        for _ in 0..100 {
            assert!(driver.run_into(&obs, &mut act), "arena={arena}");
            let (staged_in, staged_out) = driver.staged().unwrap();
            assert_eq!(staged_in.as_ptr(), input, "arena={arena}");
            assert_eq!(staged_out.as_ptr(), output, "arena={arena}");
            assert_eq!(staged_in, obs.as_slice());
        }
    }
}

#[test]
fn test_engine_failure_after_load() {
    // Loads fine: only the first input is bound. Every run then lacks a
    // value for the second one.
    let policy = SyntheticPolicy::linear(8, 3).with_extra_input("hidden", 4);
    let obs = policy.sample_observation(1);

    for arena in [true, false] {
        let config = DriverConfig {
            use_memory_arena: arena,
            ..DriverConfig::default()
        };
        let (_dir, mut driver) = loaded(&policy, &config);
        assert_eq!(driver.input_dim(), 8);
        assert_eq!(driver.output_dim(), 3);

        let mut act = [7.0f32; 3];
        assert!(!driver.run_into(&obs, &mut act), "arena={arena}");
        assert_eq!(act, [7.0; 3]);
        assert!(matches!(
            driver.try_run(&obs, &mut act),
            Err(RunError::Engine(_))
        ));
        assert_eq!(act, [7.0; 3]);
        assert!(driver.is_loaded());
        assert_eq!(driver.metrics().calls, 0);
        assert_eq!(driver.metrics().failures, 2);
    }
}

#[test]
fn test_run_vec_resizes() {
    let policy = SyntheticPolicy::linear(6, 3);
    let (_dir, mut driver) = loaded(&policy, &DriverConfig::default());
    let obs = policy.sample_observation(2);

    let mut act = Vec::new();
    assert!(driver.run_vec(&obs, &mut act));
    assert_eq!(act.len(), 3);
    assert_close(&act, &policy.evaluate(&obs));

    let mut long = vec![5.0f32; 10];
    assert!(driver.run_vec(&obs, &mut long));
    assert_eq!(long.len(), 3);

    let mut untouched = vec![5.0f32; 10];
    assert!(!driver.run_vec(&obs[..5], &mut untouched));
    assert_eq!(untouched, vec![5.0f32; 10]);
}

#[test]
fn test_run_vec_unloaded() {
    let mut driver = PolicyDriver::new();
    let mut act = vec![1.0f32];
    assert!(!driver.run_vec(&[0.0; 3], &mut act));
    assert_eq!(act, vec![1.0]);
}

// ── Golden files ───────────────────────────────────────────────

#[test]
fn test_golden_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let policy = SyntheticPolicy::linear(45, 13);
    let model = write(&dir, "policy.onnx", &policy);

    let obs = policy.sample_observation(0);
    let obs_path = dir.path().join("golden_obs.bin");
    let act_path = dir.path().join("golden_action.bin");
    write_f32_file(&obs_path, &obs).unwrap();
    write_f32_file(&act_path, &policy.evaluate(&obs)).unwrap();

    let mut driver = PolicyDriver::new();
    assert!(driver.load(&model, &DriverConfig::default()));
    let obs = read_f32_file(&obs_path).unwrap();
    let golden = read_f32_file(&act_path).unwrap();
    assert_eq!(obs.len() as i64, driver.input_dim());
    assert_eq!(golden.len() as i64, driver.output_dim());

    let mut act = vec![0.0f32; golden.len()];
    assert!(driver.run_into(&obs, &mut act));
    assert_close(&act, &golden);
}

// ── Stress ─────────────────────────────────────────────────────

#[test]
fn test_stress_bounded_memory() {
    const ITERS: usize = 20_000;
    let policy = SyntheticPolicy::linear(45, 13);
    let (_dir, mut driver) = loaded(&policy, &DriverConfig::default());
    let mut rng = StdRng::seed_from_u64(0);
    let mut obs = vec![0.0f32; 45];
    let mut act = [0.0f32; 13];

    // Warm up so one-time engine allocations are not counted as growth.
    for _ in 0..100 {
        assert!(driver.run_into(&obs, &mut act));
    }
    let before = resource_monitor::sample();

    for i in 0..ITERS {
        for (slot, value) in obs.iter_mut().zip(random_observation(&mut rng, 45)) {
            *slot = value;
        }
        assert!(driver.run_into(&obs, &mut act), "run failed at iteration {i}");
    }

    let metrics = driver.metrics();
    assert_eq!(metrics.calls, (ITERS + 100) as u64);
    assert_eq!(metrics.failures, 0);
    assert!(metrics.min_latency.unwrap() <= metrics.max_latency);

    if let (Some(before), Some(after)) = (before, resource_monitor::sample()) {
        let growth = after.growth_since(&before);
        assert!(growth < 16 * 1024 * 1024, "RSS grew by {growth} bytes");
    }
}
