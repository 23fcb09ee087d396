//! Tests for configuration validation.
//!
//! These tests verify that invalid configuration values are rejected
//! by the builder methods with appropriate panic messages.

use mwc::{Config, Inference};

// =============================================================================
// SAMPLING
// =============================================================================

#[test]
#[should_panic(expected = "chains must be > 0")]
fn chains_zero_panics() {
    let _ = Inference::new().chains(0);
}

#[test]
fn chains_one_valid() {
    let inference = Inference::new().chains(1);
    assert_eq!(inference.config().chains, 1);
}

#[test]
#[should_panic(expected = "draws must be > 0")]
fn draws_zero_panics() {
    let _ = Inference::new().draws(0);
}

#[test]
fn warmup_zero_valid() {
    // No adaptation, the sampler keeps its initial step size
    let inference = Inference::new().warmup(0);
    assert_eq!(inference.config().warmup, 0);
}

#[test]
#[should_panic(expected = "hpd_mass must be in (0, 1)")]
fn hpd_mass_zero_panics() {
    let _ = Inference::new().hpd_mass(0.0);
}

#[test]
#[should_panic(expected = "hpd_mass must be in (0, 1)")]
fn hpd_mass_one_panics() {
    let _ = Inference::new().hpd_mass(1.0);
}

#[test]
fn hpd_mass_valid() {
    let inference = Inference::new().hpd_mass(0.89);
    assert_eq!(inference.config().hpd_mass, 0.89);
}

// =============================================================================
// OPTIMIZATION
// =============================================================================

#[test]
#[should_panic(expected = "max_iterations must be > 0")]
fn max_iterations_zero_panics() {
    let _ = Inference::new().max_iterations(0);
}

#[test]
#[should_panic(expected = "tolerance must be positive and finite")]
fn tolerance_negative_panics() {
    let _ = Inference::new().tolerance(-1e-6);
}

#[test]
#[should_panic(expected = "tolerance must be positive and finite")]
fn tolerance_nan_panics() {
    let _ = Inference::new().tolerance(f64::NAN);
}

// =============================================================================
// COMPOSITION
// =============================================================================

#[test]
fn builder_chain_sets_every_field() {
    let inference = Inference::new()
        .chains(2)
        .warmup(100)
        .draws(300)
        .seed(99)
        .hpd_mass(0.9)
        .max_iterations(200)
        .tolerance(1e-6)
        .restarts(0)
        .parallel(false);
    let expected = Config {
        chains: 2,
        warmup: 100,
        draws: 300,
        seed: 99,
        hpd_mass: 0.9,
        max_iterations: 200,
        tolerance: 1e-6,
        restarts: 0,
        parallel: false,
        ..Config::default()
    };
    assert_eq!(inference.config(), &expected);
}

#[test]
fn with_config_round_trips() {
    let config = Config {
        draws: 10,
        ..Config::default()
    };
    assert_eq!(Inference::with_config(config.clone()).config(), &config);
}
