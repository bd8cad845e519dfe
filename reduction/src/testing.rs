//! Testing utilities for the reduction crate.

#![allow(dead_code)]

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::image::Image;

/// Initialize tracing subscriber for tests.
/// Safe to call multiple times - will only initialize once.
/// Respects RUST_LOG env var, defaults to "info".
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// `planes` identical data planes of `value`, each with a constant `error` plane.
pub fn constant_stack(
    planes: usize,
    width: usize,
    height: usize,
    value: f64,
    error: f64,
) -> (Vec<Image>, Vec<Image>) {
    let data = vec![Image::new_filled(width, height, value); planes];
    let errors = vec![Image::new_filled(width, height, error); planes];
    (data, errors)
}

/// Uniform noise around `level` with amplitude `spread`, constant `error` planes.
pub fn noisy_stack(
    seed: u64,
    planes: usize,
    width: usize,
    height: usize,
    level: f64,
    spread: f64,
    error: f64,
) -> (Vec<Image>, Vec<Image>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let data = (0..planes)
        .map(|_| {
            let pixels = (0..width * height)
                .map(|_| level + rng.random_range(-spread..spread))
                .collect();
            Image::from_pixels(width, height, pixels)
        })
        .collect();
    let errors = vec![Image::new_filled(width, height, error); planes];
    (data, errors)
}

pub fn assert_close(actual: f64, expected: f64, tol: f64, what: &str) {
    assert!(
        (actual - expected).abs() <= tol,
        "{what}: expected {expected}, got {actual}"
    );
}
