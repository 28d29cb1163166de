//! Arena geometry
//!
//! Bounds clamping, spawn placement and heading generation. Every alive
//! player stays within `[range, size - range]` on both axes.

use std::f32::consts::TAU;

use rand::Rng;

use crate::config::SimConfig;
use crate::util::vec2::{normalize_angle, Vec2};

/// Clamp each axis into the arena bounds independently.
///
/// Returns the clamped location and whether any axis was clamped.
pub fn clamp_to_bounds(location: Vec2, config: &SimConfig) -> (Vec2, bool) {
    let (lo, hi) = config.bounds();
    let mut clamped = location;
    let mut hit_wall = false;

    if clamped.x < lo {
        clamped.x = lo;
        hit_wall = true;
    }
    if clamped.y < lo {
        clamped.y = lo;
        hit_wall = true;
    }
    if clamped.x > hi {
        clamped.x = hi;
        hit_wall = true;
    }
    if clamped.y > hi {
        clamped.y = hi;
        hit_wall = true;
    }

    (clamped, hit_wall)
}

/// Whether a location satisfies the bounds invariant
pub fn in_bounds(location: Vec2, config: &SimConfig) -> bool {
    let (lo, hi) = config.bounds();
    (lo..=hi).contains(&location.x) && (lo..=hi).contains(&location.y)
}

/// Random spawn position on whole-unit coordinates inside the bounds
pub fn random_spawn_position<R: Rng + ?Sized>(config: &SimConfig, rng: &mut R) -> Vec2 {
    let (lo, hi) = config.bounds();
    let span = hi - lo;
    let x = (rng.gen::<f32>() * span + lo).floor();
    let y = (rng.gen::<f32>() * span + lo).floor();
    // floor() can drop below lo when lo is fractional
    Vec2::new(x.clamp(lo, hi), y.clamp(lo, hi))
}

/// Uniform random heading in [0, 2π)
pub fn random_heading<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    normalize_angle(rng.gen::<f32>() * TAU)
}
