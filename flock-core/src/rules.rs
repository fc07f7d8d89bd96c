//! The four flocking rules and the per-tick velocity/position update.

use crate::neighbors::NeighborEntry;
use crate::{Boid, Vector2D};

/// Tunable parameters for the rule engine.
#[derive(Debug, Clone, Copy)]
pub struct RuleParams {
    /// Numerator weight of the cohesion term, applied over a fixed /100 divisor
    pub cohesion_weight: f64,
    /// Distance below which a neighbor starts repelling the subject
    pub min_separation: f64,
    /// Per-neighbor divisor of the alignment term (the sum is divided by K times this)
    pub alignment_divisor: f64,
    pub max_speed: f64,
    pub max_accel: f64,
    pub arena_width: f64,
    pub arena_height: f64,
}

impl Default for RuleParams {
    fn default() -> Self {
        Self {
            cohesion_weight: 1.0,
            min_separation: 10.0,
            alignment_divisor: 8.0,
            max_speed: 10.0,
            max_accel: 2.5,
            arena_width: 500.0,
            arena_height: 500.0,
        }
    }
}

/// Rule 1: steer toward the perceived local center of mass.
pub fn cohesion(boid: &Boid, neighbors: &[NeighborEntry], weight: f64) -> Vector2D {
    if neighbors.is_empty() {
        return Vector2D::zero();
    }
    let mut center = Vector2D::zero();
    for entry in neighbors {
        center += entry.boid.position;
    }
    center = center / neighbors.len() as f64;
    (center - boid.position) * (weight / 100.0)
}

/// Rule 2: repel from neighbors closer than the separation threshold.
///
/// Each offending neighbor contributes a push away from it, scaled inversely
/// by its distance. At distance exactly zero there is no direction left to
/// scale, so the term falls back to unit scale instead of dividing by zero.
pub fn separation(boid: &Boid, neighbors: &[NeighborEntry], min_separation: f64) -> Vector2D {
    let mut push = Vector2D::zero();
    for entry in neighbors {
        if entry.distance < min_separation {
            let away = boid.position - entry.boid.position;
            push += if entry.distance > 0.0 {
                away / entry.distance
            } else {
                away
            };
        }
    }
    push
}

/// Rule 3: steer toward the average heading of the neighbors.
pub fn alignment(neighbors: &[NeighborEntry], divisor: f64) -> Vector2D {
    if neighbors.is_empty() {
        return Vector2D::zero();
    }
    let mut sum = Vector2D::zero();
    for entry in neighbors {
        sum += entry.boid.velocity;
    }
    sum / (neighbors.len() as f64 * divisor)
}

/// Rule 4: wrap the position back into the arena (toroidal bounds).
///
/// This is a positional correction, not a steering force; it contributes
/// nothing to the composed acceleration. A steer-away-from-edge variant was
/// considered for this rule and rejected in favor of the hard wrap.
pub fn wrap_bounds(boid: &mut Boid, width: f64, height: f64) {
    if boid.position.x < 0.0 || boid.position.x >= width {
        boid.position.x = boid.position.x.rem_euclid(width);
    }
    if boid.position.y < 0.0 || boid.position.y >= height {
        boid.position.y = boid.position.y.rem_euclid(height);
    }
}

/// Apply all four rules to `boid` and integrate one simulation step.
///
/// The order is load-bearing: compose the accelerations, clamp the sum to
/// `max_accel`, add it to the velocity, clamp the velocity to `max_speed`,
/// then add the velocity to the position.
pub fn update(boid: &mut Boid, neighbors: &[NeighborEntry], params: &RuleParams) {
    let mut accel = Vector2D::zero();
    accel += cohesion(boid, neighbors, params.cohesion_weight);
    accel += separation(boid, neighbors, params.min_separation);
    accel += alignment(neighbors, params.alignment_divisor);
    wrap_bounds(boid, params.arena_width, params.arena_height);

    accel = accel.limit(params.max_accel);
    boid.velocity += accel;
    boid.velocity = boid.velocity.limit(params.max_speed);
    boid.position += boid.velocity;
}
