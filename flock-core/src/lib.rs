pub mod neighbors;
pub mod rules;

pub use neighbors::{k_nearest, NeighborEntry, NeighborQueue};

use rand::Rng;

/// A 2D vector used for position and velocity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Scale the vector down to `max` magnitude, preserving direction.
    /// Vectors at or below the limit are returned unchanged.
    pub fn limit(&self, max: f64) -> Self {
        let mag = self.magnitude();
        if mag > max {
            *self * (max / mag)
        } else {
            *self
        }
    }

    pub fn distance(&self, other: &Vector2D) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl core::ops::Add for Vector2D {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl core::ops::Sub for Vector2D {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl core::ops::Mul<f64> for Vector2D {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

impl core::ops::Div<f64> for Vector2D {
    type Output = Self;

    fn div(self, scalar: f64) -> Self {
        Self {
            x: self.x / scalar,
            y: self.y / scalar,
        }
    }
}

impl core::ops::AddAssign for Vector2D {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

/// A single flocking agent.
///
/// Ids are assigned once at simulation start and stay stable across ticks;
/// position and velocity are mutated in place by the rule engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Boid {
    pub id: u32,
    pub position: Vector2D,
    pub velocity: Vector2D,
}

impl Boid {
    pub fn new(id: u32, position: Vector2D, velocity: Vector2D) -> Self {
        Self {
            id,
            position,
            velocity,
        }
    }

    /// Create a boid at a random position inside the arena with a randomly
    /// directed velocity bounded by `max_speed`.
    pub fn random(id: u32, width: f64, height: f64, max_speed: f64) -> Self {
        let mut rng = rand::thread_rng();
        let position = Vector2D::new(rng.gen_range(0.0..width), rng.gen_range(0.0..height));
        let speed = rng.gen_range(0.0..max_speed);
        let heading = rng.gen_range(0.0..std::f64::consts::TAU);
        let velocity = Vector2D::new(speed * heading.cos(), speed * heading.sin());
        Self::new(id, position, velocity)
    }
}
