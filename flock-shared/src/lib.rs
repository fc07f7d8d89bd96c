use serde::{Deserialize, Serialize};

/// The 5-field numeric record exchanged between the coordinator and workers.
///
/// The same record shape serves phase-1 broadcasts, phase-2 work assignments
/// and phase-2 results; only the channel it travels on differs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoidState {
    pub id: u32,
    pub pos_x: f64,
    pub pos_y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
}

impl BoidState {
    pub fn new(id: u32, pos_x: f64, pos_y: f64, vel_x: f64, vel_y: f64) -> Self {
        Self {
            id,
            pos_x,
            pos_y,
            vel_x,
            vel_y,
        }
    }

    /// Pack into the flat wire layout `[id, pos.x, pos.y, vel.x, vel.y]`.
    pub fn to_array(&self) -> [f64; 5] {
        [
            self.id as f64,
            self.pos_x,
            self.pos_y,
            self.vel_x,
            self.vel_y,
        ]
    }

    /// Unpack from the flat wire layout.
    pub fn from_array(buf: [f64; 5]) -> Self {
        Self {
            id: buf[0] as u32,
            pos_x: buf[1],
            pos_y: buf[2],
            vel_x: buf[3],
            vel_y: buf[4],
        }
    }
}

/// Resolved simulation configuration.
///
/// Defaults match the reference run: 20 boids, 500 ticks, K=6, max speed 10,
/// max acceleration 2.5, 500x500 arena.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Number of boids in the population
    pub boids: usize,
    /// Number of simulation ticks to run
    pub loops: usize,
    /// Nearest neighbors considered per boid
    pub k: usize,
    /// Maximum boid speed
    pub max_speed: f64,
    /// Maximum boid acceleration per tick
    pub accel: f64,
    /// Arena width
    pub width: u32,
    /// Arena height
    pub height: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            boids: 20,
            loops: 500,
            k: 6,
            max_speed: 10.0,
            accel: 2.5,
            width: 500,
            height: 500,
        }
    }
}

impl SimConfig {
    /// K clamped to the population size minus one. Configuring K at or above
    /// the population is not an error; neighbor selection simply cannot
    /// return more candidates than exist.
    pub fn effective_k(&self) -> usize {
        if self.k >= self.boids {
            self.boids.saturating_sub(1)
        } else {
            self.k
        }
    }

    /// The delimited run-start report emitted once, before the first tick.
    pub fn header(&self) -> String {
        format!(
            "#header\nboids:{};loops:{};k:{};maxv:{:.6};acc:{:.6};width:{};height:{}\n#endheader",
            self.boids,
            self.loops,
            self.effective_k(),
            self.max_speed,
            self.accel,
            self.width,
            self.height
        )
    }
}
