use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Per-player tuning knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Lives the player starts with (default: 1).
    pub initial_lives: u32,
    /// Baseline absolute velocity cap per axis.
    pub max_velocity: Vec2,
    /// Factor applied to the velocity cap while invincible (default: 1.5).
    pub invincibility_velocity_multiplier: f32,
    /// Horizontal speed for move commands.
    pub move_speed: f32,
    /// Vertical speed given by a jump.
    pub jump_speed: f32,
    /// Vertical speed while climbing a ladder.
    pub climb_speed: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            initial_lives: 1,
            max_velocity: Vec2::new(4.0, 8.0),
            invincibility_velocity_multiplier: 1.5,
            move_speed: 3.0,
            jump_speed: 6.0,
            climb_speed: 2.0,
        }
    }
}

/// Configuration for a simulation space.
///
/// Coordinates are y-up in world units; the level occupies
/// `[0, world_width] x [0, world_height]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// Gravity vector (default: `(0, -9.81)`).
    pub gravity: Vec2,
    /// World width in world units.
    pub world_width: f32,
    /// World height in world units.
    pub world_height: f32,
    /// Distance within which a contact point counts as lying on an edge.
    pub contact_tolerance: f32,
    /// Ticks of invulnerability after the player is hit.
    pub hit_cooldown_ticks: u32,
    /// Ticks an invincibility power-up lasts.
    pub invincibility_ticks: u32,
    /// Upper bound on ticks run to catch up with a slow frame.
    pub max_catch_up_ticks: u32,
    pub player: PlayerTuning,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            gravity: Vec2::new(0.0, -9.81),
            world_width: 100.0,
            world_height: 50.0,
            contact_tolerance: 0.03,
            hit_cooldown_ticks: 60,
            invincibility_ticks: 400,
            max_catch_up_ticks: 10,
            player: PlayerTuning::default(),
        }
    }
}

impl SimulationConfig {
    /// Parse a configuration from a JSON string. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_world_size(mut self, width: f32, height: f32) -> Self {
        self.world_width = width;
        self.world_height = height;
        self
    }

    pub fn with_initial_lives(mut self, lives: u32) -> Self {
        self.player.initial_lives = lives;
        self
    }

    /// Whether `pos` lies inside the level rectangle.
    pub fn contains(&self, pos: Vec2) -> bool {
        pos.x >= 0.0 && pos.y >= 0.0 && pos.x <= self.world_width && pos.y <= self.world_height
    }
}
