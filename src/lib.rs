//! Point of No Return - a top-down action game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, combat, spawning, scrolling)
//! - `assets`: Animation loading from disk
//! - `render`: Per-tick draw description consumed by a frontend
//! - `tuning`: Data-driven game balance
//! - `settings`: Presentation settings and key bindings

pub mod assets;
pub mod render;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::{KeyMap, Settings};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Screen dimensions (pixels)
    pub const SCREEN_WIDTH: f32 = 800.0;
    pub const SCREEN_HEIGHT: f32 = 600.0;

    /// Fixed simulation rate (ticks per second)
    pub const TICK_RATE: u32 = 60;

    /// Max speeds in pixels per second
    pub const PLAYER_SPEED: f32 = 150.0;
    pub const DEMON_SPEED: f32 = 150.0;

    pub const PLAYER_HEALTH: i32 = 5;
    pub const DEMON_HEALTH: i32 = 2;

    /// Post-hit invincibility window (seconds)
    pub const INVINCIBILITY_TIME: f32 = 1.0;
    /// Blink interval while invincible (seconds)
    pub const TRANSPARENT_TIME: f32 = 1.0 / 6.0;
    /// Render alpha on the dimmed half of a blink
    pub const INVINCIBILITY_ALPHA: u8 = 100;

    /// Knockback duration (seconds) and total displacement (pixels)
    pub const KNOCKBACK_TIME: f32 = 0.25;
    pub const KNOCKBACK_DIST: f32 = 70.0;

    /// Lighting
    pub const DARKNESS: u8 = 230;
    pub const LIGHT: u8 = 200;
    pub const LIGHT_SIZE: f32 = 175.0;

    /// Demon spawning
    pub const DEMON_SPAWN_TIME_MS: u32 = 3000;
    pub const DEMON_MIN_SPAWN_DIST: f32 = 20.0;
    pub const DEMON_MAX_SPAWN_DIST: f32 = 100.0;
    /// Demon speed multiplier while the player is invincible
    pub const DEMON_SLOW_SCALE: f32 = 0.5;

    /// Obstacle spawning
    pub const OBSTACLE_SPAWN_TRIGGER_DIST: f32 = SCREEN_HEIGHT / 2.0 - 100.0;
    pub const OBSTACLE_MIN_SPAWN_DIST: f32 = 50.0;
    pub const OBSTACLE_MAX_SPAWN_DIST: f32 = 200.0;
    pub const OBSTACLE_FPS: f32 = 4.0;

    pub const SCORE_PER_DEMON: u64 = 100;
}

/// Angle of a vector in degrees, screen coordinates (y grows downward)
#[inline]
pub fn angle_degrees(v: Vec2) -> f32 {
    v.y.atan2(v.x).to_degrees()
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}
