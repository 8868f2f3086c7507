//! Data-driven game balance
//!
//! Every gameplay number the simulation reads lives here. Defaults come from
//! [`crate::consts`]; a JSON file may override any subset of fields.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid tuning json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// Gameplay balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub screen_width: f32,
    pub screen_height: f32,
    pub tick_rate: u32,

    pub player_speed: f32,
    pub player_health: i32,
    pub demon_speed: f32,
    pub demon_health: i32,

    /// Seconds of invincibility after a hit
    pub invincibility_time: f32,
    /// Seconds per blink half-cycle while invincible
    pub transparent_time: f32,
    pub knockback_time: f32,
    pub knockback_dist: f32,

    pub demon_spawn_time_ms: u32,
    pub demon_min_spawn_dist: f32,
    pub demon_max_spawn_dist: f32,
    pub demon_slow_scale: f32,

    pub obstacle_trigger_dist: f32,
    pub obstacle_min_spawn_dist: f32,
    pub obstacle_max_spawn_dist: f32,

    pub score_per_demon: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            screen_width: SCREEN_WIDTH,
            screen_height: SCREEN_HEIGHT,
            tick_rate: TICK_RATE,

            player_speed: PLAYER_SPEED,
            player_health: PLAYER_HEALTH,
            demon_speed: DEMON_SPEED,
            demon_health: DEMON_HEALTH,

            invincibility_time: INVINCIBILITY_TIME,
            transparent_time: TRANSPARENT_TIME,
            knockback_time: KNOCKBACK_TIME,
            knockback_dist: KNOCKBACK_DIST,

            demon_spawn_time_ms: DEMON_SPAWN_TIME_MS,
            demon_min_spawn_dist: DEMON_MIN_SPAWN_DIST,
            demon_max_spawn_dist: DEMON_MAX_SPAWN_DIST,
            demon_slow_scale: DEMON_SLOW_SCALE,

            obstacle_trigger_dist: OBSTACLE_SPAWN_TRIGGER_DIST,
            obstacle_min_spawn_dist: OBSTACLE_MIN_SPAWN_DIST,
            obstacle_max_spawn_dist: OBSTACLE_MAX_SPAWN_DIST,

            score_per_demon: SCORE_PER_DEMON,
        }
    }
}

impl Tuning {
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        let invalid = |msg: String| Err(TuningError::Invalid(msg));
        if self.tick_rate == 0 {
            return invalid("tick_rate must be at least 1".into());
        }
        if !(self.screen_width > 0.0 && self.screen_height > 0.0) {
            return invalid(format!(
                "screen size must be positive (got {}x{})",
                self.screen_width, self.screen_height
            ));
        }
        let bands = [
            ("demon", self.demon_min_spawn_dist, self.demon_max_spawn_dist),
            ("obstacle", self.obstacle_min_spawn_dist, self.obstacle_max_spawn_dist),
        ];
        for (name, min, max) in bands {
            if !(min >= 0.0 && min <= max) {
                return invalid(format!("{name} spawn band {min}..{max} is empty or negative"));
            }
        }
        if self.player_health <= 0 || self.demon_health <= 0 {
            return invalid("health values must be positive".into());
        }
        let non_negative = [
            ("player_speed", self.player_speed),
            ("demon_speed", self.demon_speed),
            ("invincibility_time", self.invincibility_time),
            ("transparent_time", self.transparent_time),
            ("knockback_time", self.knockback_time),
            ("knockback_dist", self.knockback_dist),
            ("demon_slow_scale", self.demon_slow_scale),
        ];
        if let Some((name, value)) = non_negative.iter().find(|(_, v)| !(*v >= 0.0)) {
            return invalid(format!("{name} must be non-negative (got {value})"));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load tuning overrides from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Convert a duration in seconds to whole ticks
    #[inline]
    pub fn seconds_to_ticks(&self, seconds: f32) -> u32 {
        (seconds * self.tick_rate as f32).round() as u32
    }

    /// Pixels per tick at the given max speed
    #[inline]
    pub fn frame_speed(&self, speed: f32) -> f32 {
        speed / self.tick_rate as f32
    }

    pub fn invincibility_ticks(&self) -> u32 {
        self.seconds_to_ticks(self.invincibility_time)
    }

    pub fn knockback_ticks(&self) -> u32 {
        self.seconds_to_ticks(self.knockback_time)
    }

    /// Ticks per blink half-cycle (never zero)
    pub fn blink_ticks(&self) -> u32 {
        self.seconds_to_ticks(self.transparent_time).max(1)
    }

    pub fn demon_spawn_interval_ticks(&self) -> u32 {
        ((self.demon_spawn_time_ms as u64 * self.tick_rate as u64) / 1000).max(1) as u32
    }
}
