//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one tick per frame)
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod animation;
pub mod collision;
pub mod controller;
pub mod entity;
pub mod events;
pub mod spawn;
pub mod state;
pub mod tick;

pub use animation::{AnimKey, Animation, AnimationSet, Facing, Frame};
pub use collision::{Rect, classify_weapon_pixel, mask_overlap};
pub use controller::{DemonController, PlayerController, PlayerInput, PlayerIntent, ScrollController, autopilot};
pub use entity::{Combat, CombatParams, Entity, EntityKind, Movement, ObstacleQuery, OpenGround};
pub use events::{EventQueue, GameEvent, GameRequest, SpawnTimer};
pub use spawn::SpawnSide;
pub use state::{GamePhase, GameState};
pub use tick::{TickInput, tick};
