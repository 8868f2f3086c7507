//! Entities and their per-tick state machines
//!
//! There is one entity struct. Capabilities are optional components:
//! - [`Movement`]: intended direction, facing, speed
//! - [`Combat`]: health, attack window, invincibility, knockback
//!
//! Players carry both (plus attack animations), demons carry both without
//! attacks, obstacles carry neither.

use std::sync::Arc;

use glam::{IVec2, Vec2};

use super::animation::{AnimKey, Animation, AnimationSet, Facing, Frame};
use super::collision::Rect;
use crate::assets::AssetError;
use crate::tuning::Tuning;

/// What an entity is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Player,
    Demon,
    Obstacle,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Player => "player",
            EntityKind::Demon => "demon",
            EntityKind::Obstacle => "obstacle",
        }
    }
}

/// Movement capability
#[derive(Debug, Clone)]
pub struct Movement {
    /// Max speed in pixels per tick
    pub frame_speed: f32,
    /// Intended velocity as a fraction of max speed, per axis
    ///
    /// Components are nominally in [-1, 1] but larger magnitudes are accepted
    /// and move the entity proportionally faster.
    pub direction: Vec2,
    pub facing: Facing,
}

/// Timing parameters for combat, in ticks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombatParams {
    pub invincibility_ticks: u32,
    pub knockback_ticks: u32,
    /// Total knockback displacement in pixels
    pub knockback_dist: f32,
    pub blink_ticks: u32,
}

impl CombatParams {
    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self {
            invincibility_ticks: tuning.invincibility_ticks(),
            knockback_ticks: tuning.knockback_ticks(),
            knockback_dist: tuning.knockback_dist,
            blink_ticks: tuning.blink_ticks(),
        }
    }
}

/// Combat capability
#[derive(Debug, Clone)]
pub struct Combat {
    pub health: i32,
    pub attacking: bool,
    pub invincibility_remaining: u32,
    pub knockback_remaining: u32,
    pub knockback_direction: Vec2,
    /// Dimmed half of the invincibility blink
    pub transparent: bool,
    pub params: CombatParams,
}

impl Combat {
    pub fn new(health: i32, params: CombatParams) -> Self {
        Self {
            health,
            attacking: false,
            invincibility_remaining: 0,
            knockback_remaining: 0,
            knockback_direction: Vec2::ZERO,
            transparent: false,
            params,
        }
    }

    #[inline]
    pub fn is_invincible(&self) -> bool {
        self.invincibility_remaining > 0
    }

    #[inline]
    pub fn in_knockback(&self) -> bool {
        self.knockback_remaining > 0
    }

    /// Take one hit from an attack arriving along `origin`
    ///
    /// Returns false (and changes nothing) while invincible. A zero `origin`
    /// yields no knockback displacement; callers substitute the attacker's
    /// facing vector before getting here.
    pub fn damage(&mut self, origin: Vec2) -> bool {
        if self.is_invincible() {
            return false;
        }
        self.health -= 1;
        self.invincibility_remaining = self.params.invincibility_ticks;
        self.knockback_direction = origin.try_normalize().unwrap_or(Vec2::ZERO);
        self.knockback_remaining = self.params.knockback_ticks;
        true
    }

    /// Advance knockback one tick, returning the extra direction to apply
    fn tick_knockback(&mut self, frame_speed: f32) -> Vec2 {
        if self.knockback_remaining == 0 {
            return Vec2::ZERO;
        }
        self.knockback_remaining -= 1;
        if self.params.knockback_ticks == 0 || frame_speed <= 0.0 {
            return Vec2::ZERO;
        }
        let pixels_per_tick = self.params.knockback_dist / self.params.knockback_ticks as f32;
        self.knockback_direction * (pixels_per_tick / frame_speed)
    }

    fn tick_invincibility(&mut self) {
        if self.invincibility_remaining > 0 {
            self.invincibility_remaining -= 1;
        }
        self.transparent = self.invincibility_remaining > 0
            && (self.invincibility_remaining / self.params.blink_ticks.max(1)) % 2 == 1;
    }
}

/// Read-only view of the terrain an entity moves through
pub trait ObstacleQuery {
    /// Whether vertical motion `dy` is blocked for an entity occupying `bounds`
    fn blocks_vertical(&self, bounds: &Rect, dy: f32) -> bool;
}

/// Terrain with nothing in it
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenGround;

impl ObstacleQuery for OpenGround {
    fn blocks_vertical(&self, _bounds: &Rect, _dy: f32) -> bool {
        false
    }
}

impl ObstacleQuery for [Entity] {
    fn blocks_vertical(&self, bounds: &Rect, dy: f32) -> bool {
        self.iter()
            .filter(|e| e.kind == EntityKind::Obstacle)
            .any(|o| ledge_blocks(bounds, &o.bounds(), dy))
    }
}

/// Ledge rule between a mover and one obstacle
///
/// When the mover's bottom edge is within a quarter of its own height of the
/// obstacle's bottom edge (and they share horizontal extent), vertical motion
/// toward that edge is blocked. Motion away from it is free.
pub fn ledge_blocks(mover: &Rect, obstacle: &Rect, dy: f32) -> bool {
    if dy == 0.0 || !mover.overlaps_x(obstacle) {
        return false;
    }
    let gap = mover.bottom() - obstacle.bottom();
    if gap.abs() > mover.height() * 0.25 {
        return false;
    }
    (gap < 0.0 && dy > 0.0) || (gap > 0.0 && dy < 0.0)
}

/// A simulated actor
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    /// Center of the current frame
    pub pos: Vec2,
    /// Draw order, derived from the bottom edge
    pub layer: i32,
    pub movement: Option<Movement>,
    pub combat: Option<Combat>,
    animations: Arc<AnimationSet>,
    anim_key: AnimKey,
    anim_counter: u32,
    frame_index: usize,
}

impl Entity {
    fn base(kind: EntityKind, pos: Vec2, animations: Arc<AnimationSet>) -> Result<Self, AssetError> {
        if animations.stills.frame_count() == 0 {
            return Err(AssetError::MissingAnimation {
                entity: kind.as_str(),
                variant: "stills",
            });
        }
        let mut entity = Self {
            id: 0,
            kind,
            pos,
            layer: 0,
            movement: None,
            combat: None,
            animations,
            anim_key: AnimKey::Stills,
            anim_counter: 0,
            frame_index: 0,
        };
        entity.refresh_layer();
        Ok(entity)
    }

    fn require_walk(kind: EntityKind, animations: &AnimationSet) -> Result<(), AssetError> {
        let ok = animations.has_walk()
            && Facing::ALL
                .iter()
                .all(|&f| animations.get(AnimKey::Walk(f)).frame_count() > 0);
        if ok {
            Ok(())
        } else {
            Err(AssetError::MissingAnimation {
                entity: kind.as_str(),
                variant: "walk",
            })
        }
    }

    /// The player: moves, attacks, takes damage
    pub fn player(pos: Vec2, animations: Arc<AnimationSet>, tuning: &Tuning) -> Result<Self, AssetError> {
        Self::require_walk(EntityKind::Player, &animations)?;
        let attacks_ok = animations.has_attacks()
            && Facing::ALL
                .iter()
                .all(|&f| animations.get(AnimKey::Attack(f)).frame_count() > 0);
        if !attacks_ok {
            return Err(AssetError::MissingAnimation {
                entity: "player",
                variant: "attack",
            });
        }
        let mut e = Self::base(EntityKind::Player, pos, animations)?;
        e.movement = Some(Movement {
            frame_speed: tuning.frame_speed(tuning.player_speed),
            direction: Vec2::ZERO,
            facing: Facing::Up,
        });
        e.combat = Some(Combat::new(tuning.player_health, CombatParams::from_tuning(tuning)));
        e.anim_key = AnimKey::Still(Facing::Up);
        Ok(e)
    }

    /// A demon: chases the player, takes damage
    pub fn demon(pos: Vec2, animations: Arc<AnimationSet>, tuning: &Tuning) -> Result<Self, AssetError> {
        Self::require_walk(EntityKind::Demon, &animations)?;
        let mut e = Self::base(EntityKind::Demon, pos, animations)?;
        e.movement = Some(Movement {
            frame_speed: tuning.frame_speed(tuning.demon_speed),
            direction: Vec2::ZERO,
            facing: Facing::Up,
        });
        e.combat = Some(Combat::new(tuning.demon_health, CombatParams::from_tuning(tuning)));
        e.anim_key = AnimKey::Still(Facing::Up);
        Ok(e)
    }

    /// A static obstacle
    pub fn obstacle(pos: Vec2, animations: Arc<AnimationSet>) -> Result<Self, AssetError> {
        Self::base(EntityKind::Obstacle, pos, animations)
    }

    // --- Queries ---

    pub fn current_animation(&self) -> &Animation {
        self.animations.get(self.anim_key)
    }

    pub fn anim_key(&self) -> AnimKey {
        self.anim_key
    }

    /// Index of the frame currently shown
    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    pub fn anim_counter(&self) -> u32 {
        self.anim_counter
    }

    pub fn current_frame(&self) -> &Frame {
        let anim = self.current_animation();
        &anim.frames[self.frame_index.min(anim.frame_count() - 1)]
    }

    /// Art offset of the frame currently shown
    pub fn frame_offset(&self) -> Vec2 {
        self.current_animation()
            .offsets
            .get(self.frame_index)
            .copied()
            .unwrap_or(Vec2::ZERO)
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_center(self.pos, self.current_frame().size())
    }

    /// Integer top-left corner used for pixel-mask tests and blitting
    pub fn top_left(&self) -> IVec2 {
        (self.pos - self.current_frame().size() / 2.0).round().as_ivec2()
    }

    /// Point the art treats as the character's anchor (light source)
    pub fn anchor(&self) -> Vec2 {
        self.bounds().min + self.frame_offset()
    }

    pub fn direction(&self) -> Vec2 {
        self.movement.as_ref().map_or(Vec2::ZERO, |m| m.direction)
    }

    pub fn facing(&self) -> Facing {
        self.movement.as_ref().map_or(Facing::Up, |m| m.facing)
    }

    pub fn frame_speed(&self) -> f32 {
        self.movement.as_ref().map_or(0.0, |m| m.frame_speed)
    }

    pub fn health(&self) -> i32 {
        self.combat.as_ref().map_or(0, |c| c.health)
    }

    pub fn is_dead(&self) -> bool {
        self.combat.as_ref().is_some_and(|c| c.health <= 0)
    }

    pub fn is_attacking(&self) -> bool {
        self.combat.as_ref().is_some_and(|c| c.attacking)
    }

    pub fn is_invincible(&self) -> bool {
        self.combat.as_ref().is_some_and(|c| c.is_invincible())
    }

    pub fn in_knockback(&self) -> bool {
        self.combat.as_ref().is_some_and(|c| c.in_knockback())
    }

    /// Render alpha: dimmed on the blink's off half
    pub fn alpha(&self, dimmed: u8) -> u8 {
        if self.combat.as_ref().is_some_and(|c| c.transparent) {
            dimmed
        } else {
            255
        }
    }

    // --- Commands ---

    /// Set the intended direction for the next update
    pub fn set_direction(&mut self, direction: Vec2) {
        let attacking = self.is_attacking();
        if let Some(m) = &mut self.movement {
            m.direction = if attacking { Vec2::ZERO } else { direction };
        }
    }

    /// Start an attack, optionally turning to face `facing` first
    ///
    /// Ignored while already attacking or if this entity cannot attack.
    pub fn attack(&mut self, facing: Option<Facing>) -> bool {
        if !self.animations.has_attacks() {
            return false;
        }
        let (Some(m), Some(c)) = (&mut self.movement, &mut self.combat) else {
            return false;
        };
        if c.attacking {
            return false;
        }
        if let Some(f) = facing {
            m.facing = f;
        }
        m.direction = Vec2::ZERO;
        c.attacking = true;
        self.anim_counter = 0;
        true
    }

    /// Take a hit; see [`Combat::damage`]
    pub fn damage(&mut self, origin: Vec2) -> bool {
        let hit = self.combat.as_mut().is_some_and(|c| c.damage(origin));
        if hit {
            log::trace!(
                "{} {} hit, health now {}",
                self.kind.as_str(),
                self.id,
                self.health()
            );
        }
        hit
    }

    /// Shift position without affecting direction or animation
    pub fn displace(&mut self, delta: Vec2) {
        self.pos += delta;
    }

    pub fn refresh_layer(&mut self) {
        self.layer = self.bounds().bottom().round() as i32;
    }

    /// Advance one tick: facing, knockback, ledge gating, timers, animation, motion
    pub fn update<Q: ObstacleQuery + ?Sized>(&mut self, obstacles: &Q) {
        let bounds = self.bounds();
        let mut step = Vec2::ZERO;

        if let Some(m) = &mut self.movement {
            let (attacking, locked) = self
                .combat
                .as_ref()
                .map_or((false, false), |c| (c.attacking, c.attacking || c.in_knockback()));
            if attacking {
                m.direction = Vec2::ZERO;
            }
            if !locked {
                if let Some(f) = Facing::from_direction(m.direction) {
                    m.facing = f;
                }
            }

            let mut effective = m.direction;
            if let Some(c) = &mut self.combat {
                effective += c.tick_knockback(m.frame_speed);
            }

            if obstacles.blocks_vertical(&bounds, effective.y) {
                effective.y = 0.0;
                m.direction.y = 0.0;
            }
            step = effective * m.frame_speed;
        }

        if let Some(c) = &mut self.combat {
            c.tick_invincibility();
        }

        self.advance_animation();
        self.pos += step;

        let loop_ticks = self.current_animation().loop_ticks();
        if let Some(c) = &mut self.combat {
            if c.attacking && self.anim_counter == loop_ticks {
                c.attacking = false;
            }
        }
    }

    fn resolve_anim_key(&self) -> AnimKey {
        let Some(m) = &self.movement else {
            return AnimKey::Stills;
        };
        if self.is_attacking() {
            AnimKey::Attack(m.facing)
        } else if m.direction == Vec2::ZERO {
            AnimKey::Still(m.facing)
        } else {
            AnimKey::Walk(m.facing)
        }
    }

    /// Select this tick's frame and keep the art anchored across the switch
    fn advance_animation(&mut self) {
        let prev_offset = self.frame_offset();
        let animations = Arc::clone(&self.animations);

        self.anim_key = self.resolve_anim_key();
        let anim = animations.get(self.anim_key);
        if self.anim_counter >= anim.loop_ticks() {
            self.anim_counter = 0;
        }
        self.frame_index = anim.frame_index(self.anim_counter);
        let new_offset = anim.offsets.get(self.frame_index).copied().unwrap_or(Vec2::ZERO);
        self.pos += prev_offset - new_offset;
        self.anim_counter += 1;
    }
}
