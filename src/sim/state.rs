//! Game state: the world and everything in it
//!
//! The world owns the player, the demons and the obstacles, resolves
//! collisions once per tick, keeps score and keeps obstacles coming ahead of
//! the scroll.

use std::sync::Arc;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::collision::{classify_weapon_pixel, mask_overlap};
use super::entity::{Entity, EntityKind};
use super::events::{EventQueue, GameEvent, GameRequest, SpawnTimer};
use super::spawn::{SpawnSide, demon_spawn_position, obstacle_spawn_position, obstacle_trigger};
use crate::assets::{AssetError, GameAssets};
use crate::tuning::Tuning;

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Waiting at the start menu
    NotRunning,
    Running,
    Paused,
    /// Player died; waiting for a restart
    Ended,
}

/// Pristine entities cloned for every spawn and restart
#[derive(Debug, Clone)]
struct Templates {
    player: Entity,
    demon: Entity,
    obstacle: Entity,
}

impl Templates {
    fn new(assets: &GameAssets, tuning: &Tuning) -> Result<Self, AssetError> {
        let center = Vec2::new(tuning.screen_width, tuning.screen_height) / 2.0;
        Ok(Self {
            player: Entity::player(center, Arc::clone(&assets.player), tuning)?,
            demon: Entity::demon(Vec2::ZERO, Arc::clone(&assets.demon), tuning)?,
            obstacle: Entity::obstacle(Vec2::ZERO, Arc::clone(&assets.obstacle))?,
        })
    }
}

/// Complete world state
#[derive(Debug, Clone)]
pub struct GameState {
    pub tuning: Tuning,
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    pub phase: GamePhase,
    /// Simulation tick counter (running ticks only)
    pub time_ticks: u64,
    pub score: u64,
    /// Demons killed during the current tick
    pub demons_killed: u32,
    pub player: Entity,
    /// Sorted by id
    pub demons: Vec<Entity>,
    /// Sorted by id
    pub obstacles: Vec<Entity>,
    pub spawn_timer: SpawnTimer,
    /// Requests handled at the start of the next running tick
    pub inbox: EventQueue<GameRequest>,
    /// What happened; drained by the frontend
    pub outbox: EventQueue<GameEvent>,
    templates: Templates,
    next_id: u32,
}

impl GameState {
    /// Build a world; fails if any entity's animation set is incomplete
    pub fn new(seed: u64, tuning: Tuning, assets: GameAssets) -> Result<Self, AssetError> {
        let templates = Templates::new(&assets, &tuning)?;
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::NotRunning,
            time_ticks: 0,
            score: 0,
            demons_killed: 0,
            player: templates.player.clone(),
            demons: Vec::new(),
            obstacles: Vec::new(),
            spawn_timer: SpawnTimer::new(tuning.demon_spawn_interval_ticks()),
            inbox: EventQueue::new(),
            outbox: EventQueue::new(),
            templates,
            tuning,
            next_id: 1,
        };
        state.player.id = state.next_entity_id();
        Ok(state)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // --- Session ---

    /// Leave the start menu and begin a fresh run
    pub fn start(&mut self) {
        if self.phase == GamePhase::NotRunning {
            self.restart();
        }
    }

    /// Reset everything to spawn state and start running
    pub fn restart(&mut self) {
        self.player = self.templates.player.clone();
        self.player.id = self.next_entity_id();
        self.demons.clear();
        self.obstacles.clear();
        self.score = 0;
        self.demons_killed = 0;
        self.time_ticks = 0;
        self.spawn_timer.reset();
        self.inbox.clear();
        self.create_new_obstacle(SpawnSide::Above);
        self.phase = GamePhase::Running;
        log::info!("Run started (seed {})", self.seed);
    }

    /// Pause a running game or resume a paused one
    pub fn toggle_pause(&mut self) {
        match self.phase {
            GamePhase::Running => {
                self.phase = GamePhase::Paused;
                log::info!("Paused");
            }
            GamePhase::Paused => {
                self.phase = GamePhase::Running;
                log::info!("Resumed");
            }
            _ => {}
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    pub fn is_paused(&self) -> bool {
        self.phase == GamePhase::Paused
    }

    // --- Spawning ---

    /// Spawn a demon on the ring just outside the screen
    pub fn create_new_demon(&mut self) -> u32 {
        let pos = demon_spawn_position(&mut self.rng, &self.tuning);
        let id = self.spawn_demon_at(pos);
        log::debug!("Demon {} spawned at ({:.0}, {:.0})", id, pos.x, pos.y);
        id
    }

    pub fn spawn_demon_at(&mut self, pos: Vec2) -> u32 {
        let mut demon = self.templates.demon.clone();
        demon.id = self.next_entity_id();
        demon.pos = pos;
        demon.refresh_layer();
        let id = demon.id;
        self.demons.push(demon);
        id
    }

    /// Spawn an obstacle in the band above or below the screen
    pub fn create_new_obstacle(&mut self, side: SpawnSide) -> u32 {
        let pos = obstacle_spawn_position(&mut self.rng, &self.tuning, side);
        let id = self.spawn_obstacle_at(pos);
        log::debug!("Obstacle {} spawned {:?} at ({:.0}, {:.0})", id, side, pos.x, pos.y);
        self.outbox.push(GameEvent::ObstacleSpawned { id });
        id
    }

    pub fn spawn_obstacle_at(&mut self, pos: Vec2) -> u32 {
        let mut obstacle = self.templates.obstacle.clone();
        obstacle.id = self.next_entity_id();
        obstacle.pos = pos;
        obstacle.refresh_layer();
        let id = obstacle.id;
        self.obstacles.push(obstacle);
        id
    }

    /// Handle queued requests
    pub fn process_inbox(&mut self) {
        while let Some(request) = self.inbox.pop() {
            match request {
                GameRequest::SpawnDemon => {
                    self.create_new_demon();
                }
            }
        }
    }

    // --- World resolution ---

    /// Resolve one tick of world rules after all entities have moved
    pub fn resolve(&mut self) {
        self.refresh_layers();
        self.resolve_combat();

        self.score += self.demons_killed as u64 * self.tuning.score_per_demon;

        if self.player.is_dead() && self.phase == GamePhase::Running {
            self.phase = GamePhase::Ended;
            self.outbox.push(GameEvent::PlayerDied { score: self.score });
            log::info!("Player died after {} ticks, final score {}", self.time_ticks, self.score);
            return;
        }

        self.spawn_obstacles_ahead();
        self.cull_obstacles();
    }

    fn refresh_layers(&mut self) {
        self.player.refresh_layer();
        for entity in self.demons.iter_mut().chain(self.obstacles.iter_mut()) {
            entity.refresh_layer();
        }
    }

    /// Player-versus-demon hits, resolved against a snapshot of the contacts
    fn resolve_combat(&mut self) {
        let frame = self.player.current_frame();
        let origin = self.player.top_left();
        let attacking = self.player.is_attacking();

        let contacts: Vec<(usize, bool)> = self
            .demons
            .iter()
            .enumerate()
            .filter_map(|(i, demon)| {
                let point = mask_overlap(frame, origin, demon.current_frame(), demon.top_left())?;
                let blade = attacking && classify_weapon_pixel(frame.pixel(point.x, point.y));
                Some((i, blade))
            })
            .collect();

        let swing = self.player.facing().vector();
        for (i, blade) in contacts {
            let demon = &mut self.demons[i];
            if blade {
                if demon.damage(swing) && demon.is_dead() {
                    self.demons_killed += 1;
                    self.outbox.push(GameEvent::DemonKilled { id: demon.id });
                    log::debug!("Demon {} killed", demon.id);
                }
            } else {
                let push = if demon.direction() == Vec2::ZERO {
                    demon.facing().vector()
                } else {
                    demon.direction()
                };
                if self.player.damage(push) {
                    self.outbox.push(GameEvent::PlayerHit {
                        health: self.player.health(),
                    });
                }
            }
        }

        self.demons.retain(|d| !d.is_dead());
    }

    /// Keep at least one obstacle ahead of the scroll direction
    fn spawn_obstacles_ahead(&mut self) {
        let topmost = self.obstacles.iter().map(|o| o.layer).min();
        let bottommost = self.obstacles.iter().map(|o| o.layer).max();
        if let Some(side) = obstacle_trigger(
            self.player.layer,
            self.player.direction().y,
            topmost,
            bottommost,
            self.tuning.obstacle_trigger_dist,
        ) {
            self.create_new_obstacle(side);
        }
    }

    /// Drop obstacles that have scrolled far out of the world
    fn cull_obstacles(&mut self) {
        let margin = self.tuning.obstacle_max_spawn_dist * 2.0;
        let top = -margin;
        let bottom = self.tuning.screen_height + margin;
        self.obstacles.retain(|o| {
            let b = o.bounds();
            b.bottom() >= top && b.top() <= bottom
        });
    }

    /// Every live entity in draw order (by layer, then id)
    pub fn all_entities(&self) -> Vec<&Entity> {
        let mut all: Vec<&Entity> = std::iter::once(&self.player)
            .filter(|p| !p.is_dead())
            .chain(self.demons.iter())
            .chain(self.obstacles.iter())
            .collect();
        all.sort_by_key(|e| (e.layer, e.id));
        all
    }

    /// Count of entities of a kind
    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Player => usize::from(!self.player.is_dead()),
            EntityKind::Demon => self.demons.len(),
            EntityKind::Obstacle => self.obstacles.len(),
        }
    }
}
