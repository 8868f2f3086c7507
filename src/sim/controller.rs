//! Controllers: turn input (keys or heuristics) into entity intents
//!
//! Each controller runs once per tick, in order: player, demons, scroll.

use glam::Vec2;

use super::animation::Facing;
use super::collision::Rect;
use super::entity::OpenGround;
use super::state::GameState;

/// Raw key-down bits sampled once per tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Attack in the current facing
    pub attack: bool,
    pub attack_up: bool,
    pub attack_down: bool,
    pub attack_left: bool,
    pub attack_right: bool,
}

/// What the player asked for this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerIntent {
    /// Attack, turning first if a direction was given
    Attack(Option<Facing>),
    Move(Vec2),
}

impl PlayerInput {
    /// Map key bits to an intent; any attack key wins over movement
    pub fn intent(&self) -> PlayerIntent {
        if self.attack {
            PlayerIntent::Attack(None)
        } else if self.attack_up {
            PlayerIntent::Attack(Some(Facing::Up))
        } else if self.attack_down {
            PlayerIntent::Attack(Some(Facing::Down))
        } else if self.attack_left {
            PlayerIntent::Attack(Some(Facing::Left))
        } else if self.attack_right {
            PlayerIntent::Attack(Some(Facing::Right))
        } else {
            let axis = |pos: bool, neg: bool| pos as i8 as f32 - neg as i8 as f32;
            PlayerIntent::Move(Vec2::new(
                axis(self.right, self.left),
                axis(self.down, self.up),
            ))
        }
    }
}

/// Zero any axis whose motion would push an edge of `bounds` off screen
///
/// Applied before motion, so the entity never penetrates the edge.
pub fn clamp_to_screen(direction: Vec2, bounds: &Rect, frame_speed: f32, screen: Vec2) -> Vec2 {
    let step = direction * frame_speed;
    let mut clamped = direction;
    if (direction.x > 0.0 && bounds.right() + step.x > screen.x)
        || (direction.x < 0.0 && bounds.left() + step.x < 0.0)
    {
        clamped.x = 0.0;
    }
    if (direction.y > 0.0 && bounds.bottom() + step.y > screen.y)
        || (direction.y < 0.0 && bounds.top() + step.y < 0.0)
    {
        clamped.y = 0.0;
    }
    clamped
}

/// Drives the player from key input
pub struct PlayerController;

impl PlayerController {
    pub fn update(state: &mut GameState, input: &PlayerInput) {
        let screen = Vec2::new(state.tuning.screen_width, state.tuning.screen_height);
        let player = &mut state.player;

        if player.is_attacking() {
            player.set_direction(Vec2::ZERO);
        } else {
            match input.intent() {
                PlayerIntent::Attack(facing) => {
                    player.attack(facing);
                }
                PlayerIntent::Move(direction) => {
                    let direction =
                        clamp_to_screen(direction, &player.bounds(), player.frame_speed(), screen);
                    player.set_direction(direction);
                }
            }
        }

        player.update(state.obstacles.as_slice());
    }
}

/// Steers every demon straight at the player
///
/// A demon standing exactly on the player is left untouched for the tick.
pub struct DemonController;

impl DemonController {
    pub fn update(state: &mut GameState) {
        let target = state.player.pos;
        let slow = state.player.is_invincible();
        let slow_scale = state.tuning.demon_slow_scale;

        for demon in &mut state.demons {
            let to_player = target - demon.pos;
            let dist = to_player.length();
            if dist == 0.0 {
                continue;
            }
            let mut direction = to_player / dist;
            if slow {
                direction *= slow_scale;
            }
            demon.set_direction(direction);
            demon.update(state.obstacles.as_slice());
        }
    }
}

/// Scrolls the world against the player's vertical input
///
/// Everything, the player included, is displaced by the opposite of the
/// player's vertical step, so the player holds its screen row while the world
/// slides past.
pub struct ScrollController;

impl ScrollController {
    pub fn update(state: &mut GameState) {
        let shift = Vec2::new(0.0, -state.player.direction().y * state.player.frame_speed());
        if shift != Vec2::ZERO {
            state.player.displace(shift);
            for entity in state.demons.iter_mut().chain(state.obstacles.iter_mut()) {
                entity.displace(shift);
            }
        }
        for obstacle in &mut state.obstacles {
            obstacle.update(&OpenGround);
        }
    }
}

/// Demo-mode input: fight demons that come close, otherwise keep climbing
pub fn autopilot(state: &GameState) -> PlayerInput {
    const REACH: f32 = 45.0;
    const DANGER: f32 = 160.0;

    let player = &state.player;
    let nearest = state
        .demons
        .iter()
        .map(|d| (d.pos - player.pos, (d.pos - player.pos).length()))
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut input = PlayerInput::default();
    match nearest {
        Some((offset, dist)) if dist < REACH => {
            match Facing::from_direction(offset) {
                Some(Facing::Up) => input.attack_up = true,
                Some(Facing::Down) => input.attack_down = true,
                Some(Facing::Left) => input.attack_left = true,
                Some(Facing::Right) => input.attack_right = true,
                None => input.attack = true,
            }
        }
        Some((offset, dist)) if dist < DANGER => {
            // Sidestep away from the threat while climbing
            input.up = offset.y > 0.0;
            input.down = offset.y < 0.0 && offset.x.abs() < 20.0;
            input.left = offset.x > 0.0;
            input.right = offset.x <= 0.0;
        }
        _ => input.up = true,
    }
    input
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::GameAssets;
    use crate::consts::*;
    use crate::tuning::Tuning;

    fn empty_game() -> GameState {
        let mut state = GameState::new(1, Tuning::default(), GameAssets::placeholder()).unwrap();
        state.start();
        state.obstacles.clear();
        state
    }

    #[test]
    fn test_movement_keys_map_to_directions() {
        let cases = [
            (PlayerInput { up: true, ..Default::default() }, Vec2::new(0.0, -1.0)),
            (PlayerInput { left: true, ..Default::default() }, Vec2::new(-1.0, 0.0)),
            (PlayerInput { down: true, ..Default::default() }, Vec2::new(0.0, 1.0)),
            (PlayerInput { right: true, ..Default::default() }, Vec2::new(1.0, 0.0)),
            (PlayerInput { up: true, down: true, ..Default::default() }, Vec2::ZERO),
        ];
        for (input, expected) in cases {
            let mut state = empty_game();
            PlayerController::update(&mut state, &input);
            assert_eq!(state.player.direction(), expected);
        }
    }

    #[test]
    fn test_attack_keys_set_facing() {
        let cases = [
            (PlayerInput { attack_up: true, ..Default::default() }, Facing::Up),
            (PlayerInput { attack_left: true, ..Default::default() }, Facing::Left),
            (PlayerInput { attack_down: true, ..Default::default() }, Facing::Down),
            (PlayerInput { attack_right: true, ..Default::default() }, Facing::Right),
        ];
        for (input, facing) in cases {
            let mut state = empty_game();
            PlayerController::update(&mut state, &input);
            assert!(state.player.is_attacking());
            assert_eq!(state.player.facing(), facing);
        }
    }

    #[test]
    fn test_attack_beats_movement() {
        let mut state = empty_game();
        let start = state.player.pos;
        let input = PlayerInput {
            right: true,
            attack: true,
            ..Default::default()
        };
        PlayerController::update(&mut state, &input);
        assert!(state.player.is_attacking());
        assert_eq!(state.player.direction(), Vec2::ZERO);
        assert_eq!(state.player.pos, start);
    }

    #[test]
    fn test_movement_locked_while_attacking() {
        let mut state = empty_game();
        PlayerController::update(&mut state, &PlayerInput { attack: true, ..Default::default() });
        let start = state.player.pos;
        PlayerController::update(&mut state, &PlayerInput { left: true, ..Default::default() });
        assert_eq!(state.player.direction(), Vec2::ZERO);
        assert_eq!(state.player.pos, start);
    }

    #[test]
    fn test_clamp_at_exact_boundary() {
        let screen = Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT);
        let at_right = Rect::new(Vec2::new(SCREEN_WIDTH - 20.0, 100.0), Vec2::new(SCREEN_WIDTH, 140.0));
        assert_eq!(clamp_to_screen(Vec2::new(1.0, 0.0), &at_right, 2.5, screen), Vec2::ZERO);
        // Moving away from the edge is fine
        assert_eq!(
            clamp_to_screen(Vec2::new(-1.0, 0.0), &at_right, 2.5, screen),
            Vec2::new(-1.0, 0.0)
        );

        let at_left = Rect::new(Vec2::new(0.0, 100.0), Vec2::new(20.0, 140.0));
        assert_eq!(clamp_to_screen(Vec2::new(-1.0, 1.0), &at_left, 2.5, screen), Vec2::new(0.0, 1.0));

        let at_top = Rect::new(Vec2::new(100.0, 0.0), Vec2::new(120.0, 40.0));
        assert_eq!(clamp_to_screen(Vec2::new(0.0, -1.0), &at_top, 2.5, screen), Vec2::ZERO);

        let at_bottom = Rect::new(Vec2::new(100.0, SCREEN_HEIGHT - 40.0), Vec2::new(120.0, SCREEN_HEIGHT));
        assert_eq!(clamp_to_screen(Vec2::new(1.0, 1.0), &at_bottom, 2.5, screen), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_clamp_allows_landing_on_edge() {
        let screen = Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT);
        let near = Rect::new(Vec2::new(SCREEN_WIDTH - 22.5, 100.0), Vec2::new(SCREEN_WIDTH - 2.5, 140.0));
        assert_eq!(clamp_to_screen(Vec2::new(1.0, 0.0), &near, 2.5, screen), Vec2::new(1.0, 0.0));
        let nearer = near.translated(Vec2::new(1.0, 0.0));
        assert_eq!(clamp_to_screen(Vec2::new(1.0, 0.0), &nearer, 2.5, screen), Vec2::ZERO);
    }

    #[test]
    fn test_player_stops_at_right_edge() {
        let mut state = empty_game();
        let input = PlayerInput { right: true, ..Default::default() };
        for _ in 0..400 {
            PlayerController::update(&mut state, &input);
        }
        assert!(state.player.bounds().right() <= SCREEN_WIDTH);
        assert_eq!(state.player.direction(), Vec2::ZERO);
    }

    #[test]
    fn test_demon_heads_for_player() {
        let diag = Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT).normalize();
        let cases = [
            (Vec2::new(SCREEN_WIDTH / 2.0, 0.0), Vec2::new(0.0, 1.0)),
            (Vec2::new(SCREEN_WIDTH / 2.0, SCREEN_HEIGHT), Vec2::new(0.0, -1.0)),
            (Vec2::new(0.0, SCREEN_HEIGHT / 2.0), Vec2::new(1.0, 0.0)),
            (Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT / 2.0), Vec2::new(-1.0, 0.0)),
            (Vec2::ZERO, diag),
            (Vec2::new(SCREEN_WIDTH, 0.0), Vec2::new(-diag.x, diag.y)),
            (Vec2::new(0.0, SCREEN_HEIGHT), Vec2::new(diag.x, -diag.y)),
            (Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT), -diag),
        ];
        for (spawn, expected) in cases {
            let mut state = empty_game();
            let id = state.spawn_demon_at(spawn);
            DemonController::update(&mut state);
            let demon = state.demons.iter().find(|d| d.id == id).unwrap();
            assert!((demon.direction() - expected).length() < 1e-5, "{spawn:?}");
        }
    }

    #[test]
    fn test_demon_on_player_keeps_direction() {
        let mut state = empty_game();
        let id = state.spawn_demon_at(state.player.pos);
        state.demons[0].set_direction(Vec2::new(0.25, 0.5));
        DemonController::update(&mut state);
        let demon = state.demons.iter().find(|d| d.id == id).unwrap();
        assert_eq!(demon.direction(), Vec2::new(0.25, 0.5));
        assert_eq!(demon.pos, state.player.pos);
        assert_eq!(demon.anim_counter(), 0);
    }

    #[test]
    fn test_demons_slow_while_player_invincible() {
        let mut state = empty_game();
        state.spawn_demon_at(Vec2::new(SCREEN_WIDTH / 2.0, 0.0));
        state.player.damage(Vec2::X);
        DemonController::update(&mut state);
        assert!((state.demons[0].direction() - Vec2::new(0.0, DEMON_SLOW_SCALE)).length() < 1e-5);
    }

    #[test]
    fn test_scroll_keeps_player_row() {
        let mut state = empty_game();
        state.spawn_obstacle_at(Vec2::new(100.0, 100.0));
        let start_y = state.player.pos.y;
        let input = PlayerInput { up: true, ..Default::default() };
        PlayerController::update(&mut state, &input);
        ScrollController::update(&mut state);
        assert!((state.player.pos.y - start_y).abs() < 1e-4);
        assert!((state.obstacles[0].pos.y - 102.5).abs() < 1e-4);
    }

    #[test]
    fn test_autopilot_attacks_adjacent_demon() {
        let mut state = empty_game();
        state.spawn_demon_at(state.player.pos + Vec2::new(30.0, 0.0));
        let input = autopilot(&state);
        assert!(input.attack_right);
    }

    #[test]
    fn test_autopilot_climbs_when_clear() {
        let state = empty_game();
        assert_eq!(autopilot(&state), PlayerInput { up: true, ..Default::default() });
    }
}
