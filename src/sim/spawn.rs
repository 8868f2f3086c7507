//! Spawn placement
//!
//! Demons appear on a ring just outside the visible screen; obstacles appear
//! in a band above or below it, ahead of the scroll direction.

use std::f32::consts::PI;

use glam::Vec2;
use rand::Rng;

use crate::polar_to_cartesian;
use crate::tuning::Tuning;

/// Which side of the screen to place a new obstacle on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnSide {
    Above,
    Below,
}

/// Sample a demon spawn point around the screen perimeter
///
/// A uniform angle picks the ray from the screen center; comparing it with
/// the diagonal half-angle tells whether the ray leaves through a vertical or a
/// horizontal edge. The radius is then sampled so the point lies between
/// `demon_min_spawn_dist` and `demon_max_spawn_dist` beyond that edge.
pub fn demon_spawn_position<R: Rng>(rng: &mut R, tuning: &Tuning) -> Vec2 {
    let half = Vec2::new(tuning.screen_width, tuning.screen_height) / 2.0;
    let theta: f32 = rng.random_range(-PI..PI);

    let max_theta = (half.y / half.x).atan();
    let through_side = theta.abs() < max_theta || theta.abs() > PI - max_theta;
    let trig = if through_side {
        theta.cos().abs()
    } else {
        theta.sin().abs()
    };

    let edge = if through_side { half.x } else { half.y };
    let min_rad = (edge + tuning.demon_min_spawn_dist) / trig;
    let max_rad = (edge + tuning.demon_max_spawn_dist) / trig;
    let rad = rng.random_range(min_rad..=max_rad);

    half + polar_to_cartesian(rad, theta)
}

/// Sample an obstacle spawn point above or below the screen
pub fn obstacle_spawn_position<R: Rng>(rng: &mut R, tuning: &Tuning, side: SpawnSide) -> Vec2 {
    let x = rng.random_range(0.0..=tuning.screen_width);
    let dist = rng.random_range(tuning.obstacle_min_spawn_dist..=tuning.obstacle_max_spawn_dist);
    let y = match side {
        SpawnSide::Above => -dist,
        SpawnSide::Below => tuning.screen_height + dist,
    };
    Vec2::new(x, y)
}

/// Decide whether the scroll has run close to the last obstacle
///
/// Moving up (`dy < 0`), a new obstacle is needed above once the topmost
/// obstacle layer is no longer more than `trigger` above the player's layer.
/// Moving down is symmetric. With no obstacles at all, one is always needed
/// ahead.
pub fn obstacle_trigger(
    player_layer: i32,
    dy: f32,
    topmost: Option<i32>,
    bottommost: Option<i32>,
    trigger: f32,
) -> Option<SpawnSide> {
    let player_layer = player_layer as f32;
    if dy < 0.0 {
        match topmost {
            Some(top) if (top as f32) < player_layer - trigger => None,
            _ => Some(SpawnSide::Above),
        }
    } else if dy > 0.0 {
        match bottommost {
            Some(bottom) if (bottom as f32) > player_layer + trigger => None,
            _ => Some(SpawnSide::Below),
        }
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    /// Distance beyond the screen edge the ray from the center exits through
    fn outside_distance(pos: Vec2, t: &Tuning) -> f32 {
        let half = Vec2::new(t.screen_width, t.screen_height) / 2.0;
        let rel = pos - half;
        let theta = rel.y.atan2(rel.x);
        let max_theta = (half.y / half.x).atan();
        if theta.abs() < max_theta || theta.abs() > PI - max_theta {
            rel.x.abs() - half.x
        } else {
            rel.y.abs() - half.y
        }
    }

    #[test]
    fn test_demon_spawns_outside_screen() {
        let t = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..500 {
            let pos = demon_spawn_position(&mut rng, &t);
            let outside = pos.x < 0.0 || pos.x > t.screen_width || pos.y < 0.0 || pos.y > t.screen_height;
            assert!(outside, "spawned on screen at {pos:?}");
        }
    }

    #[test]
    fn test_obstacle_spawn_bands() {
        let t = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..100 {
            let above = obstacle_spawn_position(&mut rng, &t, SpawnSide::Above);
            assert!((0.0..=t.screen_width).contains(&above.x));
            assert!(above.y <= -t.obstacle_min_spawn_dist && above.y >= -t.obstacle_max_spawn_dist);

            let below = obstacle_spawn_position(&mut rng, &t, SpawnSide::Below);
            let past = below.y - t.screen_height;
            assert!(past >= t.obstacle_min_spawn_dist && past <= t.obstacle_max_spawn_dist);
        }
    }

    #[test]
    fn test_trigger_moving_up() {
        // Player layer 320, trigger 200: topmost must be above 120
        assert_eq!(obstacle_trigger(320, -1.0, Some(150), Some(150), 200.0), Some(SpawnSide::Above));
        assert_eq!(obstacle_trigger(320, -1.0, Some(119), Some(500), 200.0), None);
        assert_eq!(obstacle_trigger(320, -1.0, None, None, 200.0), Some(SpawnSide::Above));
    }

    #[test]
    fn test_trigger_moving_down() {
        assert_eq!(obstacle_trigger(320, 1.0, Some(-100), Some(400), 200.0), Some(SpawnSide::Below));
        assert_eq!(obstacle_trigger(320, 1.0, Some(-100), Some(521), 200.0), None);
    }

    #[test]
    fn test_no_trigger_when_still() {
        assert_eq!(obstacle_trigger(320, 0.0, None, None, 200.0), None);
    }

    proptest! {
        #[test]
        fn prop_demon_spawn_within_band(seed in any::<u64>()) {
            let t = Tuning::default();
            let mut rng = Pcg32::seed_from_u64(seed);
            let pos = demon_spawn_position(&mut rng, &t);
            let d = outside_distance(pos, &t);
            prop_assert!(d >= t.demon_min_spawn_dist - 1e-2, "too close: {} at {:?}", d, pos);
            prop_assert!(d <= t.demon_max_spawn_dist + 1e-2, "too far: {} at {:?}", d, pos);
        }
    }
}
