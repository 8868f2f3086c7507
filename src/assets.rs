//! Animation assets
//!
//! On disk every animation is a directory holding `info.json` and numbered
//! frames `0.png`, `1.png`, ... read until the first gap:
//!
//! ```text
//! player/
//!   info.json          stills
//!   0.png
//!   up/ down/ left/ right/
//!   attack_up/ attack_down/ attack_left/ attack_right/
//! ```
//!
//! `info.json` is `{"fps": 5, "pos": [[x, y], ...]}` with one art offset per
//! frame.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use glam::Vec2;
use image::RgbaImage;
use serde::Deserialize;
use thiserror::Error;

use crate::consts::{OBSTACLE_FPS, TICK_RATE};
use crate::sim::animation::{Animation, AnimationSet, Facing, Frame};

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("bad animation info in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to decode {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("no frames in {}", .0.display())]
    NoFrames(PathBuf),
    #[error("{} has {frames} frames but {offsets} offsets", path.display())]
    OffsetCountMismatch {
        path: PathBuf,
        frames: usize,
        offsets: usize,
    },
    #[error("fps must be positive in {} (got {fps})", path.display())]
    BadFps { path: PathBuf, fps: f32 },
    #[error("{entity} is missing its {variant} animations")]
    MissingAnimation {
        entity: &'static str,
        variant: &'static str,
    },
}

/// Contents of an animation's `info.json`
#[derive(Debug, Clone, Deserialize)]
pub struct AnimationInfo {
    pub fps: f32,
    #[serde(default)]
    pub pos: Vec<[f32; 2]>,
}

/// Somewhere animations can be read from
pub trait AnimationSource {
    /// Load the animation stored under `name` (relative to the source root)
    fn load(&self, name: &str) -> Result<Animation, AssetError>;

    /// Whether an animation exists under `name`
    fn contains(&self, name: &str) -> bool;
}

/// Animations stored as directories on the local filesystem
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    tick_rate: u32,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>, tick_rate: u32) -> Self {
        Self {
            root: root.into(),
            tick_rate,
        }
    }

    fn dir(&self, name: &str) -> PathBuf {
        if name.is_empty() {
            self.root.clone()
        } else {
            self.root.join(name)
        }
    }
}

impl AnimationSource for DirectorySource {
    fn load(&self, name: &str) -> Result<Animation, AssetError> {
        load_animation_dir(&self.dir(name), self.tick_rate)
    }

    fn contains(&self, name: &str) -> bool {
        self.dir(name).join("info.json").is_file()
    }
}

/// Read one animation directory
pub fn load_animation_dir(dir: &Path, tick_rate: u32) -> Result<Animation, AssetError> {
    let info_path = dir.join("info.json");
    let text = fs::read_to_string(&info_path).map_err(|source| AssetError::Io {
        path: info_path.clone(),
        source,
    })?;
    let info: AnimationInfo = serde_json::from_str(&text).map_err(|source| AssetError::Json {
        path: info_path.clone(),
        source,
    })?;
    if !(info.fps > 0.0) {
        return Err(AssetError::BadFps {
            path: info_path,
            fps: info.fps,
        });
    }

    let mut frames = Vec::new();
    loop {
        let path = dir.join(format!("{}.png", frames.len()));
        if !path.is_file() {
            break;
        }
        let image = image::open(&path).map_err(|source| AssetError::Image {
            path: path.clone(),
            source,
        })?;
        frames.push(Frame::new(image.to_rgba8()));
    }
    if frames.is_empty() {
        return Err(AssetError::NoFrames(dir.to_path_buf()));
    }
    if !info.pos.is_empty() && info.pos.len() != frames.len() {
        return Err(AssetError::OffsetCountMismatch {
            path: dir.to_path_buf(),
            frames: frames.len(),
            offsets: info.pos.len(),
        });
    }

    let offsets = info.pos.iter().map(|&p| Vec2::from(p)).collect();
    let frame_length = Animation::frame_length_for(tick_rate, info.fps);
    log::debug!(
        "Loaded {} ({} frames, {} ticks each)",
        dir.display(),
        frames.len(),
        frame_length
    );
    Ok(Animation::new(frames, offsets, frame_length))
}

fn load_directional<S: AnimationSource + ?Sized>(
    source: &S,
    prefix: &str,
) -> Result<[Animation; 4], AssetError> {
    let [up, down, left, right] = Facing::ALL.map(|f| source.load(&format!("{prefix}{}", f.as_str())));
    Ok([up?, down?, left?, right?])
}

/// Load an entity's animation set: stills always, walks and attacks if present
pub fn load_animation_set<S: AnimationSource + ?Sized>(source: &S) -> Result<AnimationSet, AssetError> {
    let mut set = AnimationSet::new(source.load("")?);
    if Facing::ALL.iter().any(|f| source.contains(f.as_str())) {
        set = set.with_walk(load_directional(source, "")?);
    }
    if Facing::ALL
        .iter()
        .any(|f| source.contains(&format!("attack_{}", f.as_str())))
    {
        set = set.with_attacks(load_directional(source, "attack_")?);
    }
    Ok(set)
}

/// Every animation set the game needs
#[derive(Debug, Clone)]
pub struct GameAssets {
    pub player: Arc<AnimationSet>,
    pub demon: Arc<AnimationSet>,
    pub obstacle: Arc<AnimationSet>,
}

impl GameAssets {
    /// Load `player/`, `demon/` and `obstacle/` under `root`
    pub fn load(root: impl AsRef<Path>, tick_rate: u32) -> Result<Self, AssetError> {
        let root = root.as_ref();
        let load = |name: &str| -> Result<Arc<AnimationSet>, AssetError> {
            let set = load_animation_set(&DirectorySource::new(root.join(name), tick_rate))?;
            Ok(Arc::new(set))
        };
        let assets = Self {
            player: load("player")?,
            demon: load("demon")?,
            obstacle: load("obstacle")?,
        };
        log::info!("Loaded assets from {}", root.display());
        Ok(assets)
    }

    /// Flat-coloured stand-in art for headless runs and tests
    ///
    /// The player is a 20x40 blue body whose attack frames carry a gray blade
    /// along the facing edge. Demons are 20x20 red, obstacles 60x40 brown.
    pub fn placeholder() -> Self {
        const BODY: [u8; 4] = [40, 60, 200, 255];
        const BLADE: [u8; 4] = [160, 160, 160, 255];
        const PLAYER_FRAME: u32 = 12;

        let body = Frame::solid(20, 40, BODY);
        let walk = || Animation::new(vec![body.clone(); 4], vec![], PLAYER_FRAME);
        let attack = |facing: Facing| {
            let frame = Frame::new(RgbaImage::from_fn(20, 40, |x, y| {
                let blade = match facing {
                    Facing::Up => y < 6,
                    Facing::Down => y >= 34,
                    Facing::Left => x < 5,
                    Facing::Right => x >= 15,
                };
                image::Rgba(if blade { BLADE } else { BODY })
            }));
            Animation::new(vec![frame; 4], vec![], PLAYER_FRAME)
        };
        let player = AnimationSet::new(walk())
            .with_walk([walk(), walk(), walk(), walk()])
            .with_attacks(Facing::ALL.map(attack));

        let obstacle_frames = vec![Frame::solid(60, 40, [110, 80, 50, 255])];
        let obstacle = AnimationSet::new(Animation::new(
            obstacle_frames,
            vec![],
            Animation::frame_length_for(TICK_RATE, OBSTACLE_FPS),
        ));

        Self {
            player: Arc::new(player),
            demon: Arc::new(AnimationSet::solid(20, 20, [200, 30, 30, 255], PLAYER_FRAME)),
            obstacle: Arc::new(obstacle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::animation::AnimKey;
    use crate::sim::collision::classify_weapon_pixel;

    /// Fresh scratch directory under the system temp dir
    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ponr-assets-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_anim(dir: &Path, fps: f32, frames: u32, offsets: &[[f32; 2]]) {
        fs::create_dir_all(dir).unwrap();
        let info = serde_json::json!({ "fps": fps, "pos": offsets });
        fs::write(dir.join("info.json"), info.to_string()).unwrap();
        for i in 0..frames {
            let img = RgbaImage::from_pixel(8, 12, image::Rgba([i as u8 * 40, 0, 0, 255]));
            img.save(dir.join(format!("{i}.png"))).unwrap();
        }
    }

    #[test]
    fn test_load_animation_dir() {
        let dir = scratch("single");
        write_anim(&dir, 5.0, 3, &[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]);
        let anim = load_animation_dir(&dir, 60).unwrap();
        assert_eq!(anim.frame_count(), 3);
        assert_eq!(anim.frame_length, 12);
        assert_eq!(anim.offsets[1], Vec2::new(3.0, 4.0));
        assert_eq!(anim.frames[2].pixel(0, 0), [80, 0, 0, 255]);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_frames_stop_at_first_gap() {
        let dir = scratch("gap");
        write_anim(&dir, 4.0, 2, &[]);
        RgbaImage::new(2, 2).save(dir.join("3.png")).unwrap();
        let anim = load_animation_dir(&dir, 60).unwrap();
        assert_eq!(anim.frame_count(), 2);
        assert_eq!(anim.frame_length, 15);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_info_is_io_error() {
        let dir = scratch("noinfo");
        assert!(matches!(load_animation_dir(&dir, 60), Err(AssetError::Io { .. })));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_bad_info_rejected() {
        let dir = scratch("bad");
        fs::write(dir.join("info.json"), "{\"pos\": []}").unwrap();
        assert!(matches!(load_animation_dir(&dir, 60), Err(AssetError::Json { .. })));

        write_anim(&dir, 0.0, 1, &[]);
        assert!(matches!(load_animation_dir(&dir, 60), Err(AssetError::BadFps { .. })));

        write_anim(&dir, 5.0, 1, &[[0.0, 0.0], [1.0, 1.0]]);
        assert!(matches!(
            load_animation_dir(&dir, 60),
            Err(AssetError::OffsetCountMismatch { frames: 1, offsets: 2, .. })
        ));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_no_frames_rejected() {
        let dir = scratch("empty");
        write_anim(&dir, 5.0, 0, &[]);
        assert!(matches!(load_animation_dir(&dir, 60), Err(AssetError::NoFrames(_))));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_game_assets_tree() {
        let root = scratch("tree");
        for who in ["player", "demon"] {
            write_anim(&root.join(who), 5.0, 1, &[]);
            for f in Facing::ALL {
                write_anim(&root.join(who).join(f.as_str()), 5.0, 2, &[[0.0, 0.0], [1.0, 0.0]]);
            }
        }
        for f in Facing::ALL {
            write_anim(&root.join("player").join(format!("attack_{}", f.as_str())), 10.0, 3, &[]);
        }
        write_anim(&root.join("obstacle"), 4.0, 1, &[]);

        let assets = GameAssets::load(&root, 60).unwrap();
        assert!(assets.player.has_walk() && assets.player.has_attacks());
        assert!(assets.demon.has_walk() && !assets.demon.has_attacks());
        assert!(!assets.obstacle.has_walk());
        assert_eq!(assets.player.get(AnimKey::Attack(Facing::Left)).frame_length, 6);
        assert_eq!(assets.player.get(AnimKey::Still(Facing::Up)).frame_count(), 1);
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_partial_walk_set_is_error() {
        let root = scratch("partial");
        write_anim(&root, 5.0, 1, &[]);
        write_anim(&root.join("up"), 5.0, 1, &[]);
        let source = DirectorySource::new(&root, 60);
        assert!(matches!(load_animation_set(&source), Err(AssetError::Io { .. })));
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_placeholder_blade_on_facing_edge() {
        let assets = GameAssets::placeholder();
        let right = &assets.player.get(AnimKey::Attack(Facing::Right)).frames[0];
        assert!(classify_weapon_pixel(right.pixel(19, 20)));
        assert!(!classify_weapon_pixel(right.pixel(2, 20)));
        let walk = &assets.player.get(AnimKey::Walk(Facing::Right)).frames[0];
        assert!(!classify_weapon_pixel(walk.pixel(19, 20)));
        assert_eq!(assets.obstacle.stills.frame_length, 15);
    }
}
