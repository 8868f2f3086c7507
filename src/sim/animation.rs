//! Animation frames and per-entity animation sets
//!
//! An [`Animation`] is an ordered list of frames, a per-frame art offset and a
//! frame length in ticks. An [`AnimationSet`] bundles the variants an entity
//! can show: a flat "stills" loop, four directional walk loops (whose first
//! frames double as the directional stills) and four attack loops.

use std::sync::Arc;

use glam::Vec2;
use image::{Rgba, RgbaImage};

/// Alpha above which a pixel belongs to the collision mask
pub const MASK_ALPHA_THRESHOLD: u8 = 127;

/// Which way an entity is facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Facing {
    #[default]
    Up,
    Down,
    Left,
    Right,
}

impl Facing {
    pub const ALL: [Facing; 4] = [Facing::Up, Facing::Down, Facing::Left, Facing::Right];

    /// Facing for a nonzero direction, by angle band (screen coordinates)
    ///
    /// [-45°, 45°] is Right, (45°, 135°) is Down, (-135°, -45°) is Up and
    /// everything else is Left. Returns `None` for the zero vector.
    pub fn from_direction(direction: Vec2) -> Option<Self> {
        if direction == Vec2::ZERO {
            return None;
        }
        let angle = crate::angle_degrees(direction);
        Some(if (-45.0..=45.0).contains(&angle) {
            Facing::Right
        } else if angle > 45.0 && angle < 135.0 {
            Facing::Down
        } else if angle > -135.0 && angle < -45.0 {
            Facing::Up
        } else {
            Facing::Left
        })
    }

    /// Unit vector pointing the way this facing looks
    pub fn vector(self) -> Vec2 {
        match self {
            Facing::Up => Vec2::new(0.0, -1.0),
            Facing::Down => Vec2::new(0.0, 1.0),
            Facing::Left => Vec2::new(-1.0, 0.0),
            Facing::Right => Vec2::new(1.0, 0.0),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Facing::Up => "up",
            Facing::Down => "down",
            Facing::Left => "left",
            Facing::Right => "right",
        }
    }

    fn index(self) -> usize {
        match self {
            Facing::Up => 0,
            Facing::Down => 1,
            Facing::Left => 2,
            Facing::Right => 3,
        }
    }
}

/// A single animation image
#[derive(Debug, Clone)]
pub struct Frame {
    image: RgbaImage,
}

impl Frame {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    /// A frame filled with a single colour
    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        Self::new(RgbaImage::from_pixel(width, height, Rgba(color)))
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width() as f32, self.height() as f32)
    }

    /// RGBA colour at a local pixel (transparent outside the image)
    pub fn pixel(&self, x: i32, y: i32) -> [u8; 4] {
        if x < 0 || y < 0 || x as u32 >= self.width() || y as u32 >= self.height() {
            return [0, 0, 0, 0];
        }
        self.image.get_pixel(x as u32, y as u32).0
    }

    /// Whether a local pixel is part of the collision mask
    #[inline]
    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        self.pixel(x, y)[3] > MASK_ALPHA_THRESHOLD
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }
}

/// One looping animation
#[derive(Debug, Clone)]
pub struct Animation {
    pub frames: Vec<Arc<Frame>>,
    /// Art offset of each frame (keeps the feet anchored across frames)
    pub offsets: Vec<Vec2>,
    /// Ticks each frame stays on screen
    pub frame_length: u32,
}

impl Animation {
    /// Build an animation; `frame_length` is clamped to at least one tick.
    ///
    /// Missing offsets are padded with zero, extra offsets are dropped.
    pub fn new(frames: Vec<Frame>, mut offsets: Vec<Vec2>, frame_length: u32) -> Self {
        offsets.resize(frames.len(), Vec2::ZERO);
        Self {
            frames: frames.into_iter().map(Arc::new).collect(),
            offsets,
            frame_length: frame_length.max(1),
        }
    }

    /// Frame length in ticks for an art rate in frames per second
    pub fn frame_length_for(tick_rate: u32, fps: f32) -> u32 {
        if fps <= 0.0 {
            return 1;
        }
        ((tick_rate as f32 / fps).round() as u32).max(1)
    }

    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Tick count of one full loop
    #[inline]
    pub fn loop_ticks(&self) -> u32 {
        self.frame_count() as u32 * self.frame_length
    }

    /// Frame index shown at a given animation counter
    #[inline]
    pub fn frame_index(&self, counter: u32) -> usize {
        if self.frames.is_empty() {
            return 0;
        }
        (counter / self.frame_length) as usize % self.frame_count()
    }

    /// A single-frame animation holding this animation's first frame
    pub fn first_frame(&self) -> Self {
        Self {
            frames: self.frames.iter().take(1).cloned().collect(),
            offsets: self.offsets.iter().take(1).copied().collect(),
            frame_length: self.frame_length,
        }
    }
}

/// Animation variant an entity is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimKey {
    Stills,
    Still(Facing),
    Walk(Facing),
    Attack(Facing),
}

/// Every animation an entity can show
#[derive(Debug, Clone)]
pub struct AnimationSet {
    pub stills: Animation,
    walk: Option<[Animation; 4]>,
    still: Option<[Animation; 4]>,
    attack: Option<[Animation; 4]>,
}

impl AnimationSet {
    pub fn new(stills: Animation) -> Self {
        Self {
            stills,
            walk: None,
            still: None,
            attack: None,
        }
    }

    /// Add directional walk loops, indexed by `Facing::ALL` order
    pub fn with_walk(mut self, walk: [Animation; 4]) -> Self {
        self.still = Some([
            walk[0].first_frame(),
            walk[1].first_frame(),
            walk[2].first_frame(),
            walk[3].first_frame(),
        ]);
        self.walk = Some(walk);
        self
    }

    /// Add directional attack loops, indexed by `Facing::ALL` order
    pub fn with_attacks(mut self, attack: [Animation; 4]) -> Self {
        self.attack = Some(attack);
        self
    }

    pub fn has_walk(&self) -> bool {
        self.walk.is_some()
    }

    pub fn has_attacks(&self) -> bool {
        self.attack.is_some()
    }

    /// Look up a variant; falls back to the flat stills if the set lacks it
    pub fn get(&self, key: AnimKey) -> &Animation {
        let found = match key {
            AnimKey::Stills => None,
            AnimKey::Still(f) => self.still.as_ref().map(|a| &a[f.index()]),
            AnimKey::Walk(f) => self.walk.as_ref().map(|a| &a[f.index()]),
            AnimKey::Attack(f) => self.attack.as_ref().map(|a| &a[f.index()]),
        };
        found.unwrap_or(&self.stills)
    }

    /// A set where every variant is the same solid rectangle (tests, headless runs)
    pub fn solid(width: u32, height: u32, color: [u8; 4], frame_length: u32) -> Self {
        let anim = || {
            Animation::new(
                vec![Frame::solid(width, height, color); 4],
                vec![Vec2::ZERO; 4],
                frame_length,
            )
        };
        Self::new(anim())
            .with_walk([anim(), anim(), anim(), anim()])
            .with_attacks([anim(), anim(), anim(), anim()])
    }
}
