//! Render description
//!
//! Turns a [`GameState`] into what a frontend has to draw this tick: sprites
//! in layer order, the darkness mask around the player, and the health bar.
//! [`RenderFrame::rasterize`] is a small software compositor used by the
//! headless binary for screenshots and by tests.

use glam::{IVec2, Vec2};
use image::{Rgba, RgbaImage};

use crate::settings::Settings;
use crate::sim::animation::Frame;
use crate::sim::collision::Rect;
use crate::sim::entity::EntityKind;
use crate::sim::state::GameState;

/// Background behind every sprite
const CLEAR_COLOR: [u8; 4] = [30, 24, 20, 255];

/// One image to blit
#[derive(Debug, Clone, Copy)]
pub struct Sprite<'a> {
    pub kind: EntityKind,
    pub frame: &'a Frame,
    pub top_left: IVec2,
    /// Multiplied into every pixel's alpha
    pub alpha: u8,
    pub layer: i32,
}

/// Screen-wide darkness with a lit circle cut out around the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightMask {
    pub center: Vec2,
    pub radius: f32,
    /// Overlay alpha outside the circle
    pub darkness: u8,
    /// Alpha removed inside the circle
    pub light_diff: u8,
}

impl LightMask {
    /// Overlay alpha at a screen point
    pub fn alpha_at(&self, point: Vec2) -> u8 {
        if point.distance_squared(self.center) <= self.radius * self.radius {
            self.darkness.saturating_sub(self.light_diff)
        } else {
            self.darkness
        }
    }
}

/// Player health bar: one segment per health point, plus the segment just lost
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthBar {
    pub pos: Vec2,
    pub unit_width: f32,
    pub height: f32,
    pub filled: u32,
    /// Show the "about to lose" segment after the filled ones
    pub warn: bool,
    pub color: [u8; 3],
    pub warn_color: [u8; 3],
}

impl HealthBar {
    /// Filled rectangle, then the warning segment if it is showing
    pub fn segments(&self) -> Vec<(Rect, [u8; 3])> {
        let mut out = Vec::with_capacity(2);
        let filled_width = self.unit_width * self.filled as f32;
        if self.filled > 0 {
            out.push((
                Rect::new(self.pos, self.pos + Vec2::new(filled_width, self.height)),
                self.color,
            ));
        }
        if self.warn {
            let min = self.pos + Vec2::new(filled_width, 0.0);
            out.push((
                Rect::new(min, min + Vec2::new(self.unit_width, self.height)),
                self.warn_color,
            ));
        }
        out
    }
}

/// Everything needed to draw one tick
#[derive(Debug, Clone)]
pub struct RenderFrame<'a> {
    pub screen: IVec2,
    /// Back to front
    pub sprites: Vec<Sprite<'a>>,
    pub light: LightMask,
    pub health_bar: HealthBar,
    pub score: u64,
}

impl<'a> RenderFrame<'a> {
    pub fn build(state: &'a GameState, settings: &Settings) -> Self {
        let sprites = state
            .all_entities()
            .into_iter()
            .map(|e| Sprite {
                kind: e.kind,
                frame: e.current_frame(),
                top_left: e.top_left(),
                alpha: e.alpha(settings.invincibility_alpha),
                layer: e.layer,
            })
            .collect();

        let player = &state.player;
        let light = LightMask {
            center: player.anchor(),
            radius: settings.light_size,
            darkness: settings.darkness,
            light_diff: settings.light_diff(),
        };

        let blinking_on = player.is_invincible() && player.alpha(0) == 255;
        let health_bar = HealthBar {
            pos: Vec2::new(settings.health_bar_pos.0, settings.health_bar_pos.1),
            unit_width: settings.health_bar_unit_width,
            height: settings.health_bar_height,
            filled: player.health().max(0) as u32,
            warn: blinking_on,
            color: settings.health_bar_color,
            warn_color: settings.health_bar_warn_color,
        };

        Self {
            screen: IVec2::new(state.tuning.screen_width as i32, state.tuning.screen_height as i32),
            sprites,
            light,
            health_bar,
            score: state.score,
        }
    }

    /// Composite the frame into an image
    pub fn rasterize(&self) -> RgbaImage {
        let w = self.screen.x.max(0) as u32;
        let h = self.screen.y.max(0) as u32;
        let mut canvas = RgbaImage::from_pixel(w, h, Rgba(CLEAR_COLOR));

        for sprite in &self.sprites {
            blit(&mut canvas, sprite);
        }

        for (x, y, px) in canvas.enumerate_pixels_mut() {
            let alpha = self.light.alpha_at(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
            blend(px, [0, 0, 0], alpha);
        }

        for (rect, color) in self.health_bar.segments() {
            fill_rect(&mut canvas, &rect, color);
        }
        canvas
    }
}

fn blend(dst: &mut Rgba<u8>, src: [u8; 3], alpha: u8) {
    let a = alpha as u32;
    for i in 0..3 {
        dst.0[i] = ((src[i] as u32 * a + dst.0[i] as u32 * (255 - a)) / 255) as u8;
    }
}

fn blit(canvas: &mut RgbaImage, sprite: &Sprite) {
    let (cw, ch) = (canvas.width() as i32, canvas.height() as i32);
    let image = sprite.frame.image();
    for (x, y, px) in image.enumerate_pixels() {
        let cx = sprite.top_left.x + x as i32;
        let cy = sprite.top_left.y + y as i32;
        if cx < 0 || cy < 0 || cx >= cw || cy >= ch {
            continue;
        }
        let alpha = (px.0[3] as u32 * sprite.alpha as u32 / 255) as u8;
        if alpha == 0 {
            continue;
        }
        let dst = canvas.get_pixel_mut(cx as u32, cy as u32);
        blend(dst, [px.0[0], px.0[1], px.0[2]], alpha);
    }
}

fn fill_rect(canvas: &mut RgbaImage, rect: &Rect, color: [u8; 3]) {
    let x0 = rect.left().max(0.0) as u32;
    let y0 = rect.top().max(0.0) as u32;
    let x1 = (rect.right().max(0.0) as u32).min(canvas.width());
    let y1 = (rect.bottom().max(0.0) as u32).min(canvas.height());
    for y in y0..y1 {
        for x in x0..x1 {
            canvas.put_pixel(x, y, Rgba([color[0], color[1], color[2], 255]));
        }
    }
}
