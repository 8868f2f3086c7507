//! Collision detection for sprite art
//!
//! Combat needs pixel precision: two entities collide only where both of
//! their current frames are opaque, and the colour under that overlap decides
//! whether a swing landed with the blade or with the wielder's body.

use glam::{IVec2, Vec2};

use super::animation::Frame;

/// Axis-aligned bounding box in screen space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.min.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.max.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.min.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.max.y
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Move by a delta
    pub fn translated(&self, delta: Vec2) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    /// Horizontal extents overlap
    pub fn overlaps_x(&self, other: &Rect) -> bool {
        self.min.x < other.max.x && other.min.x < self.max.x
    }
}

/// Pixel-mask overlap test between two frames placed at integer top-left corners
///
/// Returns the first overlapping opaque pixel (row-major scan) in `a`'s local
/// coordinates, or `None` if the masks do not touch.
pub fn mask_overlap(a: &Frame, a_origin: IVec2, b: &Frame, b_origin: IVec2) -> Option<IVec2> {
    let a_max = a_origin + IVec2::new(a.width() as i32, a.height() as i32);
    let b_max = b_origin + IVec2::new(b.width() as i32, b.height() as i32);

    let min = a_origin.max(b_origin);
    let max = a_max.min(b_max);
    if min.x >= max.x || min.y >= max.y {
        return None;
    }

    for y in min.y..max.y {
        for x in min.x..max.x {
            let pa = IVec2::new(x, y) - a_origin;
            let pb = IVec2::new(x, y) - b_origin;
            if a.is_solid(pa.x, pa.y) && b.is_solid(pb.x, pb.y) {
                return Some(pa);
            }
        }
    }
    None
}

/// Whether a pixel colour reads as weapon steel
///
/// Steel is grayscale (no channel deviates from another by more than 5% of
/// the channel average) with an average strictly between 100 and 225. Alpha is
/// ignored.
pub fn classify_weapon_pixel(color: [u8; 4]) -> bool {
    let [r, g, b, _] = color.map(f32::from);
    let avg = (r + g + b) / 3.0;
    let max_diff = avg * 0.05;
    if (r - g).abs() > max_diff || (r - b).abs() > max_diff || (g - b).abs() > max_diff {
        return false;
    }
    avg > 100.0 && avg < 225.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let r = Rect::from_center(Vec2::new(100.0, 50.0), Vec2::new(20.0, 10.0));
        assert_eq!(r.left(), 90.0);
        assert_eq!(r.right(), 110.0);
        assert_eq!(r.top(), 45.0);
        assert_eq!(r.bottom(), 55.0);
    }

    #[test]
    fn test_touching_rects_do_not_share_columns() {
        let a = Rect::new(Vec2::ZERO, Vec2::splat(10.0));
        assert!(!a.overlaps_x(&a.translated(Vec2::new(10.0, 0.0))));
        assert!(a.overlaps_x(&a.translated(Vec2::new(9.5, 40.0))));
    }

    #[test]
    fn test_mask_overlap_reports_local_point() {
        let a = Frame::solid(10, 10, [255, 255, 255, 255]);
        let b = Frame::solid(10, 10, [255, 0, 0, 255]);
        let hit = mask_overlap(&a, IVec2::new(0, 0), &b, IVec2::new(6, 8));
        assert_eq!(hit, Some(IVec2::new(6, 8)));
    }

    #[test]
    fn test_mask_overlap_ignores_transparent_pixels() {
        let mut a = Frame::solid(4, 4, [0, 0, 0, 0]);
        a.image_mut().put_pixel(3, 3, image::Rgba([1, 2, 3, 255]));
        let b = Frame::solid(4, 4, [255, 0, 0, 255]);

        // Boxes overlap but a's only opaque pixel is outside b
        assert_eq!(mask_overlap(&a, IVec2::ZERO, &b, IVec2::new(-2, -2)), None);
        // Shift b so it covers (3, 3)
        assert_eq!(
            mask_overlap(&a, IVec2::ZERO, &b, IVec2::new(2, 2)),
            Some(IVec2::new(3, 3))
        );
    }

    #[test]
    fn test_mask_overlap_disjoint_boxes() {
        let a = Frame::solid(4, 4, [0, 0, 0, 255]);
        assert_eq!(mask_overlap(&a, IVec2::ZERO, &a, IVec2::new(4, 0)), None);
    }

    #[test]
    fn test_weapon_pixel_gray_midtones() {
        assert!(classify_weapon_pixel([150, 150, 150, 255]));
        assert!(classify_weapon_pixel([150, 154, 147, 255]));
        assert!(classify_weapon_pixel([101, 101, 101, 0]));
    }

    #[test]
    fn test_weapon_pixel_rejects_colour_and_extremes() {
        assert!(!classify_weapon_pixel([255, 0, 0, 255]));
        assert!(!classify_weapon_pixel([150, 170, 150, 255]));
        assert!(!classify_weapon_pixel([100, 100, 100, 255]));
        assert!(!classify_weapon_pixel([225, 225, 225, 255]));
        assert!(!classify_weapon_pixel([0, 0, 0, 255]));
        assert!(!classify_weapon_pixel([255, 255, 255, 255]));
    }
}
