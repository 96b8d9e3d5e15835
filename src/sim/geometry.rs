//! Axis-aligned rectangle geometry and play-field layout
//!
//! All coordinates are canvas pixels with y growing downward.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{BOUNDARY_FRACTION, CANVAS_ASPECT, MIN_BOUNDARY_SIZE};

/// An axis-aligned rectangle (top-left corner + size)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    /// A square with its top-left corner at `pos`
    pub fn square(pos: Vec2, side: f32) -> Self {
        Self {
            pos,
            size: Vec2::splat(side),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.size.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Strict overlap test: rectangles that only share an edge do not intersect
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        intersects(self, other)
    }

    /// Largest x a rect of `width` can take while staying inside `self`
    pub fn max_x_for(&self, width: f32) -> f32 {
        (self.right() - width).max(self.left())
    }

    /// Clamp a left-edge x so a rect of `width` stays inside `self`
    pub fn clamp_x(&self, x: f32, width: f32) -> f32 {
        x.clamp(self.left(), self.max_x_for(width))
    }
}

/// Returns true iff `a` and `b` overlap on both axes
pub fn intersects(a: &Rect, b: &Rect) -> bool {
    a.left() < b.right() && a.right() > b.left() && a.top() < b.bottom() && a.bottom() > b.top()
}

/// Largest canvas with the game's aspect ratio that fits in `viewport`
pub fn fit_canvas(viewport: Vec2) -> Vec2 {
    let viewport = viewport.max(Vec2::splat(MIN_BOUNDARY_SIZE));
    if viewport.x / viewport.y > CANVAS_ASPECT {
        Vec2::new(viewport.y * CANVAS_ASPECT, viewport.y)
    } else {
        Vec2::new(viewport.x, viewport.x / CANVAS_ASPECT)
    }
}

/// The play-field boundary centered in a canvas of the given size
pub fn boundary_for(canvas: Vec2) -> Rect {
    let size = (canvas * BOUNDARY_FRACTION).max(Vec2::splat(MIN_BOUNDARY_SIZE));
    Rect {
        pos: (canvas - size) * 0.5,
        size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersects_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!(intersects(&a, &b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let right = Rect::new(10.0, 0.0, 10.0, 10.0);
        let below = Rect::new(0.0, 10.0, 10.0, 10.0);
        let corner = Rect::new(10.0, 10.0, 5.0, 5.0);
        assert!(!intersects(&a, &right));
        assert!(!intersects(&a, &below));
        assert!(!intersects(&a, &corner));
    }

    #[test]
    fn test_separated_rects() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(0.0, 50.0, 10.0, 10.0);
        assert!(!intersects(&a, &b));
    }

    #[test]
    fn test_fit_canvas_letterboxes() {
        // Too wide: height limits
        let wide = fit_canvas(Vec2::new(2000.0, 900.0));
        assert!((wide.y - 900.0).abs() < 0.001);
        assert!((wide.x - 1600.0).abs() < 0.001);

        // Too tall: width limits
        let tall = fit_canvas(Vec2::new(800.0, 1200.0));
        assert!((tall.x - 800.0).abs() < 0.001);
        assert!((tall.y - 450.0).abs() < 0.001);
    }

    #[test]
    fn test_boundary_centered_in_canvas() {
        let boundary = boundary_for(Vec2::new(1600.0, 900.0));
        assert!((boundary.width() - 1280.0).abs() < 0.001);
        assert!((boundary.height() - 720.0).abs() < 0.001);
        assert!((boundary.left() - 160.0).abs() < 0.001);
        assert!((boundary.top() - 90.0).abs() < 0.001);
    }

    #[test]
    fn test_degenerate_viewport_keeps_positive_boundary() {
        let canvas = fit_canvas(Vec2::ZERO);
        let boundary = boundary_for(canvas);
        assert!(boundary.width() >= MIN_BOUNDARY_SIZE);
        assert!(boundary.height() >= MIN_BOUNDARY_SIZE);
        assert!(boundary.size.is_finite());
    }

    #[test]
    fn test_clamp_x() {
        let boundary = Rect::new(100.0, 50.0, 600.0, 400.0);
        assert_eq!(boundary.clamp_x(20.0, 30.0), 100.0);
        assert_eq!(boundary.clamp_x(690.0, 30.0), 670.0);
        assert_eq!(boundary.clamp_x(300.0, 30.0), 300.0);
        // Wider than the boundary pins to the left edge
        assert_eq!(boundary.clamp_x(300.0, 900.0), 100.0);
    }
}
