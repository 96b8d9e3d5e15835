//! Shape generation for 2D primitives
//!
//! Everything is emitted as a triangle list in canvas pixel space (origin top
//! left, y down). `RenderState` maps to clip space on upload.

use glam::Vec2;

use super::vertex::{Vertex, colors};
use crate::sim::{ObstacleKind, Rect, Snapshot};

/// Boundary outline thickness in pixels
const BOUNDARY_LINE_WIDTH: f32 = 2.0;

/// Generate vertices for a filled axis-aligned rectangle
pub fn filled_rect(rect: &Rect, color: [f32; 4]) -> Vec<Vertex> {
    let (l, t, r, b) = (rect.left(), rect.top(), rect.right(), rect.bottom());
    vec![
        Vertex::new(l, t, color),
        Vertex::new(l, b, color),
        Vertex::new(r, t, color),
        Vertex::new(r, t, color),
        Vertex::new(l, b, color),
        Vertex::new(r, b, color),
    ]
}

/// Generate vertices for a rectangle outline centered on the rect's edges
pub fn rect_outline(rect: &Rect, thickness: f32, color: [f32; 4]) -> Vec<Vertex> {
    let half = thickness / 2.0;
    let outer_w = rect.width() + thickness;
    let inner_h = (rect.height() - thickness).max(0.0);

    let edges = [
        // Top and bottom span the full outer width
        Rect::new(rect.left() - half, rect.top() - half, outer_w, thickness),
        Rect::new(rect.left() - half, rect.bottom() - half, outer_w, thickness),
        // Sides fill the gap between them
        Rect::new(rect.left() - half, rect.top() + half, thickness, inner_h),
        Rect::new(rect.right() - half, rect.top() + half, thickness, inner_h),
    ];

    edges
        .iter()
        .flat_map(|edge| filled_rect(edge, color))
        .collect()
}

pub fn obstacle_color(kind: &ObstacleKind) -> [f32; 4] {
    match kind {
        ObstacleKind::Normal { .. } => colors::NORMAL,
        ObstacleKind::Moving { .. } => colors::MOVING,
        ObstacleKind::Split { .. } => colors::SPLIT,
    }
}

/// Build the full frame: boundary, player, then obstacles in spawn order
pub fn scene_vertices(snapshot: &Snapshot<'_>) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(24 + 6 * (snapshot.obstacles.len() + 1));
    vertices.extend(rect_outline(
        &snapshot.boundary,
        BOUNDARY_LINE_WIDTH,
        colors::BOUNDARY,
    ));
    vertices.extend(filled_rect(&snapshot.player, colors::PLAYER));
    for obstacle in snapshot.obstacles {
        vertices.extend(filled_rect(&obstacle.rect, obstacle_color(&obstacle.kind)));
    }
    vertices
}

/// Map a canvas pixel position to clip space
pub fn to_ndc(point: Vec2, canvas: Vec2) -> Vec2 {
    let w = canvas.x.max(1.0);
    let h = canvas.y.max(1.0);
    Vec2::new(point.x / w * 2.0 - 1.0, 1.0 - point.y / h * 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Obstacle;

    #[test]
    fn test_filled_rect_covers_corners() {
        let verts = filled_rect(&Rect::new(10.0, 20.0, 30.0, 40.0), colors::PLAYER);
        assert_eq!(verts.len(), 6);
        let xs: Vec<f32> = verts.iter().map(|v| v.position[0]).collect();
        let ys: Vec<f32> = verts.iter().map(|v| v.position[1]).collect();
        assert_eq!(xs.iter().cloned().fold(f32::INFINITY, f32::min), 10.0);
        assert_eq!(xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max), 40.0);
        assert_eq!(ys.iter().cloned().fold(f32::INFINITY, f32::min), 20.0);
        assert_eq!(ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max), 60.0);
    }

    #[test]
    fn test_outline_straddles_edges() {
        let verts = rect_outline(&Rect::new(100.0, 50.0, 600.0, 400.0), 2.0, colors::BOUNDARY);
        assert_eq!(verts.len(), 24);
        let min_x = verts.iter().map(|v| v.position[0]).fold(f32::INFINITY, f32::min);
        let max_y = verts.iter().map(|v| v.position[1]).fold(f32::NEG_INFINITY, f32::max);
        assert_eq!(min_x, 99.0);
        assert_eq!(max_y, 451.0);
    }

    #[test]
    fn test_scene_draws_every_obstacle_in_order() {
        let obstacles = vec![
            Obstacle::new(
                1,
                Rect::new(120.0, 60.0, 30.0, 30.0),
                3.0,
                ObstacleKind::Normal { can_split: true },
            ),
            Obstacle::new(
                2,
                Rect::new(200.0, 60.0, 30.0, 30.0),
                3.0,
                ObstacleKind::Moving { vx: 1.0, can_split: false },
            ),
            Obstacle::new(3, Rect::new(300.0, 60.0, 30.0, 30.0), 3.0, ObstacleKind::Split { vx: -1.5 }),
        ];
        let snapshot = Snapshot {
            canvas: Vec2::new(800.0, 450.0),
            boundary: Rect::new(80.0, 45.0, 640.0, 360.0),
            player: Rect::new(384.0, 363.0, 32.0, 32.0),
            obstacles: &obstacles,
            display_score: 0,
            elapsed_seconds: 0,
        };

        let verts = scene_vertices(&snapshot);
        assert_eq!(verts.len(), 24 + 6 + 18);
        assert_eq!(verts[24].color, colors::PLAYER);
        assert_eq!(verts[30].color, colors::NORMAL);
        assert_eq!(verts[36].color, colors::MOVING);
        assert_eq!(verts[42].color, colors::SPLIT);
    }

    #[test]
    fn test_to_ndc_corners() {
        let canvas = Vec2::new(800.0, 450.0);
        assert_eq!(to_ndc(Vec2::ZERO, canvas), Vec2::new(-1.0, 1.0));
        assert_eq!(to_ndc(canvas, canvas), Vec2::new(1.0, -1.0));
        assert_eq!(to_ndc(canvas / 2.0, canvas), Vec2::ZERO);
    }
}
