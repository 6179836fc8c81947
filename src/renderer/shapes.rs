//! Shape generation for 2D primitives

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::Vertex;

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Two triangles covering the quad `a b c d` (in winding order)
fn quad(a: Vec2, b: Vec2, c: Vec2, d: Vec2, color: [f32; 4]) -> [Vertex; 6] {
    [
        Vertex::new(a.x, a.y, color),
        Vertex::new(b.x, b.y, color),
        Vertex::new(c.x, c.y, color),
        Vertex::new(c.x, c.y, color),
        Vertex::new(d.x, d.y, color),
        Vertex::new(a.x, a.y, color),
    ]
}

/// Generate vertices for a rectangle rotated by `angle` radians about its centre
pub fn rect(center: Vec2, size: Vec2, angle: f32, color: [f32; 4]) -> [Vertex; 6] {
    let rot = Vec2::from_angle(angle);
    let half = size / 2.0;
    let corner = |x: f32, y: f32| center + rot.rotate(Vec2::new(x, y));

    quad(
        corner(-half.x, -half.y),
        corner(half.x, -half.y),
        corner(half.x, half.y),
        corner(-half.x, half.y),
        color,
    )
}

/// Generate vertices for a thick line from `a` to `b`
pub fn segment(a: Vec2, b: Vec2, width: f32, color: [f32; 4]) -> [Vertex; 6] {
    let dir = (b - a).normalize_or_zero();
    // Perpendicular for width
    let perp = Vec2::new(-dir.y, dir.x) * (width / 2.0);

    quad(a + perp, b + perp, b - perp, a - perp, color)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(v: &Vertex) -> Vec2 {
        Vec2::from(v.position)
    }

    #[test]
    fn test_circle_vertex_count() {
        let verts = circle(Vec2::ZERO, 10.0, [1.0; 4], 16);
        assert_eq!(verts.len(), 48);
        assert!(verts.iter().all(|v| pos(v).length() <= 10.0 + 1e-4));
    }

    #[test]
    fn test_rect_unrotated_corners() {
        let verts = rect(Vec2::new(10.0, 20.0), Vec2::new(4.0, 6.0), 0.0, [1.0; 4]);
        assert_eq!(pos(&verts[0]), Vec2::new(8.0, 17.0));
        assert_eq!(pos(&verts[2]), Vec2::new(12.0, 23.0));
    }

    #[test]
    fn test_rect_quarter_turn() {
        let verts = rect(Vec2::ZERO, Vec2::new(4.0, 2.0), PI / 2.0, [1.0; 4]);
        // A 4x2 box turned a quarter stands 2 wide and 4 tall
        for v in &verts {
            assert!((pos(v).x.abs() - 1.0).abs() < 1e-4);
            assert!((pos(v).y.abs() - 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_segment_width() {
        let verts = segment(Vec2::ZERO, Vec2::new(10.0, 0.0), 4.0, [1.0; 4]);
        assert_eq!(pos(&verts[0]), Vec2::new(0.0, 2.0));
        assert_eq!(pos(&verts[2]), Vec2::new(10.0, -2.0));
    }

    #[test]
    fn test_degenerate_segment_collapses() {
        let verts = segment(Vec2::ONE, Vec2::ONE, 4.0, [1.0; 4]);
        assert!(verts.iter().all(|v| pos(v) == Vec2::ONE));
    }
}
