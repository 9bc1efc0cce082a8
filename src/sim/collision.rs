//! Collision oracle
//!
//! Stateless overlap and line-of-sight queries used by every actor. All
//! tests are discrete; nothing here sweeps or mutates.

use glam::Vec2;

use super::rect::Rect;

/// Rectangle overlap with strict inequalities
///
/// Rectangles that only share an edge do not overlap, so an actor resting
/// exactly on a platform top is not considered inside it.
#[inline]
pub fn aabb_overlap(a: &Rect, b: &Rect) -> bool {
    a.x < b.x + b.width && a.x + a.width > b.x && a.y < b.y + b.height && a.y + a.height > b.y
}

/// Inclusive point containment
#[inline]
pub fn point_in_rect(p: Vec2, rect: &Rect) -> bool {
    p.x >= rect.x && p.x <= rect.x + rect.width && p.y >= rect.y && p.y <= rect.y + rect.height
}

/// A circle for pickup and blast tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub const fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// Circles overlap when their centers are closer than the summed radii
#[inline]
pub fn circle_overlap(a: &Circle, b: &Circle) -> bool {
    a.center.distance(b.center) < a.radius + b.radius
}

/// Parametric segment intersection
///
/// Parallel segments never intersect, and the crossing must lie strictly
/// inside both segments: touching at an endpoint does not count.
pub fn segment_intersect(p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2) -> bool {
    let den = (p1.x - p2.x) * (p3.y - p4.y) - (p1.y - p2.y) * (p3.x - p4.x);
    if den == 0.0 {
        return false;
    }

    let t = ((p1.x - p3.x) * (p3.y - p4.y) - (p1.y - p3.y) * (p3.x - p4.x)) / den;
    let u = -((p1.x - p2.x) * (p1.y - p3.y) - (p1.y - p2.y) * (p1.x - p3.x)) / den;

    t > 0.0 && t < 1.0 && u > 0.0 && u < 1.0
}

/// True if the segment crosses any of the rectangle's four edges
///
/// A segment lying entirely inside the rectangle crosses no edge.
pub fn segment_blocked_by_rect(start: Vec2, end: Vec2, rect: &Rect) -> bool {
    rect.edges()
        .iter()
        .any(|&(a, b)| segment_intersect(start, end, a, b))
}

/// True iff no obstacle blocks the segment
pub fn line_of_sight_clear(start: Vec2, end: Vec2, obstacles: &[Rect]) -> bool {
    !obstacles
        .iter()
        .any(|rect| segment_blocked_by_rect(start, end, rect))
}

/// Index of the first platform overlapping `rect`, if any
pub fn first_overlap(rect: &Rect, platforms: &[Rect]) -> Option<usize> {
    platforms.iter().position(|p| aabb_overlap(rect, p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(aabb_overlap(&a, &Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!aabb_overlap(&a, &Rect::new(20.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn test_aabb_touching_edges_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        // Shares the right edge
        assert!(!aabb_overlap(&a, &Rect::new(10.0, 0.0, 10.0, 10.0)));
        // Resting on top
        assert!(!aabb_overlap(&a, &Rect::new(0.0, 10.0, 10.0, 10.0)));
    }

    #[test]
    fn test_point_in_rect_inclusive() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(point_in_rect(Vec2::new(0.0, 0.0), &r));
        assert!(point_in_rect(Vec2::new(10.0, 10.0), &r));
        assert!(point_in_rect(Vec2::new(5.0, 5.0), &r));
        assert!(!point_in_rect(Vec2::new(10.01, 5.0), &r));
    }

    #[test]
    fn test_circle_overlap_strict() {
        let a = Circle::new(Vec2::ZERO, 5.0);
        assert!(circle_overlap(&a, &Circle::new(Vec2::new(9.0, 0.0), 5.0)));
        assert!(!circle_overlap(&a, &Circle::new(Vec2::new(10.0, 0.0), 5.0)));
    }

    #[test]
    fn test_segment_intersect_crossing() {
        assert!(segment_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(10.0, 0.0)
        ));
    }

    #[test]
    fn test_segment_intersect_parallel() {
        assert!(!segment_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(0.0, 5.0),
            Vec2::new(10.0, 5.0)
        ));
    }

    #[test]
    fn test_segment_intersect_endpoint_touch_excluded() {
        // Second segment starts exactly on the first one's end
        assert!(!segment_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0)
        ));
    }

    #[test]
    fn test_segment_blocked_by_rect() {
        let wall = Rect::new(40.0, 0.0, 20.0, 100.0);
        assert!(segment_blocked_by_rect(
            Vec2::new(0.0, 50.0),
            Vec2::new(100.0, 50.0),
            &wall
        ));
        assert!(!segment_blocked_by_rect(
            Vec2::new(0.0, 150.0),
            Vec2::new(100.0, 150.0),
            &wall
        ));
    }

    #[test]
    fn test_line_of_sight() {
        let obstacles = [
            Rect::new(40.0, 0.0, 20.0, 100.0),
            Rect::new(200.0, 0.0, 20.0, 100.0),
        ];
        assert!(!line_of_sight_clear(
            Vec2::new(0.0, 50.0),
            Vec2::new(100.0, 50.0),
            &obstacles
        ));
        assert!(line_of_sight_clear(
            Vec2::new(80.0, 50.0),
            Vec2::new(150.0, 50.0),
            &obstacles
        ));
        assert!(line_of_sight_clear(Vec2::ZERO, Vec2::new(1.0, 1.0), &[]));
    }

    #[test]
    fn test_first_overlap() {
        let platforms = [Rect::new(0.0, 100.0, 50.0, 10.0), Rect::new(60.0, 0.0, 10.0, 10.0)];
        assert_eq!(first_overlap(&Rect::new(62.0, 2.0, 2.0, 2.0), &platforms), Some(1));
        assert_eq!(first_overlap(&Rect::new(200.0, 2.0, 2.0, 2.0), &platforms), None);
    }
}
