//! Segment and polygon intersection primitives.
//!
//! Segments are linear Bézier curves `start + t * (end - start)` with
//! `t` in `[0, 1]`. Closed polygons repeat their first vertex at the end.

use flanker_core::constants::{INTERSECT_EPSILON, PROBE_ROTATION};
use flanker_core::types::Vec2;

/// Intersection point of segments `a1-a2` and `b1-b2`, if any.
///
/// Near-parallel segments never intersect, including colinear overlap.
pub fn segment_intersect(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> Option<Vec2> {
    let da = a2 - a1;
    let db = b2 - b1;
    let denominator = da.perp_dot(db);
    if denominator.abs() <= INTERSECT_EPSILON {
        return None;
    }

    let offset = b1 - a1;
    let t = offset.perp_dot(db) / denominator;
    let u = offset.perp_dot(da) / denominator;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(a1 + da * t)
    } else {
        None
    }
}

/// All points where segment `start-end` crosses `polyline`.
///
/// A crossing exactly through a shared vertex is reported once.
pub fn polyline_intersections(start: Vec2, end: Vec2, polyline: &[Vec2]) -> Vec<Vec2> {
    let mut points: Vec<Vec2> = Vec::new();
    for edge in polyline.windows(2) {
        if let Some(point) = segment_intersect(start, end, edge[0], edge[1]) {
            if !points.contains(&point) {
                points.push(point);
            }
        }
    }
    points
}

/// True if `point` lies inside the closed `polygon`.
///
/// Casts a probe ray rightward past the polygon, tilted slightly so it
/// never runs exactly through a vertex, and counts crossings. Polygons
/// with fewer than three vertices or not closed (`first != last`) contain
/// nothing.
pub fn point_in_polygon(point: Vec2, polygon: &[Vec2]) -> bool {
    if polygon.len() <= 2 || polygon.first() != polygon.last() {
        return false;
    }

    let max_x = polygon
        .iter()
        .map(|v| v.x)
        .fold(f64::NEG_INFINITY, f64::max);
    let reach = Vec2::new(max_x.max(point.x) + 1.0, point.y) - point;
    let probe_end = point + Vec2::from_angle(PROBE_ROTATION).rotate(reach);

    polyline_intersections(point, probe_end, polygon).len() % 2 == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square() -> Vec<Vec2> {
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(0.0, 0.0),
        ]
    }

    #[test]
    fn test_crossing_segments() {
        let p = segment_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(0.0, 2.0),
            Vec2::new(2.0, 0.0),
        )
        .expect("segments cross");
        assert_relative_eq!(p.x, 1.0);
        assert_relative_eq!(p.y, 1.0);
    }

    #[test]
    fn test_parallel_segments_do_not_intersect() {
        let p = segment_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(2.0, 1.0),
        );
        assert!(p.is_none());

        // Colinear overlap is still "parallel"
        let p = segment_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(3.0, 0.0),
        );
        assert!(p.is_none());
    }

    #[test]
    fn test_segments_out_of_range() {
        let p = segment_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(2.0, -1.0),
            Vec2::new(2.0, 1.0),
        );
        assert!(p.is_none(), "lines meet at x=2, beyond the first segment");
    }

    #[test]
    fn test_touching_endpoint_counts() {
        let p = segment_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, -1.0),
            Vec2::new(1.0, 1.0),
        );
        assert_eq!(p, Some(Vec2::new(1.0, 0.0)));
    }

    #[test]
    fn test_polyline_dedups_shared_vertex() {
        // Diagonal through the square's corner (10, 10) hits two edges at one point
        let points = polyline_intersections(
            Vec2::new(5.0, 15.0),
            Vec2::new(15.0, 5.0),
            &unit_square(),
        );
        assert_eq!(points.len(), 1, "got {points:?}");
    }

    #[test]
    fn test_polyline_through_square() {
        let points = polyline_intersections(
            Vec2::new(-5.0, 5.0),
            Vec2::new(15.0, 5.0),
            &unit_square(),
        );
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn test_point_in_polygon() {
        let square = unit_square();
        assert!(point_in_polygon(Vec2::new(5.0, 5.0), &square));
        assert!(point_in_polygon(Vec2::new(0.5, 9.5), &square));
        assert!(!point_in_polygon(Vec2::new(15.0, 5.0), &square));
        assert!(!point_in_polygon(Vec2::new(-1.0, 5.0), &square));
        assert!(!point_in_polygon(Vec2::new(5.0, -0.5), &square));
    }

    #[test]
    fn test_point_aligned_with_vertex() {
        // Probe would run along the top edge without the tilt
        let square = unit_square();
        assert!(!point_in_polygon(Vec2::new(-5.0, 10.0), &square));
        assert!(!point_in_polygon(Vec2::new(-5.0, 0.0), &square));
    }

    #[test]
    fn test_open_polygon_contains_nothing() {
        let mut open = unit_square();
        open.pop();
        assert!(!point_in_polygon(Vec2::new(5.0, 5.0), &open));
        assert!(!point_in_polygon(Vec2::new(5.0, 5.0), &open[..2]));
    }

    #[test]
    fn test_concave_polygon() {
        // U shape opening upward
        let u_shape = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(30.0, 0.0),
            Vec2::new(30.0, 30.0),
            Vec2::new(20.0, 30.0),
            Vec2::new(20.0, 10.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(10.0, 30.0),
            Vec2::new(0.0, 30.0),
            Vec2::new(0.0, 0.0),
        ];
        assert!(point_in_polygon(Vec2::new(5.0, 20.0), &u_shape));
        assert!(point_in_polygon(Vec2::new(25.0, 20.0), &u_shape));
        assert!(!point_in_polygon(Vec2::new(15.0, 20.0), &u_shape));
        assert!(point_in_polygon(Vec2::new(15.0, 5.0), &u_shape));
    }
}
