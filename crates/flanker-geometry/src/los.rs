//! Line of sight against opaque terrain.
//!
//! A spotter may see *into* one obstacle but not *through* it, and terrain
//! the spotter stands inside never blocks its view outward.

use std::f64::consts::FRAC_PI_2;

use flanker_core::constants::{LOS_COLINEAR_EPSILON, LOS_SNAP_DISTANCE};
use flanker_core::types::{EntityId, TerrainFlags, Vec2};

use crate::intersect::{point_in_polygon, polyline_intersections};
use crate::obstacle::Obstacle;

/// True if `target` is visible from `spotter`.
///
/// Counts edge crossings of the sight line with every obstacle the spotter
/// is not inside. One crossing (looking into an obstacle) is allowed.
pub fn can_see(spotter: Vec2, target: Vec2, obstacles: &[Obstacle]) -> bool {
    let mut crossed = 0;
    for obstacle in obstacles {
        if obstacle.contains(spotter) {
            continue;
        }
        crossed += polyline_intersections(spotter, target, &obstacle.outline).len();
        if crossed > 1 {
            return false;
        }
    }
    true
}

/// Every point where segment `start-end` crosses an obstacle edge,
/// tagged with the obstacle it belongs to.
pub fn crossings(start: Vec2, end: Vec2, obstacles: &[Obstacle]) -> Vec<(EntityId, Vec2)> {
    obstacles
        .iter()
        .flat_map(|obstacle| {
            polyline_intersections(start, end, &obstacle.outline)
                .into_iter()
                .map(move |point| (obstacle.id, point))
        })
        .collect()
}

/// Closed polygon bounding everything visible from `origin`.
///
/// Rays are cast in pairs, offset by `jitter` either side of each
/// obstacle vertex and of the four axis directions. Each ray stops at its
/// second hit (seeing into the first obstacle), its only hit, or at
/// `radius`. Obstacles containing `origin` are ignored unless they are the
/// map boundary.
pub fn visibility_polygon(
    origin: Vec2,
    obstacles: &[Obstacle],
    radius: f64,
    jitter: f64,
) -> Vec<Vec2> {
    let blocking: Vec<&Obstacle> = obstacles
        .iter()
        .filter(|o| o.flag.intersects(TerrainFlags::BOUNDARY) || !o.contains(origin))
        .collect();

    let mut aims: Vec<Vec2> = blocking
        .iter()
        .flat_map(|o| o.vertices().iter().copied())
        .collect();
    aims.extend((0..4).map(|k| origin + Vec2::from_angle(k as f64 * FRAC_PI_2) * radius));
    aims.sort_by(|a, b| bearing(origin, *a).total_cmp(&bearing(origin, *b)));

    let mut points: Vec<Vec2> = Vec::with_capacity(aims.len() * 2 + 1);
    for aim in aims {
        let direction = (aim - origin).normalize_or_zero();
        if direction == Vec2::ZERO {
            continue;
        }
        let ray = direction * radius;
        let offset = direction.perp() * jitter;

        for start in [origin - offset, origin + offset] {
            let mut hits: Vec<Vec2> = blocking
                .iter()
                .flat_map(|o| polyline_intersections(start, start + ray, &o.outline))
                .collect();
            hits.sort_by(|a, b| a.distance(origin).total_cmp(&b.distance(origin)));

            let mut point = match hits.as_slice() {
                [] => origin + ray,
                [only] => *only,
                [_, second, ..] => *second,
            };
            if point.distance(aim) < LOS_SNAP_DISTANCE {
                point = aim;
            }
            if points.last() == Some(&point) {
                continue;
            }
            if extends_last_edge(&points, point) {
                if let Some(last) = points.last_mut() {
                    *last = point;
                }
                continue;
            }
            points.push(point);
        }
    }

    if let Some(first) = points.first().copied() {
        points.push(first);
    }
    points
}

/// Batched visibility: for each of `targets`, whether it lies inside the
/// visibility polygon from `origin`.
pub fn visible_points(
    origin: Vec2,
    targets: &[Vec2],
    obstacles: &[Obstacle],
    radius: f64,
    jitter: f64,
) -> Vec<bool> {
    let polygon = visibility_polygon(origin, obstacles, radius, jitter);
    targets
        .iter()
        .map(|target| point_in_polygon(*target, &polygon))
        .collect()
}

/// Angle of `point` around `origin`, in `[0, 2π)`.
fn bearing(origin: Vec2, point: Vec2) -> f64 {
    let rel = point - origin;
    rel.y.atan2(rel.x).rem_euclid(std::f64::consts::TAU)
}

/// True if `point` is colinear with the last two accepted points.
fn extends_last_edge(points: &[Vec2], point: Vec2) -> bool {
    match points {
        [.., a, b] => (*b - *a).perp_dot(point - *a).abs() < LOS_COLINEAR_EPSILON,
        _ => false,
    }
}
