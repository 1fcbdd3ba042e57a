//! Toroidal geometry helpers
//!
//! The arena is a square surface whose opposite edges are glued together,
//! so every distance and angle between two points must use the wrapped
//! (shortest-path) delta. Agents sitting near opposite edges are spatially
//! adjacent; naive Euclidean math would tear the world apart at the seam.

use crate::util::vec2::Vec2;
use std::f32::consts::{PI, TAU};

/// Wrap a coordinate into `[0, map_size)`. Idempotent.
#[inline]
pub fn wrap(v: f32, map_size: f32) -> f32 {
    let r = v.rem_euclid(map_size);
    // rem_euclid can round up to exactly map_size for tiny negative inputs
    if r >= map_size {
        0.0
    } else {
        r
    }
}

/// Wrap both components of a point into the world square
#[inline]
pub fn wrap_point(p: Vec2, map_size: f32) -> Vec2 {
    Vec2::new(wrap(p.x, map_size), wrap(p.y, map_size))
}

#[inline]
fn axis_delta(from: f32, to: f32, map_size: f32) -> f32 {
    let half = map_size * 0.5;
    let mut d = to - from;
    if d > half {
        d -= map_size;
    } else if d < -half {
        d += map_size;
    }
    d
}

/// Shortest-path component delta from `a` to `b`, each component in
/// `[-map_size/2, map_size/2]`
#[inline]
pub fn delta(a: Vec2, b: Vec2, map_size: f32) -> Vec2 {
    Vec2::new(
        axis_delta(a.x, b.x, map_size),
        axis_delta(a.y, b.y, map_size),
    )
}

/// Wrapped shortest distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2, map_size: f32) -> f32 {
    delta(a, b, map_size).length()
}

/// Heading from `a` toward `b` along the shortest path
#[inline]
pub fn heading_to(a: Vec2, b: Vec2, map_size: f32) -> f32 {
    delta(a, b, map_size).angle()
}

/// Signed angular difference `target - current`, normalized into `(-π, π]`
/// so it always names the shortest rotation direction
#[inline]
pub fn angle_diff(target: f32, current: f32) -> f32 {
    let mut d = (target - current) % TAU;
    if d > PI {
        d -= TAU;
    } else if d <= -PI {
        d += TAU;
    }
    d
}

/// Normalize an angle into `[0, 2π)`
#[inline]
pub fn normalize_angle(a: f32) -> f32 {
    let r = a.rem_euclid(TAU);
    if r >= TAU {
        0.0
    } else {
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: f32 = 5000.0;

    #[test]
    fn test_wrap_range() {
        for v in [-10_001.5, -5000.0, -1.0, 0.0, 4999.9, 5000.0, 12_345.0] {
            let w = wrap(v, MAP);
            assert!((0.0..MAP).contains(&w), "wrap({v}) = {w}");
        }
    }

    #[test]
    fn test_wrap_idempotent() {
        for v in [-7777.7, -0.25, 0.0, 123.0, 4999.999, 9000.0] {
            let w = wrap(v, MAP);
            assert_eq!(wrap(w, MAP), w);
        }
    }

    #[test]
    fn test_distance_symmetric() {
        let a = Vec2::new(12.0, 4900.0);
        let b = Vec2::new(4980.0, 15.0);
        assert_eq!(distance(a, b, MAP), distance(b, a, MAP));
    }

    #[test]
    fn test_distance_never_exceeds_euclidean() {
        let pairs = [
            (Vec2::new(0.0, 0.0), Vec2::new(100.0, 100.0)),
            (Vec2::new(0.0, 0.0), Vec2::new(4999.0, 0.0)),
            (Vec2::new(2500.0, 2500.0), Vec2::new(0.0, 0.0)),
            (Vec2::new(10.0, 4990.0), Vec2::new(4990.0, 10.0)),
        ];
        for (a, b) in pairs {
            assert!(distance(a, b, MAP) <= a.distance_to(b) + 1e-3);
        }
    }

    #[test]
    fn test_distance_equals_euclidean_without_shortcut() {
        let a = Vec2::new(1000.0, 1000.0);
        let b = Vec2::new(1300.0, 1400.0);
        assert!((distance(a, b, MAP) - a.distance_to(b)).abs() < 1e-3);
    }

    #[test]
    fn test_edge_adjacency() {
        // Agent at (0,0) and food at (4999,0) are 1 unit apart, not ~4999
        let d = distance(Vec2::new(0.0, 0.0), Vec2::new(MAP - 1.0, 0.0), MAP);
        assert!((d - 1.0).abs() < 1e-3, "expected 1, got {d}");
    }

    #[test]
    fn test_heading_across_seam() {
        // Shortest path from near the right edge to near the left edge
        // points right (heading 0), through the seam
        let h = heading_to(Vec2::new(4990.0, 100.0), Vec2::new(10.0, 100.0), MAP);
        assert!(h.abs() < 1e-3, "expected ~0, got {h}");
    }

    #[test]
    fn test_angle_diff_shortest_rotation() {
        assert!((angle_diff(0.1, TAU - 0.1) - 0.2).abs() < 1e-5);
        assert!((angle_diff(TAU - 0.1, 0.1) + 0.2).abs() < 1e-5);
        assert!((angle_diff(PI, 0.0) - PI).abs() < 1e-5);
    }

    #[test]
    fn test_angle_diff_range() {
        for t in [-7.0_f32, -PI, 0.0, 1.0, PI, 6.0, 13.0] {
            for c in [-9.0_f32, 0.0, 2.0, TAU, 8.5] {
                let d = angle_diff(t, c);
                assert!(d > -PI && d <= PI, "angle_diff({t}, {c}) = {d}");
            }
        }
    }

    #[test]
    fn test_normalize_angle_range() {
        for a in [-13.0_f32, -TAU, -0.001, 0.0, 1.0, TAU, 100.0] {
            let n = normalize_angle(a);
            assert!((0.0..TAU).contains(&n), "normalize_angle({a}) = {n}");
        }
    }
}
