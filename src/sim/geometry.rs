//! Polygon queries shared by the generator, the integrator and observation builders
//!
//! Boundaries are closed loops: the last point connects back to the first.
//! Every query is a brute-force scan over edges, O(n) per call.

use glam::Vec2;

/// Guards divisions by (near-)zero edge lengths
const EPS: f32 = 1e-12;

/// Iterate the edges of a closed polygon as (start, end) pairs
pub fn edges(poly: &[Vec2]) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
    let n = poly.len();
    (0..n).map(move |i| (poly[i], poly[(i + 1) % n]))
}

/// Even-odd ray-casting point-in-polygon test
///
/// A polygon with fewer than three points contains nothing.
pub fn point_in_polygon(point: Vec2, poly: &[Vec2]) -> bool {
    if poly.len() < 3 {
        return false;
    }
    let mut inside = false;
    for (a, b) in edges(poly) {
        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = (b.x - a.x) * (point.y - a.y) / ((b.y - a.y) + EPS) + a.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
    }
    inside
}

/// Closest point to `p` on segment `a`-`b`
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= EPS {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Result of a nearest-boundary query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryHit {
    /// Closest point on the polygon
    pub point: Vec2,
    /// Unit vector from `point` toward the query point
    pub normal: Vec2,
    /// Distance from the query point to `point`
    pub distance: f32,
    /// Index of the edge (start vertex) that owns `point`
    pub edge: usize,
}

/// Nearest point on a closed polygon's outline
///
/// The normal points from the outline toward the query point. When the query
/// point lies exactly on the outline the edge's left-hand perpendicular is used.
pub fn nearest_on_polygon(point: Vec2, poly: &[Vec2]) -> Option<BoundaryHit> {
    if poly.len() < 2 {
        return None;
    }

    let mut best: Option<(Vec2, f32, usize)> = None;
    for (i, (a, b)) in edges(poly).enumerate() {
        let q = closest_point_on_segment(point, a, b);
        let d2 = q.distance_squared(point);
        if best.is_none_or(|(_, best_d2, _)| d2 < best_d2) {
            best = Some((q, d2, i));
        }
    }

    best.map(|(q, d2, edge)| {
        let (a, b) = (poly[edge], poly[(edge + 1) % poly.len()]);
        let normal = (point - q)
            .try_normalize()
            .or_else(|| (b - a).perp().try_normalize())
            .unwrap_or(Vec2::Y);
        BoundaryHit {
            point: q,
            normal,
            distance: d2.sqrt(),
            edge,
        }
    })
}

/// Distance along a ray to the first crossing of any polygon outline
///
/// Returns `max_len` when nothing is hit within range. `direction` need not be
/// normalized.
pub fn ray_cast(origin: Vec2, direction: Vec2, max_len: f32, polygons: &[&[Vec2]]) -> f32 {
    let Some(dir) = direction.try_normalize() else {
        return max_len;
    };
    let end = origin + dir * max_len;
    let mut closest = max_len;

    for poly in polygons {
        if poly.len() < 2 {
            continue;
        }
        for (a, b) in edges(poly) {
            if let Some(t) = segment_intersection(origin, end, a, b) {
                closest = closest.min(t * max_len);
            }
        }
    }
    closest
}

/// Parameter along `p0`-`p1` where it crosses `q0`-`q1`, if the segments intersect
pub fn segment_intersection(p0: Vec2, p1: Vec2, q0: Vec2, q1: Vec2) -> Option<f32> {
    let r = p1 - p0;
    let s = q1 - q0;
    let denom = r.perp_dot(s);
    if denom.abs() <= EPS {
        // Parallel or collinear; treat as a miss
        return None;
    }
    let qp = q0 - p0;
    let t = qp.perp_dot(s) / denom;
    let u = qp.perp_dot(r) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(t)
    } else {
        None
    }
}

/// Reflect velocity off a surface with given normal
///
/// `restitution` scales the bounced normal component (1.0 = elastic).
#[inline]
pub fn reflect(vel: Vec2, normal: Vec2, restitution: f32) -> Vec2 {
    vel - (1.0 + restitution) * vel.dot(normal) * normal
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(half: f32) -> Vec<Vec2> {
        vec![
            Vec2::new(-half, -half),
            Vec2::new(half, -half),
            Vec2::new(half, half),
            Vec2::new(-half, half),
        ]
    }

    #[test]
    fn test_point_in_polygon_square() {
        let sq = square(10.0);
        assert!(point_in_polygon(Vec2::ZERO, &sq));
        assert!(point_in_polygon(Vec2::new(9.9, -9.9), &sq));
        assert!(!point_in_polygon(Vec2::new(10.5, 0.0), &sq));
        assert!(!point_in_polygon(Vec2::new(0.0, -20.0), &sq));
    }

    #[test]
    fn test_point_in_polygon_degenerate() {
        assert!(!point_in_polygon(Vec2::ZERO, &[]));
        assert!(!point_in_polygon(Vec2::ZERO, &[Vec2::ZERO, Vec2::X]));
    }

    #[test]
    fn test_closest_point_on_segment_clamps() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        assert_eq!(closest_point_on_segment(Vec2::new(5.0, 3.0), a, b), Vec2::new(5.0, 0.0));
        assert_eq!(closest_point_on_segment(Vec2::new(-5.0, 3.0), a, b), a);
        assert_eq!(closest_point_on_segment(Vec2::new(15.0, -1.0), a, b), b);
        // Degenerate segment
        assert_eq!(closest_point_on_segment(Vec2::ONE, a, a), a);
    }

    #[test]
    fn test_nearest_on_polygon_normal_points_to_query() {
        let sq = square(10.0);
        let p = Vec2::new(14.0, 2.0);
        let hit = nearest_on_polygon(p, &sq).unwrap();
        assert!((hit.point - Vec2::new(10.0, 2.0)).length() < 1e-5);
        assert!((hit.normal - Vec2::X).length() < 1e-5);
        assert!((hit.distance - 4.0).abs() < 1e-5);
        assert_eq!(hit.edge, 1);
    }

    #[test]
    fn test_nearest_on_polygon_empty() {
        assert!(nearest_on_polygon(Vec2::ZERO, &[]).is_none());
    }

    #[test]
    fn test_ray_cast_hits_nearest_wall() {
        let outer = square(100.0);
        let inner = square(20.0);
        let polys: [&[Vec2]; 2] = [&outer, &inner];

        // From between the walls, looking right toward the outer wall
        let d = ray_cast(Vec2::new(50.0, 0.0), Vec2::X, 300.0, &polys);
        assert!((d - 50.0).abs() < 1e-3);

        // Looking left hits the inner square first
        let d = ray_cast(Vec2::new(50.0, 0.0), -Vec2::X, 300.0, &polys);
        assert!((d - 30.0).abs() < 1e-3);

        // Out of range
        let d = ray_cast(Vec2::new(50.0, 0.0), Vec2::X, 10.0, &polys);
        assert_eq!(d, 10.0);
    }

    #[test]
    fn test_reflect_with_restitution() {
        let v = Vec2::new(100.0, 20.0);
        let n = Vec2::new(-1.0, 0.0);
        let r = reflect(v, n, 1.0);
        assert!((r - Vec2::new(-100.0, 20.0)).length() < 1e-4);
        let r = reflect(v, n, 0.0);
        assert!((r - Vec2::new(0.0, 20.0)).length() < 1e-4);
    }
}
