//! Closed-loop curve smoothing
//!
//! Both routines treat their input as a loop: the last point joins the first.

use glam::Vec2;

/// Chaikin corner cutting on a closed loop
///
/// Each pass replaces every edge with points at 1/4 and 3/4 along it, doubling
/// the point count and rounding corners.
pub fn chaikin_loop(points: &[Vec2], iterations: u32) -> Vec<Vec2> {
    let mut pts = points.to_vec();
    for _ in 0..iterations {
        let n = pts.len();
        if n < 2 {
            break;
        }
        let mut out = Vec::with_capacity(n * 2);
        for i in 0..n {
            let p0 = pts[i];
            let p1 = pts[(i + 1) % n];
            out.push(p0.lerp(p1, 0.25));
            out.push(p0.lerp(p1, 0.75));
        }
        pts = out;
    }
    pts
}

/// Number of samples each segment receives for a requested total
///
/// Never fewer than six per segment, so heavily smoothed loops stay dense.
pub fn samples_per_segment(control_count: usize, requested: usize) -> usize {
    (requested / control_count.max(1)).max(6)
}

/// Uniform Catmull-Rom interpolation through a closed loop of controls
///
/// Passes through every control point; sample `k` of segment `i` sits at
/// parameter `k / seg_samples` between controls `i` and `i + 1`.
pub fn catmull_rom_loop(controls: &[Vec2], requested: usize) -> Vec<Vec2> {
    let n = controls.len();
    if n == 0 {
        return Vec::new();
    }
    let seg_samples = samples_per_segment(n, requested);
    let mut pts = Vec::with_capacity(n * seg_samples);

    for i in 0..n {
        let p0 = controls[(i + n - 1) % n];
        let p1 = controls[i];
        let p2 = controls[(i + 1) % n];
        let p3 = controls[(i + 2) % n];
        for k in 0..seg_samples {
            let t = k as f32 / seg_samples as f32;
            pts.push(catmull_rom(p0, p1, p2, p3, t));
        }
    }
    pts
}

/// Evaluate one uniform Catmull-Rom segment between `p1` and `p2`
#[inline]
pub fn catmull_rom(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * (2.0 * p1
        + (-p0 + p2) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * t3)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Vec<Vec2> {
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn test_chaikin_doubles_points() {
        let sq = unit_square();
        assert_eq!(chaikin_loop(&sq, 0).len(), 4);
        assert_eq!(chaikin_loop(&sq, 1).len(), 8);
        assert_eq!(chaikin_loop(&sq, 3).len(), 32);
    }

    #[test]
    fn test_chaikin_quarter_points() {
        let out = chaikin_loop(&unit_square(), 1);
        assert_eq!(out[0], Vec2::new(0.25, 0.0));
        assert_eq!(out[1], Vec2::new(0.75, 0.0));
        // Closing edge (0,1) -> (0,0)
        assert_eq!(out[7], Vec2::new(0.0, 0.25));
    }

    #[test]
    fn test_catmull_rom_passes_through_controls() {
        let sq = unit_square();
        let pts = catmull_rom_loop(&sq, 24);
        let per = samples_per_segment(4, 24);
        assert_eq!(pts.len(), 4 * per);
        for (i, c) in sq.iter().enumerate() {
            assert!((pts[i * per] - *c).length() < 1e-6);
        }
    }

    #[test]
    fn test_samples_per_segment_floor() {
        assert_eq!(samples_per_segment(40, 80), 6);
        assert_eq!(samples_per_segment(4, 80), 20);
        assert_eq!(samples_per_segment(0, 10), 10);
    }
}
