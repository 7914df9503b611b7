//! Track descriptor and the queries cars and observers run against it
//!
//! A descriptor is immutable once generated. Cars only read it, so one
//! descriptor can be shared by any number of cars.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{self, BoundaryHit};
use crate::tuning::Weather;
use crate::{direction, heading};

/// Driving surface under a point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    /// Between inner and outer boundary
    Asphalt,
    /// Infield, inside the inner boundary
    Grass,
    /// Outside the outer boundary
    Offroad,
}

/// Which boundary a nearest-point query landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundarySide {
    Inner,
    Outer,
}

/// A lap checkpoint laid along the centerline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub position: Vec2,
    /// Forward direction of the centerline at this checkpoint (unit length)
    pub direction: Vec2,
    /// Ordinal; checkpoint 0 sits on the start line
    pub index: usize,
    /// Set by the race session, never by the generator
    #[serde(default)]
    pub passed: bool,
}

/// A generated circuit
///
/// `centerline`, both boundaries and `racing_line` are closed loops of equal
/// length; index `i` of each refers to the same cross-section of the track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackDescriptor {
    pub centerline: Vec<Vec2>,
    #[serde(alias = "inner_boundary")]
    pub inner_boundary: Vec<Vec2>,
    #[serde(alias = "outer_boundary")]
    pub outer_boundary: Vec<Vec2>,
    #[serde(alias = "racing_line")]
    pub racing_line: Vec<Vec2>,
    pub checkpoints: Vec<Checkpoint>,
    #[serde(alias = "start_pos")]
    pub start_pos: Vec2,
    #[serde(alias = "start_angle")]
    pub start_angle: f32,
    /// Geometry width actually used (may be below the requested width)
    pub width: f32,
    /// Seed the track was generated from; `None` for unseeded generation
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default, alias = "intended_weather")]
    pub weather_tag: Weather,
}

impl TrackDescriptor {
    /// Number of cross-sections (centerline points)
    pub fn len(&self) -> usize {
        self.centerline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centerline.is_empty()
    }

    /// Whether the outer boundary is usable as a wall
    pub fn has_outer_wall(&self) -> bool {
        self.outer_boundary.len() >= 3
    }

    /// Inside the outer boundary; a missing outer boundary contains everything
    pub fn inside_outer(&self, point: Vec2) -> bool {
        !self.has_outer_wall() || geometry::point_in_polygon(point, &self.outer_boundary)
    }

    /// Classify the surface under a point
    ///
    /// Missing boundaries degrade toward asphalt: no outer boundary means no
    /// offroad, no inner boundary means no grass.
    pub fn surface_at(&self, point: Vec2) -> Surface {
        if !self.inside_outer(point) {
            Surface::Offroad
        } else if geometry::point_in_polygon(point, &self.inner_boundary) {
            Surface::Grass
        } else {
            Surface::Asphalt
        }
    }

    /// Closest point on the outer wall, with the normal pointing at `point`
    pub fn nearest_outer_wall(&self, point: Vec2) -> Option<BoundaryHit> {
        if !self.has_outer_wall() {
            return None;
        }
        geometry::nearest_on_polygon(point, &self.outer_boundary)
    }

    /// Closest point over both boundaries
    pub fn nearest_boundary(&self, point: Vec2) -> Option<(BoundaryHit, BoundarySide)> {
        let inner = geometry::nearest_on_polygon(point, &self.inner_boundary)
            .map(|h| (h, BoundarySide::Inner));
        let outer = geometry::nearest_on_polygon(point, &self.outer_boundary)
            .map(|h| (h, BoundarySide::Outer));
        match (inner, outer) {
            (Some(i), Some(o)) => Some(if o.0.distance <= i.0.distance { o } else { i }),
            (i, o) => i.or(o),
        }
    }

    /// Fan of ray distances to the nearest boundary
    ///
    /// `offsets` are angles in degrees relative to `angle`; each distance is
    /// capped at `max_len`.
    pub fn ray_distances(&self, origin: Vec2, angle: f32, offsets: &[f32], max_len: f32) -> Vec<f32> {
        let polys: [&[Vec2]; 2] = [&self.outer_boundary, &self.inner_boundary];
        offsets
            .iter()
            .map(|deg| {
                let dir = direction(angle + deg.to_radians());
                geometry::ray_cast(origin, dir, max_len, &polys)
            })
            .collect()
    }

    /// Index of the centerline point closest to `point`
    pub fn nearest_centerline_index(&self, point: Vec2) -> Option<usize> {
        self.centerline
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.distance_squared(point)
                    .partial_cmp(&b.distance_squared(point))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i)
    }

    /// Two side-by-side starting slots straddling the start line
    pub fn grid_positions(&self) -> (Vec2, Vec2) {
        let start = self.start_pos;
        if self.centerline.len() < 2 {
            return (start, start - Vec2::new(40.0, 0.0));
        }
        let tangent = direction(heading(self.centerline[0], self.centerline[1]));
        let normal = tangent.perp();
        let offset = (self.width * 0.22).max(8.0);
        (start - normal * offset, start + normal * offset)
    }
}

#[cfg(test)]
pub(crate) mod test_tracks {
    use super::*;

    fn circle(center: Vec2, r: f32, n: usize) -> Vec<Vec2> {
        (0..n)
            .map(|i| center + direction(std::f32::consts::TAU * i as f32 / n as f32) * r)
            .collect()
    }

    /// Circular ring: infield below `r_in`, wall at `r_out`
    pub(crate) fn ring(center: Vec2, r_in: f32, r_out: f32, n: usize) -> TrackDescriptor {
        let mid = (r_in + r_out) * 0.5;
        let centerline = circle(center, mid, n);
        TrackDescriptor {
            start_pos: centerline[0],
            start_angle: heading(centerline[0], centerline[1]),
            racing_line: centerline.clone(),
            inner_boundary: circle(center, r_in, n),
            outer_boundary: circle(center, r_out, n),
            centerline,
            checkpoints: Vec::new(),
            width: r_out - r_in,
            seed: None,
            weather_tag: Weather::Clear,
        }
    }

    /// Signed area (positive for counter-clockwise in a y-up frame)
    pub(crate) fn signed_area(poly: &[Vec2]) -> f32 {
        geometry::edges(poly).map(|(a, b)| a.perp_dot(b)).sum::<f32>() * 0.5
    }

    /// Average of the polygon's vertices
    pub(crate) fn centroid(poly: &[Vec2]) -> Vec2 {
        if poly.is_empty() {
            return Vec2::ZERO;
        }
        poly.iter().copied().sum::<Vec2>() / poly.len() as f32
    }

    /// Huge square with no infield: everything inside is asphalt
    pub(crate) fn open_square(half: f32) -> TrackDescriptor {
        let mut t = ring(Vec2::ZERO, 0.0, half, 4);
        t.outer_boundary = vec![
            Vec2::new(-half, -half),
            Vec2::new(half, -half),
            Vec2::new(half, half),
            Vec2::new(-half, half),
        ];
        t.inner_boundary.clear();
        t
    }
}

#[cfg(test)]
mod tests {
    use super::test_tracks::*;
    use super::*;

    #[test]
    fn test_fixture_winding() {
        let track = open_square(1.0);
        assert!((signed_area(&track.outer_boundary) - 4.0).abs() < 1e-5);
        let rev: Vec<Vec2> = track.outer_boundary.iter().rev().copied().collect();
        assert!((signed_area(&rev) + 4.0).abs() < 1e-5);
        assert_eq!(centroid(&track.outer_boundary), Vec2::ZERO);
    }

    #[test]
    fn test_surface_classification() {
        let track = ring(Vec2::ZERO, 100.0, 200.0, 64);
        assert_eq!(track.surface_at(Vec2::new(150.0, 0.0)), Surface::Asphalt);
        assert_eq!(track.surface_at(Vec2::new(10.0, 0.0)), Surface::Grass);
        assert_eq!(track.surface_at(Vec2::new(250.0, 0.0)), Surface::Offroad);
    }

    #[test]
    fn test_missing_boundaries_degrade_to_asphalt() {
        let mut track = ring(Vec2::ZERO, 100.0, 200.0, 64);
        track.inner_boundary.clear();
        assert_eq!(track.surface_at(Vec2::new(10.0, 0.0)), Surface::Asphalt);
        track.outer_boundary.clear();
        assert_eq!(track.surface_at(Vec2::new(5000.0, 0.0)), Surface::Asphalt);
        assert!(track.nearest_outer_wall(Vec2::ZERO).is_none());
    }

    #[test]
    fn test_nearest_boundary_picks_closer_side() {
        let track = ring(Vec2::ZERO, 100.0, 200.0, 128);
        let (hit, side) = track.nearest_boundary(Vec2::new(110.0, 0.0)).unwrap();
        assert_eq!(side, BoundarySide::Inner);
        assert!((hit.distance - 10.0).abs() < 0.5);
        let (_, side) = track.nearest_boundary(Vec2::new(190.0, 0.0)).unwrap();
        assert_eq!(side, BoundarySide::Outer);
    }

    #[test]
    fn test_ray_distances_fan() {
        let track = ring(Vec2::ZERO, 100.0, 200.0, 256);
        // Facing +x from the centerline: walls ~50 ahead, ~50 behind toward infield
        let d = track.ray_distances(Vec2::new(150.0, 0.0), 0.0, &[0.0, 180.0], 300.0);
        assert_eq!(d.len(), 2);
        assert!((d[0] - 50.0).abs() < 1.0);
        assert!((d[1] - 50.0).abs() < 1.0);
    }

    #[test]
    fn test_grid_positions_straddle_start() {
        let track = ring(Vec2::ZERO, 100.0, 200.0, 64);
        let (a, b) = track.grid_positions();
        let mid = (a + b) * 0.5;
        assert!((mid - track.start_pos).length() < 1e-3);
        assert!((a.distance(b) - 2.0 * (track.width * 0.22).max(8.0)).abs() < 1e-3);
    }

    #[test]
    fn test_serialize_field_names() {
        let track = ring(Vec2::ZERO, 100.0, 200.0, 8);
        let json = serde_json::to_value(&track).unwrap();
        for key in [
            "centerline",
            "innerBoundary",
            "outerBoundary",
            "racingLine",
            "checkpoints",
            "startPos",
            "startAngle",
            "width",
            "seed",
            "weatherTag",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        // Points become two-element arrays
        assert_eq!(json["startPos"].as_array().map(|a| a.len()), Some(2));
    }
}
