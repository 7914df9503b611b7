//! Deterministic simulation module
//!
//! Track generation and vehicle dynamics. This module must stay pure:
//! - Seeded RNG only (or an explicitly injected source)
//! - Frame time split into fixed-size substeps
//! - Tracks are read-only once generated
//! - No rendering, input or platform dependencies

pub mod car;
pub mod geometry;
pub mod spline;
pub mod track;
pub mod trackgen;

pub use car::{Car, Motion};
pub use geometry::{BoundaryHit, closest_point_on_segment, nearest_on_polygon, point_in_polygon, ray_cast};
pub use track::{BoundarySide, Checkpoint, Surface, TrackDescriptor};
pub use trackgen::{TrackParams, generate, generate_from, generate_tagged, generate_with_rng};
