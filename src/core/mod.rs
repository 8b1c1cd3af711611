//! Core geometric types.
//!
//! - [`Point2D`]: map-frame point in millimetres
//! - [`Pose2D`]: position plus heading
//! - [`Transform2D`]: homogeneous affine transform used to place shapes
//! - [`math`]: angle normalization and segment tests

pub mod math;
mod point;
mod pose;
mod transform;

pub use math::{angle_diff, normalize_angle, point_segment_distance, segments_intersect};
pub use point::Point2D;
pub use pose::Pose2D;
pub use transform::Transform2D;
