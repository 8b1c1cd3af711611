//! 2D pose type for robot position and orientation.

use super::math::normalize_angle;
use super::point::Point2D;

/// A 2D pose: position in mm, heading in radians (CCW from +X).
///
/// This is the shape of the estimate published by the localization system
/// and of the target handed to a pilot.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pose2D {
    /// X position in mm.
    pub x: f32,
    /// Y position in mm.
    pub y: f32,
    /// Heading angle in radians [-π, π).
    pub theta: f32,
}

impl Pose2D {
    /// Create a new pose. The heading is normalized to [-π, π).
    #[inline]
    pub fn new(x: f32, y: f32, theta: f32) -> Self {
        Self {
            x,
            y,
            theta: normalize_angle(theta),
        }
    }

    /// Origin, facing +X.
    #[inline]
    pub const fn identity() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            theta: 0.0,
        }
    }

    /// Position as a point.
    #[inline]
    pub fn position(self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    /// Planar distance to another pose, ignoring heading.
    #[inline]
    pub fn distance(self, other: Pose2D) -> f32 {
        self.position().distance(&other.position())
    }

    /// Transform a point from this pose's local frame to the map frame.
    #[inline]
    pub fn transform_point(self, point: Point2D) -> Point2D {
        let (sin, cos) = self.theta.sin_cos();
        Point2D {
            x: self.x + point.x * cos - point.y * sin,
            y: self.y + point.x * sin + point.y * cos,
        }
    }

    /// Whether all components are finite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.theta.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_new_normalizes_angle() {
        let pose = Pose2D::new(0.0, 0.0, 3.0 * PI);
        assert!(pose.theta.abs() - PI < 1e-5);
    }

    #[test]
    fn test_transform_point() {
        let pose = Pose2D::new(100.0, 0.0, FRAC_PI_2);
        let world = pose.transform_point(Point2D::new(10.0, 0.0));
        assert_relative_eq!(world.x, 100.0, epsilon = 1e-4);
        assert_relative_eq!(world.y, 10.0, epsilon = 1e-4);
    }

    #[test]
    fn test_distance_ignores_heading() {
        let a = Pose2D::new(0.0, 0.0, 0.0);
        let b = Pose2D::new(30.0, 40.0, PI / 3.0);
        assert_relative_eq!(a.distance(b), 50.0);
    }
}
