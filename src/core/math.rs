//! Angle and segment utilities.
//!
//! All angles are in radians, counter-clockwise positive.

use std::f32::consts::PI;

use super::point::Point2D;

/// Two times PI (full circle in radians).
pub const TWO_PI: f32 = 2.0 * PI;

/// Normalize angle to [-π, π).
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let mut a = angle % TWO_PI;
    if a >= PI {
        a -= TWO_PI;
    } else if a < -PI {
        a += TWO_PI;
    }
    a
}

/// Shortest signed rotation from `from` to `to`, in [-π, π).
#[inline]
pub fn angle_diff(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

/// Orientation of the triplet (p, q, r): >0 CCW, <0 CW, 0 collinear.
#[inline]
fn orientation(p: Point2D, q: Point2D, r: Point2D) -> f32 {
    (q - p).cross(&(r - p))
}

/// Whether `q` lies within the bounding box of segment `p`-`r`.
#[inline]
fn on_segment(p: Point2D, q: Point2D, r: Point2D) -> bool {
    q.x <= p.x.max(r.x) && q.x >= p.x.min(r.x) && q.y <= p.y.max(r.y) && q.y >= p.y.min(r.y)
}

/// Test whether segments `p1`-`p2` and `q1`-`q2` intersect.
///
/// Touching endpoints and collinear overlaps count as intersections.
pub fn segments_intersect(p1: Point2D, p2: Point2D, q1: Point2D, q2: Point2D) -> bool {
    let d1 = orientation(q1, q2, p1);
    let d2 = orientation(q1, q2, p2);
    let d3 = orientation(p1, p2, q1);
    let d4 = orientation(p1, p2, q2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(q1, p1, q2))
        || (d2 == 0.0 && on_segment(q1, p2, q2))
        || (d3 == 0.0 && on_segment(p1, q1, p2))
        || (d4 == 0.0 && on_segment(p1, q2, p2))
}

/// Shortest distance from point `p` to segment `a`-`b`.
pub fn point_segment_distance(p: Point2D, a: Point2D, b: Point2D) -> f32 {
    let ab = b - a;
    let len_sq = ab.dot(&ab);
    if len_sq <= f32::EPSILON {
        return p.distance(&a);
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    p.distance(&(a + ab * t))
}
