//! Homogeneous 2D affine transforms.
//!
//! Shapes are authored as templates around the origin and placed into the
//! obstacle map with a `Transform2D`. The matrix is stored row-major:
//!
//! ```text
//! | r00 r01 tx |
//! | r10 r11 ty |
//! |  0   0   1 |
//! ```

use std::ops::Mul;

use super::point::Point2D;
use super::pose::Pose2D;

/// 3x3 homogeneous transform for the plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform2D {
    m: [[f32; 3]; 3],
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform2D {
    /// Identity transform.
    pub const fn identity() -> Self {
        Self {
            m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Pure translation.
    pub const fn translate(tx: f32, ty: f32) -> Self {
        Self {
            m: [[1.0, 0.0, tx], [0.0, 1.0, ty], [0.0, 0.0, 1.0]],
        }
    }

    /// Rotation about the origin (the z axis).
    pub fn about_z(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            m: [[cos, -sin, 0.0], [sin, cos, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Rotation followed by translation to the pose's position.
    pub fn from_pose(pose: Pose2D) -> Self {
        Self::translate(pose.x, pose.y) * Self::about_z(pose.theta)
    }

    /// Apply to a point.
    #[inline]
    pub fn apply(&self, p: Point2D) -> Point2D {
        Point2D::new(
            self.m[0][0] * p.x + self.m[0][1] * p.y + self.m[0][2],
            self.m[1][0] * p.x + self.m[1][1] * p.y + self.m[1][2],
        )
    }

    /// Rotation angle encoded in the linear part.
    #[inline]
    pub fn rotation(&self) -> f32 {
        self.m[1][0].atan2(self.m[0][0])
    }

    /// Translation component.
    #[inline]
    pub fn translation(&self) -> Point2D {
        Point2D::new(self.m[0][2], self.m[1][2])
    }
}

impl Mul for Transform2D {
    type Output = Self;

    /// Compose: `(a * b).apply(p) == a.apply(b.apply(p))`.
    fn mul(self, rhs: Self) -> Self {
        let mut m = [[0.0f32; 3]; 3];
        for (i, row) in m.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.m[i][k] * rhs.m[k][j]).sum();
            }
        }
        Self { m }
    }
}
