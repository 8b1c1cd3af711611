//! Circle shape.

use crate::core::{Point2D, Transform2D};

use super::BoundingBox;

/// A disc with a centre and radius.
#[derive(Clone, Debug, PartialEq)]
pub struct Circle {
    pub center: Point2D,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Point2D, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Exact test: centres closer than the sum of the radii.
    #[inline]
    pub fn collides_circle(&self, other: &Circle) -> bool {
        self.center.distance(&other.center) < self.radius + other.radius
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::new(
            Point2D::new(self.center.x - self.radius, self.center.y - self.radius),
            Point2D::new(self.center.x + self.radius, self.center.y + self.radius),
        )
    }

    pub fn instantiate(&self, transform: &Transform2D) -> Circle {
        Circle::new(transform.apply(self.center), self.radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_and_tangent() {
        let a = Circle::new(Point2D::new(0.0, 0.0), 10.0);
        let b = Circle::new(Point2D::new(15.0, 0.0), 10.0);
        let tangent = Circle::new(Point2D::new(20.0, 0.0), 10.0);
        assert!(a.collides_circle(&b));
        assert!(!a.collides_circle(&tangent));
    }

    #[test]
    fn test_bounding_box() {
        let bb = Circle::new(Point2D::new(5.0, -5.0), 2.0).bounding_box();
        assert_eq!(bb.min, Point2D::new(3.0, -7.0));
        assert_eq!(bb.max, Point2D::new(7.0, -3.0));
    }

    #[test]
    fn test_instantiate_moves_center_only() {
        let c = Circle::new(Point2D::new(1.0, 0.0), 4.0);
        let placed = c.instantiate(&Transform2D::translate(10.0, 20.0));
        assert_eq!(placed.center, Point2D::new(11.0, 20.0));
        assert_eq!(placed.radius, 4.0);
    }
}
