//! Collision shapes for the planner.
//!
//! Every shape answers two questions: does it collide with another shape,
//! and what is its axis-aligned bounding box. Pairwise tests are resolved
//! by matching on the variant pair, so adding a variant forces every pair
//! to be handled.
//!
//! | Pair | Test |
//! |------|------|
//! | Circle / Circle | exact, centre distance < sum of radii |
//! | Rectangle / Rectangle | two-sided SAT in each rectangle's frame |
//! | Rectangle / Circle | conservative, circle's square in rectangle frame |
//! | Polygon / Polygon, Polygon / Rectangle | convex SAT over edge normals |
//! | Polygon / Circle | exact |
//! | Compound / any | any member collides |

mod circle;
mod polygon;

pub use circle::Circle;
pub use polygon::{Polygon, Rectangle};

use crate::core::{Point2D, Transform2D};

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: Point2D,
    pub max: Point2D,
}

impl BoundingBox {
    pub fn new(min: Point2D, max: Point2D) -> Self {
        Self { min, max }
    }

    /// Tight box around a set of points; degenerate at the origin when empty.
    pub fn from_points(points: &[Point2D]) -> Self {
        if points.is_empty() {
            return Self::new(Point2D::ZERO, Point2D::ZERO);
        }
        let mut min = Point2D::new(f32::INFINITY, f32::INFINITY);
        let mut max = Point2D::new(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for p in points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Self { min, max }
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox::new(
            Point2D::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            Point2D::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        )
    }

    /// Box grown by `margin` on every side.
    pub fn expand(&self, margin: f32) -> BoundingBox {
        BoundingBox::new(
            Point2D::new(self.min.x - margin, self.min.y - margin),
            Point2D::new(self.max.x + margin, self.max.y + margin),
        )
    }

    pub fn contains(&self, p: Point2D) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
}

/// Union of shapes: collides when any member collides.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Compound {
    pub shapes: Vec<Shape>,
}

impl Compound {
    pub fn new(shapes: Vec<Shape>) -> Self {
        Self { shapes }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let mut boxes = self.shapes.iter().map(Shape::bounding_box);
        match boxes.next() {
            Some(first) => boxes.fold(first, |acc, bb| acc.union(&bb)),
            None => BoundingBox::new(Point2D::ZERO, Point2D::ZERO),
        }
    }
}

/// A collision shape.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Circle(Circle),
    Polygon(Polygon),
    Rectangle(Rectangle),
    Compound(Compound),
}

impl Shape {
    pub fn circle(center: Point2D, radius: f32) -> Self {
        Shape::Circle(Circle::new(center, radius))
    }

    pub fn rectangle(center: Point2D, dimensions: (f32, f32), orient: f32) -> Self {
        Shape::Rectangle(Rectangle::new(center, dimensions, orient))
    }

    pub fn polygon(vertices: Vec<Point2D>) -> Self {
        Shape::Polygon(Polygon::new(vertices, 0.0))
    }

    pub fn compound(shapes: Vec<Shape>) -> Self {
        Shape::Compound(Compound::new(shapes))
    }

    /// Symmetric collision test: `a.collides(b) == b.collides(a)`.
    pub fn collides(&self, other: &Shape) -> bool {
        use Shape::*;

        match (self, other) {
            (Compound(c), s) => c.shapes.iter().any(|m| m.collides(s)),
            (s, Compound(c)) => c.shapes.iter().any(|m| s.collides(m)),
            (Circle(a), Circle(b)) => a.collides_circle(b),
            (Rectangle(a), Rectangle(b)) => a.collides_rect(b),
            (Rectangle(r), Circle(c)) | (Circle(c), Rectangle(r)) => r.collides_circle(c),
            (Polygon(p), Circle(c)) | (Circle(c), Polygon(p)) => p.collides_circle(c),
            (Polygon(p), Rectangle(r)) | (Rectangle(r), Polygon(p)) => {
                p.collides_polygon(&r.polygon)
            }
            (Polygon(a), Polygon(b)) => a.collides_polygon(b),
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        match self {
            Shape::Circle(c) => c.bounding_box(),
            Shape::Polygon(p) => p.bounding_box(),
            Shape::Rectangle(r) => r.bounding_box(),
            Shape::Compound(c) => c.bounding_box(),
        }
    }

    /// Place a template shape with `transform`.
    pub fn instantiate(&self, transform: &Transform2D) -> Shape {
        match self {
            Shape::Circle(c) => Shape::Circle(c.instantiate(transform)),
            Shape::Polygon(p) => Shape::Polygon(p.instantiate(transform)),
            Shape::Rectangle(r) => Shape::Rectangle(r.instantiate(transform)),
            Shape::Compound(c) => Shape::Compound(Compound::new(
                c.shapes.iter().map(|s| s.instantiate(transform)).collect(),
            )),
        }
    }

    /// Short variant name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Circle(_) => "circle",
            Shape::Polygon(_) => "polygon",
            Shape::Rectangle(_) => "rectangle",
            Shape::Compound(_) => "compound",
        }
    }
}
