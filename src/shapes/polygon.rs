//! Polygon and rectangle shapes.

use crate::core::{Point2D, Transform2D, point_segment_distance};

use super::BoundingBox;
use super::circle::Circle;

/// A convex polygon given by its vertices in order.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    pub vertices: Vec<Point2D>,
    /// Edge list, `edges[i] = (vertices[i], vertices[i + 1 mod n])`
    pub edges: Vec<(Point2D, Point2D)>,
    pub center: Point2D,
    pub orient: f32,
}

impl Polygon {
    pub fn new(vertices: Vec<Point2D>, orient: f32) -> Self {
        let n = vertices.len();
        let edges = (0..n)
            .map(|i| (vertices[i], vertices[(i + 1) % n]))
            .collect();
        let center = if n == 0 {
            Point2D::ZERO
        } else {
            let sum = vertices.iter().fold(Point2D::ZERO, |acc, v| acc + *v);
            sum * (1.0 / n as f32)
        };
        Self {
            vertices,
            edges,
            center,
            orient,
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.vertices)
    }

    pub fn instantiate(&self, transform: &Transform2D) -> Polygon {
        let vertices = self.vertices.iter().map(|v| transform.apply(*v)).collect();
        Polygon::new(vertices, self.orient + transform.rotation())
    }

    /// Interval of the vertices projected onto `axis`.
    fn project(&self, axis: Point2D) -> (f32, f32) {
        self.vertices
            .iter()
            .map(|v| v.dot(&axis))
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), d| {
                (lo.min(d), hi.max(d))
            })
    }

    fn has_separating_edge(&self, other: &Polygon) -> bool {
        self.edges.iter().any(|(a, b)| {
            let axis = Point2D::new(a.y - b.y, b.x - a.x);
            let (a_min, a_max) = self.project(axis);
            let (b_min, b_max) = other.project(axis);
            a_max <= b_min || b_max <= a_min
        })
    }

    /// Separating-axis test over the edge normals of both polygons.
    pub fn collides_polygon(&self, other: &Polygon) -> bool {
        if self.vertices.is_empty() || other.vertices.is_empty() {
            return false;
        }
        !self.has_separating_edge(other) && !other.has_separating_edge(self)
    }

    /// Even-odd containment test.
    pub fn contains(&self, p: Point2D) -> bool {
        let mut inside = false;
        for (a, b) in &self.edges {
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if p.x < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Exact circle test: centre inside, or an edge closer than the radius.
    pub fn collides_circle(&self, circle: &Circle) -> bool {
        if self.vertices.is_empty() {
            return false;
        }
        self.contains(circle.center)
            || self
                .edges
                .iter()
                .any(|(a, b)| point_segment_distance(circle.center, *a, *b) < circle.radius)
    }
}

/// An oriented rectangle.
///
/// Extents along the rectangle's own axes are precomputed in the frame
/// rotated by `-orient` (`unrot`), so tests against other shapes reduce to
/// interval overlap checks.
#[derive(Clone, Debug, PartialEq)]
pub struct Rectangle {
    pub center: Point2D,
    /// (length along own x, width along own y)
    pub dimensions: (f32, f32),
    pub orient: f32,
    pub polygon: Polygon,
    unrot: Transform2D,
    min_ex: f32,
    max_ex: f32,
    min_ey: f32,
    max_ey: f32,
}

impl Rectangle {
    pub fn new(center: Point2D, dimensions: (f32, f32), orient: f32) -> Self {
        let dx2 = dimensions.0 / 2.0;
        let dy2 = dimensions.1 / 2.0;
        let relative = [
            Point2D::new(-dx2, -dy2),
            Point2D::new(dx2, -dy2),
            Point2D::new(dx2, dy2),
            Point2D::new(-dx2, dy2),
        ];

        let unrot = Transform2D::about_z(-orient);
        let center_ex = unrot.apply(center);

        let place = Transform2D::translate(center.x, center.y) * Transform2D::about_z(orient);
        let vertices = relative.iter().map(|v| place.apply(*v)).collect();

        Self {
            center,
            dimensions,
            orient,
            polygon: Polygon::new(vertices, orient),
            unrot,
            min_ex: center_ex.x - dx2,
            max_ex: center_ex.x + dx2,
            min_ey: center_ex.y - dy2,
            max_ey: center_ex.y + dy2,
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.polygon.bounding_box()
    }

    pub fn instantiate(&self, transform: &Transform2D) -> Rectangle {
        Rectangle::new(
            transform.apply(self.center),
            self.dimensions,
            transform.rotation() + self.orient,
        )
    }

    /// Whether `points`, seen in this rectangle's frame, fall entirely on
    /// one side of its extents.
    fn separates(&self, points: &[Point2D]) -> bool {
        let (mut min_x, mut max_x) = (f32::INFINITY, f32::NEG_INFINITY);
        let (mut min_y, mut max_y) = (f32::INFINITY, f32::NEG_INFINITY);
        for p in points {
            let q = self.unrot.apply(*p);
            min_x = min_x.min(q.x);
            max_x = max_x.max(q.x);
            min_y = min_y.min(q.y);
            max_y = max_y.max(q.y);
        }
        max_x <= self.min_ex || self.max_ex <= min_x || max_y <= self.min_ey || self.max_ey <= min_y
    }

    /// Two-sided separating-axis test.
    ///
    /// Checks the other rectangle in our frame, then (unless both share an
    /// orientation) ourselves in the other's frame. The two frames span the
    /// four edge normals of the pair, which for rectangles are all the axes
    /// a full separating-axis test needs, so the shortcut agrees with
    /// [`Polygon::collides_polygon`] away from exact contact.
    pub fn collides_rect(&self, other: &Rectangle) -> bool {
        if self.separates(&other.polygon.vertices) {
            return false;
        }
        if self.orient == other.orient {
            return true;
        }
        !other.separates(&self.polygon.vertices)
    }

    /// Conservative test: the circle's bounding square in the rectangle
    /// frame overlaps the extents. Corner regions are not refined.
    pub fn collides_circle(&self, circle: &Circle) -> bool {
        let p = self.unrot.apply(circle.center);
        let r = circle.radius;
        !(p.x + r <= self.min_ex
            || self.max_ex <= p.x - r
            || p.y + r <= self.min_ey
            || self.max_ey <= p.y - r)
    }
}
