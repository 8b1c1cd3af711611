//! Obstacle and doorway catalog.
//!
//! The world map is owned by an external collaborator; the planner only
//! needs a snapshot of what blocks motion and where the doorways are.

use std::collections::BTreeMap;

use crate::core::Point2D;
use crate::shapes::Shape;

/// A named obstacle in map coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Obstacle {
    pub id: String,
    pub shape: Shape,
}

/// A crossable gap in a wall.
///
/// Doorways never block motion. Their span is used only to split a
/// navigation plan at the point where the path crosses them.
#[derive(Clone, Debug, PartialEq)]
pub struct Doorway {
    pub id: String,
    pub center: Point2D,
    /// Orientation in radians
    pub orientation: f32,
    /// Door width in mm
    pub width: f32,
}

impl Doorway {
    pub fn new(id: impl Into<String>, center: Point2D, orientation: f32, width: f32) -> Self {
        Self {
            id: id.into(),
            center,
            orientation,
            width,
        }
    }

    /// Line segment representing the crossable span.
    pub fn span(&self) -> (Point2D, Point2D) {
        let dx = self.width * self.orientation.sin();
        let dy = self.width * self.orientation.cos();
        (
            Point2D::new(self.center.x - dx, self.center.y - dy),
            Point2D::new(self.center.x + dx, self.center.y + dy),
        )
    }
}

/// Catalog entry.
#[derive(Clone, Debug, PartialEq)]
pub enum MapObject {
    Obstacle(Shape),
    Doorway { center: Point2D, orientation: f32, width: f32 },
}

/// Read access to the obstacle/doorway catalog.
///
/// Implementations are iterated once per planning cycle.
pub trait ObstacleCatalog: Send + Sync {
    /// Everything that blocks motion.
    fn obstacles(&self) -> Vec<Obstacle>;

    /// Every doorway, in catalog order.
    fn doorways(&self) -> Vec<Doorway>;
}

/// In-memory catalog keyed by object identifier.
#[derive(Clone, Debug, Default)]
pub struct WorldMap {
    objects: BTreeMap<String, MapObject>,
}

impl WorldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an object.
    pub fn insert(&mut self, id: impl Into<String>, object: MapObject) {
        self.objects.insert(id.into(), object);
    }

    pub fn add_obstacle(&mut self, id: impl Into<String>, shape: Shape) {
        self.insert(id, MapObject::Obstacle(shape));
    }

    pub fn add_doorway(&mut self, doorway: Doorway) {
        self.insert(
            doorway.id,
            MapObject::Doorway {
                center: doorway.center,
                orientation: doorway.orientation,
                width: doorway.width,
            },
        );
    }

    pub fn remove(&mut self, id: &str) -> Option<MapObject> {
        self.objects.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&MapObject> {
        self.objects.get(id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl ObstacleCatalog for WorldMap {
    fn obstacles(&self) -> Vec<Obstacle> {
        self.objects
            .iter()
            .filter_map(|(id, obj)| match obj {
                MapObject::Obstacle(shape) => Some(Obstacle {
                    id: id.clone(),
                    shape: shape.clone(),
                }),
                MapObject::Doorway { .. } => None,
            })
            .collect()
    }

    fn doorways(&self) -> Vec<Doorway> {
        self.objects
            .iter()
            .filter_map(|(id, obj)| match obj {
                MapObject::Doorway {
                    center,
                    orientation,
                    width,
                } => Some(Doorway::new(id.clone(), *center, *orientation, *width)),
                MapObject::Obstacle(_) => None,
            })
            .collect()
    }
}
