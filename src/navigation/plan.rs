//! Navigation plans built from raw planner paths.

use std::fmt;

use crate::core::{Point2D, segments_intersect};
use crate::world::Doorway;

/// One executable action of a navigation plan.
#[derive(Clone, Debug, PartialEq)]
pub enum NavStep {
    /// Drive through the points in order
    Drive(Vec<Point2D>),
    /// Cross the named doorway
    DoorwayPass(String),
}

impl NavStep {
    /// Short kind tag, used as the dispatch key by the plan executor.
    pub fn kind(&self) -> &'static str {
        match self {
            NavStep::Drive(_) => "drive",
            NavStep::DoorwayPass(_) => "doorpass",
        }
    }
}

/// Ordered steps produced by one planning cycle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NavPlan {
    pub steps: Vec<NavStep>,
}

impl NavPlan {
    pub fn new(steps: Vec<NavStep>) -> Self {
        Self { steps }
    }

    /// First doorway (in catalog order) whose span crosses `p1`-`p2`.
    pub fn intersects_doorway<'a>(
        p1: Point2D,
        p2: Point2D,
        doorways: &'a [Doorway],
    ) -> Option<&'a Doorway> {
        doorways.iter().find(|door| {
            let (a, b) = door.span();
            segments_intersect(p1, p2, a, b)
        })
    }

    /// Split `path` at its first doorway crossing.
    ///
    /// When segment `path[i-1]`-`path[i]` crosses a doorway the plan is
    /// `Drive(path[..i])` followed by `DoorwayPass`; the rest of the path is
    /// dropped and left to the next planning cycle. Otherwise the plan is a
    /// single `Drive` over the whole path.
    pub fn from_path(path: &[Point2D], doorways: &[Doorway]) -> NavPlan {
        for i in 1..path.len() {
            if let Some(door) = Self::intersects_doorway(path[i - 1], path[i], doorways) {
                return NavPlan::new(vec![
                    NavStep::Drive(path[..i].to_vec()),
                    NavStep::DoorwayPass(door.id.clone()),
                ]);
            }
        }
        NavPlan::new(vec![NavStep::Drive(path.to_vec())])
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Display for NavPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<NavPlan [")?;
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match step {
                NavStep::Drive(points) => write!(f, "drive({})", points.len())?,
                NavStep::DoorwayPass(id) => write!(f, "{id}")?,
            }
        }
        write!(f, "]>")
    }
}
