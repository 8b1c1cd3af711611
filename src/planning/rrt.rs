//! Bidirectional RRT planner.
//!
//! Grows one tree from the start and one from the goal, alternating which
//! tree is extended toward a random (or goal-biased) sample. After every
//! successful extension the other tree greedily tries to connect to the new
//! node. The first connection ends the search.

use std::mem;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace, warn};

use crate::config::RrtConfig;
use crate::core::{Point2D, Pose2D, normalize_angle};
use crate::error::{PlanningFailure, Result, SarathiError};
use crate::shapes::{BoundingBox, Shape};
use crate::world::{Obstacle, ObstacleCatalog};

use super::tree::{RrtNode, RrtTree};

/// Frame in which candidate configurations are validated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlanningFrame {
    /// Robot footprint rectangle placed at the node pose, oriented by heading.
    #[default]
    Robot,
    /// Heading-free disc covering the footprint, for world-frame tasks such
    /// as pushing an object where the robot may approach from any side.
    World,
}

/// Output of a successful planning call.
#[derive(Clone, Debug)]
pub struct PlannedPath {
    /// Tree grown from the start
    pub start_tree: RrtTree,
    /// Tree grown from the goal
    pub goal_tree: RrtTree,
    /// Start to goal; `path[i].parent == Some(i - 1)`
    pub path: Vec<RrtNode>,
}

impl PlannedPath {
    /// Path positions, dropping headings.
    pub fn points(&self) -> Vec<Point2D> {
        self.path.iter().map(RrtNode::point).collect()
    }

    /// Total node count across both trees.
    pub fn tree_size(&self) -> usize {
        self.start_tree.len() + self.goal_tree.len()
    }

    /// Path length in mm.
    pub fn length(&self) -> f32 {
        self.path.windows(2).map(|w| w[0].distance(&w[1])).sum()
    }
}

/// Result of growing a tree one step.
enum Extend {
    Advanced(usize),
    Reached(usize),
    Trapped,
}

/// RRT path planner.
pub struct RrtPlanner {
    config: RrtConfig,
    obstacles: Vec<Obstacle>,
    rng: StdRng,
}

impl RrtPlanner {
    /// Create a planner. A configured seed makes sampling reproducible.
    ///
    /// The configuration is validated: a non-positive step would never
    /// reach its target and a negative margin leaves nothing to sample.
    pub fn new(config: RrtConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    /// Create a planner with default configuration.
    pub fn with_defaults() -> Self {
        Self::build(RrtConfig::default())
    }

    fn build(config: RrtConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            config,
            obstacles: Vec::new(),
            rng,
        }
    }

    pub fn config(&self) -> &RrtConfig {
        &self.config
    }

    pub fn set_max_iter(&mut self, max_iter: usize) {
        self.config.max_iter = max_iter;
    }

    pub fn set_step_size(&mut self, step_size: f32) -> Result<()> {
        if !(step_size.is_finite() && step_size > 0.0) {
            return Err(SarathiError::Config(format!(
                "rrt step size must be positive, got {step_size}"
            )));
        }
        self.config.step_size = step_size;
        Ok(())
    }

    pub fn set_obstacles(&mut self, obstacles: Vec<Obstacle>) {
        self.obstacles = obstacles;
    }

    /// Refresh the obstacle list from a catalog snapshot.
    pub fn load_catalog(&mut self, catalog: &dyn ObstacleCatalog) {
        self.obstacles = catalog.obstacles();
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Robot shape at `pose` in the given frame.
    pub fn footprint(&self, pose: Pose2D, frame: PlanningFrame) -> Shape {
        let (length, width) = (self.config.robot_length, self.config.robot_width);
        match frame {
            PlanningFrame::Robot => Shape::rectangle(pose.position(), (length, width), pose.theta),
            PlanningFrame::World => {
                let radius = 0.5 * (length * length + width * width).sqrt();
                Shape::circle(pose.position(), radius)
            }
        }
    }

    /// First obstacle the robot would touch at `pose`, if any.
    pub fn collision_at(&self, pose: Pose2D, frame: PlanningFrame) -> Option<&Obstacle> {
        let robot = self.footprint(pose, frame);
        self.obstacles.iter().find(|o| o.shape.collides(&robot))
    }

    /// Whether the straight edge from `from` to `to` is free, checked at
    /// intervals no longer than half the footprint width.
    fn edge_is_clear(&self, from: Point2D, to: Point2D, heading: f32, frame: PlanningFrame) -> bool {
        let length = from.distance(&to);
        let spacing = (0.5 * self.config.robot_width).max(1.0);
        let steps = (length / spacing).ceil().max(1.0) as usize;
        (1..=steps).all(|i| {
            let t = i as f32 / steps as f32;
            let p = from + (to - from) * t;
            self.collision_at(Pose2D::new(p.x, p.y, heading), frame)
                .is_none()
        })
    }

    /// Grow `tree` one step toward `target`.
    fn extend(
        &self,
        tree: &mut RrtTree,
        target: Point2D,
        reversed: bool,
        frame: PlanningFrame,
    ) -> Extend {
        let near_idx = tree.nearest(target);
        let near = *tree.node(near_idx);
        let dist = near.point().distance(&target);
        if dist <= f32::EPSILON {
            return Extend::Reached(near_idx);
        }

        let angle = near.point().angle_to(&target);
        let reached = dist <= self.config.step_size;
        let new_point = if reached {
            target
        } else {
            near.point().point_at(angle, self.config.step_size)
        };

        if !self.edge_is_clear(near.point(), new_point, angle, frame) {
            return Extend::Trapped;
        }

        // Goal-tree nodes are traversed toward their parent, so they carry
        // the reverse of the growth direction
        let heading = if reversed {
            normalize_angle(angle + std::f32::consts::PI)
        } else {
            angle
        };
        let idx = tree.add(RrtNode::new(new_point.x, new_point.y, heading), near_idx);
        if reached {
            Extend::Reached(idx)
        } else {
            Extend::Advanced(idx)
        }
    }

    /// Extend `tree` toward `target` until it gets there or is blocked.
    fn connect(
        &self,
        tree: &mut RrtTree,
        target: Point2D,
        reversed: bool,
        frame: PlanningFrame,
    ) -> Option<usize> {
        loop {
            match self.extend(tree, target, reversed, frame) {
                Extend::Advanced(_) => continue,
                Extend::Reached(idx) => return Some(idx),
                Extend::Trapped => return None,
            }
        }
    }

    fn sampling_region(&self, start: &RrtNode, goal: &RrtNode) -> BoundingBox {
        self.obstacles
            .iter()
            .map(|o| o.shape.bounding_box())
            .fold(
                BoundingBox::from_points(&[start.point(), goal.point()]),
                |acc, bb| acc.union(&bb),
            )
            .expand(self.config.sample_margin)
    }

    fn sample(&mut self, region: &BoundingBox, bias_target: Point2D) -> Point2D {
        if self.rng.random::<f32>() < self.config.goal_bias {
            return bias_target;
        }
        Point2D::new(
            sample_axis(&mut self.rng, region.min.x, region.max.x),
            sample_axis(&mut self.rng, region.min.y, region.max.y),
        )
    }

    /// Plan a path from `start` to `goal`.
    ///
    /// Fails with `StartCollides`/`GoalCollides` when an endpoint is
    /// blocked, and with `MaxIterations` when the budget runs out. The
    /// latter is a routine outcome of stochastic sampling.
    pub fn plan_path(
        &mut self,
        start: RrtNode,
        goal: RrtNode,
        frame: PlanningFrame,
    ) -> std::result::Result<PlannedPath, PlanningFailure> {
        if let Some(obstacle) = self.collision_at(start.pose(), frame) {
            warn!("[RRT] start ({:.1},{:.1}) collides with {}", start.x, start.y, obstacle.id);
            return Err(PlanningFailure::StartCollides {
                obstacle: obstacle.id.clone(),
            });
        }
        if let Some(obstacle) = self.collision_at(goal.pose(), frame) {
            warn!("[RRT] goal ({:.1},{:.1}) collides with {}", goal.x, goal.y, obstacle.id);
            return Err(PlanningFailure::GoalCollides {
                obstacle: obstacle.id.clone(),
            });
        }

        let mut tree_a = RrtTree::new(start);
        let mut tree_b = RrtTree::new(goal);
        // Whether tree_a currently holds the goal tree
        let mut swapped = false;

        // Straight shot first: grow the goal tree all the way to the start
        if let Some(b_idx) = self.connect(&mut tree_b, start.point(), true, frame) {
            debug!("[RRT] direct connection, {} nodes", tree_b.len());
            return Ok(Self::join(tree_a, 0, tree_b, b_idx));
        }

        let region = self.sampling_region(&start, &goal);
        trace!(
            "[RRT] sampling region ({:.0},{:.0})-({:.0},{:.0})",
            region.min.x, region.min.y, region.max.x, region.max.y
        );

        for iteration in 0..self.config.max_iter {
            let bias_target = tree_b.root().point();
            let target = self.sample(&region, bias_target);

            let new_idx = match self.extend(&mut tree_a, target, swapped, frame) {
                Extend::Advanced(idx) | Extend::Reached(idx) => Some(idx),
                Extend::Trapped => None,
            };

            if let Some(a_idx) = new_idx {
                let new_point = tree_a.node(a_idx).point();
                if let Some(b_idx) = self.connect(&mut tree_b, new_point, !swapped, frame) {
                    debug!(
                        "[RRT] trees connected after {} iterations ({} + {} nodes)",
                        iteration + 1,
                        tree_a.len(),
                        tree_b.len()
                    );
                    return Ok(if swapped {
                        Self::join(tree_b, b_idx, tree_a, a_idx)
                    } else {
                        Self::join(tree_a, a_idx, tree_b, b_idx)
                    });
                }
            }

            mem::swap(&mut tree_a, &mut tree_b);
            swapped = !swapped;
        }

        warn!(
            "[RRT] no path after {} iterations ({} nodes)",
            self.config.max_iter,
            tree_a.len() + tree_b.len()
        );
        Err(PlanningFailure::MaxIterations(self.config.max_iter))
    }

    /// Concatenate root→`start_idx` with `goal_idx`→root, dropping the
    /// duplicated meeting point, and relink parents along the path.
    fn join(start_tree: RrtTree, start_idx: usize, goal_tree: RrtTree, goal_idx: usize) -> PlannedPath {
        let mut path = start_tree.path_from_root(start_idx);
        let mut tail = goal_tree.path_from_root(goal_idx);
        tail.reverse();
        path.extend(tail.into_iter().skip(1));

        for (i, node) in path.iter_mut().enumerate() {
            node.parent = i.checked_sub(1);
        }

        PlannedPath {
            start_tree,
            goal_tree,
            path,
        }
    }
}

/// Uniform sample in `[lo, hi]`; a collapsed or inverted range yields its
/// midpoint.
fn sample_axis(rng: &mut StdRng, lo: f32, hi: f32) -> f32 {
    if lo < hi {
        rng.random_range(lo..=hi)
    } else {
        0.5 * (lo + hi)
    }
}
