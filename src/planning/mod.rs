//! Path planning.
//!
//! - [`RrtPlanner`]: bidirectional RRT over the obstacle catalog
//! - [`RrtTree`]: append-only sample arena, one per search direction

mod rrt;
mod tree;

pub use rrt::{PlannedPath, PlanningFrame, RrtPlanner};
pub use tree::{RrtNode, RrtTree};
