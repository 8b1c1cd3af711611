//! Robot-side collaborators: pose telemetry, motion primitives and the
//! optional path viewer.
//!
//! Motion primitives are start/poll style. `start_*` returns as soon as the
//! command is accepted; progress is observed through [`Robot::motion_state`]
//! by a background task.

use std::fmt;

use crate::core::{Point2D, Pose2D};
use crate::error::Result;
use crate::planning::RrtNode;

/// Progress of the current motion command.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum MotionState {
    /// No command issued since the last stop
    #[default]
    Idle,
    Moving,
    Arrived,
    /// Primitive gave up, with a reason
    Failed(String),
}

impl MotionState {
    /// Whether the command has finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, MotionState::Arrived | MotionState::Failed(_))
    }
}

impl fmt::Display for MotionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionState::Idle => write!(f, "idle"),
            MotionState::Moving => write!(f, "moving"),
            MotionState::Arrived => write!(f, "arrived"),
            MotionState::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// The robot as seen by the pilot.
pub trait Robot: Send + Sync {
    /// Current pose estimate (localisation output).
    fn pose(&self) -> Pose2D;

    /// Begin driving through `path` in order.
    fn start_drive(&self, path: &[Point2D]) -> Result<()>;

    /// Begin crossing the named doorway.
    fn start_doorway_pass(&self, doorway: &str) -> Result<()>;

    fn motion_state(&self) -> MotionState;

    /// Abort the current command. Safe to call when idle.
    fn stop_motion(&self);
}

/// RGBA colour in 0..=1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Colour used for planned paths.
    pub const PATH: Rgba = Rgba::new(1.0, 0.0, 0.0, 0.75);
}

/// Diagnostic display of planner output. Never feeds back into control.
pub trait PathViewer: Send + Sync {
    fn clear(&self);
    fn add_tree(&self, path: &[RrtNode], color: Rgba);
}

/// Viewer that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullViewer;

impl PathViewer for NullViewer {
    fn clear(&self) {}
    fn add_tree(&self, _path: &[RrtNode], _color: Rgba) {}
}
