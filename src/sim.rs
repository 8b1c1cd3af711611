//! Simulated robot for hardware-free runs.
//!
//! Motion advances a fixed distance each time the motion state is polled,
//! so a run is fully determined by the commands issued and the number of
//! polls. Faults can be injected:
//!
//! | Fault | Effect |
//! |-------|--------|
//! | `fail_next_motion` | next command reports `Failed` on its first poll |
//! | `push_arrival_offset` | next arrival ends displaced by the offset |

use std::collections::VecDeque;

use parking_lot::Mutex;
use tracing::debug;

use crate::core::{Point2D, Pose2D};
use crate::error::{Result, SarathiError};
use crate::planning::RrtNode;
use crate::robot::{MotionState, PathViewer, Rgba, Robot};
use crate::world::Doorway;

/// Distance a doorway pass carries the robot beyond the door line (mm).
const DOOR_CLEARANCE: f32 = 120.0;

/// A command received by the simulator.
#[derive(Clone, Debug, PartialEq)]
pub enum SimCommand {
    Drive(Vec<Point2D>),
    DoorwayPass(String),
    Stop,
}

#[derive(Debug, Default)]
struct SimState {
    pose: Pose2D,
    route: VecDeque<Point2D>,
    status: MotionState,
    pending_failure: Option<String>,
    arrival_offsets: VecDeque<Point2D>,
    commands: Vec<SimCommand>,
}

/// Deterministic kinematic robot.
pub struct SimRobot {
    state: Mutex<SimState>,
    doorways: Vec<Doorway>,
    step_per_poll: f32,
}

impl SimRobot {
    pub fn new(pose: Pose2D, step_per_poll: f32) -> Self {
        Self {
            state: Mutex::new(SimState {
                pose,
                ..Default::default()
            }),
            doorways: Vec::new(),
            step_per_poll: step_per_poll.max(f32::EPSILON),
        }
    }

    /// Doorways the simulator knows how to pass through.
    pub fn with_doorways(mut self, doorways: Vec<Doorway>) -> Self {
        self.doorways = doorways;
        self
    }

    pub fn set_pose(&self, pose: Pose2D) {
        self.state.lock().pose = pose;
    }

    /// Make the next motion command fail with `reason`.
    pub fn fail_next_motion(&self, reason: impl Into<String>) {
        self.state.lock().pending_failure = Some(reason.into());
    }

    /// Displace the robot by `offset` at the next arrival.
    pub fn push_arrival_offset(&self, offset: Point2D) {
        self.state.lock().arrival_offsets.push_back(offset);
    }

    /// Every command received so far.
    pub fn commands(&self) -> Vec<SimCommand> {
        self.state.lock().commands.clone()
    }

    fn begin(&self, state: &mut SimState, route: Vec<Point2D>) {
        if let Some(reason) = state.pending_failure.take() {
            state.route.clear();
            state.status = MotionState::Failed(reason);
            return;
        }
        state.route = route.into();
        state.status = MotionState::Moving;
    }

    fn advance(&self, state: &mut SimState) {
        let mut budget = self.step_per_poll;
        while let Some(&waypoint) = state.route.front() {
            let here = state.pose.position();
            let dist = here.distance(&waypoint);
            if dist > budget {
                let heading = here.angle_to(&waypoint);
                let p = here.point_at(heading, budget);
                state.pose = Pose2D::new(p.x, p.y, heading);
                return;
            }
            if dist > f32::EPSILON {
                state.pose = Pose2D::new(waypoint.x, waypoint.y, here.angle_to(&waypoint));
            }
            budget -= dist;
            state.route.pop_front();
        }

        if let Some(offset) = state.arrival_offsets.pop_front() {
            state.pose = Pose2D::new(
                state.pose.x + offset.x,
                state.pose.y + offset.y,
                state.pose.theta,
            );
        }
        debug!(
            "sim: arrived at ({:.1}, {:.1})",
            state.pose.x, state.pose.y
        );
        state.status = MotionState::Arrived;
    }

    /// Door centre, then a point past the door on the side away from the robot.
    fn doorway_route(door: &Doorway, from: Point2D) -> Vec<Point2D> {
        let normal = Point2D::new(door.orientation.cos(), -door.orientation.sin());
        let side = (from - door.center).dot(&normal);
        let sign = if side > 0.0 { -1.0 } else { 1.0 };
        vec![door.center, door.center + normal * (sign * DOOR_CLEARANCE)]
    }
}

impl Robot for SimRobot {
    fn pose(&self) -> Pose2D {
        self.state.lock().pose
    }

    fn start_drive(&self, path: &[Point2D]) -> Result<()> {
        let mut state = self.state.lock();
        state.commands.push(SimCommand::Drive(path.to_vec()));
        self.begin(&mut state, path.to_vec());
        Ok(())
    }

    fn start_doorway_pass(&self, doorway: &str) -> Result<()> {
        let door = self
            .doorways
            .iter()
            .find(|d| d.id == doorway)
            .ok_or_else(|| SarathiError::Execution(format!("unknown doorway '{doorway}'")))?;

        let mut state = self.state.lock();
        state.commands.push(SimCommand::DoorwayPass(doorway.to_string()));
        let route = Self::doorway_route(door, state.pose.position());
        self.begin(&mut state, route);
        Ok(())
    }

    fn motion_state(&self) -> MotionState {
        let mut state = self.state.lock();
        if state.status == MotionState::Moving {
            self.advance(&mut state);
        }
        state.status.clone()
    }

    fn stop_motion(&self) {
        let mut state = self.state.lock();
        state.commands.push(SimCommand::Stop);
        state.route.clear();
        if state.status == MotionState::Moving {
            state.status = MotionState::Idle;
        }
    }
}

/// Path viewer that keeps what it is shown.
#[derive(Default)]
pub struct RecordingViewer {
    trees: Mutex<Vec<Vec<RrtNode>>>,
    clears: Mutex<usize>,
}

impl RecordingViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths shown so far, oldest first.
    pub fn trees(&self) -> Vec<Vec<RrtNode>> {
        self.trees.lock().clone()
    }

    pub fn clear_count(&self) -> usize {
        *self.clears.lock()
    }
}

impl PathViewer for RecordingViewer {
    fn clear(&self) {
        *self.clears.lock() += 1;
    }

    fn add_tree(&self, path: &[RrtNode], _color: Rgba) {
        self.trees.lock().push(path.to_vec());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn poll_until_done(robot: &SimRobot) -> MotionState {
        for _ in 0..1000 {
            let state = robot.motion_state();
            if state.is_terminal() {
                return state;
            }
        }
        panic!("simulation did not finish");
    }

    #[test]
    fn test_drive_reaches_last_point() {
        let robot = SimRobot::new(Pose2D::identity(), 40.0);
        robot
            .start_drive(&[Point2D::ZERO, Point2D::new(100.0, 0.0), Point2D::new(100.0, 100.0)])
            .unwrap();
        assert_eq!(robot.motion_state(), MotionState::Moving);
        assert_eq!(poll_until_done(&robot), MotionState::Arrived);

        let pose = robot.pose();
        assert_relative_eq!(pose.x, 100.0, epsilon = 1e-3);
        assert_relative_eq!(pose.y, 100.0, epsilon = 1e-3);
    }

    #[test]
    fn test_arrival_offset_applied_once() {
        let robot = SimRobot::new(Pose2D::identity(), 1000.0);
        robot.push_arrival_offset(Point2D::new(60.0, 0.0));

        robot.start_drive(&[Point2D::new(500.0, 0.0)]).unwrap();
        poll_until_done(&robot);
        assert_relative_eq!(robot.pose().x, 560.0, epsilon = 1e-3);

        robot.start_drive(&[Point2D::new(500.0, 0.0)]).unwrap();
        poll_until_done(&robot);
        assert_relative_eq!(robot.pose().x, 500.0, epsilon = 1e-3);
    }

    #[test]
    fn test_injected_failure() {
        let robot = SimRobot::new(Pose2D::identity(), 10.0);
        robot.fail_next_motion("bumper");
        robot.start_drive(&[Point2D::new(50.0, 0.0)]).unwrap();
        assert_eq!(robot.motion_state(), MotionState::Failed("bumper".into()));
    }

    #[test]
    fn test_doorway_pass_crosses_door() {
        let door = Doorway::new("door", Point2D::new(200.0, 0.0), 0.0, 40.0);
        let robot = SimRobot::new(Pose2D::new(100.0, 0.0, 0.0), 50.0).with_doorways(vec![door]);
        robot.start_doorway_pass("door").unwrap();
        poll_until_done(&robot);
        assert_relative_eq!(robot.pose().x, 200.0 + DOOR_CLEARANCE, epsilon = 1e-3);

        assert!(robot.start_doorway_pass("attic").is_err());
    }

    #[test]
    fn test_stop_goes_idle() {
        let robot = SimRobot::new(Pose2D::identity(), 1.0);
        robot.start_drive(&[Point2D::new(500.0, 0.0)]).unwrap();
        robot.motion_state();
        robot.stop_motion();
        assert_eq!(robot.motion_state(), MotionState::Idle);
        assert_eq!(robot.commands().last(), Some(&SimCommand::Stop));
    }
}
