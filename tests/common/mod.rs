//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use sarathi::config::SarathiConfig;
use sarathi::core::{Point2D, Pose2D};
use sarathi::fsm::{
    Event, EventKind, Idle, NodeId, PilotStatusKind, StateMachine, Transition, Trigger,
};
use sarathi::pilot::{PilotContext, PilotHandle, PilotPushToPose, PilotToPose};
use sarathi::shapes::Shape;
use sarathi::sim::{RecordingViewer, SimRobot};
use sarathi::world::{Doorway, ObstacleCatalog, WorldMap};

/// Fast, reproducible settings: seeded sampling and a quick simulator.
pub fn test_config(seed: u64) -> SarathiConfig {
    let mut config = SarathiConfig::default();
    config.rrt.seed = Some(seed);
    config.motion.poll_interval_ms = 1;
    config.motion.sim_speed = 200.0;
    config
}

/// Closed 600x600 room around the origin with a single doorway in the
/// east wall at (300, 0).
pub fn room_with_door() -> WorldMap {
    let mut map = WorldMap::new();
    map.add_obstacle("wall_w", Shape::rectangle(Point2D::new(-300.0, 0.0), (20.0, 620.0), 0.0));
    map.add_obstacle("wall_n", Shape::rectangle(Point2D::new(0.0, 300.0), (620.0, 20.0), 0.0));
    map.add_obstacle("wall_s", Shape::rectangle(Point2D::new(0.0, -300.0), (620.0, 20.0), 0.0));
    map.add_obstacle("wall_ne", Shape::rectangle(Point2D::new(300.0, 205.0), (20.0, 210.0), 0.0));
    map.add_obstacle("wall_se", Shape::rectangle(Point2D::new(300.0, -205.0), (20.0, 210.0), 0.0));
    map.add_doorway(Doorway::new("door", Point2D::new(300.0, 0.0), 0.0, 100.0));
    map
}

/// Which pilot flavour to install.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PilotKind {
    ToPose,
    PushToPose,
}

/// A machine with a pilot under the root and two terminal nodes:
///
/// ```text
/// pilot =C=> arrived
/// pilot =F=> failed
/// ```
pub struct PilotHarness {
    pub sm: StateMachine,
    pub pilot: PilotHandle,
    pub arrived: NodeId,
    pub failed: NodeId,
    pub robot: Arc<SimRobot>,
    pub viewer: Arc<RecordingViewer>,
    pub statuses: Arc<Mutex<Vec<PilotStatusKind>>>,
}

/// Outcome of a harness run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Arrived,
    Failed,
    TimedOut,
}

impl PilotHarness {
    pub fn new(world: WorldMap, start: Pose2D, target: Option<Pose2D>, config: &SarathiConfig) -> Self {
        Self::with_kind(world, start, target, config, PilotKind::ToPose)
    }

    pub fn with_kind(
        world: WorldMap,
        start: Pose2D,
        target: Option<Pose2D>,
        config: &SarathiConfig,
        kind: PilotKind,
    ) -> Self {
        let robot = Arc::new(
            SimRobot::new(start, config.motion.sim_speed).with_doorways(world.doorways()),
        );
        let viewer = Arc::new(RecordingViewer::new());
        let ctx = Arc::new(
            PilotContext::new(robot.clone(), Arc::new(world), config).with_viewer(viewer.clone()),
        );

        let mut sm = StateMachine::new("main", Idle);
        let root = sm.root();
        let pilot = match kind {
            PilotKind::ToPose => PilotToPose::new(target).install(&mut sm, root, "pilot", ctx),
            PilotKind::PushToPose => PilotPushToPose::new(target).install(&mut sm, root, "pilot", ctx),
        }
        .unwrap();
        let arrived = sm.add_child(root, "arrived", Idle).unwrap();
        let failed = sm.add_child(root, "failed", Idle).unwrap();
        sm.add_transition(
            Transition::new("pilot=C=>arrived", Trigger::Completion)
                .from(pilot.node)
                .to(arrived),
        )
        .unwrap();
        sm.add_transition(
            Transition::new("pilot=F=>failed", Trigger::Failure)
                .from(pilot.node)
                .to(failed),
        )
        .unwrap();

        let statuses = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&statuses);
        sm.set_event_observer(move |event| {
            if let EventKind::PilotStatus { kind, .. } = &event.kind {
                log.lock().push(*kind);
            }
        });

        Self {
            sm,
            pilot,
            arrived,
            failed,
            robot,
            viewer,
            statuses,
        }
    }

    /// Start the machine and run until the pilot reports back.
    pub fn run(&mut self, timeout: Duration) -> Outcome {
        self.sm.start(Event::external(EventKind::Completion)).unwrap();
        let (arrived, failed) = (self.arrived, self.failed);
        let done = self
            .sm
            .run_until(|sm| sm.is_running(arrived) || sm.is_running(failed), timeout)
            .unwrap();
        if !done {
            Outcome::TimedOut
        } else if self.sm.is_running(arrived) {
            Outcome::Arrived
        } else {
            Outcome::Failed
        }
    }

    pub fn statuses(&self) -> Vec<PilotStatusKind> {
        self.statuses.lock().clone()
    }
}
