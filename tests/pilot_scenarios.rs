//! End-to-end pilot runs against the simulated robot.

mod common;

use std::time::Duration;

use approx::assert_relative_eq;
use common::{Outcome, PilotHarness, PilotKind, room_with_door, test_config};
use sarathi::core::{Point2D, Pose2D};
use sarathi::error::SarathiError;
use sarathi::fsm::{Event, EventKind, Idle, PilotStatusKind, StateMachine, Transition, Trigger};
use sarathi::pilot::{ParentPilotEvent, PilotContext, PilotToPose};
use sarathi::robot::Robot;
use sarathi::shapes::Shape;
use sarathi::sim::{SimCommand, SimRobot};
use sarathi::world::WorldMap;

const TIMEOUT: Duration = Duration::from_secs(20);

fn motion_commands(commands: Vec<SimCommand>) -> Vec<SimCommand> {
    commands
        .into_iter()
        .filter(|c| *c != SimCommand::Stop)
        .collect()
}

#[test]
fn test_empty_map_straight_to_goal() {
    let config = test_config(1);
    let mut h = PilotHarness::new(
        WorldMap::new(),
        Pose2D::identity(),
        Some(Pose2D::new(500.0, 0.0, 0.0)),
        &config,
    );

    assert_eq!(h.run(TIMEOUT), Outcome::Arrived);

    let commands = motion_commands(h.robot.commands());
    assert_eq!(commands.len(), 1);
    let SimCommand::Drive(points) = &commands[0] else {
        panic!("expected a drive, got {:?}", commands[0]);
    };
    assert_eq!(points.first(), Some(&Point2D::ZERO));
    assert_eq!(points.last(), Some(&Point2D::new(500.0, 0.0)));

    let pose = h.robot.pose();
    assert_relative_eq!(pose.x, 500.0, epsilon = 1e-2);
    assert_relative_eq!(pose.y, 0.0, epsilon = 1e-2);
    assert_eq!(h.viewer.trees().len(), 1);
    assert!(h.statuses().is_empty());
}

#[test]
fn test_goal_inside_obstacle_fails_without_moving() {
    let config = test_config(2);
    let mut world = WorldMap::new();
    world.add_obstacle(
        "box",
        Shape::rectangle(Point2D::new(500.0, 0.0), (200.0, 200.0), 0.0),
    );
    let mut h = PilotHarness::new(
        world,
        Pose2D::identity(),
        Some(Pose2D::new(500.0, 0.0, 0.0)),
        &config,
    );

    assert_eq!(h.run(TIMEOUT), Outcome::Failed);
    assert_eq!(h.statuses(), vec![PilotStatusKind::GoalCollides]);
    assert!(h.robot.commands().is_empty());
    assert!(h.viewer.trees().is_empty());
}

#[test]
fn test_start_inside_obstacle_fails() {
    let config = test_config(3);
    let mut world = WorldMap::new();
    world.add_obstacle("pillar", Shape::circle(Point2D::new(10.0, 0.0), 25.0));
    let mut h = PilotHarness::new(
        world,
        Pose2D::identity(),
        Some(Pose2D::new(500.0, 0.0, 0.0)),
        &config,
    );

    assert_eq!(h.run(TIMEOUT), Outcome::Failed);
    assert_eq!(h.statuses(), vec![PilotStatusKind::StartCollides]);
}

#[test]
fn test_missing_target_is_invalid_pose() {
    let config = test_config(4);
    let mut h = PilotHarness::new(WorldMap::new(), Pose2D::identity(), None, &config);

    assert_eq!(h.run(TIMEOUT), Outcome::Failed);
    assert_eq!(h.statuses(), vec![PilotStatusKind::InvalidPose]);
    assert!(h.robot.commands().is_empty());
}

#[test]
fn test_residual_beyond_tolerance_replans() {
    let config = test_config(5);
    let mut h = PilotHarness::new(
        WorldMap::new(),
        Pose2D::identity(),
        Some(Pose2D::new(500.0, 0.0, 0.0)),
        &config,
    );
    // First drive ends 60mm short of the tolerance-50 target
    h.robot.push_arrival_offset(Point2D::new(60.0, 0.0));

    assert_eq!(h.run(TIMEOUT), Outcome::Arrived);

    // Two planning cycles, the second starting from where the first ended
    let trees = h.viewer.trees();
    assert_eq!(trees.len(), 2);
    assert_relative_eq!(trees[1][0].x, 560.0, epsilon = 1e-2);
    assert_eq!(motion_commands(h.robot.commands()).len(), 2);
    assert_relative_eq!(h.robot.pose().x, 500.0, epsilon = 1e-2);
}

#[test]
fn test_residual_within_tolerance_succeeds() {
    let config = test_config(6);
    let mut h = PilotHarness::new(
        WorldMap::new(),
        Pose2D::identity(),
        Some(Pose2D::new(500.0, 0.0, 0.0)),
        &config,
    );
    h.robot.push_arrival_offset(Point2D::new(0.0, 40.0));

    assert_eq!(h.run(TIMEOUT), Outcome::Arrived);
    assert_eq!(h.viewer.trees().len(), 1);
}

#[test]
fn test_motion_failure_reported_upward() {
    let config = test_config(7);
    let mut h = PilotHarness::new(
        WorldMap::new(),
        Pose2D::identity(),
        Some(Pose2D::new(500.0, 0.0, 0.0)),
        &config,
    );
    h.robot.fail_next_motion("bumper pressed");

    assert_eq!(h.run(TIMEOUT), Outcome::Failed);
    // Execution failures carry no planning status
    assert!(h.statuses().is_empty());
    assert_eq!(h.viewer.trees().len(), 1);
}

#[test]
fn test_doorway_pass_then_replan() {
    let config = test_config(8);
    let mut h = PilotHarness::new(
        room_with_door(),
        Pose2D::identity(),
        Some(Pose2D::new(800.0, 0.0, 0.0)),
        &config,
    );

    assert_eq!(h.run(TIMEOUT), Outcome::Arrived);

    let commands = motion_commands(h.robot.commands());
    assert!(matches!(commands.first(), Some(SimCommand::Drive(_))));
    assert!(commands.contains(&SimCommand::DoorwayPass("door".to_string())));
    assert!(matches!(commands.last(), Some(SimCommand::Drive(_))));

    // The drive before the door stops short of the door line
    if let Some(SimCommand::Drive(points)) = commands.first() {
        assert!(points.iter().all(|p| p.x <= 300.0));
    }
    assert!(h.viewer.trees().len() >= 2);
    assert_relative_eq!(h.robot.pose().x, 800.0, epsilon = 1e-2);
}

#[test]
fn test_push_pilot_uses_coarse_steps() {
    let config = test_config(9);
    let mut h = PilotHarness::with_kind(
        WorldMap::new(),
        Pose2D::identity(),
        Some(Pose2D::new(500.0, 0.0, 0.0)),
        &config,
        PilotKind::PushToPose,
    );

    assert_eq!(h.run(TIMEOUT), Outcome::Arrived);

    let trees = h.viewer.trees();
    let path = &trees[0];
    assert!(path.len() < 30);
    for pair in path.windows(2) {
        assert!(pair[0].distance(&pair[1]) <= config.pilot.push_step_size + 1e-3);
    }
}

#[test]
fn test_stopping_pilot_cancels_motion() {
    let mut config = test_config(10);
    config.motion.sim_speed = 1.0;
    let mut h = PilotHarness::new(
        WorldMap::new(),
        Pose2D::identity(),
        Some(Pose2D::new(5000.0, 0.0, 0.0)),
        &config,
    );

    h.sm.start(Event::external(EventKind::Completion)).unwrap();
    let drive = h.sm.node_by_path("pilot/exec/drive").unwrap();
    assert!(h.sm.run_until(|sm| sm.is_running(drive), TIMEOUT).unwrap());

    h.sm.stop_node(h.pilot.node).unwrap();
    assert!(!h.sm.is_running(drive));
    assert_eq!(h.robot.commands().last(), Some(&SimCommand::Stop));

    // Nothing left to fire once the pilot is down
    h.sm.run_for(Duration::from_millis(50)).unwrap();
    assert!(!h.sm.is_running(h.arrived));
    assert!(!h.sm.is_running(h.failed));
}

#[test]
fn test_status_forwarded_across_sub_machine() {
    let config = test_config(11);
    let mut world = WorldMap::new();
    world.add_obstacle("box", Shape::circle(Point2D::new(500.0, 0.0), 80.0));
    let robot = std::sync::Arc::new(SimRobot::new(Pose2D::identity(), 200.0));
    let ctx = std::sync::Arc::new(PilotContext::new(robot, std::sync::Arc::new(world), &config));

    // main
    // └── errand
    //     ├── pilot   =PilotStatus=> relay
    //     └── relay   (re-posts the status as errand's)
    // errand =PilotStatus(GoalCollides)=> blocked
    let mut sm = StateMachine::new("main", Idle);
    let root = sm.root();
    let errand = sm.add_child(root, "errand", Idle).unwrap();
    let pilot = PilotToPose::new(Some(Pose2D::new(500.0, 0.0, 0.0)))
        .install(&mut sm, errand, "pilot", ctx)
        .unwrap();
    let relay = sm.add_child(errand, "relay", ParentPilotEvent).unwrap();
    let blocked = sm.add_child(root, "blocked", Idle).unwrap();
    sm.add_transition(
        Transition::new("pilot=PS=>relay", Trigger::PilotStatus(None))
            .from(pilot.node)
            .to(relay),
    )
    .unwrap();
    sm.add_transition(
        Transition::new(
            "errand=PS(GoalCollides)=>blocked",
            Trigger::PilotStatus(Some(PilotStatusKind::GoalCollides)),
        )
        .from(errand)
        .to(blocked),
    )
    .unwrap();

    sm.start(Event::external(EventKind::Completion)).unwrap();
    assert!(sm.run_until(|sm| sm.is_running(blocked), TIMEOUT).unwrap());
    assert!(!sm.is_running(errand));
}

#[test]
fn test_zero_step_size_rejected_at_install() {
    let config = test_config(12);
    let robot = std::sync::Arc::new(SimRobot::new(Pose2D::identity(), 200.0));
    let ctx = std::sync::Arc::new(PilotContext::new(
        robot,
        std::sync::Arc::new(WorldMap::new()),
        &config,
    ));

    let mut sm = StateMachine::new("main", Idle);
    let root = sm.root();
    let result = PilotToPose::new(Some(Pose2D::new(500.0, 0.0, 0.0)))
        .with_step_size(0.0)
        .install(&mut sm, root, "pilot", ctx);
    assert!(matches!(result, Err(SarathiError::Config(_))));
}
