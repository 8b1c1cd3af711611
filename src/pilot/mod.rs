//! Pilot: plan, execute, check arrival, replan.
//!
//! A pilot is a sub-machine installed under any node of a
//! [`StateMachine`]:
//!
//! ```text
//! planner =D=> exec
//! exec    =C=> check
//! exec    =F=> ParentFails
//! check   =S=> ParentCompletes
//! check   =F=> planner
//! ```
//!
//! The enclosing machine sees `Completion` when the robot ends within the
//! arrival tolerance, or `Failure` (preceded by a `PilotStatus` when
//! planning failed). A pilot that keeps missing the target replans without
//! limit; callers wanting a retry budget stop the pilot node themselves.

mod arrival;
mod executor;
mod motion;
mod planner;

pub use arrival::CheckArrival;
pub use executor::{DispatchStep, MotionStep, NextStep, PilotExecutePlan, StepKind};
pub use motion::{CancelToken, MotionTask};
pub use planner::{ParentPilotEvent, PilotPlanner};

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use crate::config::{MotionConfig, PilotConfig, RrtConfig, SarathiConfig};
use crate::core::Pose2D;
use crate::error::Result;
use crate::fsm::{
    Behavior, DataValue, Event, NodeContext, NodeId, ParentCompletes, ParentFails, StateMachine,
    Transition, Trigger,
};
use crate::navigation::PlanCursor;
use crate::planning::{PlanningFrame, RrtPlanner};
use crate::robot::{NullViewer, PathViewer, Robot};
use crate::world::ObstacleCatalog;

pub(crate) type SharedTarget = Arc<Mutex<Option<Pose2D>>>;

/// Collaborators and settings shared by every pilot node.
pub struct PilotContext {
    pub robot: Arc<dyn Robot>,
    pub catalog: Arc<dyn ObstacleCatalog>,
    pub viewer: Arc<dyn PathViewer>,
    pub rrt: RrtConfig,
    pub pilot: PilotConfig,
    pub motion: MotionConfig,
}

impl PilotContext {
    pub fn new(
        robot: Arc<dyn Robot>,
        catalog: Arc<dyn ObstacleCatalog>,
        config: &SarathiConfig,
    ) -> Self {
        Self {
            robot,
            catalog,
            viewer: Arc::new(NullViewer),
            rrt: config.rrt.clone(),
            pilot: config.pilot.clone(),
            motion: config.motion.clone(),
        }
    }

    pub fn with_viewer(mut self, viewer: Arc<dyn PathViewer>) -> Self {
        self.viewer = viewer;
        self
    }
}

/// Handle to an installed pilot.
#[derive(Clone, Debug)]
pub struct PilotHandle {
    pub node: NodeId,
    target: SharedTarget,
}

impl PilotHandle {
    /// Retarget the pilot; takes effect at the next planning cycle.
    pub fn set_target(&self, target: Option<Pose2D>) {
        *self.target.lock() = target;
    }

    pub fn target(&self) -> Option<Pose2D> {
        *self.target.lock()
    }
}

/// The pilot's own node: logs the target on entry.
struct PilotNode {
    target: SharedTarget,
}

impl Behavior for PilotNode {
    fn start(&mut self, node: &NodeContext<'_>, _event: &Event) -> Result<()> {
        match *self.target.lock() {
            Some(t) => info!(
                "{}: piloting to ({:.0}, {:.0}, {:.2})",
                node.path(),
                t.x,
                t.y,
                t.theta
            ),
            None => info!("{}: started without a target", node.path()),
        }
        Ok(())
    }
}

/// Builder for a pilot sub-machine driving the robot to a pose.
#[derive(Clone, Debug)]
pub struct PilotToPose {
    target: Option<Pose2D>,
    frame: PlanningFrame,
    max_iter: Option<usize>,
    step_size: Option<f32>,
    verbose: Option<bool>,
}

impl PilotToPose {
    pub fn new(target: Option<Pose2D>) -> Self {
        Self {
            target,
            frame: PlanningFrame::Robot,
            max_iter: None,
            step_size: None,
            verbose: None,
        }
    }

    /// Override the planner's iteration budget.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = Some(max_iter);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    pub fn with_frame(mut self, frame: PlanningFrame) -> Self {
        self.frame = frame;
        self
    }

    pub fn with_step_size(mut self, step_size: f32) -> Self {
        self.step_size = Some(step_size);
        self
    }

    /// Build the pilot graph under `parent` as a node called `name`.
    pub fn install(
        self,
        sm: &mut StateMachine,
        parent: NodeId,
        name: &str,
        ctx: Arc<PilotContext>,
    ) -> Result<PilotHandle> {
        let target: SharedTarget = Arc::new(Mutex::new(self.target));

        let mut rrt = RrtPlanner::new(ctx.rrt.clone())?;
        if let Some(max_iter) = self.max_iter {
            rrt.set_max_iter(max_iter);
        }
        if let Some(step_size) = self.step_size {
            rrt.set_step_size(step_size)?;
        }
        let verbose = self.verbose.unwrap_or(ctx.pilot.verbose);

        let pilot = sm.add_child(
            parent,
            name,
            PilotNode {
                target: Arc::clone(&target),
            },
        )?;

        let planner = sm.add_child(
            pilot,
            "planner",
            PilotPlanner::new(Arc::clone(&ctx), Arc::clone(&target), self.frame, rrt, verbose),
        )?;
        let exec = install_executor(sm, pilot, Arc::clone(&ctx))?;
        let exec_fails = sm.add_child(pilot, "parentfails", ParentFails)?;
        let check = sm.add_child(
            pilot,
            "check",
            CheckArrival::new(Arc::clone(&ctx), Arc::clone(&target)),
        )?;
        let arrived = sm.add_child(pilot, "parentcompletes", ParentCompletes)?;
        sm.set_initial(pilot, planner)?;

        sm.add_transition(Transition::new("planner=D=>exec", Trigger::Data(None)).from(planner).to(exec))?;
        sm.add_transition(Transition::new("exec=C=>check", Trigger::Completion).from(exec).to(check))?;
        sm.add_transition(
            Transition::new("exec=F=>parentfails", Trigger::Failure)
                .from(exec)
                .to(exec_fails),
        )?;
        sm.add_transition(
            Transition::new("check=S=>parentcompletes", Trigger::Success)
                .from(check)
                .to(arrived),
        )?;
        sm.add_transition(Transition::new("check=F=>planner", Trigger::Failure).from(check).to(planner))?;

        Ok(PilotHandle { node: pilot, target })
    }
}

/// Pilot for pushing an object: plans in the world frame with the coarser
/// push step size.
#[derive(Clone, Debug)]
pub struct PilotPushToPose(PilotToPose);

impl PilotPushToPose {
    pub fn new(target: Option<Pose2D>) -> Self {
        Self(PilotToPose::new(target).with_frame(PlanningFrame::World))
    }

    pub fn install(
        self,
        sm: &mut StateMachine,
        parent: NodeId,
        name: &str,
        ctx: Arc<PilotContext>,
    ) -> Result<PilotHandle> {
        let step = ctx.pilot.push_step_size;
        self.0.with_step_size(step).install(sm, parent, name, ctx)
    }
}

fn install_executor(sm: &mut StateMachine, pilot: NodeId, ctx: Arc<PilotContext>) -> Result<NodeId> {
    let cursor = Arc::new(Mutex::new(PlanCursor::new()));
    let exec = sm.add_child(pilot, "exec", PilotExecutePlan::new(Arc::clone(&cursor)))?;

    let dispatch = sm.add_child(exec, "dispatch", DispatchStep::new(Arc::clone(&cursor)))?;
    let drive = sm.add_child(
        exec,
        "drive",
        MotionStep::new(StepKind::Drive, Arc::clone(&ctx), Arc::clone(&cursor)),
    )?;
    let drive_fails = sm.add_child(exec, "parentfails1", ParentFails)?;
    let doorpass = sm.add_child(
        exec,
        "doorpass",
        MotionStep::new(StepKind::DoorwayPass, ctx, Arc::clone(&cursor)),
    )?;
    let doorpass_fails = sm.add_child(exec, "parentfails2", ParentFails)?;
    let next = sm.add_child(exec, "next", NextStep::new(cursor))?;
    let done = sm.add_child(exec, "parentcompletes", ParentCompletes)?;
    sm.set_initial(exec, dispatch)?;

    let wiring = [
        ("dispatch=D(drive)=>drive", Trigger::Data(Some(DataValue::text("drive"))), dispatch, drive),
        (
            "dispatch=D(doorpass)=>doorpass",
            Trigger::Data(Some(DataValue::text("doorpass"))),
            dispatch,
            doorpass,
        ),
        ("drive=C=>next", Trigger::Completion, drive, next),
        ("drive=F=>parentfails1", Trigger::Failure, drive, drive_fails),
        ("doorpass=C=>next", Trigger::Completion, doorpass, next),
        ("doorpass=F=>parentfails2", Trigger::Failure, doorpass, doorpass_fails),
        ("next=S=>dispatch", Trigger::Success, next, dispatch),
        ("next=C=>parentcompletes", Trigger::Completion, next, done),
    ];
    for (name, trigger, from, to) in wiring {
        sm.add_transition(Transition::new(name, trigger).from(from).to(to))?;
    }
    Ok(exec)
}
