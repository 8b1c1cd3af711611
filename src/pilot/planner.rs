//! Planning node of the pilot.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::core::Pose2D;
use crate::error::{PlanningFailure, Result};
use crate::fsm::{Behavior, DataValue, Event, EventKind, NodeContext, PilotStatusKind};
use crate::navigation::NavPlan;
use crate::planning::{PlanningFrame, RrtNode, RrtPlanner};
use crate::robot::Rgba;

use super::{PilotContext, SharedTarget};

impl From<&PlanningFailure> for PilotStatusKind {
    fn from(failure: &PlanningFailure) -> Self {
        match failure {
            PlanningFailure::StartCollides { .. } => PilotStatusKind::StartCollides,
            PlanningFailure::GoalCollides { .. } => PilotStatusKind::GoalCollides,
            PlanningFailure::MaxIterations(_) => PilotStatusKind::MaxIterations,
        }
    }
}

/// Plans from the current pose to the target and posts the resulting
/// [`NavPlan`] as data. Planning failures are reported as a `PilotStatus`
/// followed by `Failure`, both on behalf of the pilot.
pub struct PilotPlanner {
    ctx: Arc<PilotContext>,
    target: SharedTarget,
    frame: PlanningFrame,
    verbose: bool,
    planner: RrtPlanner,
}

impl PilotPlanner {
    pub(crate) fn new(
        ctx: Arc<PilotContext>,
        target: SharedTarget,
        frame: PlanningFrame,
        planner: RrtPlanner,
        verbose: bool,
    ) -> Self {
        Self {
            ctx,
            target,
            frame,
            verbose,
            planner,
        }
    }

    fn report(node: &NodeContext<'_>, kind: PilotStatusKind, detail: String) {
        node.post_to_parent(EventKind::PilotStatus { kind, detail });
        node.parent_fails();
    }
}

fn valid_target(target: Option<Pose2D>) -> Option<Pose2D> {
    target.filter(|t| t.is_finite())
}

impl Behavior for PilotPlanner {
    fn start(&mut self, node: &NodeContext<'_>, _event: &Event) -> Result<()> {
        let target = *self.target.lock();
        let Some(goal) = valid_target(target) else {
            warn!("Pilot: target pose is invalid: {:?}", target);
            Self::report(node, PilotStatusKind::InvalidPose, format!("{target:?}"));
            return Ok(());
        };

        let start = RrtNode::from_pose(self.ctx.robot.pose());
        let goal = RrtNode::from_pose(goal);
        self.ctx.viewer.clear();
        self.planner.load_catalog(self.ctx.catalog.as_ref());

        let planned = match self.planner.plan_path(start, goal, self.frame) {
            Ok(planned) => planned,
            Err(failure) => {
                warn!("PilotPlanner: {}", failure);
                Self::report(node, PilotStatusKind::from(&failure), failure.to_string());
                return Ok(());
            }
        };

        if self.verbose {
            info!(
                "Path planner generated {} nodes, path of {} ({:.0}mm)",
                planned.tree_size(),
                planned.path.len(),
                planned.length()
            );
            for n in &planned.path {
                debug!("  ({:.1}, {:.1}, {:.2})", n.x, n.y, n.q);
            }
        }
        self.ctx.viewer.clear();
        self.ctx.viewer.add_tree(&planned.path, Rgba::PATH);

        let doorways = self.ctx.catalog.doorways();
        let plan = NavPlan::from_path(&planned.points(), &doorways);
        info!("{}: {}", node.path(), plan);
        node.post_data(DataValue::any(plan));
        Ok(())
    }
}

/// Re-posts a received `PilotStatus` on behalf of its own parent, so a
/// status can be forwarded across a sub-machine boundary.
#[derive(Clone, Copy, Debug, Default)]
pub struct ParentPilotEvent;

impl Behavior for ParentPilotEvent {
    fn start(&mut self, node: &NodeContext<'_>, event: &Event) -> Result<()> {
        match &event.kind {
            EventKind::PilotStatus { .. } => {
                node.post_to_parent(event.kind.clone());
                Ok(())
            }
            _ => Err(node.malformed("PilotStatus", event)),
        }
    }
}
