//! Arrival check.

use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::fsm::{Behavior, Event, NodeContext};

use super::{PilotContext, SharedTarget};

/// Succeeds when the robot is within `arrival_tolerance` of the target
/// position (heading ignored), fails otherwise.
pub struct CheckArrival {
    ctx: Arc<PilotContext>,
    target: SharedTarget,
}

impl CheckArrival {
    pub(crate) fn new(ctx: Arc<PilotContext>, target: SharedTarget) -> Self {
        Self { ctx, target }
    }
}

impl Behavior for CheckArrival {
    fn start(&mut self, node: &NodeContext<'_>, _event: &Event) -> Result<()> {
        let Some(target) = *self.target.lock() else {
            node.post_failure();
            return Ok(());
        };
        let pose = self.ctx.robot.pose();
        let distance = pose.distance(target);
        let tolerance = self.ctx.pilot.arrival_tolerance;

        if distance <= tolerance {
            info!("{}: arrived, {:.1}mm from target", node.path(), distance);
            node.post_success();
        } else {
            info!(
                "{}: {:.1}mm from target (tolerance {:.0}mm), replanning",
                node.path(),
                distance,
                tolerance
            );
            node.post_failure();
        }
        Ok(())
    }
}
