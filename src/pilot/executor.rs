//! Plan execution sub-machine.
//!
//! ```text
//! dispatch =D(drive)=>    drive    =C=> next   =F=> ParentFails
//! dispatch =D(doorpass)=> doorpass =C=> next   =F=> ParentFails
//! next =S=> dispatch
//! next =C=> ParentCompletes
//! ```
//!
//! The plan and its cursor are shared between the executor node and its
//! children.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::error::{Result, SarathiError};
use crate::fsm::{Behavior, DataValue, Event, NodeContext};
use crate::navigation::{NavPlan, NavStep, PlanCursor};

use super::PilotContext;
use super::motion::MotionTask;

pub(crate) type SharedCursor = Arc<Mutex<PlanCursor>>;

/// Receives a `Data(NavPlan)` event and loads it for its children.
pub struct PilotExecutePlan {
    cursor: SharedCursor,
}

impl PilotExecutePlan {
    pub(crate) fn new(cursor: SharedCursor) -> Self {
        Self { cursor }
    }
}

impl Behavior for PilotExecutePlan {
    fn start(&mut self, node: &NodeContext<'_>, event: &Event) -> Result<()> {
        let plan = event
            .data()
            .and_then(|d| d.downcast_ref::<NavPlan>())
            .ok_or_else(|| node.malformed("Data(NavPlan)", event))?;
        self.cursor.lock().load(plan.clone());
        Ok(())
    }

    fn stop(&mut self, _node: &NodeContext<'_>) {
        self.cursor.lock().clear();
    }
}

/// Posts the kind of the step under the cursor as text data.
pub struct DispatchStep {
    cursor: SharedCursor,
}

impl DispatchStep {
    pub(crate) fn new(cursor: SharedCursor) -> Self {
        Self { cursor }
    }
}

impl Behavior for DispatchStep {
    fn start(&mut self, node: &NodeContext<'_>, _event: &Event) -> Result<()> {
        let cursor = self.cursor.lock();
        let step = cursor
            .current()
            .ok_or_else(|| SarathiError::Execution(format!("{}: no step to dispatch", node.path())))?;
        info!("nav step {}: {}", cursor.index(), step.kind());
        node.post_data(DataValue::text(step.kind()));
        Ok(())
    }
}

/// Which primitive a [`MotionStep`] drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepKind {
    Drive,
    DoorwayPass,
}

/// Runs the step under the cursor through the matching robot primitive,
/// completing or failing when the background poller sees the outcome.
pub struct MotionStep {
    kind: StepKind,
    ctx: Arc<PilotContext>,
    cursor: SharedCursor,
    task: Option<MotionTask>,
}

impl MotionStep {
    pub(crate) fn new(kind: StepKind, ctx: Arc<PilotContext>, cursor: SharedCursor) -> Self {
        Self {
            kind,
            ctx,
            cursor,
            task: None,
        }
    }

    fn issue(&self, step: &NavStep) -> Result<()> {
        match (self.kind, step) {
            (StepKind::Drive, NavStep::Drive(points)) => self.ctx.robot.start_drive(points),
            (StepKind::DoorwayPass, NavStep::DoorwayPass(id)) => {
                self.ctx.robot.start_doorway_pass(id)
            }
            _ => Err(SarathiError::Execution(format!(
                "{:?} node cannot run a {} step",
                self.kind,
                step.kind()
            ))),
        }
    }
}

impl Behavior for MotionStep {
    fn start(&mut self, node: &NodeContext<'_>, _event: &Event) -> Result<()> {
        let step = self
            .cursor
            .lock()
            .current()
            .cloned()
            .ok_or_else(|| SarathiError::Execution(format!("{}: no current step", node.path())))?;

        if let Err(e) = self.issue(&step) {
            warn!("{}: {}", node.path(), e);
            node.post_failure();
            return Ok(());
        }

        let poll = Duration::from_millis(self.ctx.motion.poll_interval_ms);
        self.task = Some(MotionTask::spawn(
            step.kind(),
            Arc::clone(&self.ctx.robot),
            node.poster(),
            poll,
        )?);
        Ok(())
    }

    fn stop(&mut self, _node: &NodeContext<'_>) {
        if let Some(task) = self.task.take() {
            let still_moving = !task.is_finished();
            task.cancel();
            if still_moving {
                self.ctx.robot.stop_motion();
            }
        }
    }
}

/// Advances the cursor: `Success` while steps remain, `Completion` after
/// the last one.
pub struct NextStep {
    cursor: SharedCursor,
}

impl NextStep {
    pub(crate) fn new(cursor: SharedCursor) -> Self {
        Self { cursor }
    }
}

impl Behavior for NextStep {
    fn start(&mut self, node: &NodeContext<'_>, _event: &Event) -> Result<()> {
        if self.cursor.lock().advance() {
            node.post_success();
        } else {
            node.post_completion();
        }
        Ok(())
    }
}
