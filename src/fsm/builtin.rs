//! Stock node behaviors.

use tracing::info;

use crate::error::Result;

use super::behavior::{Behavior, NodeContext};
use super::event::Event;

/// Does nothing; a resting state.
#[derive(Clone, Copy, Debug, Default)]
pub struct Idle;

impl Behavior for Idle {
    fn start(&mut self, _ctx: &NodeContext<'_>, _event: &Event) -> Result<()> {
        Ok(())
    }
}

/// Reports completion of the enclosing node.
#[derive(Clone, Copy, Debug, Default)]
pub struct ParentCompletes;

impl Behavior for ParentCompletes {
    fn start(&mut self, ctx: &NodeContext<'_>, _event: &Event) -> Result<()> {
        ctx.parent_completes();
        Ok(())
    }
}

/// Reports success of the enclosing node.
#[derive(Clone, Copy, Debug, Default)]
pub struct ParentSucceeds;

impl Behavior for ParentSucceeds {
    fn start(&mut self, ctx: &NodeContext<'_>, _event: &Event) -> Result<()> {
        ctx.parent_succeeds();
        Ok(())
    }
}

/// Reports failure of the enclosing node.
#[derive(Clone, Copy, Debug, Default)]
pub struct ParentFails;

impl Behavior for ParentFails {
    fn start(&mut self, ctx: &NodeContext<'_>, _event: &Event) -> Result<()> {
        ctx.parent_fails();
        Ok(())
    }
}

/// Logs a message, then completes.
#[derive(Clone, Debug)]
pub struct Print(pub String);

impl Print {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl Behavior for Print {
    fn start(&mut self, ctx: &NodeContext<'_>, event: &Event) -> Result<()> {
        info!("{}: {} ({})", ctx.path(), self.0, event.kind);
        ctx.post_completion();
        Ok(())
    }
}
