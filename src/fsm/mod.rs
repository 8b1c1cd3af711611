//! Hierarchical, event-driven state machines.
//!
//! - [`StateMachine`]: node arena, transition table and dispatch loop
//! - [`Behavior`]: what a node does on entry and exit
//! - [`Transition`] / [`Trigger`]: declarative edges and their predicates
//! - [`Event`]: immutable events routed by [`NodeRef`]
//!
//! A node with children is a sub-machine: its parent only observes the
//! `Completion`, `Success` or `Failure` events posted on its behalf by
//! [`ParentCompletes`], [`ParentSucceeds`] and [`ParentFails`].

mod behavior;
mod builtin;
mod event;
mod machine;
mod transition;

pub use behavior::{Behavior, EventPoster, FnBehavior, NodeContext, from_fn};
pub use builtin::{Idle, ParentCompletes, ParentFails, ParentSucceeds, Print};
pub use event::{DataValue, Event, EventKind, NodeId, NodeRef, PilotStatusKind};
pub use machine::StateMachine;
pub use transition::{Effect, Transition, Trigger};
