//! Declarative edges between nodes.

use std::fmt;

use super::event::{DataValue, Event, EventKind, NodeId, PilotStatusKind};

/// Event predicate of a transition.
#[derive(Clone, Debug, PartialEq)]
pub enum Trigger {
    /// Any event
    Any,
    Completion,
    Success,
    Failure,
    /// Data events, optionally only those carrying an equal payload
    Data(Option<DataValue>),
    /// Taps, optionally only from one source
    Tap(Option<u32>),
    /// Pilot status reports, optionally of one kind
    PilotStatus(Option<PilotStatusKind>),
}

impl Trigger {
    pub fn matches(&self, event: &Event) -> bool {
        match (self, &event.kind) {
            (Trigger::Any, _) => true,
            (Trigger::Completion, EventKind::Completion) => true,
            (Trigger::Success, EventKind::Success) => true,
            (Trigger::Failure, EventKind::Failure) => true,
            (Trigger::Data(None), EventKind::Data(_)) => true,
            (Trigger::Data(Some(want)), EventKind::Data(got)) => want == got,
            (Trigger::Tap(None), EventKind::Tap(_)) => true,
            (Trigger::Tap(Some(want)), EventKind::Tap(got)) => want == got,
            (Trigger::PilotStatus(None), EventKind::PilotStatus { .. }) => true,
            (Trigger::PilotStatus(Some(want)), EventKind::PilotStatus { kind, .. }) => want == kind,
            _ => false,
        }
    }
}

/// Maps the triggering event to the one handed to the destinations.
pub type Effect = Box<dyn Fn(&Event) -> Event + Send>;

/// A directed edge from source nodes to destination nodes.
///
/// Built once while wiring the graph; the machine never mutates it.
pub struct Transition {
    pub name: String,
    pub sources: Vec<NodeId>,
    pub destinations: Vec<NodeId>,
    pub trigger: Trigger,
    pub effect: Option<Effect>,
}

impl Transition {
    pub fn new(name: impl Into<String>, trigger: Trigger) -> Self {
        Self {
            name: name.into(),
            sources: Vec::new(),
            destinations: Vec::new(),
            trigger,
            effect: None,
        }
    }

    pub fn from(mut self, source: NodeId) -> Self {
        self.sources.push(source);
        self
    }

    pub fn to(mut self, destination: NodeId) -> Self {
        self.destinations.push(destination);
        self
    }

    pub fn with_effect(mut self, effect: impl Fn(&Event) -> Event + Send + 'static) -> Self {
        self.effect = Some(Box::new(effect));
        self
    }

    /// Event handed to the destinations when this transition fires.
    pub(crate) fn apply_effect(&self, event: &Event) -> Event {
        match &self.effect {
            Some(effect) => effect(event),
            None => event.clone(),
        }
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("name", &self.name)
            .field("sources", &self.sources)
            .field("destinations", &self.destinations)
            .field("trigger", &self.trigger)
            .field("effect", &self.effect.is_some())
            .finish()
    }
}
