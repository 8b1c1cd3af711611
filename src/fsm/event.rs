//! Events and the handles that route them.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Index of a node in the machine's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node handle pinned to one activation of that node.
///
/// Events carry the `NodeRef` of the node that posted them. Once the node
/// is stopped or restarted the reference goes stale and its events are
/// dropped by the dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub id: NodeId,
    pub activation: u64,
}

/// Payload of a `Data` event.
#[derive(Clone)]
pub enum DataValue {
    Text(String),
    Number(f64),
    /// Arbitrary shared value, recovered with [`DataValue::downcast_ref`]
    Any(Arc<dyn Any + Send + Sync>),
}

impl DataValue {
    pub fn text(s: impl Into<String>) -> Self {
        DataValue::Text(s.into())
    }

    pub fn any<T: Any + Send + Sync>(value: T) -> Self {
        DataValue::Any(Arc::new(value))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            DataValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            DataValue::Any(v) => v.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl PartialEq for DataValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DataValue::Text(a), DataValue::Text(b)) => a == b,
            (DataValue::Number(a), DataValue::Number(b)) => a == b,
            (DataValue::Any(a), DataValue::Any(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::Text(s) => write!(f, "Text({s:?})"),
            DataValue::Number(n) => write!(f, "Number({n})"),
            DataValue::Any(_) => write!(f, "Any(..)"),
        }
    }
}

/// Why a pilot stopped short of its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PilotStatusKind {
    InvalidPose,
    StartCollides,
    GoalCollides,
    MaxIterations,
}

impl fmt::Display for PilotStatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PilotStatusKind::InvalidPose => "InvalidPose",
            PilotStatusKind::StartCollides => "StartCollides",
            PilotStatusKind::GoalCollides => "GoalCollides",
            PilotStatusKind::MaxIterations => "MaxIterations",
        };
        f.write_str(s)
    }
}

/// What happened.
#[derive(Clone, Debug, PartialEq)]
pub enum EventKind {
    Completion,
    Success,
    Failure,
    Data(DataValue),
    /// Cube tap from the given source
    Tap(u32),
    PilotStatus {
        kind: PilotStatusKind,
        detail: String,
    },
}

impl EventKind {
    /// Variant name, used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Completion => "Completion",
            EventKind::Success => "Success",
            EventKind::Failure => "Failure",
            EventKind::Data(_) => "Data",
            EventKind::Tap(_) => "Tap",
            EventKind::PilotStatus { .. } => "PilotStatus",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Data(v) => write!(f, "Data({v:?})"),
            EventKind::Tap(source) => write!(f, "Tap({source})"),
            EventKind::PilotStatus { kind, detail } => write!(f, "PilotStatus({kind}, {detail})"),
            other => f.write_str(other.name()),
        }
    }
}

/// An immutable event, optionally tagged with the node that posted it.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    pub origin: Option<NodeRef>,
}

impl Event {
    /// An event injected from outside the machine.
    pub fn external(kind: EventKind) -> Self {
        Self { kind, origin: None }
    }

    pub fn from_node(kind: EventKind, origin: NodeRef) -> Self {
        Self {
            kind,
            origin: Some(origin),
        }
    }

    pub fn tap(source: u32) -> Self {
        Self::external(EventKind::Tap(source))
    }

    /// Data payload, if this is a `Data` event.
    pub fn data(&self) -> Option<&DataValue> {
        match &self.kind {
            EventKind::Data(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.origin {
            Some(origin) => write!(f, "{} from {}", self.kind, origin.id),
            None => write!(f, "{}", self.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_value_equality() {
        assert_eq!(DataValue::text("drive"), DataValue::text("drive"));
        assert_ne!(DataValue::text("drive"), DataValue::Number(1.0));

        let shared = DataValue::any(7u32);
        assert_eq!(shared.clone(), shared);
        assert_ne!(shared, DataValue::any(7u32));
    }

    #[test]
    fn test_downcast() {
        let value = DataValue::any(vec![1, 2, 3]);
        assert_eq!(value.downcast_ref::<Vec<i32>>(), Some(&vec![1, 2, 3]));
        assert!(value.downcast_ref::<String>().is_none());
        assert!(DataValue::text("x").downcast_ref::<String>().is_none());
    }

    #[test]
    fn test_display() {
        let origin = NodeRef {
            id: NodeId(3),
            activation: 1,
        };
        let event = Event::from_node(EventKind::Failure, origin);
        assert_eq!(event.to_string(), "Failure from #3");
        assert_eq!(Event::tap(2).to_string(), "Tap(2)");

        let status = EventKind::PilotStatus {
            kind: PilotStatusKind::InvalidPose,
            detail: "no target".into(),
        };
        assert_eq!(status.to_string(), "PilotStatus(InvalidPose, no target)");
    }
}
