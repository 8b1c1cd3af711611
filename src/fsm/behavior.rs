//! Node behaviors and the handles they use to post events.

use crossbeam_channel::Sender;
use tracing::warn;

use crate::error::{Result, SarathiError};

use super::event::{DataValue, Event, EventKind, NodeRef};

/// What a node does when it is entered and left.
///
/// `start` runs synchronously on the dispatch thread; anything long-running
/// must be moved to a background task that reports back through an
/// [`EventPoster`]. Events posted from `start` are queued, never dispatched
/// re-entrantly.
pub trait Behavior: Send {
    fn start(&mut self, ctx: &NodeContext<'_>, event: &Event) -> Result<()>;

    /// Called once the node's running children have been stopped.
    fn stop(&mut self, _ctx: &NodeContext<'_>) {}
}

/// Behavior backed by a closure, see [`from_fn`].
pub struct FnBehavior<F>(F);

/// Wrap a closure as a node behavior.
pub fn from_fn<F>(f: F) -> FnBehavior<F>
where
    F: FnMut(&NodeContext<'_>, &Event) -> Result<()> + Send,
{
    FnBehavior(f)
}

impl<F> Behavior for FnBehavior<F>
where
    F: FnMut(&NodeContext<'_>, &Event) -> Result<()> + Send,
{
    fn start(&mut self, ctx: &NodeContext<'_>, event: &Event) -> Result<()> {
        (self.0)(ctx, event)
    }
}

/// Sender half of the event queue, stamped with the posting node.
///
/// Cloned into background tasks. Events posted after the node has stopped
/// carry a stale [`NodeRef`] and are discarded by the dispatcher.
#[derive(Clone, Debug)]
pub struct EventPoster {
    sender: Sender<Event>,
    origin: NodeRef,
}

impl EventPoster {
    pub(crate) fn new(sender: Sender<Event>, origin: NodeRef) -> Self {
        Self { sender, origin }
    }

    pub fn origin(&self) -> NodeRef {
        self.origin
    }

    /// Queue an event. Returns `false` if the machine is gone.
    pub fn post(&self, kind: EventKind) -> bool {
        self.sender.send(Event::from_node(kind, self.origin)).is_ok()
    }

    pub fn post_completion(&self) -> bool {
        self.post(EventKind::Completion)
    }

    pub fn post_failure(&self) -> bool {
        self.post(EventKind::Failure)
    }
}

/// View of a node handed to its behavior.
pub struct NodeContext<'a> {
    node: NodeRef,
    parent: Option<NodeRef>,
    path: String,
    sender: &'a Sender<Event>,
}

impl<'a> NodeContext<'a> {
    pub(crate) fn new(
        node: NodeRef,
        parent: Option<NodeRef>,
        path: String,
        sender: &'a Sender<Event>,
    ) -> Self {
        Self {
            node,
            parent,
            path,
            sender,
        }
    }

    pub fn node(&self) -> NodeRef {
        self.node
    }

    pub fn parent(&self) -> Option<NodeRef> {
        self.parent
    }

    /// Slash-separated name path from the root, for diagnostics.
    pub fn path(&self) -> &str {
        &self.path
    }

    fn send(&self, event: Event) {
        if self.sender.send(event).is_err() {
            warn!("{}: event queue closed", self.path);
        }
    }

    /// Post an event originating from this node.
    pub fn post_event(&self, kind: EventKind) {
        self.send(Event::from_node(kind, self.node));
    }

    pub fn post_completion(&self) {
        self.post_event(EventKind::Completion);
    }

    pub fn post_success(&self) {
        self.post_event(EventKind::Success);
    }

    pub fn post_failure(&self) {
        self.post_event(EventKind::Failure);
    }

    pub fn post_data(&self, value: DataValue) {
        self.post_event(EventKind::Data(value));
    }

    /// Post an event as if the parent had posted it, so that transitions
    /// leaving the parent see it.
    pub fn post_to_parent(&self, kind: EventKind) {
        match self.parent {
            Some(parent) => self.send(Event::from_node(kind, parent)),
            None => warn!("{}: root node has no parent to notify", self.path),
        }
    }

    pub fn parent_completes(&self) {
        self.post_to_parent(EventKind::Completion);
    }

    pub fn parent_succeeds(&self) {
        self.post_to_parent(EventKind::Success);
    }

    pub fn parent_fails(&self) {
        self.post_to_parent(EventKind::Failure);
    }

    /// Poster for background tasks acting on behalf of this node.
    pub fn poster(&self) -> EventPoster {
        EventPoster::new(self.sender.clone(), self.node)
    }

    /// Poster that speaks for the parent.
    pub fn parent_poster(&self) -> Option<EventPoster> {
        self.parent
            .map(|parent| EventPoster::new(self.sender.clone(), parent))
    }

    /// Error for an event this node cannot handle.
    pub fn malformed(&self, expected: &'static str, event: &Event) -> SarathiError {
        SarathiError::MalformedEvent {
            node: self.path.clone(),
            expected,
            found: event.kind.to_string(),
        }
    }
}
