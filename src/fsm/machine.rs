//! Hierarchical state machine engine.
//!
//! Nodes live in an arena owned by the machine; parents refer to children
//! (and children to parents) by [`NodeId`]. Events flow through a single
//! crossbeam queue and are dispatched one at a time on the caller's thread.
//!
//! # Dispatch
//!
//! ```text
//! dequeue event
//!   ├─ origin stale (node stopped or restarted)?  → drop
//!   ├─ first transition (registration order) whose trigger matches and
//!   │  whose sources contain the origin, or for external events any
//!   │  running source
//!   └─ fire: stop sources → start destinations with the (mapped) event
//! ```
//!
//! Behaviors may post while starting; those events are queued behind the
//! current one.

use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use tracing::{debug, error, trace};

use crate::error::{Result, SarathiError};

use super::behavior::{Behavior, NodeContext};
use super::event::{Event, NodeId, NodeRef};
use super::transition::Transition;

struct NodeSlot {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Child started on entry; first child when unset
    initial: Option<NodeId>,
    running: bool,
    activation: u64,
    /// Taken out while the behavior is being called
    behavior: Option<Box<dyn Behavior>>,
}

type Observer = Box<dyn FnMut(&Event) + Send>;

/// An event-driven hierarchy of nodes and the transitions between them.
pub struct StateMachine {
    nodes: Vec<NodeSlot>,
    transitions: Vec<Transition>,
    sender: Sender<Event>,
    receiver: Receiver<Event>,
    observer: Option<Observer>,
}

impl StateMachine {
    /// Create a machine with a single root node.
    pub fn new(root_name: impl Into<String>, root: impl Behavior + 'static) -> Self {
        let (sender, receiver) = unbounded();
        Self {
            nodes: vec![NodeSlot {
                name: root_name.into(),
                parent: None,
                children: Vec::new(),
                initial: None,
                running: false,
                activation: 0,
                behavior: Some(Box::new(root)),
            }],
            transitions: Vec::new(),
            sender,
            receiver,
            observer: None,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn slot(&self, id: NodeId) -> Result<&NodeSlot> {
        self.nodes.get(id.0).ok_or(SarathiError::UnknownNode(id))
    }

    /// Attach a new node under `parent`. Names are unique among siblings.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        behavior: impl Behavior + 'static,
    ) -> Result<NodeId> {
        let name = name.into();
        let parent_slot = self.slot(parent)?;
        if parent_slot
            .children
            .iter()
            .any(|c| self.nodes[c.0].name == name)
        {
            return Err(SarathiError::DuplicateNode {
                parent: self.path(parent),
                name,
            });
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeSlot {
            name,
            parent: Some(parent),
            children: Vec::new(),
            initial: None,
            running: false,
            activation: 0,
            behavior: Some(Box::new(behavior)),
        });
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// Choose which child `parent` enters when it starts.
    pub fn set_initial(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if !self.slot(parent)?.children.contains(&child) {
            return Err(SarathiError::UnknownNode(child));
        }
        self.nodes[parent.0].initial = Some(child);
        Ok(())
    }

    /// Register a transition. Registration order is firing priority.
    pub fn add_transition(&mut self, transition: Transition) -> Result<()> {
        for id in transition.sources.iter().chain(&transition.destinations) {
            self.slot(*id)?;
        }
        self.transitions.push(transition);
        Ok(())
    }

    /// Register a callback that sees every event the dispatcher accepts.
    pub fn set_event_observer(&mut self, observer: impl FnMut(&Event) + Send + 'static) {
        self.observer = Some(Box::new(observer));
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id.0).map(|n| n.name.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Slash-separated name path from the root.
    pub fn path(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current.and_then(|c| self.nodes.get(c.0)) {
            names.push(node.name.as_str());
            current = node.parent;
        }
        names.reverse();
        names.join("/")
    }

    pub fn find_child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|c| self.nodes[c.0].name == name)
    }

    /// Look up a node by its path below the root, e.g. `"pilot/planner"`.
    pub fn node_by_path(&self, path: &str) -> Option<NodeId> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .try_fold(self.root(), |node, name| self.find_child(node, name))
    }

    pub fn is_running(&self, id: NodeId) -> bool {
        self.nodes.get(id.0).is_some_and(|n| n.running)
    }

    /// Every running node, in arena order.
    pub fn running_nodes(&self) -> Vec<NodeId> {
        (0..self.nodes.len())
            .map(NodeId)
            .filter(|id| self.nodes[id.0].running)
            .collect()
    }

    /// Handle on the node's current activation.
    pub fn node_ref(&self, id: NodeId) -> Option<NodeRef> {
        self.nodes.get(id.0).map(|n| NodeRef {
            id,
            activation: n.activation,
        })
    }

    fn context(&self, id: NodeId) -> NodeContext<'_> {
        let slot = &self.nodes[id.0];
        let node = NodeRef {
            id,
            activation: slot.activation,
        };
        let parent = slot.parent.and_then(|p| self.node_ref(p));
        NodeContext::new(node, parent, self.path(id), &self.sender)
    }

    /// Start the root node and its initial-entry chain.
    pub fn start(&mut self, event: Event) -> Result<()> {
        self.start_node(self.root(), &event)
    }

    /// Stop every running node.
    pub fn stop(&mut self) {
        self.stop_subtree(self.root());
    }

    /// Enter a node, restarting it if it is already running.
    pub fn start_node(&mut self, id: NodeId, event: &Event) -> Result<()> {
        self.slot(id)?;
        if self.nodes[id.0].running {
            self.stop_subtree(id);
        }

        let slot = &mut self.nodes[id.0];
        slot.running = true;
        slot.activation += 1;
        let mut behavior = slot.behavior.take();
        trace!("start {}", self.path(id));

        let result = match behavior.as_mut() {
            Some(b) => b.start(&self.context(id), event),
            None => Ok(()),
        };
        self.nodes[id.0].behavior = behavior;

        if let Err(e) = result {
            error!("{} failed to start: {}", self.path(id), e);
            self.stop_subtree(id);
            return Err(e);
        }

        // A behavior may have handed control elsewhere synchronously
        if !self.nodes[id.0].running {
            return Ok(());
        }

        let slot = &self.nodes[id.0];
        if let Some(child) = slot.initial.or_else(|| slot.children.first().copied()) {
            if let Err(e) = self.start_node(child, event) {
                self.stop_subtree(id);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Stop a node and everything running below it.
    pub fn stop_node(&mut self, id: NodeId) -> Result<()> {
        self.slot(id)?;
        self.stop_subtree(id);
        Ok(())
    }

    /// Children are visited even when `id` itself is idle: a descendant may
    /// have been entered directly under a stopped parent.
    fn stop_subtree(&mut self, id: NodeId) {
        for child in self.nodes[id.0].children.clone() {
            self.stop_subtree(child);
        }
        if !self.nodes[id.0].running {
            return;
        }

        let mut behavior = self.nodes[id.0].behavior.take();
        if let Some(b) = behavior.as_mut() {
            b.stop(&self.context(id));
        }
        let slot = &mut self.nodes[id.0];
        slot.behavior = behavior;
        slot.running = false;
        trace!("stop {}", self.path(id));
    }

    /// Queue an event for dispatch.
    pub fn post_event(&self, event: Event) {
        // The machine holds a receiver, so the queue cannot be closed here
        let _ = self.sender.send(event);
    }

    /// Sender for injecting events from other threads.
    pub fn event_sender(&self) -> Sender<Event> {
        self.sender.clone()
    }

    /// Number of queued events.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Dispatch one event immediately, bypassing the queue.
    pub fn dispatch(&mut self, event: Event) -> Result<()> {
        if let Some(origin) = event.origin {
            let slot = self.slot(origin.id)?;
            if !slot.running || slot.activation != origin.activation {
                trace!("dropping stale {} ({})", event, self.path(origin.id));
                return Ok(());
            }
        }

        if let Some(observer) = self.observer.as_mut() {
            observer(&event);
        }

        let nodes = &self.nodes;
        let fired = self.transitions.iter().position(|t| {
            t.trigger.matches(&event)
                && match event.origin {
                    Some(origin) => t.sources.contains(&origin.id),
                    None => t.sources.iter().any(|s| nodes[s.0].running),
                }
        });

        match fired {
            Some(index) => self.fire(index, &event),
            None => {
                trace!("no transition for {}", event);
                Ok(())
            }
        }
    }

    fn fire(&mut self, index: usize, event: &Event) -> Result<()> {
        let transition = &self.transitions[index];
        let forwarded = transition.apply_effect(event);
        let sources = transition.sources.clone();
        let destinations = transition.destinations.clone();
        debug!("{} fired on {}", transition.name, event.kind);

        for source in sources {
            self.stop_subtree(source);
        }
        for destination in destinations {
            self.start_node(destination, &forwarded)?;
        }
        Ok(())
    }

    /// Dispatch the next queued event, if any.
    pub fn step(&mut self) -> Result<bool> {
        match self.receiver.try_recv() {
            Ok(event) => {
                self.dispatch(event)?;
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }

    /// Dispatch until the queue is empty. Returns the number of events.
    pub fn run_until_idle(&mut self) -> Result<usize> {
        let mut count = 0;
        while self.step()? {
            count += 1;
        }
        Ok(count)
    }

    /// Dispatch events as they arrive for `duration`.
    pub fn run_for(&mut self, duration: Duration) -> Result<usize> {
        let deadline = Instant::now() + duration;
        let mut count = 0;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(event) => {
                    self.dispatch(event)?;
                    count += 1;
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return Ok(count);
                }
            }
        }
    }

    /// Dispatch events until `done` holds or `timeout` elapses.
    ///
    /// Returns whether `done` was satisfied.
    pub fn run_until(
        &mut self,
        mut done: impl FnMut(&StateMachine) -> bool,
        timeout: Duration,
    ) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            if done(self) {
                return Ok(true);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(event) => self.dispatch(event)?,
                Err(_) => return Ok(done(self)),
            }
        }
    }
}
