#![forbid(unsafe_code)]

//! Component tree and commit driver.
//!
//! # Commit order
//!
//! [`Host::commit`] walks every root in mount order and, within each tree,
//! calls [`Component::on_commit`] in post-order: all children (in mount order)
//! before their parent. This is the ordering guarantee that lets a parent read
//! state registered by its descendants during the same commit.
//!
//! # Commit requests
//!
//! Mounting a component or calling [`CommitHandle::request`] marks the host
//! dirty. [`Host::flush`] keeps committing until no request is pending, up to
//! [`MAX_CASCADE`] commits.
//!
//! # Unmount
//!
//! [`Host::unmount`] calls [`Component::on_unmount`] for the whole subtree,
//! children first, then drops the nodes.

use std::cell::Cell;
use std::rc::Rc;

use tracing::{debug, debug_span};
use web_time::Instant;

/// Upper bound on commits performed by a single [`Host::flush`].
pub const MAX_CASCADE: usize = 32;

/// Identifier of a mounted component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl core::fmt::Display for NodeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "node:{}", self.0)
    }
}

/// Shared "another commit is needed" flag.
#[derive(Debug, Clone, Default)]
pub struct CommitHandle {
    requested: Rc<Cell<bool>>,
}

impl CommitHandle {
    /// Request another commit.
    pub fn request(&self) {
        self.requested.set(true);
    }

    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.requested.get()
    }

    /// Clear the request, returning whether one was pending.
    pub fn take(&self) -> bool {
        self.requested.replace(false)
    }
}

/// Context handed to lifecycle callbacks.
#[derive(Debug)]
pub struct CommitCx {
    commit: u64,
    handle: CommitHandle,
}

impl CommitCx {
    /// 1-based index of the running commit.
    #[must_use]
    pub fn commit(&self) -> u64 {
        self.commit
    }

    /// Ask the host for another commit after this one.
    pub fn request_commit(&self) {
        self.handle.request();
    }

    /// Handle for requesting commits later, outside this callback.
    #[must_use]
    pub fn handle(&self) -> CommitHandle {
        self.handle.clone()
    }
}

/// Anything the host can drive.
pub trait Component {
    /// Name used in tracing fields.
    fn name(&self) -> &'static str {
        "component"
    }

    /// Post-commit lifecycle callback.
    fn on_commit(&mut self, cx: &mut CommitCx);

    /// Permanent removal. Run pending cleanups here.
    fn on_unmount(&mut self) {}
}

/// Summary of one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReport {
    pub commit: u64,
    /// Nodes in the order their callbacks ran.
    pub order: Vec<NodeId>,
    /// Whether a callback requested another commit.
    pub requested_commit: bool,
}

struct Node {
    component: Box<dyn Component>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Deterministic component host.
pub struct Host {
    nodes: Vec<Option<Node>>,
    roots: Vec<NodeId>,
    commits: u64,
    handle: CommitHandle,
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("live_nodes", &self.len())
            .field("roots", &self.roots)
            .field("commits", &self.commits)
            .finish()
    }
}

impl Default for Host {
    fn default() -> Self {
        Self::new()
    }
}

impl Host {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            roots: Vec::new(),
            commits: 0,
            handle: CommitHandle::default(),
        }
    }

    /// Mount `component` under `parent` (or as a new root).
    ///
    /// Mounting a child under a parent that is not live mounts it as a root.
    pub fn mount(&mut self, parent: Option<NodeId>, component: impl Component + 'static) -> NodeId {
        let id = NodeId(self.nodes.len());
        let parent = parent.filter(|p| self.is_live(*p));
        debug!(
            target: "ftip.host",
            node = %id,
            component = component.name(),
            parent = ?parent,
            "mount"
        );
        self.nodes.push(Some(Node {
            component: Box::new(component),
            parent,
            children: Vec::new(),
        }));
        match parent.and_then(|p| self.node_mut(p)) {
            Some(parent_node) => parent_node.children.push(id),
            None => self.roots.push(id),
        }
        self.handle.request();
        id
    }

    /// Unmount `id` and its whole subtree, children first.
    ///
    /// Returns the removed nodes in the order their callbacks ran.
    pub fn unmount(&mut self, id: NodeId) -> Vec<NodeId> {
        if !self.is_live(id) {
            return Vec::new();
        }
        let mut order = Vec::new();
        self.post_order(id, &mut order);

        for &node_id in &order {
            if let Some(node) = self.node_mut(node_id) {
                debug!(
                    target: "ftip.host",
                    node = %node_id,
                    component = node.component.name(),
                    "unmount"
                );
                node.component.on_unmount();
            }
        }

        let parent = self.node(id).and_then(|n| n.parent);
        match parent.and_then(|p| self.node_mut(p)) {
            Some(parent_node) => parent_node.children.retain(|c| *c != id),
            None => self.roots.retain(|r| *r != id),
        }
        for &node_id in &order {
            self.nodes[node_id.0] = None;
        }
        order
    }

    /// Run one commit over every live component.
    pub fn commit(&mut self) -> CommitReport {
        self.handle.take();
        self.commits += 1;
        let commit = self.commits;

        let mut order = Vec::new();
        for root in self.roots.clone() {
            self.post_order(root, &mut order);
        }

        let start = Instant::now();
        let _span = debug_span!(
            "ftip.commit",
            commit,
            callbacks = order.len() as u64,
            duration_us = tracing::field::Empty
        )
        .entered();

        let mut cx = CommitCx {
            commit,
            handle: self.handle.clone(),
        };
        for &node_id in &order {
            if let Some(node) = self.node_mut(node_id) {
                node.component.on_commit(&mut cx);
            }
        }

        let duration_us = start.elapsed().as_micros() as u64;
        tracing::Span::current().record("duration_us", duration_us);

        CommitReport {
            commit,
            order,
            requested_commit: self.handle.is_requested(),
        }
    }

    /// Commit until no commit is requested.
    ///
    /// Returns the reports of every commit performed (at most [`MAX_CASCADE`]).
    pub fn flush(&mut self) -> Vec<CommitReport> {
        let mut reports = Vec::new();
        while self.handle.is_requested() && reports.len() < MAX_CASCADE {
            reports.push(self.commit());
        }
        if self.handle.is_requested() {
            tracing::warn!(
                target: "ftip.host",
                max = MAX_CASCADE,
                "commit cascade limit reached with a commit still requested"
            );
        }
        reports
    }

    /// Handle for requesting commits from outside a callback.
    #[must_use]
    pub fn commit_handle(&self) -> CommitHandle {
        self.handle.clone()
    }

    /// Number of commits performed so far.
    #[must_use]
    pub fn commits(&self) -> u64 {
        self.commits
    }

    #[must_use]
    pub fn is_live(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Number of live components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Children of `id` in mount order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |n| n.children.as_slice())
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    fn post_order(&self, id: NodeId, out: &mut Vec<NodeId>) {
        if let Some(node) = self.node(id) {
            for &child in &node.children {
                self.post_order(child, out);
            }
            out.push(id);
        }
    }
}
