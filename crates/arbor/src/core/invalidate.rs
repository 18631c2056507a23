use std::sync::mpsc;

use tracing::trace;

use super::id::NodeId;

/// A deferred invalidation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalidation {
    /// Redraw.
    Draw(NodeId),
    /// Re-measure the node and its ancestors, then redraw.
    Measure(NodeId),
}

/// A cloneable handle for requesting invalidation from outside the dispatch call stack.
///
/// Data sources, timers and background threads hold one of these. Requests queue on a channel
/// that the window drains at the start of every frame, so nothing touches the tree from the
/// sending side.
#[derive(Debug, Clone)]
pub struct Invalidator {
    /// Sending half of the window's invalidation channel.
    tx: mpsc::Sender<Invalidation>,
}

impl Invalidator {
    /// Wrap a channel sender.
    pub(crate) fn new(tx: mpsc::Sender<Invalidation>) -> Self {
        Self { tx }
    }

    /// Request a redraw of a node.
    pub fn invalidate(&self, node: NodeId) {
        self.send(Invalidation::Draw(node));
    }

    /// Request a re-measure of a node.
    pub fn invalidate_measure(&self, node: NodeId) {
        self.send(Invalidation::Measure(node));
    }

    /// Queue a request. A closed window drops it.
    fn send(&self, inv: Invalidation) {
        if self.tx.send(inv).is_err() {
            trace!(?inv, "invalidation dropped: window closed");
        }
    }
}
