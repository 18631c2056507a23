use std::{io, result::Result as StdResult};

use thiserror::Error;

use super::id::NodeId;

/// Result type for arbor operations.
pub type Result<T> = StdResult<T, Error>;

/// Core error type.
///
/// Only structural mistakes surface here. Numeric trouble during layout (NaN or infinite
/// sizes) is repaired in place and never becomes an error.
#[derive(PartialEq, Eq, Error, Debug, Clone)]
pub enum Error {
    /// The node id does not refer to a live node.
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// The child already has a parent and must be detached first.
    #[error("node already attached: {0:?}")]
    AlreadyAttached(NodeId),

    /// Attaching would make a node its own ancestor.
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    WouldCreateCycle {
        /// Requested parent.
        parent: NodeId,
        /// Requested child.
        child: NodeId,
    },

    /// A child list names the same node twice.
    #[error("duplicate child {child:?} under {parent:?}")]
    DuplicateChild {
        /// Parent being modified.
        parent: NodeId,
        /// Repeated child.
        child: NodeId,
    },

    /// A structurally invalid request, such as removing the root.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// The widget is already borrowed further up the call stack.
    #[error("widget already borrowed: {0:?}")]
    ReentrantWidgetBorrow(NodeId),

    /// The node's widget is not of the requested type.
    #[error("node {node:?} is not a {expected}")]
    WidgetType {
        /// Node whose widget was requested.
        node: NodeId,
        /// Requested widget type name.
        expected: &'static str,
    },

    /// The node cannot currently take focus.
    #[error("node cannot take focus: {0:?}")]
    NotFocusable(NodeId),

    /// Configuration could not be parsed.
    #[error("config: {0}")]
    Config(String),

    /// Invalid input value.
    #[error("invalid: {0}")]
    Invalid(String),

    /// Writing diagnostic output failed.
    #[error("output: {0}")]
    Output(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Output(e.to_string())
    }
}
