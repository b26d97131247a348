// SPDX-License-Identifier: MIT OR Apache-2.0
//! Links feeding a child node into an input socket of its parent.

use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkId(pub Uuid);

impl LinkId {
    /// Create a new random link ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LinkId {
    fn default() -> Self {
        Self::new()
    }
}

/// `child` is referenced by the `socket` of `parent`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Unique link ID
    pub id: LinkId,
    /// Referenced node
    pub child: NodeId,
    /// Referencing node
    pub parent: NodeId,
    /// Input socket of the parent
    pub socket: String,
}

impl Link {
    /// Create a link with a fresh ID
    pub fn new(child: NodeId, parent: NodeId, socket: impl Into<String>) -> Self {
        Self {
            id: LinkId::new(),
            child,
            parent,
            socket: socket.into(),
        }
    }

    /// Whether the link ends in `socket` of `parent`
    pub fn feeds(&self, parent: NodeId, socket: &str) -> bool {
        self.parent == parent && self.socket == socket
    }

    /// Whether either end is `node`
    pub fn touches(&self, node: NodeId) -> bool {
        self.child == node || self.parent == node
    }
}
