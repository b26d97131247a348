// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node tree containing nodes and the links between them.

use crate::link::{Link, LinkId};
use crate::node::{Node, NodeId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A line node tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    /// Tree name
    pub name: String,
    /// Nodes in the tree
    nodes: IndexMap<NodeId, Node>,
    /// Links between nodes
    links: IndexMap<LinkId, Link>,
}

impl Graph {
    /// Create a new empty tree
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
            links: IndexMap::new(),
        }
    }

    /// Add a node to the tree, renaming it if its name is taken
    pub fn add_node(&mut self, mut node: Node) -> NodeId {
        node.name = self.unique_name(&node.name);
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node and its links
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        self.links.retain(|_, l| !l.touches(node_id));
        self.nodes.shift_remove(&node_id)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// Find a node by name
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.nodes.values().find(|n| n.name == name).map(|n| n.id)
    }

    /// Get all nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Name derived from `base` that no node in the tree uses yet
    pub fn unique_name(&self, base: &str) -> String {
        unique_name(base, |name| self.nodes.values().any(|n| n.name == name))
    }

    /// Link `child` into the `socket` of `parent`
    pub fn connect(&mut self, child: NodeId, parent: NodeId, socket: &str) -> Result<LinkId, LinkError> {
        let child_node = self.nodes.get(&child).ok_or(LinkError::NodeNotFound(child))?;
        let parent_node = self.nodes.get(&parent).ok_or(LinkError::NodeNotFound(parent))?;
        let target = parent_node
            .input_socket(socket)
            .ok_or_else(|| LinkError::SocketNotFound(socket.to_string()))?;

        if !target.accepts(child_node.output) {
            return Err(LinkError::Incompatible {
                socket: socket.to_string(),
                child: child_node.kind.clone(),
            });
        }
        if !target.list && self.links.values().any(|l| l.feeds(parent, socket)) {
            return Err(LinkError::SocketOccupied(socket.to_string()));
        }
        if child == parent {
            return Err(LinkError::SelfLoop);
        }
        // The parent must not already feed the child
        if self.depends_on(child, parent) {
            return Err(LinkError::Cycle);
        }

        let link = Link::new(child, parent, socket);
        let id = link.id;
        self.links.insert(id, link);
        Ok(id)
    }

    /// Remove every link into a socket
    pub fn clear_socket(&mut self, parent: NodeId, socket: &str) {
        self.links.retain(|_, l| !l.feeds(parent, socket));
    }

    /// Get the number of links
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Children linked into the named input socket of a node, in link order
    pub fn input_links(&self, node_id: NodeId, socket: &str) -> Vec<NodeId> {
        self.links
            .values()
            .filter(|l| l.feeds(node_id, socket))
            .map(|l| l.child)
            .collect()
    }

    /// Children linked into any input of a node, in socket order
    pub fn children(&self, node_id: NodeId) -> Vec<NodeId> {
        let Some(node) = self.node(node_id) else {
            return Vec::new();
        };
        node.inputs
            .iter()
            .flat_map(|socket| self.input_links(node_id, &socket.identifier))
            .collect()
    }

    /// Whether a node feeds at least one parent
    pub fn is_used(&self, node_id: NodeId) -> bool {
        self.links.values().any(|l| l.child == node_id)
    }

    /// Remove a node that feeds no parent, then every child left unused by it.
    /// Returns the names of the removed nodes.
    pub fn remove_if_unused(&mut self, node_id: NodeId) -> Vec<String> {
        if self.is_used(node_id) {
            return Vec::new();
        }
        let children = self.children(node_id);
        let Some(node) = self.remove_node(node_id) else {
            return Vec::new();
        };
        let mut removed = vec![node.name];
        for child in children {
            removed.extend(self.remove_if_unused(child));
        }
        removed
    }

    /// Whether `node_id` consumes `target` directly or transitively
    fn depends_on(&self, node_id: NodeId, target: NodeId) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![node_id];
        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            stack.extend(
                self.links
                    .values()
                    .filter(|l| l.parent == current)
                    .map(|l| l.child),
            );
        }
        false
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("Line Node Tree")
    }
}

/// `base`, or `base.001`, `base.002`, ... whichever `taken` rejects first
pub fn unique_name(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    (1..)
        .map(|i| format!("{base}.{i:03}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Error when linking two nodes
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// Node not found
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Parent has no such input socket
    #[error("No input socket '{0}'")]
    SocketNotFound(String),

    /// Child's output does not fit the socket
    #[error("Socket '{socket}' does not accept {child}")]
    Incompatible {
        /// Parent socket
        socket: String,
        /// Child node kind
        child: String,
    },

    /// Single socket already holds a link
    #[error("Socket '{0}' is already linked")]
    SocketOccupied(String),

    /// Self-loop not allowed
    #[error("Self-loop not allowed")]
    SelfLoop,

    /// Link would close a cycle
    #[error("Link would create a cycle")]
    Cycle,
}
