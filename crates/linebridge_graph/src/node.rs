// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for line node trees.

use crate::socket::{Socket, SocketType};
use crate::value::{EnumItem, PropertyValue};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Node kind category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeCategory {
    /// Line output nodes
    Line,
    /// Line set, brush and reduction settings
    Settings,
    /// Texture maps
    Texture,
    /// Per-material line function containers
    Container,
}

/// Declaration of one property slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyDef {
    /// Native property name
    pub name: String,
    /// Value a fresh entity starts with
    pub default: PropertyValue,
    /// Allowed tokens for enum properties
    pub enum_items: Vec<EnumItem>,
}

impl PropertyDef {
    /// Declare a property with a default value
    pub fn new(name: impl Into<String>, default: PropertyValue) -> Self {
        Self {
            name: name.into(),
            default,
            enum_items: Vec::new(),
        }
    }

    /// Declare an enum property; tokens get ordinals in declaration order
    pub fn enumeration(name: impl Into<String>, tokens: &[&str], default: usize) -> Self {
        let enum_items: Vec<EnumItem> = tokens
            .iter()
            .zip(0_i64..)
            .map(|(token, value)| EnumItem::new(*token, value))
            .collect();
        let default = tokens.get(default).or(tokens.first()).copied().unwrap_or_default();
        Self {
            name: name.into(),
            default: PropertyValue::Enum(default.to_string()),
            enum_items,
        }
    }
}

/// Native node kind definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeKind {
    /// Unique kind identifier
    pub id: String,
    /// Default node name
    pub name: String,
    /// Category
    pub category: NodeCategory,
    /// Input sockets, in display order
    pub inputs: Vec<Socket>,
    /// What the node provides to a parent, `None` for roots
    pub output: Option<SocketType>,
    /// Property slots
    pub properties: Vec<PropertyDef>,
}

impl NodeKind {
    /// Get a property declaration by name
    pub fn property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// A node instance in a tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Node kind ID
    pub kind: String,
    /// Node name, unique within its tree
    pub name: String,
    /// Location in the node editor
    pub position: [f64; 2],
    /// Input sockets
    pub inputs: Vec<Socket>,
    /// What the node provides to a parent
    pub output: Option<SocketType>,
    /// Property values
    pub properties: IndexMap<String, PropertyValue>,
}

impl Node {
    /// Create a new node from a kind definition
    pub fn new(kind: &NodeKind) -> Self {
        Self {
            id: NodeId::new(),
            kind: kind.id.clone(),
            name: kind.name.clone(),
            position: [0.0, 0.0],
            inputs: kind.inputs.clone(),
            output: kind.output,
            properties: kind
                .properties
                .iter()
                .map(|p| (p.name.clone(), p.default.clone()))
                .collect(),
        }
    }

    /// Get an input socket by identifier
    pub fn input_socket(&self, identifier: &str) -> Option<&Socket> {
        self.inputs.iter().find(|s| s.identifier == identifier)
    }
}

/// Registry of available node kinds
#[derive(Debug, Clone)]
pub struct NodeRegistry {
    /// Registered node kinds by ID
    kinds: IndexMap<String, NodeKind>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            kinds: IndexMap::new(),
        }
    }

    /// Register a node kind
    pub fn register(&mut self, kind: NodeKind) {
        self.kinds.insert(kind.id.clone(), kind);
    }

    /// Get a node kind by ID
    pub fn get(&self, id: &str) -> Option<&NodeKind> {
        self.kinds.get(id)
    }

    /// Get all registered kinds
    pub fn kinds(&self) -> impl Iterator<Item = &NodeKind> {
        self.kinds.values()
    }

    /// Create a node from a kind ID
    pub fn create_node(&self, kind_id: &str) -> Option<Node> {
        self.get(kind_id).map(Node::new)
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
