// SPDX-License-Identifier: MIT OR Apache-2.0
//! Host collaborator interface used by the interchange engines.
//!
//! Entities are addressed by name through [`EntityRef`]; the host owns
//! every entity and the engines only reach them through [`Scope`].

use crate::curve::{self, CurvePoint};
use crate::graph::LinkError;
use crate::material::GroupKind;
use crate::value::{EnumItem, PropertyValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name-based address of a host entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    /// Node inside a line node tree
    Node {
        /// Tree name
        tree: String,
        /// Node name
        name: String,
    },
    /// Material
    Material(String),
    /// Line functions container hosted by the named material
    LineFunctions(String),
    /// Position or color node group
    NodeGroup(String),
}

impl EntityRef {
    /// Address a node in a tree
    pub fn node(tree: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Node {
            tree: tree.into(),
            name: name.into(),
        }
    }

    /// Entity name within its collection
    pub fn name(&self) -> &str {
        match self {
            Self::Node { name, .. } => name,
            Self::Material(name) | Self::LineFunctions(name) | Self::NodeGroup(name) => name,
        }
    }

    /// `tree/name` for nodes, the bare name otherwise
    pub fn qualified_name(&self) -> String {
        match self {
            Self::Node { tree, name } => format!("{tree}/{name}"),
            other => other.name().to_string(),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node { .. } => write!(f, "node '{}'", self.qualified_name()),
            Self::Material(name) => write!(f, "material '{name}'"),
            Self::LineFunctions(name) => write!(f, "line functions '{name}'"),
            Self::NodeGroup(name) => write!(f, "node group '{name}'"),
        }
    }
}

/// Errors raised by host operations
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// Tree not found
    #[error("Node tree not found: {0}")]
    TreeNotFound(String),

    /// Entity not found
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityRef),

    /// Node kind is not registered
    #[error("Unknown node kind: {0}")]
    UnknownKind(String),

    /// Entity has no such property
    #[error("{entity} has no property '{property}'")]
    UnknownProperty {
        /// Entity queried
        entity: EntityRef,
        /// Property name
        property: String,
    },

    /// Value does not match the property's type
    #[error("Property '{property}' expects {expected}, got {found}")]
    TypeMismatch {
        /// Property name
        property: String,
        /// Declared type
        expected: &'static str,
        /// Supplied type
        found: &'static str,
    },

    /// Enum token is not declared
    #[error("Property '{property}' has no item '{token}'")]
    UnknownEnumItem {
        /// Property name
        property: String,
        /// Rejected token
        token: String,
    },

    /// Node has no such input socket
    #[error("{entity} has no input socket '{socket}'")]
    SocketNotFound {
        /// Entity queried
        entity: EntityRef,
        /// Socket identifier
        socket: String,
    },

    /// Link rejected by the tree
    #[error(transparent)]
    Link(#[from] LinkError),

    /// Operation requires a pencil material
    #[error("Material '{0}' is not a pencil material")]
    NotAPencilMaterial(String),
}

/// Result type for host operations
pub type Result<T> = std::result::Result<T, SceneError>;

/// Host scope the interchange engines read from and write into
pub trait Scope {
    // ------------------------------------------------------------------
    // Enumeration
    // ------------------------------------------------------------------

    /// Names of all line node trees, in host order
    fn trees(&self) -> Vec<String>;

    /// Nodes of a tree, in host order
    fn nodes(&self, tree: &str) -> Vec<EntityRef>;

    /// Names of all materials, in host order
    fn materials(&self) -> Vec<String>;

    /// Whether the material carries pencil shading settings
    fn is_pencil_material(&self, material: &str) -> bool;

    /// Line functions container attached to a material
    fn line_functions_of(&self, material: &str) -> Option<EntityRef>;

    /// Names of all node groups of a kind
    fn node_groups(&self, kind: GroupKind) -> Vec<String>;

    /// Ensure a line node tree exists
    fn ensure_tree(&mut self, tree: &str);

    // ------------------------------------------------------------------
    // Entity state
    // ------------------------------------------------------------------

    /// Native kind id of a node or container
    fn native_kind(&self, entity: &EntityRef) -> Option<String>;

    /// Node editor location
    fn location(&self, entity: &EntityRef) -> Option<[f64; 2]>;

    /// Move a node in the node editor
    fn set_location(&mut self, entity: &EntityRef, location: [f64; 2]) -> Result<()>;

    /// Read a property
    fn property(&self, entity: &EntityRef, name: &str) -> Result<PropertyValue>;

    /// Write a property; the value must match the declared type
    fn set_property(&mut self, entity: &EntityRef, name: &str, value: PropertyValue) -> Result<()>;

    /// Declared items of an enum property
    fn enum_items(&self, entity: &EntityRef, name: &str) -> Result<Vec<EnumItem>>;

    // ------------------------------------------------------------------
    // Links
    // ------------------------------------------------------------------

    /// Input socket identifiers of a node, in socket order
    fn input_sockets(&self, entity: &EntityRef) -> Vec<String>;

    /// Children linked into a socket, in link order
    fn linked_nodes(&self, entity: &EntityRef, socket: &str) -> Result<Vec<EntityRef>>;

    /// Link a child's output into a parent's socket. Single sockets drop
    /// their previous link.
    fn link(&mut self, parent: &EntityRef, socket: &str, child: &EntityRef) -> Result<()>;

    // ------------------------------------------------------------------
    // Creation and deletion
    // ------------------------------------------------------------------

    /// Create a node; the host may rename it to keep names unique
    fn create_node(&mut self, tree: &str, kind: &str, name: &str) -> Result<EntityRef>;

    /// Create a plain material and return its final name
    fn create_material(&mut self, name: &str) -> String;

    /// Turn a material into a pencil material with `zone_count` zones,
    /// resetting every pencil property
    fn init_pencil_material(&mut self, material: &str, zone_count: usize) -> Result<()>;

    /// Create a line functions container and attach it to `material`
    fn create_line_functions(&mut self, material: &str, name: &str) -> Result<EntityRef>;

    /// Create a node group and return its address
    fn create_node_group(&mut self, name: &str, kind: GroupKind) -> EntityRef;

    /// Delete an entity nothing uses. Returns whether it was removed.
    fn delete_if_unused(&mut self, entity: &EntityRef) -> bool;

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    /// Whether a scene object exists
    fn has_object(&self, name: &str) -> bool;

    /// Whether a material exists
    fn has_material(&self, name: &str) -> bool;

    /// Whether an image exists
    fn has_image(&self, name: &str) -> bool;

    /// Whether a node group exists
    fn has_node_group(&self, name: &str) -> bool;

    // ------------------------------------------------------------------
    // Curves
    // ------------------------------------------------------------------

    /// Control points of a curve property
    fn curve_points(&self, entity: &EntityRef, name: &str) -> Result<Vec<CurvePoint>> {
        match self.property(entity, name)? {
            PropertyValue::Curve(points) => Ok(points),
            other => Err(SceneError::TypeMismatch {
                property: name.to_string(),
                expected: "curve",
                found: other.type_name(),
            }),
        }
    }

    /// Replace the control points of a curve property
    fn set_curve_points(&mut self, entity: &EntityRef, name: &str, points: Vec<CurvePoint>) -> Result<()> {
        self.set_property(entity, name, PropertyValue::Curve(points))
    }

    /// Evaluate a curve property at `count` evenly spaced positions
    fn sample_curve(&self, entity: &EntityRef, name: &str, count: usize) -> Result<Vec<f64>> {
        let points = self.curve_points(entity, name)?;
        Ok(curve::sample(&points, count))
    }
}
