// SPDX-License-Identifier: MIT OR Apache-2.0
//! Host-side model of line node trees for `Linebridge`.
//!
//! This crate provides the scene the interchange engines talk to:
//! - Line, line set, brush, reduction and texture map nodes
//! - Pencil materials with gradation zones and line functions
//! - Position and color node groups
//! - Curve mappings
//!
//! ## Architecture
//!
//! Engines never touch the model directly. They go through the [`Scope`]
//! trait, which addresses entities by name with [`EntityRef`]. [`Scene`] is
//! the in-memory implementation, stored on disk as RON.

pub mod node;
pub mod socket;
pub mod link;
pub mod graph;
pub mod value;
pub mod curve;
pub mod material;
pub mod kinds;
pub mod scope;
pub mod scene;

pub use node::{Node, NodeId, NodeKind, NodeRegistry, PropertyDef};
pub use socket::{Socket, SocketType};
pub use link::{Link, LinkId};
pub use graph::{Graph, LinkError};
pub use value::{EnumItem, PropertyValue};
pub use curve::{CurvePoint, HandleType};
pub use material::{GradationZone, GroupKind, Material, NodeGroup};
pub use scope::{EntityRef, SceneError, Scope};
pub use scene::Scene;
