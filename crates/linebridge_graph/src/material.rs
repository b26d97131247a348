// SPDX-License-Identifier: MIT OR Apache-2.0
//! Materials, gradation zones and node groups.

use crate::node::Node;
use crate::value::PropertyValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Property holding a pencil material's gradation zones
pub const ZONES_PROPERTY: &str = "pcl4mtl_zones";

/// One zone of a fixed-count gradation ramp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradationZone {
    /// Zone identifier
    pub zone_id: i64,
    /// Start of the zone in [0, 1]
    pub pos_min: f64,
    /// End of the zone in [0, 1]
    pub pos_max: f64,
    /// Whether the zone color is applied
    pub color_enabled: bool,
    /// Linear-light zone color
    pub color: [f64; 3],
    /// Blend amount of the zone color
    pub blend_amount: f64,
}

impl GradationZone {
    /// `count` zones splitting [0, 1] evenly
    pub fn evenly_spaced(count: usize) -> Vec<Self> {
        (0..count)
            .map(|i| {
                let n = count as f64;
                Self {
                    zone_id: i as i64,
                    pos_min: i as f64 / n,
                    pos_max: (i + 1) as f64 / n,
                    color_enabled: false,
                    color: [1.0, 1.0, 1.0],
                    blend_amount: 1.0,
                }
            })
            .collect()
    }
}

/// A scene material
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    /// Material name, unique within the scene
    pub name: String,
    /// Whether the material carries pencil shading settings
    pub pencil: bool,
    /// Pencil shading properties (empty for plain materials)
    pub properties: IndexMap<String, PropertyValue>,
    /// Material holding this material's line functions
    pub line_functions: Option<String>,
    /// Line functions container node when this material hosts one
    pub container: Option<Node>,
    /// Number of objects using the material
    pub users: u32,
}

impl Material {
    /// Create a new plain material
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pencil: false,
            properties: IndexMap::new(),
            line_functions: None,
            container: None,
            users: 0,
        }
    }

    /// Gradation zones, empty for plain materials
    pub fn zones(&self) -> &[GradationZone] {
        match self.properties.get(ZONES_PROPERTY) {
            Some(PropertyValue::Gradation(zones)) => zones,
            _ => &[],
        }
    }
}

/// Kind of a node group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupKind {
    /// Position group used by gradation offsets
    Position,
    /// Color group used by gradation colors
    Color,
}

impl GroupKind {
    /// Property storing the group's values
    pub fn values_property(&self) -> &'static str {
        match self {
            GroupKind::Position => "pcl4_position_group_values",
            GroupKind::Color => "pcl4_color_group_values",
        }
    }

    /// Material property referencing a group of this kind
    pub fn material_property(&self) -> &'static str {
        match self {
            GroupKind::Position => "pcl4mtl_position_group",
            GroupKind::Color => "pcl4mtl_color_group",
        }
    }
}

/// A node group holding position or color values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeGroup {
    /// Group name
    pub name: String,
    /// Group kind
    pub kind: GroupKind,
    /// Group properties
    pub properties: IndexMap<String, PropertyValue>,
}

impl NodeGroup {
    /// Create a new empty group
    pub fn new(name: impl Into<String>, kind: GroupKind) -> Self {
        let value = match kind {
            GroupKind::Position => PropertyValue::FloatList(Vec::new()),
            GroupKind::Color => PropertyValue::ColorList(Vec::new()),
        };
        let mut properties = IndexMap::new();
        properties.insert(kind.values_property().to_string(), value);
        Self {
            name: name.into(),
            kind,
            properties,
        }
    }
}
