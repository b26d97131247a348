// SPDX-License-Identifier: MIT OR Apache-2.0
//! Typed property values stored on nodes, materials and node groups.

use crate::curve::CurvePoint;
use crate::material::GradationZone;
use serde::{Deserialize, Serialize};

/// One item of an enum property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumItem {
    /// Symbolic token stored on the entity
    pub identifier: String,
    /// Declared ordinal of the token
    pub value: i64,
}

impl EnumItem {
    /// Create a new enum item
    pub fn new(identifier: impl Into<String>, value: i64) -> Self {
        Self {
            identifier: identifier.into(),
            value,
        }
    }
}

/// Value held by a property slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Float
    Float(f64),
    /// Free text
    String(String),
    /// Enum token
    Enum(String),
    /// 2D vector
    Vector2([f64; 2]),
    /// Linear-light RGB color
    Color([f64; 3]),
    /// Fixed-length boolean list
    BoolList(Vec<bool>),
    /// Scene object referenced by name
    Object(Option<String>),
    /// Scene objects referenced by name
    ObjectList(Vec<String>),
    /// Material referenced by name
    Material(Option<String>),
    /// Materials referenced by name
    MaterialList(Vec<String>),
    /// Image referenced by name
    Image(Option<String>),
    /// Node group referenced by name
    Group(Option<String>),
    /// List of floats
    FloatList(Vec<f64>),
    /// List of linear-light RGB colors
    ColorList(Vec<[f64; 3]>),
    /// Curve mapping control points
    Curve(Vec<CurvePoint>),
    /// Fixed-zone gradation ramp
    Gradation(Vec<GradationZone>),
}

impl PropertyValue {
    /// Name of the variant, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Enum(_) => "enum",
            Self::Vector2(_) => "vector2",
            Self::Color(_) => "color",
            Self::BoolList(_) => "bool list",
            Self::Object(_) => "object",
            Self::ObjectList(_) => "object list",
            Self::Material(_) => "material",
            Self::MaterialList(_) => "material list",
            Self::Image(_) => "image",
            Self::Group(_) => "group",
            Self::FloatList(_) => "float list",
            Self::ColorList(_) => "color list",
            Self::Curve(_) => "curve",
            Self::Gradation(_) => "gradation",
        }
    }

    /// Whether two values hold the same variant
    pub fn same_type(&self, other: &PropertyValue) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Get as bool if possible
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as integer if possible
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as float if possible
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as color if possible
    pub fn as_color(&self) -> Option<[f64; 3]> {
        match self {
            Self::Color(v) => Some(*v),
            _ => None,
        }
    }

    /// Name of the referenced group, if this is a set group slot
    pub fn as_group(&self) -> Option<&str> {
        match self {
            Self::Group(Some(name)) => Some(name),
            _ => None,
        }
    }
}
