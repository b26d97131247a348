// SPDX-License-Identifier: MIT OR Apache-2.0
//! The JSON interchange document.

use crate::error::{BridgeError, Result};
use crate::schema::{LINE, PENCIL_MATERIAL};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Top-level document keys
pub mod keys {
    /// Host platform string
    pub const PLATFORM: &str = "Platform";
    /// `major.minor` file version
    pub const FILE_VERSION: &str = "FileVersion";
    /// Length scale of the exporting host
    pub const SCALE_FACTOR: &str = "ScaleFactor";
    /// Line node records
    pub const LINES: &str = "LineNode";
    /// Material records
    pub const MATERIALS: &str = "MaterialNode";
    /// Position group records
    pub const POSITION_GROUP: &str = "PositionGroup";
    /// Color group records
    pub const COLOR_GROUP: &str = "ColorGroup";
}

/// One record of the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireNode {
    /// Entity name in the exporting host
    #[serde(rename = "NodeName")]
    pub name: String,
    /// Record type; absent on group records
    #[serde(rename = "NodeType", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    /// Node editor location
    #[serde(rename = "BlenderNodeLocation", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<[f64; 2]>,
    /// Attribute values by wire name
    #[serde(rename = "Params", default)]
    pub params: Map<String, Value>,
}

impl WireNode {
    /// Create a record of the given type
    pub fn new(name: impl Into<String>, node_type: Option<&str>) -> Self {
        Self {
            name: name.into(),
            node_type: node_type.map(str::to_string),
            location: None,
            params: Map::new(),
        }
    }

    /// Record type, or an empty string for untyped records
    pub fn type_name(&self) -> &str {
        self.node_type.as_deref().unwrap_or_default()
    }

    /// A parameter holding a string
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }

    /// A parameter holding a boolean; anything else reads as `false`
    pub fn param_flag(&self, key: &str) -> bool {
        self.params.get(key).and_then(Value::as_bool).unwrap_or(false)
    }
}

/// Records keyed by wire identifier
pub type Records = IndexMap<String, WireNode>;

/// Parsed interchange document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Exporting host
    #[serde(rename = "Platform")]
    pub platform: String,
    /// `major.minor` version
    #[serde(rename = "FileVersion")]
    pub file_version: String,
    /// Length scale of the exporting host
    #[serde(rename = "ScaleFactor", default)]
    pub scale_factor: Value,
    /// Line node records
    #[serde(rename = "LineNode")]
    pub lines: Records,
    /// Material records
    #[serde(rename = "MaterialNode")]
    pub materials: Records,
    /// Position group records
    #[serde(rename = "PositionGroup", default)]
    pub position_groups: Records,
    /// Color group records
    #[serde(rename = "ColorGroup", default)]
    pub color_groups: Records,
    /// Records that could not be read, with the reason
    #[serde(skip)]
    pub rejected: Vec<(String, String)>,
}

impl Document {
    /// Create an empty document
    pub fn new(platform: impl Into<String>, file_version: impl Into<String>, scale_factor: f64) -> Self {
        Self {
            platform: platform.into(),
            file_version: file_version.into(),
            scale_factor: Value::from(scale_factor),
            lines: Records::new(),
            materials: Records::new(),
            position_groups: Records::new(),
            color_groups: Records::new(),
            rejected: Vec::new(),
        }
    }

    /// `ScaleFactor` when it is a number
    pub fn scale_factor(&self) -> Option<f64> {
        self.scale_factor.as_f64()
    }

    /// Parse a document. Missing sections and invalid JSON are structure
    /// errors; individual malformed records are kept in `rejected`.
    pub fn from_json(text: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(text)
            .map_err(|e| BridgeError::Structure(format!("JSON load failed: {e}")))?;
        let Value::Object(mut root) = root else {
            return Err(BridgeError::Structure("document is not an object".to_string()));
        };

        for key in [keys::PLATFORM, keys::FILE_VERSION, keys::LINES, keys::MATERIALS] {
            if !root.contains_key(key) {
                return Err(BridgeError::Structure(format!("missing '{key}'")));
            }
        }

        let platform = text_field(&root, keys::PLATFORM)?;
        let file_version = match &root[keys::FILE_VERSION] {
            Value::String(version) => version.clone(),
            other => return Err(BridgeError::Version(other.to_string())),
        };
        let scale_factor = root.remove(keys::SCALE_FACTOR).unwrap_or(Value::Null);

        let mut rejected = Vec::new();
        let mut section = |key: &str, required: bool| -> Result<Records> {
            match root.remove(key) {
                Some(Value::Object(entries)) => Ok(read_records(entries, &mut rejected)),
                None | Some(Value::Null) if !required => Ok(Records::new()),
                _ => Err(BridgeError::Structure(format!("'{key}' is not an object"))),
            }
        };
        let lines = section(keys::LINES, true)?;
        let materials = section(keys::MATERIALS, true)?;
        let position_groups = section(keys::POSITION_GROUP, false)?;
        let color_groups = section(keys::COLOR_GROUP, false)?;

        Ok(Self {
            platform,
            file_version,
            scale_factor,
            lines,
            materials,
            position_groups,
            color_groups,
            rejected,
        })
    }

    /// Pretty-print with four-space indentation, keys in insertion order
    pub fn to_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        String::from_utf8(buf).map_err(|e| BridgeError::Structure(e.to_string()))
    }

    /// `(wire id, name)` of every `Line` record
    pub fn line_entries(&self) -> Vec<(String, String)> {
        typed_entries(&self.lines, LINE)
    }

    /// `(wire id, name)` of every `PencilMaterial` record
    pub fn material_entries(&self) -> Vec<(String, String)> {
        typed_entries(&self.materials, PENCIL_MATERIAL)
    }
}

fn text_field(root: &Map<String, Value>, key: &str) -> Result<String> {
    root.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| BridgeError::Structure(format!("'{key}' is not a string")))
}

fn read_records(entries: Map<String, Value>, rejected: &mut Vec<(String, String)>) -> Records {
    let mut records = Records::new();
    for (id, value) in entries {
        match serde_json::from_value::<WireNode>(value) {
            Ok(record) => {
                records.insert(id, record);
            }
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "Rejected malformed record");
                rejected.push((id, e.to_string()));
            }
        }
    }
    records
}

fn typed_entries(records: &Records, node_type: &str) -> Vec<(String, String)> {
    records
        .iter()
        .filter(|(_, record)| record.node_type.as_deref() == Some(node_type))
        .map(|(id, record)| (id.clone(), record.name.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "Platform": "Host",
            "FileVersion": "1.1",
            "ScaleFactor": 1.0,
            "LineNode": {
                "Tree/Line": {"NodeName": "Line", "NodeType": "Line", "Params": {}},
                "Tree/Set": {"NodeName": "Set", "NodeType": "LineSet", "Params": {}}
            },
            "MaterialNode": {
                "Mat": {"NodeName": "Mat", "NodeType": "PencilMaterial", "Params": {}},
                "Mat_Advanced": {"NodeName": "Mat_Advanced", "NodeType": "AdvancedMaterial", "Params": {}}
            }
        })
    }

    #[test]
    fn test_parse_and_enumerate() {
        let doc = Document::from_json(&minimal().to_string()).unwrap();
        assert_eq!(doc.line_entries(), vec![("Tree/Line".to_string(), "Line".to_string())]);
        assert_eq!(doc.material_entries(), vec![("Mat".to_string(), "Mat".to_string())]);
        assert!(doc.position_groups.is_empty());
        assert_eq!(doc.scale_factor(), Some(1.0));
    }

    #[test]
    fn test_missing_sections_are_structure_errors() {
        for key in ["Platform", "FileVersion", "LineNode", "MaterialNode"] {
            let mut value = minimal();
            value.as_object_mut().unwrap().remove(key);
            assert!(matches!(
                Document::from_json(&value.to_string()),
                Err(BridgeError::Structure(_))
            ));
        }
        assert!(matches!(Document::from_json("{not json"), Err(BridgeError::Structure(_))));
        assert!(matches!(Document::from_json("[]"), Err(BridgeError::Structure(_))));
    }

    #[test]
    fn test_non_string_version_is_a_version_error() {
        let mut value = minimal();
        value["FileVersion"] = json!(1.1);
        match Document::from_json(&value.to_string()) {
            Err(BridgeError::Version(version)) => assert_eq!(version, "1.1"),
            other => panic!("expected a version error, got {other:?}"),
        }
    }

    #[test]
    fn test_lenient_scale_and_rejected_records() {
        let mut value = minimal();
        value["ScaleFactor"] = json!("big");
        value["LineNode"]["Tree/Bad"] = json!(42);
        let doc = Document::from_json(&value.to_string()).unwrap();
        assert_eq!(doc.scale_factor(), None);
        assert_eq!(doc.lines.len(), 2);
        assert_eq!(doc.rejected.len(), 1);
        assert_eq!(doc.rejected[0].0, "Tree/Bad");
    }

    #[test]
    fn test_pretty_output_keeps_key_order() {
        let mut doc = Document::new("Host", "1.1", 1.0);
        let mut record = WireNode::new("Line", Some("Line"));
        record.location = Some([10.0, -20.0]);
        record.params.insert("Zeta".into(), json!(1));
        record.params.insert("Alpha".into(), json!(2));
        doc.lines.insert("Tree/Line".into(), record);

        let text = doc.to_json().unwrap();
        assert!(text.contains("\n    \"FileVersion\": \"1.1\""));
        let platform = text.find("Platform").unwrap();
        let lines = text.find("LineNode").unwrap();
        let groups = text.find("ColorGroup").unwrap();
        assert!(platform < lines && lines < groups);
        assert!(text.find("Zeta").unwrap() < text.find("Alpha").unwrap());
        assert!(text.find("NodeName").unwrap() < text.find("BlenderNodeLocation").unwrap());
    }
}
