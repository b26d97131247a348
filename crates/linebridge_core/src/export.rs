// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scope to document export.

use crate::codec::{codec_for, AttributeOverride, EncodeContext};
use crate::compat;
use crate::config::BridgeConfig;
use crate::document::{Document, WireNode};
use crate::schema::{
    AttrType, Schema, SchemaRegistry, Section, ADVANCED_MATERIAL, COLOR_GROUP, LINE_FUNCTIONS,
    PENCIL_MATERIAL, POSITION_GROUP, TEXTURE_MAP,
};
use linebridge_graph::{EntityRef, GroupKind, Scope};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Export every line node, pencil material and node group of a scope
pub fn export(scope: &dyn Scope, config: &BridgeConfig, overrides: Option<AttributeOverride<'_>>) -> Document {
    let exporter = Exporter {
        ctx: EncodeContext { scope, overrides },
        registry: SchemaRegistry::global(),
    };
    let mut document = Document::new(
        config.platform.clone(),
        config.file_version.to_string(),
        config.scale_factor,
    );
    exporter.lines(&mut document);
    exporter.materials(&mut document);
    exporter.groups(&mut document);

    tracing::info!(
        lines = document.lines.len(),
        materials = document.materials.len(),
        position_groups = document.position_groups.len(),
        color_groups = document.color_groups.len(),
        "Exported document"
    );
    document
}

struct Exporter<'a> {
    ctx: EncodeContext<'a>,
    registry: &'static SchemaRegistry,
}

impl Exporter<'_> {
    fn encode(&self, entity: &EntityRef, attribute_ty: AttrType, native: &str) -> Value {
        let value = (codec_for(attribute_ty).encode)(&self.ctx, entity, native);
        if value.is_null()
            && !attribute_ty.is_passive()
            && !attribute_ty.is_reference()
            && self.ctx.read(entity, native).is_none()
        {
            tracing::debug!(%entity, attribute = native, "Attribute unavailable, writing null");
        }
        value
    }

    fn params(&self, entity: &EntityRef, schema: &Schema) -> Map<String, Value> {
        self.registry
            .attributes_of(schema)
            .iter()
            .map(|attribute| {
                let native = attribute.native.unwrap_or_default();
                (attribute.wire.to_string(), self.encode(entity, attribute.ty, native))
            })
            .collect()
    }

    fn schema(&self, wire_type: &str) -> Option<&'static Schema> {
        self.registry.lookup_by_wire_type(wire_type)
    }

    fn lines(&self, document: &mut Document) {
        let scope = self.ctx.scope;
        for tree in scope.trees() {
            for entity in scope.nodes(&tree) {
                let Some(schema) = scope
                    .native_kind(&entity)
                    .and_then(|kind| self.registry.lookup_by_native_kind(&kind))
                    .filter(|schema| schema.section == Section::LineNode)
                else {
                    tracing::debug!(%entity, "No schema for node, skipping");
                    continue;
                };

                let mut record = WireNode::new(entity.name(), Some(schema.wire_type));
                record.location = scope.location(&entity);
                record.params = self.params(&entity, schema);
                if schema.wire_type == TEXTURE_MAP {
                    compat::add_texture_uv(&mut record.params);
                }
                document.lines.insert(entity.qualified_name(), record);
            }
        }
    }

    fn materials(&self, document: &mut Document) {
        let scope = self.ctx.scope;
        let (Some(pencil), Some(advanced), Some(functions)) = (
            self.schema(PENCIL_MATERIAL),
            self.schema(ADVANCED_MATERIAL),
            self.schema(LINE_FUNCTIONS),
        ) else {
            return;
        };
        let mut taken: HashSet<String> = scope.materials().into_iter().collect();

        for name in scope.materials() {
            if !scope.is_pencil_material(&name) {
                continue;
            }
            let entity = EntityRef::Material(name.clone());
            let mut advanced_name = format!("{name}_Advanced");
            while taken.contains(&advanced_name) || document.materials.contains_key(&advanced_name) {
                advanced_name.push('_');
            }
            taken.insert(advanced_name.clone());
            let line_functions = scope.line_functions_of(&name);

            let mut record = WireNode::new(name.clone(), Some(PENCIL_MATERIAL));
            for attribute in self.registry.attributes_of(pencil) {
                let value = match (attribute.ty, &line_functions) {
                    (AttrType::AdvancedMaterial, _) => Value::from(advanced_name.clone()),
                    (AttrType::LineFunctions, Some(container)) => Value::from(container.name()),
                    (AttrType::LineFunctions, None) => continue,
                    (ty, _) => self.encode(&entity, ty, attribute.native.unwrap_or_default()),
                };
                record.params.insert(attribute.wire.to_string(), value);
            }
            document.materials.insert(name.clone(), record);

            let mut side = WireNode::new(advanced_name.clone(), Some(ADVANCED_MATERIAL));
            side.params = self.params(&entity, advanced);
            document.materials.insert(advanced_name, side);
        }

        for name in scope.materials() {
            let Some(container) = scope.line_functions_of(&name) else {
                continue;
            };
            let container_name = container.name().to_string();
            if !document.materials.contains_key(&name) {
                let mut stub = WireNode::new(name.clone(), Some(PENCIL_MATERIAL));
                stub.params
                    .insert("LineFunctions".to_string(), Value::from(container_name.clone()));
                document.materials.insert(name.clone(), stub);
            }
            if document.materials.contains_key(&container_name) {
                continue;
            }
            let mut record = WireNode::new(container_name.clone(), Some(LINE_FUNCTIONS));
            record.params = self.params(&container, functions);
            document.materials.insert(container_name, record);
        }
    }

    fn groups(&self, document: &mut Document) {
        let scope = self.ctx.scope;
        for (kind, wire_type) in [(GroupKind::Position, POSITION_GROUP), (GroupKind::Color, COLOR_GROUP)] {
            let Some(schema) = self.schema(wire_type) else {
                continue;
            };
            for name in scope.node_groups(kind) {
                let entity = EntityRef::NodeGroup(name.clone());
                let mut record = WireNode::new(name.clone(), None);
                record.params = self.params(&entity, schema);
                let section = match kind {
                    GroupKind::Position => &mut document.position_groups,
                    GroupKind::Color => &mut document.color_groups,
                };
                section.insert(name, record);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{sample_scene, TREE};
    use linebridge_graph::{PropertyValue, Scene};
    use serde_json::json;

    fn export_scene(scene: &Scene) -> Document {
        export(scene, &BridgeConfig::default(), None)
    }

    #[test]
    fn test_line_records_and_references() {
        let document = export_scene(&sample_scene());
        let keys: Vec<&str> = document.lines.keys().map(String::as_str).collect();
        assert_eq!(keys[0], format!("{TREE}/Line"));

        let line = &document.lines[&format!("{TREE}/Line")];
        assert_eq!(line.node_type.as_deref(), Some("Line"));
        assert_eq!(line.params["LineSets"], json!([format!("{TREE}/Set")]));
        assert!(line.location.is_some());

        let line_set = &document.lines[&format!("{TREE}/Set")];
        assert_eq!(line_set.params["VBrushSettings"], json!(format!("{TREE}/Brush")));
        assert_eq!(line_set.params["HBrushSettings"], Value::Null);
        assert_eq!(line_set.params["Objects"], json!(["Cube"]));
        assert_eq!(line_set.params["UserDef"], Value::Null);

        // Params follow schema order
        let order: Vec<&str> = line_set.params.keys().take(3).map(String::as_str).collect();
        assert_eq!(order, ["On", "Id", "WeldsEdges"]);
    }

    #[test]
    fn test_texture_map_gets_legacy_uv() {
        let document = export_scene(&sample_scene());
        let texture = &document.lines[&format!("{TREE}/Tex")];
        assert_eq!(texture.params["ExtendedTextureUV"], json!(1));
        assert_eq!(texture.params["TextureUV"], json!(3));
        assert_eq!(texture.params["HoldingTexture"], json!("paper.png"));
    }

    #[test]
    fn test_material_records() {
        let document = export_scene(&sample_scene());
        let keys: Vec<&str> = document.materials.keys().map(String::as_str).collect();
        assert_eq!(keys, ["Skin", "Skin_Advanced_", "Skin Functions", "Plain", "Plain Functions"]);

        let skin = &document.materials["Skin"];
        assert_eq!(skin.params["AdvancedMaterial"], json!("Skin_Advanced_"));
        assert_eq!(skin.params["LineFunctions"], json!("Skin Functions"));
        assert_eq!(skin.params["PositionGroup"], json!("Positions"));
        assert_eq!(skin.params["Gradation"]["MaxGradation"].as_array().map(Vec::len), Some(3));
        assert_eq!(skin.params["HighlightColor"][3], json!(1.0));

        let advanced = &document.materials["Skin_Advanced_"];
        assert_eq!(advanced.node_type.as_deref(), Some("AdvancedMaterial"));
        assert_eq!(advanced.params["LightcolZoneIDs"].as_array().map(Vec::len), Some(8));

        let functions = &document.materials["Skin Functions"];
        assert_eq!(functions.node_type.as_deref(), Some("LineRelatedFunctions"));
        assert_eq!(functions.params["ReplaceOutlineOn"], json!(true));

        // Line functions on a plain material yield a stub record
        let plain = &document.materials["Plain"];
        assert_eq!(plain.params.len(), 1);
        assert_eq!(plain.params["LineFunctions"], json!("Plain Functions"));
    }

    #[test]
    fn test_material_without_line_functions_omits_key() {
        let mut scene = Scene::new();
        let name = scene.create_material("Bare");
        scene.init_pencil_material(&name, 2).unwrap();
        let document = export_scene(&scene);
        let bare = &document.materials["Bare"];
        assert!(!bare.params.contains_key("LineFunctions"));
        assert_eq!(bare.params["AdvancedMaterial"], json!("Bare_Advanced"));
    }

    #[test]
    fn test_groups_have_no_type() {
        let document = export_scene(&sample_scene());
        let group = &document.position_groups["Positions"];
        assert!(group.node_type.is_none());
        assert_eq!(group.params["Positions"], json!([0.25, 0.75]));
        assert!(document.color_groups.is_empty());
    }

    #[test]
    fn test_override_replaces_stored_values() {
        let scene = sample_scene();
        let lookup = |entity: &EntityRef, name: &str| {
            (entity.name() == "Brush" && name == "size").then_some(PropertyValue::Float(42.0))
        };
        let document = export(&scene, &BridgeConfig::default(), Some(&lookup));
        assert_eq!(document.lines[&format!("{TREE}/Brush")].params["Size"], json!(42.0));
    }

    #[test]
    fn test_header_follows_config() {
        let config = BridgeConfig {
            platform: "Host 1".to_string(),
            scale_factor: 0.01,
            ..BridgeConfig::default()
        };
        let document = export(&Scene::new(), &config, None);
        assert_eq!(document.platform, "Host 1");
        assert_eq!(document.file_version, "1.1");
        assert_eq!(document.scale_factor(), Some(0.01));
        assert!(document.lines.is_empty());
    }
}
