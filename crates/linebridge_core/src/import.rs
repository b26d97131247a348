// SPDX-License-Identifier: MIT OR Apache-2.0
//! Document to scope import.
//!
//! Validation failures abort the import. Everything after that is
//! best-effort: entities that cannot be created and attributes that cannot
//! be decoded are recorded in the [`ImportReport`] and skipped.

use crate::codec::{codec_for, DecodeContext};
use crate::collect::{collect_line_family, collect_material_family, select};
use crate::compat;
use crate::config::{BridgeConfig, ImportSettings};
use crate::document::{Document, WireNode};
use crate::error::{BridgeError, CodecError, CreationError, Result};
use crate::gradation;
use crate::schema::{
    Attribute, Schema, SchemaRegistry, Section, ADVANCED_MATERIAL, COLOR_GROUP, LINE_FUNCTIONS, PENCIL_MATERIAL,
    POSITION_GROUP, TEXTURE_MAP,
};
use crate::version::is_version_supported;
use indexmap::{IndexMap, IndexSet};
use linebridge_graph::kinds::{self, DEFAULT_ZONE_COUNT};
use linebridge_graph::{EntityRef, GroupKind, PropertyValue, Scope};
use std::collections::HashSet;

/// Vertical distance between stacked line nodes
const LINE_SPACING: f64 = 200.0;

/// An attribute that could not be applied
#[derive(Debug)]
pub struct SkippedAttribute {
    /// Wire id of the record
    pub id: String,
    /// Wire name of the attribute
    pub attribute: String,
    /// Why it was skipped
    pub error: CodecError,
}

/// Outcome of one import
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Records that produced no entity, by wire id
    pub skipped_nodes: Vec<(String, CreationError)>,
    /// Attributes left at their defaults
    pub skipped_attributes: Vec<SkippedAttribute>,
    /// Entities created, in creation order
    pub created: Vec<EntityRef>,
}

impl ImportReport {
    /// Whether everything was imported
    pub fn is_clean(&self) -> bool {
        self.skipped_nodes.is_empty() && self.skipped_attributes.is_empty()
    }
}

/// Import a parsed document into `tree` of a scope
pub fn import(
    document: &Document,
    scope: &mut dyn Scope,
    tree: &str,
    settings: &ImportSettings,
    config: &BridgeConfig,
) -> Result<ImportReport> {
    if !is_version_supported(&document.file_version, config.supported_min, config.unsupported_min) {
        return Err(BridgeError::Version(document.file_version.clone()));
    }
    let scale_factor = settings
        .scale_factor
        .or_else(|| document.scale_factor())
        .unwrap_or(1.0);

    let mut importer = Importer {
        document,
        scope,
        settings,
        registry: SchemaRegistry::global(),
        scale_factor,
        node_ids: IndexMap::new(),
        group_ids: IndexMap::new(),
        pending_functions: Vec::new(),
        sweep: IndexSet::new(),
        report: ImportReport::default(),
    };
    for (id, reason) in &document.rejected {
        importer
            .report
            .skipped_nodes
            .push((id.clone(), CreationError::Malformed(reason.clone())));
    }

    let material_roots: Vec<String> = match &settings.material_ids {
        Some(ids) => ids.clone(),
        None => document.material_entries().into_iter().map(|(id, _)| id).collect(),
    };
    let line_roots: Vec<String> = match &settings.line_ids {
        Some(ids) => ids.clone(),
        None => document.line_entries().into_iter().map(|(id, _)| id).collect(),
    };

    importer.groups_and_materials(&material_roots);
    importer.lines(tree, &line_roots);
    importer.line_functions();
    importer.sweep();

    let report = importer.report;
    tracing::info!(
        created = report.created.len(),
        skipped_nodes = report.skipped_nodes.len(),
        skipped_attributes = report.skipped_attributes.len(),
        scale_factor,
        "Imported document"
    );
    Ok(report)
}

struct Importer<'a> {
    document: &'a Document,
    scope: &'a mut dyn Scope,
    settings: &'a ImportSettings,
    registry: &'static SchemaRegistry,
    scale_factor: f64,
    node_ids: IndexMap<String, EntityRef>,
    group_ids: IndexMap<String, String>,
    /// Line functions records with the material receiving them, decoded
    /// once every material and line exists
    pending_functions: Vec<(&'a WireNode, String)>,
    /// Entities an overwrite may have left unused
    sweep: IndexSet<EntityRef>,
    report: ImportReport,
}

impl<'a> Importer<'a> {
    fn skip_node(&mut self, id: &str, error: CreationError) {
        tracing::warn!(id, %error, "Skipped record");
        self.report.skipped_nodes.push((id.to_string(), error));
    }

    /// Decode the attributes of `record` selected by `filter` into `entity`
    fn apply(
        &mut self,
        id: &str,
        record: &WireNode,
        schema: &Schema,
        entity: &EntityRef,
        filter: impl Fn(&Attribute) -> bool,
    ) {
        for attribute in self.registry.attributes_of(schema) {
            if attribute.ty.is_passive() || !filter(attribute) {
                continue;
            }
            let result = match (record.params.get(attribute.wire), attribute.native) {
                (None, _) => Err(CodecError::MissingParam(attribute.wire.to_string())),
                (Some(_), None) => Ok(()),
                (Some(value), Some(native)) => {
                    let mut ctx = DecodeContext {
                        scope: &mut *self.scope,
                        node_ids: &self.node_ids,
                        group_ids: &self.group_ids,
                        scale_factor: self.scale_factor,
                    };
                    (codec_for(attribute.ty).decode)(&mut ctx, entity, native, value)
                }
            };
            if let Err(error) = result {
                tracing::warn!(id, attribute = attribute.wire, %error, "Skipped attribute");
                self.report.skipped_attributes.push(SkippedAttribute {
                    id: id.to_string(),
                    attribute: attribute.wire.to_string(),
                    error,
                });
            }
        }
    }

    fn apply_all(&mut self, id: &str, record: &WireNode, schema: &Schema, entity: &EntityRef) {
        self.apply(id, record, schema, entity, |_| true);
    }

    // ========================================================================
    // Groups and materials
    // ========================================================================

    fn groups_and_materials(&mut self, roots: &[String]) {
        let document = self.document;
        let family = collect_material_family(document, roots);
        let import_all = self.settings.material_ids.is_none();

        for (kind, wire_type, records, wanted) in [
            (GroupKind::Position, POSITION_GROUP, &document.position_groups, &family.position_groups),
            (GroupKind::Color, COLOR_GROUP, &document.color_groups, &family.color_groups),
        ] {
            let Some(schema) = self.registry.lookup_by_wire_type(wire_type) else {
                continue;
            };
            for (id, record) in records {
                if !import_all && !wanted.contains(id) {
                    continue;
                }
                let entity = self.scope.create_node_group(&record.name, kind);
                tracing::debug!(id = %id, %entity, "Created node group");
                self.group_ids.insert(id.clone(), entity.name().to_string());
                self.apply_all(id, record, schema, &entity);
                self.report.created.push(entity);
            }
        }

        for id in roots {
            let Some(record) = document.materials.get(id) else {
                tracing::debug!(id = %id, "Requested material is not in the document");
                continue;
            };
            if record.node_type.as_deref() != Some(PENCIL_MATERIAL) {
                continue;
            }
            if let Err(error) = self.material(id, record) {
                self.skip_node(id, error);
            }
        }
    }

    fn sweep(&mut self) {
        for entity in std::mem::take(&mut self.sweep) {
            if self.scope.delete_if_unused(&entity) {
                tracing::debug!(%entity, "Removed entity left unused by overwrite");
            }
        }
    }

    fn material(&mut self, id: &str, record: &'a WireNode) -> std::result::Result<(), CreationError> {
        let is_stub = record.params.len() == 1 && record.params.contains_key("LineFunctions");
        let name = record.name.as_str();

        let target = if is_stub {
            if self.scope.has_material(name) {
                name.to_string()
            } else {
                self.scope.create_material(name)
            }
        } else {
            let zone_count = record
                .params
                .get("Gradation")
                .and_then(gradation::zone_count)
                .unwrap_or(DEFAULT_ZONE_COUNT);
            let target = self.replace_material(name);
            self.scope.init_pencil_material(&target, zone_count)?;

            let entity = EntityRef::Material(target.clone());
            if let Some(schema) = self.registry.lookup_by_wire_type(PENCIL_MATERIAL) {
                self.apply_all(id, record, schema, &entity);
            }
            self.advanced_material(record, &entity);
            self.report.created.push(entity);
            target
        };
        tracing::debug!(id, material = %target, stub = is_stub, "Imported material");

        self.pending_functions.push((record, target));
        Ok(())
    }

    /// Name of the material to initialize for `name`: the existing one when
    /// overwriting and it cannot be deleted, a new one otherwise
    fn replace_material(&mut self, name: &str) -> String {
        if !self.settings.overwrite || !self.scope.has_material(name) {
            return self.scope.create_material(name);
        }
        let existing = EntityRef::Material(name.to_string());
        if let Some(functions) = self.scope.line_functions_of(name) {
            self.sweep.insert(functions);
        }
        for kind in [GroupKind::Position, GroupKind::Color] {
            if let Ok(PropertyValue::Group(Some(group))) = self.scope.property(&existing, kind.material_property()) {
                self.sweep.insert(EntityRef::NodeGroup(group));
            }
        }
        if self.scope.delete_if_unused(&existing) {
            self.scope.create_material(name)
        } else {
            tracing::debug!(material = name, "Material still in use, reinitializing in place");
            name.to_string()
        }
    }

    fn advanced_material(&mut self, record: &WireNode, entity: &EntityRef) {
        let document = self.document;
        let Some((advanced_id, advanced)) = record
            .param_str("AdvancedMaterial")
            .and_then(|id| document.materials.get_key_value(id))
            .filter(|(_, r)| r.node_type.as_deref() == Some(ADVANCED_MATERIAL))
        else {
            return;
        };
        if let Some(schema) = self.registry.lookup_by_wire_type(ADVANCED_MATERIAL) {
            self.apply_all(advanced_id, advanced, schema, entity);
        }
    }

    fn line_functions(&mut self) {
        for (record, material) in std::mem::take(&mut self.pending_functions) {
            self.attach_line_functions(record, &material);
        }
    }

    fn attach_line_functions(&mut self, record: &WireNode, material: &str) {
        let document = self.document;
        let Some((functions_id, functions)) = record
            .param_str("LineFunctions")
            .and_then(|id| document.materials.get_key_value(id))
            .filter(|(_, r)| r.node_type.as_deref() == Some(LINE_FUNCTIONS))
        else {
            return;
        };
        let Some(schema) = self.registry.lookup_by_wire_type(LINE_FUNCTIONS) else {
            return;
        };
        match self.scope.create_line_functions(material, &functions.name) {
            Ok(entity) => {
                self.apply_all(functions_id, functions, schema, &entity);
                self.report.created.push(entity);
            }
            Err(error) => self.skip_node(functions_id, error.into()),
        }
    }

    // ========================================================================
    // Line nodes
    // ========================================================================

    fn lines(&mut self, tree: &str, roots: &[String]) {
        let document = self.document;
        let family = collect_line_family(&document.lines, roots, self.settings);
        let records = select(&document.lines, &family);
        if records.is_empty() {
            return;
        }
        self.scope.ensure_tree(tree);

        if self.settings.overwrite {
            self.remove_existing_lines(tree, roots);
        }

        // Pass 1: entities
        let mut created = Vec::new();
        let mut unpositioned = HashSet::new();
        for (id, record) in &records {
            let Some((schema, entity)) = self.create_line_node(tree, id, record) else {
                continue;
            };
            match record.location {
                Some(location) => {
                    if let Err(error) = self.scope.set_location(&entity, location) {
                        tracing::debug!(%entity, %error, "Could not place node");
                    }
                }
                None => {
                    unpositioned.insert(entity.clone());
                }
            }
            self.node_ids.insert(id.clone(), entity.clone());
            self.report.created.push(entity.clone());
            created.push((id, record, schema, entity));
        }

        // Pass 2: values, then links
        for (id, record, schema, entity) in &created {
            self.apply(id, record, schema, entity, |a| !a.ty.is_reference());
            if schema.wire_type == TEXTURE_MAP {
                match compat::apply_texture_uv(&mut *self.scope, entity, &record.params) {
                    Ok(true) => tracing::debug!(%entity, "Applied legacy TextureUV"),
                    Ok(false) => {}
                    Err(error) => self.report.skipped_attributes.push(SkippedAttribute {
                        id: id.to_string(),
                        attribute: compat::TEXTURE_UV.to_string(),
                        error: error.into(),
                    }),
                }
            }
        }
        for (id, record, schema, entity) in &created {
            self.apply(id, record, schema, entity, |a| a.ty.is_reference());
        }

        if !unpositioned.is_empty() {
            let new_nodes: HashSet<EntityRef> = created.into_iter().map(|(_, _, _, e)| e).collect();
            self.layout(tree, &new_nodes, &mut unpositioned);
        }
    }

    fn create_line_node(&mut self, tree: &str, id: &str, record: &WireNode) -> Option<(&'static Schema, EntityRef)> {
        let Some(node_type) = record.node_type.as_deref() else {
            self.skip_node(id, CreationError::MissingType);
            return None;
        };
        let Some((schema, kind)) = self
            .registry
            .lookup_by_wire_type(node_type)
            .filter(|schema| schema.section == Section::LineNode)
            .and_then(|schema| schema.native_kind.map(|kind| (schema, kind)))
        else {
            self.skip_node(id, CreationError::UnknownType(node_type.to_string()));
            return None;
        };
        match self.scope.create_node(tree, kind, &record.name) {
            Ok(entity) => {
                tracing::debug!(id, %entity, "Created node");
                Some((schema, entity))
            }
            Err(error) => {
                self.skip_node(id, error.into());
                None
            }
        }
    }

    fn remove_existing_lines(&mut self, tree: &str, roots: &[String]) {
        let mut existing: HashSet<String> = self
            .scope
            .nodes(tree)
            .into_iter()
            .filter(|entity| self.scope.native_kind(entity).as_deref() == Some(kinds::LINE))
            .map(|entity| entity.name().to_string())
            .collect();
        let document = self.document;
        let names: Vec<&str> = roots
            .iter()
            .filter_map(|id| document.lines.get(id))
            .map(|record| record.name.as_str())
            .collect();
        for name in names {
            if existing.remove(name) {
                let removed = self.scope.delete_if_unused(&EntityRef::node(tree, name));
                tracing::debug!(tree, line = name, removed, "Overwrite");
            }
        }
    }

    // ========================================================================
    // Layout
    // ========================================================================

    /// Stack new lines below existing ones and spread their children
    fn layout(&mut self, tree: &str, new_nodes: &HashSet<EntityRef>, unpositioned: &mut HashSet<EntityRef>) {
        let lines: Vec<EntityRef> = self
            .scope
            .nodes(tree)
            .into_iter()
            .filter(|entity| self.scope.native_kind(entity).as_deref() == Some(kinds::LINE))
            .collect();

        let mut location = [0.0, 0.0];
        if let Some((i, anchor)) = lines.iter().enumerate().find(|(_, line)| !new_nodes.contains(*line)) {
            let [x, y] = self.scope.location(anchor).unwrap_or_default();
            location = [x, y + i as f64 * LINE_SPACING];
        }
        for line in &lines {
            if new_nodes.contains(line) {
                if let Err(error) = self.scope.set_location(line, location) {
                    tracing::debug!(entity = %line, %error, "Could not place node");
                }
                unpositioned.remove(line);
                self.layout_children(line, unpositioned);
            }
            let [x, y] = self.scope.location(line).unwrap_or(location);
            location = [x, y - LINE_SPACING];
        }
    }

    fn layout_children(&mut self, parent: &EntityRef, unpositioned: &mut HashSet<EntityRef>) {
        let Some(step) = self
            .scope
            .native_kind(parent)
            .and_then(|kind| self.registry.lookup_by_native_kind(&kind))
            .map(|schema| schema.layout_step)
        else {
            return;
        };
        let [px, py] = self.scope.location(parent).unwrap_or_default();

        let mut index = 0usize;
        for socket in self.scope.input_sockets(parent) {
            let children = self.scope.linked_nodes(parent, &socket).unwrap_or_default();
            if children.is_empty() {
                index += 1;
                continue;
            }
            for child in children {
                if unpositioned.remove(&child) {
                    let location = [px + step[0], py + index as f64 * step[1]];
                    if self.scope.set_location(&child, location).is_ok() {
                        self.layout_children(&child, unpositioned);
                    }
                }
                index += 1;
            }
        }
    }
}
