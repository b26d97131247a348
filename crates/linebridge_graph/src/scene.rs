// SPDX-License-Identifier: MIT OR Apache-2.0
//! In-memory host scene: line node trees, materials, node groups and the
//! object/image names they may reference.

use crate::graph::{unique_name, Graph, LinkError};
use crate::kinds::{create_line_registry, pencil_material_properties, LINE_FUNCTIONS_CONTAINER};
use crate::material::{GroupKind, Material, NodeGroup};
use crate::node::{Node, NodeRegistry};
use crate::scope::{EntityRef, Result, SceneError, Scope};
use crate::value::{EnumItem, PropertyValue};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Snapshot of a host scene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    /// Line node trees by name
    pub trees: IndexMap<String, Graph>,
    /// Materials by name
    pub materials: IndexMap<String, Material>,
    /// Node groups by name
    pub groups: IndexMap<String, NodeGroup>,
    /// Scene object names
    pub objects: Vec<String>,
    /// Image names
    pub images: Vec<String>,
    #[serde(skip, default = "create_line_registry")]
    registry: NodeRegistry,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self {
            trees: IndexMap::new(),
            materials: IndexMap::new(),
            groups: IndexMap::new(),
            objects: Vec::new(),
            images: Vec::new(),
            registry: create_line_registry(),
        }
    }

    /// Registered node kinds
    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// Add an empty line node tree
    pub fn add_tree(&mut self, name: impl Into<String>) -> &mut Graph {
        let name = name.into();
        self.trees.entry(name.clone()).or_insert_with(|| Graph::new(name))
    }

    /// Get a tree by name
    pub fn tree(&self, name: &str) -> Option<&Graph> {
        self.trees.get(name)
    }

    /// Register a scene object name
    pub fn add_object(&mut self, name: impl Into<String>) {
        self.objects.push(name.into());
    }

    /// Register an image name
    pub fn add_image(&mut self, name: impl Into<String>) {
        self.images.push(name.into());
    }

    /// Get a material by name
    pub fn material(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    /// Get a mutable material by name
    pub fn material_mut(&mut self, name: &str) -> Option<&mut Material> {
        self.materials.get_mut(name)
    }

    /// Get a node group by name
    pub fn group(&self, name: &str) -> Option<&NodeGroup> {
        self.groups.get(name)
    }

    /// Look up a node by tree and name
    pub fn node(&self, entity: &EntityRef) -> Option<&Node> {
        match entity {
            EntityRef::Node { tree, name } => {
                let graph = self.trees.get(tree)?;
                graph.find_node(name).and_then(|id| graph.node(id))
            }
            EntityRef::LineFunctions(material) => self.materials.get(material)?.container.as_ref(),
            _ => None,
        }
    }

    /// Serialize to RON format
    pub fn to_ron(&self) -> std::result::Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Deserialize from RON format
    pub fn from_ron(s: &str) -> std::result::Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }

    /// Save scene to file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let ron_str = self.to_ron().map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, ron_str)
    }

    /// Load scene from file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron(&contents).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    fn not_found(entity: &EntityRef) -> SceneError {
        SceneError::EntityNotFound(entity.clone())
    }

    fn properties(&self, entity: &EntityRef) -> Result<&IndexMap<String, PropertyValue>> {
        match entity {
            EntityRef::Node { .. } | EntityRef::LineFunctions(_) => {
                self.node(entity).map(|n| &n.properties)
            }
            EntityRef::Material(name) => self.materials.get(name).map(|m| &m.properties),
            EntityRef::NodeGroup(name) => self.groups.get(name).map(|g| &g.properties),
        }
        .ok_or_else(|| Self::not_found(entity))
    }

    fn properties_mut(&mut self, entity: &EntityRef) -> Result<&mut IndexMap<String, PropertyValue>> {
        let properties = match entity {
            EntityRef::Node { tree, name } => self.trees.get_mut(tree).and_then(|graph| {
                let id = graph.find_node(name)?;
                graph.node_mut(id).map(|n| &mut n.properties)
            }),
            EntityRef::LineFunctions(material) => self
                .materials
                .get_mut(material)
                .and_then(|m| m.container.as_mut())
                .map(|n| &mut n.properties),
            EntityRef::Material(name) => self.materials.get_mut(name).map(|m| &mut m.properties),
            EntityRef::NodeGroup(name) => self.groups.get_mut(name).map(|g| &mut g.properties),
        };
        properties.ok_or_else(|| Self::not_found(entity))
    }

    fn declared_items(&self, entity: &EntityRef, name: &str) -> Vec<EnumItem> {
        match entity {
            EntityRef::Node { .. } | EntityRef::LineFunctions(_) => self
                .node(entity)
                .and_then(|n| self.registry.get(&n.kind))
                .and_then(|kind| kind.property(name))
                .map(|def| def.enum_items.clone())
                .unwrap_or_default(),
            EntityRef::Material(_) => pencil_material_properties(0)
                .into_iter()
                .find(|def| def.name == name)
                .map(|def| def.enum_items)
                .unwrap_or_default(),
            EntityRef::NodeGroup(_) => Vec::new(),
        }
    }

    /// Whether any node, container or material refers to a material
    fn material_in_use(&self, name: &str) -> bool {
        let Some(material) = self.materials.get(name) else {
            return false;
        };
        if material.users > 0 {
            return true;
        }
        let refers = |properties: &IndexMap<String, PropertyValue>| {
            properties.values().any(|value| match value {
                PropertyValue::Material(Some(m)) => m == name,
                PropertyValue::MaterialList(list) => list.iter().any(|m| m == name),
                _ => false,
            })
        };
        let in_trees = self
            .trees
            .values()
            .flat_map(|graph| graph.nodes())
            .any(|node| refers(&node.properties));
        let in_materials = self.materials.values().any(|other| {
            other.name != name
                && (other.line_functions.as_deref() == Some(name)
                    || other.container.as_ref().is_some_and(|c| refers(&c.properties)))
        });
        in_trees || in_materials
    }

    fn group_in_use(&self, name: &str) -> bool {
        self.materials
            .values()
            .flat_map(|m| m.properties.values())
            .any(|value| value.as_group() == Some(name))
    }
}

impl Scope for Scene {
    fn trees(&self) -> Vec<String> {
        self.trees.keys().cloned().collect()
    }

    fn nodes(&self, tree: &str) -> Vec<EntityRef> {
        self.trees
            .get(tree)
            .map(|graph| graph.nodes().map(|n| EntityRef::node(tree, n.name.clone())).collect())
            .unwrap_or_default()
    }

    fn materials(&self) -> Vec<String> {
        self.materials.keys().cloned().collect()
    }

    fn is_pencil_material(&self, material: &str) -> bool {
        self.materials.get(material).is_some_and(|m| m.pencil)
    }

    fn line_functions_of(&self, material: &str) -> Option<EntityRef> {
        let host = self.materials.get(material)?.line_functions.as_ref()?;
        self.materials
            .get(host)
            .filter(|m| m.container.is_some())
            .map(|m| EntityRef::LineFunctions(m.name.clone()))
    }

    fn node_groups(&self, kind: GroupKind) -> Vec<String> {
        self.groups
            .values()
            .filter(|g| g.kind == kind)
            .map(|g| g.name.clone())
            .collect()
    }

    fn ensure_tree(&mut self, tree: &str) {
        self.add_tree(tree);
    }

    fn native_kind(&self, entity: &EntityRef) -> Option<String> {
        self.node(entity).map(|n| n.kind.clone())
    }

    fn location(&self, entity: &EntityRef) -> Option<[f64; 2]> {
        match entity {
            EntityRef::Node { .. } => self.node(entity).map(|n| n.position),
            _ => None,
        }
    }

    fn set_location(&mut self, entity: &EntityRef, location: [f64; 2]) -> Result<()> {
        let EntityRef::Node { tree, name } = entity else {
            return Ok(());
        };
        let node = self
            .trees
            .get_mut(tree)
            .and_then(|graph| graph.find_node(name).and_then(|id| graph.node_mut(id)))
            .ok_or_else(|| Self::not_found(entity))?;
        node.position = location;
        Ok(())
    }

    fn property(&self, entity: &EntityRef, name: &str) -> Result<PropertyValue> {
        self.properties(entity)?
            .get(name)
            .cloned()
            .ok_or_else(|| SceneError::UnknownProperty {
                entity: entity.clone(),
                property: name.to_string(),
            })
    }

    fn set_property(&mut self, entity: &EntityRef, name: &str, value: PropertyValue) -> Result<()> {
        if let PropertyValue::Enum(token) = &value {
            let items = self.declared_items(entity, name);
            if !items.is_empty() && !items.iter().any(|item| &item.identifier == token) {
                return Err(SceneError::UnknownEnumItem {
                    property: name.to_string(),
                    token: token.clone(),
                });
            }
        }
        let slot = self
            .properties_mut(entity)?
            .get_mut(name)
            .ok_or_else(|| SceneError::UnknownProperty {
                entity: entity.clone(),
                property: name.to_string(),
            })?;
        if !slot.same_type(&value) {
            return Err(SceneError::TypeMismatch {
                property: name.to_string(),
                expected: slot.type_name(),
                found: value.type_name(),
            });
        }
        *slot = value;
        Ok(())
    }

    fn enum_items(&self, entity: &EntityRef, name: &str) -> Result<Vec<EnumItem>> {
        match self.property(entity, name)? {
            PropertyValue::Enum(_) => Ok(self.declared_items(entity, name)),
            other => Err(SceneError::TypeMismatch {
                property: name.to_string(),
                expected: "enum",
                found: other.type_name(),
            }),
        }
    }

    fn input_sockets(&self, entity: &EntityRef) -> Vec<String> {
        self.node(entity)
            .map(|n| n.inputs.iter().map(|p| p.identifier.clone()).collect())
            .unwrap_or_default()
    }

    fn linked_nodes(&self, entity: &EntityRef, socket: &str) -> Result<Vec<EntityRef>> {
        let EntityRef::Node { tree, name } = entity else {
            return Ok(Vec::new());
        };
        let graph = self.trees.get(tree).ok_or_else(|| Self::not_found(entity))?;
        let node_id = graph.find_node(name).ok_or_else(|| Self::not_found(entity))?;
        if graph.node(node_id).and_then(|n| n.input_socket(socket)).is_none() {
            return Err(SceneError::SocketNotFound {
                entity: entity.clone(),
                socket: socket.to_string(),
            });
        }
        Ok(graph
            .input_links(node_id, socket)
            .into_iter()
            .filter_map(|id| graph.node(id))
            .map(|n| EntityRef::node(tree.clone(), n.name.clone()))
            .collect())
    }

    fn link(&mut self, parent: &EntityRef, socket: &str, child: &EntityRef) -> Result<()> {
        let (EntityRef::Node { tree, name }, EntityRef::Node { tree: child_tree, name: child_name }) =
            (parent, child)
        else {
            return Err(Self::not_found(child));
        };
        if tree != child_tree {
            return Err(Self::not_found(child));
        }
        let graph = self
            .trees
            .get_mut(tree)
            .ok_or_else(|| SceneError::TreeNotFound(tree.clone()))?;
        let parent_id = graph.find_node(name).ok_or_else(|| Self::not_found(parent))?;
        let child_id = graph.find_node(child_name).ok_or_else(|| Self::not_found(child))?;

        if graph.node(parent_id).and_then(|n| n.input_socket(socket)).is_some_and(|s| !s.list) {
            graph.clear_socket(parent_id, socket);
        }
        graph.connect(child_id, parent_id, socket).map_err(|error| match error {
            LinkError::SocketNotFound(socket) => SceneError::SocketNotFound {
                entity: parent.clone(),
                socket,
            },
            other => SceneError::Link(other),
        })?;
        Ok(())
    }

    fn create_node(&mut self, tree: &str, kind: &str, name: &str) -> Result<EntityRef> {
        let mut node = self
            .registry
            .create_node(kind)
            .ok_or_else(|| SceneError::UnknownKind(kind.to_string()))?;
        node.name = name.to_string();
        let graph = self
            .trees
            .get_mut(tree)
            .ok_or_else(|| SceneError::TreeNotFound(tree.to_string()))?;
        let id = graph.add_node(node);
        let final_name = graph.node(id).map(|n| n.name.clone()).unwrap_or_default();
        tracing::trace!(tree, kind, name = %final_name, "Created node");
        Ok(EntityRef::node(tree, final_name))
    }

    fn create_material(&mut self, name: &str) -> String {
        let final_name = unique_name(name, |candidate| self.materials.contains_key(candidate));
        self.materials
            .insert(final_name.clone(), Material::new(final_name.clone()));
        final_name
    }

    fn init_pencil_material(&mut self, material: &str, zone_count: usize) -> Result<()> {
        let target = self
            .materials
            .get_mut(material)
            .ok_or_else(|| SceneError::EntityNotFound(EntityRef::Material(material.to_string())))?;
        target.pencil = true;
        target.properties = pencil_material_properties(zone_count)
            .into_iter()
            .map(|def| (def.name, def.default))
            .collect();
        Ok(())
    }

    fn create_line_functions(&mut self, material: &str, name: &str) -> Result<EntityRef> {
        if !self.materials.contains_key(material) {
            return Err(SceneError::EntityNotFound(EntityRef::Material(material.to_string())));
        }
        let mut container = self
            .registry
            .create_node(LINE_FUNCTIONS_CONTAINER)
            .ok_or_else(|| SceneError::UnknownKind(LINE_FUNCTIONS_CONTAINER.to_string()))?;
        let host = self.create_material(name);
        container.name = host.clone();
        if let Some(host_material) = self.materials.get_mut(&host) {
            host_material.container = Some(container);
        }
        if let Some(owner) = self.materials.get_mut(material) {
            owner.line_functions = Some(host.clone());
        }
        Ok(EntityRef::LineFunctions(host))
    }

    fn create_node_group(&mut self, name: &str, kind: GroupKind) -> EntityRef {
        let final_name = unique_name(name, |candidate| self.groups.contains_key(candidate));
        self.groups
            .insert(final_name.clone(), NodeGroup::new(final_name.clone(), kind));
        EntityRef::NodeGroup(final_name)
    }

    fn delete_if_unused(&mut self, entity: &EntityRef) -> bool {
        match entity {
            EntityRef::Node { tree, name } => {
                let Some(graph) = self.trees.get_mut(tree) else {
                    return false;
                };
                let Some(id) = graph.find_node(name) else {
                    return false;
                };
                let removed = graph.remove_if_unused(id);
                if !removed.is_empty() {
                    tracing::debug!(tree, removed = ?removed, "Deleted unused nodes");
                }
                !removed.is_empty()
            }
            EntityRef::Material(name) | EntityRef::LineFunctions(name) => {
                if !self.materials.contains_key(name) || self.material_in_use(name) {
                    return false;
                }
                self.materials.shift_remove(name);
                tracing::debug!(material = %name, "Deleted unused material");
                true
            }
            EntityRef::NodeGroup(name) => {
                if !self.groups.contains_key(name) || self.group_in_use(name) {
                    return false;
                }
                self.groups.shift_remove(name);
                tracing::debug!(group = %name, "Deleted unused node group");
                true
            }
        }
    }

    fn has_object(&self, name: &str) -> bool {
        self.objects.iter().any(|o| o == name)
    }

    fn has_material(&self, name: &str) -> bool {
        self.materials.contains_key(name)
    }

    fn has_image(&self, name: &str) -> bool {
        self.images.iter().any(|i| i == name)
    }

    fn has_node_group(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::{BRUSH_DETAIL, BRUSH_SETTINGS, LINE, LINE_SET};

    fn scene_with_tree() -> Scene {
        let mut scene = Scene::new();
        scene.add_tree("Lines");
        scene
    }

    #[test]
    fn test_create_node_renames_duplicates() {
        let mut scene = scene_with_tree();
        let a = scene.create_node("Lines", LINE, "Line").unwrap();
        let b = scene.create_node("Lines", LINE, "Line").unwrap();
        assert_eq!(a.name(), "Line");
        assert_eq!(b.name(), "Line.001");
        assert!(matches!(
            scene.create_node("Missing", LINE, "Line"),
            Err(SceneError::TreeNotFound(_))
        ));
        assert!(matches!(
            scene.create_node("Lines", "NoSuchKind", "X"),
            Err(SceneError::UnknownKind(_))
        ));
    }

    #[test]
    fn test_set_property_checks_types_and_enum_items() {
        let mut scene = scene_with_tree();
        let detail = scene.create_node("Lines", BRUSH_DETAIL, "Detail").unwrap();

        scene
            .set_property(&detail, "brush_type", PropertyValue::Enum("SIMPLE".into()))
            .unwrap();
        assert_eq!(
            scene.property(&detail, "brush_type").unwrap(),
            PropertyValue::Enum("SIMPLE".into())
        );
        assert!(matches!(
            scene.set_property(&detail, "brush_type", PropertyValue::Enum("BOGUS".into())),
            Err(SceneError::UnknownEnumItem { .. })
        ));
        assert!(matches!(
            scene.set_property(&detail, "size", PropertyValue::Bool(true)),
            Err(SceneError::TypeMismatch { .. })
        ));
        assert!(matches!(
            scene.property(&detail, "nope"),
            Err(SceneError::UnknownProperty { .. })
        ));
    }

    #[test]
    fn test_link_replaces_single_socket() {
        let mut scene = scene_with_tree();
        let line_set = scene.create_node("Lines", LINE_SET, "LineSet").unwrap();
        let first = scene.create_node("Lines", BRUSH_SETTINGS, "Brush").unwrap();
        let second = scene.create_node("Lines", BRUSH_SETTINGS, "Brush").unwrap();

        scene.link(&line_set, "v_brush_settings", &first).unwrap();
        scene.link(&line_set, "v_brush_settings", &second).unwrap();
        assert_eq!(
            scene.linked_nodes(&line_set, "v_brush_settings").unwrap(),
            vec![second]
        );
        assert!(matches!(
            scene.linked_nodes(&line_set, "missing_socket"),
            Err(SceneError::SocketNotFound { .. })
        ));
    }

    #[test]
    fn test_delete_if_unused_respects_users() {
        let mut scene = scene_with_tree();
        let line = scene.create_node("Lines", LINE, "Line").unwrap();
        let line_set = scene.create_node("Lines", LINE_SET, "LineSet").unwrap();
        scene.link(&line, "line_sets", &line_set).unwrap();

        assert!(!scene.delete_if_unused(&line_set));
        assert!(scene.delete_if_unused(&line));
        assert!(scene.nodes("Lines").is_empty());

        let material = scene.create_material("Mat");
        scene.init_pencil_material(&material, 3).unwrap();
        let functions = scene.create_line_functions(&material, "Mat Functions").unwrap();
        assert_eq!(scene.line_functions_of(&material), Some(functions.clone()));
        assert!(!scene.delete_if_unused(&functions));

        scene.material_mut(&material).unwrap().users = 1;
        assert!(!scene.delete_if_unused(&EntityRef::Material(material.clone())));
        scene.material_mut(&material).unwrap().users = 0;
        assert!(scene.delete_if_unused(&EntityRef::Material(material)));
        assert!(scene.delete_if_unused(&functions));
    }

    #[test]
    fn test_group_in_use_by_material() {
        let mut scene = Scene::new();
        let group = scene.create_node_group("Positions", GroupKind::Position);
        let material = scene.create_material("Mat");
        scene.init_pencil_material(&material, 2).unwrap();
        scene
            .set_property(
                &EntityRef::Material(material),
                "pcl4mtl_position_group",
                PropertyValue::Group(Some(group.name().to_string())),
            )
            .unwrap();
        assert!(!scene.delete_if_unused(&group));
        assert_eq!(scene.node_groups(GroupKind::Position), vec!["Positions".to_string()]);
    }

    #[test]
    fn test_ron_snapshot_restores_registry() {
        let mut scene = scene_with_tree();
        let line = scene.create_node("Lines", LINE, "Line").unwrap();
        let line_set = scene.create_node("Lines", LINE_SET, "LineSet").unwrap();
        scene.link(&line, "line_sets", &line_set).unwrap();
        scene.add_object("Cube");

        let ron_str = scene.to_ron().unwrap();
        let mut loaded = Scene::from_ron(&ron_str).unwrap();
        assert_eq!(loaded.linked_nodes(&line, "line_sets").unwrap(), vec![line_set]);
        assert!(loaded.has_object("Cube"));
        assert!(loaded.create_node("Lines", BRUSH_SETTINGS, "Brush").is_ok());
    }

    #[test]
    fn test_sample_curve_through_scope() {
        let mut scene = scene_with_tree();
        let reduction = scene
            .create_node("Lines", crate::kinds::REDUCTION_SETTINGS, "Reduction")
            .unwrap();
        let samples = scene.sample_curve(&reduction, "curve", 9).unwrap();
        assert_eq!(samples.len(), 9);
        assert!((samples[4] - 0.5).abs() < 1e-9);
    }
}
