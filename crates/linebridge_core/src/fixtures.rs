// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shared scene for engine tests.

use linebridge_graph::kinds::{BRUSH_DETAIL, BRUSH_SETTINGS, LINE, LINE_SET, REDUCTION_SETTINGS, TEXTURE_MAP};
use linebridge_graph::{EntityRef, GroupKind, PropertyValue, Scene, Scope};

/// Tree holding the sample line graph
pub const TREE: &str = "LineTree";

/// A line with one line set, a brush with detail and texture, a size
/// reduction, two materials with line functions and a position group
pub fn sample_scene() -> Scene {
    let mut scene = Scene::new();
    scene.add_tree(TREE);
    scene.add_object("Cube");
    scene.add_image("paper.png");

    let mut node = |kind: &str, name: &str, location: [f64; 2]| {
        let entity = scene.create_node(TREE, kind, name).unwrap();
        scene.set_location(&entity, location).unwrap();
        entity
    };
    let line = node(LINE, "Line", [0.0, 0.0]);
    let line_set = node(LINE_SET, "Set", [-300.0, 0.0]);
    let brush = node(BRUSH_SETTINGS, "Brush", [-600.0, 0.0]);
    let detail = node(BRUSH_DETAIL, "Detail", [-860.0, 0.0]);
    let texture = node(TEXTURE_MAP, "Tex", [-860.0, -60.0]);
    let reduction = node(REDUCTION_SETTINGS, "Reduction", [-600.0, -200.0]);

    scene.link(&line, "line_sets", &line_set).unwrap();
    scene.link(&line_set, "v_brush_settings", &brush).unwrap();
    scene.link(&line_set, "v_size_reduction_settings", &reduction).unwrap();
    scene.link(&brush, "brush_detail_node", &detail).unwrap();
    scene.link(&brush, "color_map", &texture).unwrap();

    let set = |scene: &mut Scene, entity: &EntityRef, name: &str, value: PropertyValue| {
        scene.set_property(entity, name, value).unwrap();
    };
    set(&mut scene, &line_set, "objects", PropertyValue::ObjectList(vec!["Cube".into()]));
    set(&mut scene, &line_set, "v_size_reduction_on", PropertyValue::Bool(true));
    set(&mut scene, &brush, "brush_color", PropertyValue::Color([0.5, 0.25, 0.0]));
    set(&mut scene, &detail, "brush_type", PropertyValue::Enum("SIMPLE".into()));
    set(&mut scene, &detail, "stretch_random", PropertyValue::Float(40.0));
    set(&mut scene, &detail, "angle", PropertyValue::Float(0.5));
    set(&mut scene, &reduction, "reduction_end", PropertyValue::Float(4.0));
    set(&mut scene, &texture, "image", PropertyValue::Image(Some("paper.png".into())));
    set(&mut scene, &texture, "uv_source", PropertyValue::Enum("OBJECTUV".into()));
    set(&mut scene, &texture, "uv_index", PropertyValue::Int(2));

    let skin = scene.create_material("Skin");
    scene.init_pencil_material(&skin, 3).unwrap();
    scene.create_material("Skin_Advanced");
    let positions = scene.create_node_group("Positions", GroupKind::Position);
    set(&mut scene, &positions, "pcl4_position_group_values", PropertyValue::FloatList(vec![0.25, 0.75]));
    let skin_entity = EntityRef::Material(skin.clone());
    set(&mut scene, &skin_entity, "pcl4mtl_position_group", PropertyValue::Group(Some("Positions".into())));
    set(&mut scene, &skin_entity, "pcl4mtl_highlight_amount", PropertyValue::Float(0.5));
    let functions = scene.create_line_functions(&skin, "Skin Functions").unwrap();
    set(&mut scene, &functions, "outline_on", PropertyValue::Bool(true));

    let plain = scene.create_material("Plain");
    scene.create_line_functions(&plain, "Plain Functions").unwrap();
    scene
}
