// SPDX-License-Identifier: MIT OR Apache-2.0
//! Native node kinds of the line renderer and the pencil material layout.

use crate::curve::linear_points;
use crate::material::{GradationZone, ZONES_PROPERTY};
use crate::node::{NodeCategory, NodeKind, NodeRegistry, PropertyDef};
use crate::socket::{Socket, SocketType};
use crate::value::PropertyValue;

/// Line node kind
pub const LINE: &str = "Pencil4LineNodeType";
/// Line set node kind
pub const LINE_SET: &str = "Pencil4LineSetNodeType";
/// Brush settings node kind
pub const BRUSH_SETTINGS: &str = "Pencil4BrushSettingsNodeType";
/// Brush detail node kind
pub const BRUSH_DETAIL: &str = "Pencil4BrushDetailNodeType";
/// Reduction settings node kind
pub const REDUCTION_SETTINGS: &str = "Pencil4ReductionSettingsNodeType";
/// Texture map node kind
pub const TEXTURE_MAP: &str = "Pencil4TextureMapNodeType";
/// Line functions container node kind
pub const LINE_FUNCTIONS_CONTAINER: &str = "Pencil4LineFunctionsContainerNodeType";

/// Line-set features that may carry their own brush
pub const SPECIFIC_FEATURES: [&str; 8] = [
    "outline",
    "object",
    "intersection",
    "smooth",
    "material",
    "selected",
    "normal_angle",
    "wireframe",
];

/// Zone count of a freshly created pencil material
pub const DEFAULT_ZONE_COUNT: usize = 2;

/// Length of the light color zone list
pub const LIGHT_COLOR_ZONE_SLOTS: usize = 8;

fn float(name: &str, value: f64) -> PropertyDef {
    PropertyDef::new(name, PropertyValue::Float(value))
}

fn int(name: &str, value: i64) -> PropertyDef {
    PropertyDef::new(name, PropertyValue::Int(value))
}

fn flag(name: &str, value: bool) -> PropertyDef {
    PropertyDef::new(name, PropertyValue::Bool(value))
}

fn color(name: &str, value: [f64; 3]) -> PropertyDef {
    PropertyDef::new(name, PropertyValue::Color(value))
}

fn curve(name: &str) -> PropertyDef {
    PropertyDef::new(name, PropertyValue::Curve(linear_points()))
}

/// Create the registry holding every line node kind
pub fn create_line_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();

    // ========================================================================
    // Line
    // ========================================================================

    registry.register(NodeKind {
        id: LINE.to_string(),
        name: "Line".to_string(),
        category: NodeCategory::Line,
        inputs: vec![Socket::list("line_sets", SocketType::LineSet)],
        output: None,
        properties: vec![
            flag("is_active", true),
            int("render_priority", 0),
            PropertyDef::enumeration("line_size_type", &["ABSOLUTE", "RELATIVE"], 0),
            flag("is_output_to_render_elements_only", false),
            int("over_sampling", 1),
            float("antialiasing", 1.0),
            float("off_screen_distance", 0.0),
            int("random_seed", 0),
        ],
    });

    registry.register(line_set_kind());

    // ========================================================================
    // Brushes
    // ========================================================================

    registry.register(NodeKind {
        id: BRUSH_SETTINGS.to_string(),
        name: "Brush Settings".to_string(),
        category: NodeCategory::Settings,
        inputs: vec![
            Socket::single("brush_detail_node", SocketType::BrushDetail),
            Socket::single("color_map", SocketType::TextureMap),
            Socket::single("size_map", SocketType::TextureMap),
        ],
        output: Some(SocketType::BrushSettings),
        properties: vec![
            float("blend_amount", 1.0),
            color("brush_color", [0.0, 0.0, 0.0]),
            flag("color_map_on", false),
            float("color_map_opacity", 1.0),
            float("size", 1.0),
            flag("size_map_on", false),
            float("size_map_amount", 1.0),
        ],
    });

    registry.register(NodeKind {
        id: BRUSH_DETAIL.to_string(),
        name: "Brush Detail".to_string(),
        category: NodeCategory::Settings,
        inputs: vec![
            Socket::single("brush_map", SocketType::TextureMap),
            Socket::single("distortion_map", SocketType::TextureMap),
        ],
        output: Some(SocketType::BrushDetail),
        properties: brush_detail_properties(),
    });

    registry.register(NodeKind {
        id: REDUCTION_SETTINGS.to_string(),
        name: "Reduction Settings".to_string(),
        category: NodeCategory::Settings,
        inputs: vec![],
        output: Some(SocketType::Reduction),
        properties: vec![
            float("reduction_start", 0.0),
            float("reduction_end", 10.0),
            flag("refer_object_on", false),
            PropertyDef::new("object_reference", PropertyValue::Object(None)),
            curve("curve"),
        ],
    });

    // ========================================================================
    // Textures
    // ========================================================================

    registry.register(NodeKind {
        id: TEXTURE_MAP.to_string(),
        name: "Texture Map".to_string(),
        category: NodeCategory::Texture,
        inputs: vec![],
        output: Some(SocketType::TextureMap),
        properties: vec![
            PropertyDef::new("image", PropertyValue::Image(None)),
            PropertyDef::enumeration("wrap_mode_u", &["REPEAT", "CLAMP", "MIRROR"], 0),
            PropertyDef::enumeration("wrap_mode_v", &["REPEAT", "CLAMP", "MIRROR"], 0),
            PropertyDef::enumeration("filter_mode", &["POINT", "BILINEAR"], 1),
            PropertyDef::enumeration("uv_source", &["SCREEN", "OBJECTUV"], 0),
            PropertyDef::new("tiling", PropertyValue::Vector2([1.0, 1.0])),
            PropertyDef::new("offset", PropertyValue::Vector2([0.0, 0.0])),
            PropertyDef::enumeration("source_type", &["IMAGE", "OBJECTCOLOR"], 0),
            PropertyDef::enumeration("uv_selection_mode", &["INDEX", "NAME"], 0),
            int("uv_index", 0),
            PropertyDef::new("uv_name", PropertyValue::String(String::new())),
            PropertyDef::enumeration("object_color_selection_mode", &["INDEX", "NAME"], 0),
            int("object_color_index", 0),
            PropertyDef::new("object_color_name", PropertyValue::String(String::new())),
        ],
    });

    // ========================================================================
    // Material line functions
    // ========================================================================

    registry.register(NodeKind {
        id: LINE_FUNCTIONS_CONTAINER.to_string(),
        name: "Line Functions".to_string(),
        category: NodeCategory::Container,
        inputs: vec![],
        output: None,
        properties: line_functions_properties(),
    });

    registry
}

fn line_set_kind() -> NodeKind {
    let mut inputs = Vec::new();
    let mut properties = vec![
        flag("is_on", true),
        int("lineset_id", 1),
        flag("is_weld_edges", false),
        flag("is_mask_hidden_lines", false),
        PropertyDef::new("objects", PropertyValue::ObjectList(Vec::new())),
        PropertyDef::new("materials", PropertyValue::MaterialList(Vec::new())),
    ];

    for side in ["v", "h"] {
        let visible = side == "v";
        inputs.push(Socket::single(format!("{side}_brush_settings"), SocketType::BrushSettings));
        for feature in SPECIFIC_FEATURES {
            let default_on = visible && matches!(feature, "outline" | "object" | "intersection");
            properties.push(flag(&format!("{side}_{feature}_on"), default_on));
            properties.push(flag(&format!("{side}_{feature}_specific_on"), false));
            inputs.push(Socket::single(
                format!("{side}_{feature}_brush_settings"),
                SocketType::BrushSettings,
            ));
        }
        for extra in ["outline_open", "outline_merge_groups", "object_open", "intersection_self"] {
            properties.push(flag(&format!("{side}_{extra}"), false));
        }
        properties.push(float(&format!("{side}_normal_angle_min"), 0.0));
        properties.push(float(&format!("{side}_normal_angle_max"), std::f64::consts::FRAC_PI_2));
        for reduction in ["size_reduction", "alpha_reduction"] {
            properties.push(flag(&format!("{side}_{reduction}_on"), false));
            inputs.push(Socket::single(format!("{side}_{reduction}_settings"), SocketType::Reduction));
        }
    }

    NodeKind {
        id: LINE_SET.to_string(),
        name: "Line Set".to_string(),
        category: NodeCategory::Settings,
        inputs,
        output: Some(SocketType::LineSet),
        properties,
    }
}

fn brush_detail_properties() -> Vec<PropertyDef> {
    vec![
        PropertyDef::enumeration("brush_type", &["NORMAL", "MULTIPLE", "SIMPLE"], 0),
        flag("brush_map_on", false),
        float("brush_map_opacity", 1.0),
        float("stretch", 0.0),
        float("stretch_random", 0.0),
        float("angle", 0.0),
        float("angle_random", 0.0),
        float("groove", 0.0),
        int("groove_number", 5),
        float("size", 10.0),
        float("size_random", 0.0),
        float("antialiasing", 1.0),
        float("horizontal_space", 1.0),
        float("horizontal_space_random", 0.0),
        float("vertical_space", 1.0),
        float("vertical_space_random", 0.0),
        float("reduction_start", 1.0),
        float("reduction_end", 1.0),
        PropertyDef::enumeration("stroke_type", &["NORMAL", "RAND", "NEIGHBOR"], 0),
        PropertyDef::enumeration("line_type", &["FULL", "DASHED"], 0),
        float("length", 10.0),
        float("length_random", 0.0),
        float("space", 1.0),
        float("space_random", 0.0),
        float("extend", 0.0),
        float("extend_random", 0.0),
        int("line_copy", 1),
        int("line_copy_random", 0),
        float("normal_offset", 0.0),
        float("normal_offset_random", 0.0),
        float("x_offset", 0.0),
        float("x_offset_random", 0.0),
        float("y_offset", 0.0),
        float("y_offset_random", 0.0),
        float("line_split_angle", 0.0),
        float("min_line_length", 0.0),
        float("line_link_length", 0.0),
        float("line_direction", 0.0),
        PropertyDef::enumeration("loop_direction_type", &["CLOCKWISE", "ANTICLOCKWISE"], 0),
        flag("distortion_enabled", false),
        flag("distortion_map_on", false),
        float("distortion_map_amount", 1.0),
        float("distortion_amount", 10.0),
        float("distortion_random", 0.0),
        float("distortion_cycles", 100.0),
        float("distortion_cycles_random", 0.0),
        float("distortion_phase", 0.0),
        float("distortion_phase_random", 0.0),
        flag("size_reduction_enabled", false),
        curve("size_reduction_curve"),
        flag("alpha_reduction_enabled", false),
        curve("alpha_reduction_curve"),
        PropertyDef::enumeration("color_space_type", &["RGB", "HSV"], 0),
        float("color_space_red", 0.0),
        float("color_space_green", 0.0),
        float("color_space_blue", 0.0),
    ]
}

fn line_functions_properties() -> Vec<PropertyDef> {
    let mut properties = Vec::new();
    for feature in [
        "outline",
        "object",
        "intersection",
        "smooth",
        "material",
        "selected_edge",
        "normal_angle",
        "wireframe",
    ] {
        properties.push(flag(&format!("{feature}_on"), false));
        properties.push(color(&format!("{feature}_color"), [0.0, 0.0, 0.0]));
        properties.push(float(&format!("{feature}_amount"), 1.0));
    }
    properties.extend([
        flag("disable_intersection", false),
        flag("draw_hidden_lines", false),
        flag("draw_hidden_lines_of_targets", false),
        PropertyDef::new("draw_hidden_lines_of_targets_objects", PropertyValue::ObjectList(Vec::new())),
        PropertyDef::new("draw_hidden_lines_of_targets_materials", PropertyValue::MaterialList(Vec::new())),
        flag("mask_hidden_lines_of_targets", false),
        PropertyDef::new("mask_hidden_lines_of_targets_objects", PropertyValue::ObjectList(Vec::new())),
        PropertyDef::new("mask_hidden_lines_of_targets_materials", PropertyValue::MaterialList(Vec::new())),
    ]);
    properties
}

/// Properties a pencil material is initialized with
pub fn pencil_material_properties(zone_count: usize) -> Vec<PropertyDef> {
    vec![
        PropertyDef::enumeration(
            "pcl4mtl_highlight_blend",
            &["NORMAL", "ADD", "MULTIPLY", "SCREEN", "OVERLAY"],
            0,
        ),
        float("pcl4mtl_highlight_amount", 1.0),
        color("pcl4mtl_highlight_color", [1.0, 1.0, 1.0]),
        float("pcl4mtl_highlight_level", 1.0),
        float("pcl4mtl_highlight_glossiness", 0.5),
        float("pcl4mtl_highlight_sharpness", 0.0),
        PropertyDef::new("pcl4mtl_position_group", PropertyValue::Group(None)),
        PropertyDef::new("pcl4mtl_color_group", PropertyValue::Group(None)),
        PropertyDef::new(
            ZONES_PROPERTY,
            PropertyValue::Gradation(GradationZone::evenly_spaced(zone_count)),
        ),
        flag("pcl4mtl_grad_offset_on", false),
        float("pcl4mtl_grad_offset_amount", 1.0),
        float("pcl4mtl_grad_offset_offset", 0.0),
        flag("pcl4mtl_grad_light_color_on", false),
        float("pcl4mtl_grad_light_color_amount", 1.0),
        PropertyDef::new(
            "pcl4mtl_grad_light_color_ids",
            PropertyValue::BoolList(vec![false; LIGHT_COLOR_ZONE_SLOTS]),
        ),
        flag("pcl4mtl_grad_light_color_replace_on", false),
        color("pcl4mtl_grad_light_color_replace", [1.0, 1.0, 1.0]),
        float("pcl4mtl_grad_light_color_replace_amount", 1.0),
    ]
}
