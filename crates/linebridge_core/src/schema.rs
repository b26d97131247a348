// SPDX-License-Identifier: MIT OR Apache-2.0
//! Static catalogue of interchange record types.
//!
//! Each [`Schema`] maps a wire type name onto a native node kind (or an
//! abstract entity such as a material) and lists its attributes in document
//! order. Attribute order is also the decode order.

use indexmap::IndexMap;
use linebridge_graph::kinds;
use std::sync::OnceLock;

/// Semantic type of an attribute, selecting its codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrType {
    /// Single node reference
    Node,
    /// Ordered list of node references
    NodeList,
    /// Curve mapping
    Curve,
    /// Scene object by name
    Object,
    /// Scene objects by name
    ObjectList,
    /// Text
    String,
    /// Integer
    Int,
    /// Float
    Float,
    /// Percentage stored natively, fraction on the wire
    FloatPercentage,
    /// Radians natively, degrees on the wire
    FloatAngle,
    /// Length scaled by the session scale factor on import
    FloatWithScale,
    /// Boolean
    Bool,
    /// Boolean list written with exactly eight entries
    BoolList8,
    /// Enum token, declared ordinal on the wire
    Enum,
    /// Two floats
    FloatVector2,
    /// Linear color, sRGB on the wire
    Color,
    /// Image by name
    Image,
    /// Gradation ramp in both representations
    Gradation,
    /// Material by name
    Material,
    /// Materials by name
    MaterialList,
    /// Name of the side record holding extended material settings
    AdvancedMaterial,
    /// Name of the line functions record
    LineFunctions,
    /// Reserved user data
    UserDef,
    /// Position group by name
    PositionGroup,
    /// Color group by name
    ColorGroup,
    /// List of floats
    FloatArray,
    /// List of linear colors, sRGB on the wire
    ColorArray,
    /// Attribute without a native counterpart
    NotImplemented,
}

impl AttrType {
    /// Whether decoding links entities created in the same import
    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Node | Self::NodeList)
    }

    /// Whether decoding never touches the entity. Missing values of these
    /// attributes are not reported.
    pub fn is_passive(&self) -> bool {
        matches!(
            self,
            Self::NotImplemented | Self::UserDef | Self::AdvancedMaterial | Self::LineFunctions
        )
    }
}

/// Document section a record type lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// `LineNode`
    LineNode,
    /// `MaterialNode`
    MaterialNode,
    /// `PositionGroup`
    PositionGroup,
    /// `ColorGroup`
    ColorGroup,
}

/// One attribute of a record type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attribute {
    /// Parameter key in the document
    pub wire: &'static str,
    /// Native property name, if the host stores one
    pub native: Option<&'static str>,
    /// Semantic type
    pub ty: AttrType,
}

const fn attr(wire: &'static str, native: &'static str, ty: AttrType) -> Attribute {
    Attribute {
        wire,
        native: Some(native),
        ty,
    }
}

const fn unmapped(wire: &'static str, ty: AttrType) -> Attribute {
    Attribute {
        wire,
        native: None,
        ty,
    }
}

/// A record type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Schema {
    /// `NodeType` written to the document
    pub wire_type: &'static str,
    /// Native node kind, `None` for abstract entities
    pub native_kind: Option<&'static str>,
    /// Section holding records of this type
    pub section: Section,
    /// Attributes in document order
    pub attributes: &'static [Attribute],
    /// Offset of the i-th child from this node when laid out: `x` once,
    /// `y` per child index
    pub layout_step: [f64; 2],
}

impl Schema {
    /// Attribute by wire name
    pub fn attribute(&self, wire: &str) -> Option<&'static Attribute> {
        self.attributes.iter().find(|a| a.wire == wire)
    }
}

use AttrType as T;

const BRUSH_DETAIL_ATTRIBUTES: &[Attribute] = &[
    attr("BrushType", "brush_type", T::Enum),
    attr("BrushMapOn", "brush_map_on", T::Bool),
    attr("BrushMap", "brush_map", T::Node),
    attr("MapOpacity", "brush_map_opacity", T::Float),
    attr("Stretch", "stretch", T::Float),
    attr("StretchRandom", "stretch_random", T::FloatPercentage),
    attr("Angle", "angle", T::FloatAngle),
    attr("AngleRandom", "angle_random", T::FloatAngle),
    attr("Groove", "groove", T::Float),
    attr("GrooveNumber", "groove_number", T::Int),
    attr("Size", "size", T::Float),
    attr("SizeRandom", "size_random", T::FloatPercentage),
    attr("Antialiasing", "antialiasing", T::Float),
    attr("HorizontalSpace", "horizontal_space", T::Float),
    attr("HorizontalSpaceRandom", "horizontal_space_random", T::FloatPercentage),
    attr("VerticalSpace", "vertical_space", T::Float),
    attr("VerticalSpaceRandom", "vertical_space_random", T::FloatPercentage),
    attr("ReductionStart", "reduction_start", T::Float),
    attr("ReductionEnd", "reduction_end", T::Float),
    attr("StrokeType", "stroke_type", T::Enum),
    attr("LineType", "line_type", T::Enum),
    attr("Length", "length", T::Float),
    attr("LengthRandom", "length_random", T::FloatPercentage),
    attr("Space", "space", T::Float),
    attr("SpaceRandom", "space_random", T::FloatPercentage),
    unmapped("LengthSizeRandom", T::NotImplemented),
    attr("Extend", "extend", T::Float),
    attr("ExtendRandom", "extend_random", T::FloatPercentage),
    attr("LineCopy", "line_copy", T::Int),
    attr("LineCopyRandom", "line_copy_random", T::Int),
    attr("NormalOffset", "normal_offset", T::Float),
    attr("NormalOffsetRandom", "normal_offset_random", T::Float),
    attr("XOffset", "x_offset", T::Float),
    attr("XOffsetRandom", "x_offset_random", T::Float),
    attr("YOffset", "y_offset", T::Float),
    attr("YOffsetRandom", "y_offset_random", T::Float),
    attr("LineSplitAngle", "line_split_angle", T::FloatAngle),
    attr("MinLineLength", "min_line_length", T::Float),
    attr("LineLinkLength", "line_link_length", T::Float),
    attr("LineDirection", "line_direction", T::FloatAngle),
    attr("LoopDirectionType", "loop_direction_type", T::Enum),
    attr("DistortionEnable", "distortion_enabled", T::Bool),
    attr("DistortionMapOn", "distortion_map_on", T::Bool),
    attr("DistortionMap", "distortion_map", T::Node),
    attr("DistortionMapAmount", "distortion_map_amount", T::Float),
    attr("DistortionAmount", "distortion_amount", T::Float),
    attr("DistortionRandom", "distortion_random", T::FloatPercentage),
    attr("DistortionCycles", "distortion_cycles", T::Float),
    attr("DistortionCyclesRandom", "distortion_cycles_random", T::FloatPercentage),
    attr("DistortionPhase", "distortion_phase", T::FloatAngle),
    attr("DistortionPhaseRandom", "distortion_phase_random", T::Float),
    attr("SizeReductionEnable", "size_reduction_enabled", T::Bool),
    attr("SizeReductionCurve", "size_reduction_curve", T::Curve),
    attr("AlphaReductionEnable", "alpha_reduction_enabled", T::Bool),
    attr("AlphaReductionCurve", "alpha_reduction_curve", T::Curve),
    attr("ColorSpaceType", "color_space_type", T::Enum),
    attr("ColorRed", "color_space_red", T::Float),
    attr("ColorGreen", "color_space_green", T::Float),
    attr("ColorBlue", "color_space_blue", T::Float),
];

const BRUSH_SETTINGS_ATTRIBUTES: &[Attribute] = &[
    attr("BrushDetail", "brush_detail_node", T::Node),
    unmapped("BlendMode", T::NotImplemented),
    attr("BlendAmount", "blend_amount", T::Float),
    attr("BrushColor", "brush_color", T::Color),
    attr("ColorMapOn", "color_map_on", T::Bool),
    attr("ColorMap", "color_map", T::Node),
    attr("ColorMapOpacity", "color_map_opacity", T::Float),
    attr("Size", "size", T::Float),
    attr("SizeMapOn", "size_map_on", T::Bool),
    attr("SizeMap", "size_map", T::Node),
    attr("SizeMapAmount", "size_map_amount", T::Float),
];

const LINE_ATTRIBUTES: &[Attribute] = &[
    attr("Active", "is_active", T::Bool),
    attr("LineSets", "line_sets", T::NodeList),
    attr("RenderPriority", "render_priority", T::Int),
    attr("LineSizeType", "line_size_type", T::Enum),
    attr("OutputRenderElementsOnly", "is_output_to_render_elements_only", T::Bool),
    attr("OverSampling", "over_sampling", T::Int),
    attr("Antialiasing", "antialiasing", T::Float),
    attr("OffscreenDistance", "off_screen_distance", T::Float),
    attr("RandomSeed", "random_seed", T::Int),
];

const LINE_SET_ATTRIBUTES: &[Attribute] = &[
    attr("On", "is_on", T::Bool),
    attr("Id", "lineset_id", T::Int),
    attr("WeldsEdges", "is_weld_edges", T::Bool),
    attr("MaskHiddenLines", "is_mask_hidden_lines", T::Bool),
    unmapped("UserDef", T::UserDef),
    attr("Objects", "objects", T::ObjectList),
    attr("Materials", "materials", T::MaterialList),
    attr("VBrushSettings", "v_brush_settings", T::Node),
    attr("VOutlineOn", "v_outline_on", T::Bool),
    attr("VOutlineOpen", "v_outline_open", T::Bool),
    attr("VOutlineMergeGroups", "v_outline_merge_groups", T::Bool),
    attr("VOutlineSpecificOn", "v_outline_specific_on", T::Bool),
    attr("VOutline", "v_outline_brush_settings", T::Node),
    attr("VObjectOn", "v_object_on", T::Bool),
    attr("VObjectOpen", "v_object_open", T::Bool),
    attr("VObjectSpecificOn", "v_object_specific_on", T::Bool),
    attr("VObject", "v_object_brush_settings", T::Node),
    attr("VIntersectionOn", "v_intersection_on", T::Bool),
    attr("VIntersectionSelf", "v_intersection_self", T::Bool),
    attr("VIntersectionSpecificOn", "v_intersection_specific_on", T::Bool),
    attr("VIntersection", "v_intersection_brush_settings", T::Node),
    attr("VSmoothOn", "v_smooth_on", T::Bool),
    attr("VSmoothSpecificOn", "v_smooth_specific_on", T::Bool),
    attr("VSmooth", "v_smooth_brush_settings", T::Node),
    attr("VMaterialOn", "v_material_on", T::Bool),
    attr("VMaterialSpecificOn", "v_material_specific_on", T::Bool),
    attr("VMaterial", "v_material_brush_settings", T::Node),
    attr("VSelectedOn", "v_selected_on", T::Bool),
    attr("VSelectedSpecificOn", "v_selected_specific_on", T::Bool),
    attr("VSelected", "v_selected_brush_settings", T::Node),
    attr("VNormalAngleOn", "v_normal_angle_on", T::Bool),
    attr("VNormalAngleSpecificOn", "v_normal_angle_specific_on", T::Bool),
    attr("VNormalAngle", "v_normal_angle_brush_settings", T::Node),
    attr("VNormalAngleMin", "v_normal_angle_min", T::FloatAngle),
    attr("VNormalAngleMax", "v_normal_angle_max", T::FloatAngle),
    attr("VWireframeOn", "v_wireframe_on", T::Bool),
    attr("VWireframeSpecificOn", "v_wireframe_specific_on", T::Bool),
    attr("VWireframe", "v_wireframe_brush_settings", T::Node),
    attr("VSizeReductionOn", "v_size_reduction_on", T::Bool),
    attr("VSizeReduction", "v_size_reduction_settings", T::Node),
    attr("VAlphaReductionOn", "v_alpha_reduction_on", T::Bool),
    attr("VAlphaReduction", "v_alpha_reduction_settings", T::Node),
    attr("HBrushSettings", "h_brush_settings", T::Node),
    attr("HOutlineOn", "h_outline_on", T::Bool),
    attr("HOutlineOpen", "h_outline_open", T::Bool),
    attr("HOutlineMergeGroups", "h_outline_merge_groups", T::Bool),
    attr("HOutlineSpecificOn", "h_outline_specific_on", T::Bool),
    attr("HOutline", "h_outline_brush_settings", T::Node),
    attr("HObjectOn", "h_object_on", T::Bool),
    attr("HObjectOpen", "h_object_open", T::Bool),
    attr("HObjectSpecificOn", "h_object_specific_on", T::Bool),
    attr("HObject", "h_object_brush_settings", T::Node),
    attr("HIntersectionOn", "h_intersection_on", T::Bool),
    attr("HIntersectionSelf", "h_intersection_self", T::Bool),
    attr("HIntersectionSpecificOn", "h_intersection_specific_on", T::Bool),
    attr("HIntersection", "h_intersection_brush_settings", T::Node),
    attr("HSmoothOn", "h_smooth_on", T::Bool),
    attr("HSmoothSpecificOn", "h_smooth_specific_on", T::Bool),
    attr("HSmooth", "h_smooth_brush_settings", T::Node),
    attr("HMaterialOn", "h_material_on", T::Bool),
    attr("HMaterialSpecificOn", "h_material_specific_on", T::Bool),
    attr("HMaterial", "h_material_brush_settings", T::Node),
    attr("HSelectedOn", "h_selected_on", T::Bool),
    attr("HSelectedSpecificOn", "h_selected_specific_on", T::Bool),
    attr("HSelected", "h_selected_brush_settings", T::Node),
    attr("HNormalAngleOn", "h_normal_angle_on", T::Bool),
    attr("HNormalAngleSpecificOn", "h_normal_angle_specific_on", T::Bool),
    attr("HNormalAngle", "h_normal_angle_brush_settings", T::Node),
    attr("HNormalAngleMin", "h_normal_angle_min", T::FloatAngle),
    attr("HNormalAngleMax", "h_normal_angle_max", T::FloatAngle),
    attr("HWireframeOn", "h_wireframe_on", T::Bool),
    attr("HWireframeSpecificOn", "h_wireframe_specific_on", T::Bool),
    attr("HWireframe", "h_wireframe_brush_settings", T::Node),
    attr("HSizeReductionOn", "h_size_reduction_on", T::Bool),
    attr("HSizeReduction", "h_size_reduction_settings", T::Node),
    attr("HAlphaReductionOn", "h_alpha_reduction_on", T::Bool),
    attr("HAlphaReduction", "h_alpha_reduction_settings", T::Node),
];

const LINE_FUNCTIONS_ATTRIBUTES: &[Attribute] = &[
    attr("ReplaceOutlineOn", "outline_on", T::Bool),
    attr("ReplaceOutlineColor", "outline_color", T::Color),
    attr("ReplaceOutlineAmount", "outline_amount", T::Float),
    attr("ReplaceObjectOn", "object_on", T::Bool),
    attr("ReplaceObjectColor", "object_color", T::Color),
    attr("ReplaceObjectAmount", "object_amount", T::Float),
    attr("ReplaceIntersectionOn", "intersection_on", T::Bool),
    attr("ReplaceIntersectionColor", "intersection_color", T::Color),
    attr("ReplaceIntersectionAmount", "intersection_amount", T::Float),
    attr("ReplaceSmoothOn", "smooth_on", T::Bool),
    attr("ReplaceSmoothColor", "smooth_color", T::Color),
    attr("ReplaceSmoothAmount", "smooth_amount", T::Float),
    attr("ReplaceMaterialOn", "material_on", T::Bool),
    attr("ReplaceMaterialColor", "material_color", T::Color),
    attr("ReplaceMaterialAmount", "material_amount", T::Float),
    attr("ReplaceSelectedOn", "selected_edge_on", T::Bool),
    attr("ReplaceSelectedColor", "selected_edge_color", T::Color),
    attr("ReplaceSelectedAmount", "selected_edge_amount", T::Float),
    attr("ReplaceNormalAngleOn", "normal_angle_on", T::Bool),
    attr("ReplaceNormalAngleColor", "normal_angle_color", T::Color),
    attr("ReplaceNormalAngleAmount", "normal_angle_amount", T::Float),
    attr("ReplaceWireframeOn", "wireframe_on", T::Bool),
    attr("ReplaceWireframeColor", "wireframe_color", T::Color),
    attr("ReplaceWireframeAmount", "wireframe_amount", T::Float),
    attr("DisableIntersection", "disable_intersection", T::Bool),
    attr("DrawHiddenLines", "draw_hidden_lines", T::Bool),
    attr("DrawHiddenLinesOfTarget", "draw_hidden_lines_of_targets", T::Bool),
    attr("DrawObjects", "draw_hidden_lines_of_targets_objects", T::ObjectList),
    attr("DrawMaterials", "draw_hidden_lines_of_targets_materials", T::MaterialList),
    attr("MaskHiddenLinesOfTarget", "mask_hidden_lines_of_targets", T::Bool),
    attr("MaskObjects", "mask_hidden_lines_of_targets_objects", T::ObjectList),
    attr("MaskMaterials", "mask_hidden_lines_of_targets_materials", T::MaterialList),
];

const REDUCTION_SETTINGS_ATTRIBUTES: &[Attribute] = &[
    attr("ReductionStart", "reduction_start", T::FloatWithScale),
    attr("ReductionEnd", "reduction_end", T::FloatWithScale),
    attr("ReferObject", "refer_object_on", T::Bool),
    attr("Object", "object_reference", T::Object),
    attr("Curve", "curve", T::Curve),
];

const TEXTURE_MAP_ATTRIBUTES: &[Attribute] = &[
    attr("HoldingTexture", "image", T::Image),
    attr("WrapModeU", "wrap_mode_u", T::Enum),
    attr("WrapModeV", "wrap_mode_v", T::Enum),
    attr("FilterMode", "filter_mode", T::Enum),
    attr("ExtendedTextureUV", "uv_source", T::Enum),
    attr("Tiling", "tiling", T::FloatVector2),
    attr("Offset", "offset", T::FloatVector2),
    attr("SourceType", "source_type", T::Enum),
    attr("UVSelectionMode", "uv_selection_mode", T::Enum),
    attr("UVIndex", "uv_index", T::Int),
    attr("UVName", "uv_name", T::String),
    attr("ObjectColorSelectionMode", "object_color_selection_mode", T::Enum),
    attr("ObjectColorIndex", "object_color_index", T::Int),
    attr("ObjectColorName", "object_color_name", T::String),
];

const PENCIL_MATERIAL_ATTRIBUTES: &[Attribute] = &[
    unmapped("AdvancedMaterial", T::AdvancedMaterial),
    attr("BlendMode", "pcl4mtl_highlight_blend", T::Enum),
    attr("BlendAmount", "pcl4mtl_highlight_amount", T::Float),
    attr("HighlightColor", "pcl4mtl_highlight_color", T::Color),
    unmapped("ColorMapOn", T::NotImplemented),
    unmapped("ColorMap", T::NotImplemented),
    unmapped("MapOpacity", T::NotImplemented),
    attr("SpecularLevel", "pcl4mtl_highlight_level", T::Float),
    attr("Glossiness", "pcl4mtl_highlight_glossiness", T::Float),
    unmapped("Anisotropic", T::NotImplemented),
    unmapped("Orientation", T::NotImplemented),
    attr("Sharpness", "pcl4mtl_highlight_sharpness", T::Float),
    unmapped("Squash", T::NotImplemented),
    unmapped("DiffractionEffect", T::NotImplemented),
    unmapped("Range", T::NotImplemented),
    attr("PositionGroup", "pcl4mtl_position_group", T::PositionGroup),
    attr("ColorGroup", "pcl4mtl_color_group", T::ColorGroup),
    attr("Gradation", linebridge_graph::material::ZONES_PROPERTY, T::Gradation),
    unmapped("LineFunctions", T::LineFunctions),
];

const ADVANCED_MATERIAL_ATTRIBUTES: &[Attribute] = &[
    attr("GradOffsetEnable", "pcl4mtl_grad_offset_on", T::Bool),
    attr("GradOffsetAmount", "pcl4mtl_grad_offset_amount", T::Float),
    unmapped("GradOffsetMap", T::NotImplemented),
    attr("GradOffsetMapOffset", "pcl4mtl_grad_offset_offset", T::Float),
    unmapped("SblendEnable", T::NotImplemented),
    unmapped("SblendColor", T::NotImplemented),
    unmapped("SblendMapOpacity", T::NotImplemented),
    unmapped("SblendMapEnable", T::NotImplemented),
    unmapped("SblendMap", T::NotImplemented),
    unmapped("SblendMode", T::NotImplemented),
    unmapped("SblendAmount", T::NotImplemented),
    attr("LightColEnable", "pcl4mtl_grad_light_color_on", T::Bool),
    unmapped("LightColBlend", T::NotImplemented),
    attr("LightcolAmount", "pcl4mtl_grad_light_color_amount", T::Float),
    attr("LightcolZoneIDs", "pcl4mtl_grad_light_color_ids", T::BoolList8),
    attr("LightColRelpaceEnable", "pcl4mtl_grad_light_color_replace_on", T::Bool),
    attr("LightColRelpaceColor", "pcl4mtl_grad_light_color_replace", T::Color),
    attr("LightColReplaceAmount", "pcl4mtl_grad_light_color_replace_amount", T::Float),
    unmapped("HiDesignEnable", T::NotImplemented),
    unmapped("HiDesignAmount", T::NotImplemented),
    unmapped("HiDesignAngle", T::NotImplemented),
    unmapped("ZoneAntiIntensity", T::NotImplemented),
    unmapped("ZoneAntiEnable", T::NotImplemented),
    unmapped("SpecificLightsEnable", T::NotImplemented),
    unmapped("SpecificLightsStrength", T::NotImplemented),
    unmapped("SpecificTranspEnable", T::NotImplemented),
    unmapped("SpecificTranspMaterials", T::NotImplemented),
    unmapped("SpecificTranspMaterialsValue", T::NotImplemented),
    unmapped("SpecificTranspMapEnable", T::NotImplemented),
    unmapped("SpecificTranspMapAmount", T::NotImplemented),
    unmapped("PolygonCntl", T::NotImplemented),
];

const POSITION_GROUP_ATTRIBUTES: &[Attribute] =
    &[attr("Positions", "pcl4_position_group_values", T::FloatArray)];

const COLOR_GROUP_ATTRIBUTES: &[Attribute] =
    &[attr("Colors", "pcl4_color_group_values", T::ColorArray)];

/// `NodeType` of line nodes
pub const LINE: &str = "Line";
/// `NodeType` of line sets
pub const LINE_SET: &str = "LineSet";
/// `NodeType` of brush settings
pub const BRUSH_SETTINGS: &str = "BrushSettings";
/// `NodeType` of brush details
pub const BRUSH_DETAIL: &str = "BrushDetailSettings";
/// `NodeType` of reduction settings
pub const REDUCTION_SETTINGS: &str = "ReductionSettings";
/// `NodeType` of texture maps
pub const TEXTURE_MAP: &str = "TextureMap";
/// `NodeType` of line functions records
pub const LINE_FUNCTIONS: &str = "LineRelatedFunctions";
/// `NodeType` of pencil materials
pub const PENCIL_MATERIAL: &str = "PencilMaterial";
/// `NodeType` of extended material records
pub const ADVANCED_MATERIAL: &str = "AdvancedMaterial";
/// Type name of position groups
pub const POSITION_GROUP: &str = "PositionGroup";
/// Type name of color groups
pub const COLOR_GROUP: &str = "ColorGroup";

const DEFAULT_STEP: [f64; 2] = [-200.0, -40.0];

static SCHEMAS: [Schema; 11] = [
    Schema {
        wire_type: BRUSH_DETAIL,
        native_kind: Some(kinds::BRUSH_DETAIL),
        section: Section::LineNode,
        attributes: BRUSH_DETAIL_ATTRIBUTES,
        layout_step: [-260.0, -60.0],
    },
    Schema {
        wire_type: BRUSH_SETTINGS,
        native_kind: Some(kinds::BRUSH_SETTINGS),
        section: Section::LineNode,
        attributes: BRUSH_SETTINGS_ATTRIBUTES,
        layout_step: [-260.0, -60.0],
    },
    Schema {
        wire_type: LINE,
        native_kind: Some(kinds::LINE),
        section: Section::LineNode,
        attributes: LINE_ATTRIBUTES,
        layout_step: [-300.0, -40.0],
    },
    Schema {
        wire_type: LINE_SET,
        native_kind: Some(kinds::LINE_SET),
        section: Section::LineNode,
        attributes: LINE_SET_ATTRIBUTES,
        layout_step: [-300.0, -24.0],
    },
    Schema {
        wire_type: LINE_FUNCTIONS,
        native_kind: Some(kinds::LINE_FUNCTIONS_CONTAINER),
        section: Section::MaterialNode,
        attributes: LINE_FUNCTIONS_ATTRIBUTES,
        layout_step: DEFAULT_STEP,
    },
    Schema {
        wire_type: REDUCTION_SETTINGS,
        native_kind: Some(kinds::REDUCTION_SETTINGS),
        section: Section::LineNode,
        attributes: REDUCTION_SETTINGS_ATTRIBUTES,
        layout_step: DEFAULT_STEP,
    },
    Schema {
        wire_type: TEXTURE_MAP,
        native_kind: Some(kinds::TEXTURE_MAP),
        section: Section::LineNode,
        attributes: TEXTURE_MAP_ATTRIBUTES,
        layout_step: DEFAULT_STEP,
    },
    Schema {
        wire_type: PENCIL_MATERIAL,
        native_kind: None,
        section: Section::MaterialNode,
        attributes: PENCIL_MATERIAL_ATTRIBUTES,
        layout_step: DEFAULT_STEP,
    },
    Schema {
        wire_type: ADVANCED_MATERIAL,
        native_kind: None,
        section: Section::MaterialNode,
        attributes: ADVANCED_MATERIAL_ATTRIBUTES,
        layout_step: DEFAULT_STEP,
    },
    Schema {
        wire_type: POSITION_GROUP,
        native_kind: None,
        section: Section::PositionGroup,
        attributes: POSITION_GROUP_ATTRIBUTES,
        layout_step: DEFAULT_STEP,
    },
    Schema {
        wire_type: COLOR_GROUP,
        native_kind: None,
        section: Section::ColorGroup,
        attributes: COLOR_GROUP_ATTRIBUTES,
        layout_step: DEFAULT_STEP,
    },
];

/// Lookup tables over the static schemas
#[derive(Debug)]
pub struct SchemaRegistry {
    by_wire_type: IndexMap<&'static str, &'static Schema>,
    by_native_kind: IndexMap<&'static str, &'static Schema>,
}

impl SchemaRegistry {
    fn build() -> Self {
        let by_wire_type = SCHEMAS.iter().map(|s| (s.wire_type, s)).collect();
        let by_native_kind = SCHEMAS
            .iter()
            .filter_map(|s| s.native_kind.map(|kind| (kind, s)))
            .collect();
        Self {
            by_wire_type,
            by_native_kind,
        }
    }

    /// Process-wide registry
    pub fn global() -> &'static SchemaRegistry {
        static REGISTRY: OnceLock<SchemaRegistry> = OnceLock::new();
        REGISTRY.get_or_init(Self::build)
    }

    /// Schema for a wire type name
    pub fn lookup_by_wire_type(&self, name: &str) -> Option<&'static Schema> {
        self.by_wire_type.get(name).copied()
    }

    /// Schema for a native node kind
    pub fn lookup_by_native_kind(&self, kind: &str) -> Option<&'static Schema> {
        self.by_native_kind.get(kind).copied()
    }

    /// Attributes of a schema in document order
    pub fn attributes_of(&self, schema: &Schema) -> &'static [Attribute] {
        schema.attributes
    }

    /// Every registered schema
    pub fn schemas(&self) -> impl Iterator<Item = &'static Schema> + '_ {
        self.by_wire_type.values().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linebridge_graph::kinds::create_line_registry;

    #[test]
    fn test_lookup_both_ways() {
        let registry = SchemaRegistry::global();
        let line_set = registry.lookup_by_wire_type(LINE_SET).unwrap();
        assert_eq!(line_set.native_kind, Some(kinds::LINE_SET));
        assert_eq!(
            registry.lookup_by_native_kind(kinds::LINE_SET).map(|s| s.wire_type),
            Some(LINE_SET)
        );
        assert!(registry.lookup_by_wire_type("Bogus").is_none());
        assert!(registry.lookup_by_native_kind("Bogus").is_none());
    }

    #[test]
    fn test_wire_names_unique_per_schema() {
        for schema in SchemaRegistry::global().schemas() {
            let mut seen = std::collections::HashSet::new();
            for attribute in schema.attributes {
                assert!(seen.insert(attribute.wire), "{} repeats {}", schema.wire_type, attribute.wire);
            }
        }
    }

    #[test]
    fn test_native_properties_exist_on_kinds() {
        let kinds = create_line_registry();
        let registry = SchemaRegistry::global();
        for schema in registry.schemas() {
            let Some(kind_id) = schema.native_kind else {
                continue;
            };
            let kind = kinds.get(kind_id).unwrap();
            for attribute in registry.attributes_of(schema) {
                let Some(native) = attribute.native else {
                    continue;
                };
                let declared = if attribute.ty.is_reference() {
                    kind.inputs.iter().any(|p| p.identifier == native)
                } else {
                    kind.property(native).is_some()
                };
                assert!(declared, "{kind_id} lacks {native}");
            }
        }
    }

    #[test]
    fn test_material_attributes_exist_on_pencil_material() {
        let properties = linebridge_graph::kinds::pencil_material_properties(2);
        let registry = SchemaRegistry::global();
        for wire_type in [PENCIL_MATERIAL, ADVANCED_MATERIAL] {
            let schema = registry.lookup_by_wire_type(wire_type).unwrap();
            for native in schema.attributes.iter().filter_map(|a| a.native) {
                assert!(properties.iter().any(|p| p.name == native), "missing {native}");
            }
        }
    }
}
