// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-type attribute codecs.
//!
//! Every [`AttrType`] maps to one encode and one decode function. Encoders
//! never fail: values the host cannot provide are written as `null`.
//! Decoders report failures per attribute; unresolved references are
//! dropped silently.

use crate::color::{decode_color, encode_color};
use crate::error::CodecError;
use crate::gradation;
use crate::schema::AttrType;
use indexmap::IndexMap;
use linebridge_graph::curve::{self, CurvePoint, HandleType};
use linebridge_graph::{EntityRef, PropertyValue, Scope};
use serde_json::{json, Value};

/// Key of native control points in a wire curve
pub const CURVE_POINTS_KEY: &str = "BlenderCurveKeys";
/// Key of sampled points in a wire curve
pub const CURVE_SAMPLES_KEY: &str = "UniversalKeys";
/// Number of samples written for a curve
pub const CURVE_SAMPLE_COUNT: usize = 9;
/// Length of boolean lists on the wire
pub const BOOL_LIST_LEN: usize = 8;

/// Optional replacement for stored attribute values during export
pub type AttributeOverride<'a> = &'a dyn Fn(&EntityRef, &str) -> Option<PropertyValue>;

/// State available to encoders
pub struct EncodeContext<'a> {
    /// Scope being exported
    pub scope: &'a dyn Scope,
    /// Consulted before the scope for every attribute read
    pub overrides: Option<AttributeOverride<'a>>,
}

impl<'a> EncodeContext<'a> {
    /// Create a context without overrides
    pub fn new(scope: &'a dyn Scope) -> Self {
        Self {
            scope,
            overrides: None,
        }
    }

    /// Current value of an attribute, override first
    pub fn read(&self, entity: &EntityRef, name: &str) -> Option<PropertyValue> {
        self.overrides
            .and_then(|lookup| lookup(entity, name))
            .or_else(|| self.scope.property(entity, name).ok())
    }
}

/// State available to decoders
pub struct DecodeContext<'a> {
    /// Scope being written
    pub scope: &'a mut dyn Scope,
    /// Entities created by this import, by wire id
    pub node_ids: &'a IndexMap<String, EntityRef>,
    /// Node groups created by this import, wire id to final name
    pub group_ids: &'a IndexMap<String, String>,
    /// Scale applied to lengths
    pub scale_factor: f64,
}

/// Encoder signature
pub type EncodeFn = fn(&EncodeContext<'_>, &EntityRef, &str) -> Value;

/// Decoder signature
pub type DecodeFn = fn(&mut DecodeContext<'_>, &EntityRef, &str, &Value) -> Result<(), CodecError>;

/// Encode/decode pair for one semantic type
#[derive(Clone, Copy)]
pub struct Codec {
    /// Native to wire
    pub encode: EncodeFn,
    /// Wire to native
    pub decode: DecodeFn,
}

/// Codec for a semantic type
pub fn codec_for(ty: AttrType) -> Codec {
    let (encode, decode): (EncodeFn, DecodeFn) = match ty {
        AttrType::Node => (encode_node, decode_node),
        AttrType::NodeList => (encode_node_list, decode_node_list),
        AttrType::Curve => (encode_curve, decode_curve),
        AttrType::Object => (encode_object, decode_object),
        AttrType::ObjectList => (encode_object_list, decode_object_list),
        AttrType::String => (encode_scalar, decode_string),
        AttrType::Int => (encode_scalar, decode_int),
        AttrType::Float => (encode_scalar, decode_float),
        AttrType::FloatPercentage => (encode_percentage, decode_percentage),
        AttrType::FloatAngle => (encode_angle, decode_angle),
        AttrType::FloatWithScale => (encode_scalar, decode_scaled),
        AttrType::Bool => (encode_scalar, decode_bool),
        AttrType::BoolList8 => (encode_bool_list, decode_bool_list),
        AttrType::Enum => (encode_enum, decode_enum),
        AttrType::FloatVector2 => (encode_vector2, decode_vector2),
        AttrType::Color => (encode_color_attr, decode_color_attr),
        AttrType::Image => (encode_image, decode_image),
        AttrType::Gradation => (encode_gradation, decode_gradation),
        AttrType::Material => (encode_material, decode_material),
        AttrType::MaterialList => (encode_material_list, decode_material_list),
        AttrType::PositionGroup | AttrType::ColorGroup => (encode_group, decode_group),
        AttrType::FloatArray => (encode_float_array, decode_float_array),
        AttrType::ColorArray => (encode_color_array, decode_color_array),
        AttrType::AdvancedMaterial
        | AttrType::LineFunctions
        | AttrType::UserDef
        | AttrType::NotImplemented => (encode_null, decode_noop),
    };
    Codec { encode, decode }
}

// ============================================================================
// Wire value helpers
// ============================================================================

fn expect_f64(value: &Value) -> Result<f64, CodecError> {
    value.as_f64().ok_or_else(|| CodecError::mismatch("number", value))
}

fn expect_array(value: &Value) -> Result<&Vec<Value>, CodecError> {
    value.as_array().ok_or_else(|| CodecError::mismatch("array", value))
}

fn expect_floats(value: &Value) -> Result<Vec<f64>, CodecError> {
    expect_array(value)?.iter().map(expect_f64).collect()
}

fn material_entry(name: &str) -> Value {
    json!({ "Name": name, "Id": null, "MaterialType": "Other" })
}

fn material_name(value: &Value) -> Option<&str> {
    value
        .get("Name")
        .and_then(Value::as_str)
        .or_else(|| value.as_str())
}

// ============================================================================
// Encoders
// ============================================================================

fn encode_null(_: &EncodeContext<'_>, _: &EntityRef, _: &str) -> Value {
    Value::Null
}

fn encode_scalar(ctx: &EncodeContext<'_>, entity: &EntityRef, name: &str) -> Value {
    match ctx.read(entity, name) {
        Some(PropertyValue::Bool(v)) => Value::from(v),
        Some(PropertyValue::Int(v)) => Value::from(v),
        Some(PropertyValue::Float(v)) => Value::from(v),
        Some(PropertyValue::String(v) | PropertyValue::Enum(v)) => Value::from(v),
        _ => Value::Null,
    }
}

fn read_float(ctx: &EncodeContext<'_>, entity: &EntityRef, name: &str) -> Option<f64> {
    match ctx.read(entity, name)? {
        PropertyValue::Float(v) => Some(v),
        PropertyValue::Int(v) => Some(v as f64),
        _ => None,
    }
}

fn encode_percentage(ctx: &EncodeContext<'_>, entity: &EntityRef, name: &str) -> Value {
    read_float(ctx, entity, name).map_or(Value::Null, |v| Value::from(v / 100.0))
}

fn encode_angle(ctx: &EncodeContext<'_>, entity: &EntityRef, name: &str) -> Value {
    read_float(ctx, entity, name).map_or(Value::Null, |v| Value::from(v.to_degrees()))
}

fn encode_node(ctx: &EncodeContext<'_>, entity: &EntityRef, name: &str) -> Value {
    ctx.scope
        .linked_nodes(entity, name)
        .ok()
        .and_then(|children| children.into_iter().next())
        .map_or(Value::Null, |child| Value::from(child.qualified_name()))
}

fn encode_node_list(ctx: &EncodeContext<'_>, entity: &EntityRef, name: &str) -> Value {
    let children = ctx.scope.linked_nodes(entity, name).unwrap_or_default();
    Value::from(
        children
            .iter()
            .map(EntityRef::qualified_name)
            .collect::<Vec<_>>(),
    )
}

fn encode_curve(ctx: &EncodeContext<'_>, entity: &EntityRef, name: &str) -> Value {
    let overridden = ctx.overrides.and_then(|lookup| lookup(entity, name));
    let from_scope = overridden.is_none();
    let points = match overridden.or_else(|| ctx.scope.property(entity, name).ok()) {
        Some(PropertyValue::Curve(points)) => points,
        _ => Vec::new(),
    };
    let samples = from_scope
        .then(|| ctx.scope.sample_curve(entity, name, CURVE_SAMPLE_COUNT).ok())
        .flatten()
        .unwrap_or_else(|| curve::sample(&points, CURVE_SAMPLE_COUNT));

    let native: Vec<Value> = points
        .iter()
        .map(|p| json!([p.location[0], p.location[1], p.handle.as_str()]))
        .collect();
    let last = CURVE_SAMPLE_COUNT.saturating_sub(1).max(1) as f64;
    let universal: Vec<Value> = samples
        .iter()
        .enumerate()
        .map(|(i, y)| json!([i as f64 / last, y]))
        .collect();
    json!({ CURVE_POINTS_KEY: native, CURVE_SAMPLES_KEY: universal })
}

fn encode_object(ctx: &EncodeContext<'_>, entity: &EntityRef, name: &str) -> Value {
    match ctx.read(entity, name) {
        Some(PropertyValue::Object(Some(object))) => Value::from(object),
        _ => Value::Null,
    }
}

fn encode_object_list(ctx: &EncodeContext<'_>, entity: &EntityRef, name: &str) -> Value {
    match ctx.read(entity, name) {
        Some(PropertyValue::ObjectList(objects)) => Value::from(objects),
        _ => Value::Array(Vec::new()),
    }
}

fn encode_bool_list(ctx: &EncodeContext<'_>, entity: &EntityRef, name: &str) -> Value {
    let mut flags = match ctx.read(entity, name) {
        Some(PropertyValue::BoolList(flags)) => flags,
        _ => Vec::new(),
    };
    flags.resize(BOOL_LIST_LEN, false);
    Value::from(flags)
}

fn encode_enum(ctx: &EncodeContext<'_>, entity: &EntityRef, name: &str) -> Value {
    let Some(PropertyValue::Enum(token)) = ctx.read(entity, name) else {
        return Value::Null;
    };
    ctx.scope
        .enum_items(entity, name)
        .unwrap_or_default()
        .into_iter()
        .find(|item| item.identifier == token)
        .map_or(Value::Null, |item| Value::from(item.value))
}

fn encode_vector2(ctx: &EncodeContext<'_>, entity: &EntityRef, name: &str) -> Value {
    match ctx.read(entity, name) {
        Some(PropertyValue::Vector2([x, y])) => json!([x, y]),
        _ => Value::Null,
    }
}

fn encode_color_attr(ctx: &EncodeContext<'_>, entity: &EntityRef, name: &str) -> Value {
    match ctx.read(entity, name) {
        Some(PropertyValue::Color(linear)) => Value::from(encode_color(linear).to_vec()),
        _ => Value::Null,
    }
}

fn encode_image(ctx: &EncodeContext<'_>, entity: &EntityRef, name: &str) -> Value {
    match ctx.read(entity, name) {
        Some(PropertyValue::Image(Some(image))) => Value::from(image),
        _ => Value::Null,
    }
}

fn encode_gradation(ctx: &EncodeContext<'_>, entity: &EntityRef, name: &str) -> Value {
    match ctx.read(entity, name) {
        Some(PropertyValue::Gradation(zones)) => gradation::encode(&zones),
        _ => Value::Null,
    }
}

fn encode_material(ctx: &EncodeContext<'_>, entity: &EntityRef, name: &str) -> Value {
    match ctx.read(entity, name) {
        Some(PropertyValue::Material(Some(material))) => material_entry(&material),
        _ => Value::Null,
    }
}

fn encode_material_list(ctx: &EncodeContext<'_>, entity: &EntityRef, name: &str) -> Value {
    match ctx.read(entity, name) {
        Some(PropertyValue::MaterialList(materials)) => {
            Value::Array(materials.iter().map(|m| material_entry(m)).collect())
        }
        _ => Value::Array(Vec::new()),
    }
}

fn encode_group(ctx: &EncodeContext<'_>, entity: &EntityRef, name: &str) -> Value {
    match ctx.read(entity, name) {
        Some(PropertyValue::Group(Some(group))) => Value::from(group),
        _ => Value::Null,
    }
}

fn encode_float_array(ctx: &EncodeContext<'_>, entity: &EntityRef, name: &str) -> Value {
    match ctx.read(entity, name) {
        Some(PropertyValue::FloatList(values)) => Value::from(values),
        _ => Value::Array(Vec::new()),
    }
}

fn encode_color_array(ctx: &EncodeContext<'_>, entity: &EntityRef, name: &str) -> Value {
    match ctx.read(entity, name) {
        Some(PropertyValue::ColorList(colors)) => Value::Array(
            colors
                .into_iter()
                .map(|c| Value::from(encode_color(c).to_vec()))
                .collect(),
        ),
        _ => Value::Array(Vec::new()),
    }
}

// ============================================================================
// Decoders
// ============================================================================

fn decode_noop(_: &mut DecodeContext<'_>, _: &EntityRef, _: &str, _: &Value) -> Result<(), CodecError> {
    Ok(())
}

fn set(ctx: &mut DecodeContext<'_>, entity: &EntityRef, name: &str, value: PropertyValue) -> Result<(), CodecError> {
    ctx.scope.set_property(entity, name, value)?;
    Ok(())
}

fn decode_node(ctx: &mut DecodeContext<'_>, entity: &EntityRef, name: &str, value: &Value) -> Result<(), CodecError> {
    let id = match value {
        Value::Null => return Ok(()),
        Value::String(id) => id,
        other => return Err(CodecError::mismatch("node id", other)),
    };
    let Some(child) = ctx.node_ids.get(id) else {
        tracing::debug!(%entity, id = %id, "Dropped unresolved reference");
        return Ok(());
    };
    ctx.scope.link(entity, name, child)?;
    Ok(())
}

fn decode_node_list(ctx: &mut DecodeContext<'_>, entity: &EntityRef, name: &str, value: &Value) -> Result<(), CodecError> {
    for id in expect_array(value)? {
        let Some(child) = id.as_str().and_then(|id| ctx.node_ids.get(id)) else {
            continue;
        };
        ctx.scope.link(entity, name, child)?;
    }
    Ok(())
}

fn parse_curve_points(value: Option<&Value>) -> Option<Vec<CurvePoint>> {
    let points: Vec<CurvePoint> = value?
        .as_array()?
        .iter()
        .filter_map(|entry| {
            let entry = entry.as_array()?;
            let x = entry.first()?.as_f64()?;
            let y = entry.get(1)?.as_f64()?;
            let handle = entry
                .get(2)
                .and_then(Value::as_str)
                .map(HandleType::from_token)
                .unwrap_or_default();
            Some(CurvePoint::new(x, y).with_handle(handle))
        })
        .collect();
    (points.len() >= 2).then_some(points)
}

fn decode_curve(ctx: &mut DecodeContext<'_>, entity: &EntityRef, name: &str, value: &Value) -> Result<(), CodecError> {
    if !value.is_object() {
        return Err(CodecError::mismatch("curve", value));
    }
    let points = parse_curve_points(value.get(CURVE_POINTS_KEY))
        .or_else(|| parse_curve_points(value.get(CURVE_SAMPLES_KEY)));
    if let Some(points) = points {
        ctx.scope.set_curve_points(entity, name, points)?;
    }
    Ok(())
}

fn decode_object(ctx: &mut DecodeContext<'_>, entity: &EntityRef, name: &str, value: &Value) -> Result<(), CodecError> {
    match value.as_str() {
        Some(object) if ctx.scope.has_object(object) => {
            set(ctx, entity, name, PropertyValue::Object(Some(object.to_string())))
        }
        _ => Ok(()),
    }
}

fn decode_object_list(ctx: &mut DecodeContext<'_>, entity: &EntityRef, name: &str, value: &Value) -> Result<(), CodecError> {
    let objects = expect_array(value)?
        .iter()
        .filter_map(Value::as_str)
        .filter(|object| ctx.scope.has_object(object))
        .map(str::to_string)
        .collect();
    set(ctx, entity, name, PropertyValue::ObjectList(objects))
}

fn decode_string(ctx: &mut DecodeContext<'_>, entity: &EntityRef, name: &str, value: &Value) -> Result<(), CodecError> {
    let text = value.as_str().ok_or_else(|| CodecError::mismatch("string", value))?;
    set(ctx, entity, name, PropertyValue::String(text.to_string()))
}

fn decode_int(ctx: &mut DecodeContext<'_>, entity: &EntityRef, name: &str, value: &Value) -> Result<(), CodecError> {
    let int = value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f.trunc() as i64))
        .ok_or_else(|| CodecError::mismatch("integer", value))?;
    set(ctx, entity, name, PropertyValue::Int(int))
}

fn decode_float(ctx: &mut DecodeContext<'_>, entity: &EntityRef, name: &str, value: &Value) -> Result<(), CodecError> {
    let float = expect_f64(value)?;
    set(ctx, entity, name, PropertyValue::Float(float))
}

fn decode_percentage(ctx: &mut DecodeContext<'_>, entity: &EntityRef, name: &str, value: &Value) -> Result<(), CodecError> {
    let fraction = expect_f64(value)?;
    set(ctx, entity, name, PropertyValue::Float(fraction * 100.0))
}

fn decode_angle(ctx: &mut DecodeContext<'_>, entity: &EntityRef, name: &str, value: &Value) -> Result<(), CodecError> {
    let degrees = expect_f64(value)?;
    set(ctx, entity, name, PropertyValue::Float(degrees.to_radians()))
}

fn decode_scaled(ctx: &mut DecodeContext<'_>, entity: &EntityRef, name: &str, value: &Value) -> Result<(), CodecError> {
    let length = expect_f64(value)? * ctx.scale_factor;
    set(ctx, entity, name, PropertyValue::Float(length))
}

fn decode_bool(ctx: &mut DecodeContext<'_>, entity: &EntityRef, name: &str, value: &Value) -> Result<(), CodecError> {
    let flag = value
        .as_bool()
        .or_else(|| value.as_f64().map(|n| n != 0.0))
        .ok_or_else(|| CodecError::mismatch("boolean", value))?;
    set(ctx, entity, name, PropertyValue::Bool(flag))
}

fn decode_bool_list(ctx: &mut DecodeContext<'_>, entity: &EntityRef, name: &str, value: &Value) -> Result<(), CodecError> {
    let mut flags = expect_array(value)?
        .iter()
        .map(|v| v.as_bool().ok_or_else(|| CodecError::mismatch("boolean", v)))
        .collect::<Result<Vec<_>, _>>()?;
    let native_len = match ctx.scope.property(entity, name)? {
        PropertyValue::BoolList(current) => current.len(),
        _ => flags.len(),
    };
    flags.resize(native_len, false);
    set(ctx, entity, name, PropertyValue::BoolList(flags))
}

fn decode_enum(ctx: &mut DecodeContext<'_>, entity: &EntityRef, name: &str, value: &Value) -> Result<(), CodecError> {
    let ordinal = value.as_i64().ok_or_else(|| CodecError::mismatch("enum ordinal", value))?;
    let item = ctx
        .scope
        .enum_items(entity, name)?
        .into_iter()
        .find(|item| item.value == ordinal)
        .ok_or(CodecError::UnknownEnumOrdinal(ordinal))?;
    set(ctx, entity, name, PropertyValue::Enum(item.identifier))
}

fn decode_vector2(ctx: &mut DecodeContext<'_>, entity: &EntityRef, name: &str, value: &Value) -> Result<(), CodecError> {
    match expect_floats(value)?.as_slice() {
        [x, y] => set(ctx, entity, name, PropertyValue::Vector2([*x, *y])),
        _ => Err(CodecError::mismatch("two numbers", value)),
    }
}

fn decode_color_attr(ctx: &mut DecodeContext<'_>, entity: &EntityRef, name: &str, value: &Value) -> Result<(), CodecError> {
    let linear = decode_color(&expect_floats(value)?).ok_or_else(|| CodecError::mismatch("color", value))?;
    set(ctx, entity, name, PropertyValue::Color(linear))
}

fn decode_image(ctx: &mut DecodeContext<'_>, entity: &EntityRef, name: &str, value: &Value) -> Result<(), CodecError> {
    match value.as_str() {
        Some(image) if ctx.scope.has_image(image) => {
            set(ctx, entity, name, PropertyValue::Image(Some(image.to_string())))
        }
        _ => Ok(()),
    }
}

fn decode_gradation(ctx: &mut DecodeContext<'_>, entity: &EntityRef, name: &str, value: &Value) -> Result<(), CodecError> {
    match gradation::decode(value)? {
        Some(zones) => set(ctx, entity, name, PropertyValue::Gradation(zones)),
        None => Ok(()),
    }
}

fn decode_material(ctx: &mut DecodeContext<'_>, entity: &EntityRef, name: &str, value: &Value) -> Result<(), CodecError> {
    match material_name(value) {
        Some(material) if ctx.scope.has_material(material) => {
            set(ctx, entity, name, PropertyValue::Material(Some(material.to_string())))
        }
        _ => Ok(()),
    }
}

fn decode_material_list(ctx: &mut DecodeContext<'_>, entity: &EntityRef, name: &str, value: &Value) -> Result<(), CodecError> {
    let materials = expect_array(value)?
        .iter()
        .filter_map(material_name)
        .filter(|material| ctx.scope.has_material(material))
        .map(str::to_string)
        .collect();
    set(ctx, entity, name, PropertyValue::MaterialList(materials))
}

fn decode_group(ctx: &mut DecodeContext<'_>, entity: &EntityRef, name: &str, value: &Value) -> Result<(), CodecError> {
    let Some(id) = value.as_str() else {
        return Ok(());
    };
    let group = match ctx.group_ids.get(id) {
        Some(created) => Some(created.clone()),
        None => ctx.scope.has_node_group(id).then(|| id.to_string()),
    };
    match group {
        Some(group) => set(ctx, entity, name, PropertyValue::Group(Some(group))),
        None => Ok(()),
    }
}

fn decode_float_array(ctx: &mut DecodeContext<'_>, entity: &EntityRef, name: &str, value: &Value) -> Result<(), CodecError> {
    let values = expect_floats(value)?;
    set(ctx, entity, name, PropertyValue::FloatList(values))
}

fn decode_color_array(ctx: &mut DecodeContext<'_>, entity: &EntityRef, name: &str, value: &Value) -> Result<(), CodecError> {
    let colors = expect_array(value)?
        .iter()
        .map(|entry| {
            decode_color(&expect_floats(entry)?).ok_or_else(|| CodecError::mismatch("color", entry))
        })
        .collect::<Result<Vec<_>, _>>()?;
    set(ctx, entity, name, PropertyValue::ColorList(colors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use linebridge_graph::kinds::{self, BRUSH_DETAIL, BRUSH_SETTINGS, LINE, LINE_SET, TEXTURE_MAP};
    use linebridge_graph::scope::Result as SceneResult;
    use linebridge_graph::{EnumItem, GroupKind, Scene};
    use proptest::prelude::*;

    struct Fixture {
        scene: Scene,
        node_ids: IndexMap<String, EntityRef>,
        group_ids: IndexMap<String, String>,
    }

    impl Fixture {
        fn new() -> Self {
            let mut scene = Scene::new();
            scene.add_tree("Tree");
            Self {
                scene,
                node_ids: IndexMap::new(),
                group_ids: IndexMap::new(),
            }
        }

        fn node(&mut self, kind: &str, name: &str) -> EntityRef {
            self.scene.create_node("Tree", kind, name).unwrap()
        }

        fn decode(&mut self, ty: AttrType, entity: &EntityRef, name: &str, value: Value) -> Result<(), CodecError> {
            let mut ctx = DecodeContext {
                scope: &mut self.scene,
                node_ids: &self.node_ids,
                group_ids: &self.group_ids,
                scale_factor: 2.0,
            };
            (codec_for(ty).decode)(&mut ctx, entity, name, &value)
        }

        fn encode(&self, ty: AttrType, entity: &EntityRef, name: &str) -> Value {
            (codec_for(ty).encode)(&EncodeContext::new(&self.scene), entity, name)
        }
    }

    #[test]
    fn test_unit_conversions() {
        let mut fx = Fixture::new();
        let detail = fx.node(BRUSH_DETAIL, "Detail");

        fx.decode(AttrType::FloatPercentage, &detail, "stretch_random", json!(0.25)).unwrap();
        assert_eq!(fx.scene.property(&detail, "stretch_random").unwrap(), PropertyValue::Float(25.0));
        assert_eq!(fx.encode(AttrType::FloatPercentage, &detail, "stretch_random"), json!(0.25));

        fx.decode(AttrType::FloatAngle, &detail, "angle", json!(90.0)).unwrap();
        let radians = fx.scene.property(&detail, "angle").unwrap().as_float().unwrap();
        assert_abs_diff_eq!(radians, std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
        assert_abs_diff_eq!(
            fx.encode(AttrType::FloatAngle, &detail, "angle").as_f64().unwrap(),
            90.0,
            epsilon = 1e-9
        );

        let reduction = fx.node(kinds::REDUCTION_SETTINGS, "Reduction");
        fx.decode(AttrType::FloatWithScale, &reduction, "reduction_end", json!(3.0)).unwrap();
        assert_eq!(fx.scene.property(&reduction, "reduction_end").unwrap(), PropertyValue::Float(6.0));
        // Export writes the native value unscaled
        assert_eq!(fx.encode(AttrType::FloatWithScale, &reduction, "reduction_end"), json!(6.0));
    }

    #[test]
    fn test_enum_ordinals() {
        let mut fx = Fixture::new();
        let detail = fx.node(BRUSH_DETAIL, "Detail");
        fx.decode(AttrType::Enum, &detail, "brush_type", json!(2)).unwrap();
        assert_eq!(fx.scene.property(&detail, "brush_type").unwrap(), PropertyValue::Enum("SIMPLE".into()));
        assert_eq!(fx.encode(AttrType::Enum, &detail, "brush_type"), json!(2));
        assert!(matches!(
            fx.decode(AttrType::Enum, &detail, "brush_type", json!(7)),
            Err(CodecError::UnknownEnumOrdinal(7))
        ));
        assert!(fx.decode(AttrType::Enum, &detail, "brush_type", json!("SIMPLE")).is_err());
    }

    #[test]
    fn test_references_resolve_through_id_map() {
        let mut fx = Fixture::new();
        let line = fx.node(LINE, "Line");
        let line_set = fx.node(LINE_SET, "Set");
        let brush = fx.node(BRUSH_SETTINGS, "Brush");
        fx.node_ids.insert("doc/Set".into(), line_set.clone());
        fx.node_ids.insert("doc/Brush".into(), brush.clone());

        fx.decode(AttrType::NodeList, &line, "line_sets", json!(["doc/Set", "doc/Missing"])).unwrap();
        fx.decode(AttrType::Node, &line_set, "v_brush_settings", json!("doc/Brush")).unwrap();
        // Names are never used for resolution
        fx.decode(AttrType::Node, &line_set, "h_brush_settings", json!("Tree/Brush")).unwrap();
        fx.decode(AttrType::Node, &line_set, "v_outline_brush_settings", Value::Null).unwrap();

        assert_eq!(fx.encode(AttrType::NodeList, &line, "line_sets"), json!(["Tree/Set"]));
        assert_eq!(fx.encode(AttrType::Node, &line_set, "v_brush_settings"), json!("Tree/Brush"));
        assert_eq!(fx.encode(AttrType::Node, &line_set, "h_brush_settings"), Value::Null);
    }

    #[test]
    fn test_bool_list_padding() {
        let mut fx = Fixture::new();
        let material = fx.scene.create_material("Mat");
        fx.scene.init_pencil_material(&material, 2).unwrap();
        let entity = EntityRef::Material(material);
        let name = "pcl4mtl_grad_light_color_ids";

        fx.scene
            .set_property(&entity, name, PropertyValue::BoolList(vec![true, false, true]))
            .unwrap();
        assert_eq!(
            fx.encode(AttrType::BoolList8, &entity, name),
            json!([true, false, true, false, false, false, false, false])
        );

        // Import pads or truncates to the list's current length
        fx.decode(AttrType::BoolList8, &entity, name, json!([true, true, true, true, true])).unwrap();
        assert_eq!(
            fx.scene.property(&entity, name).unwrap(),
            PropertyValue::BoolList(vec![true, true, true])
        );
        fx.decode(AttrType::BoolList8, &entity, name, json!([false])).unwrap();
        assert_eq!(
            fx.scene.property(&entity, name).unwrap(),
            PropertyValue::BoolList(vec![false, false, false])
        );
    }

    #[test]
    fn test_named_lookups_drop_unknown_names() {
        let mut fx = Fixture::new();
        fx.scene.add_object("Cube");
        fx.scene.add_image("paper.png");
        fx.scene.create_material("Skin");
        let line_set = fx.node(LINE_SET, "Set");
        let texture = fx.node(TEXTURE_MAP, "Texture");

        fx.decode(AttrType::ObjectList, &line_set, "objects", json!(["Cube", "Sphere"])).unwrap();
        fx.decode(
            AttrType::MaterialList,
            &line_set,
            "materials",
            json!([{"Name": "Skin", "Id": null, "MaterialType": "Other"}, {"Name": "Gone"}]),
        )
        .unwrap();
        fx.decode(AttrType::Image, &texture, "image", json!("missing.png")).unwrap();
        assert_eq!(fx.scene.property(&texture, "image").unwrap(), PropertyValue::Image(None));
        fx.decode(AttrType::Image, &texture, "image", json!("paper.png")).unwrap();

        assert_eq!(fx.encode(AttrType::ObjectList, &line_set, "objects"), json!(["Cube"]));
        assert_eq!(
            fx.encode(AttrType::MaterialList, &line_set, "materials"),
            json!([{"Name": "Skin", "Id": null, "MaterialType": "Other"}])
        );
        assert_eq!(fx.encode(AttrType::Image, &texture, "image"), json!("paper.png"));
    }

    #[test]
    fn test_curve_prefers_native_points() {
        let mut fx = Fixture::new();
        let reduction = fx.node(kinds::REDUCTION_SETTINGS, "Reduction");
        let wire = json!({
            "BlenderCurveKeys": [[0.0, 1.0, "VECTOR"], [1.0, 0.0, "VECTOR"]],
            "UniversalKeys": [[0.0, 0.0], [1.0, 1.0]]
        });
        fx.decode(AttrType::Curve, &reduction, "curve", wire).unwrap();

        let encoded = fx.encode(AttrType::Curve, &reduction, "curve");
        assert_eq!(encoded["BlenderCurveKeys"], json!([[0.0, 1.0, "VECTOR"], [1.0, 0.0, "VECTOR"]]));
        let samples = encoded["UniversalKeys"].as_array().unwrap();
        assert_eq!(samples.len(), 9);
        assert_eq!(samples[2], json!([0.25, 0.75]));

        // A single point leaves the curve untouched
        fx.decode(AttrType::Curve, &reduction, "curve", json!({"BlenderCurveKeys": [[0.5, 0.5]]})).unwrap();
        assert_eq!(fx.scene.curve_points(&reduction, "curve").unwrap().len(), 2);
        assert_eq!(fx.scene.curve_points(&reduction, "curve").unwrap()[0].location, [0.0, 1.0]);
    }

    /// Scene whose host evaluates every curve to a flat 0.5
    struct FlatSampler(Scene);

    impl Scope for FlatSampler {
        fn trees(&self) -> Vec<String> {
            self.0.trees()
        }
        fn nodes(&self, tree: &str) -> Vec<EntityRef> {
            self.0.nodes(tree)
        }
        fn materials(&self) -> Vec<String> {
            self.0.materials()
        }
        fn is_pencil_material(&self, material: &str) -> bool {
            self.0.is_pencil_material(material)
        }
        fn line_functions_of(&self, material: &str) -> Option<EntityRef> {
            self.0.line_functions_of(material)
        }
        fn node_groups(&self, kind: GroupKind) -> Vec<String> {
            self.0.node_groups(kind)
        }
        fn ensure_tree(&mut self, tree: &str) {
            self.0.ensure_tree(tree)
        }
        fn native_kind(&self, entity: &EntityRef) -> Option<String> {
            self.0.native_kind(entity)
        }
        fn location(&self, entity: &EntityRef) -> Option<[f64; 2]> {
            self.0.location(entity)
        }
        fn set_location(&mut self, entity: &EntityRef, location: [f64; 2]) -> SceneResult<()> {
            self.0.set_location(entity, location)
        }
        fn property(&self, entity: &EntityRef, name: &str) -> SceneResult<PropertyValue> {
            self.0.property(entity, name)
        }
        fn set_property(&mut self, entity: &EntityRef, name: &str, value: PropertyValue) -> SceneResult<()> {
            self.0.set_property(entity, name, value)
        }
        fn enum_items(&self, entity: &EntityRef, name: &str) -> SceneResult<Vec<EnumItem>> {
            self.0.enum_items(entity, name)
        }
        fn input_sockets(&self, entity: &EntityRef) -> Vec<String> {
            self.0.input_sockets(entity)
        }
        fn linked_nodes(&self, entity: &EntityRef, socket: &str) -> SceneResult<Vec<EntityRef>> {
            self.0.linked_nodes(entity, socket)
        }
        fn link(&mut self, parent: &EntityRef, socket: &str, child: &EntityRef) -> SceneResult<()> {
            self.0.link(parent, socket, child)
        }
        fn create_node(&mut self, tree: &str, kind: &str, name: &str) -> SceneResult<EntityRef> {
            self.0.create_node(tree, kind, name)
        }
        fn create_material(&mut self, name: &str) -> String {
            self.0.create_material(name)
        }
        fn init_pencil_material(&mut self, material: &str, zone_count: usize) -> SceneResult<()> {
            self.0.init_pencil_material(material, zone_count)
        }
        fn create_line_functions(&mut self, material: &str, name: &str) -> SceneResult<EntityRef> {
            self.0.create_line_functions(material, name)
        }
        fn create_node_group(&mut self, name: &str, kind: GroupKind) -> EntityRef {
            self.0.create_node_group(name, kind)
        }
        fn delete_if_unused(&mut self, entity: &EntityRef) -> bool {
            self.0.delete_if_unused(entity)
        }
        fn has_object(&self, name: &str) -> bool {
            self.0.has_object(name)
        }
        fn has_material(&self, name: &str) -> bool {
            self.0.has_material(name)
        }
        fn has_image(&self, name: &str) -> bool {
            self.0.has_image(name)
        }
        fn has_node_group(&self, name: &str) -> bool {
            self.0.has_node_group(name)
        }
        fn sample_curve(&self, _: &EntityRef, _: &str, count: usize) -> SceneResult<Vec<f64>> {
            Ok(vec![0.5; count])
        }
    }

    #[test]
    fn test_curve_samples_come_from_host_unless_overridden() {
        let mut fx = Fixture::new();
        let reduction = fx.node(kinds::REDUCTION_SETTINGS, "Reduction");
        let host = FlatSampler(fx.scene);
        let unrelated = |_: &EntityRef, name: &str| (name == "reduction_end").then_some(PropertyValue::Float(1.0));
        let ctx = EncodeContext {
            scope: &host,
            overrides: Some(&unrelated),
        };
        let encoded = (codec_for(AttrType::Curve).encode)(&ctx, &reduction, "curve");
        assert_eq!(encoded["UniversalKeys"][0], json!([0.0, 0.5]));

        let flat = vec![
            CurvePoint {
                location: [0.0, 1.0],
                handle: HandleType::Vector,
            },
            CurvePoint {
                location: [1.0, 1.0],
                handle: HandleType::Vector,
            },
        ];
        let curve_override = |_: &EntityRef, name: &str| (name == "curve").then(|| PropertyValue::Curve(flat.clone()));
        let ctx = EncodeContext {
            scope: &host,
            overrides: Some(&curve_override),
        };
        let encoded = (codec_for(AttrType::Curve).encode)(&ctx, &reduction, "curve");
        assert_eq!(encoded["UniversalKeys"][0], json!([0.0, 1.0]));
    }

    #[test]
    fn test_groups_resolve_created_then_existing() {
        let mut fx = Fixture::new();
        let material = fx.scene.create_material("Mat");
        fx.scene.init_pencil_material(&material, 2).unwrap();
        let entity = EntityRef::Material(material);
        fx.scene.create_node_group("Existing", linebridge_graph::GroupKind::Color);
        fx.group_ids.insert("Positions".into(), "Positions.001".into());

        fx.decode(AttrType::PositionGroup, &entity, "pcl4mtl_position_group", json!("Positions")).unwrap();
        fx.decode(AttrType::ColorGroup, &entity, "pcl4mtl_color_group", json!("Existing")).unwrap();
        assert_eq!(fx.encode(AttrType::PositionGroup, &entity, "pcl4mtl_position_group"), json!("Positions.001"));
        assert_eq!(fx.encode(AttrType::ColorGroup, &entity, "pcl4mtl_color_group"), json!("Existing"));
    }

    #[test]
    fn test_override_is_consulted_first() {
        let mut fx = Fixture::new();
        let brush = fx.node(BRUSH_SETTINGS, "Brush");
        let lookup = |_: &EntityRef, name: &str| (name == "size").then_some(PropertyValue::Float(9.0));
        let ctx = EncodeContext {
            scope: &fx.scene,
            overrides: Some(&lookup),
        };
        assert_eq!((codec_for(AttrType::Float).encode)(&ctx, &brush, "size"), json!(9.0));
        assert_eq!((codec_for(AttrType::Float).encode)(&ctx, &brush, "blend_amount"), json!(1.0));
        assert_eq!((codec_for(AttrType::NotImplemented).encode)(&ctx, &brush, ""), Value::Null);
    }

    #[test]
    fn test_shape_errors() {
        let mut fx = Fixture::new();
        let brush = fx.node(BRUSH_SETTINGS, "Brush");
        assert!(fx.decode(AttrType::Float, &brush, "size", json!("big")).is_err());
        assert!(fx.decode(AttrType::Color, &brush, "brush_color", json!([1.0, 0.5])).is_err());
        assert!(fx.decode(AttrType::Float, &brush, "no_such_property", json!(1.0)).is_err());
        assert!(fx.decode(AttrType::NotImplemented, &brush, "", json!({"any": "thing"})).is_ok());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            failure_persistence: None,
            ..ProptestConfig::default()
        })]

        #[test]
        fn percentage_and_angle_round_trip(native in -1000.0f64..1000.0) {
            let mut fx = Fixture::new();
            let detail = fx.node(BRUSH_DETAIL, "Detail");
            fx.scene.set_property(&detail, "size_random", PropertyValue::Float(native)).unwrap();
            fx.scene.set_property(&detail, "angle", PropertyValue::Float(native)).unwrap();

            for (ty, name) in [(AttrType::FloatPercentage, "size_random"), (AttrType::FloatAngle, "angle")] {
                let wire = fx.encode(ty, &detail, name);
                fx.decode(ty, &detail, name, wire).unwrap();
                let back = fx.scene.property(&detail, name).unwrap().as_float().unwrap();
                prop_assert!((back - native).abs() < 1e-6);
            }
        }

        #[test]
        fn color_round_trip(r in 0.0f64..=1.0, g in 0.0f64..=1.0, b in 0.0f64..=1.0) {
            let mut fx = Fixture::new();
            let brush = fx.node(BRUSH_SETTINGS, "Brush");
            fx.scene.set_property(&brush, "brush_color", PropertyValue::Color([r, g, b])).unwrap();
            let wire = fx.encode(AttrType::Color, &brush, "brush_color");
            prop_assert_eq!(wire[3].as_f64(), Some(1.0));
            fx.decode(AttrType::Color, &brush, "brush_color", wire).unwrap();
            let back = fx.scene.property(&brush, "brush_color").unwrap().as_color().unwrap();
            for (x, y) in back.iter().zip([r, g, b]) {
                prop_assert!((x - y).abs() < 1e-4);
            }
        }
    }
}
