// SPDX-License-Identifier: MIT OR Apache-2.0
//! Legacy `TextureUV` field of texture map records.
//!
//! Older readers only know a single ordinal: `0` for screen space, `1..=4`
//! for the n-th object UV set. Export derives it from the extended fields;
//! import maps it back when the extended field is absent.

use linebridge_graph::{EntityRef, PropertyValue, Scope, SceneError};
use serde_json::{Map, Value};

/// Legacy parameter key
pub const TEXTURE_UV: &str = "TextureUV";

const EXTENDED_TEXTURE_UV: &str = "ExtendedTextureUV";
const MAX_TEXTURE_UV: i64 = 4;

/// Add `TextureUV` to the encoded parameters of a texture map
pub fn add_texture_uv(params: &mut Map<String, Value>) {
    let int = |key: &str| params.get(key).and_then(Value::as_i64);
    let texture_uv = match (int(EXTENDED_TEXTURE_UV), int("UVSelectionMode"), int("UVIndex")) {
        (Some(0), _, _) => 0,
        (_, Some(1), _) => 1,
        (_, _, Some(index)) => (index + 1).clamp(1, MAX_TEXTURE_UV),
        _ => 1,
    };
    params.insert(TEXTURE_UV.to_string(), Value::from(texture_uv));
}

/// Apply a legacy `TextureUV` to a texture map node. Returns whether the
/// field was used.
pub fn apply_texture_uv(
    scope: &mut dyn Scope,
    entity: &EntityRef,
    params: &Map<String, Value>,
) -> Result<bool, SceneError> {
    if params.contains_key(EXTENDED_TEXTURE_UV) {
        return Ok(false);
    }
    let Some(texture_uv) = params.get(TEXTURE_UV).and_then(Value::as_i64) else {
        return Ok(false);
    };

    let token = |t: &str| PropertyValue::Enum(t.to_string());
    if texture_uv == 0 {
        scope.set_property(entity, "uv_source", token("SCREEN"))?;
    } else {
        scope.set_property(entity, "uv_source", token("OBJECTUV"))?;
        scope.set_property(entity, "uv_selection_mode", token("INDEX"))?;
        scope.set_property(entity, "uv_index", PropertyValue::Int(texture_uv - 1))?;
    }
    Ok(true)
}
