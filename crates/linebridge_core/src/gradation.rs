// SPDX-License-Identifier: MIT OR Apache-2.0
//! Conversion between fixed-zone and keypoint gradation ramps.
//!
//! Pencil materials store a fixed number of zones, each covering
//! `[pos_min, pos_max]`. Other hosts store a list of keypoints where a
//! `None` keypoint starts a flat zone and a `Smooth` keypoint marks a
//! single position. Documents carry both forms.

use crate::color::{decode_color, encode_color};
use crate::error::CodecError;
use linebridge_graph::GradationZone;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a keypoint blends into the next one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Interpolation {
    /// Flat until the next keypoint
    None,
    /// Single position
    Smooth,
}

impl TryFrom<String> for Interpolation {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.eq_ignore_ascii_case("none") {
            Ok(Self::None)
        } else if value.eq_ignore_ascii_case("smooth") {
            Ok(Self::Smooth)
        } else {
            Err(format!("unknown interpolation '{value}'"))
        }
    }
}

impl From<Interpolation> for String {
    fn from(value: Interpolation) -> Self {
        match value {
            Interpolation::None => "None",
            Interpolation::Smooth => "SMOOTH",
        }
        .to_string()
    }
}

/// A keypoint of a variable-length ramp
#[derive(Debug, Clone, PartialEq)]
pub struct Keypoint {
    /// Position in [0, 1]
    pub position: f64,
    /// Interpolation towards the next keypoint
    pub interpolation: Interpolation,
    /// Linear-light color
    pub color: [f64; 3],
    /// Whether the color is applied
    pub enabled: bool,
    /// Blend amount of the color
    pub blend_amount: f64,
}

impl Keypoint {
    fn from_zone(zone: &GradationZone, position: f64, interpolation: Interpolation) -> Self {
        Self {
            position,
            interpolation,
            color: zone.color,
            enabled: zone.color_enabled,
            blend_amount: zone.blend_amount,
        }
    }

    fn same_attributes(&self, other: &Keypoint) -> bool {
        self.color == other.color
            && self.enabled == other.enabled
            && self.blend_amount == other.blend_amount
    }
}

/// Fixed zones to keypoints
pub fn to_universal(zones: &[GradationZone]) -> Vec<Keypoint> {
    let mut keypoints = Vec::new();
    for (i, zone) in zones.iter().enumerate() {
        if zone.pos_min != zone.pos_max {
            keypoints.push(Keypoint::from_zone(zone, zone.pos_min, Interpolation::None));
        }
        // A point zone, or a gap before the next zone, closes with a smooth key
        let gap_follows = zones.get(i + 1).is_some_and(|next| zone.pos_max < next.pos_min);
        if zone.pos_min == zone.pos_max || gap_follows {
            keypoints.push(Keypoint::from_zone(zone, zone.pos_max, Interpolation::Smooth));
        }
    }
    keypoints
}

/// Keypoints to fixed zones. The first zone starts at 0 and the last ends
/// at 1; zone ids are assigned in order.
pub fn to_fixed(keypoints: &[Keypoint]) -> Vec<GradationZone> {
    let mut sorted = keypoints.to_vec();
    sorted.sort_by(|a, b| a.position.total_cmp(&b.position));

    let mut zones = Vec::new();
    let mut i = 0;
    while i < sorted.len() {
        let key = &sorted[i];
        let (pos_max, consumed) = match key.interpolation {
            Interpolation::None => match sorted.get(i + 1) {
                Some(next) if next.interpolation == Interpolation::Smooth && key.same_attributes(next) => {
                    (next.position, 2)
                }
                Some(next) => (next.position, 1),
                None => (1.0, 1),
            },
            Interpolation::Smooth => (key.position, 1),
        };
        zones.push(GradationZone {
            zone_id: zones.len() as i64,
            pos_min: key.position,
            pos_max,
            color_enabled: key.enabled,
            color: key.color,
            blend_amount: key.blend_amount,
        });
        i += consumed;
    }

    if let Some(first) = zones.first_mut() {
        first.pos_min = 0.0;
    }
    if let Some(last) = zones.last_mut() {
        last.pos_max = 1.0;
    }
    zones
}

fn white() -> Vec<f64> {
    vec![1.0, 1.0, 1.0, 1.0]
}

fn one() -> f64 {
    1.0
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireZone {
    #[serde(default)]
    zone_id: i64,
    pos_min: f64,
    pos_max: f64,
    #[serde(default)]
    enable: bool,
    #[serde(default = "white")]
    color: Vec<f64>,
    #[serde(default)]
    map_opacity: Value,
    #[serde(default)]
    color_map: Value,
    #[serde(default)]
    color_map_on: Value,
    #[serde(default)]
    blend_mode: Value,
    #[serde(default = "one")]
    blend_amount: f64,
    #[serde(default)]
    stroke_enable: Value,
    #[serde(default)]
    stroke: Value,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireKeypoint {
    position: f64,
    interpolation: Interpolation,
    #[serde(default = "white")]
    color: Vec<f64>,
    #[serde(default)]
    enable: bool,
    #[serde(default = "one")]
    blend_amount: f64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct WireGradation {
    #[serde(rename = "MaxGradation", default)]
    max: Option<Vec<WireZone>>,
    #[serde(rename = "UniversalGradation", default)]
    universal: Option<Vec<WireKeypoint>>,
}

/// Both wire representations of a zone list
pub fn encode(zones: &[GradationZone]) -> Value {
    let max = zones
        .iter()
        .map(|zone| WireZone {
            zone_id: zone.zone_id,
            pos_min: zone.pos_min,
            pos_max: zone.pos_max,
            enable: zone.color_enabled,
            color: encode_color(zone.color).to_vec(),
            map_opacity: Value::Null,
            color_map: Value::Null,
            color_map_on: Value::Null,
            blend_mode: Value::Null,
            blend_amount: zone.blend_amount,
            stroke_enable: Value::Null,
            stroke: Value::Null,
        })
        .collect();
    let universal = to_universal(zones)
        .into_iter()
        .map(|key| WireKeypoint {
            position: key.position,
            interpolation: key.interpolation,
            color: encode_color(key.color).to_vec(),
            enable: key.enabled,
            blend_amount: key.blend_amount,
        })
        .collect();
    serde_json::to_value(WireGradation {
        max: Some(max),
        universal: Some(universal),
    })
    .unwrap_or(Value::Null)
}

/// Zones from a wire gradation, preferring the fixed-zone form. `None`
/// when the value carries no zones.
pub fn decode(value: &Value) -> Result<Option<Vec<GradationZone>>, CodecError> {
    if value.is_null() {
        return Ok(None);
    }
    let wire: WireGradation =
        serde_json::from_value(value.clone()).map_err(|_| CodecError::mismatch("gradation", value))?;

    if let Some(max) = wire.max.filter(|zones| !zones.is_empty()) {
        let zones = max
            .into_iter()
            .map(|zone| {
                Ok(GradationZone {
                    zone_id: zone.zone_id,
                    pos_min: zone.pos_min,
                    pos_max: zone.pos_max,
                    color_enabled: zone.enable,
                    color: wire_color(&zone.color, value)?,
                    blend_amount: zone.blend_amount,
                })
            })
            .collect::<Result<Vec<_>, CodecError>>()?;
        return Ok(Some(zones));
    }

    if let Some(universal) = wire.universal.filter(|keys| !keys.is_empty()) {
        let keypoints = universal
            .into_iter()
            .map(|key| {
                Ok(Keypoint {
                    position: key.position,
                    interpolation: key.interpolation,
                    color: wire_color(&key.color, value)?,
                    enabled: key.enable,
                    blend_amount: key.blend_amount,
                })
            })
            .collect::<Result<Vec<_>, CodecError>>()?;
        return Ok(Some(to_fixed(&keypoints)));
    }

    Ok(None)
}

/// Number of zones a wire gradation describes
pub fn zone_count(value: &Value) -> Option<usize> {
    decode(value).ok().flatten().map(|zones| zones.len())
}

fn wire_color(channels: &[f64], context: &Value) -> Result<[f64; 3], CodecError> {
    decode_color(channels).ok_or_else(|| CodecError::mismatch("color", context))
}
