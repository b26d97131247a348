// SPDX-License-Identifier: MIT OR Apache-2.0
//! sRGB transfer functions.
//!
//! The thresholds are the ones the line renderer has always written; they
//! differ slightly from the textbook values and must stay as they are for
//! documents to round-trip between hosts.

/// Encoded values at or below this are on the linear segment
pub const SRGB_LINEAR_THRESHOLD: f64 = 0.040448;

/// Linear values at or below this are on the linear segment
pub const LINEAR_SRGB_THRESHOLD: f64 = 0.003231;

/// Convert one sRGB-encoded channel to linear light
pub fn srgb_to_linear(x: f64) -> f64 {
    if x <= SRGB_LINEAR_THRESHOLD {
        x / 12.92
    } else {
        ((x + 0.055) / 1.055).powf(2.4)
    }
}

/// Convert one linear channel to sRGB encoding
pub fn linear_to_srgb(x: f64) -> f64 {
    if x > LINEAR_SRGB_THRESHOLD {
        1.055 * x.powf(1.0 / 2.4) - 0.055
    } else {
        12.92 * x
    }
}

/// Linear triple to an opaque sRGB quadruple
pub fn encode_color(linear: [f64; 3]) -> [f64; 4] {
    [
        linear_to_srgb(linear[0]),
        linear_to_srgb(linear[1]),
        linear_to_srgb(linear[2]),
        1.0,
    ]
}

/// sRGB channels (alpha ignored) to a linear triple
pub fn decode_color(srgb: &[f64]) -> Option<[f64; 3]> {
    match srgb {
        [r, g, b, ..] => Some([srgb_to_linear(*r), srgb_to_linear(*g), srgb_to_linear(*b)]),
        _ => None,
    }
}
