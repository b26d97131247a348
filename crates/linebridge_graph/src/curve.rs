// SPDX-License-Identifier: MIT OR Apache-2.0
//! Curve mappings used by reduction and brush detail settings.

use serde::{Deserialize, Serialize};

/// Handle type of a curve control point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum HandleType {
    /// Smooth, overshooting allowed
    #[default]
    Auto,
    /// Smooth, flattened at extremes
    AutoClamped,
    /// Straight segments
    Vector,
}

impl HandleType {
    /// Token used in interchange documents
    pub fn as_str(&self) -> &'static str {
        match self {
            HandleType::Auto => "AUTO",
            HandleType::AutoClamped => "AUTO_CLAMPED",
            HandleType::Vector => "VECTOR",
        }
    }

    /// Parse a document token; unknown tokens fall back to `Auto`
    pub fn from_token(token: &str) -> Self {
        match token {
            "AUTO_CLAMPED" => HandleType::AutoClamped,
            "VECTOR" => HandleType::Vector,
            _ => HandleType::Auto,
        }
    }
}

/// A control point of a curve mapping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// (x, y) location
    pub location: [f64; 2],
    /// Handle type
    pub handle: HandleType,
}

impl CurvePoint {
    /// Create a new auto-handle point
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            location: [x, y],
            handle: HandleType::Auto,
        }
    }

    /// Set the handle type
    pub fn with_handle(mut self, handle: HandleType) -> Self {
        self.handle = handle;
        self
    }
}

/// Default mapping: a straight ramp from (0, 0) to (1, 1)
pub fn linear_points() -> Vec<CurvePoint> {
    vec![
        CurvePoint::new(0.0, 0.0).with_handle(HandleType::Vector),
        CurvePoint::new(1.0, 1.0).with_handle(HandleType::Vector),
    ]
}

/// Evaluate a curve at `x`. Points must be sorted by x.
pub fn evaluate(points: &[CurvePoint], x: f64) -> f64 {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return 0.0;
    };
    if x <= first.location[0] {
        return first.location[1];
    }
    if x >= last.location[0] {
        return last.location[1];
    }

    let Some(i) = points.windows(2).position(|w| x < w[1].location[0]) else {
        return last.location[1];
    };
    let (p0, p1) = (&points[i], &points[i + 1]);
    let dx = p1.location[0] - p0.location[0];
    if dx <= f64::EPSILON {
        return p1.location[1];
    }
    let t = (x - p0.location[0]) / dx;

    if p0.handle == HandleType::Vector && p1.handle == HandleType::Vector {
        return lerp(p0.location[1], p1.location[1], t);
    }

    let m0 = tangent(points, i) * dx;
    let m1 = tangent(points, i + 1) * dx;
    hermite(p0.location[1], m0, p1.location[1], m1, t)
}

/// Sample a curve at `count` evenly spaced positions over [0, 1]
pub fn sample(points: &[CurvePoint], count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![evaluate(points, 0.0)],
        _ => (0..count)
            .map(|i| evaluate(points, i as f64 / (count - 1) as f64))
            .collect(),
    }
}

/// Linear interpolation between two floats
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Hermite spline interpolation
fn hermite(p0: f64, m0: f64, p1: f64, m1: f64, t: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;

    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;

    h00 * p0 + h10 * m0 + h01 * p1 + h11 * m1
}

/// Slope at point `i` from its neighbours
fn tangent(points: &[CurvePoint], i: usize) -> f64 {
    let point = &points[i];
    if point.handle == HandleType::Vector {
        // Straight handle: follow the adjacent segment
        let (a, b) = if i + 1 < points.len() { (i, i + 1) } else { (i.saturating_sub(1), i) };
        return slope(&points[a], &points[b]);
    }
    let prev = i.checked_sub(1).map(|j| &points[j]);
    let next = points.get(i + 1);
    let m = match (prev, next) {
        (Some(p), Some(n)) => slope(p, n),
        (Some(p), None) => slope(p, point),
        (None, Some(n)) => slope(point, n),
        (None, None) => 0.0,
    };
    if point.handle == HandleType::AutoClamped {
        if let (Some(p), Some(n)) = (prev, next) {
            let y = point.location[1];
            let is_extreme = (y >= p.location[1] && y >= n.location[1])
                || (y <= p.location[1] && y <= n.location[1]);
            if is_extreme {
                return 0.0;
            }
        }
    }
    m
}

fn slope(a: &CurvePoint, b: &CurvePoint) -> f64 {
    let dx = b.location[0] - a.location[0];
    if dx.abs() <= f64::EPSILON {
        0.0
    } else {
        (b.location[1] - a.location[1]) / dx
    }
}
