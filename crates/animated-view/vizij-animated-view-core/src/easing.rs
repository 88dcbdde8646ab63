//! Easing curves for channel timing.
//!
//! Mirrors the usual UI toolkit set: the cubic-bezier family (solved by
//! bisection on the x polynomial), polynomial and sine primitives, stepped
//! timing, and the `out` / `in_out` wrappers that reflect another curve.

use std::f64::consts::PI;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ViewError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Easing {
    /// No easing.
    Linear,
    /// Toolkit `ease`: `bezier(0.42, 0, 1, 1)`.
    Ease,
    /// `t²`
    Quad,
    /// `t³`
    Cubic,
    /// `1 - cos(tπ/2)`
    Sin,
    /// Custom cubic bezier with control points (x1, y1) and (x2, y2).
    Bezier { x1: f64, y1: f64, x2: f64, y2: f64 },
    /// Discrete jumps at the end of each of `count` intervals.
    Steps { count: u32 },
    /// Runs `inner` backwards: `1 - inner(1 - t)`.
    Out { inner: Box<Easing> },
    /// First half `inner`, second half mirrored.
    InOut { inner: Box<Easing> },
}

impl Default for Easing {
    fn default() -> Self {
        Self::in_out(Self::Ease)
    }
}

impl Easing {
    pub fn bezier(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::Bezier {
            x1: x1.clamp(0.0, 1.0),
            y1,
            x2: x2.clamp(0.0, 1.0),
            y2,
        }
    }

    pub fn out(inner: Easing) -> Self {
        Self::Out {
            inner: Box::new(inner),
        }
    }

    pub fn in_out(inner: Easing) -> Self {
        Self::InOut {
            inner: Box::new(inner),
        }
    }

    /// Map linear progress `t` (clamped to `[0,1]`) to eased progress.
    /// Bezier curves with y outside `[0,1]` may overshoot.
    pub fn evaluate(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Ease => bezier_ease(t, 0.42, 0.0, 1.0, 1.0),
            Self::Quad => t * t,
            Self::Cubic => t * t * t,
            Self::Sin => 1.0 - (t * PI / 2.0).cos(),
            Self::Bezier { x1, y1, x2, y2 } => bezier_ease(t, *x1, *y1, *x2, *y2),
            Self::Steps { count } => {
                if *count == 0 {
                    return t;
                }
                let n = *count as f64;
                ((t * n).floor() / n).min(1.0)
            }
            Self::Out { inner } => 1.0 - inner.evaluate(1.0 - t),
            Self::InOut { inner } => {
                if t < 0.5 {
                    inner.evaluate(t * 2.0) / 2.0
                } else {
                    1.0 - inner.evaluate((1.0 - t) * 2.0) / 2.0
                }
            }
        }
    }

    /// Resolve a CSS-style timing keyword.
    pub fn from_name(name: &str) -> Result<Self, ViewError> {
        match name.trim() {
            "linear" => Ok(Self::Linear),
            "ease" => Ok(Self::Ease),
            "ease-in" => Ok(Self::bezier(0.42, 0.0, 1.0, 1.0)),
            "ease-out" => Ok(Self::bezier(0.0, 0.0, 0.58, 1.0)),
            "ease-in-out" => Ok(Self::bezier(0.42, 0.0, 0.58, 1.0)),
            "quad" => Ok(Self::Quad),
            "cubic" => Ok(Self::Cubic),
            "sin" => Ok(Self::Sin),
            other => Err(ViewError::UnknownEasing {
                name: other.to_string(),
            }),
        }
    }
}

impl FromStr for Easing {
    type Err = ViewError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Easing::from_name(s)
    }
}

/// Cubic Bezier basis with fixed endpoints 0 and 1.
#[inline]
fn cubic_bezier(p1: f64, p2: f64, t: f64) -> f64 {
    let u = 1.0 - t;
    3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t
}

/// Invert the x polynomial by bisection, then evaluate y.
fn bezier_ease(t: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    if x1 == y1 && x2 == y2 {
        return t;
    }
    let mut lo = 0.0f64;
    let mut hi = 1.0f64;
    let mut mid = t;
    for _ in 0..48 {
        let x = cubic_bezier(x1, x2, mid);
        if (x - t).abs() < 1e-9 {
            break;
        }
        if x < t {
            lo = mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
    }
    cubic_bezier(y1, y2, mid)
}
