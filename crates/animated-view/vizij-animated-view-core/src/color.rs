//! Color parsing and blending for color-valued channels.
//!
//! Parsing goes through `csscolorparser`, which covers hex, the functional
//! notations, `transparent` and the CSS named colors. `gradual_change` blends
//! two such strings and always answers in `rgba(r,g,b,a)` notation.

use std::str::FromStr;

use csscolorparser::Color as CssColor;
use serde::{Deserialize, Serialize};

/// sRGB color with 0–255 channels and 0–1 alpha.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Channels rounded the way an `rgb()/rgba()` string would carry them.
    fn rounded(self) -> Self {
        Self {
            r: self.r.round(),
            g: self.g.round(),
            b: self.b.round(),
            a: (self.a * 100.0).round() / 100.0,
        }
    }
}

/// Parse a color string. Returns `None` for anything unrecognized.
///
/// Bare hex digits without a leading `#` are not colors here, so words like
/// `"add"` or numbers like `"123"` stay text.
pub fn parse_color(s: &str) -> Option<Rgba> {
    let s = s.trim();
    if s.is_empty() || s.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let c = CssColor::from_str(s).ok()?;
    let channel = |v: f64| (v * 255.0).round().clamp(0.0, 255.0);
    Some(Rgba::new(channel(c.r), channel(c.g), channel(c.b), c.a.clamp(0.0, 1.0)))
}

/// Blend `from` toward `to` by `scale` (0–1) and format as `rgba(r,g,b,a)`.
///
/// Channels are rounded to integers and alpha to two decimals, e.g.
/// `gradual_change("#000000", "#ffffff", 0.5) == "rgba(128,128,128,1.00)"`.
pub fn gradual_change(from: &str, to: &str, scale: f64) -> String {
    let a = parse_or_black(from).rounded();
    let b = parse_or_black(to).rounded();
    let lerp = |x: f64, y: f64| x + (y - x) * scale;
    let channel = |x: f64, y: f64| lerp(x, y).round() as i64;
    let alpha = (lerp(a.a, b.a) * 100.0).round() / 100.0;
    format!(
        "rgba({},{},{},{:.2})",
        channel(a.r, b.r),
        channel(a.g, b.g),
        channel(a.b, b.b),
        alpha
    )
}

fn parse_or_black(s: &str) -> Rgba {
    parse_color(s).unwrap_or_else(|| {
        log::warn!("unrecognized color '{s}', blending from black");
        Rgba::BLACK
    })
}
