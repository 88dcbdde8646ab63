//! Typed style values carried by channel ranges.
//!
//! Style sheets hand us loose JSON: plain numbers, angle strings (`"45deg"`,
//! `"1rad"`), color strings, or anything else. `StyleValue` classifies a leaf
//! once so interpolation can dispatch on the pair of endpoint kinds.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::color::{gradual_change, parse_color};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum StyleValue {
    Number(f64),
    /// Angle in degrees; renders as `"{deg}deg"`.
    Angle(f64),
    /// Any string `parse_color` accepts.
    Color(String),
    /// Anything else. Only steps, never blends.
    Text(String),
}

impl StyleValue {
    /// Classify a JSON style leaf. Radian strings are converted to degrees first.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Number(n) => Self::Number(n.as_f64().unwrap_or(0.0)),
            Value::String(s) => Self::from_text(&rad_to_deg(s)),
            other => Self::Text(other.to_string()),
        }
    }

    fn from_text(s: &str) -> Self {
        if let Some(deg) = parse_deg(s) {
            return Self::Angle(deg);
        }
        if parse_color(s).is_some() {
            return Self::Color(s.to_string());
        }
        Self::Text(s.to_string())
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Number(v) => number_json(*v),
            Self::Angle(_) | Self::Color(_) | Self::Text(_) => Value::String(self.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) | Self::Angle(v) => Some(*v),
            _ => None,
        }
    }

    /// Value at progress `num` between `start` and `end`.
    ///
    /// Numbers and angles blend linearly (a bare number paired with an angle
    /// is read as degrees), two colors blend through `gradual_change`, and
    /// every other pairing holds `start` until `num` reaches 1.
    pub fn interpolate(start: &StyleValue, end: &StyleValue, num: f64) -> StyleValue {
        use StyleValue::*;
        let lerp = |a: f64, b: f64| a + (b - a) * num;
        match (start, end) {
            (Number(a), Number(b)) => Number(lerp(*a, *b)),
            (Angle(a), Angle(b)) | (Angle(a), Number(b)) | (Number(a), Angle(b)) => {
                Angle(lerp(*a, *b))
            }
            (Color(a), Color(b)) => Color(gradual_change(a, b, num)),
            _ if num >= 1.0 => end.clone(),
            _ => start.clone(),
        }
    }
}

impl Default for StyleValue {
    fn default() -> Self {
        Self::Number(0.0)
    }
}

impl std::fmt::Display for StyleValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Angle(v) => write!(f, "{v}deg"),
            Self::Color(s) | Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<Value> for StyleValue {
    fn from(value: Value) -> Self {
        Self::from_json(&value)
    }
}

impl From<StyleValue> for Value {
    fn from(value: StyleValue) -> Self {
        value.to_json()
    }
}

impl From<f64> for StyleValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for StyleValue {
    fn from(s: &str) -> Self {
        Self::from_text(&rad_to_deg(s))
    }
}

/// Convert a `"<n>rad"` string to `"<n * 180/π>deg"`; anything else is returned unchanged.
pub fn rad_to_deg(s: &str) -> String {
    if let Some(num) = s.strip_suffix("rad") {
        if let Ok(rad) = num.trim().parse::<f64>() {
            return format!("{}deg", rad * (180.0 / std::f64::consts::PI));
        }
    }
    s.to_string()
}

fn parse_deg(s: &str) -> Option<f64> {
    s.trim().strip_suffix("deg")?.trim().parse::<f64>().ok()
}

/// Whole numbers serialize as JSON integers so rendered styles read like hand-written ones.
pub(crate) fn number_json(v: f64) -> Value {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 9.007_199_254_740_992e15 {
        Value::from(v as i64)
    } else {
        serde_json::Number::from_f64(v)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_leaves() {
        assert_eq!(StyleValue::from_json(&json!(12)), StyleValue::Number(12.0));
        assert_eq!(StyleValue::from_json(&json!("90deg")), StyleValue::Angle(90.0));
        assert_eq!(
            StyleValue::from_json(&json!("#fff")),
            StyleValue::Color("#fff".into())
        );
        assert_eq!(
            StyleValue::from_json(&json!("auto")),
            StyleValue::Text("auto".into())
        );
    }

    #[test]
    fn radians_become_degrees() {
        assert_eq!(rad_to_deg("1rad"), "57.29577951308232deg");
        assert_eq!(rad_to_deg("45deg"), "45deg");
        assert_eq!(rad_to_deg("rad"), "rad");
        assert_eq!(
            StyleValue::from_json(&json!("1rad")).to_json(),
            json!("57.29577951308232deg")
        );
    }

    #[test]
    fn angles_interpolate_in_degrees() {
        let v = StyleValue::interpolate(&"0deg".into(), &"90deg".into(), 0.5);
        assert_eq!(v.to_json(), json!("45deg"));
        let mixed = StyleValue::interpolate(&StyleValue::Number(0.0), &"90deg".into(), 0.5);
        assert_eq!(mixed, StyleValue::Angle(45.0));
    }

    #[test]
    fn numbers_and_colors_blend() {
        let v = StyleValue::interpolate(&StyleValue::Number(10.0), &StyleValue::Number(20.0), 0.25);
        assert_eq!(v, StyleValue::Number(12.5));
        let c = StyleValue::interpolate(&"#000000".into(), &"#ffffff".into(), 0.5);
        assert_eq!(c.to_json(), json!("rgba(128,128,128,1.00)"));
    }

    #[test]
    fn mismatched_kinds_step_at_end() {
        let start = StyleValue::Text("auto".into());
        let end = StyleValue::Number(100.0);
        assert_eq!(StyleValue::interpolate(&start, &end, 0.99), start);
        assert_eq!(StyleValue::interpolate(&start, &end, 1.0), end);
    }

    #[test]
    fn whole_numbers_render_as_integers() {
        assert_eq!(StyleValue::Number(100.0).to_json(), json!(100));
        assert_eq!(StyleValue::Number(0.5).to_json(), json!(0.5));
    }
}
