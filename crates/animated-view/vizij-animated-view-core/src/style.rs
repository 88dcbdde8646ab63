//! Style trees: flattening and addressing leaves by channel path.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Flatten a style reference into one plain object.
///
/// Objects are taken as-is, arrays are merged left to right (later entries
/// win per top-level key, nested arrays recurse), anything else is empty.
pub fn flatten_style(style: &Value) -> Map<String, Value> {
    let mut out = Map::new();
    flatten_into(style, &mut out);
    out
}

fn flatten_into(style: &Value, out: &mut Map<String, Value>) {
    match style {
        Value::Object(map) => {
            for (k, v) in map {
                out.insert(k.clone(), v.clone());
            }
        }
        Value::Array(items) => items.iter().for_each(|item| flatten_into(item, out)),
        _ => {}
    }
}

/// First key of a single-entry object such as a transform item `{"rotate": "45deg"}`.
pub fn item_key(item: &Value) -> Option<&str> {
    item.as_object()?.keys().next().map(String::as_str)
}

/// Where a channel's leaf lives inside a style object.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StylePath {
    /// Top-level property, e.g. `opacity`.
    Prop { name: String },
    /// Key of an object-valued property, e.g. `shadowOffset.width`.
    Field { parent: String, key: String },
    /// Keyed entry of an array-valued property, e.g. the `rotate` item of `transform`.
    ListItem { parent: String, key: String },
}

impl StylePath {
    pub fn prop(name: impl Into<String>) -> Self {
        Self::Prop { name: name.into() }
    }

    pub fn field(parent: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Field {
            parent: parent.into(),
            key: key.into(),
        }
    }

    pub fn list_item(parent: impl Into<String>, key: impl Into<String>) -> Self {
        Self::ListItem {
            parent: parent.into(),
            key: key.into(),
        }
    }

    /// Channel key: the property name, or `parent_key` for nested leaves.
    pub fn channel_key(&self) -> String {
        match self {
            Self::Prop { name } => name.clone(),
            Self::Field { parent, key } | Self::ListItem { parent, key } => {
                format!("{parent}_{key}")
            }
        }
    }

    /// Top-level style property this path lives under.
    pub fn root(&self) -> &str {
        match self {
            Self::Prop { name } => name,
            Self::Field { parent, .. } | Self::ListItem { parent, .. } => parent,
        }
    }

    /// Leaf name: the property itself, or the nested key.
    pub fn leaf(&self) -> &str {
        match self {
            Self::Prop { name } => name,
            Self::Field { key, .. } | Self::ListItem { key, .. } => key,
        }
    }

    pub fn lookup<'a>(&self, style: &'a Map<String, Value>) -> Option<&'a Value> {
        match self {
            Self::Prop { name } => style.get(name),
            Self::Field { parent, key } => style.get(parent)?.as_object()?.get(key),
            Self::ListItem { parent, key } => style
                .get(parent)?
                .as_array()?
                .iter()
                .find(|item| item_key(item) == Some(key.as_str()))?
                .get(key),
        }
    }

    /// Write `value` at this path, creating the parent container when absent.
    /// List items replace the entry with the same key in place, or append.
    pub fn write(&self, style: &mut Map<String, Value>, value: Value) {
        match self {
            Self::Prop { name } => {
                style.insert(name.clone(), value);
            }
            Self::Field { parent, key } => {
                let slot = style
                    .entry(parent.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !slot.is_object() {
                    *slot = Value::Object(Map::new());
                }
                if let Value::Object(map) = slot {
                    map.insert(key.clone(), value);
                }
            }
            Self::ListItem { parent, key } => {
                let slot = style
                    .entry(parent.clone())
                    .or_insert_with(|| Value::Array(Vec::new()));
                if !slot.is_array() {
                    *slot = Value::Array(Vec::new());
                }
                if let Value::Array(items) = slot {
                    let mut entry = Map::new();
                    entry.insert(key.clone(), value);
                    let entry = Value::Object(entry);
                    match items
                        .iter_mut()
                        .find(|item| item_key(item) == Some(key.as_str()))
                    {
                        Some(existing) => *existing = entry,
                        None => items.push(entry),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn flatten_merges_arrays_in_order() {
        let style = json!([{"opacity": 0.5, "width": 10}, null, [{"opacity": 1}]]);
        assert_eq!(
            Value::Object(flatten_style(&style)),
            json!({"opacity": 1, "width": 10})
        );
        assert!(flatten_style(&Value::Null).is_empty());
    }

    #[test]
    fn lookup_by_path() {
        let style = obj(json!({
            "opacity": 0.3,
            "shadowOffset": {"width": 2, "height": 4},
            "transform": [{"rotate": "10deg"}, {"scale": 2}]
        }));
        assert_eq!(StylePath::prop("opacity").lookup(&style), Some(&json!(0.3)));
        assert_eq!(
            StylePath::field("shadowOffset", "height").lookup(&style),
            Some(&json!(4))
        );
        assert_eq!(
            StylePath::list_item("transform", "scale").lookup(&style),
            Some(&json!(2))
        );
        assert_eq!(StylePath::list_item("transform", "skewX").lookup(&style), None);
    }

    #[test]
    fn keys_and_roots() {
        let path = StylePath::list_item("transform", "rotate");
        assert_eq!(path.channel_key(), "transform_rotate");
        assert_eq!(path.root(), "transform");
        assert_eq!(path.leaf(), "rotate");
    }

    #[test]
    fn list_writes_keep_position() {
        let mut style = obj(json!({"transform": [{"rotate": "0deg"}, {"scale": 1}]}));
        StylePath::list_item("transform", "rotate").write(&mut style, json!("30deg"));
        StylePath::list_item("transform", "translateX").write(&mut style, json!(5));
        assert_eq!(
            style["transform"],
            json!([{"rotate": "30deg"}, {"scale": 1}, {"translateX": 5}])
        );
    }

    #[test]
    fn field_write_creates_parent() {
        let mut style = Map::new();
        StylePath::field("shadowOffset", "width").write(&mut style, json!(3));
        assert_eq!(Value::Object(style), json!({"shadowOffset": {"width": 3}}));
    }
}
