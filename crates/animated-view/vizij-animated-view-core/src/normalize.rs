//! Config normalization: caller input → flat per-leaf descriptors.
//!
//! Accepts a list of `AnimationConfig`s or the map shorthand
//! `{prop: value | [init, value]}`. Object-valued properties expand to one
//! descriptor per field, array-valued ones (transform lists) to one
//! descriptor per keyed item.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::callback::{BatchCallback, FrameCallback};
use crate::config::{AnimationType, ViewConfig};
use crate::easing::Easing;
use crate::error::ViewError;
use crate::style::{item_key, StylePath};
use crate::value::StyleValue;

/// Style properties whose values are lists of keyed items.
const LIST_PROPS: &[&str] = &["transform"];

/// One caller-facing animation request.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AnimationConfig {
    pub name: String,
    pub value: Value,
    #[serde(default, alias = "initValue", skip_serializing_if = "Option::is_none")]
    pub init_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<Easing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip)]
    pub frame_callback: Option<FrameCallback>,
}

impl AnimationConfig {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn init(mut self, init: impl Into<Value>) -> Self {
        self.init_value = Some(init.into());
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }

    pub fn duration(mut self, ms: f64) -> Self {
        self.duration = Some(ms);
        self
    }

    pub fn on_frame(mut self, f: impl Fn(&crate::FrameInfo) + 'static) -> Self {
        self.frame_callback = Some(FrameCallback::new(f));
        self
    }
}

/// Caller input to `start`.
#[derive(Clone, Debug)]
pub enum ConfigInput {
    List(Vec<AnimationConfig>),
    Map(Map<String, Value>),
}

impl ConfigInput {
    /// Arrays parse as the list form, objects as the map form.
    pub fn from_json(value: &Value) -> crate::Result<Self> {
        match value {
            Value::Array(_) => Ok(Self::List(serde_json::from_value(value.clone())?)),
            Value::Object(map) => Ok(Self::Map(map.clone())),
            other => Err(ViewError::InvalidConfig {
                reason: format!("expected a list or a map of properties, got {other}"),
            }),
        }
    }
}

impl From<Vec<AnimationConfig>> for ConfigInput {
    fn from(list: Vec<AnimationConfig>) -> Self {
        Self::List(list)
    }
}

impl From<AnimationConfig> for ConfigInput {
    fn from(config: AnimationConfig) -> Self {
        Self::List(vec![config])
    }
}

impl From<Map<String, Value>> for ConfigInput {
    fn from(map: Map<String, Value>) -> Self {
        Self::Map(map)
    }
}

/// Per-call overrides for the view defaults.
#[derive(Clone, Debug, Default)]
pub struct StartOptions {
    pub duration_ms: Option<f64>,
    pub easing: Option<Easing>,
    pub frame_callback: Option<FrameCallback>,
    pub callback: Option<BatchCallback>,
    pub animation_type: Option<AnimationType>,
    pub stop_together: Option<bool>,
    pub stagger_ms: Option<f64>,
}

impl StartOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn duration(mut self, ms: f64) -> Self {
        self.duration_ms = Some(ms);
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }

    pub fn animation_type(mut self, animation_type: AnimationType) -> Self {
        self.animation_type = Some(animation_type);
        self
    }

    pub fn stop_together(mut self, stop_together: bool) -> Self {
        self.stop_together = Some(stop_together);
        self
    }

    pub fn stagger(mut self, ms: f64) -> Self {
        self.stagger_ms = Some(ms);
        self
    }

    pub fn on_frame(mut self, f: impl Fn(&crate::FrameInfo) + 'static) -> Self {
        self.frame_callback = Some(FrameCallback::new(f));
        self
    }

    pub fn on_finish(mut self, f: impl Fn(bool) + 'static) -> Self {
        self.callback = Some(BatchCallback::new(f));
        self
    }
}

/// Batch-level values after applying `StartOptions` over `ViewConfig`.
#[derive(Clone, Debug)]
pub struct BatchDefaults {
    pub duration_ms: f64,
    pub easing: Easing,
    pub frame_callback: Option<FrameCallback>,
    pub callback: Option<BatchCallback>,
    pub animation_type: AnimationType,
    pub stop_together: bool,
    pub stagger_ms: f64,
}

impl BatchDefaults {
    pub fn resolve(cfg: &ViewConfig, options: StartOptions) -> Self {
        Self {
            duration_ms: options.duration_ms.unwrap_or(cfg.default_duration_ms),
            easing: options.easing.unwrap_or_else(|| cfg.default_easing.clone()),
            frame_callback: options
                .frame_callback
                .or_else(|| cfg.default_frame_callback.clone()),
            callback: options.callback.or_else(|| cfg.default_callback.clone()),
            animation_type: options.animation_type.unwrap_or(cfg.default_animation_type),
            stop_together: options.stop_together.unwrap_or(cfg.default_stop_together),
            stagger_ms: options.stagger_ms.unwrap_or(cfg.default_stagger_ms).max(0.0),
        }
    }
}

/// Normalized request for exactly one channel.
#[derive(Clone, Debug)]
pub struct Descriptor {
    /// Leaf name (`rotate` for `transform_rotate`).
    pub name: String,
    /// Channel key.
    pub config_name: String,
    pub path: StylePath,
    pub value: StyleValue,
    pub init_value: Option<StyleValue>,
    pub easing: Easing,
    pub duration_ms: f64,
    pub frame_callback: Option<FrameCallback>,
}

/// Flatten caller input into descriptors, in caller order.
///
/// A key requested twice keeps the later request at the earlier position.
pub fn normalize(input: ConfigInput, defaults: &BatchDefaults) -> Vec<Descriptor> {
    let configs = match input {
        ConfigInput::List(list) => list,
        ConfigInput::Map(map) => map
            .into_iter()
            .filter_map(|(name, value)| from_map_entry(name, value))
            .collect(),
    };

    let mut out: Vec<Descriptor> = Vec::new();
    for config in configs {
        for desc in expand(config, defaults) {
            match out.iter_mut().find(|d| d.config_name == desc.config_name) {
                Some(existing) => {
                    log::warn!("'{}' requested twice in one batch, keeping the last", desc.config_name);
                    *existing = desc;
                }
                None => out.push(desc),
            }
        }
    }
    out
}

fn from_map_entry(name: String, value: Value) -> Option<AnimationConfig> {
    let Value::Array(items) = value else {
        return Some(AnimationConfig::new(name, value));
    };
    let Some(first) = items.first() else {
        log::warn!("empty value list for '{name}', skipping");
        return None;
    };
    let is_list_prop = LIST_PROPS.contains(&name.as_str());
    if is_list_prop && !first.is_array() {
        return Some(AnimationConfig::new(name, Value::Array(items)));
    }
    let mut items = items.into_iter();
    let config = if items.len() == 2 {
        let init = items.next().unwrap_or(Value::Null);
        let value = items.next().unwrap_or(Value::Null);
        AnimationConfig::new(name, value).init(init)
    } else {
        AnimationConfig::new(name, items.next().unwrap_or(Value::Null))
    };
    Some(config)
}

fn expand(config: AnimationConfig, defaults: &BatchDefaults) -> Vec<Descriptor> {
    let AnimationConfig {
        name,
        value,
        init_value,
        easing,
        duration,
        frame_callback,
    } = config;
    let leaf = |path: StylePath, value: &Value, init: Option<&Value>| Descriptor {
        name: path.leaf().to_string(),
        config_name: path.channel_key(),
        path,
        value: StyleValue::from_json(value),
        init_value: init.filter(|v| !v.is_null()).map(StyleValue::from_json),
        easing: easing.clone().unwrap_or_else(|| defaults.easing.clone()),
        duration_ms: duration.unwrap_or(defaults.duration_ms).max(0.0),
        frame_callback: frame_callback
            .clone()
            .or_else(|| defaults.frame_callback.clone()),
    };

    match &value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| {
                let Some(key) = item_key(item) else {
                    log::warn!("'{name}' item {item} is not a keyed object, skipping");
                    return None;
                };
                let init = init_value
                    .as_ref()
                    .and_then(Value::as_array)
                    .and_then(|inits| inits.iter().find(|i| item_key(i) == Some(key)))
                    .and_then(|i| i.get(key));
                Some(leaf(StylePath::list_item(&name, key), &item[key], init))
            })
            .collect(),
        Value::Object(fields) => fields
            .iter()
            .map(|(key, v)| {
                let init = init_value.as_ref().and_then(|i| i.get(key));
                leaf(StylePath::field(&name, key), v, init)
            })
            .collect(),
        scalar => vec![leaf(StylePath::prop(&name), scalar, init_value.as_ref())],
    }
}
