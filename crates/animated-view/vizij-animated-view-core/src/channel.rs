//! Channels and initial-value resolution.
//!
//! A channel owns one leaf property's progress driver and value range. New
//! channels resolve their start value through a fallback chain: explicit
//! init → base style at the channel path → semantic default → box-model
//! shorthand → layout measurement (`width`/`height`) → `0`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::callback::FrameCallback;
use crate::driver::TimedValue;
use crate::ids::Subscription;
use crate::normalize::Descriptor;
use crate::outputs::ChannelResult;
use crate::style::StylePath;
use crate::value::StyleValue;

/// Measured element size in layout units.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutSize {
    pub width: f64,
    pub height: f64,
}

/// Host layout measurement. `None` means the element is not laid out yet.
pub trait LayoutMeasure {
    fn measure(&self) -> Option<LayoutSize>;
}

impl<F> LayoutMeasure for F
where
    F: Fn() -> Option<LayoutSize>,
{
    fn measure(&self) -> Option<LayoutSize> {
        self()
    }
}

/// Liveness of a channel in the rendered style.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelState {
    /// Driven by the current batch.
    Live,
    /// Holding its last resolved value.
    Frozen,
    /// Removed this render.
    Deleted,
}

#[derive(Debug)]
pub struct Channel {
    pub key: String,
    pub path: StylePath,
    /// Base style value at `path` when the channel was last targeted.
    pub source_style: Option<Value>,
    pub progress: TimedValue,
    pub range: (StyleValue, StyleValue),
    subscription: Option<Subscription>,
}

impl Channel {
    pub fn new(path: StylePath, source_style: Option<Value>, range: (StyleValue, StyleValue)) -> Self {
        Self {
            key: path.channel_key(),
            path,
            source_style,
            progress: TimedValue::new(0.0),
            range,
            subscription: None,
        }
    }

    /// Point the channel at a new range with a fresh driver.
    pub fn retarget(&mut self, start: StyleValue, end: StyleValue, source_style: Option<Value>) {
        self.release();
        self.progress = TimedValue::new(0.0);
        self.range = (start, end);
        self.source_style = source_style;
    }

    /// Collapse the range onto `value`, dropping the driver.
    pub fn freeze(&mut self, value: StyleValue) {
        self.retarget(value.clone(), value, self.source_style.clone());
    }

    #[inline]
    pub fn value_at(&self, num: f64) -> StyleValue {
        StyleValue::interpolate(&self.range.0, &self.range.1, num)
    }

    #[inline]
    pub fn current_value(&self) -> StyleValue {
        self.value_at(self.progress.value())
    }

    /// Value once the current range has run out.
    #[inline]
    pub fn terminal_value(&self) -> &StyleValue {
        &self.range.1
    }

    pub fn result_at(&self, num: f64) -> ChannelResult {
        channel_result(&self.key, &self.range, num)
    }

    /// Replace the progress listener. One is installed only when there is a
    /// frame callback or the channel is natively driven.
    pub fn install_listener(&mut self, callback: Option<FrameCallback>, native: bool) {
        self.release();
        if callback.is_none() && !native {
            return;
        }
        let key = self.key.clone();
        let range = self.range.clone();
        let sub = self.progress.add_listener(move |num| {
            if let Some(cb) = &callback {
                cb.call(&channel_result(&key, &range, num));
            }
        });
        self.subscription = Some(sub);
    }

    #[inline]
    pub fn subscription(&self) -> Option<Subscription> {
        self.subscription
    }

    /// Drop the installed listener, if any.
    pub fn release(&mut self) {
        if let Some(sub) = self.subscription.take() {
            self.progress.remove_listener(sub);
        }
    }
}

fn channel_result(key: &str, range: &(StyleValue, StyleValue), num: f64) -> ChannelResult {
    ChannelResult {
        name: key.to_string(),
        value: StyleValue::interpolate(&range.0, &range.1, num),
        num,
        input_range: [0.0, 1.0],
        output_range: [range.0.clone(), range.1.clone()],
        is_finish: num == 1.0,
    }
}

/// Ordered table of channels keyed by channel key.
#[derive(Debug, Default)]
pub struct ChannelTable {
    channels: IndexMap<String, Channel>,
}

impl ChannelTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&Channel> {
        self.channels.get(key)
    }

    #[inline]
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Channel> {
        self.channels.get_mut(key)
    }

    pub fn insert(&mut self, channel: Channel) -> &mut Channel {
        let idx = self.channels.insert_full(channel.key.clone(), channel).0;
        &mut self.channels[idx]
    }

    /// Remove a channel, keeping the order of the rest.
    pub fn remove(&mut self, key: &str) -> Option<Channel> {
        self.channels.shift_remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Channel> {
        self.channels.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Channel> {
        self.channels.values_mut()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

const ANGLE_DEFAULTS: &[&str] = &["rotate", "rotateX", "rotateY", "rotateZ", "skewX", "skewY"];
const UNIT_DEFAULTS: &[&str] = &["scale", "scaleX", "scaleY", "shadowOpacity", "opacity"];

/// Start value for a channel that does not exist yet.
pub fn resolve_initial(
    desc: &Descriptor,
    style: &Map<String, Value>,
    layout: Option<&dyn LayoutMeasure>,
) -> StyleValue {
    if let Some(init) = &desc.init_value {
        return init.clone();
    }
    if let Some(found) = desc.path.lookup(style) {
        log::trace!("{}: start from base style {found}", desc.config_name);
        return StyleValue::from_json(found);
    }
    if let Some(default) = semantic_default(&desc.name) {
        return default;
    }
    let key = desc.config_name.as_str();
    if let Some(v) = shorthand(key, style) {
        log::trace!("{key}: start from shorthand {v}");
        return StyleValue::from_json(v);
    }
    match key {
        "width" | "height" => measured(key, layout),
        _ => StyleValue::Number(0.0),
    }
}

fn semantic_default(name: &str) -> Option<StyleValue> {
    if name == "color" || name.contains("Color") {
        Some(StyleValue::Color("transparent".to_string()))
    } else if ANGLE_DEFAULTS.contains(&name) {
        Some(StyleValue::Angle(0.0))
    } else if UNIT_DEFAULTS.contains(&name) {
        Some(StyleValue::Number(1.0))
    } else {
        None
    }
}

/// Box-model shorthand chain for padding/margin sides and axes.
fn shorthand<'a>(key: &str, style: &'a Map<String, Value>) -> Option<&'a Value> {
    let (base, rest) = if let Some(rest) = key.strip_prefix("padding") {
        ("padding", rest)
    } else if let Some(rest) = key.strip_prefix("margin") {
        ("margin", rest)
    } else {
        return None;
    };
    let axis = match rest {
        "Top" | "Bottom" => Some("Vertical"),
        "Left" | "Right" => Some("Horizontal"),
        "Vertical" | "Horizontal" => None,
        _ => return None,
    };
    axis.and_then(|axis| style.get(&format!("{base}{axis}")))
        .or_else(|| style.get(base))
}

fn measured(key: &str, layout: Option<&dyn LayoutMeasure>) -> StyleValue {
    let size = layout.and_then(|layout| layout.measure());
    match size {
        Some(size) => StyleValue::Number(if key == "width" { size.width } else { size.height }),
        None => {
            log::debug!("{key}: no layout available, starting from 0");
            StyleValue::Number(0.0)
        }
    }
}
