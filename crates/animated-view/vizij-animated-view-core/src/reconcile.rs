//! Render-time reconciliation of channels against the base style.
//!
//! Channels whose recorded source style no longer matches the base style are
//! stale and get torn down by the view. The rest project onto the base style
//! in two layers: frozen channels first, then live ones.

use hashbrown::HashSet;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::channel::{ChannelState, ChannelTable};
use crate::value::StyleValue;

/// Style produced by `AnimatedView::render`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderedStyle {
    /// Base style merged with every channel's current value.
    pub style: Value,
    /// State of each channel seen by this render, in table order.
    pub channels: IndexMap<String, ChannelState>,
}

impl RenderedStyle {
    /// Value at a top-level property of the merged style.
    pub fn get(&self, prop: &str) -> Option<&Value> {
        self.style.get(prop)
    }

    pub fn state(&self, key: &str) -> Option<ChannelState> {
        self.channels.get(key).copied()
    }
}

/// Keys of channels whose base style diverged from `source_style`.
pub fn stale_channels(channels: &ChannelTable, base: &Map<String, Value>) -> Vec<String> {
    channels
        .iter()
        .filter(|ch| !same_style_value(ch.path.lookup(base), ch.source_style.as_ref()))
        .map(|ch| ch.key.clone())
        .collect()
}

// `1` and `1.0` are the same style value even though their JSON differs.
fn same_style_value(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a == b || StyleValue::from_json(a) == StyleValue::from_json(b),
        _ => false,
    }
}

/// Merge base ← frozen ← live. Channels in `active` are live and show their
/// value at current progress; the rest show their terminal value.
pub fn compose<'a>(
    base: &Map<String, Value>,
    channels: &ChannelTable,
    active: impl IntoIterator<Item = &'a str>,
) -> (Map<String, Value>, IndexMap<String, ChannelState>) {
    let active: HashSet<&str> = active.into_iter().collect();
    let mut style = base.clone();
    let mut states = IndexMap::with_capacity(channels.len());

    for ch in channels.iter() {
        let state = if active.contains(ch.key.as_str()) {
            ChannelState::Live
        } else {
            ChannelState::Frozen
        };
        states.insert(ch.key.clone(), state);
    }
    for ch in channels.iter().filter(|ch| !active.contains(ch.key.as_str())) {
        ch.path.write(&mut style, ch.terminal_value().to_json());
    }
    for ch in channels.iter().filter(|ch| active.contains(ch.key.as_str())) {
        ch.path.write(&mut style, ch.current_value().to_json());
    }
    (style, states)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Channel;
    use crate::easing::Easing;
    use crate::style::{flatten_style, StylePath};
    use serde_json::json;

    fn channel(path: StylePath, source: Option<Value>, from: StyleValue, to: StyleValue) -> Channel {
        Channel::new(path, source, (from, to))
    }

    #[test]
    fn stale_when_base_changes() {
        let mut table = ChannelTable::new();
        table.insert(channel(
            StylePath::prop("opacity"),
            Some(json!(0.5)),
            0.5.into(),
            1.0.into(),
        ));
        table.insert(channel(
            StylePath::prop("width"),
            None,
            0.0.into(),
            10.0.into(),
        ));
        let base = flatten_style(&json!({"opacity": 0.5}));
        assert!(stale_channels(&table, &base).is_empty());
        let base = flatten_style(&json!({"opacity": 0.2, "width": 4}));
        assert_eq!(stale_channels(&table, &base), vec!["opacity", "width"]);
    }

    #[test]
    fn numerically_equal_base_is_not_stale() {
        let mut table = ChannelTable::new();
        table.insert(channel(
            StylePath::prop("opacity"),
            Some(json!(1)),
            1.0.into(),
            0.0.into(),
        ));
        table.insert(channel(
            StylePath::list_item("transform", "rotate"),
            Some(json!("90deg")),
            "90deg".into(),
            "0deg".into(),
        ));
        let base = flatten_style(&json!({"opacity": 1.0, "transform": [{"rotate": "90.0deg"}]}));
        assert!(stale_channels(&table, &base).is_empty());
    }

    #[test]
    fn frozen_keeps_list_position_under_live() {
        let mut table = ChannelTable::new();
        table.insert(channel(
            StylePath::list_item("transform", "rotate"),
            None,
            "30deg".into(),
            "30deg".into(),
        ));
        let scale = table.insert(channel(
            StylePath::list_item("transform", "scale"),
            None,
            1.0.into(),
            2.0.into(),
        ));
        scale.progress.set_target(1.0, 100.0, Easing::Linear, false);
        scale.progress.advance(50.0);

        let base = flatten_style(&json!({"opacity": 1}));
        let (style, states) = compose(&base, &table, ["transform_scale"]);
        assert_eq!(
            Value::Object(style),
            json!({"opacity": 1, "transform": [{"rotate": "30deg"}, {"scale": 1.5}]})
        );
        let states: Vec<_> = states.into_iter().collect();
        assert_eq!(
            states,
            vec![
                ("transform_rotate".to_string(), ChannelState::Frozen),
                ("transform_scale".to_string(), ChannelState::Live),
            ]
        );
    }
}
