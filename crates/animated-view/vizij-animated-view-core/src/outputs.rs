//! Output contracts of the animated view.
//!
//! `update()` returns the semantic events raised since the previous tick;
//! `stop()` and frame callbacks report per-channel `ChannelResult`s.

use serde::{Deserialize, Serialize};

use crate::config::AnimationType;
use crate::error::ViewError;
use crate::ids::BatchId;
use crate::value::StyleValue;

/// Snapshot of one channel at a given progress.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelResult {
    /// Channel key, e.g. `transform_rotate`.
    pub name: String,
    pub value: StyleValue,
    /// Eased progress in `input_range`.
    pub num: f64,
    pub input_range: [f64; 2],
    pub output_range: [StyleValue; 2],
    pub is_finish: bool,
}

/// Payload handed to frame callbacks.
pub type FrameInfo = ChannelResult;

/// Why a channel left the table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteReason {
    /// The base style under the channel changed.
    StyleChanged,
    /// `delete_channel` was called.
    Explicit,
}

/// Discrete signals raised by the view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum ViewEvent {
    BatchStarted {
        batch: BatchId,
        animation_type: AnimationType,
        channels: Vec<String>,
        native: bool,
    },
    BatchFinished {
        batch: BatchId,
        finished: bool,
    },
    /// Native driving was requested for ineligible properties and the batch was refused.
    BatchRejected { ineligible: Vec<String> },
    /// Native driving was requested for ineligible properties; the batch runs non-natively.
    NativeDowngraded { ineligible: Vec<String> },
    ChannelDeleted { key: String, reason: DeleteReason },
    ChannelsStopped { channels: Vec<String> },
}

/// Outputs returned by `AnimatedView::update()`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub events: Vec<ViewEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.events.clear();
    }

    #[inline]
    pub fn push_event(&mut self, event: ViewEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Where `stop` leaves a channel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StopPosition {
    Start,
    End,
}

/// Forced stop positions. Channels not covered halt where they are.
///
/// JSON: `true` (all to end), `false` (all to start), or
/// `{"start": [keys], "end": [keys]}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StopStatus {
    All(bool),
    Keys {
        #[serde(default)]
        start: Vec<String>,
        #[serde(default)]
        end: Vec<String>,
    },
}

impl StopStatus {
    pub fn from_json(value: &serde_json::Value) -> crate::Result<Self> {
        serde_json::from_value(value.clone()).map_err(|err| ViewError::InvalidStopStatus {
            reason: err.to_string(),
        })
    }

    /// Forced position for a channel. Keys match the channel key or its top-level
    /// property; `end` wins over `start`.
    pub fn position(&self, key: &str, root: &str) -> Option<StopPosition> {
        match self {
            Self::All(true) => Some(StopPosition::End),
            Self::All(false) => Some(StopPosition::Start),
            Self::Keys { start, end } => {
                let listed = |keys: &[String]| keys.iter().any(|k| k == key || k == root);
                if listed(end) {
                    Some(StopPosition::End)
                } else if listed(start) {
                    Some(StopPosition::Start)
                } else {
                    None
                }
            }
        }
    }
}
