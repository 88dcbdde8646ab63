//! View-level configuration and defaults.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::callback::{BatchCallback, FrameCallback};
use crate::easing::Easing;
use crate::error::ViewError;

/// How the directives of one batch are composed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationType {
    /// One after another.
    Sequence,
    /// All at once.
    #[default]
    Parallel,
    /// All at once, each delayed by a fixed increment over its predecessor.
    Stagger,
}

impl FromStr for AnimationType {
    type Err = ViewError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "sequence" => Ok(Self::Sequence),
            "parallel" => Ok(Self::Parallel),
            "stagger" => Ok(Self::Stagger),
            other => Err(ViewError::UnknownAnimationType {
                name: other.to_string(),
            }),
        }
    }
}

/// What `start` does when native driving is on but a property is not eligible.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NativeFallback {
    /// Run the batch without the native driver.
    #[default]
    Downgrade,
    /// Refuse the batch; its completion resolves `false`.
    Reject,
}

/// Configuration for one animated view.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub default_duration_ms: f64,
    pub default_easing: Easing,
    pub default_animation_type: AnimationType,
    /// Start delay increment for `stagger` batches.
    pub default_stagger_ms: f64,
    /// Whether interrupting one parallel/stagger directive stops the rest.
    pub default_stop_together: bool,
    pub use_native_driver: bool,
    pub native_fallback: NativeFallback,
    /// Host element type the style is applied to.
    pub element: String,
    /// External base style: an object, a list of objects, or null.
    pub style: Value,
    #[serde(skip)]
    pub default_frame_callback: Option<FrameCallback>,
    #[serde(skip)]
    pub default_callback: Option<BatchCallback>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            default_duration_ms: 500.0,
            default_easing: Easing::default(),
            default_animation_type: AnimationType::Parallel,
            default_stagger_ms: 100.0,
            default_stop_together: true,
            use_native_driver: false,
            native_fallback: NativeFallback::Downgrade,
            element: "View".to_string(),
            style: Value::Null,
            default_frame_callback: None,
            default_callback: None,
        }
    }
}

impl ViewConfig {
    pub fn from_json(value: &Value) -> crate::Result<Self> {
        serde_json::from_value(value.clone()).map_err(|err| ViewError::InvalidConfig {
            reason: err.to_string(),
        })
    }

    pub fn with_style(mut self, style: Value) -> Self {
        self.style = style;
        self
    }

    pub fn with_native_driver(mut self, fallback: NativeFallback) -> Self {
        self.use_native_driver = true;
        self.native_fallback = fallback;
        self
    }

    pub fn on_frame(mut self, f: impl Fn(&crate::FrameInfo) + 'static) -> Self {
        self.default_frame_callback = Some(FrameCallback::new(f));
        self
    }

    pub fn on_finish(mut self, f: impl Fn(bool) + 'static) -> Self {
        self.default_callback = Some(BatchCallback::new(f));
        self
    }
}
