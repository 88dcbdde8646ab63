//! Vizij Animated View (host-agnostic)
//!
//! Declarative style animation for a single view: callers describe target
//! style properties, the view builds one interpolation channel per leaf
//! property, drives them as a sequence, a parallel group or a stagger, and
//! reconciles the animated values against the host's base style on render.
//!
//! The host owns the frame loop: call `AnimatedView::update(dt_ms)` once per
//! frame and `AnimatedView::render()` to obtain the merged style.

pub mod batch;
pub mod callback;
pub mod channel;
pub mod color;
pub mod config;
pub mod driver;
pub mod easing;
pub mod error;
pub mod ids;
pub mod native;
pub mod normalize;
pub mod outputs;
pub mod reconcile;
pub mod style;
pub mod value;
pub mod view;

/// Progress of a channel that `stop` forces to its start: the smallest
/// positive `f64`, never exactly 0.
pub const START_EPSILON: f64 = 5e-324;

pub type Result<T> = std::result::Result<T, error::ViewError>;

// Re-exports for hosts
pub use batch::Completion;
pub use callback::{BatchCallback, FrameCallback};
pub use channel::{Channel, ChannelState, ChannelTable, LayoutMeasure, LayoutSize};
pub use color::{gradual_change, parse_color, Rgba};
pub use config::{AnimationType, NativeFallback, ViewConfig};
pub use driver::TimedValue;
pub use easing::Easing;
pub use error::ViewError;
pub use ids::{BatchId, Subscription};
pub use native::NATIVE_DRIVER_PROPS;
pub use normalize::{AnimationConfig, ConfigInput, Descriptor, StartOptions};
pub use outputs::{ChannelResult, DeleteReason, FrameInfo, Outputs, StopStatus, ViewEvent};
pub use reconcile::RenderedStyle;
pub use style::{flatten_style, StylePath};
pub use value::{rad_to_deg, StyleValue};
pub use view::AnimatedView;
