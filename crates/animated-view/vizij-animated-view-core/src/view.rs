//! AnimatedView: owns the channel table and exposes start/stop/update/render.
//!
//! Host loop:
//! - `start` / `stop` from event handlers,
//! - `update(dt_ms)` once per frame (advances drivers, settles batches),
//! - `render()` whenever `needs_render()` (or on every frame).

use serde_json::{Map, Value};

use crate::batch::{Batch, Completion, Directive};
use crate::channel::{resolve_initial, Channel, ChannelState, ChannelTable, LayoutMeasure};
use crate::config::ViewConfig;
use crate::ids::IdAllocator;
use crate::native::NativeGate;
use crate::normalize::{normalize, BatchDefaults, ConfigInput, Descriptor, StartOptions};
use crate::outputs::{ChannelResult, DeleteReason, Outputs, StopPosition, StopStatus, ViewEvent};
use crate::reconcile::{compose, stale_channels, RenderedStyle};
use crate::style::flatten_style;
use crate::START_EPSILON;

pub struct AnimatedView {
    cfg: ViewConfig,
    ids: IdAllocator,
    channels: ChannelTable,
    /// Channel keys of the most recent batch, in request order.
    active: Vec<String>,
    batch: Option<Batch>,
    layout: Option<Box<dyn LayoutMeasure>>,
    needs_render: bool,
    pending_events: Vec<ViewEvent>,
    outputs: Outputs,
}

impl std::fmt::Debug for AnimatedView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimatedView")
            .field("cfg", &self.cfg)
            .field("channels", &self.channels)
            .field("active", &self.active)
            .field("batch", &self.batch)
            .field("has_layout", &self.layout.is_some())
            .field("needs_render", &self.needs_render)
            .finish_non_exhaustive()
    }
}

impl Default for AnimatedView {
    fn default() -> Self {
        Self::new(ViewConfig::default())
    }
}

impl AnimatedView {
    pub fn new(cfg: ViewConfig) -> Self {
        Self {
            cfg,
            ids: IdAllocator::new(),
            channels: ChannelTable::new(),
            active: Vec::new(),
            batch: None,
            layout: None,
            needs_render: true,
            pending_events: Vec::new(),
            outputs: Outputs::default(),
        }
    }

    #[inline]
    pub fn config(&self) -> &ViewConfig {
        &self.cfg
    }

    /// Replace the external base style.
    pub fn set_style(&mut self, style: Value) {
        self.cfg.style = style;
        self.needs_render = true;
    }

    pub fn set_layout(&mut self, layout: Box<dyn LayoutMeasure>) {
        self.layout = Some(layout);
    }

    pub fn clear_layout(&mut self) {
        self.layout = None;
    }

    /// Start a batch, superseding the one in flight.
    ///
    /// Never fails: unsupported input degrades to defaults and is logged. The
    /// returned completion settles `true` iff the batch runs to the end.
    pub fn start(&mut self, configs: impl Into<ConfigInput>, options: StartOptions) -> Completion {
        let defaults = BatchDefaults::resolve(&self.cfg, options);
        let descriptors = normalize(configs.into(), &defaults);

        let gate = NativeGate::evaluate(
            self.cfg.use_native_driver,
            self.cfg.native_fallback,
            descriptors.iter().map(|d| d.path.root()),
        );
        match &gate {
            NativeGate::Rejected { ineligible } => {
                log::warn!("native driver cannot animate {ineligible:?}, batch rejected");
                self.pending_events.push(ViewEvent::BatchRejected {
                    ineligible: ineligible.clone(),
                });
                return Completion::resolved(false);
            }
            NativeGate::Downgraded { ineligible } => {
                log::warn!("native driver cannot animate {ineligible:?}, running batch without it");
                self.pending_events.push(ViewEvent::NativeDowngraded {
                    ineligible: ineligible.clone(),
                });
            }
            NativeGate::Off | NativeGate::Native => {}
        }
        let native = gate.is_native();

        self.halt(None);

        let base = flatten_style(&self.cfg.style);
        let mut directives = Vec::with_capacity(descriptors.len());
        for desc in &descriptors {
            self.resolve_channel(desc, &base, native);
            directives.push(Directive::new(
                desc.config_name.clone(),
                desc.duration_ms,
                desc.easing.clone(),
            ));
        }
        self.active = descriptors.iter().map(|d| d.config_name.clone()).collect();

        let id = self.ids.alloc_batch();
        log::debug!(
            "batch {id:?} starting: {:?} {} channel(s), native={native}",
            defaults.animation_type,
            self.active.len()
        );
        self.pending_events.push(ViewEvent::BatchStarted {
            batch: id,
            animation_type: defaults.animation_type,
            channels: self.active.clone(),
            native,
        });
        self.needs_render = true;

        let mut batch = Batch::new(
            id,
            defaults.animation_type,
            defaults.stop_together,
            native,
            directives,
            defaults.callback,
        );
        let completion = batch.completion();
        match batch.begin(defaults.stagger_ms, &mut self.channels) {
            Some(finished) => self.settle(batch, finished),
            None => self.batch = Some(batch),
        }
        completion
    }

    /// Find or create the channel for `desc` and (re)install its listener.
    fn resolve_channel(&mut self, desc: &Descriptor, base: &Map<String, Value>, native: bool) {
        let source = desc.path.lookup(base).cloned();
        let channel = match self.channels.get_mut(&desc.config_name) {
            Some(ch) => {
                let start = desc
                    .init_value
                    .clone()
                    .unwrap_or_else(|| ch.terminal_value().clone());
                log::trace!("{}: retarget {start} -> {}", desc.config_name, desc.value);
                ch.retarget(start, desc.value.clone(), source);
                ch
            }
            None => {
                let start = resolve_initial(desc, base, self.layout.as_deref());
                log::trace!("{}: create {start} -> {}", desc.config_name, desc.value);
                self.channels.insert(Channel::new(
                    desc.path.clone(),
                    source,
                    (start, desc.value.clone()),
                ))
            }
        };
        channel.install_listener(desc.frame_callback.clone(), native);
    }

    /// Stop the current batch.
    ///
    /// Returns `None` when no batch has been started (or none of its channels
    /// remain). Otherwise every channel of the batch is halted at its current
    /// progress, or forced to the start/end `status` names, and frozen there.
    pub fn stop(&mut self, status: Option<StopStatus>) -> Option<Vec<ChannelResult>> {
        let results = self.halt(status.as_ref())?;
        self.pending_events.push(ViewEvent::ChannelsStopped {
            channels: results.iter().map(|r| r.name.clone()).collect(),
        });
        Some(results)
    }

    fn halt(&mut self, status: Option<&StopStatus>) -> Option<Vec<ChannelResult>> {
        if let Some(mut batch) = self.batch.take() {
            batch.halt(&mut self.channels);
            self.settle(batch, false);
        }
        if !self.active.iter().any(|key| self.channels.get(key).is_some()) {
            return None;
        }

        let mut results = Vec::with_capacity(self.active.len());
        for key in &self.active {
            let Some(ch) = self.channels.get_mut(key) else {
                continue;
            };
            let halted = ch.progress.stop();
            let num = match status.and_then(|s| s.position(key, ch.path.root())) {
                Some(StopPosition::End) => 1.0,
                Some(StopPosition::Start) => START_EPSILON,
                None => halted,
            };
            let result = ch.result_at(num);
            ch.freeze(result.value.clone());
            results.push(result);
        }
        if status.is_some() {
            self.needs_render = true;
        }
        Some(results)
    }

    /// Advance every driver of the batch in flight by `dt_ms` milliseconds.
    pub fn update(&mut self, dt_ms: f64) -> &Outputs {
        self.outputs.clear();
        if let Some(mut batch) = self.batch.take() {
            self.needs_render = true;
            match batch.tick(dt_ms.max(0.0), &mut self.channels) {
                Some(finished) => self.settle(batch, finished),
                None => self.batch = Some(batch),
            }
        }
        for event in self.pending_events.drain(..) {
            self.outputs.push_event(event);
        }
        &self.outputs
    }

    fn settle(&mut self, batch: Batch, finished: bool) {
        self.pending_events.push(ViewEvent::BatchFinished {
            batch: batch.id,
            finished,
        });
        batch.settle(finished);
    }

    /// Reconcile channels against the base style and produce the merged style.
    pub fn render(&mut self) -> RenderedStyle {
        let base = flatten_style(&self.cfg.style);
        let stale = stale_channels(&self.channels, &base);
        for key in &stale {
            log::warn!("{key}: base style changed under the animation, dropping channel");
            self.remove_channel(key, DeleteReason::StyleChanged);
        }

        let (style, mut channels) =
            compose(&base, &self.channels, self.active.iter().map(String::as_str));
        for key in stale {
            channels.insert(key, ChannelState::Deleted);
        }
        self.needs_render = false;
        RenderedStyle {
            style: Value::Object(style),
            channels,
        }
    }

    /// Remove a channel; the base style shows through on the next render.
    pub fn delete_channel(&mut self, key: &str) -> bool {
        self.remove_channel(key, DeleteReason::Explicit)
    }

    fn remove_channel(&mut self, key: &str, reason: DeleteReason) -> bool {
        let Some(mut ch) = self.channels.remove(key) else {
            return false;
        };
        ch.release();
        self.active.retain(|k| k != key);
        if let Some(mut batch) = self.batch.take() {
            match batch.interrupt(key, &mut self.channels) {
                Some(finished) => self.settle(batch, finished),
                None => self.batch = Some(batch),
            }
        }
        self.pending_events.push(ViewEvent::ChannelDeleted {
            key: key.to_string(),
            reason,
        });
        self.needs_render = true;
        true
    }

    #[inline]
    pub fn channel(&self, key: &str) -> Option<&Channel> {
        self.channels.get(key)
    }

    #[inline]
    pub fn channels(&self) -> &ChannelTable {
        &self.channels
    }

    /// Channel keys of the most recent batch.
    #[inline]
    pub fn active_keys(&self) -> &[String] {
        &self.active
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.batch.is_some()
    }

    #[inline]
    pub fn needs_render(&self) -> bool {
        self.needs_render
    }

    pub fn take_needs_render(&mut self) -> bool {
        std::mem::take(&mut self.needs_render)
    }

    /// Remove every listener. A batch in flight resolves `false` without its callback.
    pub fn dispose(&mut self) {
        for ch in self.channels.iter_mut() {
            ch.release();
            ch.progress.remove_all_listeners();
        }
        if let Some(batch) = self.batch.take() {
            batch.abandon();
        }
    }
}

impl Drop for AnimatedView {
    fn drop(&mut self) {
        self.dispose();
    }
}
