//! `TimedValue`: a scalar driven toward a target over time.
//!
//! Advanced explicitly by the owner's frame tick. Listeners observe every
//! value the driver takes while animating and are removed only through their
//! `Subscription`.

use hashbrown::HashMap;

use crate::easing::Easing;
use crate::ids::Subscription;

pub type ProgressListener = Box<dyn FnMut(f64)>;

#[derive(Clone, Debug)]
struct Timing {
    from: f64,
    to: f64,
    duration_ms: f64,
    elapsed_ms: f64,
    easing: Easing,
}

/// Result of one `advance` call.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Advance {
    /// No timing in flight.
    Idle,
    Running,
    /// Reached the target; `overflow_ms` is the unused part of the tick.
    Finished { overflow_ms: f64 },
}

pub struct TimedValue {
    value: f64,
    timing: Option<Timing>,
    native: bool,
    listeners: HashMap<Subscription, ProgressListener>,
    next_subscription: u64,
}

impl std::fmt::Debug for TimedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimedValue")
            .field("value", &self.value)
            .field("timing", &self.timing)
            .field("native", &self.native)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl TimedValue {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            timing: None,
            native: false,
            listeners: HashMap::new(),
            next_subscription: 0,
        }
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.timing.is_some()
    }

    /// Whether the running timing was requested with the native driver.
    #[inline]
    pub fn is_native(&self) -> bool {
        self.native
    }

    /// Begin moving from the current value to `to`. Replaces any timing in flight.
    pub fn set_target(&mut self, to: f64, duration_ms: f64, easing: Easing, native: bool) {
        self.native = native;
        self.timing = Some(Timing {
            from: self.value,
            to,
            duration_ms: duration_ms.max(0.0),
            elapsed_ms: 0.0,
            easing,
        });
    }

    /// Jump to `value`, cancelling any timing, and notify listeners.
    pub fn set_value(&mut self, value: f64) {
        self.timing = None;
        self.value = value;
        self.notify();
    }

    /// Halt where the value currently is and return it.
    pub fn stop(&mut self) -> f64 {
        self.timing = None;
        self.value
    }

    pub fn advance(&mut self, dt_ms: f64) -> Advance {
        let Some(timing) = self.timing.as_mut() else {
            return Advance::Idle;
        };
        timing.elapsed_ms += dt_ms.max(0.0);
        let done = timing.elapsed_ms >= timing.duration_ms;
        let overflow_ms = timing.elapsed_ms - timing.duration_ms;
        self.value = if done {
            timing.to
        } else {
            let t = timing.elapsed_ms / timing.duration_ms;
            timing.from + (timing.to - timing.from) * timing.easing.evaluate(t)
        };
        if done {
            self.timing = None;
        }
        self.notify();
        if done {
            Advance::Finished { overflow_ms }
        } else {
            Advance::Running
        }
    }

    pub fn add_listener(&mut self, listener: impl FnMut(f64) + 'static) -> Subscription {
        let sub = Subscription(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.insert(sub, Box::new(listener));
        sub
    }

    pub fn remove_listener(&mut self, sub: Subscription) -> bool {
        self.listeners.remove(&sub).is_some()
    }

    pub fn remove_all_listeners(&mut self) {
        self.listeners.clear();
    }

    #[inline]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn notify(&mut self) {
        let value = self.value;
        for listener in self.listeners.values_mut() {
            listener(value);
        }
    }
}
