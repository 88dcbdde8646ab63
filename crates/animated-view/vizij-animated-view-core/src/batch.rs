//! Batch runner: one timing directive per channel, composed as a sequence,
//! a parallel group, or a staggered parallel group.
//!
//! Directives do not own drivers; they look their channel up by key on every
//! tick, so a channel deleted mid-batch shows up as an interruption.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use crate::callback::BatchCallback;
use crate::channel::ChannelTable;
use crate::config::AnimationType;
use crate::driver::Advance;
use crate::easing::Easing;
use crate::ids::BatchId;

#[derive(Debug, Default)]
struct CompletionState {
    result: Option<bool>,
    waker: Option<Waker>,
}

/// Settles once with `true` iff the batch ran to completion.
///
/// Pollable through `result()` or awaitable as a `Future<Output = bool>`.
#[derive(Clone, Debug, Default)]
pub struct Completion {
    state: Rc<RefCell<CompletionState>>,
}

impl Completion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Already settled with `finished`.
    pub fn resolved(finished: bool) -> Self {
        let completion = Self::new();
        completion.resolve(finished);
        completion
    }

    #[inline]
    pub fn result(&self) -> Option<bool> {
        self.state.borrow().result
    }

    #[inline]
    pub fn is_settled(&self) -> bool {
        self.result().is_some()
    }

    /// First resolution wins.
    pub(crate) fn resolve(&self, finished: bool) {
        let waker = {
            let mut state = self.state.borrow_mut();
            if state.result.is_some() {
                return;
            }
            state.result = Some(finished);
            state.waker.take()
        };
        if let Some(waker) = waker {
            waker.wake();
        }
    }
}

impl Future for Completion {
    type Output = bool;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<bool> {
        let mut state = self.state.borrow_mut();
        match state.result {
            Some(finished) => Poll::Ready(finished),
            None => {
                state.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DirectiveState {
    /// Sequence member not reached yet.
    Pending,
    /// Stagger member counting down its start delay.
    Waiting { remaining_ms: f64 },
    Running,
    Done,
    Interrupted,
}

impl DirectiveState {
    #[inline]
    fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Interrupted)
    }
}

/// Drive one channel's progress from 0 to 1.
#[derive(Clone, Debug)]
pub struct Directive {
    pub key: String,
    pub duration_ms: f64,
    pub easing: Easing,
    pub state: DirectiveState,
}

impl Directive {
    pub fn new(key: impl Into<String>, duration_ms: f64, easing: Easing) -> Self {
        Self {
            key: key.into(),
            duration_ms,
            easing,
            state: DirectiveState::Pending,
        }
    }

    fn launch(&mut self, channels: &mut ChannelTable, native: bool) {
        self.state = match channels.get_mut(&self.key) {
            Some(ch) => {
                ch.progress
                    .set_target(1.0, self.duration_ms, self.easing.clone(), native);
                DirectiveState::Running
            }
            None => DirectiveState::Interrupted,
        };
    }

    /// Advance a running directive; returns the unused part of `dt_ms` once done.
    fn step(&mut self, dt_ms: f64, channels: &mut ChannelTable) -> Option<f64> {
        let advance = channels
            .get_mut(&self.key)
            .map(|ch| ch.progress.advance(dt_ms))
            .unwrap_or(Advance::Idle);
        match advance {
            Advance::Running => None,
            Advance::Finished { overflow_ms } => {
                self.state = DirectiveState::Done;
                Some(overflow_ms)
            }
            Advance::Idle => {
                self.state = DirectiveState::Interrupted;
                None
            }
        }
    }
}

/// Batch in flight.
#[derive(Debug)]
pub struct Batch {
    pub id: BatchId,
    pub animation_type: AnimationType,
    pub stop_together: bool,
    pub native: bool,
    directives: Vec<Directive>,
    cursor: usize,
    callback: Option<BatchCallback>,
    completion: Completion,
}

impl Batch {
    pub fn new(
        id: BatchId,
        animation_type: AnimationType,
        stop_together: bool,
        native: bool,
        directives: Vec<Directive>,
        callback: Option<BatchCallback>,
    ) -> Self {
        Self {
            id,
            animation_type,
            stop_together,
            native,
            directives,
            cursor: 0,
            callback,
            completion: Completion::new(),
        }
    }

    #[inline]
    pub fn completion(&self) -> Completion {
        self.completion.clone()
    }

    #[inline]
    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    /// Launch the directives that start immediately. Returns the outcome if the
    /// batch is already over (nothing to run).
    pub fn begin(&mut self, stagger_ms: f64, channels: &mut ChannelTable) -> Option<bool> {
        if self.directives.is_empty() {
            return Some(true);
        }
        let native = self.native;
        match self.animation_type {
            AnimationType::Sequence => self.directives[0].launch(channels, native),
            AnimationType::Parallel => self
                .directives
                .iter_mut()
                .for_each(|d| d.launch(channels, native)),
            AnimationType::Stagger => {
                for (i, d) in self.directives.iter_mut().enumerate() {
                    let delay = stagger_ms * i as f64;
                    if delay > 0.0 {
                        d.state = DirectiveState::Waiting {
                            remaining_ms: delay,
                        };
                    } else {
                        d.launch(channels, native);
                    }
                }
            }
        }
        self.outcome(channels)
    }

    /// Advance by `dt_ms`. Returns `Some(finished)` once the batch settles.
    pub fn tick(&mut self, dt_ms: f64, channels: &mut ChannelTable) -> Option<bool> {
        match self.animation_type {
            AnimationType::Sequence => self.tick_sequence(dt_ms, channels),
            AnimationType::Parallel | AnimationType::Stagger => {
                let native = self.native;
                for d in self.directives.iter_mut() {
                    let mut dt_left = dt_ms;
                    if let DirectiveState::Waiting { remaining_ms } = d.state {
                        if dt_ms < remaining_ms {
                            d.state = DirectiveState::Waiting {
                                remaining_ms: remaining_ms - dt_ms,
                            };
                            continue;
                        }
                        dt_left = dt_ms - remaining_ms;
                        d.launch(channels, native);
                    }
                    if d.state == DirectiveState::Running {
                        d.step(dt_left, channels);
                    }
                }
                self.outcome(channels)
            }
        }
    }

    fn tick_sequence(&mut self, dt_ms: f64, channels: &mut ChannelTable) -> Option<bool> {
        let native = self.native;
        let mut dt_left = dt_ms;
        while let Some(d) = self.directives.get_mut(self.cursor) {
            if d.state == DirectiveState::Pending {
                d.launch(channels, native);
            }
            if d.state == DirectiveState::Running {
                match d.step(dt_left, channels) {
                    Some(overflow_ms) => dt_left = overflow_ms,
                    None if d.state == DirectiveState::Running => return None,
                    None => {}
                }
            }
            if d.state == DirectiveState::Interrupted {
                return Some(false);
            }
            self.cursor += 1;
        }
        Some(true)
    }

    /// Mark the directive for `key` interrupted and stop its driver.
    pub fn interrupt(&mut self, key: &str, channels: &mut ChannelTable) -> Option<bool> {
        let idx = self
            .directives
            .iter()
            .position(|d| d.key == key && !d.state.is_terminal())?;
        self.directives[idx].state = DirectiveState::Interrupted;
        if let Some(ch) = channels.get_mut(key) {
            ch.progress.stop();
        }
        match self.animation_type {
            AnimationType::Sequence if idx == self.cursor => Some(false),
            AnimationType::Sequence => None,
            _ => self.outcome(channels),
        }
    }

    /// Outcome of a parallel/stagger group, applying `stop_together`.
    fn outcome(&mut self, channels: &mut ChannelTable) -> Option<bool> {
        if self.animation_type == AnimationType::Sequence {
            return match self.directives.get(self.cursor).map(|d| d.state) {
                Some(DirectiveState::Interrupted) => Some(false),
                _ => None,
            };
        }
        let interrupted = self
            .directives
            .iter()
            .any(|d| d.state == DirectiveState::Interrupted);
        if interrupted && self.stop_together {
            self.halt(channels);
            return Some(false);
        }
        if self.directives.iter().all(|d| d.state.is_terminal()) {
            return Some(!interrupted);
        }
        None
    }

    /// Stop every directive still in flight.
    pub fn halt(&mut self, channels: &mut ChannelTable) {
        for d in self.directives.iter_mut().filter(|d| !d.state.is_terminal()) {
            if d.state == DirectiveState::Running {
                if let Some(ch) = channels.get_mut(&d.key) {
                    ch.progress.stop();
                }
            }
            d.state = DirectiveState::Interrupted;
        }
    }

    /// Invoke the callback and resolve the completion.
    pub fn settle(self, finished: bool) {
        log::debug!("batch {:?} settled, finished={finished}", self.id);
        if let Some(cb) = &self.callback {
            cb.call(finished);
        }
        self.completion.resolve(finished);
    }

    /// Resolve the completion without running the callback.
    pub fn abandon(self) {
        self.completion.resolve(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Channel;
    use crate::style::StylePath;
    use crate::value::StyleValue;

    fn table(keys: &[&str]) -> ChannelTable {
        let mut t = ChannelTable::new();
        for k in keys {
            t.insert(Channel::new(
                StylePath::prop(*k),
                None,
                (StyleValue::Number(0.0), StyleValue::Number(1.0)),
            ));
        }
        t
    }

    fn batch(kind: AnimationType, keys: &[&str], stop_together: bool) -> Batch {
        let directives = keys
            .iter()
            .map(|k| Directive::new(*k, 100.0, Easing::Linear))
            .collect();
        Batch::new(BatchId(0), kind, stop_together, false, directives, None)
    }

    fn progress(t: &ChannelTable, key: &str) -> f64 {
        t.get(key).unwrap().progress.value()
    }

    #[test]
    fn parallel_runs_together() {
        let mut t = table(&["a", "b"]);
        let mut b = batch(AnimationType::Parallel, &["a", "b"], true);
        assert_eq!(b.begin(0.0, &mut t), None);
        assert_eq!(b.tick(50.0, &mut t), None);
        assert_eq!(progress(&t, "a"), 0.5);
        assert_eq!(progress(&t, "b"), 0.5);
        assert_eq!(b.tick(50.0, &mut t), Some(true));
    }

    #[test]
    fn sequence_carries_overflow() {
        let mut t = table(&["a", "b"]);
        let mut b = batch(AnimationType::Sequence, &["a", "b"], true);
        b.begin(0.0, &mut t);
        assert_eq!(b.tick(125.0, &mut t), None);
        assert_eq!(progress(&t, "a"), 1.0);
        assert_eq!(progress(&t, "b"), 0.25);
        assert_eq!(b.tick(75.0, &mut t), Some(true));
    }

    #[test]
    fn stagger_delays_each_start() {
        let mut t = table(&["a", "b", "c"]);
        let mut b = batch(AnimationType::Stagger, &["a", "b", "c"], true);
        b.begin(50.0, &mut t);
        b.tick(75.0, &mut t);
        assert_eq!(progress(&t, "a"), 0.75);
        assert_eq!(progress(&t, "b"), 0.25);
        assert_eq!(progress(&t, "c"), 0.0);
        assert_eq!(b.tick(125.0, &mut t), Some(true));
    }

    #[test]
    fn interrupt_with_stop_together_halts_siblings() {
        let mut t = table(&["a", "b"]);
        let mut b = batch(AnimationType::Parallel, &["a", "b"], true);
        b.begin(0.0, &mut t);
        b.tick(20.0, &mut t);
        assert_eq!(b.interrupt("a", &mut t), Some(false));
        assert!(!t.get("b").unwrap().progress.is_running());
    }

    #[test]
    fn interrupt_without_stop_together_lets_siblings_finish() {
        let mut t = table(&["a", "b"]);
        let mut b = batch(AnimationType::Parallel, &["a", "b"], false);
        b.begin(0.0, &mut t);
        assert_eq!(b.interrupt("a", &mut t), None);
        assert_eq!(b.tick(100.0, &mut t), Some(false));
        assert_eq!(progress(&t, "b"), 1.0);
    }

    #[test]
    fn deleted_channel_interrupts_sequence() {
        let mut t = table(&["a", "b"]);
        let mut b = batch(AnimationType::Sequence, &["a", "b"], true);
        b.begin(0.0, &mut t);
        t.remove("b");
        assert_eq!(b.tick(150.0, &mut t), Some(false));
    }

    #[test]
    fn empty_batch_finishes_immediately() {
        let mut t = ChannelTable::new();
        let mut b = batch(AnimationType::Parallel, &[], true);
        assert_eq!(b.begin(0.0, &mut t), Some(true));
    }

    #[test]
    fn completion_settles_once() {
        let completion = Completion::new();
        assert_eq!(completion.result(), None);
        completion.resolve(false);
        completion.resolve(true);
        assert_eq!(completion.result(), Some(false));
        assert_eq!(Completion::resolved(true).result(), Some(true));
    }

    #[test]
    fn settle_runs_callback() {
        use std::cell::Cell;
        let seen = Rc::new(Cell::new(None));
        let sink = seen.clone();
        let b = Batch::new(
            BatchId(1),
            AnimationType::Parallel,
            true,
            false,
            vec![],
            Some(BatchCallback::new(move |f| sink.set(Some(f)))),
        );
        let completion = b.completion();
        b.settle(true);
        assert_eq!(seen.get(), Some(true));
        assert_eq!(completion.result(), Some(true));
    }
}
