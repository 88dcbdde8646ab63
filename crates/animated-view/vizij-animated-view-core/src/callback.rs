//! Host callbacks. Cheap to clone; invoked on the thread that ticks the view.

use std::fmt;
use std::rc::Rc;

use crate::outputs::FrameInfo;

/// Called with every progress report of a channel.
#[derive(Clone)]
pub struct FrameCallback(Rc<dyn Fn(&FrameInfo)>);

impl FrameCallback {
    pub fn new(f: impl Fn(&FrameInfo) + 'static) -> Self {
        Self(Rc::new(f))
    }

    #[inline]
    pub fn call(&self, info: &FrameInfo) {
        (self.0)(info)
    }
}

impl fmt::Debug for FrameCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FrameCallback(..)")
    }
}

/// Called once when a batch settles, with `true` iff it ran to completion.
#[derive(Clone)]
pub struct BatchCallback(Rc<dyn Fn(bool)>);

impl BatchCallback {
    pub fn new(f: impl Fn(bool) + 'static) -> Self {
        Self(Rc::new(f))
    }

    #[inline]
    pub fn call(&self, finished: bool) {
        (self.0)(finished)
    }
}

impl fmt::Debug for BatchCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BatchCallback(..)")
    }
}
