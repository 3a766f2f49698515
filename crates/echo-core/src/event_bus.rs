//! Event queue between timer callbacks / spawned tasks and the frame loop.
//!
//! The bus is single-threaded (WASM constraint) and uses interior mutability
//! via RefCell. Events are buffered and drained by the app on each frame.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use echo_types::event::AppEvent;

/// Shared event bus, cloned by handle.
#[derive(Clone)]
pub struct EventBus {
    inner: Rc<RefCell<VecDeque<AppEvent>>>,
    waker: Rc<RefCell<Option<Box<dyn Fn()>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(VecDeque::new())),
            waker: Rc::new(RefCell::new(None)),
        }
    }

    /// Install a callback run after every emit (egui's `request_repaint`).
    pub fn set_waker(&self, waker: impl Fn() + 'static) {
        *self.waker.borrow_mut() = Some(Box::new(waker));
    }

    pub fn emit(&self, event: AppEvent) {
        self.inner.borrow_mut().push_back(event);
        if let Some(wake) = self.waker.borrow().as_ref() {
            wake();
        }
    }

    /// Drain all pending events. Called by the app each frame.
    pub fn drain(&self) -> Vec<AppEvent> {
        self.inner.borrow_mut().drain(..).collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.inner.borrow().is_empty()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
