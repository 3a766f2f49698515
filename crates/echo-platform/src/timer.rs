//! Browser clock and timers.

use async_trait::async_trait;
use gloo_timers::callback::Interval;
use gloo_timers::future::TimeoutFuture;

use echo_core::event_bus::EventBus;
use echo_core::ports::TimerPort;
use echo_types::event::AppEvent;

/// `TimerPort` backed by `setTimeout` and `Date.now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserTimer;

impl BrowserTimer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait(?Send)]
impl TimerPort for BrowserTimer {
    async fn sleep(&self, ms: u32) {
        TimeoutFuture::new(ms).await;
    }

    fn now_ms(&self) -> i64 {
        js_sys::Date::now() as i64
    }
}

/// Emits `event` on the bus every `period_ms` until dropped.
///
/// The interval is cleared when the value is dropped, so replacing a
/// `PollTimer` field cancels the old schedule.
pub struct PollTimer {
    period_ms: u32,
    event: AppEvent,
    _interval: Interval,
}

impl PollTimer {
    pub fn start(period_ms: u32, bus: &EventBus, event: AppEvent) -> Self {
        let bus = bus.clone();
        let tick = event.clone();
        let interval = Interval::new(period_ms, move || bus.emit(tick.clone()));
        log::debug!("Poll timer started: {:?} every {}ms", event, period_ms);
        Self {
            period_ms,
            event,
            _interval: interval,
        }
    }

    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    pub fn event(&self) -> &AppEvent {
        &self.event
    }
}

impl Drop for PollTimer {
    fn drop(&mut self) {
        log::debug!("Poll timer stopped: {:?}", self.event);
    }
}
