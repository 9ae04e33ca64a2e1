// Copyright 2026 the Altlens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `setTimeout` wakeup source.
//!
//! [`WakeupTimer`] is the one-shot timer behind debounced re-passes. Each
//! [`schedule`](WakeupTimer::schedule) clears the previous timeout and arms a
//! new one, so the callback runs once per quiet period. A single JS closure
//! is created up front and reused for every timeout.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use altlens_core::time::{Duration, HostTime};

// Global bindings so timer and clock reads don't go through `Window`.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "setTimeout")]
    fn set_timeout(callback: &JsValue, delay_ms: i32) -> i32;

    #[wasm_bindgen(js_name = "clearTimeout")]
    fn clear_timeout(id: i32);
}

/// Returns the current host time from `performance.now()`.
#[must_use]
pub fn now() -> HostTime {
    HostTime::from_millis_f64(performance_now())
}

/// A one-shot, re-armable `setTimeout` timer.
pub struct WakeupTimer {
    inner: Rc<TimerInner>,
}

struct TimerInner {
    /// The JS closure handed to `setTimeout`. Set once in `new()`.
    closure: RefCell<Option<Closure<dyn FnMut()>>>,

    /// The ID of the pending timeout, if armed.
    timeout_id: Cell<Option<i32>>,

    /// Number of times the callback has fired.
    fired: Cell<u64>,
}

impl WakeupTimer {
    /// Creates a disarmed timer that runs `callback` each time it fires.
    pub fn new(callback: impl Fn() + 'static) -> Self {
        let inner = Rc::new(TimerInner {
            closure: RefCell::new(None),
            timeout_id: Cell::new(None),
            fired: Cell::new(0),
        });

        // Weak so the closure stored in `inner` does not keep `inner` alive.
        let weak = Rc::downgrade(&inner);
        let closure = Closure::wrap(Box::new(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.timeout_id.set(None);
            inner.fired.set(inner.fired.get() + 1);
            callback();
        }) as Box<dyn FnMut()>);
        *inner.closure.borrow_mut() = Some(closure);

        Self { inner }
    }

    /// Arms the timer to fire once after `delay`, replacing any pending
    /// timeout.
    pub fn schedule(&self, delay: Duration) {
        self.cancel();
        let ms = i32::try_from(delay.as_millis_ceil()).unwrap_or(i32::MAX);
        if let Some(ref closure) = *self.inner.closure.borrow() {
            let id = set_timeout(closure.as_ref().unchecked_ref(), ms);
            self.inner.timeout_id.set(Some(id));
        }
    }

    /// Disarms the timer. No-op if not armed.
    pub fn cancel(&self) {
        if let Some(id) = self.inner.timeout_id.take() {
            clear_timeout(id);
        }
    }

    /// Returns `true` while a timeout is pending.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.inner.timeout_id.get().is_some()
    }
}

impl Drop for WakeupTimer {
    fn drop(&mut self) {
        self.cancel();
        // Drop the JS closure so it doesn't leak.
        self.inner.closure.borrow_mut().take();
    }
}

impl core::fmt::Debug for WakeupTimer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WakeupTimer")
            .field("armed", &self.is_armed())
            .field("fired", &self.inner.fired.get())
            .finish()
    }
}
