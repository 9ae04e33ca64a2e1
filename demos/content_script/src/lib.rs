// Copyright 2026 the Altlens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Content script for the altlens browser extension.
//!
//! Installs an [`ActivationBridge`] over [`DomPage`] and [`DomSurface`] in a
//! thread-local runtime and exports the entry points the extension's
//! background and popup pages call:
//!
//! - `show()` / `hide()`: toggle overlays on the current page.
//! - `restore(tabId, enabled, url)`: on page load, re-show if enabled.
//! - `refresh()`: run a pass immediately.
//! - `reportHostFailure(tabId, message)`: log an injection failure.
//! - `configure(debounceMs, trackMutations, verbose)`: call before `show()`.
//! - `toggleLabel(enabled)`: popup button label.
//!
//! DOM callbacks (listeners, the debounce timer, close buttons) reach the
//! runtime through `try_borrow_mut`; one that arrives while the runtime is
//! already borrowed is dropped.
//!
//! Build with: `wasm-pack build --target web demos/content_script`

#![cfg_attr(
    not(target_arch = "wasm32"),
    allow(dead_code, reason = "the entry points only run in the browser")
)]

use std::cell::{Cell, RefCell};

use wasm_bindgen::prelude::*;

use altlens_backend_web::{ConsoleSink, DomPage, DomSurface, now};
use altlens_core::backend::LayoutEvent;
use altlens_core::bridge::{ActivationBridge, Session, SessionId, SessionState};
use altlens_core::config::OverlayConfig;
use altlens_core::controller::Controller;
use altlens_core::overlay::OverlayId;
use altlens_core::time::Duration;
use altlens_core::trace::{HostFailureEvent, Tracer};

type DomBridge = ActivationBridge<DomPage, DomSurface>;

struct Runtime {
    bridge: DomBridge,
    sink: ConsoleSink,
}

thread_local! {
    static RUNTIME: RefCell<Option<Runtime>> = const { RefCell::new(None) };
    static CONFIG: Cell<OverlayConfig> = const { Cell::new(OverlayConfig::web()) };
    static VERBOSE: Cell<bool> = const { Cell::new(false) };
}

fn build_runtime() -> Result<Runtime, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let config = CONFIG.get();
    let page = DomPage::new(
        window,
        config.container_marker,
        dispatch_layout_event,
        dispatch_wakeup,
    )
    .ok_or_else(|| JsValue::from_str("no document"))?;
    let surface = DomSurface::new(page.document().clone(), dispatch_dismiss);
    Ok(Runtime {
        bridge: ActivationBridge::new(Controller::new(page, surface, config)),
        sink: ConsoleSink {
            verbose: VERBOSE.get(),
        },
    })
}

fn ensure_runtime() -> Result<(), JsValue> {
    RUNTIME.with(|cell| {
        let mut slot = cell
            .try_borrow_mut()
            .map_err(|_| JsValue::from_str("altlens is busy"))?;
        if slot.is_none() {
            *slot = Some(build_runtime()?);
        }
        Ok(())
    })
}

/// Runs `f` against the installed runtime.
///
/// Returns `None` if nothing is installed or the runtime is already
/// borrowed further up the stack.
fn with_runtime<R>(f: impl FnOnce(&mut DomBridge, &mut Tracer<'_>) -> R) -> Option<R> {
    RUNTIME.with(|cell| {
        let mut slot = cell.try_borrow_mut().ok()?;
        let Runtime { bridge, sink } = slot.as_mut()?;
        let mut tracer = Tracer::new(sink);
        Some(f(bridge, &mut tracer))
    })
}

fn dispatch_layout_event(event: LayoutEvent) {
    with_runtime(|bridge, tracer| {
        bridge.controller_mut().on_layout_event(event, now(), tracer);
    });
}

fn dispatch_wakeup() {
    with_runtime(|bridge, tracer| {
        bridge.controller_mut().flush(tracer);
    });
}

fn dispatch_dismiss(id: OverlayId) {
    with_runtime(|bridge, tracer| {
        bridge.controller_mut().dismiss(id, tracer);
    });
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Shows overlays on the current page. Returns the number rendered.
///
/// # Errors
///
/// Fails if the page has no `<body>` yet or the DOM rejects the container.
#[wasm_bindgen]
pub fn show() -> Result<u32, JsValue> {
    ensure_runtime()?;
    with_runtime(|bridge, tracer| bridge.show(now(), tracer))
        .ok_or_else(|| JsValue::from_str("altlens is busy"))?
        .map(|summary| count(summary.rendered))
        .map_err(|err| JsValue::from_str(&err.to_string()))
}

/// Hides overlays. Returns the number removed by the running instance.
///
/// Every container carrying the marker is removed, including one left by an
/// earlier injection that this module instance never managed.
#[wasm_bindgen]
pub fn hide() -> u32 {
    if let Some(removed) = with_runtime(|bridge, tracer| bridge.hide(tracer)) {
        return count(removed);
    }
    // No runtime to ask, or it is busy further up the stack.
    remove_containers(CONFIG.get().container_marker);
    0
}

fn remove_containers(marker: &str) {
    let Some(doc) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    while let Some(el) = doc.get_element_by_id(marker) {
        el.remove();
    }
}

/// Re-shows overlays after a page load if the tab was enabled and `url` is
/// an `http(s)` page. Returns whether overlays were shown.
///
/// # Errors
///
/// See [`show`].
#[wasm_bindgen]
pub fn restore(tab_id: u32, enabled: bool, url: &str) -> Result<bool, JsValue> {
    ensure_runtime()?;
    let session = Session {
        id: SessionId(u64::from(tab_id)),
        state: SessionState::from_enabled(enabled),
    };
    match with_runtime(|bridge, tracer| bridge.restore(&session, url, now(), tracer)) {
        Some(Some(Ok(_))) => Ok(true),
        Some(Some(Err(err))) => Err(JsValue::from_str(&err.to_string())),
        Some(None) => Ok(false),
        None => Err(JsValue::from_str("altlens is busy")),
    }
}

/// Reports an injection or permission failure for a tab to the console.
#[wasm_bindgen(js_name = reportHostFailure)]
pub fn report_host_failure(tab_id: u32, message: &str) {
    let session = Some(SessionId(u64::from(tab_id)));
    let reported = with_runtime(|bridge, tracer| {
        bridge.report_host_failure(session, message, tracer);
    });
    if reported.is_none() {
        let mut sink = ConsoleSink::default();
        let mut tracer = Tracer::new(&mut sink);
        tracer.host_failure(&HostFailureEvent { session, message });
    }
}

/// Runs a pass right away. Returns the number rendered, or `None` if hidden.
#[wasm_bindgen]
pub fn refresh() -> Option<u32> {
    with_runtime(|bridge, tracer| bridge.controller_mut().refresh(tracer))
        .flatten()
        .map(|summary| count(summary.rendered))
}

/// Replaces the configuration. Hides current overlays; the next `show()`
/// uses the new settings.
#[wasm_bindgen]
pub fn configure(debounce_ms: u32, track_mutations: bool, verbose: bool) {
    hide();
    RUNTIME.with(|cell| {
        if let Ok(mut slot) = cell.try_borrow_mut() {
            slot.take();
        }
    });
    CONFIG.set(
        OverlayConfig::web()
            .with_debounce(Duration::from_millis(u64::from(debounce_ms)))
            .with_mutations(track_mutations),
    );
    VERBOSE.set(verbose);
}

/// Label for the popup toggle.
#[wasm_bindgen(js_name = toggleLabel)]
#[must_use]
pub fn toggle_label(enabled: bool) -> String {
    altlens_core::bridge::toggle_label(SessionState::from_enabled(enabled)).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_saturate() {
        assert_eq!(count(3), 3);
        assert_eq!(count(usize::MAX), u32::MAX);
    }

    #[test]
    fn toggle_labels() {
        assert_eq!(toggle_label(true), "Hide Alt Text");
        assert_eq!(toggle_label(false), "Show Alt Text");
    }

    #[test]
    fn default_config_is_web() {
        assert_eq!(CONFIG.get(), OverlayConfig::web());
        assert!(!VERBOSE.get());
    }
}
