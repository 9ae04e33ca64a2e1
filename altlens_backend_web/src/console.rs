// Copyright 2026 the Altlens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser console diagnostics.

use alloc::format;
use core::fmt::Write as _;

use wasm_bindgen::JsValue;
use web_sys::console;

use altlens_core::trace::{
    ActivateEvent, DeactivateEvent, ElementSkipEvent, HostFailureEvent, PageFailureEvent,
    PassSummary, TraceSink,
};

/// A [`TraceSink`] writing to the browser console.
///
/// Failures go to `console.warn` unconditionally. Lifecycle events go to
/// `console.debug` only when `verbose` is set.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleSink {
    /// Also log activation, deactivation and pass summaries.
    pub verbose: bool,
}

impl ConsoleSink {
    fn debug(&self, msg: &str) {
        if self.verbose {
            console::debug_1(&JsValue::from_str(msg));
        }
    }
}

fn warn(msg: &str) {
    console::warn_1(&JsValue::from_str(msg));
}

impl TraceSink for ConsoleSink {
    fn on_activate(&mut self, e: &ActivateEvent) {
        self.debug(&format!(
            "[altlens] activate was_active={} stale_removed={}",
            e.was_active, e.stale_container_removed,
        ));
    }

    fn on_deactivate(&mut self, e: &DeactivateEvent) {
        self.debug(&format!(
            "[altlens] deactivate overlays={} listeners={}",
            e.overlays_removed, e.listeners_removed,
        ));
    }

    fn on_pass(&mut self, s: &PassSummary) {
        if !self.verbose {
            return;
        }
        let mut line = format!(
            "[altlens] pass={} reason={:?} container={:?} scanned={} rendered={} degenerate={} skipped={}",
            s.generation, s.reason, s.container, s.scanned, s.rendered, s.degenerate, s.skipped,
        );
        for (c, n) in s.classified.iter().filter(|&(_, n)| n > 0) {
            let _ = write!(line, " {}={n}", c.as_str());
        }
        self.debug(&line);
    }

    fn on_element_skip(&mut self, e: &ElementSkipEvent) {
        warn(&format!(
            "[altlens] skipped {} #{} in pass {}: {:?}",
            e.kind.tag_name(),
            e.slot,
            e.generation,
            e.reason,
        ));
    }

    fn on_page_failure(&mut self, e: &PageFailureEvent) {
        warn(&format!("[altlens] {:?}: {}", e.event, e.error));
    }

    fn on_host_failure(&mut self, e: &HostFailureEvent<'_>) {
        match e.session {
            Some(id) => warn(&format!("Could not inject into tab {}: {}", id.0, e.message)),
            None => warn(&format!("Could not inject: {}", e.message)),
        }
    }
}
