// Copyright 2026 the Altlens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated page session that exercises the tracing and diagnostics pipeline.
//!
//! Drives an [`ActivationBridge`] over the in-memory page through show,
//! scrolling, a dismiss, a page script deleting the container, and hide.
//! Events go to both a
//! [`PrettyPrintSink`](altlens_debug::pretty::PrettyPrintSink) on stdout and
//! a [`RecorderSink`](altlens_debug::recorder::RecorderSink), which is then
//! exported as JSON lines.

use std::fs::File;
use std::io::BufWriter;

use kurbo::{Rect, Vec2};

use altlens_core::backend::LayoutEvent;
use altlens_core::bridge::{ActivationBridge, MemorySessionStore, Session, SessionId};
use altlens_core::config::OverlayConfig;
use altlens_core::controller::Controller;
use altlens_core::memory::{MemoryElement, MemoryPage, MemorySurface};
use altlens_core::time::{Duration, HostTime};
use altlens_core::trace::{
    ActivateEvent, DeactivateEvent, DismissEvent, ElementSkipEvent, HostFailureEvent,
    LayoutEventTrace, PageFailureEvent, PassSummary, TraceSink, Tracer,
};

use altlens_debug::pretty::PrettyPrintSink;
use altlens_debug::recorder::RecorderSink;

/// Forwards every event to both sinks.
struct Both<'a> {
    pretty: &'a mut PrettyPrintSink,
    recorder: &'a mut RecorderSink,
}

impl TraceSink for Both<'_> {
    fn on_activate(&mut self, e: &ActivateEvent) {
        self.pretty.on_activate(e);
        self.recorder.on_activate(e);
    }

    fn on_deactivate(&mut self, e: &DeactivateEvent) {
        self.pretty.on_deactivate(e);
        self.recorder.on_deactivate(e);
    }

    fn on_layout_event(&mut self, e: &LayoutEventTrace) {
        self.pretty.on_layout_event(e);
        self.recorder.on_layout_event(e);
    }

    fn on_pass(&mut self, s: &PassSummary) {
        self.pretty.on_pass(s);
        self.recorder.on_pass(s);
    }

    fn on_element_skip(&mut self, e: &ElementSkipEvent) {
        self.pretty.on_element_skip(e);
        self.recorder.on_element_skip(e);
    }

    fn on_dismiss(&mut self, e: &DismissEvent) {
        self.pretty.on_dismiss(e);
        self.recorder.on_dismiss(e);
    }

    fn on_page_failure(&mut self, e: &PageFailureEvent) {
        self.pretty.on_page_failure(e);
        self.recorder.on_page_failure(e);
    }

    fn on_host_failure(&mut self, e: &HostFailureEvent<'_>) {
        self.pretty.on_host_failure(e);
        self.recorder.on_host_failure(e);
    }
}

fn page() -> MemoryPage {
    let mut page = MemoryPage::new();
    page.push(MemoryElement::image(
        Rect::new(10.0, 20.0, 110.0, 80.0),
        Some("A cat on a sofa"),
    ));
    page.push(MemoryElement::image(Rect::new(10.0, 100.0, 60.0, 150.0), Some("")));
    page.push(MemoryElement::image(Rect::new(10.0, 200.0, 60.0, 250.0), None));
    // Tracking pixel.
    page.push(MemoryElement::image(Rect::new(0.0, 0.0, 0.0, 0.0), None));
    page.push(MemoryElement::iframe(
        Rect::new(200.0, 20.0, 500.0, 320.0),
        "https://video.example.com/embed/42",
    ));
    page
}

fn main() {
    let mut pretty = PrettyPrintSink::new(Box::new(std::io::stdout()));
    let mut recorder = RecorderSink::new();

    let config = OverlayConfig::web().with_mutations(true);
    let debounce = config.debounce;
    let mut bridge = ActivationBridge::new(Controller::new(page(), MemorySurface::new(), config));
    let mut store = MemorySessionStore::new();
    let mut session = Session::load(&store, SessionId(7));

    {
        let mut both = Both {
            pretty: &mut pretty,
            recorder: &mut recorder,
        };
        let mut tracer = Tracer::new(&mut both);
        let mut now = HostTime(1_000_000);

        // The popup toggle turns the tab on.
        bridge
            .toggle(&mut store, &mut session, true, now, &mut tracer)
            .expect("failed to show overlays");

        // A burst of scrolls collapses into one pass.
        for step in 1..=5 {
            now = now + Duration::from_millis(16);
            bridge
                .controller_mut()
                .page_mut()
                .set_scroll(Vec2::new(0.0, f64::from(step) * 40.0));
            bridge
                .controller_mut()
                .on_layout_event(LayoutEvent::Scroll, now, &mut tracer);
        }
        now = now + debounce;
        bridge.controller_mut().poll(now, &mut tracer);

        // The user closes the first overlay.
        if let Some(id) = bridge.controller().surface().overlays().first().map(|o| o.id) {
            bridge.controller_mut().dismiss(id, &mut tracer);
            // A second click on the same button after the next pass is stale.
            bridge.controller_mut().refresh(&mut tracer);
            bridge.controller_mut().dismiss(id, &mut tracer);
        }

        // A page script wipes the container; the next pass rebuilds it.
        bridge.controller_mut().surface_mut().detach_container();
        now = now + Duration::from_millis(5);
        bridge
            .controller_mut()
            .on_layout_event(LayoutEvent::Mutation, now, &mut tracer);
        bridge.controller_mut().flush(&mut tracer);

        // Reloading into a privileged page is not injectable.
        assert!(
            bridge
                .restore(&session, "chrome://settings", now, &mut tracer)
                .is_none(),
            "privileged pages are never injected"
        );
        bridge.report_host_failure(
            Some(session.id),
            "Cannot access a chrome:// URL",
            &mut tracer,
        );

        bridge
            .toggle(&mut store, &mut session, false, now, &mut tracer)
            .expect("failed to hide overlays");
    }

    let path = "altlens_trace.jsonl";
    let file = File::create(path).expect("failed to create altlens_trace.jsonl");
    let mut writer = BufWriter::new(file);
    altlens_debug::json::export(recorder.events(), &mut writer).expect("failed to write trace");

    println!("Wrote {path} ({} events)", recorder.events().len());
}
