// Copyright 2026 the Altlens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Host times
//! are printed in milliseconds.

use std::io::Write;

use altlens_core::time::HostTime;
use altlens_core::trace::{
    ActivateEvent, DeactivateEvent, DismissEvent, ElementSkipEvent, HostFailureEvent,
    LayoutEventTrace, PageFailureEvent, PassReason, PassSummary, SkipReason, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the destination.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn ms(t: HostTime) -> f64 {
    t.ticks() as f64 / 1000.0
}

fn reason_name(reason: PassReason) -> &'static str {
    match reason {
        PassReason::Activate => "activate",
        PassReason::Layout(event) => event.dom_type().unwrap_or("mutation"),
        PassReason::Manual => "manual",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_activate(&mut self, e: &ActivateEvent) {
        let _ = writeln!(
            self.writer,
            "[activate] at={:.1}ms was_active={} stale_removed={}",
            ms(e.at),
            e.was_active,
            e.stale_container_removed,
        );
    }

    fn on_deactivate(&mut self, e: &DeactivateEvent) {
        let _ = writeln!(
            self.writer,
            "[deactivate] overlays={} listeners={}",
            e.overlays_removed, e.listeners_removed,
        );
    }

    fn on_layout_event(&mut self, e: &LayoutEventTrace) {
        let _ = writeln!(
            self.writer,
            "[layout] {:?} at={:.1}ms deadline={:.1}ms",
            e.event,
            ms(e.at),
            ms(e.deadline),
        );
    }

    fn on_pass(&mut self, s: &PassSummary) {
        let _ = write!(
            self.writer,
            "[pass] gen={} reason={} container={:?} scanned={} rendered={} \
             degenerate={} skipped={}",
            s.generation,
            reason_name(s.reason),
            s.container,
            s.scanned,
            s.rendered,
            s.degenerate,
            s.skipped,
        );
        for (c, n) in s.classified.iter().filter(|&(_, n)| n > 0) {
            let _ = write!(self.writer, " {}={n}", c.as_str());
        }
        let _ = writeln!(self.writer);
    }

    fn on_element_skip(&mut self, e: &ElementSkipEvent) {
        let _ = match &e.reason {
            SkipReason::MalformedRect => writeln!(
                self.writer,
                "[skip] gen={} slot={} <{}> malformed rect",
                e.generation,
                e.slot,
                e.kind.tag_name(),
            ),
            SkipReason::Surface(err) => writeln!(
                self.writer,
                "[skip] gen={} slot={} <{}> surface: {err}",
                e.generation,
                e.slot,
                e.kind.tag_name(),
            ),
        };
    }

    fn on_dismiss(&mut self, e: &DismissEvent) {
        let result = if e.removed { "removed" } else { "ignored" };
        let _ = writeln!(
            self.writer,
            "[dismiss] slot={} gen={} {result}",
            e.id.slot(),
            e.id.generation(),
        );
    }

    fn on_page_failure(&mut self, e: &PageFailureEvent) {
        let _ = match e.event {
            Some(event) => writeln!(self.writer, "[page] {event:?}: {}", e.error),
            None => writeln!(self.writer, "[page] {}", e.error),
        };
    }

    fn on_host_failure(&mut self, e: &HostFailureEvent<'_>) {
        let _ = match e.session {
            Some(id) => writeln!(self.writer, "[host] tab {}: {}", id.0, e.message),
            None => writeln!(self.writer, "[host] {}", e.message),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use altlens_core::backend::LayoutEvent;
    use altlens_core::error::SurfaceError;
    use altlens_core::overlay::OverlayId;
    use altlens_core::target::TargetKind;
    use altlens_core::annotation::Classification;
    use altlens_core::trace::{ClassificationCounts, ContainerStatus};

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn pretty_print_pass() {
        let mut classified = ClassificationCounts::default();
        classified.record(Classification::Empty);
        classified.record(Classification::Missing);
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_pass(&PassSummary {
            generation: 3,
            reason: PassReason::Layout(LayoutEvent::Scroll),
            container: ContainerStatus::Reused,
            scanned: 4,
            rendered: 2,
            classified,
            degenerate: 1,
            skipped: 1,
        });
        let out = output(sink);
        assert!(out.starts_with("[pass] gen=3 reason=scroll"), "got: {out}");
        assert!(out.contains("rendered=2"), "got: {out}");
        assert!(out.ends_with("skipped=1 empty=1 missing=1\n"), "got: {out}");
    }

    #[test]
    fn pretty_print_layout_times_in_ms() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_layout_event(&LayoutEventTrace {
            event: LayoutEvent::Resize,
            at: HostTime(1_500),
            deadline: HostTime(201_500),
        });
        let out = output(sink);
        assert!(out.contains("at=1.5ms deadline=201.5ms"), "got: {out}");
    }

    #[test]
    fn pretty_print_skip_and_dismiss() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_element_skip(&ElementSkipEvent {
            generation: 1,
            slot: 0,
            kind: TargetKind::Iframe,
            reason: SkipReason::Surface(SurfaceError::MissingContainer),
        });
        sink.on_dismiss(&DismissEvent {
            id: OverlayId::new(2, 1),
            removed: false,
        });
        let out = output(sink);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("[skip] gen=1 slot=0 <iframe> surface:"));
        assert_eq!(lines[1], "[dismiss] slot=2 gen=1 ignored");
    }

    #[test]
    fn pretty_print_host_failure() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_host_failure(&HostFailureEvent {
            session: Some(altlens_core::bridge::SessionId(9)),
            message: "no permission",
        });
        assert_eq!(output(sink), "[host] tab 9: no permission\n");
    }
}
