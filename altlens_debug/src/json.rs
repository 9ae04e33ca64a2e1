// Copyright 2026 the Altlens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON lines exporter.
//!
//! [`export`] writes events captured by a
//! [`RecorderSink`](super::recorder::RecorderSink) as one JSON object per
//! line. Every object has an `"event"` field naming its kind; times are in
//! microseconds.

use std::io::{self, Write};

use serde_json::{Map, Value, json};

use altlens_core::trace::SkipReason;

use crate::recorder::RecordedEvent;

/// Writes `events` to `writer` as JSON lines.
///
/// # Errors
///
/// Returns any error from the writer.
pub fn export(events: &[RecordedEvent], writer: &mut dyn Write) -> io::Result<()> {
    for event in events {
        serde_json::to_writer(&mut *writer, &to_value(event))?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

/// Converts one recorded event to a JSON object.
#[must_use]
pub fn to_value(event: &RecordedEvent) -> Value {
    let name = event.name();
    match event {
        RecordedEvent::Activate(e) => json!({
            "event": name,
            "at_us": e.at.ticks(),
            "was_active": e.was_active,
            "stale_container_removed": e.stale_container_removed,
        }),
        RecordedEvent::Deactivate(e) => json!({
            "event": name,
            "overlays_removed": e.overlays_removed,
            "listeners_removed": e.listeners_removed,
        }),
        RecordedEvent::Layout(e) => json!({
            "event": name,
            "kind": format!("{:?}", e.event),
            "at_us": e.at.ticks(),
            "deadline_us": e.deadline.ticks(),
        }),
        RecordedEvent::Pass(s) => {
            let classified: Map<String, Value> = s
                .classified
                .iter()
                .map(|(c, n)| (c.as_str().to_owned(), Value::from(n)))
                .collect();
            json!({
                "event": name,
                "generation": s.generation,
                "reason": format!("{:?}", s.reason),
                "container": format!("{:?}", s.container),
                "scanned": s.scanned,
                "rendered": s.rendered,
                "classified": classified,
                "degenerate": s.degenerate,
                "skipped": s.skipped,
            })
        }
        RecordedEvent::ElementSkip(e) => {
            let reason = match &e.reason {
                SkipReason::MalformedRect => "malformed rect".to_owned(),
                SkipReason::Surface(err) => err.to_string(),
            };
            json!({
                "event": name,
                "generation": e.generation,
                "slot": e.slot,
                "tag": e.kind.tag_name(),
                "reason": reason,
            })
        }
        RecordedEvent::Dismiss(e) => json!({
            "event": name,
            "slot": e.id.slot(),
            "generation": e.id.generation(),
            "removed": e.removed,
        }),
        RecordedEvent::PageFailure(e) => json!({
            "event": name,
            "kind": e.event.map(|k| format!("{k:?}")),
            "error": e.error.to_string(),
        }),
        RecordedEvent::HostFailure { session, message } => json!({
            "event": name,
            "session": session.map(|id| id.0),
            "message": message,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use altlens_core::backend::LayoutEvent;
    use altlens_core::bridge::SessionId;
    use altlens_core::error::PageError;
    use altlens_core::time::HostTime;
    use altlens_core::annotation::Classification;
    use altlens_core::trace::{
        ActivateEvent, ClassificationCounts, ContainerStatus, HostFailureEvent, PageFailureEvent,
        PassReason, PassSummary, TraceSink,
    };

    #[test]
    fn export_writes_one_object_per_line() {
        let mut rec = RecorderSink::new();
        rec.on_activate(&ActivateEvent {
            at: HostTime(2_000),
            was_active: false,
            stale_container_removed: true,
        });
        rec.on_page_failure(&PageFailureEvent {
            event: Some(LayoutEvent::Mutation),
            error: PageError::Listener("observer unavailable"),
        });
        rec.on_host_failure(&HostFailureEvent {
            session: None,
            message: "cannot access chrome:// URL",
        });

        let mut out = Vec::new();
        export(rec.events(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let values: Vec<Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(values.len(), 3);
        assert_eq!(values[0]["event"], "activate");
        assert_eq!(values[0]["at_us"], 2_000);
        assert_eq!(values[0]["stale_container_removed"], true);
        assert_eq!(values[1]["event"], "page_failure");
        assert_eq!(values[1]["kind"], "Mutation");
        assert_eq!(values[2]["session"], Value::Null);
    }

    #[test]
    fn host_failure_session_is_numeric() {
        let v = to_value(&RecordedEvent::HostFailure {
            session: Some(SessionId(12)),
            message: "denied".into(),
        });
        assert_eq!(v["session"], 12);
        assert_eq!(v["message"], "denied");
    }

    #[test]
    fn pass_lists_every_classification() {
        let mut classified = ClassificationCounts::default();
        classified.record(Classification::Missing);
        classified.record(Classification::Present);
        let v = to_value(&RecordedEvent::Pass(PassSummary {
            generation: 2,
            reason: PassReason::Manual,
            container: ContainerStatus::Reused,
            scanned: 3,
            rendered: 2,
            classified,
            degenerate: 1,
            skipped: 0,
        }));
        assert_eq!(
            v["classified"],
            json!({ "present": 1, "empty": 0, "missing": 1, "restricted": 0 })
        );
        assert_eq!(v["rendered"], 2);
    }

    #[test]
    fn export_empty_writes_nothing() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        assert!(out.is_empty());
    }
}
