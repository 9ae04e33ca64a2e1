// Copyright 2026 the Altlens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory event recording.
//!
//! [`RecorderSink`] implements [`TraceSink`] and keeps an owned copy of every
//! event in arrival order. Host failure messages are copied into a `String`.

use altlens_core::bridge::SessionId;
use altlens_core::trace::{
    ActivateEvent, DeactivateEvent, DismissEvent, ElementSkipEvent, HostFailureEvent,
    LayoutEventTrace, PageFailureEvent, PassSummary, TraceSink,
};

/// A recorded event.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// An [`ActivateEvent`].
    Activate(ActivateEvent),
    /// A [`DeactivateEvent`].
    Deactivate(DeactivateEvent),
    /// A [`LayoutEventTrace`].
    Layout(LayoutEventTrace),
    /// A [`PassSummary`].
    Pass(PassSummary),
    /// An [`ElementSkipEvent`].
    ElementSkip(ElementSkipEvent),
    /// A [`DismissEvent`].
    Dismiss(DismissEvent),
    /// A [`PageFailureEvent`].
    PageFailure(PageFailureEvent),
    /// A [`HostFailureEvent`] with its message copied.
    HostFailure {
        /// The session affected, if known.
        session: Option<SessionId>,
        /// Human-readable description.
        message: String,
    },
}

impl RecordedEvent {
    /// Short lowercase name of the event kind.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Activate(_) => "activate",
            Self::Deactivate(_) => "deactivate",
            Self::Layout(_) => "layout",
            Self::Pass(_) => "pass",
            Self::ElementSkip(_) => "skip",
            Self::Dismiss(_) => "dismiss",
            Self::PageFailure(_) => "page_failure",
            Self::HostFailure { .. } => "host_failure",
        }
    }
}

/// A [`TraceSink`] that stores events in a `Vec`.
#[derive(Debug, Default)]
pub struct RecorderSink {
    events: Vec<RecordedEvent>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded events.
    #[must_use]
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Consumes the recorder and returns the recorded events.
    #[must_use]
    pub fn into_events(self) -> Vec<RecordedEvent> {
        self.events
    }

    /// Discards everything recorded so far.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Iterates over recorded pass summaries.
    pub fn passes(&self) -> impl Iterator<Item = &PassSummary> {
        self.events.iter().filter_map(|e| match e {
            RecordedEvent::Pass(s) => Some(s),
            _ => None,
        })
    }
}

impl TraceSink for RecorderSink {
    fn on_activate(&mut self, e: &ActivateEvent) {
        self.events.push(RecordedEvent::Activate(*e));
    }

    fn on_deactivate(&mut self, e: &DeactivateEvent) {
        self.events.push(RecordedEvent::Deactivate(*e));
    }

    fn on_layout_event(&mut self, e: &LayoutEventTrace) {
        self.events.push(RecordedEvent::Layout(*e));
    }

    fn on_pass(&mut self, s: &PassSummary) {
        self.events.push(RecordedEvent::Pass(*s));
    }

    fn on_element_skip(&mut self, e: &ElementSkipEvent) {
        self.events.push(RecordedEvent::ElementSkip(e.clone()));
    }

    fn on_dismiss(&mut self, e: &DismissEvent) {
        self.events.push(RecordedEvent::Dismiss(*e));
    }

    fn on_page_failure(&mut self, e: &PageFailureEvent) {
        self.events.push(RecordedEvent::PageFailure(e.clone()));
    }

    fn on_host_failure(&mut self, e: &HostFailureEvent<'_>) {
        self.events.push(RecordedEvent::HostFailure {
            session: e.session,
            message: e.message.to_owned(),
        });
    }
}
