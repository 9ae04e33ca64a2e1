// Copyright 2026 the Altlens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Diagnostics for the overlay lifecycle.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! [`Controller`](crate::controller::Controller) and
//! [`ActivationBridge`](crate::bridge::ActivationBridge) call at each stage.
//! All method bodies default to no-ops, so implementing only the events you
//! care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! The host's diagnostic channel (the browser console, stderr, a recorder)
//! is whatever sink the host plugs in.

use crate::annotation::Classification;
use crate::backend::LayoutEvent;
use crate::bridge::SessionId;
use crate::error::{PageError, SurfaceError};
use crate::overlay::OverlayId;
use crate::target::TargetKind;
use crate::time::HostTime;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Why a render pass ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PassReason {
    /// Initial pass of an activation.
    Activate,
    /// Debounced pass after a layout event.
    Layout(LayoutEvent),
    /// Explicit host request.
    Manual,
}

/// Why a target produced no overlay despite being scanned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Bounds were unavailable or not finite.
    MalformedRect,
    /// The surface refused the node.
    Surface(SurfaceError),
}

/// State of the container at the start of a pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContainerStatus {
    /// The existing container was cleared and reused.
    Reused,
    /// The container was freshly created by activation.
    Created,
    /// The container had gone missing and was recreated.
    Recreated,
    /// No container could be built; nothing was rendered.
    Unavailable,
}

/// Rendered overlays per [`Classification`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClassificationCounts([usize; Classification::ALL.len()]);

impl ClassificationCounts {
    /// Counts one more overlay of classification `c`.
    pub fn record(&mut self, c: Classification) {
        self.0[c as usize] += 1;
    }

    /// Overlays of classification `c`.
    #[must_use]
    pub fn get(&self, c: Classification) -> usize {
        self.0[c as usize]
    }

    /// Iterates over every classification with its count, zeros included.
    pub fn iter(&self) -> impl Iterator<Item = (Classification, usize)> + '_ {
        Classification::ALL.into_iter().map(|c| (c, self.get(c)))
    }
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when the controller activates.
#[derive(Clone, Copy, Debug)]
pub struct ActivateEvent {
    /// Host time of activation.
    pub at: HostTime,
    /// Whether the controller was already active and was torn down first.
    pub was_active: bool,
    /// Whether a container left by an earlier session was removed.
    pub stale_container_removed: bool,
}

/// Emitted when the controller deactivates.
#[derive(Clone, Copy, Debug)]
pub struct DeactivateEvent {
    /// Overlays still present when the container was removed.
    pub overlays_removed: usize,
    /// Listener subscriptions dropped.
    pub listeners_removed: usize,
}

/// Emitted when a layout event arms the debounce.
#[derive(Clone, Copy, Debug)]
pub struct LayoutEventTrace {
    /// Which event arrived.
    pub event: LayoutEvent,
    /// Host time of arrival.
    pub at: HostTime,
    /// When the debounced pass will run if nothing else arrives.
    pub deadline: HostTime,
}

/// Summary of one scan → resolve → render pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassSummary {
    /// Pass generation (also the generation of its overlay ids).
    pub generation: u32,
    /// Why the pass ran.
    pub reason: PassReason,
    /// Container state at the start of the pass.
    pub container: ContainerStatus,
    /// Targets returned by the scanner.
    pub scanned: usize,
    /// Overlays appended.
    pub rendered: usize,
    /// Appended overlays broken down by classification.
    pub classified: ClassificationCounts,
    /// Targets below the minimum extent.
    pub degenerate: usize,
    /// Targets skipped because of a failure.
    pub skipped: usize,
}

/// Emitted for each target skipped because of a failure.
#[derive(Clone, Debug)]
pub struct ElementSkipEvent {
    /// Pass generation.
    pub generation: u32,
    /// Position in scan order.
    pub slot: u32,
    /// Kind of the target.
    pub kind: TargetKind,
    /// What went wrong.
    pub reason: SkipReason,
}

/// Emitted when a dismiss control is activated.
#[derive(Clone, Copy, Debug)]
pub struct DismissEvent {
    /// The overlay the control belonged to.
    pub id: OverlayId,
    /// Whether an overlay was actually removed.
    pub removed: bool,
}

/// Emitted when a host-side operation fails.
#[derive(Clone, Copy, Debug)]
pub struct HostFailureEvent<'a> {
    /// The session affected, if known.
    pub session: Option<SessionId>,
    /// Human-readable description.
    pub message: &'a str,
}

/// Emitted when a page operation fails.
#[derive(Clone, Debug)]
pub struct PageFailureEvent {
    /// The event whose subscription or wakeup failed, if any.
    pub event: Option<LayoutEvent>,
    /// What went wrong.
    pub error: PageError,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives lifecycle events.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when the controller activates.
    fn on_activate(&mut self, e: &ActivateEvent) {
        _ = e;
    }

    /// Called when the controller deactivates.
    fn on_deactivate(&mut self, e: &DeactivateEvent) {
        _ = e;
    }

    /// Called when a layout event arms the debounce.
    fn on_layout_event(&mut self, e: &LayoutEventTrace) {
        _ = e;
    }

    /// Called after every render pass.
    fn on_pass(&mut self, s: &PassSummary) {
        _ = s;
    }

    /// Called for each target skipped because of a failure.
    fn on_element_skip(&mut self, e: &ElementSkipEvent) {
        _ = e;
    }

    /// Called when a dismiss control fires.
    fn on_dismiss(&mut self, e: &DismissEvent) {
        _ = e;
    }

    /// Called when a page subscription or wakeup fails.
    fn on_page_failure(&mut self, e: &PageFailureEvent) {
        _ = e;
    }

    /// Called when the host reports an injection or permission failure.
    fn on_host_failure(&mut self, e: &HostFailureEvent<'_>) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

macro_rules! dispatch {
    ($self:ident, $method:ident, $e:expr) => {{
        #[cfg(feature = "trace")]
        if let Some(s) = &mut $self.sink {
            s.$method($e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = $e;
        }
    }};
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits an [`ActivateEvent`].
    #[inline]
    pub fn activate(&mut self, e: &ActivateEvent) {
        dispatch!(self, on_activate, e);
    }

    /// Emits a [`DeactivateEvent`].
    #[inline]
    pub fn deactivate(&mut self, e: &DeactivateEvent) {
        dispatch!(self, on_deactivate, e);
    }

    /// Emits a [`LayoutEventTrace`].
    #[inline]
    pub fn layout_event(&mut self, e: &LayoutEventTrace) {
        dispatch!(self, on_layout_event, e);
    }

    /// Emits a [`PassSummary`].
    #[inline]
    pub fn pass(&mut self, s: &PassSummary) {
        dispatch!(self, on_pass, s);
    }

    /// Emits an [`ElementSkipEvent`].
    #[inline]
    pub fn element_skip(&mut self, e: &ElementSkipEvent) {
        dispatch!(self, on_element_skip, e);
    }

    /// Emits a [`DismissEvent`].
    #[inline]
    pub fn dismiss(&mut self, e: &DismissEvent) {
        dispatch!(self, on_dismiss, e);
    }

    /// Emits a [`PageFailureEvent`].
    #[inline]
    pub fn page_failure(&mut self, e: &PageFailureEvent) {
        dispatch!(self, on_page_failure, e);
    }

    /// Emits a [`HostFailureEvent`].
    #[inline]
    pub fn host_failure(&mut self, e: &HostFailureEvent<'_>) {
        dispatch!(self, on_host_failure, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_tracer_accepts_everything() {
        let mut tracer = Tracer::none();
        tracer.dismiss(&DismissEvent {
            id: OverlayId::new(0, 1),
            removed: true,
        });
        tracer.host_failure(&HostFailureEvent {
            session: None,
            message: "ignored",
        });
    }

    #[test]
    fn classification_counts() {
        let mut counts = ClassificationCounts::default();
        counts.record(Classification::Missing);
        counts.record(Classification::Missing);
        counts.record(Classification::Restricted);

        assert_eq!(counts.get(Classification::Missing), 2);
        assert_eq!(counts.get(Classification::Present), 0);
        let listed: alloc::vec::Vec<_> = counts.iter().collect();
        assert_eq!(
            listed,
            [
                (Classification::Present, 0),
                (Classification::Empty, 0),
                (Classification::Missing, 2),
                (Classification::Restricted, 1),
            ]
        );
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            dismissed: Vec<u32>,
            failures: usize,
        }
        impl TraceSink for RecordingSink {
            fn on_dismiss(&mut self, e: &DismissEvent) {
                self.dismissed.push(e.id.slot());
            }
            fn on_host_failure(&mut self, _: &HostFailureEvent<'_>) {
                self.failures += 1;
            }
        }

        let mut sink = RecordingSink {
            dismissed: Vec::new(),
            failures: 0,
        };
        let mut tracer = Tracer::new(&mut sink);
        tracer.dismiss(&DismissEvent {
            id: OverlayId::new(3, 1),
            removed: true,
        });
        tracer.host_failure(&HostFailureEvent {
            session: Some(SessionId(1)),
            message: "denied",
        });
        // Unhandled events fall through to the no-op defaults.
        tracer.deactivate(&DeactivateEvent {
            overlays_removed: 0,
            listeners_removed: 0,
        });
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.dismissed, &[3]);
        assert_eq!(sink.failures, 1);
    }
}
