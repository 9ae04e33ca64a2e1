// Copyright 2026 the Altlens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host contract.
//!
//! The engine never touches a real document. Hosts provide two pieces:
//!
//! - **[`Page`]**: the scanned document and its window. Target enumeration,
//!   scroll offset, layout-event subscriptions, and a one-shot wakeup timer
//!   used for debouncing.
//!
//! - **[`OverlaySurface`]**: the node tree overlays are rendered into, i.e.
//!   the singleton container plus its overlay children.
//!
//! `altlens_backend_web` implements both over `web-sys`;
//! [`memory`](crate::memory) implements both in plain data for tests.
//!
//! # Event loop pseudocode
//!
//! ```rust,ignore
//! // resize / scroll / mutation listener
//! fn on_layout_event(event: LayoutEvent) {
//!     controller.on_layout_event(event, now(), &mut tracer);
//!     // the controller re-arms the page wakeup timer
//! }
//!
//! // wakeup timer callback
//! fn on_wakeup() {
//!     controller.flush(&mut tracer);
//! }
//! ```
//!
//! Hosts that observe DOM mutations reduce each record to a
//! [`MutationFootprint`] and drop the ones the container caused itself, so a
//! pass never retriggers another pass.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Vec2;

use crate::error::{PageError, SurfaceError};
use crate::overlay::{Overlay, OverlayId};
use crate::target::{TargetElement, TargetFilter};
use crate::time::Duration;

/// A page event that may move or change targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayoutEvent {
    /// The window was resized.
    Resize,
    /// The window or any nested scroll container scrolled. Subscribed in the
    /// capture phase so nested scrolls are seen.
    Scroll,
    /// The document subtree changed outside the overlay container.
    Mutation,
}

impl LayoutEvent {
    /// DOM event type name, where one exists.
    #[must_use]
    pub const fn dom_type(self) -> Option<&'static str> {
        match self {
            Self::Resize => Some("resize"),
            Self::Scroll => Some("scroll"),
            Self::Mutation => None,
        }
    }
}

/// What one DOM mutation record touched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MutationFootprint {
    /// The mutated node is the container or lies inside it.
    pub target_in_container: bool,
    /// Element ids of the added nodes (empty for text nodes and elements
    /// without an id).
    pub added: Vec<String>,
    /// Element ids of the removed nodes.
    pub removed: Vec<String>,
}

impl MutationFootprint {
    /// Returns whether the overlay container carrying `marker` caused this
    /// mutation: a change inside it, or the container alone being attached
    /// or detached.
    ///
    /// A record that touched nothing is foreign.
    #[must_use]
    pub fn is_own(&self, marker: &str) -> bool {
        if self.target_in_container {
            return true;
        }
        let touched = self.added.len() + self.removed.len();
        touched > 0 && self.added.iter().chain(&self.removed).all(|id| id == marker)
    }
}

/// The scanned document and its window.
pub trait Page {
    /// Live element handle.
    type Element: TargetElement;

    /// Returns the targets accepted by `filter`, in document order.
    fn targets(&self, filter: TargetFilter) -> Vec<Self::Element>;

    /// Current scroll offset of the top-level document.
    fn scroll_offset(&self) -> Vec2;

    /// Starts delivering `event`.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Listener`] if the host cannot register it.
    fn subscribe(&mut self, event: LayoutEvent) -> Result<(), PageError>;

    /// Stops delivering `event`. Unknown subscriptions are ignored.
    fn unsubscribe(&mut self, event: LayoutEvent);

    /// Arms the wakeup timer to fire once after `delay`, replacing any
    /// previously armed wakeup.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Timer`] if the host cannot arm it.
    fn schedule_wakeup(&mut self, delay: Duration) -> Result<(), PageError>;

    /// Disarms the wakeup timer, if armed.
    fn cancel_wakeup(&mut self);
}

/// The node tree overlays are rendered into.
pub trait OverlaySurface {
    /// Removes every container carrying `marker` (including one this surface
    /// created earlier). Returns whether anything was removed.
    fn remove_stale_container(&mut self, marker: &str) -> bool;

    /// Creates an empty container carrying `marker` and attaches it.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::NoRoot`] or [`SurfaceError::Rejected`] if the
    /// container cannot be built.
    fn create_container(&mut self, marker: &str) -> Result<(), SurfaceError>;

    /// Returns whether the container exists and is still attached.
    fn has_container(&self) -> bool;

    /// Detaches and drops the container with all its overlays.
    fn remove_container(&mut self);

    /// Removes all overlays, keeping the container.
    fn clear_overlays(&mut self);

    /// Appends one overlay node to the container.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::MissingContainer`] if there is no container,
    /// or [`SurfaceError::Rejected`] if the node cannot be built.
    fn append_overlay(&mut self, overlay: &Overlay) -> Result<(), SurfaceError>;

    /// Removes the overlay with `id`. Returns whether it was present.
    fn remove_overlay(&mut self, id: OverlayId) -> bool;

    /// Number of overlays currently in the container.
    fn overlay_count(&self) -> usize;
}
