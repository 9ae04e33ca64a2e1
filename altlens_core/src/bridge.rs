// Copyright 2026 the Altlens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Activation bridge and per-session state.
//!
//! The host (a browser extension's background and popup pages) decides when
//! overlays are shown. It talks to the engine only through
//! [`ActivationBridge::show`] and [`ActivationBridge::hide`]; everything else
//! here is convenience for hosts that persist an on/off flag per session:
//!
//! - [`Session`] replaces ambient per-tab globals with an explicit value.
//! - [`SessionStore`] is the host's persistence, with an in-memory
//!   implementation keyed the way the extension storage keys it.
//! - [`ActivationBridge::restore`] re-shows overlays after a page load if the
//!   session was enabled.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use core::fmt;

use crate::backend::{OverlaySurface, Page};
use crate::controller::Controller;
use crate::error::SurfaceError;
use crate::time::HostTime;
use crate::trace::{HostFailureEvent, PassSummary, Tracer};

/// Opaque host identifier for a browsing session (a tab).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub u64);

impl SessionId {
    /// Storage key under which the host persists this session's state.
    #[must_use]
    pub fn storage_key(self) -> String {
        format!("tab_{}", self.0)
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", self.0)
    }
}

/// Whether overlays are enabled for a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Overlays shown.
    Enabled,
    /// Overlays hidden (the default for sessions never toggled).
    #[default]
    Disabled,
}

impl SessionState {
    /// Maps a toggle position to a state.
    #[must_use]
    pub const fn from_enabled(enabled: bool) -> Self {
        if enabled { Self::Enabled } else { Self::Disabled }
    }

    /// Returns `true` for [`Enabled`](Self::Enabled).
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        matches!(self, Self::Enabled)
    }
}

/// Label for the toggle control in the given state.
#[must_use]
pub const fn toggle_label(state: SessionState) -> &'static str {
    match state {
        SessionState::Enabled => "Hide Alt Text",
        SessionState::Disabled => "Show Alt Text",
    }
}

/// Returns whether overlays may be injected into a page at `url`.
///
/// Only `http` and `https` pages qualify; browser-internal and file pages
/// are protected.
#[must_use]
pub fn is_injectable_url(url: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        url.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

/// One browsing session and its on/off state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Session {
    /// Host identifier.
    pub id: SessionId,
    /// Current state.
    pub state: SessionState,
}

impl Session {
    /// Loads the session's state from `store`.
    pub fn load<St: SessionStore + ?Sized>(store: &St, id: SessionId) -> Self {
        Self {
            id,
            state: store.load(id),
        }
    }
}

/// Host persistence for session state.
pub trait SessionStore {
    /// Reads the stored state; unknown sessions are
    /// [`Disabled`](SessionState::Disabled).
    fn load(&self, id: SessionId) -> SessionState;

    /// Persists `state` for `id`.
    fn store(&mut self, id: SessionId, state: SessionState);
}

/// A [`SessionStore`] backed by a map of storage keys to flags.
#[derive(Clone, Debug, Default)]
pub struct MemorySessionStore {
    entries: BTreeMap<String, bool>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the entry for `id` (e.g. when the tab closes).
    pub fn forget(&mut self, id: SessionId) {
        self.entries.remove(&id.storage_key());
    }

    /// Raw stored flag under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<bool> {
        self.entries.get(key).copied()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, id: SessionId) -> SessionState {
        SessionState::from_enabled(self.get(&id.storage_key()).unwrap_or(false))
    }

    fn store(&mut self, id: SessionId, state: SessionState) {
        self.entries.insert(id.storage_key(), state.is_enabled());
    }
}

/// Host-facing entry point: `show` activates, `hide` deactivates.
#[derive(Debug)]
pub struct ActivationBridge<P, S> {
    controller: Controller<P, S>,
}

impl<P: Page, S: OverlaySurface> ActivationBridge<P, S> {
    /// Wraps a controller.
    #[must_use]
    pub fn new(controller: Controller<P, S>) -> Self {
        Self { controller }
    }

    /// The wrapped controller.
    #[must_use]
    pub fn controller(&self) -> &Controller<P, S> {
        &self.controller
    }

    /// The wrapped controller, mutably (event and timer glue goes through
    /// it).
    pub fn controller_mut(&mut self) -> &mut Controller<P, S> {
        &mut self.controller
    }

    /// Shows overlays.
    ///
    /// # Errors
    ///
    /// See [`Controller::activate`].
    pub fn show(
        &mut self,
        now: HostTime,
        tracer: &mut Tracer<'_>,
    ) -> Result<PassSummary, SurfaceError> {
        self.controller.activate(now, tracer)
    }

    /// Hides overlays. Returns how many this bridge's controller removed.
    ///
    /// Every other container carrying the marker, such as one left by an
    /// earlier injection, is removed as well.
    pub fn hide(&mut self, tracer: &mut Tracer<'_>) -> usize {
        let removed = self.controller.deactivate(tracer);
        let marker = self.controller.config().container_marker;
        self.controller.surface_mut().remove_stale_container(marker);
        removed
    }

    /// Called after a page in `session` finishes loading at `url`.
    ///
    /// Shows overlays if the session is enabled and the page is injectable;
    /// otherwise does nothing and returns `None`.
    pub fn restore(
        &mut self,
        session: &Session,
        url: &str,
        now: HostTime,
        tracer: &mut Tracer<'_>,
    ) -> Option<Result<PassSummary, SurfaceError>> {
        if !session.state.is_enabled() || !is_injectable_url(url) {
            return None;
        }
        Some(self.show(now, tracer))
    }

    /// Flips `session` to `enabled`, persists it, and shows or hides.
    ///
    /// # Errors
    ///
    /// Returns the surface error if showing fails. The new state is
    /// persisted regardless, matching a toggle the user already flipped.
    pub fn toggle<St: SessionStore + ?Sized>(
        &mut self,
        store: &mut St,
        session: &mut Session,
        enabled: bool,
        now: HostTime,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), SurfaceError> {
        session.state = SessionState::from_enabled(enabled);
        store.store(session.id, session.state);
        if enabled {
            self.show(now, tracer).map(drop)
        } else {
            self.hide(tracer);
            Ok(())
        }
    }

    /// Reports an injection or permission failure for `session` to the
    /// diagnostic channel. No further action is taken.
    pub fn report_host_failure(
        &mut self,
        session: Option<SessionId>,
        message: &str,
        tracer: &mut Tracer<'_>,
    ) {
        tracer.host_failure(&HostFailureEvent { session, message });
    }
}
