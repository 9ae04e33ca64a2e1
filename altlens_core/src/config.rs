// Copyright 2026 the Altlens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine configuration.

use crate::target::TargetFilter;
use crate::time::Duration;

/// Marker (element id on the web) of the overlay container.
pub const DEFAULT_CONTAINER_MARKER: &str = "alt-text-viewer-container";

/// Tunables for the [`Controller`](crate::controller::Controller).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayConfig {
    /// Quiet period after the last layout event before a re-pass runs.
    pub debounce: Duration,
    /// Elements narrower or shorter than this (in CSS px) get no overlay.
    pub min_extent: f64,
    /// Stable marker identifying the container across injections.
    pub container_marker: &'static str,
    /// Which element kinds the scanner collects.
    pub targets: TargetFilter,
    /// Re-pass on window resize.
    pub track_resize: bool,
    /// Re-pass on scroll anywhere in the page (capturing).
    pub track_scroll: bool,
    /// Re-pass on DOM mutation outside the container.
    pub track_mutations: bool,
}

impl OverlayConfig {
    /// Browser defaults: 200 ms debounce, 1 px minimum, resize and scroll
    /// tracking.
    #[must_use]
    pub const fn web() -> Self {
        Self {
            debounce: Duration::from_millis(200),
            min_extent: 1.0,
            container_marker: DEFAULT_CONTAINER_MARKER,
            targets: TargetFilter::ALL,
            track_resize: true,
            track_scroll: true,
            track_mutations: false,
        }
    }

    /// Returns this config with DOM mutation tracking switched on or off.
    #[must_use]
    pub const fn with_mutations(mut self, track: bool) -> Self {
        self.track_mutations = track;
        self
    }

    /// Returns this config with a different debounce delay.
    #[must_use]
    pub const fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self::web()
    }
}
