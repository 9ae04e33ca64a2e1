// Copyright 2026 the Altlens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlay identity and placement.

use core::fmt;

use kurbo::{Point, Size};

use crate::annotation::Annotation;
use crate::target::TargetKind;

/// Class of each overlay node.
pub const OVERLAY_CLASS: &str = "overlay";

/// Class of the text block inside an overlay.
pub const CONTENT_CLASS: &str = "overlay-content";

/// Class of the dismiss button.
pub const CLOSE_BUTTON_CLASS: &str = "close-btn";

/// Text of the dismiss button (a multiplication sign).
pub const CLOSE_BUTTON_TEXT: &str = "\u{d7}";

/// Attribute carrying [`Classification::as_str`](crate::annotation::Classification::as_str)
/// on each overlay node.
pub const CLASSIFICATION_ATTRIBUTE: &str = "data-classification";

/// A handle to an overlay produced by a render pass.
///
/// Carries the slot (scan position) and the generation of the pass that
/// created it, so a dismiss aimed at an overlay from an earlier pass can be
/// recognized as stale.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayId {
    pub(crate) slot: u32,
    pub(crate) generation: u32,
}

impl OverlayId {
    /// Creates a handle. Backends normally receive these from the engine;
    /// this exists for hosts that round-trip ids through foreign code.
    #[inline]
    #[must_use]
    pub const fn new(slot: u32, generation: u32) -> Self {
        Self { slot, generation }
    }

    /// Position of the target in the pass's scan order.
    #[inline]
    #[must_use]
    pub const fn slot(self) -> u32 {
        self.slot
    }

    /// The pass that created this overlay.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OverlayId({}@pass{})", self.slot, self.generation)
    }
}

/// Everything a surface needs to build one overlay node.
#[derive(Clone, Debug, PartialEq)]
pub struct Overlay {
    /// Handle used by the dismiss control.
    pub id: OverlayId,
    /// Kind of the annotated element.
    pub kind: TargetKind,
    /// Page-absolute top-left corner, in CSS px.
    pub origin: Point,
    /// Size of the annotated element at render time.
    pub size: Size,
    /// What to display.
    pub annotation: Annotation,
}
