// Copyright 2026 the Altlens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlay placement and rendering.
//!
//! Overlays are positioned in page-absolute coordinates: the element's
//! viewport rectangle shifted by the document scroll offset. Elements
//! narrower or shorter than the configured minimum extent are hidden or
//! degenerate and get no overlay.

use kurbo::{Point, Rect, Vec2};

use crate::annotation::Annotation;
use crate::backend::OverlaySurface;
use crate::overlay::{Overlay, OverlayId};
use crate::target::TargetElement;
use crate::trace::SkipReason;

/// Result of rendering one target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    /// An overlay was appended to the container.
    Placed(OverlayId),
    /// The element is smaller than the minimum extent; nothing was drawn.
    Degenerate,
    /// The element could not be rendered; the pass continues without it.
    Skipped(SkipReason),
}

/// Computes the page-absolute overlay origin for a viewport rectangle.
///
/// Returns `None` if the rectangle is narrower or shorter than `min_extent`.
/// Callers are expected to reject non-finite rectangles first.
#[must_use]
pub fn place(rect: Rect, scroll: Vec2, min_extent: f64) -> Option<Point> {
    if rect.width() < min_extent || rect.height() < min_extent {
        return None;
    }
    Some(Point::new(scroll.x + rect.x0, scroll.y + rect.y0))
}

/// Renders one target into `surface`.
///
/// Reads the element's current bounds, drops degenerate elements, and
/// appends an overlay carrying `annotation` and a dismiss control bound to
/// `id`. Failures are reported in the outcome, never propagated.
pub fn render<S, E>(
    surface: &mut S,
    element: &E,
    annotation: Annotation,
    scroll: Vec2,
    id: OverlayId,
    min_extent: f64,
) -> RenderOutcome
where
    S: OverlaySurface + ?Sized,
    E: TargetElement + ?Sized,
{
    let rect = match element.bounding_rect() {
        Ok(rect) if rect.is_finite() => rect.abs(),
        Ok(_) | Err(_) => return RenderOutcome::Skipped(SkipReason::MalformedRect),
    };
    let Some(origin) = place(rect, scroll, min_extent) else {
        return RenderOutcome::Degenerate;
    };

    let overlay = Overlay {
        id,
        kind: element.kind(),
        origin,
        size: rect.size(),
        annotation,
    };
    match surface.append_overlay(&overlay) {
        Ok(()) => RenderOutcome::Placed(id),
        Err(err) => RenderOutcome::Skipped(SkipReason::Surface(err)),
    }
}
