// Copyright 2026 the Altlens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory host.
//!
//! [`MemoryPage`] and [`MemorySurface`] implement the [backend](crate::backend)
//! traits in plain data so the lifecycle can be driven without a browser.
//! Both record enough state (listeners, armed wakeups, containers) for tests
//! to assert that nothing leaks.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Rect, Vec2};

use crate::backend::{LayoutEvent, OverlaySurface, Page};
use crate::error::{PageError, SurfaceError};
use crate::overlay::{Overlay, OverlayId};
use crate::target::{TargetElement, TargetFilter, TargetKind};
use crate::time::Duration;

/// A target element stored by value.
#[derive(Clone, Debug, PartialEq)]
pub struct MemoryElement {
    kind: TargetKind,
    alt: Option<String>,
    src: String,
    rect: Rect,
    malformed: bool,
}

impl MemoryElement {
    /// An `<img>` with the given viewport rectangle and `alt` attribute.
    #[must_use]
    pub fn image(rect: Rect, alt: Option<&str>) -> Self {
        Self {
            kind: TargetKind::Image,
            alt: alt.map(String::from),
            src: String::new(),
            rect,
            malformed: false,
        }
    }

    /// An `<iframe>` with the given viewport rectangle and source URL.
    #[must_use]
    pub fn iframe(rect: Rect, src: &str) -> Self {
        Self {
            kind: TargetKind::Iframe,
            alt: None,
            src: src.into(),
            rect,
            malformed: false,
        }
    }

    /// Makes [`bounding_rect`](TargetElement::bounding_rect) fail.
    #[must_use]
    pub fn malformed(mut self) -> Self {
        self.malformed = true;
        self
    }

    /// Replaces the `alt` attribute (`None` removes it).
    pub fn set_alt(&mut self, alt: Option<&str>) {
        self.alt = alt.map(String::from);
    }

    /// Moves or resizes the element.
    pub fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }
}

impl TargetElement for MemoryElement {
    fn kind(&self) -> TargetKind {
        self.kind
    }

    fn alt(&self) -> Option<String> {
        self.alt.clone()
    }

    fn src(&self) -> String {
        self.src.clone()
    }

    fn bounding_rect(&self) -> Result<Rect, PageError> {
        if self.malformed {
            Err(PageError::MalformedRect)
        } else {
            Ok(self.rect)
        }
    }
}

/// A document with a window: elements, scroll offset, listeners and a
/// wakeup timer.
#[derive(Clone, Debug, Default)]
pub struct MemoryPage {
    elements: Vec<MemoryElement>,
    scroll: Vec2,
    listeners: Vec<LayoutEvent>,
    wakeup: Option<Duration>,
    wakeups_armed: usize,
    fail_subscriptions: bool,
}

impl MemoryPage {
    /// Creates an empty page scrolled to the origin.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an element in document order and returns its index.
    pub fn push(&mut self, element: MemoryElement) -> usize {
        self.elements.push(element);
        self.elements.len() - 1
    }

    /// Removes the element at `index`.
    pub fn remove(&mut self, index: usize) -> MemoryElement {
        self.elements.remove(index)
    }

    /// The element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn element_mut(&mut self, index: usize) -> &mut MemoryElement {
        &mut self.elements[index]
    }

    /// Sets the document scroll offset.
    pub fn set_scroll(&mut self, scroll: Vec2) {
        self.scroll = scroll;
    }

    /// Makes every [`subscribe`](Page::subscribe) call fail.
    pub fn fail_subscriptions(&mut self, fail: bool) {
        self.fail_subscriptions = fail;
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Returns whether `event` has a listener.
    #[must_use]
    pub fn is_subscribed(&self, event: LayoutEvent) -> bool {
        self.listeners.contains(&event)
    }

    /// Delay of the currently armed wakeup.
    #[must_use]
    pub fn wakeup(&self) -> Option<Duration> {
        self.wakeup
    }

    /// Total number of times a wakeup was armed.
    #[must_use]
    pub fn wakeups_armed(&self) -> usize {
        self.wakeups_armed
    }
}

impl Page for MemoryPage {
    type Element = MemoryElement;

    fn targets(&self, filter: TargetFilter) -> Vec<MemoryElement> {
        self.elements
            .iter()
            .filter(|el| filter.accepts(el.kind))
            .cloned()
            .collect()
    }

    fn scroll_offset(&self) -> Vec2 {
        self.scroll
    }

    fn subscribe(&mut self, event: LayoutEvent) -> Result<(), PageError> {
        if self.fail_subscriptions {
            return Err(PageError::Listener("subscriptions disabled"));
        }
        if !self.listeners.contains(&event) {
            self.listeners.push(event);
        }
        Ok(())
    }

    fn unsubscribe(&mut self, event: LayoutEvent) {
        self.listeners.retain(|&e| e != event);
    }

    fn schedule_wakeup(&mut self, delay: Duration) -> Result<(), PageError> {
        self.wakeup = Some(delay);
        self.wakeups_armed += 1;
        Ok(())
    }

    fn cancel_wakeup(&mut self) {
        self.wakeup = None;
    }
}

#[derive(Clone, Debug, PartialEq)]
struct MemoryContainer {
    marker: String,
    overlays: Vec<Overlay>,
}

/// A node tree holding at most one live container plus any stale containers
/// left behind by earlier sessions.
#[derive(Clone, Debug)]
pub struct MemorySurface {
    live: Option<MemoryContainer>,
    stale: Vec<MemoryContainer>,
    has_root: bool,
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySurface {
    /// Creates an empty surface with an attachment root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            live: None,
            stale: Vec::new(),
            has_root: true,
        }
    }

    /// Adds a container with `overlays` placeholder children that this
    /// surface does not own, as an ungraceful earlier session would leave.
    pub fn plant_stale_container(&mut self, marker: &str, overlays: usize) {
        let placeholder = |slot| Overlay {
            id: OverlayId::new(slot, 0),
            kind: TargetKind::Image,
            origin: kurbo::Point::ZERO,
            size: kurbo::Size::ZERO,
            annotation: crate::annotation::resolve_image(None),
        };
        let overlays = (0..overlays)
            .map(|slot| placeholder(u32::try_from(slot).unwrap_or(u32::MAX)))
            .collect();
        self.stale.push(MemoryContainer {
            marker: marker.into(),
            overlays,
        });
    }

    /// Removes the live container without telling the owner, as a page
    /// script might.
    pub fn detach_container(&mut self) {
        self.live = None;
    }

    /// Controls whether a root exists to attach containers to.
    pub fn set_has_root(&mut self, has_root: bool) {
        self.has_root = has_root;
    }

    /// Number of containers in the tree, live and stale.
    #[must_use]
    pub fn container_count(&self) -> usize {
        self.stale.len() + usize::from(self.live.is_some())
    }

    /// Overlays in the live container, in append order.
    #[must_use]
    pub fn overlays(&self) -> &[Overlay] {
        match &self.live {
            Some(c) => &c.overlays,
            None => &[],
        }
    }

    /// Visible text of each live overlay.
    #[must_use]
    pub fn overlay_texts(&self) -> Vec<&str> {
        self.overlays()
            .iter()
            .map(|o| o.annotation.content.text())
            .collect()
    }
}

impl OverlaySurface for MemorySurface {
    fn remove_stale_container(&mut self, marker: &str) -> bool {
        let before = self.container_count();
        self.stale.retain(|c| c.marker != marker);
        if self.live.as_ref().is_some_and(|c| c.marker == marker) {
            self.live = None;
        }
        self.container_count() != before
    }

    fn create_container(&mut self, marker: &str) -> Result<(), SurfaceError> {
        if !self.has_root {
            return Err(SurfaceError::NoRoot);
        }
        if let Some(previous) = self.live.take() {
            self.stale.push(previous);
        }
        self.live = Some(MemoryContainer {
            marker: marker.into(),
            overlays: Vec::new(),
        });
        Ok(())
    }

    fn has_container(&self) -> bool {
        self.live.is_some()
    }

    fn remove_container(&mut self) {
        self.live = None;
    }

    fn clear_overlays(&mut self) {
        if let Some(c) = &mut self.live {
            c.overlays.clear();
        }
    }

    fn append_overlay(&mut self, overlay: &Overlay) -> Result<(), SurfaceError> {
        let container = self.live.as_mut().ok_or(SurfaceError::MissingContainer)?;
        container.overlays.push(overlay.clone());
        Ok(())
    }

    fn remove_overlay(&mut self, id: OverlayId) -> bool {
        let Some(container) = &mut self.live else {
            return false;
        };
        let before = container.overlays.len();
        container.overlays.retain(|o| o.id != id);
        container.overlays.len() != before
    }

    fn overlay_count(&self) -> usize {
        self.overlays().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_containers_are_removed_by_marker() {
        let mut s = MemorySurface::new();
        s.plant_stale_container("a", 2);
        s.plant_stale_container("b", 1);
        assert_eq!(s.container_count(), 2);

        assert!(s.remove_stale_container("a"));
        assert_eq!(s.container_count(), 1);
        assert!(!s.remove_stale_container("a"), "nothing left to remove");
    }

    #[test]
    fn subscriptions_are_deduplicated() {
        let mut page = MemoryPage::new();
        page.subscribe(LayoutEvent::Scroll).unwrap();
        page.subscribe(LayoutEvent::Scroll).unwrap();
        assert_eq!(page.listener_count(), 1);
        page.unsubscribe(LayoutEvent::Scroll);
        page.unsubscribe(LayoutEvent::Resize);
        assert_eq!(page.listener_count(), 0);
    }

    #[test]
    fn page_filters_targets() {
        let mut page = MemoryPage::new();
        page.push(MemoryElement::image(Rect::ZERO, None));
        page.push(MemoryElement::iframe(Rect::ZERO, "https://a.example/"));
        assert_eq!(page.targets(TargetFilter::IMAGES).len(), 1);
        assert_eq!(page.targets(TargetFilter::ALL).len(), 2);
    }
}
