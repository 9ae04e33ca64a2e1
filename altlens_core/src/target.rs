// Copyright 2026 the Altlens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Target elements and the element scanner.
//!
//! A *target* is a live host reference to an image or iframe. The core reads
//! three things from it: its kind, its alt-equivalent attribute, and its
//! viewport-relative bounding rectangle. [`scan`] collects targets in
//! document order and applies no size filtering; degenerate elements are
//! dropped later by the [renderer](crate::render).

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Rect;

use crate::backend::Page;
use crate::error::PageError;

/// Which kind of visual element a target is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// An `<img>` element.
    Image,
    /// An `<iframe>` element.
    Iframe,
}

impl TargetKind {
    /// Returns the lowercase HTML tag name.
    #[must_use]
    pub const fn tag_name(self) -> &'static str {
        match self {
            Self::Image => "img",
            Self::Iframe => "iframe",
        }
    }

    /// Maps a tag name (any case) back to a kind.
    #[must_use]
    pub fn from_tag_name(tag: &str) -> Option<Self> {
        if tag.eq_ignore_ascii_case("img") {
            Some(Self::Image)
        } else if tag.eq_ignore_ascii_case("iframe") {
            Some(Self::Iframe)
        } else {
            None
        }
    }
}

/// Set of target kinds the scanner collects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TargetFilter {
    /// Collect `<img>` elements.
    pub images: bool,
    /// Collect `<iframe>` elements.
    pub iframes: bool,
}

impl TargetFilter {
    /// Images and iframes.
    pub const ALL: Self = Self {
        images: true,
        iframes: true,
    };

    /// Images only.
    pub const IMAGES: Self = Self {
        images: true,
        iframes: false,
    };

    /// Returns whether `kind` passes the filter.
    #[must_use]
    pub const fn accepts(self, kind: TargetKind) -> bool {
        match kind {
            TargetKind::Image => self.images,
            TargetKind::Iframe => self.iframes,
        }
    }

    /// Returns a CSS selector matching the accepted kinds, or `None` if the
    /// filter accepts nothing.
    #[must_use]
    pub const fn selector(self) -> Option<&'static str> {
        match (self.images, self.iframes) {
            (true, true) => Some("img, iframe"),
            (true, false) => Some("img"),
            (false, true) => Some("iframe"),
            (false, false) => None,
        }
    }
}

impl Default for TargetFilter {
    fn default() -> Self {
        Self::ALL
    }
}

/// Read access to one target element.
///
/// Implementations read live host state on every call; nothing is cached
/// between passes.
pub trait TargetElement {
    /// The element's kind.
    fn kind(&self) -> TargetKind;

    /// The `alt` attribute: `None` if absent, `Some("")` if present but empty.
    fn alt(&self) -> Option<String>;

    /// The resolved source URL (used for iframes).
    fn src(&self) -> String;

    /// The viewport-relative bounding rectangle.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::MalformedRect`] if the host cannot produce one.
    fn bounding_rect(&self) -> Result<Rect, PageError>;
}

/// Enumerates all targets accepted by `filter`, in document order.
///
/// Stateless: safe to call any number of times.
pub fn scan<P: Page + ?Sized>(page: &P, filter: TargetFilter) -> Vec<P::Element> {
    if filter.selector().is_none() {
        return Vec::new();
    }
    page.targets(filter)
        .into_iter()
        .filter(|el| filter.accepts(el.kind()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryElement, MemoryPage};

    fn rect() -> Rect {
        Rect::new(0.0, 0.0, 10.0, 10.0)
    }

    #[test]
    fn scan_keeps_document_order() {
        let mut page = MemoryPage::new();
        page.push(MemoryElement::image(rect(), Some("a")));
        page.push(MemoryElement::iframe(rect(), "https://example.com/"));
        page.push(MemoryElement::image(rect(), None));

        let kinds: Vec<_> = scan(&page, TargetFilter::ALL)
            .iter()
            .map(TargetElement::kind)
            .collect();
        assert_eq!(
            kinds,
            [TargetKind::Image, TargetKind::Iframe, TargetKind::Image]
        );
    }

    #[test]
    fn scan_does_not_filter_by_size() {
        let mut page = MemoryPage::new();
        page.push(MemoryElement::image(Rect::ZERO, Some("hidden")));
        assert_eq!(scan(&page, TargetFilter::ALL).len(), 1);
    }

    #[test]
    fn scan_honors_filter() {
        let mut page = MemoryPage::new();
        page.push(MemoryElement::image(rect(), Some("a")));
        page.push(MemoryElement::iframe(rect(), "https://example.com/"));

        assert_eq!(scan(&page, TargetFilter::IMAGES).len(), 1);
        let none = TargetFilter {
            images: false,
            iframes: false,
        };
        assert!(scan(&page, none).is_empty());
    }

    #[test]
    fn scan_is_repeatable() {
        let mut page = MemoryPage::new();
        page.push(MemoryElement::image(rect(), Some("a")));
        let first = scan(&page, TargetFilter::ALL).len();
        let second = scan(&page, TargetFilter::ALL).len();
        assert_eq!(first, second);
    }

    #[test]
    fn tag_names_round_trip() {
        for kind in [TargetKind::Image, TargetKind::Iframe] {
            assert_eq!(TargetKind::from_tag_name(kind.tag_name()), Some(kind));
        }
        assert_eq!(TargetKind::from_tag_name("IMG"), Some(TargetKind::Image));
        assert_eq!(TargetKind::from_tag_name("video"), None);
    }
}
