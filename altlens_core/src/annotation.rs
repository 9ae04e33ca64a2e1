// Copyright 2026 the Altlens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Annotation resolution.
//!
//! [`resolve`] is a pure function of a target's current attributes. Missing
//! and empty alt text are classifications, not errors: surfacing them is the
//! whole point of the overlay.

use alloc::format;
use alloc::string::String;

use crate::target::{TargetElement, TargetKind};

/// Shown for images without an `alt` attribute.
pub const MISSING_ALT_TEXT: &str = "Error: Missing alt text";

/// Shown for images with `alt=""`.
pub const EMPTY_ALT_TEXT: &str = "Review: Empty alt attribute";

/// Link label for iframes, whose content cannot be read across origins.
pub const RESTRICTED_LABEL: &str = "iFrame CORS restriction: Open in new tab to review alt text";

/// How an element's alt-equivalent was classified.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Non-empty alt text.
    Present,
    /// `alt=""`.
    Empty,
    /// No `alt` attribute.
    Missing,
    /// Cross-origin content; can only be reviewed by opening it.
    Restricted,
}

impl Classification {
    /// Every classification, in declaration order.
    pub const ALL: [Self; 4] = [Self::Present, Self::Empty, Self::Missing, Self::Restricted];

    /// Short lowercase name, used for the overlay's classification attribute
    /// and in diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Empty => "empty",
            Self::Missing => "missing",
            Self::Restricted => "restricted",
        }
    }
}

/// What an overlay displays.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OverlayContent {
    /// Plain text.
    Text(String),
    /// A link opened in a new browsing context (`target=_blank`,
    /// `rel="noopener noreferrer"`).
    Link {
        /// Destination URL.
        href: String,
        /// Visible link text.
        label: &'static str,
    },
}

impl OverlayContent {
    /// Returns the visible text.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Link { label, .. } => label,
        }
    }
}

/// Classification plus display content for one target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Annotation {
    /// How the alt-equivalent was classified.
    pub classification: Classification,
    /// What the overlay shows.
    pub content: OverlayContent,
}

/// Resolves the annotation for `element` from its current attributes.
pub fn resolve<E: TargetElement + ?Sized>(element: &E) -> Annotation {
    match element.kind() {
        TargetKind::Image => resolve_image(element.alt().as_deref()),
        TargetKind::Iframe => resolve_iframe(&element.src()),
    }
}

/// Resolves an image annotation from its `alt` attribute.
#[must_use]
pub fn resolve_image(alt: Option<&str>) -> Annotation {
    match alt {
        None => Annotation {
            classification: Classification::Missing,
            content: OverlayContent::Text(MISSING_ALT_TEXT.into()),
        },
        Some("") => Annotation {
            classification: Classification::Empty,
            content: OverlayContent::Text(EMPTY_ALT_TEXT.into()),
        },
        Some(value) => Annotation {
            classification: Classification::Present,
            content: OverlayContent::Text(format!("Alt text: \"{value}\"")),
        },
    }
}

/// Resolves an iframe annotation: a link-out notice to its source.
#[must_use]
pub fn resolve_iframe(src: &str) -> Annotation {
    Annotation {
        classification: Classification::Restricted,
        content: OverlayContent::Link {
            href: src.into(),
            label: RESTRICTED_LABEL,
        },
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Rect;

    use super::*;
    use crate::memory::MemoryElement;

    #[test]
    fn present_alt_is_quoted_verbatim() {
        for value in ["cat", "a \"quoted\" dog", " spaced ", "ü"] {
            let a = resolve_image(Some(value));
            assert_eq!(a.classification, Classification::Present);
            assert!(a.content.text().contains(value), "content keeps {value:?}");
            assert_eq!(a.content.text(), format!("Alt text: \"{value}\""));
        }
    }

    #[test]
    fn empty_and_missing_are_distinct() {
        let empty = resolve_image(Some(""));
        assert_eq!(empty.classification, Classification::Empty);
        assert_eq!(empty.content.text(), EMPTY_ALT_TEXT);

        let missing = resolve_image(None);
        assert_eq!(missing.classification, Classification::Missing);
        assert_eq!(missing.content.text(), MISSING_ALT_TEXT);
    }

    #[test]
    fn whitespace_alt_counts_as_present() {
        assert_eq!(
            resolve_image(Some(" ")).classification,
            Classification::Present
        );
    }

    #[test]
    fn iframe_links_to_source() {
        let el = MemoryElement::iframe(
            Rect::new(0.0, 0.0, 300.0, 150.0),
            "https://video.example/embed/1",
        );
        let a = resolve(&el);
        assert_eq!(a.classification, Classification::Restricted);
        assert_eq!(
            a.content,
            OverlayContent::Link {
                href: "https://video.example/embed/1".into(),
                label: RESTRICTED_LABEL,
            }
        );
    }

    #[test]
    fn classification_names_are_distinct_css_tokens() {
        let names = Classification::ALL.map(Classification::as_str);
        assert_eq!(names, ["present", "empty", "missing", "restricted"]);
        for (i, c) in Classification::ALL.into_iter().enumerate() {
            assert_eq!(c as usize, i, "ALL follows declaration order");
        }
    }

    #[test]
    fn resolve_reads_current_attributes() {
        let mut el = MemoryElement::image(Rect::new(0.0, 0.0, 5.0, 5.0), None);
        assert_eq!(resolve(&el).classification, Classification::Missing);
        el.set_alt(Some("now described"));
        assert_eq!(resolve(&el).classification, Classification::Present);
    }
}
