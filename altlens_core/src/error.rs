// Copyright 2026 the Altlens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported by host seams.
//!
//! None of these abort a pass. The controller turns them into
//! [`SkipReason`](crate::trace::SkipReason) events or retries on the next
//! pass.

/// A failure from an [`OverlaySurface`](crate::backend::OverlaySurface)
/// operation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    /// No document body (or equivalent root) to attach the container to.
    #[error("no attachment root for the overlay container")]
    NoRoot,

    /// The container is not attached; overlays cannot be appended.
    #[error("overlay container is missing")]
    MissingContainer,

    /// The host refused to create or attach a node.
    #[error("host rejected node creation: {0}")]
    Rejected(&'static str),
}

/// A failure from a [`Page`](crate::backend::Page) operation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    /// The element's bounding rectangle could not be read or is not finite.
    #[error("bounding rectangle is unavailable or malformed")]
    MalformedRect,

    /// The host could not register an event listener.
    #[error("event listener registration failed: {0}")]
    Listener(&'static str),

    /// The host could not arm a wakeup timer.
    #[error("wakeup timer could not be armed")]
    Timer,
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn display_messages_are_stable() {
        assert_eq!(
            SurfaceError::MissingContainer.to_string(),
            "overlay container is missing"
        );
        assert!(
            SurfaceError::Rejected("div")
                .to_string()
                .contains("host rejected node creation: div")
        );
        assert!(
            PageError::Listener("scroll")
                .to_string()
                .ends_with("scroll")
        );
    }
}
