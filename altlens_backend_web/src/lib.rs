// Copyright 2026 the Altlens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser backend for altlens.
//!
//! This crate provides the DOM side of the engine:
//!
//! - [`DomPage`]: target scanning, scroll offset, resize/scroll listeners, an
//!   optional `MutationObserver`, and the debounce [`WakeupTimer`].
//! - [`DomSurface`]: the overlay container and overlay nodes.
//! - [`ConsoleSink`]: diagnostics to the browser console.
//!
//! The host owns the wiring. `DomPage` and `DomSurface` take plain callbacks
//! for layout events, timer wakeups and close-button clicks; the host routes
//! them back into its [`Controller`](altlens_core::controller::Controller).
//! See `demos/content_script` for an extension content script built this way.

#![no_std]

extern crate alloc;

mod console;
mod page;
mod surface;
mod timer;

pub use altlens_core::backend::{OverlaySurface, Page};
pub use console::ConsoleSink;
pub use page::{DomElement, DomPage};
pub use surface::DomSurface;
pub use timer::{WakeupTimer, now};
