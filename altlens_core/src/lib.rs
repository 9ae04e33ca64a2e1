// Copyright 2026 the Altlens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlay positioning and lifecycle engine for alt-text annotations.
//!
//! `altlens_core` scans a live document for images and iframes, classifies
//! each one's alt text, and keeps a set of page-absolute overlays in sync
//! with layout changes. It is `no_std` compatible (with `alloc`) and never
//! touches a real DOM: hosts implement the [`backend`] traits.
//!
//! # Architecture
//!
//! ```text
//!   ActivationBridge::show() ──► Controller::activate()
//!                                      │
//!                 ┌────────────────────┘
//!                 ▼
//!   target::scan() ──► annotation::resolve() ──► render::render()
//!                                                     │
//!                                                     ▼
//!                                           OverlaySurface (container)
//!
//!   resize / scroll / mutation ──► Debouncer ──► wakeup ──► full re-pass
//! ```
//!
//! **[`target`]** — Target elements and the stateless scanner.
//!
//! **[`annotation`]** — Pure classification into present / empty / missing /
//! restricted.
//!
//! **[`render`]** — Size filtering and page-absolute placement.
//!
//! **[`controller`]** — The `Inactive → Active → Inactive` lifecycle,
//! debounced re-passes, dismissal, self-healing container.
//!
//! **[`bridge`]** — `show` / `hide` for the host, plus explicit session
//! state.
//!
//! **[`backend`]** — [`Page`](backend::Page) and
//! [`OverlaySurface`](backend::OverlaySurface), the host contract.
//!
//! **[`memory`]** — In-memory host used by tests and demos.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and lifecycle
//! events, with zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod annotation;
pub mod backend;
pub mod bridge;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod memory;
pub mod overlay;
pub mod render;
pub mod target;
pub mod time;
pub mod trace;
