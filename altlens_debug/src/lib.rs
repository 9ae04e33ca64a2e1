// Copyright 2026 the Altlens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and JSON export for altlens diagnostics.
//!
//! This crate provides [`TraceSink`](altlens_core::trace::TraceSink)
//! implementations for development and native tooling:
//!
//! - [`pretty::PrettyPrintSink`] — human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`] — owned in-memory event log.
//! - [`json::export`] — writes recorded events as JSON lines.

pub mod json;
pub mod pretty;
pub mod recorder;
