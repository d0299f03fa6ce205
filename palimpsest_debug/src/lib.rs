// Copyright 2026 the Palimpsest Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing and JSON recording of palimpsest compositor diagnostics.
//!
//! This crate provides [`TraceSink`](palimpsest_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: one human-readable line per event.
//! - [`json::JsonRecorder`]: collects events as JSON objects and writes them
//!   out as a single array.

pub mod json;
pub mod pretty;
