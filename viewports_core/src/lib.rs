// Copyright 2026 the Viewports Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll-driven viewport tracking.
//!
//! `viewports_core` tracks where an element sits relative to the visible
//! window, turns that into three visibility percentages, and mirrors them
//! onto the element as CSS classes in 10% steps. It is `no_std` compatible
//! (with `alloc`) and owns no host resources: backends feed it samples and
//! carry out the subscriptions it asks for.
//!
//! # Architecture
//!
//! ```text
//!   Host events (intersection / frame / scroll / resize / presence poll)
//!       │
//!       ▼
//!   Tracker ──► Percentages::compute() ──► ClassNames::apply() ──► ClassTarget
//!       │                                                          (element)
//!       ├──► AnimationCallback(top, middle, bottom)
//!       └──► FrameRequest / released Subscriptions ──► host
//! ```
//!
//! **[`geometry`]**: The offset-to-percentage mapping and screen overlap
//! test.
//!
//! **[`classes`]**: Table-driven threshold classes and the [`ClassTarget`]
//! trait elements implement.
//!
//! **[`tracker`]**: The per-element lifecycle state machine:
//! `Constructed → Observing → (Playing ⇄ Idle) → Tidied`.
//!
//! **[`registry`]**: A caller-owned registry that fans one scroll/resize
//! source out to many elements, with per-element failure isolation.
//!
//! **[`options`]**: Per-element configuration, including `data-*` attribute
//! parsing.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! lifecycle instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Example
//!
//! ```
//! use viewports_core::classes::{ClassSet, ClassTarget};
//! use viewports_core::geometry::ElementGeometry;
//! use viewports_core::id::IdAllocator;
//! use viewports_core::options::TrackerOptions;
//! use viewports_core::trace::Tracer;
//! use viewports_core::tracker::{FrameRequest, IntersectionSource, Tracker};
//!
//! let mut ids = IdAllocator::new();
//! let mut classes = ClassSet::new();
//! let mut tracer = Tracer::none();
//!
//! let mut tracker = Tracker::new(ids.allocate().unwrap(), &TrackerOptions::default(), None);
//! tracker.observe(IntersectionSource::Observer, &mut tracer);
//! tracker.resize(1000.0);
//!
//! assert_eq!(
//!     tracker.set_intersecting(true, &mut classes, &mut tracer),
//!     FrameRequest::Start
//! );
//! tracker.on_frame(Some(ElementGeometry::new(700.0, 200.0)), &mut classes, &mut tracer);
//! assert!(classes.has_class("vp--on-30"));
//! assert!(!classes.has_class("vp--on-40"));
//! ```
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod callback;
pub mod classes;
pub mod element;
pub mod geometry;
pub mod id;
pub mod options;
pub mod registry;
pub mod trace;
pub mod tracker;

pub use classes::ClassTarget;
