// Copyright 2026 the Viewports Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for viewports.
//!
//! This crate binds [`viewports_core`] to browser APIs:
//!
//! - [`DomElement`]: a DOM element as a [`TrackedElement`], styled through
//!   `classList`
//! - [`RafLoop`]: `requestAnimationFrame` sampling loop
//! - [`Interval`]: `setInterval` handle used for the presence check
//! - [`IntersectionWatch`]: per-element `IntersectionObserver`
//! - [`EventListener`]: scoped `addEventListener` registration
//! - [`ViewportController`]: one element, its observer, frame loop, and timers
//! - [`ViewportManager`]: many elements behind one scroll/resize listener pair
//! - [`ConsoleSink`]: a [`TraceSink`] writing to the browser console
//!
//! [`TrackedElement`]: viewports_core::element::TrackedElement
//! [`TraceSink`]: viewports_core::trace::TraceSink

#![no_std]

extern crate alloc;

mod console;
mod controller;
mod element;
mod listener;
mod manager;
mod observer;
mod raf;
mod timer;

pub use console::ConsoleSink;
pub use controller::{PRESENCE_CHECK_MS, ViewportController};
pub use element::DomElement;
pub use listener::EventListener;
pub use manager::ViewportManager;
pub use observer::{IntersectionWatch, intersection_observer_supported};
pub use raf::{FrameTick, RafLoop};
pub use timer::Interval;

use wasm_bindgen::JsValue;
use web_sys::Window;

/// Returns the global `window`, or an error outside a browsing context.
pub(crate) fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no global `window`"))
}

/// Height of the layout viewport (`window.innerHeight`), if it is a number.
#[must_use]
pub fn window_height(window: &Window) -> Option<f64> {
    window.inner_height().ok().and_then(|h| h.as_f64())
}

/// Vertical scroll offset of the document (`window.scrollY`).
#[must_use]
pub fn scroll_offset(window: &Window) -> Option<f64> {
    window.scroll_y().ok()
}
