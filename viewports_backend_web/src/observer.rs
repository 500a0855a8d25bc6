// Copyright 2026 the Viewports Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-element `IntersectionObserver`.

use alloc::boxed::Box;
use core::cell::Cell;

use js_sys::{Array, Reflect};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, Window};

/// Returns `true` if the host exposes `IntersectionObserver`.
#[must_use]
pub fn intersection_observer_supported(window: &Window) -> bool {
    Reflect::has(window, &JsValue::from_str("IntersectionObserver")).unwrap_or(false)
}

/// Watches one element and reports whether it intersects the viewport.
///
/// The observer is disconnected by [`disconnect`](Self::disconnect) or on
/// drop.
pub struct IntersectionWatch {
    observer: IntersectionObserver,
    connected: Cell<bool>,
    _closure: Closure<dyn FnMut(Array)>,
}

impl IntersectionWatch {
    /// Starts observing `element`.
    ///
    /// Returns `Ok(None)` when the host has no `IntersectionObserver`; the
    /// caller should fall back to treating the element as fully visible.
    ///
    /// # Errors
    ///
    /// Returns the exception thrown while constructing the observer.
    pub fn observe(
        window: &Window,
        element: &Element,
        mut callback: impl FnMut(bool) + 'static,
    ) -> Result<Option<Self>, JsValue> {
        if !intersection_observer_supported(window) {
            return Ok(None);
        }
        let closure = Closure::wrap(Box::new(move |entries: Array| {
            // Batched entries are in time order; the last one is current.
            let last = entries.length().checked_sub(1);
            if let Some(index) = last {
                let entry: IntersectionObserverEntry = entries.get(index).unchecked_into();
                callback(entry.is_intersecting());
            }
        }) as Box<dyn FnMut(Array)>);
        let observer = IntersectionObserver::new(closure.as_ref().unchecked_ref())?;
        observer.observe(element);
        Ok(Some(Self {
            observer,
            connected: Cell::new(true),
            _closure: closure,
        }))
    }

    /// Stops all notifications. Idempotent.
    pub fn disconnect(&self) {
        if self.connected.replace(false) {
            self.observer.disconnect();
        }
    }

    /// Returns `true` until disconnected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.get()
    }
}

impl Drop for IntersectionWatch {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl core::fmt::Debug for IntersectionWatch {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IntersectionWatch")
            .field("connected", &self.connected.get())
            .finish_non_exhaustive()
    }
}
