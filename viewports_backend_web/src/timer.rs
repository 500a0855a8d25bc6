// Copyright 2026 the Viewports Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `setInterval` handle.

use alloc::boxed::Box;
use core::cell::Cell;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::Window;

/// A repeating timer, cleared by [`clear`](Self::clear) or on drop.
///
/// The JS closure lives as long as the `Interval`, so clearing from inside
/// the callback is safe.
pub struct Interval {
    window: Window,
    handle: Cell<Option<i32>>,
    period_ms: i32,
    _closure: Closure<dyn FnMut()>,
}

impl Interval {
    /// Calls `callback` every `period_ms` milliseconds.
    ///
    /// # Errors
    ///
    /// Returns the exception thrown by `setInterval`.
    pub fn new(
        window: &Window,
        period_ms: i32,
        callback: impl FnMut() + 'static,
    ) -> Result<Self, JsValue> {
        let closure = Closure::wrap(Box::new(callback) as Box<dyn FnMut()>);
        let handle = window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            period_ms,
        )?;
        Ok(Self {
            window: window.clone(),
            handle: Cell::new(Some(handle)),
            period_ms,
            _closure: closure,
        })
    }

    /// Stops the timer. Idempotent.
    pub fn clear(&self) {
        if let Some(handle) = self.handle.take() {
            self.window.clear_interval_with_handle(handle);
        }
    }

    /// Returns `true` until the timer is cleared.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.handle.get().is_some()
    }
}

impl Drop for Interval {
    fn drop(&mut self) {
        self.clear();
    }
}

impl core::fmt::Debug for Interval {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Interval")
            .field("period_ms", &self.period_ms)
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}
