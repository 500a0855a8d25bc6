// Copyright 2026 the Viewports Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scoped `addEventListener` registration.

use alloc::boxed::Box;
use core::cell::Cell;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Event, EventTarget};

/// An event listener removed by [`remove`](Self::remove) or on drop.
pub struct EventListener {
    target: EventTarget,
    kind: &'static str,
    attached: Cell<bool>,
    closure: Closure<dyn FnMut(Event)>,
}

impl EventListener {
    /// Adds a passive listener for `kind` on `target`.
    ///
    /// # Errors
    ///
    /// Returns the exception thrown by `addEventListener`.
    pub fn new(
        target: &EventTarget,
        kind: &'static str,
        callback: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        Self::with_once(target, kind, false, callback)
    }

    /// Adds a passive listener that the host removes after its first call.
    ///
    /// # Errors
    ///
    /// Returns the exception thrown by `addEventListener`.
    pub fn once(
        target: &EventTarget,
        kind: &'static str,
        callback: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        Self::with_once(target, kind, true, callback)
    }

    fn with_once(
        target: &EventTarget,
        kind: &'static str,
        once: bool,
        callback: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let closure = Closure::wrap(Box::new(callback) as Box<dyn FnMut(Event)>);
        let options = AddEventListenerOptions::new();
        options.set_passive(true);
        options.set_once(once);
        target.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            closure.as_ref().unchecked_ref(),
            &options,
        )?;
        Ok(Self {
            target: target.clone(),
            kind,
            attached: Cell::new(true),
            closure,
        })
    }

    /// Event type this listener was registered for.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Unregisters the listener. Idempotent.
    pub fn remove(&self) {
        if self.attached.replace(false) {
            let _ = self
                .target
                .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
        }
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        self.remove();
    }
}

impl core::fmt::Debug for EventListener {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventListener")
            .field("kind", &self.kind)
            .field("attached", &self.attached.get())
            .finish_non_exhaustive()
    }
}
