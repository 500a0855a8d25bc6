// Copyright 2026 the Viewports Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `requestAnimationFrame` sampling loop.
//!
//! [`RafLoop`] calls its callback once per animation frame while running.
//! The callback answers with a [`FrameRequest`]: `Stop` ends the loop from
//! inside the frame, anything else re-arms it.
//!
//! [`FrameRequest`]: viewports_core::tracker::FrameRequest

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use viewports_core::tracker::FrameRequest;

// Direct global bindings instead of `web_sys::Window` methods, so no Window
// has to be fetched on every frame.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = "requestAnimationFrame")]
    fn request_animation_frame(callback: &JsValue) -> i32;

    #[wasm_bindgen(js_name = "cancelAnimationFrame")]
    fn cancel_animation_frame(id: i32);
}

/// One animation frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTick {
    /// The `DOMHighResTimeStamp` passed to the frame callback, in ms.
    pub timestamp_ms: f64,
    /// Frames delivered since the loop was created.
    pub frame_index: u64,
}

/// A `requestAnimationFrame` loop.
///
/// Create with [`RafLoop::new`], then call [`start`](Self::start). The loop
/// re-registers itself each frame until the callback returns
/// [`FrameRequest::Stop`], [`stop`](Self::stop) is called, or the `RafLoop`
/// is dropped.
pub struct RafLoop {
    inner: Rc<RafInner>,
}

type RafClosure = Closure<dyn FnMut(f64)>;

struct RafInner {
    /// Created on first start and reused afterwards, so a restart issued
    /// from inside a frame never replaces the closure that is running.
    closure: RefCell<Option<RafClosure>>,
    callback: RefCell<Box<dyn FnMut(FrameTick) -> FrameRequest>>,
    frame_counter: Cell<u64>,
    running: Cell<bool>,
    /// Pending `requestAnimationFrame` id, if one is armed.
    raf_id: Cell<Option<i32>>,
}

impl RafLoop {
    /// Creates a loop that is **not yet running**.
    pub fn new(callback: impl FnMut(FrameTick) -> FrameRequest + 'static) -> Self {
        Self {
            inner: Rc::new(RafInner {
                closure: RefCell::new(None),
                callback: RefCell::new(Box::new(callback)),
                frame_counter: Cell::new(0),
                running: Cell::new(false),
                raf_id: Cell::new(None),
            }),
        }
    }

    /// Starts the loop. No-op while running.
    pub fn start(&self) {
        if self.inner.running.get() {
            return;
        }
        self.inner.running.set(true);

        if self.inner.closure.borrow().is_none() {
            let inner = Rc::clone(&self.inner);
            let closure = Closure::wrap(Box::new(move |timestamp_ms: f64| {
                inner.raf_id.set(None);
                if !inner.running.get() {
                    return;
                }

                let frame_index = inner.frame_counter.get();
                inner.frame_counter.set(frame_index + 1);
                let tick = FrameTick {
                    timestamp_ms,
                    frame_index,
                };

                // Scoped so it doesn't overlap with the `closure` RefCell.
                let request = inner.callback.borrow_mut()(tick);
                if request == FrameRequest::Stop {
                    inner.running.set(false);
                }

                if inner.running.get() {
                    inner.arm();
                }
            }) as Box<dyn FnMut(f64)>);
            *self.inner.closure.borrow_mut() = Some(closure);
        }

        self.inner.arm();
    }

    /// Stops the loop and cancels the pending frame. Can be restarted.
    pub fn stop(&self) {
        if !self.inner.running.get() {
            return;
        }
        self.inner.running.set(false);
        if let Some(id) = self.inner.raf_id.take() {
            cancel_animation_frame(id);
        }
    }

    /// Returns `true` while the loop is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.running.get()
    }

    /// Frames delivered so far.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.inner.frame_counter.get()
    }
}

impl RafInner {
    fn arm(&self) {
        if self.raf_id.get().is_some() {
            return;
        }
        if let Some(ref closure) = *self.closure.borrow() {
            let id = request_animation_frame(closure.as_ref().unchecked_ref());
            self.raf_id.set(Some(id));
        }
    }
}

impl Drop for RafLoop {
    fn drop(&mut self) {
        self.stop();
        // The closure holds an `Rc` to `inner`; dropping it breaks the cycle.
        self.inner.closure.borrow_mut().take();
    }
}

impl core::fmt::Debug for RafLoop {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RafLoop")
            .field("running", &self.inner.running.get())
            .field("frame_counter", &self.inner.frame_counter.get())
            .finish_non_exhaustive()
    }
}
