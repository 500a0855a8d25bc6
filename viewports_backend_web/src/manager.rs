// Copyright 2026 the Viewports Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Many elements behind one window scroll/resize listener pair.
//!
//! [`ViewportManager`] drives a [`ViewportRegistry`] of [`DomElement`]s from
//! the window's `scroll` and `resize` events, with one presence check for
//! all of them. It is the alternative to one [`ViewportController`] per
//! element for hosts without `IntersectionObserver`.
//!
//! Animation callbacks run after the registry is released, so a callback may
//! call back into the manager, e.g. to unregister its own element.
//!
//! [`ViewportController`]: crate::ViewportController

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::{OnceCell, RefCell};

use viewports_core::callback::{AnimationCallback, CallbackError};
use viewports_core::element::TrackedElement as _;
use viewports_core::id::ViewportId;
use viewports_core::options::TrackerOptions;
use viewports_core::registry::{
    ElementFailure, PendingUpdate, ScrollReport, ScrollTarget, ViewportRegistry,
};
use viewports_core::trace::{CallbackFailedEvent, TraceSink, Tracer};
use wasm_bindgen::JsValue;
use web_sys::{Element, ScrollBehavior, ScrollToOptions, Window};

use crate::console::ConsoleSink;
use crate::controller::PRESENCE_CHECK_MS;
use crate::element::DomElement;
use crate::listener::EventListener;
use crate::timer::Interval;

struct State {
    window: Window,
    registry: ViewportRegistry<DomElement>,
    sink: Box<dyn TraceSink>,
}

impl State {
    fn split(&mut self) -> (&mut ViewportRegistry<DomElement>, Tracer<'_>) {
        (&mut self.registry, Tracer::new(self.sink.as_mut()))
    }

    fn scroll(&mut self) -> ScrollReport {
        let Some(offset) = crate::scroll_offset(&self.window) else {
            return ScrollReport::default();
        };
        let (registry, mut tracer) = self.split();
        registry.on_global_scroll(offset, &mut tracer)
    }

    fn resize(&mut self) -> ScrollReport {
        let height = crate::window_height(&self.window).unwrap_or(f64::NAN);
        let offset = crate::scroll_offset(&self.window).unwrap_or(f64::NAN);
        let (registry, mut tracer) = self.split();
        registry.resize(height, offset, &mut tracer)
    }
}

struct ManagedCallback {
    id: ViewportId,
    label: Option<String>,
    /// `None` while the callback is running.
    callback: Option<AnimationCallback>,
}

struct Shared {
    state: RefCell<State>,
    /// Kept out of `state`; neither is borrowed while a callback runs.
    callbacks: RefCell<Vec<ManagedCallback>>,
    scroll: OnceCell<EventListener>,
    resize: OnceCell<EventListener>,
    presence: OnceCell<Interval>,
}

impl Shared {
    /// Runs `f` against the state, then hands queued values to their
    /// callbacks and returns the failures alongside `f`'s result.
    ///
    /// Returns `None` without running `f` if the state is already borrowed.
    fn with<R>(&self, f: impl FnOnce(&mut State) -> R) -> Option<(R, Vec<ElementFailure>)> {
        let (result, pending) = {
            let mut state = self.state.try_borrow_mut().ok()?;
            let result = f(&mut state);
            (result, state.registry.take_pending())
        };
        let failures = self.deliver(pending);
        self.prune();
        Some((result, failures))
    }

    fn deliver(&self, pending: Vec<PendingUpdate>) -> Vec<ElementFailure> {
        let mut failures = Vec::new();
        for update in pending {
            let taken = self
                .callbacks
                .borrow_mut()
                .iter_mut()
                .find(|c| c.id == update.id)
                .and_then(|c| c.callback.take().map(|callback| (callback, c.label.clone())));
            // Either no callback, or its own call is still on the stack.
            let Some((mut callback, label)) = taken else {
                continue;
            };
            let (top, middle, bottom) = update.percentages.as_tuple();
            let result = callback(top, middle, bottom);
            if let Some(slot) = self
                .callbacks
                .borrow_mut()
                .iter_mut()
                .find(|c| c.id == update.id)
            {
                slot.callback = Some(callback);
            }
            if let Err(error) = result {
                self.report_failure(update.id, label.as_deref(), &error);
                failures.push(ElementFailure {
                    id: update.id,
                    error,
                });
            }
        }
        failures
    }

    fn report_failure(&self, id: ViewportId, label: Option<&str>, error: &CallbackError) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            Tracer::new(state.sink.as_mut()).callback_failed(&CallbackFailedEvent {
                id,
                label,
                error,
            });
        }
    }

    /// Drops callbacks whose elements have left the registry.
    fn prune(&self) {
        let Ok(state) = self.state.try_borrow() else {
            return;
        };
        self.callbacks
            .borrow_mut()
            .retain(|c| state.registry.tracker(c.id).is_some());
    }
}

/// Tracks a set of elements through the window's scroll and resize events.
///
/// Dropping the manager removes its listeners and timer; elements keep
/// whatever classes they had.
pub struct ViewportManager {
    shared: Rc<Shared>,
}

impl ViewportManager {
    /// Creates an empty manager and subscribes to the window. Callback
    /// failures are reported through a default [`ConsoleSink`].
    ///
    /// # Errors
    ///
    /// Returns the exception raised while adding listeners or the timer.
    pub fn new() -> Result<Self, JsValue> {
        Self::with_sink(Box::new(ConsoleSink::new()))
    }

    /// Like [`new`](Self::new), reporting events to `sink`.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn with_sink(sink: Box<dyn TraceSink>) -> Result<Self, JsValue> {
        let window = crate::window()?;
        let height = crate::window_height(&window).unwrap_or(0.0);
        let mut registry = ViewportRegistry::new(height);
        if let Some(offset) = crate::scroll_offset(&window) {
            registry.on_global_scroll(offset, &mut Tracer::none());
        }
        let shared = Rc::new(Shared {
            state: RefCell::new(State {
                window: window.clone(),
                registry,
                sink,
            }),
            callbacks: RefCell::new(Vec::new()),
            scroll: OnceCell::new(),
            resize: OnceCell::new(),
            presence: OnceCell::new(),
        });
        let weak = Rc::downgrade(&shared);

        let scroll = EventListener::new(&window, "scroll", on_state(weak.clone(), State::scroll))?;
        let _ = shared.scroll.set(scroll);
        let resize = EventListener::new(&window, "resize", on_state(weak.clone(), State::resize))?;
        let _ = shared.resize.set(resize);
        let presence = Interval::new(&window, PRESENCE_CHECK_MS, move || {
            if let Some(shared) = weak.upgrade() {
                shared.with(|state| {
                    let (registry, mut tracer) = state.split();
                    registry.tidy_detached(&mut tracer);
                });
            }
        })?;
        let _ = shared.presence.set(presence);

        Ok(Self { shared })
    }

    /// Starts tracking `element`, or returns its existing handle.
    ///
    /// The element's first values reach `callback` before this returns.
    ///
    /// # Errors
    ///
    /// Fails when called from inside a registry update, or once the manager
    /// has run out of handles.
    pub fn register(
        &self,
        element: Element,
        options: &TrackerOptions,
        callback: Option<AnimationCallback>,
    ) -> Result<ViewportId, JsValue> {
        self.register_element(DomElement::new(element), options, callback)
    }

    /// Starts tracking `element` with options read from its `data-*`
    /// attributes.
    ///
    /// # Errors
    ///
    /// Returns the attribute error as a string, or any error from
    /// [`register`](Self::register).
    pub fn register_from_data_attributes(
        &self,
        element: Element,
        callback: Option<AnimationCallback>,
    ) -> Result<ViewportId, JsValue> {
        let element = DomElement::new(element);
        let options = element
            .options()
            .map_err(|err| JsValue::from_str(&err.to_string()))?;
        self.register_element(element, &options, callback)
    }

    fn register_element(
        &self,
        element: DomElement,
        options: &TrackerOptions,
        callback: Option<AnimationCallback>,
    ) -> Result<ViewportId, JsValue> {
        let label = element.label().map(String::from);
        let callbacks = &self.shared.callbacks;
        let registered = self.shared.with(|state| {
            let (registry, mut tracer) = state.split();
            if let Some(id) = registry.find(&element) {
                return Some(id);
            }
            let id = registry.register(element, options, None, &mut tracer)?;
            if let Some(callback) = callback {
                callbacks.borrow_mut().push(ManagedCallback {
                    id,
                    label,
                    callback: Some(callback),
                });
            }
            Some(id)
        });
        match registered {
            Some((Some(id), _)) => Ok(id),
            Some((None, _)) => Err(JsValue::from_str("viewport handles exhausted")),
            None => Err(JsValue::from_str("viewport manager is busy")),
        }
    }

    /// Stops tracking `id` and returns its element.
    pub fn unregister(&self, id: ViewportId) -> Option<Element> {
        self.shared
            .with(|state| {
                let (registry, mut tracer) = state.split();
                registry.unregister(id, &mut tracer)
            })
            .and_then(|(element, _)| element)
            .map(|element| element.element().clone())
    }

    /// Number of tracked elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared
            .state
            .try_borrow()
            .map_or(0, |state| state.registry.len())
    }

    /// Returns `true` if nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Handles in registration order.
    #[must_use]
    pub fn ids(&self) -> Vec<ViewportId> {
        self.shared
            .state
            .try_borrow()
            .map(|state| state.registry.ids().collect())
            .unwrap_or_default()
    }

    /// Re-measures every element and fans out the current scroll position,
    /// as a `resize` event would. Callback failures from the delivery are
    /// included in the report.
    pub fn refresh(&self) -> ScrollReport {
        let Some((mut report, failures)) = self.shared.with(State::resize) else {
            return ScrollReport::default();
        };
        report.failures.extend(failures);
        report
    }

    /// Smoothly scrolls to the element registered after `id`.
    ///
    /// Returns the target, or `None` when `id` is the last element.
    pub fn navigate_to_next(&self, id: ViewportId) -> Option<ScrollTarget> {
        let state = self.shared.state.try_borrow().ok()?;
        let offset = crate::scroll_offset(&state.window)?;
        let target = state.registry.navigate_to_next(id, offset)?;
        let options = ScrollToOptions::new();
        options.set_top(target.offset);
        options.set_behavior(ScrollBehavior::Smooth);
        state.window.scroll_to_with_scroll_to_options(&options);
        Some(target)
    }
}

/// Wraps a state method as an event callback holding a `Weak` reference.
fn on_state(
    weak: Weak<Shared>,
    f: fn(&mut State) -> ScrollReport,
) -> impl FnMut(web_sys::Event) + 'static {
    move |_| {
        if let Some(shared) = weak.upgrade() {
            shared.with(f);
        }
    }
}

impl Drop for ViewportManager {
    fn drop(&mut self) {
        if let Some(scroll) = self.shared.scroll.get() {
            scroll.remove();
        }
        if let Some(resize) = self.shared.resize.get() {
            resize.remove();
        }
        if let Some(presence) = self.shared.presence.get() {
            presence.clear();
        }
    }
}

impl core::fmt::Debug for ViewportManager {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut debug = f.debug_struct("ViewportManager");
        if let Ok(state) = self.shared.state.try_borrow() {
            debug.field("registry", &state.registry);
        }
        debug.finish_non_exhaustive()
    }
}
