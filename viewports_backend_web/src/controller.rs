// Copyright 2026 the Viewports Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One tracked element and the host resources it holds.
//!
//! A [`ViewportController`] owns a [`Tracker`] for a single element and
//! wires it to the browser:
//!
//! ```text
//!   IntersectionObserver ──► set_intersecting ──► RafLoop start/stop
//!   RafLoop frame ─────────► on_frame(getBoundingClientRect)
//!   window "resize" ───────► resize + update
//!   window "load" ─────────► initialise
//!   setInterval(5 s) ──────► check_presence(isConnected)
//! ```
//!
//! Every callback holds only a `Weak` reference to the shared state. Once
//! the tracker is tidied, all host registrations are released; the Rust side
//! of each handle stays alive until the controller is dropped, so no closure
//! is ever freed while it is running.
//!
//! The animation callback runs after the state borrow is released, so it may
//! call back into its own controller, e.g. to [`tidy`](ViewportController::tidy)
//! once its animation is done.

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::string::{String, ToString};
use core::cell::{Cell, OnceCell, RefCell};

use viewports_core::callback::AnimationCallback;
use viewports_core::element::TrackedElement as _;
use viewports_core::geometry::Percentages;
use viewports_core::id::{SharedIdAllocator, ViewportId};
use viewports_core::options::TrackerOptions;
use viewports_core::trace::{TraceSink, Tracer};
use viewports_core::tracker::{
    FrameRequest, IntersectionSource, Phase, Subscription, TidyReason, Tracker,
};
use wasm_bindgen::JsValue;
use web_sys::{Element, Window};

use crate::console::ConsoleSink;
use crate::element::DomElement;
use crate::listener::EventListener;
use crate::observer::IntersectionWatch;
use crate::raf::RafLoop;
use crate::timer::Interval;

/// Period of the document-presence check.
pub const PRESENCE_CHECK_MS: i32 = 5_000;

static CONTROLLER_IDS: SharedIdAllocator = SharedIdAllocator::new();

struct State {
    window: Window,
    element: DomElement,
    tracker: Tracker,
    sink: Box<dyn TraceSink>,
}

impl State {
    fn split(&mut self) -> (&mut Tracker, &mut DomElement, Tracer<'_>) {
        let Self {
            tracker,
            element,
            sink,
            ..
        } = self;
        (tracker, element, Tracer::new(sink.as_mut()))
    }
}

/// What the accessors report, refreshed whenever the state is released.
#[derive(Clone, Copy, Debug)]
struct Snapshot {
    phase: Phase,
    percentages: Option<Percentages>,
    on_screen: bool,
}

impl Snapshot {
    fn of(tracker: &Tracker) -> Self {
        Self {
            phase: tracker.phase(),
            percentages: tracker.percentages(),
            on_screen: tracker.is_on_screen(),
        }
    }
}

#[derive(Default)]
struct Handles {
    raf: OnceCell<RafLoop>,
    watch: OnceCell<IntersectionWatch>,
    presence: OnceCell<Interval>,
    resize: OnceCell<EventListener>,
    load: OnceCell<EventListener>,
}

impl Handles {
    fn release_all(&self) {
        if let Some(raf) = self.raf.get() {
            raf.stop();
        }
        if let Some(watch) = self.watch.get() {
            watch.disconnect();
        }
        if let Some(presence) = self.presence.get() {
            presence.clear();
        }
        if let Some(resize) = self.resize.get() {
            resize.remove();
        }
        if let Some(load) = self.load.get() {
            load.remove();
        }
    }
}

struct Shared {
    state: RefCell<State>,
    /// Kept out of `state` so it can run with `state` released.
    callback: RefCell<Option<AnimationCallback>>,
    snapshot: Cell<Snapshot>,
    /// Set by a `tidy` that found `state` borrowed.
    tidy_requested: Cell<bool>,
    handles: Handles,
}

impl Shared {
    /// Runs `f` against the state, releases host resources if the tracker
    /// ended up tidied, then hands any new values to the callback.
    ///
    /// Returns `None` without running `f` if the state is already borrowed.
    fn with<R>(&self, f: impl FnOnce(&mut State) -> R) -> Option<R> {
        let (result, pending, tidied) = {
            let mut state = self.state.try_borrow_mut().ok()?;
            let result = f(&mut state);
            if self.tidy_requested.take() {
                let (tracker, _, mut tracer) = state.split();
                tracker.tidy(TidyReason::Requested, &mut tracer);
            }
            self.snapshot.set(Snapshot::of(&state.tracker));
            let pending = state.tracker.take_pending();
            (result, pending, state.tracker.is_tidied())
        };
        if tidied {
            self.handles.release_all();
        }
        if let Some(percentages) = pending {
            self.notify(percentages);
        }
        Some(result)
    }

    fn notify(&self, percentages: Percentages) {
        let (top, middle, bottom) = percentages.as_tuple();
        let result = match self.callback.try_borrow_mut() {
            Ok(mut callback) => match callback.as_mut() {
                Some(callback) => callback(top, middle, bottom),
                None => return,
            },
            // Re-entered from the callback itself.
            Err(_) => return,
        };
        if let Err(error) = result {
            self.with(|state| {
                let (tracker, _, mut tracer) = state.split();
                tracker.report_callback_failure(&error, &mut tracer);
            });
        }
    }

    fn is_tidied(&self) -> bool {
        self.snapshot.get().phase == Phase::Tidied
    }

    fn measure(&self) {
        self.with(|state| {
            let height = crate::window_height(&state.window);
            let observed = state.tracker.source().is_some();
            let (tracker, element, mut tracer) = state.split();
            if observed {
                if let (Some(geometry), Some(height)) = (element.geometry(), height) {
                    tracker.initialise(geometry, height, element, &mut tracer);
                }
            } else {
                let height = height.unwrap_or(f64::NAN);
                tracker.initialise_without_observer(height, element, &mut tracer);
            }
        });
    }
}

/// Console output for `options`: verbose when the element asked for
/// diagnostics.
fn console_sink(options: &TrackerOptions) -> Box<dyn TraceSink> {
    if options.debug() {
        Box::new(ConsoleSink::verbose())
    } else {
        Box::new(ConsoleSink::new())
    }
}

/// Tracks one element for as long as it stays in the document.
///
/// Tracking stops for good when [`tidy`](Self::tidy) is called, when the
/// stop threshold is crossed, or when the presence check finds the element
/// detached. Dropping the controller also releases everything; to keep an
/// element tracked without holding the controller, `core::mem::forget` it.
pub struct ViewportController {
    id: ViewportId,
    element: Element,
    shared: Rc<Shared>,
}

impl ViewportController {
    /// Starts tracking `element`. Events are reported through a
    /// [`ConsoleSink`]: failures only, or everything when
    /// [`TrackerOptions::debug`] is set.
    ///
    /// # Errors
    ///
    /// Returns the exception raised by the host while wiring listeners,
    /// timers, or the observer.
    pub fn create(
        element: Element,
        options: TrackerOptions,
        callback: Option<AnimationCallback>,
    ) -> Result<Self, JsValue> {
        let sink = console_sink(&options);
        Self::build(element, &options, callback, sink)
    }

    /// Like [`create`](Self::create), reporting lifecycle events to `sink`.
    ///
    /// # Errors
    ///
    /// See [`create`](Self::create).
    pub fn create_traced(
        element: Element,
        options: TrackerOptions,
        callback: Option<AnimationCallback>,
        sink: Box<dyn TraceSink>,
    ) -> Result<Self, JsValue> {
        Self::build(element, &options, callback, sink)
    }

    /// Starts tracking `element` with options read from its `data-*`
    /// attributes.
    ///
    /// # Errors
    ///
    /// Returns the attribute error as a string, or any error from
    /// [`create`](Self::create).
    pub fn from_data_attributes(
        element: Element,
        callback: Option<AnimationCallback>,
    ) -> Result<Self, JsValue> {
        let options = DomElement::new(element.clone())
            .options()
            .map_err(|err| JsValue::from_str(&err.to_string()))?;
        let sink = console_sink(&options);
        Self::build(element, &options, callback, sink)
    }

    fn build(
        element: Element,
        options: &TrackerOptions,
        callback: Option<AnimationCallback>,
        sink: Box<dyn TraceSink>,
    ) -> Result<Self, JsValue> {
        let window = crate::window()?;
        let id = CONTROLLER_IDS
            .allocate()
            .ok_or_else(|| JsValue::from_str("viewport handles exhausted"))?;
        let dom = DomElement::new(element.clone());
        let mut tracker = Tracker::new(id, options, None);
        tracker.set_label(dom.label().map(String::from));
        if let Some(height) = crate::window_height(&window) {
            tracker.resize(height);
        }
        let shared = Rc::new(Shared {
            snapshot: Cell::new(Snapshot::of(&tracker)),
            state: RefCell::new(State {
                window: window.clone(),
                element: dom,
                tracker,
                sink,
            }),
            callback: RefCell::new(callback),
            tidy_requested: Cell::new(false),
            handles: Handles::default(),
        });
        let weak = Rc::downgrade(&shared);

        let raf = RafLoop::new(frame_callback(weak.clone()));
        let _ = shared.handles.raf.set(raf);

        let watch = IntersectionWatch::observe(&window, &element, {
            let weak = weak.clone();
            move |intersecting| {
                let Some(shared) = weak.upgrade() else {
                    return;
                };
                let request = shared.with(|state| {
                    let (tracker, element, mut tracer) = state.split();
                    tracker.set_intersecting(intersecting, element, &mut tracer)
                });
                let (Some(request), Some(raf)) = (request, shared.handles.raf.get()) else {
                    return;
                };
                match request {
                    FrameRequest::Start | FrameRequest::Continue if !shared.is_tidied() => {
                        raf.start();
                    }
                    _ => raf.stop(),
                }
            }
        })?;
        if let Some(watch) = watch {
            shared.with(|state| {
                let (tracker, _, mut tracer) = state.split();
                tracker.observe(IntersectionSource::Observer, &mut tracer);
            });
            let _ = shared.handles.watch.set(watch);
        }

        let presence = Interval::new(&window, PRESENCE_CHECK_MS, {
            let weak = weak.clone();
            move || {
                if let Some(shared) = weak.upgrade() {
                    shared.with(|state| {
                        let attached = state.element.is_attached();
                        let (tracker, _, mut tracer) = state.split();
                        tracker.check_presence(attached, &mut tracer);
                    });
                }
            }
        })?;
        let _ = shared.handles.presence.set(presence);
        shared.with(|state| state.tracker.subscribe(Subscription::PresenceCheck));

        let resize = EventListener::new(&window, "resize", {
            let weak = weak.clone();
            move |_| {
                if let Some(shared) = weak.upgrade() {
                    shared.with(|state| {
                        let height = crate::window_height(&state.window);
                        let (tracker, element, mut tracer) = state.split();
                        if !height.is_some_and(|h| tracker.resize(h)) {
                            return;
                        }
                        if tracker.source() == Some(IntersectionSource::Observer)
                            && let Some(geometry) = element.geometry()
                        {
                            tracker.update(geometry, element, &mut tracer);
                        }
                    });
                }
            }
        })?;
        let _ = shared.handles.resize.set(resize);

        let loaded = window
            .document()
            .is_some_and(|doc| doc.ready_state() == "complete");
        if loaded {
            shared.measure();
        } else {
            let load = EventListener::once(&window, "load", move |_| {
                if let Some(shared) = weak.upgrade() {
                    shared.measure();
                }
            })?;
            let _ = shared.handles.load.set(load);
        }

        Ok(Self {
            id,
            element,
            shared,
        })
    }

    /// Handle of the tracked element, as it appears in trace events.
    #[must_use]
    pub fn id(&self) -> ViewportId {
        self.id
    }

    /// The tracked element.
    #[must_use]
    pub fn element(&self) -> &Element {
        &self.element
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.shared.snapshot.get().phase
    }

    /// Last computed percentages.
    #[must_use]
    pub fn percentages(&self) -> Option<Percentages> {
        self.shared.snapshot.get().percentages
    }

    /// Whether the element currently intersects the viewport.
    #[must_use]
    pub fn is_on_screen(&self) -> bool {
        self.shared.snapshot.get().on_screen
    }

    /// Returns `true` once tracking has stopped for good.
    #[must_use]
    pub fn is_tidied(&self) -> bool {
        self.shared.is_tidied()
    }

    /// Stops tracking and releases the observer, frame loop, timer, and
    /// listeners. Idempotent, and safe to call from the animation callback.
    pub fn tidy(&self) {
        let done = self.shared.with(|state| {
            let (tracker, _, mut tracer) = state.split();
            tracker.tidy(TidyReason::Requested, &mut tracer);
        });
        if done.is_none() {
            self.shared.tidy_requested.set(true);
        }
    }
}

fn frame_callback(weak: Weak<Shared>) -> impl FnMut(crate::FrameTick) -> FrameRequest {
    move |_tick| {
        let Some(shared) = weak.upgrade() else {
            return FrameRequest::Stop;
        };
        let request = shared
            .with(|state| {
                let (tracker, element, mut tracer) = state.split();
                let geometry = element.geometry();
                tracker.on_frame(geometry, element, &mut tracer)
            })
            .unwrap_or(FrameRequest::Continue);
        // The callback may have tidied the controller after `on_frame`.
        if shared.is_tidied() {
            FrameRequest::Stop
        } else {
            request
        }
    }
}

impl Drop for ViewportController {
    fn drop(&mut self) {
        self.shared.handles.release_all();
    }
}

impl core::fmt::Debug for ViewportController {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let snapshot = self.shared.snapshot.get();
        f.debug_struct("ViewportController")
            .field("id", &self.id)
            .field("phase", &snapshot.phase)
            .field("percentages", &snapshot.percentages)
            .field("on_screen", &snapshot.on_screen)
            .finish_non_exhaustive()
    }
}
