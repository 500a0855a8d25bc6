// Copyright 2026 the Viewports Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared registry fanning window scroll and resize out to many elements.
//!
//! This is the listener-per-page alternative to per-element intersection
//! observers: the host subscribes once to the window's scroll and resize
//! events and forwards them to [`ViewportRegistry::on_global_scroll`] and
//! [`ViewportRegistry::resize`]. Document-space bounds are cached per element
//! and only re-measured on resize.
//!
//! The registry is an ordinary value owned by the application, so several
//! independent registries can coexist.
//!
//! Elements registered without a callback queue their new values instead;
//! a host that keeps callbacks outside the registry collects them with
//! [`ViewportRegistry::take_pending`] once the registry call has returned.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Rect;

use crate::callback::{AnimationCallback, CallbackError};
use crate::element::TrackedElement;
use crate::geometry::{ElementGeometry, Percentages, ScreenSpan, to_document_bounds};
use crate::id::{IdAllocator, ViewportId};
use crate::options::TrackerOptions;
use crate::trace::{OverlapEvent, RegistryChange, RegistryEvent, ScrollFanoutEvent, Tracer};
use crate::tracker::{
    IntersectionSource, Subscription, TidyReason, Tracker, Update, UpdateOutcome,
};

/// Multiplier turning scroll distance (px) into animation duration (ms).
pub const NAVIGATION_MS_PER_PX: f64 = 1.5;

/// One element's callback failure during a fan-out.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementFailure {
    /// The element whose callback failed.
    pub id: ViewportId,
    /// What it reported.
    pub error: CallbackError,
}

/// Summary of one [`ViewportRegistry::on_global_scroll`] pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScrollReport {
    /// Elements that could be measured and were tested against the screen.
    pub visited: u32,
    /// Elements found on screen, in registration order.
    pub on_screen: Vec<ViewportId>,
    /// Per-element callback failures. The pass continued past each one.
    pub failures: Vec<ElementFailure>,
    /// Elements that crossed their stop threshold and left the registry.
    pub tidied: Vec<ViewportId>,
}

/// New values for an element registered without a callback.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PendingUpdate {
    /// The element concerned.
    pub id: ViewportId,
    /// Its freshly committed values.
    pub percentages: Percentages,
}

/// Where to scroll to bring the next element into view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollTarget {
    /// The element being navigated to.
    pub id: ViewportId,
    /// Document offset to scroll to: the element's vertical middle.
    pub offset: f64,
    /// Suggested animation duration in milliseconds.
    pub duration_ms: f64,
}

struct Entry<E> {
    id: ViewportId,
    element: E,
    tracker: Tracker,
    /// Document-space bounds, measured lazily and refreshed on resize.
    bounds: Option<Rect>,
}

/// An ordered set of tracked elements sharing one scroll/resize source.
pub struct ViewportRegistry<E> {
    entries: Vec<Entry<E>>,
    pending: Vec<PendingUpdate>,
    ids: IdAllocator,
    window_height: f64,
    scroll_offset: f64,
}

impl<E> core::fmt::Debug for ViewportRegistry<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ViewportRegistry")
            .field("len", &self.entries.len())
            .field("pending", &self.pending.len())
            .field("allocated_ids", &self.ids.allocated())
            .field("window_height", &self.window_height)
            .field("scroll_offset", &self.scroll_offset)
            .finish()
    }
}

impl<E: TrackedElement> ViewportRegistry<E> {
    /// Creates an empty registry for a window of the given height.
    #[must_use]
    pub fn new(window_height: f64) -> Self {
        Self {
            entries: Vec::new(),
            pending: Vec::new(),
            ids: IdAllocator::new(),
            window_height: if window_height.is_finite() && window_height > 0.0 {
                window_height
            } else {
                0.0
            },
            scroll_offset: 0.0,
        }
    }

    /// Number of registered elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Handles in registration order.
    pub fn ids(&self) -> impl Iterator<Item = ViewportId> + '_ {
        self.entries.iter().map(|e| e.id)
    }

    /// The cached window height.
    #[must_use]
    pub fn window_height(&self) -> f64 {
        self.window_height
    }

    /// The scroll offset of the last fan-out.
    #[must_use]
    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    /// The element registered under `id`.
    #[must_use]
    pub fn element(&self, id: ViewportId) -> Option<&E> {
        self.entry(id).map(|e| &e.element)
    }

    /// Mutable access to the element registered under `id`.
    pub fn element_mut(&mut self, id: ViewportId) -> Option<&mut E> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .map(|e| &mut e.element)
    }

    /// The tracker registered under `id`.
    #[must_use]
    pub fn tracker(&self, id: ViewportId) -> Option<&Tracker> {
        self.entry(id).map(|e| &e.tracker)
    }

    /// The handle of an already-registered element.
    #[must_use]
    pub fn find(&self, element: &E) -> Option<ViewportId> {
        self.entries
            .iter()
            .find(|e| e.element == *element)
            .map(|e| e.id)
    }

    /// Registers `element`, or returns its existing handle if it is already
    /// present (in which case `options` and `callback` are dropped).
    ///
    /// The new tracker takes its first measurement immediately. If that
    /// measurement already crosses the stop threshold, the element is tidied
    /// and leaves the registry before this returns.
    ///
    /// Returns `None` once the registry has run out of handles.
    pub fn register(
        &mut self,
        element: E,
        options: &TrackerOptions,
        callback: Option<AnimationCallback>,
        tracer: &mut Tracer<'_>,
    ) -> Option<ViewportId> {
        if let Some(id) = self.find(&element) {
            return Some(id);
        }
        let id = self.ids.allocate()?;
        let mut tracker = Tracker::new(id, options, callback);
        tracker.set_label(element.label().map(String::from));
        tracker.subscribe(Subscription::Registry);
        tracker.observe(IntersectionSource::ScrollFallback, tracer);

        let mut entry = Entry {
            id,
            element,
            tracker,
            bounds: None,
        };
        entry.bounds = measure(&entry.element, self.scroll_offset);
        if let Some(bounds) = entry.bounds {
            let geometry = ElementGeometry::from_document_bounds(bounds, self.scroll_offset);
            entry
                .tracker
                .initialise(geometry, self.window_height, &mut entry.element, tracer);
        } else {
            entry.tracker.resize(self.window_height);
        }
        if let Some(percentages) = entry.tracker.take_pending() {
            self.pending.push(PendingUpdate { id, percentages });
        }
        let tidied = entry.tracker.is_tidied();
        self.entries.push(entry);

        tracer.registry(&RegistryEvent {
            id,
            change: RegistryChange::Registered,
            len: self.entries.len(),
        });
        if tidied {
            self.drain_tidied(tracer);
        }
        Some(id)
    }

    /// Removes `id` and returns its element.
    ///
    /// Other handles are unaffected.
    pub fn unregister(&mut self, id: ViewportId, tracer: &mut Tracer<'_>) -> Option<E> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        let mut entry = self.entries.remove(index);
        entry.tracker.tidy(TidyReason::Requested, tracer);
        tracer.registry(&RegistryEvent {
            id,
            change: RegistryChange::Unregistered,
            len: self.entries.len(),
        });
        Some(entry.element)
    }

    /// Takes the values queued by elements registered without a callback,
    /// in the order they were committed.
    pub fn take_pending(&mut self) -> Vec<PendingUpdate> {
        core::mem::take(&mut self.pending)
    }

    /// The element registered after `id`, if any.
    #[must_use]
    pub fn next_after(&self, id: ViewportId) -> Option<ViewportId> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        self.entries.get(index + 1).map(|e| e.id)
    }

    /// Re-measures every element for a new window height, then fans out a
    /// scroll at `scroll_offset`.
    pub fn resize(
        &mut self,
        window_height: f64,
        scroll_offset: f64,
        tracer: &mut Tracer<'_>,
    ) -> ScrollReport {
        if window_height.is_finite() && window_height > 0.0 {
            self.window_height = window_height;
        }
        let offset = if scroll_offset.is_finite() {
            scroll_offset
        } else {
            self.scroll_offset
        };
        for entry in &mut self.entries {
            entry.tracker.resize(self.window_height);
            entry.bounds = measure(&entry.element, offset);
        }
        self.on_global_scroll(offset, tracer)
    }

    /// Updates every element for a new scroll offset.
    ///
    /// On-screen elements are recomputed; off-screen elements lose their
    /// on-screen class. Elements no longer attached to the document are
    /// skipped until [`tidy_detached`](Self::tidy_detached) removes them. A
    /// failing callback is recorded in the report and the pass moves on to
    /// the next element.
    pub fn on_global_scroll(&mut self, scroll_offset: f64, tracer: &mut Tracer<'_>) -> ScrollReport {
        let mut report = ScrollReport::default();
        if !scroll_offset.is_finite() {
            return report;
        }
        self.scroll_offset = scroll_offset;
        let screen = ScreenSpan::new(scroll_offset, self.window_height);

        for entry in &mut self.entries {
            if entry.tracker.is_tidied() || !entry.element.is_attached() {
                continue;
            }
            if entry.bounds.is_none() {
                entry.bounds = measure(&entry.element, scroll_offset);
            }
            let Some(bounds) = entry.bounds else {
                continue;
            };
            report.visited += 1;

            let on_screen = screen.overlaps(bounds);
            if entry.tracker.is_debug() {
                tracer.overlap(&OverlapEvent {
                    id: entry.id,
                    screen_top: screen.top,
                    screen_bottom: screen.bottom,
                    element_top: bounds.y0,
                    element_bottom: bounds.y1,
                    on_screen,
                });
            }
            if !on_screen {
                entry
                    .tracker
                    .set_intersecting(false, &mut entry.element, tracer);
                continue;
            }

            report.on_screen.push(entry.id);
            entry
                .tracker
                .set_intersecting(true, &mut entry.element, tracer);
            let geometry = ElementGeometry::from_document_bounds(bounds, scroll_offset);
            if let UpdateOutcome::Updated(Update {
                callback: Err(error),
                ..
            }) = entry.tracker.update(geometry, &mut entry.element, tracer)
            {
                report.failures.push(ElementFailure {
                    id: entry.id,
                    error,
                });
            }
            if let Some(percentages) = entry.tracker.take_pending() {
                self.pending.push(PendingUpdate {
                    id: entry.id,
                    percentages,
                });
            }
        }

        report.tidied = self.drain_tidied(tracer);
        tracer.scroll_fanout(&ScrollFanoutEvent {
            scroll_offset,
            window_height: self.window_height,
            visited: report.visited,
            on_screen: u32::try_from(report.on_screen.len()).unwrap_or(u32::MAX),
            failed: u32::try_from(report.failures.len()).unwrap_or(u32::MAX),
        });
        report
    }

    /// Tidies and removes every element no longer attached to the document.
    pub fn tidy_detached(&mut self, tracer: &mut Tracer<'_>) -> Vec<ViewportId> {
        for entry in &mut self.entries {
            let attached = entry.element.is_attached();
            entry.tracker.check_presence(attached, tracer);
        }
        self.drain_tidied(tracer)
    }

    /// Computes where to scroll so the element after `id` is centred on the
    /// current scroll position.
    #[must_use]
    pub fn navigate_to_next(&self, id: ViewportId, scroll_offset: f64) -> Option<ScrollTarget> {
        let next = self.next_after(id)?;
        let entry = self.entry(next)?;
        let bounds = entry
            .bounds
            .or_else(|| measure(&entry.element, scroll_offset))?;
        let offset = bounds.center().y;
        Some(ScrollTarget {
            id: next,
            offset,
            duration_ms: (scroll_offset - offset).abs() * NAVIGATION_MS_PER_PX,
        })
    }

    fn entry(&self, id: ViewportId) -> Option<&Entry<E>> {
        self.entries.iter().find(|e| e.id == id)
    }

    fn drain_tidied(&mut self, tracer: &mut Tracer<'_>) -> Vec<ViewportId> {
        let removed: Vec<ViewportId> = self
            .entries
            .extract_if(.., |e| e.tracker.is_tidied())
            .map(|e| e.id)
            .collect();
        for (i, &id) in removed.iter().enumerate() {
            tracer.registry(&RegistryEvent {
                id,
                change: RegistryChange::Unregistered,
                len: self.entries.len() + removed.len() - i - 1,
            });
        }
        removed
    }
}

/// Measures `element` in document space, rejecting non-finite boxes.
fn measure<E: TrackedElement>(element: &E, scroll_offset: f64) -> Option<Rect> {
    let rect = element.bounding_rect()?;
    rect.is_finite()
        .then(|| to_document_bounds(rect, scroll_offset))
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::String;

    use super::*;
    use crate::classes::{ClassSet, ClassTarget};

    /// A fake element placed in document space, measured as if the page were
    /// scrolled to `scroll`.
    #[derive(Debug)]
    struct FakeElement {
        name: &'static str,
        doc: Rect,
        scroll: f64,
        attached: bool,
        classes: ClassSet,
    }

    impl FakeElement {
        fn at(name: &'static str, top: f64, height: f64) -> Self {
            Self {
                name,
                doc: Rect::new(0.0, top, 100.0, top + height),
                scroll: 0.0,
                attached: true,
                classes: ClassSet::new(),
            }
        }
    }

    impl PartialEq for FakeElement {
        fn eq(&self, other: &Self) -> bool {
            self.name == other.name
        }
    }

    impl ClassTarget for FakeElement {
        fn add_class(&mut self, name: &str) {
            self.classes.add_class(name);
        }
        fn remove_class(&mut self, name: &str) {
            self.classes.remove_class(name);
        }
        fn has_class(&self, name: &str) -> bool {
            self.classes.has_class(name)
        }
    }

    impl TrackedElement for FakeElement {
        fn bounding_rect(&self) -> Option<Rect> {
            Some(self.doc - kurbo::Vec2::new(0.0, self.scroll))
        }
        fn is_attached(&self) -> bool {
            self.attached
        }
        fn label(&self) -> Option<&str> {
            Some(self.name)
        }
    }

    fn registry() -> ViewportRegistry<FakeElement> {
        ViewportRegistry::new(1000.0)
    }

    fn add(reg: &mut ViewportRegistry<FakeElement>, el: FakeElement) -> ViewportId {
        reg.register(el, &TrackerOptions::default(), None, &mut Tracer::none())
            .unwrap()
    }

    #[test]
    fn register_is_idempotent_per_element() {
        let mut reg = registry();
        let a = add(&mut reg, FakeElement::at("a", 0.0, 100.0));
        let again = add(&mut reg, FakeElement::at("a", 500.0, 100.0));
        assert_eq!(a, again);
        assert_eq!(reg.len(), 1);
        assert!(reg.element(a).unwrap().has_class("vp--initialised"));
    }

    #[test]
    fn handles_survive_removals() {
        let mut reg = registry();
        let mut tracer = Tracer::none();
        let a = add(&mut reg, FakeElement::at("a", 0.0, 100.0));
        let b = add(&mut reg, FakeElement::at("b", 200.0, 100.0));
        let c = add(&mut reg, FakeElement::at("c", 400.0, 100.0));

        assert_eq!(reg.unregister(a, &mut tracer).map(|e| e.name), Some("a"));
        assert_eq!(reg.unregister(a, &mut tracer).map(|e| e.name), None);
        let d = add(&mut reg, FakeElement::at("d", 600.0, 100.0));

        assert_eq!(reg.ids().collect::<Vec<_>>(), [b, c, d]);
        assert!(d != b && d != c, "no collision after removal");
        assert_eq!(reg.element(b).map(|e| e.name), Some("b"));
        assert_eq!(reg.next_after(c), Some(d));
        assert_eq!(reg.next_after(d), None);
    }

    #[test]
    fn fanout_updates_only_visible_elements() {
        let mut reg = registry();
        let mut tracer = Tracer::none();
        let near = add(&mut reg, FakeElement::at("near", 1900.0, 200.0));
        let far = add(&mut reg, FakeElement::at("far", 5000.0, 200.0));

        let report = reg.on_global_scroll(1000.0, &mut tracer);
        assert_eq!(report.visited, 2);
        assert_eq!(report.on_screen, [near]);
        assert!(report.failures.is_empty());

        let p = reg.tracker(near).unwrap().percentages().unwrap();
        assert!((p.top - 0.1).abs() < 1e-12, "top was {}", p.top);
        assert!((p.bottom - 1.1).abs() < 1e-12, "bottom was {}", p.bottom);
        assert!(p.middle.abs() < 1e-12, "middle was {}", p.middle);

        let near_el = reg.element(near).unwrap();
        assert!(near_el.has_class("vp--onscreen"));
        assert!(near_el.has_class("vp--on-10"));
        assert!(near_el.has_class("vp--b-100"));
        assert!(!reg.element(far).unwrap().has_class("vp--onscreen"));

        let report = reg.on_global_scroll(3000.0, &mut tracer);
        assert!(report.on_screen.is_empty());
        assert!(!reg.element(near).unwrap().has_class("vp--onscreen"));
    }

    #[test]
    fn failures_are_isolated_per_element() {
        let mut reg = registry();
        let mut tracer = Tracer::none();
        let bad = reg.register(
            FakeElement::at("bad", 1500.0, 100.0),
            &TrackerOptions::default(),
            Some(Box::new(|_: f64, _: f64, _: f64| Err(CallbackError::new("nope")))),
            &mut tracer,
        )
        .unwrap();
        let good = add(&mut reg, FakeElement::at("good", 1600.0, 100.0));

        let report = reg.on_global_scroll(1000.0, &mut tracer);
        assert_eq!(report.on_screen, [bad, good]);
        assert_eq!(
            report.failures,
            [ElementFailure {
                id: bad,
                error: CallbackError::new("nope"),
            }]
        );
        assert!(reg.element(good).unwrap().has_class("vp--on-40"));
        assert!(reg.element(bad).unwrap().has_class("vp--on-50"));
    }

    #[test]
    fn threshold_removes_element_from_registry() {
        let mut reg = registry();
        let mut tracer = Tracer::none();
        let options = TrackerOptions::new().with_stop_top_threshold(0.5).unwrap();
        let id = reg.register(
            FakeElement::at("once", 2000.0, 100.0),
            &options,
            None,
            &mut tracer,
        )
        .unwrap();

        let report = reg.on_global_scroll(1200.0, &mut tracer);
        assert!(report.tidied.is_empty());
        let report = reg.on_global_scroll(1500.0, &mut tracer);
        assert_eq!(report.tidied, [id]);
        assert!(reg.is_empty());
    }

    #[test]
    fn threshold_crossed_on_register_leaves_at_once() {
        let mut reg = registry();
        let mut tracer = Tracer::none();
        let options = TrackerOptions::new().with_stop_top_threshold(0.5).unwrap();
        // top = (1000 - 100) / 1000 = 0.9
        let a = reg
            .register(FakeElement::at("a", 100.0, 100.0), &options, None, &mut tracer)
            .unwrap();
        assert!(reg.is_empty());
        assert!(reg.tracker(a).is_none());

        let b = add(&mut reg, FakeElement::at("b", 2000.0, 100.0));
        assert_eq!(reg.ids().collect::<Vec<_>>(), [b]);
        assert_eq!(reg.next_after(a), None);
        assert!(reg.on_global_scroll(0.0, &mut tracer).tidied.is_empty());
    }

    #[test]
    fn detached_elements_are_skipped_until_tidied() {
        let mut reg = registry();
        let mut tracer = Tracer::none();
        let a = add(&mut reg, FakeElement::at("a", 1500.0, 100.0));
        let report = reg.on_global_scroll(1000.0, &mut tracer);
        assert_eq!(report.on_screen, [a]);
        let before = reg.tracker(a).unwrap().percentages();

        reg.element_mut(a).unwrap().attached = false;
        let report = reg.on_global_scroll(1200.0, &mut tracer);
        assert_eq!(report.visited, 0);
        assert!(report.on_screen.is_empty());
        assert_eq!(reg.tracker(a).unwrap().percentages(), before);
        assert_eq!(reg.len(), 1, "only the presence check removes it");

        assert_eq!(reg.tidy_detached(&mut tracer), [a]);
    }

    #[test]
    fn callbackless_elements_queue_their_values() {
        let mut reg = registry();
        let mut tracer = Tracer::none();
        let queued = add(&mut reg, FakeElement::at("queued", 500.0, 100.0));
        reg.register(
            FakeElement::at("inline", 600.0, 100.0),
            &TrackerOptions::default(),
            Some(Box::new(|_: f64, _: f64, _: f64| Ok(()))),
            &mut tracer,
        )
        .unwrap();

        let initial = reg.take_pending();
        assert_eq!(
            initial,
            [PendingUpdate {
                id: queued,
                percentages: Percentages::compute(500.0, 100.0, 1000.0).unwrap(),
            }]
        );
        assert!(reg.take_pending().is_empty());

        reg.on_global_scroll(200.0, &mut tracer);
        let after_scroll = reg.take_pending();
        assert_eq!(after_scroll.len(), 1);
        assert_eq!(after_scroll[0].id, queued);
        assert_eq!(
            after_scroll[0].percentages,
            Percentages::compute(300.0, 100.0, 1000.0).unwrap()
        );
    }

    #[cfg(feature = "trace")]
    #[test]
    fn registry_events_and_debug_overlaps() {
        use crate::trace::TraceSink;

        #[derive(Default)]
        struct Log {
            changes: Vec<(ViewportId, RegistryChange)>,
            overlaps: Vec<OverlapEvent>,
        }
        impl TraceSink for Log {
            fn on_registry(&mut self, e: &RegistryEvent) {
                self.changes.push((e.id, e.change));
            }
            fn on_overlap(&mut self, e: &OverlapEvent) {
                self.overlaps.push(*e);
            }
        }

        let mut log = Log::default();
        let mut reg = registry();
        {
            let mut tracer = Tracer::new(&mut log);
            let stop = TrackerOptions::new().with_stop_top_threshold(0.5).unwrap();
            reg.register(FakeElement::at("gone", 100.0, 100.0), &stop, None, &mut tracer);
            let debug = TrackerOptions::new().with_debug(true);
            reg.register(FakeElement::at("loud", 1500.0, 100.0), &debug, None, &mut tracer);
            reg.register(
                FakeElement::at("quiet", 1600.0, 100.0),
                &TrackerOptions::default(),
                None,
                &mut tracer,
            );
            reg.on_global_scroll(1000.0, &mut tracer);
        }

        let gone = ViewportId::from_index(0);
        assert_eq!(
            log.changes[..2],
            [
                (gone, RegistryChange::Registered),
                (gone, RegistryChange::Unregistered),
            ]
        );
        assert_eq!(
            log.overlaps,
            [OverlapEvent {
                id: ViewportId::from_index(1),
                screen_top: 1000.0,
                screen_bottom: 2000.0,
                element_top: 1500.0,
                element_bottom: 1600.0,
                on_screen: true,
            }]
        );
    }

    #[test]
    fn detached_elements_are_tidied() {
        let mut reg = registry();
        let mut tracer = Tracer::none();
        let a = add(&mut reg, FakeElement::at("a", 0.0, 100.0));
        let b = add(&mut reg, FakeElement::at("b", 200.0, 100.0));
        reg.element_mut(a).unwrap().attached = false;

        assert_eq!(reg.tidy_detached(&mut tracer), [a]);
        assert_eq!(reg.ids().collect::<Vec<_>>(), [b]);
        assert!(reg.tidy_detached(&mut tracer).is_empty());
    }

    #[test]
    fn resize_remeasures_and_refans() {
        let mut reg = registry();
        let mut tracer = Tracer::none();
        let id = add(&mut reg, FakeElement::at("a", 1500.0, 100.0));
        let el = reg.element_mut(id).unwrap();
        el.doc = Rect::new(0.0, 1800.0, 100.0, 1900.0);
        el.scroll = 1400.0;

        let report = reg.resize(500.0, 1400.0, &mut tracer);
        assert_eq!(reg.window_height(), 500.0);
        assert_eq!(report.on_screen, [id]);
        let p = reg.tracker(id).unwrap().percentages().unwrap();
        // top = 1800 - 1400 = 400 in a 500px window.
        assert!((p.top - 0.2).abs() < 1e-12, "top was {}", p.top);
    }

    #[test]
    fn navigation_targets_the_next_middle() {
        let mut reg = registry();
        let a = add(&mut reg, FakeElement::at("a", 0.0, 100.0));
        let b = add(&mut reg, FakeElement::at("b", 1000.0, 400.0));

        let target = reg.navigate_to_next(a, 400.0).unwrap();
        assert_eq!(target.id, b);
        assert_eq!(target.offset, 1200.0);
        assert_eq!(target.duration_ms, 800.0 * 1.5);

        let back = reg.navigate_to_next(a, 2000.0).unwrap();
        assert_eq!(back.duration_ms, 800.0 * 1.5, "duration is unsigned");
        assert_eq!(reg.navigate_to_next(b, 0.0), None);
    }

    #[test]
    fn labels_come_from_the_element() {
        let mut reg = registry();
        let id = add(&mut reg, FakeElement::at("hero", 0.0, 100.0));
        let label: Option<String> = reg.element(id).and_then(|e| e.label()).map(Into::into);
        assert_eq!(label.as_deref(), Some("hero"));
        assert_eq!(reg.tracker(id).and_then(Tracker::label), Some("hero"));
    }
}
