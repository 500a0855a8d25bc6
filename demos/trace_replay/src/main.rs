// Copyright 2026 the Viewports Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scripted scroll through a page of simulated sections.
//!
//! Drives a [`ViewportRegistry`] from the top of a 4000px page to the bottom
//! and back, recording events to both a
//! [`PrettyPrintSink`](viewports_debug::pretty::PrettyPrintSink) and a
//! [`RecorderSink`](viewports_debug::recorder::RecorderSink), then exports a
//! Chrome trace JSON file.
//!
//! The page holds one section of each kind: a plain one, one that stops at
//! half way, one with `data-debug`, one whose callback fails, and one that is
//! removed from the page part way down.

use std::cell::Cell;
use std::fs::File;
use std::io::{BufWriter, Stdout};
use std::rc::Rc;

use kurbo::{Rect, Vec2};
use viewports_core::ClassTarget;
use viewports_core::callback::{AnimationCallback, CallbackError};
use viewports_core::classes::ClassSet;
use viewports_core::element::TrackedElement;
use viewports_core::id::ViewportId;
use viewports_core::options::TrackerOptions;
use viewports_core::registry::ViewportRegistry;
use viewports_core::trace::{
    CallbackFailedEvent, OverlapEvent, PhaseChangeEvent, RegistryEvent, ScrollFanoutEvent,
    ThresholdReachedEvent, TidyEvent, TraceSink, Tracer, UpdateEvent,
};

use viewports_debug::pretty::PrettyPrintSink;
use viewports_debug::recorder::RecorderSink;

const WINDOW_HEIGHT: f64 = 800.0;
const SECTION_HEIGHT: f64 = 600.0;
const SECTION_GAP: f64 = 300.0;
const SCROLL_STEP: f64 = 200.0;
const PAGE_END: f64 = 4000.0;
/// Scroll offset at which the `removed` section leaves the page.
const REMOVE_AT: f64 = 1600.0;

/// A section of the simulated page.
#[derive(Debug)]
struct Section {
    name: &'static str,
    document: Rect,
    scroll: Rc<Cell<f64>>,
    attached: Rc<Cell<bool>>,
    classes: ClassSet,
}

impl PartialEq for Section {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl ClassTarget for Section {
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

impl TrackedElement for Section {
    fn bounding_rect(&self) -> Option<Rect> {
        self.attached
            .get()
            .then(|| self.document - Vec2::new(0.0, self.scroll.get()))
    }

    fn is_attached(&self) -> bool {
        self.attached.get()
    }

    fn label(&self) -> Option<&str> {
        Some(self.name)
    }
}

/// Forwards every event to both sinks.
struct Both<'a> {
    pretty: &'a mut PrettyPrintSink<Stdout>,
    recorder: &'a mut RecorderSink,
}

impl TraceSink for Both<'_> {
    fn on_registry(&mut self, e: &RegistryEvent) {
        self.pretty.on_registry(e);
        self.recorder.on_registry(e);
    }

    fn on_phase_change(&mut self, e: &PhaseChangeEvent) {
        self.pretty.on_phase_change(e);
        self.recorder.on_phase_change(e);
    }

    fn on_update(&mut self, e: &UpdateEvent) {
        self.pretty.on_update(e);
        self.recorder.on_update(e);
    }

    fn on_callback_failed(&mut self, e: &CallbackFailedEvent<'_>) {
        self.pretty.on_callback_failed(e);
        self.recorder.on_callback_failed(e);
    }

    fn on_threshold_reached(&mut self, e: &ThresholdReachedEvent) {
        self.pretty.on_threshold_reached(e);
        self.recorder.on_threshold_reached(e);
    }

    fn on_tidy(&mut self, e: &TidyEvent) {
        self.pretty.on_tidy(e);
        self.recorder.on_tidy(e);
    }

    fn on_scroll_fanout(&mut self, e: &ScrollFanoutEvent) {
        self.pretty.on_scroll_fanout(e);
        self.recorder.on_scroll_fanout(e);
    }

    fn on_overlap(&mut self, e: &OverlapEvent) {
        self.pretty.on_overlap(e);
        self.recorder.on_overlap(e);
    }
}

/// Fails once the section's top has passed the middle of the window.
fn failing_callback() -> AnimationCallback {
    Box::new(|top, _, _| {
        if top > 0.5 {
            Err(CallbackError::new("animation target missing"))
        } else {
            Ok(())
        }
    })
}

fn main() -> std::io::Result<()> {
    let mut pretty = PrettyPrintSink::with_writer(std::io::stdout());
    let mut recorder = RecorderSink::new();

    let scroll = Rc::new(Cell::new(0.0));
    let removed_attached = Rc::new(Cell::new(true));
    let mut registry = ViewportRegistry::new(WINDOW_HEIGHT);
    let mut ids: Vec<(ViewportId, &'static str)> = Vec::new();

    {
        let mut sink = Both {
            pretty: &mut pretty,
            recorder: &mut recorder,
        };
        let mut tracer = Tracer::new(&mut sink);

        let plain = TrackerOptions::new();
        let stopping = TrackerOptions::new()
            .with_stop_top_threshold(0.5)
            .map_err(std::io::Error::other)?;
        let debug = TrackerOptions::new().with_debug(true);
        let sections: [(&'static str, &TrackerOptions, Option<AnimationCallback>); 5] = [
            ("plain", &plain, None),
            ("stopping", &stopping, None),
            ("debug", &debug, None),
            ("failing", &plain, Some(failing_callback())),
            ("removed", &plain, None),
        ];
        for (index, (name, options, callback)) in (0_u32..).zip(sections) {
            let top = 400.0 + f64::from(index) * (SECTION_HEIGHT + SECTION_GAP);
            let section = Section {
                name,
                document: Rect::new(0.0, top, 1000.0, top + SECTION_HEIGHT),
                scroll: Rc::clone(&scroll),
                attached: if name == "removed" {
                    Rc::clone(&removed_attached)
                } else {
                    Rc::new(Cell::new(true))
                },
                classes: ClassSet::new(),
            };
            if let Some(id) = registry.register(section, options, callback, &mut tracer) {
                ids.push((id, name));
            }
        }

        let down = (0_u32..)
            .map(|step| f64::from(step) * SCROLL_STEP)
            .take_while(|&offset| offset <= PAGE_END);
        let up = (0_u32..)
            .map(|step| PAGE_END - f64::from(step) * SCROLL_STEP)
            .take_while(|&offset| offset >= 0.0);
        for offset in down.chain(up) {
            if offset >= REMOVE_AT && removed_attached.get() {
                removed_attached.set(false);
                registry.tidy_detached(&mut tracer);
            }
            scroll.set(offset);
            let report = registry.on_global_scroll(offset, &mut tracer);
            for failure in &report.failures {
                eprintln!("{}: {}", failure.id, failure.error);
            }
        }
    }

    for (id, name) in &ids {
        match registry.element(*id) {
            Some(section) => println!("{name}: {}", section.classes.to_attribute()),
            None => println!("{name}: no longer tracked"),
        }
    }

    let path = "trace.json";
    let mut writer = BufWriter::new(File::create(path)?);
    viewports_debug::chrome::export(recorder.as_bytes(), &mut writer)?;
    let events = viewports_debug::recorder::decode(recorder.as_bytes()).count();
    println!("Wrote {path} ({events} events)");
    Ok(())
}
