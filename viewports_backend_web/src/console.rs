// Copyright 2026 the Viewports Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser console trace output.

use alloc::format;
use alloc::string::String;

use viewports_core::trace::{
    CallbackFailedEvent, OverlapEvent, PhaseChangeEvent, RegistryChange, RegistryEvent,
    ScrollFanoutEvent, ThresholdReachedEvent, TidyEvent, TraceSink, UpdateEvent,
};
use wasm_bindgen::JsValue;
use web_sys::console;

/// A [`TraceSink`] that writes to the browser console.
///
/// Callback failures always go to `console.warn`, naming the element, as do
/// overlap tests, which are only emitted for elements marked
/// `data-debug="true"`. With [`verbose`](Self::verbose), every other event is
/// logged with `console.debug`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleSink {
    verbose: bool,
}

impl ConsoleSink {
    /// A sink that only reports callback failures.
    #[must_use]
    pub const fn new() -> Self {
        Self { verbose: false }
    }

    /// A sink that logs every event.
    #[must_use]
    pub const fn verbose() -> Self {
        Self { verbose: true }
    }

    fn debug(&self, line: impl FnOnce() -> String) {
        if self.verbose {
            console::debug_1(&JsValue::from_str(&line()));
        }
    }
}

/// The warning line for a failed callback.
fn failure_line(e: &CallbackFailedEvent<'_>) -> String {
    match e.label {
        Some(label) => format!("#{label} ({}): {}", e.id, e.error.message()),
        None => format!("{}: {}", e.id, e.error.message()),
    }
}

fn overlap_line(e: &OverlapEvent) -> String {
    format!(
        "[viewports] {} screen {}..{} element {}..{} on_screen={}",
        e.id, e.screen_top, e.screen_bottom, e.element_top, e.element_bottom, e.on_screen
    )
}

impl TraceSink for ConsoleSink {
    fn on_registry(&mut self, e: &RegistryEvent) {
        self.debug(|| {
            let verb = match e.change {
                RegistryChange::Registered => "registered",
                RegistryChange::Unregistered => "unregistered",
            };
            format!("[viewports] {} {verb}, {} tracked", e.id, e.len)
        });
    }

    fn on_phase_change(&mut self, e: &PhaseChangeEvent) {
        self.debug(|| format!("[viewports] {} {:?} -> {:?}", e.id, e.from, e.to));
    }

    fn on_update(&mut self, e: &UpdateEvent) {
        self.debug(|| {
            let (top, middle, bottom) = e.percentages.as_tuple();
            format!(
                "[viewports] {} top={top:.3} middle={middle:.3} bottom={bottom:.3} on_screen={}",
                e.id, e.on_screen,
            )
        });
    }

    fn on_callback_failed(&mut self, e: &CallbackFailedEvent<'_>) {
        console::warn_1(&JsValue::from_str(&failure_line(e)));
    }

    fn on_threshold_reached(&mut self, e: &ThresholdReachedEvent) {
        self.debug(|| {
            format!(
                "[viewports] {} reached threshold {} at top={:.3}",
                e.id, e.threshold, e.top
            )
        });
    }

    fn on_tidy(&mut self, e: &TidyEvent) {
        self.debug(|| {
            format!(
                "[viewports] {} tidied ({:?}), released {:?}",
                e.id, e.reason, e.released
            )
        });
    }

    fn on_overlap(&mut self, e: &OverlapEvent) {
        console::warn_1(&JsValue::from_str(&overlap_line(e)));
    }

    fn on_scroll_fanout(&mut self, e: &ScrollFanoutEvent) {
        self.debug(|| {
            format!(
                "[viewports] scroll={} height={} visited={} on_screen={} failed={}",
                e.scroll_offset, e.window_height, e.visited, e.on_screen, e.failed
            )
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewports_core::callback::CallbackError;
    use viewports_core::id::ViewportId;

    #[test]
    fn failure_line_names_the_element() {
        let error = CallbackError::new("boom");
        let line = failure_line(&CallbackFailedEvent {
            id: ViewportId::from_index(3),
            label: Some("hero"),
            error: &error,
        });
        assert_eq!(line, "#hero (vp#3): boom");
    }

    #[test]
    fn failure_line_without_label_uses_the_handle() {
        let error = CallbackError::new("boom");
        let line = failure_line(&CallbackFailedEvent {
            id: ViewportId::from_index(0),
            label: None,
            error: &error,
        });
        assert_eq!(line, "vp#0: boom");
    }

    #[test]
    fn overlap_line_shows_both_ranges() {
        let line = overlap_line(&OverlapEvent {
            id: ViewportId::from_index(1),
            screen_top: 1000.0,
            screen_bottom: 2000.0,
            element_top: 2100.0,
            element_bottom: 2200.0,
            on_screen: false,
        });
        assert_eq!(
            line,
            "[viewports] vp#1 screen 1000..2000 element 2100..2200 on_screen=false"
        );
    }
}
