// Copyright 2026 the Viewports Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use viewports_core::trace::{
    CallbackFailedEvent, OverlapEvent, PhaseChangeEvent, RegistryChange, RegistryEvent,
    ScrollFanoutEvent, ThresholdReachedEvent, TidyEvent, TraceSink, UpdateEvent,
};
use viewports_core::tracker::{Phase, TidyReason};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its writer.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }
}

fn phase_name(phase: Phase) -> &'static str {
    match phase {
        Phase::Constructed => "constructed",
        Phase::Observing => "observing",
        Phase::Playing => "playing",
        Phase::Idle => "idle",
        Phase::Tidied => "tidied",
    }
}

fn reason_name(reason: TidyReason) -> &'static str {
    match reason {
        TidyReason::Detached => "detached",
        TidyReason::ThresholdReached => "threshold",
        TidyReason::Requested => "requested",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_registry(&mut self, e: &RegistryEvent) {
        let verb = match e.change {
            RegistryChange::Registered => "add",
            RegistryChange::Unregistered => "remove",
        };
        let _ = writeln!(self.writer, "[registry:{verb}] {} len={}", e.id, e.len);
    }

    fn on_phase_change(&mut self, e: &PhaseChangeEvent) {
        let _ = writeln!(
            self.writer,
            "[phase] {} {} -> {}",
            e.id,
            phase_name(e.from),
            phase_name(e.to),
        );
    }

    fn on_update(&mut self, e: &UpdateEvent) {
        let p = e.percentages;
        let _ = writeln!(
            self.writer,
            "[update] {} top={:.3} middle={:.3} bottom={:.3}{}",
            e.id,
            p.top,
            p.middle,
            p.bottom,
            if e.on_screen { " onscreen" } else { "" },
        );
    }

    fn on_callback_failed(&mut self, e: &CallbackFailedEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[callback:FAILED] {} label={} {}",
            e.id,
            e.label.unwrap_or("-"),
            e.error,
        );
    }

    fn on_threshold_reached(&mut self, e: &ThresholdReachedEvent) {
        let _ = writeln!(
            self.writer,
            "[threshold] {} top={:.3} >= {}",
            e.id, e.top, e.threshold,
        );
    }

    fn on_tidy(&mut self, e: &TidyEvent) {
        let _ = writeln!(
            self.writer,
            "[tidy] {} reason={} released={:?}",
            e.id,
            reason_name(e.reason),
            e.released,
        );
    }

    fn on_scroll_fanout(&mut self, e: &ScrollFanoutEvent) {
        let _ = writeln!(
            self.writer,
            "[scroll] offset={} height={} visited={} onscreen={} failed={}",
            e.scroll_offset, e.window_height, e.visited, e.on_screen, e.failed,
        );
    }

    fn on_overlap(&mut self, e: &OverlapEvent) {
        let _ = writeln!(
            self.writer,
            "[overlap] {} screen={}..{} element={}..{}{}",
            e.id,
            e.screen_top,
            e.screen_bottom,
            e.element_top,
            e.element_bottom,
            if e.on_screen { " onscreen" } else { "" },
        );
    }
}
