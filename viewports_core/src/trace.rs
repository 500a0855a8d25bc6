// Copyright 2026 the Viewports Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for tracked elements.
//!
//! This module provides a [`TraceSink`] trait with one method per lifecycle
//! event. All method bodies default to no-ops, so implementing only the
//! events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! Callback failures are reported through [`TraceSink::on_callback_failed`];
//! sinks that log should treat it as a warning.

use crate::callback::CallbackError;
use crate::geometry::Percentages;
use crate::id::ViewportId;
use crate::tracker::{Phase, Subscriptions, TidyReason};

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Whether an element joined or left a registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegistryChange {
    /// The element was appended.
    Registered,
    /// The element was removed.
    Unregistered,
}

/// Emitted when a registry gains or loses an element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegistryEvent {
    /// The element concerned.
    pub id: ViewportId,
    /// What happened.
    pub change: RegistryChange,
    /// Registry size after the change.
    pub len: usize,
}

/// Emitted on every lifecycle transition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseChangeEvent {
    /// The element concerned.
    pub id: ViewportId,
    /// State before the transition.
    pub from: Phase,
    /// State after the transition.
    pub to: Phase,
}

/// Emitted after percentages are recomputed and classes applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UpdateEvent {
    /// The element concerned.
    pub id: ViewportId,
    /// The freshly computed values.
    pub percentages: Percentages,
    /// Whether the element intersects the viewport.
    pub on_screen: bool,
}

/// Emitted when a user callback returns an error.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CallbackFailedEvent<'a> {
    /// The element whose callback failed.
    pub id: ViewportId,
    /// The element's diagnostic label (its `id` attribute on the web).
    pub label: Option<&'a str>,
    /// The reported error.
    pub error: &'a CallbackError,
}

/// Emitted once when the stop threshold is crossed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThresholdReachedEvent {
    /// The element concerned.
    pub id: ViewportId,
    /// The configured threshold.
    pub threshold: f64,
    /// The top percentage that crossed it.
    pub top: f64,
}

/// Emitted when an element is tidied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TidyEvent {
    /// The element concerned.
    pub id: ViewportId,
    /// Why tracking stopped.
    pub reason: TidyReason,
    /// Subscriptions that were still active and have been released.
    pub released: Subscriptions,
}

/// Emitted after a registry fans a scroll out to its elements.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollFanoutEvent {
    /// Scroll offset of the sample.
    pub scroll_offset: f64,
    /// Window height of the sample.
    pub window_height: f64,
    /// Elements examined.
    pub visited: u32,
    /// Elements found on screen.
    pub on_screen: u32,
    /// Elements whose callback failed.
    pub failed: u32,
}

/// Emitted by a registry for each on-screen test of an element that has
/// diagnostics enabled. Coordinates are in document space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlapEvent {
    /// The element tested.
    pub id: ViewportId,
    /// Top of the visible window.
    pub screen_top: f64,
    /// Bottom of the visible window.
    pub screen_bottom: f64,
    /// Top of the element.
    pub element_top: f64,
    /// Bottom of the element.
    pub element_bottom: f64,
    /// Outcome of the test.
    pub on_screen: bool,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from trackers and registries.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a registry gains or loses an element.
    fn on_registry(&mut self, e: &RegistryEvent) {
        _ = e;
    }

    /// Called on every lifecycle transition.
    fn on_phase_change(&mut self, e: &PhaseChangeEvent) {
        _ = e;
    }

    /// Called after each recompute.
    fn on_update(&mut self, e: &UpdateEvent) {
        _ = e;
    }

    /// Called when a user callback fails.
    fn on_callback_failed(&mut self, e: &CallbackFailedEvent<'_>) {
        _ = e;
    }

    /// Called when the stop threshold is crossed.
    fn on_threshold_reached(&mut self, e: &ThresholdReachedEvent) {
        _ = e;
    }

    /// Called when an element is tidied.
    fn on_tidy(&mut self, e: &TidyEvent) {
        _ = e;
    }

    /// Called after a registry scroll fan-out.
    fn on_scroll_fanout(&mut self, e: &ScrollFanoutEvent) {
        _ = e;
    }

    /// Called for each on-screen test of a debug-enabled element.
    fn on_overlap(&mut self, e: &OverlapEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

/// Expands to a `Tracer` method that forwards one event to the sink.
macro_rules! dispatch {
    ($(#[$doc:meta])* $name:ident => $sink_method:ident($ty:ty)) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&mut self, e: &$ty) {
            #[cfg(feature = "trace")]
            if let Some(s) = &mut self.sink {
                s.$sink_method(e);
            }
            #[cfg(not(feature = "trace"))]
            {
                _ = e;
            }
        }
    };
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    dispatch!(
        /// Emits a [`RegistryEvent`].
        registry => on_registry(RegistryEvent)
    );
    dispatch!(
        /// Emits a [`PhaseChangeEvent`].
        phase_change => on_phase_change(PhaseChangeEvent)
    );
    dispatch!(
        /// Emits an [`UpdateEvent`].
        update => on_update(UpdateEvent)
    );
    dispatch!(
        /// Emits a [`CallbackFailedEvent`].
        callback_failed => on_callback_failed(CallbackFailedEvent<'_>)
    );
    dispatch!(
        /// Emits a [`ThresholdReachedEvent`].
        threshold_reached => on_threshold_reached(ThresholdReachedEvent)
    );
    dispatch!(
        /// Emits a [`TidyEvent`].
        tidy => on_tidy(TidyEvent)
    );
    dispatch!(
        /// Emits a [`ScrollFanoutEvent`].
        scroll_fanout => on_scroll_fanout(ScrollFanoutEvent)
    );
    dispatch!(
        /// Emits an [`OverlapEvent`].
        overlap => on_overlap(OverlapEvent)
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
