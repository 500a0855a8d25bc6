// Copyright 2026 the Viewports Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-element lifecycle state machine.
//!
//! ```text
//!   Constructed ──observe──► Observing ──enter──► Playing ◄──enter── Idle
//!                                                   │                 ▲
//!                                                   └─────leave───────┘
//!
//!   any state ──tidy (detached / threshold / requested)──► Tidied
//! ```
//!
//! A [`Tracker`] owns no host resources. The host tells it which event
//! sources it subscribed ([`Tracker::subscribe`]), feeds it samples, and reads
//! back [`FrameRequest`]s that say whether the per-frame loop should keep
//! running. When the tracker is tidied, [`Tracker::tidy`] hands back the
//! subscriptions the host must release; after that, every entry point is a
//! no-op.
//!
//! A tracker built with an [`AnimationCallback`] calls it during each update.
//! A host whose callback may call back into that host builds the tracker
//! without one and runs its own callback after each entry point returns,
//! using [`Tracker::take_pending`] and [`Tracker::report_callback_failure`].

use alloc::string::String;
use core::fmt;

use crate::callback::{AnimationCallback, CallbackError};
use crate::classes::{ClassNames, ClassTarget};
use crate::geometry::{ElementGeometry, Percentages};
use crate::id::ViewportId;
use crate::options::TrackerOptions;
use crate::trace::{
    CallbackFailedEvent, PhaseChangeEvent, ThresholdReachedEvent, TidyEvent, Tracer, UpdateEvent,
};

/// Lifecycle state of a [`Tracker`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Created; no intersection source yet.
    Constructed,
    /// An intersection source is attached; not yet on screen.
    Observing,
    /// On screen; sampled every frame.
    Playing,
    /// Left the screen; waiting for the next intersection.
    Idle,
    /// Permanently detached. Terminal.
    Tidied,
}

/// Why a tracker was tidied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TidyReason {
    /// The element is no longer attached to the document.
    Detached,
    /// The top percentage crossed the stop threshold.
    ThresholdReached,
    /// The owner asked for it.
    Requested,
}

/// Where intersection signals come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntersectionSource {
    /// A per-element intersection observer.
    Observer,
    /// A shared scroll/resize listener pair (registry fan-out).
    ScrollFallback,
}

/// One kind of host subscription held on behalf of a tracker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Subscription {
    /// The per-frame sampling loop.
    FrameLoop,
    /// The periodic document-presence check.
    PresenceCheck,
    /// The intersection source.
    Intersection,
    /// Membership in a registry.
    Registry,
}

impl Subscription {
    /// All kinds.
    pub const ALL: [Self; 4] = [
        Self::FrameLoop,
        Self::PresenceCheck,
        Self::Intersection,
        Self::Registry,
    ];

    const fn bit(self) -> u8 {
        match self {
            Self::FrameLoop => 1,
            Self::PresenceCheck => 1 << 1,
            Self::Intersection => 1 << 2,
            Self::Registry => 1 << 3,
        }
    }
}

/// A set of [`Subscription`]s.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Subscriptions(u8);

impl Subscriptions {
    /// The empty set.
    pub const NONE: Self = Self(0);

    /// Returns `true` if `kind` is in the set.
    #[must_use]
    pub const fn contains(self, kind: Subscription) -> bool {
        self.0 & kind.bit() != 0
    }

    /// Adds `kind`.
    pub fn insert(&mut self, kind: Subscription) {
        self.0 |= kind.bit();
    }

    /// Removes `kind`.
    pub fn remove(&mut self, kind: Subscription) {
        self.0 &= !kind.bit();
    }

    /// Number of active subscriptions.
    #[must_use]
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// Returns `true` if nothing is subscribed.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Raw bit representation, for compact recording.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Rebuilds a set from [`bits`](Self::bits); unknown bits are dropped.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0b1111)
    }

    /// Iterates the kinds in the set.
    pub fn iter(self) -> impl Iterator<Item = Subscription> {
        Subscription::ALL
            .into_iter()
            .filter(move |kind| self.contains(*kind))
    }
}

impl fmt::Debug for Subscriptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// What the host should do with its per-frame loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameRequest {
    /// Begin sampling every frame.
    Start,
    /// Keep sampling; re-arm for the next frame.
    Continue,
    /// Stop sampling; do not re-arm.
    Stop,
}

/// Result of a recompute that went through.
#[derive(Clone, Debug, PartialEq)]
pub struct Update {
    /// The new values.
    pub percentages: Percentages,
    /// What the user callback returned (`Ok` when none is set).
    pub callback: Result<(), CallbackError>,
    /// Whether this update crossed the stop threshold and tidied the tracker.
    pub threshold_reached: bool,
}

/// Result of feeding a sample to a [`Tracker`].
#[derive(Clone, Debug, PartialEq)]
pub enum UpdateOutcome {
    /// The tracker is tidied; nothing happened.
    Skipped,
    /// The sample was not a usable number; previous values kept.
    Ignored,
    /// The sample matched the previous one; nothing was written.
    Unchanged,
    /// Percentages were recomputed and classes applied.
    Updated(Update),
}

impl UpdateOutcome {
    /// The callback error, if this outcome carries one.
    #[must_use]
    pub fn callback_error(&self) -> Option<&CallbackError> {
        match self {
            Self::Updated(Update {
                callback: Err(err), ..
            }) => Some(err),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Sample {
    geometry: ElementGeometry,
    window_height: f64,
}

/// Visibility tracker for one element.
pub struct Tracker {
    id: ViewportId,
    label: Option<String>,
    names: ClassNames,
    stop_top_threshold: Option<f64>,
    reverse: bool,
    debug: bool,
    phase: Phase,
    source: Option<IntersectionSource>,
    initialised: bool,
    window_height: f64,
    last_sample: Option<Sample>,
    percentages: Option<Percentages>,
    is_on_screen: bool,
    subscriptions: Subscriptions,
    callback: Option<AnimationCallback>,
    /// Last committed values not yet handed to an outside callback.
    pending: Option<Percentages>,
}

impl fmt::Debug for Tracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracker")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("prefix", &self.names.prefix())
            .field("phase", &self.phase)
            .field("percentages", &self.percentages)
            .field("is_on_screen", &self.is_on_screen)
            .field("subscriptions", &self.subscriptions)
            .field("has_callback", &self.callback.is_some())
            .finish_non_exhaustive()
    }
}

impl Tracker {
    /// Creates a tracker in [`Phase::Constructed`].
    #[must_use]
    pub fn new(
        id: ViewportId,
        options: &TrackerOptions,
        callback: Option<AnimationCallback>,
    ) -> Self {
        Self {
            id,
            label: None,
            names: ClassNames::new(options.class_prefix()),
            stop_top_threshold: options.stop_top_threshold(),
            reverse: options.reverse(),
            debug: options.debug(),
            phase: Phase::Constructed,
            source: None,
            initialised: false,
            window_height: 0.0,
            last_sample: None,
            percentages: None,
            is_on_screen: false,
            subscriptions: Subscriptions::NONE,
            callback,
            pending: None,
        }
    }

    // -- Accessors --

    /// The element's handle.
    #[must_use]
    pub fn id(&self) -> ViewportId {
        self.id
    }

    /// Diagnostic label reported with callback failures.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Sets the diagnostic label.
    pub fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }

    /// Whether per-element diagnostics were requested.
    #[must_use]
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns `true` once tidied.
    #[must_use]
    pub fn is_tidied(&self) -> bool {
        self.phase == Phase::Tidied
    }

    /// The attached intersection source, if any.
    #[must_use]
    pub fn source(&self) -> Option<IntersectionSource> {
        self.source
    }

    /// The last computed values.
    #[must_use]
    pub fn percentages(&self) -> Option<Percentages> {
        self.percentages
    }

    /// The last accepted geometry sample.
    #[must_use]
    pub fn geometry(&self) -> Option<ElementGeometry> {
        self.last_sample.map(|s| s.geometry)
    }

    /// The cached window height.
    #[must_use]
    pub fn window_height(&self) -> f64 {
        self.window_height
    }

    /// Whether any part of the element intersects the viewport.
    #[must_use]
    pub fn is_on_screen(&self) -> bool {
        self.is_on_screen
    }

    /// Subscriptions the host currently holds for this tracker.
    #[must_use]
    pub fn subscriptions(&self) -> Subscriptions {
        self.subscriptions
    }

    /// The class names this tracker writes.
    #[must_use]
    pub fn class_names(&self) -> &ClassNames {
        &self.names
    }

    // -- Subscriptions --

    /// Records that the host subscribed `kind` for this tracker.
    ///
    /// Ignored once tidied; the host should release what it just acquired.
    pub fn subscribe(&mut self, kind: Subscription) -> bool {
        if self.is_tidied() {
            return false;
        }
        self.subscriptions.insert(kind);
        true
    }

    /// Records that the host released `kind`.
    pub fn unsubscribe(&mut self, kind: Subscription) {
        self.subscriptions.remove(kind);
    }

    // -- Lifecycle --

    /// Attaches an intersection source and enters [`Phase::Observing`].
    pub fn observe(&mut self, source: IntersectionSource, tracer: &mut Tracer<'_>) {
        if self.is_tidied() {
            return;
        }
        self.source = Some(source);
        self.subscriptions.insert(Subscription::Intersection);
        if self.phase == Phase::Constructed {
            self.transition(Phase::Observing, tracer);
        }
    }

    /// Updates the cached window height. Non-finite or non-positive values
    /// are ignored.
    pub fn resize(&mut self, window_height: f64) -> bool {
        if !window_height.is_finite() || window_height <= 0.0 {
            return false;
        }
        self.window_height = window_height;
        true
    }

    /// Takes the first measurement and marks the element initialised.
    ///
    /// Only the first call has any effect.
    pub fn initialise(
        &mut self,
        geometry: ElementGeometry,
        window_height: f64,
        target: &mut (impl ClassTarget + ?Sized),
        tracer: &mut Tracer<'_>,
    ) -> UpdateOutcome {
        if self.is_tidied() || self.initialised {
            return UpdateOutcome::Skipped;
        }
        self.initialised = true;
        self.resize(window_height);
        let outcome = self.update(geometry, target, tracer);
        target.add_class(self.names.initialised());
        outcome
    }

    /// Takes the first measurement for a host without intersection
    /// notifications: the element is treated as fully visible once and
    /// marked initialised, and the tracker stays in [`Phase::Constructed`].
    ///
    /// Only the first call to this or [`initialise`](Self::initialise) has
    /// any effect.
    pub fn initialise_without_observer(
        &mut self,
        window_height: f64,
        target: &mut (impl ClassTarget + ?Sized),
        tracer: &mut Tracer<'_>,
    ) -> UpdateOutcome {
        if self.is_tidied() || self.initialised {
            return UpdateOutcome::Skipped;
        }
        self.initialised = true;
        self.resize(window_height);
        let outcome = self.assume_fully_visible(target, tracer);
        target.add_class(self.names.initialised());
        outcome
    }

    /// Handles an intersection change.
    ///
    /// Entering starts the frame loop; leaving stops it.
    pub fn set_intersecting(
        &mut self,
        intersecting: bool,
        target: &mut (impl ClassTarget + ?Sized),
        tracer: &mut Tracer<'_>,
    ) -> FrameRequest {
        if self.is_tidied() {
            return FrameRequest::Stop;
        }
        self.is_on_screen = intersecting;
        if intersecting {
            target.add_class(self.names.onscreen());
            if self.phase == Phase::Playing {
                return FrameRequest::Continue;
            }
            self.subscriptions.insert(Subscription::FrameLoop);
            self.transition(Phase::Playing, tracer);
            FrameRequest::Start
        } else {
            target.remove_class(self.names.onscreen());
            if self.phase == Phase::Playing {
                self.subscriptions.remove(Subscription::FrameLoop);
                self.transition(Phase::Idle, tracer);
            }
            FrameRequest::Stop
        }
    }

    /// Samples one animation frame.
    ///
    /// `geometry` is `None` when the host could not measure the element this
    /// frame; the sample is skipped but the loop keeps running.
    pub fn on_frame(
        &mut self,
        geometry: Option<ElementGeometry>,
        target: &mut (impl ClassTarget + ?Sized),
        tracer: &mut Tracer<'_>,
    ) -> FrameRequest {
        if self.phase != Phase::Playing {
            return FrameRequest::Stop;
        }
        if let Some(geometry) = geometry {
            self.update(geometry, target, tracer);
        }
        if self.phase == Phase::Playing {
            FrameRequest::Continue
        } else {
            FrameRequest::Stop
        }
    }

    /// Recomputes percentages from `geometry` if it differs from the last
    /// sample, then applies classes and runs the callback.
    pub fn update(
        &mut self,
        geometry: ElementGeometry,
        target: &mut (impl ClassTarget + ?Sized),
        tracer: &mut Tracer<'_>,
    ) -> UpdateOutcome {
        if self.is_tidied() {
            return UpdateOutcome::Skipped;
        }
        if !geometry.is_finite() {
            return UpdateOutcome::Ignored;
        }
        let sample = Sample {
            geometry,
            window_height: self.window_height,
        };
        if self.last_sample == Some(sample) {
            return UpdateOutcome::Unchanged;
        }
        let Some(percentages) = Percentages::from_geometry(geometry, self.window_height) else {
            return UpdateOutcome::Ignored;
        };
        self.last_sample = Some(sample);
        UpdateOutcome::Updated(self.commit(percentages, target, tracer))
    }

    /// Treats the element as fully visible, for hosts without intersection
    /// notifications.
    pub fn assume_fully_visible(
        &mut self,
        target: &mut (impl ClassTarget + ?Sized),
        tracer: &mut Tracer<'_>,
    ) -> UpdateOutcome {
        if self.is_tidied() {
            return UpdateOutcome::Skipped;
        }
        self.is_on_screen = true;
        target.add_class(self.names.onscreen());
        UpdateOutcome::Updated(self.commit(Percentages::FULLY_VISIBLE, target, tracer))
    }

    /// Handles a presence poll. Tidies the tracker when `attached` is false.
    ///
    /// Returns the subscriptions released by this call.
    pub fn check_presence(&mut self, attached: bool, tracer: &mut Tracer<'_>) -> Subscriptions {
        if attached {
            return Subscriptions::NONE;
        }
        self.tidy(TidyReason::Detached, tracer)
    }

    /// Permanently stops tracking.
    ///
    /// Returns the subscriptions that were active; the host must release
    /// them. Calling this again returns an empty set.
    pub fn tidy(&mut self, reason: TidyReason, tracer: &mut Tracer<'_>) -> Subscriptions {
        if self.is_tidied() {
            return Subscriptions::NONE;
        }
        let released = core::mem::take(&mut self.subscriptions);
        self.is_on_screen = false;
        self.transition(Phase::Tidied, tracer);
        tracer.tidy(&TidyEvent {
            id: self.id,
            reason,
            released,
        });
        released
    }

    /// Takes the values committed since the last call, for a host that runs
    /// the callback itself. Always `None` when the tracker owns a callback.
    pub fn take_pending(&mut self) -> Option<Percentages> {
        self.pending.take()
    }

    /// Reports a failure of a callback the host ran itself.
    ///
    /// Reported even after tidying, since the failing call may have been for
    /// the final update.
    pub fn report_callback_failure(&self, error: &CallbackError, tracer: &mut Tracer<'_>) {
        tracer.callback_failed(&CallbackFailedEvent {
            id: self.id,
            label: self.label.as_deref(),
            error,
        });
    }

    // -- Internals --

    fn commit(
        &mut self,
        percentages: Percentages,
        target: &mut (impl ClassTarget + ?Sized),
        tracer: &mut Tracer<'_>,
    ) -> Update {
        self.percentages = Some(percentages);
        self.names.apply(target, percentages, self.reverse);
        tracer.update(&UpdateEvent {
            id: self.id,
            percentages,
            on_screen: self.is_on_screen,
        });

        let callback = match self.callback.as_mut() {
            Some(cb) => cb(percentages.top, percentages.middle, percentages.bottom),
            None => {
                self.pending = Some(percentages);
                Ok(())
            }
        };
        if let Err(error) = &callback {
            self.report_callback_failure(error, tracer);
        }

        let threshold_reached = match self.stop_top_threshold {
            Some(threshold) if percentages.top >= threshold => {
                target.add_class(self.names.threshold_reached());
                tracer.threshold_reached(&ThresholdReachedEvent {
                    id: self.id,
                    threshold,
                    top: percentages.top,
                });
                self.tidy(TidyReason::ThresholdReached, tracer);
                true
            }
            _ => false,
        };

        Update {
            percentages,
            callback,
            threshold_reached,
        }
    }

    fn transition(&mut self, to: Phase, tracer: &mut Tracer<'_>) {
        let from = self.phase;
        if from == to {
            return;
        }
        self.phase = to;
        tracer.phase_change(&PhaseChangeEvent {
            id: self.id,
            from,
            to,
        });
    }
}
