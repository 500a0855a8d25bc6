// Copyright 2026 the Viewports Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as little-endian records, each prefixed with a tag and the
//! microseconds elapsed since the recorder was created. [`decode`] reads
//! them back as an iterator of [`Record`].
//!
//! Callback errors are stored as their message text.

use std::time::Instant;

use viewports_core::geometry::Percentages;
use viewports_core::id::ViewportId;
use viewports_core::trace::{
    CallbackFailedEvent, OverlapEvent, PhaseChangeEvent, RegistryChange, RegistryEvent,
    ScrollFanoutEvent, ThresholdReachedEvent, TidyEvent, TraceSink, UpdateEvent,
};
use viewports_core::tracker::{Phase, Subscriptions, TidyReason};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_REGISTRY: u8 = 1;
const TAG_PHASE_CHANGE: u8 = 2;
const TAG_UPDATE: u8 = 3;
const TAG_CALLBACK_FAILED: u8 = 4;
const TAG_THRESHOLD_REACHED: u8 = 5;
const TAG_TIDY: u8 = 6;
const TAG_SCROLL_FANOUT: u8 = 7;
const TAG_OVERLAP: u8 = 8;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug)]
pub struct RecorderSink {
    buf: Vec<u8>,
    origin: Instant,
}

impl Default for RecorderSink {
    fn default() -> Self {
        Self {
            buf: Vec::new(),
            origin: Instant::now(),
        }
    }
}

impl RecorderSink {
    /// Creates an empty recorder; timestamps count from now.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn begin(&mut self, tag: u8) {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "a recording spanning more than u64::MAX µs is not a concern"
        )]
        let at_us = self.origin.elapsed().as_micros() as u64;
        self.write_u8(tag);
        self.write_u64(at_us);
    }

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_id(&mut self, id: ViewportId) {
        self.write_u32(id.index());
    }

    fn write_str(&mut self, s: &str) {
        let len = u32::try_from(s.len()).unwrap_or(u32::MAX);
        self.write_u32(len);
        self.buf.extend_from_slice(&s.as_bytes()[..len as usize]);
    }

    fn write_option_str(&mut self, s: Option<&str>) {
        match s {
            Some(s) => {
                self.write_u8(1);
                self.write_str(s);
            }
            None => self.write_u8(0),
        }
    }

    fn write_phase(&mut self, p: Phase) {
        self.write_u8(match p {
            Phase::Constructed => 0,
            Phase::Observing => 1,
            Phase::Playing => 2,
            Phase::Idle => 3,
            Phase::Tidied => 4,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_registry(&mut self, e: &RegistryEvent) {
        self.begin(TAG_REGISTRY);
        self.write_id(e.id);
        self.write_u8(match e.change {
            RegistryChange::Registered => 0,
            RegistryChange::Unregistered => 1,
        });
        self.write_u32(u32::try_from(e.len).unwrap_or(u32::MAX));
    }

    fn on_phase_change(&mut self, e: &PhaseChangeEvent) {
        self.begin(TAG_PHASE_CHANGE);
        self.write_id(e.id);
        self.write_phase(e.from);
        self.write_phase(e.to);
    }

    fn on_update(&mut self, e: &UpdateEvent) {
        self.begin(TAG_UPDATE);
        self.write_id(e.id);
        self.write_f64(e.percentages.top);
        self.write_f64(e.percentages.middle);
        self.write_f64(e.percentages.bottom);
        self.write_u8(u8::from(e.on_screen));
    }

    fn on_callback_failed(&mut self, e: &CallbackFailedEvent<'_>) {
        self.begin(TAG_CALLBACK_FAILED);
        self.write_id(e.id);
        self.write_option_str(e.label);
        self.write_str(e.error.message());
    }

    fn on_threshold_reached(&mut self, e: &ThresholdReachedEvent) {
        self.begin(TAG_THRESHOLD_REACHED);
        self.write_id(e.id);
        self.write_f64(e.threshold);
        self.write_f64(e.top);
    }

    fn on_tidy(&mut self, e: &TidyEvent) {
        self.begin(TAG_TIDY);
        self.write_id(e.id);
        self.write_u8(match e.reason {
            TidyReason::Detached => 0,
            TidyReason::ThresholdReached => 1,
            TidyReason::Requested => 2,
        });
        self.write_u8(e.released.bits());
    }

    fn on_scroll_fanout(&mut self, e: &ScrollFanoutEvent) {
        self.begin(TAG_SCROLL_FANOUT);
        self.write_f64(e.scroll_offset);
        self.write_f64(e.window_height);
        self.write_u32(e.visited);
        self.write_u32(e.on_screen);
        self.write_u32(e.failed);
    }

    fn on_overlap(&mut self, e: &OverlapEvent) {
        self.begin(TAG_OVERLAP);
        self.write_id(e.id);
        self.write_f64(e.screen_top);
        self.write_f64(e.screen_bottom);
        self.write_f64(e.element_top);
        self.write_f64(e.element_bottom);
        self.write_u8(u8::from(e.on_screen));
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// A [`RegistryEvent`].
    Registry(RegistryEvent),
    /// A [`PhaseChangeEvent`].
    PhaseChange(PhaseChangeEvent),
    /// An [`UpdateEvent`].
    Update(UpdateEvent),
    /// A [`CallbackFailedEvent`], with the error reduced to its message.
    CallbackFailed {
        /// The element whose callback failed.
        id: ViewportId,
        /// The element's diagnostic label.
        label: Option<String>,
        /// The error message.
        message: String,
    },
    /// A [`ThresholdReachedEvent`].
    ThresholdReached(ThresholdReachedEvent),
    /// A [`TidyEvent`].
    Tidy(TidyEvent),
    /// A [`ScrollFanoutEvent`].
    ScrollFanout(ScrollFanoutEvent),
    /// An [`OverlapEvent`].
    Overlap(OverlapEvent),
}

/// One decoded record.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// Microseconds between recorder creation and the event.
    pub at_us: u64,
    /// The event.
    pub event: RecordedEvent,
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`Record`]. Decoding stops at the first truncated or unknown record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take(&mut self, n: usize) -> Option<&[u8]> {
        let end = self.pos.checked_add(n)?;
        let bytes = self.data.get(self.pos..end)?;
        self.pos = end;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take(1).map(|b| b[0])
    }

    fn read_u32(&mut self) -> Option<u32> {
        Some(u32::from_le_bytes(self.take(4)?.try_into().ok()?))
    }

    fn read_u64(&mut self) -> Option<u64> {
        Some(u64::from_le_bytes(self.take(8)?.try_into().ok()?))
    }

    fn read_f64(&mut self) -> Option<f64> {
        Some(f64::from_le_bytes(self.take(8)?.try_into().ok()?))
    }

    fn read_id(&mut self) -> Option<ViewportId> {
        self.read_u32().map(ViewportId::from_index)
    }

    fn read_str(&mut self) -> Option<String> {
        let len = self.read_u32()? as usize;
        String::from_utf8(self.take(len)?.to_vec()).ok()
    }

    fn read_option_str(&mut self) -> Option<Option<String>> {
        match self.read_u8()? {
            0 => Some(None),
            _ => self.read_str().map(Some),
        }
    }

    fn read_phase(&mut self) -> Option<Phase> {
        Some(match self.read_u8()? {
            0 => Phase::Constructed,
            1 => Phase::Observing,
            2 => Phase::Playing,
            3 => Phase::Idle,
            _ => Phase::Tidied,
        })
    }

    fn decode_registry(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Registry(RegistryEvent {
            id: self.read_id()?,
            change: match self.read_u8()? {
                0 => RegistryChange::Registered,
                _ => RegistryChange::Unregistered,
            },
            len: self.read_u32()? as usize,
        }))
    }

    fn decode_phase_change(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseChange(PhaseChangeEvent {
            id: self.read_id()?,
            from: self.read_phase()?,
            to: self.read_phase()?,
        }))
    }

    fn decode_update(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Update(UpdateEvent {
            id: self.read_id()?,
            percentages: Percentages {
                top: self.read_f64()?,
                middle: self.read_f64()?,
                bottom: self.read_f64()?,
            },
            on_screen: self.read_u8()? != 0,
        }))
    }

    fn decode_callback_failed(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::CallbackFailed {
            id: self.read_id()?,
            label: self.read_option_str()?,
            message: self.read_str()?,
        })
    }

    fn decode_threshold_reached(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::ThresholdReached(ThresholdReachedEvent {
            id: self.read_id()?,
            threshold: self.read_f64()?,
            top: self.read_f64()?,
        }))
    }

    fn decode_tidy(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Tidy(TidyEvent {
            id: self.read_id()?,
            reason: match self.read_u8()? {
                0 => TidyReason::Detached,
                1 => TidyReason::ThresholdReached,
                _ => TidyReason::Requested,
            },
            released: Subscriptions::from_bits(self.read_u8()?),
        }))
    }

    fn decode_scroll_fanout(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::ScrollFanout(ScrollFanoutEvent {
            scroll_offset: self.read_f64()?,
            window_height: self.read_f64()?,
            visited: self.read_u32()?,
            on_screen: self.read_u32()?,
            failed: self.read_u32()?,
        }))
    }

    fn decode_overlap(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Overlap(OverlapEvent {
            id: self.read_id()?,
            screen_top: self.read_f64()?,
            screen_bottom: self.read_f64()?,
            element_top: self.read_f64()?,
            element_bottom: self.read_f64()?,
            on_screen: self.read_u8()? != 0,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        let at_us = self.read_u64()?;
        let event = match tag {
            TAG_REGISTRY => self.decode_registry(),
            TAG_PHASE_CHANGE => self.decode_phase_change(),
            TAG_UPDATE => self.decode_update(),
            TAG_CALLBACK_FAILED => self.decode_callback_failed(),
            TAG_THRESHOLD_REACHED => self.decode_threshold_reached(),
            TAG_TIDY => self.decode_tidy(),
            TAG_SCROLL_FANOUT => self.decode_scroll_fanout(),
            TAG_OVERLAP => self.decode_overlap(),
            _ => None,
        }?;
        Some(Record { at_us, event })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewports_core::callback::CallbackError;
    use viewports_core::ClassTarget;
    use viewports_core::classes::ClassSet;
    use viewports_core::element::TrackedElement;
    use viewports_core::geometry::ElementGeometry;
    use viewports_core::id::IdAllocator;
    use viewports_core::options::TrackerOptions;
    use viewports_core::registry::ViewportRegistry;
    use viewports_core::trace::Tracer;
    use viewports_core::tracker::{IntersectionSource, Subscription, Tracker};

    #[test]
    fn records_a_tracker_lifecycle() {
        let mut rec = RecorderSink::new();
        let mut classes = ClassSet::new();
        let id = IdAllocator::new().allocate().unwrap();
        {
            let mut tracer = Tracer::new(&mut rec);
            let options = TrackerOptions::new().with_stop_top_threshold(0.5).unwrap();
            let mut tracker = Tracker::new(
                id,
                &options,
                Some(Box::new(|_: f64, _: f64, _: f64| {
                    Err(CallbackError::new("boom"))
                })),
            );
            tracker.set_label(Some("hero".into()));
            tracker.observe(IntersectionSource::Observer, &mut tracer);
            tracker.resize(1000.0);
            tracker.set_intersecting(true, &mut classes, &mut tracer);
            tracker.on_frame(Some(ElementGeometry::new(400.0, 200.0)), &mut classes, &mut tracer);
        }

        let events: Vec<RecordedEvent> = decode(rec.as_bytes()).map(|r| r.event).collect();
        assert!(matches!(
            events[0],
            RecordedEvent::PhaseChange(PhaseChangeEvent {
                from: Phase::Constructed,
                to: Phase::Observing,
                ..
            })
        ));
        assert!(matches!(
            events[1],
            RecordedEvent::PhaseChange(PhaseChangeEvent {
                to: Phase::Playing,
                ..
            })
        ));
        let RecordedEvent::Update(update) = events[2] else {
            panic!("expected an update, got {:?}", events[2]);
        };
        assert!((update.percentages.top - 0.6).abs() < 1e-9);
        assert_eq!(
            events[3],
            RecordedEvent::CallbackFailed {
                id,
                label: Some("hero".into()),
                message: "boom".into(),
            }
        );
        assert!(matches!(events[4], RecordedEvent::ThresholdReached(_)));
        assert!(matches!(
            events[5],
            RecordedEvent::PhaseChange(PhaseChangeEvent {
                to: Phase::Tidied,
                ..
            })
        ));
        let RecordedEvent::Tidy(tidy) = events[6] else {
            panic!("expected a tidy, got {:?}", events[6]);
        };
        assert_eq!(tidy.reason, TidyReason::ThresholdReached);
        assert!(tidy.released.contains(Subscription::Intersection));
        assert_eq!(events.len(), 7);
    }

    #[test]
    fn timestamps_do_not_go_backwards() {
        let mut rec = RecorderSink::new();
        for visited in 0..3 {
            rec.on_scroll_fanout(&ScrollFanoutEvent {
                scroll_offset: 100.0,
                window_height: 800.0,
                visited,
                on_screen: 0,
                failed: 0,
            });
        }
        let stamps: Vec<u64> = decode(rec.as_bytes()).map(|r| r.at_us).collect();
        assert_eq!(stamps.len(), 3);
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn debug_overlaps_from_the_registry_are_recorded() {
        #[derive(Debug, PartialEq)]
        struct Block {
            top: f64,
            classes: ClassSet,
        }
        impl ClassTarget for Block {
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
        impl TrackedElement for Block {
            fn bounding_rect(&self) -> Option<kurbo::Rect> {
                Some(kurbo::Rect::new(0.0, self.top, 100.0, self.top + 100.0))
            }
            fn is_attached(&self) -> bool {
                true
            }
        }

        let mut rec = RecorderSink::new();
        {
            let mut tracer = Tracer::new(&mut rec);
            let mut registry = ViewportRegistry::new(1000.0);
            let options = TrackerOptions::new().with_debug(true);
            let block = Block {
                top: 1500.0,
                classes: ClassSet::new(),
            };
            registry.register(block, &options, None, &mut tracer).unwrap();
            registry.on_global_scroll(1000.0, &mut tracer);
        }

        let overlaps: Vec<OverlapEvent> = decode(rec.as_bytes())
            .filter_map(|r| match r.event {
                RecordedEvent::Overlap(e) => Some(e),
                _ => None,
            })
            .collect();
        assert_eq!(
            overlaps,
            [OverlapEvent {
                id: ViewportId::from_index(0),
                screen_top: 1000.0,
                screen_bottom: 2000.0,
                element_top: 1500.0,
                element_bottom: 1600.0,
                on_screen: true,
            }]
        );
    }

    #[test]
    fn truncated_recording_stops_cleanly() {
        let mut rec = RecorderSink::new();
        rec.on_registry(&RegistryEvent {
            id: ViewportId::from_index(1),
            change: RegistryChange::Registered,
            len: 1,
        });
        rec.on_registry(&RegistryEvent {
            id: ViewportId::from_index(2),
            change: RegistryChange::Registered,
            len: 2,
        });
        let bytes = rec.into_bytes();
        let cut = &bytes[..bytes.len() - 2];
        assert_eq!(decode(cut).count(), 1);
        assert_eq!(decode(&[]).count(), 0);
    }
}
