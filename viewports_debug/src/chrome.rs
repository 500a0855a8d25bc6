// Copyright 2026 the Viewports Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Each element gets its own track (`tid` = element handle). Time spent in
//! [`Phase::Playing`] shows up as a duration slice; everything else is an
//! instant event. Registry fan-outs go on track 0 of a separate process.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use viewports_core::tracker::Phase;

use crate::recorder::{RecordedEvent, decode};

const ELEMENTS_PID: u32 = 0;
const REGISTRY_PID: u32 = 1;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for record in decode(bytes) {
        let ts = record.at_us;
        match record.event {
            RecordedEvent::Registry(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("{:?}", e.change),
                    "cat": "Registry",
                    "ts": ts,
                    "pid": REGISTRY_PID,
                    "tid": 0,
                    "s": "p",
                    "args": {
                        "id": e.id.index(),
                        "len": e.len,
                    }
                }));
            }
            RecordedEvent::PhaseChange(e) => {
                if e.from == Phase::Playing {
                    events.push(json!({
                        "ph": "E",
                        "name": "Playing",
                        "cat": "Lifecycle",
                        "ts": ts,
                        "pid": ELEMENTS_PID,
                        "tid": e.id.index(),
                    }));
                }
                if e.to == Phase::Playing {
                    events.push(json!({
                        "ph": "B",
                        "name": "Playing",
                        "cat": "Lifecycle",
                        "ts": ts,
                        "pid": ELEMENTS_PID,
                        "tid": e.id.index(),
                    }));
                } else {
                    events.push(json!({
                        "ph": "i",
                        "name": format!("{:?}", e.to),
                        "cat": "Lifecycle",
                        "ts": ts,
                        "pid": ELEMENTS_PID,
                        "tid": e.id.index(),
                        "s": "t",
                        "args": {
                            "from": format!("{:?}", e.from),
                        }
                    }));
                }
            }
            RecordedEvent::Update(e) => {
                events.push(json!({
                    "ph": "C",
                    "name": format!("{}", e.id),
                    "cat": "Update",
                    "ts": ts,
                    "pid": ELEMENTS_PID,
                    "tid": e.id.index(),
                    "args": {
                        "top": e.percentages.top,
                        "middle": e.percentages.middle,
                        "bottom": e.percentages.bottom,
                    }
                }));
            }
            RecordedEvent::CallbackFailed { id, label, message } => {
                events.push(json!({
                    "ph": "i",
                    "name": "CallbackFailed",
                    "cat": "Error",
                    "ts": ts,
                    "pid": ELEMENTS_PID,
                    "tid": id.index(),
                    "s": "t",
                    "args": {
                        "label": label,
                        "message": message,
                    }
                }));
            }
            RecordedEvent::ThresholdReached(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "ThresholdReached",
                    "cat": "Lifecycle",
                    "ts": ts,
                    "pid": ELEMENTS_PID,
                    "tid": e.id.index(),
                    "s": "t",
                    "args": {
                        "threshold": e.threshold,
                        "top": e.top,
                    }
                }));
            }
            RecordedEvent::Tidy(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Tidy",
                    "cat": "Lifecycle",
                    "ts": ts,
                    "pid": ELEMENTS_PID,
                    "tid": e.id.index(),
                    "s": "t",
                    "args": {
                        "reason": format!("{:?}", e.reason),
                        "released": e.released.len(),
                    }
                }));
            }
            RecordedEvent::ScrollFanout(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "ScrollFanout",
                    "cat": "Registry",
                    "ts": ts,
                    "pid": REGISTRY_PID,
                    "tid": 0,
                    "s": "p",
                    "args": {
                        "scroll_offset": e.scroll_offset,
                        "window_height": e.window_height,
                        "visited": e.visited,
                        "on_screen": e.on_screen,
                        "failed": e.failed,
                    }
                }));
            }
            RecordedEvent::Overlap(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Overlap",
                    "cat": "Debug",
                    "ts": ts,
                    "pid": ELEMENTS_PID,
                    "tid": e.id.index(),
                    "s": "t",
                    "args": {
                        "screen": [e.screen_top, e.screen_bottom],
                        "element": [e.element_top, e.element_bottom],
                        "on_screen": e.on_screen,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use viewports_core::callback::CallbackError;
    use viewports_core::id::ViewportId;
    use viewports_core::trace::{CallbackFailedEvent, OverlapEvent, PhaseChangeEvent, TraceSink};

    #[test]
    fn export_produces_valid_json() {
        let id = ViewportId::from_index(5);
        let mut rec = RecorderSink::new();
        rec.on_phase_change(&PhaseChangeEvent {
            id,
            from: Phase::Observing,
            to: Phase::Playing,
        });
        rec.on_callback_failed(&CallbackFailedEvent {
            id,
            label: None,
            error: &CallbackError::new("boom"),
        });
        rec.on_phase_change(&PhaseChangeEvent {
            id,
            from: Phase::Playing,
            to: Phase::Idle,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 4);

        // Entering Playing opens a slice on the element's track.
        assert_eq!(parsed[0]["ph"], "B");
        assert_eq!(parsed[0]["tid"], 5);

        assert_eq!(parsed[1]["name"], "CallbackFailed");
        assert_eq!(parsed[1]["args"]["message"], "boom");
        assert!(parsed[1]["args"]["label"].is_null());

        // Leaving Playing closes it, then marks the new phase.
        assert_eq!(parsed[2]["ph"], "E");
        assert_eq!(parsed[3]["ph"], "i");
        assert_eq!(parsed[3]["name"], "Idle");
    }

    #[test]
    fn overlaps_land_on_the_element_track() {
        let mut rec = RecorderSink::new();
        rec.on_overlap(&OverlapEvent {
            id: ViewportId::from_index(2),
            screen_top: 0.0,
            screen_bottom: 800.0,
            element_top: 900.0,
            element_bottom: 1000.0,
            on_screen: false,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0]["tid"], 2);
        assert_eq!(parsed[0]["args"]["element"], json!([900.0, 1000.0]));
        assert_eq!(parsed[0]["args"]["on_screen"], false);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}
