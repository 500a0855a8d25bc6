// Copyright 2026 the Viewports Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Offset and percentage math.
//!
//! All percentages are fractions of the window height measured from the
//! bottom edge of the viewport:
//!
//! ```text
//!   top    = (H - top) / H
//!   middle = (H - (top + h / 2)) / H
//!   bottom = (top + h) / H
//! ```
//!
//! where `top` is the element's top edge relative to the top of the viewport,
//! `h` is the element height, and `H` is the window height. Values are not
//! clamped; an element far above the viewport has `top > 1`.

use kurbo::{Rect, Vec2};

/// The three visibility scalars of one element, always sampled together.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Percentages {
    /// How far the element's top edge has risen above the viewport bottom.
    pub top: f64,
    /// How far the element's vertical middle has risen above the viewport bottom.
    pub middle: f64,
    /// Window heights needed to reach the element's bottom edge.
    pub bottom: f64,
}

impl Percentages {
    /// The values used when the host cannot report intersections at all.
    pub const FULLY_VISIBLE: Self = Self {
        top: 1.0,
        middle: 1.0,
        bottom: 1.0,
    };

    /// Computes all three scalars from one offset sample.
    ///
    /// Returns `None` if any input is not finite or if `window_height` is not
    /// positive; callers keep their previous values in that case.
    #[must_use]
    pub fn compute(top: f64, element_height: f64, window_height: f64) -> Option<Self> {
        if !(top.is_finite() && element_height.is_finite() && window_height.is_finite()) {
            return None;
        }
        if window_height <= 0.0 {
            return None;
        }
        Some(Self {
            top: (window_height - top) / window_height,
            middle: (window_height - (top + element_height * 0.5)) / window_height,
            bottom: (top + element_height) / window_height,
        })
    }

    /// Computes the scalars for `geometry` in a window of `window_height`.
    #[must_use]
    pub fn from_geometry(geometry: ElementGeometry, window_height: f64) -> Option<Self> {
        Self::compute(geometry.top, geometry.height, window_height)
    }

    /// Returns `(top, middle, bottom)`, the order callbacks receive them in.
    #[must_use]
    pub const fn as_tuple(self) -> (f64, f64, f64) {
        (self.top, self.middle, self.bottom)
    }
}

/// Vertical placement of an element relative to the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementGeometry {
    /// Top edge in px, relative to the top edge of the viewport.
    pub top: f64,
    /// Height in px.
    pub height: f64,
}

impl ElementGeometry {
    /// Creates geometry from a viewport-relative top and a height.
    #[must_use]
    pub const fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    /// Uses the vertical extent of a viewport-relative bounding box.
    #[must_use]
    pub fn from_bounding_rect(rect: Rect) -> Self {
        Self {
            top: rect.y0,
            height: rect.height(),
        }
    }

    /// Converts a document-relative box into viewport-relative geometry.
    #[must_use]
    pub fn from_document_bounds(bounds: Rect, scroll_offset: f64) -> Self {
        Self {
            top: bounds.y0 - scroll_offset,
            height: bounds.height(),
        }
    }

    /// Returns `true` if both fields are finite numbers.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.top.is_finite() && self.height.is_finite()
    }
}

/// Translates a viewport-relative box into document space.
#[must_use]
pub fn to_document_bounds(rect: Rect, scroll_offset: f64) -> Rect {
    rect + Vec2::new(0.0, scroll_offset)
}

/// Document-space vertical span of the visible window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenSpan {
    /// Document offset of the viewport's top edge (the scroll offset).
    pub top: f64,
    /// Document offset of the viewport's vertical middle.
    pub middle: f64,
    /// Document offset of the viewport's bottom edge.
    pub bottom: f64,
}

impl ScreenSpan {
    /// Computes the span for a scroll offset and window height.
    #[must_use]
    pub fn new(scroll_offset: f64, window_height: f64) -> Self {
        Self {
            top: scroll_offset,
            middle: scroll_offset + window_height / 2.0,
            bottom: scroll_offset + window_height,
        }
    }

    /// Returns `true` if any part of `bounds` (document space) is on screen.
    ///
    /// Edges touching count as overlapping.
    #[must_use]
    pub fn overlaps(&self, bounds: Rect) -> bool {
        self.top <= bounds.y1 && self.bottom >= bounds.y0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    #[test]
    fn formulas_hold() {
        for &(top, h, win) in &[
            (900.0, 200.0, 1000.0),
            (0.0, 50.0, 800.0),
            (-300.0, 1200.0, 640.0),
            (2000.0, 10.0, 768.0),
        ] {
            let p = Percentages::compute(top, h, win).unwrap();
            assert!(close(p.top, (win - top) / win), "top for {top}");
            assert!(close(p.bottom, (top + h) / win), "bottom for {top}");
            assert!(close(p.middle, (win - (top + h / 2.0)) / win), "middle for {top}");
        }
    }

    #[test]
    fn edges_of_the_viewport() {
        let at_bottom = Percentages::compute(1000.0, 100.0, 1000.0).unwrap();
        assert!(close(at_bottom.top, 0.0), "top edge on viewport bottom");
        let at_top = Percentages::compute(0.0, 100.0, 1000.0).unwrap();
        assert!(close(at_top.top, 1.0), "top edge on viewport top");
        let above = Percentages::compute(-500.0, 100.0, 1000.0).unwrap();
        assert!(above.top > 1.0, "values are not clamped");
    }

    #[test]
    fn scenario_from_a_scrolled_page() {
        let p = Percentages::compute(900.0, 200.0, 1000.0).unwrap();
        assert!(close(p.top, 0.1), "top was {}", p.top);
        assert!(close(p.bottom, 1.1), "bottom was {}", p.bottom);
        assert!(close(p.middle, 0.0), "middle was {}", p.middle);
    }

    #[test]
    fn invalid_input_is_rejected() {
        assert_eq!(Percentages::compute(f64::NAN, 10.0, 100.0), None);
        assert_eq!(Percentages::compute(10.0, f64::NAN, 100.0), None);
        assert_eq!(Percentages::compute(10.0, 10.0, f64::INFINITY), None);
        assert_eq!(Percentages::compute(10.0, 10.0, 0.0), None);
        assert_eq!(Percentages::compute(10.0, 10.0, -5.0), None);
    }

    #[test]
    fn tuple_order_is_top_middle_bottom() {
        let p = Percentages {
            top: 1.0,
            middle: 2.0,
            bottom: 3.0,
        };
        assert_eq!(p.as_tuple(), (1.0, 2.0, 3.0));
    }

    #[test]
    fn document_round_trip_through_scroll() {
        let client = Rect::new(0.0, 120.0, 300.0, 320.0);
        let doc = to_document_bounds(client, 1000.0);
        assert_eq!(doc.y0, 1120.0);
        let geometry = ElementGeometry::from_document_bounds(doc, 1000.0);
        assert_eq!(geometry, ElementGeometry::from_bounding_rect(client));
        assert_eq!(geometry.height, 200.0);
    }

    #[test]
    fn screen_overlap_is_inclusive() {
        let screen = ScreenSpan::new(500.0, 400.0);
        assert_eq!(screen.middle, 700.0);
        assert!(screen.overlaps(Rect::new(0.0, 900.0, 10.0, 1000.0)), "touching bottom");
        assert!(screen.overlaps(Rect::new(0.0, 300.0, 10.0, 500.0)), "touching top");
        assert!(!screen.overlaps(Rect::new(0.0, 901.0, 10.0, 1000.0)), "below");
        assert!(!screen.overlaps(Rect::new(0.0, 100.0, 10.0, 499.0)), "above");
    }
}
