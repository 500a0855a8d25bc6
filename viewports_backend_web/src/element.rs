// Copyright 2026 the Viewports Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM element adapter.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Rect;
use viewports_core::ClassTarget;
use viewports_core::element::TrackedElement;
use viewports_core::geometry::ElementGeometry;
use viewports_core::options::{
    ATTR_CLASS_PREFIX, ATTR_DEBUG, ATTR_REVERSE, ATTR_STOP_TOP_THRESHOLD, OptionsError,
    TrackerOptions,
};
use web_sys::Element;

/// A DOM element seen through the core element traits.
///
/// Classes go through `classList`; geometry comes from
/// `getBoundingClientRect`. The element's `id` attribute, read once at
/// construction, serves as its diagnostic label.
#[derive(Clone, Debug)]
pub struct DomElement {
    element: Element,
    label: Option<String>,
}

impl DomElement {
    /// Wraps `element`.
    #[must_use]
    pub fn new(element: Element) -> Self {
        let id = element.id();
        let label = (!id.is_empty()).then_some(id);
        Self { element, label }
    }

    /// The wrapped element.
    #[must_use]
    pub fn element(&self) -> &Element {
        &self.element
    }

    /// Current viewport-relative geometry, if measurable.
    #[must_use]
    pub fn geometry(&self) -> Option<ElementGeometry> {
        self.bounding_rect()
            .map(ElementGeometry::from_bounding_rect)
            .filter(|g| g.is_finite())
    }

    /// Reads [`TrackerOptions`] from the element's `data-*` attributes.
    ///
    /// # Errors
    ///
    /// Returns the [`OptionsError`] for the first malformed attribute.
    pub fn options(&self) -> Result<TrackerOptions, OptionsError> {
        let names = [
            ATTR_CLASS_PREFIX,
            ATTR_STOP_TOP_THRESHOLD,
            ATTR_REVERSE,
            ATTR_DEBUG,
        ];
        let values: Vec<(&str, String)> = names
            .into_iter()
            .filter_map(|name| self.element.get_attribute(name).map(|value| (name, value)))
            .collect();
        TrackerOptions::from_data_attributes(values.iter().map(|(k, v)| (*k, v.as_str())))
    }
}

impl PartialEq for DomElement {
    fn eq(&self, other: &Self) -> bool {
        self.element == other.element
    }
}

impl ClassTarget for DomElement {
    fn add_class(&mut self, name: &str) {
        let _ = self.element.class_list().add_1(name);
    }

    fn remove_class(&mut self, name: &str) {
        let _ = self.element.class_list().remove_1(name);
    }

    fn has_class(&self, name: &str) -> bool {
        self.element.class_list().contains(name)
    }
}

impl TrackedElement for DomElement {
    fn bounding_rect(&self) -> Option<Rect> {
        let r = self.element.get_bounding_client_rect();
        Some(Rect::new(r.left(), r.top(), r.right(), r.bottom()))
    }

    fn is_attached(&self) -> bool {
        self.element.is_connected()
    }

    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}
