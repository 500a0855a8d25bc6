// Copyright 2026 the Viewports Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host element contract.

use kurbo::Rect;

use crate::classes::ClassTarget;

/// A host element that can be measured and styled.
///
/// Backends implement this for their native element handle (e.g. a DOM
/// `Element`). Identity is `PartialEq`: two values compare equal when they
/// refer to the same node.
pub trait TrackedElement: ClassTarget + PartialEq {
    /// Bounding box relative to the viewport, or `None` if the element
    /// cannot be measured right now.
    fn bounding_rect(&self) -> Option<Rect>;

    /// Returns `true` while the element is attached to the document.
    fn is_attached(&self) -> bool;

    /// A short label for diagnostics, such as the element's `id` attribute.
    fn label(&self) -> Option<&str> {
        None
    }
}
