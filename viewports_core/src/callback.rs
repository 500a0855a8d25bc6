// Copyright 2026 the Viewports Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! User animation callbacks.

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

/// Called after every recompute with `(top, middle, bottom)`.
///
/// Returning an error does not stop tracking; the failure is reported and
/// the next update proceeds normally.
pub type AnimationCallback = Box<dyn FnMut(f64, f64, f64) -> Result<(), CallbackError>>;

/// Failure reported by an [`AnimationCallback`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackError {
    message: String,
}

impl CallbackError {
    /// Creates an error carrying `message`.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message the callback reported.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CallbackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "animation callback failed: {}", self.message)
    }
}

impl core::error::Error for CallbackError {}
