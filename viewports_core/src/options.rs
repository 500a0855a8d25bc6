// Copyright 2026 the Viewports Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-element configuration.

use alloc::string::{String, ToString};
use core::fmt;

use crate::classes::DEFAULT_PREFIX;

/// Attribute holding the class prefix.
pub const ATTR_CLASS_PREFIX: &str = "data-class-prefix";
/// Attribute holding the stop threshold.
pub const ATTR_STOP_TOP_THRESHOLD: &str = "data-stop-top-threshold";
/// Attribute holding the class-clearing flag.
pub const ATTR_REVERSE: &str = "data-reverse";
/// Attribute enabling per-element diagnostics.
pub const ATTR_DEBUG: &str = "data-debug";

/// Errors from building [`TrackerOptions`].
#[derive(Clone, Debug, PartialEq)]
pub enum OptionsError {
    /// The class prefix was empty.
    EmptyPrefix,
    /// The class prefix contained whitespace, which a class name cannot hold.
    InvalidPrefix(String),
    /// The stop threshold was negative or not finite.
    InvalidThreshold(f64),
    /// A numeric attribute could not be parsed.
    UnparsableNumber {
        /// Attribute name.
        attribute: &'static str,
        /// Raw attribute value.
        value: String,
    },
    /// A boolean attribute was neither `"true"` nor `"false"`.
    InvalidFlag {
        /// Attribute name.
        attribute: &'static str,
        /// Raw attribute value.
        value: String,
    },
}

impl fmt::Display for OptionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPrefix => write!(f, "class prefix is empty"),
            Self::InvalidPrefix(prefix) => {
                write!(f, "class prefix {prefix:?} contains whitespace")
            }
            Self::InvalidThreshold(value) => {
                write!(f, "stop threshold {value} must be a finite, non-negative number")
            }
            Self::UnparsableNumber { attribute, value } => {
                write!(f, "{attribute}={value:?} is not a number")
            }
            Self::InvalidFlag { attribute, value } => {
                write!(f, "{attribute}={value:?} is not \"true\" or \"false\"")
            }
        }
    }
}

impl core::error::Error for OptionsError {}

/// Configuration for one tracked element.
///
/// The defaults are the `"vp"` prefix, no stop threshold, and full class
/// clearing on every update.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackerOptions {
    class_prefix: String,
    stop_top_threshold: Option<f64>,
    reverse: bool,
    debug: bool,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            class_prefix: DEFAULT_PREFIX.into(),
            stop_top_threshold: None,
            reverse: true,
            debug: false,
        }
    }
}

impl TrackerOptions {
    /// Returns the default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the class prefix.
    ///
    /// # Errors
    ///
    /// Returns [`OptionsError::EmptyPrefix`] or [`OptionsError::InvalidPrefix`]
    /// if the prefix cannot form a class name.
    pub fn with_class_prefix(mut self, prefix: impl Into<String>) -> Result<Self, OptionsError> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(OptionsError::EmptyPrefix);
        }
        if prefix.chars().any(char::is_whitespace) {
            return Err(OptionsError::InvalidPrefix(prefix));
        }
        self.class_prefix = prefix;
        Ok(self)
    }

    /// Sets the top percentage at which tracking stops for good.
    ///
    /// # Errors
    ///
    /// Returns [`OptionsError::InvalidThreshold`] for negative or non-finite
    /// values.
    pub fn with_stop_top_threshold(mut self, threshold: f64) -> Result<Self, OptionsError> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(OptionsError::InvalidThreshold(threshold));
        }
        self.stop_top_threshold = Some(threshold);
        Ok(self)
    }

    /// Controls whether the `--onf-*`/`--bf-*` classes are cleared on every
    /// update (`true`, the default) or kept once reached (`false`).
    ///
    /// `--on-*` and `--b-*` are always cleared.
    #[must_use]
    pub fn with_reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// Enables verbose diagnostics for this element: every lifecycle event,
    /// plus the on-screen test details when driven by a registry.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// The class prefix.
    #[must_use]
    pub fn class_prefix(&self) -> &str {
        &self.class_prefix
    }

    /// The stop threshold, if any.
    #[must_use]
    pub fn stop_top_threshold(&self) -> Option<f64> {
        self.stop_top_threshold
    }

    /// Whether forever classes are cleared on each update.
    #[must_use]
    pub fn reverse(&self) -> bool {
        self.reverse
    }

    /// Whether per-element diagnostics are on.
    #[must_use]
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Reads options from `data-*` attributes, starting from the defaults.
    ///
    /// Recognized attributes are [`ATTR_CLASS_PREFIX`],
    /// [`ATTR_STOP_TOP_THRESHOLD`], [`ATTR_REVERSE`] and [`ATTR_DEBUG`];
    /// anything else is ignored.
    ///
    /// # Errors
    ///
    /// Returns the first [`OptionsError`] met while applying attributes.
    pub fn from_data_attributes<'a>(
        attributes: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, OptionsError> {
        let mut options = Self::default();
        for (name, value) in attributes {
            let value = value.trim();
            options = match name {
                ATTR_CLASS_PREFIX => options.with_class_prefix(value)?,
                ATTR_STOP_TOP_THRESHOLD => {
                    let threshold =
                        value
                            .parse::<f64>()
                            .map_err(|_| OptionsError::UnparsableNumber {
                                attribute: ATTR_STOP_TOP_THRESHOLD,
                                value: value.to_string(),
                            })?;
                    options.with_stop_top_threshold(threshold)?
                }
                ATTR_REVERSE => options.with_reverse(parse_flag(ATTR_REVERSE, value)?),
                ATTR_DEBUG => options.with_debug(parse_flag(ATTR_DEBUG, value)?),
                _ => options,
            };
        }
        Ok(options)
    }
}

fn parse_flag(attribute: &'static str, value: &str) -> Result<bool, OptionsError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(OptionsError::InvalidFlag {
            attribute,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = TrackerOptions::default();
        assert_eq!(options.class_prefix(), "vp");
        assert_eq!(options.stop_top_threshold(), None);
        assert!(options.reverse());
        assert!(!options.debug());
    }

    #[test]
    fn builders_validate() {
        assert_eq!(
            TrackerOptions::new().with_class_prefix(""),
            Err(OptionsError::EmptyPrefix)
        );
        assert!(matches!(
            TrackerOptions::new().with_class_prefix("a b"),
            Err(OptionsError::InvalidPrefix(_))
        ));
        assert_eq!(
            TrackerOptions::new().with_stop_top_threshold(-0.1),
            Err(OptionsError::InvalidThreshold(-0.1))
        );
        assert!(
            TrackerOptions::new()
                .with_stop_top_threshold(f64::NAN)
                .is_err()
        );
        let options = TrackerOptions::new()
            .with_stop_top_threshold(1.5)
            .unwrap();
        assert_eq!(options.stop_top_threshold(), Some(1.5));
    }

    #[test]
    fn reads_data_attributes() {
        let options = TrackerOptions::from_data_attributes([
            ("id", "hero"),
            (ATTR_CLASS_PREFIX, "hero"),
            (ATTR_STOP_TOP_THRESHOLD, " 0.5 "),
            (ATTR_REVERSE, "false"),
            (ATTR_DEBUG, "true"),
        ])
        .unwrap();
        assert_eq!(options.class_prefix(), "hero");
        assert_eq!(options.stop_top_threshold(), Some(0.5));
        assert!(!options.reverse());
        assert!(options.debug());
    }

    #[test]
    fn attribute_errors_name_the_attribute() {
        let err = TrackerOptions::from_data_attributes([(ATTR_STOP_TOP_THRESHOLD, "half")])
            .unwrap_err();
        assert_eq!(
            alloc::format!("{err}"),
            "data-stop-top-threshold=\"half\" is not a number"
        );
        let err = TrackerOptions::from_data_attributes([(ATTR_REVERSE, "yes")]).unwrap_err();
        assert!(matches!(err, OptionsError::InvalidFlag { .. }));
        let err = TrackerOptions::from_data_attributes([(ATTR_DEBUG, "1")]).unwrap_err();
        assert_eq!(
            err,
            OptionsError::InvalidFlag {
                attribute: ATTR_DEBUG,
                value: "1".into(),
            }
        );
    }
}
