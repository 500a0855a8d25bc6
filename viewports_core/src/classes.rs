// Copyright 2026 the Viewports Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Threshold-to-class mapping.
//!
//! Each tracked element carries a set of CSS classes describing how far it
//! has scrolled into view, in 10% steps:
//!
//! | Class               | Present when          |
//! |---------------------|-----------------------|
//! | `{p}--on-{n}`       | `top >= n / 100`      |
//! | `{p}--onf-{n}`      | `top >= n / 100`      |
//! | `{p}--b-{n}`        | `bottom >= n / 100`   |
//! | `{p}--bf-{n}`       | `bottom >= n / 100`   |
//!
//! for `n` in `0, 10, ..., 100`. Every update clears the previous set before
//! applying the new one, so the result depends only on the percentages passed
//! in. The `f` ("forever") variants can optionally be kept across updates.

use alloc::collections::BTreeSet;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::geometry::Percentages;

/// Prefix used when none is configured.
pub const DEFAULT_PREFIX: &str = "vp";

/// Threshold steps, in percent.
pub const STEPS: [u8; 11] = [0, 10, 20, 30, 40, 50, 60, 70, 80, 90, 100];

/// Something that carries a list of CSS classes.
///
/// Implemented by DOM element adapters in backends and by [`ClassSet`] for
/// headless use.
pub trait ClassTarget {
    /// Adds `name` if absent.
    fn add_class(&mut self, name: &str);

    /// Removes `name` if present.
    fn remove_class(&mut self, name: &str);

    /// Returns `true` if `name` is present.
    fn has_class(&self, name: &str) -> bool;
}

/// Which family a threshold class belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ThresholdKind {
    /// `--on-{n}`, driven by the top percentage.
    On,
    /// `--onf-{n}`, driven by the top percentage.
    OnForever,
    /// `--b-{n}`, driven by the bottom percentage.
    Bottom,
    /// `--bf-{n}`, driven by the bottom percentage.
    BottomForever,
}

impl ThresholdKind {
    /// All kinds in table order.
    pub const ALL: [Self; 4] = [Self::On, Self::OnForever, Self::Bottom, Self::BottomForever];

    /// The infix used in the class name.
    #[must_use]
    pub const fn infix(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::OnForever => "onf",
            Self::Bottom => "b",
            Self::BottomForever => "bf",
        }
    }

    /// Returns `true` for the `f` variants.
    #[must_use]
    pub const fn is_forever(self) -> bool {
        matches!(self, Self::OnForever | Self::BottomForever)
    }

    const fn column(self) -> usize {
        match self {
            Self::On => 0,
            Self::OnForever => 1,
            Self::Bottom => 2,
            Self::BottomForever => 3,
        }
    }

    fn reached(self, percentages: Percentages, level: f64) -> bool {
        match self {
            Self::On | Self::OnForever => percentages.top >= level,
            Self::Bottom | Self::BottomForever => percentages.bottom >= level,
        }
    }
}

/// Builds the class name for one threshold.
#[must_use]
pub fn threshold_class(prefix: &str, kind: ThresholdKind, step: u8) -> String {
    format!("{prefix}--{}-{step}", kind.infix())
}

/// Precomputed class names for one prefix.
///
/// Names are formatted once so per-frame updates do not allocate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassNames {
    prefix: String,
    thresholds: Vec<[String; 4]>,
    onscreen: String,
    initialised: String,
    threshold_reached: String,
}

impl ClassNames {
    /// Builds every class name for `prefix`.
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        let thresholds = STEPS
            .iter()
            .map(|&step| ThresholdKind::ALL.map(|kind| threshold_class(prefix, kind, step)))
            .collect();
        Self {
            prefix: prefix.into(),
            thresholds,
            onscreen: format!("{prefix}--onscreen"),
            initialised: format!("{prefix}--initialised"),
            threshold_reached: format!("{prefix}--thresholdReached"),
        }
    }

    /// The configured prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The name for `kind` at `step`, if `step` is one of [`STEPS`].
    #[must_use]
    pub fn threshold(&self, kind: ThresholdKind, step: u8) -> Option<&str> {
        let row = STEPS.iter().position(|&s| s == step)?;
        Some(&self.thresholds[row][kind.column()])
    }

    /// `{prefix}--onscreen`.
    #[must_use]
    pub fn onscreen(&self) -> &str {
        &self.onscreen
    }

    /// `{prefix}--initialised`.
    #[must_use]
    pub fn initialised(&self) -> &str {
        &self.initialised
    }

    /// `{prefix}--thresholdReached`.
    #[must_use]
    pub fn threshold_reached(&self) -> &str {
        &self.threshold_reached
    }

    /// Removes threshold classes from `target`.
    ///
    /// The `f` variants are only removed when `include_forever` is set.
    pub fn clear(&self, target: &mut (impl ClassTarget + ?Sized), include_forever: bool) {
        for row in &self.thresholds {
            for kind in ThresholdKind::ALL {
                if include_forever || !kind.is_forever() {
                    target.remove_class(&row[kind.column()]);
                }
            }
        }
    }

    /// Clears threshold classes, then adds the ones `percentages` reaches.
    ///
    /// Applying the same percentages twice leaves the same set.
    pub fn apply(
        &self,
        target: &mut (impl ClassTarget + ?Sized),
        percentages: Percentages,
        include_forever: bool,
    ) {
        self.clear(target, include_forever);
        for (row, &step) in self.thresholds.iter().zip(STEPS.iter()) {
            let level = f64::from(step) / 100.0;
            for kind in ThresholdKind::ALL {
                if kind.reached(percentages, level) {
                    target.add_class(&row[kind.column()]);
                }
            }
        }
    }
}

/// An in-memory class list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassSet {
    names: BTreeSet<String>,
}

impl ClassSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of classes present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if no class is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates the classes in lexical order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Renders the set as a `class` attribute value.
    #[must_use]
    pub fn to_attribute(&self) -> String {
        self.iter().collect::<Vec<_>>().join(" ")
    }
}

impl ClassTarget for ClassSet {
    fn add_class(&mut self, name: &str) {
        if !self.names.contains(name) {
            self.names.insert(name.into());
        }
    }

    fn remove_class(&mut self, name: &str) {
        self.names.remove(name);
    }

    fn has_class(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pct(top: f64, bottom: f64) -> Percentages {
        Percentages {
            top,
            middle: 0.0,
            bottom,
        }
    }

    #[test]
    fn names_follow_the_prefix() {
        let names = ClassNames::new("hero");
        assert_eq!(names.threshold(ThresholdKind::On, 30), Some("hero--on-30"));
        assert_eq!(names.threshold(ThresholdKind::BottomForever, 100), Some("hero--bf-100"));
        assert_eq!(names.threshold(ThresholdKind::On, 35), None);
        assert_eq!(names.onscreen(), "hero--onscreen");
        assert_eq!(names.initialised(), "hero--initialised");
        assert_eq!(names.threshold_reached(), "hero--thresholdReached");
    }

    #[test]
    fn boundary_value_is_inclusive() {
        let names = ClassNames::new(DEFAULT_PREFIX);
        let mut set = ClassSet::new();
        names.apply(&mut set, pct(0.3, -1.0), true);
        assert!(set.has_class("vp--on-30"), "{}", set.to_attribute());
        assert!(set.has_class("vp--onf-30"), "{}", set.to_attribute());
        assert!(!set.has_class("vp--on-40"), "{}", set.to_attribute());
        assert!(!set.has_class("vp--b-0"), "negative bottom adds nothing");
    }

    #[test]
    fn apply_is_idempotent() {
        let names = ClassNames::new(DEFAULT_PREFIX);
        let mut once = ClassSet::new();
        names.apply(&mut once, pct(0.55, 0.72), true);
        let mut twice = once.clone();
        names.apply(&mut twice, pct(0.55, 0.72), true);
        assert_eq!(once, twice);
        // 6 top steps and 8 bottom steps, two classes each.
        assert_eq!(once.len(), 2 * (6 + 8));
    }

    #[test]
    fn result_depends_only_on_current_values() {
        let names = ClassNames::new(DEFAULT_PREFIX);
        let mut scrolled = ClassSet::new();
        names.apply(&mut scrolled, pct(0.95, 1.2), true);
        names.apply(&mut scrolled, pct(0.2, 0.4), true);

        let mut fresh = ClassSet::new();
        names.apply(&mut fresh, pct(0.2, 0.4), true);
        assert_eq!(scrolled, fresh);
    }

    #[test]
    fn rising_top_only_adds_classes() {
        let names = ClassNames::new(DEFAULT_PREFIX);
        let mut previous = ClassSet::new();
        for tenth in 0..=10 {
            let mut current = ClassSet::new();
            names.apply(&mut current, pct(f64::from(tenth) / 10.0, -1.0), true);
            for name in previous.iter() {
                assert!(current.has_class(name), "{name} lost at {tenth}");
            }
            previous = current;
        }
        assert_eq!(previous.len(), 22);
    }

    #[test]
    fn forever_classes_can_survive_updates() {
        let names = ClassNames::new(DEFAULT_PREFIX);
        let mut set = ClassSet::new();
        names.apply(&mut set, pct(0.5, 0.5), false);
        names.apply(&mut set, pct(0.1, 0.1), false);
        assert!(set.has_class("vp--onf-50"), "forever kept");
        assert!(set.has_class("vp--bf-50"), "forever kept");
        assert!(!set.has_class("vp--on-50"), "plain cleared");
        assert!(!set.has_class("vp--b-50"), "plain cleared");
    }

    #[test]
    fn clear_leaves_unrelated_classes() {
        let names = ClassNames::new(DEFAULT_PREFIX);
        let mut set = ClassSet::new();
        set.add_class("card");
        set.add_class(names.onscreen());
        names.apply(&mut set, pct(1.0, 1.0), true);
        names.clear(&mut set, true);
        assert_eq!(set.to_attribute(), "card vp--onscreen");
    }
}
