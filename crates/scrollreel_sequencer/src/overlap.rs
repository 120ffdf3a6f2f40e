// SPDX-License-Identifier: MIT OR Apache-2.0
//! Overlap policies for starting a scene before its predecessor ends.

use crate::reel::ReelEntry;
use crate::scene::Scene;
use serde::{Deserialize, Serialize};
use std::fmt;

/// End time the overlap is subtracted from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OverlapAnchor {
    /// Running end of the whole reel so far
    #[default]
    RunningEnd,
    /// End of the most recently appended entry
    PreviousEnd,
}

/// Overlap closure signature
pub type OverlapFn = dyn Fn(&ReelEntry, &Scene) -> f32 + Send + Sync;

/// How much earlier than the anchor the next scene starts
#[derive(Default)]
pub enum OverlapPolicy {
    /// Scenes play back to back
    #[default]
    None,
    /// Same overlap between every pair of scenes
    Fixed(f32),
    /// Overlap computed per pair from the previous entry and the next scene
    Custom(Box<OverlapFn>),
}

impl OverlapPolicy {
    /// Fixed overlap between every pair
    pub fn fixed(amount: f32) -> Self {
        Self::Fixed(amount)
    }

    /// Overlap computed per pair
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&ReelEntry, &Scene) -> f32 + Send + Sync + 'static,
    {
        Self::Custom(Box::new(f))
    }

    /// Overlap to apply before `next`, never negative
    pub fn overlap_for(&self, previous: &ReelEntry, next: &Scene) -> f32 {
        let raw = match self {
            Self::None => 0.0,
            Self::Fixed(amount) => *amount,
            Self::Custom(f) => f(previous, next),
        };
        sanitize(raw, next.label())
    }
}

impl fmt::Debug for OverlapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Fixed(amount) => f.debug_tuple("Fixed").field(amount).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

// Infinity is allowed: it simply pins the scene to the earliest legal start.
fn sanitize(raw: f32, label: &str) -> f32 {
    if raw.is_nan() || raw < 0.0 {
        tracing::warn!(label, overlap = raw, "Clamping invalid overlap to zero");
        0.0
    } else {
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reel::ReelSequencer;
    use crate::scene::tests::scene;

    fn first_entry() -> ReelEntry {
        let reel = ReelSequencer::build([&scene("a", 2.0)], OverlapPolicy::None);
        reel.entries()[0].clone()
    }

    #[test]
    fn test_fixed_and_none() {
        let prev = first_entry();
        let next = scene("b", 1.0);
        assert_eq!(OverlapPolicy::None.overlap_for(&prev, &next), 0.0);
        assert_eq!(OverlapPolicy::fixed(0.25).overlap_for(&prev, &next), 0.25);
    }

    #[test]
    fn test_invalid_results_clamp_to_zero() {
        let prev = first_entry();
        let next = scene("b", 1.0);
        assert_eq!(OverlapPolicy::fixed(-1.0).overlap_for(&prev, &next), 0.0);
        assert_eq!(OverlapPolicy::custom(|_, _| f32::NAN).overlap_for(&prev, &next), 0.0);
    }

    #[test]
    fn test_custom_sees_both_sides() {
        let prev = first_entry();
        let next = scene("b", 1.0);
        let policy = OverlapPolicy::custom(|prev, next| prev.duration() * 0.5 + next.duration() * 0.1);
        assert!((policy.overlap_for(&prev, &next) - 1.1).abs() < 1e-6);
    }
}
