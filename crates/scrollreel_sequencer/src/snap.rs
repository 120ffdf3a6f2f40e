// SPDX-License-Identifier: MIT OR Apache-2.0
//! Label checkpoints in progress space.
//!
//! The reel only reports where the checkpoints are. Easing toward one is
//! left to whatever owns the scroll position.

use crate::reel::Reel;
use serde::{Deserialize, Serialize};

/// Distance under which two progress values count as the same checkpoint
const SNAP_EPSILON: f32 = 1e-5;

/// Which checkpoint to prefer when snapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SnapDirection {
    /// Closest checkpoint
    #[default]
    Nearest,
    /// Next checkpoint after the current progress
    Forward,
    /// Previous checkpoint before the current progress
    Backward,
}

impl SnapDirection {
    /// Direction implied by the last scroll movement
    pub fn from_velocity(velocity: f32) -> Self {
        if velocity > 0.0 {
            Self::Forward
        } else if velocity < 0.0 {
            Self::Backward
        } else {
            Self::Nearest
        }
    }
}

impl Reel {
    /// Progress corresponding to an absolute position.
    ///
    /// Rounded up so that seeking to the result never lands before
    /// `position`.
    pub fn progress_of(&self, position: f32) -> f32 {
        let total = self.total_duration();
        if total <= 0.0 || position.is_nan() {
            return 0.0;
        }
        let mut progress = (position / total).clamp(0.0, 1.0);
        while progress < 1.0 && self.seek(progress) < position {
            progress = next_up(progress);
        }
        progress
    }

    /// Snap targets as progress values
    pub fn snap_points(&self) -> Vec<f32> {
        self.entries()
            .iter()
            .map(|e| self.progress_of(e.start_offset()))
            .collect()
    }

    /// Progress at which a label starts
    pub fn label_progress(&self, label: &str) -> Option<f32> {
        self.entry(label).map(|e| self.progress_of(e.start_offset()))
    }

    /// Closest checkpoint to `progress`
    pub fn nearest_snap(&self, progress: f32) -> Option<f32> {
        self.snap_points()
            .into_iter()
            .min_by(|a, b| (a - progress).abs().total_cmp(&(b - progress).abs()))
    }

    /// First checkpoint strictly after `progress`
    pub fn next_snap(&self, progress: f32) -> Option<f32> {
        self.snap_points()
            .into_iter()
            .find(|p| *p > progress + SNAP_EPSILON)
    }

    /// Last checkpoint strictly before `progress`
    pub fn previous_snap(&self, progress: f32) -> Option<f32> {
        self.snap_points()
            .into_iter()
            .rev()
            .find(|p| *p < progress - SNAP_EPSILON)
    }

    /// Checkpoint to settle on, falling back to the nearest one when there is
    /// nothing further in the requested direction
    pub fn snap_progress(&self, progress: f32, direction: SnapDirection) -> Option<f32> {
        match direction {
            SnapDirection::Nearest => self.nearest_snap(progress),
            SnapDirection::Forward => self.next_snap(progress).or_else(|| self.nearest_snap(progress)),
            SnapDirection::Backward => self
                .previous_snap(progress)
                .or_else(|| self.nearest_snap(progress)),
        }
    }
}

/// Smallest `f32` above a non-negative finite value
fn next_up(value: f32) -> f32 {
    f32::from_bits(value.to_bits() + 1)
}
