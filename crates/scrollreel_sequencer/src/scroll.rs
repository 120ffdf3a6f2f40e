// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scroll distance to progress mapping and scrub smoothing.

use crate::config::ScrollConfig;
use crate::reel::Reel;

/// Differences below this are treated as settled
const SETTLE_EPSILON: f32 = 1e-4;

/// Converts a scroll offset in pixels into reel progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMapping {
    length: f32,
}

impl ScrollMapping {
    /// Mapping for a reel: one reel second spans `pixels_per_second` pixels.
    ///
    /// An empty reel still gets a scrollable stage of `fallback_duration`
    /// seconds so the page does not collapse.
    pub fn for_reel(reel: &Reel, config: &ScrollConfig) -> Self {
        let total = reel.total_duration();
        let seconds = if total > 0.0 { total } else { config.fallback_duration };
        Self {
            length: (seconds * config.pixels_per_second).max(0.0),
        }
    }

    /// Scroll length of the whole stage in pixels
    pub fn length(&self) -> f32 {
        self.length
    }

    /// Progress for a scroll offset
    pub fn progress(&self, scroll_offset: f32) -> f32 {
        if self.length <= 0.0 || scroll_offset.is_nan() {
            return 0.0;
        }
        (scroll_offset / self.length).clamp(0.0, 1.0)
    }

    /// Scroll offset for a progress value
    pub fn scroll_offset(&self, progress: f32) -> f32 {
        if progress.is_nan() {
            return 0.0;
        }
        progress.clamp(0.0, 1.0) * self.length
    }
}

/// Lets displayed progress trail the scroll driver.
///
/// `lag` is the time constant of an exponential catch-up; zero follows
/// the driver exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scrubber {
    lag: f32,
    current: Option<f32>,
    target: f32,
}

impl Scrubber {
    /// Create a scrubber with a catch-up time constant in seconds
    pub fn new(lag: f32) -> Self {
        Self {
            lag: if lag.is_finite() { lag.max(0.0) } else { 0.0 },
            current: None,
            target: 0.0,
        }
    }

    /// Advance toward `target` by `delta_time` seconds
    pub fn update(&mut self, target: f32, delta_time: f32) -> f32 {
        let target = if target.is_nan() { 0.0 } else { target.clamp(0.0, 1.0) };
        self.target = target;

        let next = match self.current {
            // First reading or no smoothing: follow directly
            None => target,
            Some(_) if self.lag <= 0.0 => target,
            Some(current) => {
                let dt = if delta_time.is_finite() { delta_time.max(0.0) } else { 0.0 };
                let alpha = 1.0 - (-dt / self.lag).exp();
                let value = current + (target - current) * alpha;
                if (target - value).abs() < SETTLE_EPSILON {
                    target
                } else {
                    value
                }
            }
        };

        self.current = Some(next);
        next
    }

    /// Jump straight to a progress value
    pub fn reset(&mut self, progress: f32) {
        let progress = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
        self.current = Some(progress);
        self.target = progress;
    }

    /// Current displayed progress
    pub fn current(&self) -> f32 {
        self.current.unwrap_or(0.0)
    }

    /// Whether displayed progress has caught up with the driver
    pub fn is_settled(&self) -> bool {
        self.current.map_or(true, |c| c == self.target)
    }
}
