// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scene definitions consumed by the registry and the reel.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Render target behind a scene.
///
/// The sequencer never looks inside a handle. It only tells the handle
/// which local time to show and, through the playback driver, when the
/// playhead enters or leaves the scene or crosses one of its cues.
pub trait SceneHandle: Send + Sync {
    /// Render the scene at a local time in `0..=duration`
    fn render_at(&self, local_time: f32);

    /// Playhead entered the scene span
    fn on_enter(&self) {}

    /// Playhead left the scene span
    fn on_exit(&self) {}

    /// Playhead crossed a cue of this scene
    fn on_cue(&self, _cue: &str) {}
}

/// Named instant inside a scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    /// Cue name
    pub name: String,
    /// Local time within the scene
    pub at: f32,
}

impl Cue {
    /// Create a new cue
    pub fn new(name: impl Into<String>, at: f32) -> Self {
        Self {
            name: name.into(),
            at,
        }
    }
}

/// A named, fixed-duration animation segment
#[derive(Clone)]
pub struct Scene {
    label: String,
    duration: f32,
    cues: Vec<Cue>,
    handle: Option<Arc<dyn SceneHandle>>,
}

impl Scene {
    /// Create a scene backed by a render handle
    pub fn new(label: impl Into<String>, duration: f32, handle: Arc<dyn SceneHandle>) -> Self {
        Self::with_handle(label, duration, Some(handle))
    }

    /// Create a scene whose handle may be missing.
    ///
    /// Scene builders use this when the content they were asked to animate
    /// is not on the page; the registry skips such scenes.
    pub fn with_handle(
        label: impl Into<String>,
        duration: f32,
        handle: Option<Arc<dyn SceneHandle>>,
    ) -> Self {
        Self {
            label: label.into(),
            duration,
            cues: Vec::new(),
            handle,
        }
    }

    /// Create a scene without any render handle
    pub fn detached(label: impl Into<String>, duration: f32) -> Self {
        Self::with_handle(label, duration, None)
    }

    /// Add a cue at a local time (builder style)
    pub fn with_cue(mut self, name: impl Into<String>, at: f32) -> Self {
        self.add_cue(Cue::new(name, at));
        self
    }

    /// Add a cue, clamping its time into the scene span
    pub fn add_cue(&mut self, mut cue: Cue) {
        cue.at = clamp_local(cue.at, self.duration);
        self.cues.push(cue);
        self.cues.sort_by(|a, b| a.at.total_cmp(&b.at));
    }

    /// Scene label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Scene duration in timeline seconds
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Cues sorted by local time
    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    /// Render handle, if the scene has one
    pub fn handle(&self) -> Option<&Arc<dyn SceneHandle>> {
        self.handle.as_ref()
    }

    /// Whether the scene can contribute to a reel
    pub fn is_playable(&self) -> bool {
        self.duration.is_finite() && self.duration > 0.0 && self.handle.is_some()
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("label", &self.label)
            .field("duration", &self.duration)
            .field("cues", &self.cues)
            .field("has_handle", &self.handle.is_some())
            .finish()
    }
}

/// Clamp a local time into `0..=duration`, tolerating bad durations.
pub(crate) fn clamp_local(time: f32, duration: f32) -> f32 {
    let upper = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
    if time.is_nan() {
        return 0.0;
    }
    time.max(0.0).min(upper)
}
