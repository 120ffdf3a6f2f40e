// SPDX-License-Identifier: MIT OR Apache-2.0
//! Storyboard files: the scene list of a page, in narrative order.

use scrollreel_sequencer::{Cue, Scene, SceneHandle, SceneRegistry};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Error loading a storyboard
#[derive(Debug, thiserror::Error)]
pub enum StoryboardError {
    /// Could not read the file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not a valid storyboard
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// One scene as written in a storyboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDef {
    /// Scene label
    pub label: String,
    /// Duration in seconds
    pub duration: f32,
    /// Whether the page actually contains this section
    #[serde(default = "default_present")]
    pub present: bool,
    /// Timed cues inside the scene
    #[serde(default)]
    pub cues: Vec<Cue>,
}

fn default_present() -> bool {
    true
}

/// Ordered scene list for one page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Storyboard {
    /// Page title
    #[serde(default)]
    pub title: String,
    /// Scenes in narrative order
    pub scenes: Vec<SceneDef>,
}

impl Storyboard {
    /// Load a storyboard file
    pub fn load(path: &Path) -> Result<Self, StoryboardError> {
        let content = std::fs::read_to_string(path)?;
        let storyboard = Self::from_ron_str(&content)?;
        tracing::info!(
            "Loaded storyboard {:?} with {} scenes from {:?}",
            storyboard.title,
            storyboard.scenes.len(),
            path
        );
        Ok(storyboard)
    }

    /// Parse RON text
    pub fn from_ron_str(content: &str) -> Result<Self, StoryboardError> {
        Ok(ron::from_str(content)?)
    }

    /// Register every scene, letting the registry drop the ones it refuses
    pub fn registry(&self) -> SceneRegistry {
        let mut registry = SceneRegistry::new();
        for def in &self.scenes {
            registry.register(def.to_scene());
        }
        registry
    }
}

impl SceneDef {
    /// Build the scene, with a tracing handle when the section is present
    pub fn to_scene(&self) -> Scene {
        let handle = self
            .present
            .then(|| Arc::new(TraceHandle::new(&self.label)) as Arc<dyn SceneHandle>);
        let mut scene = Scene::with_handle(&self.label, self.duration, handle);
        for cue in &self.cues {
            scene.add_cue(cue.clone());
        }
        scene
    }
}

/// Scene handle that reports what it is asked to do
#[derive(Debug)]
pub struct TraceHandle {
    label: String,
}

impl TraceHandle {
    /// Create a handle for a scene label
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

impl SceneHandle for TraceHandle {
    fn render_at(&self, local_time: f32) {
        tracing::trace!(scene = %self.label, local_time, "render");
    }

    fn on_enter(&self) {
        tracing::debug!(scene = %self.label, "enter");
    }

    fn on_exit(&self) {
        tracing::debug!(scene = %self.label, "exit");
    }

    fn on_cue(&self, cue: &str) {
        tracing::debug!(scene = %self.label, cue, "cue");
    }
}
