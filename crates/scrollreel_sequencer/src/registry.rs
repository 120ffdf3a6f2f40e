// SPDX-License-Identifier: MIT OR Apache-2.0
//! Insertion-ordered scene registry.
//!
//! Registration never fails loudly. A page with a missing section still
//! has to play, so degenerate scenes are dropped and recorded in
//! [`SceneRegistry::skipped`] instead.

use crate::scene::Scene;
use indexmap::IndexMap;

/// Reason a scene was not registered
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistrationRejected {
    /// Label is empty
    #[error("Scene label is empty")]
    EmptyLabel,

    /// Duration is negative or not finite
    #[error("Scene duration is invalid: {0}")]
    InvalidDuration(f32),

    /// Duration is zero
    #[error("Scene has zero duration")]
    ZeroDuration,

    /// No render handle
    #[error("Scene has no render handle")]
    MissingHandle,

    /// Label already taken by an earlier scene
    #[error("Scene label already registered")]
    DuplicateLabel,
}

/// A scene the registry refused, kept for diagnostics
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedScene {
    /// Label of the refused scene
    pub label: String,
    /// Why it was refused
    pub reason: RegistrationRejected,
}

/// Ordered collection of accepted scenes
#[derive(Debug, Clone, Default)]
pub struct SceneRegistry {
    scenes: IndexMap<String, Scene>,
    skipped: Vec<SkippedScene>,
}

impl SceneRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scene, returning whether it was accepted
    pub fn register(&mut self, scene: Scene) -> bool {
        match self.check(&scene) {
            Ok(()) => {
                tracing::debug!(
                    label = scene.label(),
                    duration = scene.duration(),
                    "Registered scene"
                );
                self.scenes.insert(scene.label().to_string(), scene);
                true
            }
            Err(reason) => {
                tracing::warn!(label = scene.label(), "Skipping scene: {reason}");
                self.skipped.push(SkippedScene {
                    label: scene.label().to_string(),
                    reason,
                });
                false
            }
        }
    }

    fn check(&self, scene: &Scene) -> Result<(), RegistrationRejected> {
        let duration = scene.duration();
        if scene.label().is_empty() {
            return Err(RegistrationRejected::EmptyLabel);
        }
        if !duration.is_finite() || duration < 0.0 {
            return Err(RegistrationRejected::InvalidDuration(duration));
        }
        if duration == 0.0 {
            return Err(RegistrationRejected::ZeroDuration);
        }
        if scene.handle().is_none() {
            return Err(RegistrationRejected::MissingHandle);
        }
        if self.scenes.contains_key(scene.label()) {
            return Err(RegistrationRejected::DuplicateLabel);
        }
        Ok(())
    }

    /// Accepted scenes in insertion order
    pub fn all(&self) -> impl Iterator<Item = &Scene> + Clone {
        self.scenes.values()
    }

    /// Get a scene by label
    pub fn get(&self, label: &str) -> Option<&Scene> {
        self.scenes.get(label)
    }

    /// Whether a label has been accepted
    pub fn contains(&self, label: &str) -> bool {
        self.scenes.contains_key(label)
    }

    /// Number of accepted scenes
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// Whether no scene has been accepted
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Refused scenes in the order they were offered
    pub fn skipped(&self) -> &[SkippedScene] {
        &self.skipped
    }

    /// Number of refused scenes
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}
