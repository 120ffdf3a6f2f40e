// SPDX-License-Identifier: MIT OR Apache-2.0
//! The reel: every accepted scene concatenated onto one timeline.
//!
//! A [`Reel`] is built once by a [`ReelSequencer`] and never changes
//! afterwards. All queries are pure functions of the reel and their
//! arguments, so they are safe to call every frame and from several
//! readers at once.

use crate::overlap::{OverlapAnchor, OverlapPolicy};
use crate::scene::{Cue, Scene, SceneHandle};
use serde::Serialize;
use std::sync::Arc;

/// A scene placed on the reel timeline
#[derive(Debug, Clone)]
pub struct ReelEntry {
    start_offset: f32,
    scene: Scene,
}

impl ReelEntry {
    /// Scene label
    pub fn label(&self) -> &str {
        self.scene.label()
    }

    /// Absolute start time on the reel
    pub fn start_offset(&self) -> f32 {
        self.start_offset
    }

    /// Scene duration
    pub fn duration(&self) -> f32 {
        self.scene.duration()
    }

    /// Absolute end time on the reel
    pub fn end_offset(&self) -> f32 {
        self.start_offset + self.scene.duration()
    }

    /// The placed scene
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Render handle of the placed scene
    pub fn handle(&self) -> Option<&Arc<dyn SceneHandle>> {
        self.scene.handle()
    }

    /// Local scene time for an absolute reel position
    pub fn local_time(&self, position: f32) -> f32 {
        crate::scene::clamp_local(position - self.start_offset, self.duration())
    }
}

/// Where the reel is for a given scroll progress
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PlaybackState {
    /// Normalized progress in `0..=1`
    pub progress: f32,
    /// Absolute reel position
    pub timeline_position: f32,
}

/// A cue crossed between two reel positions
#[derive(Debug, Clone, Copy)]
pub struct CueHit<'a> {
    /// Index of the entry owning the cue
    pub entry_index: usize,
    /// Entry owning the cue
    pub entry: &'a ReelEntry,
    /// The cue itself
    pub cue: &'a Cue,
    /// Absolute reel position of the cue
    pub position: f32,
}

/// Ordered scene entries plus their combined duration
#[derive(Debug, Clone, Default)]
pub struct Reel {
    entries: Vec<ReelEntry>,
    total_duration: f32,
}

impl Reel {
    /// Entries in insertion order
    pub fn entries(&self) -> &[ReelEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the reel has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total reel duration
    pub fn total_duration(&self) -> f32 {
        self.total_duration
    }

    /// Entry by label
    pub fn entry(&self, label: &str) -> Option<&ReelEntry> {
        self.entries.iter().find(|e| e.label() == label)
    }

    /// Map progress to an absolute position, clamping progress into `0..=1`
    pub fn seek(&self, progress: f32) -> f32 {
        clamp_progress(progress) * self.total_duration
    }

    /// Progress and position together
    pub fn state_at(&self, progress: f32) -> PlaybackState {
        let progress = clamp_progress(progress);
        PlaybackState {
            progress,
            timeline_position: progress * self.total_duration,
        }
    }

    /// Index of the last entry starting at or before `position`
    pub fn index_at(&self, position: f32) -> Option<usize> {
        if position.is_nan() {
            return None;
        }
        // Start offsets are non-decreasing, so ties land on the later entry.
        let after = self.entries.partition_point(|e| e.start_offset <= position);
        after.checked_sub(1)
    }

    /// Entry showing at `position`
    pub fn entry_at(&self, position: f32) -> Option<&ReelEntry> {
        self.index_at(position).map(|i| &self.entries[i])
    }

    /// Label showing at `position`
    pub fn label_at(&self, position: f32) -> Option<&str> {
        self.entry_at(position).map(ReelEntry::label)
    }

    /// Start offsets, one per entry, in order
    pub fn snap_targets(&self) -> Vec<f32> {
        self.entries.iter().map(|e| e.start_offset).collect()
    }

    /// Entries whose span contains `position`
    pub fn active_at(&self, position: f32) -> impl Iterator<Item = &ReelEntry> {
        self.active_indices(position).into_iter().map(move |i| &self.entries[i])
    }

    pub(crate) fn active_indices(&self, position: f32) -> Vec<usize> {
        let total = self.total_duration;
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| {
                let end = e.end_offset();
                e.start_offset <= position && (position < end || (end >= total && position <= end))
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Cues crossed when moving from `from` to `to`.
    ///
    /// Moving forward reports cues in `(from, to]`, moving backward reports
    /// cues in `[to, from)`, each in travel order.
    pub fn cues_between(&self, from: f32, to: f32) -> Vec<CueHit<'_>> {
        if from.is_nan() || to.is_nan() || from == to {
            return Vec::new();
        }
        if to > from {
            self.collect_cues(|t| t > from && t <= to, false)
        } else {
            self.collect_cues(|t| t >= to && t < from, true)
        }
    }

    /// Cues at or before `position`, in reel order
    pub fn cues_through(&self, position: f32) -> Vec<CueHit<'_>> {
        self.collect_cues(|t| t <= position, false)
    }

    fn collect_cues(&self, hit: impl Fn(f32) -> bool, reverse: bool) -> Vec<CueHit<'_>> {
        let mut hits: Vec<CueHit<'_>> = self
            .entries
            .iter()
            .enumerate()
            .flat_map(|(entry_index, entry)| {
                entry.scene.cues().iter().map(move |cue| CueHit {
                    entry_index,
                    entry,
                    cue,
                    position: entry.start_offset + cue.at,
                })
            })
            .filter(|h| hit(h.position))
            .collect();

        // Stable sort keeps insertion order for simultaneous cues
        hits.sort_by(|a, b| a.position.total_cmp(&b.position));
        if reverse {
            hits.reverse();
        }
        hits
    }
}

fn clamp_progress(progress: f32) -> f32 {
    if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    }
}

/// Builds a [`Reel`] from scenes in narrative order
#[derive(Debug, Default)]
pub struct ReelSequencer {
    policy: OverlapPolicy,
    anchor: OverlapAnchor,
    reel: Reel,
}

impl ReelSequencer {
    /// Create a sequencer with an overlap policy
    pub fn new(policy: OverlapPolicy) -> Self {
        Self {
            policy,
            anchor: OverlapAnchor::default(),
            reel: Reel::default(),
        }
    }

    /// Choose which end time overlap is measured from
    pub fn with_anchor(mut self, anchor: OverlapAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Build a reel in one go
    pub fn build<'a>(scenes: impl IntoIterator<Item = &'a Scene>, policy: OverlapPolicy) -> Reel {
        let mut sequencer = Self::new(policy);
        sequencer.extend(scenes);
        sequencer.finish()
    }

    /// Append every scene in order
    pub fn extend<'a>(&mut self, scenes: impl IntoIterator<Item = &'a Scene>) {
        for scene in scenes {
            self.append(scene);
        }
    }

    /// Append one scene, returning its entry if it was placed
    pub fn append(&mut self, scene: &Scene) -> Option<&ReelEntry> {
        if !scene.is_playable() {
            tracing::debug!(label = scene.label(), "Scene not playable, leaving it off the reel");
            return None;
        }

        let start_offset = match self.reel.entries.last() {
            None => 0.0,
            Some(previous) => {
                let end = match self.anchor {
                    OverlapAnchor::RunningEnd => self.reel.total_duration,
                    OverlapAnchor::PreviousEnd => previous.end_offset(),
                };
                let overlap = self.policy.overlap_for(previous, scene);
                // Never earlier than the previous start, which is itself >= 0
                (end - overlap).max(0.0).max(previous.start_offset)
            }
        };

        let previous_total = self.reel.total_duration;
        self.reel.total_duration = previous_total.max(start_offset + scene.duration());
        debug_assert!(start_offset >= 0.0);
        debug_assert!(self.reel.total_duration >= previous_total);

        tracing::debug!(
            label = scene.label(),
            start_offset,
            total_duration = self.reel.total_duration,
            "Appended scene to reel"
        );

        self.reel.entries.push(ReelEntry {
            start_offset,
            scene: scene.clone(),
        });
        self.reel.entries.last()
    }

    /// Duration of the reel built so far
    pub fn total_duration(&self) -> f32 {
        self.reel.total_duration
    }

    /// Reel built so far
    pub fn reel(&self) -> &Reel {
        &self.reel
    }

    /// Freeze the reel
    pub fn finish(self) -> Reel {
        self.reel
    }
}
