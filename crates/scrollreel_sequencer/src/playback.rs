// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-frame playback over a built reel.
//!
//! The reel itself is stateless. Everything that depends on where the
//! playhead *was* (scrub smoothing, cue crossings, scene enter/exit) lives
//! here, in the driver the host calls once per frame.

use crate::config::ReelConfig;
use crate::reel::{CueHit, PlaybackState, Reel, ReelEntry};
use crate::scroll::Scrubber;
use crate::snap::SnapDirection;
use serde::Serialize;
use std::sync::Arc;

/// Execution substrate that shows the reel at an absolute position
pub trait AnimationEngine {
    /// Total duration the engine can show
    fn duration(&self) -> f32;

    /// Show the reel at an absolute position
    fn seek(&mut self, position: f32);
}

/// Engine that drives scene handles directly.
///
/// Every scene whose span was swept since the previous seek is rendered at
/// its clamped local time, so scenes jumped over settle at their end or
/// start state. The first seek renders every scene.
#[derive(Debug)]
pub struct SceneEngine {
    reel: Arc<Reel>,
    last_position: Option<f32>,
}

impl SceneEngine {
    /// Create an engine for a reel
    pub fn new(reel: Arc<Reel>) -> Self {
        Self {
            reel,
            last_position: None,
        }
    }
}

impl AnimationEngine for SceneEngine {
    fn duration(&self) -> f32 {
        self.reel.total_duration()
    }

    fn seek(&mut self, position: f32) {
        let (low, high) = match self.last_position {
            None => (f32::NEG_INFINITY, f32::INFINITY),
            Some(previous) => (previous.min(position), previous.max(position)),
        };

        for entry in self.reel.entries() {
            if entry.end_offset() < low || entry.start_offset() > high {
                continue;
            }
            if let Some(handle) = entry.handle() {
                handle.render_at(entry.local_time(position));
            }
        }

        self.last_position = Some(position);
    }
}

/// Something that happened on the reel during a frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReelEvent {
    /// Playhead entered a scene span
    Enter {
        /// Scene label
        label: String,
    },
    /// Playhead left a scene span
    Exit {
        /// Scene label
        label: String,
    },
    /// Playhead crossed a cue
    Cue {
        /// Scene label
        label: String,
        /// Cue name
        cue: String,
        /// Absolute reel position of the cue
        position: f32,
    },
}

// Order of crossings that share a position
const EARLY_CUE_RANK: u8 = 0;
const EXIT_RANK: u8 = 1;
const ENTER_RANK: u8 = 2;
const LATE_CUE_RANK: u8 = 3;

/// Something the playhead passed during one frame
struct Crossing<'a> {
    position: f32,
    rank: u8,
    kind: CrossingKind<'a>,
}

enum CrossingKind<'a> {
    Exit(&'a ReelEntry),
    Enter(&'a ReelEntry),
    Cue(CueHit<'a>),
}

impl<'a> Crossing<'a> {
    fn new(position: f32, rank: u8, kind: CrossingKind<'a>) -> Self {
        Self { position, rank, kind }
    }
}

impl CrossingKind<'_> {
    /// Call the scene hook and describe what happened
    fn fire(self) -> ReelEvent {
        match self {
            Self::Exit(entry) => {
                if let Some(handle) = entry.handle() {
                    handle.on_exit();
                }
                ReelEvent::Exit {
                    label: entry.label().to_string(),
                }
            }
            Self::Enter(entry) => {
                if let Some(handle) = entry.handle() {
                    handle.on_enter();
                }
                ReelEvent::Enter {
                    label: entry.label().to_string(),
                }
            }
            Self::Cue(hit) => {
                if let Some(handle) = hit.entry.handle() {
                    handle.on_cue(&hit.cue.name);
                }
                ReelEvent::Cue {
                    label: hit.entry.label().to_string(),
                    cue: hit.cue.name.clone(),
                    position: hit.position,
                }
            }
        }
    }
}

/// Drives a reel from scroll progress, one frame at a time
pub struct ReelPlayer<E: AnimationEngine = SceneEngine> {
    reel: Arc<Reel>,
    engine: E,
    scrubber: Scrubber,
    state: PlaybackState,
    last_position: Option<f32>,
    active: Vec<usize>,
    /// Events produced this frame
    pending_events: Vec<ReelEvent>,
}

impl ReelPlayer<SceneEngine> {
    /// Create a player rendering scene handles directly
    pub fn new(reel: Arc<Reel>, scrub_lag: f32) -> Self {
        let engine = SceneEngine::new(Arc::clone(&reel));
        Self::with_engine(reel, engine, scrub_lag)
    }

    /// Create a player from a configuration
    pub fn from_config(reel: Arc<Reel>, config: &ReelConfig) -> Self {
        Self::new(reel, config.scroll.scrub_lag)
    }
}

impl<E: AnimationEngine> ReelPlayer<E> {
    /// Create a player on top of a custom engine
    pub fn with_engine(reel: Arc<Reel>, engine: E, scrub_lag: f32) -> Self {
        debug_assert!(
            (engine.duration() - reel.total_duration()).abs() <= f32::EPSILON * reel.total_duration().max(1.0),
            "engine and reel disagree on duration"
        );
        Self {
            reel,
            engine,
            scrubber: Scrubber::new(scrub_lag),
            state: PlaybackState::default(),
            last_position: None,
            active: Vec::new(),
            pending_events: Vec::new(),
        }
    }

    /// Advance one frame toward the driver's progress
    pub fn update(&mut self, target_progress: f32, delta_time: f32) -> PlaybackState {
        let progress = self.scrubber.update(target_progress, delta_time);
        self.apply(progress)
    }

    /// Jump to a progress value without smoothing
    pub fn jump_to(&mut self, progress: f32) -> PlaybackState {
        self.scrubber.reset(progress);
        self.apply(self.scrubber.current())
    }

    /// Jump to the start of a labelled scene.
    ///
    /// Lands exactly on the entry's start offset so the label is showing
    /// even when `progress * total` rounds just short of it.
    pub fn jump_to_label(&mut self, label: &str) -> Option<PlaybackState> {
        let start = self.reel.entry(label)?.start_offset();
        let progress = self.reel.progress_of(start);
        self.scrubber.reset(progress);
        Some(self.apply_state(PlaybackState {
            progress,
            timeline_position: start,
        }))
    }

    fn apply(&mut self, progress: f32) -> PlaybackState {
        let state = self.reel.state_at(progress);
        self.apply_state(state)
    }

    fn apply_state(&mut self, state: PlaybackState) -> PlaybackState {
        self.state = state;
        let position = state.timeline_position;
        self.engine.seek(position);

        let now_active = self.reel.active_indices(position);
        let entries = self.reel.entries();
        let forward = self.last_position.map_or(true, |previous| position >= previous);

        let mut crossings = Vec::new();
        for &index in self.active.iter().filter(|i| !now_active.contains(*i)) {
            let entry = &entries[index];
            let at = if forward { entry.end_offset() } else { entry.start_offset() };
            crossings.push(Crossing::new(at, EXIT_RANK, CrossingKind::Exit(entry)));
        }
        for &index in now_active.iter().filter(|i| !self.active.contains(*i)) {
            let entry = &entries[index];
            let at = if forward { entry.start_offset() } else { entry.end_offset() };
            crossings.push(Crossing::new(at, ENTER_RANK, CrossingKind::Enter(entry)));
        }

        let hits = match self.last_position {
            None => self.reel.cues_through(position),
            Some(previous) => self.reel.cues_between(previous, position),
        };
        for hit in hits {
            // A cue on a scene boundary belongs to its scene: after the
            // scene is entered and before it is left.
            let at_scene_start = hit.cue.at <= 0.0;
            let rank = if at_scene_start == forward { LATE_CUE_RANK } else { EARLY_CUE_RANK };
            crossings.push(Crossing::new(hit.position, rank, CrossingKind::Cue(hit)));
        }

        crossings.sort_by(|a, b| {
            let by_position = if forward {
                a.position.total_cmp(&b.position)
            } else {
                b.position.total_cmp(&a.position)
            };
            by_position.then(a.rank.cmp(&b.rank))
        });
        self.pending_events
            .extend(crossings.into_iter().map(|crossing| crossing.kind.fire()));

        tracing::trace!(
            progress = self.state.progress,
            position,
            label = self.reel.label_at(position),
            "Reel frame"
        );

        self.active = now_active;
        self.last_position = Some(position);
        self.state
    }

    /// Get pending events and clear them
    pub fn take_events(&mut self) -> Vec<ReelEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Current playback state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Label showing at the current position
    pub fn current_label(&self) -> Option<&str> {
        self.reel.label_at(self.state.timeline_position)
    }

    /// Labels of every scene currently on screen
    pub fn active_labels(&self) -> Vec<&str> {
        self.active
            .iter()
            .map(|&i| self.reel.entries()[i].label())
            .collect()
    }

    /// Progress an external snapping mechanism should ease toward
    pub fn snap_target(&self, direction: SnapDirection) -> Option<f32> {
        self.reel.snap_progress(self.state.progress, direction)
    }

    /// Whether smoothing has caught up with the driver
    pub fn is_settled(&self) -> bool {
        self.scrubber.is_settled()
    }

    /// The reel being played
    pub fn reel(&self) -> &Arc<Reel> {
        &self.reel
    }

    /// The underlying engine
    pub fn engine(&self) -> &E {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlap::OverlapPolicy;
    use crate::reel::ReelSequencer;
    use crate::scene::tests::RecordingHandle;
    use crate::scene::Scene;

    fn recorded(label: &str, duration: f32) -> (Scene, Arc<RecordingHandle>) {
        let handle = Arc::new(RecordingHandle::default());
        (Scene::new(label, duration, handle.clone()), handle)
    }

    /// Engine that only remembers where it was told to go
    #[derive(Default)]
    struct SeekLog {
        duration: f32,
        seeks: Vec<f32>,
    }

    impl AnimationEngine for SeekLog {
        fn duration(&self) -> f32 {
            self.duration
        }

        fn seek(&mut self, position: f32) {
            self.seeks.push(position);
        }
    }

    fn abc() -> Arc<Reel> {
        let (a, _) = recorded("A", 2.0);
        let (b, _) = recorded("B", 3.0);
        let (c, _) = recorded("C", 1.0);
        Arc::new(ReelSequencer::build(&[a, b, c], OverlapPolicy::fixed(0.5)))
    }

    #[test]
    fn test_engine_receives_clamped_positions() {
        let reel = abc();
        let engine = SeekLog {
            duration: reel.total_duration(),
            ..SeekLog::default()
        };
        let mut player = ReelPlayer::with_engine(reel, engine, 0.0);

        player.update(0.5, 0.016);
        player.update(1.4, 0.016);
        player.update(-3.0, 0.016);
        assert_eq!(player.engine().seeks, vec![2.5, 5.0, 0.0]);
    }

    #[test]
    fn test_enter_exit_events() {
        let mut player = ReelPlayer::new(abc(), 0.0);

        player.update(0.0, 0.016);
        assert_eq!(player.take_events(), vec![ReelEvent::Enter { label: "A".into() }]);

        // 2.5 seconds: B came in at 1.5, A finished at 2.0
        player.update(0.5, 0.016);
        assert_eq!(
            player.take_events(),
            vec![
                ReelEvent::Enter { label: "B".into() },
                ReelEvent::Exit { label: "A".into() },
            ]
        );
        assert_eq!(player.current_label(), Some("B"));
        assert_eq!(player.active_labels(), ["B"]);

        // Same progress again: nothing new happens
        player.update(0.5, 0.016);
        assert!(player.take_events().is_empty());
    }

    #[test]
    fn test_hooks_and_cues_fire_on_handles() {
        let (hero, hero_handle) = recorded("hero", 1.0);
        let hero = hero.with_cue("chime_hi", 0.9);
        let (s63, s63_handle) = recorded("s63", 2.0);
        let reel = Arc::new(ReelSequencer::build(&[hero, s63], OverlapPolicy::None));
        let mut player = ReelPlayer::new(reel, 0.0);

        player.update(0.0, 0.016);
        player.update(0.5, 0.016);

        let hero_calls = hero_handle.calls();
        assert_eq!(hero_calls, ["render 0", "enter", "render 1", "cue chime_hi", "exit"]);

        let s63_calls = s63_handle.calls();
        assert!(s63_calls.contains(&"render 0.5".to_string()));
        assert!(s63_calls.contains(&"enter".to_string()));
    }

    #[test]
    fn test_events_follow_occurrence_order() {
        let (x, x_handle) = recorded("x", 1.0);
        let x = x.with_cue("particles_on", 0.5);
        let (y, _) = recorded("y", 1.0);
        let reel = Arc::new(ReelSequencer::build(&[x, y], OverlapPolicy::None));
        let mut player = ReelPlayer::new(reel, 0.0);

        player.update(0.1, 0.016);
        player.take_events();

        // One frame from 0.2s to 1.5s passes the cue, then the end of x
        player.update(0.75, 0.016);
        assert_eq!(
            player.take_events(),
            vec![
                ReelEvent::Cue {
                    label: "x".into(),
                    cue: "particles_on".into(),
                    position: 0.5,
                },
                ReelEvent::Exit { label: "x".into() },
                ReelEvent::Enter { label: "y".into() },
            ]
        );
        assert_eq!(x_handle.calls(), ["render 0.2", "enter", "render 1", "cue particles_on", "exit"]);

        // Back again: y leaves, x comes in, then the cue
        player.update(0.1, 0.016);
        assert_eq!(
            player.take_events(),
            vec![
                ReelEvent::Exit { label: "y".into() },
                ReelEvent::Enter { label: "x".into() },
                ReelEvent::Cue {
                    label: "x".into(),
                    cue: "particles_on".into(),
                    position: 0.5,
                },
            ]
        );
    }

    #[test]
    fn test_boundary_cues_stay_inside_their_scene() {
        let (x, _) = recorded("x", 1.0);
        let x = x.with_cue("last", 1.0);
        let (y, _) = recorded("y", 1.0);
        let y = y.with_cue("first", 0.0);
        let reel = Arc::new(ReelSequencer::build(&[x, y], OverlapPolicy::None));
        let mut player = ReelPlayer::new(reel, 0.0);

        player.update(0.25, 0.016);
        player.take_events();
        player.update(0.75, 0.016);
        let cue = |label: &str, cue: &str| ReelEvent::Cue {
            label: label.into(),
            cue: cue.into(),
            position: 1.0,
        };
        assert_eq!(
            player.take_events(),
            vec![
                cue("x", "last"),
                ReelEvent::Exit { label: "x".into() },
                ReelEvent::Enter { label: "y".into() },
                cue("y", "first"),
            ]
        );
    }

    #[test]
    fn test_cues_fire_backward_too() {
        let (hero, _) = recorded("hero", 1.0);
        let hero = hero.with_cue("sweep", 0.5);
        let (tail, _) = recorded("tail", 1.0);
        let reel = Arc::new(ReelSequencer::build(&[hero, tail], OverlapPolicy::None));
        let mut player = ReelPlayer::new(reel, 0.0);

        player.update(1.0, 0.016);
        let forward = player.take_events();
        assert!(forward.contains(&ReelEvent::Cue {
            label: "hero".into(),
            cue: "sweep".into(),
            position: 0.5,
        }));

        player.update(0.0, 0.016);
        let backward = player.take_events();
        assert_eq!(
            backward.iter().filter(|e| matches!(e, ReelEvent::Cue { .. })).count(),
            1
        );
    }

    #[test]
    fn test_smoothing_trails_driver() {
        let mut player = ReelPlayer::new(abc(), 0.6);
        player.update(0.0, 0.016);
        let state = player.update(1.0, 0.016);
        assert!(state.progress < 0.1);
        assert!(!player.is_settled());

        let jumped = player.jump_to(1.0);
        assert_eq!(jumped.timeline_position, 5.0);
        assert!(player.is_settled());
    }

    #[test]
    fn test_jump_to_label_and_snap() {
        let mut player = ReelPlayer::new(abc(), 0.6);
        let state = player.jump_to_label("B").unwrap();
        assert_eq!(state.timeline_position, 1.5);
        assert_eq!(player.current_label(), Some("B"));
        assert!(player.jump_to_label("missing").is_none());

        assert_eq!(player.snap_target(SnapDirection::Forward), Some(0.8));
        assert_eq!(player.snap_target(SnapDirection::Backward), Some(0.0));
    }

    #[test]
    fn test_empty_reel_plays_safely() {
        let mut player = ReelPlayer::new(Arc::new(Reel::default()), 0.6);
        let state = player.update(0.7, 0.016);
        assert_eq!(state.timeline_position, 0.0);
        assert_eq!(player.current_label(), None);
        assert!(player.take_events().is_empty());
        assert_eq!(player.snap_target(SnapDirection::Nearest), None);
    }
}
