// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scroll simulation and reporting.
//!
//! A preview run builds the reel, drives it with a linear scroll gesture,
//! lets the scrub smoothing settle, then eases onto the snap target the
//! configuration asks for.

use crate::cli::{OutputFormat, RunArgs};
use crate::storyboard::{Storyboard, StoryboardError};
use scrollreel_sequencer::{
    ConfigError, PlaybackState, Reel, ReelConfig, ReelEvent, ReelPlayer, SceneRegistry,
    ScrollMapping,
};
use serde::Serialize;
use std::sync::Arc;

/// Upper bound on frames spent waiting for the scrub to settle
const SETTLE_SECONDS: f32 = 10.0;

/// Highest simulated frame rate
const MAX_FPS: f32 = 1000.0;

/// Preview error
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    /// Configuration could not be loaded
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Storyboard could not be loaded
    #[error("Storyboard error: {0}")]
    Storyboard(#[from] StoryboardError),

    /// Command line value out of range
    #[error("Invalid argument `{name}`: {reason}")]
    InvalidArgument {
        /// Argument name
        name: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// JSON output failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Scroll gesture to simulate
#[derive(Debug, Clone, Copy)]
pub struct Gesture {
    /// Frames the gesture lasts
    pub frames: u32,
    /// Frames per second
    pub fps: f32,
    /// Progress the gesture ends at
    pub scroll_to: f32,
}

impl Gesture {
    fn validate(&self) -> Result<(), PreviewError> {
        if !(self.fps > 0.0 && self.fps <= MAX_FPS) {
            return Err(PreviewError::InvalidArgument {
                name: "fps",
                reason: format!("must be in (0, {MAX_FPS}], got {}", self.fps),
            });
        }
        if !self.scroll_to.is_finite() {
            return Err(PreviewError::InvalidArgument {
                name: "scroll-to",
                reason: "must be a finite number".to_string(),
            });
        }
        Ok(())
    }
}

/// An event and the frame it happened on
#[derive(Debug, Clone, Serialize)]
pub struct FrameEvent {
    /// Frame index
    pub frame: u32,
    /// What happened
    #[serde(flatten)]
    pub event: ReelEvent,
}

/// One reel entry in the report
#[derive(Debug, Clone, Serialize)]
pub struct EntrySummary {
    /// Scene label
    pub label: String,
    /// Start offset in seconds
    pub start: f32,
    /// End offset in seconds
    pub end: f32,
    /// Number of cues
    pub cues: usize,
}

/// One refused scene in the report
#[derive(Debug, Clone, Serialize)]
pub struct SkippedSummary {
    /// Scene label
    pub label: String,
    /// Reason it was refused
    pub reason: String,
}

/// Result of a preview run
#[derive(Debug, Clone, Serialize)]
pub struct ReelSummary {
    /// Storyboard title
    pub title: String,
    /// Reel duration in seconds
    pub total_duration: f32,
    /// Scroll stage length in pixels
    pub scroll_length: f32,
    /// Placed scenes
    pub entries: Vec<EntrySummary>,
    /// Refused scenes
    pub skipped: Vec<SkippedSummary>,
    /// Events in the order they happened
    pub events: Vec<FrameEvent>,
    /// Where the reel ended up
    pub final_state: PlaybackState,
    /// Label showing at the end
    pub final_label: Option<String>,
    /// Snap target the run eased onto, as progress
    pub snap_target: Option<f32>,
    /// Frames simulated
    pub frames: u32,
}

/// Run the `run` subcommand
pub fn run(args: &RunArgs) -> Result<String, PreviewError> {
    let config = match &args.config {
        Some(path) => ReelConfig::load(path)?,
        None => ReelConfig::default(),
    };
    let storyboard = Storyboard::load(&args.storyboard)?;
    let gesture = Gesture {
        frames: args.frames,
        fps: args.fps,
        scroll_to: args.scroll_to,
    };

    let summary = preview(&storyboard, &config, gesture)?;
    match args.format {
        OutputFormat::Text => Ok(render_text(&summary)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&summary)?),
    }
}

/// Build the reel for a storyboard and simulate a gesture over it
pub fn preview(
    storyboard: &Storyboard,
    config: &ReelConfig,
    gesture: Gesture,
) -> Result<ReelSummary, PreviewError> {
    gesture.validate()?;

    let registry = storyboard.registry();
    let mut sequencer = config.overlap.sequencer();
    sequencer.extend(registry.all());
    let reel = Arc::new(sequencer.finish());
    tracing::info!(
        "Built reel: {} scenes, {:.2}s, {} skipped",
        reel.len(),
        reel.total_duration(),
        registry.skipped_count()
    );

    let mapping = ScrollMapping::for_reel(&reel, &config.scroll);
    let mut player = ReelPlayer::from_config(Arc::clone(&reel), config);
    let dt = 1.0 / gesture.fps;
    let target_scroll = mapping.scroll_offset(gesture.scroll_to);

    let mut events = Vec::new();
    let mut frame = 0u32;
    let mut step = |player: &mut ReelPlayer, target: f32, events: &mut Vec<FrameEvent>| {
        player.update(target, dt);
        events.extend(player.take_events().into_iter().map(|event| FrameEvent { frame, event }));
        frame += 1;
    };

    // Linear scroll from the top of the stage
    let gesture_frames = gesture.frames.max(1);
    for i in 0..=gesture_frames {
        let scroll = target_scroll * i as f32 / gesture_frames as f32;
        step(&mut player, mapping.progress(scroll), &mut events);
    }

    let settle_limit = (SETTLE_SECONDS * gesture.fps).ceil() as u32;
    let target = mapping.progress(target_scroll);
    for _ in 0..settle_limit {
        if player.is_settled() {
            break;
        }
        step(&mut player, target, &mut events);
    }

    let snap_target = if config.snap.enabled {
        player.snap_target(config.snap.direction)
    } else {
        None
    };
    if let Some(snap) = snap_target {
        tracing::info!(
            "Snapping to {:?} at progress {:.3}",
            reel.label_at(reel.seek(snap)),
            snap
        );
        for _ in 0..settle_limit {
            step(&mut player, snap, &mut events);
            if player.is_settled() {
                break;
            }
        }
    }

    Ok(summarize(storyboard, &registry, &reel, &mapping, &player, events, frame, snap_target))
}

fn summarize(
    storyboard: &Storyboard,
    registry: &SceneRegistry,
    reel: &Reel,
    mapping: &ScrollMapping,
    player: &ReelPlayer,
    events: Vec<FrameEvent>,
    frames: u32,
    snap_target: Option<f32>,
) -> ReelSummary {
    ReelSummary {
        title: storyboard.title.clone(),
        total_duration: reel.total_duration(),
        scroll_length: mapping.length(),
        entries: reel
            .entries()
            .iter()
            .map(|e| EntrySummary {
                label: e.label().to_string(),
                start: e.start_offset(),
                end: e.end_offset(),
                cues: e.scene().cues().len(),
            })
            .collect(),
        skipped: registry
            .skipped()
            .iter()
            .map(|s| SkippedSummary {
                label: s.label.clone(),
                reason: s.reason.to_string(),
            })
            .collect(),
        events,
        final_state: player.state(),
        final_label: player.current_label().map(str::to_string),
        snap_target,
        frames,
    }
}

/// Human readable report
pub fn render_text(summary: &ReelSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Reel {:?}: {} scenes, {:.2}s, {:.0}px of scroll\n",
        summary.title,
        summary.entries.len(),
        summary.total_duration,
        summary.scroll_length
    ));
    for entry in &summary.entries {
        out.push_str(&format!(
            "  {:<16} {:>7.2}s .. {:>7.2}s  cues: {}\n",
            entry.label, entry.start, entry.end, entry.cues
        ));
    }
    for skipped in &summary.skipped {
        out.push_str(&format!("  skipped {:?}: {}\n", skipped.label, skipped.reason));
    }

    out.push_str("Events:\n");
    for FrameEvent { frame, event } in &summary.events {
        let line = match event {
            ReelEvent::Enter { label } => format!("enter {label}"),
            ReelEvent::Exit { label } => format!("exit  {label}"),
            ReelEvent::Cue { label, cue, position } => format!("cue   {label}/{cue} @ {position:.2}s"),
        };
        out.push_str(&format!("  [{frame:>5}] {line}\n"));
    }

    out.push_str(&format!(
        "Final: progress {:.3}, position {:.2}s, label {}\n",
        summary.final_state.progress,
        summary.final_state.timeline_position,
        summary.final_label.as_deref().unwrap_or("-")
    ));
    if let Some(snap) = summary.snap_target {
        out.push_str(&format!("Snapped to progress {snap:.3}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storyboard() -> Storyboard {
        Storyboard::from_ron_str(
            r#"(
                title: "Gift Guide",
                scenes: [
                    (label: "hero", duration: 1.0, cues: [(name: "bridge_sweep", at: 0.9)]),
                    (label: "s63", duration: 2.0),
                    (label: "velvet", duration: 1.0, present: false),
                    (label: "watch", duration: 1.0),
                ],
            )"#,
        )
        .unwrap()
    }

    fn gesture() -> Gesture {
        Gesture {
            frames: 60,
            fps: 60.0,
            scroll_to: 1.0,
        }
    }

    #[test]
    fn test_full_scroll() {
        let summary = preview(&storyboard(), &ReelConfig::default(), gesture()).unwrap();

        assert_eq!(summary.total_duration, 4.0);
        assert_eq!(summary.scroll_length, 4.0 * 520.0);
        assert_eq!(summary.entries.len(), 3);
        assert_eq!(summary.skipped.len(), 1);
        // Scrolled to the end, then eased back onto the last label
        assert_eq!(summary.snap_target, Some(0.75));
        assert_eq!(summary.final_state.progress, 0.75);
        assert_eq!(summary.final_label.as_deref(), Some("watch"));

        let entered: Vec<_> = summary
            .events
            .iter()
            .filter_map(|e| match &e.event {
                ReelEvent::Enter { label } => Some(label.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(entered, ["hero", "s63", "watch"]);
        assert!(summary
            .events
            .iter()
            .any(|e| matches!(&e.event, ReelEvent::Cue { cue, .. } if cue == "bridge_sweep")));
    }

    #[test]
    fn test_partial_scroll_snaps_to_label() {
        let gesture = Gesture {
            scroll_to: 0.3,
            ..gesture()
        };
        let summary = preview(&storyboard(), &ReelConfig::default(), gesture).unwrap();
        // Labels sit at 0.0, 0.25 and 0.75; 0.3 snaps back to s63
        assert_eq!(summary.snap_target, Some(0.25));
        assert_eq!(summary.final_label.as_deref(), Some("s63"));
    }

    #[test]
    fn test_overlap_from_config() {
        let config = ReelConfig::from_ron_str("(overlap: (amount: 0.5), snap: (enabled: false))").unwrap();
        let summary = preview(&storyboard(), &config, gesture()).unwrap();
        let starts: Vec<_> = summary.entries.iter().map(|e| e.start).collect();
        assert_eq!(starts, vec![0.0, 0.5, 2.0]);
        assert_eq!(summary.snap_target, None);
    }

    #[test]
    fn test_rejects_bad_fps() {
        for fps in [0.0, -30.0, f32::NAN, 1.0e9, f32::INFINITY] {
            let gesture = Gesture { fps, ..gesture() };
            assert!(
                matches!(
                    preview(&storyboard(), &ReelConfig::default(), gesture),
                    Err(PreviewError::InvalidArgument { name: "fps", .. })
                ),
                "fps {fps}"
            );
        }
        let gesture = Gesture { fps: MAX_FPS, ..gesture() };
        assert!(preview(&storyboard(), &ReelConfig::default(), gesture).is_ok());
    }

    #[test]
    fn test_bundled_labels_snap_onto_themselves() {
        let storyboard = Storyboard::from_ron_str(include_str!("../storyboards/gift_guide.ron")).unwrap();
        let config = ReelConfig::from_ron_str(include_str!("../storyboards/reel.ron")).unwrap();
        let mut sequencer = config.overlap.sequencer();
        sequencer.extend(storyboard.registry().all());
        let reel = Arc::new(sequencer.finish());
        let mut player = ReelPlayer::from_config(Arc::clone(&reel), &config);

        for entry in reel.entries() {
            let label = entry.label();
            let target = reel.label_progress(label).unwrap();
            player.jump_to(target);
            assert_eq!(player.snap_target(config.snap.direction), Some(target), "{label}");

            // Ease onto the snap target the way a host would
            player.jump_to(0.0);
            for _ in 0..10_000 {
                player.update(target, 1.0 / 60.0);
                if player.is_settled() {
                    break;
                }
            }
            assert!(player.is_settled(), "{label}");
            assert_eq!(player.current_label(), Some(label), "{label}");
        }
    }

    #[test]
    fn test_text_and_json_output() {
        let summary = preview(&storyboard(), &ReelConfig::default(), gesture()).unwrap();
        let text = render_text(&summary);
        assert!(text.starts_with("Reel \"Gift Guide\": 3 scenes"));
        assert!(text.contains("skipped \"velvet\": Scene has no render handle"));

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["entries"][1]["label"], "s63");
        assert_eq!(json["events"][0]["kind"], "enter");
    }
}
