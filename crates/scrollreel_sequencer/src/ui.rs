// SPDX-License-Identifier: MIT OR Apache-2.0
//! Diagnostic overlay for a reel.
//!
//! Features:
//! - One lane per entry, spanning its start and end offsets
//! - Cue dots and snap ticks
//! - Playhead and current label readout
//! - Click to jump to the nearest label

use crate::reel::{PlaybackState, Reel};
use egui::{Color32, Pos2, Rect, Sense, Stroke, Vec2};

const LANE_HEIGHT: f32 = 14.0;
const LANE_GAP: f32 = 2.0;
const HEADER_HEIGHT: f32 = 18.0;
const SNAP_TICK_HEIGHT: f32 = 6.0;
const CUE_RADIUS: f32 = 2.5;
const PLAYHEAD_WIDTH: f32 = 2.0;
const MIN_WIDTH: f32 = 120.0;

const LANE_COLORS: [[u8; 3]; 6] = [
    [100, 150, 255],
    [150, 255, 100],
    [255, 200, 100],
    [200, 100, 255],
    [255, 100, 150],
    [100, 220, 220],
];

/// Read-only reel overlay
#[derive(Debug, Clone)]
pub struct ReelOverlay {
    /// Draw cue dots
    pub show_cues: bool,
    /// Draw snap ticks in the header
    pub show_snap_ticks: bool,
}

impl Default for ReelOverlay {
    fn default() -> Self {
        Self {
            show_cues: true,
            show_snap_ticks: true,
        }
    }
}

impl ReelOverlay {
    /// Create an overlay with everything turned on
    pub fn new() -> Self {
        Self::default()
    }

    /// Height the overlay needs for a reel
    pub fn height_for(reel: &Reel) -> f32 {
        HEADER_HEIGHT + reel.len().max(1) as f32 * (LANE_HEIGHT + LANE_GAP)
    }

    /// Paint the overlay, returning the progress of a clicked label
    pub fn ui(&self, ui: &mut egui::Ui, reel: &Reel, state: &PlaybackState) -> Option<f32> {
        let size = Vec2::new(ui.available_width().max(MIN_WIDTH), Self::height_for(reel));
        let (rect, response) = ui.allocate_exact_size(size, Sense::click());
        let painter = ui.painter_at(rect);

        painter.rect_filled(rect, 0.0, Color32::from_gray(30));

        let total = reel.total_duration();
        let time_to_x = |time: f32| {
            if total > 0.0 {
                rect.min.x + (time / total).clamp(0.0, 1.0) * rect.width()
            } else {
                rect.min.x
            }
        };

        // Header
        let header = Rect::from_min_size(rect.min, Vec2::new(rect.width(), HEADER_HEIGHT));
        painter.rect_filled(header, 0.0, Color32::from_gray(40));
        let readout = match reel.label_at(state.timeline_position) {
            Some(label) => format!("{label}  {:.2}s / {:.2}s", state.timeline_position, total),
            None => "empty reel".to_string(),
        };
        painter.text(
            Pos2::new(header.min.x + 4.0, header.min.y + 3.0),
            egui::Align2::LEFT_TOP,
            readout,
            egui::FontId::monospace(10.0),
            Color32::from_gray(180),
        );

        if self.show_snap_ticks {
            for target in reel.snap_targets() {
                let x = time_to_x(target);
                painter.line_segment(
                    [Pos2::new(x, header.max.y - SNAP_TICK_HEIGHT), Pos2::new(x, header.max.y)],
                    Stroke::new(1.0, Color32::from_gray(160)),
                );
            }
        }

        // Lanes
        for (index, entry) in reel.entries().iter().enumerate() {
            let top = header.max.y + index as f32 * (LANE_HEIGHT + LANE_GAP) + LANE_GAP;
            let lane = Rect::from_min_max(
                Pos2::new(time_to_x(entry.start_offset()), top),
                Pos2::new(time_to_x(entry.end_offset()), top + LANE_HEIGHT),
            );
            let [r, g, b] = LANE_COLORS[index % LANE_COLORS.len()];
            let active = entry.start_offset() <= state.timeline_position
                && state.timeline_position <= entry.end_offset();
            let alpha = if active { 220 } else { 110 };

            painter.rect_filled(lane, 2.0, Color32::from_rgba_unmultiplied(r, g, b, alpha));
            painter.text(
                Pos2::new(lane.min.x + 3.0, lane.center().y),
                egui::Align2::LEFT_CENTER,
                entry.label(),
                egui::FontId::proportional(10.0),
                Color32::BLACK,
            );

            if self.show_cues {
                for cue in entry.scene().cues() {
                    let x = time_to_x(entry.start_offset() + cue.at);
                    painter.circle_filled(Pos2::new(x, lane.max.y - CUE_RADIUS), CUE_RADIUS, Color32::WHITE);
                }
            }
        }

        // Playhead
        let playhead_x = time_to_x(state.timeline_position);
        painter.line_segment(
            [Pos2::new(playhead_x, rect.min.y), Pos2::new(playhead_x, rect.max.y)],
            Stroke::new(PLAYHEAD_WIDTH, Color32::from_rgb(255, 80, 80)),
        );

        if response.clicked() {
            let pointer = response.interact_pointer_pos()?;
            let progress = ((pointer.x - rect.min.x) / rect.width()).clamp(0.0, 1.0);
            return reel.nearest_snap(progress);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlap::OverlapPolicy;
    use crate::reel::ReelSequencer;
    use crate::scene::tests::scene;

    fn run_overlay(reel: &Reel, state: PlaybackState) -> Option<f32> {
        let ctx = egui::Context::default();
        let overlay = ReelOverlay::new();
        let mut clicked = None;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                clicked = overlay.ui(ui, reel, &state);
            });
        });
        clicked
    }

    #[test]
    fn test_height_grows_with_entries() {
        let scenes = [scene("A", 2.0), scene("B", 3.0), scene("C", 1.0)];
        let reel = ReelSequencer::build(&scenes, OverlapPolicy::fixed(0.5));
        assert_eq!(ReelOverlay::height_for(&reel), HEADER_HEIGHT + 3.0 * (LANE_HEIGHT + LANE_GAP));
        assert_eq!(ReelOverlay::height_for(&Reel::default()), HEADER_HEIGHT + LANE_HEIGHT + LANE_GAP);
    }

    #[test]
    fn test_paints_without_input() {
        let scenes = [scene("hero", 1.0).with_cue("chime", 0.5), scene("s63", 2.0)];
        let reel = ReelSequencer::build(&scenes, OverlapPolicy::None);
        assert_eq!(run_overlay(&reel, reel.state_at(0.4)), None);
    }

    #[test]
    fn test_paints_empty_reel() {
        let reel = Reel::default();
        assert_eq!(run_overlay(&reel, reel.state_at(0.5)), None);
    }
}
