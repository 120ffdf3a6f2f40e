// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scroll-driven reel sequencer.
//!
//! This crate turns a list of scenes into one continuous timeline that a
//! scroll position scrubs through:
//! - Scene registration with graceful skipping of missing content
//! - Reel construction with configurable overlap
//! - Progress to timeline mapping
//! - Labels and snap checkpoints
//! - Cue and enter/exit events during playback
//!
//! ## Architecture
//!
//! The sequencer is built on:
//! - An insertion-ordered [`SceneRegistry`]
//! - An immutable [`Reel`] produced by [`ReelSequencer`]
//! - A per-frame [`ReelPlayer`] driving an [`AnimationEngine`]
//! - RON configuration via [`ReelConfig`]

pub mod scene;
pub mod registry;
pub mod overlap;
pub mod reel;
pub mod snap;
pub mod scroll;
pub mod config;
pub mod playback;
pub mod ui;

pub use scene::{Cue, Scene, SceneHandle};
pub use registry::{RegistrationRejected, SceneRegistry, SkippedScene};
pub use overlap::{OverlapAnchor, OverlapFn, OverlapPolicy};
pub use reel::{CueHit, PlaybackState, Reel, ReelEntry, ReelSequencer};
pub use snap::SnapDirection;
pub use scroll::{ScrollMapping, Scrubber};
pub use config::{ConfigError, OverlapConfig, ReelConfig, ScrollConfig, SnapConfig};
pub use playback::{AnimationEngine, ReelEvent, ReelPlayer, SceneEngine};
pub use ui::ReelOverlay;
