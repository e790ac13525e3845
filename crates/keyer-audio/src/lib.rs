//! # keyer-audio
//!
//! Tone scheduling and playback engine for Keyer.
//!
//! Features:
//! - Sample-accurate scheduling against the audio clock, never wall time
//! - Low-latency cpal output with click-free envelope ramps
//! - Logical-clock backend for tests and headless hosts

pub mod player;
pub mod scheduler;

mod output;
mod synth;

pub use player::{MorsePlayer, PlayMode, PlayerConfig};
pub use scheduler::{ToneScheduler, PLAYBACK_EPSILON};
pub use synth::ToneParams;
