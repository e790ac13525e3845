//! # keyer-core
//!
//! Alphabet tables, timeline building, and error handling for the Keyer
//! Morse playback engine. Everything here is pure and audio-free.

pub mod alphabet;
pub mod error;
pub mod timeline;
pub mod translate;

pub use error::{Error, Result};
pub use timeline::{build_timeline, event_at_time, timeline_duration, TimelineEvent, ToneKind};
pub use translate::{translate, TranslatedLetter, TranslatedWord};
