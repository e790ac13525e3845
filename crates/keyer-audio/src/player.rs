//! Playback control over a [`ToneScheduler`].
//!
//! [`MorsePlayer`] is the piece an interactive host talks to: `play` turns
//! text into scheduled tones, `tick` (called once per frame) follows the
//! audio clock to keep letter and symbol highlights honest, and the run
//! winds itself down once the scheduler goes quiet. During a gap the
//! current letter keeps its highlight while the symbol loses it, which is
//! what makes the rhythm readable on screen.

#![allow(clippy::unwrap_used)] // Tests use unwrap for brevity

use crossbeam_channel::Receiver;
use keyer_core::{build_timeline, event_at_time, timeline_duration, Result, TimelineEvent};
use tracing::debug;

use crate::scheduler::ToneScheduler;

/// What a `play` call does when a run is already sounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayMode {
    /// Cancel the current run and start over.
    #[default]
    Replace,
    /// Queue the new text after the current timeline's end.
    Append,
}

/// Player knobs fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerConfig {
    /// Keying speed in words per minute (PARIS standard).
    pub wpm: u32,
    /// Behavior of `play` while a run is active.
    pub mode: PlayMode,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            wpm: 20,
            mode: PlayMode::Replace,
        }
    }
}

/// Drives one playback lane: text in, tones out, highlight indices kept in
/// step with the audio clock.
pub struct MorsePlayer {
    scheduler: ToneScheduler,
    config: PlayerConfig,
    timeline: Vec<TimelineEvent>,
    session_start: Option<f64>,
    completion: Option<Receiver<()>>,
    playing: bool,
    letter_index: Option<usize>,
    symbol_index: Option<usize>,
}

impl MorsePlayer {
    pub const fn new(scheduler: ToneScheduler, config: PlayerConfig) -> Self {
        Self {
            scheduler,
            config,
            timeline: Vec::new(),
            session_start: None,
            completion: None,
            playing: false,
            letter_index: None,
            symbol_index: None,
        }
    }

    /// Plays `text` as Morse tones.
    ///
    /// Blank text stops playback. In [`PlayMode::Append`] with a run still
    /// sounding, the new events are shifted past the current timeline's end
    /// and join that run; they keep their own letter and symbol indices,
    /// and the playback window stays the original run's. Otherwise the
    /// current run is cancelled and a fresh session starts at the clock's
    /// present position.
    pub fn play(&mut self, text: &str) -> Result<()> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            self.stop();
            return Ok(());
        }

        let mut events = build_timeline(trimmed, self.config.wpm);

        if self.config.mode == PlayMode::Append
            && !self.timeline.is_empty()
            && self.scheduler.is_playing()
        {
            let offset = timeline_duration(&self.timeline);
            for event in &mut events {
                event.start_time += offset;
            }
            debug!("Appending {} events at {offset:.3}s", events.len());
            self.scheduler.resume()?;
            if let Some(session_start) = self.session_start {
                for event in &events {
                    self.scheduler
                        .schedule_tone(session_start + event.start_time, event.duration);
                }
            }
            self.timeline.extend(events);
            self.playing = true;
            return Ok(());
        }

        self.scheduler.stop();
        self.timeline = events;
        self.scheduler.resume()?;
        self.session_start = Some(self.scheduler.now());
        self.completion = Some(self.scheduler.schedule_timeline(&self.timeline)?);
        self.playing = true;
        Ok(())
    }

    /// Stops playback and clears the timeline and highlights. Safe to call
    /// when nothing is playing.
    pub fn stop(&mut self) {
        self.scheduler.stop();
        self.playing = false;
        self.letter_index = None;
        self.symbol_index = None;
        self.timeline.clear();
        self.session_start = None;
        self.completion = None;
    }

    /// Advances the highlight state one frame.
    ///
    /// Indices update first, then the run is checked for its end, so the
    /// final tone of a run still gets its moment on screen. When the run
    /// ends the symbol highlight clears but the last letter keeps its
    /// highlight until the next `play` or `stop`.
    pub fn tick(&mut self) {
        if !self.playing {
            return;
        }
        let Some(session_start) = self.session_start else {
            return;
        };

        let elapsed = self.scheduler.now() - session_start;
        if let Some(event) = event_at_time(&self.timeline, elapsed) {
            self.letter_index = Some(event.letter_index);
            self.symbol_index = Some(event.symbol_index);
        } else {
            // Between tones: the letter keeps its highlight.
            self.symbol_index = None;
        }

        let completed = self
            .completion
            .as_ref()
            .is_some_and(|done| done.try_recv().is_ok());
        if completed || !self.scheduler.is_playing() {
            self.playing = false;
            self.symbol_index = None;
            self.completion = None;
        }
    }

    /// Advances the underlying logical clock; ignored on a live stream.
    pub fn advance(&mut self, seconds: f64) {
        self.scheduler.advance(seconds);
    }

    /// Stops playback and releases the audio backend.
    pub fn cleanup(&mut self) {
        self.stop();
        self.scheduler.cleanup();
    }

    /// True from a successful `play` until the run ends or is stopped.
    pub const fn is_playing(&self) -> bool {
        self.playing
    }

    /// Timeline index of the letter currently sounding or being spelled.
    pub const fn letter_index(&self) -> Option<usize> {
        self.letter_index
    }

    /// Index of the symbol currently sounding within its letter, if a tone
    /// is active right now.
    pub const fn symbol_index(&self) -> Option<usize> {
        self.symbol_index
    }

    /// The events scheduled for the current session, appends included.
    pub fn timeline(&self) -> &[TimelineEvent] {
        &self.timeline
    }

    pub const fn config(&self) -> &PlayerConfig {
        &self.config
    }
}
