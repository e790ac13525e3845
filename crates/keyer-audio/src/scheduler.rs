//! Tone scheduling against an audio-clock frame counter.
//!
//! [`ToneScheduler`] owns at most one output backend: either a live cpal
//! stream whose callback drives the clock, or a [`LogicalClock`] advanced
//! by hand for tests and headless hosts. All absolute times are seconds on
//! that clock; wall time never enters the picture, so scheduled tones and
//! anything polling [`ToneScheduler::now`] share a single time base.

#![allow(clippy::unwrap_used)] // Tests use unwrap for brevity

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender};
use keyer_core::{timeline_duration, Result, TimelineEvent};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::output::StreamOutput;
use crate::synth::{ScheduledTone, ToneParams, ToneSynth};

/// Tolerance past the scheduled end within which [`ToneScheduler::is_playing`]
/// still reports true, absorbing release-tail jitter. Must stay non-negative.
pub const PLAYBACK_EPSILON: f64 = 0.05;

/// Delay between the last tone's scheduled end and the completion
/// notification.
const COMPLETION_GRACE: f64 = 0.1;

/// Block size used when advancing a logical clock.
const LOGICAL_BLOCK_FRAMES: u64 = 512;

/// Completion hand-off for one scheduled run.
struct PendingCompletion {
    deadline_frame: u64,
    tx: Sender<()>,
}

/// Tones and completion for the current run, guarded by one lock so a
/// stop empties both in a single critical section.
#[derive(Default)]
struct ActiveState {
    tones: Vec<ScheduledTone>,
    completion: Option<PendingCompletion>,
}

/// State shared between a [`ToneScheduler`] handle and its render path.
pub(crate) struct SchedulerShared {
    sample_rate: u32,
    clock_frames: AtomicU64,
    active: Mutex<ActiveState>,
}

impl SchedulerShared {
    pub(crate) fn new(sample_rate: u32) -> Arc<Self> {
        Arc::new(Self {
            sample_rate,
            clock_frames: AtomicU64::new(0),
            active: Mutex::new(ActiveState::default()),
        })
    }

    /// Seconds of audio rendered since the backend was created.
    fn now_seconds(&self) -> f64 {
        self.clock_frames.load(Ordering::Acquire) as f64 / f64::from(self.sample_rate)
    }

    /// Converts seconds on this clock to a frame count.
    fn frames(&self, seconds: f64) -> u64 {
        (seconds * f64::from(self.sample_rate)).round() as u64
    }

    /// Renders one block: tones mixed into `out`, finished tones retired,
    /// a due completion fired, and the clock advanced by `out.len()`.
    ///
    /// Called from exactly one place per backend (the cpal callback or
    /// [`LogicalClock::advance`]), which makes it the clock's only writer.
    pub(crate) fn render_block(&self, synth: &mut ToneSynth, out: &mut [f32]) {
        let start = self.clock_frames.load(Ordering::Acquire);
        let end = start + out.len() as u64;

        let mut active = self.active.lock();
        synth.render(start, &active.tones, out);
        active.tones.retain(|tone| !tone.is_finished(end));
        let due = active
            .completion
            .as_ref()
            .is_some_and(|completion| end >= completion.deadline_frame);
        if due {
            if let Some(completion) = active.completion.take() {
                let _ = completion.tx.try_send(());
            }
        }
        drop(active);

        self.clock_frames.store(end, Ordering::Release);
    }
}

/// Manually advanced stand-in for a live output stream.
///
/// `advance` renders through the same path as the cpal callback, so
/// timing, cancellation, and completion behave identically without audio
/// hardware.
struct LogicalClock {
    shared: Arc<SchedulerShared>,
    synth: ToneSynth,
    scratch: Vec<f32>,
}

impl LogicalClock {
    fn new(params: ToneParams, sample_rate: u32) -> Self {
        Self {
            shared: SchedulerShared::new(sample_rate),
            synth: ToneSynth::new(params, sample_rate),
            scratch: vec![0.0; LOGICAL_BLOCK_FRAMES as usize],
        }
    }

    fn advance(&mut self, seconds: f64) {
        let mut remaining = self.shared.frames(seconds);
        while remaining > 0 {
            let frames = remaining.min(LOGICAL_BLOCK_FRAMES) as usize;
            self.shared
                .render_block(&mut self.synth, &mut self.scratch[..frames]);
            remaining -= frames as u64;
        }
    }
}

enum Backend {
    Stream(StreamOutput),
    Logical(LogicalClock),
}

impl Backend {
    const fn shared(&self) -> &Arc<SchedulerShared> {
        match self {
            Self::Stream(output) => output.shared(),
            Self::Logical(clock) => &clock.shared,
        }
    }
}

/// Schedules tone pulses against one audio clock.
///
/// One scheduler per playback lane: `stop` and `schedule_timeline` cancel
/// everything on the owned clock, so two lanes sharing a scheduler would
/// cancel each other's tones.
pub struct ToneScheduler {
    params: ToneParams,
    backend: Option<Backend>,
    last_start: Option<f64>,
    last_total: f64,
}

impl ToneScheduler {
    /// Creates a scheduler with no audio backend yet; [`Self::initialize`]
    /// (or the first [`Self::schedule_timeline`]) opens one.
    pub const fn new(params: ToneParams) -> Self {
        Self {
            params,
            backend: None,
            last_start: None,
            last_total: 0.0,
        }
    }

    /// Creates a scheduler on a logical clock that only moves when
    /// [`Self::advance`] is called. For tests and hosts without audio.
    pub fn with_logical_clock(params: ToneParams, sample_rate: u32) -> Self {
        Self {
            params,
            backend: Some(Backend::Logical(LogicalClock::new(params, sample_rate))),
            last_start: None,
            last_total: 0.0,
        }
    }

    /// Opens the audio output if it is not open already. Idempotent.
    pub fn initialize(&mut self) -> Result<()> {
        if self.backend.is_some() {
            debug!("Audio scheduler already initialized");
            return Ok(());
        }
        let output = StreamOutput::open(self.params)?;
        info!(
            "Audio scheduler initialized on {} at {}Hz",
            output.device_name(),
            output.sample_rate()
        );
        self.backend = Some(Backend::Stream(output));
        Ok(())
    }

    /// Starts a suspended output stream; no-op on a logical clock or when
    /// uninitialized.
    pub fn resume(&self) -> Result<()> {
        match &self.backend {
            Some(Backend::Stream(output)) => output.resume(),
            Some(Backend::Logical(_)) | None => Ok(()),
        }
    }

    /// The audio clock's current position in seconds; 0.0 when
    /// uninitialized.
    pub fn now(&self) -> f64 {
        self.backend
            .as_ref()
            .map_or(0.0, |backend| backend.shared().now_seconds())
    }

    /// True while the most recently scheduled run should still be audible
    /// (its span plus [`PLAYBACK_EPSILON`]).
    pub fn is_playing(&self) -> bool {
        self.last_start
            .is_some_and(|start| self.now() < start + self.last_total + PLAYBACK_EPSILON)
    }

    /// Schedules one tone at an absolute clock time.
    ///
    /// Without an initialized backend this logs and does nothing; it never
    /// fails into the caller.
    pub fn schedule_tone(&self, start_time: f64, duration: f64) {
        let Some(backend) = &self.backend else {
            warn!("Tone scheduling requested before the audio backend is initialized");
            return;
        };
        let shared = backend.shared();
        let tone = ScheduledTone::new(
            shared.frames(start_time),
            shared.frames(start_time + duration),
            shared.frames(self.params.attack),
            shared.frames(self.params.release),
        );
        shared.active.lock().tones.push(tone);
    }

    /// Schedules a whole timeline starting at the clock's current time,
    /// replacing any prior run.
    ///
    /// Lazily initializes and resumes the output first; initialization
    /// failure is the one error this surfaces. Returns a single-shot
    /// receiver that gets one message shortly after the run's natural end;
    /// a later [`Self::stop`] drops the sender instead, so the receiver
    /// observes disconnection rather than completion. An empty timeline
    /// completes immediately.
    pub fn schedule_timeline(&mut self, events: &[TimelineEvent]) -> Result<Receiver<()>> {
        self.initialize()?;
        self.resume()?;
        self.stop();

        let (tx, rx) = bounded(1);
        if events.is_empty() {
            let _ = tx.try_send(());
            return Ok(rx);
        }

        let Some(shared) = self.backend.as_ref().map(|b| Arc::clone(b.shared())) else {
            return Ok(rx);
        };

        let start = shared.now_seconds();
        self.last_start = Some(start);
        for event in events {
            self.schedule_tone(start + event.start_time, event.duration);
        }
        let total = timeline_duration(events);
        self.last_total = total;

        let deadline_frame = shared.frames(start + total + COMPLETION_GRACE);
        shared.active.lock().completion = Some(PendingCompletion { deadline_frame, tx });

        debug!(
            "Scheduled {} tones over {total:.3}s starting at {start:.3}s",
            events.len()
        );
        Ok(rx)
    }

    /// Cancels every pending and sounding tone and clears run bookkeeping.
    ///
    /// The tone set and pending completion empty under one lock, so once
    /// this returns the render path can only produce silence for the old
    /// run. Safe to call when nothing is playing.
    pub fn stop(&mut self) {
        if let Some(backend) = &self.backend {
            let mut active = backend.shared().active.lock();
            active.tones.clear();
            // Dropping the sender wakes any completion listener with a
            // disconnect instead of a message.
            active.completion = None;
        }
        self.last_start = None;
        self.last_total = 0.0;
    }

    /// Stops playback and releases the audio backend entirely; the next
    /// [`Self::initialize`] or [`Self::schedule_timeline`] re-opens it.
    pub fn cleanup(&mut self) {
        self.stop();
        if self.backend.take().is_some() {
            info!("Audio scheduler released");
        }
    }

    /// Advances a logical clock by `seconds`, rendering exactly what the
    /// audio callback would. Ignored on a live stream, whose clock is
    /// driven by the device.
    pub fn advance(&mut self, seconds: f64) {
        match &mut self.backend {
            Some(Backend::Logical(clock)) => clock.advance(seconds),
            Some(Backend::Stream(_)) => debug!("advance() ignored on a live audio stream"),
            None => debug!("advance() ignored before initialization"),
        }
    }

    #[cfg(test)]
    fn active_tone_count(&self) -> usize {
        self.backend
            .as_ref()
            .map_or(0, |backend| backend.shared().active.lock().tones.len())
    }
}
