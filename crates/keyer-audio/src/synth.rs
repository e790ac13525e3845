//! Tone synthesis: a fixed-frequency sine voice gated by per-tone envelopes.
//!
//! The scheduler stores [`ScheduledTone`]s in the frame domain; the render
//! path sums their envelopes (clamped to unity), shapes a shared sine
//! oscillator with the result, and writes mono f32 samples. The oscillator
//! keeps running through silence so tones always open from a continuous
//! phase, and the linear attack/release ramps keep on/off transitions
//! click-free.

use std::f32::consts::TAU;

/// Tone voice parameters.
///
/// Defaults give a comfortable practice tone: 600 Hz sine at moderate
/// volume with 5 ms ramps.
#[derive(Debug, Clone, Copy)]
pub struct ToneParams {
    /// Oscillator frequency in Hz.
    pub frequency: f32,
    /// Master gain applied to every tone, clamped to `0.0..=1.0` at use.
    pub gain: f32,
    /// Linear attack ramp in seconds.
    pub attack: f64,
    /// Linear release ramp in seconds.
    pub release: f64,
}

impl Default for ToneParams {
    fn default() -> Self {
        Self {
            frequency: 600.0,
            gain: 0.3,
            attack: 0.005,
            release: 0.005,
        }
    }
}

/// One tone pulse in the frame domain, envelope included.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ScheduledTone {
    start_frame: u64,
    end_frame: u64,
    attack_frames: u64,
    release_frames: u64,
}

impl ScheduledTone {
    /// Ramps are capped at half the tone so they never overlap, even for
    /// very short pulses at high speeds.
    pub(crate) fn new(
        start_frame: u64,
        end_frame: u64,
        attack_frames: u64,
        release_frames: u64,
    ) -> Self {
        let length = end_frame.saturating_sub(start_frame);
        Self {
            start_frame,
            end_frame,
            attack_frames: attack_frames.min(length / 2),
            release_frames: release_frames.min(length / 2),
        }
    }

    /// Envelope level at `frame`: 0 outside the tone, ramping linearly at
    /// the edges, 1.0 in the plateau.
    pub(crate) fn gain_at(&self, frame: u64) -> f32 {
        if frame < self.start_frame || frame >= self.end_frame {
            return 0.0;
        }
        let mut level = 1.0_f32;
        let elapsed = frame - self.start_frame;
        if self.attack_frames > 0 && elapsed < self.attack_frames {
            level = elapsed as f32 / self.attack_frames as f32;
        }
        let remaining = self.end_frame - frame;
        if self.release_frames > 0 && remaining <= self.release_frames {
            level = level.min(remaining as f32 / self.release_frames as f32);
        }
        level
    }

    /// True once the clock has passed the tone's end.
    pub(crate) const fn is_finished(&self, frame: u64) -> bool {
        frame >= self.end_frame
    }
}

/// Sine oscillator with a wrapping phase accumulator.
#[derive(Debug, Clone)]
struct SineOscillator {
    phase: f32,
    phase_inc: f32,
}

impl SineOscillator {
    fn new(frequency: f32, sample_rate: u32) -> Self {
        Self {
            phase: 0.0,
            phase_inc: frequency / sample_rate as f32,
        }
    }

    /// Generate the next sample.
    fn next_sample(&mut self) -> f32 {
        let sample = (TAU * self.phase).sin();
        self.phase += self.phase_inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        sample
    }
}

/// Renders scheduled tones into mono sample blocks.
#[derive(Debug)]
pub(crate) struct ToneSynth {
    osc: SineOscillator,
    gain: f32,
}

impl ToneSynth {
    pub(crate) fn new(params: ToneParams, sample_rate: u32) -> Self {
        Self {
            osc: SineOscillator::new(params.frequency, sample_rate),
            gain: params.gain.clamp(0.0, 1.0),
        }
    }

    /// Renders `out.len()` frames starting at clock position `start_frame`.
    pub(crate) fn render(&mut self, start_frame: u64, tones: &[ScheduledTone], out: &mut [f32]) {
        for (i, sample) in out.iter_mut().enumerate() {
            let frame = start_frame + i as u64;
            let mut level = 0.0_f32;
            for tone in tones {
                level += tone.gain_at(frame);
            }
            let carrier = self.osc.next_sample();
            *sample = carrier * level.min(1.0) * self.gain;
        }
    }
}
