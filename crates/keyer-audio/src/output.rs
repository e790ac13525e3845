//! Audio output using cpal.
//!
//! One [`StreamOutput`] owns one cpal stream. The stream callback is the
//! only writer of the scheduler's frame clock: it renders the shared tone
//! set into a mono block, fans it out to the device's channels, and
//! advances the clock by the frames written. The stream is built without
//! being started; [`StreamOutput::resume`] starts it, so no audio runs
//! before the first play request.

use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};
use keyer_core::{Error, Result};
use tracing::{debug, error, info};

use crate::scheduler::SchedulerShared;
use crate::synth::{ToneParams, ToneSynth};

/// Audio output stream wrapper.
pub(crate) struct StreamOutput {
    stream: Stream,
    shared: Arc<SchedulerShared>,
    device_name: String,
    sample_rate: u32,
}

impl StreamOutput {
    /// Opens the default output device and builds the render stream.
    pub(crate) fn open(params: ToneParams) -> Result<Self> {
        let host = cpal::default_host();

        let device = host.default_output_device().ok_or(Error::NoOutputDevice)?;

        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());
        info!("Using audio output device: {device_name}");

        let supported_config = device
            .default_output_config()
            .map_err(|e| Error::AudioOutput(format!("Failed to get output config: {e}")))?;

        debug!("Supported output config: {supported_config:?}");

        let sample_format = supported_config.sample_format();
        let config: StreamConfig = supported_config.into();
        let sample_rate = config.sample_rate.0;

        let shared = SchedulerShared::new(sample_rate);
        let synth = ToneSynth::new(params, sample_rate);

        let stream = match sample_format {
            SampleFormat::F32 => {
                Self::build_stream::<f32>(&device, &config, Arc::clone(&shared), synth)?
            }
            SampleFormat::I16 => {
                Self::build_stream::<i16>(&device, &config, Arc::clone(&shared), synth)?
            }
            SampleFormat::U16 => {
                Self::build_stream::<u16>(&device, &config, Arc::clone(&shared), synth)?
            }
            other => {
                return Err(Error::UnsupportedFormat(format!("{other:?}")));
            }
        };

        debug!(
            "Output stream ready: {sample_rate}Hz, {} channels",
            config.channels
        );

        Ok(Self {
            stream,
            shared,
            device_name,
            sample_rate,
        })
    }

    fn build_stream<T: cpal::SizedSample + cpal::FromSample<f32>>(
        device: &Device,
        config: &StreamConfig,
        shared: Arc<SchedulerShared>,
        mut synth: ToneSynth,
    ) -> Result<Stream> {
        let channels = usize::from(config.channels);

        let err_fn = |err| {
            error!("Audio stream error: {err}");
        };

        let mut mono = Vec::new();
        let stream = device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    let frames = data.len() / channels;
                    if mono.len() < frames {
                        mono.resize(frames, 0.0);
                    }
                    let block = &mut mono[..frames];
                    shared.render_block(&mut synth, block);

                    for (value, frame) in block.iter().zip(data.chunks_mut(channels)) {
                        let sample = T::from_sample(*value);
                        for out in frame {
                            *out = sample;
                        }
                    }
                },
                err_fn,
                None,
            )
            .map_err(|e| Error::AudioOutput(format!("Failed to build stream: {e}")))?;

        Ok(stream)
    }

    /// Starts the stream clock. Safe to call on a stream already running.
    pub(crate) fn resume(&self) -> Result<()> {
        self.stream
            .play()
            .map_err(|e| Error::AudioOutput(format!("Failed to start stream: {e}")))
    }

    pub(crate) const fn shared(&self) -> &Arc<SchedulerShared> {
        &self.shared
    }

    /// Get the device name.
    pub(crate) fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Get the sample rate.
    pub(crate) const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
