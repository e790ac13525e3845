//! Error types for Keyer.

use thiserror::Error;

/// Result type alias using Keyer's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Keyer.
///
/// Timeline building never fails (unsupported characters are skipped, not
/// rejected), so every variant here comes from the audio output layer.
#[derive(Error, Debug)]
pub enum Error {
    // Audio output errors
    #[error("No audio output device found")]
    NoOutputDevice,

    #[error("Audio output error: {0}")]
    AudioOutput(String),

    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),
}

impl Error {
    /// Returns true if this error means no audio device can be driven at
    /// all, as opposed to a problem with an existing stream.
    pub const fn is_device_unavailable(&self) -> bool {
        matches!(self, Self::NoOutputDevice)
    }
}
