//! Low-latency audio player core for real-time synthesizers
//!
//! Bridges a pull-based, callback-driven platform audio driver to an
//! application-supplied audio generator, behind a simple play/stop/volume
//! control surface. The driver owns a high-priority real-time thread that
//! periodically demands a buffer of samples; this crate orchestrates the
//! stream lifecycle (open, start, running, stop, close) and relays each
//! driver callback into a pluggable [`AudioSource`].
//!
//! # Features
//! - [`AudioSource`] capability contract any synthesis engine can implement
//!   (wavetable, MIDI-driven, procedural)
//! - [`StreamPlayer`]: driver-facing orchestrator with lazy stream acquisition,
//!   idempotent stop and guaranteed handle release on every exit path
//! - [`SynthesizerBase`]: application-facing facade state (owned player plus an
//!   atomic playing flag)
//! - [`MockDriver`]: deterministic scripted driver for tests and headless use
//! - Lock-free [`SineSource`] reference source implementation
//!
//! # Crate feature flags
//! - `streaming` (opt-in): platform audio output via the cpal-based backend
//!   (enables optional `cpal` dep)
//!
//! # Quick start
//! ## Deterministic playback against the mock driver
//! ```
//! use std::sync::Arc;
//! use synthstream::{AudioPlayer, MockDriver, SineSource, StreamPlayer};
//!
//! let driver = MockDriver::new();
//! let source = Arc::new(SineSource::new(48_000, 440.0));
//! let mut player = StreamPlayer::with_source(driver.clone(), source, 48_000);
//! player.play().unwrap();
//! let rendered = driver.pump(256).unwrap();
//! assert_eq!(rendered.len(), 256);
//! player.stop();
//! ```
//!
//! ## Real-time output
//! ```no_run
//! # #[cfg(feature = "streaming")]
//! # {
//! use std::sync::Arc;
//! use synthstream::driver::CpalDriver;
//! use synthstream::{AudioPlayer, SineSource, StreamPlayer, DEFAULT_SAMPLE_RATE};
//!
//! let driver = CpalDriver::new().unwrap();
//! let source = Arc::new(SineSource::new(DEFAULT_SAMPLE_RATE, 440.0));
//! let mut player = StreamPlayer::with_source(driver, source, DEFAULT_SAMPLE_RATE);
//! player.play().unwrap();
//! std::thread::sleep(std::time::Duration::from_secs(2));
//! player.stop();
//! # }
//! ```

#![warn(missing_docs)]

pub mod driver; // Driver capability boundary (open/start/stop/close)
pub mod player; // Playback orchestration
pub mod source; // Audio generation contracts
pub mod synth; // Application-facing facade

/// Error types for player and synthesizer operations
#[derive(thiserror::Error, Debug)]
pub enum AudioError {
    /// `play()` was invoked before an audio source was configured
    #[error("no audio source configured")]
    NoSource,

    /// A facade operation required an owned audio player, but none is configured
    #[error("no audio player configured")]
    NoPlayer,

    /// Failure reported by the platform audio driver, propagated unchanged
    #[error(transparent)]
    Driver(#[from] driver::DriverError),
}

/// Result type for player and synthesizer operations
pub type Result<T> = std::result::Result<T, AudioError>;

// Public API exports
pub use driver::{
    CallbackStatus, DriverError, MockDriver, OutputDriver, OutputStream, StreamDataCallback,
    StreamSpec,
};
pub use player::{
    AudioPlayer, StreamPlayer, DEFAULT_CHANNEL_COUNT, DEFAULT_FRAMES_PER_CALLBACK,
    DEFAULT_SAMPLE_RATE,
};
pub use source::{AudioSource, AudioSourceConsumer, SineSource};
pub use synth::{Synthesizer, SynthesizerBase};
