//! Driver capability boundary
//!
//! The platform audio driver is treated as a black box that can open a
//! configured output stream and then invoke a registered callback from its
//! own real-time thread whenever it needs samples. This module defines that
//! boundary as a pair of traits ([`OutputDriver`], [`OutputStream`]) plus the
//! callback-registration capability ([`StreamDataCallback`]), so the playback
//! core never depends on a concrete driver API.
//!
//! Two implementations ship with the crate: a cpal-based backend behind the
//! `streaming` feature, and a scripted [`MockDriver`] for tests and headless
//! environments.

#[cfg(feature = "streaming")]
mod cpal_backend;
mod mock;

#[cfg(feature = "streaming")]
pub use cpal_backend::CpalDriver;
pub use mock::{DriverEvent, MockDriver};

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Requested (and, on the mock driver, negotiated) output stream parameters.
///
/// The driver may grant different values than requested; the live stream is
/// the authority for negotiated parameters, not this struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSpec {
    /// Sampling rate in samples per second
    pub sample_rate: u32,
    /// Number of output channels (1 = mono, 2 = stereo)
    pub channel_count: u16,
    /// Requested number of frames per data callback
    pub frames_per_callback: u32,
}

/// Status returned by the data callback to the driver after each buffer.
///
/// `Stop` exists so a source can request playback termination from inside the
/// callback; the playback core always returns `Continue`, but the return
/// channel is part of the driver contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackStatus {
    /// Keep the stream running and keep invoking the callback
    Continue,
    /// Ask the driver to wind the stream down
    Stop,
}

/// Real-time data callback capability registered with the driver at open time.
///
/// Invoked repeatedly from the driver-owned high-priority thread. The whole
/// call chain below `on_audio_ready` must be real-time safe: bounded time, no
/// allocation, no blocking synchronization, no I/O.
pub trait StreamDataCallback: Send + Sync {
    /// Fill `buffer` (`frames_count` frames worth of f32 samples) and report
    /// whether the driver should keep pulling.
    fn on_audio_ready(&self, buffer: &mut [f32], frames_count: usize) -> CallbackStatus;
}

/// Errors reported by a driver implementation.
///
/// These are surfaced to the caller exactly as the failing step produced
/// them; the playback core never remaps one driver error into another.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// No output device is available on this host
    #[error("no audio output device available")]
    NoDevice,

    /// The driver rejected the stream open request
    #[error("failed to open output stream: {0}")]
    Open(String),

    /// The driver failed to start a successfully opened stream
    #[error("failed to start output stream: {0}")]
    Start(String),

    /// The requested stream configuration is not supported by this driver
    #[error("unsupported stream configuration: {0}")]
    Configuration(String),
}

/// Capability to open a configured output stream with a registered callback.
pub trait OutputDriver {
    /// Open (but do not start) an output stream.
    ///
    /// The driver is asked for a minimum-latency output stream with exclusive
    /// hardware access where available, f32 sample format, and `callback`
    /// registered as the real-time data callback target. The returned handle
    /// is the only way to start or stop the stream; dropping it closes the
    /// stream and deregisters the callback.
    fn open_output_stream(
        &self,
        spec: StreamSpec,
        callback: Arc<dyn StreamDataCallback>,
    ) -> std::result::Result<Box<dyn OutputStream>, DriverError>;
}

/// An open driver stream handle.
///
/// Scoped acquisition: the stream is closed when the handle is dropped, on
/// every exit path, including the one where `start` fails after a successful
/// open. The driver guarantees the callback thread is fully quiesced before
/// `stop` returns, so no callback runs after the handle is released.
pub trait OutputStream {
    /// Start the stream; the driver begins invoking the data callback.
    fn start(&mut self) -> std::result::Result<(), DriverError>;

    /// Stop the stream. Safe to call on a stream that never started.
    fn stop(&mut self);

    /// Negotiated channel count, or `None` if the driver has not reported a
    /// positive value. Never blocks.
    fn channel_count(&self) -> Option<u16>;

    /// Negotiated frames per data callback, or `None` while unknown.
    /// Never blocks.
    fn frames_per_callback(&self) -> Option<u32>;
}

impl StreamSpec {
    /// Total samples per callback buffer (`frames * channels`)
    pub fn samples_per_callback(&self) -> usize {
        self.frames_per_callback as usize * usize::from(self.channel_count)
    }
}
