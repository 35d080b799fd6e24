//! Playback orchestration
//!
//! The [`AudioPlayer`] trait defines the play/stop lifecycle between an
//! [`AudioSource`](crate::AudioSource) and the platform driver, and
//! [`StreamPlayer`] implements it against the
//! [`OutputDriver`](crate::driver::OutputDriver) capability boundary. The
//! player never generates audio itself; it configures the driver, registers
//! the callback relay, and manages the native stream handle across
//! start/stop/teardown.

mod stream;

pub use stream::StreamPlayer;

use crate::source::AudioSourceConsumer;
use crate::Result;

/// Default sampling rate in samples per second
pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;

/// Frames per data callback requested at stream-open time
pub const DEFAULT_FRAMES_PER_CALLBACK: u32 = 256;

/// Channel count requested at stream-open time (mono)
pub const DEFAULT_CHANNEL_COUNT: u16 = 1;

/// Abstract audio player: the orchestrator between a configured audio source
/// and the driver that pulls samples from it.
///
/// Lifecycle: unconfigured → stopped → playing → stopped → …; destruction
/// forces a stop of any active stream.
pub trait AudioPlayer: AudioSourceConsumer {
    /// Open a low-latency output stream on the driver, register the player's
    /// callback relay as the data callback target and start the stream.
    ///
    /// Fails with [`AudioError::NoSource`](crate::AudioError::NoSource) when
    /// no audio source is configured; driver failures from the open or start
    /// step are propagated unchanged. Both steps complete, or fail, before
    /// this returns; no callback is guaranteed to have run by then.
    fn play(&mut self) -> Result<()>;

    /// Stop playback.
    ///
    /// Idempotent and safe to call from destructors. Stops and closes the
    /// stream when one is open, then unconditionally notifies the configured
    /// source via `on_playback_stopped`, even when no stream was open. The
    /// driver guarantees the callback thread is quiesced before this returns.
    fn stop(&mut self);

    /// Negotiated channel count of the live stream, or 0 while unknown
    /// (no open stream, or the driver has not reported a positive value).
    /// Never blocks.
    fn get_channel_count(&self) -> u32;

    /// Negotiated frames per data callback of the live stream, or 0 while
    /// unknown. Never blocks.
    fn get_frames_per_data_callback(&self) -> u32;
}
