//! Audio generation contracts
//!
//! An [`AudioSource`] supplies audio samples on demand and is notified when
//! playback stops. It is the plug-in seam between the playback core and any
//! concrete synthesis engine: the player never knows how samples are made,
//! the source never knows which driver renders them.

mod sine;

pub use sine::SineSource;

use std::sync::Arc;

/// Capability contract for anything that can fill audio buffers on demand.
///
/// Implementations are shared between the control thread and the driver-owned
/// real-time callback thread, so all methods take `&self`; mutable state must
/// use interior mutability that is safe on the real-time path (atomics, never
/// a blocking lock).
pub trait AudioSource: Send + Sync {
    /// Fill `buffer` with freshly generated samples.
    ///
    /// Called from the real-time callback path. `buffer` is pre-allocated by
    /// the caller with exactly `frames_count * channel_count` elements, laid
    /// out channel-major: `channel_count` contiguous blocks of `frames_count`
    /// samples each, not interleaved. Every sample written must lie in the
    /// closed range [-1.0, +1.0].
    ///
    /// The implementation must complete in bounded time: no heap allocation,
    /// no lock that can be held by a non-real-time thread, no I/O. A source
    /// that violates this produces audible dropouts rather than a reportable
    /// error, because the real-time thread has no recovery path.
    fn on_audio_ready(&self, buffer: &mut [f32], frames_count: usize, channel_count: u16);

    /// Notify the source that playback has stopped.
    ///
    /// Called once per stop transition, off the real-time thread, so the
    /// source can release or reset state. The stream resources may already be
    /// gone when this runs; the source must not assume otherwise.
    fn on_playback_stopped(&self);
}

/// Capability contract for anything that holds a configurable [`AudioSource`].
pub trait AudioSourceConsumer {
    /// Replace the configured audio source.
    ///
    /// Not real-time safe. Call only while playback is stopped; swapping the
    /// source with a callback in flight is an unsynchronized race and its
    /// outcome is unspecified.
    fn set_audio_source(&mut self, source: Arc<dyn AudioSource>);

    /// Get the currently configured audio source, or `None` if unset.
    fn get_audio_source(&self) -> Option<Arc<dyn AudioSource>>;
}
