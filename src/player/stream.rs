//! Concrete low-latency stream player
//!
//! Owns the native stream handle as a nullable resource: absent until
//! `play()` succeeds, taken and dropped inside `stop()`. The driver holds
//! its own reference to the stream while it is open, so releasing the handle
//! here is what quiesces and deregisters the real-time callback.

use std::sync::Arc;

use tracing::debug;

use super::{AudioPlayer, DEFAULT_CHANNEL_COUNT, DEFAULT_FRAMES_PER_CALLBACK};
use crate::driver::{CallbackStatus, OutputDriver, OutputStream, StreamDataCallback, StreamSpec};
use crate::source::{AudioSource, AudioSourceConsumer};
use crate::{AudioError, Result};

/// Driver-facing audio player.
///
/// Generic over the [`OutputDriver`] it opens streams on; the sampling rate
/// is fixed at construction, frame size and channel count are the crate's
/// build-time constants. Nothing is acquired until [`AudioPlayer::play`].
pub struct StreamPlayer<D: OutputDriver> {
    driver: D,
    source: Option<Arc<dyn AudioSource>>,
    stream: Option<Box<dyn OutputStream>>,
    sample_rate: u32,
}

/// The player's callback half: relays each driver buffer into the source
/// captured at `play()` time, together with the fixed channel constant.
struct SourceRelay {
    source: Arc<dyn AudioSource>,
    channel_count: u16,
}

impl StreamDataCallback for SourceRelay {
    fn on_audio_ready(&self, buffer: &mut [f32], frames_count: usize) -> CallbackStatus {
        self.source
            .on_audio_ready(buffer, frames_count, self.channel_count);
        // Stop is reserved for sources that want to end playback from inside
        // the callback; the relay itself never requests it.
        CallbackStatus::Continue
    }
}

impl<D: OutputDriver> StreamPlayer<D> {
    /// Create a player with no audio source configured yet.
    ///
    /// `play()` fails until a source is set via
    /// [`AudioSourceConsumer::set_audio_source`].
    pub fn new(driver: D, sample_rate: u32) -> Self {
        StreamPlayer {
            driver,
            source: None,
            stream: None,
            sample_rate,
        }
    }

    /// Create a player with an audio source already configured
    pub fn with_source(driver: D, source: Arc<dyn AudioSource>, sample_rate: u32) -> Self {
        StreamPlayer {
            driver,
            source: Some(source),
            stream: None,
            sample_rate,
        }
    }

    /// Sampling rate this player opens streams at, in samples per second
    pub fn get_sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl<D: OutputDriver> AudioSourceConsumer for StreamPlayer<D> {
    fn set_audio_source(&mut self, source: Arc<dyn AudioSource>) {
        self.source = Some(source);
    }

    fn get_audio_source(&self) -> Option<Arc<dyn AudioSource>> {
        self.source.clone()
    }
}

impl<D: OutputDriver> AudioPlayer for StreamPlayer<D> {
    fn play(&mut self) -> Result<()> {
        let source = self.source.clone().ok_or(AudioError::NoSource)?;

        let spec = StreamSpec {
            sample_rate: self.sample_rate,
            channel_count: DEFAULT_CHANNEL_COUNT,
            frames_per_callback: DEFAULT_FRAMES_PER_CALLBACK,
        };
        let relay = Arc::new(SourceRelay {
            source,
            channel_count: spec.channel_count,
        });

        let mut stream = self.driver.open_output_stream(spec, relay)?;
        // A start failure drops the just-opened stream, closing it; the
        // handle is never retained on an error path.
        stream.start()?;

        debug!(
            sample_rate = spec.sample_rate,
            frames = spec.frames_per_callback,
            "output stream started"
        );
        // Replacing an already-playing stream closes the previous handle.
        self.stream = Some(stream);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            drop(stream);
            debug!("output stream stopped and closed");
        }
        // Stop always notifies, whether or not a stream was open.
        if let Some(source) = &self.source {
            source.on_playback_stopped();
        }
    }

    fn get_channel_count(&self) -> u32 {
        self.stream
            .as_ref()
            .and_then(|stream| stream.channel_count())
            .map(u32::from)
            .unwrap_or(0)
    }

    fn get_frames_per_data_callback(&self) -> u32 {
        self.stream
            .as_ref()
            .and_then(|stream| stream.frames_per_callback())
            .unwrap_or(0)
    }
}

impl<D: OutputDriver> Drop for StreamPlayer<D> {
    fn drop(&mut self) {
        // No dangling callback registration survives the player.
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{DriverError, DriverEvent, MockDriver};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Records every callback it receives and fills buffers with a constant
    struct StubSource {
        ready_calls: Mutex<Vec<(usize, u16)>>,
        stopped_count: AtomicUsize,
        fill: f32,
    }

    impl StubSource {
        fn new(fill: f32) -> Self {
            StubSource {
                ready_calls: Mutex::new(Vec::new()),
                stopped_count: AtomicUsize::new(0),
                fill,
            }
        }

        fn ready_calls(&self) -> Vec<(usize, u16)> {
            self.ready_calls.lock().clone()
        }

        fn stopped_count(&self) -> usize {
            self.stopped_count.load(Ordering::SeqCst)
        }
    }

    impl AudioSource for StubSource {
        fn on_audio_ready(&self, buffer: &mut [f32], frames_count: usize, channel_count: u16) {
            self.ready_calls.lock().push((frames_count, channel_count));
            buffer.fill(self.fill);
        }

        fn on_playback_stopped(&self) {
            self.stopped_count.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn player_with_stub(driver: &MockDriver) -> (StreamPlayer<MockDriver>, Arc<StubSource>) {
        let stub = Arc::new(StubSource::new(0.5));
        let player = StreamPlayer::with_source(driver.clone(), stub.clone(), 48_000);
        (player, stub)
    }

    #[test]
    fn test_play_without_source_makes_no_driver_call() {
        let driver = MockDriver::new();
        let mut player = StreamPlayer::new(driver.clone(), 48_000);

        let err = player.play().unwrap_err();
        assert!(matches!(err, AudioError::NoSource));
        assert!(driver.events().is_empty());
    }

    #[test]
    fn test_full_lifecycle() {
        let driver = MockDriver::new();
        let (mut player, stub) = player_with_stub(&driver);

        player.play().unwrap();
        let requested = StreamSpec {
            sample_rate: 48_000,
            channel_count: 1,
            frames_per_callback: 256,
        };
        assert_eq!(
            driver.events(),
            vec![DriverEvent::Open(requested), DriverEvent::Start]
        );

        let buffer = driver.pump(256).unwrap();
        assert_eq!(buffer.len(), 256);
        assert!(buffer.iter().all(|s| (-1.0..=1.0).contains(s) && *s == 0.5));
        assert_eq!(stub.ready_calls(), vec![(256, 1)]);

        player.stop();
        assert_eq!(stub.stopped_count(), 1);
        assert_eq!(player.get_channel_count(), 0);
        assert_eq!(
            driver.events(),
            vec![
                DriverEvent::Open(requested),
                DriverEvent::Start,
                DriverEvent::Stop,
                DriverEvent::Close,
            ]
        );
    }

    #[test]
    fn test_stop_is_idempotent_and_always_notifies() {
        let driver = MockDriver::new();
        let (mut player, stub) = player_with_stub(&driver);

        player.play().unwrap();
        player.stop();
        player.stop();
        player.stop();

        assert_eq!(stub.stopped_count(), 3);
        let stops = driver
            .events()
            .iter()
            .filter(|e| **e == DriverEvent::Stop)
            .count();
        assert_eq!(stops, 1, "driver stop must run once per open stream");
    }

    #[test]
    fn test_stop_without_play_still_notifies_source() {
        let driver = MockDriver::new();
        let (mut player, stub) = player_with_stub(&driver);

        player.stop();
        player.stop();

        assert_eq!(stub.stopped_count(), 2);
        assert!(driver.events().is_empty());
    }

    #[test]
    fn test_negotiated_values_unknown_until_open() {
        let driver = MockDriver::new();
        driver.negotiate(2, 512);
        let (mut player, _stub) = player_with_stub(&driver);

        assert_eq!(player.get_channel_count(), 0);
        assert_eq!(player.get_frames_per_data_callback(), 0);

        player.play().unwrap();
        // The driver granted different values than requested; the live
        // stream is the authority.
        assert_eq!(player.get_channel_count(), 2);
        assert_eq!(player.get_frames_per_data_callback(), 512);

        player.stop();
        assert_eq!(player.get_channel_count(), 0);
        assert_eq!(player.get_frames_per_data_callback(), 0);
    }

    #[test]
    fn test_open_failure_propagates_unchanged() {
        let driver = MockDriver::new();
        let (mut player, stub) = player_with_stub(&driver);
        driver.fail_next_open(DriverError::NoDevice);

        let err = player.play().unwrap_err();
        assert!(matches!(err, AudioError::Driver(DriverError::NoDevice)));
        assert!(driver.events().is_empty());
        assert_eq!(stub.stopped_count(), 0);
    }

    #[test]
    fn test_start_failure_releases_the_opened_stream() {
        let driver = MockDriver::new();
        let (mut player, _stub) = player_with_stub(&driver);
        driver.fail_next_start(DriverError::Start("device busy".into()));

        let err = player.play().unwrap_err();
        assert!(matches!(
            err,
            AudioError::Driver(DriverError::Start(ref msg)) if msg == "device busy"
        ));
        // The handle opened before the failing start must be closed, not
        // leaked or retained.
        assert!(driver.events().ends_with(&[DriverEvent::Close]));
        assert_eq!(player.get_channel_count(), 0);
        assert!(driver.pump(256).is_none());
    }

    #[test]
    fn test_source_swap_while_stopped_routes_to_new_source() {
        let driver = MockDriver::new();
        let source_a = Arc::new(StubSource::new(0.1));
        let source_b = Arc::new(StubSource::new(0.2));
        let mut player = StreamPlayer::new(driver.clone(), 48_000);

        player.set_audio_source(source_a.clone());
        player.set_audio_source(source_b.clone());
        player.play().unwrap();
        driver.pump(256).unwrap();

        assert!(source_a.ready_calls().is_empty());
        assert_eq!(source_b.ready_calls(), vec![(256, 1)]);
    }

    #[test]
    fn test_replay_after_stop() {
        let driver = MockDriver::new();
        let (mut player, stub) = player_with_stub(&driver);

        player.play().unwrap();
        player.stop();
        player.play().unwrap();
        driver.pump(256).unwrap();

        assert_eq!(stub.ready_calls(), vec![(256, 1)]);
        let starts = driver
            .events()
            .iter()
            .filter(|e| **e == DriverEvent::Start)
            .count();
        assert_eq!(starts, 2);
    }

    #[test]
    fn test_play_while_playing_replaces_stream() {
        let driver = MockDriver::new();
        let (mut player, stub) = player_with_stub(&driver);

        player.play().unwrap();
        player.play().unwrap();

        // The replacement stream must stay pumpable after the superseded
        // handle is closed.
        let buffer = driver.pump(256).unwrap();
        assert_eq!(buffer.len(), 256);
        assert_eq!(stub.ready_calls(), vec![(256, 1)]);
        assert_eq!(player.get_channel_count(), 1);

        // Two opens and starts, and exactly one close for the old handle
        let events = driver.events();
        let count = |event: &DriverEvent| events.iter().filter(|e| *e == event).count();
        assert_eq!(count(&DriverEvent::Start), 2);
        assert_eq!(count(&DriverEvent::Close), 1);

        player.stop();
        assert_eq!(stub.stopped_count(), 1);
        assert!(driver.pump(256).is_none());
    }

    #[test]
    fn test_sample_rate_fixed_at_construction() {
        let driver = MockDriver::new();
        let player = StreamPlayer::new(driver, 44_100);
        assert_eq!(player.get_sample_rate(), 44_100);
    }

    #[test]
    fn test_drop_forces_stop() {
        let driver = MockDriver::new();
        let (mut player, stub) = player_with_stub(&driver);

        player.play().unwrap();
        drop(player);

        assert_eq!(stub.stopped_count(), 1);
        assert!(driver
            .events()
            .ends_with(&[DriverEvent::Stop, DriverEvent::Close]));
        assert!(driver.pump(256).is_none());
    }

    #[test]
    fn test_get_audio_source_round_trips() {
        let driver = MockDriver::new();
        let stub: Arc<dyn AudioSource> = Arc::new(StubSource::new(0.0));
        let mut player = StreamPlayer::new(driver, 48_000);

        assert!(player.get_audio_source().is_none());
        player.set_audio_source(stub.clone());
        let got = player.get_audio_source().unwrap();
        assert!(Arc::ptr_eq(&got, &stub));
    }
}
