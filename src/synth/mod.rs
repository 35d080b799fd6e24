//! Application-facing synthesizer facade
//!
//! A synthesizer pairs one exclusively owned [`AudioPlayer`] with whatever
//! voice logic the application provides, behind a play/stop/volume surface.
//! The crate supplies the shared state every concrete synthesizer needs
//! ([`SynthesizerBase`]) and the capability trait the application programs
//! against ([`Synthesizer`]); volume mapping and the actual voice remain the
//! concrete synthesizer's job.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::player::AudioPlayer;
use crate::source::{AudioSource, AudioSourceConsumer};
use crate::{AudioError, Result};

/// Capability surface of a synthesizer as seen by the application.
pub trait Synthesizer: AudioSourceConsumer {
    /// Start playing audio
    fn play(&mut self) -> Result<()>;

    /// Stop playing audio
    fn stop(&mut self);

    /// Whether the synthesizer is currently requesting the driver to pull
    /// samples. This is not "audible output": a zero volume or an all-silent
    /// source still reports playing.
    fn is_playing(&self) -> bool;

    /// Set the overall linear gain, typically in [0, 1]. How the gain is
    /// applied (per-source, per-voice) is up to the implementation.
    fn set_volume(&mut self, gain: f32);
}

/// Shared state for synthesizer implementations: the exclusively owned
/// audio player plus the atomically updated playing flag.
///
/// Concrete synthesizers embed this and route their `play`/`stop` through
/// [`SynthesizerBase::start_player`] / [`SynthesizerBase::stop_player`],
/// which keep the flag in sync with the player lifecycle.
#[derive(Default)]
pub struct SynthesizerBase {
    player: Option<Box<dyn AudioPlayer>>,
    playing: AtomicBool,
}

impl SynthesizerBase {
    /// Create facade state around an owned audio player
    pub fn new(player: Box<dyn AudioPlayer>) -> Self {
        SynthesizerBase {
            player: Some(player),
            playing: AtomicBool::new(false),
        }
    }

    /// Create facade state with no player configured.
    ///
    /// Source delegation becomes a no-op (set) or `None` (get), and
    /// [`SynthesizerBase::start_player`] fails until a player is attached.
    pub fn without_player() -> Self {
        SynthesizerBase::default()
    }

    /// Whether a `play` has succeeded with no matching `stop` since
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    /// Whether an audio player is owned
    pub fn has_player(&self) -> bool {
        self.player.is_some()
    }

    /// Borrow the owned player, e.g. to query negotiated stream parameters
    pub fn player(&self) -> Option<&dyn AudioPlayer> {
        self.player.as_deref()
    }

    /// Start the owned player and raise the playing flag.
    ///
    /// The flag is only raised after the player reports success, so a failed
    /// play leaves the facade in the stopped state.
    pub fn start_player(&mut self) -> Result<()> {
        let player = self.player.as_mut().ok_or(AudioError::NoPlayer)?;
        player.play()?;
        self.playing.store(true, Ordering::Release);
        Ok(())
    }

    /// Stop the owned player, if any, and clear the playing flag
    pub fn stop_player(&mut self) {
        if let Some(player) = self.player.as_mut() {
            player.stop();
        }
        self.playing.store(false, Ordering::Release);
    }
}

impl AudioSourceConsumer for SynthesizerBase {
    /// Delegates to the owned player; a missing player makes this a no-op.
    fn set_audio_source(&mut self, source: Arc<dyn AudioSource>) {
        if let Some(player) = self.player.as_mut() {
            player.set_audio_source(source);
        }
    }

    /// Delegates to the owned player; `None` when no player is owned.
    fn get_audio_source(&self) -> Option<Arc<dyn AudioSource>> {
        self.player.as_ref().and_then(|player| player.get_audio_source())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::MockDriver;
    use crate::player::StreamPlayer;
    use crate::source::SineSource;

    /// Minimal concrete synthesizer: one sine voice, gain applied at the source
    struct SineSynth {
        base: SynthesizerBase,
        voice: Arc<SineSource>,
    }

    impl SineSynth {
        fn new(driver: MockDriver) -> Self {
            let voice = Arc::new(SineSource::new(48_000, 440.0));
            let player = StreamPlayer::with_source(driver, voice.clone(), 48_000);
            SineSynth {
                base: SynthesizerBase::new(Box::new(player)),
                voice,
            }
        }
    }

    impl AudioSourceConsumer for SineSynth {
        fn set_audio_source(&mut self, source: Arc<dyn AudioSource>) {
            self.base.set_audio_source(source);
        }

        fn get_audio_source(&self) -> Option<Arc<dyn AudioSource>> {
            self.base.get_audio_source()
        }
    }

    impl Synthesizer for SineSynth {
        fn play(&mut self) -> Result<()> {
            self.base.start_player()
        }

        fn stop(&mut self) {
            self.base.stop_player();
        }

        fn is_playing(&self) -> bool {
            self.base.is_playing()
        }

        fn set_volume(&mut self, gain: f32) {
            self.voice.set_amplitude(gain);
        }
    }

    #[test]
    fn test_delegation_with_owned_player() {
        let driver = MockDriver::new();
        let player = StreamPlayer::new(driver, 48_000);
        let mut base = SynthesizerBase::new(Box::new(player));

        let source: Arc<dyn AudioSource> = Arc::new(SineSource::new(48_000, 220.0));
        base.set_audio_source(source.clone());
        let got = base.get_audio_source().unwrap();
        assert!(Arc::ptr_eq(&got, &source));
    }

    #[test]
    fn test_delegation_without_player() {
        let mut base = SynthesizerBase::without_player();
        assert!(!base.has_player());

        let source: Arc<dyn AudioSource> = Arc::new(SineSource::new(48_000, 220.0));
        base.set_audio_source(source);
        assert!(base.get_audio_source().is_none());
    }

    #[test]
    fn test_start_without_player_fails_and_stays_stopped() {
        let mut base = SynthesizerBase::without_player();
        let err = base.start_player().unwrap_err();
        assert!(matches!(err, AudioError::NoPlayer));
        assert!(!base.is_playing());

        // stop on an empty facade is still defined behavior
        base.stop_player();
        assert!(!base.is_playing());
    }

    #[test]
    fn test_playing_flag_tracks_lifecycle() {
        let driver = MockDriver::new();
        let mut synth = SineSynth::new(driver);

        assert!(!synth.is_playing());
        synth.play().unwrap();
        assert!(synth.is_playing());
        synth.stop();
        assert!(!synth.is_playing());
    }

    #[test]
    fn test_failed_play_leaves_flag_down() {
        let driver = MockDriver::new();
        let player: StreamPlayer<MockDriver> = StreamPlayer::new(driver, 48_000);
        let mut base = SynthesizerBase::new(Box::new(player));

        // No source configured: play fails, flag must stay down
        assert!(base.start_player().is_err());
        assert!(!base.is_playing());
    }

    #[test]
    fn test_zero_volume_still_reports_playing() {
        let driver = MockDriver::new();
        let mut synth = SineSynth::new(driver.clone());

        synth.set_volume(0.0);
        synth.play().unwrap();
        assert!(synth.is_playing());

        // Silent output is still output
        let buffer = driver.pump(256).unwrap();
        assert!(buffer.iter().all(|s| *s == 0.0));
    }
}
