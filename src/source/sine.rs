//! Lock-free procedural sine source
//!
//! Reference [`AudioSource`] implementation used by the demo CLI and tests.
//! All mutable state (frequency, amplitude, oscillator phase) lives in
//! `AtomicU32`s holding f32 bit patterns, so the control thread can retune
//! the oscillator while the real-time callback reads it without any lock.

use std::f32::consts::TAU;
use std::sync::atomic::{AtomicU32, Ordering};

use super::AudioSource;

/// Sine oscillator audio source with atomically adjustable frequency and gain
pub struct SineSource {
    sample_rate: u32,
    /// Oscillator frequency in Hz, stored as f32 bits
    frequency: AtomicU32,
    /// Linear gain in [0, 1], stored as f32 bits
    amplitude: AtomicU32,
    /// Current oscillator phase in radians, stored as f32 bits
    phase: AtomicU32,
}

impl SineSource {
    /// Create a sine source at the given sample rate and frequency, full gain
    pub fn new(sample_rate: u32, frequency: f32) -> Self {
        SineSource {
            sample_rate,
            frequency: AtomicU32::new(frequency.to_bits()),
            amplitude: AtomicU32::new(1.0_f32.to_bits()),
            phase: AtomicU32::new(0.0_f32.to_bits()),
        }
    }

    /// Set the oscillator frequency in Hz
    pub fn set_frequency(&self, frequency: f32) {
        self.frequency
            .store(frequency.max(0.0).to_bits(), Ordering::Relaxed);
    }

    /// Get the oscillator frequency in Hz
    pub fn get_frequency(&self) -> f32 {
        f32::from_bits(self.frequency.load(Ordering::Relaxed))
    }

    /// Set the linear gain, clamped to [0, 1]
    pub fn set_amplitude(&self, gain: f32) {
        self.amplitude
            .store(gain.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }

    /// Get the linear gain
    pub fn get_amplitude(&self) -> f32 {
        f32::from_bits(self.amplitude.load(Ordering::Relaxed))
    }

    /// Get the configured sample rate in samples per second
    pub fn get_sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl AudioSource for SineSource {
    fn on_audio_ready(&self, buffer: &mut [f32], frames_count: usize, _channel_count: u16) {
        let frequency = f32::from_bits(self.frequency.load(Ordering::Relaxed));
        let amplitude = f32::from_bits(self.amplitude.load(Ordering::Relaxed));
        let mut phase = f32::from_bits(self.phase.load(Ordering::Relaxed));
        let phase_increment = TAU * frequency / self.sample_rate as f32;

        // Render the first channel block, then mirror it into the remaining
        // channel-major blocks. Every channel carries the same mono signal.
        let frames = frames_count.min(buffer.len());
        if frames == 0 {
            return;
        }
        let (first, rest) = buffer.split_at_mut(frames);
        for sample in first.iter_mut() {
            *sample = phase.sin() * amplitude;
            phase += phase_increment;
            if phase >= TAU {
                phase -= TAU;
            }
        }
        for block in rest.chunks_mut(frames) {
            let len = block.len();
            block.copy_from_slice(&first[..len]);
        }

        self.phase.store(phase.to_bits(), Ordering::Relaxed);
    }

    fn on_playback_stopped(&self) {
        self.phase.store(0.0_f32.to_bits(), Ordering::Relaxed);
    }
}
