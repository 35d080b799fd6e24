//! cpal-based platform audio backend
//!
//! The single concrete driver integration: opens a low-latency f32 output
//! stream on the host's default output device and hands the registered
//! [`StreamDataCallback`] to cpal's real-time thread. Sharing mode and final
//! buffer sizing are negotiated by the host; the actual per-callback frame
//! count is observed from inside the callback and re-exposed through
//! [`OutputStream::frames_per_callback`].

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{debug, info, warn};

use super::{CallbackStatus, DriverError, OutputDriver, OutputStream, StreamDataCallback, StreamSpec};

/// [`OutputDriver`] backed by the host's default cpal output device
pub struct CpalDriver {
    device: cpal::Device,
}

impl CpalDriver {
    /// Bind to the default output device of the default host
    pub fn new() -> Result<Self, DriverError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(DriverError::NoDevice)?;
        info!(
            device = %device.name().unwrap_or_else(|_| "<unnamed>".into()),
            "bound cpal output device"
        );
        Ok(CpalDriver { device })
    }
}

impl OutputDriver for CpalDriver {
    fn open_output_stream(
        &self,
        spec: StreamSpec,
        callback: Arc<dyn StreamDataCallback>,
    ) -> Result<Box<dyn OutputStream>, DriverError> {
        // The channel-major source buffer layout coincides with cpal's
        // interleaved layout only for a single channel.
        if spec.channel_count != 1 {
            return Err(DriverError::Configuration(format!(
                "cpal backend renders mono streams only, got {} channels",
                spec.channel_count
            )));
        }

        let config = cpal::StreamConfig {
            channels: spec.channel_count,
            sample_rate: cpal::SampleRate(spec.sample_rate),
            buffer_size: cpal::BufferSize::Fixed(spec.frames_per_callback),
        };

        // Primed with the requested size; each callback overwrites it with
        // the frame count the host actually granted.
        let granted_frames = Arc::new(AtomicU32::new(spec.frames_per_callback));
        let observed_frames = Arc::clone(&granted_frames);
        let channels = usize::from(spec.channel_count);

        let stream = self
            .device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
                    let frames = data.len() / channels;
                    observed_frames.store(frames as u32, Ordering::Relaxed);
                    match callback.on_audio_ready(data, frames) {
                        CallbackStatus::Continue => {}
                        CallbackStatus::Stop => {
                            // Reserved for source-requested termination; cpal
                            // offers no stop channel from inside the callback,
                            // so stopping stays a control-thread operation.
                        }
                    }
                },
                |err| warn!("output stream error: {err}"),
                None,
            )
            .map_err(|err| DriverError::Open(err.to_string()))?;

        debug!(
            sample_rate = spec.sample_rate,
            frames = spec.frames_per_callback,
            "opened cpal output stream"
        );

        Ok(Box::new(CpalStream {
            stream,
            channel_count: spec.channel_count,
            granted_frames,
        }))
    }
}

struct CpalStream {
    stream: cpal::Stream,
    channel_count: u16,
    granted_frames: Arc<AtomicU32>,
}

impl OutputStream for CpalStream {
    fn start(&mut self) -> Result<(), DriverError> {
        self.stream
            .play()
            .map_err(|err| DriverError::Start(err.to_string()))
    }

    fn stop(&mut self) {
        if let Err(err) = self.stream.pause() {
            debug!("pause on stop reported: {err}");
        }
    }

    fn channel_count(&self) -> Option<u16> {
        Some(self.channel_count)
    }

    fn frames_per_callback(&self) -> Option<u32> {
        let frames = self.granted_frames.load(Ordering::Relaxed);
        (frames > 0).then_some(frames)
    }
}
