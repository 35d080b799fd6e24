//! Scripted driver for tests and headless environments
//!
//! Records every lifecycle call it receives, lets a test drive the registered
//! real-time callback synchronously via [`MockDriver::pump`], and can be told
//! to negotiate different stream parameters than requested or to fail the
//! open/start steps with an injected error.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::{DriverError, OutputDriver, OutputStream, StreamDataCallback, StreamSpec};

/// One lifecycle call observed by the mock driver, in call order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverEvent {
    /// A stream was opened with the given requested parameters
    Open(StreamSpec),
    /// The open stream was started
    Start,
    /// The open stream was stopped
    Stop,
    /// The stream handle was released
    Close,
}

/// Registration of the currently open stream: the callback target, the
/// granted parameters, and the generation stamped at open time so a
/// superseded handle can tell it no longer owns the registration.
struct ActiveStream {
    generation: u64,
    callback: Arc<dyn StreamDataCallback>,
    spec: StreamSpec,
}

#[derive(Default)]
struct MockState {
    events: Mutex<Vec<DriverEvent>>,
    active: Mutex<Option<ActiveStream>>,
    next_generation: AtomicU64,
    negotiated: Mutex<Option<(u16, u32)>>,
    fail_open: Mutex<Option<DriverError>>,
    fail_start: Mutex<Option<DriverError>>,
}

/// Deterministic in-memory [`OutputDriver`].
///
/// Cloning is cheap and shares state, so a test can hand one clone to the
/// player under test and keep another to inspect events and pump callbacks.
#[derive(Clone, Default)]
pub struct MockDriver {
    state: Arc<MockState>,
}

impl MockDriver {
    /// Create a mock driver that grants every requested configuration
    pub fn new() -> Self {
        MockDriver::default()
    }

    /// Grant different negotiated parameters than the ones requested
    pub fn negotiate(&self, channel_count: u16, frames_per_callback: u32) {
        *self.state.negotiated.lock() = Some((channel_count, frames_per_callback));
    }

    /// Fail the next stream open with `error`
    pub fn fail_next_open(&self, error: DriverError) {
        *self.state.fail_open.lock() = Some(error);
    }

    /// Fail the next stream start with `error`
    pub fn fail_next_start(&self, error: DriverError) {
        *self.state.fail_start.lock() = Some(error);
    }

    /// Lifecycle calls observed so far, in call order
    pub fn events(&self) -> Vec<DriverEvent> {
        self.state.events.lock().clone()
    }

    /// Invoke the registered data callback once, as the driver's real-time
    /// thread would, with a zeroed buffer of `frames` frames.
    ///
    /// Returns the rendered buffer (`frames * negotiated channels` samples),
    /// or `None` when no stream is open.
    pub fn pump(&self, frames: usize) -> Option<Vec<f32>> {
        let (callback, spec) = {
            let active = self.state.active.lock();
            let active = active.as_ref()?;
            (Arc::clone(&active.callback), active.spec)
        };
        let mut buffer = vec![0.0_f32; frames * usize::from(spec.channel_count)];
        let _status = callback.on_audio_ready(&mut buffer, frames);
        Some(buffer)
    }

    fn record(&self, event: DriverEvent) {
        self.state.events.lock().push(event);
    }
}

impl OutputDriver for MockDriver {
    fn open_output_stream(
        &self,
        spec: StreamSpec,
        callback: Arc<dyn StreamDataCallback>,
    ) -> Result<Box<dyn OutputStream>, DriverError> {
        if let Some(error) = self.state.fail_open.lock().take() {
            return Err(error);
        }

        let granted = match *self.state.negotiated.lock() {
            Some((channel_count, frames_per_callback)) => StreamSpec {
                channel_count,
                frames_per_callback,
                ..spec
            },
            None => spec,
        };

        self.record(DriverEvent::Open(spec));
        let generation = self.state.next_generation.fetch_add(1, Ordering::Relaxed);
        *self.state.active.lock() = Some(ActiveStream {
            generation,
            callback,
            spec: granted,
        });

        Ok(Box::new(MockStream {
            driver: self.clone(),
            granted,
            generation,
        }))
    }
}

struct MockStream {
    driver: MockDriver,
    granted: StreamSpec,
    generation: u64,
}

impl OutputStream for MockStream {
    fn start(&mut self) -> Result<(), DriverError> {
        if let Some(error) = self.driver.state.fail_start.lock().take() {
            return Err(error);
        }
        self.driver.record(DriverEvent::Start);
        Ok(())
    }

    fn stop(&mut self) {
        self.driver.record(DriverEvent::Stop);
    }

    fn channel_count(&self) -> Option<u16> {
        Some(self.granted.channel_count)
    }

    fn frames_per_callback(&self) -> Option<u32> {
        Some(self.granted.frames_per_callback)
    }
}

impl Drop for MockStream {
    fn drop(&mut self) {
        // Closing deregisters this stream's callback, but only if the
        // registration is still ours: a handle superseded by a newer open
        // must not wipe its replacement's registration.
        let mut active = self.driver.state.active.lock();
        if active
            .as_ref()
            .is_some_and(|a| a.generation == self.generation)
        {
            *active = None;
        }
        drop(active);
        self.driver.record(DriverEvent::Close);
    }
}
