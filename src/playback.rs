//! Playback through an audio output device.
//!
//! The stimulus never manages a stream itself. It hands its signal and sample
//! rate to an [`AudioSink`] and asks it to stop; the sink owns whatever
//! background stream the device layer needs. [`CpalSink`] (feature `playback`)
//! drives the default output device through `cpal`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use ndarray::ArrayView2;
use tracing::debug;

use crate::{StimulusError, StimulusResult};
use crate::stimulus::{Stimulus, Synthesize};

/// Device channels (1-based) that the left and right signal columns are routed to.
pub const STEREO_MAPPING: [usize; 2] = [1, 2];

/// An audio output facility able to start and stop playback of a buffer.
pub trait AudioSink {
    /// Start playing `signal` (shape `(frames, channels)`) at `sample_rate`.
    ///
    /// Column `i` of the signal goes to device channel `mapping[i]` (1-based).
    /// With `blocking`, return only once playback has finished.
    fn play(
        &mut self,
        signal: ArrayView2<'_, f64>,
        sample_rate: u32,
        mapping: &[usize],
        blocking: bool,
    ) -> StimulusResult<()>;

    /// Halt any active playback.
    fn stop(&mut self) -> StimulusResult<()>;
}

impl<S: Synthesize> Stimulus<S> {
    /// Play the signal on `sink`, routing left/right to device channels 1/2.
    ///
    /// # Errors
    /// Propagates the sink's playback errors.
    pub fn play(&self, sink: &mut impl AudioSink, blocking: bool) -> StimulusResult<()> {
        debug!("Play requested with blocking set to {blocking}.");
        sink.play(
            self.signal().view(),
            self.sample_rate(),
            &STEREO_MAPPING,
            blocking,
        )
    }

    /// Stop whatever `sink` is currently playing.
    ///
    /// # Errors
    /// Propagates the sink's errors.
    pub fn stop(&self, sink: &mut impl AudioSink) -> StimulusResult<()> {
        debug!("Stop requested.");
        sink.stop()
    }
}

/// Completion state shared between a device stream's callbacks and its owner.
#[derive(Debug, Default)]
#[cfg_attr(not(feature = "playback"), allow(dead_code))]
pub(crate) struct StreamStatus {
    finished: AtomicBool,
    failed: AtomicBool,
}

#[cfg_attr(not(feature = "playback"), allow(dead_code))]
impl StreamStatus {
    pub(crate) const fn new(finished: bool) -> Self {
        Self {
            finished: AtomicBool::new(finished),
            failed: AtomicBool::new(false),
        }
    }

    pub(crate) fn mark_finished(&self) {
        self.finished.store(true, Ordering::Release);
    }

    /// A failed stream never delivers its remaining frames, so it also counts as finished.
    pub(crate) fn mark_failed(&self) {
        self.failed.store(true, Ordering::Release);
        self.finished.store(true, Ordering::Release);
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    pub(crate) fn has_failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }

    /// Block until the stream finishes or fails.
    pub(crate) fn wait(&self, poll_interval: Duration) -> StimulusResult<()> {
        while !self.is_finished() {
            thread::sleep(poll_interval);
        }
        if self.has_failed() {
            return Err(StimulusError::playback(
                "the audio stream reported an error before playback completed",
            ));
        }
        Ok(())
    }
}

#[cfg(feature = "playback")]
pub use device::CpalSink;

#[cfg(feature = "playback")]
mod device {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use cpal::{
        Device, Stream, StreamConfig,
        traits::{DeviceTrait, HostTrait, StreamTrait},
    };
    use ndarray::ArrayView2;
    use tracing::{debug, error};

    use super::{AudioSink, StreamStatus};
    use crate::{StimulusError, StimulusResult};

    const POLL_INTERVAL: Duration = Duration::from_millis(5);

    /// Plays buffers on the host's default output device.
    pub struct CpalSink {
        device: Device,
        stream: Option<Stream>,
        status: Arc<StreamStatus>,
    }

    impl CpalSink {
        /// Open the default output device.
        ///
        /// # Errors
        /// Returns [`StimulusError::Playback`] when no output device is available.
        pub fn new() -> StimulusResult<Self> {
            let host = cpal::default_host();
            let device = host
                .default_output_device()
                .ok_or_else(|| StimulusError::playback("No output device available"))?;
            Ok(Self {
                device,
                stream: None,
                status: Arc::new(StreamStatus::new(true)),
            })
        }

        /// Whether the last started buffer has been fully consumed, or its stream failed.
        pub fn is_finished(&self) -> bool {
            self.status.is_finished()
        }

        /// Whether the last started stream reported an error.
        pub fn has_failed(&self) -> bool {
            self.status.has_failed()
        }
    }

    /// Interleave `signal` into a device-layout buffer with `channels` channels.
    fn route(signal: ArrayView2<'_, f64>, mapping: &[usize], channels: usize) -> Vec<f32> {
        let mut out = vec![0.0_f32; signal.nrows() * channels];
        for (frame, row) in out.chunks_exact_mut(channels).zip(signal.rows()) {
            for (&target, &sample) in mapping.iter().zip(row.iter()) {
                frame[target - 1] = sample as f32;
            }
        }
        out
    }

    impl AudioSink for CpalSink {
        fn play(
            &mut self,
            signal: ArrayView2<'_, f64>,
            sample_rate: u32,
            mapping: &[usize],
            blocking: bool,
        ) -> StimulusResult<()> {
            if mapping.contains(&0) {
                return Err(StimulusError::invalid_parameter(
                    "mapping",
                    "device channels are numbered from 1",
                ));
            }
            let channels = mapping.iter().copied().max().unwrap_or(1).max(1);
            let channel_count = u16::try_from(channels).map_err(|_| {
                StimulusError::invalid_parameter("mapping", format!("too many channels: {channels}"))
            })?;

            self.stop()?;

            let data = Arc::new(route(signal, mapping, channels));
            let position = Arc::new(AtomicUsize::new(0));
            self.status = Arc::new(StreamStatus::new(data.is_empty()));

            let config = StreamConfig {
                channels: channel_count,
                sample_rate: cpal::SampleRate(sample_rate),
                buffer_size: cpal::BufferSize::Default,
            };

            let status = Arc::clone(&self.status);
            let error_status = Arc::clone(&self.status);
            let stream = self.device.build_output_stream(
                &config,
                move |out: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let start = position.load(Ordering::Relaxed);
                    let end = (start + out.len()).min(data.len());
                    let n = end.saturating_sub(start);
                    out[..n].copy_from_slice(&data[start..end]);
                    out[n..].fill(0.0);
                    position.store(end, Ordering::Relaxed);
                    if end >= data.len() {
                        status.mark_finished();
                    }
                },
                move |err| {
                    error!("Audio stream error: {err}");
                    error_status.mark_failed();
                },
                None,
            )?;
            stream.play()?;
            debug!("Started {channels}-channel stream at {sample_rate} [Hz].");
            self.stream = Some(stream);

            if blocking {
                let outcome = self.status.wait(POLL_INTERVAL);
                self.stop()?;
                return outcome;
            }
            Ok(())
        }

        fn stop(&mut self) -> StimulusResult<()> {
            if let Some(stream) = self.stream.take() {
                stream.pause()?;
                self.status.mark_finished();
                debug!("Stopped active stream.");
            }
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use ndarray::array;

        #[test]
        fn test_route_interleaves_by_mapping() {
            let signal = array![[0.5, -0.5], [0.25, -0.25]];
            assert_eq!(route(signal.view(), &[1, 2], 2), vec![0.5, -0.5, 0.25, -0.25]);
            assert_eq!(
                route(signal.view(), &[2, 3], 3),
                vec![0.0, 0.5, -0.5, 0.0, 0.25, -0.25]
            );
        }
    }
}
