use super::convert::f32_to_i16;
use super::AudioFrame;
use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Frames buffered between the device callback and the sender (~10s at 100ms/frame)
const FRAME_BUFFER: usize = 100;

/// Capture from the default input device.
///
/// The cpal stream is not `Send` on every platform, so create and drop this on the
/// thread that consumes the frames.
pub struct MicrophoneCapture {
    stream: cpal::Stream,
    device_name: String,
}

impl MicrophoneCapture {
    /// Open the default input device and start capturing
    ///
    /// Returns the capture (keep it alive) and a receiver of raw device frames
    pub fn open_default() -> Result<(Self, mpsc::Receiver<AudioFrame>)> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .context("No input device available")?;
        let device_name = device.name().unwrap_or_else(|_| "unknown".to_string());

        let supported = device
            .default_input_config()
            .context("Failed to query input config")?;
        let sample_rate = supported.sample_rate().0;
        let channels = supported.channels();
        let sample_format = supported.sample_format();
        let stream_config: cpal::StreamConfig = supported.into();

        info!(
            "Opening microphone '{}' ({} Hz, {} ch, {:?})",
            device_name, sample_rate, channels, sample_format
        );

        let (tx, rx) = mpsc::channel(FRAME_BUFFER);
        let err_fn = |err| error!("Audio stream error: {}", err);

        let stream = match sample_format {
            cpal::SampleFormat::F32 => device.build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let samples = data.iter().map(|&s| f32_to_i16(s)).collect();
                    forward(&tx, samples, sample_rate, channels);
                },
                err_fn,
                None,
            )?,
            cpal::SampleFormat::I16 => device.build_input_stream(
                &stream_config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    forward(&tx, data.to_vec(), sample_rate, channels);
                },
                err_fn,
                None,
            )?,
            other => anyhow::bail!("Unsupported sample format: {:?}", other),
        };

        stream.play().context("Failed to start input stream")?;

        Ok((Self { stream, device_name }, rx))
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Pause the device; dropping the capture releases it
    pub fn stop(&self) {
        if let Err(e) = self.stream.pause() {
            warn!("Failed to pause input stream: {}", e);
        }
    }
}

fn forward(
    tx: &mpsc::Sender<AudioFrame>,
    samples: Vec<i16>,
    sample_rate: u32,
    channels: u16,
) {
    let frame = AudioFrame {
        samples,
        sample_rate,
        channels,
    };

    // Never block the device callback; a full or closed channel drops the frame
    if let Err(mpsc::error::TrySendError::Full(_)) = tx.try_send(frame) {
        warn!("Audio frame buffer full, dropping frame");
    }
}
