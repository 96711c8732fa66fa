//! Default output device and the realtime stream the engine renders into

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum AudioOutputError {
    #[error("No audio output device available")]
    NoDevice,
    #[error("Output device has no usable config: {0}")]
    Config(String),
    #[error("Output stream failed: {0}")]
    Stream(String),
}

/// Shape of the interleaved buffers handed to the render callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDeviceInfo {
    pub name: String,
    pub format: StreamFormat,
}

fn open_default_device() -> Result<(cpal::Device, cpal::SupportedStreamConfig), AudioOutputError> {
    let device = cpal::default_host()
        .default_output_device()
        .ok_or(AudioOutputError::NoDevice)?;
    let config = device
        .default_output_config()
        .map_err(|e| AudioOutputError::Config(e.to_string()))?;
    Ok((device, config))
}

/// Describe the default output device without opening a stream
pub fn default_device_info() -> Result<OutputDeviceInfo, AudioOutputError> {
    let (device, config) = open_default_device()?;
    Ok(OutputDeviceInfo {
        name: device.name().unwrap_or_default(),
        format: StreamFormat {
            sample_rate: config.sample_rate().0,
            channels: config.channels(),
        },
    })
}

/// A running f32 output stream. Rendering stops when this is stopped or dropped.
pub struct RealtimeOutputStream {
    active: Arc<AtomicBool>,
    info: OutputDeviceInfo,
    _stream: cpal::Stream,
}

impl RealtimeOutputStream {
    pub fn start<F>(mut render: F) -> Result<Self, AudioOutputError>
    where
        F: FnMut(&mut [f32], StreamFormat) + Send + 'static,
    {
        let (device, supported) = open_default_device()?;
        let format = StreamFormat {
            sample_rate: supported.sample_rate().0,
            channels: supported.channels(),
        };

        let config: cpal::StreamConfig = supported.into();
        let active = Arc::new(AtomicBool::new(true));
        let callback_active = active.clone();

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if callback_active.load(Ordering::Acquire) {
                        render(data, format);
                    } else {
                        data.fill(0.0);
                    }
                },
                |err| error!("Output stream error: {}", err),
                None,
            )
            .map_err(|e| AudioOutputError::Stream(e.to_string()))?;
        stream.play().map_err(|e| AudioOutputError::Stream(e.to_string()))?;

        let info = OutputDeviceInfo {
            name: device.name().unwrap_or_default(),
            format,
        };
        info!(device = %info.name, sample_rate = format.sample_rate, channels = format.channels, "Output stream running");

        Ok(Self { active, info, _stream: stream })
    }

    pub fn info(&self) -> &OutputDeviceInfo {
        &self.info
    }

    /// Silence the callback; the device is released on drop
    pub fn stop(&self) {
        self.active.store(false, Ordering::Release);
    }
}

impl Drop for RealtimeOutputStream {
    fn drop(&mut self) {
        self.stop();
    }
}
