//! Microphone adapters behind the engine's `Microphone` seam.

use mindmirror_engine::error::CaptureError;
use mindmirror_engine::traits::{CaptureSession, Microphone};

#[cfg(any(windows, target_os = "macos"))]
pub use cpal_mic::CpalMicrophone;

/// Input device names, or an empty list where live capture is unavailable.
pub fn list_input_devices() -> Result<Vec<String>, CaptureError> {
    #[cfg(any(windows, target_os = "macos"))]
    {
        mindmirror_audio::AudioRecorder::list_input_device_names()
            .map_err(|e| CaptureError::Failed(e.to_string()))
    }
    #[cfg(not(any(windows, target_os = "macos")))]
    {
        Ok(Vec::new())
    }
}

/// Platform default microphone, honoring an optional device name.
pub fn default_microphone(device: Option<String>) -> Box<dyn Microphone> {
    #[cfg(any(windows, target_os = "macos"))]
    {
        Box::new(CpalMicrophone::new(device))
    }
    #[cfg(not(any(windows, target_os = "macos")))]
    {
        if let Some(name) = device {
            log::warn!("microphone '{name}' configured, but live capture is unsupported here");
        }
        Box::new(UnsupportedMicrophone)
    }
}

/// Stand-in where no capture backend exists. Recordings must come from files.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedMicrophone;

impl Microphone for UnsupportedMicrophone {
    fn open(&self) -> Result<Box<dyn CaptureSession>, CaptureError> {
        Err(CaptureError::Unsupported)
    }
}

#[cfg(any(windows, target_os = "macos"))]
mod cpal_mic {
    use mindmirror_audio::resample::TARGET_SAMPLE_RATE_HZ;
    use mindmirror_audio::wav::{duration_ms, encode_wav_mono_pcm16};
    use mindmirror_audio::{AudioCaptureError, AudioRecorder};
    use mindmirror_core::types::Recording;
    use mindmirror_engine::error::CaptureError;
    use mindmirror_engine::traits::{CaptureSession, Microphone};

    #[derive(Debug, Clone, Default)]
    pub struct CpalMicrophone {
        device: Option<String>,
    }

    impl CpalMicrophone {
        pub fn new(device: Option<String>) -> Self {
            Self { device }
        }
    }

    fn map_err(e: AudioCaptureError) -> CaptureError {
        match e {
            AudioCaptureError::NoInputDevice => CaptureError::NoInputDevice,
            // cpal reports a blocked microphone as a stream build failure from the worker.
            AudioCaptureError::Worker(msg) if msg.to_lowercase().contains("permission") => {
                CaptureError::PermissionDenied(msg)
            }
            other => CaptureError::Failed(other.to_string()),
        }
    }

    impl Microphone for CpalMicrophone {
        fn open(&self) -> Result<Box<dyn CaptureSession>, CaptureError> {
            let recorder = AudioRecorder::open_named(self.device.as_deref()).map_err(map_err)?;
            log::info!(
                "capturing from '{}' at {} Hz",
                recorder.device_name(),
                recorder.sample_rate_hz()
            );
            recorder.start().map_err(map_err)?;
            Ok(Box::new(CpalSession { recorder }))
        }
    }

    struct CpalSession {
        recorder: AudioRecorder,
    }

    impl CaptureSession for CpalSession {
        fn finish(self: Box<Self>) -> Result<Recording, CaptureError> {
            let CpalSession { recorder } = *self;
            let captured = recorder
                .finish()
                .and_then(|c| c.resampled_to(TARGET_SAMPLE_RATE_HZ))
                .map_err(map_err)?;
            let wav = encode_wav_mono_pcm16(&captured.samples, captured.sample_rate_hz);
            Ok(Recording::wav(
                wav,
                duration_ms(captured.samples.len(), captured.sample_rate_hz),
            ))
        }
    }
}
