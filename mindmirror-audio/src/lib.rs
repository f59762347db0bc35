pub mod resample;
pub mod wav;

// Live capture is only wired up where we ship a microphone backend.
#[cfg(any(windows, target_os = "macos"))]
pub mod recorder;

#[cfg(any(windows, target_os = "macos"))]
pub use recorder::{AudioCaptureError, AudioRecorder, CapturedAudio};
