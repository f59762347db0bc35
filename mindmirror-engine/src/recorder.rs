use std::sync::Arc;

use mindmirror_core::types::{AnalysisResult, Recording, UserId};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::abandon::AbandonGuard;
use crate::error::{CaptureError, ViewError};
use crate::render::{AnalysisCard, RecorderSnapshot};
use crate::traits::{BackendApi, CaptureSession, Microphone};

pub const START_FAILED_MESSAGE: &str =
    "Failed to start recording. Please check microphone permissions.";
pub const STOP_FAILED_MESSAGE: &str = "Failed to finish recording. Please try again.";
pub const ANALYZE_FAILED_MESSAGE: &str = "Failed to analyze voice. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecorderStage {
    #[default]
    Idle,
    // The device is being opened.
    Starting,
    Recording,
    Recorded,
    Analyzing,
    Analyzed,
}

impl RecorderStage {
    pub fn label(self) -> &'static str {
        match self {
            RecorderStage::Idle => "idle",
            RecorderStage::Starting => "starting",
            RecorderStage::Recording => "recording",
            RecorderStage::Recorded => "recorded",
            RecorderStage::Analyzing => "analyzing",
            RecorderStage::Analyzed => "analyzed",
        }
    }
}

#[derive(Default)]
struct Inner {
    stage: RecorderStage,
    // Present exactly while `stage == Recording`. Dropping it releases the device.
    session: Option<Box<dyn CaptureSession>>,
    recording: Option<Recording>,
    result: Option<AnalysisResult>,
    error: Option<String>,
}

impl Inner {
    fn set_stage(&mut self, stage: RecorderStage) {
        let prev = self.stage;
        self.stage = stage;
        if prev != stage {
            log::info!("recorder stage: {:?} -> {:?}", prev, stage);
        }
    }

    fn invalid(&self, op: &'static str) -> ViewError {
        ViewError::InvalidState {
            op,
            stage: self.stage.label(),
        }
    }
}

/// Capture one clip, preview it, and submit it for analysis.
///
/// Clones share state. The capture session is owned here and nowhere else; when the
/// last handle is dropped any open session goes with it.
#[derive(Clone)]
pub struct RecorderView {
    backend: Arc<dyn BackendApi>,
    microphone: Arc<dyn Microphone>,
    user_id: UserId,
    inner: Arc<Mutex<Inner>>,
}

impl RecorderView {
    pub fn new(
        backend: Arc<dyn BackendApi>,
        microphone: Arc<dyn Microphone>,
        user_id: UserId,
    ) -> Self {
        Self {
            backend,
            microphone,
            user_id,
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    pub async fn stage(&self) -> RecorderStage {
        self.inner.lock().await.stage
    }

    /// Opens the microphone. The view reports `Starting` until the device is ready,
    /// and a second start in the meantime is rejected.
    pub async fn start_capture(&self) -> Result<(), ViewError> {
        {
            let mut inner = self.inner.lock().await;
            if inner.stage != RecorderStage::Idle {
                return Err(inner.invalid("start recording"));
            }
            inner.set_stage(RecorderStage::Starting);
        }
        let guard = AbandonGuard::new(&self.inner, |inner: &mut Inner| {
            if inner.stage == RecorderStage::Starting {
                log::warn!("start_capture abandoned");
                inner.set_stage(RecorderStage::Idle);
            }
        });

        // A session opened after the caller gave up is dropped with the task result.
        let microphone = self.microphone.clone();
        let opened = tokio::task::spawn_blocking(move || microphone.open())
            .await
            .unwrap_or_else(|e| Err(CaptureError::Failed(format!("capture task failed: {e}"))));

        let mut inner = self.inner.lock().await;
        guard.disarm();
        match opened {
            Ok(session) => {
                inner.session = Some(session);
                inner.error = None;
                inner.set_stage(RecorderStage::Recording);
                Ok(())
            }
            Err(cause) => {
                log::error!("start_capture failed: {cause}");
                inner.error = Some(START_FAILED_MESSAGE.into());
                inner.set_stage(RecorderStage::Idle);
                Err(ViewError::Permission {
                    message: START_FAILED_MESSAGE.into(),
                    cause,
                })
            }
        }
    }

    /// Stops the capture and keeps the clip.
    ///
    /// The view lock is held while the capture worker drains and joins, so
    /// snapshots taken meanwhile wait for it.
    pub async fn stop_capture(&self) -> Result<(), ViewError> {
        let mut inner = self.inner.lock().await;
        if inner.stage != RecorderStage::Recording {
            return Err(inner.invalid("stop recording"));
        }
        let Some(session) = inner.session.take() else {
            inner.set_stage(RecorderStage::Idle);
            return Err(inner.invalid("stop recording"));
        };

        // Dropped while the lock is held, so its restore runs as a task afterwards.
        let guard = AbandonGuard::new(&self.inner, |inner: &mut Inner| {
            if inner.stage == RecorderStage::Recording && inner.session.is_none() {
                log::warn!("stop_capture abandoned; clip discarded");
                inner.set_stage(RecorderStage::Idle);
            }
        });
        let finished = tokio::task::spawn_blocking(move || session.finish())
            .await
            .unwrap_or_else(|e| Err(CaptureError::Failed(format!("capture task failed: {e}"))));
        guard.disarm();

        match finished {
            Ok(recording) => {
                log::info!(
                    "captured {} ms of audio ({} bytes)",
                    recording.duration_ms,
                    recording.bytes.len()
                );
                inner.recording = Some(recording);
                inner.set_stage(RecorderStage::Recorded);
                Ok(())
            }
            Err(cause) => {
                log::error!("stop_capture failed: {cause}");
                inner.error = Some(STOP_FAILED_MESSAGE.into());
                inner.set_stage(RecorderStage::Idle);
                Err(ViewError::Capture {
                    message: STOP_FAILED_MESSAGE.into(),
                    cause,
                })
            }
        }
    }

    /// Adopts an existing clip (e.g. a file) in place of a live capture.
    pub async fn attach_recording(&self, recording: Recording) -> Result<(), ViewError> {
        let mut inner = self.inner.lock().await;
        if inner.stage != RecorderStage::Idle {
            return Err(inner.invalid("attach a recording"));
        }
        inner.recording = Some(recording);
        inner.error = None;
        inner.set_stage(RecorderStage::Recorded);
        Ok(())
    }

    /// Discards the clip and any result. Closes an open capture session.
    pub async fn reset(&self) -> Result<(), ViewError> {
        let mut inner = self.inner.lock().await;
        if matches!(inner.stage, RecorderStage::Starting | RecorderStage::Analyzing) {
            return Err(inner.invalid("reset"));
        }
        if inner.session.take().is_some() {
            log::info!("capture session discarded on reset");
        }
        inner.recording = None;
        inner.result = None;
        inner.error = None;
        inner.set_stage(RecorderStage::Idle);
        Ok(())
    }

    pub async fn submit_for_analysis(&self) -> Result<AnalysisResult, ViewError> {
        let recording = {
            let mut inner = self.inner.lock().await;
            match inner.stage {
                RecorderStage::Recorded => {}
                RecorderStage::Analyzing => return Err(ViewError::Busy),
                _ => return Err(inner.invalid("submit for analysis")),
            }
            let Some(recording) = inner.recording.clone() else {
                return Err(inner.invalid("submit for analysis"));
            };
            inner.error = None;
            inner.set_stage(RecorderStage::Analyzing);
            recording
        };

        let guard = AbandonGuard::new(&self.inner, |inner: &mut Inner| {
            if inner.stage == RecorderStage::Analyzing {
                log::warn!("analysis abandoned; clip kept for retry");
                inner.set_stage(RecorderStage::Recorded);
            }
        });
        let res = self.backend.analyze(&self.user_id, &recording).await;

        let mut inner = self.inner.lock().await;
        guard.disarm();
        match res {
            Ok(result) => {
                log::info!("analysis received: mood={}", result.mood);
                inner.result = Some(result.clone());
                inner.set_stage(RecorderStage::Analyzed);
                Ok(result)
            }
            Err(cause) => {
                log::error!("analysis failed: {cause}");
                // The clip stays so the user can retry.
                inner.error = Some(ANALYZE_FAILED_MESSAGE.into());
                inner.set_stage(RecorderStage::Recorded);
                Err(ViewError::request(ANALYZE_FAILED_MESSAGE, cause))
            }
        }
    }

    /// The current clip, for preview.
    pub async fn recording(&self) -> Option<Recording> {
        self.inner.lock().await.recording.clone()
    }

    pub async fn result(&self) -> Option<AnalysisResult> {
        self.inner.lock().await.result.clone()
    }

    pub async fn snapshot(&self) -> RecorderSnapshot {
        let inner = self.inner.lock().await;
        let stage = inner.stage;
        RecorderSnapshot {
            stage,
            can_start: stage == RecorderStage::Idle,
            can_stop: stage == RecorderStage::Recording,
            can_reset: matches!(
                stage,
                RecorderStage::Recording | RecorderStage::Recorded | RecorderStage::Analyzed
            ),
            can_submit: stage == RecorderStage::Recorded,
            is_analyzing: stage == RecorderStage::Analyzing,
            recording_duration_ms: inner.recording.as_ref().map(|r| r.duration_ms),
            analysis: inner.result.as_ref().map(AnalysisCard::from_result),
            error: inner.error.clone(),
        }
    }
}
