use async_trait::async_trait;
use mindmirror_core::types::{
    AnalysisResult, HealthStatus, Recording, ReflectionRequest, ReflectionResult, TrendReport,
    UserHistory, UserId,
};
use mindmirror_core::window::LookbackWindow;

use crate::error::{CaptureError, RequestError};

/// The MindMirror backend, as seen by the views.
#[async_trait]
pub trait BackendApi: Send + Sync {
    async fn analyze(
        &self,
        user_id: &UserId,
        recording: &Recording,
    ) -> Result<AnalysisResult, RequestError>;

    async fn reflect(&self, request: &ReflectionRequest) -> Result<ReflectionResult, RequestError>;

    async fn history(
        &self,
        user_id: &UserId,
        window: LookbackWindow,
    ) -> Result<UserHistory, RequestError>;

    async fn trends(&self, user_id: &UserId, days: u32) -> Result<TrendReport, RequestError>;

    async fn health(&self) -> Result<HealthStatus, RequestError>;
}

/// Source of capture sessions. Implementations may block (device enumeration,
/// stream startup); the recorder view calls them off the async executor.
pub trait Microphone: Send + Sync {
    fn open(&self) -> Result<Box<dyn CaptureSession>, CaptureError>;
}

/// One open microphone. Owns the input device until `finish` or drop.
pub trait CaptureSession: Send {
    /// Stops capture, releases the device and encodes what was buffered.
    fn finish(self: Box<Self>) -> Result<Recording, CaptureError>;
}
