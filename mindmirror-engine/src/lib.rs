mod abandon;
pub mod error;
pub mod history;
pub mod recorder;
pub mod reflection;
pub mod render;
pub mod traits;

pub use error::{CaptureError, RequestError, RequestFailure, ViewError};
pub use history::HistoryView;
pub use recorder::{RecorderStage, RecorderView};
pub use reflection::ReflectionView;
pub use traits::{BackendApi, CaptureSession, Microphone};
