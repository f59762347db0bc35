use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestFailure {
    /// Connection refused, DNS, timeout, or an unreadable body.
    Transport,
    /// The backend answered with a non-2xx status.
    Status(u16),
    /// 2xx, but the body did not match the contract.
    Decode,
}

impl std::fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestFailure::Transport => f.write_str("transport error"),
            RequestFailure::Status(code) => write!(f, "status {code}"),
            RequestFailure::Decode => f.write_str("invalid response body"),
        }
    }
}

/// Any failed backend call.
///
/// The kind is kept for logs only; users see the same message for every kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {detail}")]
pub struct RequestError {
    pub kind: RequestFailure,
    pub detail: String,
}

impl RequestError {
    pub fn transport(detail: impl Into<String>) -> Self {
        Self {
            kind: RequestFailure::Transport,
            detail: detail.into(),
        }
    }

    pub fn status(code: u16, detail: impl Into<String>) -> Self {
        Self {
            kind: RequestFailure::Status(code),
            detail: detail.into(),
        }
    }

    pub fn decode(detail: impl Into<String>) -> Self {
        Self {
            kind: RequestFailure::Decode,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("microphone access denied: {0}")]
    PermissionDenied(String),

    #[error("no input device found")]
    NoInputDevice,

    #[error("audio capture is not supported on this platform")]
    Unsupported,

    #[error("audio capture failed: {0}")]
    Failed(String),
}

/// Errors returned by view operations. Every variant is recoverable: the view
/// stays interactive and the same action can be retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("{message}")]
    Permission {
        message: String,
        #[source]
        cause: CaptureError,
    },

    #[error("{message}")]
    Capture {
        message: String,
        #[source]
        cause: CaptureError,
    },

    #[error("{0}")]
    Validation(String),

    #[error("{message}")]
    Request {
        message: String,
        #[source]
        cause: RequestError,
    },

    #[error("another request for this action is already in flight")]
    Busy,

    #[error("cannot {op} while {stage}")]
    InvalidState {
        op: &'static str,
        stage: &'static str,
    },
}

impl ViewError {
    pub fn request(message: impl Into<String>, cause: RequestError) -> Self {
        ViewError::Request {
            message: message.into(),
            cause,
        }
    }

    /// Short text suitable for showing next to the control that failed.
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ViewError::Validation(_))
    }
}
