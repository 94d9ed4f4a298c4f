use bridge_backend::BackendError;
use serde::Serialize;
use thiserror::Error;

/// One variant per row of spec §7's error-kind table. `kind()` gives the
/// wire-level discriminant (`{ok:false, error:"…", kind:"…"}`).
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("{0}")]
    PermissionDenied(String),
    #[error("target not found")]
    TargetNotFound,
    #[error("ambiguous target: {0:?}")]
    AmbiguousTarget(Vec<Candidate>),
    #[error("element reference is stale")]
    StaleElement,
    #[error("action unsupported: {0}")]
    ActionUnsupported(String),
    #[error("invalid arguments: {0}")]
    ValidationError(String),
    #[error("backend error: {0}")]
    Backend(String),
}

#[derive(Clone, Debug, Serialize)]
pub struct Candidate {
    pub id: i32,
    pub role: String,
    pub title: Option<String>,
}

impl BridgeError {
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeError::PermissionDenied(_) => "PermissionDenied",
            BridgeError::TargetNotFound => "TargetNotFound",
            BridgeError::AmbiguousTarget(_) => "AmbiguousTarget",
            BridgeError::StaleElement => "StaleElement",
            BridgeError::ActionUnsupported(_) => "ActionUnsupported",
            BridgeError::ValidationError(_) => "ValidationError",
            BridgeError::Backend(_) => "BackendError",
        }
    }
}

impl From<BackendError> for BridgeError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::AccessibilityPermissionDenied => {
                BridgeError::PermissionDenied("accessibility permission not granted".to_string())
            }
            BackendError::ScreenRecordingPermissionDenied => {
                BridgeError::PermissionDenied("screen recording permission not granted".to_string())
            }
            BackendError::WindowNotFound => BridgeError::TargetNotFound,
            BackendError::StaleElement => BridgeError::StaleElement,
            BackendError::ActionUnsupported(a) => BridgeError::ActionUnsupported(a),
            BackendError::Platform(msg) => BridgeError::Backend(msg),
        }
    }
}
