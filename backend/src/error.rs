use thiserror::Error;

/// Errors a [`crate::Backend`] implementation can raise. These map onto a
/// subset of the handler-level error kinds in spec §7 (`PermissionDenied`,
/// `TargetNotFound`, `StaleElement`, `ActionUnsupported`, `BackendError`);
/// the request engine is responsible for adding `AmbiguousTarget`,
/// `ValidationError`, `Timeout`, and `VerifyFailed`, which are resolution-
/// and verification-level concerns, not backend concerns.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("accessibility permission not granted")]
    AccessibilityPermissionDenied,
    #[error("screen recording permission not granted")]
    ScreenRecordingPermissionDenied,
    #[error("no window found for the given scope")]
    WindowNotFound,
    #[error("element reference is stale: the tree changed since it was read")]
    StaleElement,
    #[error("element does not support action `{0}`")]
    ActionUnsupported(String),
    #[error("platform call failed: {0}")]
    Platform(String),
}
