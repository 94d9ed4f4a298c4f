//! The platform backend port and its in-memory mock (spec §6.1).
//!
//! This crate defines *only* the trait surface a real macOS AX / Windows UIA
//! / AT-SPI adapter would implement, plus `mock::MockBackend` for tests and
//! `--mock` runs. It depends on `bridge-types` alone, never on
//! `bridge-consumer` or `bridge-server`.

pub mod error;
pub mod mock;
pub mod port;

pub use error::BackendError;
pub use mock::MockBackend;
pub use port::{
    ActionPerformer, Backend, CapturedImage, Clipboard, ImageFormat, Inputter, KeyCombo, Launcher,
    MouseButton, Reader, ScreenshotOpts, Screenshotter, ValueSetter, WindowManager,
};
