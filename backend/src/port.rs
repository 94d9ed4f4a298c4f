//! The platform backend port (spec §6.1). Treated as a single external
//! collaborator with seven capability groups; real OS adapters (macOS AX,
//! Windows UIA, AT-SPI) are out of scope for this repo (spec §1) and would
//! implement this trait the way `accesskit_macos`/`accesskit_windows`/
//! `accesskit_unix` sit behind `accesskit_consumer`.

use bridge_types::{Element, ReadScope, Window};

use crate::error::BackendError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyCombo {
    pub cmd: bool,
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    /// The non-modifier key, e.g. `"return"`, `"t"`, `"f1"`.
    pub key: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpg,
}

#[derive(Clone, Debug)]
pub struct ScreenshotOpts {
    pub format: ImageFormat,
    pub quality: u8,
    pub scale: f64,
}

impl Default for ScreenshotOpts {
    fn default() -> Self {
        Self {
            format: ImageFormat::Png,
            quality: 80,
            scale: 0.5,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CapturedImage {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Window enumeration and focus (spec §6.1 `ListWindows`, `FocusWindow`,
/// `GetFrontmostApp`).
pub trait WindowManager {
    fn list_windows(&self, app: Option<&str>, pid: Option<i32>) -> Result<Vec<Window>, BackendError>;
    fn focus_window(&self, scope: &ReadScope) -> Result<(), BackendError>;
    fn frontmost_app(&self) -> Result<(String, i32), BackendError>;
}

/// Accessibility-tree traversal (spec §6.1 `ReadElements`). IDs must be
/// assigned in a stable, deterministic order: the same tree read twice
/// produces the same ids.
pub trait Reader {
    fn read_elements(&self, scope: &ReadScope) -> Result<Element, BackendError>;
}

/// Direct accessibility actions and value writes (spec §6.1 `PerformAction`,
/// `SetValue`).
pub trait ActionPerformer {
    fn perform_action(
        &self,
        scope: &ReadScope,
        element_id: i32,
        native_action: &str,
    ) -> Result<(), BackendError>;
}

pub trait ValueSetter {
    fn set_value(
        &self,
        scope: &ReadScope,
        element_id: i32,
        native_attribute: &str,
        value: &str,
    ) -> Result<(), BackendError>;
}

/// Mouse, keyboard, and scroll event synthesis (spec §6.1).
pub trait Inputter {
    fn click(&self, x: i32, y: i32, button: MouseButton, count: u8) -> Result<(), BackendError>;
    fn move_mouse(&self, x: i32, y: i32) -> Result<(), BackendError>;
    fn scroll(&self, x: i32, y: i32, dx: i32, dy: i32) -> Result<(), BackendError>;
    fn mouse_down(&self, x: i32, y: i32, button: MouseButton) -> Result<(), BackendError>;
    fn mouse_up(&self, x: i32, y: i32, button: MouseButton) -> Result<(), BackendError>;
    fn type_text(&self, text: &str, delay_ms: u64) -> Result<(), BackendError>;
    fn key_combo(&self, combo: &KeyCombo) -> Result<(), BackendError>;
    /// Current on-screen cursor position, used as the scroll/hover fallback
    /// point when the caller gives neither a target nor `x`/`y`.
    fn pointer_position(&self) -> Result<(i32, i32), BackendError>;
}

/// Screen capture (spec §6.1 `CaptureWindow` and helpers).
pub trait Screenshotter {
    fn capture_window(&self, scope: &ReadScope, opts: &ScreenshotOpts) -> Result<CapturedImage, BackendError>;
    fn capture_menu_bar(&self, opts: &ScreenshotOpts) -> Result<CapturedImage, BackendError>;
    fn capture_rect(&self, x: i32, y: i32, w: i32, h: i32, opts: &ScreenshotOpts) -> Result<CapturedImage, BackendError>;
}

/// Clipboard access (spec §6.1 `Clipboard`).
pub trait Clipboard {
    fn get_text(&self) -> Result<String, BackendError>;
    fn set_text(&self, text: &str) -> Result<(), BackendError>;
    fn clear(&self) -> Result<(), BackendError>;
}

/// Launches a URL, file, or app by platform delegation (used by the `open`
/// handler).
pub trait Launcher {
    fn open(&self, target: &str) -> Result<(), BackendError>;
}

/// The full backend port: every capability group the request engine needs,
/// object-safe so the server can hold `Arc<dyn Backend>`.
pub trait Backend:
    WindowManager + Reader + ActionPerformer + ValueSetter + Inputter + Screenshotter + Clipboard + Launcher + Send + Sync
{
}

impl<T> Backend for T where
    T: WindowManager + Reader + ActionPerformer + ValueSetter + Inputter + Screenshotter + Clipboard + Launcher + Send + Sync
{
}
