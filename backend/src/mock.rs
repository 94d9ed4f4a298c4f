//! An in-memory [`crate::Backend`] used by the server/CLI test suites and by
//! `--mock` demo runs, the way AccessKit's own tests build a synthetic
//! `TreeUpdate` instead of driving a real platform tree.

use std::collections::HashMap;

use bridge_types::{Element, ReadScope, Window};
use parking_lot::Mutex;

use crate::error::BackendError;
use crate::port::{
    ActionPerformer, Backend, CapturedImage, Clipboard, ImageFormat, Inputter, KeyCombo, Launcher,
    MouseButton, Reader, ScreenshotOpts, Screenshotter, ValueSetter, WindowManager,
};

#[derive(Default)]
struct Inner {
    windows: Vec<Window>,
    trees: HashMap<String, Element>,
    clipboard: String,
    frontmost: Option<(String, i32)>,
    /// Scripted tree replacements keyed by `(app, element_id, native_action)`,
    /// letting tests drive scenarios like spec §8's S7 (a press action opens
    /// a dialog that a coordinate click did not).
    action_effects: HashMap<(String, i32, String), Element>,
    click_log: Vec<(i32, i32, MouseButton)>,
    action_log: Vec<(String, i32, String)>,
    held_button: Option<(MouseButton, i32, i32)>,
    fail_next_move: bool,
    pointer: (i32, i32),
}

pub struct MockBackend {
    inner: Mutex<Inner>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn add_window(&self, window: Window, tree: Element) {
        let mut inner = self.inner.lock();
        if inner.frontmost.is_none() {
            inner.frontmost = Some((window.app.clone(), window.pid));
        }
        inner.trees.insert(window.app.clone(), tree);
        inner.windows.push(window);
    }

    pub fn set_action_effect(&self, app: &str, element_id: i32, action: &str, new_tree: Element) {
        self.inner
            .lock()
            .action_effects
            .insert((app.to_string(), element_id, action.to_string()), new_tree);
    }

    pub fn tree(&self, app: &str) -> Option<Element> {
        self.inner.lock().trees.get(app).cloned()
    }

    pub fn clipboard_text(&self) -> String {
        self.inner.lock().clipboard.clone()
    }

    pub fn click_log(&self) -> Vec<(i32, i32, MouseButton)> {
        self.inner.lock().click_log.clone()
    }

    pub fn action_log(&self) -> Vec<(String, i32, String)> {
        self.inner.lock().action_log.clone()
    }

    pub fn held_button(&self) -> Option<(MouseButton, i32, i32)> {
        self.inner.lock().held_button
    }

    /// Causes the next `move_mouse` call to fail, for exercising the drag
    /// handler's release-on-error invariant (spec §8 property 16).
    pub fn fail_next_move(&self) {
        self.inner.lock().fail_next_move = true;
    }

    fn find_tree_for(inner: &Inner, scope: &ReadScope) -> Result<Element, BackendError> {
        let app = scope.app.as_deref().ok_or(BackendError::WindowNotFound)?;
        inner.trees.get(app).cloned().ok_or(BackendError::WindowNotFound)
    }
}

impl WindowManager for MockBackend {
    fn list_windows(&self, app: Option<&str>, pid: Option<i32>) -> Result<Vec<Window>, BackendError> {
        let inner = self.inner.lock();
        Ok(inner
            .windows
            .iter()
            .filter(|w| app.is_none_or_eq(&w.app) && pid.is_none_or_eq(&w.pid))
            .cloned()
            .collect())
    }

    fn focus_window(&self, scope: &ReadScope) -> Result<(), BackendError> {
        let mut inner = self.inner.lock();
        let app = scope.app.clone().ok_or(BackendError::WindowNotFound)?;
        let window = inner
            .windows
            .iter()
            .find(|w| w.app == app)
            .ok_or(BackendError::WindowNotFound)?;
        inner.frontmost = Some((window.app.clone(), window.pid));
        Ok(())
    }

    fn frontmost_app(&self) -> Result<(String, i32), BackendError> {
        self.inner.lock().frontmost.clone().ok_or(BackendError::WindowNotFound)
    }
}

// `Option<&str>::is_none_or_eq`/`Option<i32>` helpers aren't std; small local
// extension trait kept private to this module.
trait OptEq<T: PartialEq + ?Sized> {
    fn is_none_or_eq(&self, other: &T) -> bool;
}

impl OptEq<str> for Option<&str> {
    fn is_none_or_eq(&self, other: &str) -> bool {
        match self {
            Some(v) => *v == other,
            None => true,
        }
    }
}

impl OptEq<i32> for Option<i32> {
    fn is_none_or_eq(&self, other: &i32) -> bool {
        match self {
            Some(v) => v == other,
            None => true,
        }
    }
}

impl Reader for MockBackend {
    fn read_elements(&self, scope: &ReadScope) -> Result<Element, BackendError> {
        let inner = self.inner.lock();
        Self::find_tree_for(&inner, scope)
    }
}

impl ActionPerformer for MockBackend {
    fn perform_action(&self, scope: &ReadScope, element_id: i32, native_action: &str) -> Result<(), BackendError> {
        let mut inner = self.inner.lock();
        let app = scope.app.clone().ok_or(BackendError::WindowNotFound)?;
        {
            let tree = inner.trees.get(&app).ok_or(BackendError::WindowNotFound)?;
            let element =
                bridge_consumer_ops_find_by_id(tree, element_id).ok_or(BackendError::StaleElement)?;
            if !element.has_action(native_action) && native_action != "press" {
                return Err(BackendError::ActionUnsupported(native_action.to_string()));
            }
        }
        inner
            .action_log
            .push((app.clone(), element_id, native_action.to_string()));
        if let Some(new_tree) = inner
            .action_effects
            .remove(&(app.clone(), element_id, native_action.to_string()))
        {
            inner.trees.insert(app, new_tree);
        }
        Ok(())
    }
}

impl ValueSetter for MockBackend {
    fn set_value(&self, scope: &ReadScope, element_id: i32, native_attribute: &str, value: &str) -> Result<(), BackendError> {
        let mut inner = self.inner.lock();
        let app = scope.app.clone().ok_or(BackendError::WindowNotFound)?;
        let tree = inner.trees.get_mut(&app).ok_or(BackendError::WindowNotFound)?;
        let element = bridge_consumer_ops_find_by_id_mut(tree, element_id).ok_or(BackendError::StaleElement)?;
        match native_attribute {
            "value" => element.value = Some(value.to_string()),
            "selected" => element.selected = value == "true",
            "focused" => element.focused = value == "true",
            other => return Err(BackendError::ActionUnsupported(other.to_string())),
        }
        Ok(())
    }
}

impl Inputter for MockBackend {
    fn click(&self, x: i32, y: i32, button: MouseButton, _count: u8) -> Result<(), BackendError> {
        let mut inner = self.inner.lock();
        inner.click_log.push((x, y, button));
        inner.pointer = (x, y);
        Ok(())
    }

    fn move_mouse(&self, x: i32, y: i32) -> Result<(), BackendError> {
        let mut inner = self.inner.lock();
        if inner.fail_next_move {
            inner.fail_next_move = false;
            return Err(BackendError::Platform("simulated move failure".to_string()));
        }
        inner.pointer = (x, y);
        Ok(())
    }

    fn scroll(&self, x: i32, y: i32, _dx: i32, _dy: i32) -> Result<(), BackendError> {
        self.inner.lock().pointer = (x, y);
        Ok(())
    }

    fn mouse_down(&self, x: i32, y: i32, button: MouseButton) -> Result<(), BackendError> {
        let mut inner = self.inner.lock();
        inner.held_button = Some((button, x, y));
        inner.pointer = (x, y);
        Ok(())
    }

    fn mouse_up(&self, x: i32, y: i32, _button: MouseButton) -> Result<(), BackendError> {
        let mut inner = self.inner.lock();
        inner.held_button = None;
        inner.pointer = (x, y);
        Ok(())
    }

    fn type_text(&self, _text: &str, _delay_ms: u64) -> Result<(), BackendError> {
        Ok(())
    }

    fn key_combo(&self, _combo: &KeyCombo) -> Result<(), BackendError> {
        Ok(())
    }

    fn pointer_position(&self) -> Result<(i32, i32), BackendError> {
        Ok(self.inner.lock().pointer)
    }
}

impl Screenshotter for MockBackend {
    fn capture_window(&self, _scope: &ReadScope, opts: &ScreenshotOpts) -> Result<CapturedImage, BackendError> {
        Ok(blank_image(opts))
    }

    fn capture_menu_bar(&self, opts: &ScreenshotOpts) -> Result<CapturedImage, BackendError> {
        Ok(blank_image(opts))
    }

    fn capture_rect(&self, _x: i32, _y: i32, w: i32, h: i32, opts: &ScreenshotOpts) -> Result<CapturedImage, BackendError> {
        let mut img = blank_image(opts);
        img.width = w.max(0) as u32;
        img.height = h.max(0) as u32;
        Ok(img)
    }
}

fn blank_image(opts: &ScreenshotOpts) -> CapturedImage {
    CapturedImage {
        format: opts.format,
        bytes: match opts.format {
            ImageFormat::Png => vec![0x89, b'P', b'N', b'G'],
            ImageFormat::Jpg => vec![0xFF, 0xD8, 0xFF],
        },
        width: 1,
        height: 1,
    }
}

impl Clipboard for MockBackend {
    fn get_text(&self) -> Result<String, BackendError> {
        Ok(self.inner.lock().clipboard.clone())
    }

    fn set_text(&self, text: &str) -> Result<(), BackendError> {
        self.inner.lock().clipboard = text.to_string();
        Ok(())
    }

    fn clear(&self) -> Result<(), BackendError> {
        self.inner.lock().clipboard.clear();
        Ok(())
    }
}

impl Launcher for MockBackend {
    fn open(&self, _target: &str) -> Result<(), BackendError> {
        Ok(())
    }
}

// Thin local copies of the two recursive lookups `bridge-consumer` exposes,
// kept dependency-free here since `bridge-backend` must not depend on
// `bridge-consumer` (the port sits below the tree-operations layer).
fn bridge_consumer_ops_find_by_id(node: &Element, id: i32) -> Option<&Element> {
    if node.id == id {
        return Some(node);
    }
    node.children.iter().find_map(|c| bridge_consumer_ops_find_by_id(c, id))
}

fn bridge_consumer_ops_find_by_id_mut(node: &mut Element, id: i32) -> Option<&mut Element> {
    if node.id == id {
        return Some(node);
    }
    node.children.iter_mut().find_map(|c| bridge_consumer_ops_find_by_id_mut(c, id))
}
