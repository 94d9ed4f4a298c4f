//! `click`, `type`, `action`, `set_value`, `scroll`, `hover`, `drag`, `focus`
//! handlers (spec §4.6).

use std::thread::sleep;
use std::time::Duration;

use bridge_backend::{KeyCombo, MouseButton};
use bridge_consumer::ops;
use bridge_types::{Direction, Element, FlatElement, ReadScope, Role, TargetSpec};
use serde::{Deserialize, Serialize};

use crate::error::BridgeError;
use crate::resolve::{resolve_target, ResolvedTarget};
use crate::server::Server;

fn scope_for(app: Option<&str>, window: Option<&str>, pid: Option<i32>) -> ReadScope {
    ReadScope {
        app: app.map(str::to_string),
        window: window.map(str::to_string),
        window_id: None,
        pid,
        depth: None,
    }
}

fn mouse_button_from(s: &str) -> Result<MouseButton, BridgeError> {
    match s {
        "left" => Ok(MouseButton::Left),
        "right" => Ok(MouseButton::Right),
        "middle" => Ok(MouseButton::Middle),
        other => Err(BridgeError::ValidationError(format!("unknown mouse button `{other}`"))),
    }
}

/// Up to 20 `txt` elements with non-empty value in scope, the one with the
/// largest bounds area marked `primary` (spec §4.6 `type`, glossary
/// "Display element").
fn collect_display_elements(root: &Element) -> (Vec<FlatElement>, Option<i32>) {
    let flat = ops::flatten(root);
    let mut displays: Vec<FlatElement> = flat
        .into_iter()
        .filter(|e| e.role == Role::Txt && e.value.as_deref().is_some_and(|v| !v.is_empty()))
        .take(20)
        .collect();
    let primary = displays
        .iter()
        .max_by_key(|e| e.bounds.area())
        .map(|e| e.id);
    displays.truncate(20);
    (displays, primary)
}

// ---------------------------------------------------------------------
// click
// ---------------------------------------------------------------------

#[derive(Clone, Debug, Deserialize)]
pub struct ClickRequest {
    pub target: TargetSpec,
    #[serde(default)]
    pub app: Option<String>,
    #[serde(default)]
    pub window: Option<String>,
    #[serde(default)]
    pub pid: Option<i32>,
    #[serde(default = "default_button")]
    pub button: String,
    #[serde(default = "default_count")]
    pub count: u8,
    #[serde(default)]
    pub near: Option<Direction>,
    #[serde(default)]
    pub verify: bool,
    #[serde(default)]
    pub post_read: bool,
}

fn default_button() -> String {
    "left".to_string()
}

fn default_count() -> u8 {
    1
}

#[derive(Clone, Debug, Serialize)]
pub struct Attempt {
    pub method: String,
    pub result: String,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ClickResponse {
    /// Set to `false` only when `verify:true` exhausts every retry without
    /// an observed change (spec §7 `VerifyFailed`) — overrides `envelope()`'s
    /// default `ok:true` for an otherwise-successful handler call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ok: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retried: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attempts: Vec<Attempt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

fn element_observably_changed(before: &Element, after: &Option<Element>, before_child_count: usize) -> bool {
    match after {
        None => true,
        Some(after) => {
            before.value != after.value
                || before.focused != after.focused
                || before.selected != after.selected
                || before.title != after.title
                || after.children.len() != before_child_count
        }
    }
}

pub fn click(server: &Server, req: &ClickRequest) -> Result<ClickResponse, BridgeError> {
    let scope = scope_for(req.app.as_deref(), req.window.as_deref(), req.pid);
    let now = server.now_ms();
    let button = mouse_button_from(&req.button)?;
    let resolved = server.with_backend(|b| resolve_target(&server.cache, b, now, &scope, &req.target, req.near))?;
    let point = resolved.point();

    if !req.verify {
        server.with_backend(|b| b.click(point.0, point.1, button, req.count)).map_err(BridgeError::from)?;
        return Ok(ClickResponse::default());
    }

    let element = resolved.element().cloned();
    let mut attempts = Vec::new();

    server.with_backend(|b| b.click(point.0, point.1, button, req.count)).map_err(BridgeError::from)?;
    sleep(Duration::from_millis(server.config.verify_delay_ms));

    let before_child_count = element.as_ref().map(|e| e.children.len()).unwrap_or(0);
    let mut changed = false;
    let mut verified_after = None;

    if let Some(el) = &element {
        let refreshed = server
            .with_backend(|b| b.read_elements(&scope))
            .ok()
            .and_then(|tree| ops::find_by_id(&tree, el.id).cloned());
        changed = element_observably_changed(el, &refreshed, before_child_count);
        verified_after = refreshed;
        attempts.push(Attempt {
            method: "click".to_string(),
            result: if changed { "changed".to_string() } else { "no state change".to_string() },
        });
    } else {
        changed = true;
        attempts.push(Attempt {
            method: "click".to_string(),
            result: "no element to verify against".to_string(),
        });
    }

    let mut retried = false;
    if !changed {
        if let Some(el) = &element {
            retried = true;
            let action_result = server.with_backend(|b| b.perform_action(&scope, el.id, "press"));
            sleep(Duration::from_millis(server.config.verify_delay_ms));
            let refreshed = server
                .with_backend(|b| b.read_elements(&scope))
                .ok()
                .and_then(|tree| ops::find_by_id(&tree, el.id).cloned());
            changed = action_result.is_ok() && element_observably_changed(el, &refreshed, before_child_count);
            verified_after = refreshed;
            attempts.push(Attempt {
                method: "action".to_string(),
                result: if changed { "changed".to_string() } else { "no state change".to_string() },
            });
        }
    }

    if !changed {
        if let Some(el) = &element {
            server
                .with_backend(|b| b.click(point.0 + 1, point.1, button, req.count))
                .map_err(BridgeError::from)?;
            sleep(Duration::from_millis(server.config.verify_delay_ms));
            let refreshed = server
                .with_backend(|b| b.read_elements(&scope))
                .ok()
                .and_then(|tree| ops::find_by_id(&tree, el.id).cloned());
            changed = element_observably_changed(el, &refreshed, before_child_count);
            verified_after = refreshed;
            attempts.push(Attempt {
                method: "click-offset".to_string(),
                result: if changed { "changed".to_string() } else { "no state change".to_string() },
            });
        }
    }

    let state = if req.post_read {
        verified_after.as_ref().map(|e| format!("{e:?}"))
    } else {
        None
    };

    Ok(ClickResponse {
        ok: if changed { None } else { Some(false) },
        verified: Some(changed),
        retried: Some(retried),
        attempts,
        state,
    })
}

// ---------------------------------------------------------------------
// type
// ---------------------------------------------------------------------

#[derive(Clone, Debug, Default, Deserialize)]
pub struct TypeRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub target: Option<TargetSpec>,
    #[serde(default)]
    pub app: Option<String>,
    #[serde(default)]
    pub window: Option<String>,
    #[serde(default)]
    pub pid: Option<i32>,
    #[serde(default = "default_type_delay")]
    pub delay_ms: u64,
}

fn default_type_delay() -> u64 {
    5
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct TypeResponse {
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Element>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focused: Option<Element>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub display: Vec<FlatElement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary: Option<i32>,
}

fn parse_key_combo(spec: &str) -> Result<KeyCombo, BridgeError> {
    let mut combo = KeyCombo {
        cmd: false,
        shift: false,
        ctrl: false,
        alt: false,
        key: String::new(),
    };
    for part in spec.split('+') {
        match part.to_ascii_lowercase().as_str() {
            "cmd" | "command" => combo.cmd = true,
            "shift" => combo.shift = true,
            "ctrl" | "control" => combo.ctrl = true,
            "alt" | "opt" | "option" => combo.alt = true,
            other if !other.is_empty() => combo.key = other.to_string(),
            _ => {}
        }
    }
    if combo.key.is_empty() {
        return Err(BridgeError::ValidationError("key combo has no non-modifier key".to_string()));
    }
    Ok(combo)
}

const NAVIGATION_KEYS: &[&str] = &["tab", "shift+tab", "enter", "return", "escape", "esc", "up", "down", "left", "right"];

pub fn type_text(server: &Server, req: &TypeRequest) -> Result<TypeResponse, BridgeError> {
    if req.text.is_none() && req.key.is_none() {
        return Err(BridgeError::ValidationError("`type` requires `text` or `key`".to_string()));
    }
    let scope = scope_for(req.app.as_deref(), req.window.as_deref(), req.pid);
    let now = server.now_ms();

    let resolved_target = if let Some(spec) = &req.target {
        let resolved = server.with_backend(|b| resolve_target(&server.cache, b, now, &scope, spec, None))?;
        let point = resolved.point();
        server.with_backend(|b| b.click(point.0, point.1, MouseButton::Left, 1)).map_err(BridgeError::from)?;
        sleep(Duration::from_millis(50));
        Some(resolved)
    } else {
        None
    };

    let mut action = String::new();
    if let Some(text) = &req.text {
        server.with_backend(|b| b.type_text(text, req.delay_ms.max(5))).map_err(BridgeError::from)?;
        action.push_str("type");
    }
    if let Some(key) = &req.key {
        let combo = parse_key_combo(key)?;
        server.with_backend(|b| b.key_combo(&combo)).map_err(BridgeError::from)?;
        action.push_str(if action.is_empty() { "key" } else { "+key" });
    }

    let target_el = match resolved_target {
        Some(ResolvedTarget::Element { element, .. }) => server
            .with_backend(|b| b.read_elements(&scope))
            .ok()
            .and_then(|tree| ops::find_by_id(&tree, element.id).cloned()),
        _ => None,
    };

    let focused_el = if req.key.as_deref().is_some_and(|k| NAVIGATION_KEYS.contains(&k.to_ascii_lowercase().as_str())) {
        server
            .with_backend(|b| b.read_elements(&scope))
            .ok()
            .and_then(|tree| find_focused(&tree))
    } else {
        None
    };

    let (display, primary) = if req.app.is_some() {
        server
            .with_backend(|b| b.read_elements(&scope))
            .ok()
            .map(|tree| collect_display_elements(&tree))
            .unwrap_or_default()
    } else {
        (Vec::new(), None)
    };

    Ok(TypeResponse {
        action,
        target: target_el,
        focused: focused_el,
        display,
        primary,
    })
}

fn find_focused(node: &Element) -> Option<Element> {
    if node.focused {
        return Some(node.clone());
    }
    node.children.iter().find_map(find_focused)
}

// ---------------------------------------------------------------------
// action
// ---------------------------------------------------------------------

#[derive(Clone, Debug, Deserialize)]
pub struct ActionRequest {
    pub target: TargetSpec,
    #[serde(default)]
    pub app: Option<String>,
    #[serde(default)]
    pub window: Option<String>,
    #[serde(default)]
    pub pid: Option<i32>,
    #[serde(default = "default_action_name")]
    pub name: String,
    #[serde(default)]
    pub post_read: bool,
}

fn default_action_name() -> String {
    "press".to_string()
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ActionResponse {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub display: Vec<FlatElement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<Element>,
}

pub fn action(server: &Server, req: &ActionRequest) -> Result<ActionResponse, BridgeError> {
    let scope = scope_for(req.app.as_deref(), req.window.as_deref(), req.pid);
    let now = server.now_ms();
    let resolved = server.with_backend(|b| resolve_target(&server.cache, b, now, &scope, &req.target, None))?;
    let element = resolved.element().ok_or_else(|| {
        BridgeError::ValidationError("`action` requires a resolvable element target".to_string())
    })?;
    server
        .with_backend(|b| b.perform_action(&scope, element.id, &req.name))
        .map_err(BridgeError::from)?;
    server.cache.invalidate(req.app.as_deref());

    let tree = server.with_backend(|b| b.read_elements(&scope)).ok();
    let (display, primary) = tree
        .as_ref()
        .map(|t| collect_display_elements(t))
        .unwrap_or_default();
    let state = if req.post_read {
        tree.and_then(|t| ops::find_by_id(&t, element.id).cloned())
    } else {
        None
    };

    Ok(ActionResponse { display, primary, state })
}

// ---------------------------------------------------------------------
// set_value
// ---------------------------------------------------------------------

#[derive(Clone, Debug, Deserialize)]
pub struct SetValueRequest {
    pub target: TargetSpec,
    pub value: String,
    #[serde(default)]
    pub app: Option<String>,
    #[serde(default)]
    pub window: Option<String>,
    #[serde(default)]
    pub pid: Option<i32>,
    #[serde(default = "default_attribute")]
    pub attribute: String,
}

fn default_attribute() -> String {
    "value".to_string()
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct SetValueResponse {}

pub fn set_value(server: &Server, req: &SetValueRequest) -> Result<SetValueResponse, BridgeError> {
    let scope = scope_for(req.app.as_deref(), req.window.as_deref(), req.pid);
    let now = server.now_ms();
    let resolved = server.with_backend(|b| resolve_target(&server.cache, b, now, &scope, &req.target, None))?;
    let element = resolved
        .element()
        .ok_or_else(|| BridgeError::ValidationError("`set_value` requires a resolvable element target".to_string()))?;
    server
        .with_backend(|b| b.set_value(&scope, element.id, &req.attribute, &req.value))
        .map_err(BridgeError::from)?;
    server.cache.invalidate(req.app.as_deref());
    Ok(SetValueResponse {})
}

// ---------------------------------------------------------------------
// scroll
// ---------------------------------------------------------------------

#[derive(Clone, Debug, Deserialize)]
pub struct ScrollRequest {
    #[serde(default)]
    pub target: Option<TargetSpec>,
    #[serde(default)]
    pub x: Option<i32>,
    #[serde(default)]
    pub y: Option<i32>,
    pub direction: Direction,
    #[serde(default = "default_scroll_amount")]
    pub amount: i32,
    #[serde(default)]
    pub app: Option<String>,
    #[serde(default)]
    pub window: Option<String>,
    #[serde(default)]
    pub pid: Option<i32>,
}

fn default_scroll_amount() -> i32 {
    3
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ScrollResponse {}

fn direction_delta(direction: Direction, amount: i32) -> (i32, i32) {
    match direction {
        Direction::Left => (-amount, 0),
        Direction::Right => (amount, 0),
        Direction::Above => (0, -amount),
        Direction::Below => (0, amount),
        Direction::Any => (0, amount),
    }
}

pub fn scroll(server: &Server, req: &ScrollRequest) -> Result<ScrollResponse, BridgeError> {
    let scope = scope_for(req.app.as_deref(), req.window.as_deref(), req.pid);
    let now = server.now_ms();
    let point = if let Some(spec) = &req.target {
        server
            .with_backend(|b| resolve_target(&server.cache, b, now, &scope, spec, None))?
            .point()
    } else if let (Some(x), Some(y)) = (req.x, req.y) {
        (x, y)
    } else {
        server.with_backend(|b| b.pointer_position()).map_err(BridgeError::from)?
    };
    let (dx, dy) = direction_delta(req.direction, req.amount);
    server.with_backend(|b| b.scroll(point.0, point.1, dx, dy)).map_err(BridgeError::from)?;
    Ok(ScrollResponse {})
}

// ---------------------------------------------------------------------
// hover
// ---------------------------------------------------------------------

#[derive(Clone, Debug, Deserialize)]
pub struct HoverRequest {
    #[serde(default)]
    pub target: Option<TargetSpec>,
    #[serde(default)]
    pub x: Option<i32>,
    #[serde(default)]
    pub y: Option<i32>,
    #[serde(default)]
    pub app: Option<String>,
    #[serde(default)]
    pub window: Option<String>,
    #[serde(default)]
    pub pid: Option<i32>,
    #[serde(default)]
    pub post_read: bool,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct HoverResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<Element>,
}

pub fn hover(server: &Server, req: &HoverRequest) -> Result<HoverResponse, BridgeError> {
    let scope = scope_for(req.app.as_deref(), req.window.as_deref(), req.pid);
    let now = server.now_ms();
    let point = if let Some(spec) = &req.target {
        server
            .with_backend(|b| resolve_target(&server.cache, b, now, &scope, spec, None))?
            .point()
    } else {
        (
            req.x.ok_or_else(|| BridgeError::ValidationError("hover requires a target or x/y".to_string()))?,
            req.y.ok_or_else(|| BridgeError::ValidationError("hover requires a target or x/y".to_string()))?,
        )
    };
    server.with_backend(|b| b.move_mouse(point.0, point.1)).map_err(BridgeError::from)?;
    let state = if req.post_read {
        server.with_backend(|b| b.read_elements(&scope)).ok()
    } else {
        None
    };
    Ok(HoverResponse { state })
}

// ---------------------------------------------------------------------
// drag
// ---------------------------------------------------------------------

#[derive(Clone, Debug, Deserialize)]
pub struct DragRequest {
    pub from: TargetSpec,
    pub to: TargetSpec,
    #[serde(default)]
    pub app: Option<String>,
    #[serde(default)]
    pub window: Option<String>,
    #[serde(default)]
    pub pid: Option<i32>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct DragResponse {}

/// Drops by calling the backend's `mouse_up` at the last-known point exactly
/// once, on every exit path including an error return (spec §7, property
/// 16). Mirrors the RAII-cleanup-on-Drop shape used for COM/platform handle
/// guards elsewhere in the ecosystem.
struct ReleaseGuard<'a> {
    backend: &'a dyn bridge_backend::Backend,
    point: (i32, i32),
    button: MouseButton,
    released: bool,
}

impl<'a> ReleaseGuard<'a> {
    fn update(&mut self, point: (i32, i32)) {
        self.point = point;
    }
}

impl Drop for ReleaseGuard<'_> {
    fn drop(&mut self) {
        if !self.released {
            let _ = self.backend.mouse_up(self.point.0, self.point.1, self.button);
        }
    }
}

fn interpolate(from: (i32, i32), to: (i32, i32), steps: u32) -> Vec<(i32, i32)> {
    (1..=steps)
        .map(|i| {
            let t = i as f64 / steps as f64;
            let x = from.0 as f64 + (to.0 - from.0) as f64 * t;
            let y = from.1 as f64 + (to.1 - from.1) as f64 * t;
            (x.round() as i32, y.round() as i32)
        })
        .collect()
}

pub fn drag(server: &Server, req: &DragRequest) -> Result<DragResponse, BridgeError> {
    let scope = scope_for(req.app.as_deref(), req.window.as_deref(), req.pid);
    let now = server.now_ms();
    let from_point = server
        .with_backend(|b| resolve_target(&server.cache, b, now, &scope, &req.from, None))?
        .point();
    let to_point = server
        .with_backend(|b| resolve_target(&server.cache, b, now, &scope, &req.to, None))?
        .point();

    server.with_backend(|b| -> Result<(), BridgeError> {
        b.move_mouse(from_point.0, from_point.1).map_err(BridgeError::from)?;
        b.mouse_down(from_point.0, from_point.1, MouseButton::Left).map_err(BridgeError::from)?;

        let mut guard = ReleaseGuard {
            backend: b,
            point: from_point,
            button: MouseButton::Left,
            released: false,
        };

        const STEPS: u32 = 10;
        for step in interpolate(from_point, to_point, STEPS) {
            b.move_mouse(step.0, step.1).map_err(BridgeError::from)?;
            guard.update(step);
            sleep(Duration::from_millis(10));
        }

        b.mouse_up(to_point.0, to_point.1, MouseButton::Left).map_err(BridgeError::from)?;
        guard.released = true;
        Ok(())
    })?;

    Ok(DragResponse {})
}

// ---------------------------------------------------------------------
// focus
// ---------------------------------------------------------------------

#[derive(Clone, Debug, Default, Deserialize)]
pub struct FocusRequest {
    #[serde(default)]
    pub app: Option<String>,
    #[serde(default)]
    pub window: Option<String>,
    #[serde(default)]
    pub window_id: Option<i64>,
    #[serde(default)]
    pub pid: Option<i32>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct FocusResponse {}

pub fn focus(server: &Server, req: &FocusRequest) -> Result<FocusResponse, BridgeError> {
    let scope = ReadScope {
        app: req.app.clone(),
        window: req.window.clone(),
        window_id: req.window_id,
        pid: req.pid,
        depth: None,
    };
    server.with_backend(|b| b.focus_window(&scope)).map_err(BridgeError::from)?;
    Ok(FocusResponse {})
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_backend::mock::MockBackend;
    use bridge_backend::Inputter;
    use bridge_types::{Bounds, Window};
    use std::sync::Arc;

    fn server_with_submit_and_dialog() -> (Server, Arc<MockBackend>) {
        let backend = Arc::new(MockBackend::new());
        let mut submit = Element::new(1, Role::Btn);
        submit.title = Some("Submit".to_string());
        submit.actions = vec!["press".to_string()];
        submit.bounds = Bounds::new(200, 400, 100, 32);
        let window = Element {
            role: Role::Window,
            children: vec![submit.clone()],
            ..Element::new(0, Role::Window)
        };
        backend.add_window(
            Window {
                app: "App".to_string(),
                pid: 1,
                title: "Main".to_string(),
                id: 1,
                bounds: Bounds::new(0, 0, 1000, 800),
                focused: true,
            },
            window.clone(),
        );
        let mut with_dialog = window;
        with_dialog.children.push(Element::new(2, Role::Group));
        backend.set_action_effect("App", 1, "press", with_dialog);
        let server = Server::new(backend.clone() as Arc<dyn bridge_backend::Backend>, crate::config::BridgeConfig::default());
        (server, backend)
    }

    #[test]
    fn s7_verified_click_falls_back_to_action() {
        let (server, _backend) = server_with_submit_and_dialog();
        let req = ClickRequest {
            target: TargetSpec::Text {
                text: "Submit".to_string(),
                roles: None,
                scope_id: None,
                exact: false,
            },
            app: Some("App".to_string()),
            window: None,
            pid: None,
            button: "left".to_string(),
            count: 1,
            near: None,
            verify: true,
            post_read: false,
        };
        let resp = click(&server, &req).unwrap();
        assert_eq!(resp.verified, Some(true));
        assert_eq!(resp.retried, Some(true));
        assert_eq!(resp.attempts.len(), 2);
        assert_eq!(resp.attempts[0].result, "no state change");
        assert_eq!(resp.attempts[1].result, "changed");
        assert_eq!(resp.ok, None);
    }

    #[test]
    fn s7_verified_click_exhausts_retries_reports_ok_false() {
        let backend = Arc::new(MockBackend::new());
        let mut submit = Element::new(1, Role::Btn);
        submit.title = Some("Submit".to_string());
        submit.actions = vec!["press".to_string()];
        submit.bounds = Bounds::new(200, 400, 100, 32);
        let window = Element {
            role: Role::Window,
            children: vec![submit],
            ..Element::new(0, Role::Window)
        };
        backend.add_window(
            Window {
                app: "App".to_string(),
                pid: 1,
                title: "Main".to_string(),
                id: 1,
                bounds: Bounds::new(0, 0, 1000, 800),
                focused: true,
            },
            window,
        );
        // No `set_action_effect` is configured, so neither the click, the
        // fallback `press` action, nor the offset click ever changes state.
        let server = Server::new(backend.clone() as Arc<dyn bridge_backend::Backend>, crate::config::BridgeConfig::default());
        let req = ClickRequest {
            target: TargetSpec::Text {
                text: "Submit".to_string(),
                roles: None,
                scope_id: None,
                exact: false,
            },
            app: Some("App".to_string()),
            window: None,
            pid: None,
            button: "left".to_string(),
            count: 1,
            near: None,
            verify: true,
            post_read: false,
        };
        let resp = click(&server, &req).unwrap();
        assert_eq!(resp.verified, Some(false));
        assert_eq!(resp.ok, Some(false));

        let wrapped = crate::handlers::envelope("click", Ok::<_, BridgeError>(resp));
        assert_eq!(wrapped["ok"], serde_json::json!(false));
        assert_eq!(wrapped["verified"], serde_json::json!(false));
    }

    #[test]
    fn drag_releases_button_even_when_move_fails_mid_drag() {
        let backend = Arc::new(MockBackend::new());
        let mut a = Element::new(1, Role::Btn);
        a.bounds = Bounds::new(0, 0, 10, 10);
        let mut b_el = Element::new(2, Role::Btn);
        b_el.bounds = Bounds::new(100, 100, 10, 10);
        let root = Element {
            role: Role::Window,
            children: vec![a, b_el],
            ..Element::new(0, Role::Window)
        };
        backend.add_window(
            Window {
                app: "App".to_string(),
                pid: 1,
                title: "Main".to_string(),
                id: 1,
                bounds: Bounds::new(0, 0, 200, 200),
                focused: true,
            },
            root,
        );
        backend.fail_next_move();
        let server = Server::new(backend.clone() as Arc<dyn bridge_backend::Backend>, crate::config::BridgeConfig::default());
        let req = DragRequest {
            from: TargetSpec::Id { id: 1 },
            to: TargetSpec::Id { id: 2 },
            app: Some("App".to_string()),
            window: None,
            pid: None,
        };
        // The first `move_mouse` (to `from_point`) consumes the scripted
        // failure; the handler should still surface the error and the mock
        // should record that the button was released, not left held.
        let _ = drag(&server, &req);
        assert!(backend.held_button().is_none());
    }

    #[test]
    fn scroll_without_target_or_xy_uses_current_pointer_position() {
        let backend = Arc::new(MockBackend::new());
        let root = Element::new(0, Role::Window);
        backend.add_window(
            Window {
                app: "App".to_string(),
                pid: 1,
                title: "Main".to_string(),
                id: 1,
                bounds: Bounds::new(0, 0, 800, 600),
                focused: true,
            },
            root,
        );
        backend.click(42, 77, bridge_backend::MouseButton::Left, 1).unwrap();
        let server = Server::new(backend.clone() as Arc<dyn bridge_backend::Backend>, crate::config::BridgeConfig::default());
        let req = ScrollRequest {
            target: None,
            x: None,
            y: None,
            direction: Direction::Below,
            amount: 3,
            app: Some("App".to_string()),
            window: None,
            pid: None,
        };
        scroll(&server, &req).unwrap();
        assert_eq!(backend.pointer_position().unwrap(), (42, 77));
    }
}
