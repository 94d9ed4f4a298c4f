//! `batch` handler (spec §4.6): runs a sequence of steps against the other
//! handlers, with per-step guards and an all-or-continue error policy.

use std::thread::sleep;
use std::time::Duration;

use bridge_types::TargetSpec;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BridgeError;
use crate::handlers::{actions, clipboard, find, list, open, read, screenshot, wait};
use crate::resolve::resolve_target;
use crate::server::Server;

#[derive(Clone, Debug, Deserialize)]
pub struct BatchStep {
    pub action: String,
    #[serde(default)]
    pub params: Value,
    /// Skip the step unless this target currently resolves to an element.
    #[serde(default)]
    pub if_exists: Option<TargetSpec>,
    /// Skip the step unless this target resolves and is focused.
    #[serde(default)]
    pub if_focused: Option<TargetSpec>,
    /// A failure in this step doesn't abort the batch.
    #[serde(default, rename = "try")]
    pub best_effort: bool,
    #[serde(default)]
    pub sleep_ms: Option<u64>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BatchRequest {
    pub steps: Vec<BatchStep>,
    #[serde(default = "default_stop_on_error")]
    pub stop_on_error: bool,
    /// Scope used to evaluate `if_exists`/`if_focused` guards.
    #[serde(default)]
    pub app: Option<String>,
}

fn default_stop_on_error() -> bool {
    true
}

#[derive(Clone, Debug, Serialize)]
pub struct StepResult {
    pub action: String,
    pub skipped: bool,
    pub result: Value,
}

#[derive(Clone, Debug, Serialize)]
pub struct BatchResponse {
    pub steps: usize,
    pub completed: usize,
    pub results: Vec<StepResult>,
}

fn parse<T: for<'de> Deserialize<'de>>(params: &Value) -> Result<T, BridgeError> {
    serde_json::from_value(params.clone())
        .map_err(|e| BridgeError::ValidationError(format!("invalid params: {e}")))
}

/// Parses `params` into `Req`, runs `f`, and wraps the outcome through the
/// same `envelope()` every other call site uses, so a step's result always
/// carries `ok`/`action` regardless of success or failure.
fn step_envelope<Req, Resp>(action: &str, params: &Value, f: impl FnOnce(Req) -> Result<Resp, BridgeError>) -> Value
where
    Req: for<'de> Deserialize<'de>,
    Resp: Serialize,
{
    let result = parse::<Req>(params).and_then(f);
    crate::handlers::envelope(action, result)
}

fn dispatch(server: &Server, step: &BatchStep) -> Value {
    let action = step.action.as_str();
    match action {
        "click" => step_envelope(action, &step.params, |req| actions::click(server, &req)),
        "type" => step_envelope(action, &step.params, |req| actions::type_text(server, &req)),
        "action" => step_envelope(action, &step.params, |req| actions::action(server, &req)),
        "set_value" => step_envelope(action, &step.params, |req| actions::set_value(server, &req)),
        "scroll" => step_envelope(action, &step.params, |req| actions::scroll(server, &req)),
        "hover" => step_envelope(action, &step.params, |req| actions::hover(server, &req)),
        "drag" => step_envelope(action, &step.params, |req| actions::drag(server, &req)),
        "focus" => step_envelope(action, &step.params, |req| actions::focus(server, &req)),
        "wait" => step_envelope(action, &step.params, |req| wait::wait(server, &req)),
        "read" => step_envelope(action, &step.params, |req| read::read(server, &req)),
        "list" => step_envelope(action, &step.params, |req| list::list(server, &req)),
        "open" => step_envelope(action, &step.params, |req| open::open(server, &req)),
        "screenshot" => step_envelope(action, &step.params, |req| screenshot::screenshot(server, &req)),
        "find" => step_envelope(action, &step.params, |req| find::find(server, &req)),
        "clipboard_get" => crate::handlers::envelope(action, clipboard::clipboard_get(server)),
        "clipboard_set" => step_envelope(action, &step.params, |req| clipboard::clipboard_set(server, &req)),
        "clipboard_clear" => crate::handlers::envelope(action, clipboard::clipboard_clear(server)),
        "clipboard_grab" => step_envelope(action, &step.params, |req| clipboard::clipboard_grab(server, &req)),
        other => crate::handlers::envelope(
            action,
            Err::<Value, _>(BridgeError::ValidationError(format!("unknown batch action `{other}`"))),
        ),
    }
}

fn guard_holds(server: &Server, app: Option<&str>, spec: &TargetSpec, require_focused: bool) -> bool {
    let scope = bridge_types::ReadScope {
        app: app.map(str::to_string),
        window: None,
        window_id: None,
        pid: None,
        depth: None,
    };
    let now = server.now_ms();
    match server.with_backend(|b| resolve_target(&server.cache, b, now, &scope, spec, None)) {
        Ok(resolved) => match resolved.element() {
            Some(el) => !require_focused || el.focused,
            None => !require_focused,
        },
        Err(_) => false,
    }
}

pub fn batch(server: &Server, req: &BatchRequest) -> Result<BatchResponse, BridgeError> {
    let mut results = Vec::with_capacity(req.steps.len());
    let mut completed = 0usize;

    for step in &req.steps {
        let skip = if let Some(spec) = &step.if_exists {
            !guard_holds(server, req.app.as_deref(), spec, false)
        } else if let Some(spec) = &step.if_focused {
            !guard_holds(server, req.app.as_deref(), spec, true)
        } else {
            false
        };

        if skip {
            results.push(StepResult {
                action: step.action.clone(),
                skipped: true,
                result: Value::Null,
            });
            continue;
        }

        let value = dispatch(server, step);
        let failed = value.get("ok").and_then(Value::as_bool) == Some(false);
        results.push(StepResult {
            action: step.action.clone(),
            skipped: false,
            result: value,
        });
        if !failed {
            completed += 1;
        } else if !step.best_effort && req.stop_on_error {
            break;
        } else {
            completed += 1;
        }

        if let Some(ms) = step.sleep_ms {
            sleep(Duration::from_millis(ms));
        }
    }

    server.cache.invalidate(req.app.as_deref());

    Ok(BatchResponse {
        steps: req.steps.len(),
        completed,
        results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_backend::mock::MockBackend;
    use bridge_types::{Bounds, Element, Role, Window};
    use std::sync::Arc;
    use serde_json::json;

    fn server() -> Server {
        let backend = MockBackend::new();
        let mut field = Element::new(1, Role::Input);
        field.actions = vec!["press".to_string()];
        field.bounds = Bounds::new(0, 0, 100, 20);
        let root = Element {
            role: Role::Window,
            children: vec![field],
            ..Element::new(0, Role::Window)
        };
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
        Server::new(Arc::new(backend), crate::config::BridgeConfig::default())
    }

    #[test]
    fn s8_batch_runs_steps_in_order_and_stops_on_error() {
        let server = server();
        let req = BatchRequest {
            app: Some("App".to_string()),
            stop_on_error: true,
            steps: vec![
                BatchStep {
                    action: "click".to_string(),
                    params: json!({"target": {"id": 1}, "app": "App"}),
                    if_exists: None,
                    if_focused: None,
                    best_effort: false,
                    sleep_ms: None,
                },
                BatchStep {
                    action: "click".to_string(),
                    params: json!({"target": {"id": 999}, "app": "App"}),
                    if_exists: None,
                    if_focused: None,
                    best_effort: false,
                    sleep_ms: None,
                },
                BatchStep {
                    action: "click".to_string(),
                    params: json!({"target": {"id": 1}, "app": "App"}),
                    if_exists: None,
                    if_focused: None,
                    best_effort: false,
                    sleep_ms: None,
                },
            ],
        };
        let resp = batch(&server, &req).unwrap();
        assert_eq!(resp.steps, 3);
        assert_eq!(resp.completed, 1);
        assert_eq!(resp.results.len(), 2);
        assert!(!resp.results[1].result["ok"].as_bool().unwrap());
    }

    #[test]
    fn if_exists_skips_step_when_target_missing() {
        let server = server();
        let req = BatchRequest {
            app: Some("App".to_string()),
            stop_on_error: true,
            steps: vec![BatchStep {
                action: "click".to_string(),
                params: json!({"target": {"id": 1}, "app": "App"}),
                if_exists: Some(TargetSpec::Id { id: 999 }),
                if_focused: None,
                best_effort: false,
                sleep_ms: None,
            }],
        };
        let resp = batch(&server, &req).unwrap();
        assert!(resp.results[0].skipped);
        assert_eq!(resp.completed, 0);
    }
}
