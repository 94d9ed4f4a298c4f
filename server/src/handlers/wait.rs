//! `wait` handler (spec §4.6): polls, bypassing the tree cache, until a
//! predicate holds or a timeout elapses.

use std::thread::sleep;
use std::time::{Duration, Instant};

use bridge_consumer::ops;
use bridge_types::{Element, ReadScope, Role};
use serde::{Deserialize, Serialize};

use crate::error::BridgeError;
use crate::server::Server;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct WaitRequest {
    #[serde(default)]
    pub app: Option<String>,
    #[serde(default)]
    pub window: Option<String>,
    #[serde(default)]
    pub pid: Option<i32>,
    #[serde(default)]
    pub for_text: Option<String>,
    #[serde(default)]
    pub for_role: Option<String>,
    #[serde(default)]
    pub for_id: Option<i32>,
    #[serde(default)]
    pub gone: bool,
    #[serde(default = "default_timeout_sec")]
    pub timeout_sec: f64,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

fn default_timeout_sec() -> f64 {
    5.0
}

fn default_interval_ms() -> u64 {
    200
}

#[derive(Clone, Debug, Serialize)]
pub struct WaitResponse {
    pub timed_out: bool,
    pub elapsed_ms: u128,
}

fn predicate_holds(root: &Element, req: &WaitRequest) -> bool {
    let role = req.for_role.as_deref().and_then(Role::from_code);
    let text_needle = req.for_text.as_deref().map(str::to_ascii_lowercase);

    let matched = ops::flatten(root).into_iter().any(|el| {
        let id_ok = req.for_id.map_or(true, |id| el.id == id);
        let role_ok = role.map_or(true, |r| el.role == r);
        let text_ok = text_needle.as_deref().map_or(true, |needle| {
            [el.title.as_deref(), el.value.as_deref(), el.description.as_deref()]
                .into_iter()
                .flatten()
                .any(|s| s.to_ascii_lowercase().contains(needle))
        });
        id_ok && role_ok && text_ok
    });

    matched != req.gone
}

pub fn wait(server: &Server, req: &WaitRequest) -> Result<WaitResponse, BridgeError> {
    if req.for_text.is_none() && req.for_role.is_none() && req.for_id.is_none() {
        return Err(BridgeError::ValidationError(
            "`wait` requires at least one of for_text, for_role, for_id".to_string(),
        ));
    }
    let scope = ReadScope {
        app: req.app.clone(),
        window: req.window.clone(),
        window_id: None,
        pid: req.pid,
        depth: None,
    };
    let deadline = Instant::now() + Duration::from_secs_f64(req.timeout_sec.max(0.0));
    let start = Instant::now();

    loop {
        let tree = server.with_backend(|b| b.read_elements(&scope));
        let holds = match tree {
            Ok(ref root) => predicate_holds(root, req),
            Err(_) if req.gone => true,
            Err(err) => return Err(BridgeError::from(err)),
        };
        if holds {
            return Ok(WaitResponse {
                timed_out: false,
                elapsed_ms: start.elapsed().as_millis(),
            });
        }
        if Instant::now() >= deadline {
            return Ok(WaitResponse {
                timed_out: true,
                elapsed_ms: start.elapsed().as_millis(),
            });
        }
        sleep(Duration::from_millis(req.interval_ms.max(1)));
    }
}
