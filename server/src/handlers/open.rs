//! `open` handler (spec §4.6): launches a URL, file, or app by platform
//! delegation, with an optional wait for its window to appear.

use std::thread::sleep;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;
use crate::server::Server;

#[derive(Clone, Debug, Deserialize)]
pub struct OpenRequest {
    pub target: String,
    #[serde(default)]
    pub wait_for_app: Option<String>,
    #[serde(default = "default_wait_timeout_sec")]
    pub wait_timeout_sec: f64,
}

fn default_wait_timeout_sec() -> f64 {
    10.0
}

#[derive(Clone, Debug, Serialize)]
pub struct OpenResponse {
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waited_ms: Option<u128>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timed_out: Option<bool>,
}

/// `"url" | "file" | "app"`, in that priority order (spec §4.6 `open`).
fn classify(target: &str) -> &'static str {
    if target.contains("://") {
        "url"
    } else if target.starts_with('/') || target.starts_with("./") || target.starts_with("~/") {
        "file"
    } else {
        "app"
    }
}

pub fn open(server: &Server, req: &OpenRequest) -> Result<OpenResponse, BridgeError> {
    if req.target.is_empty() {
        return Err(BridgeError::ValidationError("`open` requires a non-empty target".to_string()));
    }
    let kind = classify(&req.target);
    server.with_backend(|b| b.open(&req.target)).map_err(BridgeError::from)?;

    let (waited_ms, timed_out) = if let Some(app) = &req.wait_for_app {
        let start = Instant::now();
        let deadline = start + Duration::from_secs_f64(req.wait_timeout_sec.max(0.0));
        loop {
            let found = server
                .with_backend(|b| b.list_windows(Some(app.as_str()), None))
                .map(|windows| !windows.is_empty())
                .unwrap_or(false);
            if found {
                break (Some(start.elapsed().as_millis()), Some(false));
            }
            if Instant::now() >= deadline {
                break (Some(start.elapsed().as_millis()), Some(true));
            }
            sleep(Duration::from_millis(100));
        }
    } else {
        (None, None)
    };

    Ok(OpenResponse {
        kind: kind.to_string(),
        waited_ms,
        timed_out,
    })
}
